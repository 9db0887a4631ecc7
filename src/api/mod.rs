pub mod stockcast;

pub mod encryption;
pub mod errors;
pub mod table;

pub use encryption::{CryptoError, TokenCipher};
pub use errors::extract_error_details;
pub use table::Table;

pub fn execute() {
    println!("📖 Stockcast Commands");
    println!();
    println!("🔐 Account");
    println!("  login <username> <password>                       Sign in");
    println!("  register <username> <email> <password> <confirm>  Create an account");
    println!("  logout                                            Sign out and forget tokens");
    println!("  renew                                             Renew the access token");
    println!("  status                                            Show session and action states");
    println!();
    println!("📈 Predictions");
    println!("  predict <TICKER>   (alias: p)   Predict the next day close");
    println!("  history            (alias: h)   List your past predictions");
    println!();
    println!("  help | quit");
}

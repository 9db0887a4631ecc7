use stockcast_client::ViewController;

use super::print_submission;

pub async fn execute(controller: &ViewController, args: &[&str]) -> Result<(), String> {
    if args.len() > 2 {
        return Err("Usage: `login <username> <password>`".to_string());
    }

    // Missing values are left to the controller's validation
    let username = args.first().copied().unwrap_or("");
    let password = args.get(1).copied().unwrap_or("");

    print_submission("login", &controller.submit_login(username, password).await);
    Ok(())
}

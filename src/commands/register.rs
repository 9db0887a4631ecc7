use stockcast_client::models::RegisterForm;
use stockcast_client::ViewController;

use super::print_submission;

pub async fn execute(controller: &ViewController, args: &[&str]) -> Result<(), String> {
    let form = match args {
        [username, email, password, confirm] => RegisterForm::new(*username, *email, *password, *confirm),
        _ => {
            return Err(
                "Usage: `register <username> <email> <password> <confirm password>`".to_string(),
            )
        }
    };

    controller.set_register_form(form);
    print_submission("register", &controller.submit_register().await);
    Ok(())
}

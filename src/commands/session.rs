use stockcast_client::models::Action;
use stockcast_client::ViewController;

use super::render_state;

pub fn logout(controller: &ViewController) -> Result<(), String> {
    controller
        .logout()
        .map_err(|e| format!("Failed to log out: {}", e))?;
    println!("👋 Logged out");
    Ok(())
}

pub async fn renew(controller: &ViewController) -> Result<(), String> {
    if let Some(text) = render_state("renew", &controller.renew_session().await) {
        println!("{}", text);
    }
    Ok(())
}

pub fn status(controller: &ViewController) {
    println!("🔐 Session: {:?}", controller.session());

    let state = controller.snapshot();
    for action in [Action::Login, Action::Register, Action::Predict, Action::History] {
        let text = render_state(&action.to_string(), state.slot(action))
            .unwrap_or_else(|| format!("{}: idle", action));
        println!("{}", text);
    }
}

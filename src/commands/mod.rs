pub mod help;
pub mod history;
pub mod login;
pub mod predict;
pub mod register;
pub mod session;

use stockcast_client::models::{ErrorDetails, Submission, UiState};
use stockcast_client::ViewController;
use tracing::error;

pub enum Flow {
    Continue,
    Quit,
}

pub async fn handle_line(controller: &ViewController, line: &str) -> Flow {
    // Parse command and arguments
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Flow::Continue;
    }

    let command = parts[0].to_lowercase();
    let args = &parts[1..];

    let result = match command.as_str() {
        "login" | "signin" => login::execute(controller, args).await,
        "register" | "signup" => register::execute(controller, args).await,
        "predict" | "p" => predict::execute(controller, args).await,
        "history" | "h" => history::execute(controller).await,
        "logout" => session::logout(controller),
        "renew" => session::renew(controller).await,
        "status" => {
            session::status(controller);
            Ok(())
        }
        "help" | "?" => {
            help::execute();
            Ok(())
        }
        "quit" | "exit" => return Flow::Quit,
        other => Err(format!("Unknown command `{}`. Type `help` for a list.", other)),
    };

    if let Err(e) = result {
        error!("Command {} failed: {}", command, e);
        println!("❌ {}", e);
    }

    Flow::Continue
}

/// One printable line (or block) for an action state; `None` when idle
pub fn render_state(label: &str, state: &UiState) -> Option<String> {
    match state {
        UiState::Idle => None,
        UiState::Loading => Some(format!("⏳ {}: loading...", label)),
        UiState::Success(message) => Some(format!("✅ {}", message)),
        UiState::Error(ErrorDetails::Message(message)) => Some(format!("❌ {}", message)),
        UiState::Error(details) => {
            let items: Vec<String> = details.lines().iter().map(|line| format!("   • {}", line)).collect();
            Some(format!("❌ {} failed:\n{}", label, items.join("\n")))
        }
    }
}

pub fn print_submission(label: &str, submission: &Submission) {
    match submission {
        Submission::Ignored => println!("⏳ {} is already in progress", label),
        Submission::Finished(state) => {
            if let Some(text) = render_state(label, state) {
                println!("{}", text);
            }
        }
    }
}

pub fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "--".to_string(), |price| format!("${:.2}", price))
}

pub fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |value| format!("{:.4}", value))
}

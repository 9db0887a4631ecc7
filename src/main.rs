use std::io::Write;
use std::sync::Arc;

use stockcast_client::models::{Navigation, SessionState};
use stockcast_client::utils::{CryptoError, TokenCipher};
use stockcast_client::{
    ClientConfig, CredentialStore, FileCredentialStore, SessionGuard, StockcastClient, ViewController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Flow;

const PROMPT: &str = "stockcast> ";

fn build_store(config: &ClientConfig) -> Result<Arc<dyn CredentialStore>, CryptoError> {
    let store = match &config.encryption_key {
        Some(key) => {
            let cipher = TokenCipher::from_hex_key(key)?;
            FileCredentialStore::with_cipher(config.credential_file.clone(), cipher)
        }
        None => {
            warn!("TOKEN_ENCRYPTION_KEY not set, tokens are stored unencrypted");
            FileCredentialStore::new(config.credential_file.clone())
        }
    };
    info!("Credentials stored at {}", store.path().display());
    Ok(Arc::new(store))
}

fn prompt() {
    print!("{}", PROMPT);
    let _ = std::io::stdout().flush();
}

/// Act on redirects requested by the session guard
fn drain_navigation(controller: ViewController, mut navigation: UnboundedReceiver<Navigation>) {
    tokio::spawn(async move {
        while let Some(next) = navigation.recv().await {
            match next {
                Navigation::ToLogin { delay } => {
                    tokio::time::sleep(delay).await;
                    println!("\n🔐 Please log in: `login <username> <password>`");
                    prompt();
                }
                Navigation::ToDashboard => {
                    println!("\n📊 Dashboard");
                    controller.enter_dashboard().await;
                    commands::history::show(&controller.snapshot());
                    prompt();
                }
            }
        }
    });
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::from_default_env()
        .add_directive("stockcast_client=info".parse().unwrap())
        .add_directive("stockcast=info".parse().unwrap());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting Stockcast client v{}", env!("CARGO_PKG_VERSION"));

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!("Backend: {}", config.base_url);

    let store = match build_store(&config) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to set up credential store: {}", e);
            return;
        }
    };

    let (navigator, navigation) = unbounded_channel();
    let guard = Arc::new(SessionGuard::new(store.clone(), navigator, config.redirect_delay));
    let api = Arc::new(StockcastClient::new(&config, store));
    let controller = ViewController::new(api, guard);

    drain_navigation(controller.clone(), navigation);

    match controller.enter_login() {
        SessionState::Authenticated => {
            println!("🔓 Welcome back!");
            controller.enter_dashboard().await;
            commands::history::show(&controller.snapshot());
        }
        SessionState::Unauthenticated => {
            println!("🔐 Log in with `login <username> <password>` or type `help`.");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        if let Flow::Quit = commands::handle_line(&controller, &line).await {
            break;
        }
    }

    info!("Goodbye");
}

//! Mixar CLI - a command line front end for the dashboard session client.
//!
//! Wires configuration, the session store and the `SessionClient` together,
//! and turns navigation intents into the dashboard path to open.

mod cli;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Method;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Args, Command, GuardKind};
use mixar_session_core::{
    Config, FileStore, KeyValueStore, KeyringStore, Navigation, RequestOptions, SessionClient,
};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing();

    let mut config = Config::load()?;
    config.apply_api_url_override(args.api_url.clone());
    info!(api_url = %config.api_url, "Mixar CLI starting");

    let store: Box<dyn KeyValueStore> = if args.keyring {
        Box::new(KeyringStore::new())
    } else {
        Box::new(FileStore::in_dir(&config.cache_dir()?))
    };
    let mut client = SessionClient::new(config, store)?;

    run(&mut client, args.command).await
}

async fn run(client: &mut SessionClient, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            if client.is_authenticated() {
                println!("Signed in as {}", describe_user(client));
                if client.is_superuser() {
                    println!("Superuser");
                }
            } else {
                println!("Not signed in");
            }
        }
        Command::Login { email } => {
            if navigate(client, client.redirect_if_authenticated()) {
                return Ok(());
            }
            let password = rpassword::prompt_password("Password: ")?;
            client.login(&email, &password).await?;
            println!("Signed in as {}", describe_user(client));
        }
        Command::Signup { email, name } => {
            if navigate(client, client.redirect_if_authenticated()) {
                return Ok(());
            }
            let password = rpassword::prompt_password("Password: ")?;
            client.send_signup_otp(&email, &password, &name).await?;
            let code = prompt("Code sent to your email: ")?;
            client.verify_signup_otp(&email, &code, &password, &name).await?;
            println!("Account created, signed in as {}", describe_user(client));
        }
        Command::GoogleUrl => {
            println!("{}", client.login_with_google().await?);
        }
        Command::GoogleCallback { code } => {
            client.handle_google_callback(&code).await?;
            println!("Signed in as {}", describe_user(client));
        }
        Command::Whoami => {
            if navigate(client, client.require_auth()) {
                return Ok(());
            }
            match client.fetch_user().await? {
                Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
                None => {
                    if !navigate(client, client.require_auth()) {
                        println!("Current user unavailable");
                    }
                }
            }
        }
        Command::Logout => {
            let navigation = client.logout().await;
            println!("Signed out");
            navigate(client, navigation);
        }
        Command::Request {
            method,
            endpoint,
            body,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method {}", method))?;
            let mut options = RequestOptions::new(method);
            if let Some(body) = body {
                options = options.json(serde_json::from_str(&body).context("Request body is not valid JSON")?);
            }

            let response = client.api_request(&endpoint, options).await?;
            let navigation = response.navigation();
            println!("{}", response.status());
            println!("{}", response.text().await?);
            navigate(client, navigation);
        }
        Command::Guard { kind } => {
            let navigation = match kind {
                GuardKind::Auth => client.require_auth(),
                GuardKind::Superuser => client.require_superuser(),
                GuardKind::Guest => client.redirect_if_authenticated(),
            };
            if !navigate(client, navigation) {
                println!("allowed");
            }
        }
    }
    Ok(())
}

/// Print the path for a redirect intent. Returns true when one was issued.
fn navigate(client: &SessionClient, navigation: Navigation) -> bool {
    match client.config().routes.path_for(navigation) {
        Some(path) => {
            println!("-> {}", path);
            true
        }
        None => false,
    }
}

fn describe_user(client: &SessionClient) -> String {
    client
        .user()
        .and_then(|u| u.email().or(u.name()))
        .unwrap_or("unknown user")
        .to_string()
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

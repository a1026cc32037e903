//! Ultra - a terminal music player for your local audio files, behind a login screen

mod audio;
mod config;
mod core;
mod models;
mod store;
mod ui;
mod utils;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Ultra - terminal music player
#[derive(Parser, Debug)]
#[command(name = "ultra")]
#[command(version = "1.0.0")]
#[command(about = "A terminal music player for your local audio files")]
struct Args {
    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to load when the player opens
    #[arg(long)]
    music_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account without the interactive screens
    Signup(AccountArgs),

    /// Set a new password for an existing account
    ResetPassword(AccountArgs),
}

#[derive(clap::Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,

    /// Defaults to the password itself
    #[arg(long)]
    confirm: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };

    // RUST_LOG wins; otherwise keep the audio decoders quiet
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "{},symphonia=error,symphonia_core=error,symphonia_bundle_mp3=error,lofty=error,rodio=error",
            log_level
        ))
    });

    // logs go to stderr so they never mix with prompts
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("Ultra v1.0.0 starting...");

    let paths = config::Paths::init(args.config)?;
    info!("Config directory: {:?}", paths.config_dir());

    let mut user_config = config::UserConfig::load()?;
    if let Some(dir) = args.music_dir {
        user_config.music_dir = Some(dir.to_string_lossy().to_string());
    }

    let auth = core::AuthService::new(&paths, &user_config);

    if let Some(command) = args.command {
        return run_account_command(&auth, command);
    }

    let restored = auth.restore_session(Utc::now());
    let app = ui::App::new(auth, user_config, ui::RodioFactory);
    let mut console = ui::console::Console::stdio();
    app.run(&mut console, restored).await
}

fn run_account_command(auth: &core::AuthService, command: Command) -> Result<()> {
    match command {
        Command::Signup(account) => {
            let confirm = account.confirm.as_deref().unwrap_or(&account.password);
            auth.signup(&account.username, &account.password, confirm)
                .with_context(|| format!("Could not create user '{}'", account.username))?;
            println!("Registration successful: {}", account.username);
        }
        Command::ResetPassword(account) => {
            let confirm = account.confirm.as_deref().unwrap_or(&account.password);
            auth.reset_password(&account.username, &account.password, confirm)
                .with_context(|| format!("Could not reset password for '{}'", account.username))?;
            println!("Password reset successfully for user: {}", account.username);
        }
    }
    Ok(())
}

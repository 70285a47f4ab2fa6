use std::path::PathBuf;

use anyhow::Result;
use buyersnet_core::access::{Permission, Role};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "buyersnet")]
#[command(about = "BuyersNet CLI - access gating and message notifications", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overrides RUST_LOG and the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the role → permission table as JSON
    Permissions {
        /// Only this role
        #[arg(long)]
        role: Option<Role>,
    },
    /// Evaluate a requirement for a role without any refresh
    Check {
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        required_role: Option<Role>,
        #[arg(long)]
        permission: Option<Permission>,
    },
    /// Run the access gate against an in-memory session
    Gate {
        /// Role in the member's cached profile; omit for a signed-out visitor
        #[arg(long)]
        role: Option<Role>,
        /// Role held on the server, picked up by the gate's refresh
        #[arg(long)]
        server_role: Option<Role>,
        #[arg(long)]
        required_role: Option<Role>,
        #[arg(long)]
        permission: Option<Permission>,
        /// Render the forbidden view instead of redirecting
        #[arg(long)]
        show_forbidden: bool,
    },
    /// Deliver one message to a member and report the notifications
    Notify {
        #[arg(long, default_value = "member")]
        user: String,
        #[arg(long, default_value = "Alice")]
        from: String,
        #[arg(long)]
        message: String,
        /// The member has the conversation open
        #[arg(long)]
        open: bool,
        /// The app window is in the background
        #[arg(long)]
        background: bool,
    },
    /// Manage config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let storage = commands::config::storage(cli.config.clone())?;
    let config = storage.load()?;

    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Permissions { role } => commands::permissions::table(role)?,
        Commands::Check {
            role,
            required_role,
            permission,
        } => commands::permissions::check(role, required_role, permission)?,
        Commands::Gate {
            role,
            server_role,
            required_role,
            permission,
            show_forbidden,
        } => {
            commands::gate::run(
                &config.gate,
                commands::gate::GateArgs {
                    role,
                    server_role,
                    required_role,
                    permission,
                    show_forbidden,
                },
            )
            .await?
        }
        Commands::Notify {
            user,
            from,
            message,
            open,
            background,
        } => {
            commands::notify::run(
                &config.notifier,
                commands::notify::NotifyArgs {
                    user,
                    from,
                    message,
                    open,
                    background,
                },
            )
            .await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config)?,
            ConfigAction::Init => commands::config::init(&storage)?,
            ConfigAction::Path => println!("{}", storage.path().display()),
        },
    }

    Ok(())
}

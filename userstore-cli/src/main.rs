mod ops;

use clap::{Parser, Subcommand};
use ops::{
    create_user, init_superuser, list_users, purge_tokens, set_active, show_user, validate_email,
    OutputFormat, Store,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use userstore_core::schemas::UserCreate;
use userstore_core::Settings;

/// Admin CLI over the userstore document store.
#[derive(Parser)]
#[command(name = "userstore", author, version, about = "User store administration")]
struct Cli {
    /// Data directory; overrides US_DATA_DIR
    #[arg(long, env = "US_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the first superuser from US_FIRST_SUPERUSER
    Init,
    /// List users
    List {
        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u64,
        /// Ignore paging and list everyone
        #[arg(long)]
        all: bool,
    },
    /// Show one user
    Show {
        #[arg(long, short)]
        email: String,
    },
    /// Create a user
    Create {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        superuser: bool,
    },
    /// Enable or disable an account
    SetActive {
        #[arg(long, short)]
        email: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Mark a user's email as validated
    ValidateEmail {
        #[arg(long, short)]
        email: String,
    },
    /// Delete expired refresh tokens
    PurgeTokens,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    tracing::debug!(data_dir = %settings.data_dir.display(), "opening store");
    let store = Store::open(settings);

    match cli.command {
        Commands::Init => init_superuser(&store, cli.output).await?,
        Commands::List { page, all } => list_users(&store, page, all, cli.output).await?,
        Commands::Show { email } => show_user(&store, &email, cli.output).await?,
        Commands::Create {
            email,
            password,
            full_name,
            superuser,
        } => {
            let user_in = UserCreate {
                password,
                full_name: full_name.unwrap_or_default(),
                is_superuser: superuser,
                ..UserCreate::new(email)
            };
            create_user(&store, user_in, cli.output).await?
        }
        Commands::SetActive { email, active } => {
            set_active(&store, &email, active, cli.output).await?
        }
        Commands::ValidateEmail { email } => validate_email(&store, &email, cli.output).await?,
        Commands::PurgeTokens => purge_tokens(&store, cli.output).await?,
    }

    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses() {
        let cli = Cli::parse_from(["userstore", "list", "--all"]);
        assert!(matches!(cli.command, Commands::List { page: 0, all: true }));

        let cli = Cli::parse_from([
            "userstore",
            "--output",
            "json",
            "set-active",
            "--email",
            "a@example.com",
            "--active",
            "false",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::SetActive { active: false, .. }));
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use docket_cli::admin::{create_admin, set_role};
use docket_config::StorageConfig;
use docket_db::{PgDocumentRepository, init_db_pool, run_migrations};
use docket_models::{User, UserRole};

#[derive(Parser)]
#[command(name = "docket-cli")]
#[command(about = "Docket CLI - Administrative tools for Docket", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Username
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Grant the ADMIN role to an existing user
    Promote {
        username: String,
    },
    /// Return an admin to the USER role
    Demote {
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let storage = StorageConfig::from_env().map_err(anyhow::Error::msg)?;
    let pool = init_db_pool(&storage)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    let users = PgDocumentRepository::<User>::new(pool);

    match cli.command {
        Commands::CreateAdmin { username, password } => {
            let username = match username {
                Some(username) => username,
                None => Input::<String>::new()
                    .with_prompt("Username")
                    .interact_text()
                    .context("Failed to read username")?,
            };

            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()
                    .context("Failed to read password")?,
            };

            let admin = create_admin(&users, &username, &password).await?;
            println!("\n✅ Admin created successfully!");
            println!("   Username: {}", admin.username);
            println!("   ID: {}", admin.id);
        }
        Commands::Promote { username } => {
            let user = set_role(&users, &username, UserRole::Admin).await?;
            println!("✅ {} is now {}", user.username, user.role);
        }
        Commands::Demote { username } => {
            let user = set_role(&users, &username, UserRole::User).await?;
            println!("✅ {} is now {}", user.username, user.role);
        }
    }

    Ok(())
}

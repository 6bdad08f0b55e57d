use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use classaccess_cli::{StaffAccount, create_staff_user, purge_expired_tokens};
use classaccess_config::DatabaseConfig;
use classaccess_core::Role;
use classaccess_core::password::HASH_COST;
use classaccess_db::{PgStore, init_db_pool};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "classaccess-cli")]
#[command(about = "ClassAccess CLI - account provisioning and maintenance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StaffRole {
    Admin,
    Teacher,
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Admin => Role::Admin,
            StaffRole::Teacher => Role::Teacher,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator or teacher account
    CreateUser {
        #[arg(short = 'r', long, value_enum, default_value = "admin")]
        role: StaffRole,

        /// First name
        #[arg(short = 'n', long)]
        nombre: Option<String>,

        /// Paternal surname
        #[arg(long)]
        ap: Option<String>,

        /// Maternal surname
        #[arg(long)]
        am: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        correo: Option<String>,

        /// Password (prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Employee number presented to classroom devices (teachers only)
        #[arg(long)]
        employee_number: Option<String>,
    },
    /// Delete expired refresh tokens
    PurgeTokens,
}

fn prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::<String>::new()
            .with_prompt(label)
            .interact_text()
            .with_context(|| format!("Failed to read {label}")),
    }
}

fn prompt_optional(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("Failed to read {label}")),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = init_db_pool(&DatabaseConfig::from_env()?)
        .await
        .context("Failed to connect to database")?;
    let store = PgStore::new(pool.clone());

    match cli.command {
        Commands::CreateUser {
            role,
            nombre,
            ap,
            am,
            correo,
            password,
            employee_number,
        } => {
            let role = Role::from(role);
            let employee_number = match (role, employee_number) {
                (Role::Teacher, None) => Some(prompt(None, "Employee number")?),
                (_, number) => number,
            };
            let account = StaffAccount {
                nombre: prompt(nombre, "First name")?,
                ap: prompt(ap, "Paternal surname")?,
                am: prompt_optional(am, "Maternal surname")?,
                correo: prompt(correo, "Email address")?,
                password: match password {
                    Some(password) => password,
                    None => Password::new()
                        .with_prompt("Password")
                        .with_confirmation("Confirm password", "Passwords don't match")
                        .interact()
                        .context("Failed to read password")?,
                },
                role,
                employee_number,
            };

            let user = create_staff_user(&store, account, HASH_COST)
                .await
                .map_err(|err| err.error)?;
            println!("\n✅ {} account created", user.priv_usu);
            println!("   Id: {}", user.id_usu);
            println!("   Email: {}", user.correo_usu);
        }
        Commands::PurgeTokens => {
            let purged = purge_expired_tokens(&store)
                .await
                .map_err(|err| err.error)?;
            println!("🧹 Purged {purged} expired refresh token(s)");
        }
    }

    pool.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\n❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

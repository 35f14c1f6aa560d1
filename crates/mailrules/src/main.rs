//! `MailRules` - manage email accounts and their filtering rules
//!
//! Command-line front end over `mailrules-core`. Results are printed to
//! stdout as JSON; logs go to stderr.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use mailrules_core::config::{self, Settings};
use mailrules_core::security::keystore;
use mailrules_core::service::{
    ConnectionInput, CredentialsInput, NewAccountInput, NewRuleInput, UpdateRuleInput,
};
use mailrules_core::{AccountRepository, AccountService, AesGcmCipher};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{AccountCommand, Cli, Command, KeyCommand, PASSWORD_ENV, RuleCommand};

type Service = AccountService<AccountRepository, AesGcmCipher>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailrules=info,mailrules_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_settings_path);
    let settings = Settings::load(&settings_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    match cli.command {
        Command::Key { command } => run_key(command),
        Command::Account { command } => {
            let service = open_service(cli.database.as_deref(), &settings).await?;
            run_account(&service, command).await
        }
        Command::Rule { command } => {
            let service = open_service(cli.database.as_deref(), &settings).await?;
            run_rule(&service, command).await
        }
    }
}

/// Open the database and build the service with the configured key.
async fn open_service(database: Option<&Path>, settings: &Settings) -> Result<Service> {
    let db_path = database.map_or_else(|| settings.database_path(), Path::to_path_buf);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let db_path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;

    info!("Opening database {}", db_path.display());
    let repo = AccountRepository::new(db_path_str)
        .await
        .context("Failed to open database")?;

    let secret = settings.encryption_secret()?;
    let cipher = AesGcmCipher::from_secret(&secret)?;

    Ok(AccountService::new(repo, cipher))
}

async fn run_account(service: &Service, command: AccountCommand) -> Result<()> {
    match command {
        AccountCommand::Create(args) => {
            let password = args.read_password(
                std::env::var(PASSWORD_ENV).ok(),
                std::io::stdin().lock(),
            )?;
            let input = NewAccountInput {
                name: args.name,
                credentials: CredentialsInput {
                    email: args.email,
                    password,
                },
                connection: ConnectionInput {
                    host: args.host,
                    port: args.port,
                    protocol: args.protocol,
                },
            };
            print_json(&service.create_account(&input).await?)
        }
        AccountCommand::List => print_json(&service.find_all().await?),
        AccountCommand::Show { id } => print_json(&service.find_by_id(id).await?),
    }
}

async fn run_rule(service: &Service, command: RuleCommand) -> Result<()> {
    match command {
        RuleCommand::Create {
            account,
            name,
            description,
            action,
            criteria,
            folders,
        } => {
            let input = NewRuleInput {
                name,
                description,
                action,
                criteria,
                move_folders: folders.into_new(),
            };
            print_json(&service.create_rule(account, &input).await?)
        }
        RuleCommand::Update {
            account,
            rule,
            name,
            description,
            action,
            criteria,
            folders,
        } => {
            let input = UpdateRuleInput {
                name,
                description,
                action,
                criteria,
                move_folders: folders.into_update(),
            };
            print_json(&service.update_rule(account, rule, &input).await?)
        }
        RuleCommand::Delete { account, rule } => {
            service.delete_rule(account, rule).await?;
            print_json(&serde_json::json!({ "deleted": rule }))
        }
    }
}

fn run_key(command: KeyCommand) -> Result<()> {
    match command {
        KeyCommand::Generate { store } => {
            let secret = keystore::generate_encryption_key()?;
            if store {
                keystore::store_encryption_key(&secret)?;
                print_json(&serde_json::json!({ "stored": true }))
            } else {
                print_json(&serde_json::json!({ "key": secret }))
            }
        }
        KeyCommand::Store { secret } => {
            keystore::store_encryption_key(&secret)?;
            print_json(&serde_json::json!({ "stored": true }))
        }
        KeyCommand::Forget => {
            keystore::delete_encryption_key()?;
            print_json(&serde_json::json!({ "stored": false }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

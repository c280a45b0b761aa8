//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use ecom_http::storage::{AUTH_STORAGE_KEY, FileStore, StoredAuthToken};
use ecom_http::types::{LoginRequest, PageQuery, SortOrder};
use ecom_http::{ApiClient, ClientSettings, KeyValueStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// GET an API path and print the JSON response
    Get {
        /// Path relative to the API base URL, e.g. /public/products
        path: String,
    },

    /// List products
    Products {
        /// Only products in this category
        #[arg(long, conflicts_with = "keyword")]
        category: Option<i64>,

        /// Only products matching this keyword
        #[arg(long)]
        keyword: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List categories
    Categories {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Sign in and store the login record locally
    Login {
        username: String,

        #[arg(long, env = "ECOM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and remove the stored login record
    Logout,

    /// Show the stored login record
    Status,

    /// Settings file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,

    /// Write a default settings file
    Init {
        /// Output file path (defaults to <data dir>/ecom.toml)
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
pub struct PageArgs {
    /// Page number, starting at 0
    #[arg(long)]
    page: Option<u32>,

    /// Page size
    #[arg(long)]
    size: Option<u32>,

    /// Field to sort by
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,
}

impl From<PageArgs> for PageQuery {
    fn from(args: PageArgs) -> Self {
        Self {
            page_number: args.page,
            page_size: args.size,
            sort_by: args.sort_by,
            sort_order: args.desc.then_some(SortOrder::Desc),
        }
    }
}

impl Commands {
    pub async fn execute(self, settings: ClientSettings) -> Result<()> {
        let store = Arc::new(FileStore::in_dir(settings.resolved_state_dir()));
        let client = ApiClient::from_settings(&settings, store.clone())
            .context("Failed to create API client")?;

        match self {
            Self::Get { path } => {
                let value: serde_json::Value = client.get(&path).await?;
                print_json(&value)
            }
            Self::Products {
                category,
                keyword,
                page,
            } => {
                let query = PageQuery::from(page);
                let products = match (category, keyword) {
                    (Some(category), _) => client.products_by_category(category, &query).await?,
                    (None, Some(keyword)) => client.search_products(&keyword, &query).await?,
                    (None, None) => client.products(&query).await?,
                };
                print_json(&products)
            }
            Self::Categories { page } => {
                let categories = client.categories(&PageQuery::from(page)).await?;
                print_json(&categories)
            }
            Self::Login { username, password } => login(&client, &store, username, password).await,
            Self::Logout => logout(&client, &store).await,
            Self::Status => {
                println!("{}", login_status(&store));
                Ok(())
            }
            Self::Config { command } => command.execute(&settings),
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, settings: &ClientSettings) -> Result<()> {
        match self {
            Self::Show => print_json(settings),
            Self::Init { output } => {
                let path = output
                    .unwrap_or_else(|| settings.resolved_state_dir().join(config::SETTINGS_FILE));
                config::generate_default_settings(&path)?;
                info!("Default settings written to {}", path.display());
                Ok(())
            }
        }
    }
}

async fn login(
    client: &ApiClient,
    store: &FileStore,
    username: String,
    password: String,
) -> Result<()> {
    let user = client
        .sign_in(&LoginRequest { username, password })
        .await
        .context("Sign-in failed")?;

    if user.jwt_token.is_some() {
        store.set_item(AUTH_STORAGE_KEY, &serde_json::to_string(&user)?)?;
    } else {
        warn!("Server did not return a token; nothing stored");
    }

    info!(username = %user.username, "Signed in");
    print_json(&user)
}

async fn logout(client: &ApiClient, store: &FileStore) -> Result<()> {
    if let Err(e) = client.sign_out().await {
        warn!("Server sign-out failed: {e}");
    }
    store.remove_item(AUTH_STORAGE_KEY)?;
    info!("Signed out");
    Ok(())
}

/// Describe the stored login record
fn login_status(store: &FileStore) -> String {
    let path = store.path().display();

    match StoredAuthToken::new(store).load_record() {
        Ok(Some(record)) => {
            let username = record
                .extra
                .get("username")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<unknown>");
            format!("Signed in as {username} ({path})")
        }
        Ok(None) => format!("Not signed in ({path})"),
        Err(e) => format!("Stored login record is unusable: {e} ({path})"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! loremo-admin command-line client.
//!
//! Thin command surface over the library: every command goes through the
//! same token store, refresh-and-retry client and cursor bridge that the
//! back-office views use.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use loremo_admin::api::{ChannelQuery, ChannelsApi, UsersApi};
use loremo_admin::auth::{ErrorAction, FileTokenStore, Session};
use loremo_admin::config::{load_or_default, ClientConfig};
use loremo_admin::data::{DataProvider, Filter, ListParams, ListResponse, SortOrder};
use loremo_admin::observability::logging::init_logging;
use loremo_admin::{ApiClient, ApiError, TtlCache};

#[derive(Parser)]
#[command(name = "loremo-admin")]
#[command(about = "Command-line access to the Loremo back office", long_about = None)]
struct Cli {
    /// Path of the TOML configuration file.
    #[arg(short, long, default_value = "loremo-admin.toml")]
    config: PathBuf,

    /// Override `api.base_url`.
    #[arg(long, env = "LOREMO_API_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with the admin password
    Login {
        #[arg(long, env = "LOREMO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show session state
    Status,
    /// List one page of a resource
    List {
        resource: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one record
    Show { resource: String, id: String },
    /// Delete one record
    Delete { resource: String, id: String },
    /// List publishing channels
    Channels {
        /// Bypass the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Grant experience points to a user
    GiveXp { user: String, xp: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    init_logging(&config.observability.log_level);

    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded");

    let tokens = Arc::new(FileTokenStore::new(
        &config.auth.token_path,
        &config.auth.token_key,
    ));
    let client = ApiClient::new(&config.api, tokens)?;
    let session = Session::new(client.clone());

    let result = run(cli.command, &config, client, &session).await;
    if let Err(e) = &result {
        if session.handle_error(e)? == ErrorAction::ForceLogout {
            eprintln!("Session expired; run `loremo-admin login` again.");
        }
    }
    result.map_err(Into::into)
}

async fn run(
    command: Commands,
    config: &ClientConfig,
    client: ApiClient,
    session: &Session,
) -> Result<(), ApiError> {
    match command {
        Commands::Login { password } => {
            session.login(&password).await?;
            println!("Logged in");
        }
        Commands::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Commands::Status => {
            print_json(&json!({
                "base_url": client.base_url().as_str(),
                "auth": session.check(),
                "identity": session.identity(),
            }))?;
        }
        Commands::List {
            resource,
            page,
            page_size,
            sort,
            order,
            search,
        } => {
            let mut params = ListParams::new()
                .page_size(page_size.unwrap_or(config.pagination.default_page_size));
            if let Some(field) = sort {
                params = params.sort(field, order);
            }
            if let Some(text) = search {
                params = params.filter(Filter::search(text));
            }

            let provider = DataProvider::new(client);
            let response = walk_to_page(&provider, &resource, params, page).await?;
            print_json(&response)?;
        }
        Commands::Show { resource, id } => {
            let provider = DataProvider::new(client);
            print_json(&provider.get_one(&resource, &id).await?)?;
        }
        Commands::Delete { resource, id } => {
            let provider = DataProvider::new(client);
            print_json(&provider.delete_one(&resource, &id).await?)?;
        }
        Commands::Channels { refresh } => {
            let channels = ChannelsApi::with_cache(
                client,
                TtlCache::new(),
                Duration::from_millis(config.cache.default_ttl_ms),
            );
            let query = ChannelQuery {
                force_refresh: refresh,
                ..ChannelQuery::default()
            };
            print_json(&channels.fetch_channels(&query).await?)?;
        }
        Commands::GiveXp { user, xp } => {
            let users = UsersApi::new(client);
            print_json(&users.increment_user_xp(&user, xp).await?)?;
        }
    }
    Ok(())
}

/// Fetch pages 1..=target in order so the target page's cursor is known.
///
/// Stops early with an empty page when the backend runs out of pages.
async fn walk_to_page(
    provider: &DataProvider,
    resource: &str,
    params: ListParams,
    target: u32,
) -> Result<ListResponse, ApiError> {
    let target = target.max(1);
    let mut current = 1;
    loop {
        let page_params = params.clone().page(current);
        let response = provider.get_list(resource, &page_params).await?;
        if current == target {
            return Ok(response);
        }
        if provider.highest_known_page(resource, &page_params) <= current {
            tracing::info!(resource, last_page = current, "No more pages");
            return Ok(ListResponse {
                total: response.total,
                data: Vec::new(),
            });
        }
        current += 1;
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

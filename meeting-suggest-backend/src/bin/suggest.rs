use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meeting_suggest_backend::{AppError, PgSuggestions, SuggestionCache};
use meeting_suggest_config::get_config;
use meeting_suggest_database::get_database_connection;
use meeting_suggest_optimizer::{MeetingId, PriorityPolicy, SuggestionInput};
use meeting_suggest_telemetry::setup_telemetry;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "suggest")]
#[command(about = "Suggest which participant meets at which proposed time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored suggestion, computing and storing it first if there is none.
    Get {
        meeting_id: i32,
        /// `invitee_order` or `invitee_priorities`.
        policy: PriorityPolicy,
    },
    /// Recompute from the current responses and replace both stored suggestions.
    Regenerate {
        meeting_id: i32,
        policy: PriorityPolicy,
    },
    /// Forget every stored suggestion of a meeting.
    Invalidate { meeting_id: i32 },
    /// Run on a JSON input file without touching the database.
    Compute {
        input: PathBuf,
        policy: Option<PriorityPolicy>,
    },
}

fn print(value: &impl Serialize) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cache(
    database_url: Option<&str>,
    pool_max_size: usize,
) -> Result<SuggestionCache<PgSuggestions, PgSuggestions>, AppError> {
    let database_url = database_url.ok_or(AppError::DatabaseNotConfigured)?;
    let suggestions = PgSuggestions::new(get_database_connection(database_url, pool_max_size)?);
    Ok(SuggestionCache::new(suggestions.clone(), suggestions))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = get_config()?;
    setup_telemetry(&config.log_filter)?;

    let database_url = config.database_url.as_deref();
    match cli.command {
        Command::Get { meeting_id, policy } => {
            let cache = cache(database_url, config.pool_max_size)?;
            print(&cache.get_or_compute(MeetingId(meeting_id), policy).await?)
        }
        Command::Regenerate { meeting_id, policy } => {
            let cache = cache(database_url, config.pool_max_size)?;
            print(&cache.regenerate(MeetingId(meeting_id), policy).await?)
        }
        Command::Invalidate { meeting_id } => {
            let cache = cache(database_url, config.pool_max_size)?;
            let removed = cache.invalidate(MeetingId(meeting_id)).await?;
            info!(meeting_id, removed, "invalidated");
            Ok(())
        }
        Command::Compute { input, policy } => {
            let input: SuggestionInput = serde_json::from_slice(&tokio::fs::read(input).await?)?;
            match policy {
                Some(policy) => print(&input.suggest(policy)?),
                None => print(&input.suggest_both()?),
            }
        }
    }
}

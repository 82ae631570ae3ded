use meeting_suggest_config::ConfigError;
use meeting_suggest_database::DatabaseError;
use meeting_suggest_optimizer::{InputError, MeetingId};
use meeting_suggest_telemetry::TelemetryError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("meeting {0} not found")]
    MeetingNotFound(MeetingId),
    #[error("stored suggestion for meeting {meeting_id} is unusable: {reason}")]
    CorruptSuggestion {
        meeting_id: MeetingId,
        reason: String,
    },
    #[error("no database_url configured")]
    DatabaseNotConfigured,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;

// Wire definitions shared with the classification service
pub use interfaces::defs::{ApiResponse, CharacterField, Rating, TagPayload, TagResponse, UploadPayload, UploadResponse, WireTag};

pub const MAINTENANCE_MESSAGE: &str = "The server is currently under maintenance or is down.";
pub const RATE_LIMITED_MESSAGE: &str = "You're sending too many requests. Please try again later.";
pub const NOT_FOUND_MESSAGE: &str = "The requested image could not be found. Please upload it again.";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "The file size is too large.";
pub const GENERIC_ERROR_MESSAGE: &str = "Unknown error. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagScore {
    pub label: String,
    pub score: f64,
}

impl TagScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

impl From<WireTag> for TagScore {
    fn from((label, score): WireTag) -> Self {
        Self { label, score }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CharacterTags {
    Scored(Vec<TagScore>),
    Text(String),
}

impl From<CharacterField> for CharacterTags {
    fn from(field: CharacterField) -> Self {
        match field {
            CharacterField::Scored(tags) => CharacterTags::Scored(tags.into_iter().map(TagScore::from).collect()),
            CharacterField::Text(text) => CharacterTags::Text(text),
        }
    }
}

/// Where the image of a resolved item can be found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// Base64 encoded bytes returned inline by the service.
    Inline(String),
    /// No bytes were inlined; the identifier addresses the stored upload.
    ContentAddress(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub id: String,
    pub image_ref: ImageRef,
    pub general_tags: Vec<TagScore>,
    pub character_tags: CharacterTags,
    pub rating: Rating,
    pub blur: bool,
    pub attempts: u32,
    pub resolved_at: DateTime<Utc>,
}

impl ItemResult {
    /// Builds the result for `requested_id`. Blur defaults to on for explicit ratings.
    pub fn from_payload(requested_id: &str, payload: TagPayload, attempts: u32) -> Self {
        let id = if payload.id.is_empty() {
            requested_id.to_string()
        } else {
            payload.id
        };
        let image_ref = match payload.image {
            Some(encoded) if !encoded.is_empty() => ImageRef::Inline(encoded),
            _ => ImageRef::ContentAddress(id.clone()),
        };

        Self {
            id,
            image_ref,
            general_tags: payload.general.into_iter().map(TagScore::from).collect(),
            character_tags: payload.character.into(),
            blur: payload.rating == Rating::Explicit,
            rating: payload.rating,
            attempts,
            resolved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited,

    #[error("{}", MAINTENANCE_MESSAGE)]
    Maintenance,

    #[error("{0}")]
    Unknown(String),
}

impl FailureReason {
    pub fn unknown(message: Option<&str>) -> Self {
        match message.map(str::trim) {
            Some(message) if !message.is_empty() => FailureReason::Unknown(message.to_string()),
            _ => FailureReason::Unknown(GENERIC_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Terminal outcome of one identifier. Pending items are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ItemOutcome {
    Ready(ItemResult),
    Failed(FailureReason),
}

impl ItemOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ItemOutcome::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&ItemResult> {
        match self {
            ItemOutcome::Ready(result) => Some(result),
            ItemOutcome::Failed(_) => None,
        }
    }

    pub fn as_ready_mut(&mut self) -> Option<&mut ItemResult> {
        match self {
            ItemOutcome::Ready(result) => Some(result),
            ItemOutcome::Failed(_) => None,
        }
    }
}

/// Everything a single lookup attempt can come back with.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Ready(TagPayload),
    Failure(TransportFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// 202: the service is still classifying the image.
    Processing,
    /// Any other non-success status, with the envelope message if one was readable.
    Status { code: u16, message: Option<String> },
    /// The request never produced a response.
    Network { detail: String },
    /// A success status whose body carried no usable result.
    Malformed { message: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEnvironment {
    Production,
    Development,
}

impl ApiEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            ApiEnvironment::Production => "https://api.ekonomi.moe",
            ApiEnvironment::Development => "https://devapi.ekonomi.moe",
        }
    }

    /// Development when `DEVELOPMENT_MODE=1` or `NODE_ENV=development`.
    pub fn from_env() -> Self {
        let dev_mode = env::var("DEVELOPMENT_MODE").map(|v| v == "1").unwrap_or(false);
        let node_dev = env::var("NODE_ENV").map(|v| v == "development").unwrap_or(false);
        if dev_mode || node_dev {
            ApiEnvironment::Development
        } else {
            ApiEnvironment::Production
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_upload_files: usize,
}

impl FetchConfig {
    pub fn for_environment(environment: ApiEnvironment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            ..Default::default()
        }
    }

    /// Environment defaults, with `TAG_BATCH_API_BASE` taking precedence.
    pub fn from_env() -> Self {
        let mut config = Self::for_environment(ApiEnvironment::from_env());
        if let Ok(base_url) = env::var("TAG_BATCH_API_BASE") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim().to_string();
            }
        }
        config
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: ApiEnvironment::Production.base_url().to_string(),
            user_agent: "Tag-Batch/1.0".to_string(),
            timeout_seconds: 30,
            max_attempts: 10,
            retry_delay_ms: 1000,
            max_upload_files: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TagBatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("You can only upload up to {max} files at once.")]
    TooManyFiles { max: usize },

    #[error("{}", PAYLOAD_TOO_LARGE_MESSAGE)]
    PayloadTooLarge,

    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited,

    #[error("{}", MAINTENANCE_MESSAGE)]
    Maintenance,

    #[error("Unknown error, but here's the http status code: {status}")]
    UnexpectedStatus { status: u16 },

    #[error("{0}")]
    Service(String),

    #[error("Batch {generation} was superseded by batch {current}")]
    Superseded { generation: u64, current: u64 },

    #[error("A batch needs at least one identifier")]
    EmptyBatch,

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, TagBatchError>;

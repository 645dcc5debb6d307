use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Tracking number not found: {tracking_number}")]
    NotFound { tracking_number: String },

    #[error("Could not determine carrier for '{input}'")]
    CourierUnknown { input: String },

    #[error("Tracking service unavailable: {message}")]
    Upstream { message: String },

    #[error("Unsupported inquiry recipient '{value}' (expected 'courier' or 'seller')")]
    UnsupportedRecipient { value: String },

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Policy file error: {0}")]
    PolicyParse(#[from] toml::de::Error),
}

impl From<reqwest::Error> for TrackError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        TrackError::Upstream { message }
    }
}

impl TrackError {
    /// Short hint shown to the user alongside the error message.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TrackError::NotFound { .. } => {
                "Double-check the tracking number for typos, or ask the seller to confirm it"
            }
            TrackError::CourierUnknown { .. } => {
                "Specify the carrier explicitly (e.g. --carrier cj or --carrier 04)"
            }
            TrackError::Upstream { .. } => {
                "The tracking service may be temporarily down; try again in a few minutes"
            }
            TrackError::UnsupportedRecipient { .. } => "Use 'courier' or 'seller'",
            TrackError::MissingConfig { .. } | TrackError::InvalidConfigValue { .. } => {
                "Check the command-line flags and the SWEET_TRACKER_API_KEY environment variable"
            }
            TrackError::PolicyParse(_) => "Check the policy file syntax",
            TrackError::Io(_) | TrackError::Serialization(_) => "Check the input and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;

use thiserror::Error;

/// Failure modes of a single watch cycle.
///
/// Every variant is cycle-local: the run loop logs it and waits for the next
/// tick, with the watermark left untouched.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("version fetch failed: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("version response is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("version response has no string field {field:?}")]
    MissingField { field: String },

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("notification delivery failed: {source}")]
    Delivery {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl WatchError {
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn store(context: &'static str, source: anyhow::Error) -> Self {
        Self::Store {
            context,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn delivery(source: anyhow::Error) -> Self {
        Self::Delivery {
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;

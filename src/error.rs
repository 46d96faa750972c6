use thiserror::Error;

/// Domain failures of a scoring run. Every variant is fatal to the run.
#[derive(Debug, Clone, Error)]
pub enum RiskError {
    #[error("missing signal: {0}")]
    MissingSignal(String),

    #[error("invalid signal {name}: {value} is not a finite number")]
    InvalidSignal { name: String, value: f64 },

    #[error("configuration error in {field}: {reason}")]
    Configuration { field: String, reason: String },
}

impl RiskError {
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

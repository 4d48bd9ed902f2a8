use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinCalcError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// One or more range checks failed; each entry is a human-readable finding.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinCalcError {
    /// Validation findings carried by this error, if any.
    pub fn findings(&self) -> &[String] {
        match self {
            FinCalcError::Validation(findings) => findings,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for FinCalcError {
    fn from(e: serde_json::Error) -> Self {
        FinCalcError::SerializationError(e.to_string())
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Malformed delimited input: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },
}

impl BalanceError {
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        BalanceError::Overflow {
            context: context.into(),
        }
    }
}

impl From<csv::Error> for BalanceError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Io(io) => BalanceError::Io(io.to_string()),
            _ => BalanceError::Decode(e.to_string()),
        }
    }
}

impl From<std::io::Error> for BalanceError {
    fn from(e: std::io::Error) -> Self {
        BalanceError::Io(e.to_string())
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvergeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rule {rule_id} can be classified auto-fixable but has no fixer entry")]
    FixerTableMismatch { rule_id: String },
    #[error("fix for rule {rule_id} changed the row count from {before} to {after}")]
    RowCountChanged {
        rule_id: String,
        before: usize,
        after: usize,
    },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ConvergeError>;

// Error taxonomy for feed ingestion and snapshot lookups.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Invalid date: year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Invalid series variable '{0}', must be one of: cases, deaths")]
    InvalidVariableName(String),

    #[error("Duplicate region: country '{code}' already exists in continent '{existing}', feed places it in '{requested}'")]
    DuplicateRegion {
        code: String,
        existing: String,
        requested: String,
    },

    #[error("Region not found: {0}")]
    MissingRegion(String),

    #[error("Malformed row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;

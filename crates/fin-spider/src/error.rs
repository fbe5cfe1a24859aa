use crate::statements::Period;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or file failure while reading a statement page.
    #[error("failed to load page {location}, error({reason})")]
    Fetch { location: String, reason: String },

    #[error("no table contains \"{search_term}\"")]
    TableNotFound { search_term: String },

    #[error("table containing \"{search_term}\" has no data columns")]
    MalformedTable { search_term: String },

    #[error("table containing \"{search_term}\" has non-year columns {columns:?}")]
    InsufficientData {
        search_term: String,
        columns: Vec<String>,
    },

    #[error("ticker and period must match: expected [{expected_ticker}] {expected_period}, found [{found_ticker}] {found_period}")]
    IdentityMismatch {
        expected_ticker: String,
        expected_period: Period,
        found_ticker: String,
        found_period: Period,
    },

    #[error("no resource stored at {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Db(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Pool(#[from] deadpool_postgres::PoolError),
}

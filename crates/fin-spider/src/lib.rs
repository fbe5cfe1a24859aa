mod error;
pub(crate) mod tui;

pub use error::{Error, Result};

/// Reading a statement page, over HTTP from WSJ or from a local mirror of it.
pub mod fetch;

/// Finding a statement table within raw markup, and cleaning it into a [`table::PeriodTable`].
pub mod locate;

/// WSJ overview page; the "key stock data" drawer.
pub mod overview;

/// Row-labelled, period-columned numeric tables.
pub mod table;

/// Statement kinds, reporting periods, the search configuration, and the
/// [`statements::FinancialStatementSet`] along with its merge.
pub mod statements;

/// Builds a [`statements::FinancialStatementSet`] from fetched pages.
pub mod assemble;

/// File-system resource store.
pub mod fs;

/// Daily price history from the Yahoo Finance chart API.
pub mod prices;

/// Cross-ticker summary tables (listed companies, valuation snapshots), stored as CSV.
pub mod summary;

/// Batch jobs over many tickers: scrape, merge, and save.
pub mod download;

/// Optional relational persistence in PostgreSQL.
pub mod db;

pub mod key_tracker;

/// Shortcut for required API elements.
pub mod http {
    pub use dotenv::var;
    pub use reqwest::Client as HttpClient;
    pub use tokio_postgres::Client as PgClient;
}

/// Build the default HTTP client, identifying with `USER_AGENT` when it is set.
pub fn std_client_build() -> http::HttpClient {
    let agent = http::var("USER_AGENT").unwrap_or_else(|_| {
        concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
    });
    reqwest::ClientBuilder::new()
        .user_agent(agent)
        .build()
        .unwrap_or_else(|_| http::HttpClient::new())
}

/// Format the time elapsed since `time`, for log lines.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:.3}s", time.elapsed().as_secs_f64())
}

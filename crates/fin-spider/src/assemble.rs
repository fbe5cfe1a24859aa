use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, RawStatementPage};
use crate::locate::locate;
use crate::statements::{FinancialStatementSet, Period, SearchConfig, Statement, StatementKind};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, trace};

/// Where assembly of one statement kind broke down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    PageLoad,
    Scrape,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PageLoad => f.write_str("Page load error"),
            Stage::Scrape => f.write_str("Scraper error"),
        }
    }
}

#[derive(Debug)]
pub struct KindFailure {
    pub kind: StatementKind,
    pub stage: Stage,
    pub error: Error,
}

/// The outcome of assembling one ticker and period.
#[derive(Debug)]
pub struct Assembly {
    /// Statements that were fully located; failed kinds are left out.
    pub set: FinancialStatementSet,
    /// Every page that was fetched, whether or not its tables were found.
    pub pages: Vec<RawStatementPage>,
    pub errors: Vec<KindFailure>,
    primary: Option<StatementKind>,
}

impl Assembly {
    /// The primary statement could not be assembled, so nothing should be saved.
    pub fn is_failed(&self) -> bool {
        match self.primary {
            Some(kind) => self.set.statement(kind).is_none(),
            None => true,
        }
    }

    /// Report line for the first failure, e.g. `"Scraper error - annual income"`.
    pub fn failure_reason(&self) -> Option<String> {
        self.errors.first().map(|failure| {
            format!(
                "{} - {} {}",
                failure.stage,
                self.set.period(),
                failure.kind
            )
        })
    }
}

/// Locate every configured table of one statement page.
pub fn locate_tables(html: &str, tables: &BTreeMap<String, String>) -> Result<Statement> {
    tables
        .iter()
        .map(|(name, search_term)| Ok((name.clone(), locate(html, search_term)?)))
        .collect()
}

/// Fetch one page per statement kind in `config`, and locate its tables.
///
/// A failure to fetch or scrape one kind is recorded and the next kind is tried; the ticker is
/// only considered failed when the first (primary) kind is missing.
pub async fn assemble<F: PageFetcher>(
    ticker: &str,
    period: Period,
    config: &SearchConfig,
    fetcher: &F,
) -> Assembly {
    let time = std::time::Instant::now();
    let mut assembly = Assembly {
        set: FinancialStatementSet::new(ticker, period),
        pages: vec![],
        errors: vec![],
        primary: config.keys().next().copied(),
    };

    for (&kind, tables) in config {
        trace!("fetching {period} {kind} page for [{ticker}]");
        let page = match fetcher.fetch(ticker, kind, period).await {
            Ok(page) => page,
            Err(err) => {
                error!("failed to load {period} {kind} page for [{ticker}], error({err})");
                assembly.errors.push(KindFailure {
                    kind,
                    stage: Stage::PageLoad,
                    error: err,
                });
                continue;
            }
        };

        match locate_tables(&page.html, tables) {
            Ok(statement) => assembly.set.insert_statement(kind, statement),
            Err(err) => {
                error!("failed to scrape {period} {kind} tables for [{ticker}], error({err})");
                assembly.errors.push(KindFailure {
                    kind,
                    stage: Stage::Scrape,
                    error: err,
                });
            }
        }
        assembly.pages.push(page);
    }

    debug!(
        "[{ticker}] {period} statements assembled with {} error(s), {}",
        assembly.errors.len(),
        crate::time_elapsed(time)
    );
    assembly
}

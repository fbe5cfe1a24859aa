use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::fs::{Resource, Store};
use crate::overview::{key_stock_data, KeyValue};
use crate::prices::YahooClient;
use crate::statements::{merge, FinancialStatementSet, Period, WSJ_TABLES};
use crate::summary::ListedCompanies;
use crate::tui::BatchProgress;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, trace};

/// A running count is logged every `COUNT_STEP` tickers.
const COUNT_STEP: usize = 100;

/// Why each failed ticker failed; the first reason recorded for a ticker is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FailureReport(BTreeMap<String, String>);

impl FailureReport {
    pub fn record(&mut self, ticker: &str, reason: impl Into<String>) {
        self.0
            .entry(ticker.to_string())
            .or_insert_with(|| reason.into());
    }

    pub fn get(&self, ticker: &str) -> Option<&str> {
        self.0.get(ticker).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, r)| (t.as_str(), r.as_str()))
    }

    pub fn extend(&mut self, other: FailureReport) {
        for (ticker, reason) in other.0 {
            self.record(&ticker, reason);
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ticker, reason) in &self.0 {
            writeln!(f, "{ticker}: {reason}")?;
        }
        Ok(())
    }
}

fn log_count(count: usize, total: usize) {
    if count % COUNT_STEP == 0 {
        info!("running {count} out of {total} ...");
    }
}

/// Scrape annual and interim statements for every ticker, archiving the raw pages and saving
/// each assembled set over any previous one.
///
/// Nothing is saved for a ticker whose primary statement could not be located.
pub async fn save_financials<F: PageFetcher>(
    store: &Store,
    fetcher: &F,
    tickers: &[String],
    tui: bool,
) -> Result<FailureReport> {
    let total = tickers.len() * Period::ALL.len();
    let progress = BatchProgress::new(total, "Save Financials", tui);
    let mut report = FailureReport::default();
    let mut count = 0;

    for period in Period::ALL {
        for ticker in tickers {
            let ticker = ticker.trim();
            count += 1;
            log_count(count, total);

            let assembly = assemble(ticker, period, &WSJ_TABLES, fetcher).await;
            for page in &assembly.pages {
                if let Err(err) = store.save_page(page).await {
                    error!("failed to archive {} page for [{ticker}], error({err})", page.kind);
                }
            }

            if let Some(reason) = assembly.failure_reason() {
                report.record(ticker, reason);
            }
            if assembly.is_failed() {
                progress.fail();
                continue;
            }

            match store.save_financials(&assembly.set).await {
                Ok(_) => progress.success(),
                Err(err) => {
                    error!("failed to save {period} financials for [{ticker}], error({err})");
                    report.record(ticker, format!("Save error - {period}"));
                    progress.fail();
                }
            }
        }
    }

    progress.finish();
    info!("{count} statement sets processed, {} tickers failed", report.len());
    Ok(report)
}

/// Scrape `period` statements for every ticker and merge them into what is already stored.
///
/// A ticker with nothing stored starts from an empty set. A stored set belonging to another
/// ticker or period is an error for the whole batch.
pub async fn update_financials<F: PageFetcher>(
    store: &Store,
    fetcher: &F,
    tickers: &[String],
    period: Period,
    tui: bool,
) -> Result<FailureReport> {
    let progress = BatchProgress::new(tickers.len(), &format!("Update {period} Financials"), tui);
    let mut report = FailureReport::default();

    for (count, ticker) in tickers.iter().enumerate() {
        let ticker = ticker.trim();
        log_count(count + 1, tickers.len());

        let existing = match store.load_financials(ticker, period).await {
            Ok(set) => set,
            Err(Error::ResourceNotFound(_)) => {
                trace!("no stored {period} financials for [{ticker}]");
                FinancialStatementSet::new(ticker, period)
            }
            Err(err @ Error::IdentityMismatch { .. }) => return Err(err),
            Err(err) => {
                error!("failed to load {period} financials for [{ticker}], error({err})");
                report.record(ticker, format!("Load error - {period}"));
                progress.fail();
                continue;
            }
        };

        let assembly = assemble(ticker, period, &WSJ_TABLES, fetcher).await;
        if let Some(reason) = assembly.failure_reason() {
            report.record(ticker, reason);
        }
        if assembly.is_failed() {
            progress.fail();
            continue;
        }

        let merged = merge(existing, assembly.set)?;
        match store.save_financials(&merged).await {
            Ok(_) => {
                debug!("{period} financials updated for [{ticker}]");
                progress.success();
            }
            Err(err) => {
                error!("failed to save {period} financials for [{ticker}], error({err})");
                report.record(ticker, format!("Save error - {period}"));
                progress.fail();
            }
        }
    }

    progress.finish();
    Ok(report)
}

/// Download and save daily prices since `start` for every ticker.
pub async fn update_price_history(
    store: &Store,
    yahoo: &YahooClient,
    tickers: &[String],
    start: NaiveDate,
    tui: bool,
) -> Result<FailureReport> {
    let progress = BatchProgress::new(tickers.len(), "Price History", tui);
    let mut report = FailureReport::default();

    for (count, ticker) in tickers.iter().enumerate() {
        let ticker = ticker.trim();
        log_count(count + 1, tickers.len());

        let saved = match yahoo.price_history(ticker, store.exchange(), start).await {
            Ok(history) => history.save(store).await,
            Err(err) => Err(err),
        };
        match saved {
            Ok(_) => progress.success(),
            Err(err) => {
                error!("problem getting prices for [{ticker}], error({err})");
                report.record(ticker, format!("Price error - {err}"));
                progress.fail();
            }
        }
    }

    progress.finish();
    Ok(report)
}

/// Fetch each ticker's overview page and join its key stock data onto `listed` as new columns.
///
/// Overview pages are archived to the store as they are fetched.
pub async fn update_key_stock_data<F: PageFetcher>(
    store: &Store,
    fetcher: &F,
    listed: &mut ListedCompanies,
    tickers: &[String],
    tui: bool,
) -> Result<FailureReport> {
    let progress = BatchProgress::new(tickers.len(), "Key Stock Data", tui);
    let mut report = FailureReport::default();
    let mut new_data = BTreeMap::new();

    for (count, ticker) in tickers.iter().enumerate() {
        let ticker = ticker.trim();
        log_count(count + 1, tickers.len());

        let html = match fetcher.fetch_overview(ticker).await {
            Ok(html) => html,
            Err(err) => {
                error!("failed to load overview for [{ticker}], error({err})");
                report.record(ticker, "Page load error - overview");
                progress.fail();
                continue;
            }
        };

        let resource = Resource::Overview {
            ticker: ticker.to_string(),
        };
        if let Err(err) = store.save(&resource, html.as_bytes()).await {
            error!("failed to archive overview for [{ticker}], error({err})");
        }

        match key_stock_data(&html) {
            Ok(data) => {
                let row = data
                    .into_iter()
                    .map(|(label, value)| {
                        let value = match value {
                            KeyValue::Number(number) => number.to_string(),
                            KeyValue::Text(text) => text,
                        };
                        (label, value)
                    })
                    .collect::<BTreeMap<String, String>>();
                new_data.insert(ticker.to_string(), row);
                progress.success();
            }
            Err(err) => {
                error!("failed to scrape key stock data for [{ticker}], error({err})");
                report.record(ticker, "Scraper error - overview");
                progress.fail();
            }
        }
    }

    listed.update(&new_data);
    progress.finish();
    Ok(report)
}

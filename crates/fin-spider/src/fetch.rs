use crate::error::{Error, Result};
use crate::fs::{Resource, Store};
use crate::http::*;
use crate::statements::{Exchange, Period, StatementKind};
use tracing::{debug, error, trace};

/// One statement page's markup, between fetching and table location.
#[derive(Clone, Debug, PartialEq)]
pub struct RawStatementPage {
    pub ticker: String,
    pub kind: StatementKind,
    pub period: Period,
    pub html: String,
}

impl RawStatementPage {
    pub fn resource(&self) -> Resource {
        Resource::StatementPage {
            ticker: self.ticker.clone(),
            kind: self.kind,
            period: self.period,
        }
    }
}

/// Source of statement pages.
///
/// Pages are fetched one at a time; implementations are free to block for as long as the
/// request takes.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
        period: Period,
    ) -> Result<RawStatementPage>;

    /// The ticker's overview page, holding the key stock data drawer.
    async fn fetch_overview(&self, ticker: &str) -> Result<String>;
}

// wsj internet
// ----------------------------------------------------------------------------

/// Page path of each statement, relative to the ticker's root page.
fn statement_page(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::Income => "/financials/<period>/income-statement",
        StatementKind::Balance => "/financials/<period>/balance-sheet",
        StatementKind::Cashflow => "/financials/<period>/cash-flow",
    }
}

/// Statement pages downloaded from quotes.wsj.com.
#[derive(Clone, Debug)]
pub struct WsjInternet {
    client: HttpClient,
    page_root: String,
}

impl WsjInternet {
    pub fn new(exchange: Exchange) -> Self {
        Self::with_root(crate::std_client_build(), Self::page_root(exchange))
    }

    /// Fetch from another host serving the same page layout.
    pub fn with_root(client: HttpClient, page_root: impl Into<String>) -> Self {
        Self {
            client,
            page_root: page_root.into(),
        }
    }

    pub fn page_root(exchange: Exchange) -> &'static str {
        match exchange {
            Exchange::ASX => "http://quotes.wsj.com/AU/XASX/",
            Exchange::NYSE => "http://quotes.wsj.com/",
        }
    }

    /// URL of a statement page; WSJ names the interim pages "quarter".
    pub fn address(&self, ticker: &str, kind: StatementKind, period: Period) -> String {
        let period = match period {
            Period::Annual => "annual",
            Period::Interim => "quarter",
        };
        format!("{}{ticker}{}", self.page_root, statement_page(kind)).replace("<period>", period)
    }

    async fn get(&self, url: &str) -> Result<String> {
        trace!("GET {url}");
        let fetch_error = |err: reqwest::Error| {
            error!("failed to download {url}, error({err})");
            Error::Fetch {
                location: url.to_string(),
                reason: err.to_string(),
            }
        };

        self.client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_error)?
            .text()
            .await
            .map_err(fetch_error)
    }
}

impl PageFetcher for WsjInternet {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
        period: Period,
    ) -> Result<RawStatementPage> {
        let url = self.address(ticker, kind, period);
        let html = self.get(&url).await?;
        debug!("downloaded {period} {kind} page for [{ticker}]");
        Ok(RawStatementPage {
            ticker: ticker.to_string(),
            kind,
            period,
            html,
        })
    }

    async fn fetch_overview(&self, ticker: &str) -> Result<String> {
        self.get(&format!("{}{ticker}", self.page_root)).await
    }
}

// wsj local
// ----------------------------------------------------------------------------

/// Statement pages previously archived to a [`Store`].
#[derive(Clone, Debug)]
pub struct WsjLocal {
    store: Store,
}

impl WsjLocal {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl PageFetcher for WsjLocal {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
        period: Period,
    ) -> Result<RawStatementPage> {
        self.store
            .load_page(ticker, kind, period)
            .await
            .map_err(|err| {
                let location = self
                    .store
                    .resolve_path(&Resource::StatementPage {
                        ticker: ticker.to_string(),
                        kind,
                        period,
                    })
                    .display()
                    .to_string();
                error!("problem loading: {location}, error({err})");
                Error::Fetch {
                    location,
                    reason: err.to_string(),
                }
            })
    }

    async fn fetch_overview(&self, ticker: &str) -> Result<String> {
        let resource = Resource::Overview {
            ticker: ticker.to_string(),
        };
        let bytes = self.store.load(&resource).await.map_err(|err| Error::Fetch {
            location: self.store.resolve_path(&resource).display().to_string(),
            reason: err.to_string(),
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

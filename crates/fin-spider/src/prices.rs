use crate::error::{Error, Result};
use crate::fs::{Resource, Store};
use crate::http::*;
use crate::statements::Exchange;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

/// Start of the history when none is given.
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default()
}

// output
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
}

/// Daily bars for one ticker, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub ticker: String,
    pub prices: Vec<Price>,
}

impl PriceHistory {
    pub fn resource(ticker: &str) -> Resource {
        Resource::PriceHistory {
            ticker: ticker.to_string(),
        }
    }

    pub async fn load(store: &Store, ticker: &str) -> Result<Self> {
        store.load_decoded(&Self::resource(ticker)).await
    }

    pub async fn save(&self, store: &Store) -> Result<()> {
        store.save_encoded(&Self::resource(&self.ticker), self).await
    }

    /// Bars with open, high, low and close scaled by `adj_close / close`, so the series is
    /// continuous across splits and dividends.
    pub fn adjusted(&self) -> Vec<Price> {
        self.prices
            .iter()
            .map(|bar| {
                let ratio = if bar.close != 0.0 {
                    bar.adj_close / bar.close
                } else {
                    1.0
                };
                Price {
                    date: bar.date,
                    open: bar.open * ratio,
                    high: bar.high * ratio,
                    low: bar.low * ratio,
                    close: bar.close * ratio,
                    adj_close: bar.adj_close,
                    volume: bar.volume,
                }
            })
            .collect()
    }

    /// Transform a Yahoo chart response; bars with any missing field are skipped.
    pub fn from_chart(ticker: &str, response: PriceResponse) -> Result<Self> {
        let base = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| Error::Fetch {
                location: format!("Yahoo Finance chart for [{ticker}]"),
                reason: "no results found within http response".to_string(),
            })?;

        let price = base.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = base
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|adj| adj.adjclose)
            .unwrap_or_else(|| price.close.clone());

        let prices = price
            .open
            .iter()
            .zip(price.high.iter())
            .zip(price.low.iter())
            .zip(price.close.iter())
            .zip(price.volume.iter())
            .zip(adjclose.iter())
            .zip(base.timestamp.iter())
            .filter_map(
                |((((((open, high), low), close), volume), adj_close), timestamp)| {
                    Some(Price {
                        date: chrono::DateTime::from_timestamp(*timestamp, 0)?.date_naive(),
                        open: (*open)?,
                        high: (*high)?,
                        low: (*low)?,
                        close: (*close)?,
                        adj_close: (*adj_close)?,
                        volume: (*volume)?,
                    })
                },
            )
            .collect();

        trace!("price data transformation succesful for [{ticker}]");
        Ok(Self {
            ticker: ticker.to_string(),
            prices,
        })
    }
}

// client
// ----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct YahooClient {
    client: HttpClient,
    base_url: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::with_base_url(
            crate::std_client_build(),
            "https://query1.finance.yahoo.com/v8/finance/chart/",
        )
    }
}

impl YahooClient {
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Yahoo symbol of a ticker; ASX listings carry the `.AX` suffix.
    pub fn symbol(ticker: &str, exchange: Exchange) -> String {
        match exchange {
            Exchange::ASX => format!("{ticker}.AX"),
            Exchange::NYSE => ticker.to_string(),
        }
    }

    async fn chart(&self, url: String, ticker: &str) -> Result<PriceResponse> {
        let response = self.client.get(&url).send().await.map_err(|err| {
            error!("failed to fetch Yahoo Finance prices for [{ticker}], error({err})");
            Error::Fetch {
                location: url.clone(),
                reason: err.to_string(),
            }
        })?;

        response.json().await.map_err(|err| {
            error!("failed to parse Yahoo Finance prices for [{ticker}], error({err})");
            Error::Http(err)
        })
    }

    /// Daily prices from `start` until today.
    pub async fn price_history(
        &self,
        ticker: &str,
        exchange: Exchange,
        start: NaiveDate,
    ) -> Result<PriceHistory> {
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let period2 = Utc::now().timestamp();
        let url = format!(
            "{}{}?period1={period1}&period2={period2}&interval=1d&events=div|split",
            self.base_url,
            Self::symbol(ticker, exchange)
        );

        let response = self.chart(url, ticker).await?;
        let history = PriceHistory::from_chart(ticker, response)?;
        debug!("{} prices fetched for [{ticker}]", history.prices.len());
        Ok(history)
    }

    /// Last traded price.
    pub async fn current_price(&self, ticker: &str, exchange: Exchange) -> Result<f64> {
        let url = format!(
            "{}{}?range=1d&interval=1d",
            self.base_url,
            Self::symbol(ticker, exchange)
        );
        let response = self.chart(url.clone(), ticker).await?;
        response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.meta.regular_market_price)
            .ok_or_else(|| Error::Fetch {
                location: url,
                reason: "no market price within http response".to_string(),
            })
    }
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PriceResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

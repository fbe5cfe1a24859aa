use crate::error::{Error, Result};
use crate::fetch::RawStatementPage;
use crate::http::var;
use crate::statements::{Exchange, FinancialStatementSet, Period, StatementKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Store root used when `FIN_DATA_ROOT` is not set.
pub const DEFAULT_ROOT: &str = "./data";

/// Everything the store knows how to place on disk, identified by ticker, period, etc.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Raw statement page, as fetched.
    StatementPage {
        ticker: String,
        kind: StatementKind,
        period: Period,
    },

    /// Raw overview page, holding the key stock data drawer.
    Overview { ticker: String },

    /// An assembled [`FinancialStatementSet`].
    Financials { ticker: String, period: Period },

    /// Daily price history of one ticker.
    PriceHistory { ticker: String },

    /// The exchange's listed companies table.
    ListedCompanies,

    /// A dated valuation snapshot across tickers; `date` as `YYYYMMDD`.
    ValuationSummary { date: String },
}

impl Resource {
    /// Path of the resource relative to the store root.
    pub fn relative_path(&self, exchange: Exchange) -> PathBuf {
        let data = PathBuf::from(exchange.symbol());
        match self {
            Resource::StatementPage {
                ticker,
                kind,
                period,
            } => data
                .join(ticker)
                .join("Financials")
                .join(period.folder())
                .join(format!("{ticker}{kind}.html")),
            Resource::Overview { ticker } => {
                data.join(ticker).join(format!("{ticker}overview.html"))
            }
            Resource::Financials { ticker, period } => data
                .join(ticker)
                .join("Financials")
                .join(format!("{ticker}{period}.pkl")),
            Resource::PriceHistory { ticker } => {
                data.join(ticker).join(format!("{ticker}prices.pkl"))
            }
            Resource::ListedCompanies => data.join(format!("{exchange}ListedCompanies.csv")),
            Resource::ValuationSummary { date } => PathBuf::from("Valuations")
                .join(exchange.symbol())
                .join(format!("ValuationSummary{date}.csv")),
        }
    }
}

/// File-system store for one exchange, rooted at `root`.
#[derive(Clone, Debug)]
pub struct Store {
    root: PathBuf,
    exchange: Exchange,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>, exchange: Exchange) -> Self {
        Self {
            root: root.into(),
            exchange,
        }
    }

    /// Store rooted at `FIN_DATA_ROOT`, or [`DEFAULT_ROOT`].
    pub fn from_env(exchange: Exchange) -> Self {
        let root = var("FIN_DATA_ROOT").unwrap_or_else(|_| DEFAULT_ROOT.to_string());
        Self::new(root, exchange)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Folder holding one sub-folder per ticker.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(self.exchange.symbol())
    }

    pub fn resolve_path(&self, resource: &Resource) -> PathBuf {
        self.root.join(resource.relative_path(self.exchange))
    }

    pub async fn exists(&self, resource: &Resource) -> bool {
        tokio::fs::try_exists(self.resolve_path(resource))
            .await
            .unwrap_or(false)
    }

    /// Read a resource's raw bytes.
    pub async fn load(&self, resource: &Resource) -> Result<Vec<u8>> {
        let path = self.resolve_path(resource);
        trace!("reading file path: {}", path.display());
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::ResourceNotFound(path))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write a resource, replacing any previous file in one step.
    ///
    /// Missing directories are created first; the bytes go to a sibling `.tmp` file which is then
    /// renamed over the target.
    pub async fn save(&self, resource: &Resource, data: &[u8]) -> Result<()> {
        let path = self.resolve_path(resource);

        // ensure the directory exists
        if let Some(dir) = path.parent() {
            trace!("checking directory path: {}", dir.display());
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("saved {}", path.display());
        Ok(())
    }

    /// Read and decode a `bincode` resource.
    pub async fn load_decoded<T: DeserializeOwned>(&self, resource: &Resource) -> Result<T> {
        let bytes = self.load(resource).await?;
        trace!("file read; deserializing bytes ...");
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Encode a value with `bincode` and save it.
    pub async fn save_encoded<T: Serialize>(&self, resource: &Resource, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)?;
        self.save(resource, &bytes).await
    }

    pub async fn load_page(
        &self,
        ticker: &str,
        kind: StatementKind,
        period: Period,
    ) -> Result<RawStatementPage> {
        let resource = Resource::StatementPage {
            ticker: ticker.to_string(),
            kind,
            period,
        };
        let bytes = self.load(&resource).await?;
        Ok(RawStatementPage {
            ticker: ticker.to_string(),
            kind,
            period,
            html: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    pub async fn save_page(&self, page: &RawStatementPage) -> Result<()> {
        self.save(&page.resource(), page.html.as_bytes()).await
    }

    /// Load the stored set for `ticker` and `period`, checking the file holds what its name says.
    pub async fn load_financials(
        &self,
        ticker: &str,
        period: Period,
    ) -> Result<FinancialStatementSet> {
        let resource = Resource::Financials {
            ticker: ticker.to_string(),
            period,
        };
        let set: FinancialStatementSet = self.load_decoded(&resource).await?;
        set.confirm_match(ticker, period)?;
        Ok(set)
    }

    pub async fn save_financials(&self, set: &FinancialStatementSet) -> Result<()> {
        let resource = Resource::Financials {
            ticker: set.ticker().to_string(),
            period: set.period(),
        };
        self.save_encoded(&resource, set).await
    }

    /// Every ticker with a folder in the store, sorted.
    pub async fn tickers(&self) -> Result<Vec<String>> {
        let dir = self.data_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };

        let mut tickers = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() && !name.contains('.') {
                tickers.push(name);
            }
        }
        tickers.sort();
        Ok(tickers)
    }
}

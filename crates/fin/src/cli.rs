use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing; without it, progress bars are shown instead.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,

    /// Exchange the tickers are listed on.
    #[arg(short, long, global = true, value_enum, default_value_t = Exchange::Asx)]
    pub exchange: Exchange,

    /// Root folder of the data store; defaults to FIN_DATA_ROOT, or ./data.
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape financial statements from WSJ.
    Financials {
        #[command(subcommand)]
        action: FinancialsAction,
    },

    /// Download daily price history from Yahoo Finance.
    Prices {
        #[command(flatten)]
        tickers: Tickers,

        /// First day of the history, as YYYY-MM-DD.
        #[arg(short, long)]
        start: Option<chrono::NaiveDate>,
    },

    /// Add each ticker's key stock data to the listed companies table.
    Overview {
        #[command(flatten)]
        tickers: Tickers,

        /// Read overview pages from the store instead of downloading them.
        #[arg(long)]
        local: bool,
    },

    /// Relational store at FINDUMP_URL.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum FinancialsAction {
    /// Scrape annual and interim statements, archive the pages, and overwrite stored sets.
    Save {
        #[command(flatten)]
        tickers: Tickers,

        /// Read statement pages from the store instead of downloading them.
        #[arg(long)]
        local: bool,
    },

    /// Scrape one period's statements and merge them into the stored sets.
    Update {
        #[arg(short, long, value_enum)]
        period: Period,

        #[command(flatten)]
        tickers: Tickers,

        /// Read statement pages from the store instead of downloading them.
        #[arg(long)]
        local: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbAction {
    /// Create the schema and seed exchanges and statement types.
    Init,

    /// Insert the exchange's listed companies.
    Companies,

    /// Insert stored statement sets as statement facts.
    Push {
        #[arg(short, long, value_enum)]
        period: Period,

        #[command(flatten)]
        tickers: Tickers,
    },
}

#[derive(Args, Debug)]
pub struct Tickers {
    /// Tickers to process; every ticker in the store when omitted.
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Exchange {
    Asx,
    Nyse,
}

impl From<Exchange> for fin_spider::statements::Exchange {
    fn from(exchange: Exchange) -> Self {
        match exchange {
            Exchange::Asx => Self::ASX,
            Exchange::Nyse => Self::NYSE,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Period {
    Annual,
    Interim,
}

impl From<Period> for fin_spider::statements::Period {
    fn from(period: Period) -> Self {
        match period {
            Period::Annual => Self::Annual,
            Period::Interim => Self::Interim,
        }
    }
}

use crate::cli;
use colored::Colorize;
use deadpool_postgres::{ManagerConfig, Pool, RecyclingMethod};
use dotenv::var;
use fin_spider::download::{self, FailureReport};
use fin_spider::fetch::{WsjInternet, WsjLocal};
use fin_spider::fs::Store;
use fin_spider::prices::{default_start, YahooClient};
use fin_spider::statements::Period;
use fin_spider::summary::ListedCompanies;
use tracing::{debug, error, info, trace};

/// Tickers given on the command line, or every ticker in the store.
pub(crate) async fn tickers(store: &Store, tickers: cli::Tickers) -> anyhow::Result<Vec<String>> {
    match tickers.tickers {
        Some(tickers) => Ok(tickers),
        None => {
            let tickers = store.tickers().await?;
            debug!("{} tickers found in {}", tickers.len(), store.data_dir().display());
            Ok(tickers)
        }
    }
}

/// Connection pool to the database at `FINDUMP_URL`.
pub(crate) fn pool() -> anyhow::Result<Pool> {
    trace!("creating postgres connection pool config");
    let mut pg_config = deadpool_postgres::Config::new();
    pg_config.url = Some(var("FINDUMP_URL")?);
    pg_config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let pool = pg_config.create_pool(
        Some(deadpool_postgres::Runtime::Tokio1),
        tokio_postgres::NoTls,
    )?;
    debug!("findump connection pool established");
    Ok(pool)
}

fn print_report(name: &str, report: &FailureReport, tui: bool) {
    if report.is_empty() {
        info!("{name} finished without failures");
        if tui {
            println!("{name} ... done");
        }
        return;
    }

    for (ticker, reason) in report.iter() {
        error!("[{ticker}] {reason}");
    }
    if tui {
        println!("{name} ... done, {} failures", report.len());
        for (ticker, reason) in report.iter() {
            println!("  {} {}", format!("[{ticker}]").red(), reason);
        }
    }
}

pub(crate) async fn save_financials(
    store: &Store,
    tickers: &[String],
    local: bool,
    tui: bool,
) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    let report = if local {
        download::save_financials(store, &WsjLocal::new(store.clone()), tickers, tui).await?
    } else {
        let fetcher = WsjInternet::new(store.exchange());
        download::save_financials(store, &fetcher, tickers, tui).await?
    };
    print_report("save financials", &report, tui);
    info!("financials saved, time elapsed: {:?}", time.elapsed());
    Ok(())
}

pub(crate) async fn update_financials(
    store: &Store,
    tickers: &[String],
    period: Period,
    local: bool,
    tui: bool,
) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    let report = if local {
        let fetcher = WsjLocal::new(store.clone());
        download::update_financials(store, &fetcher, tickers, period, tui).await?
    } else {
        let fetcher = WsjInternet::new(store.exchange());
        download::update_financials(store, &fetcher, tickers, period, tui).await?
    };
    print_report(&format!("update {period} financials"), &report, tui);
    info!("financials updated, time elapsed: {:?}", time.elapsed());
    Ok(())
}

pub(crate) async fn prices(
    store: &Store,
    tickers: &[String],
    start: Option<chrono::NaiveDate>,
    tui: bool,
) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    let yahoo = YahooClient::default();
    let start = start.unwrap_or_else(default_start);
    let report = download::update_price_history(store, &yahoo, tickers, start, tui).await?;
    print_report("price history", &report, tui);
    info!("price history collected, time elapsed: {:?}", time.elapsed());
    Ok(())
}

pub(crate) async fn overview(
    store: &Store,
    tickers: &[String],
    local: bool,
    tui: bool,
) -> anyhow::Result<()> {
    let mut listed = ListedCompanies::load(store).await?;
    let report = if local {
        let fetcher = WsjLocal::new(store.clone());
        download::update_key_stock_data(store, &fetcher, &mut listed, tickers, tui).await?
    } else {
        let fetcher = WsjInternet::new(store.exchange());
        download::update_key_stock_data(store, &fetcher, &mut listed, tickers, tui).await?
    };
    listed.save(store).await?;
    print_report("key stock data", &report, tui);
    Ok(())
}

pub(crate) async fn db_companies(pool: &Pool, store: &Store) -> anyhow::Result<()> {
    let listed = ListedCompanies::load(store).await?;
    let inserted = fin_spider::db::add_companies(pool, &listed).await?;
    info!("{inserted} companies inserted");
    Ok(())
}

pub(crate) async fn db_push(
    pool: &Pool,
    store: &Store,
    tickers: &[String],
    period: Period,
) -> anyhow::Result<()> {
    let mut report = FailureReport::default();
    for ticker in tickers {
        let set = match store.load_financials(ticker, period).await {
            Ok(set) => set,
            Err(err) => {
                error!("failed to load {period} financials for [{ticker}], error({err})");
                report.record(ticker, format!("Load error - {period}"));
                continue;
            }
        };
        if let Err(err) = fin_spider::db::insert_statements(pool, &set).await {
            error!("failed to insert {period} financials for [{ticker}], error({err})");
            report.record(ticker, format!("Insert error - {period}"));
        }
    }
    print_report("db push", &report, false);
    Ok(())
}

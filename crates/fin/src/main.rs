mod cli;
mod run;

use clap::Parser;
use cli::{Cli, TraceLevel};
use fin_spider::fs::Store;
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preprocess the trace level
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        })?;
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    let exchange: fin_spider::statements::Exchange = cli.exchange.into();
    let store = match cli.root {
        Some(root) => Store::new(root, exchange),
        None => Store::from_env(exchange),
    };

    // read cli inputs
    use cli::Commands::*;
    use cli::{DbAction, FinancialsAction};
    match cli.command {
        // `fin financials save [--tickers ..] [--local]`: scrape & overwrite
        Financials {
            action: FinancialsAction::Save { tickers, local },
        } => {
            let tickers = run::tickers(&store, tickers).await?;
            run::save_financials(&store, &tickers, local, tui).await?;
        }

        // `fin financials update --period <PERIOD>`: scrape & merge
        Financials {
            action:
                FinancialsAction::Update {
                    period,
                    tickers,
                    local,
                },
        } => {
            let tickers = run::tickers(&store, tickers).await?;
            run::update_financials(&store, &tickers, period.into(), local, tui).await?;
        }

        Prices { tickers, start } => {
            let tickers = run::tickers(&store, tickers).await?;
            run::prices(&store, &tickers, start, tui).await?;
        }

        Overview { tickers, local } => {
            let tickers = run::tickers(&store, tickers).await?;
            run::overview(&store, &tickers, local, tui).await?;
        }

        Db { action } => {
            let pool = run::pool()?;
            match action {
                DbAction::Init => fin_spider::db::bootstrap(&pool).await?,
                DbAction::Companies => run::db_companies(&pool, &store).await?,
                DbAction::Push { period, tickers } => {
                    let tickers = run::tickers(&store, tickers).await?;
                    run::db_push(&pool, &store, &tickers, period.into()).await?;
                }
            }
        }
    }

    Ok(())
}

mod sql;

use crate::error::Result;
use crate::key_tracker::KeyTracker;
use crate::statements::{FinancialStatementSet, Period, StatementKind};
use crate::summary::ListedCompanies;
use crate::table::PeriodTable;
use chrono::NaiveDate;
use deadpool_postgres::Pool;
use futures::{stream, StreamExt};
use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

/// Exchanges seeded by [`bootstrap`]: symbol, name, country, currency.
const EXCHANGES: [(&str, &str, &str, &str); 2] = [
    ("NYSE", "New York Stock Exchange", "U.S.", "USD"),
    ("ASX", "Australian Stock Exchange", "Australia", "AUD"),
];

/// Create the `fin` schema, and seed the exchanges and statement types.
pub async fn bootstrap(pool: &Pool) -> Result<()> {
    let pg_client = pool.get().await?;

    trace!("creating fin schema ...");
    pg_client.batch_execute(sql::CREATE_SCHEMA).await?;

    let insert = pg_client.prepare(sql::INSERT_EXCHANGE).await?;
    for (symbol, name, country, currency) in EXCHANGES {
        pg_client
            .execute(&insert, &[&symbol, &name, &country, &currency])
            .await?;
    }

    let insert = pg_client.prepare(sql::INSERT_STATEMENT).await?;
    for kind in StatementKind::ALL {
        pg_client.execute(&insert, &[&kind.as_str()]).await?;
    }

    info!("fin schema ready");
    Ok(())
}

/// Insert every listed company not already in `fin.company`; returns the number inserted.
pub async fn add_companies(pool: &Pool, listed: &ListedCompanies) -> Result<u64> {
    let mut pg_client = pool.get().await?;
    let query = pg_client.prepare(sql::INSERT_COMPANY).await?;
    let transaction = pg_client.transaction().await?;

    // iterate over the records and execute pg rows
    let records = listed.company_records();
    let mut stream = stream::iter(&records);
    let mut inserted = 0;
    while let Some(company) = stream.next().await {
        inserted += transaction
            .execute(
                &query,
                &[
                    &company.ticker,
                    &company.exchange.symbol(),
                    &company.name,
                    &company.sector,
                    &company.industry_group,
                ],
            )
            .await?;
    }
    transaction.commit().await?;

    info!("{inserted} new companies on {}", listed.exchange);
    Ok(inserted)
}

/// Record every figure of `set` as a statement fact; returns the number of facts written.
///
/// Line items are registered on first sight, and ordered within their statement in the order
/// the page lists them. Columns that are not a date of the set's period are skipped.
pub async fn insert_statements(pool: &Pool, set: &FinancialStatementSet) -> Result<u64> {
    let time = std::time::Instant::now();
    let ticker = set.ticker();
    let period = set.period();
    let mut pg_client = pool.get().await?;

    let mut line_items =
        KeyTracker::<i32, String>::pg_fetch(&pg_client, sql::SELECT_LINE_ITEMS).await?;

    let insert_item = pg_client.prepare(sql::INSERT_LINE_ITEM).await?;
    let insert_member = pg_client.prepare(sql::INSERT_STATEMENT_ITEM).await?;
    let upsert_fact = pg_client.prepare(sql::UPSERT_FACT).await?;
    let transaction = pg_client.transaction().await?;

    let mut facts = 0;
    for (kind, tables) in set.statements() {
        let mut row_num: i32 = 0;
        for table in tables.values() {
            let dates = fact_dates(ticker, period, table.columns());

            for (name, cells) in table.iter_rows() {
                let (id, new) = line_items.transact(name.to_string());
                if new {
                    transaction.execute(&insert_item, &[&id, &name]).await?;
                }

                row_num += 1;
                transaction
                    .execute(&insert_member, &[&kind.as_str(), &id, &row_num])
                    .await?;

                for (date, value) in dates.iter().zip(cells) {
                    let Some(date) = date else { continue };
                    facts += transaction
                        .execute(&upsert_fact, &[&ticker, &period.as_str(), &id, date, value])
                        .await?;
                }
            }
        }
    }
    transaction.commit().await?;

    debug!(
        "{facts} {period} statement facts inserted for [{ticker}], {}",
        crate::time_elapsed(time)
    );
    Ok(facts)
}

/// Date each column reports to; columns that are not a date of `period` are `None`.
fn fact_dates(ticker: &str, period: Period, columns: &[String]) -> Vec<Option<NaiveDate>> {
    columns
        .iter()
        .map(|label| {
            let date = period.column_date(label);
            if date.is_none() {
                warn!("skipping column \"{label}\" for [{ticker}], not a {period} date");
            }
            date
        })
        .collect()
}

/// Read one statement of a ticker and period back as a table: line items in statement order,
/// dates most recent first.
pub async fn statement(
    pool: &Pool,
    kind: StatementKind,
    period: Period,
    ticker: &str,
) -> Result<PeriodTable> {
    let pg_client = pool.get().await?;
    let rows = pg_client
        .query(sql::SELECT_STATEMENT, &[&kind.as_str(), &ticker, &period.as_str()])
        .await?;

    let mut dates: Vec<NaiveDate> = vec![];
    let mut items: Vec<(i32, String)> = vec![];
    let mut values: BTreeMap<(String, NaiveDate), Option<f64>> = BTreeMap::new();
    for row in rows {
        let row_num: i32 = row.get(0);
        let date: NaiveDate = row.get(1);
        let name: String = row.get(2);
        let value: Option<f64> = row.get(3);

        if !dates.contains(&date) {
            dates.push(date);
        }
        if !items.iter().any(|(_, item)| *item == name) {
            items.push((row_num, name.clone()));
        }
        values.insert((name, date), value);
    }
    dates.sort_by(|a, b| b.cmp(a));
    items.sort_by_key(|(row_num, _)| *row_num);

    let columns = dates.iter().map(|date| date.to_string()).collect();
    let rows = items
        .into_iter()
        .map(|(_, name)| {
            let cells = dates
                .iter()
                .map(|date| values.get(&(name.clone(), *date)).copied().flatten())
                .collect();
            (name, cells)
        })
        .collect();

    Ok(PeriodTable::new(columns, rows))
}

mod common;

use common::{income_page, table, StubFetcher};
use fin_spider::download::{save_financials, update_financials, update_key_stock_data};
use fin_spider::fs::{Resource, Store};
use fin_spider::statements::{Exchange, FinancialStatementSet, Period, Statement, StatementKind};
use fin_spider::summary::ListedCompanies;
use fin_spider::Error;
use pretty_assertions::assert_eq;

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

const OVERVIEW: &str = r#"<html><body>
<div id="cr_keystock_drawer"><div><ul>
  <li><h5>P/E Ratio</h5><span>14.25</span></li>
  <li><h5>Market Cap</h5><span>1,234.5 M</span></li>
  <li><h5>Ex-Dividend Date</h5><span>Aug 25, 2021</span></li>
</ul></div></div>
</body></html>"#;

#[tokio::test]
async fn save_writes_sets_and_pages_for_good_tickers_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path(), Exchange::ASX);
    let fetcher = StubFetcher::default()
        .with_ticker("CCP", &["2021", "2020"])
        .with_page("BAD", StatementKind::Income, Period::Annual, income_page(&["Q1", "Q2"]));

    let report = save_financials(&store, &fetcher, &tickers(&["CCP", "BAD"]), false)
        .await
        .unwrap();

    let annual = store.load_financials("CCP", Period::Annual).await.unwrap();
    assert_eq!(annual.income().unwrap().columns(), ["2021", "2020"]);
    assert!(store.load_financials("CCP", Period::Interim).await.is_ok());
    assert!(
        store
            .exists(&Resource::StatementPage {
                ticker: "CCP".into(),
                kind: StatementKind::Balance,
                period: Period::Interim,
            })
            .await
    );

    assert!(matches!(
        store.load_financials("BAD", Period::Annual).await,
        Err(Error::ResourceNotFound(_))
    ));
    // the page is archived even though no set was saved
    assert!(
        store
            .exists(&Resource::StatementPage {
                ticker: "BAD".into(),
                kind: StatementKind::Income,
                period: Period::Annual,
            })
            .await
    );

    assert_eq!(report.len(), 1);
    assert_eq!(report.get("BAD"), Some("Scraper error - annual income"));
    assert_eq!(report.get("CCP"), None);
}

#[tokio::test]
async fn update_merges_with_the_stored_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path(), Exchange::ASX);

    let mut stored = FinancialStatementSet::new("CCP", Period::Annual);
    stored.insert_statement(
        StatementKind::Income,
        Statement::from([(
            "income".to_string(),
            table(&["2020", "2019"], &[("Sales/Revenue", &[1000.0, 900.0])]),
        )]),
    );
    store.save_financials(&stored).await.unwrap();

    let fetcher = StubFetcher::default().with_ticker("CCP", &["2021", "2020"]);
    let report = update_financials(&store, &fetcher, &tickers(&["CCP"]), Period::Annual, false)
        .await
        .unwrap();
    assert!(report.is_empty());

    let merged = store.load_financials("CCP", Period::Annual).await.unwrap();
    let income = merged.income().unwrap();
    assert_eq!(income.columns(), ["2021", "2020", "2019"]);
    assert_eq!(income.get("Sales/Revenue", "2020"), Some(1100.0));
    assert_eq!(income.get("Sales/Revenue", "2019"), Some(900.0));
    assert!(merged.assets().is_some());
}

#[tokio::test]
async fn update_without_a_stored_set_saves_the_scrape() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path(), Exchange::ASX);
    let fetcher = StubFetcher::default().with_ticker("MLD", &["2021", "2020"]);

    let batch = tickers(&["MLD", "GONE"]);
    let report = update_financials(&store, &fetcher, &batch, Period::Interim, false)
        .await
        .unwrap();

    let saved = store.load_financials("MLD", Period::Interim).await.unwrap();
    assert_eq!(saved.num_columns(), 2);
    assert_eq!(report.get("GONE"), Some("Page load error - interim income"));
}

#[tokio::test]
async fn update_stops_on_a_mismatched_stored_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path(), Exchange::ASX);
    let resource = Resource::Financials {
        ticker: "CCP".into(),
        period: Period::Annual,
    };
    store
        .save_encoded(&resource, &FinancialStatementSet::new("MLD", Period::Annual))
        .await
        .unwrap();

    let fetcher = StubFetcher::default().with_ticker("CCP", &["2021", "2020"]);
    let result =
        update_financials(&store, &fetcher, &tickers(&["CCP"]), Period::Annual, false).await;
    assert!(matches!(result, Err(Error::IdentityMismatch { .. })));
}

#[tokio::test]
async fn key_stock_data_is_joined_onto_listed_companies() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path(), Exchange::ASX);
    let csv = "ASX code,Company name,GICS industry group\n\
        CCP,Credit Corp Group,Diversified Financials\n\
        MLD,MACA Limited,Capital Goods\n";
    let mut listed = ListedCompanies::from_csv(Exchange::ASX, csv.as_bytes()).unwrap();

    let mut fetcher = StubFetcher::default();
    fetcher.overviews.insert("CCP".into(), OVERVIEW.into());

    let batch = tickers(&["CCP", "MLD"]);
    let report = update_key_stock_data(&store, &fetcher, &mut listed, &batch, false)
        .await
        .unwrap();

    assert_eq!(listed.table.get("CCP", "P/E Ratio"), Some("14.25"));
    assert_eq!(listed.table.get("CCP", "Market Cap"), Some("1234.5"));
    assert_eq!(listed.table.get("CCP", "Ex-Dividend Date"), Some("Aug 25, 2021"));
    assert_eq!(listed.table.get("MLD", "P/E Ratio"), Some(""));
    assert_eq!(report.get("MLD"), Some("Page load error - overview"));
    assert!(store.exists(&Resource::Overview { ticker: "CCP".into() }).await);
}

mod common;

use common::{balance_page, cashflow_page, income_page, page, table_html, StubFetcher};
use fin_spider::assemble::{assemble, locate_tables, Stage};
use fin_spider::statements::{Period, StatementKind, WSJ_TABLES};
use fin_spider::Error;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn every_kind_is_assembled() {
    let fetcher = StubFetcher::default().with_ticker("CCP", &["2021", "2020"]);

    let assembly = assemble("CCP", Period::Annual, &WSJ_TABLES, &fetcher).await;
    assert!(!assembly.is_failed());
    assert!(assembly.errors.is_empty());
    assert_eq!(assembly.failure_reason(), None);
    assert_eq!(assembly.pages.len(), 3);

    let set = &assembly.set;
    assert_eq!(set.ticker(), "CCP");
    assert_eq!(set.period(), Period::Annual);
    assert_eq!(set.income().unwrap().columns(), ["2021", "2020"]);
    assert_eq!(set.income().unwrap().get("Net Income", "2021"), Some(-12.0));
    assert_eq!(set.income().unwrap().get("Net Income", "2020"), Some(85.0));
    assert_eq!(set.assets().unwrap().get("Total Assets", "2021"), Some(2000.0));
    assert_eq!(
        set.liabilities().unwrap().rows(),
        ["ST Debt & Current Portion LT Debt", "Total Liabilities"]
    );
    assert_eq!(set.operating().unwrap().get("Net Operating Cash Flow", "2020"), Some(190.0));
    assert_eq!(set.investing().unwrap().get("Capital Expenditures", "2021"), Some(-60.0));
    assert_eq!(
        set.financing().unwrap().get("Cash Dividends Paid - Total", "2021"),
        Some(-40.0)
    );
    assert_eq!(set.last_year(), Some(2021));
    assert_eq!(set.num_columns(), 2);
}

#[tokio::test]
async fn a_missing_page_drops_only_its_kind() {
    let fetcher = StubFetcher::default()
        .with_page("CCP", StatementKind::Income, Period::Annual, income_page(&["2021", "2020"]))
        .with_page("CCP", StatementKind::Cashflow, Period::Annual, cashflow_page());

    let assembly = assemble("CCP", Period::Annual, &WSJ_TABLES, &fetcher).await;
    assert!(!assembly.is_failed());
    assert!(assembly.set.statement(StatementKind::Balance).is_none());
    assert!(assembly.set.statement(StatementKind::Cashflow).is_some());

    assert_eq!(assembly.errors.len(), 1);
    assert_eq!(assembly.errors[0].kind, StatementKind::Balance);
    assert_eq!(assembly.errors[0].stage, Stage::PageLoad);
    assert_eq!(
        assembly.failure_reason().as_deref(),
        Some("Page load error - annual balance")
    );
}

#[tokio::test]
async fn one_unlocatable_table_drops_the_whole_kind() {
    // the liabilities table is missing from the balance page
    let assets_only = page(&[table_html(
        &["2021", "2020", "5-year trend"],
        &[("Cash & Short Term Investments", &["50", "40"])],
    )]);
    let fetcher = StubFetcher::default()
        .with_ticker("CCP", &["2021", "2020"])
        .with_page("CCP", StatementKind::Balance, Period::Annual, assets_only);

    let assembly = assemble("CCP", Period::Annual, &WSJ_TABLES, &fetcher).await;
    assert!(!assembly.is_failed());
    assert!(assembly.set.assets().is_none());
    assert!(assembly.set.liabilities().is_none());
    assert!(matches!(
        assembly.errors[0].error,
        Error::TableNotFound { .. }
    ));
    assert_eq!(assembly.errors[0].stage, Stage::Scrape);
    // the page is kept for the archive even though scraping failed
    assert_eq!(assembly.pages.len(), 3);
}

#[tokio::test]
async fn primary_failure_fails_the_ticker() {
    let fetcher = StubFetcher::default()
        .with_page("CCP", StatementKind::Income, Period::Interim, income_page(&["Q1", "Q2"]))
        .with_page("CCP", StatementKind::Balance, Period::Interim, balance_page())
        .with_page("CCP", StatementKind::Cashflow, Period::Interim, cashflow_page());

    let assembly = assemble("CCP", Period::Interim, &WSJ_TABLES, &fetcher).await;
    assert!(assembly.is_failed());
    assert!(assembly.set.income().is_none());
    assert!(matches!(
        assembly.errors[0].error,
        Error::InsufficientData { .. }
    ));
    assert_eq!(
        assembly.failure_reason().as_deref(),
        Some("Scraper error - interim income")
    );
}

#[tokio::test]
async fn nothing_fetched_is_a_failure() {
    let fetcher = StubFetcher::default();

    let assembly = assemble("MLD", Period::Annual, &WSJ_TABLES, &fetcher).await;
    assert!(assembly.is_failed());
    assert!(assembly.pages.is_empty());
    assert!(assembly.set.is_empty());
    assert_eq!(assembly.errors.len(), 3);
    assert_eq!(
        assembly.failure_reason().as_deref(),
        Some("Page load error - annual income")
    );
}

#[test]
fn tables_are_named_by_the_configuration() {
    let tables = &WSJ_TABLES[&StatementKind::Cashflow];

    let statement = locate_tables(&cashflow_page(), tables).unwrap();
    assert_eq!(
        statement.keys().collect::<Vec<_>>(),
        ["financing", "investing", "operating"]
    );
}

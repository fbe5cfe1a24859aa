use fin_spider::fs::Store;
use fin_spider::statements::Exchange;
use fin_spider::summary::{Company, ListedCompanies, SummaryTable, ValuationSummary};
use fin_spider::Error;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

const NYSE_LISTING: &str = "Symbol,Name,Sector,Industry,Market Cap\n\
    MMM,3M Company,Industrials,Conglomerates,95000\n\
    ABT,Abbott Laboratories,Health Care,Medical Devices,190000\n\
    ZZZ,,,,\n";

#[test]
fn listing_keys_are_the_ticker_column() {
    let listed = ListedCompanies::from_csv(Exchange::NYSE, NYSE_LISTING.as_bytes()).unwrap();

    assert_eq!(listed.tickers(), ["MMM", "ABT", "ZZZ"]);
    assert_eq!(listed.table.index_heading(), "Symbol");
    assert_eq!(listed.table.columns(), ["Name", "Sector", "Industry", "Market Cap"]);
    assert_eq!(listed.table.get("ABT", "Market Cap"), Some("190000"));
}

#[test]
fn company_records_skip_unnamed_rows() {
    let listed = ListedCompanies::from_csv(Exchange::NYSE, NYSE_LISTING.as_bytes()).unwrap();

    let records = listed.company_records();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0],
        Company {
            ticker: "MMM".into(),
            exchange: Exchange::NYSE,
            name: "3M Company".into(),
            sector: Some("Industrials".into()),
            industry_group: Some("Conglomerates".into()),
        }
    );
}

#[test]
fn asx_listing_has_no_sector() {
    let csv = "ASX code,Company name,GICS industry group\nCCP,Credit Corp Group,Diversified Financials\n";
    let listed = ListedCompanies::from_csv(Exchange::ASX, csv.as_bytes()).unwrap();

    let company = listed.company_record("CCP").unwrap();
    assert_eq!(company.sector, None);
    assert_eq!(company.industry_group.as_deref(), Some("Diversified Financials"));
}

#[test]
fn asx_download_title_lines_are_skipped() {
    let csv = "ASX listed companies as at Mon Oct 11 21:00:08 AEDT 2021\n\
        \n\
        Company name,ASX code,GICS industry group\n\
        \"CREDIT CORP GROUP LIMITED\",\"CCP\",\"Diversified Financials\"\n\
        \"MACA LIMITED\",\"MLD\",\"Capital Goods\"\n";

    let listed = ListedCompanies::from_csv(Exchange::ASX, csv.as_bytes()).unwrap();
    assert_eq!(listed.tickers(), ["CCP", "MLD"]);
    assert_eq!(listed.table.columns(), ["Company name", "GICS industry group"]);
    assert_eq!(
        listed.company_record("MLD").unwrap().name,
        "MACA LIMITED".to_string()
    );
}

#[test]
fn wrong_headings_are_rejected() {
    assert!(matches!(
        ListedCompanies::from_csv(Exchange::ASX, NYSE_LISTING.as_bytes()),
        Err(Error::TableNotFound { .. })
    ));
}

#[test]
fn join_adds_columns_and_ignores_unknown_keys() {
    let mut table = SummaryTable::new("ticker", vec!["name".into()]);
    table.insert_row("CCP", vec!["Credit Corp".into()]);
    table.insert_row("MLD", vec!["MACA".into()]);

    let new_data = BTreeMap::from([
        (
            "CCP".to_string(),
            BTreeMap::from([("P/E Ratio".to_string(), "14.25".to_string())]),
        ),
        (
            "XYZ".to_string(),
            BTreeMap::from([("Yield".to_string(), "3.1".to_string())]),
        ),
    ]);
    table.join(&new_data);

    assert_eq!(table.keys(), ["CCP", "MLD"]);
    assert_eq!(table.columns(), ["name", "P/E Ratio", "Yield"]);
    assert_eq!(table.get("CCP", "P/E Ratio"), Some("14.25"));
    assert_eq!(table.get("MLD", "P/E Ratio"), Some(""));
}

#[test]
fn csv_round_trip_keeps_quoted_cells() {
    let mut table = SummaryTable::new("ticker", vec!["name".into(), "price".into()]);
    table.insert_row("MMM", vec!["3M, Company".into(), "150.2".into()]);
    table.insert_row("MMM", vec!["3M Company".into(), "151.0".into()]);

    let bytes = table.to_csv().unwrap();
    let read = SummaryTable::from_csv(&bytes, "ticker").unwrap();
    assert_eq!(read, table);
    assert_eq!(read.get("MMM", "price"), Some("151.0"));
}

#[tokio::test]
async fn valuation_summaries_are_saved_by_date() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path(), Exchange::ASX);
    let mut table = SummaryTable::new(ValuationSummary::INDEX, vec!["pe".into()]);
    table.insert_row("CCP", vec!["14.25".into()]);
    let summary = ValuationSummary {
        date: "20211231".into(),
        table,
    };

    summary.save(&store).await.unwrap();
    assert!(dir
        .path()
        .join("Valuations/ASX/ValuationSummary20211231.csv")
        .exists());

    let loaded = ValuationSummary::load(&store, "20211231").await.unwrap();
    assert_eq!(loaded.table, summary.table);
}

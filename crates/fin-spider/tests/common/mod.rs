#![allow(dead_code)]

use fin_spider::Result;
use fin_spider::fetch::{PageFetcher, RawStatementPage};
use fin_spider::statements::{Period, StatementKind};
use fin_spider::table::PeriodTable;
use fin_spider::Error;
use std::collections::HashMap;

const LABEL_HEADING: &str = "Fiscal year is July-June. All values AUD Millions.";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
}

/// A WSJ-style statement table: a label heading, period headings, then a trend column.
pub fn table_html(columns: &[&str], rows: &[(&str, &[&str])]) -> String {
    let mut html = String::from("<table class=\"crDataTable\"><thead><tr>");
    html.push_str(&format!("<th>{LABEL_HEADING}</th>"));
    for col in columns {
        html.push_str(&format!("<th>{}</th>", escape(col)));
    }
    html.push_str("</tr></thead><tbody>");
    for (label, cells) in rows {
        html.push_str(&format!("<tr><td class=\"rowTitle\">{}</td>", escape(label)));
        for cell in *cells {
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("<td><div class=\"miniGraph\"></div></td></tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn page(tables: &[String]) -> String {
    format!(
        "<html><body>\
        <table><tr><td>Overview</td><td>Financials</td><td>Research Ratings</td></tr></table>\
        {}\
        </body></html>",
        tables.join("<p>Values in millions</p>")
    )
}

const ANNUAL: [&str; 3] = ["2021", "2020", "5-year trend"];

pub fn income_page(years: &[&str]) -> String {
    let mut columns = years.to_vec();
    columns.push("5-year trend");
    let width = years.len();
    page(&[table_html(
        &columns,
        &[
            ("Sales/Revenue", &["1,200", "1,100", "1,000", "900"][..width]),
            ("Gross Income", &["400", "380", "350", "300"][..width]),
            ("Net Income", &["(12)", "85", "-", "70"][..width]),
        ],
    )])
}

pub fn balance_page() -> String {
    page(&[
        table_html(
            &ANNUAL,
            &[
                ("Cash & Short Term Investments", &["50", "40"]),
                ("Total Assets", &["2,000", "1,900"]),
            ],
        ),
        table_html(
            &ANNUAL,
            &[
                ("ST Debt & Current Portion LT Debt", &["30", "25"]),
                ("Total Liabilities", &["800", "850"]),
            ],
        ),
    ])
}

pub fn cashflow_page() -> String {
    page(&[
        table_html(&ANNUAL, &[("Net Operating Cash Flow", &["210", "190"])]),
        table_html(&ANNUAL, &[("Capital Expenditures", &["(60)", "(55)"])]),
        table_html(&ANNUAL, &[("Cash Dividends Paid - Total", &["(40)", "(38)"])]),
    ])
}

/// Statement pages held in memory; missing pages fail as a fetch would.
#[derive(Default)]
pub struct StubFetcher {
    pub pages: HashMap<(String, StatementKind, Period), String>,
    pub overviews: HashMap<String, String>,
}

impl StubFetcher {
    pub fn with_page(
        mut self,
        ticker: &str,
        kind: StatementKind,
        period: Period,
        html: String,
    ) -> Self {
        self.pages.insert((ticker.to_string(), kind, period), html);
        self
    }

    /// All three annual and interim pages of `ticker`.
    pub fn with_ticker(self, ticker: &str, years: &[&str]) -> Self {
        let mut fetcher = self;
        for period in Period::ALL {
            fetcher = fetcher
                .with_page(ticker, StatementKind::Income, period, income_page(years))
                .with_page(ticker, StatementKind::Balance, period, balance_page())
                .with_page(ticker, StatementKind::Cashflow, period, cashflow_page());
        }
        fetcher
    }
}

impl PageFetcher for StubFetcher {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
        period: Period,
    ) -> Result<RawStatementPage> {
        match self.pages.get(&(ticker.to_string(), kind, period)) {
            Some(html) => Ok(RawStatementPage {
                ticker: ticker.to_string(),
                kind,
                period,
                html: html.clone(),
            }),
            None => Err(Error::Fetch {
                location: format!("{ticker}/{period}/{kind}"),
                reason: "404 Not Found".to_string(),
            }),
        }
    }

    async fn fetch_overview(&self, ticker: &str) -> Result<String> {
        self.overviews.get(ticker).cloned().ok_or_else(|| Error::Fetch {
            location: format!("{ticker}/overview"),
            reason: "404 Not Found".to_string(),
        })
    }
}

/// A table with every cell present.
pub fn table(columns: &[&str], rows: &[(&str, &[f64])]) -> PeriodTable {
    PeriodTable::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|(label, cells)| (label.to_string(), cells.iter().map(|v| Some(*v)).collect()))
            .collect(),
    )
}

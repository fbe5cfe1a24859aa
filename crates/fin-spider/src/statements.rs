use crate::error::{Error, Result};
use crate::table::PeriodTable;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// identity
// ----------------------------------------------------------------------------

/// Stock exchange a ticker is listed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Exchange {
    ASX,
    NYSE,
}

impl Exchange {
    pub fn symbol(&self) -> &'static str {
        match self {
            Exchange::ASX => "ASX",
            Exchange::NYSE => "NYSE",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASX" => Ok(Exchange::ASX),
            "NYSE" => Ok(Exchange::NYSE),
            other => Err(format!("unknown exchange {other}")),
        }
    }
}

/// Reporting cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Annual,
    Interim,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Annual, Period::Interim];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Annual => "annual",
            Period::Interim => "interim",
        }
    }

    /// Name of the period's folder under `Financials/`.
    pub fn folder(&self) -> &'static str {
        match self {
            Period::Annual => "Annual",
            Period::Interim => "Interim",
        }
    }

    /// Parse a column label of this period into the date it reports to.
    ///
    /// Annual labels are years (`"2019"`), taken as the 31st of December; interim labels are
    /// dates such as `"30-Jun-2021"`.
    pub fn column_date(&self, label: &str) -> Option<NaiveDate> {
        let label = label.trim();
        match self {
            Period::Annual => label
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 12, 31)),
            Period::Interim => NaiveDate::parse_from_str(label, "%d-%b-%Y").ok(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annual" => Ok(Period::Annual),
            "interim" | "quarter" => Ok(Period::Interim),
            other => Err(format!("should be 'annual', 'interim' or 'quarter', found {other}")),
        }
    }
}

/// One statement page: income, balance sheet or cash flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Income,
    Balance,
    Cashflow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::Income,
        StatementKind::Balance,
        StatementKind::Cashflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
            StatementKind::Cashflow => "cashflow",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(StatementKind::Income),
            "balance" => Ok(StatementKind::Balance),
            "cashflow" => Ok(StatementKind::Cashflow),
            other => Err(format!("unknown statement kind {other}")),
        }
    }
}

// search configuration
// ----------------------------------------------------------------------------

/// What to look for on each statement page: `kind -> (sub-table name -> contained text)`.
///
/// The first kind is the primary statement; a ticker without it is not saved.
pub type SearchConfig = BTreeMap<StatementKind, BTreeMap<String, String>>;

lazy_static::lazy_static! {
    /// Search terms locating each table on WSJ statement pages.
    ///
    /// Reading left to right: in the `income` page, the `income` table contains `Sales/Revenue`.
    pub static ref WSJ_TABLES: SearchConfig = {
        let page = |tables: &[(&str, &str)]| -> BTreeMap<String, String> {
            tables
                .iter()
                .map(|(table, contains)| (table.to_string(), contains.to_string()))
                .collect()
        };

        let mut map = BTreeMap::new();
        map.insert(StatementKind::Income, page(&[("income", "Sales/Revenue")]));
        map.insert(
            StatementKind::Balance,
            page(&[
                ("assets", "Cash & Short Term Investments"),
                ("liabilities", "ST Debt & Current Portion LT Debt"),
            ]),
        );
        map.insert(
            StatementKind::Cashflow,
            page(&[
                ("operating", "Net Operating Cash Flow"),
                ("investing", "Capital Expenditures"),
                ("financing", "Cash Dividends Paid - Total"),
            ]),
        );
        map
    };
}

// statement set
// ----------------------------------------------------------------------------

/// Tables of one statement page, by sub-table name.
pub type Statement = BTreeMap<String, PeriodTable>;

/// Every statement table scraped for one ticker and period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatementSet {
    ticker: String,
    period: Period,
    statements: BTreeMap<StatementKind, Statement>,
}

impl FinancialStatementSet {
    pub fn new(ticker: impl Into<String>, period: Period) -> Self {
        Self {
            ticker: ticker.into(),
            period,
            statements: BTreeMap::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn statements(&self) -> &BTreeMap<StatementKind, Statement> {
        &self.statements
    }

    pub fn statement(&self, kind: StatementKind) -> Option<&Statement> {
        self.statements.get(&kind)
    }

    pub fn table(&self, kind: StatementKind, name: &str) -> Option<&PeriodTable> {
        self.statements.get(&kind)?.get(name)
    }

    pub fn insert_statement(&mut self, kind: StatementKind, tables: Statement) {
        self.statements.insert(kind, tables);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Fail with [`Error::IdentityMismatch`] unless `ticker` and `period` are this set's.
    pub fn confirm_match(&self, ticker: &str, period: Period) -> Result<()> {
        if ticker != self.ticker || period != self.period {
            return Err(Error::IdentityMismatch {
                expected_ticker: self.ticker.clone(),
                expected_period: self.period,
                found_ticker: ticker.to_string(),
                found_period: period,
            });
        }
        Ok(())
    }

    pub fn income(&self) -> Option<&PeriodTable> {
        self.table(StatementKind::Income, "income")
    }

    pub fn assets(&self) -> Option<&PeriodTable> {
        self.table(StatementKind::Balance, "assets")
    }

    pub fn liabilities(&self) -> Option<&PeriodTable> {
        self.table(StatementKind::Balance, "liabilities")
    }

    pub fn operating(&self) -> Option<&PeriodTable> {
        self.table(StatementKind::Cashflow, "operating")
    }

    pub fn investing(&self) -> Option<&PeriodTable> {
        self.table(StatementKind::Cashflow, "investing")
    }

    pub fn financing(&self) -> Option<&PeriodTable> {
        self.table(StatementKind::Cashflow, "financing")
    }

    /// Year of the most recent income column.
    pub fn last_year(&self) -> Option<i32> {
        let label = self.income()?.columns().first()?;
        self.period.column_date(label).map(|date| date.year())
    }

    /// Number of periods in the income table.
    pub fn num_columns(&self) -> usize {
        self.income().map_or(0, |table| table.columns().len())
    }
}

/// Merge a fresh scrape (`incoming`) into a previously stored set (`existing`).
///
/// Statements and sub-tables only one side has are carried over untouched; tables both sides
/// have are joined with [`PeriodTable::merge_columns`], so the newest figures come from
/// `incoming` and historical periods it no longer shows are kept.
pub fn merge(
    existing: FinancialStatementSet,
    incoming: FinancialStatementSet,
) -> Result<FinancialStatementSet> {
    existing.confirm_match(&incoming.ticker, incoming.period)?;

    let mut merged = existing;
    for (kind, new_tables) in incoming.statements {
        let sheet = merged.statements.entry(kind).or_default();
        for (name, new_table) in new_tables {
            let joined = match sheet.get(&name) {
                Some(old_table) => PeriodTable::merge_columns(old_table, new_table),
                None => new_table,
            };
            sheet.insert(name, joined);
        }
    }

    Ok(merged)
}

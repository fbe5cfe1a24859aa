use crate::error::{Error, Result};
use crate::fs::{Resource, Store};
use crate::statements::Exchange;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// A spreadsheet of text cells with one key column (the index) and named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummaryTable {
    index: String,
    columns: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

impl SummaryTable {
    pub fn new(index: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index: index.into(),
            columns,
            rows: vec![],
        }
    }

    /// Read CSV, taking the column headed `index` as the row keys.
    ///
    /// Lines before the heading row (the ASX download opens with a title line) are skipped; the
    /// heading row is the first to contain `index`.
    pub fn from_csv(bytes: &[u8], index: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();
        let (headers, index_ix) = loop {
            let Some(record) = records.next() else {
                return Err(Error::TableNotFound {
                    search_term: index.to_string(),
                });
            };
            let headers: Vec<String> = record?.iter().map(|h| h.trim().to_string()).collect();
            if let Some(index_ix) = headers.iter().position(|heading| heading == index) {
                break (headers, index_ix);
            }
            trace!("skipping preamble line {headers:?}");
        };

        let columns = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index_ix)
            .map(|(_, heading)| heading.clone())
            .collect();
        let mut table = Self::new(index, columns);

        for record in records {
            let record = record?;
            let key = record.get(index_ix).unwrap_or_default().trim().to_string();
            if key.is_empty() {
                continue;
            }
            let values = (0..headers.len())
                .filter(|i| *i != index_ix)
                .map(|i| record.get(i).unwrap_or_default().to_string())
                .collect();
            table.insert_row(key, values);
        }
        Ok(table)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record(std::iter::once(&self.index).chain(self.columns.iter()))?;
        for (key, values) in &self.rows {
            writer.write_record(std::iter::once(key).chain(values.iter()))?;
        }
        writer.into_inner().map_err(|err| Error::Io(err.into_error()))
    }

    pub fn index_heading(&self) -> &str {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row keys, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn get(&self, key: &str, column: &str) -> Option<&str> {
        let c = self.columns.iter().position(|heading| heading == column)?;
        let (_, values) = self.rows.iter().find(|(k, _)| k == key)?;
        values.get(c).map(String::as_str)
    }

    /// Append a row, or replace the row already under `key`.
    pub fn insert_row(&mut self, key: impl Into<String>, mut values: Vec<String>) {
        let key = key.into();
        values.resize(self.columns.len(), String::new());
        match self.rows.iter_mut().find(|(k, _)| *k == key) {
            Some((_, row)) => *row = values,
            None => self.rows.push((key, values)),
        }
    }

    /// Left join `new_data` (`key -> column -> value`) onto the table: new columns are added,
    /// keys the table lacks are ignored.
    pub fn join(&mut self, new_data: &BTreeMap<String, BTreeMap<String, String>>) {
        for heading in new_data.values().flat_map(|row| row.keys()) {
            if !self.columns.contains(heading) {
                self.columns.push(heading.clone());
                for (_, values) in self.rows.iter_mut() {
                    values.push(String::new());
                }
            }
        }

        for (key, values) in self.rows.iter_mut() {
            let Some(new_row) = new_data.get(key.as_str()) else {
                continue;
            };
            for (heading, value) in new_row {
                if let Some(c) = self.columns.iter().position(|h| h == heading) {
                    values[c] = value.clone();
                }
            }
        }
    }
}

// listed companies
// ----------------------------------------------------------------------------

/// Column headings of an exchange's listed companies download.
#[derive(Clone, Copy, Debug)]
pub struct Headings {
    pub ticker: &'static str,
    pub name: &'static str,
    pub sector: Option<&'static str>,
    pub industry: &'static str,
}

impl Headings {
    pub fn of(exchange: Exchange) -> Self {
        match exchange {
            Exchange::ASX => Headings {
                ticker: "ASX code",
                name: "Company name",
                sector: None,
                industry: "GICS industry group",
            },
            Exchange::NYSE => Headings {
                ticker: "Symbol",
                name: "Name",
                sector: Some("Sector"),
                industry: "Industry",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Company {
    pub ticker: String,
    pub exchange: Exchange,
    pub name: String,
    pub sector: Option<String>,
    pub industry_group: Option<String>,
}

/// Companies listed on an exchange, keyed by ticker.
#[derive(Clone, Debug)]
pub struct ListedCompanies {
    pub exchange: Exchange,
    pub table: SummaryTable,
}

impl ListedCompanies {
    pub fn from_csv(exchange: Exchange, bytes: &[u8]) -> Result<Self> {
        let table = SummaryTable::from_csv(bytes, Headings::of(exchange).ticker)?;
        Ok(Self { exchange, table })
    }

    pub async fn load(store: &Store) -> Result<Self> {
        let bytes = store.load(&Resource::ListedCompanies).await?;
        Self::from_csv(store.exchange(), &bytes)
    }

    pub async fn save(&self, store: &Store) -> Result<()> {
        store
            .save(&Resource::ListedCompanies, &self.table.to_csv()?)
            .await
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.table.keys()
    }

    pub fn update(&mut self, new_data: &BTreeMap<String, BTreeMap<String, String>>) {
        self.table.join(new_data);
    }

    pub fn company_record(&self, ticker: &str) -> Option<Company> {
        let headings = Headings::of(self.exchange);
        let cell = |heading: &str| {
            self.table
                .get(ticker, heading)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let Some(name) = cell(headings.name) else {
            warn!("no company name for [{ticker}] on {}", self.exchange);
            return None;
        };
        Some(Company {
            ticker: ticker.to_string(),
            exchange: self.exchange,
            name,
            sector: headings.sector.and_then(cell),
            industry_group: cell(headings.industry),
        })
    }

    /// A [`Company`] for every ticker with a name.
    pub fn company_records(&self) -> Vec<Company> {
        let records: Vec<Company> = self
            .tickers()
            .into_iter()
            .filter_map(|ticker| self.company_record(ticker))
            .collect();
        debug!("{} company records on {}", records.len(), self.exchange);
        records
    }
}

// valuations
// ----------------------------------------------------------------------------

/// Valuation metrics across tickers, as of `date` (`YYYYMMDD`).
#[derive(Clone, Debug)]
pub struct ValuationSummary {
    pub date: String,
    pub table: SummaryTable,
}

impl ValuationSummary {
    pub const INDEX: &'static str = "ticker";

    fn resource(date: &str) -> Resource {
        Resource::ValuationSummary {
            date: date.to_string(),
        }
    }

    pub async fn load(store: &Store, date: &str) -> Result<Self> {
        let bytes = store.load(&Self::resource(date)).await?;
        Ok(Self {
            date: date.to_string(),
            table: SummaryTable::from_csv(&bytes, Self::INDEX)?,
        })
    }

    pub async fn save(&self, store: &Store) -> Result<()> {
        store
            .save(&Self::resource(&self.date), &self.table.to_csv()?)
            .await
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sub-statement: line items (rows) crossed with reporting periods (columns).
///
/// Columns are kept in the order scraped, most recent first. Cells are `None` where the page
/// had no figure, or where a merge found no source for the cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTable {
    columns: Vec<String>,
    rows: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl PeriodTable {
    /// Build a table from row-major `values`; each row is padded or cut to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<(String, Vec<Option<f64>>)>) -> Self {
        let width = columns.len();
        let (rows, values) = rows
            .into_iter()
            .map(|(label, mut cells)| {
                cells.resize(width, None);
                (label, cells)
            })
            .unzip();
        Self {
            columns,
            rows,
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Value at the first row labelled `row`, in column `column`.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|label| label == row)?;
        let c = self.columns.iter().position(|label| label == column)?;
        self.values[r][c]
    }

    /// All values of column `column`, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let c = self.columns.iter().position(|label| label == column)?;
        Some(self.values.iter().map(|cells| cells[c]).collect())
    }

    /// All values of the first row labelled `row`, in column order.
    pub fn row(&self, row: &str) -> Option<&[Option<f64>]> {
        let r = self.rows.iter().position(|label| label == row)?;
        Some(&self.values[r])
    }

    /// Iterate `(row label, cells)` in row order.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.rows
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Join `incoming` onto `existing` by column label.
    ///
    /// Every incoming column is kept as-is; existing columns whose label is not in `incoming`
    /// are appended after them, in their original order. Rows are the union of both tables:
    /// incoming rows first, then rows only the existing table has.
    ///
    /// ```rust
    /// use fin_spider::table::PeriodTable;
    ///
    /// let existing = PeriodTable::new(
    ///     vec!["2020".into(), "2019".into()],
    ///     vec![("Revenue".into(), vec![Some(9.0), Some(8.0)])],
    /// );
    /// let incoming = PeriodTable::new(
    ///     vec!["2021".into(), "2020".into()],
    ///     vec![("Revenue".into(), vec![Some(11.0), Some(10.0)])],
    /// );
    ///
    /// let merged = PeriodTable::merge_columns(&existing, incoming);
    /// assert_eq!(merged.columns(), ["2021", "2020", "2019"]);
    /// assert_eq!(merged.get("Revenue", "2020"), Some(10.0));
    /// assert_eq!(merged.get("Revenue", "2019"), Some(8.0));
    /// ```
    pub fn merge_columns(existing: &PeriodTable, incoming: PeriodTable) -> PeriodTable {
        let appended: Vec<usize> = existing
            .columns
            .iter()
            .enumerate()
            .filter(|(_, label)| !incoming.columns.contains(label))
            .map(|(i, _)| i)
            .collect();

        let mut columns = incoming.columns.clone();
        columns.extend(appended.iter().map(|&i| existing.columns[i].clone()));

        // first occurrence wins for repeated line items
        let mut existing_rows: HashMap<&str, usize> = HashMap::new();
        for (i, label) in existing.rows.iter().enumerate() {
            existing_rows.entry(label.as_str()).or_insert(i);
        }

        let pick = |row: Option<usize>| -> Vec<Option<f64>> {
            appended
                .iter()
                .map(|&c| row.and_then(|r| existing.values[r][c]))
                .collect()
        };

        let mut rows = Vec::with_capacity(incoming.rows.len());
        let mut values = Vec::with_capacity(incoming.rows.len());
        for (label, mut cells) in incoming.rows.iter().zip(incoming.values) {
            cells.extend(pick(existing_rows.get(label.as_str()).copied()));
            rows.push(label.clone());
            values.push(cells);
        }

        let width = incoming.columns.len();
        for (i, label) in existing.rows.iter().enumerate() {
            if incoming.rows.contains(label) {
                continue;
            }
            let mut cells = vec![None; width];
            cells.extend(pick(Some(i)));
            rows.push(label.clone());
            values.push(cells);
        }

        PeriodTable {
            columns,
            rows,
            values,
        }
    }
}

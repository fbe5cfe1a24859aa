use crate::error::{Error, Result};
use crate::table::PeriodTable;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

lazy_static::lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").expect("valid table selector");
    static ref ROW: Selector = Selector::parse("tr").expect("valid row selector");

    /// A standalone four-digit year, 19xx or 20xx; e.g. `2021` or `30-Jun-2021`.
    static ref YEAR: Regex =
        Regex::new(r"(?:^|\D)(?:19|20)\d{2}(?:\D|$)").expect("valid year regex");
}

/// Header token marking the first decorative (sparkline) column of a statement table.
pub const TREND_TOKEN: &str = "trend";

/// Largest `colspan` honoured; HTML caps the attribute at 1000.
const MAX_COLSPAN: usize = 1000;

/// Find the first table in `markup` whose text contains `search_term`, and clean it into a
/// [`PeriodTable`].
///
/// The table is cut at its first "trend" column, repeated column headings keep only their first
/// column, rows without a text label are dropped, and every remaining column must be labelled
/// by a year or a date.
pub fn locate(markup: &str, search_term: &str) -> Result<PeriodTable> {
    let document = Html::parse_document(markup);
    let table = document
        .select(&TABLE)
        .find(|table| norm_text(table.text()).contains(search_term))
        .ok_or_else(|| Error::TableNotFound {
            search_term: search_term.to_string(),
        })?;
    trace!("table found containing \"{search_term}\"");

    let rows = own_rows(table);
    let header_ix = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell.is_header))
        .unwrap_or(0);

    // the first header cell names the line-item column
    let mut columns: Vec<String> = rows
        .get(header_ix)
        .map(|row| row.iter().skip(1).map(|cell| cell.text.clone()).collect())
        .unwrap_or_default();

    // everything from the trend column rightwards is decoration
    if let Some(trend_ix) = columns.iter().position(|col| col.contains(TREND_TOKEN)) {
        columns.truncate(trend_ix);
    }
    if columns.is_empty() {
        return Err(Error::MalformedTable {
            search_term: search_term.to_string(),
        });
    }

    // a repeated heading (e.g. a spanned header cell) keeps its first column only
    let keep: Vec<usize> = (0..columns.len())
        .filter(|&i| !columns[..i].contains(&columns[i]))
        .collect();
    if keep.len() < columns.len() {
        trace!(
            "dropping {} repeated column(s) under \"{search_term}\"",
            columns.len() - keep.len()
        );
    }
    let columns: Vec<String> = keep.iter().map(|&i| columns[i].clone()).collect();

    let data: Vec<(String, Vec<Option<f64>>)> = rows
        .into_iter()
        .skip(header_ix + 1)
        .filter_map(|row| {
            let mut cells = row.into_iter();
            let label = cells.next()?.text;
            if !is_line_item(&label) {
                return None;
            }
            let cells: Vec<Cell> = cells.collect();
            let values = keep
                .iter()
                .map(|&i| cells.get(i).and_then(|cell| parse_value(&cell.text)))
                .collect();
            Some((label, values))
        })
        .collect();

    check_years(search_term, &columns)?;

    Ok(PeriodTable::new(columns, data))
}

/// Fail with [`Error::InsufficientData`] unless every column is labelled with a year.
pub fn check_years(search_term: &str, columns: &[String]) -> Result<()> {
    if columns.iter().all(|col| YEAR.is_match(col)) {
        Ok(())
    } else {
        Err(Error::InsufficientData {
            search_term: search_term.to_string(),
            columns: columns.to_vec(),
        })
    }
}

/// Parse a statement cell into a figure.
///
/// Thousands separators and a trailing `%` are ignored, and accounting negatives `(12.5)` are
/// read as `-12.5`. Dashes, blanks and any other text are missing values.
///
/// ```rust
/// use fin_spider::locate::parse_value;
///
/// assert_eq!(parse_value("1,234.5"), Some(1234.5));
/// assert_eq!(parse_value("(12)"), Some(-12.0));
/// assert_eq!(parse_value("8.1%"), Some(8.1));
/// assert_eq!(parse_value("-"), None);
/// ```
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, text),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | '%') && !c.is_whitespace())
        .collect();
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

// a label must be text; blank rows and stray numeric index rows are not line items
fn is_line_item(label: &str) -> bool {
    !label.is_empty() && label.parse::<f64>().is_err()
}

struct Cell {
    text: String,
    is_header: bool,
}

/// Rows belonging to `table` itself, skipping rows of nested tables, with `colspan` expanded.
fn own_rows(table: ElementRef<'_>) -> Vec<Vec<Cell>> {
    table
        .select(&ROW)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "table")
                .map(|el| el.id())
                == Some(table.id())
        })
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|el| matches!(el.value().name(), "th" | "td"))
                .flat_map(|el| {
                    let span = el
                        .value()
                        .attr("colspan")
                        .and_then(|span| span.trim().parse::<usize>().ok())
                        .unwrap_or(1)
                        .clamp(1, MAX_COLSPAN);
                    let text = norm_text(el.text());
                    let is_header = el.value().name() == "th";
                    (0..span).map(move |_| Cell {
                        text: text.clone(),
                        is_header,
                    })
                })
                .collect::<Vec<Cell>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Join text nodes and collapse whitespace.
pub(crate) fn norm_text<'a>(text: impl Iterator<Item = &'a str>) -> String {
    text.collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

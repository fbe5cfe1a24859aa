use crate::error::{Error, Result};
use crate::locate::norm_text;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Element id of the key stock data drawer on a WSJ overview page.
const KEY_STOCK_DRAWER: &str = "cr_keystock_drawer";

lazy_static::lazy_static! {
    static ref DRAWER: Selector =
        Selector::parse(&format!("#{KEY_STOCK_DRAWER}")).expect("valid drawer selector");
    static ref DIV: Selector = Selector::parse("div").expect("valid div selector");
    static ref ENTRY: Selector = Selector::parse("li").expect("valid entry selector");
    static ref LABEL: Selector = Selector::parse("h5").expect("valid label selector");
    static ref VALUE: Selector = Selector::parse("span").expect("valid value selector");
}

#[derive(Clone, Debug, PartialEq)]
pub enum KeyValue {
    Number(f64),
    Text(String),
}

/// Read the key stock data drawer (P/E, market cap, dividend yield, ...) into a label → value
/// map. Percent signs and the millions suffix `M` are dropped from values.
pub fn key_stock_data(markup: &str) -> Result<BTreeMap<String, KeyValue>> {
    let document = Html::parse_document(markup);
    let drawer = document
        .select(&DRAWER)
        .next()
        .and_then(|drawer| drawer.select(&DIV).next())
        .ok_or_else(|| Error::TableNotFound {
            search_term: KEY_STOCK_DRAWER.to_string(),
        })?;

    let mut data = BTreeMap::new();
    for entry in drawer.select(&ENTRY) {
        let Some(label) = entry.select(&LABEL).next() else {
            continue;
        };
        let label = norm_text(label.text());
        let value = entry.select(&VALUE).next().map(own_text).unwrap_or_default();
        data.insert(label, key_value(&value));
    }
    Ok(data)
}

// only the span's own text; child tags hold units and change markers
fn own_text(span: ElementRef<'_>) -> String {
    span.children()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect::<String>()
}

fn key_value(raw: &str) -> KeyValue {
    let value = raw.trim().replace(['%', 'M'], "");
    match value.trim().replace(',', "").parse::<f64>() {
        Ok(number) => KeyValue::Number(number),
        Err(_) => KeyValue::Text(value.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
    <div id="cr_keystock_drawer">
      <div>
        <ul>
          <li><h5>Open</h5><span>31.02</span></li>
          <li><h5>Market Cap</h5><span>2.1 <small>B</small></span></li>
          <li><h5>Shares Outstanding</h5><span>67.96 M</span></li>
          <li><h5>Yield</h5><span>2.35%</span></li>
          <li><h5>Ex-Dividend Date</h5><span>08/26/21</span></li>
          <li><span>unlabelled</span></li>
        </ul>
      </div>
    </div>
    </body></html>"#;

    #[test]
    fn drawer_entries() {
        let data = key_stock_data(PAGE).unwrap();

        assert_eq!(data.len(), 5);
        assert_eq!(data["Open"], KeyValue::Number(31.02));
        assert_eq!(data["Market Cap"], KeyValue::Number(2.1));
        assert_eq!(data["Shares Outstanding"], KeyValue::Number(67.96));
        assert_eq!(data["Yield"], KeyValue::Number(2.35));
        assert_eq!(data["Ex-Dividend Date"], KeyValue::Text("08/26/21".into()));
    }

    #[test]
    fn page_without_drawer() {
        assert!(matches!(
            key_stock_data("<html><body><div></div></body></html>"),
            Err(Error::TableNotFound { .. })
        ));
    }
}

//! Extraction result normalization and display formatting.
//!
//! The extraction service response is untrusted and often partial. It goes
//! through [`normalize`] exactly once, which either fills every field with a
//! usable value or rejects the payload with a [`RenderError`]. Everything
//! after that ([`ResultsView::from_result`]) is infallible.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;

/// Default values applied by [`normalize`].
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const UNNAMED_ITEM: &str = "Unnamed Item";
pub const NO_ITEMS: &str = "No items found";
pub const MISSING_DATE: &str = "N/A";

/// One line of a receipt.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiptItem {
    pub name: String,
    /// Never negative
    pub cost: f64,
}

/// A fully populated receipt, ready to be displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionResult {
    pub image_url: String,
    pub vendor_name: String,
    /// `YYYY-MM-DD` when the service got it right, empty when unknown
    pub date: String,
    pub currency: String,
    pub items: Vec<ReceiptItem>,
    pub tax: f64,
    pub total: f64,
}

/// The payload does not have the shape the results view can bind.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderError {
    pub reason: String,
}

impl RenderError {
    fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot display extraction result: {}", self.reason)
    }
}

impl std::error::Error for RenderError {}

/// Turn the raw `data` object of a successful response into an [`ExtractionResult`].
pub fn normalize(data: Option<&Value>) -> Result<ExtractionResult, RenderError> {
    let obj = match data {
        Some(Value::Object(obj)) => obj,
        Some(other) => return Err(RenderError::new(format!("data is {}", type_name(other)))),
        None => return Err(RenderError::new("data is missing")),
    };

    let items = match obj.get("receipt_items") {
        Some(Value::Array(raw)) => raw
            .iter()
            .enumerate()
            .map(|(i, item)| normalize_item(i, item))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(ExtractionResult {
        image_url: text_field(obj, "image_url", "")?,
        vendor_name: text_field(obj, "vendor_name", UNKNOWN_VENDOR)?,
        date: text_field(obj, "date", "")?,
        currency: text_field(obj, "currency", DEFAULT_CURRENCY)?,
        items,
        tax: number_field(obj, "tax"),
        total: number_field(obj, "total"),
    })
}

fn normalize_item(index: usize, item: &Value) -> Result<ReceiptItem, RenderError> {
    let obj = item.as_object().ok_or_else(|| {
        RenderError::new(format!("receipt item {} is {}", index, type_name(item)))
    })?;
    Ok(ReceiptItem {
        name: text_field(obj, "item_name", UNNAMED_ITEM)?,
        cost: number_field(obj, "item_cost").max(0.0),
    })
}

/// Missing, null, `false`, `0` or empty strings fall back to `default`;
/// other scalars are coerced; arrays and objects are rejected.
fn text_field(obj: &Map<String, Value>, key: &str, default: &str) -> Result<String, RenderError> {
    match obj.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(default.to_string()),
        Some(Value::String(s)) if s.is_empty() => Ok(default.to_string()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(true)) => Ok("true".to_string()),
        Some(other) => Err(RenderError::new(format!("{} is {}", key, type_name(other)))),
    }
}

/// Anything that is not a finite JSON number becomes 0.
fn number_field(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Display formatting
// =============================================================================

/// `$` followed by the amount with two decimals.
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// `2024-03-05` becomes `March 5, 2024`; unparseable input is returned
/// unchanged and empty input becomes `N/A`.
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() {
        return MISSING_DATE.to_string();
    }
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// A rendered row of the items table.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemRow {
    pub name: String,
    pub cost: String,
}

/// Rows of the items table.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemRows {
    /// A single row spanning both columns saying [`NO_ITEMS`]
    Empty,
    Items(Vec<ItemRow>),
}

/// Text for every field of the results view.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsView {
    pub image_url: String,
    pub vendor: String,
    pub date: String,
    pub currency: String,
    pub rows: ItemRows,
    pub tax: String,
    pub total: String,
}

impl ResultsView {
    pub fn from_result(result: &ExtractionResult) -> Self {
        let rows = if result.items.is_empty() {
            ItemRows::Empty
        } else {
            ItemRows::Items(
                result
                    .items
                    .iter()
                    .map(|item| ItemRow {
                        name: item.name.clone(),
                        cost: format_money(item.cost),
                    })
                    .collect(),
            )
        };

        Self {
            image_url: result.image_url.clone(),
            vendor: result.vendor_name.clone(),
            date: format_date(&result.date),
            currency: result.currency.clone(),
            rows,
            tax: format_money(result.tax),
            total: format_money(result.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_payload() {
        let data = json!({
            "image_url": "/static/uploads/r.jpg",
            "vendor_name": "Acme",
            "date": "2024-03-05",
            "currency": "EUR",
            "receipt_items": [{"item_name": "Pen", "item_cost": 1.5}],
            "tax": 0.3,
            "total": 1.8
        });
        let result = normalize(Some(&data)).unwrap();
        assert_eq!(result.vendor_name, "Acme");
        assert_eq!(result.currency, "EUR");
        assert_eq!(result.items, vec![ReceiptItem { name: "Pen".into(), cost: 1.5 }]);

        let view = ResultsView::from_result(&result);
        assert_eq!(view.date, "March 5, 2024");
        assert_eq!(
            view.rows,
            ItemRows::Items(vec![ItemRow { name: "Pen".into(), cost: "$1.50".into() }])
        );
        assert_eq!(view.tax, "$0.30");
        assert_eq!(view.total, "$1.80");
    }

    #[test]
    fn test_normalize_applies_defaults() {
        let data = json!({"receipt_items": []});
        let result = normalize(Some(&data)).unwrap();
        assert_eq!(result.vendor_name, UNKNOWN_VENDOR);
        assert_eq!(result.currency, "USD");
        assert_eq!(result.image_url, "");
        assert_eq!(result.tax, 0.0);

        let view = ResultsView::from_result(&result);
        assert_eq!(view.date, "N/A");
        assert_eq!(view.rows, ItemRows::Empty);
        assert_eq!(view.total, "$0.00");
    }

    #[test]
    fn test_falsy_text_fields_use_defaults() {
        let data = json!({
            "vendor_name": 0,
            "currency": false,
            "receipt_items": [{"item_name": 0.0, "item_cost": 1}, {"item_name": 7, "item_cost": 1}]
        });
        let result = normalize(Some(&data)).unwrap();
        assert_eq!(result.vendor_name, UNKNOWN_VENDOR);
        assert_eq!(result.currency, "USD");
        assert_eq!(result.items[0].name, UNNAMED_ITEM);
        assert_eq!(result.items[1].name, "7");
    }

    #[test]
    fn test_normalize_coerces_bad_numbers_and_items() {
        let data = json!({
            "tax": "1.20",
            "total": null,
            "receipt_items": [{"item_cost": -4.0}, {"item_name": "Tea", "item_cost": "2"}]
        });
        let result = normalize(Some(&data)).unwrap();
        assert_eq!(result.tax, 0.0);
        assert_eq!(result.total, 0.0);
        assert_eq!(result.items[0].name, UNNAMED_ITEM);
        assert_eq!(result.items[0].cost, 0.0);
        assert_eq!(result.items[1].cost, 0.0);
    }

    #[test]
    fn test_items_not_an_array_means_no_items() {
        let data = json!({"receipt_items": "Pen, Paper"});
        assert!(normalize(Some(&data)).unwrap().items.is_empty());
    }

    #[test]
    fn test_normalize_rejects_bad_shapes() {
        assert!(normalize(None).is_err());
        assert!(normalize(Some(&Value::Null)).is_err());
        assert!(normalize(Some(&json!([1, 2]))).is_err());
        assert!(normalize(Some(&json!({"vendor_name": ["A", "B"]}))).is_err());
        assert!(normalize(Some(&json!({"receipt_items": [null]}))).is_err());
    }

    #[test]
    fn test_format_date_fallbacks() {
        assert_eq!(format_date("2023-12-31"), "December 31, 2023");
        assert_eq!(format_date("31/12/2023"), "31/12/2023");
        assert_eq!(format_date("2023-02-30"), "2023-02-30");
        assert_eq!(format_date(""), "N/A");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(18.476), "$18.48");
        assert_eq!(format_money(1234.5), "$1234.50");
    }
}

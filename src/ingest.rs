//! Transaction ingestion from CSV with a deliberately soft schema.

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;

/// One raw transaction row.
///
/// Column matching is soft: each semantic role accepts two header spellings,
/// and the accessors below resolve the preference order. Unknown columns are
/// ignored, missing ones deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "CustomerID", default)]
    pub customer_id: Option<String>,
    #[serde(rename = "Customer", default)]
    pub customer: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "PurchaseDate", default)]
    pub purchase_date: Option<String>,
    #[serde(rename = "Revenue", default, deserialize_with = "lenient_amount")]
    pub revenue: Option<f64>,
    #[serde(rename = "Amount", default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
}

impl TransactionRecord {
    /// Build a record using the primary column names.
    pub fn new(customer_id: impl Into<String>, date: impl Into<String>, amount: f64) -> Self {
        TransactionRecord {
            customer_id: Some(customer_id.into()),
            date: Some(date.into()),
            revenue: Some(amount),
            ..TransactionRecord::default()
        }
    }

    /// Customer identifier: `CustomerID` preferred, then `Customer`.
    ///
    /// Empty and all-whitespace values are treated as absent; a row with no
    /// usable identifier cannot be attributed and is dropped by aggregation.
    pub fn customer_key(&self) -> Option<&str> {
        [&self.customer_id, &self.customer]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    /// Raw date text: `Date` preferred, then `PurchaseDate`.
    pub fn date_text(&self) -> Option<&str> {
        [&self.date, &self.purchase_date]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    /// Transaction amount: `Revenue` preferred, then `Amount`, else zero.
    ///
    /// Presence decides, not the value: an explicit `Revenue` of 0 is used
    /// as-is rather than falling through to `Amount`.
    pub fn amount_or_zero(&self) -> f64 {
        self.revenue.or(self.amount).unwrap_or(0.0)
    }
}

/// Decode an amount cell. Missing, empty, non-numeric, and non-finite text
/// (the float grammar admits `NaN` and `inf`) all become `None` so the row
/// survives and the role accessors apply their fallbacks. A non-finite value
/// must never reach a group sum.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|text| {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }))
}

/// Read transaction rows from any CSV source.
///
/// Headers are required. Fields are trimmed and ragged rows are tolerated;
/// a row that still fails to decode is logged and skipped rather than
/// aborting the load.
pub fn read_transactions<R: Read>(reader: R) -> crate::Result<Vec<TransactionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records: Vec<TransactionRecord> = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in csv_reader.deserialize().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                log::warn!("skipping unreadable row {}: {err}", index + 2);
            }
        }
    }
    if skipped > 0 {
        log::warn!("{skipped} row(s) skipped while reading transactions");
    }
    log::debug!("read {} transaction row(s)", records.len());
    Ok(records)
}

/// Load transaction rows from a CSV file on disk.
pub fn load_transactions(path: &str) -> crate::Result<Vec<TransactionRecord>> {
    let file =
        File::open(path).with_context(|| format!("cannot open transaction file '{path}'"))?;
    read_transactions(file).with_context(|| format!("cannot read transactions from '{path}'"))
}

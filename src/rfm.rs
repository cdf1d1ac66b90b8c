//! Per-customer RFM aggregation and population-relative quintile scoring.

use crate::ingest::TransactionRecord;
use crate::segment::{classify, Segment};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw per-customer metrics produced by the aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerMetrics {
    pub customer_id: String,
    /// Whole days between the reference time and the latest valid purchase.
    pub recency_days: i64,
    /// Number of transaction rows attributed to the customer.
    pub frequency: u32,
    /// Sum of transaction amounts, rounded to the nearest whole unit.
    pub monetary: i64,
}

/// A customer with quintile scores and an assigned segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCustomer {
    pub customer_id: String,
    #[serde(rename = "recency")]
    pub recency_days: i64,
    pub frequency: u32,
    pub monetary: i64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    pub segment: Segment,
}

/// Zone-less datetime layouts tried after RFC 3339.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
/// Date-only layouts, taken as midnight.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a transaction timestamp, trying RFC 3339 first, then the naive
/// layouts. Naive values are interpreted as UTC. Returns `None` when nothing
/// matches; an unparseable date never fails the pipeline.
pub fn parse_transaction_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

#[derive(Default)]
struct CustomerAccumulator {
    frequency: u32,
    amount_sum: f64,
    last_purchase: Option<DateTime<Utc>>,
}

/// Group transactions by customer and reduce each group to raw RFM metrics.
///
/// `reference` is the timestamp recency is measured against. Callers supply
/// it explicitly so the same input always produces the same metrics.
///
/// Rows without a usable customer identifier are dropped. Rows with an
/// unparseable date still count toward frequency and monetary but contribute
/// no purchase date; a customer whose rows all lack valid dates gets the
/// reference itself as last purchase, i.e. a recency of zero days.
///
/// Output order is the order in which customers first appear in the input.
pub fn aggregate_customers(
    records: &[TransactionRecord],
    reference: DateTime<Utc>,
) -> Vec<CustomerMetrics> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, CustomerAccumulator> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(key) = record.customer_key() else {
            dropped += 1;
            continue;
        };
        if !groups.contains_key(key) {
            order.push(key.to_string());
        }
        let group = groups.entry(key.to_string()).or_default();
        group.frequency += 1;
        group.amount_sum += record.amount_or_zero();
        if let Some(date) = record.date_text().and_then(parse_transaction_date) {
            group.last_purchase = Some(match group.last_purchase {
                Some(current) => current.max(date),
                None => date,
            });
        }
    }

    if dropped > 0 {
        log::warn!("{dropped} row(s) dropped for missing a customer identifier");
    }

    order
        .into_iter()
        .map(|customer_id| {
            let group = &groups[&customer_id];
            let last_purchase = group.last_purchase.unwrap_or(reference);
            CustomerMetrics {
                customer_id,
                recency_days: (reference - last_purchase).num_days(),
                frequency: group.frequency,
                monetary: group.amount_sum.round() as i64,
            }
        })
        .collect()
}

/// 1-based rank of the first occurrence of `value` in ascending `sorted`.
/// Duplicates all share the rank of the run's first element.
fn first_rank<T: Ord>(sorted: &[T], value: &T) -> usize {
    sorted.partition_point(|entry| entry < value) + 1
}

/// Quintile bucket for a 1-based rank in a population of `n`:
/// `ceil(rank / n * 5)`, computed exactly in integers.
fn quintile(rank: usize, n: usize) -> u8 {
    (rank * 5).div_ceil(n) as u8
}

/// Score every customer against the whole population and assign segments.
///
/// Each metric is ranked across all customers, so a score is meaningful only
/// relative to this dataset. Recency is inverted: fewer days since the last
/// purchase ranks low, so its quintile maps to `6 - q` and a recent buyer
/// scores high. Input order is preserved.
pub fn score_customers(metrics: Vec<CustomerMetrics>) -> Vec<ScoredCustomer> {
    let n = metrics.len();

    let mut recency: Vec<i64> = metrics.iter().map(|m| m.recency_days).collect();
    let mut frequency: Vec<u32> = metrics.iter().map(|m| m.frequency).collect();
    let mut monetary: Vec<i64> = metrics.iter().map(|m| m.monetary).collect();
    recency.sort_unstable();
    frequency.sort_unstable();
    monetary.sort_unstable();

    metrics
        .into_iter()
        .map(|metric| {
            let r_score = 6 - quintile(first_rank(&recency, &metric.recency_days), n);
            let f_score = quintile(first_rank(&frequency, &metric.frequency), n);
            let m_score = quintile(first_rank(&monetary, &metric.monetary), n);
            let segment = classify(r_score, f_score, m_score);
            ScoredCustomer {
                customer_id: metric.customer_id,
                recency_days: metric.recency_days,
                frequency: metric.frequency,
                monetary: metric.monetary,
                r_score,
                f_score,
                m_score,
                segment,
            }
        })
        .collect()
}

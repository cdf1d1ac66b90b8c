//! Synthetic transaction generation for demo runs.

use crate::ingest::TransactionRecord;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Customer identifiers used by the generator.
const SAMPLE_CUSTOMERS: [&str; 8] = [
    "C001", "C002", "C003", "C004", "C005", "C006", "C007", "C008",
];

/// Generate a small demo transaction set.
///
/// Every sample customer gets 1 to 8 transactions, dated up to a year before
/// `reference` (date-only, `YYYY-MM-DD`), with whole amounts between 50 and
/// 549. Pass a seeded RNG for reproducible output.
pub fn generate_transactions<R: Rng>(
    reference: DateTime<Utc>,
    rng: &mut R,
) -> Vec<TransactionRecord> {
    let mut records = Vec::new();
    for customer in SAMPLE_CUSTOMERS {
        let transactions = rng.gen_range(1..=8);
        for _ in 0..transactions {
            let days_ago: i64 = rng.gen_range(0..365);
            let date = (reference - Duration::days(days_ago))
                .format("%Y-%m-%d")
                .to_string();
            let amount = f64::from(rng.gen_range(50..550));
            records.push(TransactionRecord::new(customer, date, amount));
        }
    }
    records
}

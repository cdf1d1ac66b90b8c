//! Segment-level aggregation and the end-to-end analysis entry point.

use crate::ingest::TransactionRecord;
use crate::rfm::{aggregate_customers, score_customers, ScoredCustomer};
use crate::segment::Segment;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;

/// Aggregate statistics for one segment that has at least one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStat {
    pub segment: Segment,
    pub count: usize,
    /// Mean customer value in the segment, rounded to a whole unit.
    pub avg_monetary: i64,
    /// Exact sum of member monetary values; segment totals always add back
    /// up to the dataset total.
    pub total_revenue: i64,
    /// Fixed display color for the segment, `#rrggbb`.
    pub color: String,
}

/// Dataset-wide averages across every customer regardless of segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    /// Mean days since last purchase, rounded to an integer.
    pub recency: i64,
    /// Mean purchases per customer, rounded to one decimal place.
    pub frequency: f64,
    /// Mean customer value, rounded to an integer.
    pub monetary: i64,
}

/// Complete analysis output: scored customers, per-segment statistics, and
/// dataset-wide averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmReport {
    pub customers: Vec<ScoredCustomer>,
    pub segment_stats: Vec<SegmentStat>,
    pub avg_metrics: AverageMetrics,
    pub total_customers: usize,
}

impl RfmReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &str) -> crate::Result<()> {
        let file =
            File::create(path).with_context(|| format!("cannot create report file '{path}'"))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("cannot write report JSON to '{path}'"))?;
        Ok(())
    }
}

/// Group scored customers by segment and compute per-segment statistics.
///
/// Only segments with members appear. Results are ordered by total revenue,
/// highest first; ties keep the segments' first-appearance order.
pub fn segment_stats(customers: &[ScoredCustomer]) -> Vec<SegmentStat> {
    let mut groups: Vec<(Segment, Vec<i64>)> = Vec::new();
    for customer in customers {
        match groups
            .iter_mut()
            .find(|(segment, _)| *segment == customer.segment)
        {
            Some((_, monetary)) => monetary.push(customer.monetary),
            None => groups.push((customer.segment, vec![customer.monetary])),
        }
    }

    let mut stats: Vec<SegmentStat> = groups
        .into_iter()
        .map(|(segment, monetary)| {
            let count = monetary.len();
            let total: i64 = monetary.iter().sum();
            SegmentStat {
                segment,
                count,
                avg_monetary: (total as f64 / count as f64).round() as i64,
                total_revenue: total,
                color: segment.color_hex(),
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    stats
}

/// Dataset-wide mean recency, frequency, and monetary. An empty population
/// yields all zeros rather than NaN.
pub fn average_metrics(customers: &[ScoredCustomer]) -> AverageMetrics {
    if customers.is_empty() {
        return AverageMetrics {
            recency: 0,
            frequency: 0.0,
            monetary: 0,
        };
    }
    let n = customers.len() as f64;
    let recency: i64 = customers.iter().map(|c| c.recency_days).sum();
    let frequency: u64 = customers.iter().map(|c| u64::from(c.frequency)).sum();
    let monetary: i64 = customers.iter().map(|c| c.monetary).sum();
    AverageMetrics {
        recency: (recency as f64 / n).round() as i64,
        frequency: (frequency as f64 / n * 10.0).round() / 10.0,
        monetary: (monetary as f64 / n).round() as i64,
    }
}

/// Run the full pipeline over raw transactions: aggregate, score, classify,
/// and summarize.
///
/// Pure and infallible. Unusable rows were already excluded or defaulted
/// during aggregation, and an empty input produces an empty report rather
/// than an error. With equal records and reference time the output is
/// identical, byte for byte once serialized.
pub fn analyze(records: &[TransactionRecord], reference: DateTime<Utc>) -> RfmReport {
    let metrics = aggregate_customers(records, reference);
    log::debug!("aggregated {} customer(s)", metrics.len());
    let customers = score_customers(metrics);
    let stats = segment_stats(&customers);
    let averages = average_metrics(&customers);
    let total_customers = customers.len();
    RfmReport {
        customers,
        segment_stats: stats,
        avg_metrics: averages,
        total_customers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scored(id: &str, segment: Segment, monetary: i64) -> ScoredCustomer {
        ScoredCustomer {
            customer_id: id.into(),
            recency_days: 30,
            frequency: 2,
            monetary,
            r_score: 3,
            f_score: 3,
            m_score: 3,
            segment,
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn stats_are_ordered_by_revenue_desc() {
        let customers = vec![
            scored("a", Segment::Lost, 10),
            scored("b", Segment::Champions, 500),
            scored("c", Segment::Champions, 300),
            scored("d", Segment::AtRisk, 900),
        ];
        let stats = segment_stats(&customers);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].segment, Segment::AtRisk);
        assert_eq!(stats[0].total_revenue, 900);
        assert_eq!(stats[1].segment, Segment::Champions);
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].avg_monetary, 400);
        assert_eq!(stats[2].segment, Segment::Lost);
    }

    #[test]
    fn segment_totals_add_up_exactly() {
        let customers = vec![
            scored("a", Segment::Champions, 33),
            scored("b", Segment::Lost, 41),
            scored("c", Segment::Lost, 58),
        ];
        let stats = segment_stats(&customers);
        let from_stats: i64 = stats.iter().map(|s| s.total_revenue).sum();
        let from_customers: i64 = customers.iter().map(|c| c.monetary).sum();
        assert_eq!(from_stats, from_customers);
        let members: usize = stats.iter().map(|s| s.count).sum();
        assert_eq!(members, customers.len());
    }

    #[test]
    fn stats_carry_segment_colors() {
        let customers = vec![scored("a", Segment::NeedAttention, 5)];
        let stats = segment_stats(&customers);
        assert_eq!(stats[0].color, "#ef4444");
    }

    #[test]
    fn averages_round_per_contract() {
        let customers = vec![
            ScoredCustomer {
                customer_id: "a".into(),
                recency_days: 10,
                frequency: 1,
                monetary: 100,
                r_score: 3,
                f_score: 3,
                m_score: 3,
                segment: Segment::LoyalCustomers,
            },
            ScoredCustomer {
                customer_id: "b".into(),
                recency_days: 15,
                frequency: 2,
                monetary: 101,
                r_score: 3,
                f_score: 3,
                m_score: 3,
                segment: Segment::LoyalCustomers,
            },
        ];
        let averages = average_metrics(&customers);
        // 12.5 rounds half away from zero.
        assert_eq!(averages.recency, 13);
        // Frequency keeps one decimal place.
        assert_eq!(averages.frequency, 1.5);
        // 100.5 rounds up.
        assert_eq!(averages.monetary, 101);
    }

    #[test]
    fn empty_population_averages_to_zero() {
        let averages = average_metrics(&[]);
        assert_eq!(averages.recency, 0);
        assert_eq!(averages.frequency, 0.0);
        assert_eq!(averages.monetary, 0);
    }

    #[test]
    fn analyze_produces_a_consistent_report() {
        let records = vec![
            TransactionRecord::new("C1", "2024-01-01", 100.0),
            TransactionRecord::new("C1", "2024-06-01", 200.0),
            TransactionRecord::new("C2", "2024-06-01", 50.0),
        ];
        let report = analyze(&records, reference());
        assert_eq!(report.total_customers, 2);
        assert_eq!(report.customers.len(), 2);
        let members: usize = report.segment_stats.iter().map(|s| s.count).sum();
        assert_eq!(members, 2);
        assert_eq!(report.avg_metrics.frequency, 1.5);
    }

    #[test]
    fn analyze_of_nothing_is_an_empty_report() {
        let report = analyze(&[], reference());
        assert_eq!(report.total_customers, 0);
        assert!(report.customers.is_empty());
        assert!(report.segment_stats.is_empty());
        assert_eq!(report.avg_metrics.recency, 0);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let records = vec![TransactionRecord::new("C1", "2024-06-01", 300.0)];
        let report = analyze(&records, reference());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("segmentStats").is_some());
        assert!(json.get("avgMetrics").is_some());
        assert_eq!(json["totalCustomers"], 1);
        let customer = &json["customers"][0];
        assert_eq!(customer["customerId"], "C1");
        assert!(customer.get("recency").is_some());
        assert!(customer.get("rScore").is_some());
        assert!(customer.get("segment").is_some());
    }

    #[test]
    fn write_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let records = vec![TransactionRecord::new("C1", "2024-06-01", 300.0)];
        let report = analyze(&records, reference());
        report.write_json(path.to_str().unwrap()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let back: RfmReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, report);
    }
}

//! Command-line interface definitions and argument parsing

use crate::segment::Segment;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;

/// Customer segmentation CLI using RFM quintile scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, required_unless_present = "sample", conflicts_with = "sample")]
    pub input: Option<String>,

    /// Analyze generated sample data instead of a file
    #[arg(long)]
    pub sample: bool,

    /// RNG seed for --sample, for reproducible demo runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reference time recency is measured against, RFC 3339 or YYYY-MM-DD
    /// Defaults to the current time
    #[arg(short, long)]
    pub reference_date: Option<String>,

    /// Output path for the chart PNGs
    #[arg(short, long, default_value = "rfm_report.png")]
    pub output: String,

    /// Write the full report as JSON to this path
    #[arg(long)]
    pub json: Option<String>,

    /// Only list customers in this segment
    /// Example: --segment "At Risk"
    #[arg(short, long)]
    pub segment: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the reference time the analysis measures recency against.
    /// This is the only place wall-clock time enters the pipeline.
    pub fn parse_reference_date(&self) -> crate::Result<DateTime<Utc>> {
        let Some(ref text) = self.reference_date else {
            return Ok(Utc::now());
        };
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Ok(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            if let Some(midnight) = parsed.and_hms_opt(0, 0, 0) {
                return Ok(midnight.and_utc());
            }
        }
        anyhow::bail!("Invalid reference date '{text}': expected RFC 3339 or YYYY-MM-DD")
    }

    /// Resolve the optional segment filter against the six fixed labels
    pub fn parse_segment_filter(&self) -> crate::Result<Option<Segment>> {
        let Some(ref text) = self.segment else {
            return Ok(None);
        };
        match Segment::from_label(text) {
            Some(segment) => Ok(Some(segment)),
            None => anyhow::bail!(
                "Unknown segment '{}': expected one of {}",
                text,
                Segment::ALL.map(|s| s.label()).join(", ")
            ),
        }
    }
}

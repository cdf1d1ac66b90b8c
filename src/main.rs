//! SegForge: Customer Segmentation CLI using RFM quintile analysis
//!
//! This is the main entrypoint that orchestrates transaction loading,
//! scoring, reporting, and chart generation.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use segforge::{analyze, ingest, sample, viz, Args};
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("SegForge - Customer Segmentation using RFM Analysis");
        println!("===================================================\n");
    }

    run_full_pipeline(&args)
}

/// Run the full segmentation pipeline
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Full Segmentation Pipeline ===\n");

    let start_time = Instant::now();

    let reference = args.parse_reference_date()?;
    let segment_filter = args.parse_segment_filter()?;

    // Step 1: Load transactions
    if args.verbose {
        println!("Step 1: Loading transactions");
        println!("  Reference time: {}", reference);
        if let Some(ref input) = args.input {
            println!("  Input file: {}", input);
        }
    }

    let load_start = Instant::now();
    let records = if args.sample {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let records = sample::generate_transactions(reference, &mut rng);
        println!("✓ Sample transactions generated: {} rows", records.len());
        records
    } else {
        // clap guarantees an input path when --sample is absent
        let Some(ref input) = args.input else {
            anyhow::bail!("either --input or --sample is required");
        };
        let records = ingest::load_transactions(input)?;
        println!("✓ Transactions loaded: {} rows", records.len());
        records
    };
    let load_time = load_start.elapsed();

    if args.verbose {
        println!("  Loading time: {:.2}s", load_time.as_secs_f64());
    }

    // Step 2: Aggregate, score, and classify
    if args.verbose {
        println!("\nStep 2: Computing RFM scores and segments");
    }

    let analyze_start = Instant::now();
    let report = analyze(&records, reference);
    let analyze_time = analyze_start.elapsed();

    println!("✓ Customers analyzed: {}", report.total_customers);
    if args.verbose {
        println!("  Analysis time: {:.2}s", analyze_time.as_secs_f64());
    }

    // Print statistics, plus the per-customer table when asked for
    viz::print_segment_statistics(&report);
    if args.verbose || segment_filter.is_some() {
        viz::print_customers(&report, segment_filter);
    }

    // Export the JSON report if requested
    if let Some(ref json_path) = args.json {
        report.write_json(json_path)?;
        println!("\nReport JSON saved to: {}", json_path);
    }

    // Step 3: Generate charts
    if report.total_customers == 0 {
        log::warn!("no customers found; skipping chart generation");
        println!("\nNo customers found; skipping chart generation");
    } else {
        if args.verbose {
            println!("\nStep 3: Generating charts");
            println!("  Output file: {}", args.output);
        }

        let viz_start = Instant::now();
        viz::generate_report_charts(&report, &args.output)?;
        let viz_time = viz_start.elapsed();

        println!("\n✓ Charts generated");
        if args.verbose {
            println!("  Chart time: {:.2}s", viz_time.as_secs_f64());
        }
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

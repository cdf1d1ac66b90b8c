//! Visualization functions using Plotters for segmentation output

use crate::report::RfmReport;
use crate::segment::Segment;
use anyhow::bail;
use plotters::prelude::*;

/// Convert a segment's fixed color into a drawable plotters color
fn segment_color(segment: Segment) -> RGBColor {
    let (r, g, b) = segment.color();
    RGBColor(r, g, b)
}

/// Create scatter plot of customers by frequency and spend, colored by segment
///
/// # Arguments
/// * `report` - Analysis output with scored customers and segment statistics
/// * `output_path` - Path to save the PNG plot
/// * `plot_title` - Title for the plot
///
/// # Returns
/// * Result indicating success or failure
pub fn create_customer_scatter(
    report: &RfmReport,
    output_path: &str,
    plot_title: Option<&str>,
) -> crate::Result<()> {
    if report.customers.is_empty() {
        bail!("no customers to plot");
    }

    let title =
        plot_title.unwrap_or("Customer Segmentation: Frequency vs Monetary (Colored by Segment)");

    let frequency_values: Vec<f64> = report
        .customers
        .iter()
        .map(|c| f64::from(c.frequency))
        .collect();
    let monetary_values: Vec<f64> = report.customers.iter().map(|c| c.monetary as f64).collect();

    // Calculate plot bounds with some padding
    let freq_max = frequency_values
        .iter()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b))
        + 1.0;
    let mon_min = monetary_values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let mon_max = monetary_values
        .iter()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let mon_pad = ((mon_max - mon_min) * 0.05).max(1.0);

    // Create the drawing backend
    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..freq_max, (mon_min - mon_pad)..(mon_max + mon_pad))?;

    chart
        .configure_mesh()
        .x_desc("Purchase Frequency")
        .y_desc("Total Spend")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // Plot one series per populated segment, in report order, so the legend
    // lists segments the same way the summary table does
    for stat in &report.segment_stats {
        let color = segment_color(stat.segment);
        let points = report
            .customers
            .iter()
            .filter(|c| c.segment == stat.segment)
            .map(|c| {
                Circle::new(
                    (f64::from(c.frequency), c.monetary as f64),
                    4,
                    color.filled(),
                )
            });

        chart
            .draw_series(points)?
            .label(stat.segment.label())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart.configure_series_labels().draw()?;

    root.present()?;
    println!("Customer scatter saved to: {}", output_path);

    Ok(())
}

/// Create a simple bar chart of segment sizes
pub fn create_segment_size_chart(report: &RfmReport, output_path: &str) -> crate::Result<()> {
    let stats = &report.segment_stats;
    if stats.is_empty() {
        bail!("no segments to plot");
    }

    let labels: Vec<&str> = stats.iter().map(|s| s.segment.label()).collect();
    let max_size = stats.iter().map(|s| s.count).max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Segment Sizes", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            -0.5f64..(stats.len() as f64 - 0.5),
            0f64..(max_size * 1.1),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(stats.len())
        .x_label_formatter(&|x| {
            // Bars are centered on whole numbers; only those get a name
            let idx = x.round();
            if idx >= 0.0 && (x - idx).abs() < 1e-6 {
                labels.get(idx as usize).copied().unwrap_or("").to_string()
            } else {
                String::new()
            }
        })
        .y_desc("Number of Customers")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // Draw bars for each segment
    for (index, stat) in stats.iter().enumerate() {
        let center = index as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(center - 0.4, 0.0), (center + 0.4, stat.count as f64)],
            segment_color(stat.segment).filled(),
        )))?;
    }

    root.present()?;
    println!("Segment size chart saved to: {}", output_path);

    Ok(())
}

/// Print segment statistics to console
pub fn print_segment_statistics(report: &RfmReport) {
    println!("\n=== Segment Statistics ===");
    println!("Total customers: {}", report.total_customers);
    println!(
        "Average days since last purchase: {}",
        report.avg_metrics.recency
    );
    println!(
        "Average purchases per customer: {:.1}",
        report.avg_metrics.frequency
    );
    println!("Average customer value: {}", report.avg_metrics.monetary);

    if report.segment_stats.is_empty() {
        println!("\nNo segments to report.");
        return;
    }

    println!("\nSegments by total revenue:");
    println!("  Segment             | Customers | Avg Value | Total Revenue");
    println!("  --------------------|-----------|-----------|--------------");
    for stat in &report.segment_stats {
        println!(
            "  {:<20}| {:>9} | {:>9} | {:>13}",
            stat.segment.label(),
            stat.count,
            stat.avg_monetary,
            stat.total_revenue
        );
    }
}

/// Print one line per scored customer, optionally restricted to a segment
pub fn print_customers(report: &RfmReport, only: Option<Segment>) {
    println!("\n  Customer     | Recency | Frequency | Monetary | R F M | Segment");
    println!("  -------------|---------|-----------|----------|-------|--------");
    for customer in &report.customers {
        if only.is_some_and(|segment| segment != customer.segment) {
            continue;
        }
        println!(
            "  {:<13}| {:>7} | {:>9} | {:>8} | {} {} {} | {}",
            customer.customer_id,
            customer.recency_days,
            customer.frequency,
            customer.monetary,
            customer.r_score,
            customer.f_score,
            customer.m_score,
            customer.segment
        );
    }
}

/// Generate both charts for a report
///
/// The customer scatter lands at `base_output_path` and the segment size
/// chart next to it with a `_segments` suffix.
pub fn generate_report_charts(report: &RfmReport, base_output_path: &str) -> crate::Result<()> {
    create_customer_scatter(report, base_output_path, None)?;

    let size_chart_path = base_output_path.replace(".png", "_segments.png");
    create_segment_size_chart(report, &size_chart_path)?;

    Ok(())
}

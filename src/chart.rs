//! Grouped bar chart rendering for axis summaries.

use crate::analyzers::types::AxisSummary;
use anyhow::{Result, anyhow};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 540;

/// Renders one comparison chart: two bars per bucket (clear vs. rain mean
/// deceleration). Buckets with missing means draw no bar.
pub fn render_axis_chart(summary: &AxisSummary, title: &str, path: &Path) -> Result<()> {
    let n = summary.buckets.len();
    if n == 0 {
        return Err(anyhow!("no buckets to chart"));
    }

    let y_max = summary
        .buckets
        .iter()
        .flat_map(|b| [b.clear_or_cloudy, b.rain])
        .flatten()
        .fold(0.0f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.2 } else { 1.0 };

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?;

    // Bars for bucket i are centered on integer tick i, so the axis runs
    // half a slot past each end.
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| bucket_label_at(*x, &summary.buckets))
        .y_desc("mean deceleration (G)")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?;

    let clear_style = BLUE.mix(0.6).filled();
    let rain_style = RED.mix(0.6).filled();

    chart
        .draw_series(summary.buckets.iter().enumerate().filter_map(|(i, b)| {
            b.clear_or_cloudy.map(|v| {
                Rectangle::new([(i as f64 - 0.40, 0.0), (i as f64 - 0.05, v)], clear_style)
            })
        }))
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?
        .label("clear_or_cloudy")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], clear_style));

    chart
        .draw_series(summary.buckets.iter().enumerate().filter_map(|(i, b)| {
            b.rain
                .map(|v| Rectangle::new([(i as f64 + 0.05, 0.0), (i as f64 + 0.40, v)], rain_style))
        }))
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?
        .label("rain")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], rain_style));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?;

    root.present()
        .map_err(|e| anyhow!("chart rendering failed: {e}"))?;

    info!(path = %path.display(), "chart written");
    Ok(())
}

/// Maps an axis position to a bucket label. Only positions close to a bar
/// pair's integer center get a label; the range edges and intermediate
/// ticks stay blank so no bucket name repeats.
fn bucket_label_at(x: f64, buckets: &[crate::analyzers::types::BucketSummary]) -> String {
    let i = x.round();
    if (x - i).abs() > 0.25 || i < 0.0 || i >= buckets.len() as f64 {
        return String::new();
    }
    buckets[i as usize].bucket.clone()
}

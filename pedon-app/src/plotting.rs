//! Texture depth-profile charts for surveyed coordinates.

use anyhow::Result;
use pedon_schemas::{coordinate::Coordinate, report::BinnedRow};
use plotters::prelude::*;
use std::path::Path;

const TEXTURE_SERIES: [&str; 3] = ["sand", "silt", "clay"];

/// Draws sand/silt/clay percentages against bin midpoint depth for one
/// coordinate and saves the chart into the run directory.
pub fn plot_texture_profile(
    output_dir: &Path,
    coordinate: Coordinate,
    rows: &[BinnedRow],
) -> Result<()> {
    let points: Vec<(f64, &BinnedRow)> = rows
        .iter()
        .filter(|r| r.lat == coordinate.lat && r.lon == coordinate.lon)
        .map(|r| ((r.bin_lower + r.bin_upper) / 2.0, r))
        .collect();

    if points.is_empty() {
        println!("[Plotting] Warning: no rows to plot for ({}, {}).", coordinate.lat, coordinate.lon);
        return Ok(());
    }

    let max_depth = points.last().map_or(200.0, |(_, r)| r.bin_upper);
    let path = output_dir.join(format!(
        "texture_profile_{}_{}.png",
        coordinate.lat, coordinate.lon
    ));
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Soil Texture Profile ({}, {})", coordinate.lat, coordinate.lon),
            ("sans-serif", 40).into_font(),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..max_depth, 0f64..100f64)?;

    chart
        .configure_mesh()
        .x_desc("Depth (cm)")
        .y_desc("Fraction (%)")
        .draw()?;

    let colors = [RED, GREEN, BLUE];

    for (i, &column) in TEXTURE_SERIES.iter().enumerate() {
        let color = colors[i % colors.len()].clone();
        let series: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|(midpoint, row)| row.property(column).map(|v| (*midpoint, v)))
            .collect();
        if series.is_empty() {
            continue;
        }

        chart
            .draw_series(LineSeries::new(series, color.stroke_width(2)))?
            .label(column)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;

    println!("[Plotting] Texture profile saved to '{}'.", path.display());
    Ok(())
}

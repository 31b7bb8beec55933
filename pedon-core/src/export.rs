use crate::error::PedonError;
use csv::Writer;
use pedon_schemas::columns::{Rounding, PROPERTY_COLUMNS};
use pedon_schemas::report::BinnedRow;
use std::path::Path;

/// Report column headers, in output order.
pub fn header() -> Vec<String> {
    let mut columns: Vec<String> = ["depth_bin", "deptht", "depthb", "prcent"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend(PROPERTY_COLUMNS.iter().map(|spec| spec.name.to_string()));
    columns.extend(
        ["hzname", "chkey", "cokey", "lat", "lon", "aws"]
            .iter()
            .map(|c| c.to_string()),
    );
    columns
}

/// Formats one row into cells matching `header()`. Absent values render
/// as empty cells.
pub fn cells(row: &BinnedRow) -> Vec<String> {
    let mut cells = vec![
        row.depth_bin.clone(),
        optional(row.depth_top, Rounding::Unrounded),
        optional(row.depth_bottom, Rounding::Unrounded),
        optional(row.component_percent, Rounding::Unrounded),
    ];
    for spec in PROPERTY_COLUMNS {
        cells.push(optional(row.property(spec.name), spec.rounding));
    }
    cells.push(row.horizon_name.clone().unwrap_or_default());
    cells.push(row.horizon_key.clone().unwrap_or_default());
    cells.push(row.component_key.clone().unwrap_or_default());
    cells.push(format!("{}", row.lat));
    cells.push(format!("{}", row.lon));
    cells.push(optional(row.available_water_storage, Rounding::Unrounded));
    cells
}

/// Formats a single value per its column's rounding rule. Finalized
/// values are already rounded numerically; this pins the displayed
/// decimal places.
pub fn format_value(value: f64, rounding: Rounding) -> String {
    match rounding {
        Rounding::Unrounded => format!("{}", value),
        Rounding::Decimals(places) => format!("{:.*}", places as usize, value),
        Rounding::Whole => format!("{}", value as i64),
    }
}

fn optional(value: Option<f64>, rounding: Rounding) -> String {
    value.map(|v| format_value(v, rounding)).unwrap_or_default()
}

/// Writes the binned report as CSV, one row per (coordinate, depth bin).
pub fn write_csv(path: &Path, rows: &[BinnedRow]) -> Result<(), PedonError> {
    let mut writer =
        Writer::from_path(path).map_err(|e| PedonError::CsvError(path.display().to_string(), e))?;

    writer
        .write_record(header())
        .map_err(|e| PedonError::CsvError(path.display().to_string(), e))?;
    for row in rows {
        writer
            .write_record(cells(row))
            .map_err(|e| PedonError::CsvError(path.display().to_string(), e))?;
    }
    writer
        .flush()
        .map_err(|e| PedonError::FileIO(path.display().to_string(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedon_schemas::{coordinate::Coordinate, depth::DepthBin};

    #[test]
    fn cells_line_up_with_the_header() {
        let row = crate::binning::aggregate_bin(
            &[],
            DepthBin {
                lower: 0.0,
                upper: 10.0,
            },
            Coordinate {
                lat: 36.5,
                lon: -98.5,
            },
        );
        assert_eq!(cells(&row).len(), header().len());
    }

    #[test]
    fn values_format_per_column_rule() {
        assert_eq!(format_value(40.3, Rounding::Decimals(1)), "40.3");
        assert_eq!(format_value(1.31, Rounding::Decimals(2)), "1.31");
        assert_eq!(format_value(4.0, Rounding::Whole), "4");
        assert_eq!(format_value(0.02, Rounding::Unrounded), "0.02");
        assert_eq!(optional(None, Rounding::Decimals(1)), "");
    }
}

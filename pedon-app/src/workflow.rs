use crate::{diffgram, fetch::SdaClient};
use anyhow::{Context, Result};
use pedon_core::binning;
use pedon_schemas::{
    coordinate::Coordinate,
    depth::DepthGrid,
    horizon::HorizonRecord,
    report::BinnedRow,
};
use std::collections::HashSet;
use tracing::{error, warn};

/// Surveys every coordinate in order, strictly sequentially, threading
/// the accumulated report rows through a fold. Any failure aborts the
/// whole run; no partial result is produced for a failing coordinate.
pub fn run_survey(
    client: &SdaClient,
    coordinates: &[Coordinate],
    grid: &DepthGrid,
) -> Result<Vec<BinnedRow>> {
    coordinates.iter().try_fold(Vec::new(), |mut report, &coordinate| {
        let rows = survey_coordinate(client, coordinate, grid)?;
        report.extend(rows);
        Ok(report)
    })
}

/// One blocking pass for a single coordinate: fetch, parse, coerce,
/// de-duplicate, select the dominant component, bin, and finalize.
fn survey_coordinate(
    client: &SdaClient,
    coordinate: Coordinate,
    grid: &DepthGrid,
) -> Result<Vec<BinnedRow>> {
    println!("\n--- [Survey] ({}, {}) ---", coordinate.lat, coordinate.lon);

    let xml = client.run_point_query(coordinate)?;
    let raw = diffgram::parse_horizon_table(&xml)
        .map_err(|err| {
            // Keep the payload available for diagnosis; the run still aborts.
            error!(payload = %xml, "failed to extract horizon table from response");
            err
        })
        .with_context(|| {
            format!(
                "Malformed soil data response for ({}, {})",
                coordinate.lat, coordinate.lon
            )
        })?;

    let records: Vec<HorizonRecord> = raw.iter().filter_map(HorizonRecord::from_raw).collect();
    let discarded = raw.len() - records.len();
    if discarded > 0 {
        warn!(discarded, "discarded records with unusable depth or percentage fields");
    }

    let records = dedup_horizons(records);
    let dominant = binning::dominant_component(&records, coordinate)?;
    println!(
        "[Survey] {} horizon record(s) in the dominant component",
        dominant.len()
    );

    let mut rows = binning::bin_profile(&dominant, grid, coordinate);
    binning::finalize_profile(&mut rows);
    Ok(rows)
}

/// The service query joins texture tables that can fan one horizon out
/// into several identical rows; collapse them on depth bounds plus
/// texture, keeping the first occurrence.
fn dedup_horizons(records: Vec<HorizonRecord>) -> Vec<HorizonRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.depth_top.to_bits(),
                r.depth_bottom.to_bits(),
                property_bits(r, "sand"),
                property_bits(r, "silt"),
                property_bits(r, "clay"),
            ))
        })
        .collect()
}

fn property_bits(record: &HorizonRecord, name: &str) -> Option<u64> {
    record.property(name).map(f64::to_bits)
}

use crate::error::PedonError;
use pedon_schemas::{
    columns::{Rounding, PROPERTY_COLUMNS},
    coordinate::Coordinate,
    depth::{DepthBin, DepthGrid},
    horizon::HorizonRecord,
    report::BinnedRow,
};
use std::collections::BTreeMap;

/// Keeps only horizons belonging to the dominant component of the map
/// unit: the component(s) with the maximum representative percentage.
/// Records missing any texture fraction are dropped before the maximum is
/// taken. Components tied at the maximum are all retained.
pub fn dominant_component(
    records: &[HorizonRecord],
    coordinate: Coordinate,
) -> Result<Vec<HorizonRecord>, PedonError> {
    let complete: Vec<&HorizonRecord> = records
        .iter()
        .filter(|r| r.has_complete_texture())
        .collect();

    let highest = complete
        .iter()
        .map(|r| r.component_percent)
        .fold(None, |acc: Option<f64>, percent| {
            Some(acc.map_or(percent, |a| a.max(percent)))
        })
        .ok_or(PedonError::EmptyHorizonSet {
            lat: coordinate.lat,
            lon: coordinate.lon,
        })?;

    Ok(complete
        .into_iter()
        .filter(|r| r.component_percent == highest)
        .cloned()
        .collect())
}

/// Length of the intersection between a horizon and a bin; positive for
/// every horizon passing the strict overlap test.
fn intersection(record: &HorizonRecord, bin: DepthBin) -> f64 {
    record.depth_bottom.min(bin.upper) - record.depth_top.max(bin.lower)
}

fn weighted_average(
    overlapping: &[&HorizonRecord],
    weights: &[f64],
    total_weight: f64,
    value: impl Fn(&HorizonRecord) -> Option<f64>,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut any = false;
    for (&record, weight) in overlapping.iter().zip(weights) {
        if let Some(v) = value(record) {
            sum += v * weight;
            any = true;
        }
    }
    any.then(|| sum / total_weight)
}

fn empty_row(bin: DepthBin, coordinate: Coordinate) -> BinnedRow {
    BinnedRow {
        depth_bin: bin.label(),
        bin_lower: bin.lower,
        bin_upper: bin.upper,
        depth_top: None,
        depth_bottom: None,
        component_percent: None,
        properties: BTreeMap::new(),
        horizon_name: None,
        horizon_key: None,
        component_key: None,
        lat: coordinate.lat,
        lon: coordinate.lon,
        available_water_storage: None,
    }
}

/// Length-weighted averages over the portion of `bin` covered by
/// horizons. Horizons that merely touch a bin boundary do not count as
/// overlapping. When nothing overlaps, or the covered length is zero,
/// every field of the row stays absent.
pub fn aggregate_bin(
    records: &[HorizonRecord],
    bin: DepthBin,
    coordinate: Coordinate,
) -> BinnedRow {
    let mut row = empty_row(bin, coordinate);

    let overlapping: Vec<&HorizonRecord> = records
        .iter()
        .filter(|r| r.depth_top < bin.upper && r.depth_bottom > bin.lower)
        .collect();
    let weights: Vec<f64> = overlapping.iter().map(|r| intersection(r, bin)).collect();
    let total_weight: f64 = weights.iter().sum();
    if overlapping.is_empty() || total_weight <= 0.0 {
        return row;
    }

    row.depth_top = weighted_average(&overlapping, &weights, total_weight, |r| Some(r.depth_top));
    row.depth_bottom =
        weighted_average(&overlapping, &weights, total_weight, |r| Some(r.depth_bottom));
    row.component_percent = weighted_average(&overlapping, &weights, total_weight, |r| {
        Some(r.component_percent)
    });
    for spec in PROPERTY_COLUMNS {
        if let Some(v) =
            weighted_average(&overlapping, &weights, total_weight, |r| r.property(spec.name))
        {
            row.properties.insert(spec.name.to_string(), v);
        }
    }

    // Representative values are carried from the first overlapping record
    // in original order, not weighted by dominance.
    let first = overlapping[0];
    row.horizon_name = first.horizon_name.clone();
    row.horizon_key = first.horizon_key.clone();
    row.component_key = first.component_key.clone();

    row
}

/// One row per grid bin; each bin is computed independently of the others.
pub fn bin_profile(
    records: &[HorizonRecord],
    grid: &DepthGrid,
    coordinate: Coordinate,
) -> Vec<BinnedRow> {
    grid.bins()
        .into_iter()
        .map(|bin| aggregate_bin(records, bin, coordinate))
        .collect()
}

/// Applies presentation rounding, derives available water storage from
/// the bin width, and forward-fills gaps from the nearest preceding row.
/// Filled values are carried-forward approximations, not measurements.
pub fn finalize_profile(rows: &mut [BinnedRow]) {
    for row in rows.iter_mut() {
        for spec in PROPERTY_COLUMNS {
            round_property(&mut row.properties, spec.name, spec.rounding);
        }
        row.available_water_storage = row
            .property("awc")
            .map(|awc| awc * (row.bin_upper - row.bin_lower) / 100.0);
    }
    forward_fill(rows);
}

fn round_property(properties: &mut BTreeMap<String, f64>, name: &str, rounding: Rounding) {
    match rounding {
        Rounding::Unrounded => {}
        Rounding::Decimals(places) => {
            if let Some(v) = properties.get_mut(name) {
                *v = round_to(*v, places);
            }
        }
        Rounding::Whole => {
            if let Some(v) = properties.get(name).copied() {
                if v.is_finite() {
                    properties.insert(name.to_string(), v.trunc());
                } else {
                    properties.remove(name);
                }
            }
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn forward_fill(rows: &mut [BinnedRow]) {
    let mut carry_properties: BTreeMap<String, f64> = BTreeMap::new();
    let mut carry_depth_top = None;
    let mut carry_depth_bottom = None;
    let mut carry_component_percent = None;
    let mut carry_horizon_name = None;
    let mut carry_horizon_key = None;
    let mut carry_component_key = None;
    let mut carry_water_storage = None;

    for row in rows.iter_mut() {
        fill(&mut row.depth_top, &mut carry_depth_top);
        fill(&mut row.depth_bottom, &mut carry_depth_bottom);
        fill(&mut row.component_percent, &mut carry_component_percent);
        fill(&mut row.horizon_name, &mut carry_horizon_name);
        fill(&mut row.horizon_key, &mut carry_horizon_key);
        fill(&mut row.component_key, &mut carry_component_key);
        fill(&mut row.available_water_storage, &mut carry_water_storage);

        for spec in PROPERTY_COLUMNS {
            match row.properties.get(spec.name) {
                Some(v) => {
                    carry_properties.insert(spec.name.to_string(), *v);
                }
                None => {
                    if let Some(v) = carry_properties.get(spec.name) {
                        row.properties.insert(spec.name.to_string(), *v);
                    }
                }
            }
        }
    }
}

/// Fills an absent slot from the carry, or refreshes the carry from a
/// present one.
fn fill<T: Clone>(slot: &mut Option<T>, carry: &mut Option<T>) {
    match slot {
        Some(value) => *carry = Some(value.clone()),
        None => *slot = carry.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coordinate {
        Coordinate {
            lat: 36.5,
            lon: -98.5,
        }
    }

    fn horizon(percent: f64, top: f64, bottom: f64, props: &[(&str, f64)]) -> HorizonRecord {
        HorizonRecord {
            component_key: Some("25621021".to_string()),
            horizon_key: Some("76544234".to_string()),
            horizon_name: Some("Ap".to_string()),
            component_percent: percent,
            depth_top: top,
            depth_bottom: bottom,
            properties: props.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn textured(percent: f64, top: f64, bottom: f64, sand: f64, silt: f64, clay: f64) -> HorizonRecord {
        horizon(
            percent,
            top,
            bottom,
            &[("sand", sand), ("silt", silt), ("clay", clay)],
        )
    }

    #[test]
    fn dominant_filter_keeps_all_ties() {
        let records = vec![
            textured(40.0, 0.0, 10.0, 20.0, 40.0, 40.0),
            textured(55.0, 0.0, 10.0, 40.0, 30.0, 30.0),
            textured(55.0, 10.0, 20.0, 35.0, 35.0, 30.0),
        ];
        let kept = dominant_component(&records, coord()).unwrap();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.component_percent == 55.0));
    }

    #[test]
    fn incomplete_texture_is_dropped_before_selection() {
        let records = vec![
            horizon(90.0, 0.0, 10.0, &[("sand", 40.0), ("silt", 30.0)]),
            textured(55.0, 0.0, 10.0, 40.0, 30.0, 30.0),
        ];
        let kept = dominant_component(&records, coord()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].component_percent, 55.0);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let incomplete = vec![horizon(90.0, 0.0, 10.0, &[("sand", 40.0)])];
        assert!(matches!(
            dominant_component(&incomplete, coord()),
            Err(PedonError::EmptyHorizonSet { .. })
        ));
        assert!(matches!(
            dominant_component(&[], coord()),
            Err(PedonError::EmptyHorizonSet { .. })
        ));
    }

    #[test]
    fn constant_value_averages_exactly() {
        let records = vec![
            textured(85.0, 0.0, 4.0, 40.0, 30.0, 30.0),
            textured(85.0, 4.0, 12.0, 40.0, 30.0, 30.0),
        ];
        let bin = DepthBin {
            lower: 0.0,
            upper: 10.0,
        };
        let row = aggregate_bin(&records, bin, coord());
        assert_eq!(row.property("sand"), Some(40.0));
        assert_eq!(row.property("silt"), Some(30.0));
        assert_eq!(row.property("clay"), Some(30.0));
    }

    #[test]
    fn touching_horizons_do_not_overlap() {
        let records = vec![textured(85.0, 10.0, 20.0, 40.0, 30.0, 30.0)];
        let above = aggregate_bin(
            &records,
            DepthBin {
                lower: 0.0,
                upper: 10.0,
            },
            coord(),
        );
        let below = aggregate_bin(
            &records,
            DepthBin {
                lower: 20.0,
                upper: 30.0,
            },
            coord(),
        );
        for row in [&above, &below] {
            assert!(row.property("sand").is_none());
            assert!(row.horizon_name.is_none());
            assert!(row.depth_top.is_none());
        }
    }

    #[test]
    fn zero_length_horizons_produce_no_averages() {
        let records = vec![textured(85.0, 5.0, 5.0, 40.0, 30.0, 30.0)];
        let row = aggregate_bin(
            &records,
            DepthBin {
                lower: 0.0,
                upper: 10.0,
            },
            coord(),
        );
        assert!(row.property("sand").is_none());
        assert!(row.horizon_name.is_none());
    }

    #[test]
    fn intersections_cover_the_whole_horizon() {
        let record = textured(85.0, 3.0, 57.0, 40.0, 30.0, 30.0);
        let total: f64 = DepthGrid::default()
            .bins()
            .into_iter()
            .filter(|b| record.depth_top < b.upper && record.depth_bottom > b.lower)
            .map(|b| intersection(&record, b))
            .sum();
        assert!((total - (record.depth_bottom - record.depth_top)).abs() < 1e-9);
    }

    #[test]
    fn partially_reported_column_keeps_the_full_denominator() {
        let records = vec![
            horizon(
                85.0,
                0.0,
                5.0,
                &[("sand", 40.0), ("silt", 30.0), ("clay", 30.0), ("om", 2.0)],
            ),
            textured(85.0, 5.0, 10.0, 40.0, 30.0, 30.0),
        ];
        let row = aggregate_bin(
            &records,
            DepthBin {
                lower: 0.0,
                upper: 10.0,
            },
            coord(),
        );
        // om is reported by the first five centimeters only: 2.0 * 5 / 10.
        assert_eq!(row.property("om"), Some(1.0));
        // A column no overlapping horizon reports stays absent.
        assert_eq!(row.property("ec"), None);
    }

    #[test]
    fn representative_fields_come_from_the_first_overlapping_record() {
        let mut upper = textured(85.0, 0.0, 5.0, 40.0, 30.0, 30.0);
        upper.horizon_name = Some("A".to_string());
        upper.horizon_key = Some("111".to_string());
        let mut lower = textured(85.0, 5.0, 10.0, 40.0, 30.0, 30.0);
        lower.horizon_name = Some("Bt".to_string());
        lower.horizon_key = Some("222".to_string());

        let row = aggregate_bin(
            &[upper, lower],
            DepthBin {
                lower: 0.0,
                upper: 10.0,
            },
            coord(),
        );
        assert_eq!(row.horizon_name.as_deref(), Some("A"));
        assert_eq!(row.horizon_key.as_deref(), Some("111"));
    }

    #[test]
    fn finalize_rounds_and_derives_water_storage() {
        let records = vec![horizon(
            85.0,
            0.0,
            10.0,
            &[
                ("sand", 40.26),
                ("silt", 30.0),
                ("clay", 30.0),
                ("awc", 0.2),
                ("t_factor", 4.7),
                ("sat_hidric_cond", 9.16669),
            ],
        )];
        let mut rows = bin_profile(&records, &DepthGrid::new(10.0, 10.0), coord());
        finalize_profile(&mut rows);

        assert_eq!(rows[0].property("sand"), Some(40.3));
        assert_eq!(rows[0].property("t_factor"), Some(4.0));
        assert_eq!(rows[0].property("sat_hidric_cond"), Some(9.1667));
        assert_eq!(rows[0].available_water_storage, Some(0.02));
    }

    #[test]
    fn gaps_fill_from_the_nearest_preceding_bin() {
        let records = vec![
            textured(85.0, 0.0, 10.0, 40.0, 30.0, 30.0),
            textured(85.0, 20.0, 30.0, 10.0, 45.0, 45.0),
        ];
        let mut rows = bin_profile(&records, &DepthGrid::new(40.0, 10.0), coord());
        assert!(rows[1].property("sand").is_none());

        finalize_profile(&mut rows);
        assert_eq!(rows[1].property("sand"), Some(40.0));
        assert_eq!(rows[2].property("sand"), Some(10.0));
        assert_eq!(rows[3].property("sand"), Some(10.0));
        assert_eq!(rows[1].horizon_name, rows[0].horizon_name);
    }

    #[test]
    fn leading_gaps_stay_absent() {
        let records = vec![textured(85.0, 10.0, 20.0, 40.0, 30.0, 30.0)];
        let mut rows = bin_profile(&records, &DepthGrid::new(20.0, 10.0), coord());
        finalize_profile(&mut rows);

        assert!(rows[0].property("sand").is_none());
        assert!(rows[0].horizon_name.is_none());
        assert!(rows[0].available_water_storage.is_none());
        assert_eq!(rows[1].property("sand"), Some(40.0));
    }

    #[test]
    fn single_horizon_profile_end_to_end() {
        let records = vec![horizon(
            85.0,
            0.0,
            30.0,
            &[
                ("sand", 40.0),
                ("silt", 30.0),
                ("clay", 30.0),
                ("awc", 0.2),
            ],
        )];
        let kept = dominant_component(&records, coord()).unwrap();
        let mut rows = bin_profile(&kept, &DepthGrid::default(), coord());
        finalize_profile(&mut rows);

        assert_eq!(rows.len(), 20);
        for row in &rows {
            assert_eq!(row.property("sand"), Some(40.0));
            assert_eq!(row.property("silt"), Some(30.0));
            assert_eq!(row.property("clay"), Some(30.0));
            assert_eq!(row.available_water_storage, Some(0.02));
            assert_eq!(row.horizon_name.as_deref(), Some("Ap"));
        }
        assert_eq!(rows[0].depth_top, Some(0.0));
        assert_eq!(rows[0].depth_bottom, Some(30.0));
    }
}

use serde::Serialize;
use std::collections::BTreeMap;

/// One report row: the length-weighted aggregate of every horizon
/// overlapping a single depth bin at one coordinate. Rows are computed
/// once per (coordinate, bin) and never mutated after finalization.
#[derive(Debug, Clone, Serialize)]
pub struct BinnedRow {
    pub depth_bin: String,
    #[serde(skip)]
    pub bin_lower: f64,
    #[serde(skip)]
    pub bin_upper: f64,
    /// Weighted averages of the raw horizon depth bounds and component
    /// percentage over the bin; absent when nothing overlaps.
    pub depth_top: Option<f64>,
    pub depth_bottom: Option<f64>,
    pub component_percent: Option<f64>,
    /// Averaged property columns; absent columns were reported by no
    /// overlapping horizon.
    #[serde(flatten)]
    pub properties: BTreeMap<String, f64>,
    /// Representative categorical fields, carried (not averaged) from the
    /// first overlapping horizon.
    pub horizon_name: Option<String>,
    pub horizon_key: Option<String>,
    pub component_key: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Water-holding capacity of the binned interval, derived from `awc`
    /// and the bin width.
    pub available_water_storage: Option<f64>,
}

impl BinnedRow {
    pub fn property(&self, name: &str) -> Option<f64> {
        self.properties.get(name).copied()
    }
}

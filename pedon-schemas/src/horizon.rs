use crate::columns::{PROPERTY_COLUMNS, TEXTURE_COLUMNS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tabular record as decoded from the survey service: column name to
/// raw string value.
pub type RawRecord = BTreeMap<String, String>;

/// A single soil horizon belonging to a component of a map unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonRecord {
    pub component_key: Option<String>,
    pub horizon_key: Option<String>,
    pub horizon_name: Option<String>,
    /// Representative percentage of the map unit occupied by this
    /// component (0-100).
    pub component_percent: f64,
    /// Depth bounds in centimeters; `depth_top < depth_bottom`.
    pub depth_top: f64,
    pub depth_bottom: f64,
    /// Numeric property columns. A column that is missing upstream or
    /// fails numeric parsing is absent from the map.
    pub properties: BTreeMap<String, f64>,
}

impl HorizonRecord {
    /// Builds a horizon from one raw table row, coercing property values
    /// to numbers. Returns `None` when a required field (`deptht`,
    /// `depthb`, `prcent`) is missing or non-numeric; such records are
    /// discarded before aggregation.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        let depth_top = parse_numeric(raw.get("deptht")?)?;
        let depth_bottom = parse_numeric(raw.get("depthb")?)?;
        let component_percent = parse_numeric(raw.get("prcent")?)?;

        let mut properties = BTreeMap::new();
        for spec in PROPERTY_COLUMNS {
            if let Some(value) = raw.get(spec.name).and_then(|v| parse_numeric(v)) {
                properties.insert(spec.name.to_string(), value);
            }
        }

        Some(Self {
            component_key: non_empty(raw.get("cokey")),
            horizon_key: non_empty(raw.get("chkey")),
            horizon_name: non_empty(raw.get("hzname")),
            component_percent,
            depth_top,
            depth_bottom,
            properties,
        })
    }

    pub fn property(&self, name: &str) -> Option<f64> {
        self.properties.get(name).copied()
    }

    /// Whether all three texture fractions are present.
    pub fn has_complete_texture(&self) -> bool {
        TEXTURE_COLUMNS.iter().all(|c| self.properties.contains_key(*c))
    }
}

fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

use anyhow::{bail, Context, Result};
use pedon_schemas::{coordinate::Coordinate, depth::DepthGrid};
use serde::Deserialize;
use std::{fs, path::Path};

/// A survey request: the coordinates to sample and the depth grid to bin
/// their horizons into.
#[derive(Debug, Deserialize)]
pub struct SurveyRequest {
    pub coordinates: Vec<Coordinate>,
    #[serde(default = "default_max_depth_cm")]
    pub max_depth_cm: f64,
    #[serde(default = "default_bin_width_cm")]
    pub bin_width_cm: f64,
}

fn default_max_depth_cm() -> f64 {
    200.0
}

fn default_bin_width_cm() -> f64 {
    10.0
}

impl SurveyRequest {
    /// Loads a request from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {:?}", path))?;
        let request: SurveyRequest = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        if request.coordinates.is_empty() {
            bail!("Request file {:?} lists no coordinates", path);
        }
        if request.max_depth_cm <= 0.0 || request.bin_width_cm <= 0.0 {
            bail!("Depth grid settings in {:?} must be positive", path);
        }
        Ok(request)
    }

    pub fn grid(&self) -> DepthGrid {
        DepthGrid::new(self.max_depth_cm, self.bin_width_cm)
    }
}

use serde::{Deserialize, Serialize};

/// A half-open depth interval `[lower, upper)` in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBin {
    pub lower: f64,
    pub upper: f64,
}

impl DepthBin {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Report label, e.g. `"0-10"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower, self.upper)
    }
}

/// The fixed binning grid: uniform-width bins spanning `[0, max_depth)`,
/// generated from configuration alone. The grid never depends on the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthGrid {
    pub max_depth: f64,
    pub bin_width: f64,
}

impl DepthGrid {
    pub fn new(max_depth: f64, bin_width: f64) -> Self {
        Self {
            max_depth,
            bin_width,
        }
    }

    pub fn bins(&self) -> Vec<DepthBin> {
        let mut bins = Vec::new();
        if self.bin_width <= 0.0 {
            return bins;
        }
        let mut lower = 0.0;
        while lower + self.bin_width <= self.max_depth + 1e-9 {
            bins.push(DepthBin {
                lower,
                upper: lower + self.bin_width,
            });
            lower += self.bin_width;
        }
        bins
    }
}

impl Default for DepthGrid {
    fn default() -> Self {
        Self::new(200.0, 10.0)
    }
}

/// Presentation rounding applied to an averaged property column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Reported exactly as averaged.
    Unrounded,
    /// Rounded to a fixed number of decimal places.
    Decimals(u32),
    /// Truncated to a whole number; values that cannot be coerced to an
    /// integer become absent.
    Whole,
}

/// One numeric property column as named by the survey service query.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub rounding: Rounding,
}

/// Texture fractions a horizon must carry to take part in component
/// selection.
pub const TEXTURE_COLUMNS: [&str; 3] = ["sand", "silt", "clay"];

/// Every averaged property column, in report order.
pub const PROPERTY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "sand", rounding: Rounding::Decimals(1) },
    ColumnSpec { name: "silt", rounding: Rounding::Decimals(1) },
    ColumnSpec { name: "clay", rounding: Rounding::Decimals(1) },
    ColumnSpec { name: "awc", rounding: Rounding::Unrounded },
    ColumnSpec { name: "om", rounding: Rounding::Unrounded },
    ColumnSpec { name: "bulk_density", rounding: Rounding::Decimals(2) },
    ColumnSpec { name: "th33", rounding: Rounding::Unrounded },
    ColumnSpec { name: "ph", rounding: Rounding::Unrounded },
    ColumnSpec { name: "sat_hidric_cond", rounding: Rounding::Decimals(4) },
    ColumnSpec { name: "ec", rounding: Rounding::Unrounded },
    ColumnSpec { name: "sar", rounding: Rounding::Unrounded },
    ColumnSpec { name: "caco3", rounding: Rounding::Unrounded },
    ColumnSpec { name: "k_factor", rounding: Rounding::Decimals(2) },
    ColumnSpec { name: "t_factor", rounding: Rounding::Whole },
    ColumnSpec { name: "rep_slope", rounding: Rounding::Unrounded },
    ColumnSpec { name: "water_content_0_1bar", rounding: Rounding::Unrounded },
    ColumnSpec { name: "water_content_15bar", rounding: Rounding::Unrounded },
    ColumnSpec { name: "wind_erodibility_group", rounding: Rounding::Whole },
    ColumnSpec { name: "wind_erodibility_index", rounding: Rounding::Whole },
    ColumnSpec { name: "bulk_density_10", rounding: Rounding::Unrounded },
    ColumnSpec { name: "water_content_10bar", rounding: Rounding::Unrounded },
];

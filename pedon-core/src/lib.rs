pub mod binning;
pub mod error;
pub mod export;

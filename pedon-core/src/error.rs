use thiserror::Error;

#[derive(Debug, Error)]
pub enum PedonError {
    #[error("no horizon records with complete texture data at ({lat}, {lon})")]
    EmptyHorizonSet { lat: f64, lon: f64 },

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to write CSV report '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

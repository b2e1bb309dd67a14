use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Required sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::XlsxError> for DashboardError {
    fn from(err: calamine::XlsxError) -> Self {
        DashboardError::Workbook(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

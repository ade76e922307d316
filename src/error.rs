use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaprepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read workbook: {0}")]
    WorkbookRead(String),

    #[error("Could not write workbook: {0}")]
    WorkbookWrite(String),

    #[error("Missing required sheet: {0}")]
    MissingSheet(String),

    #[error("Could not extract year-end date from the FAR sheet")]
    MissingYearEnd,

    #[error("Could not extract management-accounts date from the FAR sheet")]
    MissingManagementPeriod,
}

pub type Result<T> = std::result::Result<T, MaprepError>;

use foundation::geo::GeoError;

/// Dataset-level failure. The whole dataset is unusable; callers degrade by
/// proceeding without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// The source could not be read (network error, missing file, HTTP status).
    Fetch(String),
    /// The file had no header or no data rows.
    Empty,
    /// The CSV could not be parsed.
    Malformed { line: Option<u64>, reason: String },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Fetch(msg) => write!(f, "failed to fetch dataset: {msg}"),
            DatasetError::Empty => write!(f, "dataset is empty"),
            DatasetError::Malformed {
                line: Some(line),
                reason,
            } => write!(f, "malformed CSV at line {line}: {reason}"),
            DatasetError::Malformed { line: None, reason } => {
                write!(f, "malformed CSV: {reason}")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line());
        DatasetError::Malformed {
            line,
            reason: e.to_string(),
        }
    }
}

/// Why a single row was skipped. Never fatal for the dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum RowRejection {
    MissingField(&'static str),
    InvalidNumber { field: String, value: String },
    InvalidCoordinates(String),
    OutOfRange(GeoError),
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRejection::MissingField(field) => write!(f, "missing required field {field}"),
            RowRejection::InvalidNumber { field, value } => {
                write!(f, "field {field} is not a number: {value:?}")
            }
            RowRejection::InvalidCoordinates(raw) => {
                write!(f, "unparseable coordinate list: {raw:?}")
            }
            RowRejection::OutOfRange(e) => write!(f, "invalid position: {e}"),
        }
    }
}

impl std::error::Error for RowRejection {}

impl From<GeoError> for RowRejection {
    fn from(e: GeoError) -> Self {
        RowRejection::OutOfRange(e)
    }
}

use thiserror::Error;

/// Errors raised while reading or writing AAVF data.
#[derive(Error, Debug)]
pub enum AavfError {
    /// An `##INFO` or `##FILTER` line did not match its grammar.
    #[error("One of the {kind} lines is malformed: {line}")]
    MalformedHeaderLine { kind: &'static str, line: String },

    /// No `#CHROM ...` column header row could be found.
    #[error("No column header row found ({reason}); no data present or malformed file")]
    MissingHeaderRow { reason: String },

    /// A data row could not be decoded.
    #[error("Malformed data row ({reason}): {line}")]
    MalformedDataRow { line: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open compressed input: {0}")]
    Compression(#[source] niffler::Error),
}

impl AavfError {
    pub(crate) fn data_row(line: &str, reason: impl Into<String>) -> Self {
        AavfError::MalformedDataRow {
            line: line.to_owned(),
            reason: reason.into(),
        }
    }
}

/// I/O failures while opening a path stay I/O errors; anything else is a
/// problem with the compressed stream.
impl From<niffler::Error> for AavfError {
    fn from(e: niffler::Error) -> Self {
        match e {
            niffler::Error::IOError(e) => AavfError::Io(e),
            e => AavfError::Compression(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AavfError>;

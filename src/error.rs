use thiserror::Error;

/// Package-level failure. A conversion that returns this produced no HTML.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid DOCX: {0}")]
    InvalidDocx(String),
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Failure scoped to one block. The walker logs it and moves on to the
/// next sibling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("unreadable run properties: {0}")]
    StyleExtraction(#[from] StyleError),
    #[error("unsupported image {rel_id}: {reason}")]
    UnsupportedImage { rel_id: String, reason: String },
    #[error("image relationship {0} does not resolve to a package part")]
    MissingImage(String),
    #[error("table nesting depth {depth} exceeds limit {limit}")]
    NestingTooDeep { depth: usize, limit: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StyleError {
    #[error("invalid font size {0:?}")]
    FontSize(String),
    #[error("invalid color {0:?}")]
    Color(String),
}

//! Error types for the catalog-data crate.
//!
//! This module defines semantic error enums for seed catalogue parsing and
//! persisted catalogue reads and writes, following the project's error
//! handling conventions with `thiserror`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing catalogue documents.
///
/// These errors cover file I/O, JSON parsing and schema validation. A
/// missing file is reported separately from an unreadable one so callers
/// can treat first launch differently from corruption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogDataError {
    /// The catalogue file does not exist.
    #[error("catalogue file not found at '{path}'")]
    NotFound {
        /// Path that was probed.
        path: Utf8PathBuf,
    },

    /// The catalogue file could not be read.
    #[error("failed to read catalogue file at '{path}': {message}")]
    IoError {
        /// Path to the catalogue file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The catalogue JSON is malformed or missing required fields.
    #[error("invalid catalogue JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The seed document version is not supported.
    #[error("unsupported seed catalogue version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the document.
        actual: u32,
    },

    /// The seed document lists no regions, so POIs cannot be owned.
    #[error("seed catalogue contains no regions")]
    EmptyRegions,

    /// The catalogue file could not be written.
    #[error("failed to write catalogue file at '{path}': {message}")]
    WriteError {
        /// Path that was being written.
        path: Utf8PathBuf,
        /// Description of the write failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_correctly() {
        let err = CatalogDataError::NotFound {
            path: Utf8PathBuf::from("/tmp/poi_catalog.json"),
        };
        assert_eq!(
            err.to_string(),
            "catalogue file not found at '/tmp/poi_catalog.json'"
        );
    }

    #[test]
    fn parse_error_formats_correctly() {
        let err = CatalogDataError::ParseError {
            message: "unexpected token".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid catalogue JSON: unexpected token");
    }

    #[test]
    fn version_error_formats_correctly() {
        let err = CatalogDataError::UnsupportedVersion {
            expected: 1,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "unsupported seed catalogue version: expected 1, found 3"
        );
    }

    #[test]
    fn write_error_formats_correctly() {
        let err = CatalogDataError::WriteError {
            path: Utf8PathBuf::from("poi_catalog.json"),
            message: "read-only file system".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write catalogue file at 'poi_catalog.json': read-only file system"
        );
    }
}

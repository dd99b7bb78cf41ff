#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Panel dataset pipeline: loading, aggregation, and partitioning.
//!
//! Turns the raw migration/crime CSV into cleaned records, derives the
//! total-crime measure, and partitions the panel into analysis units
//! (single country, whole-region union, per-crime-type) as ordered
//! series or (migration, crime) sample tables.
//!
//! Error policy follows three granularities: structural problems with
//! the source (unreadable file, missing country/year column) are fatal;
//! row-level coercion failures are recovered by dropping the row (bad
//! year) or marking the field absent (bad cell); unit-level emptiness is
//! reported as [`PanelError::EmptyUnit`] and left to the caller, which
//! skips the unit in multi-unit runs.

pub mod aggregate;
pub mod loader;
pub mod partition;
pub mod schema;

use thiserror::Error;

/// Errors from panel loading and partitioning.
#[derive(Debug, Error)]
pub enum PanelError {
    /// CSV file could not be opened or read.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// A required column is not present in the source header.
    #[error("missing required column '{column}' in {path}")]
    MissingColumn {
        /// The column that was not found.
        column: String,
        /// Path to the CSV file.
        path: String,
    },

    /// I/O error reading a configuration file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Schema TOML could not be parsed.
    #[error("invalid schema file {path}: {source}")]
    Schema {
        /// Path to the schema file.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A requested analysis unit has no usable rows.
    #[error("no rows for unit '{unit}'")]
    EmptyUnit {
        /// Display name of the empty unit.
        unit: String,
    },
}

//! Error types for FastROSE
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for FastROSE operations
#[derive(Debug, Error)]
pub enum FastRoseError {
    /// Locus collection errors
    #[error("Locus error: {0}")]
    Locus(#[from] LocusError),

    /// Input table parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Two input regions share an identifier
    #[error(
        "Regions have non-unique identifiers (first repeat: '{id}'). The second column of the \
         input .gff or the fourth column of the input .bed must hold a unique identifier for each region"
    )]
    NonUniqueIdentifier { id: String },

    /// Genome build with no known annotation
    #[error("Unknown genome build '{0}' (expected one of HG18, HG19, HG38, MM8, MM9, MM10)")]
    UnknownGenome(String),

    /// Annotation file could not be located
    #[error("Annotation file not found: {0}")]
    AnnotationNotFound(PathBuf),

    /// TSS exclusion was requested but no annotation was supplied
    #[error("TSS exclusion window is {tss_window} but no gene annotation was provided")]
    AnnotationRequired { tss_window: u64 },

    /// Required input file is missing
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    /// Input file extension is not one we can turn into regions
    #[error("Input file must be a .bed, .gtf, .gff or .gff3 file: {0}")]
    UnsupportedInput(PathBuf),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by locus construction and collection bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocusError {
    /// A locus with this identifier is already in the collection
    #[error("Duplicate locus identifier: {0}")]
    DuplicateIdentifier(String),

    /// The locus is not a member of the collection
    #[error("Locus not found in collection: {0}")]
    NotFound(String),

    /// Invalid coordinate range
    #[error("Invalid coordinate range: start ({start}) > end ({end})")]
    InvalidRange { start: u64, end: u64 },
}

/// Errors that can occur while reading tabular inputs
#[derive(Debug, Error)]
pub enum ParseError {
    /// Invalid GFF row
    #[error("Invalid GFF format at line {line}: {message}")]
    InvalidGff { line: usize, message: String },

    /// Invalid gene annotation row
    #[error("Invalid annotation format at line {line}: {message}")]
    InvalidAnnotation { line: usize, message: String },

    /// Annotation header lacks a required column
    #[error("Annotation header is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// Table has no header line
    #[error("Table is empty, expected a header line")]
    MissingHeader,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FastROSE operations
pub type Result<T> = std::result::Result<T, FastRoseError>;

/// Result type alias for locus operations
pub type LocusResult<T> = std::result::Result<T, LocusError>;

/// Result type alias for parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

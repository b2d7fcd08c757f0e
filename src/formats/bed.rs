//! BED format adapter
//!
//! Converts BED region files into GFF3 region tables with zero-copy parsing.
//! BED starts are 0-based and become `start + 1` in GFF3; ends are unchanged.

use crate::core::{Result, Strand};
use crate::formats::gff::split_fields;
use crate::formats::{convert_to_gff3, ConversionStats};
use std::path::Path;

/// Zero-copy BED record view for parsing
/// Only parses coordinate fields immediately, other fields are kept as byte slices
pub struct BedRecordView<'a> {
    /// Original line bytes
    line: &'a [u8],
    /// Chromosome name
    pub chrom: &'a str,
    /// Start position (0-based)
    pub start: u64,
    /// End position
    pub end: u64,
    /// Field boundaries (start, end) for lazy access
    field_bounds: Vec<(usize, usize)>,
}

impl<'a> BedRecordView<'a> {
    /// Parse a BED line with minimal allocation
    /// Only parses chrom, start, end immediately
    pub fn parse(line: &'a [u8]) -> std::result::Result<Self, BedParseError> {
        if line.is_empty() {
            return Err(BedParseError::EmptyLine);
        }

        let field_bounds = split_fields(line, 6);

        // Need at least 3 fields (BED3)
        if field_bounds.len() < 3 {
            return Err(BedParseError::TooFewFields {
                expected: 3,
                found: field_bounds.len(),
            });
        }

        let text = |idx: usize, name: &'static str| -> std::result::Result<&'a str, BedParseError> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| BedParseError::InvalidUtf8(name))
        };
        let number = |idx: usize, name: &'static str| -> std::result::Result<u64, BedParseError> {
            let field = text(idx, name)?;
            field
                .trim()
                .parse()
                .map_err(|_| BedParseError::InvalidNumber(name, field.to_string()))
        };

        let chrom = text(0, "chrom")?;
        let start = number(1, "start")?;
        let end = number(2, "end")?;
        if start >= end {
            return Err(BedParseError::EmptyInterval { start, end });
        }

        Ok(Self {
            line,
            chrom,
            start,
            end,
            field_bounds,
        })
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.field_bounds.len()
    }

    /// Get field as string slice (lazy access)
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.field_bounds
            .get(index)
            .and_then(|(start, end)| std::str::from_utf8(&self.line[*start..*end]).ok())
    }

    /// Get name field (field 3) if present
    pub fn name(&self) -> Option<&'a str> {
        self.field(3).filter(|s| !s.is_empty())
    }

    /// Get score field (field 4) if present
    pub fn score(&self) -> Option<&'a str> {
        self.field(4).filter(|s| !s.is_empty())
    }

    /// Get strand field (field 5) if present
    pub fn strand(&self) -> Option<Strand> {
        self.field(5).and_then(Strand::from_field)
    }

    /// Render as a GFF3 row
    ///
    /// Missing score and strand become `.`, the name lands in a `name=`
    /// attribute.
    pub fn to_gff3(&self) -> String {
        let attributes = match self.name() {
            Some(name) => format!("name={}", name),
            None => ".".to_string(),
        };
        format!(
            "{}\t.\tsequence_feature\t{}\t{}\t{}\t{}\t.\t{}",
            self.chrom,
            self.start + 1,
            self.end,
            self.score().unwrap_or("."),
            self.strand().unwrap_or_default(),
            attributes
        )
    }
}

/// BED parsing error
#[derive(Debug, thiserror::Error)]
pub enum BedParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("Interval [{start}, {end}) is empty")]
    EmptyInterval { start: u64, end: u64 },
}

/// Convert a BED file into a GFF3 region table
///
/// Rows that do not parse are skipped and counted.
pub fn convert_bed<P: AsRef<Path>>(input: P, output: P) -> Result<ConversionStats> {
    convert_to_gff3(input, output, |line| {
        BedRecordView::parse(line.as_bytes())
            .ok()
            .map(|view| view.to_gff3())
    })
}

//! File format adapters
//!
//! Adapters for the region, annotation and signal tables (GFF3, BED, GTF,
//! mapped signal, region map).

pub mod bed;
pub mod gff;
pub mod gtf;
pub mod signal;
pub mod table;

pub use bed::{convert_bed, BedParseError, BedRecordView};
pub use gff::{
    parse_gff_reader, read_gff_collection, write_stitched_gff, GffParseError,
    GffRecordView,
};
pub use gtf::{convert_gtf, GTF_ATTRIBUTES};
pub use signal::{
    parse_coordinate_string, parse_signal_reader, read_signal_track, read_signal_tracks,
    SignalSource,
};
pub use table::{write_debug_entries, write_region_table};

use crate::core::{open_input, write_atomically, FastRoseError, Result};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Chunk size for parallel processing
const CHUNK_SIZE: usize = 10000;

/// Tag written in the `##source-version` directive of converted files
pub const SOURCE_VERSION: &str = concat!("fast-rose ", env!("CARGO_PKG_VERSION"));

/// Region table formats accepted as input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Bed,
    Gtf,
    Gff,
}

impl InputFormat {
    /// Detect by extension, looking through a trailing `.gz`/`.bz2`
    pub fn detect(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let name = file_name
            .strip_suffix(".gz")
            .or_else(|| file_name.strip_suffix(".bz2"))
            .unwrap_or(file_name.as_str());

        match name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("bed") => Ok(InputFormat::Bed),
            Some("gtf") => Ok(InputFormat::Gtf),
            Some("gff") | Some("gff3") => Ok(InputFormat::Gff),
            _ => Err(FastRoseError::UnsupportedInput(path.to_path_buf())),
        }
    }
}

/// Conversion statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub comments: usize,
}

/// Write the GFF3 directives that open every converted file
pub fn write_gff3_header<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "##gff-version 3")?;
    writeln!(writer, "##source-version {}", SOURCE_VERSION)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Convert a line-oriented table into GFF3
///
/// Data lines are converted in parallel chunks and written in input order.
/// `convert` returns `None` for rows it cannot handle; those are counted and
/// skipped. The output file only appears once everything is written.
pub(crate) fn convert_to_gff3<P, F>(input: P, output: P, convert: F) -> Result<ConversionStats>
where
    P: AsRef<Path>,
    F: Fn(&str) -> Option<String> + Sync,
{
    let input = input.as_ref();
    if !input.is_file() {
        return Err(FastRoseError::MissingInput(input.to_path_buf()));
    }

    let reader = open_input(input)?;
    let mut data_lines = Vec::new();
    let mut comments = 0;
    for line_result in reader.lines() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        if is_comment(&line) {
            comments += 1;
        } else {
            data_lines.push(line);
        }
    }

    let converted = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let results: Vec<Vec<String>> = data_lines
        .par_chunks(CHUNK_SIZE)
        .map(|chunk| {
            let mut lines = Vec::with_capacity(chunk.len());
            for line in chunk {
                match convert(line) {
                    Some(out) => {
                        lines.push(out);
                        converted.fetch_add(1, Ordering::Relaxed);
                    }
                    None => {
                        log::warn!("Skipping unconvertible line: {}", line);
                        skipped.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            lines
        })
        .collect();

    write_atomically(output.as_ref(), |writer| -> Result<()> {
        write_gff3_header(writer)?;
        for line in results.iter().flatten() {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    })?;

    Ok(ConversionStats {
        total: data_lines.len(),
        converted: converted.load(Ordering::Relaxed),
        skipped: skipped.load(Ordering::Relaxed),
        comments,
    })
}

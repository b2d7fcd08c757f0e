//! Mapped signal tables
//!
//! One table per sequencing sample, produced by an external density step.
//! The first line is a header; every other line holds at least
//!
//! ```text
//! region_id  chrom(strand):start-end  mean_signal  ...
//! ```
//!
//! Rows whose coordinates or signal do not parse are skipped with a warning.

use crate::core::{open_input, FastRoseError, LineIterator, Locus, Result, SignalTrack, Strand};
use log::{info, warn};
use rayon::prelude::*;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parse a coordinate string into `(chrom, start, end, strand)`
///
/// Accepts `chrom(strand):start-end`, `chrom:start-end(strand)` and the
/// strandless `chrom:start-end`.
///
/// # Examples
/// ```
/// use fast_rose::formats::parse_coordinate_string;
/// use fast_rose::core::Strand;
/// assert_eq!(
///     parse_coordinate_string("chr1(+):100-200"),
///     Some(("chr1".to_string(), 100, 200, Strand::Plus))
/// );
/// assert_eq!(
///     parse_coordinate_string("chr1:100-200(-)"),
///     Some(("chr1".to_string(), 100, 200, Strand::Minus))
/// );
/// ```
pub fn parse_coordinate_string(s: &str) -> Option<(String, u64, u64, Strand)> {
    let (head, tail) = s.trim().rsplit_once(':')?;

    let (chrom, head_strand) = match head.split_once('(') {
        Some((chrom, rest)) => (chrom, Some(parse_strand(rest.strip_suffix(')')?)?)),
        None => (head, None),
    };
    let (range, tail_strand) = match tail.split_once('(') {
        Some((range, rest)) => (range, Some(parse_strand(rest.strip_suffix(')')?)?)),
        None => (tail, None),
    };

    let (start, end) = range.split_once('-')?;
    let start: u64 = start.trim().parse().ok()?;
    let end: u64 = end.trim().parse().ok()?;
    if chrom.is_empty() || start > end {
        return None;
    }

    let strand = head_strand.or(tail_strand).unwrap_or_default();
    Some((chrom.to_string(), start, end, strand))
}

fn parse_strand(s: &str) -> Option<Strand> {
    Strand::from_field(s.trim())
}

/// A signal table and the column name it feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSource {
    pub name: String,
    pub path: PathBuf,
}

impl SignalSource {
    /// Source named after its file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// `NAME=PATH`, or a bare `PATH` named after its file
impl FromStr for SignalSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty signal source".to_string());
        }
        match s.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
            }),
            _ => Ok(Self::from_path(s)),
        }
    }
}

/// Build a signal track from a table reader
pub fn parse_signal_reader<R: BufRead>(name: &str, reader: R) -> Result<SignalTrack> {
    let mut lines = LineIterator::new(reader);
    let mut track = SignalTrack::new(name);

    // header
    if let Some(header) = lines.next_line() {
        header?;
    }

    let mut line_number = 1;
    let mut skipped = 0;
    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            warn!("{}: line {}: expected 3 fields, got {}", name, line_number, fields.len());
            skipped += 1;
            continue;
        }
        let Some((chrom, start, end, _)) = parse_coordinate_string(fields[1]) else {
            warn!("{}: line {}: unreadable coordinates '{}'", name, line_number, fields[1]);
            skipped += 1;
            continue;
        };
        let mean: f64 = match fields[2].trim().parse() {
            Ok(mean) => mean,
            Err(_) => {
                warn!("{}: line {}: no signal in '{}'", name, line_number, fields[2]);
                skipped += 1;
                continue;
            }
        };

        let locus = Locus::new(chrom, start, end, Strand::Unstranded, fields[0].trim())?;
        track.push(locus, mean);
    }

    info!("{}: read {} signal regions, skipped {}", name, track.len(), skipped);
    Ok(track)
}

/// Read one signal table, plain or compressed
pub fn read_signal_track(source: &SignalSource) -> Result<SignalTrack> {
    if !source.path.is_file() {
        return Err(FastRoseError::MissingInput(source.path.clone()));
    }
    let reader = open_input(&source.path)?;
    parse_signal_reader(&source.name, reader)
}

/// Read every table in parallel, keeping `sources` order
pub fn read_signal_tracks(sources: &[SignalSource]) -> Result<Vec<SignalTrack>> {
    sources.par_iter().map(read_signal_track).collect()
}

/// Conventional location of a precomputed table under a mapped directory
pub fn mapped_table_path(mapped_dir: &Path, stitched_name: &str, sample: &str) -> PathBuf {
    mapped_dir.join(format!("{}_{}_MAPPED.gff", stitched_name, sample))
}

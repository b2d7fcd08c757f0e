//! Signal density mapping and region ranking
//!
//! Attaches constituent size and per-sample signal to every final region
//! and stages the rows for downstream super-enhancer calling.
//!
//! Rows are ordered by region length (`end - start`, longest first) with the
//! region id as a lexical tie-break. This is a staging order only; the final
//! density rank is computed by the external classification step.

use crate::core::error::{LocusError, LocusResult};
use crate::core::index::LocusCollection;
use crate::core::locus::{Locus, Sense, Strand};
use log::warn;
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::{self, Write};

/// Fixed output column names, before one column per signal track
pub const REGION_TABLE_HEADER: [&str; 6] =
    ["REGION_ID", "CHROM", "START", "STOP", "NUM_LOCI", "CONSTITUENT_SIZE"];

/// Per-sample signal over a set of mapped regions
///
/// Each region contributes `mean_signal * (end - start)`, turning a
/// per-position mean into a total over the region.
#[derive(Debug)]
pub struct SignalTrack {
    name: String,
    loci: LocusCollection,
    totals: HashMap<String, f64>,
}

impl SignalTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loci: LocusCollection::new(),
            totals: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record the mean signal over `locus`
    ///
    /// A repeated region id keeps its first record; the repeat is reported
    /// and ignored.
    pub fn push(&mut self, locus: Locus, mean_signal: f64) -> bool {
        let total = mean_signal * locus.span() as f64;
        let key = locus.key();
        match self.loci.add(locus) {
            Ok(()) => {
                self.totals.insert(key, total);
                true
            }
            Err(LocusError::DuplicateIdentifier(id)) => {
                warn!("{}: duplicate signal region {} ignored", self.name, id);
                false
            }
            Err(e) => {
                warn!("{}: signal region {} ignored: {}", self.name, key, e);
                false
            }
        }
    }

    /// Sum of weighted signal of every mapped region overlapping `region`
    ///
    /// Overlapping mapped regions each contribute in full.
    pub fn signal_over(&self, region: &Locus) -> f64 {
        self.loci
            .get_overlap(region, Sense::Both)
            .into_iter()
            .map(|mapped| self.totals.get(&mapped.key()).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }
}

/// One output row
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRegionRow {
    pub region_id: String,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub num_loci: usize,
    /// Total length of original loci overlapping the region
    pub constituent_size: u64,
    /// One value per signal track, in track order
    pub signals: Vec<f64>,
}

impl RankedRegionRow {
    fn span(&self) -> u64 {
        self.end - self.start
    }
}

/// Final region map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTable {
    pub sample_names: Vec<String>,
    pub rows: Vec<RankedRegionRow>,
}

impl RegionTable {
    pub fn header(&self) -> Vec<&str> {
        REGION_TABLE_HEADER
            .iter()
            .copied()
            .chain(self.sample_names.iter().map(|s| s.as_str()))
            .collect()
    }

    /// Write as tab-separated text with a header line
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.header().join("\t"))?;
        for row in &self.rows {
            write!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.region_id, row.chrom, row.start, row.end, row.num_loci, row.constituent_size
            )?;
            for signal in &row.signals {
                write!(writer, "\t{}", signal)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the region map
///
/// # Arguments
/// * `regions` - Final (stitched and filtered) regions
/// * `reference` - Original pre-stitch loci, used for constituent size
/// * `tracks` - Signal tracks, one output column each, in order
/// * `excluded_chroms` - Chromosomes dropped from the output entirely
pub fn map_collection(
    regions: &LocusCollection,
    reference: &LocusCollection,
    tracks: &[SignalTrack],
    excluded_chroms: &[String],
) -> LocusResult<RegionTable> {
    let mut rows: Vec<RankedRegionRow> = regions
        .loci()
        .filter(|locus| !excluded_chroms.iter().any(|c| c == locus.chrom()))
        .map(|locus| RankedRegionRow {
            region_id: locus.key(),
            chrom: locus.chrom().to_string(),
            start: locus.start(),
            end: locus.end(),
            num_loci: locus.id().merged_count(),
            constituent_size: reference
                .get_overlap(locus, Sense::Both)
                .iter()
                .map(|l| l.len())
                .sum(),
            signals: Vec::with_capacity(tracks.len()),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.span()
            .cmp(&a.span())
            .then_with(|| a.region_id.cmp(&b.region_id))
    });

    let queries = rows
        .iter()
        .map(|row| Locus::new(row.chrom.clone(), row.start, row.end, Strand::Unstranded, row.region_id.as_str()))
        .collect::<LocusResult<Vec<_>>>()?;

    // one column per track, computed independently
    let columns: Vec<Vec<f64>> = tracks
        .par_iter()
        .map(|track| queries.iter().map(|q| track.signal_over(q)).collect())
        .collect();

    for column in &columns {
        for (row, value) in rows.iter_mut().zip(column) {
            row.signals.push(*value);
        }
    }

    Ok(RegionTable {
        sample_names: tracks.iter().map(|t| t.name().to_string()).collect(),
        rows,
    })
}

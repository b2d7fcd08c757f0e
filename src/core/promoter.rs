//! Promoter filters
//!
//! Two passes run around stitching when TSS exclusion is enabled:
//!
//! - [`exclude_tss_contained`] drops candidate loci that sit entirely inside
//!   a `±tss_window` window around any transcription start site.
//! - [`resolve_multi_promoter`] reverts stitched regions that straddle the
//!   narrow (`±50`) promoter windows of more than two distinct genes back to
//!   the loci they were stitched from.
//!
//! Both passes leave their inputs untouched and record every decision as a
//! [`DebugEntry`].

use crate::core::annotation::GeneAnnotation;
use crate::core::error::LocusResult;
use crate::core::index::LocusCollection;
use crate::core::locus::{Locus, Sense};
use crate::core::stitch::StitchedRegions;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

/// Flank of the windows used to detect promoter straddling
pub const MULTI_PROMOTER_FLANK: u64 = 50;

/// A stitched region touching more distinct genes than this is reverted
pub const MAX_PROMOTERS_PER_REGION: usize = 2;

/// Why a locus was filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterReason {
    /// Wholly inside a TSS exclusion window
    Contained,
    /// Stitched across the promoters of more than two genes
    MultipleTss,
}

impl FilterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterReason::Contained => "CONTAINED",
            FilterReason::MultipleTss => "MULTIPLE_TSS",
        }
    }
}

/// One row of the debug table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    /// Locus string form, `chrom(strand):start-end`
    pub locus: String,
    pub locus_id: String,
    pub reason: FilterReason,
}

impl DebugEntry {
    pub fn new(locus: &Locus, reason: FilterReason) -> Self {
        Self {
            locus: locus.to_string(),
            locus_id: locus.key(),
            reason,
        }
    }
}

/// Result of the TSS containment pass
#[derive(Debug)]
pub struct TssFiltered {
    /// Candidates not contained by any window, in input order
    pub kept: LocusCollection,
    /// One `CONTAINED` entry per removed locus
    pub debug: Vec<DebugEntry>,
}

impl TssFiltered {
    pub fn removed(&self) -> usize {
        self.debug.len()
    }
}

/// Remove every candidate fully contained by some TSS window
pub fn exclude_tss_contained(
    candidates: &LocusCollection,
    tss_windows: &LocusCollection,
) -> LocusResult<TssFiltered> {
    let mut kept = LocusCollection::new();
    let mut entries = Vec::new();

    for locus in candidates.loci() {
        if tss_windows.get_containers(locus, Sense::Both).is_empty() {
            kept.add(locus.clone())?;
        } else {
            debug!("{} ({}) contained by a TSS window", locus, locus.key());
            entries.push(DebugEntry::new(locus, FilterReason::Contained));
        }
    }

    info!("Removed {} loci because they were contained by a TSS", entries.len());
    Ok(TssFiltered {
        kept,
        debug: entries,
    })
}

/// Result of the multi-promoter pass
#[derive(Debug)]
pub struct PromoterResolution {
    /// Kept stitched regions and restored originals
    pub regions: StitchedRegions,
    /// One `MULTIPLE_TSS` entry per reverted region
    pub debug: Vec<DebugEntry>,
    /// Number of original loci added back
    pub restored: usize,
}

/// Distinct gene names whose windows overlap `region`
pub fn promoter_names<'a>(
    region: &Locus,
    tss_windows: &LocusCollection,
    annotation: &'a GeneAnnotation,
) -> BTreeSet<&'a str> {
    tss_windows
        .get_overlap(region, Sense::Both)
        .into_iter()
        .filter_map(|window| annotation.gene_name(&window.key()))
        .collect()
}

/// Revert stitched regions that span more than two genes' promoters
///
/// `tss_windows` should be built with [`MULTI_PROMOTER_FLANK`]. The
/// replacement set is decided first and the output collection is built fresh,
/// so `stitched` is never modified. Regions with no recorded constituents are
/// already originals and pass through unchanged, which makes the pass
/// idempotent.
pub fn resolve_multi_promoter(
    stitched: &StitchedRegions,
    tss_windows: &LocusCollection,
    annotation: &GeneAnnotation,
) -> LocusResult<PromoterResolution> {
    let mut next = Vec::with_capacity(stitched.len());
    let mut constituents = HashMap::new();
    let mut entries = Vec::new();
    let mut restored = 0;

    for region in stitched.regions().loci() {
        let members = stitched.constituents_of(region);
        let straddles = promoter_names(region, tss_windows, annotation).len() > MAX_PROMOTERS_PER_REGION;

        match members {
            Some(members) if straddles => {
                debug!("{} ({}) overlaps more than {} TSSs", region, region.key(), MAX_PROMOTERS_PER_REGION);
                entries.push(DebugEntry::new(region, FilterReason::MultipleTss));
                restored += members.len();
                next.extend(members.iter().cloned());
            }
            Some(members) => {
                constituents.insert(region.key(), members.to_vec());
                next.push(region.clone());
            }
            None => next.push(region.clone()),
        }
    }

    info!(
        "Removed {} stitched loci because they overlapped multiple TSSs",
        entries.len()
    );
    info!("Added back {} original loci", restored);

    Ok(PromoterResolution {
        regions: StitchedRegions::new(LocusCollection::from_loci(next)?, constituents),
        debug: entries,
        restored,
    })
}

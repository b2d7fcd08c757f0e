//! Region stitching
//!
//! Merges loci whose gap is at most `stitch_window` into composite regions.
//!
//! The algorithm:
//! 1. Group loci by chromosome and sort each group by start
//! 2. Sweep left to right keeping the furthest end seen in the open cluster
//! 3. A locus starting at or before `furthest_end + stitch_window` joins the
//!    cluster, otherwise it opens a new one
//!
//! Because starts are sorted, a locus that cannot reach the open cluster
//! cannot be reached by any later locus either, so each cluster is exactly
//! one connected component of the "gap <= window" relation. Strand is
//! ignored for linkage.

use crate::core::error::LocusResult;
use crate::core::index::LocusCollection;
use crate::core::locus::{Locus, LocusId, Strand};
use std::collections::HashMap;

/// Stitched regions plus the input loci each one was built from
#[derive(Debug, Default)]
pub struct StitchedRegions {
    regions: LocusCollection,
    /// Region identity key -> constituents in input order
    constituents: HashMap<String, Vec<Locus>>,
}

impl StitchedRegions {
    /// Assemble from parts
    ///
    /// Every key in `constituents` is expected to name a region in `regions`;
    /// regions without an entry stand for themselves.
    pub fn new(regions: LocusCollection, constituents: HashMap<String, Vec<Locus>>) -> Self {
        Self {
            regions,
            constituents,
        }
    }

    pub fn regions(&self) -> &LocusCollection {
        &self.regions
    }

    /// The input loci merged into `region`, if it came out of stitching
    pub fn constituents_of(&self, region: &Locus) -> Option<&[Locus]> {
        self.constituents.get(&region.key()).map(|v| v.as_slice())
    }

    /// Drop the constituent mapping
    pub fn into_regions(self) -> LocusCollection {
        self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Stitch every locus of `collection` within `stitch_window` of a neighbour
///
/// Each component, including singletons, becomes one unstranded region
/// spanning `[min(start), max(end)]` whose id records the member count and
/// the id of its earliest-inserted member. Regions come out ordered by that
/// member's position in `collection`.
///
/// # Example
/// ```
/// use fast_rose::core::{stitch_collection, Locus, LocusCollection, Strand};
///
/// let loci = LocusCollection::from_loci(vec![
///     Locus::new("chr1", 100, 200, Strand::Plus, "A").unwrap(),
///     Locus::new("chr1", 250, 300, Strand::Plus, "B").unwrap(),
///     Locus::new("chr1", 1000, 1100, Strand::Plus, "C").unwrap(),
/// ]).unwrap();
/// let stitched = stitch_collection(&loci, 100).unwrap();
/// let spans: Vec<(u64, u64, usize)> = stitched
///     .regions()
///     .loci()
///     .map(|l| (l.start(), l.end(), l.id().merged_count()))
///     .collect();
/// assert_eq!(spans, vec![(100, 300, 2), (1000, 1100, 1)]);
/// ```
pub fn stitch_collection(
    collection: &LocusCollection,
    stitch_window: u64,
) -> LocusResult<StitchedRegions> {
    // (insertion ordinal, locus) grouped per chromosome
    let mut by_chrom: HashMap<&str, Vec<(usize, &Locus)>> = HashMap::new();
    for (ordinal, locus) in collection.loci().enumerate() {
        by_chrom.entry(locus.chrom()).or_default().push((ordinal, locus));
    }

    let mut components: Vec<Vec<(usize, &Locus)>> = Vec::new();
    for (_, mut members) in by_chrom {
        members.sort_by_key(|&(ordinal, locus)| (locus.start(), ordinal));

        let mut current: Vec<(usize, &Locus)> = Vec::new();
        let mut furthest_end = 0u64;
        for (ordinal, locus) in members {
            if !current.is_empty() && locus.start() > furthest_end.saturating_add(stitch_window) {
                components.push(std::mem::take(&mut current));
            }
            if current.is_empty() {
                furthest_end = locus.end();
            } else {
                furthest_end = furthest_end.max(locus.end());
            }
            current.push((ordinal, locus));
        }
        if !current.is_empty() {
            components.push(current);
        }
    }

    for component in &mut components {
        component.sort_by_key(|&(ordinal, _)| ordinal);
    }
    components.sort_by_key(|component| component[0].0);

    let mut regions = Vec::with_capacity(components.len());
    let mut constituents = HashMap::with_capacity(components.len());
    for component in components {
        let seed = component[0].1;
        let start = component.iter().map(|(_, l)| l.start()).min().unwrap_or(seed.start());
        let end = component.iter().map(|(_, l)| l.end()).max().unwrap_or(seed.end());
        let id = LocusId::stitched(component.len(), seed.key());

        let region = Locus::new(seed.chrom(), start, end, Strand::Unstranded, id)?;
        constituents.insert(
            region.key(),
            component.into_iter().map(|(_, l)| l.clone()).collect::<Vec<_>>(),
        );
        regions.push(region);
    }

    Ok(StitchedRegions {
        regions: LocusCollection::from_loci(regions)?,
        constituents,
    })
}

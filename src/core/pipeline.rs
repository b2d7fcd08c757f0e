//! Stage orchestration
//!
//! Runs TSS exclusion, stitching and promoter resolution in order. Each
//! stage reads the previous stage's collection and builds a new one.

use crate::core::annotation::GeneAnnotation;
use crate::core::config::StitchConfig;
use crate::core::density::{map_collection, RegionTable, SignalTrack};
use crate::core::error::{FastRoseError, Result};
use crate::core::index::LocusCollection;
use crate::core::promoter::{exclude_tss_contained, resolve_multi_promoter, DebugEntry, TssFiltered};
use crate::core::stitch::stitch_collection;
use log::info;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StitchStats {
    pub input_loci: usize,
    pub tss_removed: usize,
    pub stitched_regions: usize,
    pub reverted_regions: usize,
    pub restored_loci: usize,
    pub final_regions: usize,
}

/// Final regions of a stitching run
#[derive(Debug)]
pub struct StitchOutcome {
    pub regions: LocusCollection,
    /// Filtering decisions, TSS containment first then promoter reversions
    pub debug: Vec<DebugEntry>,
    pub stats: StitchStats,
}

/// Filter, stitch and resolve `reference`
///
/// `annotation` is only consulted when `config.removes_tss()`; it is an
/// error for it to be missing then.
pub fn stitch_regions(
    reference: &LocusCollection,
    annotation: Option<&GeneAnnotation>,
    config: &StitchConfig,
) -> Result<StitchOutcome> {
    let mut stats = StitchStats {
        input_loci: reference.len(),
        ..StitchStats::default()
    };
    let mut debug = Vec::new();

    let annotation = match (config.removes_tss(), annotation) {
        (false, _) => None,
        (true, Some(annotation)) => Some(annotation),
        (true, None) => {
            return Err(FastRoseError::AnnotationRequired {
                tss_window: config.tss_window,
            })
        }
    };

    let filtered;
    let candidates = match annotation {
        Some(annotation) => {
            let windows = annotation.tss_collection(config.tss_window)?;
            let TssFiltered { kept, debug: removed } = exclude_tss_contained(reference, &windows)?;
            stats.tss_removed = removed.len();
            debug.extend(removed);
            filtered = kept;
            &filtered
        }
        None => reference,
    };

    let stitched = stitch_collection(candidates, config.stitch_window)?;
    stats.stitched_regions = stitched.len();
    info!(
        "Stitched {} loci into {} regions (window {})",
        candidates.len(),
        stitched.len(),
        config.stitch_window
    );

    let regions = match annotation {
        Some(annotation) => {
            let narrow = annotation.tss_collection(config.promoter_flank)?;
            let resolution = resolve_multi_promoter(&stitched, &narrow, annotation)?;
            stats.reverted_regions = resolution.debug.len();
            stats.restored_loci = resolution.restored;
            debug.extend(resolution.debug);
            resolution.regions.into_regions()
        }
        None => stitched.into_regions(),
    };
    stats.final_regions = regions.len();

    Ok(StitchOutcome {
        regions,
        debug,
        stats,
    })
}

/// Attach constituent size and signal to the final regions
pub fn build_region_map(
    regions: &LocusCollection,
    reference: &LocusCollection,
    tracks: &[SignalTrack],
    config: &StitchConfig,
) -> Result<RegionTable> {
    let table = map_collection(regions, reference, tracks, &config.excluded_chroms)?;
    info!(
        "Mapped {} regions against {} signal tracks",
        table.len(),
        tracks.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::GeneRecord;
    use crate::core::locus::{Locus, Strand};
    use crate::core::promoter::FilterReason;

    fn reference(spans: &[(u64, u64, &str)]) -> LocusCollection {
        LocusCollection::from_loci(
            spans
                .iter()
                .map(|&(s, e, id)| Locus::new("chr1", s, e, Strand::Plus, id).unwrap()),
        )
        .unwrap()
    }

    fn annotation(tss: &[(&str, &str, u64)]) -> GeneAnnotation {
        GeneAnnotation::from_records(tss.iter().map(|&(id, name, start)| GeneRecord {
            gene_id: id.into(),
            name: name.into(),
            chrom: "chr1".into(),
            strand: Strand::Plus,
            start,
            end: start + 500,
        }))
    }

    #[test]
    fn test_plain_stitching() {
        let input = reference(&[(100, 200, "A"), (250, 300, "B"), (1000, 1100, "C")]);
        let config = StitchConfig::new(100, 0);
        let outcome = stitch_regions(&input, None, &config).unwrap();

        let spans: Vec<(u64, u64, usize)> = outcome
            .regions
            .loci()
            .map(|l| (l.start(), l.end(), l.id().merged_count()))
            .collect();
        assert_eq!(spans, vec![(100, 300, 2), (1000, 1100, 1)]);
        assert!(outcome.debug.is_empty());
        assert_eq!(outcome.stats.input_loci, 3);
        assert_eq!(outcome.stats.final_regions, 2);
    }

    #[test]
    fn test_annotation_required_for_tss_exclusion() {
        let input = reference(&[(100, 200, "A")]);
        let err = stitch_regions(&input, None, &StitchConfig::new(100, 50)).unwrap_err();
        assert!(matches!(err, FastRoseError::AnnotationRequired { tss_window: 50 }));
    }

    #[test]
    fn test_annotation_ignored_without_tss_window() {
        let input = reference(&[(120, 180, "A")]);
        let genes = annotation(&[("NM_1", "G1", 150)]);
        let outcome = stitch_regions(&input, Some(&genes), &StitchConfig::new(100, 0)).unwrap();
        assert_eq!(outcome.regions.len(), 1);
        assert_eq!(outcome.stats.tss_removed, 0);
    }

    #[test]
    fn test_tss_exclusion_then_stitch() {
        let input = reference(&[(120, 180, "inside"), (5000, 5100, "D1"), (5200, 5300, "D2")]);
        let genes = annotation(&[("NM_1", "G1", 150)]);
        let outcome = stitch_regions(&input, Some(&genes), &StitchConfig::new(1000, 50)).unwrap();

        let keys: Vec<String> = outcome.regions.loci().map(|l| l.key()).collect();
        assert_eq!(keys, vec!["2_D1_lociStitched"]);
        assert_eq!(outcome.debug.len(), 1);
        assert_eq!(outcome.debug[0].reason, FilterReason::Contained);
        assert_eq!(outcome.stats.tss_removed, 1);
    }

    #[test]
    fn test_debug_entries_in_stage_order() {
        let input = reference(&[
            (10_000, 10_010, "tiny"),
            (20_900, 21_100, "a"),
            (21_900, 22_100, "b"),
            (22_900, 23_100, "c"),
        ]);
        let genes = annotation(&[
            ("NM_0", "G0", 10_005),
            ("NM_1", "G1", 21_000),
            ("NM_2", "G2", 22_000),
            ("NM_3", "G3", 23_000),
        ]);
        let outcome = stitch_regions(&input, Some(&genes), &StitchConfig::new(1000, 20)).unwrap();

        let reasons: Vec<FilterReason> = outcome.debug.iter().map(|d| d.reason).collect();
        assert_eq!(reasons, vec![FilterReason::Contained, FilterReason::MultipleTss]);
        let keys: Vec<String> = outcome.regions.loci().map(|l| l.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(outcome.stats.restored_loci, 3);
    }

    #[test]
    fn test_region_map_excludes_configured_chroms() {
        let regions = LocusCollection::from_loci(vec![
            Locus::new("chrY", 1, 100, Strand::Unstranded, "y").unwrap(),
            Locus::new("chrX", 1, 100, Strand::Unstranded, "x").unwrap(),
        ])
        .unwrap();
        let table = build_region_map(&regions, &regions, &[], &StitchConfig::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].chrom, "chrX");
    }
}

//! FastROSE - Enhancer stitching and ranking
//!
//! A Rust implementation of the ROSE region stitching engine: merges nearby
//! enhancer loci, drops loci inside promoters and builds the per-region
//! signal table used for super-enhancer calling.
//!
//! # Features
//!
//! - Per-chromosome interval index for overlap and containment queries
//! - Sweep-line stitching with the constituent mapping retained
//! - TSS exclusion and multi-promoter resolution against a gene annotation
//! - Parallel signal table loading with rayon
//! - Transparent gzip/bzip2 inputs and all-or-nothing outputs
//!
//! # Example
//!
//! ```
//! use fast_rose::core::{stitch_regions, Locus, LocusCollection, StitchConfig, Strand};
//!
//! let loci = LocusCollection::from_loci(vec![
//!     Locus::new("chr1", 100, 200, Strand::Plus, "A").unwrap(),
//!     Locus::new("chr1", 250, 300, Strand::Plus, "B").unwrap(),
//!     Locus::new("chr1", 1000, 1100, Strand::Plus, "C").unwrap(),
//! ]).unwrap();
//!
//! let outcome = stitch_regions(&loci, None, &StitchConfig::new(100, 0)).unwrap();
//! assert_eq!(outcome.regions.len(), 2);
//! ```

pub mod core;
pub mod formats;
pub mod run;

// Re-export commonly used types
pub use core::{
    stitch_collection, stitch_regions, FastRoseError, GeneAnnotation, Locus, LocusCollection,
    LocusId, RegionTable, Sense, SignalTrack, StitchConfig, Strand,
};
pub use formats::{bed, gff, gtf, signal};
pub use run::{run_map, run_stitch, MapJob, StitchJob};

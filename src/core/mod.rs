//! Core interval engine
//!
//! This module contains the locus model, the interval index, the stitching
//! and promoter filters, and the density mapper.

mod annotation;
mod config;
mod density;
mod error;
mod index;
pub mod io;
mod locus;
pub mod pipeline;
mod promoter;
mod stitch;

pub use annotation::{GeneAnnotation, GeneRecord};
pub use config::{Genome, StitchConfig, DEFAULT_EXCLUDED_CHROM, DEFAULT_STITCH_WINDOW};
pub use density::{map_collection, RankedRegionRow, RegionTable, SignalTrack, REGION_TABLE_HEADER};
pub use error::{
    FastRoseError, LocusError, LocusResult, ParseError, ParseResult, Result,
};
pub use index::{LocusCollection, SlotInterval};
pub use io::{
    detect_compression, open_input, write_atomically, ByteLineIterator, CompressionFormat, OutputBatch,
    IoStrategy, LineIterator, SmartReader, DEFAULT_BUFFER_SIZE, LARGE_BUFFER_SIZE, MMAP_THRESHOLD,
};
pub use locus::{Locus, LocusId, Sense, StitchId, Strand};
pub use pipeline::{build_region_map, stitch_regions, StitchOutcome, StitchStats};
pub use promoter::{
    exclude_tss_contained, promoter_names, resolve_multi_promoter, DebugEntry, FilterReason,
    PromoterResolution, TssFiltered, MAX_PROMOTERS_PER_REGION, MULTI_PROMOTER_FLANK,
};
pub use stitch::{stitch_collection, StitchedRegions};

//! File-level runs
//!
//! Ties the format adapters to the core pipeline. Every input is read and
//! every stage computed before any output is staged, and the outputs of a
//! run are committed as one batch, so a fatal error leaves no new tables.

use crate::core::{
    build_region_map, open_input, stitch_regions, FastRoseError, GeneAnnotation, LocusCollection,
    OutputBatch, Result, StitchConfig, StitchStats,
};
use crate::formats::signal::mapped_table_path;
use crate::formats::{
    convert_bed, convert_gtf, read_gff_collection, read_signal_tracks, write_debug_entries,
    write_region_table, write_stitched_gff, ConversionStats, InputFormat, SignalSource,
};
use log::info;
use std::path::{Path, PathBuf};

/// Sub-directory for converted and stitched GFFs
pub const GFF_DIR: &str = "gff";

/// Sub-directory holding externally mapped signal tables
pub const MAPPED_DIR: &str = "mappedGFF";

/// A full stitching run
#[derive(Debug, Clone)]
pub struct StitchJob {
    /// Candidate regions, `.bed`, `.gtf`, `.gff` or `.gff3`
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Gene annotation table, needed when TSS exclusion is on
    pub annotation: Option<PathBuf>,
    pub config: StitchConfig,
    /// Also write the debug table
    pub debug: bool,
    /// Keep every known GTF attribute when converting
    pub gtf_full: bool,
    /// Signal tables given by path
    pub signals: Vec<SignalSource>,
    /// Signal tables looked up under `<output_dir>/mappedGFF/` by sample name
    pub samples: Vec<String>,
}

impl StitchJob {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            annotation: None,
            config: StitchConfig::default(),
            debug: false,
            gtf_full: false,
            signals: Vec::new(),
            samples: Vec::new(),
        }
    }
}

/// What a stitching run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: StitchStats,
    pub conversion: Option<ConversionStats>,
    pub stitched_gff: PathBuf,
    pub region_map: PathBuf,
    pub debug_table: Option<PathBuf>,
    pub rows: usize,
}

/// Base name of an input, up to the first `.`
pub fn input_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or("regions")
        .to_string()
}

/// Load a gene annotation table, plain or compressed
pub fn load_annotation(path: &Path) -> Result<GeneAnnotation> {
    if !path.is_file() {
        return Err(FastRoseError::AnnotationNotFound(path.to_path_buf()));
    }
    let annotation = GeneAnnotation::from_reader(open_input(path)?)?;
    info!("Loaded {} transcripts from {}", annotation.len(), path.display());
    Ok(annotation)
}

/// Bring the input into GFF form, converting BED and GTF under `gff_dir`
fn prepare_input(job: &StitchJob, gff_dir: &Path) -> Result<(PathBuf, Option<ConversionStats>)> {
    match InputFormat::detect(&job.input)? {
        InputFormat::Gff => Ok((job.input.clone(), None)),
        format => {
            let converted = gff_dir.join(format!("{}.gff", input_name(&job.input)));
            info!("Converting {} to {}", job.input.display(), converted.display());
            let stats = match format {
                InputFormat::Bed => convert_bed(&job.input, &converted)?,
                _ => convert_gtf(&job.input, &converted, job.gtf_full)?,
            };
            Ok((converted, Some(stats)))
        }
    }
}

/// Stitch the input regions and write the stitched GFF and region map
pub fn run_stitch(job: &StitchJob) -> Result<RunSummary> {
    if !job.input.is_file() {
        return Err(FastRoseError::MissingInput(job.input.clone()));
    }
    let gff_dir = job.output_dir.join(GFF_DIR);
    let mapped_dir = job.output_dir.join(MAPPED_DIR);
    std::fs::create_dir_all(&gff_dir)?;
    std::fs::create_dir_all(&mapped_dir)?;

    let (gff_path, conversion) = prepare_input(job, &gff_dir)?;
    let name = input_name(&gff_path);
    let stitched_name = job.config.stitched_name(&name);

    let reference = read_gff_collection(&gff_path)?;
    info!("Loaded {} regions from {}", reference.len(), gff_path.display());

    let annotation = match (&job.annotation, job.config.removes_tss()) {
        (Some(path), true) => Some(load_annotation(path)?),
        _ => None,
    };

    let mut sources = job.signals.clone();
    sources.extend(job.samples.iter().map(|sample| SignalSource {
        name: sample.clone(),
        path: mapped_table_path(&mapped_dir, &stitched_name, sample),
    }));
    let tracks = read_signal_tracks(&sources)?;

    let outcome = stitch_regions(&reference, annotation.as_ref(), &job.config)?;
    let table = build_region_map(&outcome.regions, &reference, &tracks, &job.config)?;

    let stitched_gff = gff_dir.join(format!("{}.gff", stitched_name));
    let region_map = job.output_dir.join(job.config.region_map_name(&name));
    let debug_table = job.debug.then(|| gff_dir.join(job.config.debug_name(&name)));

    let mut outputs = OutputBatch::new();
    outputs.stage(&stitched_gff, |writer| -> Result<()> {
        write_stitched_gff(writer, &outcome.regions)?;
        Ok(())
    })?;
    if let Some(path) = &debug_table {
        outputs.stage(path, |writer| -> Result<()> {
            write_debug_entries(writer, &outcome.debug)?;
            Ok(())
        })?;
    }
    outputs.stage(&region_map, |writer| -> Result<()> {
        table.write_tsv(writer)?;
        Ok(())
    })?;
    outputs.commit()?;

    Ok(RunSummary {
        stats: outcome.stats,
        conversion,
        stitched_gff,
        region_map,
        debug_table,
        rows: table.len(),
    })
}

/// Region map for an already stitched GFF
#[derive(Debug, Clone)]
pub struct MapJob {
    pub stitched: PathBuf,
    /// Original, pre-stitch regions
    pub reference: PathBuf,
    pub signals: Vec<SignalSource>,
    pub output: PathBuf,
    pub config: StitchConfig,
}

/// Build and write a region map; returns the number of rows
pub fn run_map(job: &MapJob) -> Result<usize> {
    let regions: LocusCollection = read_gff_collection(&job.stitched)?;
    let reference = read_gff_collection(&job.reference)?;
    let tracks = read_signal_tracks(&job.signals)?;

    let table = build_region_map(&regions, &reference, &tracks, &job.config)?;
    write_region_table(&job.output, &table)?;
    Ok(table.len())
}

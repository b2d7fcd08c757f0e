//! FastROSE CLI entry point
//!
//! Stitches enhancer regions and builds the region signal map.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fast_rose::core::{Genome, StitchConfig, DEFAULT_STITCH_WINDOW};
use fast_rose::formats::{self, ConversionStats, InputFormat, SignalSource};
use fast_rose::run::{run_map, run_stitch, MapJob, StitchJob};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fast-rose")]
#[command(about = "Enhancer stitching and super-enhancer region ranking")]
#[command(version)]
#[command(author = "FastROSE Contributors")]
struct Cli {
    /// Log every filtering decision
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch candidate regions and build the region map
    Stitch {
        /// Candidate regions (.bed, .gtf, .gff or .gff3)
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Output directory
        #[arg(short = 'o', long)]
        output: PathBuf,
        /// Genome build (HG18, HG19, HG38, MM8, MM9, MM10)
        #[arg(short = 'g', long)]
        genome: Option<String>,
        /// Directory holding <build>_refseq.ucsc tables
        #[arg(long = "annotation-dir", default_value = "annotation")]
        annotation_dir: PathBuf,
        /// Custom gene annotation table, overrides --genome
        #[arg(short = 'a', long, alias = "custom")]
        annotation: Option<PathBuf>,
        /// Maximum distance between stitched loci
        #[arg(short = 's', long = "stitch", default_value_t = DEFAULT_STITCH_WINDOW)]
        stitch: u64,
        /// Exclude loci within this distance of a TSS (0 disables)
        #[arg(short = 't', long = "tss", default_value_t = 0)]
        tss: u64,
        /// Signal table as NAME=PATH or PATH (repeatable)
        #[arg(long = "signal")]
        signals: Vec<SignalSource>,
        /// Sample whose table sits in <output>/mappedGFF (repeatable)
        #[arg(long = "sample")]
        samples: Vec<String>,
        /// Write the debug table of filtered loci
        #[arg(long)]
        debug: bool,
        /// Keep all known GTF attributes when converting
        #[arg(long)]
        full: bool,
    },

    /// Build the region map for an already stitched GFF
    Map {
        /// Stitched regions GFF
        #[arg(long)]
        stitched: PathBuf,
        /// Original regions GFF
        #[arg(long)]
        reference: PathBuf,
        /// Signal table as NAME=PATH or PATH (repeatable)
        #[arg(long = "signal")]
        signals: Vec<SignalSource>,
        /// Output region map
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Convert a BED or GTF file into a GFF3 region table
    Convert {
        /// Input file (.bed or .gtf)
        input: PathBuf,
        /// Output GFF3 file
        output: PathBuf,
        /// Keep all known GTF attributes
        #[arg(long)]
        full: bool,
    },
}

fn resolve_annotation(
    annotation: Option<PathBuf>,
    genome: Option<&str>,
    annotation_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if annotation.is_some() {
        return Ok(annotation);
    }
    match genome {
        Some(genome) => {
            let genome: Genome = genome.parse()?;
            let path = genome
                .resolve(annotation_dir)
                .with_context(|| format!("Resolving annotation for {}", genome))?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

fn print_conversion(stats: &ConversionStats) {
    eprintln!("\n=== Conversion Statistics ===");
    eprintln!("Total records:   {}", stats.total);
    eprintln!("Converted:       {}", stats.converted);
    eprintln!("Skipped:         {}", stats.skipped);
    eprintln!("Comments:        {}", stats.comments);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let start = Instant::now();

    match cli.command {
        Commands::Stitch {
            input,
            output,
            genome,
            annotation_dir,
            annotation,
            stitch,
            tss,
            signals,
            samples,
            debug,
            full,
        } => {
            let annotation = resolve_annotation(annotation, genome.as_deref(), &annotation_dir)?;
            let job = StitchJob {
                input,
                output_dir: output,
                annotation,
                config: StitchConfig::new(stitch, tss),
                debug,
                gtf_full: full,
                signals,
                samples,
            };

            eprintln!("Stitching regions: {:?} -> {:?}", job.input, job.output_dir);
            let summary = run_stitch(&job)
                .with_context(|| format!("Stitching {}", job.input.display()))?;

            if let Some(conversion) = &summary.conversion {
                print_conversion(conversion);
            }
            let stats = &summary.stats;
            eprintln!("\n=== Stitching Statistics ===");
            eprintln!("Input loci:      {}", stats.input_loci);
            eprintln!("TSS contained:   {}", stats.tss_removed);
            eprintln!("Stitched:        {}", stats.stitched_regions);
            eprintln!("Multi-TSS:       {}", stats.reverted_regions);
            eprintln!("Restored loci:   {}", stats.restored_loci);
            eprintln!("Final regions:   {}", stats.final_regions);
            eprintln!("Mapped rows:     {}", summary.rows);
            eprintln!("Stitched GFF:    {}", summary.stitched_gff.display());
            eprintln!("Region map:      {}", summary.region_map.display());
            if let Some(path) = &summary.debug_table {
                eprintln!("Debug table:     {}", path.display());
            }
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Map {
            stitched,
            reference,
            signals,
            output,
        } => {
            let job = MapJob {
                stitched,
                reference,
                signals,
                output,
                config: StitchConfig::default(),
            };
            eprintln!("Mapping regions: {:?} -> {:?}", job.stitched, job.output);
            let rows = run_map(&job).with_context(|| format!("Mapping {}", job.stitched.display()))?;

            eprintln!("\n=== Mapping Statistics ===");
            eprintln!("Signal tracks:   {}", job.signals.len());
            eprintln!("Mapped rows:     {}", rows);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Convert { input, output, full } => {
            eprintln!("Converting: {:?} -> {:?}", input, output);
            let stats = match InputFormat::detect(&input)? {
                InputFormat::Bed => formats::convert_bed(&input, &output)?,
                InputFormat::Gtf => formats::convert_gtf(&input, &output, full)?,
                InputFormat::Gff => anyhow::bail!("{} is already a GFF file", input.display()),
            };
            print_conversion(&stats);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}

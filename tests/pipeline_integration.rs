//! Integration tests for complete stitching runs
//!
//! **Feature: fast-rose, Property 5: 输出确定性与原子性**

use fast_rose::core::{FastRoseError, StitchConfig};
use fast_rose::formats::SignalSource;
use fast_rose::run::{run_map, run_stitch, MapJob, StitchJob};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PEAKS_GFF: &str = "\
##gff-version 3
chr1\t.\tpeak\t100\t200\t.\t.\t.\tID=A
chr1\t.\tpeak\t250\t300\t.\t.\t.\tID=B
chr1\t.\tpeak\t1000\t1100\t.\t.\t.\tID=C
chrY\t.\tpeak\t500\t900\t.\t.\t.\tID=Y
";

const ANNOTATION: &str = "\
#bin\tname\tchrom\tstrand\ttxStart\ttxEnd\tname2
0\tNM_1\tchr1\t+\t150\t5000\tG1
0\tNM_2\tchr1\t-\t8000\t9000\tG2
";

const SIGNAL: &str = "\
GENE_ID\tlocusLine\tmean
A\tchr1(.):100-200\t2.0
B\tchr1(.):250-300\tbad
C\tchr1(.):1000-1100\t1.0
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn job(input: &Path, out: &Path, stitch: u64) -> StitchJob {
    let mut job = StitchJob::new(input, out);
    job.config = StitchConfig::new(stitch, 0);
    job
}

#[test]
fn test_gff_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let signal = write(dir.path(), "k27.txt", SIGNAL);
    let out = dir.path().join("out");

    let mut job = job(&input, &out, 100);
    job.signals.push(SignalSource { name: "k27.bam".into(), path: signal });
    let summary = run_stitch(&job).unwrap();

    assert!(out.join("gff").is_dir());
    assert!(out.join("mappedGFF").is_dir());
    assert_eq!(summary.stitched_gff, out.join("gff").join("peaks_0.1KB_STITCHED.gff"));
    assert_eq!(summary.stats.final_regions, 3);
    assert_eq!(summary.rows, 2);

    let stitched = fs::read_to_string(&summary.stitched_gff).unwrap();
    assert_eq!(
        stitched,
        "chr1\t2_A_lociStitched\t\t100\t300\t\t.\t\tID=2_A_lociStitched\n\
         chr1\t1_C_lociStitched\t\t1000\t1100\t\t.\t\tID=1_C_lociStitched\n\
         chrY\t1_Y_lociStitched\t\t500\t900\t\t.\t\tID=1_Y_lociStitched\n"
    );

    let map = fs::read_to_string(out.join("peaks_0.1KB_STITCHED_ENHANCER_REGION_MAP.txt")).unwrap();
    assert_eq!(
        map,
        "REGION_ID\tCHROM\tSTART\tSTOP\tNUM_LOCI\tCONSTITUENT_SIZE\tk27.bam\n\
         2_A_lociStitched\tchr1\t100\t300\t2\t152\t200\n\
         1_C_lociStitched\tchr1\t1000\t1100\t1\t101\t100\n"
    );
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let out = dir.path().join("out");

    let first = run_stitch(&job(&input, &out, 1000)).unwrap();
    let gff_a = fs::read(&first.stitched_gff).unwrap();
    let map_a = fs::read(&first.region_map).unwrap();

    let second = run_stitch(&job(&input, &out, 1000)).unwrap();
    assert_eq!(fs::read(&second.stitched_gff).unwrap(), gff_a);
    assert_eq!(fs::read(&second.region_map).unwrap(), map_a);
}

#[test]
fn test_duplicate_ids_abort_without_output() {
    let dir = TempDir::new().unwrap();
    let input = write(
        dir.path(),
        "dup.gff",
        "chr1\t.\t.\t100\t200\t.\t.\t.\tID=A\nchr1\t.\t.\t300\t400\t.\t.\t.\tID=A\n",
    );
    let out = dir.path().join("out");

    let err = run_stitch(&job(&input, &out, 100)).unwrap_err();
    assert!(matches!(err, FastRoseError::NonUniqueIdentifier { ref id } if id == "A"));
    assert_eq!(fs::read_dir(out.join("gff")).unwrap().count(), 0);
    assert!(!out.join("dup_0.1KB_STITCHED_ENHANCER_REGION_MAP.txt").exists());
}

#[test]
fn test_missing_signal_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let out = dir.path().join("out");

    let mut job = job(&input, &out, 100);
    job.samples.push("absent.bam".into());
    let err = run_stitch(&job).unwrap_err();
    assert!(matches!(err, FastRoseError::MissingInput(_)));
    assert_eq!(fs::read_dir(out.join("gff")).unwrap().count(), 0);
}

#[test]
fn test_failed_region_map_leaves_no_stitched_gff() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let out = dir.path().join("out");
    // a directory squatting on the region map path makes the final move fail
    fs::create_dir_all(out.join("peaks_0.1KB_STITCHED_ENHANCER_REGION_MAP.txt")).unwrap();

    let err = run_stitch(&job(&input, &out, 100)).unwrap_err();
    assert!(matches!(err, FastRoseError::Io(_)));
    assert_eq!(fs::read_dir(out.join("gff")).unwrap().count(), 0);
    assert_eq!(fs::read_dir(&out).unwrap().count(), 3);
}

#[test]
fn test_sample_table_found_in_mapped_dir() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let out = dir.path().join("out");
    fs::create_dir_all(out.join("mappedGFF")).unwrap();
    write(&out.join("mappedGFF"), "peaks_0.1KB_STITCHED_k27.bam_MAPPED.gff", SIGNAL);

    let mut job = job(&input, &out, 100);
    job.samples.push("k27.bam".into());
    let summary = run_stitch(&job).unwrap();

    let map = fs::read_to_string(&summary.region_map).unwrap();
    assert!(map.lines().next().unwrap().ends_with("\tk27.bam"));
}

#[test]
fn test_tss_exclusion_with_debug_table() {
    let dir = TempDir::new().unwrap();
    let input = write(
        dir.path(),
        "peaks.gff",
        "chr1\t.\t.\t120\t180\t.\t.\t.\tID=inside\nchr1\t.\t.\t20000\t20100\t.\t.\t.\tID=distal\n",
    );
    let annotation = write(dir.path(), "hg19_refseq.ucsc", ANNOTATION);
    let out = dir.path().join("out");

    let mut job = StitchJob::new(&input, &out);
    job.config = StitchConfig::new(12_500, 50);
    job.annotation = Some(annotation);
    job.debug = true;
    let summary = run_stitch(&job).unwrap();

    assert_eq!(summary.stats.tss_removed, 1);
    let debug_path = summary.debug_table.unwrap();
    assert_eq!(debug_path, out.join("gff").join("peaks_12.5KB_STITCHED_TSS_DISTAL.debug"));
    assert_eq!(
        fs::read_to_string(debug_path).unwrap(),
        "chr1(.):120-180\tinside\tCONTAINED\n"
    );
    let stitched = fs::read_to_string(&summary.stitched_gff).unwrap();
    assert!(stitched.starts_with("chr1\t1_distal_lociStitched\t"));
}

#[test]
fn test_tss_exclusion_requires_annotation() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let out = dir.path().join("out");

    let mut job = StitchJob::new(&input, &out);
    job.config = StitchConfig::new(12_500, 2_500);
    let err = run_stitch(&job).unwrap_err();
    assert!(matches!(err, FastRoseError::AnnotationRequired { tss_window: 2_500 }));
}

#[test]
fn test_bed_input_converted() {
    let dir = TempDir::new().unwrap();
    let input = write(
        dir.path(),
        "peaks.bed",
        "chr1\t99\t200\tA\t0\t.\nchr1\t249\t300\tB\t0\t.\nchr1\t999\t1100\tC\t0\t.\n",
    );
    let out = dir.path().join("out");

    let summary = run_stitch(&job(&input, &out, 100)).unwrap();
    assert_eq!(summary.conversion.unwrap().converted, 3);
    assert!(out.join("gff").join("peaks.gff").is_file());

    let stitched = fs::read_to_string(&summary.stitched_gff).unwrap();
    let ids: Vec<&str> = stitched.lines().map(|l| l.split('\t').nth(1).unwrap()).collect();
    assert_eq!(ids, vec!["2_A_lociStitched", "1_C_lociStitched"]);
}

#[test]
fn test_unsupported_input_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "reads.sam", "@HD\n");
    let err = run_stitch(&job(&input, &dir.path().join("out"), 100)).unwrap_err();
    assert!(matches!(err, FastRoseError::UnsupportedInput(_)));
}

#[test]
fn test_map_stitched_gff() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "peaks.gff", PEAKS_GFF);
    let signal = write(dir.path(), "k27.txt", SIGNAL);
    let out = dir.path().join("out");
    let summary = run_stitch(&job(&input, &out, 100)).unwrap();

    let map_path = dir.path().join("map.txt");
    let rows = run_map(&MapJob {
        stitched: summary.stitched_gff,
        reference: input,
        signals: vec![SignalSource { name: "k27".into(), path: signal }],
        output: map_path.clone(),
        config: StitchConfig::default(),
    })
    .unwrap();

    assert_eq!(rows, 2);
    let map = fs::read_to_string(map_path).unwrap();
    assert!(map.contains("2_A_lociStitched\tchr1\t100\t300\t2\t152\t200\n"));
}

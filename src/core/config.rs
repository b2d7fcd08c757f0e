//! Run configuration
//!
//! Holds the stitching parameters and resolves genome builds to their
//! annotation tables.

use crate::core::error::{FastRoseError, Result};
use crate::core::promoter::MULTI_PROMOTER_FLANK;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default maximum linking gap
pub const DEFAULT_STITCH_WINDOW: u64 = 12_500;

/// Chromosome dropped from the region map
pub const DEFAULT_EXCLUDED_CHROM: &str = "chrY";

/// Parameters of one stitching run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchConfig {
    /// Maximum gap between linked loci
    pub stitch_window: u64,
    /// Promoter exclusion flank, 0 disables TSS filtering
    pub tss_window: u64,
    /// Narrow flank used to detect promoter straddling
    pub promoter_flank: u64,
    /// Chromosomes left out of the region map
    pub excluded_chroms: Vec<String>,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            stitch_window: DEFAULT_STITCH_WINDOW,
            tss_window: 0,
            promoter_flank: MULTI_PROMOTER_FLANK,
            excluded_chroms: vec![DEFAULT_EXCLUDED_CHROM.to_string()],
        }
    }
}

impl StitchConfig {
    pub fn new(stitch_window: u64, tss_window: u64) -> Self {
        Self {
            stitch_window,
            tss_window,
            ..Self::default()
        }
    }

    /// TSS filtering and promoter resolution are enabled
    pub fn removes_tss(&self) -> bool {
        self.tss_window > 0
    }

    /// Name of the stitched region set derived from an input name
    ///
    /// # Examples
    /// ```
    /// use fast_rose::core::StitchConfig;
    /// assert_eq!(StitchConfig::new(12_500, 0).stitched_name("HG19_peaks"), "HG19_peaks_12.5KB_STITCHED");
    /// assert_eq!(StitchConfig::new(5_000, 2_500).stitched_name("p"), "p_5.0KB_STITCHED_TSS_DISTAL");
    /// ```
    pub fn stitched_name(&self, input_name: &str) -> String {
        // fractional kilobases, always with a decimal point: 12.5, 5.0, 0.1
        let kb = self.stitch_window as f64 / 1000.0;
        let mut name = format!("{}_{:?}KB_STITCHED", input_name, kb);
        if self.removes_tss() {
            name.push_str("_TSS_DISTAL");
        }
        name
    }

    /// File name of the region map for a stitched set
    pub fn region_map_name(&self, input_name: &str) -> String {
        format!("{}_ENHANCER_REGION_MAP.txt", self.stitched_name(input_name))
    }

    /// File name of the debug table for a stitched set
    pub fn debug_name(&self, input_name: &str) -> String {
        format!("{}.debug", self.stitched_name(input_name))
    }

    pub fn is_excluded(&self, chrom: &str) -> bool {
        self.excluded_chroms.iter().any(|c| c == chrom)
    }
}

/// Genome builds with a bundled refseq annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genome {
    Hg18,
    Hg19,
    Hg38,
    Mm8,
    Mm9,
    Mm10,
}

impl Genome {
    pub const ALL: [Genome; 6] = [
        Genome::Hg18,
        Genome::Hg19,
        Genome::Hg38,
        Genome::Mm8,
        Genome::Mm9,
        Genome::Mm10,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genome::Hg18 => "HG18",
            Genome::Hg19 => "HG19",
            Genome::Hg38 => "HG38",
            Genome::Mm8 => "MM8",
            Genome::Mm9 => "MM9",
            Genome::Mm10 => "MM10",
        }
    }

    /// `<build>_refseq.ucsc`
    pub fn annotation_file_name(&self) -> String {
        format!("{}_refseq.ucsc", self.as_str().to_lowercase())
    }

    /// Locate the annotation table under `annotation_dir`
    pub fn resolve(&self, annotation_dir: &Path) -> Result<PathBuf> {
        let path = annotation_dir.join(self.annotation_file_name());
        if path.is_file() {
            Ok(path)
        } else {
            Err(FastRoseError::AnnotationNotFound(path))
        }
    }
}

impl FromStr for Genome {
    type Err = FastRoseError;

    fn from_str(s: &str) -> Result<Self> {
        Genome::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FastRoseError::UnknownGenome(s.to_string()))
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StitchConfig::default();
        assert_eq!(config.stitch_window, 12_500);
        assert_eq!(config.promoter_flank, 50);
        assert!(!config.removes_tss());
        assert!(config.is_excluded("chrY"));
        assert!(!config.is_excluded("chrX"));
    }

    #[test]
    fn test_output_names() {
        let config = StitchConfig::new(12_500, 2_500);
        assert_eq!(config.debug_name("in"), "in_12.5KB_STITCHED_TSS_DISTAL.debug");
        assert_eq!(
            config.region_map_name("in"),
            "in_12.5KB_STITCHED_TSS_DISTAL_ENHANCER_REGION_MAP.txt"
        );
    }

    #[test]
    fn test_stitched_name_kilobases() {
        let name = |window| StitchConfig::new(window, 0).stitched_name("in");
        assert_eq!(name(12_500), "in_12.5KB_STITCHED");
        assert_eq!(name(5_000), "in_5.0KB_STITCHED");
        assert_eq!(name(100), "in_0.1KB_STITCHED");
        assert_eq!(name(0), "in_0.0KB_STITCHED");
    }

    #[test]
    fn test_genome_parse() {
        assert_eq!("hg19".parse::<Genome>().unwrap(), Genome::Hg19);
        assert_eq!("MM10".parse::<Genome>().unwrap(), Genome::Mm10);
        assert!(matches!(
            "dm6".parse::<Genome>(),
            Err(FastRoseError::UnknownGenome(_))
        ));
    }

    #[test]
    fn test_genome_resolve() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Genome::Hg38.resolve(dir.path()),
            Err(FastRoseError::AnnotationNotFound(_))
        ));

        std::fs::write(dir.path().join("hg38_refseq.ucsc"), "name\n").unwrap();
        let path = Genome::Hg38.resolve(dir.path()).unwrap();
        assert!(path.ends_with("hg38_refseq.ucsc"));
    }
}

//! Genomic locus value type
//!
//! A [`Locus`] is a closed, 1-based chromosomal interval `[start, end]` with a
//! strand and an identity. Identity is carried by [`LocusId`]; two loci with
//! the same id are the same conceptual region for the duration of a run.

use crate::core::error::{LocusError, LocusResult};
use std::fmt;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    Plus,
    Minus,
    #[default]
    Unstranded,
}

impl Strand {
    /// Get the complement strand
    ///
    /// # Examples
    /// ```
    /// use fast_rose::core::Strand;
    /// assert_eq!(Strand::Plus.complement(), Strand::Minus);
    /// assert_eq!(Strand::Unstranded.complement(), Strand::Unstranded);
    /// ```
    pub fn complement(&self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
            Strand::Unstranded => Strand::Unstranded,
        }
    }

    /// Parse strand from char
    ///
    /// `'.'` maps to [`Strand::Unstranded`]; anything else is rejected.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            '.' => Some(Strand::Unstranded),
            _ => None,
        }
    }

    /// Parse strand from a field, treating empty fields as unstranded
    pub fn from_field(s: &str) -> Option<Self> {
        match s {
            "" => Some(Strand::Unstranded),
            _ if s.len() == 1 => s.chars().next().and_then(Self::from_char),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unstranded => '.',
        }
    }

    pub fn is_stranded(&self) -> bool {
        !matches!(self, Strand::Unstranded)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Strand filter applied by overlap and containment queries
///
/// An unstranded locus on either side of the comparison is compatible with
/// every strand under [`Sense::Sense`] and [`Sense::Antisense`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    /// Ignore strand entirely
    #[default]
    Both,
    /// Same strand only
    Sense,
    /// Opposite strand only
    Antisense,
}

impl Sense {
    /// Check whether two strands pass this filter
    pub fn accepts(&self, a: Strand, b: Strand) -> bool {
        if !a.is_stranded() || !b.is_stranded() {
            return true;
        }
        match self {
            Sense::Both => true,
            Sense::Sense => a == b,
            Sense::Antisense => a == b.complement(),
        }
    }
}

/// Identity of a stitched region
///
/// Serialised as `<merged_count>_<representative>_lociStitched` only at the
/// file boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StitchId {
    /// Number of input loci merged into the region
    pub merged_count: usize,
    /// Identifier of the constituent that seeded the region
    pub representative: String,
}

const STITCHED_SUFFIX: &str = "_lociStitched";

/// Locus identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocusId {
    /// Identifier taken verbatim from an input table
    Named(String),
    /// Identifier of a region produced by stitching
    Stitched(StitchId),
}

impl LocusId {
    /// Build a stitched identifier
    pub fn stitched(merged_count: usize, representative: impl Into<String>) -> Self {
        LocusId::Stitched(StitchId {
            merged_count,
            representative: representative.into(),
        })
    }

    /// Parse an identifier read from a file
    ///
    /// Strings of the form `<n>_<name>_lociStitched` come back as
    /// [`LocusId::Stitched`]; everything else is [`LocusId::Named`].
    ///
    /// # Examples
    /// ```
    /// use fast_rose::core::LocusId;
    /// let id = LocusId::parse("3_peak_7_lociStitched");
    /// assert_eq!(id.merged_count(), 3);
    /// assert_eq!(id.to_string(), "3_peak_7_lociStitched");
    /// assert_eq!(LocusId::parse("peak_7").merged_count(), 1);
    /// ```
    pub fn parse(s: &str) -> Self {
        let stitched = s.strip_suffix(STITCHED_SUFFIX).and_then(|body| {
            let (count, representative) = body.split_once('_')?;
            let merged_count = count.parse::<usize>().ok()?;
            if representative.is_empty() {
                return None;
            }
            Some(LocusId::stitched(merged_count, representative))
        });
        stitched.unwrap_or_else(|| LocusId::Named(s.to_string()))
    }

    /// Number of input loci behind this id, 1 for anything not stitched
    pub fn merged_count(&self) -> usize {
        match self {
            LocusId::Named(_) => 1,
            LocusId::Stitched(id) => id.merged_count,
        }
    }

    pub fn is_stitched(&self) -> bool {
        matches!(self, LocusId::Stitched(_))
    }
}

impl fmt::Display for LocusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocusId::Named(name) => f.write_str(name),
            LocusId::Stitched(id) => {
                write!(f, "{}_{}{}", id.merged_count, id.representative, STITCHED_SUFFIX)
            }
        }
    }
}

impl From<&str> for LocusId {
    fn from(s: &str) -> Self {
        LocusId::Named(s.to_string())
    }
}

impl From<String> for LocusId {
    fn from(s: String) -> Self {
        LocusId::Named(s)
    }
}

/// A single chromosomal interval with identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locus {
    chrom: String,
    start: u64,
    end: u64,
    strand: Strand,
    id: LocusId,
}

impl Locus {
    /// Create a locus, rejecting `start > end`
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        end: u64,
        strand: Strand,
        id: impl Into<LocusId>,
    ) -> LocusResult<Self> {
        if start > end {
            return Err(LocusError::InvalidRange { start, end });
        }
        Ok(Self {
            chrom: chrom.into(),
            start,
            end,
            strand,
            id: id.into(),
        })
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn id(&self) -> &LocusId {
        &self.id
    }

    /// Identity key used by collections
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    /// Number of bases covered (closed interval)
    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// A closed interval always covers at least one base
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Distance between the coordinates, `end - start`
    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    /// Two loci overlap iff `max(start) <= min(end)` on the same chromosome
    pub fn overlaps(&self, other: &Locus, sense: Sense) -> bool {
        self.chrom == other.chrom
            && sense.accepts(self.strand, other.strand)
            && self.start.max(other.start) <= self.end.min(other.end)
    }

    /// True when `self` fully contains `other`
    pub fn contains(&self, other: &Locus, sense: Sense) -> bool {
        self.chrom == other.chrom
            && sense.accepts(self.strand, other.strand)
            && self.start <= other.start
            && self.end >= other.end
    }

    /// Copy of this locus under a new identity
    pub fn with_id(&self, id: impl Into<LocusId>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

/// `chrom(strand):start-end`
impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}):{}-{}", self.chrom, self.strand, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locus(chrom: &str, start: u64, end: u64, strand: Strand, id: &str) -> Locus {
        Locus::new(chrom, start, end, strand, id).unwrap()
    }

    #[test]
    fn test_invalid_range() {
        let result = Locus::new("chr1", 200, 100, Strand::Plus, "a");
        assert_eq!(result, Err(LocusError::InvalidRange { start: 200, end: 100 }));
    }

    #[test]
    fn test_len_is_closed_interval() {
        assert_eq!(locus("chr1", 100, 200, Strand::Plus, "a").len(), 101);
        assert_eq!(locus("chr1", 5, 5, Strand::Plus, "a").len(), 1);
        assert!(!locus("chr1", 5, 5, Strand::Plus, "a").is_empty());
        assert_eq!(locus("chr1", 0, u64::MAX, Strand::Plus, "a").len(), u64::MAX);
    }

    #[test]
    fn test_overlap_touching_ends() {
        let a = locus("chr1", 100, 200, Strand::Plus, "a");
        let b = locus("chr1", 200, 300, Strand::Plus, "b");
        let c = locus("chr1", 201, 300, Strand::Plus, "c");
        assert!(a.overlaps(&b, Sense::Both));
        assert!(!a.overlaps(&c, Sense::Both));
    }

    #[test]
    fn test_overlap_requires_same_chrom() {
        let a = locus("chr1", 100, 200, Strand::Plus, "a");
        let b = locus("chr2", 100, 200, Strand::Plus, "b");
        assert!(!a.overlaps(&b, Sense::Both));
    }

    #[test]
    fn test_sense_filters() {
        let plus = locus("chr1", 100, 200, Strand::Plus, "a");
        let minus = locus("chr1", 150, 250, Strand::Minus, "b");
        let dot = locus("chr1", 150, 250, Strand::Unstranded, "c");

        assert!(plus.overlaps(&minus, Sense::Both));
        assert!(!plus.overlaps(&minus, Sense::Sense));
        assert!(plus.overlaps(&minus, Sense::Antisense));
        assert!(plus.overlaps(&dot, Sense::Sense));
        assert!(plus.overlaps(&dot, Sense::Antisense));
    }

    #[test]
    fn test_contains() {
        let outer = locus("chr1", 100, 200, Strand::Plus, "a");
        let inner = locus("chr1", 120, 180, Strand::Plus, "b");
        assert!(outer.contains(&inner, Sense::Both));
        assert!(!inner.contains(&outer, Sense::Both));
        assert!(outer.contains(&outer, Sense::Both));
    }

    #[test]
    fn test_display() {
        let l = locus("chr1", 100, 200, Strand::Minus, "a");
        assert_eq!(l.to_string(), "chr1(-):100-200");
    }

    #[test]
    fn test_stitched_id_round_trip() {
        let id = LocusId::stitched(2, "A");
        assert_eq!(id.to_string(), "2_A_lociStitched");
        assert_eq!(LocusId::parse("2_A_lociStitched"), id);
    }

    #[test]
    fn test_unparseable_ids_are_named() {
        assert_eq!(LocusId::parse("x_A_lociStitched"), LocusId::from("x_A_lociStitched"));
        assert_eq!(LocusId::parse("12_lociStitched").merged_count(), 1);
        assert_eq!(LocusId::parse("peak1").merged_count(), 1);
    }

    #[test]
    fn test_strand_from_field() {
        assert_eq!(Strand::from_field("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_field("."), Some(Strand::Unstranded));
        assert_eq!(Strand::from_field(""), Some(Strand::Unstranded));
        assert_eq!(Strand::from_field("++"), None);
        assert_eq!(Strand::from_field("x"), None);
    }
}

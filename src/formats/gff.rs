//! GFF3 region table adapter
//!
//! Reads candidate regions from GFF with zero-copy parsing and writes
//! stitched regions back out. GFF uses 1-based closed coordinates, which is
//! also the internal convention, so no shifting happens here.

use crate::core::{
    ByteLineIterator, FastRoseError, Locus, LocusCollection, LocusError, LocusId,
    ParseError, Result, Strand,
};
use memchr::memchr;
use std::io::{BufRead, Write};
use std::path::Path;

/// Attribute keys tried, in order, for a region identifier
pub const ID_ATTRIBUTES: [&str; 5] = ["ID", "Name", "name", "transcript_id", "gene_id"];

/// GFF parse error
#[derive(Debug, Clone)]
pub enum GffParseError {
    EmptyLine,
    TooFewFields { expected: usize, found: usize },
    InvalidUtf8(&'static str),
    InvalidNumber(&'static str, String),
    InvalidStrand(String),
    InvalidRange { start: u64, end: u64 },
}

impl std::fmt::Display for GffParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GffParseError::EmptyLine => write!(f, "Empty line"),
            GffParseError::TooFewFields { expected, found } => {
                write!(f, "Too few fields: expected {}, found {}", expected, found)
            }
            GffParseError::InvalidUtf8(field) => write!(f, "Invalid UTF-8 in field: {}", field),
            GffParseError::InvalidNumber(field, value) => {
                write!(f, "Invalid number in field {}: {}", field, value)
            }
            GffParseError::InvalidStrand(s) => write!(f, "Invalid strand: {}", s),
            GffParseError::InvalidRange { start, end } => {
                write!(f, "Start {} is past end {}", start, end)
            }
        }
    }
}

impl std::error::Error for GffParseError {}

/// Split a line on tabs, returning field boundaries
pub(crate) fn split_fields(line: &[u8], capacity: usize) -> Vec<(usize, usize)> {
    let mut field_bounds = Vec::with_capacity(capacity);
    let mut start_pos = 0;
    loop {
        match memchr(b'\t', &line[start_pos..]) {
            Some(tab_pos) => {
                let end_pos = start_pos + tab_pos;
                field_bounds.push((start_pos, end_pos));
                start_pos = end_pos + 1;
            }
            None => {
                field_bounds.push((start_pos, line.len()));
                break;
            }
        }
    }
    field_bounds
}

/// Zero-copy GFF record view
/// GFF format: seqname, source, feature, start, end, score, strand, frame, attributes
/// All coordinates are 1-based, closed interval [start, end]
pub struct GffRecordView<'a> {
    pub seqname: &'a str,
    pub source: &'a str,
    pub feature: &'a str,
    pub start: u64,
    pub end: u64,
    pub score: &'a str,
    pub strand: Strand,
    pub frame: &'a str,
    pub attributes: &'a str,
}

impl<'a> GffRecordView<'a> {
    /// Parse a GFF line with minimal allocation
    pub fn parse(line: &'a [u8]) -> std::result::Result<Self, GffParseError> {
        if line.is_empty() {
            return Err(GffParseError::EmptyLine);
        }

        let field_bounds = split_fields(line, 9);
        if field_bounds.len() < 9 {
            return Err(GffParseError::TooFewFields {
                expected: 9,
                found: field_bounds.len(),
            });
        }

        let get_field = |idx: usize, name: &'static str| -> std::result::Result<&'a str, GffParseError> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| GffParseError::InvalidUtf8(name))
        };
        let get_number = |idx: usize, name: &'static str| -> std::result::Result<u64, GffParseError> {
            let field = get_field(idx, name)?;
            field
                .parse()
                .map_err(|_| GffParseError::InvalidNumber(name, field.to_string()))
        };

        let start = get_number(3, "start")?;
        let end = get_number(4, "end")?;
        if start > end {
            return Err(GffParseError::InvalidRange { start, end });
        }

        let strand_field = get_field(6, "strand")?;
        let strand = Strand::from_field(strand_field)
            .ok_or_else(|| GffParseError::InvalidStrand(strand_field.to_string()))?;

        Ok(Self {
            seqname: get_field(0, "seqname")?,
            source: get_field(1, "source")?,
            feature: get_field(2, "feature")?,
            start,
            end,
            score: get_field(5, "score")?,
            strand,
            frame: get_field(7, "frame")?,
            attributes: get_field(8, "attributes")?,
        })
    }

    /// Get the feature size (end - start + 1 for 1-based coordinates)
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of an attribute, in GFF3 `key=value` or GTF `key "value"` form
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attributes
            .split(';')
            .map(str::trim)
            .find_map(|pair| {
                let split = pair.find(|c: char| c == '=' || c == ' ')?;
                let (k, v) = (&pair[..split], &pair[split + 1..]);
                (k == key).then(|| v.trim().trim_matches('"'))
            })
            .filter(|v| !v.is_empty())
    }

    /// Identifier of the region this row describes
    ///
    /// Taken from the first present attribute of [`ID_ATTRIBUTES`], then the
    /// source column, then the raw attribute text, and finally the
    /// coordinates themselves.
    pub fn region_id(&self) -> String {
        if let Some(id) = ID_ATTRIBUTES.iter().find_map(|key| self.attribute(key)) {
            return id.to_string();
        }
        if !self.source.is_empty() && self.source != "." {
            return self.source.to_string();
        }
        let attributes = self.attributes.trim();
        if !attributes.is_empty() && attributes != "." {
            return attributes.to_string();
        }
        format!("{}:{}:{}-{}", self.seqname, self.strand, self.start, self.end)
    }

    pub fn to_locus(&self) -> std::result::Result<Locus, LocusError> {
        Locus::new(
            self.seqname,
            self.start,
            self.end,
            self.strand,
            LocusId::parse(&self.region_id()),
        )
    }
}

/// Read a region table into a collection
///
/// Comment, directive and blank lines are skipped. A malformed row is a
/// parse error and a repeated region identifier is fatal.
pub fn parse_gff_reader<R: BufRead>(reader: R) -> Result<LocusCollection> {
    let mut lines = ByteLineIterator::new(reader);
    let mut collection = LocusCollection::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if line.iter().all(u8::is_ascii_whitespace) || line.first() == Some(&b'#') {
            continue;
        }

        let invalid = |message: String| ParseError::InvalidGff {
            line: line_number,
            message,
        };
        let view = GffRecordView::parse(line).map_err(|e| invalid(e.to_string()))?;
        let locus = view.to_locus().map_err(|e| invalid(e.to_string()))?;

        match collection.add(locus) {
            Ok(()) => {}
            Err(LocusError::DuplicateIdentifier(id)) => {
                return Err(FastRoseError::NonUniqueIdentifier { id })
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(collection)
}

/// Read a GFF file, plain or compressed
pub fn read_gff_collection<P: AsRef<Path>>(path: P) -> Result<LocusCollection> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(FastRoseError::MissingInput(path.to_path_buf()));
    }
    let reader = crate::core::open_input(path)?;
    parse_gff_reader(reader)
}

/// Write one GFF row per locus
///
/// Rows are `chrom, id, '', start, end, '', strand, '', ID=<id>` in
/// collection order.
pub fn write_stitched_gff<W: Write>(writer: &mut W, collection: &LocusCollection) -> std::io::Result<()> {
    for locus in collection.loci() {
        let id = locus.key();
        writeln!(
            writer,
            "{}\t{}\t\t{}\t{}\t\t{}\t\tID={}",
            locus.chrom(),
            id,
            locus.start(),
            locus.end(),
            locus.strand(),
            id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gff_record_view_basic() {
        let line = b"chr1\tpeaks\tenhancer\t100\t200\t.\t+\t.\tID=peak_1;score=3";
        let view = GffRecordView::parse(line).unwrap();
        assert_eq!(view.seqname, "chr1");
        assert_eq!(view.start, 100);
        assert_eq!(view.end, 200);
        assert_eq!(view.strand, Strand::Plus);
        assert_eq!(view.size(), 101);
        assert_eq!(view.attribute("score"), Some("3"));
        assert_eq!(view.region_id(), "peak_1");
    }

    #[test]
    fn test_gff_record_view_too_few_fields() {
        let err = GffRecordView::parse(b"chr1\tx\ty\t1\t2").err().unwrap();
        assert!(matches!(err, GffParseError::TooFewFields { expected: 9, found: 5 }));
    }

    #[test]
    fn test_gff_record_view_invalid_number() {
        let err = GffRecordView::parse(b"chr1\t.\t.\tabc\t2\t.\t+\t.\t.").err().unwrap();
        assert!(matches!(err, GffParseError::InvalidNumber("start", _)));
    }

    #[test]
    fn test_gff_record_view_empty_strand() {
        let view = GffRecordView::parse(b"chr1\tA\t\t1\t2\t\t\t\tID=A").unwrap();
        assert_eq!(view.strand, Strand::Unstranded);
    }

    #[test]
    fn test_region_id_fallbacks() {
        let gtf = GffRecordView::parse(b"chr1\t.\texon\t1\t2\t.\t-\t.\tgene_id \"G1\"; transcript_id \"T1\";").unwrap();
        assert_eq!(gtf.region_id(), "T1");

        let source = GffRecordView::parse(b"chr1\tregion_7\t\t1\t2\t\t.\t\t").unwrap();
        assert_eq!(source.region_id(), "region_7");

        let raw = GffRecordView::parse(b"chr1\t.\t.\t1\t2\t.\t.\t.\tfoo").unwrap();
        assert_eq!(raw.region_id(), "foo");

        let bare = GffRecordView::parse(b"chr1\t.\t.\t1\t2\t.\t+\t.\t.").unwrap();
        assert_eq!(bare.region_id(), "chr1:+:1-2");
    }

    #[test]
    fn test_parse_reader_skips_directives() {
        let text = "##gff-version 3\n\nchr1\t.\t.\t100\t200\t.\t+\t.\tname=A\nchr1\t.\t.\t250\t300\t.\t+\t.\tname=B\n";
        let collection = parse_gff_reader(text.as_bytes()).unwrap();
        let keys: Vec<String> = collection.loci().map(|l| l.key()).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn test_duplicate_identifier_is_fatal() {
        let text = "chr1\t.\t.\t100\t200\t.\t+\t.\tID=A\nchr2\t.\t.\t1\t5\t.\t+\t.\tID=A\n";
        let err = parse_gff_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, FastRoseError::NonUniqueIdentifier { ref id } if id == "A"));
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let text = "# comment\nchr1\t.\t.\t300\t200\t.\t+\t.\tID=A\n";
        let err = parse_gff_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(err, FastRoseError::Parse(ParseError::InvalidGff { line: 2, .. })));
    }

    #[test]
    fn test_stitched_rows_read_back() {
        let collection = LocusCollection::from_loci(vec![
            Locus::new("chr1", 100, 300, Strand::Unstranded, LocusId::stitched(2, "A")).unwrap(),
            Locus::new("chr2", 5, 9, Strand::Minus, "B").unwrap(),
        ])
        .unwrap();

        let mut out = Vec::new();
        write_stitched_gff(&mut out, &collection).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "chr1\t2_A_lociStitched\t\t100\t300\t\t.\t\tID=2_A_lociStitched\n\
             chr2\tB\t\t5\t9\t\t-\t\tID=B\n"
        );

        let back = parse_gff_reader(text.as_bytes()).unwrap();
        let first = back.loci().next().unwrap();
        assert_eq!(first.id(), &LocusId::stitched(2, "A"));
        assert_eq!(first.id().merged_count(), 2);
    }
}

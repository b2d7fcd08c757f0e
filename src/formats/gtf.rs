//! GTF format adapter
//!
//! Converts GTF rows into GFF3 by rewriting the attribute column from
//! `key "value";` pairs into `key=value` pairs. Coordinates are 1-based in
//! both formats and pass through unchanged.

use crate::core::Result;
use crate::formats::gff::GffRecordView;
use crate::formats::{convert_to_gff3, ConversionStats};
use std::path::Path;

/// Attributes kept by a full conversion, in output order
pub const GTF_ATTRIBUTES: [&str; 17] = [
    "gene_id",
    "db_xref",
    "gbkey",
    "gene",
    "gene_biotype",
    "transcript_id",
    "model_evidence",
    "product",
    "exon_number",
    "protein_id",
    "anticodon",
    "inference",
    "note",
    "exception",
    "transl_except",
    "pseudo",
    "partial",
];

/// Attributes kept by default
const ID_ONLY: [&str; 2] = ["gene_id", "transcript_id"];

/// Rewrite one GTF row as GFF3
pub fn gtf_line_to_gff3(line: &str, full: bool) -> Option<String> {
    let view = GffRecordView::parse(line.as_bytes()).ok()?;
    let keys: &[&str] = if full { &GTF_ATTRIBUTES } else { &ID_ONLY };

    let attributes: Vec<String> = keys
        .iter()
        .filter_map(|key| view.attribute(key).map(|value| format!("{}={}", key, value)))
        .collect();
    let attributes = if attributes.is_empty() {
        ".".to_string()
    } else {
        attributes.join(";")
    };

    Some(format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        view.seqname,
        view.source,
        view.feature,
        view.start,
        view.end,
        view.score,
        view.strand,
        view.frame,
        attributes
    ))
}

/// Convert a GTF file into a GFF3 region table
///
/// With `full` every attribute of [`GTF_ATTRIBUTES`] present on a row is
/// kept, otherwise only `gene_id` and `transcript_id`.
pub fn convert_gtf<P: AsRef<Path>>(input: P, output: P, full: bool) -> Result<ConversionStats> {
    convert_to_gff3(input, output, |line| gtf_line_to_gff3(line, full))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROW: &str = "chr1\tRefSeq\texon\t11874\t12227\t.\t+\t.\t\
                       gene_id \"DDX11L1\"; transcript_id \"NR_046018.2\"; gbkey \"misc_RNA\"; exon_number \"1\";";

    #[test]
    fn test_id_only_conversion() {
        assert_eq!(
            gtf_line_to_gff3(ROW, false).unwrap(),
            "chr1\tRefSeq\texon\t11874\t12227\t.\t+\t.\tgene_id=DDX11L1;transcript_id=NR_046018.2"
        );
    }

    #[test]
    fn test_full_conversion_keeps_known_attributes() {
        let out = gtf_line_to_gff3(ROW, true).unwrap();
        assert!(out.ends_with("gene_id=DDX11L1;gbkey=misc_RNA;transcript_id=NR_046018.2;exon_number=1"));
    }

    #[test]
    fn test_short_row_skipped() {
        assert!(gtf_line_to_gff3("chr1\tRefSeq\texon", false).is_none());
    }

    #[test]
    fn test_convert_gtf_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("genes.gtf");
        let output = dir.path().join("genes.gff");
        std::fs::write(&input, format!("#!genome-build GRCh38\n{}\n", ROW)).unwrap();

        let stats = convert_gtf(&input, &output, false).unwrap();
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.comments, 1);

        let text = std::fs::read_to_string(&output).unwrap();
        let regions = crate::formats::parse_gff_reader(text.as_bytes()).unwrap();
        assert_eq!(regions.loci().next().unwrap().key(), "NR_046018.2");
    }
}

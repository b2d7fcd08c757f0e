//! Gene annotation table
//!
//! Parses UCSC refseq-style tables (`name`, `chrom`, `strand`, `txStart`,
//! `txEnd`, `name2`) and derives TSS windows from them.
//!
//! # Table Format
//!
//! ```text
//! #bin  name          chrom  strand  txStart  txEnd  ...  name2
//! 0     NM_001276352  chr1   -       67092164 67134970 ... C1orf141
//! ```
//!
//! - The first line is a header; a leading `#` is ignored
//! - Column order is free, columns are located by name
//! - Repeated transcript ids keep their first row
//! - On the `-` strand `txStart`/`txEnd` are swapped so `start` is always
//!   the transcription start side

use crate::core::error::{LocusResult, ParseError, ParseResult};
use crate::core::index::LocusCollection;
use crate::core::io::LineIterator;
use crate::core::locus::{Locus, Strand};
use std::collections::HashMap;
use std::io::BufRead;

/// One transcript of the annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    /// Transcript identifier (`name`)
    pub gene_id: String,
    /// Gene symbol (`name2`); transcripts of one gene share it
    pub name: String,
    pub chrom: String,
    pub strand: Strand,
    /// Transcription start coordinate
    pub start: u64,
    /// Transcription end coordinate
    pub end: u64,
}

impl GeneRecord {
    /// Window `[tss - flank, tss + flank]` identified by the transcript id
    pub fn tss_window(&self, flank: u64) -> LocusResult<Locus> {
        Locus::new(
            self.chrom.clone(),
            self.start.saturating_sub(flank),
            self.start.saturating_add(flank),
            self.strand,
            self.gene_id.as_str(),
        )
    }
}

/// Read-only gene annotation, built once per run
#[derive(Debug, Clone, Default)]
pub struct GeneAnnotation {
    genes: Vec<GeneRecord>,
    by_id: HashMap<String, usize>,
}

struct Columns {
    name: usize,
    chrom: usize,
    strand: usize,
    tx_start: usize,
    tx_end: usize,
    name2: usize,
}

impl Columns {
    fn locate(header: &str) -> ParseResult<Self> {
        let header = header.strip_prefix('#').unwrap_or(header);
        let fields: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |column: &'static str| {
            fields
                .iter()
                .position(|f| *f == column)
                .ok_or(ParseError::MissingColumn(column))
        };
        Ok(Self {
            name: find("name")?,
            chrom: find("chrom")?,
            strand: find("strand")?,
            tx_start: find("txStart")?,
            tx_end: find("txEnd")?,
            name2: find("name2")?,
        })
    }

    fn width(&self) -> usize {
        [self.name, self.chrom, self.strand, self.tx_start, self.tx_end, self.name2]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl GeneAnnotation {
    /// Parse an annotation table from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> ParseResult<Self> {
        let mut lines = LineIterator::new(reader);

        let columns = match lines.next_line() {
            Some(header) => Columns::locate(header?)?,
            None => return Err(ParseError::MissingHeader),
        };
        let width = columns.width();

        let mut annotation = Self::default();
        let mut line_number = 1;
        while let Some(line) = lines.next_line() {
            let line = line?;
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let invalid = |message: String| ParseError::InvalidAnnotation {
                line: line_number,
                message,
            };

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < width {
                return Err(invalid(format!(
                    "Expected at least {} fields, got {}",
                    width,
                    fields.len()
                )));
            }

            let gene_id = fields[columns.name];
            if annotation.by_id.contains_key(gene_id) {
                continue;
            }

            let strand = Strand::from_field(fields[columns.strand])
                .ok_or_else(|| invalid(format!("Invalid strand '{}'", fields[columns.strand])))?;
            let parse_coord = |idx: usize, field: &str| {
                fields[idx]
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("Invalid {} value '{}'", field, fields[idx])))
            };
            let tx_start = parse_coord(columns.tx_start, "txStart")?;
            let tx_end = parse_coord(columns.tx_end, "txEnd")?;
            let (start, end) = match strand {
                Strand::Minus => (tx_end, tx_start),
                _ => (tx_start, tx_end),
            };

            annotation.push(GeneRecord {
                gene_id: gene_id.to_string(),
                name: fields[columns.name2].to_string(),
                chrom: fields[columns.chrom].to_string(),
                strand,
                start,
                end,
            });
        }

        Ok(annotation)
    }

    /// Build from records, keeping the first record per transcript id
    pub fn from_records<I: IntoIterator<Item = GeneRecord>>(records: I) -> Self {
        let mut annotation = Self::default();
        for record in records {
            if !annotation.by_id.contains_key(&record.gene_id) {
                annotation.push(record);
            }
        }
        annotation
    }

    fn push(&mut self, record: GeneRecord) {
        self.by_id.insert(record.gene_id.clone(), self.genes.len());
        self.genes.push(record);
    }

    /// Look up a transcript by id
    pub fn get(&self, gene_id: &str) -> Option<&GeneRecord> {
        self.by_id.get(gene_id).map(|&idx| &self.genes[idx])
    }

    /// Gene symbol for a transcript id
    pub fn gene_name(&self, gene_id: &str) -> Option<&str> {
        self.get(gene_id).map(|g| g.name.as_str())
    }

    pub fn genes(&self) -> &[GeneRecord] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Index one TSS window per transcript
    pub fn tss_collection(&self, flank: u64) -> LocusResult<LocusCollection> {
        let windows = self
            .genes
            .iter()
            .map(|gene| gene.tss_window(flank))
            .collect::<LocusResult<Vec<_>>>()?;
        LocusCollection::from_loci(windows)
    }
}

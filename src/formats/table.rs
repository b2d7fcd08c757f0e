//! Output tables
//!
//! Both tables are tab-separated; the region map is written all-or-nothing.

use crate::core::{write_atomically, DebugEntry, RegionTable, Result};
use std::io::Write;
use std::path::Path;

/// Write the region map with its header line
pub fn write_region_table<P: AsRef<Path>>(path: P, table: &RegionTable) -> Result<()> {
    write_atomically(path, |writer| -> Result<()> {
        table.write_tsv(writer)?;
        Ok(())
    })
}

/// Write one `locus, id, reason` row per filtering decision
pub fn write_debug_entries<W: Write>(writer: &mut W, entries: &[DebugEntry]) -> std::io::Result<()> {
    for entry in entries {
        writeln!(writer, "{}\t{}\t{}", entry.locus, entry.locus_id, entry.reason.as_str())?;
    }
    Ok(())
}

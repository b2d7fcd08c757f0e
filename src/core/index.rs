//! Locus collection with per-chromosome interval index
//!
//! Uses rust-lapper for O(log n + k) overlap queries. Loci live in an
//! insertion-ordered slot table; the Lapper for each chromosome stores slot
//! numbers, so removal only clears a slot and never re-sorts the index.

use crate::core::error::{LocusError, LocusResult};
use crate::core::locus::{Locus, Sense};
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;
use std::fmt;

/// Type alias for the slot intervals stored per chromosome
pub type SlotInterval = Interval<u64, usize>;

/// Indexed, queryable set of loci with unique identities
///
/// Queries return loci in insertion order regardless of how the index
/// stores them, so output built from a collection is reproducible.
#[derive(Default)]
pub struct LocusCollection {
    /// Insertion-ordered loci; `None` marks a removed locus
    slots: Vec<Option<Locus>>,
    /// Identity key -> slot
    ids: HashMap<String, usize>,
    /// Chromosome -> interval tree over slots (half-open, `[start, end + 1)`)
    maps: HashMap<String, Lapper<u64, usize>>,
}

impl LocusCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection in one pass
    ///
    /// Fails on the first repeated identifier.
    pub fn from_loci<I>(loci: I) -> LocusResult<Self>
    where
        I: IntoIterator<Item = Locus>,
    {
        let mut slots = Vec::new();
        let mut ids = HashMap::new();
        let mut intervals_by_chrom: HashMap<String, Vec<SlotInterval>> = HashMap::new();

        for locus in loci {
            let key = locus.key();
            if ids.contains_key(&key) {
                return Err(LocusError::DuplicateIdentifier(key));
            }
            let slot = slots.len();
            ids.insert(key, slot);
            intervals_by_chrom
                .entry(locus.chrom().to_string())
                .or_default()
                .push(slot_interval(&locus, slot));
            slots.push(Some(locus));
        }

        let maps = intervals_by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();

        Ok(Self { slots, ids, maps })
    }

    /// Add a locus; fails if its identifier is already present
    pub fn add(&mut self, locus: Locus) -> LocusResult<()> {
        let key = locus.key();
        if self.ids.contains_key(&key) {
            return Err(LocusError::DuplicateIdentifier(key));
        }

        let slot = self.slots.len();
        let interval = slot_interval(&locus, slot);
        match self.maps.get_mut(locus.chrom()) {
            Some(lapper) => lapper.insert(interval),
            None => {
                self.maps
                    .insert(locus.chrom().to_string(), Lapper::new(vec![interval]));
            }
        }
        self.ids.insert(key, slot);
        self.slots.push(Some(locus));
        Ok(())
    }

    /// Remove a locus by identity and return the stored value
    pub fn remove(&mut self, locus: &Locus) -> LocusResult<Locus> {
        let key = locus.key();
        let slot = self
            .ids
            .remove(&key)
            .ok_or_else(|| LocusError::NotFound(key.clone()))?;
        self.slots[slot]
            .take()
            .ok_or(LocusError::NotFound(key))
    }

    /// Check whether a locus with the same identity is present
    pub fn has_locus(&self, locus: &Locus) -> bool {
        self.ids.contains_key(&locus.key())
    }

    /// Look up a locus by its identity key
    pub fn get(&self, key: &str) -> Option<&Locus> {
        self.ids.get(key).and_then(|&slot| self.slots[slot].as_ref())
    }

    /// All loci whose interval overlaps `query` on the same chromosome
    pub fn get_overlap(&self, query: &Locus, sense: Sense) -> Vec<&Locus> {
        self.candidates(query)
            .filter(|locus| sense.accepts(locus.strand(), query.strand()))
            .collect()
    }

    /// All loci that fully contain `query`
    pub fn get_containers(&self, query: &Locus, sense: Sense) -> Vec<&Locus> {
        self.candidates(query)
            .filter(|locus| locus.contains(query, sense))
            .collect()
    }

    /// Live loci from the index overlapping `query`, ignoring strand, in insertion order
    fn candidates<'a>(&'a self, query: &Locus) -> impl Iterator<Item = &'a Locus> + 'a {
        let mut hits: Vec<usize> = match self.maps.get(query.chrom()) {
            Some(lapper) => lapper
                .find(query.start(), query.end().saturating_add(1))
                .map(|iv| iv.val)
                .collect(),
            None => vec![],
        };
        hits.sort_unstable();
        hits.into_iter()
            .filter_map(move |slot| self.slots[slot].as_ref())
    }

    /// All loci in insertion order
    pub fn loci(&self) -> impl Iterator<Item = &Locus> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    /// Chromosomes that have ever held a locus
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(|s| s.as_str())
    }

    /// Number of live loci
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl fmt::Debug for LocusCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocusCollection")
            .field("len", &self.len())
            .field("chromosomes", &self.maps.len())
            .finish()
    }
}

/// Closed `[start, end]` becomes Lapper's half-open `[start, end + 1)`
fn slot_interval(locus: &Locus, slot: usize) -> SlotInterval {
    Interval {
        start: locus.start(),
        stop: locus.end().saturating_add(1),
        val: slot,
    }
}

//! The letter hive: one center letter plus six outer letters, and everything
//! needed to lay it out, shuffle it and animate it onto the page.

use std::collections::BTreeSet;

pub mod geometry;
pub mod sequencer;
pub mod shuffle;

pub const OUTER_SEGMENTS: usize = 6;

/// Precomputed wedge supplied by the server for one outer slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SuppliedSegment {
    pub path: String,
    pub label: (f64, f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hive {
    pub center: char,
    pub outer: Vec<char>,
    /// Server layout per outer slot; empty when geometry is computed locally.
    pub supplied: Vec<SuppliedSegment>,
}

impl Hive {
    pub fn new(center: char, outer: Vec<char>) -> Self {
        Self { center, outer, supplied: Vec::new() }
    }

    /// Derive the outer ring from the full letter set when the server only
    /// sends `all_letters` + `center_letter`.
    pub fn from_letters(center: char, all: &[char]) -> Self {
        let mut seen = BTreeSet::new();
        let outer = all
            .iter()
            .copied()
            .filter(|&c| c != center && seen.insert(c))
            .collect();
        Self::new(center, outer)
    }

    pub fn is_playable(&self) -> bool {
        self.outer.len() == OUTER_SEGMENTS && self.center.is_ascii_alphabetic()
    }

    pub fn letters(&self) -> BTreeSet<char> {
        std::iter::once(self.center).chain(self.outer.iter().copied()).collect()
    }

    /// Re-randomize the outer ring only.
    pub fn shuffle_outer(&mut self, rng: &mut impl shuffle::IndexSource) {
        shuffle::shuffle(&mut self.outer, rng);
    }
}

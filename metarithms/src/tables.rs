// Interval, scale, and chord tables, plus the modular degree lookup.
//
// A table is an ordered list of semitone steps (`relative`, starting with the
// implied unison) and its running sum (`absolute`). The last absolute entry is
// the table's octave span: 12 for every scale here, but only 7 for a plain
// triad, which is what makes chord lookups climb by fifths rather than octaves.
//
// `lookup()` maps scale-degree indices to semitone offsets. Indices outside
// `[0, steps)` fold by whole octaves using floor division, so `-1` in a major
// scale is the leading tone one octave down (-1 semitone), not an error.
//
// The registry is built once on first use and never written again, so any
// number of threads can read it without locking. Scales and chords live in
// separate maps because they share names (`maj` is both a scale and a triad).

use crate::error::{MetarithmsError, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interval sizes in semitones.
pub mod interval {
    pub const UNISON: u32 = 0;
    pub const MINOR_SECOND: u32 = 1;
    pub const MAJOR_SECOND: u32 = 2;
    pub const AUGMENTED_SECOND: u32 = 3;
    pub const MINOR_THIRD: u32 = 3;
    pub const MAJOR_THIRD: u32 = 4;
    pub const PERFECT_FOURTH: u32 = 5;
    pub const AUGMENTED_FOURTH: u32 = 6;
    pub const DIMINISHED_FIFTH: u32 = 6;
    pub const PERFECT_FIFTH: u32 = 7;
    pub const AUGMENTED_FIFTH: u32 = 8;
    pub const MINOR_SIXTH: u32 = 8;
    pub const MAJOR_SIXTH: u32 = 9;
    pub const MINOR_SEVENTH: u32 = 10;
    pub const MAJOR_SEVENTH: u32 = 11;
    pub const OCTAVE: u32 = 12;
}

/// Degree pattern for a root-position triad within a scale.
pub const TRIAD: [i64; 3] = [0, 2, 4];

/// An immutable table of semitone steps and their cumulative offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTable {
    relative: Vec<u32>,
    absolute: Vec<i64>,
}

impl IntervalTable {
    /// Build a table from the steps between consecutive degrees. The leading
    /// unison is implied, so `absolute()[0]` is always 0.
    pub fn from_steps(steps: &[u32]) -> Self {
        let relative: Vec<u32> = std::iter::once(interval::UNISON)
            .chain(steps.iter().copied())
            .collect();
        let absolute = relative
            .iter()
            .scan(0i64, |total, &step| {
                *total += i64::from(step);
                Some(*total)
            })
            .collect();
        IntervalTable { relative, absolute }
    }

    /// Steps between consecutive degrees, leading unison included.
    pub fn relative(&self) -> &[u32] {
        &self.relative
    }

    /// Semitone offset of each degree from the root, closing octave included.
    pub fn absolute(&self) -> &[i64] {
        &self.absolute
    }

    /// Number of degrees per octave (the closing octave entry excluded).
    pub fn steps(&self) -> usize {
        self.absolute.len() - 1
    }

    /// Semitones covered by one full pass through the table.
    pub fn span(&self) -> i64 {
        self.absolute[self.absolute.len() - 1]
    }

    pub fn lookup(&self, pattern: &[i64], shift: i64) -> Result<Vec<i64>> {
        fold_lookup(&self.absolute, pattern, shift)
    }
}

lazy_static! {
    static ref SCALES: BTreeMap<&'static str, IntervalTable> = {
        use crate::tables::interval::*;
        BTreeMap::from([
            ("maj", IntervalTable::from_steps(&[
                MAJOR_SECOND, MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND,
                MAJOR_SECOND, MAJOR_SECOND, MINOR_SECOND,
            ])),
            ("mel_up", IntervalTable::from_steps(&[
                MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND, MAJOR_SECOND,
                MAJOR_SECOND, MAJOR_SECOND, MINOR_SECOND,
            ])),
            ("mel_dn", IntervalTable::from_steps(&[
                MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND, MAJOR_SECOND,
                MINOR_SECOND, MAJOR_SECOND, MAJOR_SECOND,
            ])),
            ("har", IntervalTable::from_steps(&[
                MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND, MAJOR_SECOND,
                MINOR_SECOND, AUGMENTED_SECOND, MINOR_SECOND,
            ])),
            ("pen", IntervalTable::from_steps(&[
                MAJOR_SECOND, AUGMENTED_SECOND, MAJOR_SECOND, MAJOR_SECOND,
                AUGMENTED_SECOND,
            ])),
            ("who", IntervalTable::from_steps(&[MAJOR_SECOND; 6])),
            // Half-whole octatonic.
            ("oct", IntervalTable::from_steps(&[
                MINOR_SECOND, MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND,
                MINOR_SECOND, MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND,
            ])),
            // Whole-half octatonic.
            ("oct2", IntervalTable::from_steps(&[
                MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND, MINOR_SECOND,
                MAJOR_SECOND, MINOR_SECOND, MAJOR_SECOND, MINOR_SECOND,
            ])),
        ])
    };

    static ref CHORDS: BTreeMap<&'static str, IntervalTable> = {
        use crate::tables::interval::*;
        BTreeMap::from([
            ("maj", IntervalTable::from_steps(&[MAJOR_THIRD, MINOR_THIRD])),
            ("min", IntervalTable::from_steps(&[MINOR_THIRD, MAJOR_THIRD])),
            ("aug", IntervalTable::from_steps(&[MAJOR_THIRD, MAJOR_THIRD])),
            ("dim", IntervalTable::from_steps(&[MINOR_THIRD, MINOR_THIRD])),
            ("dom7", IntervalTable::from_steps(&[MAJOR_THIRD, MINOR_THIRD, MINOR_THIRD])),
            ("maj7", IntervalTable::from_steps(&[MAJOR_THIRD, MINOR_THIRD, MAJOR_THIRD])),
            ("min7", IntervalTable::from_steps(&[MINOR_THIRD, MAJOR_THIRD, MINOR_THIRD])),
            ("minmaj7", IntervalTable::from_steps(&[MINOR_THIRD, MAJOR_THIRD, MAJOR_THIRD])),
        ])
    };
}

/// Look up a registered scale by name.
pub fn scale(name: &str) -> Result<&'static IntervalTable> {
    SCALES.get(name).ok_or_else(|| MetarithmsError::UnknownTable {
        kind: "scale",
        name: name.to_string(),
    })
}

/// Look up a registered chord by name.
pub fn chord(name: &str) -> Result<&'static IntervalTable> {
    CHORDS.get(name).ok_or_else(|| MetarithmsError::UnknownTable {
        kind: "chord",
        name: name.to_string(),
    })
}

/// Registered scale names, in sorted order.
pub fn scale_names() -> impl Iterator<Item = &'static str> {
    SCALES.keys().copied()
}

/// Registered chord names, in sorted order.
pub fn chord_names() -> impl Iterator<Item = &'static str> {
    CHORDS.keys().copied()
}

/// Which table a lookup runs against: a registered scale or chord, or a
/// caller-supplied list of absolute offsets (closing octave included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRef<'a> {
    Scale(&'a str),
    Chord(&'a str),
    Explicit(&'a [i64]),
}

impl<'a> TableRef<'a> {
    /// Resolve to the absolute offset list.
    pub fn resolve(self) -> Result<&'a [i64]> {
        match self {
            TableRef::Scale(name) => Ok(scale(name)?.absolute()),
            TableRef::Chord(name) => Ok(chord(name)?.absolute()),
            TableRef::Explicit(table) => Ok(table),
        }
    }
}

impl<'a> From<&'a str> for TableRef<'a> {
    fn from(name: &'a str) -> Self {
        TableRef::Scale(name)
    }
}

impl<'a> From<&'a [i64]> for TableRef<'a> {
    fn from(table: &'a [i64]) -> Self {
        TableRef::Explicit(table)
    }
}

impl<'a, const N: usize> From<&'a [i64; N]> for TableRef<'a> {
    fn from(table: &'a [i64; N]) -> Self {
        TableRef::Explicit(table)
    }
}

impl<'a> From<&'a IntervalTable> for TableRef<'a> {
    fn from(table: &'a IntervalTable) -> Self {
        TableRef::Explicit(table.absolute())
    }
}

/// Map scale-degree indices to semitone offsets.
///
/// `shift` transposes in scale degrees before folding. Each index folds into
/// the table with floor division, adding one octave span per wrap.
pub fn lookup<'a>(table: impl Into<TableRef<'a>>, pattern: &[i64], shift: i64) -> Result<Vec<i64>> {
    let table = table.into();
    let absolute = table.resolve()?;
    tracing::debug!(?table, len = pattern.len(), shift, "table lookup");
    fold_lookup(absolute, pattern, shift)
}

fn fold_lookup(absolute: &[i64], pattern: &[i64], shift: i64) -> Result<Vec<i64>> {
    if absolute.len() < 2 {
        return Err(MetarithmsError::DegenerateTable {
            len: absolute.len(),
        });
    }
    let steps = (absolute.len() - 1) as i64;
    let span = absolute[absolute.len() - 1];
    Ok(pattern
        .iter()
        .map(|&degree| {
            let index = degree + shift;
            let octave = index.div_euclid(steps);
            absolute[index.rem_euclid(steps) as usize] + octave * span
        })
        .collect())
}

/// Major triad on `root`.
pub fn maj(root: i64) -> [i64; 3] {
    [
        root,
        root + i64::from(interval::MAJOR_THIRD),
        root + i64::from(interval::PERFECT_FIFTH),
    ]
}

/// Minor triad on `root`.
pub fn min(root: i64) -> [i64; 3] {
    [
        root,
        root + i64::from(interval::MINOR_THIRD),
        root + i64::from(interval::PERFECT_FIFTH),
    ]
}

/// Augmented triad on `root`.
pub fn aug(root: i64) -> [i64; 3] {
    [
        root,
        root + i64::from(interval::MAJOR_THIRD),
        root + i64::from(interval::AUGMENTED_FIFTH),
    ]
}

/// Diminished triad on `root`.
pub fn dim(root: i64) -> [i64; 3] {
    [
        root,
        root + i64::from(interval::MINOR_THIRD),
        root + i64::from(interval::DIMINISHED_FIFTH),
    ]
}

/// Dyad of `root` and the note `semitones` above it.
pub fn interval(root: i64, semitones: i64) -> [i64; 2] {
    [root, root + semitones]
}

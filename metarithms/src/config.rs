// Data-driven composition requests.
//
// A `ComposeConfig` names everything `compose()` needs: the interval table,
// where the degree pattern comes from, the transposition, where the rhythm
// weights come from, and the two phase transforms applied at the end. Loaded
// from JSON so material can be iterated on without recompiling; every field
// has a default, so a config file only needs the fields it changes.
//
// Pattern and rhythm sources are either explicit arrays or a seeded LFSR.
// LFSR sources make a whole composition reproducible from two integers.
//
// See also: `compose.rs` which consumes this, `data/compose_example.json` for
// a sample request.

use crate::error::Result;
use crate::tables::TableRef;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::Path;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Which interval table pitches are looked up in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSpec {
    /// A registered scale, e.g. `{"scale": "har"}`.
    Scale(String),
    /// A registered chord, e.g. `{"chord": "dom7"}`.
    Chord(String),
    /// An absolute table in semitones, root first and octave last.
    Explicit(Vec<i64>),
}

impl TableSpec {
    pub fn table_ref(&self) -> TableRef<'_> {
        match self {
            TableSpec::Scale(name) => TableRef::Scale(name),
            TableSpec::Chord(name) => TableRef::Chord(name),
            TableSpec::Explicit(absolute) => TableRef::Explicit(absolute),
        }
    }
}

/// Where scale-degree indices come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    Explicit(Vec<i64>),
    /// `count` registers of an LFSR, each reduced modulo `degrees`. Without
    /// `degrees` the table's own step count is used, so the pattern stays
    /// within one octave.
    Lfsr {
        seed: u64,
        mask: u64,
        count: usize,
        #[serde(default)]
        degrees: Option<NonZeroU64>,
    },
}

/// Where the per-event duration weights come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhythmSource {
    /// Every event gets an equal share of the cycle.
    Uniform,
    /// One weight per event; normalized before encoding.
    Explicit(Vec<f64>),
    /// One LFSR feedback bit per event: a set bit picks `long`, a clear bit
    /// picks `short`.
    Lfsr {
        seed: u64,
        mask: u64,
        long: f64,
        short: f64,
    },
}

// ---------------------------------------------------------------------------
// ComposeConfig
// ---------------------------------------------------------------------------

/// One composition request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub table: TableSpec,
    pub pattern: PatternSource,
    /// Transposition in scale degrees.
    pub shift: i64,
    pub rhythm: RhythmSource,
    /// Rotation applied last, in turns.
    pub phase_offset: f64,
    /// Phase stretch applied before the offset.
    pub phase_scale: f64,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        ComposeConfig {
            table: TableSpec::Scale("maj".into()),
            pattern: PatternSource::Explicit((0..=7).collect()),
            shift: 0,
            rhythm: RhythmSource::Uniform,
            phase_offset: 0.0,
            phase_scale: 1.0,
        }
    }
}

impl ComposeConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded compose config");
        Ok(config)
    }

    /// Reseed every LFSR source, leaving explicit sources alone.
    pub fn reseed(&mut self, new_seed: u64) {
        if let PatternSource::Lfsr { seed, .. } = &mut self.pattern {
            *seed = new_seed;
        }
        if let RhythmSource::Lfsr { seed, .. } = &mut self.rhythm {
            *seed = new_seed;
        }
    }
}

// Error kinds for the metarithms core.
//
// Every failure here is a composition-time programmer error: a bad table name,
// mismatched array shapes, a duration pattern that cannot be normalized. They
// propagate straight to the caller; nothing retries. The point is to fail with
// a descriptive kind instead of quietly producing NaN-filled sequences.

use metarithms_lfsr::LfsrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetarithmsError {
    /// Scale or chord name not present in the registry.
    #[error("unknown {kind} table '{name}'")]
    UnknownTable { kind: &'static str, name: String },

    /// Lookup needs a root and an octave entry; anything shorter has no
    /// scale steps to fold indices over.
    #[error("table with {len} entries has no scale steps to fold over")]
    DegenerateTable { len: usize },

    /// Two sequences that must line up element-for-element do not.
    #[error("sequence length mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// A duration pattern whose entries sum to zero cannot be normalized.
    #[error("phase pattern sums to zero and cannot be normalized")]
    EmptyPhase,

    #[error("negative phase {value} at index {index}")]
    NegativePhase { index: usize, value: f64 },

    /// NaN or infinite duration weight.
    #[error("non-finite phase {value} at index {index}")]
    NonFinitePhase { index: usize, value: f64 },

    /// Finite weights whose sum overflows to infinity.
    #[error("phase pattern sum {total} cannot be normalized")]
    PhaseSumOverflow { total: f64 },

    /// Frequency ratios must be strictly positive (and finite).
    #[error("non-positive frequency ratio {value} at index {index}")]
    NonPositiveRatio { index: usize, value: f64 },

    /// Undoing a modulation divides by the modulator's ratio and phase.
    #[error("cannot demodulate by ratio {ratio} and phase {phase}")]
    DegenerateModulator { ratio: f64, phase: f64 },

    /// A node ID that does not belong to the tree being walked.
    #[error("node {id} is not in this tree of {len} nodes")]
    UnknownNode { id: u32, len: usize },

    #[error(transparent)]
    Lfsr(#[from] LfsrError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetarithmsError>;

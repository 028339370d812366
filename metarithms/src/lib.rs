// Metarithms: algorithmic pitch and rhythm material.
//
// A melodic-rhythmic event is a single complex number: its magnitude is a
// frequency ratio and its angle is a normalized duration. Pitches come from
// interval tables through modular scale-degree lookup; events nest into
// hierarchical trees whose values can be recoded relative to their ancestors.
//
// Architecture:
// - tables.rs: Interval constants, scale/chord registry, modular degree lookup
// - codec.rs: Complex pitch-duration coding (ratios + phases <-> complex)
// - phase.rs: Rhythmic phase offset and phase scaling
// - tree.rs: Arena event tree with relative/absolute recoding walks
// - combinatorics.rs: k-subsets for voicing search, selection, interleaving
// - config.rs: JSON composition requests
// - compose.rs: Config-driven pipeline from table + pattern to encoded line
// - error.rs: Error kinds shared by all of the above
//
// Deterministic sequences come from the `metarithms_lfsr` crate.
//
// Rendering (notation, playback, plotting, synthesis) is left to consumers of
// `ComplexSequence`, `(ratios, phases)` pairs, `EventTree`, and the
// serializable `Composition`.

pub mod codec;
pub mod combinatorics;
pub mod compose;
pub mod config;
pub mod error;
pub mod phase;
pub mod tables;
pub mod tree;

pub use codec::{ComplexEvent, ComplexSequence};
pub use compose::{Composition, compose};
pub use config::ComposeConfig;
pub use error::{MetarithmsError, Result};
pub use metarithms_lfsr::{Lfsr, LfsrError, lfsr, mls};
pub use tables::{TableRef, lookup};
pub use tree::{Accumulator, EventTree, NodeId};

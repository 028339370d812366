// Maximal-length sequence generator.
//
// Implements a Galois-style linear-feedback shift register. The feedback mask
// doubles as the register's width marker: its highest set bit sits one place
// above the register, so a mask of `0b1000_0011` (x^7 + x + 1) drives a 7-bit
// register. Each step shifts the register left, reads the bit that was pushed
// into the marker position, and when that bit is set XORs the mask back in,
// which also clears the marker bit and keeps the register within its width.
//
// With a primitive feedback polynomial and a nonzero seed the register walks
// through all `2^n - 1` nonzero states before repeating. Non-primitive masks
// still produce a deterministic cycle, just a shorter one; `period_within()`
// and `is_maximal()` let callers check which case they have.
//
// The generator is an unbounded, pull-based `Iterator`: callers take as many
// `(feedback_bit, register)` pairs as they need. `mls()` materializes a prefix,
// `bits()` and `bytes()` adapt the stream for rhythmic gating and byte-wide
// pattern sources.
//
// **Critical constraint: determinism.** Output depends only on the seed and
// mask. Integer arithmetic only; no floating point, no OS entropy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a seed/mask pair cannot drive a register.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LfsrError {
    /// The mask needs at least one bit above bit 0 to define a register.
    #[error("feedback mask {mask:#b} defines a zero-width register")]
    MaskTooNarrow { mask: u64 },
    /// A zero register is a fixed point of the feedback step.
    #[error("seed {seed:#b} has no set bits within the {width}-bit register")]
    ZeroSeed { seed: u64, width: u32 },
}

/// A linear-feedback shift register.
///
/// The register is always strictly below `2^width`. Serializable so a
/// partially consumed stream can be saved and resumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lfsr {
    register: u64,
    mask: u64,
    width: u32,
}

impl Lfsr {
    /// Create a register from a seed and a feedback mask.
    ///
    /// The register width is `bit_length(mask) - 1`. Seed bits at or above
    /// the width are dropped; if nothing is left the seed is rejected.
    pub fn new(seed: u64, mask: u64) -> Result<Self, LfsrError> {
        if mask < 2 {
            return Err(LfsrError::MaskTooNarrow { mask });
        }
        let width = 63 - mask.leading_zeros();
        let register = seed & low_bits(width);
        if register != seed {
            tracing::warn!(
                seed,
                register,
                width,
                "lfsr seed truncated to register width"
            );
        }
        if register == 0 {
            return Err(LfsrError::ZeroSeed { seed, width });
        }
        Ok(Self {
            register,
            mask,
            width,
        })
    }

    /// Register width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// The current register contents.
    pub fn register(&self) -> u64 {
        self.register
    }

    /// Advance one step, returning the feedback bit and the new register.
    pub fn step(&mut self) -> (bool, u64) {
        // width <= 63, so the shifted register still fits in a u64.
        let shifted = self.register << 1;
        let feedback = (shifted >> self.width) & 1 == 1;
        self.register = if feedback {
            shifted ^ self.mask
        } else {
            shifted
        };
        (feedback, self.register)
    }

    /// Length of the longest possible cycle, `2^width - 1`.
    pub fn max_period(&self) -> u64 {
        low_bits(self.width)
    }

    /// Number of steps until the register returns to its current value, or
    /// `None` if that takes more than `limit` steps.
    ///
    /// Walks the cycle on a copy, so the cost is linear in the period.
    pub fn period_within(&self, limit: u64) -> Option<u64> {
        let start = self.register;
        let mut probe = self.clone();
        (1..=limit).find(|_| probe.step().1 == start)
    }

    /// True if the mask produces a full-period sequence from this state.
    ///
    /// Only practical for narrow registers: it walks the entire cycle.
    pub fn is_maximal(&self) -> bool {
        let max = self.max_period();
        self.period_within(max) == Some(max)
    }

    /// Adapt the stream to yield only feedback bits.
    pub fn bits(self) -> Bits {
        Bits(self)
    }

    /// Adapt the stream to yield bytes, each packing eight consecutive
    /// feedback bits, first bit in the most significant position.
    pub fn bytes(self) -> Bytes {
        Bytes(self)
    }
}

impl Iterator for Lfsr {
    type Item = (bool, u64);

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.step())
    }
}

/// Feedback-bit view of an [`Lfsr`].
#[derive(Clone, Debug)]
pub struct Bits(Lfsr);

impl Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        Some(self.0.step().0)
    }
}

/// Byte-wide view of an [`Lfsr`].
#[derive(Clone, Debug)]
pub struct Bytes(Lfsr);

impl Iterator for Bytes {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let byte = (0..8).fold(0u8, |acc, _| (acc << 1) | u8::from(self.0.step().0));
        Some(byte)
    }
}

/// Shorthand for [`Lfsr::new`].
pub fn lfsr(seed: u64, mask: u64) -> Result<Lfsr, LfsrError> {
    Lfsr::new(seed, mask)
}

/// Materialize the first `count` registers of a generator.
pub fn mls<I>(count: usize, generator: I) -> Vec<u64>
where
    I: IntoIterator<Item = (bool, u64)>,
{
    generator.into_iter().take(count).map(|(_, reg)| reg).collect()
}

fn low_bits(width: u32) -> u64 {
    (1u64 << width) - 1
}

// Rhythmic transforms on complex sequences.
//
// Both operators touch only the angle of each event; magnitudes (pitches)
// pass through unchanged. Amounts are in turns, the same unit `codec` uses,
// so decoding after a transform matches transforming the decoded phases:
//
//   phases(phase_offset(x, p)) == wrap(phases(x) + p)
//   phases(phase_scale(x, s))  == wrap(phases(x) * s)

use crate::codec::{ComplexEvent, ComplexSequence, event, phase_of};
use num_complex::Complex64;
use std::f64::consts::TAU;

/// Shift every event later by `p` of a cycle.
pub fn phase_offset(seq: &[ComplexEvent], p: f64) -> ComplexSequence {
    let rotation = Complex64::from_polar(1.0, TAU * p);
    seq.iter().map(|&x| x * rotation).collect()
}

/// Stretch (`s > 1`) or compress (`s < 1`) every event's phase by `s`.
pub fn phase_scale(seq: &[ComplexEvent], s: f64) -> ComplexSequence {
    seq.iter()
        .map(|&x| event(x.norm(), s * phase_of(x)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{to_complex, to_seq, wrap_phase};

    const EPS: f64 = 1e-9;

    /// Phase distance on the circle, so 0.999999 and 0.0 count as equal.
    fn circular_gap(a: f64, b: f64) -> f64 {
        let d = wrap_phase(a - b);
        d.min(1.0 - d)
    }

    #[test]
    fn test_offset_commutes_with_decode() {
        let seq = to_complex(&[1.0, 1.25, 1.5, 2.0], Some(&[1.0, 1.0, 2.0, 4.0])).unwrap();
        let (ratios, phases) = to_seq(&seq);
        for p in [0.1, 0.5, -0.3, 1.75] {
            let (shifted_ratios, shifted) = to_seq(&phase_offset(&seq, p));
            for i in 0..seq.len() {
                assert!((shifted_ratios[i] - ratios[i]).abs() < EPS);
                assert!(circular_gap(shifted[i], wrap_phase(phases[i] + p)) < EPS);
            }
        }
    }

    #[test]
    fn test_scale_commutes_with_decode() {
        let seq = to_complex(&[1.0, 3.0, 0.5], Some(&[1.0, 2.0, 1.0])).unwrap();
        let (ratios, phases) = to_seq(&seq);
        for s in [0.5, 1.0, 1.5, 3.0] {
            let (scaled_ratios, scaled) = to_seq(&phase_scale(&seq, s));
            for i in 0..seq.len() {
                assert!((scaled_ratios[i] - ratios[i]).abs() < EPS);
                assert!(circular_gap(scaled[i], wrap_phase(phases[i] * s)) < EPS);
            }
        }
    }

    #[test]
    fn test_scale_halves_durations() {
        let seq = to_complex(&[1.0, 1.0], Some(&[1.0, 3.0])).unwrap();
        let (_, phases) = to_seq(&phase_scale(&seq, 0.5));
        assert!((phases[0] - 0.125).abs() < EPS);
        assert!((phases[1] - 0.375).abs() < EPS);
    }

    #[test]
    fn test_empty_sequences_pass_through() {
        assert!(phase_offset(&[], 0.25).is_empty());
        assert!(phase_scale(&[], 2.0).is_empty());
    }
}

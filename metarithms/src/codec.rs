// Complex pitch-duration coding.
//
// One musical event is one complex number: its magnitude is a frequency ratio
// against a reference pitch (1.0 = unison, 2.0 = an octave up) and its angle
// is a normalized duration. Phases are measured in turns throughout the crate:
// `angle = 2π · phase`, and reading a phase back folds `arg / 2π` into [0, 1]
// by adding 1 to negative values. A duration pattern is normalized to sum to 1
// before encoding, so a sequence's phases describe proportions of one cycle.
//
// The upper bound is closed: a phase of exactly 1 encodes to a full turn,
// whose rounding error lands just below the positive real axis and reads back
// as 1.0 rather than 0. Any other tiny negative angle does the same.

use crate::error::{MetarithmsError, Result};
use num_complex::Complex64;
use std::f64::consts::TAU;

/// A single pitch-duration event.
pub type ComplexEvent = Complex64;

/// An ordered run of events.
pub type ComplexSequence = Vec<ComplexEvent>;

/// Build one event from a frequency ratio and a phase in turns.
pub fn event(ratio: f64, phase: f64) -> ComplexEvent {
    Complex64::from_polar(ratio, TAU * phase)
}

/// Frequency ratio of an event.
pub fn ratio_of(event: ComplexEvent) -> f64 {
    event.norm()
}

/// Phase of an event in turns, folded into [0, 1].
///
/// An angle just below the positive real axis (such as a full turn after
/// rounding) reads back as exactly 1.0 rather than 0.
pub fn phase_of(event: ComplexEvent) -> f64 {
    let turns = event.arg() / TAU;
    if turns < 0.0 { turns + 1.0 } else { turns }
}

/// Reduce any phase to its position within one cycle.
pub fn wrap_phase(phase: f64) -> f64 {
    phase.rem_euclid(1.0)
}

/// Phases of a sequence in readable form.
pub fn relative_phase(seq: &[ComplexEvent]) -> Vec<f64> {
    seq.iter().copied().map(phase_of).collect()
}

/// Encode ratios and an optional duration pattern as a complex sequence.
///
/// Without `phases` every event gets an equal share of the cycle. With them,
/// the pattern is normalized to sum to 1 first.
pub fn to_complex(ratios: &[f64], phases: Option<&[f64]>) -> Result<ComplexSequence> {
    check_ratios(ratios)?;
    let weights = match phases {
        None => vec![1.0; ratios.len()],
        Some(phases) => {
            if phases.len() != ratios.len() {
                return Err(MetarithmsError::ShapeMismatch {
                    expected: ratios.len(),
                    found: phases.len(),
                });
            }
            phases.to_vec()
        }
    };
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() {
            return Err(MetarithmsError::NonFinitePhase { index, value });
        }
        if value < 0.0 {
            return Err(MetarithmsError::NegativePhase { index, value });
        }
    }
    if ratios.is_empty() {
        return Ok(Vec::new());
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(MetarithmsError::EmptyPhase);
    }
    if !total.is_finite() {
        return Err(MetarithmsError::PhaseSumOverflow { total });
    }
    Ok(ratios
        .iter()
        .zip(&weights)
        .map(|(&ratio, &weight)| event(ratio, weight / total))
        .collect())
}

/// Decode a complex sequence into its ratios and phases, each phase folded
/// into [0, 1] as by [`phase_of`].
pub fn to_seq(seq: &[ComplexEvent]) -> (Vec<f64>, Vec<f64>) {
    seq.iter()
        .map(|&event| (ratio_of(event), phase_of(event)))
        .unzip()
}

/// Equal-tempered chromatic degrees to frequency ratios: `2^(d/12)`.
pub fn to_ratios(degrees: &[f64]) -> Vec<f64> {
    degrees.iter().map(|&d| (d / 12.0).exp2()).collect()
}

/// Integer semitone offsets (as produced by `lookup`) to frequency ratios.
pub fn from_semitones(semitones: &[i64]) -> Vec<f64> {
    semitones.iter().map(|&s| (s as f64 / 12.0).exp2()).collect()
}

/// Frequency ratios to chromatic degree distances, `|12 · log2(r)|`.
///
/// Direction is discarded: a fifth above and a fifth below both read as 7.
pub fn to_degrees(ratios: &[f64]) -> Result<Vec<f64>> {
    Ok(to_signed_degrees(ratios)?.into_iter().map(f64::abs).collect())
}

/// Frequency ratios to signed chromatic degrees, the exact inverse of
/// [`to_ratios`].
pub fn to_signed_degrees(ratios: &[f64]) -> Result<Vec<f64>> {
    check_ratios(ratios)?;
    Ok(ratios.iter().map(|&r| r.log2() * 12.0).collect())
}

fn check_ratios(ratios: &[f64]) -> Result<()> {
    match ratios
        .iter()
        .enumerate()
        .find(|&(_, &r)| !(r > 0.0 && r.is_finite()))
    {
        Some((index, &value)) => Err(MetarithmsError::NonPositiveRatio { index, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_uniform_phases() {
        let seq = to_complex(&[1.0, 1.5, 2.0, 0.5], None).unwrap();
        let (ratios, phases) = to_seq(&seq);
        assert_close(&ratios, &[1.0, 1.5, 2.0, 0.5]);
        assert_close(&phases, &[0.25; 4]);
    }

    #[test]
    fn test_phase_normalization() {
        let seq = to_complex(&[1.0, 2.0, 3.0], Some(&[1.0, 2.0, 5.0])).unwrap();
        let (_, phases) = to_seq(&seq);
        assert_close(&phases, &[0.125, 0.25, 0.625]);
        // Past the half-turn the raw angle is negative; it must fold back.
        assert!(seq[2].arg() < 0.0);
    }

    #[test]
    fn test_single_event_reads_full_cycle() {
        let seq = to_complex(&[2.0], None).unwrap();
        let (ratios, phases) = to_seq(&seq);
        assert_close(&ratios, &[2.0]);
        assert_close(&phases, &[1.0]);
    }

    #[test]
    fn test_zero_phase_stays_zero() {
        let seq = to_complex(&[1.0, 1.0], Some(&[0.0, 3.0])).unwrap();
        assert_eq!(phase_of(seq[0]), 0.0);
    }

    #[test]
    fn test_codec_errors() {
        assert!(matches!(
            to_complex(&[1.0, 2.0], Some(&[1.0])),
            Err(MetarithmsError::ShapeMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            to_complex(&[1.0, 2.0], Some(&[0.0, 0.0])),
            Err(MetarithmsError::EmptyPhase)
        ));
        assert!(matches!(
            to_complex(&[1.0, 2.0], Some(&[1.0, -1.0])),
            Err(MetarithmsError::NegativePhase { index: 1, .. })
        ));
        assert!(matches!(
            to_complex(&[1.0, 0.0], None),
            Err(MetarithmsError::NonPositiveRatio { index: 1, .. })
        ));
        assert!(to_complex(&[], None).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_weights_rejected() {
        assert!(matches!(
            to_complex(&[1.0, 2.0], Some(&[f64::NAN, 1.0])),
            Err(MetarithmsError::NonFinitePhase { index: 0, .. })
        ));
        assert!(matches!(
            to_complex(&[1.0, 2.0], Some(&[1.0, f64::INFINITY])),
            Err(MetarithmsError::NonFinitePhase { index: 1, .. })
        ));
        assert!(matches!(
            to_complex(&[1.0], Some(&[f64::NEG_INFINITY])),
            Err(MetarithmsError::NonFinitePhase { index: 0, .. })
        ));
        // Each weight is finite but the sum is not.
        assert!(matches!(
            to_complex(&[1.0, 2.0], Some(&[f64::MAX, f64::MAX])),
            Err(MetarithmsError::PhaseSumOverflow { .. })
        ));
    }

    #[test]
    fn test_phase_of_range_includes_one() {
        assert_eq!(phase_of(event(1.0, -1e-18)), 1.0);
        assert_eq!(phase_of(event(1.0, 0.0)), 0.0);
        let seq = to_complex(&[1.0, 1.0, 1.0], Some(&[1.0, 1.0, 2.0])).unwrap();
        assert_eq!(relative_phase(&seq), to_seq(&seq).1);
        let phases = relative_phase(&seq);
        assert!((phases[2] - 0.5).abs() < EPS);
        assert!(phases.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_ratio_degree_conversions() {
        assert_close(&to_ratios(&[0.0, 12.0, 7.0, -12.0]), &[1.0, 2.0, 1.4983070768766815, 0.5]);
        assert_close(&from_semitones(&[0, 12, 24]), &[1.0, 2.0, 4.0]);
        assert_close(&to_degrees(&[2.0, 0.5]).unwrap(), &[12.0, 12.0]);
        assert_close(&to_signed_degrees(&[2.0, 0.5]).unwrap(), &[12.0, -12.0]);
        assert!(matches!(
            to_degrees(&[1.0, -2.0]),
            Err(MetarithmsError::NonPositiveRatio { index: 1, .. })
        ));
    }

    #[test]
    fn test_wrap_phase() {
        assert!((wrap_phase(1.25) - 0.25).abs() < EPS);
        assert!((wrap_phase(-0.25) - 0.75).abs() < EPS);
        assert_eq!(wrap_phase(0.5), 0.5);
    }
}

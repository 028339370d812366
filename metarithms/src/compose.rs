// Composition pipeline: config in, encoded melody out.
//
// Stages, in order:
//   1. resolve the degree pattern (explicit, or LFSR registers mod `degrees`)
//   2. look the pattern up in the table, transposed by `shift`
//   3. semitones to frequency ratios
//   4. resolve the rhythm weights (uniform, explicit, or LFSR-gated)
//   5. encode as a complex sequence
//   6. `phase_scale`, then `phase_offset`
//   7. decode back to readable ratios and phases
//
// The output keeps both forms so downstream renderers can use whichever they
// prefer.

use crate::codec::{ComplexSequence, from_semitones, to_complex, to_seq};
use crate::config::{ComposeConfig, PatternSource, RhythmSource};
use crate::error::Result;
use crate::phase::{phase_offset, phase_scale};
use crate::tables::{TableRef, lookup};
use metarithms_lfsr::{lfsr, mls};
use serde::{Deserialize, Serialize};

/// A finished melodic line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Semitone offsets from the reference pitch.
    pub pitches: Vec<i64>,
    pub ratios: Vec<f64>,
    /// Decoded phases in turns, after both phase transforms.
    pub phases: Vec<f64>,
    pub sequence: ComplexSequence,
}

/// Run the full pipeline for one request.
pub fn compose(config: &ComposeConfig) -> Result<Composition> {
    let table = config.table.table_ref();
    let pattern = resolve_pattern(&config.pattern, table)?;
    let pitches = lookup(table, &pattern, config.shift)?;
    tracing::debug!(events = pitches.len(), "pitches resolved");

    let weights = rhythm_weights(&config.rhythm, pitches.len())?;
    let encoded = to_complex(&from_semitones(&pitches), weights.as_deref())?;
    let sequence = phase_offset(
        &phase_scale(&encoded, config.phase_scale),
        config.phase_offset,
    );
    let (ratios, phases) = to_seq(&sequence);
    tracing::info!(events = sequence.len(), "composition complete");

    Ok(Composition {
        pitches,
        ratios,
        phases,
        sequence,
    })
}

fn resolve_pattern(source: &PatternSource, table: TableRef<'_>) -> Result<Vec<i64>> {
    match source {
        PatternSource::Explicit(pattern) => Ok(pattern.clone()),
        &PatternSource::Lfsr {
            seed,
            mask,
            count,
            degrees,
        } => {
            let degrees = match degrees {
                Some(degrees) => degrees.get(),
                None => table.resolve()?.len().saturating_sub(1).max(1) as u64,
            };
            let registers = mls(count, lfsr(seed, mask)?);
            Ok(registers.iter().map(|&r| (r % degrees) as i64).collect())
        }
    }
}

/// `None` means uniform durations.
fn rhythm_weights(source: &RhythmSource, events: usize) -> Result<Option<Vec<f64>>> {
    match source {
        RhythmSource::Uniform => Ok(None),
        RhythmSource::Explicit(weights) => Ok(Some(weights.clone())),
        &RhythmSource::Lfsr {
            seed,
            mask,
            long,
            short,
        } => {
            let gates = lfsr(seed, mask)?.bits().take(events);
            Ok(Some(
                gates.map(|bit| if bit { long } else { short }).collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableSpec;
    use crate::error::MetarithmsError;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_config_plays_major_scale() {
        let piece = compose(&ComposeConfig::default()).unwrap();
        assert_eq!(piece.pitches, vec![0, 2, 4, 5, 7, 9, 11, 12]);
        assert!((piece.ratios[7] - 2.0).abs() < EPS);
        for &phase in &piece.phases {
            assert!((phase - 0.125).abs() < EPS);
        }
    }

    #[test]
    fn test_shift_and_chord_table() {
        let config = ComposeConfig {
            table: TableSpec::Chord("min".into()),
            pattern: PatternSource::Explicit(vec![0, 1, 2, 3]),
            shift: -1,
            ..Default::default()
        };
        let piece = compose(&config).unwrap();
        // Triad tables span a fifth, so index 2 wraps to the root a fifth up.
        assert_eq!(piece.pitches, vec![-4, 0, 3, 7]);
    }

    #[test]
    fn test_lfsr_pattern_stays_in_one_octave() {
        let config = ComposeConfig {
            pattern: PatternSource::Lfsr {
                seed: 73,
                mask: 0b1000_0011,
                count: 32,
                degrees: None,
            },
            ..Default::default()
        };
        let piece = compose(&config).unwrap();
        assert_eq!(piece.pitches.len(), 32);
        assert!(piece.pitches.iter().all(|&p| (0..12).contains(&p)));
        // Same seed, same melody.
        assert_eq!(compose(&config).unwrap(), piece);
    }

    #[test]
    fn test_lfsr_rhythm_uses_long_and_short() {
        let config = ComposeConfig {
            rhythm: RhythmSource::Lfsr {
                seed: 0b101,
                mask: 0b1011,
                long: 3.0,
                short: 1.0,
            },
            ..Default::default()
        };
        let piece = compose(&config).unwrap();
        // Feedback bits from seed 5, mask 0b1011: 1, 0, 0, 1, 0, 1, 1, 1.
        let total = 3.0 + 1.0 + 1.0 + 3.0 + 1.0 + 3.0 + 3.0 + 3.0;
        assert!((piece.phases[0] - 3.0 / total).abs() < EPS);
        assert!((piece.phases[1] - 1.0 / total).abs() < EPS);
        assert!((piece.phases[3] - 3.0 / total).abs() < EPS);
    }

    #[test]
    fn test_phase_transforms_apply_in_order() {
        let config = ComposeConfig {
            pattern: PatternSource::Explicit(vec![0, 4]),
            phase_scale: 0.5,
            phase_offset: 0.25,
            ..Default::default()
        };
        let piece = compose(&config).unwrap();
        // Each event starts at 0.5, scales to 0.25, then shifts to 0.5.
        for &phase in &piece.phases {
            assert!((phase - 0.5).abs() < EPS);
        }
    }

    #[test]
    fn test_errors_propagate() {
        let bad_table = ComposeConfig {
            table: TableSpec::Scale("lydian".into()),
            ..Default::default()
        };
        assert!(matches!(
            compose(&bad_table),
            Err(MetarithmsError::UnknownTable { .. })
        ));

        let short_rhythm = ComposeConfig {
            rhythm: RhythmSource::Explicit(vec![1.0, 2.0]),
            ..Default::default()
        };
        assert!(matches!(
            compose(&short_rhythm),
            Err(MetarithmsError::ShapeMismatch { expected: 8, found: 2 })
        ));

        let zero_seed = ComposeConfig {
            pattern: PatternSource::Lfsr {
                seed: 0b1000,
                mask: 0b1011,
                count: 4,
                degrees: None,
            },
            ..Default::default()
        };
        assert!(matches!(compose(&zero_seed), Err(MetarithmsError::Lfsr(_))));
    }
}

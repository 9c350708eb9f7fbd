//! Weight and height conversion between imperial and metric units.
//!
//! Every conversion rounds to one decimal place. Converting a value and
//! converting it back does not always reproduce the original: 150 lbs
//! becomes 68.0 kg, which converts back to 149.9 lbs, so toggling the unit
//! preference repeatedly drifts stored values.
//!
//! Non-finite input is passed through unchanged by the arithmetic (NaN in,
//! NaN out); the workout log rejects such values before they are stored.

use crate::{Profile, UnitSystem, WorkoutEntry};

const KG_PER_LB: f64 = 0.453592;
const LB_PER_KG: f64 = 2.20462;
const CM_PER_IN: f64 = 2.54;
const IN_PER_CM: f64 = 0.393701;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn pounds_to_kilograms(lbs: f64) -> f64 {
    round_tenth(lbs * KG_PER_LB)
}

pub fn kilograms_to_pounds(kg: f64) -> f64 {
    round_tenth(kg * LB_PER_KG)
}

pub fn inches_to_centimeters(inches: f64) -> f64 {
    round_tenth(inches * CM_PER_IN)
}

pub fn centimeters_to_inches(cm: f64) -> f64 {
    round_tenth(cm * IN_PER_CM)
}

/// Convert a weight that is currently expressed in the other system into `target`
pub fn convert_weight(weight: f64, target: UnitSystem) -> f64 {
    match target {
        UnitSystem::Metric => pounds_to_kilograms(weight),
        UnitSystem::Imperial => kilograms_to_pounds(weight),
    }
}

/// Convert a height that is currently expressed in the other system into `target`
pub fn convert_height(height: f64, target: UnitSystem) -> f64 {
    match target {
        UnitSystem::Metric => inches_to_centimeters(height),
        UnitSystem::Imperial => centimeters_to_inches(height),
    }
}

/// Rewrite every entry's weight into `target` units, recomputing volume
pub fn convert_log(entries: &mut [WorkoutEntry], target: UnitSystem) {
    for entry in entries.iter_mut() {
        let converted = convert_weight(entry.weight, target);
        entry.set_weight(converted);
    }
    tracing::debug!("Converted {} workout entries to {}", entries.len(), target);
}

/// Rewrite the profile's body measurements into `target` units
pub fn convert_profile(profile: &mut Profile, target: UnitSystem) {
    profile.weight = profile.weight.map(|w| convert_weight(w, target));
    profile.height = profile.height.map(|h| convert_height(h, target));
}

pub fn format_weight(weight: f64, units: UnitSystem) -> String {
    format!("{} {}", weight, units.weight_label())
}

pub fn format_height(height: f64, units: UnitSystem) -> String {
    format!("{} {}", height, units.height_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(weight: f64, sets: u32, reps: u32) -> WorkoutEntry {
        WorkoutEntry {
            id: Uuid::now_v7(),
            exercise: "Bench Press".into(),
            weight,
            sets,
            reps,
            notes: None,
            timestamp: Utc::now(),
            volume: WorkoutEntry::compute_volume(weight, sets, reps),
        }
    }

    #[test]
    fn test_basic_conversions() {
        assert_eq!(pounds_to_kilograms(200.0), 90.7);
        assert_eq!(kilograms_to_pounds(100.0), 220.5);
        assert_eq!(inches_to_centimeters(70.0), 177.8);
        assert_eq!(centimeters_to_inches(177.8), 70.0);
    }

    #[test]
    fn test_round_trip_is_lossy() {
        // 200 lbs survives the trip back...
        let kg = pounds_to_kilograms(200.0);
        assert_eq!(kg, 90.7);
        assert_eq!(kilograms_to_pounds(kg), 200.0);

        // ...but 150 lbs drifts by a tenth.
        let kg = pounds_to_kilograms(150.0);
        assert_eq!(kg, 68.0);
        assert_eq!(kilograms_to_pounds(kg), 149.9);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(pounds_to_kilograms(f64::NAN).is_nan());
        assert!(centimeters_to_inches(f64::NAN).is_nan());
    }

    #[test]
    fn test_convert_log_keeps_volume_invariant() {
        let mut log = vec![entry(135.0, 3, 10), entry(225.0, 5, 5)];
        convert_log(&mut log, UnitSystem::Metric);

        assert_eq!(log[0].weight, 61.2);
        assert_eq!(log[1].weight, 102.1);
        for e in &log {
            assert_eq!(e.volume, e.weight * e.sets as f64 * e.reps as f64);
        }

        convert_log(&mut log, UnitSystem::Imperial);
        for e in &log {
            assert_eq!(e.volume, e.weight * e.sets as f64 * e.reps as f64);
        }
    }

    #[test]
    fn test_convert_profile() {
        let mut profile = Profile {
            height: Some(70.0),
            weight: Some(180.0),
            ..Profile::default()
        };
        convert_profile(&mut profile, UnitSystem::Metric);
        assert_eq!(profile.height, Some(177.8));
        assert_eq!(profile.weight, Some(81.6));

        let mut empty = Profile::default();
        convert_profile(&mut empty, UnitSystem::Metric);
        assert_eq!(empty, Profile::default());
    }

    #[test]
    fn test_format_with_units() {
        assert_eq!(format_weight(90.7, UnitSystem::Metric), "90.7 kg");
        assert_eq!(format_height(70.0, UnitSystem::Imperial), "70 in");
    }
}

//! Chart-ready series: strength over time per exercise and volume per day.

use crate::WorkoutEntry;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Selection applied before building chart series
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartFilter {
    /// Exact exercise name, or `None` for every exercise
    pub exercise: Option<String>,
    /// Trailing window in days, or `None` for all time
    pub days: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeightPoint {
    pub at: DateTime<Utc>,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrengthSeries {
    pub exercise: String,
    pub points: Vec<WeightPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub volume: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub strength: Vec<StrengthSeries>,
    pub volume: Vec<VolumePoint>,
}

/// Build both chart series from the log
///
/// Strength series are limited to the first `exercise_limit` exercise names
/// encountered in log order (not the heaviest or most recent ones). Each
/// series and the volume series are sorted chronologically.
pub fn chart_series(
    log: &[WorkoutEntry],
    filter: &ChartFilter,
    now: DateTime<Utc>,
    exercise_limit: usize,
) -> ChartSeries {
    let cutoff = filter.days.map(|d| now - Duration::days(i64::from(d)));

    let selected: Vec<&WorkoutEntry> = log
        .iter()
        .filter(|e| filter.exercise.as_deref().map_or(true, |name| e.exercise == name))
        .filter(|e| cutoff.map_or(true, |c| e.timestamp >= c))
        .collect();

    ChartSeries {
        strength: strength_series(&selected, exercise_limit),
        volume: volume_series(&selected),
    }
}

fn strength_series(entries: &[&WorkoutEntry], exercise_limit: usize) -> Vec<StrengthSeries> {
    let mut series: Vec<StrengthSeries> = Vec::new();

    for entry in entries {
        let point = WeightPoint {
            at: entry.timestamp,
            weight: entry.weight,
        };
        match series.iter_mut().find(|s| s.exercise == entry.exercise) {
            Some(existing) => existing.points.push(point),
            None => series.push(StrengthSeries {
                exercise: entry.exercise.clone(),
                points: vec![point],
            }),
        }
    }

    series.truncate(exercise_limit);
    for s in &mut series {
        s.points.sort_by_key(|p| p.at);
    }
    series
}

fn volume_series(entries: &[&WorkoutEntry]) -> Vec<VolumePoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        *by_date.entry(entry.local_date()).or_insert(0.0) += entry.volume;
    }

    by_date
        .into_iter()
        .map(|(date, volume)| VolumePoint { date, volume })
        .collect()
}

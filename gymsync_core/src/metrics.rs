//! Derived statistics computed from the workout log.
//!
//! Nothing here is stored; every figure is recomputed from the log on
//! demand. Calendar-day grouping uses the local time zone.

use crate::{UnitSystem, WorkoutEntry};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How far back the streak walk looks
pub const STREAK_WINDOW_DAYS: u64 = 30;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    pub entries: usize,
    pub total_sets: u32,
    pub unique_exercises: usize,
}

/// Summary of everything logged on the local calendar day `today`
pub fn today_summary(log: &[WorkoutEntry], today: NaiveDate) -> TodaySummary {
    let todays: Vec<&WorkoutEntry> = log.iter().filter(|e| e.local_date() == today).collect();

    TodaySummary {
        entries: todays.len(),
        total_sets: todays.iter().map(|e| e.sets).sum(),
        unique_exercises: todays
            .iter()
            .map(|e| e.exercise.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

/// Consecutive active days counted backward from `today`
///
/// A missing entry today does not end the streak: today is simply not
/// counted and the walk continues from yesterday. Any later gap stops it.
pub fn current_streak(log: &[WorkoutEntry], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = log.iter().map(|e| e.local_date()).collect();
    let mut streak = 0;

    for offset in 0..STREAK_WINDOW_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        if active.contains(&day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }

    streak
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonalRecord {
    pub exercise: String,
    pub weight: f64,
}

/// Heaviest logged weight per exercise name, in first-logged order
pub fn personal_records(log: &[WorkoutEntry]) -> Vec<PersonalRecord> {
    let mut records: Vec<PersonalRecord> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in log {
        match index.get(entry.exercise.as_str()) {
            Some(&i) => {
                if entry.weight > records[i].weight {
                    records[i].weight = entry.weight;
                }
            }
            None => {
                index.insert(entry.exercise.as_str(), records.len());
                records.push(PersonalRecord {
                    exercise: entry.exercise.clone(),
                    weight: entry.weight,
                });
            }
        }
    }

    records
}

/// Badges earned from entry count and cumulative volume
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstWorkout,
    TenWorkouts,
    FiftyWorkouts,
    CenturyClub,
    VolumeClub,
    VolumeBeast,
}

const COUNT_BADGES: [(usize, Achievement); 4] = [
    (1, Achievement::FirstWorkout),
    (10, Achievement::TenWorkouts),
    (50, Achievement::FiftyWorkouts),
    (100, Achievement::CenturyClub),
];

impl Achievement {
    /// Cumulative-volume checkpoint in the given unit system
    ///
    /// The two systems share the same physical checkpoints (10k and 50k
    /// pounds); the metric figures are fixed, not derived at runtime.
    pub fn volume_threshold(self, units: UnitSystem) -> Option<f64> {
        match (self, units) {
            (Achievement::VolumeClub, UnitSystem::Imperial) => Some(10_000.0),
            (Achievement::VolumeClub, UnitSystem::Metric) => Some(4_536.0),
            (Achievement::VolumeBeast, UnitSystem::Imperial) => Some(50_000.0),
            (Achievement::VolumeBeast, UnitSystem::Metric) => Some(22_680.0),
            _ => None,
        }
    }

    pub fn title(self, units: UnitSystem) -> &'static str {
        match (self, units) {
            (Achievement::FirstWorkout, _) => "First Workout Logged",
            (Achievement::TenWorkouts, _) => "10 Workouts Completed",
            (Achievement::FiftyWorkouts, _) => "50 Workouts Milestone",
            (Achievement::CenturyClub, _) => "Century Club",
            (Achievement::VolumeClub, UnitSystem::Imperial) => "10K Volume Club",
            (Achievement::VolumeClub, UnitSystem::Metric) => "4.5K Volume Club",
            (Achievement::VolumeBeast, UnitSystem::Imperial) => "50K Volume Beast",
            (Achievement::VolumeBeast, UnitSystem::Metric) => "22K Volume Beast",
        }
    }
}

pub fn total_volume(log: &[WorkoutEntry]) -> f64 {
    log.iter().map(|e| e.volume).sum()
}

pub fn achievements(log: &[WorkoutEntry], units: UnitSystem) -> Vec<Achievement> {
    let mut earned: Vec<Achievement> = COUNT_BADGES
        .iter()
        .filter(|(count, _)| log.len() >= *count)
        .map(|(_, badge)| *badge)
        .collect();

    let volume = total_volume(log);
    for badge in [Achievement::VolumeClub, Achievement::VolumeBeast] {
        if let Some(threshold) = badge.volume_threshold(units) {
            if volume >= threshold {
                earned.push(badge);
            }
        }
    }

    earned
}

/// Everything shown on the statistics page
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statistics {
    pub total_workouts: usize,
    pub max_volume: f64,
    pub total_volume: f64,
    pub current_streak: u32,
    pub personal_records: Vec<PersonalRecord>,
    pub achievements: Vec<Achievement>,
    /// Distinct exercise names in first-logged order
    pub exercises: Vec<String>,
}

impl Statistics {
    pub fn personal_record_count(&self) -> usize {
        self.personal_records.len()
    }
}

pub fn statistics(log: &[WorkoutEntry], today: NaiveDate, units: UnitSystem) -> Statistics {
    let personal_records = personal_records(log);
    let exercises = personal_records.iter().map(|r| r.exercise.clone()).collect();

    Statistics {
        total_workouts: log.len(),
        max_volume: log.iter().map(|e| e.volume).fold(0.0, f64::max),
        total_volume: total_volume(log),
        current_streak: current_streak(log, today),
        personal_records,
        achievements: achievements(log, units),
        exercises,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub workouts: usize,
    pub sets: u32,
    pub weekly_average: u32,
}

/// Activity in the local calendar month containing `today`
pub fn monthly_summary(log: &[WorkoutEntry], today: NaiveDate) -> MonthlySummary {
    let this_month: Vec<&WorkoutEntry> = log
        .iter()
        .filter(|e| {
            let date = e.local_date();
            date.month() == today.month() && date.year() == today.year()
        })
        .collect();

    MonthlySummary {
        workouts: this_month.len(),
        sets: this_month.iter().map(|e| e.sets).sum(),
        weekly_average: (this_month.len() as f64 / 4.0).round() as u32,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::WorkoutEntry;
    use chrono::{Local, NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    /// Entry stamped at local noon on `date`
    pub fn entry_on(date: NaiveDate, exercise: &str, weight: f64, sets: u32, reps: u32) -> WorkoutEntry {
        let local_noon = date.and_hms_opt(12, 0, 0).unwrap();
        let timestamp = Local
            .from_local_datetime(&local_noon)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        WorkoutEntry {
            id: Uuid::now_v7(),
            exercise: exercise.into(),
            weight,
            sets,
            reps,
            notes: None,
            timestamp,
            volume: WorkoutEntry::compute_volume(weight, sets, reps),
        }
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{day, entry_on};
    use super::*;

    #[test]
    fn test_today_summary_counts_calendar_day() {
        let today = day(2024, 6, 15);
        let log = vec![
            entry_on(today, "Squat", 225.0, 5, 5),
            entry_on(today, "Squat", 235.0, 3, 5),
            entry_on(today, "Bench", 185.0, 4, 8),
            entry_on(day(2024, 6, 14), "Row", 135.0, 3, 10),
        ];

        let summary = today_summary(&log, today);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.total_sets, 12);
        assert_eq!(summary.unique_exercises, 2);
    }

    #[test]
    fn test_streak_today_and_yesterday() {
        let today = day(2024, 6, 15);
        let log = vec![
            entry_on(today, "Squat", 100.0, 1, 1),
            entry_on(day(2024, 6, 14), "Squat", 100.0, 1, 1),
        ];
        assert_eq!(current_streak(&log, today), 2);
    }

    #[test]
    fn test_streak_gap_today_not_fatal() {
        let today = day(2024, 6, 15);
        let log = vec![entry_on(day(2024, 6, 14), "Squat", 100.0, 1, 1)];
        assert_eq!(current_streak(&log, today), 1);
    }

    #[test]
    fn test_streak_gap_yesterday_breaks() {
        let today = day(2024, 6, 15);
        let log = vec![
            entry_on(today, "Squat", 100.0, 1, 1),
            entry_on(day(2024, 6, 13), "Squat", 100.0, 1, 1),
        ];
        assert_eq!(current_streak(&log, today), 1);
    }

    #[test]
    fn test_streak_capped_at_window() {
        let today = day(2024, 6, 30);
        let log: Vec<_> = (0..40)
            .map(|i| entry_on(today - chrono::Duration::days(i), "Run", 1.0, 1, 1))
            .collect();
        assert_eq!(current_streak(&log, today), 30);
        assert_eq!(current_streak(&[], today), 0);
    }

    #[test]
    fn test_personal_records_first_seen_order() {
        let d = day(2024, 6, 15);
        let log = vec![
            entry_on(d, "Squat", 225.0, 1, 1),
            entry_on(d, "Bench", 185.0, 1, 1),
            entry_on(d, "Squat", 245.0, 1, 1),
            entry_on(d, "Bench", 175.0, 1, 1),
        ];

        let records = personal_records(&log);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].exercise, "Squat");
        assert_eq!(records[0].weight, 245.0);
        assert_eq!(records[1].weight, 185.0);
    }

    #[test]
    fn test_volume_achievement_boundary() {
        let d = day(2024, 6, 15);
        let exactly = vec![entry_on(d, "Squat", 100.0, 10, 10)];
        let badges = achievements(&exactly, UnitSystem::Imperial);
        assert!(badges.contains(&Achievement::VolumeClub));
        assert_eq!(Achievement::VolumeClub.title(UnitSystem::Imperial), "10K Volume Club");

        let short = vec![entry_on(d, "Squat", 9_999.0, 1, 1)];
        let badges = achievements(&short, UnitSystem::Imperial);
        assert!(!badges.contains(&Achievement::VolumeClub));
        assert_eq!(badges, vec![Achievement::FirstWorkout]);
    }

    #[test]
    fn test_metric_thresholds_are_fixed_checkpoints() {
        let d = day(2024, 6, 15);
        let log = vec![entry_on(d, "Squat", 4_536.0, 1, 1)];
        let badges = achievements(&log, UnitSystem::Metric);
        assert!(badges.contains(&Achievement::VolumeClub));
        assert!(!badges.contains(&Achievement::VolumeBeast));
        assert_eq!(Achievement::VolumeClub.title(UnitSystem::Metric), "4.5K Volume Club");

        // The same number in pounds is nowhere near the imperial checkpoint
        assert!(!achievements(&log, UnitSystem::Imperial).contains(&Achievement::VolumeClub));
    }

    #[test]
    fn test_count_achievements() {
        let d = day(2024, 6, 15);
        let log: Vec<_> = (0..50).map(|_| entry_on(d, "Curl", 1.0, 1, 1)).collect();
        let badges = achievements(&log, UnitSystem::Imperial);
        assert_eq!(
            badges,
            vec![
                Achievement::FirstWorkout,
                Achievement::TenWorkouts,
                Achievement::FiftyWorkouts
            ]
        );
        assert!(achievements(&[], UnitSystem::Imperial).is_empty());
    }

    #[test]
    fn test_statistics_bundle() {
        let today = day(2024, 6, 15);
        let log = vec![
            entry_on(today, "Squat", 200.0, 5, 5),
            entry_on(day(2024, 6, 14), "Bench", 150.0, 3, 10),
        ];

        let stats = statistics(&log, today, UnitSystem::Imperial);
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.max_volume, 5_000.0);
        assert_eq!(stats.total_volume, 9_500.0);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.personal_record_count(), 2);
        assert_eq!(stats.exercises, vec!["Squat".to_string(), "Bench".to_string()]);

        let empty = statistics(&[], today, UnitSystem::Imperial);
        assert_eq!(empty.max_volume, 0.0);
    }

    #[test]
    fn test_monthly_summary() {
        let today = day(2024, 6, 15);
        let log = vec![
            entry_on(day(2024, 6, 1), "Squat", 100.0, 3, 5),
            entry_on(day(2024, 6, 10), "Squat", 100.0, 4, 5),
            entry_on(day(2024, 5, 31), "Squat", 100.0, 5, 5),
            entry_on(day(2023, 6, 10), "Squat", 100.0, 5, 5),
        ];

        let summary = monthly_summary(&log, today);
        assert_eq!(summary.workouts, 2);
        assert_eq!(summary.sets, 7);
        assert_eq!(summary.weekly_average, 1);
    }
}

//! The workout log: an append-only list of entries that can only be
//! extended or pruned by id.

use crate::{Error, NewWorkout, Result, WorkoutEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WorkoutLog {
    entries: Vec<WorkoutEntry>,
}

impl WorkoutLog {
    pub fn new(entries: Vec<WorkoutEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[WorkoutEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [WorkoutEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate and append a new entry stamped with `now`
    pub fn log(&mut self, workout: NewWorkout, now: DateTime<Utc>) -> Result<&WorkoutEntry> {
        let exercise = workout.exercise.trim();
        if exercise.is_empty() {
            return Err(Error::validation("Exercise name is required"));
        }
        if !workout.weight.is_finite() || workout.weight <= 0.0 {
            return Err(Error::validation("Weight must be a positive number"));
        }
        if workout.sets == 0 {
            return Err(Error::validation("Sets must be at least 1"));
        }
        if workout.reps == 0 {
            return Err(Error::validation("Reps must be at least 1"));
        }

        let notes = workout
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let entry = WorkoutEntry {
            id: Uuid::now_v7(),
            exercise: exercise.to_string(),
            weight: workout.weight,
            sets: workout.sets,
            reps: workout.reps,
            notes,
            timestamp: now,
            volume: WorkoutEntry::compute_volume(workout.weight, workout.sets, workout.reps),
        };

        tracing::info!(
            "Logged {} {}x{} @ {}",
            entry.exercise,
            entry.sets,
            entry.reps,
            entry.weight
        );
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove an entry by id; returns false when nothing matched
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if !removed {
            tracing::debug!("Delete ignored, no workout with id {}", id);
        }
        removed
    }

    pub fn get(&self, id: Uuid) -> Option<&WorkoutEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The last `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&WorkoutEntry> {
        self.entries.iter().rev().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout(exercise: &str, weight: f64) -> NewWorkout {
        NewWorkout {
            exercise: exercise.into(),
            weight,
            sets: 3,
            reps: 10,
            notes: None,
        }
    }

    #[test]
    fn test_log_computes_volume() {
        let mut log = WorkoutLog::default();
        let entry = log.log(workout("Squat", 185.5), Utc::now()).unwrap();
        assert_eq!(entry.volume, 185.5 * 3.0 * 10.0);
        assert_eq!(entry.volume, entry.weight * entry.sets as f64 * entry.reps as f64);
    }

    #[test]
    fn test_log_rejects_invalid_input() {
        let mut log = WorkoutLog::default();

        assert!(log.log(workout("  ", 100.0), Utc::now()).unwrap_err().is_validation());
        assert!(log.log(workout("Squat", 0.0), Utc::now()).is_err());
        assert!(log.log(workout("Squat", f64::NAN), Utc::now()).is_err());

        let mut no_sets = workout("Squat", 100.0);
        no_sets.sets = 0;
        assert!(log.log(no_sets, Utc::now()).is_err());

        let mut no_reps = workout("Squat", 100.0);
        no_reps.reps = 0;
        assert!(log.log(no_reps, Utc::now()).is_err());

        assert!(log.is_empty());
    }

    #[test]
    fn test_blank_notes_dropped() {
        let mut log = WorkoutLog::default();
        let mut w = workout("Row", 95.0);
        w.notes = Some("   ".into());
        let entry = log.log(w, Utc::now()).unwrap();
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut log = WorkoutLog::default();
        let id = log.log(workout("Deadlift", 315.0), Utc::now()).unwrap().id;

        assert!(log.delete(id));
        assert!(!log.delete(id));
        assert!(log.is_empty());
    }

    #[test]
    fn test_recent_newest_first() {
        let mut log = WorkoutLog::default();
        for i in 0..12 {
            log.log(workout(&format!("ex{}", i), 50.0), Utc::now()).unwrap();
        }

        let recent = log.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].exercise, "ex11");
        assert_eq!(recent[9].exercise, "ex2");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut log = WorkoutLog::default();
        let a = log.log(workout("A", 10.0), Utc::now()).unwrap().id;
        let b = log.log(workout("B", 10.0), Utc::now()).unwrap().id;
        assert_ne!(a, b);
    }
}

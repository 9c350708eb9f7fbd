//! Workout plan repository and the draft used to assemble a new plan.

use crate::{Error, PlanCategory, PlanExercise, Result, WorkoutPlan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rest applied when an exercise is added without a positive rest period
pub const DEFAULT_REST_SECONDS: u32 = 60;

/// Exercises collected one at a time before a plan is committed
#[derive(Clone, Debug, Default)]
pub struct PlanDraft {
    exercises: Vec<PlanExercise>,
}

impl PlanDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exercise; `rest_seconds` of `None` or 0 falls back to the default
    pub fn add_exercise(
        &mut self,
        name: &str,
        sets: u32,
        reps: u32,
        rest_seconds: Option<u32>,
    ) -> Result<&PlanExercise> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Exercise name is required"));
        }
        if sets == 0 || reps == 0 {
            return Err(Error::validation("Sets and reps must be positive"));
        }

        self.exercises.push(PlanExercise {
            name: name.to_string(),
            sets,
            reps,
            rest_seconds: rest_seconds
                .filter(|r| *r > 0)
                .unwrap_or(DEFAULT_REST_SECONDS),
        });
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    pub fn remove_exercise(&mut self, index: usize) -> Option<PlanExercise> {
        if index < self.exercises.len() {
            Some(self.exercises.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.exercises.clear();
    }

    pub fn exercises(&self) -> &[PlanExercise] {
        &self.exercises
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// All saved plans, in creation order
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PlanRepository {
    plans: Vec<WorkoutPlan>,
}

impl PlanRepository {
    pub fn new(plans: Vec<WorkoutPlan>) -> Self {
        Self { plans }
    }

    pub fn plans(&self) -> &[WorkoutPlan] {
        &self.plans
    }

    pub fn get(&self, id: Uuid) -> Option<&WorkoutPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Create a plan with a fresh id and a zero usage counter
    ///
    /// Exercises without a rest period get the default one.
    pub fn create(
        &mut self,
        name: &str,
        category: PlanCategory,
        description: Option<String>,
        exercises: Vec<PlanExercise>,
        now: DateTime<Utc>,
    ) -> Result<&WorkoutPlan> {
        let name = name.trim();
        if name.is_empty() || exercises.is_empty() {
            return Err(Error::validation(
                "Please add a plan name and at least one exercise",
            ));
        }
        if exercises
            .iter()
            .any(|e| e.name.trim().is_empty() || e.sets == 0 || e.reps == 0)
        {
            return Err(Error::validation(
                "Every exercise needs a name and positive sets and reps",
            ));
        }

        let exercises = exercises
            .into_iter()
            .map(|mut e| {
                if e.rest_seconds == 0 {
                    e.rest_seconds = DEFAULT_REST_SECONDS;
                }
                e
            })
            .collect();

        let plan = WorkoutPlan {
            id: Uuid::now_v7(),
            name: name.to_string(),
            category,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            exercises,
            created_at: now,
            times_used: 0,
        };

        tracing::info!(
            "Created plan '{}' with {} exercises",
            plan.name,
            plan.exercises.len()
        );
        self.plans.push(plan);
        Ok(&self.plans[self.plans.len() - 1])
    }

    /// Commit a draft; the draft is left untouched if the plan is rejected
    pub fn create_from_draft(
        &mut self,
        name: &str,
        category: PlanCategory,
        description: Option<String>,
        draft: &mut PlanDraft,
        now: DateTime<Utc>,
    ) -> Result<&WorkoutPlan> {
        let exercises = draft.exercises.clone();
        let created = self.create(name, category, description, exercises, now)?;
        draft.clear();
        Ok(created)
    }

    /// Remove a plan by id; returns false when nothing matched
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.plans.len();
        self.plans.retain(|p| p.id != id);
        let removed = self.plans.len() != before;
        if !removed {
            tracing::debug!("Delete ignored, no plan with id {}", id);
        }
        removed
    }

    /// Bump the usage counter; returns the new count, or `None` if absent
    pub fn record_use(&mut self, id: Uuid) -> Option<u32> {
        match self.plans.iter_mut().find(|p| p.id == id) {
            Some(plan) => {
                plan.times_used = plan.times_used.saturating_add(1);
                Some(plan.times_used)
            }
            None => {
                tracing::debug!("Usage not recorded, no plan with id {}", id);
                None
            }
        }
    }
}

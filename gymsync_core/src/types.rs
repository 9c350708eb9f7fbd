//! Core domain types for GymSync.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged workout entries
//! - Workout plans and their exercises
//! - The user profile
//! - The unit system preference

use crate::Error;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Units
// ============================================================================

/// Unit system applied to every stored weight and height
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    /// Persisted form: `true` means metric
    pub fn from_metric_flag(is_metric: bool) -> Self {
        if is_metric {
            UnitSystem::Metric
        } else {
            UnitSystem::Imperial
        }
    }

    pub fn is_metric(self) -> bool {
        self == UnitSystem::Metric
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Imperial => UnitSystem::Metric,
            UnitSystem::Metric => UnitSystem::Imperial,
        }
    }

    pub fn weight_label(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "lbs",
            UnitSystem::Metric => "kg",
        }
    }

    pub fn height_label(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "in",
            UnitSystem::Metric => "cm",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Imperial => write!(f, "Imperial"),
            UnitSystem::Metric => write!(f, "Metric"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imperial" | "lbs" => Ok(UnitSystem::Imperial),
            "metric" | "kg" => Ok(UnitSystem::Metric),
            other => Err(Error::validation(format!("Unknown unit system: {}", other))),
        }
    }
}

// ============================================================================
// Workout Log
// ============================================================================

/// A single logged exercise
///
/// `volume` always equals `weight * sets * reps`; every code path that
/// touches `weight` recomputes it through [`WorkoutEntry::set_weight`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntry {
    pub id: Uuid,
    pub exercise: String,
    pub weight: f64,
    pub sets: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub volume: f64,
}

impl WorkoutEntry {
    pub fn compute_volume(weight: f64, sets: u32, reps: u32) -> f64 {
        weight * sets as f64 * reps as f64
    }

    /// Replace the weight and recompute the derived volume
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
        self.volume = Self::compute_volume(weight, self.sets, self.reps);
    }

    /// Calendar date of the entry in the local time zone
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }
}

/// Fields supplied by the presentation layer when logging a workout
#[derive(Clone, Debug, Default)]
pub struct NewWorkout {
    pub exercise: String,
    pub weight: f64,
    pub sets: u32,
    pub reps: u32,
    pub notes: Option<String>,
}

// ============================================================================
// Plans
// ============================================================================

/// Category tag for a workout plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanCategory {
    Strength,
    Cardio,
    Hiit,
    Flexibility,
    Other,
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanCategory::Strength => "Strength",
            PlanCategory::Cardio => "Cardio",
            PlanCategory::Hiit => "HIIT",
            PlanCategory::Flexibility => "Flexibility",
            PlanCategory::Other => "Other",
        };
        f.write_str(label)
    }
}

impl FromStr for PlanCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(PlanCategory::Strength),
            "cardio" => Ok(PlanCategory::Cardio),
            "hiit" => Ok(PlanCategory::Hiit),
            "flexibility" | "mobility" => Ok(PlanCategory::Flexibility),
            "other" => Ok(PlanCategory::Other),
            other => Err(Error::validation(format!("Unknown plan category: {}", other))),
        }
    }
}

/// One exercise inside a plan; position in the plan drives session order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
}

/// A reusable, ordered workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub name: String,
    pub category: PlanCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub exercises: Vec<PlanExercise>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub times_used: u32,
}

impl WorkoutPlan {
    /// Sum of sets across every exercise in the plan
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }

    /// Rough duration: two minutes per set plus the rest between them
    pub fn estimated_minutes(&self) -> u32 {
        let minutes: f64 = self
            .exercises
            .iter()
            .map(|e| e.sets as f64 * 2.0 + e.rest_seconds as f64 / 60.0)
            .sum();
        minutes.round() as u32
    }
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(Error::validation(format!("Unknown gender: {}", other))),
        }
    }
}

/// Preferred number of training days per week
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrainingFrequency {
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "3-4")]
    ThreeToFour,
    #[serde(rename = "5-6")]
    FiveToSix,
    #[serde(rename = "daily")]
    Daily,
}

impl fmt::Display for TrainingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrainingFrequency::OneToTwo => "1-2",
            TrainingFrequency::ThreeToFour => "3-4",
            TrainingFrequency::FiveToSix => "5-6",
            TrainingFrequency::Daily => "daily",
        };
        f.write_str(label)
    }
}

impl FromStr for TrainingFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1-2" => Ok(TrainingFrequency::OneToTwo),
            "3-4" => Ok(TrainingFrequency::ThreeToFour),
            "5-6" => Ok(TrainingFrequency::FiveToSix),
            "daily" | "7" => Ok(TrainingFrequency::Daily),
            other => Err(Error::validation(format!(
                "Unknown training frequency: {}",
                other
            ))),
        }
    }
}

/// Singleton user profile; every field is optional
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub frequency: Option<TrainingFrequency>,
}

/// Partial profile update; `None` keeps the stored value
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
    pub frequency: Option<TrainingFrequency>,
}

impl Profile {
    /// Merge an update, ignoring measurements that are not finite and positive
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(height) = update.height.filter(|h| h.is_finite() && *h > 0.0) {
            self.height = Some(height);
        }
        if let Some(weight) = update.weight.filter(|w| w.is_finite() && *w > 0.0) {
            self.weight = Some(weight);
        }
        if update.gender.is_some() {
            self.gender = update.gender;
        }
        if update.frequency.is_some() {
            self.frequency = update.frequency;
        }
    }
}

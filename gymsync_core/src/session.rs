//! The workout session runner.
//!
//! Drives one run-through of a plan as a state machine:
//!
//! ```text
//! Idle -> Running(i, j) -> Resting -> Running(i, j+1) -> ...
//!      -> ExerciseComplete -> Running(i+1, 0) -> ... -> Finished
//! any active state --stop--> Idle
//! ```
//!
//! Commands that do not apply to the current state (completing a set while
//! idle, skipping rest while running, a double click after the session
//! ended) are ignored and return `None`. Nothing here fails.
//!
//! Elapsed time is measured against the caller's clock: every command that
//! can move it takes `now`, and ticks only decide when the displayed value
//! is refreshed. Time spent paused is excluded.

use crate::scheduler::{Scheduler, TimerId};
use crate::{PlanExercise, WorkoutPlan};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Running,
    Resting,
    ExerciseComplete,
    Finished,
}

/// Result of a finished session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
    pub total_sets: u32,
}

impl SessionSummary {
    /// Completion time as `M:SS`
    pub fn duration_display(&self) -> String {
        format!("{}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started {
        plan_id: Uuid,
        total_exercises: usize,
        total_sets: u32,
    },
    SetCompleted {
        exercise_index: usize,
        sets_done: u32,
        rest_seconds: Option<u32>,
    },
    RestFinished {
        skipped: bool,
    },
    ExerciseCompleted {
        exercise_index: usize,
    },
    ExerciseAdvanced {
        exercise_index: usize,
    },
    Paused,
    Resumed,
    Finished(SessionSummary),
    Stopped {
        elapsed_secs: u64,
    },
}

/// Everything the presentation layer needs to draw an active session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub plan_name: String,
    pub exercise_name: String,
    pub exercise_number: usize,
    pub total_exercises: usize,
    pub current_set: u32,
    pub total_sets: u32,
    pub reps: u32,
    pub progress_percent: u32,
    pub elapsed_secs: u64,
    pub rest_remaining: Option<u32>,
    pub paused: bool,
    pub can_complete_set: bool,
    pub can_skip_rest: bool,
    pub can_advance: bool,
    pub can_pause: bool,
}

impl SessionView {
    /// Elapsed time as `MM:SS`
    pub fn elapsed_display(&self) -> String {
        format!("{:02}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }
}

#[derive(Clone, Debug)]
struct ActiveSession {
    plan: WorkoutPlan,
    exercise_index: usize,
    set_index: u32,
    rest_remaining: Option<u32>,
    started_at: DateTime<Utc>,
    paused_since: Option<DateTime<Utc>>,
    paused_total: Duration,
    /// Last refreshed value of `elapsed_at`
    elapsed_secs: u64,
}

impl ActiveSession {
    fn exercise(&self) -> &PlanExercise {
        // exercise_index is only ever advanced past the end on the way to
        // Finished, at which point the session is dropped
        &self.plan.exercises[self.exercise_index]
    }

    fn paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Whole seconds since start at `now`, excluding time spent paused
    fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        let frozen = self
            .paused_since
            .map_or_else(Duration::zero, |since| now - since);
        let active = now - self.started_at - self.paused_total - frozen;
        u64::try_from(active.num_seconds()).unwrap_or(0)
    }

    fn phase(&self) -> SessionPhase {
        if self.rest_remaining.is_some() {
            SessionPhase::Resting
        } else if self.set_index >= self.exercise().sets {
            SessionPhase::ExerciseComplete
        } else {
            SessionPhase::Running
        }
    }

    fn progress_fraction(&self) -> f64 {
        let total = self.plan.total_sets();
        if total == 0 {
            return 0.0;
        }
        let prior: u32 = self.plan.exercises[..self.exercise_index]
            .iter()
            .map(|e| e.sets)
            .sum();
        f64::from(prior + self.set_index) / f64::from(total)
    }
}

#[derive(Debug, Default)]
pub struct SessionRunner {
    active: Option<ActiveSession>,
    finished: Option<SessionSummary>,
    scheduler: Scheduler,
}

impl SessionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        match (&self.active, &self.finished) {
            (Some(session), _) => session.phase(),
            (None, Some(_)) => SessionPhase::Finished,
            (None, None) => SessionPhase::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn plan_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|s| s.plan.id)
    }

    pub fn exercise_index(&self) -> Option<usize> {
        self.active.as_ref().map(|s| s.exercise_index)
    }

    pub fn set_index(&self) -> Option<u32> {
        self.active.as_ref().map(|s| s.set_index)
    }

    pub fn is_paused(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveSession::paused)
    }

    pub fn rest_remaining(&self) -> Option<u32> {
        self.active.as_ref().and_then(|s| s.rest_remaining)
    }

    pub fn elapsed_secs(&self) -> Option<u64> {
        self.active.as_ref().map(|s| s.elapsed_secs)
    }

    /// Completed sets over total sets, 0.0 ..= 1.0
    pub fn progress_fraction(&self) -> Option<f64> {
        self.active.as_ref().map(ActiveSession::progress_fraction)
    }

    /// Summary of the most recent session that ran to completion
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.finished.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn view(&self) -> Option<SessionView> {
        let session = self.active.as_ref()?;
        let exercise = session.exercise();
        let phase = session.phase();

        Some(SessionView {
            phase,
            plan_name: session.plan.name.clone(),
            exercise_name: exercise.name.clone(),
            exercise_number: session.exercise_index + 1,
            total_exercises: session.plan.exercises.len(),
            current_set: (session.set_index + 1).min(exercise.sets),
            total_sets: exercise.sets,
            reps: exercise.reps,
            progress_percent: (session.progress_fraction() * 100.0).round() as u32,
            elapsed_secs: session.elapsed_secs,
            rest_remaining: session.rest_remaining,
            paused: session.paused(),
            can_complete_set: phase == SessionPhase::Running && !session.paused(),
            can_skip_rest: phase == SessionPhase::Resting,
            can_advance: phase == SessionPhase::ExerciseComplete,
            can_pause: matches!(phase, SessionPhase::Running | SessionPhase::Resting),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run-through of `plan` at exercise 0, set 0
    pub fn start(&mut self, plan: &WorkoutPlan, now: DateTime<Utc>) -> Option<SessionEvent> {
        if self.active.is_some() {
            tracing::debug!("Start ignored, a session is already running");
            return None;
        }
        if plan.exercises.is_empty() {
            tracing::warn!("Plan '{}' has no exercises, not starting", plan.name);
            return None;
        }

        self.finished = None;
        self.active = Some(ActiveSession {
            plan: plan.clone(),
            exercise_index: 0,
            set_index: 0,
            rest_remaining: None,
            started_at: now,
            paused_since: None,
            paused_total: Duration::zero(),
            elapsed_secs: 0,
        });
        self.scheduler.cancel_all();
        self.scheduler.arm(TimerId::Elapsed);

        tracing::info!("Started session for plan '{}'", plan.name);
        Some(SessionEvent::Started {
            plan_id: plan.id,
            total_exercises: plan.exercises.len(),
            total_sets: plan.total_sets(),
        })
    }

    /// Mark the current set done, then rest or wait for the next exercise
    pub fn complete_set(&mut self) -> Option<SessionEvent> {
        let Some(session) = self.active.as_mut() else {
            tracing::debug!("Complete set ignored, no active session");
            return None;
        };
        if session.paused() || session.phase() != SessionPhase::Running {
            tracing::debug!("Complete set ignored in {:?}", session.phase());
            return None;
        }

        session.set_index += 1;
        let exercise_index = session.exercise_index;
        let exercise = session.exercise();
        let (sets, rest) = (exercise.sets, exercise.rest_seconds);

        if session.set_index >= sets {
            tracing::info!("Exercise {} complete", exercise_index + 1);
            return Some(SessionEvent::ExerciseCompleted { exercise_index });
        }

        let rest_seconds = (rest > 0).then_some(rest);
        if rest_seconds.is_some() {
            session.rest_remaining = rest_seconds;
            self.scheduler.arm(TimerId::Rest);
        }

        Some(SessionEvent::SetCompleted {
            exercise_index,
            sets_done: session.set_index,
            rest_seconds,
        })
    }

    /// End the rest period early
    pub fn skip_rest(&mut self) -> Option<SessionEvent> {
        let resting = self
            .active
            .as_ref()
            .is_some_and(|s| s.phase() == SessionPhase::Resting);
        if !resting {
            tracing::debug!("Skip rest ignored, not resting");
            return None;
        }
        Some(self.end_rest(true))
    }

    /// Move past a completed exercise; finishes the session after the last one
    pub fn advance_exercise(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        let Some(session) = self.active.as_mut() else {
            tracing::debug!("Advance ignored, no active session");
            return None;
        };
        if session.phase() != SessionPhase::ExerciseComplete {
            tracing::debug!("Advance ignored in {:?}", session.phase());
            return None;
        }

        if session.exercise_index + 1 < session.plan.exercises.len() {
            session.exercise_index += 1;
            session.set_index = 0;
            return Some(SessionEvent::ExerciseAdvanced {
                exercise_index: session.exercise_index,
            });
        }

        self.scheduler.cancel_all();
        let session = self.active.take()?;
        let summary = SessionSummary {
            plan_id: session.plan.id,
            plan_name: session.plan.name.clone(),
            started_at: session.started_at,
            elapsed_secs: session.elapsed_at(now),
            total_sets: session.plan.total_sets(),
        };
        tracing::info!(
            "Finished '{}' in {}",
            summary.plan_name,
            summary.duration_display()
        );
        self.finished = Some(summary.clone());
        Some(SessionEvent::Finished(summary))
    }

    /// Freeze or unfreeze both timers without touching indices
    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        let session = self.active.as_mut()?;
        if !matches!(session.phase(), SessionPhase::Running | SessionPhase::Resting) {
            tracing::debug!("Pause ignored in {:?}", session.phase());
            return None;
        }

        match session.paused_since.take() {
            Some(since) => {
                session.paused_total = session.paused_total + (now - since);
                Some(SessionEvent::Resumed)
            }
            None => {
                session.elapsed_secs = session.elapsed_at(now);
                session.paused_since = Some(now);
                Some(SessionEvent::Paused)
            }
        }
    }

    /// Abort the session; only acts once the caller has confirmed
    pub fn stop(&mut self, confirmed: bool, now: DateTime<Utc>) -> Option<SessionEvent> {
        if !confirmed {
            tracing::debug!("Stop not confirmed");
            return None;
        }

        self.scheduler.cancel_all();
        let session = self.active.take()?;
        tracing::info!("Stopped session for plan '{}'", session.plan.name);
        Some(SessionEvent::Stopped {
            elapsed_secs: session.elapsed_at(now),
        })
    }

    /// One timer period: fire every armed timer once
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        let mut event = None;
        for id in self.scheduler.fire() {
            match id {
                TimerId::Elapsed => self.on_elapsed_tick(now),
                TimerId::Rest => event = self.on_rest_tick(),
            }
        }
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_elapsed_tick(&mut self, now: DateTime<Utc>) {
        if let Some(session) = self.active.as_mut() {
            if !session.paused() {
                session.elapsed_secs = session.elapsed_at(now);
            }
        }
    }

    fn on_rest_tick(&mut self) -> Option<SessionEvent> {
        let session = self.active.as_mut()?;
        if session.paused() {
            return None;
        }

        let remaining = session.rest_remaining?.saturating_sub(1);
        if remaining == 0 {
            Some(self.end_rest(false))
        } else {
            session.rest_remaining = Some(remaining);
            None
        }
    }

    fn end_rest(&mut self, skipped: bool) -> SessionEvent {
        self.scheduler.cancel(TimerId::Rest);
        if let Some(session) = self.active.as_mut() {
            session.rest_remaining = None;
        }
        SessionEvent::RestFinished { skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanCategory;
    use chrono::TimeZone;

    fn plan(sets: &[u32], rest: u32) -> WorkoutPlan {
        WorkoutPlan {
            id: Uuid::now_v7(),
            name: "Push Day".into(),
            category: PlanCategory::Strength,
            description: None,
            exercises: sets
                .iter()
                .enumerate()
                .map(|(i, &s)| PlanExercise {
                    name: format!("Exercise {}", i + 1),
                    sets: s,
                    reps: 8,
                    rest_seconds: rest,
                })
                .collect(),
            created_at: Utc::now(),
            times_used: 0,
        }
    }

    /// `secs` seconds after the session start
    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn started(plan: &WorkoutPlan) -> SessionRunner {
        crate::logging::init_test();
        let mut runner = SessionRunner::new();
        runner.start(plan, at(0)).unwrap();
        runner
    }

    /// Fire `n` ticks one second apart, the first at `from + 1`
    fn tick_n(runner: &mut SessionRunner, from: i64, n: i64) -> Vec<SessionEvent> {
        (1..=n).filter_map(|i| runner.tick(at(from + i))).collect()
    }

    #[test]
    fn test_full_sequence_with_rest_ticks() {
        let p = plan(&[3, 3], 10);
        let mut runner = started(&p);
        let mut now = 0;

        for exercise in 0..2 {
            for set in 0..3u32 {
                assert_eq!(runner.phase(), SessionPhase::Running);
                let event = runner.complete_set().unwrap();
                if set < 2 {
                    assert_eq!(runner.phase(), SessionPhase::Resting);
                    assert_eq!(runner.rest_remaining(), Some(10));
                    let events = tick_n(&mut runner, now, 10);
                    now += 10;
                    assert_eq!(events, vec![SessionEvent::RestFinished { skipped: false }]);
                } else {
                    assert_eq!(event, SessionEvent::ExerciseCompleted { exercise_index: exercise });
                    assert_eq!(runner.phase(), SessionPhase::ExerciseComplete);
                    assert_eq!(runner.rest_remaining(), None);
                }
            }

            let event = runner.advance_exercise(at(now)).unwrap();
            if exercise == 0 {
                assert_eq!(event, SessionEvent::ExerciseAdvanced { exercise_index: 1 });
                assert_eq!(runner.exercise_index(), Some(1));
                assert_eq!(runner.set_index(), Some(0));
            } else {
                assert!(matches!(event, SessionEvent::Finished(_)));
            }
        }

        assert_eq!(runner.phase(), SessionPhase::Finished);
        assert!(!runner.is_active());
        let summary = runner.last_summary().unwrap();
        assert_eq!(summary.elapsed_secs, 40);
        assert_eq!(summary.duration_display(), "0:40");
        assert!(!runner.scheduler().is_armed(TimerId::Elapsed));
    }

    #[test]
    fn test_elapsed_follows_clock_not_tick_count() {
        let p = plan(&[1], 10);
        let mut runner = started(&p);

        // A late ticker delivers a single tick five minutes in
        assert_eq!(runner.tick(at(300)), None);
        assert_eq!(runner.elapsed_secs(), Some(300));
        assert_eq!(runner.view().unwrap().elapsed_display(), "05:00");

        runner.complete_set();
        match runner.advance_exercise(at(305)) {
            Some(SessionEvent::Finished(summary)) => {
                assert_eq!(summary.elapsed_secs, 305);
                assert_eq!(summary.duration_display(), "5:05");
                assert_eq!(summary.started_at, at(0));
            }
            other => panic!("Expected Finished, got {:?}", other),
        }
    }

    #[test]
    fn test_sequence_with_skipped_rest() {
        let p = plan(&[3, 3], 10);
        let mut runner = started(&p);

        for _ in 0..2 {
            runner.complete_set();
            assert_eq!(runner.skip_rest(), Some(SessionEvent::RestFinished { skipped: true }));
        }
        runner.complete_set();
        runner.advance_exercise(at(30));
        assert_eq!(runner.exercise_index(), Some(1));
        assert_eq!(runner.set_index(), Some(0));

        for _ in 0..2 {
            runner.complete_set();
            runner.skip_rest();
        }
        runner.complete_set();
        assert!(matches!(
            runner.advance_exercise(at(60)),
            Some(SessionEvent::Finished(_))
        ));
    }

    #[test]
    fn test_progress_fraction() {
        let p = plan(&[2, 3], 30);
        let mut runner = started(&p);

        runner.complete_set();
        runner.skip_rest();
        runner.complete_set();

        assert_eq!(runner.phase(), SessionPhase::ExerciseComplete);
        assert_eq!(runner.progress_fraction(), Some(0.4));
        assert_eq!(runner.view().unwrap().progress_percent, 40);

        runner.advance_exercise(at(10));
        assert_eq!(runner.progress_fraction(), Some(0.4));
        runner.complete_set();
        assert_eq!(runner.view().unwrap().progress_percent, 60);
    }

    #[test]
    fn test_complete_set_ignored_while_resting_or_paused() {
        let p = plan(&[3], 10);
        let mut runner = started(&p);

        runner.complete_set();
        assert_eq!(runner.complete_set(), None);
        assert_eq!(runner.set_index(), Some(1));

        runner.skip_rest();
        runner.toggle_pause(at(1));
        assert_eq!(runner.complete_set(), None);
        assert_eq!(runner.set_index(), Some(1));
    }

    #[test]
    fn test_pause_freezes_rest_and_elapsed() {
        let p = plan(&[2], 5);
        let mut runner = started(&p);

        tick_n(&mut runner, 0, 3);
        assert_eq!(runner.elapsed_secs(), Some(3));

        runner.complete_set();
        tick_n(&mut runner, 3, 2);
        assert_eq!(runner.rest_remaining(), Some(3));

        assert_eq!(runner.toggle_pause(at(5)), Some(SessionEvent::Paused));
        assert!(tick_n(&mut runner, 5, 10).is_empty());
        assert_eq!(runner.rest_remaining(), Some(3));
        assert_eq!(runner.elapsed_secs(), Some(5));
        // paused ticks still fire, they just do nothing
        assert!(runner.scheduler().is_armed(TimerId::Rest));

        assert_eq!(runner.toggle_pause(at(15)), Some(SessionEvent::Resumed));
        let events = tick_n(&mut runner, 15, 3);
        assert_eq!(events, vec![SessionEvent::RestFinished { skipped: false }]);
        // 18 seconds since start, 10 of them paused
        assert_eq!(runner.elapsed_secs(), Some(8));
        assert_eq!(runner.phase(), SessionPhase::Running);
        assert_eq!(runner.set_index(), Some(1));
    }

    #[test]
    fn test_stop_while_paused_excludes_pause() {
        let p = plan(&[3], 10);
        let mut runner = started(&p);

        runner.toggle_pause(at(20));
        assert_eq!(
            runner.stop(true, at(80)),
            Some(SessionEvent::Stopped { elapsed_secs: 20 })
        );
    }

    #[test]
    fn test_stop_requires_confirmation_and_cancels_timers() {
        let p = plan(&[3], 10);
        let mut runner = started(&p);
        runner.complete_set();

        assert_eq!(runner.stop(false, at(5)), None);
        assert!(runner.is_active());

        assert_eq!(
            runner.stop(true, at(5)),
            Some(SessionEvent::Stopped { elapsed_secs: 5 })
        );
        assert_eq!(runner.phase(), SessionPhase::Idle);
        assert!(!runner.scheduler().is_armed(TimerId::Elapsed));
        assert!(!runner.scheduler().is_armed(TimerId::Rest));
        assert!(runner.last_summary().is_none());

        // second stop is harmless
        assert_eq!(runner.stop(true, at(6)), None);
    }

    #[test]
    fn test_idle_commands_are_noops() {
        let mut runner = SessionRunner::new();
        assert_eq!(runner.complete_set(), None);
        assert_eq!(runner.skip_rest(), None);
        assert_eq!(runner.advance_exercise(at(0)), None);
        assert_eq!(runner.toggle_pause(at(0)), None);
        assert_eq!(runner.stop(true, at(0)), None);
        assert_eq!(runner.tick(at(1)), None);
        assert!(runner.view().is_none());
        assert_eq!(runner.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_start_rules() {
        let mut runner = SessionRunner::new();
        let empty = plan(&[], 10);
        assert_eq!(runner.start(&empty, at(0)), None);

        let p = plan(&[1], 10);
        assert!(runner.start(&p, at(0)).is_some());
        assert_eq!(runner.start(&p, at(1)), None);
    }

    #[test]
    fn test_advance_only_after_exercise_complete() {
        let p = plan(&[2, 1], 10);
        let mut runner = started(&p);
        assert_eq!(runner.advance_exercise(at(1)), None);
        runner.complete_set();
        assert_eq!(runner.advance_exercise(at(2)), None);
        assert!(runner.skip_rest().is_some());
        runner.complete_set();
        assert!(runner.advance_exercise(at(3)).is_some());
    }

    #[test]
    fn test_pause_not_available_between_exercises() {
        let p = plan(&[1, 1], 10);
        let mut runner = started(&p);
        runner.complete_set();
        assert_eq!(runner.toggle_pause(at(1)), None);
        assert!(!runner.view().unwrap().can_pause);
    }

    #[test]
    fn test_view_flags() {
        let p = plan(&[2], 10);
        let mut runner = started(&p);

        let view = runner.view().unwrap();
        assert_eq!(view.exercise_number, 1);
        assert_eq!(view.current_set, 1);
        assert!(view.can_complete_set);
        assert!(!view.can_skip_rest);
        assert_eq!(view.elapsed_display(), "00:00");

        runner.complete_set();
        let view = runner.view().unwrap();
        assert!(view.can_skip_rest);
        assert!(!view.can_complete_set);
        assert_eq!(view.current_set, 2);

        runner.skip_rest();
        runner.complete_set();
        let view = runner.view().unwrap();
        assert!(view.can_advance);
        assert_eq!(view.current_set, 2);
    }

    #[test]
    fn test_restart_after_finish() {
        let p = plan(&[1], 10);
        let mut runner = started(&p);
        runner.complete_set();
        runner.advance_exercise(at(1));
        assert_eq!(runner.phase(), SessionPhase::Finished);

        assert!(runner.start(&p, at(2)).is_some());
        assert_eq!(runner.phase(), SessionPhase::Running);
        assert!(runner.last_summary().is_none());
    }
}

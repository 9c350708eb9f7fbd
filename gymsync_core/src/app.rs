//! Application controller.
//!
//! `App` owns every piece of mutable state and is the single writer: the
//! presentation layer sends it [`Command`]s and reads back query results.
//! Each mutation of the log, plans, profile or unit flag is written through
//! the [`Store`] before the command returns.

use crate::charts::{chart_series, ChartFilter, ChartSeries};
use crate::clock::Clock;
use crate::config::Config;
use crate::metrics::{self, MonthlySummary, Statistics, TodaySummary};
use crate::plans::PlanRepository;
use crate::session::{SessionEvent, SessionRunner, SessionView};
use crate::store::{self, Store, PLANS_KEY, PROFILE_KEY, UNITS_KEY, WORKOUTS_KEY};
use crate::units;
use crate::workouts::WorkoutLog;
use crate::{
    NewWorkout, PlanCategory, PlanExercise, Profile, ProfileUpdate, Result, UnitSystem,
    WorkoutEntry, WorkoutPlan,
};
use uuid::Uuid;

/// Persisted application data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub workouts: WorkoutLog,
    pub plans: PlanRepository,
    pub profile: Profile,
    pub units: UnitSystem,
}

impl AppState {
    /// Read every document, substituting defaults for missing or corrupt ones
    pub fn load<S: Store + ?Sized>(store: &S, default_units: UnitSystem) -> Result<Self> {
        let workouts: WorkoutLog = store::load_or(store, WORKOUTS_KEY, WorkoutLog::default())?;
        let plans: PlanRepository = store::load_or(store, PLANS_KEY, PlanRepository::default())?;
        let profile: Profile = store::load_or(store, PROFILE_KEY, Profile::default())?;
        let is_metric: Option<bool> = store::load_or(store, UNITS_KEY, None)?;
        let units = is_metric.map_or(default_units, UnitSystem::from_metric_flag);

        tracing::debug!(
            "Loaded {} workouts, {} plans, units {}",
            workouts.len(),
            plans.plans().len(),
            units
        );
        Ok(Self {
            workouts,
            plans,
            profile,
            units,
        })
    }

    pub fn save_workouts<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        store::save_as(store, WORKOUTS_KEY, &self.workouts)
    }

    pub fn save_plans<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        store::save_as(store, PLANS_KEY, &self.plans)
    }

    pub fn save_profile<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        store::save_as(store, PROFILE_KEY, &self.profile)
    }

    pub fn save_units<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        store::save_as(store, UNITS_KEY, &self.units.is_metric())
    }
}

/// Everything the presentation layer can ask the core to do
#[derive(Clone, Debug)]
pub enum Command {
    LogWorkout(NewWorkout),
    DeleteWorkout(Uuid),
    CreatePlan {
        name: String,
        category: PlanCategory,
        description: Option<String>,
        exercises: Vec<PlanExercise>,
    },
    DeletePlan(Uuid),
    StartSession(Uuid),
    CompleteSet,
    SkipRest,
    AdvanceExercise,
    TogglePause,
    StopSession { confirmed: bool },
    ToggleUnits,
    UpdateProfile(ProfileUpdate),
    /// One period of the session timers
    Tick,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Logged(WorkoutEntry),
    WorkoutDeleted(Uuid),
    PlanCreated(WorkoutPlan),
    PlanDeleted(Uuid),
    Session(SessionEvent),
    UnitsChanged(UnitSystem),
    ProfileUpdated(Profile),
    /// The command did not apply (unknown id, wrong session phase, ...)
    Ignored,
}

pub struct App<S: Store, C: Clock> {
    state: AppState,
    store: S,
    clock: C,
    runner: SessionRunner,
    recent_limit: usize,
    chart_exercise_limit: usize,
}

impl<S: Store, C: Clock> App<S, C> {
    /// Load persisted state and build a controller around it
    pub fn new(store: S, clock: C, config: &Config) -> Result<Self> {
        let state = AppState::load(&store, config.preferences.default_units)?;
        Ok(Self {
            state,
            store,
            clock,
            runner: SessionRunner::new(),
            recent_limit: config.display.recent_limit,
            chart_exercise_limit: config.display.chart_exercise_limit,
        })
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        tracing::trace!("Executing {:?}", command);
        match command {
            Command::LogWorkout(workout) => {
                let entry = self.state.workouts.log(workout, self.clock.now())?.clone();
                self.state.save_workouts(&mut self.store)?;
                Ok(Outcome::Logged(entry))
            }
            Command::DeleteWorkout(id) => {
                if !self.state.workouts.delete(id) {
                    return Ok(Outcome::Ignored);
                }
                self.state.save_workouts(&mut self.store)?;
                Ok(Outcome::WorkoutDeleted(id))
            }
            Command::CreatePlan {
                name,
                category,
                description,
                exercises,
            } => {
                let plan = self
                    .state
                    .plans
                    .create(&name, category, description, exercises, self.clock.now())?
                    .clone();
                self.state.save_plans(&mut self.store)?;
                Ok(Outcome::PlanCreated(plan))
            }
            Command::DeletePlan(id) => {
                if !self.state.plans.delete(id) {
                    return Ok(Outcome::Ignored);
                }
                self.state.save_plans(&mut self.store)?;
                Ok(Outcome::PlanDeleted(id))
            }
            Command::StartSession(id) => self.start_session(id),
            Command::CompleteSet => Ok(session_outcome(self.runner.complete_set())),
            Command::SkipRest => Ok(session_outcome(self.runner.skip_rest())),
            Command::AdvanceExercise => {
                let now = self.clock.now();
                Ok(session_outcome(self.runner.advance_exercise(now)))
            }
            Command::TogglePause => {
                let now = self.clock.now();
                Ok(session_outcome(self.runner.toggle_pause(now)))
            }
            Command::StopSession { confirmed } => {
                let now = self.clock.now();
                Ok(session_outcome(self.runner.stop(confirmed, now)))
            }
            Command::Tick => {
                let now = self.clock.now();
                Ok(session_outcome(self.runner.tick(now)))
            }
            Command::ToggleUnits => self.toggle_units(),
            Command::UpdateProfile(update) => {
                self.state.profile.apply(update);
                self.state.save_profile(&mut self.store)?;
                Ok(Outcome::ProfileUpdated(self.state.profile.clone()))
            }
        }
    }

    fn start_session(&mut self, id: Uuid) -> Result<Outcome> {
        let Some(plan) = self.state.plans.get(id) else {
            tracing::debug!("Start ignored, no plan with id {}", id);
            return Ok(Outcome::Ignored);
        };

        let Some(event) = self.runner.start(plan, self.clock.now()) else {
            return Ok(Outcome::Ignored);
        };

        self.state.plans.record_use(id);
        self.state.save_plans(&mut self.store)?;
        Ok(Outcome::Session(event))
    }

    /// Flip the unit preference and rewrite stored measurements into it
    ///
    /// Each conversion rounds to one decimal place, so toggling back and
    /// forth can drift values by a tenth.
    fn toggle_units(&mut self) -> Result<Outcome> {
        let target = self.state.units.toggled();
        units::convert_log(self.state.workouts.entries_mut(), target);
        units::convert_profile(&mut self.state.profile, target);
        self.state.units = target;

        // The flag goes last so it never describes values still in the old units
        self.state.save_workouts(&mut self.store)?;
        self.state.save_profile(&mut self.store)?;
        self.state.save_units(&mut self.store)?;

        tracing::info!("Switched units to {}", target);
        Ok(Outcome::UnitsChanged(target))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn units(&self) -> UnitSystem {
        self.state.units
    }

    pub fn workouts(&self) -> &[WorkoutEntry] {
        self.state.workouts.entries()
    }

    pub fn plans(&self) -> &[WorkoutPlan] {
        self.state.plans.plans()
    }

    pub fn profile(&self) -> &Profile {
        &self.state.profile
    }

    pub fn today_summary(&self) -> TodaySummary {
        metrics::today_summary(self.workouts(), self.clock.today())
    }

    /// Newest entries first, capped at the configured recent limit
    pub fn recent(&self) -> Vec<&WorkoutEntry> {
        self.state.workouts.recent(self.recent_limit)
    }

    pub fn statistics(&self) -> Statistics {
        metrics::statistics(self.workouts(), self.clock.today(), self.state.units)
    }

    pub fn monthly_summary(&self) -> MonthlySummary {
        metrics::monthly_summary(self.workouts(), self.clock.today())
    }

    pub fn chart_series(&self, filter: &ChartFilter) -> ChartSeries {
        chart_series(
            self.workouts(),
            filter,
            self.clock.now(),
            self.chart_exercise_limit,
        )
    }

    pub fn session(&self) -> &SessionRunner {
        &self.runner
    }

    pub fn session_view(&self) -> Option<SessionView> {
        self.runner.view()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn session_outcome(event: Option<SessionEvent>) -> Outcome {
    event.map_or(Outcome::Ignored, Outcome::Session)
}

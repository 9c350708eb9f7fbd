use clap::{Parser, Subcommand};
use gymsync_core::charts::ChartFilter;
use gymsync_core::units::{format_height, format_weight};
use gymsync_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Sender};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

type CliApp = App<FileStore, SystemClock>;

#[derive(Parser)]
#[command(name = "gymsync")]
#[command(about = "Workout log, plans and guided training sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a completed exercise
    Log {
        /// Exercise name
        exercise: String,

        /// Weight lifted, in the current units
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        sets: u32,

        #[arg(long)]
        reps: u32,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a logged workout by id (a unique prefix is enough)
    Delete {
        id: String,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Show the most recent workouts
    Recent,

    /// Show today's summary
    Today,

    /// Show statistics, records and achievements
    Stats,

    /// Show strength and volume series
    Chart {
        /// Only this exercise (exact name)
        #[arg(long)]
        exercise: Option<String>,

        /// Only the last N days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Manage workout plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Run a plan interactively
    Run {
        /// Plan name or id prefix
        plan: String,
    },

    /// Switch between imperial and metric units, converting stored data
    Units {
        /// Only print the current unit system
        #[arg(long)]
        show: bool,
    },

    /// Show or update the profile
    Profile {
        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        weight: Option<f64>,

        /// male, female or other
        #[arg(long)]
        gender: Option<Gender>,

        /// Training days per week: 1-2, 3-4, 5-6 or daily
        #[arg(long)]
        frequency: Option<TrainingFrequency>,
    },

    /// Export the workout log as CSV
    Export {
        /// Output file (defaults to workouts.csv in the data directory)
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Create a plan
    Create {
        #[arg(long)]
        name: String,

        /// strength, cardio, hiit, flexibility or other
        #[arg(long, default_value = "strength")]
        category: PlanCategory,

        #[arg(long)]
        description: Option<String>,

        /// NAME:SETS:REPS[:REST_SECONDS], repeatable
        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,
    },

    /// List plans with usage counts
    List,

    /// Delete a plan by id (a unique prefix is enough)
    Delete {
        id: String,

        #[arg(long, short)]
        yes: bool,
    },
}

fn main() {
    // Keep stdout for rendered output; diagnostics only when asked for
    gymsync_core::logging::init_with_level("warn");

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let mut app = App::new(FileStore::new(data_dir.clone()), SystemClock, &config)?;

    match cli.command {
        Commands::Log {
            exercise,
            weight,
            sets,
            reps,
            notes,
        } => cmd_log(
            &mut app,
            NewWorkout {
                exercise,
                weight,
                sets,
                reps,
                notes,
            },
        ),
        Commands::Delete { id, yes } => cmd_delete(&mut app, &id, yes),
        Commands::Recent => {
            cmd_recent(&app);
            Ok(())
        }
        Commands::Today => {
            cmd_today(&app);
            Ok(())
        }
        Commands::Stats => {
            cmd_stats(&app);
            Ok(())
        }
        Commands::Chart { exercise, days } => {
            cmd_chart(&app, ChartFilter { exercise, days });
            Ok(())
        }
        Commands::Plan { command } => match command {
            PlanCommands::Create {
                name,
                category,
                description,
                exercises,
            } => cmd_plan_create(&mut app, name, category, description, &exercises),
            PlanCommands::List => {
                cmd_plan_list(&app);
                Ok(())
            }
            PlanCommands::Delete { id, yes } => cmd_plan_delete(&mut app, &id, yes),
        },
        Commands::Run { plan } => cmd_run(&mut app, &plan, config.session.tick_interval_ms),
        Commands::Units { show } => cmd_units(&mut app, show),
        Commands::Profile {
            height,
            weight,
            gender,
            frequency,
        } => cmd_profile(
            &mut app,
            ProfileUpdate {
                height,
                weight,
                gender,
                frequency,
            },
        ),
        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| data_dir.join("workouts.csv"));
            let count = export_workouts_csv(app.workouts(), &path)?;
            println!("✓ Exported {} workouts to {}", count, path.display());
            Ok(())
        }
    }
}

// ── Workout log ──────────────────────────────────────────────────────

fn cmd_log(app: &mut CliApp, workout: NewWorkout) -> Result<()> {
    if let Outcome::Logged(entry) = app.execute(Command::LogWorkout(workout))? {
        println!("✓ Workout logged!");
        print_entry(&entry, app.units());
    }
    Ok(())
}

fn cmd_delete(app: &mut CliApp, prefix: &str, yes: bool) -> Result<()> {
    let id = resolve_prefix(app.workouts().iter().map(|e| e.id), prefix, "workout")?;

    if !yes {
        let label = app
            .workouts()
            .iter()
            .find(|e| e.id == id)
            .map(|e| format!("{} on {}", e.exercise, e.local_date()))
            .unwrap_or_default();
        if !confirm(&format!("Delete {}?", label))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match app.execute(Command::DeleteWorkout(id))? {
        Outcome::WorkoutDeleted(_) => println!("✓ Workout deleted"),
        _ => println!("Nothing deleted."),
    }
    Ok(())
}

fn cmd_recent(app: &CliApp) {
    let recent = app.recent();
    if recent.is_empty() {
        println!("No workouts logged yet.");
        return;
    }
    for entry in recent {
        print_entry(entry, app.units());
    }
}

fn cmd_today(app: &CliApp) {
    let summary = app.today_summary();
    println!("Today");
    println!("  Exercises: {}", summary.entries);
    println!("  Sets:      {}", summary.total_sets);
    println!("  Unique:    {}", summary.unique_exercises);
}

fn cmd_stats(app: &CliApp) {
    let units = app.units();
    let stats = app.statistics();
    let month = app.monthly_summary();

    println!("Total workouts:    {}", stats.total_workouts);
    println!("Max volume:        {}", format_weight(stats.max_volume, units));
    println!("Personal records:  {}", stats.personal_record_count());
    println!("Current streak:    {} days", stats.current_streak);
    println!();
    println!("This month");
    println!("  Workouts:        {}", month.workouts);
    println!("  Sets:            {}", month.sets);
    println!("  Weekly average:  {}", month.weekly_average);

    if !stats.personal_records.is_empty() {
        println!();
        println!("Personal records");
        for record in &stats.personal_records {
            println!("  {:<20} {}", record.exercise, format_weight(record.weight, units));
        }
    }

    if !stats.achievements.is_empty() {
        println!();
        println!("Achievements");
        for badge in &stats.achievements {
            println!("  ★ {}", badge.title(units));
        }
    }
}

fn cmd_chart(app: &CliApp, filter: ChartFilter) {
    let units = app.units();
    let charts = app.chart_series(&filter);
    if charts.strength.is_empty() {
        println!("No workouts match.");
        return;
    }

    println!("Strength ({})", units.weight_label());
    for series in &charts.strength {
        println!("  {}", series.exercise);
        for point in &series.points {
            println!(
                "    {}  {}",
                point.at.with_timezone(&chrono::Local).date_naive(),
                point.weight
            );
        }
    }

    println!();
    println!("Volume per day");
    for point in &charts.volume {
        println!("  {}  {}", point.date, point.volume);
    }
}

fn print_entry(entry: &WorkoutEntry, units: UnitSystem) {
    println!(
        "  {}  {:<20} {} × {}×{}  volume {}  [{}]",
        entry.local_date(),
        entry.exercise,
        format_weight(entry.weight, units),
        entry.sets,
        entry.reps,
        entry.volume,
        entry.id
    );
    if let Some(ref notes) = entry.notes {
        println!("      {}", notes);
    }
}

// ── Plans ────────────────────────────────────────────────────────────

fn cmd_plan_create(
    app: &mut CliApp,
    name: String,
    category: PlanCategory,
    description: Option<String>,
    exercise_specs: &[String],
) -> Result<()> {
    let mut draft = PlanDraft::new();
    for spec in exercise_specs {
        let (exercise, sets, reps, rest) = parse_exercise_spec(spec)?;
        draft.add_exercise(&exercise, sets, reps, rest)?;
    }

    let outcome = app.execute(Command::CreatePlan {
        name,
        category,
        description,
        exercises: draft.exercises().to_vec(),
    })?;
    if let Outcome::PlanCreated(plan) = outcome {
        println!("✓ Plan created: {} [{}]", plan.name, plan.id);
        println!(
            "  {} exercises, {} sets, ~{} min",
            plan.exercises.len(),
            plan.total_sets(),
            plan.estimated_minutes()
        );
    }
    Ok(())
}

/// Parse `NAME:SETS:REPS[:REST_SECONDS]`
fn parse_exercise_spec(spec: &str) -> Result<(String, u32, u32, Option<u32>)> {
    let invalid = || {
        Error::Validation(format!(
            "Invalid exercise '{}', expected NAME:SETS:REPS[:REST_SECONDS]",
            spec
        ))
    };

    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let (name, sets, reps, rest) = match parts.as_slice() {
        [name, sets, reps] => (*name, *sets, *reps, None),
        [name, sets, reps, rest] => (*name, *sets, *reps, Some(*rest)),
        _ => return Err(invalid()),
    };

    let sets = sets.parse().map_err(|_| invalid())?;
    let reps = reps.parse().map_err(|_| invalid())?;
    let rest = rest.map(|r| r.parse()).transpose().map_err(|_| invalid())?;
    Ok((name.to_string(), sets, reps, rest))
}

fn cmd_plan_list(app: &CliApp) {
    if app.plans().is_empty() {
        println!("No plans yet.");
        return;
    }
    for plan in app.plans() {
        println!(
            "{}  [{}]  {}  used {} times  ~{} min",
            plan.name,
            plan.category,
            plan.id,
            plan.times_used,
            plan.estimated_minutes()
        );
        if let Some(ref description) = plan.description {
            println!("    {}", description);
        }
        for exercise in &plan.exercises {
            println!(
                "    - {} {}×{} (rest {}s)",
                exercise.name, exercise.sets, exercise.reps, exercise.rest_seconds
            );
        }
    }
}

fn cmd_plan_delete(app: &mut CliApp, prefix: &str, yes: bool) -> Result<()> {
    let id = resolve_prefix(app.plans().iter().map(|p| p.id), prefix, "plan")?;

    if !yes {
        let name = app
            .plans()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        if !confirm(&format!("Delete plan '{}'?", name))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match app.execute(Command::DeletePlan(id))? {
        Outcome::PlanDeleted(_) => println!("✓ Plan deleted"),
        _ => println!("Nothing deleted."),
    }
    Ok(())
}

// ── Session ──────────────────────────────────────────────────────────

enum SessionInput {
    Line(String),
    Tick,
    Eof,
}

fn cmd_run(app: &mut CliApp, plan: &str, tick_interval_ms: u64) -> Result<()> {
    let plan_id = resolve_plan(app.plans(), plan)?;
    match app.execute(Command::StartSession(plan_id))? {
        Outcome::Session(SessionEvent::Started {
            total_exercises,
            total_sets,
            ..
        }) => {
            println!("Starting workout: {} exercises, {} sets", total_exercises, total_sets);
        }
        _ => return Err(Error::Other("Could not start the session".into())),
    }
    print_controls();
    render_view(app);

    let (tx, rx) = channel();
    spawn_stdin_reader(tx.clone());
    spawn_ticker(tx, Duration::from_millis(tick_interval_ms));

    let mut awaiting_stop_confirmation = false;
    for input in rx {
        let closing = matches!(input, SessionInput::Eof);
        let command = match input {
            SessionInput::Tick => Command::Tick,
            // Closing input ends the workout
            SessionInput::Eof => Command::StopSession { confirmed: true },
            SessionInput::Line(line) => {
                let key = line.trim().to_lowercase();
                if awaiting_stop_confirmation {
                    awaiting_stop_confirmation = false;
                    if !matches!(key.as_str(), "y" | "yes") {
                        println!("Continuing workout.");
                        continue;
                    }
                    Command::StopSession { confirmed: true }
                } else {
                    match key.as_str() {
                        "d" => Command::CompleteSet,
                        "s" => Command::SkipRest,
                        "n" => Command::AdvanceExercise,
                        "p" => Command::TogglePause,
                        "q" => {
                            awaiting_stop_confirmation = true;
                            print!("Stop workout? [y/N] ");
                            io::stdout().flush()?;
                            continue;
                        }
                        "" => {
                            render_view(app);
                            continue;
                        }
                        other => {
                            println!("Unknown key '{}'", other);
                            print_controls();
                            continue;
                        }
                    }
                }
            }
        };

        match app.execute(command)? {
            Outcome::Session(event) => {
                if report_event(app, &event) {
                    break;
                }
            }
            _ => tracing::debug!("Session command ignored"),
        }
        if closing {
            break;
        }
    }

    Ok(())
}

fn spawn_stdin_reader(tx: Sender<SessionInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(SessionInput::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(SessionInput::Eof);
    });
}

fn spawn_ticker(tx: Sender<SessionInput>, interval: Duration) {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if tx.send(SessionInput::Tick).is_err() {
            break;
        }
    });
}

/// Print what happened; returns true once the session is over
fn report_event(app: &CliApp, event: &SessionEvent) -> bool {
    match event {
        SessionEvent::Started { .. } => {}
        SessionEvent::SetCompleted {
            sets_done,
            rest_seconds,
            ..
        } => match rest_seconds {
            Some(rest) => println!("✓ Set {} done. Rest {}s ('s' to skip)", sets_done, rest),
            None => {
                println!("✓ Set {} done", sets_done);
                render_view(app);
            }
        },
        SessionEvent::RestFinished { skipped } => {
            if *skipped {
                println!("Rest skipped");
            } else {
                println!("Rest over");
            }
            render_view(app);
        }
        SessionEvent::ExerciseCompleted { .. } => {
            let last = app
                .session_view()
                .is_some_and(|v| v.exercise_number == v.total_exercises);
            if last {
                println!("✓ Exercise complete. Press 'n' to finish.");
            } else {
                println!("✓ Exercise complete. Press 'n' for the next exercise.");
            }
        }
        SessionEvent::ExerciseAdvanced { .. } => render_view(app),
        SessionEvent::Paused => println!("⏸ Paused"),
        SessionEvent::Resumed => println!("▶ Resumed"),
        SessionEvent::Finished(summary) => {
            println!();
            println!("✓ Workout completed in {}", summary.duration_display());
            return true;
        }
        SessionEvent::Stopped { elapsed_secs } => {
            println!(
                "Workout stopped after {:02}:{:02}",
                elapsed_secs / 60,
                elapsed_secs % 60
            );
            return true;
        }
    }
    false
}

fn render_view(app: &CliApp) {
    let Some(view) = app.session_view() else {
        return;
    };

    let mut line = format!(
        "[{}] {} ({}/{})  set {}/{} × {} reps  {}%",
        view.elapsed_display(),
        view.exercise_name,
        view.exercise_number,
        view.total_exercises,
        view.current_set,
        view.total_sets,
        view.reps,
        view.progress_percent
    );
    if let Some(rest) = view.rest_remaining {
        line.push_str(&format!("  resting {}s", rest));
    }
    if view.paused {
        line.push_str("  (paused)");
    }
    println!("{}", line);
}

fn print_controls() {
    println!("─────────────────────────────────────────");
    println!("  'd' + Enter  set done");
    println!("  's' + Enter  skip rest");
    println!("  'n' + Enter  next exercise");
    println!("  'p' + Enter  pause / resume");
    println!("  'q' + Enter  stop");
    println!("─────────────────────────────────────────");
}

// ── Preferences ──────────────────────────────────────────────────────

fn cmd_units(app: &mut CliApp, show: bool) -> Result<()> {
    if show {
        println!("Units: {}", app.units());
        return Ok(());
    }
    if let Outcome::UnitsChanged(units) = app.execute(Command::ToggleUnits)? {
        println!(
            "✓ Switched to {} ({}, {})",
            units,
            units.weight_label(),
            units.height_label()
        );
    }
    Ok(())
}

fn cmd_profile(app: &mut CliApp, update: ProfileUpdate) -> Result<()> {
    let changed = update.height.is_some()
        || update.weight.is_some()
        || update.gender.is_some()
        || update.frequency.is_some();
    if changed {
        app.execute(Command::UpdateProfile(update))?;
        println!("✓ Profile updated");
    }

    let units = app.units();
    let profile = app.profile();
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!("Height:    {}", or_dash(profile.height.map(|h| format_height(h, units))));
    println!("Weight:    {}", or_dash(profile.weight.map(|w| format_weight(w, units))));
    println!("Gender:    {}", or_dash(profile.gender.map(|g| g.to_string())));
    println!("Frequency: {}", or_dash(profile.frequency.map(|f| f.to_string())));
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

fn resolve_prefix(ids: impl IntoIterator<Item = Uuid>, prefix: &str, kind: &str) -> Result<Uuid> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(Error::Validation(format!("A {} id is required", kind)));
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(Error::Other(format!("No {} matches '{}'", kind, prefix))),
        _ => Err(Error::Other(format!(
            "'{}' matches {} {}s, use a longer prefix",
            prefix,
            matches.len(),
            kind
        ))),
    }
}

/// Exact name (case-insensitive) first, then id prefix
fn resolve_plan(plans: &[WorkoutPlan], query: &str) -> Result<Uuid> {
    let by_name: Vec<&WorkoutPlan> = plans
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(query.trim()))
        .collect();
    if let [plan] = by_name.as_slice() {
        return Ok(plan.id);
    }
    resolve_prefix(plans.iter().map(|p| p.id), query, "plan")
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

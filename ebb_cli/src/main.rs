use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ebb_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ebb")]
#[command(about = "Menstrual cycle tracking and prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log flow and symptoms for a day, replacing any existing entry
    Log {
        date: NaiveDate,

        /// none, light, medium or heavy
        #[arg(long, default_value = "none")]
        flow: FlowIntensity,

        /// none, mild, moderate or severe
        #[arg(long, default_value = "none")]
        cramps: SymptomIntensity,

        /// none, mild, moderate or severe
        #[arg(long, default_value = "none")]
        headache: SymptomIntensity,

        /// neutral, happy, sad, irritable, anxious or tired
        #[arg(long, default_value = "neutral")]
        mood: Mood,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Log a whole period starting on a date
    QuickAdd {
        date: NaiveDate,

        /// Period length (defaults to the average period length)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Mark a date as the latest period start
    MarkStart { date: NaiveDate },

    /// Remove the manual period start
    ClearStart,

    /// Set or show cycle and period length preferences
    Prefs {
        #[arg(long)]
        cycle_length: Option<i64>,

        #[arg(long)]
        period_length: Option<i64>,
    },

    /// Show cycle statistics
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Predict upcoming periods
    Predict {
        #[arg(long)]
        json: bool,
    },

    /// Show the cycle phase for a date (defaults to today)
    Phase { date: Option<NaiveDate> },

    /// Food and health tips for a date (defaults to today)
    Tips { date: Option<NaiveDate> },

    /// Show the record logged for a date
    Show { date: NaiveDate },

    /// Export all records to CSV
    Export { path: PathBuf },
}

fn main() -> Result<()> {
    // Warnings only by default: stdout carries command output
    ebb_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let mut data = config.data.clone();
    if let Some(data_dir) = cli.data_dir {
        data.data_dir = data_dir;
    }
    let store_path = data.store_path();
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    tracing::debug!("Using store {:?}, today is {}", store_path, today);
    let mut tracker = Tracker::new(FileStore::new(store_path));

    match cli.command {
        Commands::Log {
            date,
            flow,
            cramps,
            headache,
            mood,
            notes,
        } => {
            let record = DailyRecord {
                date,
                flow,
                symptoms: Symptoms {
                    cramps,
                    headache,
                    mood,
                    notes,
                },
            };
            cmd_log(&mut tracker, record)
        }
        Commands::QuickAdd { date, days } => cmd_quick_add(&mut tracker, date, days),
        Commands::MarkStart { date } => {
            tracker.set_manual_period_start(date)?;
            println!("✓ Period start marked on {}", date);
            Ok(())
        }
        Commands::ClearStart => {
            tracker.clear_manual_period_start()?;
            println!("✓ Manual period start cleared");
            Ok(())
        }
        Commands::Prefs {
            cycle_length,
            period_length,
        } => cmd_prefs(&mut tracker, cycle_length, period_length),
        Commands::Stats { json } => cmd_stats(&tracker, json),
        Commands::Predict { json } => cmd_predict(&tracker, today, json, &config),
        Commands::Phase { date } => cmd_phase(&tracker, date.unwrap_or(today)),
        Commands::Tips { date } => cmd_tips(&tracker, date.unwrap_or(today), today),
        Commands::Show { date } => cmd_show(&tracker, date),
        Commands::Export { path } => {
            let count = export_records_csv(&tracker.history(), &path)?;
            println!("✓ Exported {} records to {}", count, path.display());
            Ok(())
        }
    }
}

fn cmd_log(tracker: &mut Tracker<FileStore>, record: DailyRecord) -> Result<()> {
    let date = record.date;
    let flow = record.flow;
    tracker.save_record(record)?;
    println!("✓ Logged {} (flow: {})", date, flow.as_str());
    Ok(())
}

fn cmd_quick_add(
    tracker: &mut Tracker<FileStore>,
    date: NaiveDate,
    days: Option<i64>,
) -> Result<()> {
    if let Some(days) = days {
        if !PERIOD_LENGTH_RANGE.contains(&days) {
            return Err(Error::InvalidInput(format!(
                "period length must be between {} and {} days, got {}",
                PERIOD_LENGTH_RANGE.start(),
                PERIOD_LENGTH_RANGE.end(),
                days
            )));
        }
    }

    let count = tracker.quick_add_period(date, days)?;
    println!("✓ Logged {} period days starting {}", count, date);
    Ok(())
}

fn cmd_prefs(
    tracker: &mut Tracker<FileStore>,
    cycle_length: Option<i64>,
    period_length: Option<i64>,
) -> Result<()> {
    if let Some(days) = cycle_length {
        if !tracker.set_cycle_length(days)? {
            eprintln!(
                "Cycle length {} rejected: must be between {} and {} days",
                days,
                CYCLE_LENGTH_RANGE.start(),
                CYCLE_LENGTH_RANGE.end()
            );
        }
    }

    if let Some(days) = period_length {
        if !tracker.set_period_length(days)? {
            eprintln!(
                "Period length {} rejected: must be between {} and {} days",
                days,
                PERIOD_LENGTH_RANGE.start(),
                PERIOD_LENGTH_RANGE.end()
            );
        }
    }

    let source = |preference: Option<i64>| if preference.is_some() { "preference" } else { "computed" };
    println!(
        "Cycle length: {} days ({})",
        tracker.effective_cycle_length(),
        source(tracker.cycle_length_preference())
    );
    println!(
        "Period length: {} days ({})",
        tracker.effective_period_length(),
        source(tracker.period_length_preference())
    );
    Ok(())
}

fn cmd_stats(tracker: &Tracker<FileStore>, json: bool) -> Result<()> {
    let analytics = tracker.analytics();

    if json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    println!("Cycles tracked:     {}", analytics.total_cycles);
    println!(
        "Cycle length:       {} days (range {}-{})",
        analytics.average_cycle_length, analytics.min_cycle_length, analytics.max_cycle_length
    );
    println!("Period length:      {} days", analytics.average_period_length);
    println!(
        "Regularity:         {}% ({})",
        analytics.regularity_score,
        if analytics.is_regular { "regular" } else { "irregular" }
    );
    println!("Trend:              {:?}", analytics.cycle_trend);
    println!("Confidence:         {}%", analytics.prediction_confidence);
    println!("Health score:       {}", analytics.health_score);

    if !analytics.symptom_patterns.is_empty() {
        println!();
        println!("Symptom patterns:");
        for pattern in &analytics.symptom_patterns {
            println!(
                "  {:<11} {:?} severity: {}",
                pattern.phase.to_string(),
                pattern.severity,
                pattern.symptoms.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_predict(
    tracker: &Tracker<FileStore>,
    today: NaiveDate,
    json: bool,
    config: &Config,
) -> Result<()> {
    let mut snapshot = tracker.recompute(today);
    snapshot
        .projections
        .truncate(config.display.months_ahead as usize);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let Some(prediction) = snapshot.prediction.as_ref() else {
        println!("No period data yet. Log a period or mark a start date to get predictions.");
        return Ok(());
    };

    if let Some(phase) = prediction.current_phase {
        match tracker.current_cycle_day(today) {
            Some(day) => println!("Today: cycle day {} ({} phase)", day, phase),
            None => println!("Today: {} phase", phase),
        }
    }
    println!();

    for month in 1..=config.display.months_ahead {
        let Some(projection) = snapshot.projection(month) else {
            continue;
        };
        display_projection(projection, config.display.show_fertility);
    }

    if !prediction.recommended_actions.is_empty() {
        println!("Recommended:");
        for action in &prediction.recommended_actions {
            println!("  → {}", action);
        }
    }

    if !prediction.risk_factors.is_empty() {
        println!("Watch for:");
        for risk in &prediction.risk_factors {
            println!("  ! {}", risk);
        }
    }
    Ok(())
}

fn display_projection(projection: &PredictionResult, show_fertility: bool) {
    println!(
        "Month {} ({} confidence)",
        projection.month, projection.confidence
    );
    println!(
        "  Period:    {} to {} (in {} days)",
        projection.next_period_start, projection.next_period_end, projection.days_until_period
    );
    if show_fertility {
        println!(
            "  Ovulation: {} (in {} days)",
            projection.next_ovulation, projection.days_until_ovulation
        );
        println!(
            "  Fertile:   {} to {}",
            projection.fertile_window_start, projection.fertile_window_end
        );
    }
    println!(
        "  PMS:       {} to {}",
        projection.pms_window.start, projection.pms_window.end
    );
    println!();
}

fn cmd_phase(tracker: &Tracker<FileStore>, date: NaiveDate) -> Result<()> {
    match tracker.current_phase(date) {
        Some(phase) => {
            print!("{}: {} phase", date, phase);
            if let Some(day) = tracker.current_cycle_day(date) {
                print!(", cycle day {}", day);
            }
            println!();
        }
        None => println!("{}: no cycle data", date),
    }
    Ok(())
}

fn cmd_tips(tracker: &Tracker<FileStore>, date: NaiveDate, today: NaiveDate) -> Result<()> {
    let context = tracker.tip_context(date, today);
    let tips = phase::tips_for(context);

    let heading = match context {
        TipContext::Period => "Predicted period",
        TipContext::Ovulation => "Predicted ovulation",
        TipContext::Fertile => "Fertile window",
        TipContext::Baseline => "General",
    };
    println!("{} tips for {}", heading, date);
    println!();
    println!("Foods:");
    for food in &tips.foods {
        println!("  • {}", food);
    }
    println!("Health:");
    for tip in &tips.health_tips {
        println!("  • {}", tip);
    }
    Ok(())
}

fn cmd_show(tracker: &Tracker<FileStore>, date: NaiveDate) -> Result<()> {
    let Some(record) = tracker.record_for_date(date) else {
        println!("No record for {}", date);
        return Ok(());
    };

    println!("{}", record.date);
    println!("  Flow:     {}", record.flow.as_str());
    println!("  Cramps:   {}", record.symptoms.cramps.as_str());
    println!("  Headache: {}", record.symptoms.headache.as_str());
    println!("  Mood:     {}", record.symptoms.mood.as_str());
    if !record.symptoms.notes.is_empty() {
        println!("  Notes:    {}", record.symptoms.notes);
    }
    Ok(())
}

//! CardioTrack CLI
//!
//! Local-first blood pressure and pulse tracker.

use anyhow::{anyhow, bail, Context, Result};
use cardiotrack::{
    config::Config,
    core::{
        analytics::{DIASTOLIC_GUIDES, SYSTOLIC_GUIDES},
        TimeRange,
    },
    export::{self, ExportFormat},
    store::{FileBlobStore, Settings},
    sync, DisplayZone, ReadingForm, Tracker, DATA_NOTICE, VERSION,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardiotrack")]
#[command(version = VERSION)]
#[command(about = "Local-first blood pressure and pulse tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new reading
    Add {
        /// Systolic pressure (mmHg)
        #[arg(long, short)]
        systolic: Option<String>,

        /// Diastolic pressure (mmHg)
        #[arg(long, short)]
        diastolic: Option<String>,

        /// Pulse (bpm)
        #[arg(long, short)]
        pulse: Option<String>,

        /// Date of the reading (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Time of the reading (HH:MM, default now)
        #[arg(long)]
        time: Option<String>,

        /// Free-form note
        #[arg(long, short)]
        note: Option<String>,
    },

    /// Delete a reading by id
    Delete {
        /// Id of the reading to delete
        id: String,
    },

    /// List readings, newest first
    List {
        /// Show at most this many readings
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show the latest reading, averages and recent history
    Stats {
        /// Time range for the category breakdown (week, month or year)
        #[arg(long, default_value = "week")]
        range: TimeRange,
    },

    /// Show the trend series for a time range
    Chart {
        /// Time range (week, month or year)
        #[arg(long, default_value = "week")]
        range: TimeRange,
    },

    /// Show how readings in a time range spread across categories
    Distribution {
        /// Time range (week, month or year)
        #[arg(long, default_value = "week")]
        range: TimeRange,
    },

    /// Export all readings
    Export {
        /// Output file (default: export directory, dated file name)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Export format (csv or json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// Show or change sync settings
    Settings {
        /// Webhook URL that receives full snapshot pushes
        #[arg(long)]
        sync_url: Option<String>,
    },

    /// Push all readings to the configured sync endpoint
    Sync,

    /// Ask for a narrative summary of recent readings
    Insight,

    /// Print the spreadsheet receiver script for sync
    Script,

    /// Display data handling notice
    Privacy,

    /// Show configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add {
            systolic,
            diastolic,
            pulse,
            date,
            time,
            note,
        } => cmd_add(systolic, diastolic, pulse, date, time, note),
        Commands::Delete { id } => cmd_delete(&id),
        Commands::List { limit } => cmd_list(limit),
        Commands::Stats { range } => cmd_stats(range),
        Commands::Chart { range } => cmd_chart(range),
        Commands::Distribution { range } => cmd_distribution(range),
        Commands::Export { output, format } => cmd_export(output, format),
        Commands::Settings { sync_url } => cmd_settings(sync_url),
        Commands::Sync => cmd_sync(),
        Commands::Insight => cmd_insight(),
        Commands::Script => {
            println!("{}", sync::receiver_script());
            Ok(())
        }
        Commands::Privacy => {
            println!("{DATA_NOTICE}");
            Ok(())
        }
        Commands::Config { init } => cmd_config(init),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Loaded configuration, display zone and tracker.
struct Session {
    config: Config,
    zone: DisplayZone,
    tracker: Tracker<FileBlobStore>,
}

fn open_session() -> Result<Session> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config ({e}), using defaults");
        Config::default()
    });
    let zone = config.display_zone()?;
    let tracker = Tracker::open(FileBlobStore::new(&config.data_path));

    Ok(Session {
        config,
        zone,
        tracker,
    })
}

fn cmd_add(
    systolic: Option<String>,
    diastolic: Option<String>,
    pulse: Option<String>,
    date: Option<String>,
    time: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let mut session = open_session()?;
    let defaults = ReadingForm::prefilled(Utc::now(), session.zone);

    let form = ReadingForm {
        systolic: systolic.unwrap_or(defaults.systolic),
        diastolic: diastolic.unwrap_or(defaults.diastolic),
        pulse: pulse.unwrap_or(defaults.pulse),
        date: date.unwrap_or(defaults.date),
        time: time.unwrap_or(defaults.time),
        note: note.unwrap_or(defaults.note),
    };

    let observation = form.into_observation(session.zone)?;
    let category = observation.category();
    let id = observation.id.clone();
    let count = session.tracker.add_reading(observation)?.len();

    println!("Saved reading {id} ({category})");
    println!("{count} reading(s) stored");
    Ok(())
}

fn cmd_delete(id: &str) -> Result<()> {
    let mut session = open_session()?;
    let before = session.tracker.records().len();
    let after = session.tracker.delete_reading(id)?.len();

    if after < before {
        println!("Deleted reading {id}");
    } else {
        println!("No reading with id {id}");
    }
    Ok(())
}

fn cmd_list(limit: Option<usize>) -> Result<()> {
    let session = open_session()?;
    let records = session.tracker.records();

    if records.is_empty() {
        println!("No readings yet. Add one with 'cardiotrack add'.");
        return Ok(());
    }

    let shown = limit.unwrap_or(records.len()).min(records.len());
    for record in &records[..shown] {
        println!(
            "{}  {} {}  {:>3}/{:<3} mmHg  HR {:>3}  {:<13}  {}",
            record.id,
            session.zone.format_date(record.timestamp),
            session.zone.format_clock(record.timestamp),
            record.systolic,
            record.diastolic,
            record.pulse,
            record.category().label(),
            record.note_text()
        );
    }

    if shown < records.len() {
        println!("... {} more", records.len() - shown);
    }
    Ok(())
}

fn cmd_stats(range: TimeRange) -> Result<()> {
    let session = open_session()?;
    let zone = session.zone;
    let view = session.tracker.dashboard(range, Utc::now(), zone);

    let (Some(latest), Some(averages)) = (view.latest, view.averages) else {
        println!("No readings yet. Add one with 'cardiotrack add'.");
        return Ok(());
    };

    println!("CardioTrack Summary");
    println!("===================");
    println!();
    println!(
        "Latest BP: {}/{} mmHg ({}, {:?})",
        latest.systolic,
        latest.diastolic,
        latest.category(),
        view.tone.unwrap_or(cardiotrack::core::StatusTone::Good)
    );
    println!(
        "  Taken: {} {}",
        zone.format_date(latest.timestamp),
        zone.format_clock(latest.timestamp)
    );
    println!("  Pulse: {} bpm", latest.pulse);
    println!();
    println!(
        "Average BP: {}/{} mmHg, pulse {} bpm over {} reading(s)",
        averages.systolic, averages.diastolic, averages.pulse, averages.count
    );

    if let Some(spread) = view.spread {
        println!(
            "  Systolic {}-{} (sd {:.1}), diastolic {}-{} (sd {:.1}), pulse {}-{} (sd {:.1})",
            spread.systolic.min,
            spread.systolic.max,
            spread.systolic.std_dev,
            spread.diastolic.min,
            spread.diastolic.max,
            spread.diastolic.std_dev,
            spread.pulse.min,
            spread.pulse.max,
            spread.pulse.std_dev
        );
    }

    println!();
    println!("Recent history:");
    for record in view.recent {
        println!(
            "  {}/{} mmHg  {} {}  {} bpm",
            record.systolic,
            record.diastolic,
            zone.format_date(record.timestamp),
            zone.format_clock(record.timestamp),
            record.pulse
        );
    }

    if let Some(last_sync) = view.last_sync_time {
        println!();
        println!("Last synced: {}", zone.format_stamp(last_sync));
    }
    Ok(())
}

fn cmd_chart(range: TimeRange) -> Result<()> {
    let session = open_session()?;
    let view = session.tracker.dashboard(range, Utc::now(), session.zone);

    if view.series.is_empty() {
        println!("No readings in the last {range}.");
        return Ok(());
    }

    println!("BP trend, last {range} (oldest first)");
    for point in &view.series {
        println!(
            "  {:<6}  {:>3}/{:<3}  HR {:>3}  {}",
            point.label,
            point.record.systolic,
            point.record.diastolic,
            point.record.pulse,
            point.category
        );
    }

    println!();
    println!(
        "Guides: systolic {} mmHg, diastolic {} mmHg",
        join_guides(&SYSTOLIC_GUIDES),
        join_guides(&DIASTOLIC_GUIDES)
    );
    Ok(())
}

fn join_guides(guides: &[u32]) -> String {
    guides
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

fn cmd_distribution(range: TimeRange) -> Result<()> {
    let session = open_session()?;
    let view = session.tracker.dashboard(range, Utc::now(), session.zone);
    let total: usize = view.distribution.iter().map(|c| c.count).sum();

    println!("BP distribution, last {range} ({total} reading(s))");
    for entry in &view.distribution {
        let bar = "█".repeat(entry.count);
        println!("  {:<13} {:>4}  {}", entry.category.label(), entry.count, bar);
    }
    Ok(())
}

fn cmd_export(output: Option<PathBuf>, format: ExportFormat) -> Result<()> {
    let session = open_session()?;
    let records = session.tracker.records();

    let contents = match format {
        ExportFormat::Csv => export::to_csv(records, session.zone),
        ExportFormat::Json => export::to_json(records).context("Could not encode readings")?,
    };

    let output_path = match output {
        Some(path) => path,
        None => {
            session
                .config
                .ensure_directories()
                .context("Could not create export directory")?;
            let today = session.zone.wall_clock(Utc::now()).date();
            session
                .config
                .export_path
                .join(export::export_file_name(today, format))
        }
    };

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    std::fs::write(&output_path, contents)
        .with_context(|| format!("Could not write {}", output_path.display()))?;

    println!(
        "Exported {} reading(s) to {}",
        records.len(),
        output_path.display()
    );
    Ok(())
}

fn cmd_settings(sync_url: Option<String>) -> Result<()> {
    let mut session = open_session()?;

    if let Some(url) = sync_url {
        session.tracker.save_settings(Settings {
            google_sheet_url: Some(url),
            last_sync_time: None,
        })?;
        println!("Settings saved.");
    }

    let settings = session.tracker.settings();
    println!(
        "Sync endpoint: {}",
        settings.sync_endpoint().unwrap_or("(not set)")
    );
    match settings.last_sync_time {
        Some(ts) => println!("Last synced: {}", session.zone.format_stamp(ts)),
        None => println!("Last synced: never"),
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")
}

#[cfg(feature = "sync")]
fn cmd_sync() -> Result<()> {
    use cardiotrack::{SyncDispatcher, SyncOutcome, SyncStart};
    use std::time::Instant;

    let mut session = open_session()?;

    let request = match session.tracker.begin_sync(Instant::now()) {
        SyncStart::Dispatch(request) => request,
        SyncStart::NeedsEndpoint => {
            println!("No sync endpoint configured.");
            println!("Set one with: cardiotrack settings --sync-url <URL>");
            println!("Print the receiver script with: cardiotrack script");
            return Ok(());
        }
    };

    let dispatcher = SyncDispatcher::new(session.zone)?;
    let outcome = runtime()?.block_on(dispatcher.push(&request.endpoint, &request.records));

    session.tracker.complete_sync(
        request.ticket,
        outcome,
        Utc::now().timestamp_millis(),
        Instant::now(),
    )?;

    match outcome {
        SyncOutcome::Delivered => {
            println!("Synced {} reading(s).", request.records.len());
            Ok(())
        }
        SyncOutcome::Failed => bail!("Sync failed. Your readings are unchanged."),
    }
}

#[cfg(not(feature = "sync"))]
fn cmd_sync() -> Result<()> {
    bail!("sync is not available (sync feature not enabled at compile time)")
}

#[cfg(feature = "insight")]
fn cmd_insight() -> Result<()> {
    use cardiotrack::{InsightClient, InsightState};

    let mut session = open_session()?;

    let Some(request) = session.tracker.begin_insight() else {
        println!(
            "Add at least {} readings to get an insight.",
            cardiotrack::app::MIN_RECORDS_FOR_INSIGHT
        );
        return Ok(());
    };

    let client = InsightClient::from_env(&session.config.insight, session.zone)?;
    let reply = runtime()?.block_on(client.request(&request.records));
    session.tracker.complete_insight(request.ticket, reply);

    match session.tracker.insight_state() {
        InsightState::Ready(text) => {
            println!("{text}");
            println!();
            println!("Advisory only. Not a medical diagnosis.");
            Ok(())
        }
        InsightState::Failed(text) => Err(anyhow!("{text}")),
        InsightState::Idle | InsightState::Loading => Ok(()),
    }
}

#[cfg(not(feature = "insight"))]
fn cmd_insight() -> Result<()> {
    bail!("insight is not available (insight feature not enabled at compile time)")
}

fn cmd_config(init: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();

    if init {
        config.save().context("Could not write config file")?;
        config
            .ensure_directories()
            .context("Could not create data directories")?;
        println!("Wrote {:?}", Config::config_path());
        println!();
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!("Data directory: {:?}", config.data_path);
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
    Ok(())
}

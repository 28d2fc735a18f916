use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use vitals_core::confirm::confirm_then;
use vitals_core::stats::reading_severity;
use vitals_core::*;

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Personal blood pressure and blood sugar log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record readings for a day (merged into any existing entry)
    Add {
        /// Date of the readings, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Systolic blood pressure (mmHg)
        #[arg(long, allow_hyphen_values = true)]
        systolic: Option<String>,

        /// Diastolic blood pressure (mmHg)
        #[arg(long, allow_hyphen_values = true)]
        diastolic: Option<String>,

        /// Fasting blood sugar (mg/dL)
        #[arg(long, allow_hyphen_values = true)]
        sugar_before: Option<String>,

        /// Post-meal blood sugar (mg/dL)
        #[arg(long, allow_hyphen_values = true)]
        sugar_after: Option<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show the record for one date
    Show { date: String },

    /// List records in a time window
    List {
        /// all, week or month
        #[arg(long)]
        window: Option<Window>,
    },

    /// Show averages for a time window
    Stats {
        #[arg(long)]
        window: Option<Window>,
    },

    /// Show the health status of a day (defaults to today)
    Status {
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete the record for a date
    Delete {
        date: String,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Delete every record
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Write a JSON backup of all records
    Export {
        /// File or directory to write to (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Merge a JSON backup into the log
    Import { file: PathBuf },

    /// Write a CSV report for a time window
    Report {
        #[arg(long)]
        window: Option<Window>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print chart series (JSON) for a time window
    Chart {
        #[arg(long)]
        window: Option<Window>,
    },

    /// Show or change preferences
    Prefs {
        /// light, dark or toggle
        #[arg(long)]
        theme: Option<String>,

        /// on, off or toggle
        #[arg(long)]
        notifications: Option<String>,
    },
}

fn main() -> Result<()> {
    vitals_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let default_window = config.display.default_window;
    tracing::debug!("Using data directory {:?}", data_dir);

    let backend = FileStore::new(&data_dir);

    match cli.command {
        Commands::Add {
            date,
            systolic,
            diastolic,
            sugar_before,
            sugar_after,
            notes,
        } => {
            let draft = EntryDraft {
                date: Some(date.unwrap_or_else(|| today().format(DATE_FORMAT).to_string())),
                systolic,
                diastolic,
                sugar_before,
                sugar_after,
                notes,
            };
            cmd_add(RecordStore::new(backend), draft)
        }
        Commands::Show { date } => cmd_show(RecordStore::new(backend), &date),
        Commands::List { window } => {
            cmd_list(RecordStore::new(backend), window.unwrap_or(default_window))
        }
        Commands::Stats { window } => {
            cmd_stats(RecordStore::new(backend), window.unwrap_or(default_window))
        }
        Commands::Status { date } => cmd_status(RecordStore::new(backend), date),
        Commands::Delete { date, yes } => {
            cmd_delete(RecordStore::new(backend), &date, &mut *confirmer(yes))
        }
        Commands::Clear { yes } => cmd_clear(RecordStore::new(backend), &mut *confirmer(yes)),
        Commands::Export { output } => cmd_export(RecordStore::new(backend), output),
        Commands::Import { file } => cmd_import(RecordStore::new(backend), file),
        Commands::Report { window, output } => cmd_report(
            RecordStore::new(backend),
            window.unwrap_or(default_window),
            output,
        ),
        Commands::Chart { window } => {
            cmd_chart(RecordStore::new(backend), window.unwrap_or(default_window))
        }
        Commands::Prefs {
            theme,
            notifications,
        } => cmd_prefs(backend, theme, notifications),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn cmd_add(mut store: RecordStore<FileStore>, draft: EntryDraft) -> Result<()> {
    let record = draft.into_record()?;
    let stored = store.save(&record)?;

    println!("✓ Record saved for {}", stored.date);
    print_record(&stored);
    Ok(())
}

fn cmd_show(store: RecordStore<FileStore>, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    match store.get_by_date(date)? {
        Some(record) => {
            print_record(&record);
            println!("  Status: {}", classify_day(Some(&record)));
        }
        None => println!("No record for {}", date),
    }
    Ok(())
}

fn cmd_list(store: RecordStore<FileStore>, window: Window) -> Result<()> {
    let all = store.get_all()?;
    let records = filter_by_window(&all, window, Utc::now());

    if records.is_empty() {
        println!("No records found. Start by adding one!");
    } else {
        println!(
            "{:<12} {:<16} {:<12} {:<12} Notes",
            "Date", "BP (mmHg)", "Fasting", "Post-meal"
        );
        for record in &records {
            let bp = match record.blood_pressure() {
                Some((sys, dia)) => format!(
                    "{}{}/{}{}",
                    sys,
                    marker(Metric::Systolic, sys),
                    dia,
                    marker(Metric::Diastolic, dia)
                ),
                None => "-".into(),
            };
            println!(
                "{:<12} {:<16} {:<12} {:<12} {}",
                record.date.to_string(),
                bp,
                reading_cell(Metric::SugarBefore, record.sugar_before),
                reading_cell(Metric::SugarAfter, record.sugar_after),
                record.notes.as_deref().unwrap_or("-")
            );
        }
    }

    println!();
    print_summary(aggregate(&records).as_ref());
    println!("Today's status: {}", status_for_date(&all, today()));
    Ok(())
}

fn cmd_stats(store: RecordStore<FileStore>, window: Window) -> Result<()> {
    let records = filter_by_window(&store.get_all()?, window, Utc::now());
    println!("Period: {} ({} records)", window.period_label(), records.len());
    print_summary(aggregate(&records).as_ref());
    Ok(())
}

fn cmd_status(store: RecordStore<FileStore>, date: Option<String>) -> Result<()> {
    let date = match date {
        Some(raw) => parse_date(&raw)?,
        None => today(),
    };
    let record = store.get_by_date(date)?;
    println!("Status for {}: {}", date, classify_day(record.as_ref()));
    Ok(())
}

fn cmd_delete(
    mut store: RecordStore<FileStore>,
    date: &str,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let date = parse_date(date)?;
    let message = format!("Are you sure you want to delete the record for {}?", date);

    match confirm_then(confirm, "Delete Record?", &message, || store.delete(date))? {
        Some(true) => println!("✓ Record deleted successfully"),
        Some(false) => println!("No record for {}", date),
        None => println!("Cancelled."),
    }
    Ok(())
}

fn cmd_clear(mut store: RecordStore<FileStore>, confirm: &mut dyn Confirm) -> Result<()> {
    let count = store.get_all()?.len();
    let message = format!("Delete all {} records? This cannot be undone.", count);

    match confirm_then(confirm, "Clear All Records?", &message, || store.clear())? {
        Some(()) => println!("✓ Cleared {} records", count),
        None => println!("Cancelled."),
    }
    Ok(())
}

fn cmd_export(store: RecordStore<FileStore>, output: Option<PathBuf>) -> Result<()> {
    let backup = store.export()?;

    match output {
        None => println!("{}", backup),
        Some(path) => {
            let path = if path.is_dir() {
                path.join(backup_file_name(today()))
            } else {
                path
            };
            std::fs::write(&path, backup)?;
            println!("✓ Backup written to {}", path.display());
        }
    }
    Ok(())
}

fn cmd_import(mut store: RecordStore<FileStore>, file: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&file)?;
    let summary = store.import(&text)?;

    println!("✓ Successfully restored {} records!", summary.imported);
    if summary.skipped > 0 {
        println!("  Skipped {} entries without a date", summary.skipped);
    }
    Ok(())
}

fn cmd_report(
    store: RecordStore<FileStore>,
    window: Window,
    output: Option<PathBuf>,
) -> Result<()> {
    let records = filter_by_window(&store.get_all()?, window, Utc::now());
    let generated_on = today();
    let path = output
        .unwrap_or_else(|| PathBuf::from(report_file_name(window.period_label(), generated_on)));

    let file = std::fs::File::create(&path)?;
    let rows = write_report(&records, window.period_label(), generated_on, file)?;

    println!("✓ Report with {} records written to {}", rows, path.display());
    Ok(())
}

fn cmd_chart(store: RecordStore<FileStore>, window: Window) -> Result<()> {
    let records = filter_by_window(&store.get_all()?, window, Utc::now());
    let series = chart_series(&records);
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn cmd_prefs(
    mut backend: FileStore,
    theme: Option<String>,
    notifications: Option<String>,
) -> Result<()> {
    let mut prefs = Preferences::new(&mut backend);

    if let Some(theme) = theme {
        if theme.eq_ignore_ascii_case("toggle") {
            prefs.toggle_theme()?;
        } else {
            prefs.set_theme(theme.parse()?)?;
        }
    }

    if let Some(setting) = notifications {
        match setting.to_lowercase().as_str() {
            "on" | "true" => prefs.set_notifications_enabled(true)?,
            "off" | "false" => prefs.set_notifications_enabled(false)?,
            "toggle" => {
                prefs.toggle_notifications()?;
            }
            other => {
                return Err(Error::Validation(format!(
                    "Unknown notifications setting '{}' (expected on, off or toggle)",
                    other
                )))
            }
        }
    }

    println!("Theme: {}", prefs.theme()?);
    println!(
        "Reminders: {}",
        if prefs.notifications_enabled()? {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(())
}

fn print_record(record: &HealthRecord) {
    println!("  Date: {}", record.date);
    if let Some((sys, dia)) = record.blood_pressure() {
        println!("  Blood pressure: {}/{} mmHg", sys, dia);
    } else {
        // a lone half of the pair is still stored, show it as-is
        for metric in [Metric::Systolic, Metric::Diastolic] {
            if let Some(v) = record.reading(metric) {
                println!("  {}: {} {}", capitalize(&metric.to_string()), v, metric.unit());
            }
        }
    }
    for metric in [Metric::SugarBefore, Metric::SugarAfter] {
        if let Some(v) = record.reading(metric) {
            println!("  {}: {} {}", capitalize(&metric.to_string()), v, metric.unit());
        }
    }
    if let Some(ref notes) = record.notes {
        println!("  Notes: {}", notes);
    }
}

fn print_summary(stats: Option<&DerivedStats>) {
    let show = |metric: Metric| {
        stats
            .and_then(|s| s.average(metric))
            .map(|v| v.to_string())
            .unwrap_or_else(|| "--".into())
    };

    println!(
        "Avg BP: {} / {} mmHg",
        show(Metric::Systolic),
        show(Metric::Diastolic)
    );
    println!("Avg sugar (before meal): {} mg/dL", show(Metric::SugarBefore));
    println!("Avg sugar (after meal): {} mg/dL", show(Metric::SugarAfter));
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn reading_cell(metric: Metric, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}{}", v, marker(metric, v)),
        None => "-".into(),
    }
}

fn marker(metric: Metric, value: f64) -> &'static str {
    match reading_severity(metric, value) {
        Severity::Normal => "",
        Severity::Warning => "*",
        Severity::Critical => "!",
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    }
}

/// Asks on stdin; anything but y/yes declines, as does end of input
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, title: &str, message: &str) -> Result<bool> {
        println!("{}", title);
        println!("{}", message);
        print!("[y/N] > ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

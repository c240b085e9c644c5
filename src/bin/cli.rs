use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use construction_scheduler::{
    HolidayCache, Jurisdiction, ProjectSettings, Schedule, ScopeLibrary, Session, SettingsError,
    date_from_polars_days, render_timeline, save_schedule_to_csv, save_schedule_to_json, scope,
};
use polars::prelude::{AnyValue, DataFrame};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EMPTY_HINT: &str = "Upload specs or manually input activities to get started.";
const TIMELINE_WIDTH: usize = 48;

#[derive(Parser)]
#[command(
    name = "construction-scheduler",
    version,
    about = "Resolve construction activities into calendar dates"
)]
struct Cli {
    /// Scope library (TOML) used to extract activities from documents
    #[arg(long, global = true)]
    scopes: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a schedule once and print it
    Build(BuildArgs),
    /// Interactive session (the default)
    Repl {
        /// Settings file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Text file with one activity per line
    #[arg(long)]
    activities: Option<PathBuf>,
    /// Plain-text specification document to extract activities from
    #[arg(long)]
    document: Option<PathBuf>,
    /// Settings file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    sqft: Option<u32>,
    #[arg(long)]
    start: Option<NaiveDate>,
    /// NONE, US or US-XX
    #[arg(long)]
    jurisdiction: Option<Jurisdiction>,
    #[arg(long)]
    weather: Option<u32>,
    #[arg(long)]
    buffer: Option<u32>,
    #[arg(long)]
    weather_period: Option<u32>,
    /// Write the schedule sheet as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write entries and summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Print the text timeline after the table
    #[arg(long)]
    timeline: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("construction_scheduler=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Date(days) => date_from_polars_days(*days)
            .map(|date| date.to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_schedule(schedule: &Schedule) {
    match schedule.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering schedule: {}", e),
    }
    match schedule.summary() {
        Some(summary) => {
            println!("Forecast start     : {}", summary.start);
            println!("Forecast finish    : {}", summary.finish);
            println!("Total days         : {}", summary.total_days);
            println!("Activities         : {}", summary.activity_count);
        }
        None => println!("{EMPTY_HINT}"),
    }
}

fn print_settings(settings: &ProjectSettings) {
    println!("Project sqft       : {}", settings.project_sqft);
    println!("Start date         : {}", settings.start_date);
    println!("Jurisdiction       : {}", settings.jurisdiction);
    println!("Weather delay days : {}", settings.weather_delay_days);
    println!("Weather period     : {}", settings.weather_period_days);
    println!("Buffer days        : {}", settings.buffer_days);
    println!("Activity duration  : {}", settings.uniform_duration());
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  say <text...>                      Add a chat message\n  history                            Show chat history, newest first\n  add <name...>                      Append a manual activity\n  activities                         List the current activities\n  clear                              Remove all activities\n  doc <path>                         Extract activities from a text document\n  scopes                             List scope names and keywords\n  settings                           Show project settings\n  set sqft <n>                       Project square footage\n  set start <YYYY-MM-DD>             Project start date\n  set state <NONE|US|US-XX>          Holiday jurisdiction\n  set weather <days>                 Weather delay days (0-10)\n  set period <days>                  Working days between weather delays\n  set buffer <days>                  Buffer days per activity (0-10)\n  compute                            Resolve the schedule\n  show                               Show the last computed schedule\n  timeline                           Text timeline of the last schedule\n  holidays <year>                    List holidays for the jurisdiction\n  export <csv|json> <path>           Write the last schedule to disk\n  quit|exit                          Exit"
    );
}

fn load_settings(path: Option<&Path>) -> Result<ProjectSettings, SettingsError> {
    match path {
        Some(path) => ProjectSettings::load(path),
        None => Ok(ProjectSettings::default()),
    }
}

fn load_scopes(path: Option<&Path>) -> Result<ScopeLibrary, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ScopeLibrary::load_toml(path)?),
        None => Ok(ScopeLibrary::standard()),
    }
}

fn run_build(args: BuildArgs, scopes: &ScopeLibrary) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(sqft) = args.sqft {
        settings.project_sqft = sqft;
    }
    if let Some(start) = args.start {
        settings.start_date = start;
    }
    if let Some(jurisdiction) = args.jurisdiction {
        settings.jurisdiction = jurisdiction;
    }
    if let Some(weather) = args.weather {
        settings.weather_delay_days = weather;
    }
    if let Some(buffer) = args.buffer {
        settings.buffer_days = buffer;
    }
    if let Some(period) = args.weather_period {
        settings.weather_period_days = period;
    }
    settings.validate()?;

    let mut session = Session::new(settings);
    if let Some(path) = &args.activities {
        session.set_manual_activities(&fs::read_to_string(path)?);
    }
    if let Some(path) = &args.document {
        session.load_document(&fs::read_to_string(path)?, scopes);
    }
    if session.activities().is_empty() {
        return Err(EMPTY_HINT.into());
    }

    let calendar = session.settings().calendar(Arc::new(HolidayCache::new()));
    let schedule = session.compute(&calendar)?;
    print_schedule(schedule);
    if args.timeline {
        print!("{}", render_timeline(schedule, TIMELINE_WIDTH));
    }
    if let Some(path) = &args.csv {
        save_schedule_to_csv(schedule, path)?;
        println!("Saved CSV to {}", path.display());
    }
    if let Some(path) = &args.json {
        save_schedule_to_json(schedule, path)?;
        println!("Saved JSON to {}", path.display());
    }
    Ok(())
}

fn handle_set(session: &mut Session, field: Option<&str>, value: Option<&str>) {
    let (Some(field), Some(value)) = (field, value) else {
        println!("Usage: set <sqft|start|state|weather|period|buffer> <value>");
        return;
    };
    let result = match field {
        "sqft" => match value.parse::<u32>() {
            Ok(v) => session.update_settings(|s| s.project_sqft = v),
            Err(_) => {
                println!("Invalid square footage");
                return;
            }
        },
        "start" => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => session.update_settings(|s| s.start_date = date),
            Err(_) => {
                println!("Invalid date, expected YYYY-MM-DD");
                return;
            }
        },
        "state" => match value.parse::<Jurisdiction>() {
            Ok(j) => session.update_settings(|s| s.jurisdiction = j),
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        },
        "weather" | "period" | "buffer" => match value.parse::<u32>() {
            Ok(v) => session.update_settings(|s| match field {
                "weather" => s.weather_delay_days = v,
                "period" => s.weather_period_days = v,
                _ => s.buffer_days = v,
            }),
            Err(_) => {
                println!("Invalid number of days");
                return;
            }
        },
        other => {
            println!("Unknown setting '{}'", other);
            return;
        }
    };
    match result {
        Ok(()) => println!("Updated {}.", field),
        Err(e) => println!("Error: {}", e),
    }
}

fn run_repl(config: Option<&Path>, scopes: ScopeLibrary) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(load_settings(config)?);
    let cache = Arc::new(HolidayCache::new());

    println!("Construction Scheduler (CLI) - type 'help' for commands\n");
    println!("{EMPTY_HINT}");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();
        let mut parts = rest.split_whitespace();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "say" => {
                if session.post_message(rest) {
                    println!("Noted ({} messages).", session.message_count());
                } else {
                    println!("Usage: say <text...>");
                }
            }
            "history" => {
                for message in session.history() {
                    println!("[{}] {}", message.sequence, message.text);
                }
            }
            "add" => {
                if session.push_manual_activity(rest) {
                    println!("Added activity '{}'.", rest);
                } else {
                    println!("Usage: add <name...>");
                }
            }
            "activities" => {
                if session.activities().is_empty() {
                    println!("{EMPTY_HINT}");
                    continue;
                }
                if let Some(source) = session.activity_source() {
                    println!("Source: {:?}", source);
                }
                for (i, name) in session.activities().iter().enumerate() {
                    println!("  {:>3}. {}", i + 1, name);
                }
            }
            "clear" => {
                session.clear_activities();
                println!("Activities cleared.");
            }
            "doc" => {
                if rest.is_empty() {
                    println!("Usage: doc <path>");
                    continue;
                }
                match fs::read_to_string(rest) {
                    Ok(text) => {
                        let found = session.load_document(&text, &scopes);
                        println!("{}", scope::preview(&text));
                        println!("Matched scopes: {}", scopes.matched_scopes(&text).join(", "));
                        println!("Extracted {} activities.", found);
                    }
                    Err(e) => println!("Error reading document: {}", e),
                }
            }
            "scopes" => {
                for scope in &scopes.scopes {
                    println!("  {:<12} {}", scope.name, scope.keywords.join(", "));
                }
            }
            "settings" => print_settings(session.settings()),
            "set" => handle_set(&mut session, parts.next(), parts.next()),
            "compute" => {
                if session.activities().is_empty() {
                    println!("{EMPTY_HINT}");
                    continue;
                }
                let calendar = session.settings().calendar(cache.clone());
                match session.compute(&calendar) {
                    Ok(schedule) => print_schedule(schedule),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "show" => match session.schedule() {
                Some(schedule) => print_schedule(schedule),
                None => println!("No schedule computed yet. Run 'compute'."),
            },
            "timeline" => match session.schedule() {
                Some(schedule) => print!("{}", render_timeline(schedule, TIMELINE_WIDTH)),
                None => println!("No schedule computed yet. Run 'compute'."),
            },
            "holidays" => match parts.next().map(str::parse::<i32>) {
                Some(Ok(year)) => {
                    let calendar = session.settings().calendar(cache.clone());
                    for holiday in calendar.holidays_in_year(year) {
                        println!("  {}  {}", holiday.date, holiday.name);
                    }
                }
                _ => println!("Usage: holidays <year>"),
            },
            "export" => {
                let Some(schedule) = session.schedule() else {
                    println!("No schedule computed yet. Run 'compute'.");
                    continue;
                };
                let result = match (parts.next(), parts.next()) {
                    (Some("csv"), Some(path)) => save_schedule_to_csv(schedule, path),
                    (Some("json"), Some(path)) => save_schedule_to_json(schedule, path),
                    _ => {
                        println!("Usage: export <csv|json> <path>");
                        continue;
                    }
                };
                match result {
                    Ok(()) => println!("Exported schedule."),
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = load_scopes(cli.scopes.as_deref()).and_then(|scopes| match cli.command {
        Some(Commands::Build(args)) => run_build(args, &scopes),
        Some(Commands::Repl { config }) => run_repl(config.as_deref(), scopes),
        None => run_repl(None, scopes),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

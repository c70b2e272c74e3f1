use airwatch_cli::CliContext;
use airwatch_cli::commands::{self, ViewArg, parse_month};
use airwatch_cli::logging;
use airwatch_cli::readline;
use airwatch_types::UiEvent;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;

fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let mut ctx = CliContext::new();

    // Load the configured dataset up front when there is one
    if !ctx.config.data_path.is_empty()
        && std::path::Path::new(&ctx.config.data_path).exists()
        && let Err(err) = commands::load(None, None, &mut ctx)
    {
        tracing::warn!(error = %err, "Failed to load configured dataset");
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut ctx) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "air quality dashboard cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV dataset and start a new session
    Load {
        #[arg(short, long)]
        path: Option<String>,
        #[arg(short, long)]
        boundaries: Option<String>,
    },
    Pollutant {
        name: String,
    },
    /// Restrict to continents; no names clears the filter
    Regions {
        names: Vec<String>,
    },
    /// Restrict trend and summary to countries; no names clears the filter
    Countries {
        names: Vec<String>,
    },
    Dates {
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Month range as YYYY-MM, inclusive of both months
    Months {
        #[arg(value_parser = parse_month)]
        from: (i32, u32),
        #[arg(value_parser = parse_month)]
        to: (i32, u32),
    },
    /// Toggle a country's map selection
    Click {
        country: String,
    },
    Show {
        #[arg(value_enum, default_value = "all")]
        view: ViewArg,
    },
    Filters,
    Report,
    Config,
    SaveConfig,
    Exit,
}

fn respond(line: &str, ctx: &mut CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "airwatch".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Load { path, boundaries }) => {
            commands::load(path.as_deref(), boundaries.as_deref(), ctx)?
        }
        Some(Commands::Pollutant { name }) => {
            commands::apply(UiEvent::SetPollutant { pollutant: name }, ctx)?
        }
        Some(Commands::Regions { names }) => {
            commands::apply(UiEvent::SetRegions { regions: names }, ctx)?
        }
        Some(Commands::Countries { names }) => {
            commands::apply(UiEvent::SetCountries { countries: names }, ctx)?
        }
        Some(Commands::Dates { start, end }) => commands::set_dates(start, end, ctx)?,
        Some(Commands::Months { from, to }) => commands::set_months(from, to, ctx)?,
        Some(Commands::Click { country }) => {
            commands::apply(UiEvent::MapClick { country }, ctx)?
        }
        Some(Commands::Show { view }) => commands::show_view(view, ctx)?,
        Some(Commands::Filters) => commands::show_filters(ctx)?,
        Some(Commands::Report) => commands::show_report(ctx)?,
        Some(Commands::Config) => commands::show_config(ctx)?,
        Some(Commands::SaveConfig) => commands::save_config(ctx)?,
        Some(Commands::Exit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}

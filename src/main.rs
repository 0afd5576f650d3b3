use std::{io, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};

use ghostlap::{
    ComparisonConfig, GhostlapError, SessionHandle, SessionKind, TelemetryProvider,
    compare_fastest_laps, telemetry::load_lap_file, writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SessionArg {
    Fp1,
    Fp2,
    Fp3,
    Q,
    Sprint,
    Race,
}

impl From<SessionArg> for SessionKind {
    fn from(value: SessionArg) -> Self {
        match value {
            SessionArg::Fp1 => SessionKind::Practice(1),
            SessionArg::Fp2 => SessionKind::Practice(2),
            SessionArg::Fp3 => SessionKind::Practice(3),
            SessionArg::Q => SessionKind::Qualifying,
            SessionArg::Sprint => SessionKind::Sprint,
            SessionArg::Race => SessionKind::Race,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the drivers with laps in a session
    Drivers {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        season: u16,
        #[arg(long)]
        round: u32,
        #[arg(long, value_enum, default_value_t = SessionArg::Q)]
        session: SessionArg,
    },
    /// Compare two drivers' fastest laps and write the plot tables as JSON
    Compare {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        season: u16,
        #[arg(long)]
        round: u32,
        #[arg(long, value_enum, default_value_t = SessionArg::Q)]
        session: SessionArg,
        #[arg(short = 'a', long)]
        driver_a: String,
        #[arg(short = 'b', long)]
        driver_b: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Update the saved comparison settings
    Config {
        #[arg(long)]
        grid_points: Option<usize>,
        #[arg(long)]
        pretty_output: Option<bool>,
    },
}

fn drivers(input: &PathBuf, session: SessionHandle) -> Result<(), GhostlapError> {
    let provider = load_lap_file(input)?;
    let drivers = provider.drivers(&session)?;
    if drivers.is_empty() {
        warn!("No laps found for {}", session);
    }
    for driver in drivers {
        println!("{}", driver);
    }
    Ok(())
}

fn compare(
    input: &PathBuf,
    session: SessionHandle,
    driver_a: &str,
    driver_b: &str,
    output: Option<&PathBuf>,
    pretty: bool,
) -> Result<(), GhostlapError> {
    if driver_a == driver_b {
        return Err(GhostlapError::InvalidUserInput {
            field: "driver_b".to_string(),
            reason: "Please select two different drivers".to_string(),
        });
    }

    let config = ComparisonConfig::from_local_file().unwrap_or_default();
    let provider = load_lap_file(input)?;
    let comparison = compare_fastest_laps(&provider, &session, driver_a, driver_b, &config)?;

    let pretty = pretty || config.pretty_output;
    match output {
        Some(output_file) => writer::write_report(output_file, &comparison, pretty),
        None => writer::write_report_to(io::stdout().lock(), &comparison, pretty),
    }
}

fn update_config(
    grid_points: Option<usize>,
    pretty_output: Option<bool>,
) -> Result<(), GhostlapError> {
    let mut config = ComparisonConfig::from_local_file().unwrap_or_default();
    if let Some(grid_points) = grid_points {
        config.grid_points = grid_points;
    }
    if let Some(pretty_output) = pretty_output {
        config.pretty_output = pretty_output;
    }
    config.save()?;
    info!(
        "Saved config to {:?}: {:?}",
        ComparisonConfig::default_path()?,
        config
    );
    Ok(())
}

fn main() {
    colog::init();

    let cli = Args::parse();
    let result = match &cli.command {
        Commands::Drivers {
            input,
            season,
            round,
            session,
        } => drivers(
            input,
            SessionHandle {
                season: *season,
                round: *round,
                kind: (*session).into(),
            },
        ),
        Commands::Compare {
            input,
            season,
            round,
            session,
            driver_a,
            driver_b,
            output,
            pretty,
        } => compare(
            input,
            SessionHandle {
                season: *season,
                round: *round,
                kind: (*session).into(),
            },
            driver_a,
            driver_b,
            output.as_ref(),
            *pretty,
        ),
        Commands::Config {
            grid_points,
            pretty_output,
        } => update_config(*grid_points, *pretty_output),
    };

    match result {
        Ok(()) => info!("Done"),
        Err(e) if e.is_recoverable() => {
            warn!("Cannot compare these laps: {}", e);
            std::process::exit(2);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

//! Command line interface

mod simulate;

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use looplog::{Config, SessionBuilder, TimestampMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use clap;

use self::simulate::{ControlLog, Plant};

pub trait Main {
    fn main(self) -> Result<()>;
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the default configuration
    Config,
    /// Record a simulated control loop to a log file
    Record(Record),
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Record {
    /// Log file name, without extension
    name: String,
    /// Path to a configuration file. Defaults are used if not provided.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory for the log file. Overrides configuration file.
    #[arg(short, long)]
    directory: Option<PathBuf>,
    /// Number of loop iterations to record
    #[arg(short = 'n', long, default_value_t = 500)]
    rows: u64,
    /// Loop period in milliseconds
    #[arg(long, default_value_t = 20)]
    interval_ms: u64,
    /// Leave out the time columns
    #[arg(long)]
    no_timestamps: bool,
}

impl Main for Cli {
    fn main(self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
        match self.command {
            Commands::Config => {
                print!("{}", Config::default().to_toml()?);
            }
            Commands::Record(record) => {
                record.main()?;
            }
        }
        Ok(())
    }
}

impl Main for Record {
    fn main(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => Config::default(),
        };
        let log = ControlLog::default();
        let mut builder = SessionBuilder::new(&self.name)
            .with_config(&config)
            .fields(log.columns());
        if let Some(directory) = self.directory {
            builder = builder.directory(directory);
        }
        if self.no_timestamps {
            builder = builder.timestamps(TimestampMode::None);
        }

        let period = Duration::from_millis(self.interval_ms);
        let rows = builder.run(|session| -> Result<u64> {
            if let Some(path) = session.path() {
                info!("Recording to {}", path.display());
            }
            log.status.set("INIT");
            session.write_row().context("Failed to write initial row")?;

            log.status.set("RUNNING");
            let mut plant = Plant::default();
            for i in 0..self.rows {
                let (output, saturated) = plant.step(i, period.as_secs_f64());
                log.loop_counter.set(i);
                log.saturated.set(saturated);
                log.position.set(plant.position);
                log.output.set(output);
                log.setpoint.set(plant.setpoint);
                session.write_row().context("Failed to write row")?;
                thread::sleep(period);
            }

            log.status.set("DONE");
            session.write_row().context("Failed to write final row")?;
            Ok(session.rows_written())
        })?;
        info!("Recorded {rows} rows");
        Ok(())
    }
}

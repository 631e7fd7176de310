use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use ecomonitor_core::{
    ApiKey, BuzzerTimer, ChannelSink, ConfigStore, Dashboard, LocalDataClient, Notification,
    NotificationKind, PLACEHOLDER_CITY, ProviderId, RefreshWorkflow, dashboard, notify::drain,
    provider_from_id, sensor::DEFAULT_LOCAL_URL,
};
use inquire::Text;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "ecomonitor", version, about = "EcoMonitor dashboard")]
pub struct Cli {
    /// Use this file instead of the platform config location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a weather API key and refresh the forecast with it.
    Configure {
        /// Key to save; prompts for it when omitted.
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        weather: WeatherArgs,
    },

    /// Show the dashboard.
    Show {
        #[command(flatten)]
        weather: WeatherArgs,

        /// Buzzer timer in minutes after midnight (0-1440).
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        timer: i64,

        /// Also query the local sensor server.
        #[arg(long)]
        sensors: bool,

        /// Base URL of the local sensor server.
        #[arg(long, default_value = DEFAULT_LOCAL_URL)]
        sensor_url: String,
    },

    /// Show where the API key is stored and whether one is set.
    Key,
}

#[derive(Debug, clap::Args)]
pub struct WeatherArgs {
    /// City to request the forecast for.
    #[arg(long, default_value = PLACEHOLDER_CITY)]
    pub city: String,

    /// Weather provider: "stub" or "openweather".
    #[arg(long, default_value = "stub")]
    pub provider: String,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let store = match self.config {
            Some(path) => ConfigStore::at(path),
            None => ConfigStore::from_platform_dirs(),
        };

        match self.command {
            Command::Configure { key, weather } => {
                let key = match key {
                    Some(key) => ApiKey::new(key),
                    None => prompt_key(&store.load())?,
                };

                let (workflow, mut notes) = build_workflow(store, &weather)?;
                workflow.submit_key(key).await;

                print_notifications(&mut notes);
                println!();
                let report = workflow.current_report();
                print_lines("Weather Forecast", &dashboard::weather_card(report.as_ref()));
            }
            Command::Show { weather, timer, sensors, sensor_url } => {
                let (workflow, mut notes) = build_workflow(store, &weather)?;
                workflow.mount().await;

                if workflow.api_key().is_empty() {
                    println!(
                        "No API key configured.\n\
                         Hint: run `ecomonitor configure` and enter your API key.\n"
                    );
                }

                let reading = if sensors {
                    LocalDataClient::new(sensor_url).fetch().await
                } else {
                    None
                };
                let report = workflow.current_report();

                let view = Dashboard {
                    sensor: reading.as_ref(),
                    weather: report.as_ref(),
                    timer: BuzzerTimer::new(timer),
                };

                print_notifications(&mut notes);
                print!("{view}");
                println!("\n\u{a9} {} EcoMonitor. All rights reserved.", Local::now().year());
            }
            Command::Key => {
                match store.path() {
                    Some(path) => println!("Config file: {}", path.display()),
                    None => println!("Config file: <unavailable>"),
                }
                println!("API key: {}", store.load().redacted());
            }
        }

        Ok(())
    }
}

type Workflow = RefreshWorkflow<Box<dyn ecomonitor_core::WeatherFetcher>, ChannelSink>;

fn build_workflow(
    store: ConfigStore,
    args: &WeatherArgs,
) -> anyhow::Result<(Workflow, UnboundedReceiver<Notification>)> {
    let provider = ProviderId::try_from(args.provider.as_str())?;
    let (sink, notes) = ChannelSink::channel();
    debug!(%provider, city = %args.city, "Building refresh workflow");

    let workflow =
        RefreshWorkflow::new(store, provider_from_id(provider), sink).with_city(args.city.clone());

    Ok((workflow, notes))
}

fn prompt_key(current: &ApiKey) -> anyhow::Result<ApiKey> {
    let answer = Text::new("API key:")
        .with_help_message("Enter your OpenWeatherMap API key")
        .with_initial_value(current.as_str())
        .prompt()
        .context("Failed to read API key")?;

    Ok(ApiKey::new(answer))
}

fn print_notifications(notes: &mut UnboundedReceiver<Notification>) {
    for note in drain(notes) {
        let tag = match note.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Failure => "error",
        };
        println!("[{tag}] {}: {}", note.title, note.detail);
    }
}

fn print_lines(title: &str, lines: &[String]) {
    println!("{title}");
    for line in lines {
        println!("  {line}");
    }
}

mod display;

use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use dropwatch_core::colors::CatppuccinExt;
use dropwatch_core::output::{get_formatter, OutputFormat, OutputFormatter};
use dropwatch_core::{ConfigOverrides, Monitor, MonitorConfig, RunOptions};
use tracing_subscriber::EnvFilter;

use display::Spinner;

#[derive(Parser)]
#[command(name = "dropwatch")]
#[command(about = "Watch a domain on DropCatch and WHOIS, and email when its status changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML config file (merged over ./dropwatch.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (human or json)
    #[arg(short, long, global = true, default_value = "human")]
    format: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Domain to watch
    #[arg(short, long, global = true)]
    domain: Option<String>,

    /// Status file path
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Skip the WHOIS check
    #[arg(long, global = true)]
    no_whois: bool,

    /// Email on every run, even when nothing changed
    #[arg(long, global = true)]
    notify_on_every_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the domain, compare with the last run, notify and save (default)
    Run {
        /// Check and compare only; do not send email or write the status file
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the last saved status without checking
    Show,
    /// Print the effective configuration (password redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();

    let overrides = ConfigOverrides {
        domain: cli.domain.clone(),
        state_file: cli.state_file.clone(),
        disable_whois: cli.no_whois,
        notify_on_every_run: cli.notify_on_every_run,
    };

    let config = match MonitorConfig::load_with(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".ctp_red(), e);
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Commands::Run { dry_run: false });
    let formatter = get_formatter(output_format, !cli.no_color);

    if let Err(e) = execute_command(command, &config, output_format, formatter.as_ref()).await {
        eprintln!("{} {}", "Error:".ctp_red(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn execute_command(
    command: Commands,
    config: &MonitorConfig,
    output_format: OutputFormat,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<()> {
    match command {
        Commands::Run { dry_run } => {
            let monitor = Monitor::new(config)?;

            let spinner = if output_format == OutputFormat::Human {
                println!(
                    "Checking {} status at {}",
                    monitor.domain(),
                    Local::now().format("%Y-%m-%d %H:%M:%S")
                );
                Spinner::new(&format!("Checking {}...", monitor.domain()))
            } else {
                Spinner::hidden()
            };

            let report = monitor.run_with(RunOptions { dry_run }).await;
            spinner.finish();

            println!("{}", formatter.format_report(&report?));
        }
        Commands::Show => {
            let monitor = Monitor::new(config)?;
            let previous = monitor.store().load().await?;
            println!("{}", formatter.format_previous(monitor.domain(), &previous));
        }
        Commands::Config => {
            println!("{}", formatter.format_config(config));
        }
    }

    Ok(())
}

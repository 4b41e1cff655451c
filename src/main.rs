use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use traffic_topn::config::{Config, DEFAULT_TOP_N};
use traffic_topn::{run, source, Partitioning, Sink, View};

#[derive(Parser)]
#[command(
    name = "traffic-topn",
    version,
    about = "Rank traffic lights by total cars passed, aggregated across a worker fleet"
)]
struct Cli {
    /// Input file of `<timestamp> <light_id> <cars_passed>` lines
    input: PathBuf,

    /// Number of lights to report
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N as i64, allow_negative_numbers = true)]
    top_n: i64,

    /// Number of workers (defaults to available parallelism)
    #[arg(short, long, allow_negative_numbers = true)]
    workers: Option<i64>,

    /// How events are assigned to workers
    #[arg(short, long, value_enum, default_value_t = Partitioning::Contiguous)]
    partition: Partitioning,

    /// Which ranked lists to write
    #[arg(long, value_enum, default_value_t = View::Global)]
    view: View,

    /// Output file, or `-` for stdout
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.log_format, cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let workers = cli
        .workers
        .unwrap_or_else(|| Config::default().workers as i64);
    let config = Config::new(cli.top_n, workers)
        .context("invalid configuration")?
        .with_partitioning(cli.partition);

    let input = source::read_input(&cli.input)?;
    info!(
        path = %cli.input.display(),
        bytes = input.len(),
        workers = config.workers,
        top_n = config.top_n,
        "starting run"
    );

    let outcome = run(&config, &input)?;
    let rendered = outcome.report.render(cli.view);

    let sink = Sink::from_arg(&cli.output);
    sink.write(&rendered)?;
    if let Sink::File(path) = &sink {
        println!("Output written to {}", path.display());
    }
    Ok(())
}

fn setup_tracing(format: LogFormat, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("traffic_topn=debug,info")
        } else {
            EnvFilter::new("traffic_topn=info,warn")
        }
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

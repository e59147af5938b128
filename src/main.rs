use clap::Parser;
use ssamon::ssacli::DEFAULT_SSACLI_PATH;
use ssamon::{Monitor, Status, ThresholdStore};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ssamon")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = DEFAULT_SSACLI_PATH)]
    ssacli: PathBuf,
    #[arg(long)]
    thresholds: Option<PathBuf>,
    #[arg(long)]
    simple: bool,
    #[arg(long)]
    print_example_thresholds: bool,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_example_thresholds {
        println!("{}", ThresholdStore::example_yaml());
        return;
    }

    let monitor = match Monitor::new(cli.ssacli, cli.thresholds) {
        Ok(monitor) => monitor,
        Err(err) => {
            error!(error = %err, "failed to read controller configuration");
            std::process::exit(exit_code(Status::Unknown));
        }
    };

    if cli.simple {
        println!("{}", monitor.simple_description());
        return;
    }

    let (status, report) = monitor.is_ok();
    println!("{report}");
    std::process::exit(exit_code(status));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn exit_code(status: Status) -> i32 {
    match status {
        Status::Ok => 0,
        Status::Warning => 1,
        Status::Critical => 2,
        Status::Unknown => 3,
    }
}

mod config;
mod error;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use sandbox::{ExecutionOutcome, JobResponse, Sandbox};
use sandbox_docker::{DockerSandbox, check_prerequisites};
use tracing_subscriber::fmt::time::FormatTime;

use crate::error::{RunnerError, RunnerResult};

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[derive(Parser)]
#[command(name = "runner", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the container runtime and staging directory are usable
    Check(CheckArgs),
    /// Compile and run one submission in the sandbox
    Run(RunArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Path to the runner YAML config
    #[arg(long, default_value = "runner.yaml")]
    config: PathBuf,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the runner YAML config
    #[arg(long, default_value = "runner.yaml")]
    config: PathBuf,
    /// Source file to compile and run
    source: PathBuf,
    /// File piped to the program's stdin (empty when omitted)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Print the outcome as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args).await,
        Command::Run(args) => run_job(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_check(args: CheckArgs) -> RunnerResult<ExitCode> {
    let config = config::load(&args.config).await?;
    check_prerequisites(&config.docker_config()).await?;
    println!("ok");
    Ok(ExitCode::SUCCESS)
}

async fn run_job(args: RunArgs) -> RunnerResult<ExitCode> {
    let config = config::load(&args.config).await?;
    let docker_config = config.docker_config();
    check_prerequisites(&docker_config).await?;

    let code = tokio::fs::read_to_string(&args.source).await?;
    let stdin = match &args.input {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => String::new(),
    };

    let sandbox = DockerSandbox::new(docker_config);
    let outcome = sandbox.run(&code, &stdin).await;
    let response = JobResponse::from(&outcome);

    if args.json {
        let rendered = serde_json::to_string(&response)
            .map_err(|e| RunnerError::Internal(format!("serialize response: {e}")))?;
        println!("{rendered}");
    } else {
        match &response {
            JobResponse::Ok { output } => {
                print!("{output}");
                if !output.ends_with('\n') {
                    println!();
                }
            }
            JobResponse::Error { message } => eprintln!("{message}"),
        }
    }

    Ok(match outcome {
        ExecutionOutcome::Success { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

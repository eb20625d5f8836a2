//! Command-line research run.
//!
//! ```bash
//! research "EV Growth in India"
//! research --config ./crew "Solid-state batteries"
//! ```
//!
//! With `--config DIR` the pipeline is loaded from `DIR/agents.yaml` and
//! `DIR/tasks.yaml`; otherwise the built-in EV market research crew runs.
//! `CREW_MAX_ITER` and `CREW_VERBOSE` apply to both, except where an agent in
//! `agents.yaml` sets its own value.
//!
//! Exit codes: 0 on success, 1 when the run fails, 2 on invalid input.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use research_crew::agents::default_executor;
use research_crew::pipeline::section_title;
use research_crew::server::INVALID_TOPIC_MESSAGE;
use research_crew::utilities::{Printer, PrinterColor};
use research_crew::{Orchestrator, PipelineDefinition, Settings, ToolRegistry};

const DEFAULT_TOPIC: &str = "EV Growth in India";

struct Args {
    config_dir: Option<PathBuf>,
    topic: String,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config_dir = None;
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let dir = args.next().context("--config needs a directory")?;
                config_dir = Some(PathBuf::from(dir));
            }
            "--help" | "-h" => {
                println!("usage: research [--config DIR] [TOPIC...]");
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ => words.push(arg),
        }
    }

    let topic = if words.is_empty() {
        DEFAULT_TOPIC.to_string()
    } else {
        words.join(" ")
    };
    Ok(Args { config_dir, topic })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,research_crew=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let printer = Printer::new();
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            printer.eprint(&format!("{:#}", e), PrinterColor::Red);
            return ExitCode::from(2);
        }
    };
    if args.topic.trim().is_empty() {
        printer.eprint(INVALID_TOPIC_MESSAGE, PrinterColor::Red);
        return ExitCode::from(2);
    }

    match run(&args, &printer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            printer.eprint(&format!("Error during research process: {:#}", e), PrinterColor::BoldRed);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, printer: &Printer) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let registry = ToolRegistry::from_settings(&settings);

    let definition = PipelineDefinition::load(args.config_dir.as_deref(), &registry, &settings)
        .context("failed to load pipeline")?;

    let orchestrator = Orchestrator::build(&args.topic, &definition, default_executor(&settings))?;

    printer.print(
        &format!("Starting research on: {}", orchestrator.topic()),
        PrinterColor::BoldCyan,
    );
    let result = orchestrator.run().await?;

    printer.print(&format!("Timestamp: {}", result.formatted_timestamp()), PrinterColor::Cyan);
    for output in result.tasks_output() {
        printer.print(&format!("\n=== {} ===", section_title(&output.name)), PrinterColor::BoldYellow);
        println!("{}", output.raw);
    }
    Ok(())
}

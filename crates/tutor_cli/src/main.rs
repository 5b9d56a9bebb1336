mod completer;
mod config;
mod format;
mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tutor_api_models::ErrorJsonOutput;
use tutor_engine::Tutor;

use config::TutorConfig;

#[derive(Parser, Debug)]
#[command(name = "tutor", version, about = "Step-by-step math tutor for Indonesian and English questions")]
struct Cli {
    /// Log engine decisions (debug level) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve one problem and print the worked solution
    Solve {
        /// The question, e.g. "2x + 5 = 13" or "Turunan dari x^3"
        text: String,
        /// Print the solution as JSON
        #[arg(long)]
        json: bool,
        /// Print only the category and final answer
        #[arg(long)]
        no_steps: bool,
    },
    /// Interactive session (default)
    Repl,
    /// List example problems by category
    Examples,
}

fn init_tracing(verbose: bool, config: &TutorConfig) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn solve_command(config: &TutorConfig, text: &str, json: bool, no_steps: bool) -> Result<()> {
    let tutor = Tutor::new().with_options(config.solve_options());
    let solution = tutor.solve(text, None);
    if json {
        match solution.to_json().to_json_pretty() {
            Ok(out) => println!("{}", out),
            Err(e) => println!(
                "{}",
                ErrorJsonOutput::with_input(e.to_string(), text).to_json_pretty()
            ),
        }
    } else {
        println!("{}", format::render(&solution, config.show_steps && !no_steps));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = match TutorConfig::read() {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (TutorConfig::default(), Some(e)),
    };
    // the subscriber must exist before a bad config file can be reported
    init_tracing(cli.verbose, &config);
    if let Some(e) = config_error {
        tracing::warn!("{:#}, using defaults", e);
    }

    match cli.command.unwrap_or(Command::Repl) {
        Command::Solve {
            text,
            json,
            no_steps,
        } => solve_command(&config, &text, json, no_steps)?,
        Command::Repl => repl::Repl::new(config)
            .run()
            .context("interactive session failed")?,
        Command::Examples => println!("{}", repl::examples_text()),
    }
    Ok(())
}

//! `gua` - cast a hexagram and have it read.

mod render;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gua_engine::{
    Cast, ClientSettings, DivinationError, DivinationResult, GeminiClient, GuaConfig, Hexagram,
    TextGenerator, ask_follow_up, divine, sanitize_terminal_text,
};

#[derive(Parser)]
#[command(name = "gua", version)]
#[command(about = "I Ching readings in the manner of the Takashima Ekidan")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the eight trigrams and their ids
    Trigrams,
    /// Show a hexagram (and its changed form) without asking the model
    Hexagram {
        /// Upper (outer) trigram id, 1-8
        #[arg(long, short)]
        upper: u8,
        /// Lower (inner) trigram id, 1-8
        #[arg(long, short)]
        lower: u8,
        /// Moving line, 1-6 counted from the bottom
        #[arg(long)]
        line: Option<u8>,
    },
    /// Cast a hexagram for a question and request a reading
    Cast {
        /// Upper (outer) trigram id, 1-8
        #[arg(long, short)]
        upper: u8,
        /// Lower (inner) trigram id, 1-8
        #[arg(long, short)]
        lower: u8,
        /// Moving line, 1-6 counted from the bottom
        #[arg(long)]
        line: u8,
        /// Print the reading as JSON
        #[arg(long, conflicts_with = "report")]
        json: bool,
        /// Print the plain-text summary report
        #[arg(long)]
        report: bool,
        /// Exit after the reading instead of taking follow-up questions
        #[arg(long)]
        no_follow_up: bool,
        /// The question to divine
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than interleave logs with the reading.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => warnings.push(format!(
                "Failed to open log file {}: {e}",
                candidate.display()
            )),
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.gua/logs/gua.log
    if let Some(config_path) = GuaConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("gua.log"));
    }

    // Fallback: ./.gua/logs/gua.log
    candidates.push(PathBuf::from(".gua").join("logs").join("gua.log"));

    candidates
}

fn load_settings() -> ClientSettings {
    let config = match GuaConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Warning: {err}; using defaults");
            None
        }
    };
    ClientSettings::resolve(config.as_ref())
}

fn print_error(err: &DivinationError) {
    eprintln!("Error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("Hint: {hint}");
    }
}

/// Exit status for a failed reading: 2 for bad input, 1 for everything else.
fn failure_code(err: &DivinationError) -> u8 {
    if err.is_input_error() { 2 } else { 1 }
}

/// Map a line of follow-up input to the question to ask.
///
/// A number picks one of the suggestions; anything else is asked as typed.
/// `None` ends the session.
fn follow_up_question(input: &str, suggestions: &[String]) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let picked = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| suggestions.get(index));
    Some(picked.map_or_else(|| input.to_string(), Clone::clone))
}

async fn follow_up_loop<R, G, W>(
    input: R,
    generator: &G,
    settings: &ClientSettings,
    result: &DivinationResult,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    G: TextGenerator + ?Sized,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "\n追问（序号选建议，回车结束）> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(question) = follow_up_question(&line, &result.analysis().follow_ups) else {
            break;
        };

        let config = settings.follow_up_config();
        match ask_follow_up(generator, &config, result, &question).await {
            Ok(text) => {
                writeln!(out)?;
                write!(out, "{}", render::answer(&text))?;
            }
            Err(err) => print_error(&err),
        }
    }
    writeln!(out)?;
    Ok(())
}

async fn run_cast(
    upper: u8,
    lower: u8,
    line: u8,
    question: &str,
    output: Output,
    follow_up: bool,
) -> Result<ExitCode> {
    let settings = load_settings();
    let client = GeminiClient;
    let config = settings.analysis_config();

    eprintln!("正在解卦，请稍候…");
    let result = match divine(&client, &config, question, upper, lower, line).await {
        Ok(result) => result,
        Err(err) => {
            print_error(&err);
            return Ok(ExitCode::from(failure_code(&err)));
        }
    };

    let mut stdout = std::io::stdout().lock();
    match output {
        Output::Json => {
            let json = serde_json::to_string_pretty(&result).context("serializing reading")?;
            writeln!(stdout, "{json}")?;
            return Ok(ExitCode::SUCCESS);
        }
        Output::Report => write!(stdout, "{}", sanitize_terminal_text(&result.report()))?,
        Output::Text => write!(stdout, "{}", render::analysis(&result))?,
    }

    if follow_up {
        let stdin = BufReader::new(tokio::io::stdin());
        follow_up_loop(stdin, &client, &settings, &result, &mut stdout).await?;
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Text,
    Json,
    Report,
}

fn show_hexagram(upper: u8, lower: u8, line: Option<u8>) -> Result<()> {
    let text = match line {
        Some(line) => {
            let cast = Cast::new(upper, lower, line)?;
            render::cast(&cast.original, cast.moving_line, &cast.changed)
        }
        None => render::hexagram(&Hexagram::compose(upper, lower)?, None),
    };
    print!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Trigrams => {
            print!("{}", render::trigram_table());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Hexagram { upper, lower, line } => {
            // Every failure here is a bad id or line.
            if let Err(err) = show_hexagram(upper, lower, line) {
                eprintln!("Error: {err}");
                return Ok(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Cast {
            upper,
            lower,
            line,
            json,
            report,
            no_follow_up,
            question,
        } => {
            let output = if json {
                Output::Json
            } else if report {
                Output::Report
            } else {
                Output::Text
            };
            run_cast(
                upper,
                lower,
                line,
                &question.join(" "),
                output,
                !no_follow_up,
            )
            .await
        }
    }
}

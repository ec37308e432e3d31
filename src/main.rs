//! Symptriage: symptom-to-disease triage.
//!
//! Main entry point. Runs the terminal UI by default; `--symptoms` answers a
//! single request and exits.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use symptriage::adapters::sanitize::SanitizingMakeWriter;
use symptriage::adapters::CsvReferenceSource;
use symptriage::application::chat::{error_text, ChatResponse};
use symptriage::application::{format_for_chat, ChatMessage};
use symptriage::config::LogMode;
use symptriage::tui::App;
use symptriage::{DiseasePredictor, Settings};

#[derive(Debug, PartialEq)]
enum Command {
    Tui,
    Predict { symptoms: String, json: bool },
    ListSymptoms { json: bool },
    Help,
}

#[derive(Debug)]
struct Args {
    command: Command,
    model_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
}

fn usage() -> String {
    [
        "Usage: symptriage [--model-dir <dir>] [--data-dir <dir>]",
        "                  [--symptoms <comma-separated>] [--list-symptoms] [--json]",
        "",
        "Without --symptoms or --list-symptoms the interactive terminal UI starts.",
    ]
    .join("\n")
}

fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut symptoms: Option<String> = None;
    let mut list = false;
    let mut json = false;
    let mut help = false;
    let mut model_dir: Option<PathBuf> = None;
    let mut data_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--symptoms" | "-s" => {
                symptoms = Some(args.next().ok_or_else(usage)?);
            }
            "--model-dir" => {
                model_dir = Some(PathBuf::from(args.next().ok_or_else(usage)?));
            }
            "--data-dir" => {
                data_dir = Some(PathBuf::from(args.next().ok_or_else(usage)?));
            }
            "--list-symptoms" => list = true,
            "--json" => json = true,
            "-h" | "--help" => help = true,
            other => return Err(format!("Unknown argument: {other}\n{}", usage())),
        }
    }

    let command = match (help, symptoms, list) {
        (true, _, _) => Command::Help,
        (false, Some(_), true) => {
            return Err(format!(
                "--symptoms and --list-symptoms are exclusive\n{}",
                usage()
            ))
        }
        (false, Some(symptoms), false) => Command::Predict { symptoms, json },
        (false, None, true) => Command::ListSymptoms { json },
        (false, None, false) if json => {
            return Err(format!("--json needs --symptoms or --list-symptoms\n{}", usage()))
        }
        (false, None, false) => Command::Tui,
    };

    Ok(Args {
        command,
        model_dir,
        data_dir,
    })
}

fn init_logging(settings: &Settings, tui: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Writing logs to the terminal corrupts the TUI (alternate screen), and
    // one-shot commands keep stdout for their own output.
    let interactive = std::io::stdout().is_terminal();
    let use_file = match settings.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => tui && interactive,
    };

    let (writer, guard) = if use_file {
        if let Some(parent) = settings.log_file.parent() {
            // Best-effort: a missing directory surfaces as an open error below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
            .with_context(|| format!("Failed to open log file {:?}", settings.log_file))?;
        tracing_appender::non_blocking(file)
    } else if tui {
        tracing_appender::non_blocking(std::io::stdout())
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(SanitizingMakeWriter::with_max_bytes(writer, settings.sanitize_max_bytes)),
        )
        .init();

    Ok(guard)
}

fn print_messages(messages: &[ChatMessage]) {
    for message in messages {
        match message {
            ChatMessage::Prediction {
                disease,
                probability,
                description,
            } => {
                println!("🔍 {disease} ({probability})");
                println!("{description}");
            }
            ChatMessage::Text { content }
            | ChatMessage::Precautions { content }
            | ChatMessage::Alternatives { content }
            | ChatMessage::Symptoms { content } => print!("{content}"),
        }
        println!();
    }
}

fn run_predict(settings: &Settings, symptoms: &str, json: bool) -> Result<()> {
    let predictor = DiseasePredictor::from_settings(settings).context("Failed to load predictor")?;

    match predictor.predict_and_info(symptoms) {
        Ok(outcome) => {
            if json {
                let response = ChatResponse::new(outcome);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_messages(&format_for_chat(&outcome));
            }
            Ok(())
        }
        Err(e) if json => {
            let body = serde_json::json!({ "status": "error", "error": error_text(&e) });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!(error_text(&e))),
    }
}

fn run_list(settings: &Settings, json: bool) -> Result<()> {
    let predictor = DiseasePredictor::from_settings(settings).context("Failed to load predictor")?;
    if json {
        let body = serde_json::json!({
            "symptoms": predictor.symptoms(),
            "diseases": predictor.classes(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for symptom in predictor.symptoms() {
            println!("{symptom}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let mut settings = Settings::from_env_or_default();
    if let Some(dir) = args.model_dir {
        settings.model_dir = dir;
    }
    if let Some(dir) = args.data_dir {
        let source = CsvReferenceSource::in_dir(&dir);
        settings.description_csv = source.description_path;
        settings.precaution_csv = source.precaution_path;
        settings.severity_csv = source.severity_path;
    }

    if args.command == Command::Help {
        println!("{}", usage());
        return Ok(());
    }

    let _guard = init_logging(&settings, args.command == Command::Tui)?;

    match args.command {
        Command::Predict { symptoms, json } => run_predict(&settings, &symptoms, json),
        Command::ListSymptoms { json } => run_list(&settings, json),
        Command::Help => Ok(()),
        Command::Tui => {
            tracing::info!("Starting Symptriage...");

            let mut app = App::new(&settings)?;
            app.run()?;

            tracing::info!("Symptriage shutdown complete.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        parse_args(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn test_default_is_tui() {
        let args = parse(&[]).expect("args");
        assert_eq!(args.command, Command::Tui);
        assert!(args.model_dir.is_none());
    }

    #[test]
    fn test_one_shot_flags() {
        let args = parse(&["--symptoms", "itching, skin rash", "--json", "--model-dir", "m"])
            .expect("args");
        assert_eq!(
            args.command,
            Command::Predict {
                symptoms: "itching, skin rash".into(),
                json: true
            }
        );
        assert_eq!(args.model_dir, Some(PathBuf::from("m")));

        let args = parse(&["--list-symptoms"]).expect("args");
        assert_eq!(args.command, Command::ListSymptoms { json: false });
    }

    #[test]
    fn test_bad_flags() {
        assert!(parse(&["--symptoms"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--json"]).is_err());
        assert!(parse(&["--symptoms", "x", "--list-symptoms"]).is_err());
        assert_eq!(parse(&["-h", "--bogus"]).map(|a| a.command).ok(), None);
        assert_eq!(parse(&["--help"]).expect("args").command, Command::Help);
    }
}

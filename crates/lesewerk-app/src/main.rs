// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk — handwritten note reader
//
// Entry point. Initialises logging, loads the configuration, runs one
// recognition session over the given image and prints the text.
//
// Exit status: 0 when text was read (possibly empty), 1 when recognition
// failed, 2 for usage, configuration or file problems.

mod cli;
mod services;

use std::process::ExitCode;

use lesewerk_core::config::AppConfig;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::human_errors::{HumanError, humanize_error, humanize_failure};
use lesewerk_core::types::{RawImage, SessionState};
use lesewerk_document::scan::ocr::{self, OcrConfig, OcrsEngine};
use lesewerk_session::{RecognitionSession, SessionOptions};

use cli::{Args, Command};
use services::{data_dir, export};

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match cli::parse(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            print!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Read(args)) => args,
        Err(e) => {
            eprintln!("lesewerk: {e}\n\n{}", cli::USAGE);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    tracing::info!("Lesewerk starting");

    match read(&args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "lesewerk aborted");
            report(&humanize_error(&e));
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Run one session over `args.image`. Errors returned from here happen
/// before the session starts or while exporting.
async fn read(args: &Args) -> Result<ExitCode> {
    let config = load_config(args)?;

    let image = RawImage::from_path(&args.image)?;
    let engine = OcrsEngine::new(ocr_config(&config));
    let session = RecognitionSession::new(engine, SessionOptions::from_config(&config))?;

    let id = session.start(image);
    let outcome = session.wait_for_terminal(id).await;

    match outcome {
        Some(SessionState::Completed(text)) => {
            println!("{text}");
            if let Some(path) = args.export_path(&config) {
                if export::save_text(&path, &text)? {
                    eprintln!("Saved to {}", path.display());
                } else {
                    eprintln!("No text was found, so nothing was saved.");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(SessionState::Failed(reason)) => {
            report(&humanize_failure(&reason));
            Ok(ExitCode::from(EXIT_FAILED))
        }
        other => Err(LesewerkError::RecognitionFailed(format!(
            "session {id} ended without a result ({other:?})"
        ))),
    }
}

/// Persisted configuration with the command line laid over it.
fn load_config(args: &Args) -> Result<AppConfig> {
    let dir = data_dir::data_dir();
    let mut config = AppConfig::load(&dir)?.unwrap_or_default();
    args.apply(&mut config);
    config.validate()?;

    if args.save_config {
        config.save(&dir)?;
        tracing::info!(path = %dir.display(), "configuration saved");
    }
    Ok(config)
}

fn ocr_config(config: &AppConfig) -> OcrConfig {
    match config.model_dir {
        Some(ref dir) => OcrConfig::from_dir(dir),
        None => {
            if !ocr::models_available() {
                tracing::warn!(
                    dir = %ocr::model_directory().display(),
                    "OCR models not found in the default location"
                );
            }
            OcrConfig::default()
        }
    }
}

fn report(err: &HumanError) {
    eprintln!("{}\n{}", err.message, err.suggestion);
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line parsing.

use std::path::PathBuf;

use lesewerk_core::AppConfig;
use lesewerk_core::error::{LesewerkError, Result};

pub const USAGE: &str = "\
Usage: lesewerk <image> [options]

Reads the handwriting in <image> and prints it.

Options:
  --scale N          upscale factor applied before recognition (default 2)
  --timeout SECS     give up on recognition after SECS seconds
  --models DIR       folder holding the OCR .rten models
  --output FILE      also save the text to FILE
  --save             also save the text under the configured export name
  --save-config      remember --scale/--timeout/--models for next time
  -h, --help         show this help
";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Read(Args),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub image: PathBuf,
    pub scale: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub models: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub save: bool,
    pub save_config: bool,
}

impl Args {
    /// Overlay the command line settings on the persisted configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(scale) = self.scale {
            config.upscale_factor = scale;
        }
        if let Some(secs) = self.timeout_secs {
            config.recognition_timeout_secs = Some(secs);
        }
        if let Some(ref dir) = self.models {
            config.model_dir = Some(dir.clone());
        }
    }

    /// Where the recognized text should be saved, if anywhere.
    pub fn export_path(&self, config: &AppConfig) -> Option<PathBuf> {
        match (&self.output, self.save) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(PathBuf::from(&config.export_file_name)),
            (None, false) => None,
        }
    }
}

/// Parse the arguments that follow the program name.
pub fn parse<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut image = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--scale" => parsed.scale = Some(number(&arg, args.next())?),
            "--timeout" => parsed.timeout_secs = Some(number(&arg, args.next())?),
            "--models" => parsed.models = Some(value(&arg, args.next())?.into()),
            "--output" => parsed.output = Some(value(&arg, args.next())?.into()),
            "--save" => parsed.save = true,
            "--save-config" => parsed.save_config = true,
            flag if flag.starts_with("--") => {
                return Err(LesewerkError::Config(format!("unknown option {flag}")));
            }
            path => {
                if image.replace(PathBuf::from(path)).is_some() {
                    return Err(LesewerkError::Config(
                        "only one image can be read at a time".into(),
                    ));
                }
            }
        }
    }

    parsed.image = image.ok_or_else(|| LesewerkError::Config("no image given".into()))?;
    Ok(Command::Read(parsed))
}

fn value(flag: &str, next: Option<String>) -> Result<String> {
    next.ok_or_else(|| LesewerkError::Config(format!("{flag} needs a value")))
}

fn number<T: std::str::FromStr>(flag: &str, next: Option<String>) -> Result<T> {
    let raw = value(flag, next)?;
    raw.parse()
        .map_err(|_| LesewerkError::Config(format!("{flag} expects a whole number, got {raw:?}")))
}

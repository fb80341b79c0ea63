//! Command-line arguments.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use heic2jpg_client::ClientConfig;
use heic2jpg_types::{OptionField, QualityPreset};

#[derive(Debug, Parser)]
#[command(name = "heic2jpg")]
#[command(version, about = "Convert HEIC/HEIF images to JPG through a remote conversion service", long_about = None)]
pub struct Cli {
    /// Conversion service root. Overrides HEIC2JPG_BASE_URL.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds. Overrides HEIC2JPG_TIMEOUT_SECS.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a HEIC/HEIF file and save the JPG.
    Convert(ConvertArgs),

    /// Download a previously converted image.
    Download {
        /// Download path returned by a conversion, or an absolute URL.
        #[arg(value_name = "URL")]
        url: String,

        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Save under this name instead of the last URL segment.
        #[arg(long)]
        filename: Option<String>,
    },

    /// Check that the conversion service is reachable.
    Health,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// JPEG quality, 1-100.
    #[arg(short, long, conflicts_with = "preset")]
    pub quality: Option<String>,

    /// Quality shortcut: low, medium, high or maximum.
    #[arg(long, value_parser = parse_preset)]
    pub preset: Option<QualityPreset>,

    /// Apply --width / --height.
    #[arg(long)]
    pub resize: bool,

    #[arg(long)]
    pub width: Option<String>,

    #[arg(long)]
    pub height: Option<String>,

    /// Stretch to exactly --width x --height.
    #[arg(long)]
    pub no_aspect_ratio: bool,

    /// Clockwise rotation: none, 90, 180 or 270.
    #[arg(long)]
    pub rotate: Option<String>,

    /// Directory the JPG is saved into.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Print the result without downloading the JPG.
    #[arg(long)]
    pub no_download: bool,
}

impl ConvertArgs {
    /// Option edits in the order the user would make them, one field each.
    pub fn option_edits(&self) -> Vec<(OptionField, String)> {
        let mut edits = Vec::new();
        if let Some(q) = &self.quality {
            edits.push((OptionField::Quality, q.clone()));
        }
        if self.resize {
            edits.push((OptionField::Resize, "true".to_owned()));
        }
        if let Some(w) = &self.width {
            edits.push((OptionField::Width, w.clone()));
        }
        if let Some(h) = &self.height {
            edits.push((OptionField::Height, h.clone()));
        }
        if self.no_aspect_ratio {
            edits.push((OptionField::MaintainAspectRatio, "false".to_owned()));
        }
        if let Some(r) = &self.rotate {
            edits.push((OptionField::Rotate, r.clone()));
        }
        edits
    }
}

impl Cli {
    /// Layer command-line overrides on top of the environment configuration.
    pub fn apply_overrides(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        config
    }
}

fn parse_preset(s: &str) -> Result<QualityPreset, String> {
    QualityPreset::from_str(s)
        .map_err(|_| format!("unknown preset {s:?}; expected low, medium, high or maximum"))
}

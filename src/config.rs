use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ambient-field",
    version,
    about = "Audio-reactive particle and nebula background for the terminal"
)]
pub struct Config {
    /// Where the primary analyzer gets its signal.
    #[arg(long, value_enum, default_value_t = AudioSource::Mic)]
    pub source: AudioSource,

    /// Substring of the input device name (mic source only).
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    #[arg(long, default_value_t = 256)]
    pub fft_size: usize,

    #[arg(long, default_value_t = 0.8)]
    pub smoothing: f32,

    #[arg(long, default_value_t = 1.0)]
    pub input_gain: f32,

    /// `key = value` overrides for field constants.
    #[arg(long)]
    pub tuning: Option<PathBuf>,

    /// Seed for particle and nebula placement; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub status: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioSource {
    Mic,
    #[value(alias = "demo")]
    Synth,
    /// Start silent; press `a` to begin capture later.
    #[value(name = "none", alias = "off")]
    Silent,
}

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound for `max_particles`; links are quadratic in this.
pub const PARTICLE_LIMIT: usize = 2_000;
pub const NEBULA_LIMIT: usize = 32;

/// Field constants, overridable from a `key = value` tuning file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTuning {
    pub max_particles: usize,
    /// Viewport area (logical px²) per particle.
    pub area_per_particle: f32,
    pub nebula_count: usize,
    pub link_distance: f32,
    pub link_bass_gain: f32,
    pub pointer_radius: f32,
    pub pointer_strength: f32,
    /// Frames without pointer movement before it parks off-screen; 0 = never.
    pub pointer_idle_frames: u32,
    pub edge_margin: f32,
    pub peak_kick: f32,
    pub hue_rate: f32,
    pub initial_hue: f32,
    pub background: [u8; 3],
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            max_particles: 140,
            area_per_particle: 10_000.0,
            nebula_count: 5,
            link_distance: 120.0,
            link_bass_gain: 80.0,
            pointer_radius: 200.0,
            pointer_strength: 0.0002,
            pointer_idle_frames: 600,
            edge_margin: 10.0,
            peak_kick: 2.0,
            hue_rate: 0.02,
            initial_hue: 200.0,
            background: [4, 6, 14],
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl FieldTuning {
    /// Missing path or missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TuningError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no tuning file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(TuningError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let tuning = Self::parse(&text)?;
        log::info!("loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn parse(text: &str) -> Result<Self, TuningError> {
        let mut t = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(TuningError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let key = key_raw.trim();
            let value = value_raw.trim();
            let bad = |what: &str| TuningError::Parse {
                line: line_no,
                message: format!("{key} must be {what}"),
            };

            match key {
                "max_particles" => {
                    t.max_particles = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n <= PARTICLE_LIMIT)
                        .ok_or_else(|| bad(&format!("a whole number up to {PARTICLE_LIMIT}")))?;
                }
                "area_per_particle" => {
                    t.area_per_particle = parse_positive(value).ok_or_else(|| bad("> 0"))?;
                }
                "nebula_count" => {
                    t.nebula_count = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n <= NEBULA_LIMIT)
                        .ok_or_else(|| bad(&format!("a whole number up to {NEBULA_LIMIT}")))?;
                }
                "link_distance" => {
                    t.link_distance = parse_non_negative(value).ok_or_else(|| bad(">= 0"))?;
                }
                "link_bass_gain" => {
                    t.link_bass_gain = parse_non_negative(value).ok_or_else(|| bad(">= 0"))?;
                }
                "pointer_radius" => {
                    t.pointer_radius = parse_non_negative(value).ok_or_else(|| bad(">= 0"))?;
                }
                "pointer_strength" => {
                    t.pointer_strength = parse_finite(value).ok_or_else(|| bad("a number"))?;
                }
                "pointer_idle_frames" => {
                    t.pointer_idle_frames = value.parse().map_err(|_| bad("a whole number"))?;
                }
                "edge_margin" => {
                    t.edge_margin = parse_non_negative(value).ok_or_else(|| bad(">= 0"))?;
                }
                "peak_kick" => {
                    t.peak_kick = parse_finite(value).ok_or_else(|| bad("a number"))?;
                }
                "hue_rate" => {
                    t.hue_rate = parse_finite(value)
                        .filter(|v| (0.0..=1.0).contains(v))
                        .ok_or_else(|| bad("within 0..=1"))?;
                }
                "initial_hue" => {
                    t.initial_hue = parse_finite(value).ok_or_else(|| bad("a number"))?;
                }
                "background" => {
                    t.background = parse_rgb(value).ok_or_else(|| bad("r,g,b with 0..=255 parts"))?;
                }
                _ => log::warn!("tuning line {line_no}: unknown key {key:?} ignored"),
            }
        }
        Ok(t)
    }
}

pub fn tuning_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("ambient_field").join("tuning.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ambient_field")
            .join("tuning.txt"),
    )
}

fn parse_finite(raw: &str) -> Option<f32> {
    raw.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_non_negative(raw: &str) -> Option<f32> {
    parse_finite(raw).filter(|v| *v >= 0.0)
}

fn parse_positive(raw: &str) -> Option<f32> {
    parse_finite(raw).filter(|v| *v > 0.0)
}

fn parse_rgb(raw: &str) -> Option<[u8; 3]> {
    let mut parts = raw.split(',').map(|p| p.trim().parse::<u8>());
    let rgb = [parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?];
    parts.next().is_none().then_some(rgb)
}

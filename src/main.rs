use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = ambient_field::config::Config::parse();
    ambient_field::logging::init_logger(cfg.log_file.as_deref())?;

    if cfg.list_devices {
        ambient_field::audio::list_input_devices()?;
        return Ok(());
    }

    ambient_field::app::run(cfg)
}

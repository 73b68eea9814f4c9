//! `evflat init`: print a default configuration.

use evflat_config::ProducerConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", ProducerConfig::default_toml());
    Ok(())
}

//! `evflat check`: load, validate, and summarize a configuration.

use super::load_config;
use evflat_registry::{FilterRegistry, PathRegistry};
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("  error: {e}");
            return Err(e);
        }
    };

    // Patterns only compile when the registries are built
    let checks = config
        .validate()
        .map_err(|e| e.to_string())
        .and_then(|()| PathRegistry::from_config(&config.triggers).map_err(|e| e.to_string()))
        .and_then(|_| FilterRegistry::from_config(&config.filters).map_err(|e| e.to_string()));
    if let Err(e) = checks {
        println!("  error: {e}");
        return Err(e.into());
    }
    println!("  ok: all checks passed");

    let caps = &config.capacities;
    println!();
    println!("  Mode:        {}", if config.producer.is_data { "data" } else { "simulation" });
    println!("  Triggers:    {} ({})", config.triggers.len(), config.inputs.trigger_results);
    println!("  Filters:     {} ({})", config.filters.len(), config.inputs.filter_results);
    println!("  Vertices:    {} max ({})", caps.vertices, config.inputs.vertices);
    println!("  Tracks:      {} max ({})", caps.tracks, config.inputs.tracks);
    if config.producer.is_data {
        println!("  Gen jets:    skipped");
    } else {
        println!("  Gen jets:    {} max ({})", caps.genjets, config.inputs.genjets);
    }
    println!("  Output:      {}", config.output.path);

    Ok(())
}

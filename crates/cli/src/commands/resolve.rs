//! `evflat resolve`: dry-run name resolution against a menu file.
//!
//! The menu file is JSON, either a bare trigger menu or both menus:
//!
//! ```text
//! {"process": "HLT", "table": "/physics/v3", "paths": ["HLT_IsoMu24_v4", ...]}
//! {"trigger_menu": {...}, "filter_menu": {...}}
//! ```

use super::load_config;
use evflat_core::{TriggerMenu, Warning};
use evflat_registry::{FilterRegistry, PathRegistry};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MenuFile {
    Both {
        trigger_menu: TriggerMenu,
        #[serde(default)]
        filter_menu: Option<TriggerMenu>,
    },
    Trigger(TriggerMenu),
}

impl MenuFile {
    fn into_menus(self) -> (TriggerMenu, Option<TriggerMenu>) {
        match self {
            MenuFile::Both {
                trigger_menu,
                filter_menu,
            } => (trigger_menu, filter_menu),
            MenuFile::Trigger(menu) => (menu, None),
        }
    }
}

fn read_menus(path: &Path) -> Result<(TriggerMenu, Option<TriggerMenu>), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read menu file {}: {e}", path.display()))?;
    let file: MenuFile = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse menu file {}: {e}", path.display()))?;
    Ok(file.into_menus())
}

pub fn run(menu_path: PathBuf, config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path.as_deref())?;
    let (trigger_menu, filter_menu) = read_menus(&menu_path)?;

    let mut warnings: Vec<Warning> = Vec::new();

    let mut paths = PathRegistry::from_config(&config.triggers)?;
    warnings.extend(paths.resolve(&trigger_menu));

    println!("Trigger paths ({}, {} entries)", trigger_menu.label(), trigger_menu.len());
    for entry in paths.entries() {
        match (entry.resolved_index, entry.resolved_path.as_deref()) {
            (Some(index), Some(path)) => {
                println!("  {:<20} [{index:>3}] {path}", entry.name)
            }
            _ => println!("  {:<20} [  -] unresolved ({})", entry.name, entry.pattern),
        }
    }

    if let Some(filter_menu) = filter_menu {
        let mut filters = FilterRegistry::from_config(&config.filters)?;
        warnings.extend(filters.resolve(&filter_menu));

        println!();
        println!("Filter flags ({}, {} entries)", filter_menu.label(), filter_menu.len());
        for entry in filters.entries() {
            match entry.resolved_index {
                Some(index) => println!("  {:<20} [{index:>3}] {}", entry.name, entry.flag),
                None => println!("  {:<20} [  -] unresolved ({})", entry.name, entry.flag),
            }
        }
    }

    println!();
    if warnings.is_empty() {
        println!("No warnings.");
    } else {
        println!("{} warning(s):", warnings.len());
        for w in &warnings {
            println!("  {w}");
        }
    }

    Ok(())
}

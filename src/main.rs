//! Map raw pose engine output to a named body landmark record.
//!
//! Usage: `gkat <pose.json>` where the file holds 25 `[x, y, confidence]`
//! entries. The named record is printed as JSON; uncertain landmarks are
//! logged as warnings.

use std::path::Path;
use std::process;

use gkat::config::AppConfig;
use gkat::pose::{BodyLandmarkSet, PoseEntry};

fn run(path: &Path, config: &AppConfig) -> Result<String, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let entries: Vec<PoseEntry> = serde_json::from_str(&json)?;
    let set = BodyLandmarkSet::from_flat_array(&entries)?;

    for warning in set.verify(config.preferences.confidence_threshold) {
        log::warn!("{}", warning);
    }
    log::info!(
        "{}/{} landmarks detected in {:?}",
        set.detected().count(),
        entries.len(),
        path
    );

    Ok(set.to_json()?)
}

fn main() {
    // Loading runs before the logger exists, so its outcome is reported below.
    let loaded = AppConfig::load_from_default_path();
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => AppConfig::default(),
    };

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if let Err(e) = &loaded {
        log::warn!("Ignoring configuration file, using defaults: {}", e);
    }

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: gkat <pose.json>");
        process::exit(2);
    };

    match run(Path::new(&path), &config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

// src/utils/env.rs
use log::info;
use std::path::Path;

/// Loads the first `.env` file found, leaving already-set variables alone.
pub fn load_env() {
    let env_paths = [".env", ".env.local", "../.env"];
    for path in env_paths.iter() {
        if Path::new(path).exists() {
            match dotenv::from_path(path) {
                Ok(()) => {
                    info!("Loaded environment variables from {}", path);
                    return;
                }
                Err(e) => log::warn!("Failed to load environment from {}: {}", path, e),
            }
        }
    }
    info!("No .env file found, using environment variables from system");
}

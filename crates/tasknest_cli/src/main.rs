//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tasknest_core` linkage.
//! - Print the category registry and a summary of the configured store.

use tasknest_core::logging::init_logging_from_config;
use tasknest_core::{CategoryRegistry, CoreConfig, SqliteKvRepository, StoreError, TaskStore};

fn main() {
    let config = CoreConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("tasknest logging disabled: {err}");
    }

    println!("tasknest_core ping={}", tasknest_core::ping());
    println!("tasknest_core version={}", tasknest_core::core_version());
    for category in CategoryRegistry::builtin().all() {
        println!("category id={} name={} color={}", category.id, category.name, category.color);
    }

    match SqliteKvRepository::open(&config.db_path)
        .map_err(StoreError::Load)
        .and_then(TaskStore::load)
    {
        Ok(store) => {
            let stats = store.stats();
            println!(
                "store path={} total={} completed={} pending={}",
                config.db_path.display(),
                stats.total,
                stats.completed,
                stats.pending
            );
        }
        Err(err) => {
            eprintln!("store path={} error={err}", config.db_path.display());
            std::process::exit(1);
        }
    }
}

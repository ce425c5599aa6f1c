mod aggregate;
mod config;
mod error;
mod loader;
mod pipeline;
mod plots;
mod records;
mod report;
mod stats;
mod transform;
mod xpt;

#[cfg(test)]
mod fixtures;

use std::time::Instant;

use config::{PipelineConfig, CONFIG_FILE_NAME};
use env_logger::{Builder, Env};
use error::PipelineError;
use log::{debug, info, LevelFilter};
use sysinfo::{get_current_pid, ProcessExt, System, SystemExt};

/// Resident memory of this process in bytes, 0 if it cannot be read.
fn monitor_memory() -> u64 {
    let pid = match get_current_pid() {
        Ok(pid) => pid,
        Err(_) => return 0,
    };

    let mut system = System::new();
    system.refresh_process(pid);
    system.process(pid).map(|p| p.memory()).unwrap_or(0)
}

fn main() -> Result<(), PipelineError> {
    let env = Env::new().filter("NHANES_LOG");
    Builder::new()
        .filter(Some("nhanes_pipeline"), LevelFilter::Info)
        .parse_env(env)
        .init();

    let start_time = Instant::now();
    let start_memory = monitor_memory();

    let config = PipelineConfig::load(CONFIG_FILE_NAME)?;
    debug!("Config {:#?}", config);
    pipeline::run(&config)?;

    let end_memory = monitor_memory();
    let duration = start_time.elapsed();

    info!("Time elapsed: {:?}", duration);
    info!("Memory used: {} bytes", end_memory.saturating_sub(start_memory));

    Ok(())
}

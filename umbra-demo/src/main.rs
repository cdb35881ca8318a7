//! umbra demo
//!
//! Runs the full flow against an in-memory chain: a sender pays a stealth
//! address, the recipient scans and spends the outputs in a ring signature,
//! and the signature is verified concurrently. Configuration comes from
//! `UMBRA_*` environment variables; logging from `RUST_LOG`.

mod config;
mod demo;
mod error;

use config::DemoConfig;
use demo::Demo;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();
    log::info!("Starting umbra demo...");

    // Load configuration
    let config = DemoConfig::from_env()?;
    log::info!(
        "Loaded configuration: ring_size={}, inputs={}, decoy_pool={}",
        config.ring_size,
        config.inputs,
        config.decoy_pool
    );

    let demo = Demo::new(config);
    demo.run().await?;

    log::info!("Demo completed");
    Ok(())
}

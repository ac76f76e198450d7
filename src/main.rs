use std::process::ExitCode;

use crypto_tracker::{
    config::AppConfig,
    routines::{MarketSnapshotRoutine, Routine},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        log::error!("panic: {info}");
    }));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            log::error!("Invalid configuration: {:?}", report);
            return ExitCode::from(2);
        }
    };

    let routine = MarketSnapshotRoutine::new(&config);
    match routine.run().await {
        Ok(summary) => {
            log::info!(
                "✅ {}: {} records captured, {} rows skipped",
                routine.name(),
                summary.captured,
                summary.skipped
            );
            ExitCode::SUCCESS
        }
        Err(report) => {
            log::error!("❌ {}: {:?}", routine.name(), report);
            ExitCode::FAILURE
        }
    }
}

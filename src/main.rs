use std::process::ExitCode;

use kiosk::config::Config;
use kiosk::error::StartupError;
use kiosk::{logging, Kiosk};

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    // Before any thread exists, or the local offset cannot be read.
    let config = Config::from_env();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!(target: "STARTUP", "{}", err);
            eprintln!("kiosk: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<(), StartupError> {
    let _logger = logging::init(config.log_level)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;

    let result = runtime.block_on(async {
        let kiosk = Kiosk::start(config).await?;
        kiosk.run().await
    });

    // An abandoned refresh may still be composing on the blocking pool; don't wait for it.
    runtime.shutdown_background();

    let exit = result?;
    log::info!(target: "STARTUP", "stopped ({:?})", exit);
    Ok(())
}

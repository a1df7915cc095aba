mod error;
mod output;

use tracing_subscriber::EnvFilter;

use aircon_api::DeviceController;
use aircon_config::AirconConfig;

use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    let config = AirconConfig::from_env()?.into_controller_config();
    let controller = DeviceController::new(config)?;

    tracing::debug!(device_id = controller.device_id(), "powering on");
    let resp = controller
        .turn_on()
        .await
        .map_err(|err| CliError::from_request(err, controller.control_url()))?;

    output::print_output(&output::render_control(&resp));
    Ok(())
}

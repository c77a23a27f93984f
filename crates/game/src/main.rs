use std::process::ExitCode;

use tracing::error;

mod app;

fn main() -> ExitCode {
    match app::build_app() {
        Ok(wiring) => app::run(wiring),
        Err(err) => {
            error!(error = %err, "bootstrap_failed");
            ExitCode::FAILURE
        }
    }
}

mod app;
mod config;
mod logging;
mod render;

use std::process::ExitCode;

fn main() -> ExitCode {
    app::run()
}

//! flux-deps - Dependency analysis for Flux Kustomizations

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = flux_deps::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

use std::process::ExitCode;

use dsync::{cli, diagnostics, orchestrator};

fn main() -> ExitCode {
    diagnostics::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match cli::parse(&argv) {
        cli::Parsed::Run(args) => args,
        cli::Parsed::PrintUsage { to_stdout, exit_code } => {
            cli::print_usage(to_stdout);
            return ExitCode::from(exit_code as u8);
        }
    };

    match orchestrator::run(&args.sources, &args.destination, args.force, args.worker_count) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            diagnostics::error("dsync failed", Some(&err));
            ExitCode::FAILURE
        }
    }
}

use std::process::ExitCode;

fn main() -> ExitCode {
    trackline_cli::run()
}

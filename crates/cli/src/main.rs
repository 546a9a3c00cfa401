use std::process::ExitCode;

fn main() -> ExitCode {
    autoflex_cli::run()
}

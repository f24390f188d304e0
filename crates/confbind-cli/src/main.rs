use std::process::ExitCode;

fn main() -> ExitCode {
    confbind_cli::run()
}

use std::process::ExitCode;

fn main() -> ExitCode {
    match emberd::run_provider() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("emberd: {error}");
            ExitCode::FAILURE
        }
    }
}

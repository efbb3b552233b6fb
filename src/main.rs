use std::process::ExitCode;

fn main() -> ExitCode {
    match filecrypt::cli::run(std::env::args_os()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

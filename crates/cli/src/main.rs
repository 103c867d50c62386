use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use libuitoolbox::backend::DesktopBackend;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays a clean list of paths
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::OFF.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<OsString> = std::env::args_os().collect();

    let backend = DesktopBackend::new();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    let code = match libuitoolbox::run(&args, &backend, &mut stdout, &mut stderr)
        .and_then(|code| stdout.flush().map(|()| code))
    {
        Ok(code) => code,
        Err(e) => {
            let _ = writeln!(stderr, "I/O error: {e}");
            libuitoolbox::run::EXIT_CANCELLED
        }
    };
    ExitCode::from(code)
}

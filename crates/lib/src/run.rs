use std::ffi::OsString;
use std::io::{self, Write};

use tracing::{debug, info};

use crate::applet::Applet;
use crate::dialog::{
    AlertRequest, DialogBackend, DialogOutcome, OpenRequest, SaveRequest, Selection,
};
use crate::invocation::Invocation;

/// Exit status when the dialog was confirmed
pub const EXIT_CONFIRMED: u8 = 0;
/// Exit status when the dialog was cancelled or dismissed
pub const EXIT_CANCELLED: u8 = 1;
/// Exit status for malformed arguments
pub const EXIT_USAGE: u8 = 255;

const NOT_IMPLEMENTED: &str = "Not Implemented";

/// Write `message` (if any) to stderr and hand back `code` as the exit status.
///
/// Both values are always explicit so an error path cannot default to success.
pub fn terminate(stderr: &mut impl Write, code: u8, message: &str) -> io::Result<u8> {
    if !message.is_empty() {
        writeln!(stderr, "{message}")?;
    }
    Ok(code)
}

/// Run one invocation of the multi-call binary.
///
/// `args` is the full argument vector, argument zero included. Returns the
/// process exit status; only I/O errors on the output streams escape.
pub fn run(
    args: &[OsString],
    backend: &impl DialogBackend,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<u8> {
    let Some(applet) = args.first().and_then(|a| Applet::from_program_name(a)) else {
        debug!(argv0 = ?args.first(), "Unrecognized program name");
        return terminate(stderr, EXIT_CONFIRMED, "");
    };

    let invocation = match Invocation::parse(applet, args) {
        Ok(invocation) => invocation,
        Err(usage) => return terminate(stderr, EXIT_USAGE, &usage.to_string()),
    };
    debug!(?invocation, "Arguments validated");

    match invocation {
        Invocation::Alert(request) => alert(&request, backend, stderr),
        Invocation::Open(request) => open(&request, backend, stdout, stderr),
        Invocation::Save(request) => save(&request, backend, stdout, stderr),
        Invocation::Menu => terminate(stderr, EXIT_CONFIRMED, NOT_IMPLEMENTED),
    }
}

fn alert(
    request: &AlertRequest,
    backend: &impl DialogBackend,
    stderr: &mut impl Write,
) -> io::Result<u8> {
    match backend.alert(request) {
        Ok(DialogOutcome::Confirmed) => terminate(stderr, EXIT_CONFIRMED, ""),
        Ok(DialogOutcome::Cancelled) => terminate(stderr, EXIT_CANCELLED, ""),
        Err(e) => terminate(stderr, EXIT_CANCELLED, &format!("{}: {e}", Applet::Alert)),
    }
}

fn open(
    request: &OpenRequest,
    backend: &impl DialogBackend,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<u8> {
    match backend.open(request) {
        Ok(selection) => emit(selection, stdout, stderr),
        Err(e) => terminate(stderr, EXIT_CANCELLED, &format!("{}: {e}", Applet::Open)),
    }
}

fn save(
    request: &SaveRequest,
    backend: &impl DialogBackend,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<u8> {
    match backend.save(request) {
        // The chosen path is printed as-is, even if it lacks the preferred extension
        Ok(selection) => emit(selection, stdout, stderr),
        Err(e) => terminate(stderr, EXIT_CANCELLED, &format!("{}: {e}", Applet::Save)),
    }
}

/// Print every reported path, one per line, whatever the outcome
fn emit(
    selection: Selection,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<u8> {
    info!(outcome = ?selection.outcome, count = selection.paths.len(), "Dialog closed");
    for path in &selection.paths {
        stdout.write_all(path.as_os_str().as_encoded_bytes())?;
        stdout.write_all(b"\n")?;
    }
    let code = if selection.outcome.is_confirmed() {
        EXIT_CONFIRMED
    } else {
        EXIT_CANCELLED
    };
    terminate(stderr, code, "")
}

pub mod applet;
pub mod backend;
pub mod dialog;
pub mod invocation;
pub mod run;

pub use applet::Applet;
pub use dialog::{DialogBackend, DialogError, DialogOutcome, Selection};
pub use invocation::{Invocation, UsageError};
pub use run::{run, terminate};

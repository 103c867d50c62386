use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tracing::{debug, instrument};

use crate::dialog::{
    AlertRequest, DialogBackend, DialogError, DialogOutcome, OpenRequest, SaveRequest, Selection,
};

const DEFAULT_PROGRAM: &str = "zenity";

/// Dialogs drawn by the `zenity` helper process
#[derive(Debug, Clone)]
pub struct ZenityBackend {
    program: OsString,
}

impl ZenityBackend {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a specific helper binary instead of `zenity` from `PATH`
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<Output, DialogError> {
        debug!(program = ?self.program, ?args, "Spawning dialog helper");
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    DialogError::Unavailable(format!(
                        "{} not found",
                        self.program.to_string_lossy()
                    ))
                } else {
                    DialogError::Unavailable(format!(
                        "failed to run {}: {e}",
                        self.program.to_string_lossy()
                    ))
                }
            })
    }

    /// Map helper exit status to an outcome: 0 confirms, 1 cancels
    fn outcome(&self, output: &Output) -> Result<DialogOutcome, DialogError> {
        match output.status.code() {
            Some(0) => Ok(DialogOutcome::Confirmed),
            Some(1) => Ok(DialogOutcome::Cancelled),
            Some(code) => Err(DialogError::Failed(format!(
                "{} exited with status {code}",
                self.program.to_string_lossy()
            ))),
            None => Err(DialogError::Failed(format!(
                "{} was terminated by a signal",
                self.program.to_string_lossy()
            ))),
        }
    }

    fn selection(&self, output: &Output) -> Result<Selection, DialogError> {
        let outcome = self.outcome(output)?;
        // Paths are raw bytes; they need not be UTF-8
        let paths = output
            .stdout
            .split(|b| *b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| PathBuf::from(OsStr::from_bytes(l)))
            .collect();
        Ok(Selection { outcome, paths })
    }
}

impl Default for ZenityBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper arguments for an alert
pub fn alert_args(request: &AlertRequest) -> Vec<String> {
    let mut args = if request.show_cancel {
        vec![
            "--question".to_string(),
            "--ok-label=OK".to_string(),
            "--cancel-label=Cancel".to_string(),
        ]
    } else {
        vec!["--info".to_string(), "--ok-label=OK".to_string()]
    };
    args.push("--modal".to_string());
    args.push("--no-markup".to_string());
    args.push(format!("--title={}", request.message));
    let text = if request.informative.is_empty() {
        request.message.clone()
    } else {
        format!("{}\n\n{}", request.message, request.informative)
    };
    args.push(format!("--text={text}"));
    args
}

/// Helper arguments for an open panel
pub fn open_args(request: &OpenRequest) -> Vec<String> {
    let mut args = vec![
        "--file-selection".to_string(),
        "--modal".to_string(),
        format!("--title={}", request.title),
    ];
    if request.allow_multiple {
        args.push("--multiple".to_string());
        args.push("--separator=\n".to_string());
    }
    args
}

/// Helper arguments for a save panel
pub fn save_args(request: &SaveRequest) -> Vec<String> {
    let mut args = vec![
        "--file-selection".to_string(),
        "--save".to_string(),
        "--modal".to_string(),
        format!("--title={}", request.title),
    ];
    if let Some(glob) = request.extension_glob() {
        args.push(format!("--file-filter={glob}"));
        args.push("--file-filter=All Files | *".to_string());
    }
    args
}

impl DialogBackend for ZenityBackend {
    #[instrument(skip(self))]
    fn alert(&self, request: &AlertRequest) -> Result<DialogOutcome, DialogError> {
        let output = self.run(&alert_args(request))?;
        self.outcome(&output)
    }

    #[instrument(skip(self))]
    fn open(&self, request: &OpenRequest) -> Result<Selection, DialogError> {
        let output = self.run(&open_args(request))?;
        self.selection(&output)
    }

    #[instrument(skip(self))]
    fn save(&self, request: &SaveRequest) -> Result<Selection, DialogError> {
        let output = self.run(&save_args(request))?;
        self.selection(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Write an executable shell script standing in for the helper
    fn fake_helper(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn alert_args_without_cancel() {
        let args = alert_args(&AlertRequest {
            message: "Done".into(),
            informative: "All files copied".into(),
            show_cancel: false,
        });
        assert_eq!(args[0], "--info");
        assert!(!args.iter().any(|a| a.starts_with("--cancel-label")));
        assert!(args.contains(&"--text=Done\n\nAll files copied".to_string()));
    }

    #[test]
    fn alert_args_with_cancel() {
        let args = alert_args(&AlertRequest {
            message: "Delete?".into(),
            informative: String::new(),
            show_cancel: true,
        });
        assert_eq!(args[0], "--question");
        assert!(args.contains(&"--cancel-label=Cancel".to_string()));
        assert!(args.contains(&"--text=Delete?".to_string()));
    }

    #[test]
    fn open_args_multiple() {
        let args = open_args(&OpenRequest::new(true));
        assert!(args.contains(&"--multiple".to_string()));
        assert!(args.contains(&"--title=Open File Location".to_string()));
        assert!(!open_args(&OpenRequest::new(false)).contains(&"--multiple".to_string()));
    }

    #[test]
    fn save_args_keep_other_types_selectable() {
        let args = save_args(&SaveRequest::new(Some("csv".into())));
        assert!(args.contains(&"--save".to_string()));
        assert!(args.contains(&"--file-filter=*.csv".to_string()));
        assert!(args.contains(&"--file-filter=All Files | *".to_string()));
        assert!(!save_args(&SaveRequest::new(None))
            .iter()
            .any(|a| a.starts_with("--file-filter")));
    }

    #[test]
    fn exit_status_maps_to_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let req = AlertRequest {
            message: "m".into(),
            informative: "i".into(),
            show_cancel: true,
        };

        let ok = ZenityBackend::with_program(fake_helper(dir.path(), "ok", "exit 0"));
        assert_eq!(ok.alert(&req).unwrap(), DialogOutcome::Confirmed);

        let cancel = ZenityBackend::with_program(fake_helper(dir.path(), "cancel", "exit 1"));
        assert_eq!(cancel.alert(&req).unwrap(), DialogOutcome::Cancelled);

        let broken = ZenityBackend::with_program(fake_helper(dir.path(), "broken", "exit 5"));
        assert!(matches!(broken.alert(&req), Err(DialogError::Failed(_))));
    }

    #[test]
    fn open_reports_paths_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let helper = fake_helper(dir.path(), "pick", "printf '/tmp/c\\n/tmp/a\\n/tmp/b\\n'; exit 0");
        let sel = ZenityBackend::with_program(helper)
            .open(&OpenRequest::new(true))
            .unwrap();
        assert_eq!(sel.outcome, DialogOutcome::Confirmed);
        assert_eq!(
            sel.paths,
            vec![
                PathBuf::from("/tmp/c"),
                PathBuf::from("/tmp/a"),
                PathBuf::from("/tmp/b")
            ]
        );
    }

    #[test]
    fn non_utf8_paths_survive_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let helper = fake_helper(dir.path(), "latin1", "printf '/tmp/caf\\351.txt\\n'; exit 0");
        let sel = ZenityBackend::with_program(helper)
            .open(&OpenRequest::new(false))
            .unwrap();
        assert_eq!(sel.paths.len(), 1);
        assert_eq!(sel.paths[0].as_os_str().as_bytes(), b"/tmp/caf\xe9.txt");
    }

    #[test]
    fn save_cancel_has_no_paths() {
        let dir = tempfile::tempdir().unwrap();
        let helper = fake_helper(dir.path(), "save", "exit 1");
        let sel = ZenityBackend::with_program(helper)
            .save(&SaveRequest::new(None))
            .unwrap();
        assert_eq!(sel, Selection::cancelled());
    }

    #[test]
    fn missing_helper_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ZenityBackend::with_program(dir.path().join("does-not-exist"));
        assert!(matches!(
            backend.open(&OpenRequest::new(false)),
            Err(DialogError::Unavailable(_))
        ));
    }
}

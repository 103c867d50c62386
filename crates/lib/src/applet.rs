use std::ffi::OsStr;
use std::fmt::Display;
use std::path::Path;

/// The four entry points a multi-call install exposes.
///
/// The binary is installed (or symlinked) once per name and picks its
/// behavior from the last path component of argument zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applet {
    Alert,
    Open,
    Save,
    Menu,
}

impl Applet {
    pub const ALL: [Applet; 4] = [Applet::Alert, Applet::Open, Applet::Save, Applet::Menu];

    /// Resolve an applet from argument zero.
    ///
    /// Only the final path component is considered and matching is
    /// case-sensitive, so `/usr/local/bin/alert` is `Alert` but `Alert` is not.
    pub fn from_program_name(argv0: impl AsRef<OsStr>) -> Option<Self> {
        let name = Path::new(argv0.as_ref()).file_name()?.to_str()?;
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Open => "open",
            Self::Save => "save",
            Self::Menu => "menu",
        }
    }

    /// Fixed usage line printed on argument errors
    pub fn usage(&self) -> &'static str {
        match self {
            Self::Alert => r#"Usage: alert "Message Text" "Informative Text" [ --show-cancel ]"#,
            Self::Open => "Usage: open [ --allow-multiple ]",
            Self::Save => "Usage: save [ extension ]",
            Self::Menu => "Usage: menu",
        }
    }
}

impl Display for Applet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

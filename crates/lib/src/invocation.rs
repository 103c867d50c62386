use std::ffi::OsString;

use crate::applet::Applet;
use crate::dialog::{AlertRequest, OpenRequest, SaveRequest};

const SHOW_CANCEL: &str = "--show-cancel";
const ALLOW_MULTIPLE: &str = "--allow-multiple";

/// Arguments did not fit the applet's fixed shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .applet.usage())]
pub struct UsageError {
    pub applet: Applet,
}

/// A validated invocation, ready to show its dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Alert(AlertRequest),
    Open(OpenRequest),
    Save(SaveRequest),
    Menu,
}

impl Invocation {
    /// Validate the full argument vector (argument zero included) for `applet`.
    ///
    /// Positions are fixed and flags match byte-for-byte. Message texts are
    /// taken verbatim, so they may be empty or start with a dash; bytes that
    /// are not UTF-8 are shown as replacement characters. An extension must be
    /// UTF-8 since it becomes a filter pattern.
    pub fn parse(applet: Applet, args: &[OsString]) -> Result<Self, UsageError> {
        let usage = UsageError { applet };
        match applet {
            Applet::Alert => {
                let show_cancel = match args {
                    [_, _, _] => false,
                    [_, _, _, flag] if flag == SHOW_CANCEL => true,
                    _ => return Err(usage),
                };
                Ok(Self::Alert(AlertRequest {
                    message: args[1].to_string_lossy().into_owned(),
                    informative: args[2].to_string_lossy().into_owned(),
                    show_cancel,
                }))
            }
            Applet::Open => {
                let allow_multiple = match args {
                    [] | [_] => false,
                    [_, flag] if flag == ALLOW_MULTIPLE => true,
                    _ => return Err(usage),
                };
                Ok(Self::Open(OpenRequest::new(allow_multiple)))
            }
            Applet::Save => {
                let extension = match args {
                    [] | [_] => None,
                    [_, ext] if ext.is_empty() => None,
                    [_, ext] => Some(ext.to_str().ok_or(usage)?.to_string()),
                    _ => return Err(usage),
                };
                Ok(Self::Save(SaveRequest::new(extension)))
            }
            Applet::Menu => Ok(Self::Menu),
        }
    }
}

#[cfg(feature = "portal")]
pub mod portal;
pub mod zenity;

use tracing::{debug, warn};

use crate::dialog::{
    AlertRequest, DialogBackend, DialogError, DialogOutcome, OpenRequest, SaveRequest, Selection,
};

#[cfg(feature = "portal")]
pub use portal::PortalBackend;
pub use zenity::ZenityBackend;

/// Backend used by the installed binary.
///
/// File panels go through the desktop portal when one answers on the
/// session bus, and through the helper process otherwise. Alerts always use
/// the helper since the portal has no equivalent.
#[derive(Debug, Clone, Default)]
pub struct DesktopBackend {
    #[cfg(feature = "portal")]
    portal: PortalBackend,
    helper: ZenityBackend,
}

impl DesktopBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `primary`, retrying on `fallback` only if `primary` was unreachable
    #[cfg_attr(not(feature = "portal"), allow(dead_code))]
    fn with_fallback<T>(
        primary: impl FnOnce() -> Result<T, DialogError>,
        fallback: impl FnOnce() -> Result<T, DialogError>,
    ) -> Result<T, DialogError> {
        match primary() {
            Err(DialogError::Unavailable(reason)) => {
                warn!(%reason, "Primary dialog backend unavailable, falling back");
                fallback()
            }
            other => other,
        }
    }
}

impl DialogBackend for DesktopBackend {
    fn alert(&self, request: &AlertRequest) -> Result<DialogOutcome, DialogError> {
        debug!("Showing alert via helper");
        self.helper.alert(request)
    }

    fn open(&self, request: &OpenRequest) -> Result<Selection, DialogError> {
        #[cfg(feature = "portal")]
        {
            Self::with_fallback(|| self.portal.open(request), || self.helper.open(request))
        }
        #[cfg(not(feature = "portal"))]
        {
            self.helper.open(request)
        }
    }

    fn save(&self, request: &SaveRequest) -> Result<Selection, DialogError> {
        #[cfg(feature = "portal")]
        {
            Self::with_fallback(|| self.portal.save(request), || self.helper.save(request))
        }
        #[cfg(not(feature = "portal"))]
        {
            self.helper.save(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fallback_only_on_unavailable() {
        let fell_back = Cell::new(false);
        let result = DesktopBackend::with_fallback(
            || Err(DialogError::Unavailable("no bus".into())),
            || {
                fell_back.set(true);
                Ok(Selection::confirmed(["/tmp/x"]))
            },
        );
        assert!(fell_back.get());
        assert_eq!(result.unwrap(), Selection::confirmed(["/tmp/x"]));
    }

    #[test]
    fn cancel_does_not_fall_back() {
        let result = DesktopBackend::with_fallback(
            || Ok(Selection::cancelled()),
            || -> Result<Selection, DialogError> { panic!("fallback must not run") },
        );
        assert_eq!(result.unwrap(), Selection::cancelled());
    }

    #[test]
    fn failure_does_not_fall_back() {
        let result: Result<Selection, _> = DesktopBackend::with_fallback(
            || Err(DialogError::Failed("broken".into())),
            || panic!("fallback must not run"),
        );
        assert!(matches!(result, Err(DialogError::Failed(_))));
    }
}

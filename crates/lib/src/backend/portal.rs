//! Client for the `org.freedesktop.portal.FileChooser` interface.
//!
//! A portal call returns a Request object path immediately and delivers the
//! user's answer later as a `Response` signal on that object. The signal is
//! subscribed before the method call so a fast answer cannot be missed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use futures_lite::future;
use futures_util::StreamExt;
use tracing::{debug, info, instrument, warn};
use zbus::Connection;
use zbus::zvariant::{DeserializeDict, OwnedObjectPath, SerializeDict, Type};

use crate::dialog::{
    AlertRequest, DialogBackend, DialogError, DialogOutcome, OpenRequest, SaveRequest, Selection,
};

const REQUEST_PATH_PREFIX: &str = "/org/freedesktop/portal/desktop/request";

static TOKEN_COUNTER: AtomicU32 = AtomicU32::new(0);

/// File filter: (name, patterns)
/// D-Bus signature: (sa(us))
/// Pattern type: 0 = glob, 1 = mime type
#[derive(Debug, Clone, PartialEq, Type, serde::Serialize, serde::Deserialize)]
#[zvariant(signature = "(sa(us))")]
pub struct FileFilter(String, Vec<(u32, String)>);

impl FileFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into(), Vec::new())
    }

    pub fn glob(mut self, pattern: impl Into<String>) -> Self {
        self.1.push((0, pattern.into()));
        self
    }
}

/// Options for OpenFile
#[derive(Debug, Clone, Default, SerializeDict, Type)]
#[zvariant(signature = "dict")]
pub struct OpenFileOptions {
    handle_token: Option<String>,
    modal: Option<bool>,
    multiple: Option<bool>,
    directory: Option<bool>,
}

/// Options for SaveFile
#[derive(Debug, Clone, Default, SerializeDict, Type)]
#[zvariant(signature = "dict")]
pub struct SaveFileOptions {
    handle_token: Option<String>,
    modal: Option<bool>,
    filters: Option<Vec<FileFilter>>,
    current_filter: Option<FileFilter>,
}

/// Results carried by the Response signal
#[derive(Debug, Clone, Default, DeserializeDict, Type)]
#[zvariant(signature = "dict")]
pub struct FileChooserResults {
    uris: Option<Vec<String>>,
}

/// Response codes from portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResponseCode {
    Success = 0,
    Cancelled = 1,
    Other = 2,
}

impl From<u32> for ResponseCode {
    fn from(v: u32) -> Self {
        match v {
            0 => ResponseCode::Success,
            1 => ResponseCode::Cancelled,
            _ => ResponseCode::Other,
        }
    }
}

#[zbus::proxy(
    interface = "org.freedesktop.portal.FileChooser",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait FileChooser {
    fn open_file(
        &self,
        parent_window: &str,
        title: &str,
        options: OpenFileOptions,
    ) -> zbus::Result<OwnedObjectPath>;

    fn save_file(
        &self,
        parent_window: &str,
        title: &str,
        options: SaveFileOptions,
    ) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    #[zbus(signal)]
    fn response(&self, code: u32, results: FileChooserResults) -> zbus::Result<()>;
}

/// File dialogs served by xdg-desktop-portal over the session bus
#[derive(Debug, Clone, Default)]
pub struct PortalBackend;

impl PortalBackend {
    pub fn new() -> Self {
        Self
    }

    async fn open_file(&self, request: &OpenRequest) -> Result<Selection, DialogError> {
        let conn = Connection::session().await.map_err(unavailable)?;
        let token = next_token();
        let proxy = FileChooserProxy::new(&conn).await.map_err(unavailable)?;
        let call = proxy.open_file("", &request.title, open_options(request, &token));
        let (code, results) = run_request(&conn, &token, call).await?;
        Ok(into_selection(code, results))
    }

    async fn save_file(&self, request: &SaveRequest) -> Result<Selection, DialogError> {
        let conn = Connection::session().await.map_err(unavailable)?;
        let token = next_token();
        let proxy = FileChooserProxy::new(&conn).await.map_err(unavailable)?;
        let call = proxy.save_file("", &request.title, save_options(request, &token));
        let (code, results) = run_request(&conn, &token, call).await?;
        Ok(into_selection(code, results))
    }
}

impl DialogBackend for PortalBackend {
    fn alert(&self, _request: &AlertRequest) -> Result<DialogOutcome, DialogError> {
        Err(DialogError::Unavailable(
            "the desktop portal has no alert dialog".to_string(),
        ))
    }

    #[instrument(skip(self))]
    fn open(&self, request: &OpenRequest) -> Result<Selection, DialogError> {
        future::block_on(self.open_file(request))
    }

    #[instrument(skip(self))]
    fn save(&self, request: &SaveRequest) -> Result<Selection, DialogError> {
        future::block_on(self.save_file(request))
    }
}

/// Subscribe to the predicted Request object, issue the call, and wait for
/// its single Response.
async fn run_request<F>(
    conn: &Connection,
    token: &str,
    call: F,
) -> Result<(ResponseCode, FileChooserResults), DialogError>
where
    F: Future<Output = zbus::Result<OwnedObjectPath>>,
{
    let predicted = request_path(conn, token)?;
    let mut responses = response_stream(conn, predicted.clone()).await?;

    let handle = call.await.map_err(unavailable)?;
    debug!(%handle, "Portal request issued");

    if handle != predicted {
        // Portals older than version 0.9 ignore handle_token
        warn!(%predicted, %handle, "Portal chose a different request path");
        responses = response_stream(conn, handle).await?;
    }

    let response = responses.next().await.ok_or_else(|| {
        DialogError::Failed("portal request ended without a response".to_string())
    })?;
    let args = response
        .args()
        .map_err(|e| DialogError::Failed(format!("malformed portal response: {e}")))?;
    let code = ResponseCode::from(*args.code());
    info!(?code, "Portal responded");
    Ok((code, args.results().clone()))
}

async fn response_stream(
    conn: &Connection,
    path: OwnedObjectPath,
) -> Result<ResponseStream, DialogError> {
    let request = RequestProxy::builder(conn)
        .path(path)
        .map_err(unavailable)?
        .build()
        .await
        .map_err(unavailable)?;
    request.receive_response().await.map_err(unavailable)
}

fn unavailable(e: zbus::Error) -> DialogError {
    DialogError::Unavailable(e.to_string())
}

/// Request object path the portal derives from our unique name and token
fn request_path(conn: &Connection, token: &str) -> Result<OwnedObjectPath, DialogError> {
    let sender = conn.unique_name().ok_or_else(|| {
        DialogError::Unavailable("session bus connection has no unique name".to_string())
    })?;
    let path = format!(
        "{REQUEST_PATH_PREFIX}/{}/{token}",
        sender_path_element(sender.as_str())
    );
    OwnedObjectPath::try_from(path).map_err(|e| DialogError::Failed(e.to_string()))
}

/// `:1.42` becomes `1_42`
fn sender_path_element(unique_name: &str) -> String {
    unique_name.trim_start_matches(':').replace('.', "_")
}

fn next_token() -> String {
    let n = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("uitoolbox_{}_{n}", std::process::id())
}

fn open_options(request: &OpenRequest, token: &str) -> OpenFileOptions {
    OpenFileOptions {
        handle_token: Some(token.to_string()),
        modal: Some(true),
        multiple: Some(request.allow_multiple),
        directory: Some(false),
    }
}

fn save_options(request: &SaveRequest, token: &str) -> SaveFileOptions {
    let mut options = SaveFileOptions {
        handle_token: Some(token.to_string()),
        modal: Some(true),
        ..Default::default()
    };
    if let Some(glob) = request.extension_glob() {
        let preferred = FileFilter::new(glob.clone()).glob(glob);
        options.filters = Some(vec![preferred.clone(), FileFilter::new("All Files").glob("*")]);
        options.current_filter = Some(preferred);
    }
    options
}

fn into_selection(code: ResponseCode, results: FileChooserResults) -> Selection {
    match code {
        ResponseCode::Success => {
            Selection::confirmed(results.uris.unwrap_or_default().iter().map(|u| uri_to_path(u)))
        }
        ResponseCode::Cancelled => Selection::cancelled(),
        ResponseCode::Other => {
            warn!("Portal ended the interaction without a choice");
            Selection::cancelled()
        }
    }
}

/// Decode a `file://` URI; anything else is passed through verbatim
fn uri_to_path(uri: &str) -> PathBuf {
    url::Url::parse(uri)
        .ok()
        .filter(|u| u.scheme() == "file")
        .and_then(|u| u.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(uri))
}

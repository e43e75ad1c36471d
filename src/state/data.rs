/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the upload/service layers and the UI layer.

use std::path::PathBuf;

/// The image the user has uploaded for editing.
///
/// Replaced wholesale on each new upload, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// Full path to the picked file
    pub path: PathBuf,
    /// Filename only (e.g., "DSC_0001.jpg")
    pub filename: String,
    /// Media type derived from the file (e.g., "image/png")
    pub media_type: String,
    /// Base64 payload of the file bytes, with no data-URI prefix
    pub payload: String,
    /// Original file bytes, kept for the on-screen preview
    pub bytes: Vec<u8>,
}

/// The edited image returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultImage {
    /// Displayable data URI: `data:<media type>;base64,<payload>`
    pub data_uri: String,
    /// Decoded image bytes for rendering and saving
    pub bytes: Vec<u8>,
}

impl ResultImage {
    /// Compose a result from the request's media type and the service's
    /// base64 payload plus its decoded bytes.
    pub fn new(media_type: &str, payload: &str, bytes: Vec<u8>) -> Self {
        Self {
            data_uri: format!("data:{media_type};base64,{payload}"),
            bytes,
        }
    }
}

/// Where the edit workflow currently stands.
///
/// Loading and Error are mutually exclusive; entering either clears any
/// previous result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    /// Interactive, nothing in flight
    #[default]
    Idle,
    /// An edit request is in flight
    Loading,
    /// The last action failed; the message is shown in the alert region
    Error(String),
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }

    /// The error message, if the workflow is in the error state.
    pub fn error(&self) -> Option<&str> {
        match self {
            Status::Error(message) => Some(message),
            _ => None,
        }
    }
}

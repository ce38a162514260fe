use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems while bringing the kiosk up. Nothing after startup is allowed to end the
/// process with one of these.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not load background image {path:?}: {source}")]
    Background {
        path: PathBuf,
        #[source]
        source: BitmapError,
    },

    #[error("font family {0:?} is not installed")]
    Font(&'static str),

    #[error("could not prepare a drawing surface: {0}")]
    Draw(#[from] DrawError),

    #[error("could not build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("display unavailable: {0}")]
    Display(#[from] DisplayError),

    #[error("could not start the async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("could not initialise logging: {0}")]
    Logging(String),
}

/// A single data source failed. The whole source is reported as unavailable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("service key is not configured")]
    MissingKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed feed: {0}")]
    Feed(#[from] rss::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] json::Error),

    #[error("missing or invalid {0:?} value")]
    Field(&'static str),

    #[error("unrecognised {field} code {code:?}")]
    Code { field: &'static str, code: String },

    #[error("invalid publish time {text:?}: {source}")]
    Timestamp {
        text: String,
        #[source]
        source: time::error::Parse,
    },
}

/// A refresh cycle was abandoned; the previously published frame stays on screen.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("composition failed: {0}")]
    Draw(#[from] DrawError),

    #[error("refresh task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Rendering backend failure. The backend error is flattened to text so the error can cross
/// threads.
#[derive(Debug, Error)]
#[error("drawing failed: {0}")]
pub struct DrawError(String);

impl From<piet::Error> for DrawError {
    fn from(err: piet::Error) -> Self {
        Self(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Decode(#[from] png::DecodingError),

    #[error("unsupported colour type {0:?}")]
    ColorType(png::ColorType),

    #[error("expected a {expected_width}x{expected_height} image, found {width}x{height}")]
    Size {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },
}

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("display is not switched on")]
    Off,

    #[error("frame is {width}x{height} but the display is {display_width}x{display_height}")]
    Size {
        width: usize,
        height: usize,
        display_width: usize,
        display_height: usize,
    },

    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

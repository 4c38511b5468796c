use crate::events::AppEvent;
use crate::gui::images::{ImageId, ImageLoader, abbreviate};
use async_channel::Sender;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gdk_pixbuf::{Pixbuf, PixbufLoader};
use gdk_pixbuf::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tokio::runtime::Handle;
use url::Url;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("not a local file URI: {0}")]
    InvalidFileUri(String),
    #[error("malformed data URI")]
    MalformedDataUri,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(#[from] glib::Error),
    #[error("decoder produced no image")]
    Empty,
    #[error("decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Where the bytes behind an [`ImageId`] come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Inline(Vec<u8>),
    File(PathBuf),
}

impl ImageSource {
    pub fn parse(id: &ImageId) -> Result<Self, ImageError> {
        let raw = id.as_str().trim();

        if let Some(rest) = raw
            .get(..5)
            .filter(|p| p.eq_ignore_ascii_case("data:"))
            .map(|_| &raw[5..])
        {
            return Self::parse_data_uri(rest);
        }
        if raw
            .get(..7)
            .is_some_and(|p| p.eq_ignore_ascii_case("file://"))
        {
            let invalid = || ImageError::InvalidFileUri(raw.to_string());
            let path = Url::parse(raw)
                .map_err(|_| invalid())?
                .to_file_path()
                .map_err(|()| invalid())?;
            return Ok(Self::File(path));
        }
        match raw.split_once("://") {
            Some((scheme, _)) => Err(ImageError::UnsupportedScheme(scheme.to_string())),
            None => Ok(Self::File(PathBuf::from(raw))),
        }
    }

    /// `[<mediatype>][;base64],<data>`; the media type is left to the decoder to sniff.
    fn parse_data_uri(rest: &str) -> Result<Self, ImageError> {
        let (meta, payload) = rest.split_once(',').ok_or(ImageError::MalformedDataUri)?;
        if meta
            .split(';')
            .any(|param| param.trim().eq_ignore_ascii_case("base64"))
        {
            let compact: String = payload.split_whitespace().collect();
            Ok(Self::Inline(STANDARD.decode(compact)?))
        } else {
            Ok(Self::Inline(payload.as_bytes().to_vec()))
        }
    }

    pub async fn read(self) -> Result<Vec<u8>, ImageError> {
        match self {
            Self::Inline(bytes) => Ok(bytes),
            Self::File(path) => Ok(tokio::fs::read(&path).await?),
        }
    }
}

pub fn decode(bytes: &[u8]) -> Result<Pixbuf, ImageError> {
    let loader = PixbufLoader::new();
    let written = loader.write(bytes);
    // always close, gdk-pixbuf complains about loaders dropped mid-stream
    let closed = loader.close();
    written?;
    closed?;
    loader.pixbuf().ok_or(ImageError::Empty)
}

pub async fn load_pixbuf(id: &ImageId) -> Result<Pixbuf, ImageError> {
    let bytes = ImageSource::parse(id)?.read().await?;
    tokio::task::spawn_blocking(move || decode(&bytes)).await?
}

/// Decodes images on the background runtime and posts them to the GTK loop.
#[derive(Clone)]
pub struct BackgroundLoader {
    runtime: Handle,
    tx: Sender<AppEvent>,
}

impl BackgroundLoader {
    pub fn new(runtime: Handle, tx: Sender<AppEvent>) -> Self {
        Self { runtime, tx }
    }
}

impl ImageLoader for BackgroundLoader {
    fn load(&self, id: &ImageId) {
        let id = id.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            match load_pixbuf(&id).await {
                Ok(pixbuf) => {
                    log::debug!(
                        "Decoded {} ({}x{})",
                        abbreviate(&id),
                        pixbuf.width(),
                        pixbuf.height()
                    );
                    let _ = tx.send(AppEvent::ImageReady(id, pixbuf)).await;
                }
                Err(e) => log::warn!("Failed to load image {}: {}", abbreviate(&id), e),
            }
        });
    }
}

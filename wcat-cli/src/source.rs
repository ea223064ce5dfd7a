// ABOUTME: Byte sources for transfer items: seekable files and buffered stdin blobs
// ABOUTME: Supports bounded prefix reads, rewinding, and conversion into streaming request bodies

use crate::constants::sniff;
use crate::transcode::ResizeBounds;
use bytes::Bytes;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// One logical upload: a display name, the bytes behind it, and the image
/// bounds to apply if the bytes turn out to be a resizable raster.
/// Consumed exactly once by the uploader.
pub struct TransferItem {
    pub display_name: String,
    pub source: BodySource,
    pub bounds: ResizeBounds,
}

impl TransferItem {
    pub fn new(display_name: impl Into<String>, source: BodySource, bounds: ResizeBounds) -> Self {
        Self {
            display_name: display_name.into(),
            source,
            bounds,
        }
    }
}

/// Where a transfer item's bytes come from. Files stay on disk and stream
/// out; stdin is pre-buffered so its head can be re-read after sniffing.
#[derive(Debug)]
pub enum BodySource {
    File { path: PathBuf, file: File },
    Memory(Bytes),
}

impl BodySource {
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::File {
            path: path.as_ref().to_path_buf(),
            file,
        })
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Memory(bytes.into())
    }

    /// Read up to the sniff prefix length from the start of the source.
    /// Advances the read position of file sources; call [`rewind`] before
    /// transmitting the body.
    ///
    /// [`rewind`]: BodySource::rewind
    pub async fn read_prefix(&mut self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::File { file, .. } => {
                let mut buf = Vec::with_capacity(sniff::PREFIX_LEN);
                let mut head = file.take(sniff::PREFIX_LEN as u64);
                head.read_to_end(&mut buf).await?;
                Ok(buf)
            }
            Self::Memory(bytes) => {
                let len = bytes.len().min(sniff::PREFIX_LEN);
                Ok(bytes[..len].to_vec())
            }
        }
    }

    /// Reset the source to offset zero so the body is transmitted from the
    /// start. Memory blobs are sliced by [`read_prefix`], never consumed, so
    /// resetting them is a no-op.
    ///
    /// [`read_prefix`]: BodySource::read_prefix
    pub async fn rewind(&mut self) -> std::io::Result<()> {
        match self {
            Self::File { file, .. } => {
                file.seek(SeekFrom::Start(0)).await?;
                Ok(())
            }
            Self::Memory(_) => Ok(()),
        }
    }

    /// Read everything into memory. Only the image-decode path uses this;
    /// pass-through uploads stream via [`into_body`] instead.
    ///
    /// [`into_body`]: BodySource::into_body
    pub async fn read_all(self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::File { mut file, .. } => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).await?;
                Ok(buf)
            }
            Self::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Turn the source into a streaming request body without further
    /// buffering.
    pub fn into_body(self) -> reqwest::Body {
        match self {
            Self::File { file, .. } => reqwest::Body::wrap_stream(ReaderStream::new(file)),
            Self::Memory(bytes) => reqwest::Body::from(bytes),
        }
    }
}

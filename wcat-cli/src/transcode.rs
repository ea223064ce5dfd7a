// ABOUTME: Image decode, shrink-only resize, and streaming JPEG re-encode
// ABOUTME: The encoder runs on a blocking task feeding a bounded channel for backpressure

use crate::constants::pipe;
use crate::error::TransferError;
use crate::sniff::{self, ContentClassification};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Maximum output dimensions for a resize. Zero disables the bound on that
/// axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl ResizeBounds {
    pub const UNBOUNDED: Self = Self {
        max_width: 0,
        max_height: 0,
    };

    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    fn normalized(self) -> (u32, u32) {
        let width = if self.max_width == 0 {
            u32::MAX
        } else {
            self.max_width
        };
        let height = if self.max_height == 0 {
            u32::MAX
        } else {
            self.max_height
        };
        (width, height)
    }

    /// Target dimensions that fit within the bounds, preserving aspect ratio.
    /// Never grows the image; an image already within bounds keeps its size.
    pub fn fit(self, width: u32, height: u32) -> (u32, u32) {
        let (max_width, max_height) = self.normalized();
        if width <= max_width && height <= max_height {
            return (width, height);
        }

        let width_ratio = max_width as f64 / width as f64;
        let height_ratio = max_height as f64 / height as f64;
        let ratio = width_ratio.min(height_ratio);

        let target_width = ((width as f64 * ratio).round() as u32).max(1);
        let target_height = ((height as f64 * ratio).round() as u32).max(1);
        (target_width, target_height)
    }
}

/// Decode an image of a sniffed type. JPEG and PNG are the resize-eligible
/// inputs; WebP decodes too but is never written back out.
pub fn decode_image(
    data: &[u8],
    classification: &ContentClassification,
) -> Result<DynamicImage, TransferError> {
    let format = if classification.is(sniff::JPEG) {
        image::ImageFormat::Jpeg
    } else if classification.is(sniff::PNG) {
        image::ImageFormat::Png
    } else if classification.is(sniff::WEBP) {
        image::ImageFormat::WebP
    } else {
        return Err(TransferError::UnsupportedImage(
            classification.mime().to_string(),
        ));
    };
    Ok(image::load_from_memory_with_format(data, format)?)
}

/// Resize within bounds and re-encode as baseline JPEG, streamed as it is
/// produced. The encoder runs on a blocking task and pushes chunks through
/// a bounded channel: a slow consumer stalls the encoder instead of growing
/// a buffer, and the channel closes on every encoder exit path so a blocked
/// reader can never wait forever.
pub fn jpeg_stream(img: DynamicImage, bounds: ResizeBounds) -> ReceiverStream<io::Result<Bytes>> {
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(pipe::CAPACITY);

    tokio::task::spawn_blocking(move || {
        let (target_width, target_height) = bounds.fit(img.width(), img.height());
        let resized = if (target_width, target_height) == (img.width(), img.height()) {
            img
        } else {
            log::debug!(
                "resizing {}x{} to {}x{}",
                img.width(),
                img.height(),
                target_width,
                target_height
            );
            img.resize(target_width, target_height, FilterType::Lanczos3)
        };

        // JPEG carries no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut writer = ChannelWriter::new(tx.clone());
        let result = rgb
            .write_with_encoder(JpegEncoder::new(&mut writer))
            .map_err(io::Error::other)
            .and_then(|()| writer.flush());

        if let Err(err) = result {
            // fails when the consumer is already gone, which is fine; the
            // sender drop below closes the channel either way
            let _ = tx.blocking_send(Err(err));
        }
    });

    ReceiverStream::new(rx)
}

/// `std::io::Write` adapter that chunks encoded bytes into a channel.
/// Blocks the encoding task when the channel is at capacity.
struct ChannelWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
    buf: Vec<u8>,
}

impl ChannelWriter {
    fn new(tx: mpsc::Sender<io::Result<Bytes>>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(pipe::CHUNK_SIZE),
        }
    }

    fn send_chunk(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(std::mem::take(&mut self.buf));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "transcode consumer dropped"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= pipe::CHUNK_SIZE {
            self.send_chunk()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_chunk()
    }
}

// ABOUTME: Upload orchestration: sniff, rewind, optional transcode, and the preview POST
// ABOUTME: Also issues the clear-previews request; one HTTP exchange per transfer item

use crate::constants::{endpoints, headers};
use crate::error::TransferError;
use crate::filename;
use crate::sniff;
use crate::source::TransferItem;
use crate::transcode;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Result of one HTTP exchange. Non-2xx responses land here rather than in
/// an error: the server answered, it just said no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub success: bool,
    pub status: u16,
    pub body: String,
}

/// Join an endpoint path onto the configured server base URL.
pub(crate) fn api_url(server: &str, endpoint: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), endpoint)
}

pub struct Uploader {
    client: Client,
    server: String,
}

impl Uploader {
    pub fn new(client: Client, server: impl Into<String>) -> Self {
        Self {
            client,
            server: server.into(),
        }
    }

    /// Upload one item to the preview endpoint. With `just_file` the bytes
    /// go up untouched under a generic binary content type and the server
    /// is told to skip its own rendering. Otherwise the content type is
    /// sniffed from the head of the source, the source is rewound, and
    /// JPEG/PNG inputs are re-encoded through the resize pipe.
    pub async fn upload(
        &self,
        item: TransferItem,
        just_file: bool,
    ) -> Result<TransferOutcome, TransferError> {
        let TransferItem {
            display_name,
            mut source,
            bounds,
        } = item;

        let (body, content_type) = if just_file {
            (source.into_body(), sniff::OCTET_STREAM.to_string())
        } else {
            let prefix = source.read_prefix().await?;
            let classification = sniff::classify(&prefix);
            source.rewind().await.map_err(TransferError::Rewind)?;
            log::debug!("{} sniffed as {}", display_name, classification.mime());

            if classification.matches_any(sniff::RESIZABLE) {
                let data = source.read_all().await?;
                let img = transcode::decode_image(&data, &classification)?;
                let stream = transcode::jpeg_stream(img, bounds);
                (
                    reqwest::Body::wrap_stream(stream),
                    sniff::JPEG.to_string(),
                )
            } else {
                let content_type = sniff::content_type_for(&classification, &display_name);
                (source.into_body(), content_type)
            }
        };

        let mut request = self
            .client
            .post(api_url(&self.server, endpoints::SHOW_THIS))
            .header(CONTENT_TYPE, content_type)
            .header(headers::FILENAME, filename::basename(&display_name));
        if just_file {
            request = request.header(headers::JUST_FILE, "true");
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(TransferOutcome {
            success: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Ask the server to drop all stored previews.
pub async fn clear_previews(
    client: &Client,
    server: &str,
) -> Result<TransferOutcome, TransferError> {
    let response = client
        .post(api_url(server, endpoints::CLEAR_PREVIEWS))
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;

    Ok(TransferOutcome {
        success: status.is_success(),
        status: status.as_u16(),
        body,
    })
}

// ABOUTME: Latest-file download: status interpretation, filename handling, and destinations
// ABOUTME: Streams response bodies to stdout, an explicit path, or a directory entry

use crate::constants::{endpoints, headers, markers};
use crate::error::TransferError;
use crate::filename;
use crate::transfer::api_url;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Where the downloaded bytes should go, chosen from the CLI output
/// location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
    Directory(PathBuf),
}

impl Destination {
    /// Interpret an output location: `-` is stdout; `.` or a trailing
    /// separator (either style) selects directory mode; anything else is an
    /// explicit file path.
    pub fn parse(location: &str) -> Self {
        if location == "-" {
            return Self::Stdout;
        }
        if location == "."
            || location.ends_with('/')
            || location.ends_with('\\')
            || location.ends_with("/.")
            || location.ends_with("\\.")
        {
            return Self::Directory(PathBuf::from(location));
        }
        Self::File(PathBuf::from(location))
    }
}

pub struct Downloader {
    client: Client,
    server: String,
}

impl Downloader {
    pub fn new(client: Client, server: impl Into<String>) -> Self {
        Self {
            client,
            server: server.into(),
        }
    }

    /// GET the latest previewed file. On 2xx returns the open response and
    /// the sanitized suggested filename, which is empty when the header is
    /// absent or undecodable. A 409 carrying the server's empty-state
    /// marker becomes [`TransferError::NoLatestFile`].
    pub async fn fetch_latest(&self) -> Result<(Response, String), TransferError> {
        let response = self
            .client
            .get(api_url(&self.server, endpoints::DOWNLOAD_FILE))
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let suggested = response
                .headers()
                .get(headers::FILENAME)
                .and_then(|value| value.to_str().ok())
                .map(filename::sanitize)
                .unwrap_or_default();
            return Ok((response, suggested));
        }

        let body = response.text().await?;
        if status.as_u16() == 409 && body.contains(markers::NOTHING_TO_PREVIEW) {
            return Err(TransferError::NoLatestFile);
        }
        Err(TransferError::Protocol {
            status: status.as_u16(),
            body,
        })
    }

    /// Copy the latest file verbatim to standard output.
    pub async fn download_to_stdout(&self) -> Result<(), TransferError> {
        let (response, _) = self.fetch_latest().await?;
        let mut stdout = tokio::io::stdout();
        copy_body(response, &mut stdout).await?;
        stdout.flush().await?;
        Ok(())
    }

    /// Download into an explicit path. The destination is opened before the
    /// request goes out, so a refused `create_new` never touches the server.
    pub async fn download_to_file(
        &self,
        path: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, TransferError> {
        let mut file = open_destination(path, overwrite).await?;
        let (response, _) = self.fetch_latest().await?;
        copy_body(response, &mut file).await?;
        close_destination(file).await?;
        Ok(path.to_path_buf())
    }

    /// Download into a directory under the server-suggested name. Fails
    /// when the suggestion sanitizes to nothing, rather than inventing a
    /// name.
    pub async fn download_to_directory(
        &self,
        dir: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, TransferError> {
        let metadata = tokio::fs::metadata(dir).await?;
        if !metadata.is_dir() {
            return Err(TransferError::NotADirectory(dir.display().to_string()));
        }

        let (response, suggested) = self.fetch_latest().await?;
        if suggested.is_empty() {
            return Err(TransferError::MissingFilename);
        }

        // sanitize() guarantees a single path segment
        let full = dir.join(&suggested);
        let mut file = open_destination(&full, overwrite).await?;
        copy_body(response, &mut file).await?;
        close_destination(file).await?;
        Ok(full)
    }
}

async fn open_destination(path: &Path, overwrite: bool) -> Result<File, TransferError> {
    if overwrite {
        return Ok(File::create(path).await?);
    }
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => Ok(file),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(TransferError::AlreadyExists(path.display().to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Flush and close the handle before success is reported, surfacing
/// write-back errors that only appear at close time.
async fn close_destination(mut file: File) -> Result<(), TransferError> {
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

/// Copy the response body into the writer. On a write error the remaining
/// body is drained before the error is returned.
async fn copy_body<W: AsyncWrite + Unpin>(
    mut response: Response,
    writer: &mut W,
) -> Result<u64, TransferError> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        if let Err(err) = writer.write_all(&chunk).await {
            while let Ok(Some(_)) = response.chunk().await {}
            return Err(err.into());
        }
        written += chunk.len() as u64;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    #[test]
    fn test_destination_parse() {
        assert_eq!(Destination::parse("-"), Destination::Stdout);
        assert_eq!(Destination::parse("."), Destination::Directory(PathBuf::from(".")));
        assert_eq!(
            Destination::parse("downloads/"),
            Destination::Directory(PathBuf::from("downloads/"))
        );
        assert_eq!(
            Destination::parse("downloads/."),
            Destination::Directory(PathBuf::from("downloads/."))
        );
        assert_eq!(
            Destination::parse("downloads\\"),
            Destination::Directory(PathBuf::from("downloads\\"))
        );
        assert_eq!(
            Destination::parse("out.bin"),
            Destination::File(PathBuf::from("out.bin"))
        );
        assert_eq!(
            Destination::parse("downloads/out.bin"),
            Destination::File(PathBuf::from("downloads/out.bin"))
        );
    }

    #[tokio::test]
    async fn test_fetch_latest_sanitizes_filename() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/downloadfile")
            .with_status(200)
            .with_header("filename", "my%20report%3F.pdf")
            .with_body("pdf bytes")
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), server.url());
        let (_, suggested) = downloader.fetch_latest().await.unwrap();

        mock.assert_async().await;
        assert_eq!(suggested, "my report.pdf");
    }

    #[tokio::test]
    async fn test_fetch_latest_missing_filename_is_not_fatal() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(200)
            .with_body("bytes")
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), server.url());
        let (_, suggested) = downloader.fetch_latest().await.unwrap();
        assert_eq!(suggested, "");
    }

    #[tokio::test]
    async fn test_fetch_latest_empty_server_condition() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(409)
            .with_body("There is nothing to preview right now")
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), server.url());
        let err = downloader.fetch_latest().await.unwrap_err();
        assert!(matches!(err, TransferError::NoLatestFile));
    }

    #[tokio::test]
    async fn test_fetch_latest_other_409_is_generic_protocol_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(409)
            .with_body("some other conflict")
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), server.url());
        let err = downloader.fetch_latest().await.unwrap_err();
        match err {
            TransferError::Protocol { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "some other conflict");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_latest_server_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let downloader = Downloader::new(Client::new(), server.url());
        let err = downloader.fetch_latest().await.unwrap_err();
        assert!(matches!(err, TransferError::Protocol { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_download_to_file_writes_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(200)
            .with_body("downloaded contents")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        let downloader = Downloader::new(Client::new(), server.url());
        let written = downloader.download_to_file(&path, false).await.unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"downloaded contents");
    }

    #[tokio::test]
    async fn test_download_to_file_without_overwrite_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kept.bin");
        std::fs::write(&path, "original").unwrap();

        // refused before any request goes out, so no mock server needed
        let downloader = Downloader::new(Client::new(), "http://127.0.0.1:1");
        let err = downloader.download_to_file(&path, false).await.unwrap_err();

        assert!(matches!(err, TransferError::AlreadyExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_download_to_file_with_overwrite_truncates() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(200)
            .with_body("new")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replaced.bin");
        std::fs::write(&path, "a much longer original body").unwrap();

        let downloader = Downloader::new(Client::new(), server.url());
        downloader.download_to_file(&path, true).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_download_to_directory_uses_suggested_name() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(200)
            .with_header("filename", "..%2Fsuggested.txt")
            .with_body("dir contents")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(Client::new(), server.url());
        let written = downloader
            .download_to_directory(dir.path(), false)
            .await
            .unwrap();

        // the encoded traversal prefix decodes and drops in the basename step
        assert_eq!(written, dir.path().join("suggested.txt"));
        assert_eq!(std::fs::read(&written).unwrap(), b"dir contents");
    }

    #[tokio::test]
    async fn test_download_to_directory_requires_filename() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/downloadfile")
            .with_status(200)
            .with_body("anonymous bytes")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(Client::new(), server.url());
        let err = downloader
            .download_to_directory(dir.path(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::MissingFilename));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_to_directory_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let not_dir = dir.path().join("plain.txt");
        std::fs::write(&not_dir, "x").unwrap();

        let downloader = Downloader::new(Client::new(), "http://127.0.0.1:1");
        let err = downloader
            .download_to_directory(&not_dir, false)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::NotADirectory(_)));
    }
}

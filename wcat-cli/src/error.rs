// ABOUTME: Error taxonomy for upload, download, and clear operations
// ABOUTME: Distinguishes protocol failures from transport failures and the empty-server case

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not rewind input after content detection: {0}")]
    Rewind(#[source] std::io::Error),

    #[error("resizing not supported for {0}")]
    UnsupportedImage(String),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned status {status}")]
    Protocol { status: u16, body: String },

    #[error("there is no latest file to download")]
    NoLatestFile,

    #[error("latest file has no filename")]
    MissingFilename,

    #[error("file already exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),
}

impl TransferError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            TransferError::NoLatestFile => {
                Some("Preview a file first, then download it with: wcat download")
            }
            TransferError::MissingFilename => {
                Some("Pass an explicit output path with -O instead of a directory")
            }
            TransferError::AlreadyExists(_) => Some("Use --overwrite to replace the file"),
            TransferError::Network(_) => {
                Some("Check that the wcat server is running and --server points at it")
            }
            _ => None,
        }
    }

    /// True when the server answered but refused, as opposed to transport
    /// or local failures.
    pub fn is_server_rejection(&self) -> bool {
        matches!(
            self,
            TransferError::Protocol { .. } | TransferError::NoLatestFile
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TransferError::NoLatestFile.to_string(),
            "there is no latest file to download"
        );
        assert_eq!(
            TransferError::UnsupportedImage("image/tiff".to_string()).to_string(),
            "resizing not supported for image/tiff"
        );
        assert_eq!(
            TransferError::Protocol {
                status: 500,
                body: "boom".to_string()
            }
            .to_string(),
            "server returned status 500"
        );
        assert_eq!(
            TransferError::AlreadyExists("out.bin".to_string()).to_string(),
            "file already exists: out.bin"
        );
    }

    #[test]
    fn test_help_text() {
        assert!(TransferError::NoLatestFile.help_text().is_some());
        assert!(TransferError::MissingFilename.help_text().is_some());
        assert!(
            TransferError::AlreadyExists("x".to_string())
                .help_text()
                .unwrap()
                .contains("--overwrite")
        );
        assert!(TransferError::NotADirectory("x".to_string())
            .help_text()
            .is_none());
    }

    #[test]
    fn test_server_rejection_classification() {
        assert!(TransferError::NoLatestFile.is_server_rejection());
        assert!(TransferError::Protocol {
            status: 418,
            body: String::new()
        }
        .is_server_rejection());
        assert!(!TransferError::MissingFilename.is_server_rejection());
        assert!(
            !TransferError::Io(std::io::Error::other("x")).is_server_rejection()
        );
    }
}

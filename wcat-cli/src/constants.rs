// ABOUTME: Centralized constants for the wcat CLI application
// ABOUTME: Contains server defaults, API endpoints, header names, and pipeline sizing

/// Built-in defaults, overridable via flags, environment, or config file
pub mod defaults {
    pub const SERVER_URL: &str = "http://localhost:8085";
    pub const MAX_WIDTH: u32 = 1024;
    pub const MAX_HEIGHT: u32 = 800;
}

/// Server API endpoint paths, joined onto the configured base URL
pub mod endpoints {
    pub const SHOW_THIS: &str = "/api/showthis";
    pub const DOWNLOAD_FILE: &str = "/api/downloadfile";
    pub const CLEAR_PREVIEWS: &str = "/api/clearpreviews";
}

/// Custom header names used by the preview protocol
pub mod headers {
    /// Carries the basename of the uploaded or downloaded file
    pub const FILENAME: &str = "filename";

    /// Set to "true" when the server should store the bytes without rendering
    pub const JUST_FILE: &str = "justfile";
}

/// Content-type detection parameters
pub mod sniff {
    /// Bytes read from the head of a source for magic-byte detection
    pub const PREFIX_LEN: usize = 8192;
}

/// Sizing for the transcode handoff channel
pub mod pipe {
    /// Size of one encoded chunk pushed through the channel
    pub const CHUNK_SIZE: usize = 64 * 1024;

    /// Channel capacity in chunks; a full channel blocks the encoder
    pub const CAPACITY: usize = 8;
}

/// Literal response fragments the client matches on
pub mod markers {
    /// 409 body text the server sends when no preview exists
    pub const NOTHING_TO_PREVIEW: &str = "There is nothing to preview";
}

/// Process exit codes for failures beyond argument parsing
pub mod exit_codes {
    pub const STDIN_READ_FAILED: i32 = 10;
    pub const CLEAR_FAILED: i32 = 13;
}

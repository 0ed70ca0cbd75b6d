use std::env;
use std::path::PathBuf;

/// Where uploaded files live and how they are exposed.
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub root: PathBuf,
    pub url: String,
    pub max_upload_bytes: usize,
}

impl MediaConfig {
    pub fn from_env() -> Self {
        Self {
            root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
        }
    }
}

use crate::error::{Result, StudioError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest input image accepted, matching the uploader limit.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// An input photograph: raw bytes plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: Vec<u8>,
    mime_type: String,
}

impl ImagePayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(StudioError::InvalidInput(format!(
                "'{}' is not an image type",
                mime_type
            )));
        }
        if data.is_empty() {
            return Err(StudioError::InvalidInput("image is empty".into()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(StudioError::InvalidInput(format!(
                "image is {} bytes, the limit is 10MB",
                data.len()
            )));
        }
        Ok(Self { data, mime_type })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = mime_from_extension(path).ok_or_else(|| {
            StudioError::InvalidInput(format!("{} is not a supported image file", path.display()))
        })?;
        let data = fs::read(path)?;
        Self::new(data, mime_type)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// One image returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn from_base64(encoded: &str, mime_type: Option<&str>) -> Result<Self> {
        let data = BASE64.decode(encoded.as_bytes())?;
        Ok(Self {
            data,
            mime_type: mime_type.unwrap_or("image/png").to_string(),
        })
    }

    /// `data:` URI suitable for embedding or handing to a UI.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.data))
    }

    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }

    /// Writes the image into `dir` and returns the full path.
    pub fn save(&self, dir: impl AsRef<Path>, stem: &str) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", stem, self.extension()));
        fs::write(&path, &self.data)?;
        Ok(path)
    }
}

use crate::{
    error::{Result, StudioError},
    models::{AppMode, AspectRatio, ImagePayload, ProductCategory, StyleSelection},
};

/// A fully-formed generation request. Built once by
/// [`crate::builder::build_request`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub(crate) description: String,
    pub(crate) category: ProductCategory,
    pub(crate) style: StyleSelection,
    pub(crate) aspect_ratio: AspectRatio,
    pub(crate) images: Vec<ImagePayload>,
    pub(crate) system_instruction: String,
    pub(crate) prompt: String,
}

impl GenerationRequest {
    pub fn mode(&self) -> AppMode {
        self.style.mode()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> ProductCategory {
        self.category
    }

    pub fn style(&self) -> &StyleSelection {
        &self.style
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn images(&self) -> &[ImagePayload] {
        &self.images
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Picks the images a mode works on: photo mode uses the one selected
/// upload, banner mode uses every upload.
pub fn select_images(
    mode: AppMode,
    mut uploads: Vec<ImagePayload>,
    selected: Option<usize>,
) -> Result<Vec<ImagePayload>> {
    if uploads.is_empty() {
        return Err(StudioError::InvalidInput(
            "at least one product image is required".into(),
        ));
    }

    match mode {
        AppMode::Banner => Ok(uploads),
        AppMode::Photo => {
            let index = match selected {
                Some(index) => index,
                None if uploads.len() == 1 => 0,
                None => {
                    return Err(StudioError::InvalidInput(
                        "photo mode needs one selected image".into(),
                    ))
                }
            };
            if index >= uploads.len() {
                return Err(StudioError::InvalidInput(format!(
                    "selected image {} does not exist ({} uploaded)",
                    index,
                    uploads.len()
                )));
            }
            Ok(vec![uploads.swap_remove(index)])
        }
    }
}

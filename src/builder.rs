//! Turns the user's choices into the instruction text sent to the image model.

use crate::{
    error::{Result, StudioError},
    models::{
        AppMode, AspectRatio, BannerStyle, GenerationRequest, ImagePayload, PhotoStyle,
        ProductCategory, StyleSelection,
    },
};

const PHOTO_SYSTEM_INSTRUCTION: &str =
    "You are a professional commercial product photographer.";

const BANNER_SYSTEM_INSTRUCTION: &str =
    "You are a senior graphic designer and retoucher for high-end advertising.";

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub description: String,
    pub category: ProductCategory,
    pub style: StyleSelection,
    pub aspect_ratio: AspectRatio,
    pub images: Vec<ImagePayload>,
}

impl GenerationOptions {
    pub fn mode(&self) -> AppMode {
        self.style.mode()
    }

    /// Checks what the form used to guarantee before a run starts.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(StudioError::InvalidInput(
                "a product description is required".into(),
            ));
        }
        if self.images.is_empty() {
            return Err(StudioError::InvalidInput(
                "at least one product image is required".into(),
            ));
        }
        if self.mode() == AppMode::Photo && self.images.len() != 1 {
            return Err(StudioError::InvalidInput(format!(
                "photo mode works on exactly one image, got {}",
                self.images.len()
            )));
        }
        Ok(())
    }
}

/// Builds the request. Pure: same options, same request.
pub fn build_request(options: GenerationOptions) -> GenerationRequest {
    let (system_instruction, prompt) = match &options.style {
        StyleSelection::Photo(style) => (
            PHOTO_SYSTEM_INSTRUCTION,
            photo_prompt(options.category, &options.description, style),
        ),
        StyleSelection::Banner(style) => (
            BANNER_SYSTEM_INSTRUCTION,
            banner_prompt(options.category, &options.description, style),
        ),
    };

    GenerationRequest {
        description: options.description,
        category: options.category,
        style: options.style,
        aspect_ratio: options.aspect_ratio,
        images: options.images,
        system_instruction: system_instruction.to_string(),
        prompt,
    }
}

fn banner_prompt(category: ProductCategory, description: &str, style: &BannerStyle) -> String {
    format!(
        "TASK:
Design one high-resolution advertising banner built from the supplied products.

INPUT:
- Product category: {category}
- Detailed description: {description}
- Design style: {label}
- Style details: {details}

CRITICAL RULES:
1. SHARPNESS AND TEXT: Product imagery must be pixel-sharp. Text, logos and labels on the packaging must stay clear and legible, never blurred, smeared or distorted.
2. PERFECT CUTOUT: Remove the background from each product with edge-perfect precision, as if cut with a pen tool. Edges must be smooth, must not eat into product details, and must leave no white halo.
3. USE EVERY PRODUCT: Place all input images in the design with a professional layout.
4. NO GENERATED TEXT: Do not add any text, slogan, logo or watermark except what already exists on the original packaging.
5. AESTHETICS: Setting and props must match the \"{label}\" style. The products are the hero and stand out most against the background.

CREATE A SHARP, CLEAN AND PROFESSIONAL BANNER.",
        category = category.prompt_name(),
        description = description,
        label = style.label,
        details = style.description,
    )
}

fn photo_prompt(category: ProductCategory, description: &str, style: &PhotoStyle) -> String {
    format!(
        "TASK:
Create a high-quality product image from the input photo, matching the requested style and setting.

INPUT:
- Product category: {category}
- Detailed description: {description}
- Photo style: {label}
- Style details: {details}

CRITICAL RULES:
1. Keep the original product's shape, size, color, material and every detail exactly as in the input image. Do not change the design, labels or stickers.
2. Cut the product out precisely and composite it into the new setting naturally. Lighting and shadows must be realistic.
3. Do NOT add any text, logo, watermark or slogan to the image.
4. The setting must match the chosen style.
5. The product is the hero. Keep it sharp and unobstructed.",
        category = category.prompt_name(),
        description = description,
        label = style.label,
        details = style.description,
    )
}

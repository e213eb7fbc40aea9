use crate::models::AppMode;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStyleCategory {
    Studio,
    Creative,
    Lifestyle,
    FlatLay,
    Macro,
}

impl PhotoStyleCategory {
    pub const ALL: [PhotoStyleCategory; 5] = [
        PhotoStyleCategory::Studio,
        PhotoStyleCategory::Creative,
        PhotoStyleCategory::Lifestyle,
        PhotoStyleCategory::FlatLay,
        PhotoStyleCategory::Macro,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PhotoStyleCategory::Studio => "Studio / E-commerce",
            PhotoStyleCategory::Creative => "Creative Concept",
            PhotoStyleCategory::Lifestyle => "Lifestyle",
            PhotoStyleCategory::FlatLay => "Flat Lay",
            PhotoStyleCategory::Macro => "Macro Detail",
        }
    }
}

impl fmt::Display for PhotoStyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoStyle {
    pub id: String,
    pub label: String,
    pub description: String,
    pub category: PhotoStyleCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BannerStyle {
    pub id: String,
    pub label: String,
    pub description: String,
}

/// The style picked for a generation. The variant also fixes the mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StyleSelection {
    Photo(PhotoStyle),
    Banner(BannerStyle),
}

impl StyleSelection {
    pub fn mode(&self) -> AppMode {
        match self {
            StyleSelection::Photo(_) => AppMode::Photo,
            StyleSelection::Banner(_) => AppMode::Banner,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            StyleSelection::Photo(style) => &style.id,
            StyleSelection::Banner(style) => &style.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StyleSelection::Photo(style) => &style.label,
            StyleSelection::Banner(style) => &style.label,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            StyleSelection::Photo(style) => &style.description,
            StyleSelection::Banner(style) => &style.description,
        }
    }

    /// Looks the id up in the catalog for the given mode.
    pub fn find(mode: AppMode, id: &str) -> Option<Self> {
        match mode {
            AppMode::Photo => find_photo_style(id).cloned().map(StyleSelection::Photo),
            AppMode::Banner => find_banner_style(id).cloned().map(StyleSelection::Banner),
        }
    }
}

fn photo(id: &str, category: PhotoStyleCategory, label: &str, description: &str) -> PhotoStyle {
    PhotoStyle {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        category,
    }
}

fn banner(id: &str, label: &str, description: &str) -> BannerStyle {
    BannerStyle {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
    }
}

pub static PHOTO_STYLES: Lazy<Vec<PhotoStyle>> = Lazy::new(|| {
    use PhotoStyleCategory::*;
    vec![
        photo("studio_white", Studio, "White background (E-commerce)", "Pure white background (#FFFFFF), professional studio lighting, natural shadow under the product."),
        photo("studio_clean", Studio, "Minimal studio", "Light grey or neutral beige background, full focus on the product."),
        photo("creative_splash", Creative, "Water splash / Energy", "Dynamic water splashes, high energy, frozen motion."),
        photo("creative_neon", Creative, "Neon / Bold colors", "Vivid colors, neon lighting, strong contrast."),
        photo("creative_dynamic", Creative, "Dynamic motion", "Floating objects, motion blur effects, artistic props."),
        photo("life_table", Lifestyle, "Dining table", "Cozy dining table, napkins, cutlery, warm light."),
        photo("life_office", Lifestyle, "Office", "Professional desk, laptop, notebook, clean light."),
        photo("life_kitchen", Lifestyle, "Modern kitchen", "Marble countertop, kitchen ingredients, bright and airy."),
        photo("life_picnic", Lifestyle, "Picnic", "Grass, sunlight, picnic blanket, natural atmosphere."),
        photo("life_cafe", Lifestyle, "Cafe", "Wooden table, bokeh background, coffee shop ambience."),
        photo("life_spa", Lifestyle, "Bathroom / Spa", "Ceramic tiles, towels, green plants, zen mood, water droplets."),
        photo("flat_min", FlatLay, "Minimal flat lay", "Clean background, tidy props, top-down view."),
        photo("flat_prop", FlatLay, "Flat lay with props", "Surrounded by related ingredients or items, artistically arranged."),
        photo("macro_tex", Macro, "Material close-up", "Extreme close-up on material quality."),
        photo("macro_fresh", Macro, "Freshness (droplets)", "Cold condensation, water droplets, ice, a fresh look."),
        photo("macro_foam", Macro, "Foam / Gel", "Highlights liquid texture, bubbles and thickness."),
    ]
});

pub static BANNER_STYLES: Lazy<Vec<BannerStyle>> = Lazy::new(|| {
    vec![
        banner("banner_studio", "1. Studio banner (Product focus)", "Solid background (white/black/beige/pastel), beautiful light, soft shadow. No complex props. Easy to read text."),
        banner("banner_food", "2. Food styling banner", "Food props (napkin, spoon, plate, crumbs), warm light. Makes the viewer want to eat it right away."),
        banner("banner_lifestyle", "3. Lifestyle banner", "Real-life setting: dining table, picnic or office depending on the product."),
        banner("banner_concept", "4. Creative concept banner", "Gradient background, geometry, 3D shapes. Plenty of negative space."),
        banner("banner_moody", "5. Moody cinematic banner", "Strong contrast lighting. Deep, luxurious tones."),
        banner("banner_pop", "6. Pop / Colorful / Gen Z banner", "Bright neon or pastel. Playful, youthful elements."),
        banner("banner_minimal", "7. Minimal clean banner", "Light background, few details. Minimal, clean, on-brand."),
        banner("banner_ecommerce", "8. Marketplace e-commerce banner", "Simple background. Optimized for Shopee/Lazada/TikTok Shop listings."),
        banner("banner_poster", "9. Poster / Event banner", "For sale campaigns. Strong layout."),
    ]
});

pub fn find_photo_style(id: &str) -> Option<&'static PhotoStyle> {
    PHOTO_STYLES.iter().find(|style| style.id == id)
}

pub fn find_banner_style(id: &str) -> Option<&'static BannerStyle> {
    BANNER_STYLES.iter().find(|style| style.id == id)
}

/// Photo styles grouped by category, in catalog order.
pub fn photo_styles_by_category() -> Vec<(PhotoStyleCategory, Vec<&'static PhotoStyle>)> {
    PhotoStyleCategory::ALL
        .iter()
        .map(|category| {
            let styles = PHOTO_STYLES
                .iter()
                .filter(|style| style.category == *category)
                .collect();
            (*category, styles)
        })
        .collect()
}

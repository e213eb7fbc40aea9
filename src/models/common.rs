use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Photo,
    Banner,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Photo => "photo",
            AppMode::Banner => "banner",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "photo" => Ok(AppMode::Photo),
            "banner" => Ok(AppMode::Banner),
            other => Err(format!("unknown mode '{}', expected photo or banner", other)),
        }
    }
}

/// User-facing aspect ratios. The image model only accepts a fixed set of
/// ratios, so several choices collapse onto the nearest supported one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Square,
    Portrait4x5,
    Panorama8x3,
    Landscape3x2,
    Mobile9x16,
    Landscape16x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 6] = [
        AspectRatio::Square,
        AspectRatio::Portrait4x5,
        AspectRatio::Panorama8x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Mobile9x16,
        AspectRatio::Landscape16x9,
    ];

    /// Ratio sent to the service in `imageConfig.aspectRatio`.
    pub fn service_ratio(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait4x5 => "3:4",
            AspectRatio::Panorama8x3 => "16:9",
            AspectRatio::Landscape3x2 => "4:3",
            AspectRatio::Mobile9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }

    /// Ratio as the user picked it.
    pub fn display_ratio(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Panorama8x3 => "8:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Mobile9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1 (Square)",
            AspectRatio::Portrait4x5 => "4:5 (Portrait)",
            AspectRatio::Panorama8x3 => "8:3 (Panorama)",
            AspectRatio::Landscape3x2 => "3:2 (Standard)",
            AspectRatio::Mobile9x16 => "9:16 (Story)",
            AspectRatio::Landscape16x9 => "16:9 (Cinematic)",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Square
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_ratio())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AspectRatio::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.display_ratio() == wanted)
            .ok_or_else(|| {
                format!(
                    "unsupported aspect ratio '{}', expected one of 1:1, 4:5, 8:3, 3:2, 9:16, 16:9",
                    wanted
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Food,
    Snacks,
    Drinks,
    Shampoo,
    BodyWash,
    PersonalCare,
    GiftCombo,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 7] = [
        ProductCategory::Food,
        ProductCategory::Snacks,
        ProductCategory::Drinks,
        ProductCategory::Shampoo,
        ProductCategory::BodyWash,
        ProductCategory::PersonalCare,
        ProductCategory::GiftCombo,
    ];

    /// Name used inside the generation prompt.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            ProductCategory::Food => "Food",
            ProductCategory::Snacks => "Snacks/Confectionery",
            ProductCategory::Drinks => "Beverages",
            ProductCategory::Shampoo => "Shampoo",
            ProductCategory::BodyWash => "Body Wash",
            ProductCategory::PersonalCare => "Personal Care",
            ProductCategory::GiftCombo => "Gift Combo",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ProductCategory::Food => "food",
            ProductCategory::Snacks => "snacks",
            ProductCategory::Drinks => "drinks",
            ProductCategory::Shampoo => "shampoo",
            ProductCategory::BodyWash => "body_wash",
            ProductCategory::PersonalCare => "personal_care",
            ProductCategory::GiftCombo => "gift_combo",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt_name())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        ProductCategory::ALL
            .iter()
            .copied()
            .find(|category| category.slug() == wanted)
            .ok_or_else(|| format!("unknown product category '{}'", s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_mapping_is_preserved() {
        assert_eq!(AspectRatio::Square.service_ratio(), "1:1");
        assert_eq!(AspectRatio::Portrait4x5.service_ratio(), "3:4");
        assert_eq!(AspectRatio::Panorama8x3.service_ratio(), "16:9");
        assert_eq!(AspectRatio::Landscape3x2.service_ratio(), "4:3");
        assert_eq!(AspectRatio::Mobile9x16.service_ratio(), "9:16");
        assert_eq!(AspectRatio::Landscape16x9.service_ratio(), "16:9");
    }

    #[test]
    fn test_aspect_ratio_parses_user_facing_values() {
        assert_eq!("8:3".parse::<AspectRatio>(), Ok(AspectRatio::Panorama8x3));
        assert_eq!(" 4:5 ".parse::<AspectRatio>(), Ok(AspectRatio::Portrait4x5));
        assert!("3:4".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("body-wash".parse::<ProductCategory>(), Ok(ProductCategory::BodyWash));
        assert_eq!("Gift Combo".parse::<ProductCategory>(), Ok(ProductCategory::GiftCombo));
        assert!("furniture".parse::<ProductCategory>().is_err());
        assert_eq!(ProductCategory::Snacks.to_string(), "Snacks/Confectionery");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("BANNER".parse::<AppMode>(), Ok(AppMode::Banner));
        assert!("video".parse::<AppMode>().is_err());
    }
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Garment classes produced by the category classifier.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, IntoStaticStr, PartialEq, Eq,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GarmentCategory {
    Top,
    Outer,
    Bottom,
    Dress,
    Accessory,
    Shoes,
    Bag,
}

/// Categories the fitting provider cannot dress a model in.
pub const UNSUPPORTED_CATEGORIES: &[GarmentCategory] = &[
    GarmentCategory::Accessory,
    GarmentCategory::Shoes,
    GarmentCategory::Bag,
];

impl GarmentCategory {
    pub fn is_supported(self) -> bool {
        !UNSUPPORTED_CATEGORIES.contains(&self)
    }

    /// Category name in the fitting provider's vocabulary.
    pub fn provider_category(self) -> Option<&'static str> {
        match self {
            GarmentCategory::Top | GarmentCategory::Outer => Some("tops"),
            GarmentCategory::Bottom => Some("bottoms"),
            GarmentCategory::Dress => Some("one-pieces"),
            _ => None,
        }
    }
}

/// Raw classifier output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryPrediction {
    pub class_idx: i32,
    pub class_name: String,
    pub confidence: f64,
}

impl CategoryPrediction {
    pub fn category(&self) -> Option<GarmentCategory> {
        self.class_name.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_names() {
        assert_eq!("TOP".parse::<GarmentCategory>().unwrap(), GarmentCategory::Top);
        assert_eq!("accessory".parse::<GarmentCategory>().unwrap(), GarmentCategory::Accessory);
        assert!("HAT_AND_SCARF".parse::<GarmentCategory>().is_err());
    }

    #[test]
    fn test_denylist() {
        assert!(GarmentCategory::Top.is_supported());
        assert!(GarmentCategory::Dress.is_supported());
        assert!(!GarmentCategory::Accessory.is_supported());
        assert!(!GarmentCategory::Shoes.is_supported());
        assert!(!GarmentCategory::Bag.is_supported());
    }

    #[test]
    fn test_supported_categories_map_to_provider() {
        for category in [
            GarmentCategory::Top,
            GarmentCategory::Outer,
            GarmentCategory::Bottom,
            GarmentCategory::Dress,
        ] {
            assert!(category.provider_category().is_some(), "{category}");
        }
        assert_eq!(GarmentCategory::Bag.provider_category(), None);
    }

    #[test]
    fn test_prediction_category() {
        let prediction = CategoryPrediction {
            class_idx: 4,
            class_name: " ACCESSORY ".to_string(),
            confidence: 0.91,
        };
        assert_eq!(prediction.category(), Some(GarmentCategory::Accessory));
    }
}

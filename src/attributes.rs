use std::collections::HashMap;
use std::sync::LazyLock;

use dicom::core::Tag;

use crate::frame::Frame;
use crate::window::WindowParameters;

/// A data element decoded once at parse time.
///
/// Only [`Attribute::PixelFrames`] and the window attributes drive rendering;
/// the text variants feed the study labels and the rest is kept for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    PixelFrames(Vec<Frame>),
    PersonName(String),
    ShortText { tag: Tag, value: String },
    WindowCenter(f64),
    WindowWidth(f64),
    Unknown {
        tag: Tag,
        name: Option<&'static str>,
        value: String,
    },
}

/// Patient and study labels shown next to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyLabels {
    pub patient_name: String,
    pub patient_id: String,
    pub study_description: String,
}

impl Default for StudyLabels {
    fn default() -> Self {
        Self {
            patient_name: "anon".to_string(),
            patient_id: "anon".to_string(),
            study_description: "ANON".to_string(),
        }
    }
}

/// Window defaults found in a set of attributes.
///
/// Both center and width must be present; fractional values are rounded.
pub fn window_defaults(attributes: &[Attribute]) -> Option<WindowParameters> {
    let center = attributes.iter().find_map(|attribute| match attribute {
        Attribute::WindowCenter(center) => Some(*center),
        _ => None,
    })?;
    let width = attributes.iter().find_map(|attribute| match attribute {
        Attribute::WindowWidth(width) => Some(*width),
        _ => None,
    })?;
    Some(WindowParameters::new(
        saturating_round(center),
        saturating_round(width),
    ))
}

fn saturating_round(value: f64) -> i32 {
    // `as` saturates on overflow and maps NaN to 0
    value.round() as i32
}

/// DICOS private data elements (group 0x001F).
static DICOS_TAGS: LazyLock<HashMap<(u16, u16), &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ((0x001F, 0x1001), "ThreatDetectionReport"),
        ((0x001F, 0x1002), "ThreatImageProjectionImage"),
        ((0x001F, 0x1003), "ThreatDescription"),
        ((0x001F, 0x1004), "Owner"),
        ((0x001F, 0x1005), "ObjectOfInspection"),
        ((0x001F, 0x1006), "Itinerary"),
        ((0x001F, 0x1007), "AutomatedThreatRecognitionAlgorithm"),
        ((0x001F, 0x1008), "ImageModalityType"),
        ((0x001F, 0x1009), "DICOSVersion"),
    ])
});

/// Look up the name of a DICOS private tag.
pub fn lookup_tag_name(group: u16, element: u16) -> Option<&'static str> {
    DICOS_TAGS.get(&(group, element)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_dicos_tags() {
        assert_eq!(lookup_tag_name(0x001F, 0x1001), Some("ThreatDetectionReport"));
        assert_eq!(lookup_tag_name(0x001F, 0x1009), Some("DICOSVersion"));
        assert_eq!(lookup_tag_name(0x001F, 0x100A), None);
        assert_eq!(lookup_tag_name(0x0010, 0x0010), None);
    }

    #[test]
    fn test_window_defaults_requires_both_values() {
        assert_eq!(window_defaults(&[Attribute::WindowCenter(40.0)]), None);
        assert_eq!(
            window_defaults(&[
                Attribute::PersonName("Doe^John".to_string()),
                Attribute::WindowWidth(399.6),
                Attribute::WindowCenter(-40.5),
            ]),
            Some(WindowParameters::new(-41, 400))
        );
    }

    #[test]
    fn test_default_labels() {
        let labels = StudyLabels::default();
        assert_eq!(labels.patient_name, "anon");
        assert_eq!(labels.study_description, "ANON");
    }
}

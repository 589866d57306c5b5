use crate::palette::Palette;
use crate::{HUB_RADIUS, HUB_RADIUS_MOBILE, MOBILE_BREAKPOINT};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::path::PathBuf;
use strum::{Display as StrumDisplay, EnumString};

/// One wheel slice. Angular placement is positional: slice `i` of `n` covers
/// `[i, i+1] * 2PI/n`, starting at 12 o'clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: String,
}

impl Segment {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CenterImageSize {
    #[strum(serialize = "Small", serialize = "s")]
    Small,
    #[default]
    #[strum(serialize = "Medium", serialize = "m")]
    Medium,
    #[strum(serialize = "Large", serialize = "l")]
    Large,
}

impl CenterImageSize {
    /// Image radius relative to the hub radius.
    pub fn hub_factor(self) -> f64 {
        match self {
            Self::Small => 0.7,
            Self::Medium => 1.0,
            Self::Large => 1.3,
        }
    }
}

/// Everything the host supplies for one frame. The renderer never mutates
/// this; it only derives a [`DeviceProfile`] and a cached decoded image.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub segments: Vec<Segment>,
    pub palette: Palette,
    /// Unbounded; may exceed 360 or go negative during a spin.
    pub rotation_degrees: f64,
    /// Fallback dimensions when the surface reports a zero size.
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub center_image: Option<PathBuf>,
    pub center_image_size: CenterImageSize,
}

impl RenderState {
    pub fn new(segments: Vec<Segment>, palette: Palette, width: f64, height: f64) -> Self {
        Self {
            segments,
            palette,
            rotation_degrees: 0.0,
            viewport_width: width,
            viewport_height: height,
            center_image: None,
            center_image_size: CenterImageSize::default(),
        }
    }
}

/// Read from the environment at each resize, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub device_pixel_ratio: f64,
    pub is_mobile_viewport: bool,
}

impl DeviceProfile {
    pub fn new(device_pixel_ratio: f64, viewport_width: f64) -> Self {
        Self {
            device_pixel_ratio,
            is_mobile_viewport: viewport_width < MOBILE_BREAKPOINT,
        }
    }

    pub fn hub_radius(&self) -> f64 {
        if self.is_mobile_viewport {
            HUB_RADIUS_MOBILE
        } else {
            HUB_RADIUS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_image_size_deserialization() {
        let cases = vec![
            ("\"s\"", CenterImageSize::Small),
            ("\"S\"", CenterImageSize::Small),
            ("\"small\"", CenterImageSize::Small),
            ("\"m\"", CenterImageSize::Medium),
            ("\"MEDIUM\"", CenterImageSize::Medium),
            ("\"l\"", CenterImageSize::Large),
            ("\"Large\"", CenterImageSize::Large),
        ];

        for (json, expected) in cases {
            let deserialized: CenterImageSize = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_hub_factor_per_size() {
        assert_eq!(CenterImageSize::Small.hub_factor(), 0.7);
        assert_eq!(CenterImageSize::Medium.hub_factor(), 1.0);
        assert_eq!(CenterImageSize::Large.hub_factor(), 1.3);
    }

    #[test]
    fn test_mobile_breakpoint() {
        assert!(DeviceProfile::new(1.0, 767.0).is_mobile_viewport);
        assert!(!DeviceProfile::new(1.0, 768.0).is_mobile_viewport);
        assert_eq!(DeviceProfile::new(1.0, 767.0).hub_radius(), 35.0);
        assert_eq!(DeviceProfile::new(1.0, 1024.0).hub_radius(), 70.0);
    }
}

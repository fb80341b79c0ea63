//! Conversion options and form-field normalisation.
//!
//! [`ConversionOptions`] is the typed record the user edits one field at a
//! time. Before a request is sent it is flattened into named form fields;
//! absent or empty values are dropped rather than sent as empty strings.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::OptionsError;

/// JPEG quality used when the user does not pick one.
pub const DEFAULT_QUALITY: u8 = 95;

/// Names of the option fields, as sent in the multipart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum OptionField {
    Quality,
    Resize,
    Width,
    Height,
    MaintainAspectRatio,
    Rotate,
}

/// Clockwise rotation applied by the service. "No rotation" is `None` on
/// [`ConversionOptions::rotate`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[strum(serialize = "90")]
    Deg90,
    #[strum(serialize = "180")]
    Deg180,
    #[strum(serialize = "270")]
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = OptionsError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(OptionsError::invalid(
                OptionField::Rotate,
                other.to_string(),
                "rotation must be one of none, 90, 180, 270",
            )),
        }
    }
}

/// Named quality shortcuts offered alongside the free-form quality value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QualityPreset {
    /// Smaller file size.
    Low,
    /// Balanced.
    Medium,
    /// Better quality.
    High,
    /// Best quality.
    Maximum,
}

impl QualityPreset {
    pub fn quality(self) -> u8 {
        match self {
            QualityPreset::Low => 50,
            QualityPreset::Medium => 75,
            QualityPreset::High => 90,
            QualityPreset::Maximum => 100,
        }
    }
}

/// User-selected conversion parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Whether `width` / `height` should be applied.
    pub resize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Rotation>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            resize: false,
            width: None,
            height: None,
            maintain_aspect_ratio: true,
            rotate: None,
        }
    }
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a single field from its textual form.
    ///
    /// An empty value resets the field to its default. On error the record
    /// is left untouched.
    pub fn set_field(&mut self, field: OptionField, value: &str) -> Result<(), OptionsError> {
        let value = value.trim();
        match field {
            OptionField::Quality => self.quality = parse_quality(value)?,
            OptionField::Resize => self.resize = parse_flag(field, value, false)?,
            OptionField::Width => self.width = parse_dimension(field, value)?,
            OptionField::Height => self.height = parse_dimension(field, value)?,
            OptionField::MaintainAspectRatio => {
                self.maintain_aspect_ratio = parse_flag(field, value, true)?
            }
            OptionField::Rotate => self.rotate = parse_rotation(value)?,
        }
        Ok(())
    }

    /// Like [`set_field`](Self::set_field), addressing the field by its wire name.
    pub fn set_by_name(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        let field = OptionField::from_str(name)
            .map_err(|_| OptionsError::UnknownField(name.to_owned()))?;
        self.set_field(field, value)
    }

    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset.quality();
    }

    /// Check invariants on a record that was built directly rather than
    /// through [`set_field`](Self::set_field).
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(1..=100).contains(&self.quality) {
            return Err(OptionsError::invalid(
                OptionField::Quality,
                self.quality.to_string(),
                "quality must be between 1 and 100",
            ));
        }
        for (field, value) in [(OptionField::Width, self.width), (OptionField::Height, self.height)] {
            if value == Some(0) {
                return Err(OptionsError::invalid(field, "0", "must be a positive integer"));
            }
        }
        Ok(())
    }

    /// The untyped form state: every field, with `None` for values the
    /// service should not receive.
    ///
    /// `resize` is only carried when set; `maintain_aspect_ratio` is always
    /// carried so the service can tell "false" from "unspecified".
    pub fn to_raw(&self) -> BTreeMap<String, Option<String>> {
        OptionField::iter()
            .map(|field| {
                let value = match field {
                    OptionField::Quality => Some(self.quality.to_string()),
                    OptionField::Resize => self.resize.then(|| "true".to_owned()),
                    OptionField::Width => self.width.map(|w| w.to_string()),
                    OptionField::Height => self.height.map(|h| h.to_string()),
                    OptionField::MaintainAspectRatio => {
                        Some(self.maintain_aspect_ratio.to_string())
                    }
                    OptionField::Rotate => self.rotate.map(|r| r.to_string()),
                };
                (field.to_string(), value)
            })
            .collect()
    }

    /// Fields actually sent to the service.
    pub fn to_form_fields(&self) -> BTreeMap<String, String> {
        filter_options(self.to_raw())
    }
}

/// Drop every entry whose value is missing or blank.
pub fn filter_options<I, K, V>(raw: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|(name, value)| {
            let value = value?;
            let value = value.as_ref().trim();
            if value.is_empty() {
                None
            } else {
                Some((name.into(), value.to_owned()))
            }
        })
        .collect()
}

fn parse_quality(value: &str) -> Result<u8, OptionsError> {
    if value.is_empty() {
        return Ok(DEFAULT_QUALITY);
    }
    match value.parse::<i64>() {
        Ok(q) if (1..=100).contains(&q) => Ok(q as u8),
        _ => Err(OptionsError::invalid(
            OptionField::Quality,
            value,
            "quality must be an integer between 1 and 100",
        )),
    }
}

fn parse_flag(field: OptionField, value: &str, default: bool) -> Result<bool, OptionsError> {
    match value.to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(OptionsError::invalid(field, value, "expected true or false")),
    }
}

fn parse_dimension(field: OptionField, value: &str) -> Result<Option<u32>, OptionsError> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(OptionsError::invalid(field, value, "must be a positive integer")),
    }
}

fn parse_rotation(value: &str) -> Result<Option<Rotation>, OptionsError> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Rotation::from_str(value).map(Some).map_err(|_| {
        OptionsError::invalid(
            OptionField::Rotate,
            value,
            "rotation must be one of none, 90, 180, 270",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_seed() {
        let opts = ConversionOptions::default();
        assert_eq!(opts.quality, 95);
        assert!(!opts.resize);
        assert!(opts.maintain_aspect_ratio);
        assert_eq!(opts.width, None);
        assert_eq!(opts.rotate, None);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn field_names_are_snake_case() {
        assert_eq!(OptionField::MaintainAspectRatio.as_ref(), "maintain_aspect_ratio");
        assert_eq!(OptionField::from_str("rotate").unwrap(), OptionField::Rotate);
    }

    #[test]
    fn set_field_replaces_only_that_field() {
        let mut opts = ConversionOptions::default();
        opts.set_field(OptionField::Width, "640").unwrap();
        assert_eq!(opts.width, Some(640));
        assert_eq!(
            opts,
            ConversionOptions {
                width: Some(640),
                ..ConversionOptions::default()
            }
        );
    }

    #[test]
    fn invalid_value_leaves_record_unchanged() {
        let mut opts = ConversionOptions::default();
        opts.set_field(OptionField::Quality, "80").unwrap();
        let before = opts.clone();

        assert!(opts.set_field(OptionField::Quality, "0").is_err());
        assert!(opts.set_field(OptionField::Quality, "101").is_err());
        assert!(opts.set_field(OptionField::Width, "-5").is_err());
        assert!(opts.set_field(OptionField::Height, "0").is_err());
        assert!(opts.set_field(OptionField::Rotate, "45").is_err());
        assert!(opts.set_field(OptionField::Resize, "maybe").is_err());
        assert_eq!(opts, before);
    }

    #[test]
    fn empty_value_resets_to_default() {
        let mut opts = ConversionOptions::default();
        opts.set_field(OptionField::Width, "100").unwrap();
        opts.set_field(OptionField::Quality, "10").unwrap();
        opts.set_field(OptionField::Width, "").unwrap();
        opts.set_field(OptionField::Quality, " ").unwrap();
        assert_eq!(opts.width, None);
        assert_eq!(opts.quality, DEFAULT_QUALITY);
    }

    #[test]
    fn rotation_accepts_none_and_degrees() {
        let mut opts = ConversionOptions::default();
        opts.set_field(OptionField::Rotate, "180").unwrap();
        assert_eq!(opts.rotate, Some(Rotation::Deg180));
        opts.set_field(OptionField::Rotate, "None").unwrap();
        assert_eq!(opts.rotate, None);
        assert_eq!(Rotation::try_from(270).unwrap(), Rotation::Deg270);
        assert!(Rotation::try_from(45).is_err());
    }

    #[test]
    fn unknown_field_name_is_rejected() {
        let mut opts = ConversionOptions::default();
        assert_eq!(
            opts.set_by_name("sharpen", "1"),
            Err(OptionsError::UnknownField("sharpen".into()))
        );
        opts.set_by_name("maintain_aspect_ratio", "false").unwrap();
        assert!(!opts.maintain_aspect_ratio);
    }

    #[test]
    fn presets_map_to_quality() {
        let mut opts = ConversionOptions::default();
        opts.apply_preset(QualityPreset::Low);
        assert_eq!(opts.quality, 50);
        assert_eq!(QualityPreset::from_str("MAXIMUM").unwrap().quality(), 100);
    }

    #[test]
    fn filter_drops_missing_and_blank_values() {
        let raw = vec![
            ("quality", Some("90")),
            ("width", Some("")),
            ("height", None),
            ("rotate", Some("  ")),
            ("resize", Some("true")),
        ];
        let filtered = filter_options(raw);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered["quality"], "90");
        assert_eq!(filtered["resize"], "true");
        assert!(!filtered.contains_key("width"));
    }

    #[test]
    fn default_form_fields_omit_unset_values() {
        let fields = ConversionOptions::default().to_form_fields();
        assert_eq!(fields.get("quality").map(String::as_str), Some("95"));
        assert_eq!(fields.get("maintain_aspect_ratio").map(String::as_str), Some("true"));
        assert!(!fields.contains_key("resize"));
        assert!(!fields.contains_key("width"));
        assert!(!fields.contains_key("height"));
        assert!(!fields.contains_key("rotate"));
    }

    #[test]
    fn full_form_fields_carry_every_value() {
        let opts = ConversionOptions {
            quality: 70,
            resize: true,
            width: Some(800),
            height: Some(600),
            maintain_aspect_ratio: false,
            rotate: Some(Rotation::Deg90),
        };
        let fields = opts.to_form_fields();
        assert_eq!(fields["quality"], "70");
        assert_eq!(fields["resize"], "true");
        assert_eq!(fields["width"], "800");
        assert_eq!(fields["height"], "600");
        assert_eq!(fields["maintain_aspect_ratio"], "false");
        assert_eq!(fields["rotate"], "90");
    }

    #[test]
    fn validate_catches_direct_construction_errors() {
        let opts = ConversionOptions {
            quality: 0,
            ..ConversionOptions::default()
        };
        assert!(opts.validate().is_err());
        let opts = ConversionOptions {
            width: Some(0),
            ..ConversionOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rotation_serializes_as_degrees() {
        let opts = ConversionOptions {
            rotate: Some(Rotation::Deg270),
            ..ConversionOptions::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["rotate"], 270);
        let back: ConversionOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, opts);
    }
}

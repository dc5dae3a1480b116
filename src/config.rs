//! Configuration types for the removal capability

use serde::{Deserialize, Serialize};

/// Which part of the image the removal capability should keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// Keep the foreground subject, background becomes transparent
    Foreground,
    /// Keep the background, subject becomes transparent
    Background,
    /// Emit the raw segmentation mask
    Mask,
}

impl Default for OutputKind {
    fn default() -> Self {
        Self::Foreground
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Foreground => write!(f, "foreground"),
            Self::Background => write!(f, "background"),
            Self::Mask => write!(f, "mask"),
        }
    }
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency, composited output)
    Jpeg,
    /// WebP with alpha channel transparency
    WebP,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl OutputFormat {
    /// MIME type for the encoded output
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

/// Options handed to the removal capability for every item in a batch.
///
/// Defaults match the fixed configuration of the drop-and-process UI:
/// quality 0.8, foreground-only output, PNG encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalOptions {
    /// Encoding quality factor (0.0-1.0)
    pub quality: f32,

    /// Which part of the image to keep
    pub output_kind: OutputKind,

    /// Output encoding format
    pub format: OutputFormat,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            quality: 0.8,
            output_kind: OutputKind::default(),
            format: OutputFormat::default(),
        }
    }
}

impl RemovalOptions {
    /// Create a new options builder for fluent construction
    #[must_use]
    pub fn builder() -> RemovalOptionsBuilder {
        RemovalOptionsBuilder::default()
    }

    /// Validate all option values
    ///
    /// # Errors
    /// - Quality outside the 0.0-1.0 range (NaN included)
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(crate::error::BgDropError::invalid_config(format!(
                "Invalid quality: {} (valid range: 0.0-1.0)",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Builder for [`RemovalOptions`]
#[derive(Debug, Default)]
pub struct RemovalOptionsBuilder {
    options: RemovalOptions,
}

impl RemovalOptionsBuilder {
    /// Set the encoding quality factor
    #[must_use]
    pub fn quality(mut self, quality: f32) -> Self {
        self.options.quality = quality;
        self
    }

    /// Set which part of the image to keep
    #[must_use]
    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.options.output_kind = kind;
        self
    }

    /// Set the output encoding format
    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.format = format;
        self
    }

    /// Build and validate the options
    ///
    /// # Errors
    /// - Quality outside the 0.0-1.0 range
    pub fn build(self) -> crate::Result<RemovalOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_ui_configuration() {
        let options = RemovalOptions::default();
        assert!((options.quality - 0.8).abs() < f32::EPSILON);
        assert_eq!(options.output_kind, OutputKind::Foreground);
        assert_eq!(options.format, OutputFormat::Png);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation_bounds() {
        let options = RemovalOptions::builder()
            .quality(1.0)
            .output_kind(OutputKind::Mask)
            .format(OutputFormat::WebP)
            .build()
            .unwrap();
        assert_eq!(options.output_kind, OutputKind::Mask);
        assert_eq!(options.format, OutputFormat::WebP);

        assert!(RemovalOptions::builder().quality(0.0).build().is_ok());
        assert!(RemovalOptions::builder().quality(1.5).build().is_err());
        assert!(RemovalOptions::builder().quality(-0.1).build().is_err());
        assert!(RemovalOptions::builder().quality(f32::NAN).build().is_err());
    }

    #[test]
    fn test_display_and_mime_types() {
        assert_eq!(OutputKind::Foreground.to_string(), "foreground");
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.to_string(), "image/jpeg");
    }

    #[test]
    fn test_options_serde_round_trip() {
        let options = RemovalOptions::default();
        let json = serde_json::to_string(&options).unwrap();
        let back: RemovalOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}

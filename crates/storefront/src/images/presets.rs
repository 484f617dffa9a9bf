//! Preset transformations for common storefront surfaces.
//!
//! Card, detail, and modal imagery each pin a size and quality so the
//! rendering layer never hand-assembles transformation parameters. Modal
//! and gallery surfaces use `c_fit` - gallery photos must never be
//! cropped.

use super::optimizer::{Crop, Format, ImageOptimizer, Transform};

/// Responsive variants of one asset for gallery display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveSet {
    /// 400x300, for grid thumbnails.
    pub thumbnail: String,
    /// 800x600, for inline display.
    pub medium: String,
    /// 1200x900, for large viewports.
    pub large: String,
    /// The untouched source URL.
    pub original: String,
}

/// Video output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoFormat {
    #[default]
    Webm,
    Mp4,
}

impl VideoFormat {
    const fn param(self) -> &'static str {
        match self {
            Self::Webm => "f_webm",
            Self::Mp4 => "f_mp4",
        }
    }
}

/// Video quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    #[default]
    Auto,
    High,
    Medium,
    Low,
}

impl VideoQuality {
    const fn param(self) -> &'static str {
        match self {
            Self::Auto => "q_auto",
            Self::High => "q_high",
            Self::Medium => "q_medium",
            Self::Low => "q_low",
        }
    }
}

/// A video transformation recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTransform {
    pub format: VideoFormat,
    pub quality: VideoQuality,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoTransform {
    fn default() -> Self {
        Self {
            format: VideoFormat::Webm,
            quality: VideoQuality::Auto,
            width: 1280,
            height: 720,
        }
    }
}

impl VideoTransform {
    fn segment(self) -> String {
        format!(
            "{},{},w_{},h_{},fl_progressive",
            self.format.param(),
            self.quality.param(),
            self.width,
            self.height
        )
    }
}

impl ImageOptimizer {
    /// Product/portfolio card image: 600x400, q85, WebP, cropped to fill.
    #[must_use]
    pub fn card_image(&self, raw: &str) -> String {
        let transform = Transform {
            format: Format::Webp,
            progressive: true,
            crop: Some(Crop::Fill),
            ..Transform::default()
        }
        .quality(85)
        .width(600)
        .height(400);
        self.optimize_url(raw, &transform)
    }

    /// Product detail image: 800x600, q80, WebP, cropped to fill.
    #[must_use]
    pub fn detail_image(&self, raw: &str) -> String {
        let transform = Transform {
            format: Format::Webp,
            progressive: true,
            crop: Some(Crop::Fill),
            ..Transform::default()
        }
        .quality(80)
        .width(800)
        .height(600);
        self.optimize_url(raw, &transform)
    }

    /// Full-screen modal image: 1200x800, q90, WebP, fitted (never
    /// cropped).
    #[must_use]
    pub fn modal_image(&self, raw: &str) -> String {
        let transform = Transform {
            format: Format::Webp,
            progressive: true,
            crop: Some(Crop::Fit),
            ..Transform::default()
        }
        .quality(90)
        .width(1200)
        .height(800);
        self.optimize_url(raw, &transform)
    }

    /// Thumbnail/medium/large variants of one asset, plus the original.
    #[must_use]
    pub fn responsive_set(&self, raw: &str) -> ResponsiveSet {
        let base = Transform {
            format: Format::Webp,
            progressive: true,
            crop: Some(Crop::Fill),
            ..Transform::default()
        }
        .quality(80);
        ResponsiveSet {
            thumbnail: self.optimize_url(raw, &base.width(400).height(300)),
            medium: self.optimize_url(raw, &base.width(800).height(600)),
            large: self.optimize_url(raw, &base.width(1200).height(900)),
            original: raw.to_string(),
        }
    }

    /// Rewrite a video delivery URL, e.g. for the page-header loop.
    ///
    /// Video URLs share the image delivery shape; only the segment
    /// vocabulary differs.
    #[must_use]
    pub fn optimize_video_url(&self, raw: &str, transform: &VideoTransform) -> String {
        self.splice_segment(raw, &transform.segment())
    }
}

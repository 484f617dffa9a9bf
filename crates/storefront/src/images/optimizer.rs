//! CDN image URL optimization.
//!
//! The CDN serves assets from URLs of the shape
//! `https://<host>/<cloud>/image/upload/<transform>/<version>/<asset>`,
//! where `<transform>` is an optional comma-joined list of encoding and
//! resize operations. Rewriting a URL means parsing it into that structure,
//! splicing in the requested transformation segment, and serializing it
//! back - replacing any segment already present, so re-optimizing an
//! already-optimized URL never accumulates parameters.
//!
//! URLs on any other host, and assets on the configured exclusion list,
//! pass through unchanged. That is the canonical fallback, not an error.

use mjengo_core::AssetId;
use url::Url;

use crate::config::CdnConfig;

/// Target widths for responsive product imagery, mobile through
/// desktop-retina.
pub const RESPONSIVE_WIDTHS: [u32; 6] = [320, 480, 640, 800, 1024, 1600];

/// Default `sizes` breakpoints for the product grid: full width on phones,
/// two columns on small tablets, three on large, four on desktop.
const DEFAULT_SIZES: [(u32, &str); 3] = [(640, "100vw"), (768, "50vw"), (1024, "33vw")];
const DEFAULT_SIZES_FALLBACK: &str = "25vw";

// =============================================================================
// Transformation Vocabulary
// =============================================================================

/// Crop behavior when both dimensions are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crop {
    /// Fill the box exactly, cropping overflow.
    #[default]
    Fill,
    /// Fit inside the box without cropping.
    Fit,
    /// Scale to the box, ignoring aspect ratio.
    Scale,
}

impl Crop {
    const fn param(self) -> &'static str {
        match self {
            Self::Fill => "c_fill",
            Self::Fit => "c_fit",
            Self::Scale => "c_scale",
        }
    }
}

/// Output format negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Let the CDN pick the best format the client accepts.
    #[default]
    Auto,
    Avif,
    Webp,
    Jpg,
    Png,
}

impl Format {
    const fn param(self) -> &'static str {
        match self {
            Self::Auto => "f_auto",
            Self::Avif => "f_avif",
            Self::Webp => "f_webp",
            Self::Jpg => "f_jpg",
            Self::Png => "f_png",
        }
    }
}

/// Encoding quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// CDN-chosen quality.
    #[default]
    Auto,
    /// Fixed quality, 1-100.
    Fixed(u8),
}

impl Quality {
    fn param(self) -> String {
        match self {
            Self::Auto => "q_auto".to_string(),
            Self::Fixed(q) => format!("q_{q}"),
        }
    }
}

/// A transformation recipe, serialized to the CDN path segment in a
/// deterministic order: format, quality, delivery flags, crop, dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
    pub format: Format,
    pub quality: Quality,
    /// Progressive (incremental-render) encoding.
    pub progressive: bool,
    /// Strip embedded metadata from the delivered asset.
    pub strip_metadata: bool,
    pub crop: Option<Crop>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Transform {
    /// The product-imagery recipe: auto format and quality, progressive
    /// encoding, metadata stripped.
    #[must_use]
    pub const fn product() -> Self {
        Self {
            format: Format::Auto,
            quality: Quality::Auto,
            progressive: true,
            strip_metadata: true,
            crop: None,
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub const fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub const fn quality(mut self, quality: u8) -> Self {
        self.quality = Quality::Fixed(quality);
        self
    }

    #[must_use]
    pub const fn crop(mut self, crop: Crop) -> Self {
        self.crop = Some(crop);
        self
    }

    #[must_use]
    pub const fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub const fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Serialize to the CDN transformation segment, e.g.
    /// `f_auto,q_auto,w_600`.
    #[must_use]
    pub fn segment(&self) -> String {
        let mut parts = vec![self.format.param().to_string(), self.quality.param()];
        if self.progressive {
            parts.push("fl_progressive".to_string());
        }
        if self.strip_metadata {
            parts.push("fl_force_strip".to_string());
        }
        if let Some(crop) = self.crop {
            parts.push(crop.param().to_string());
        }
        if let Some(width) = self.width {
            parts.push(format!("w_{width}"));
        }
        if let Some(height) = self.height {
            parts.push(format!("h_{height}"));
        }
        parts.join(",")
    }
}

// =============================================================================
// Delivery URL Model
// =============================================================================

/// A parsed CDN delivery URL.
///
/// Parsing splits the path at the `upload` marker into the fixed prefix
/// (cloud name, resource type), an optional existing transformation
/// segment, an optional `v<digits>` version segment, and the asset path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeliveryUrl {
    url: Url,
    /// Path segments up to and including `upload`.
    prefix: Vec<String>,
    version: Option<String>,
    /// Remaining asset path segments; never empty.
    asset: Vec<String>,
}

impl DeliveryUrl {
    /// Parse a raw URL against the expected host and delivery shape.
    /// Returns `None` for foreign hosts or paths without the `upload`
    /// marker.
    fn parse(raw: &str, host: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        if !url
            .host_str()
            .is_some_and(|h| h.eq_ignore_ascii_case(host))
        {
            return None;
        }

        let segments: Vec<String> = url.path_segments()?.map(str::to_string).collect();
        let upload_idx = segments.iter().position(|s| s == "upload")?;
        let prefix = segments.get(..=upload_idx)?.to_vec();
        let mut rest: Vec<String> = segments.get(upload_idx + 1..)?.to_vec();

        // An existing transformation segment is discarded: serialization
        // always splices a fresh one, so rewrites never accumulate.
        if rest.first().is_some_and(|s| is_transform_segment(s)) {
            rest.remove(0);
        }
        let version = if rest.first().is_some_and(|s| is_version_segment(s)) {
            Some(rest.remove(0))
        } else {
            None
        };
        if rest.is_empty() || rest.iter().any(String::is_empty) {
            return None;
        }

        Some(Self {
            url,
            prefix,
            version,
            asset: rest,
        })
    }

    /// The asset identifier: the final path segment without its extension.
    fn asset_id(&self) -> AssetId {
        let last = self.asset.last().map_or("", String::as_str);
        let stem = last.rsplit_once('.').map_or(last, |(stem, _)| stem);
        AssetId::new(stem)
    }

    /// Serialize with `segment` spliced between `upload` and the asset
    /// path, replacing any existing transformation segment.
    fn with_transform(&self, segment: &str) -> String {
        let mut path: Vec<&str> = self.prefix.iter().map(String::as_str).collect();
        path.push(segment);
        if let Some(version) = &self.version {
            path.push(version);
        }
        path.extend(self.asset.iter().map(String::as_str));

        let mut url = self.url.clone();
        url.set_path(&path.join("/"));
        url.to_string()
    }
}

/// Whether a path segment looks like a transformation segment: a
/// comma-joined list of `key_value` operations with short lowercase keys
/// (`w_600`, `f_auto`, `fl_progressive`). Asset filenames with underscores
/// (`IBD2_eepz4h.jpg`) do not qualify.
fn is_transform_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.split(',').all(|op| {
            op.split_once('_').is_some_and(|(key, value)| {
                !key.is_empty()
                    && key.len() <= 3
                    && key.chars().all(|c| c.is_ascii_lowercase())
                    && !value.is_empty()
            })
        })
}

/// Whether a path segment is a delivery version marker (`v1754409797`).
fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment.chars().skip(1).all(|c| c.is_ascii_digit())
}

// =============================================================================
// Optimizer
// =============================================================================

/// Next-gen format variants for `<picture>`-style markup: AVIF and WebP
/// srcsets plus an auto-format fallback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureSources {
    pub avif: String,
    pub webp: String,
    pub fallback: String,
}

/// Rewrites catalog image URLs into CDN-transformed variants.
///
/// All operations are pure string-to-string functions: no network calls,
/// no caching. Foreign-host URLs and excluded assets are returned
/// unchanged by every operation.
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    cdn: CdnConfig,
}

impl ImageOptimizer {
    /// Create an optimizer for the given CDN configuration.
    #[must_use]
    pub const fn new(cdn: CdnConfig) -> Self {
        Self { cdn }
    }

    /// Parse a raw URL if it is rewritable: on our host, in delivery
    /// shape, and not on the exclusion list.
    fn rewritable(&self, raw: &str) -> Option<DeliveryUrl> {
        let parsed = DeliveryUrl::parse(raw, &self.cdn.host)?;
        if self.cdn.excluded_assets.contains(&parsed.asset_id()) {
            return None;
        }
        Some(parsed)
    }

    /// Rewrite a URL with the given transformation. The primary
    /// optimization operation; unrecognized URLs pass through unchanged.
    #[must_use]
    pub fn optimize_url(&self, raw: &str, transform: &Transform) -> String {
        self.splice_segment(raw, &transform.segment())
    }

    /// Splice a pre-serialized transformation segment. The video path
    /// shares the delivery shape with its own parameter vocabulary.
    pub(crate) fn splice_segment(&self, raw: &str, segment: &str) -> String {
        self.rewritable(raw)
            .map_or_else(|| raw.to_string(), |u| u.with_transform(segment))
    }

    /// `(url, width)` pairs over a width ladder, for responsive delivery.
    #[must_use]
    pub fn responsive_pairs(&self, raw: &str, widths: &[u32]) -> Vec<(String, u32)> {
        widths
            .iter()
            .map(|&width| {
                (
                    self.optimize_url(raw, &Transform::product().width(width)),
                    width,
                )
            })
            .collect()
    }

    /// An `srcset` attribute string over the given width ladder.
    #[must_use]
    pub fn srcset(&self, raw: &str, widths: &[u32]) -> String {
        self.responsive_pairs(raw, widths)
            .iter()
            .map(|(url, width)| format!("{url} {width}w"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The product-grid `srcset` over the default width ladder.
    #[must_use]
    pub fn product_srcset(&self, raw: &str) -> String {
        self.srcset(raw, &RESPONSIVE_WIDTHS)
    }

    /// Format variants for progressive format negotiation.
    #[must_use]
    pub fn picture_sources(&self, raw: &str) -> PictureSources {
        let avif = Transform::product().format(Format::Avif);
        let webp = Transform::product().format(Format::Webp);
        PictureSources {
            avif: self.srcset_with(raw, &RESPONSIVE_WIDTHS, avif),
            webp: self.srcset_with(raw, &RESPONSIVE_WIDTHS, webp),
            fallback: self.optimize_url(raw, &Transform::product()),
        }
    }

    fn srcset_with(&self, raw: &str, widths: &[u32], base: Transform) -> String {
        widths
            .iter()
            .map(|&width| format!("{} {width}w", self.optimize_url(raw, &base.width(width))))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A CSS `sizes` attribute string from `(max-width, slot width)`
/// breakpoints plus a default slot width, e.g.
/// `(max-width: 640px) 100vw, (max-width: 768px) 50vw, 33vw`.
#[must_use]
pub fn sizes(breakpoints: &[(u32, &str)], default_width: &str) -> String {
    let mut parts: Vec<String> = breakpoints
        .iter()
        .map(|(max_width, width)| format!("(max-width: {max_width}px) {width}"))
        .collect();
    parts.push(default_width.to_string());
    parts.join(", ")
}

/// The default product-grid `sizes` string.
#[must_use]
pub fn default_sizes() -> String {
    sizes(&DEFAULT_SIZES, DEFAULT_SIZES_FALLBACK)
}

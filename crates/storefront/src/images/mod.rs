//! Image delivery pipeline.
//!
//! Two independent halves:
//!
//! - [`optimizer`] - pure URL rewriting against the CDN's
//!   `<prefix>/upload/<transform>/<asset>` delivery shape: single-URL
//!   optimization, responsive srcsets, sizes strings, and next-gen format
//!   variants for `<picture>`-style markup.
//! - [`preload`] - a bounded-concurrency, fire-and-forget prefetch queue
//!   that warms an in-memory image cache ahead of rendering.

pub mod optimizer;
pub mod preload;
pub mod presets;

pub use optimizer::{
    Crop, Format, ImageOptimizer, PictureSources, Quality, Transform, RESPONSIVE_WIDTHS,
    default_sizes, sizes,
};
pub use preload::{
    FetchError, HttpFetcher, ImageFetcher, LoadedImage, PreloadStats, Preloader, Priority,
};
pub use presets::{ResponsiveSet, VideoFormat, VideoQuality, VideoTransform};

//! MapSketch Render Library
//!
//! Renderer abstraction for drawn features, a software surface used by the
//! native shell and tests, and PNG snapshot capture.

mod renderer;
pub mod capture;
mod software;

pub use capture::{
    CaptureError, CaptureResult, PNG_DATA_URI_PREFIX, RenderedImage, ViewElement, capture_snapshot,
    decode_data_uri, encode_png, to_data_uri,
};
pub use renderer::{FeatureStyle, RenderContext, RenderResult, Renderer, RendererError};
pub use software::SoftwareRenderer;

//! Image helpers.

mod types;

pub use types::ImageFormat;

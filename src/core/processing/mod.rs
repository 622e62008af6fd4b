//! Browse-image rendering: stretch stored index values to 8-bit grayscale and
//! downsize for quick visual QA.
pub mod browse;
pub mod resize;

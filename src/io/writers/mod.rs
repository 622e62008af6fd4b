//! Output writers: `i16` GeoTIFFs, grayscale JPEG browse images, world and
//! projection files, and embedded or sidecar metadata.
pub mod jpeg;
pub mod metadata;
pub mod tiff;
pub mod worldfile;

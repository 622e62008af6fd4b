//! Core building blocks: granule identifiers, masked arrays, the harmonized
//! granule model, index formulas and quantization, processing parameters and
//! browse rendering. These are consumed by the `io` readers and the `api` module.
pub mod granule;
pub mod granule_id;
pub mod indices;
pub mod masked;
pub mod params;
pub mod processing;
pub mod sensing;

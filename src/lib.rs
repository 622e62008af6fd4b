#![doc = r#"
HLS-VI: vegetation, water and burn indices from Harmonized Landsat-Sentinel granules.

This crate turns an HLS surface-reflectance granule (six band GeoTIFFs plus an Fmask
quality raster) into one compressed `i16` GeoTIFF per spectral index, each tagged with
provenance metadata, plus an NDVI grayscale browse image. It powers the `hls-vi` CLI
and can be embedded in your own Rust applications.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Indices
-------
EVI, MSAVI, NBR, NBR2, NDMI, NDVI, NDWI, SAVI and TVI. Values are stored as `i16`
with a fill value of `-19999` and a scale factor of `0.0001` (`0.01` for TVI).

Quick start: one granule
------------------------
```rust,no_run
use std::path::Path;
use hls_vi::{generate_vi_granule, ProcessingParams};

fn main() -> hls_vi::Result<()> {
    let outputs = generate_vi_granule(
        Path::new("/data/HLS.L30.T06WVS.2024120T211159.v2.0"),
        Path::new("/out"),
        None, // the directory name is the granule ID
        &ProcessingParams::default(),
    )?;
    for path in &outputs.indices {
        println!("{}", path.display());
    }
    Ok(())
}
```

Selecting indices and browse size
---------------------------------
```rust,no_run
use std::path::Path;
use hls_vi::{generate_vi_granule, Index, ProcessingParams};

fn main() -> hls_vi::Result<()> {
    let params = ProcessingParams {
        indices: vec![Index::Ndvi, Index::Nbr],
        browse_size: Some(1024),
        ..Default::default()
    };
    generate_vi_granule(
        Path::new("/data/granule"),
        Path::new("/out"),
        Some("HLS.S30.T13RCN.2024128T173909.v2.0"),
        &params,
    )?;
    Ok(())
}
```

Working with arrays
-------------------
```rust,no_run
use std::path::Path;
use hls_vi::{read_granule, Band, Index};

fn main() -> hls_vi::Result<()> {
    let granule = read_granule(Path::new("/data/HLS.L30.T06WVS.2024120T211159.v2.0"), None)?;
    let nir = &granule.data[Band::Nir];
    println!("{} masked NIR pixels", nir.count_masked());

    let ndvi = Index::Ndvi.compute(&granule.data);
    println!("NDVI shape {:?}", ndvi.dim());
    Ok(())
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use hls_vi::{process_directory_to_path, ProcessingParams};

fn main() -> hls_vi::Result<()> {
    let report = process_directory_to_path(
        Path::new("/data/granules"),
        Path::new("/out"),
        &ProcessingParams::default(),
        true, // continue_on_error
    )?;
    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `hls_vi::Result<T>`; match on `hls_vi::Error` to handle
specific cases, e.g. a malformed granule ID or a missing band file.

```rust,no_run
use std::path::Path;
use hls_vi::{generate_vi_granule, Error, HlsError, ProcessingParams};

fn main() {
    let params = ProcessingParams::default();
    match generate_vi_granule(Path::new("/bad/granule"), Path::new("/out"), None, &params) {
        Ok(_) => {}
        Err(Error::Granule(HlsError::GranuleId(e))) => eprintln!("Bad granule ID: {e}"),
        Err(Error::Granule(e)) => eprintln!("Granule error: {e}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level entry points.
- [`types`]: `Band`, `Instrument` and `Index`.
- [`core`]: granule IDs, masked arrays, index formulas and quantization.
- [`io`]: HLS and GDAL readers, GeoTIFF/JPEG/sidecar writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::granule::{BandData, Granule, Tags};
pub use core::granule_id::{GranuleId, GranuleIdError};
pub use core::masked::MaskedArray;
pub use core::params::ProcessingParams;
pub use error::{Error, Result};
pub use types::{Band, Index, Instrument};

// Readers
pub use io::gdal::{GdalError, GdalMetadata, GdalRasterReader};
pub use io::hls::{HlsError, HlsReader};

// Selected writer helpers
pub use io::writers::metadata::{embed_tiff_metadata, index_metadata_fields};

// High-level API re-exports
pub use api::{
    BatchReport, GranuleOutputs, generate_vi_granule, iterate_granule_dirs,
    process_directory_to_path, read_granule, write_granule_index, write_granule_indices,
};

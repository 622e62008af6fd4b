//! End-to-end tests over synthetic single-pixel granules.
//!
//! Each test writes an HLS granule directory (six `i16` band GeoTIFFs with nodata
//! -9999 and a `u8` Fmask) into a temporary directory, runs the reader or the
//! full pipeline, and inspects the results with GDAL and the `tiff` decoder.

use std::fs::File;
use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata};
use hls_vi::{
    Band, Error, HlsError, Index, Instrument, ProcessingParams, generate_vi_granule,
    process_directory_to_path, read_granule,
};

const L30_ID: &str = "HLS.L30.T06WVS.2024120T211159.v2.0";
const S30_ID: &str = "HLS.S30.T01GEL.2024288T213749.v2.0";
const GEOTRANSFORM: [f64; 6] = [500_000.0, 30.0, 0.0, 7_000_000.0, 0.0, -30.0];

/// B, G, R, NIR, SWIR1, SWIR2 digital numbers of a vegetated pixel
const VEGETATION: [i16; 6] = [400, 600, 500, 2500, 1500, 1000];

fn projection() -> String {
    SpatialRef::from_epsg(32606).unwrap().to_wkt().unwrap()
}

fn write_pixel_raster<T: gdal::raster::GdalType + Copy>(
    path: &Path,
    value: T,
    nodata: Option<f64>,
    tags: &[(&str, &str)],
) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut ds = driver.create_with_band_type::<T, _>(path, 1, 1, 1).unwrap();
    ds.set_geo_transform(&GEOTRANSFORM).unwrap();
    ds.set_projection(&projection()).unwrap();
    for (key, val) in tags {
        ds.set_metadata_item(key, val, "").unwrap();
    }
    let mut band = ds.rasterband(1).unwrap();
    if nodata.is_some() {
        band.set_no_data_value(nodata).unwrap();
    }
    let mut buf = Buffer::new((1, 1), vec![value]);
    band.write((0, 0), (1, 1), &mut buf).unwrap();
}

/// Write a single-pixel granule named `id` under `root` and return its directory.
fn create_granule(root: &Path, id: &str, dns: [i16; 6], fmask: u8) -> PathBuf {
    let dir = root.join(id);
    std::fs::create_dir_all(&dir).unwrap();
    let instrument = Instrument::named(id.split('.').nth(1).unwrap()).unwrap();
    let tags = [
        ("SENSING_TIME", "2024-04-29T21:11:59.72Z; 2024-04-29T21:12:23.61Z"),
        ("cloud_coverage", "12"),
        ("MEAN_SUN_ZENITH_ANGLE", "48.3"),
        ("LANDSAT_PRODUCT_ID", "LC09_L1TP_071013_20240429_20240429_02_T1"),
        ("PRODUCT_URI", "S2B_MSIL1C_20241014T213749_N0511_R043_T01GEL_20241014T222007.SAFE"),
    ];

    for ((code, _), dn) in instrument.bands().zip(dns) {
        let path = dir.join(format!("{}.{}.tif", id, code));
        write_pixel_raster(&path, dn, Some(-9999.0), &tags);
    }
    write_pixel_raster(&dir.join(format!("{}.Fmask.tif", id)), fmask, None, &[]);
    dir
}

fn read_pixel_i16(path: &Path) -> i16 {
    let ds = Dataset::open(path).unwrap();
    let band = ds.rasterband(1).unwrap();
    let buf = band.read_as::<i16>((0, 0), (1, 1), (1, 1), None).unwrap();
    buf.data()[0]
}

// ---------------------------------------------------------------------------
// Band masking
// ---------------------------------------------------------------------------

fn assert_band_masking(dns: [i16; 6], fmask: u8, masked: bool) {
    let tmp = tempfile::tempdir().unwrap();
    let dir = create_granule(tmp.path(), S30_ID, dns, fmask);
    let granule = read_granule(&dir, Some(S30_ID)).unwrap();

    for (band, dn) in Band::ALL.into_iter().zip(dns) {
        let data = &granule.data[band];
        assert_eq!(data.is_masked(0, 0), masked, "{band} mask for {dns:?}/{fmask:#010b}");

        let expected = if dn == -9999 {
            -9999.0
        } else {
            dn as f64 / 10_000.0
        };
        let actual = data.data[[0, 0]];
        assert!((actual - expected).abs() < 1e-12, "{band}: {actual} != {expected}");
    }
}

#[test]
fn all_clear_is_valid() {
    assert_band_masking([42; 6], 0b0000_0000, false);
}

#[test]
fn nodata_input_is_masked() {
    assert_band_masking([-9999; 6], 0b0000_0000, true);
}

#[test]
fn negative_reflectance_is_masked() {
    assert_band_masking([-1; 6], 0b0000_0000, true);
}

#[test]
fn one_negative_band_masks_all_bands() {
    assert_band_masking([-1, 42, 42, 42, 42, 42], 0b0000_0000, true);
}

#[test]
fn zero_reflectance_masks_all_bands() {
    assert_band_masking([0, 42, 42, 42, 42, 42], 0b0000_0000, true);
}

#[test]
fn above_full_reflectance_is_kept() {
    assert_band_masking([10_001; 6], 0b0000_0000, false);
}

#[test]
fn cloud_like_fmask_bits_are_masked() {
    for fmask in [0b0000_0010, 0b0000_0100, 0b0000_1000, 0b0000_1110] {
        assert_band_masking([42; 6], fmask, true);
    }
}

#[test]
fn high_aerosol_is_not_masked() {
    assert_band_masking([42; 6], 0b1100_0000, false);
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn writes_every_index_with_tags() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), L30_ID, VEGETATION, 0);
    std::fs::write(dir.join(format!("{}.jpg", L30_ID)), b"browse").unwrap();

    let outputs =
        generate_vi_granule(&dir, output.path(), None, &ProcessingParams::default()).unwrap();
    assert_eq!(outputs.indices.len(), 9);

    let source_projection = Dataset::open(dir.join(format!("{}.B04.tif", L30_ID)))
        .unwrap()
        .projection();
    assert!(!source_projection.is_empty());
    let mut processing_times = Vec::new();

    for index in Index::ALL {
        let path = output
            .path()
            .join(format!("HLS-VI.L30.T06WVS.2024120T211159.v2.0.{}.tif", index));
        assert!(outputs.indices.contains(&path), "missing {index}");

        let ds = Dataset::open(&path).unwrap();
        assert_eq!(ds.geo_transform().unwrap(), GEOTRANSFORM);
        assert_eq!(ds.projection(), source_projection);
        assert_eq!(
            ds.metadata_item("COMPRESSION", "IMAGE_STRUCTURE").as_deref(),
            Some("DEFLATE")
        );
        assert_eq!(
            ds.metadata_item("long_name", "").as_deref(),
            Some(index.long_name())
        );
        assert_eq!(
            ds.metadata_item("_FillValue", "").as_deref(),
            Some("-19999")
        );
        assert_eq!(
            ds.metadata_item("scale_factor", ""),
            Some(index.scale_factor().to_string())
        );
        assert_eq!(ds.metadata_item("SATELLITE", "").as_deref(), Some("L9"));
        assert_eq!(
            ds.metadata_item("MGRS_TILE_ID", "").as_deref(),
            Some("T06WVS")
        );
        assert_eq!(ds.metadata_item("cloud_coverage", "").as_deref(), Some("12"));
        assert_eq!(
            ds.metadata_item("SENSING_TIME", "").as_deref(),
            Some("2024-04-29T21:11:59.72Z; 2024-04-29T21:12:23.61Z")
        );
        let processing_time = ds.metadata_item("HLS_VI_PROCESSING_TIME", "").unwrap();
        chrono::NaiveDateTime::parse_from_str(&processing_time, "%Y-%m-%dT%H:%M:%S%.fZ")
            .unwrap();
        processing_times.push(processing_time);
        // Absent provenance tags are not written
        assert!(ds.metadata_item("ULX", "").is_none());
        // Tags of other instruments are not carried over
        assert!(ds.metadata_item("PRODUCT_URI", "").is_none());

        let band = ds.rasterband(1).unwrap();
        assert_eq!(band.no_data_value(), Some(-19_999.0));
        assert_eq!(band.scale(), Some(index.scale_factor()));
        assert_eq!(band.offset(), Some(0.0));
    }
    // One timestamp per granule run
    processing_times.dedup();
    assert_eq!(processing_times.len(), 1);

    let ndvi = output
        .path()
        .join("HLS-VI.L30.T06WVS.2024120T211159.v2.0.NDVI.tif");
    assert_eq!(read_pixel_i16(&ndvi), 6667);
    let nbr = output
        .path()
        .join("HLS-VI.L30.T06WVS.2024120T211159.v2.0.NBR.tif");
    assert_eq!(read_pixel_i16(&nbr), 4286);
    let tvi = output
        .path()
        .join("HLS-VI.L30.T06WVS.2024120T211159.v2.0.TVI.tif");
    assert_eq!(read_pixel_i16(&tvi), 1240);

    // Browse products
    let browse = outputs.browse.unwrap();
    assert_eq!(
        browse,
        output
            .path()
            .join("HLS-VI.L30.T06WVS.2024120T211159.v2.0.NDVI.jpg")
    );
    assert!(browse.with_extension("jgw").is_file());
    assert!(browse.with_extension("prj").is_file());
    let sidecar: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(browse.with_extension("json")).unwrap())
            .unwrap();
    assert_eq!(sidecar["granule_id"], L30_ID);
    assert_eq!(sidecar["sensing_start"], "2024-04-29T21:11:59.72Z");

    let companion = outputs.companion_browse.unwrap();
    assert_eq!(
        companion,
        output.path().join("HLS-VI.L30.T06WVS.2024120T211159.v2.0.jpg")
    );
    assert_eq!(std::fs::read(companion).unwrap(), b"browse");
}

#[test]
fn masked_pixel_is_fill_in_every_index() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), S30_ID, VEGETATION, 0b0000_0010);

    let outputs =
        generate_vi_granule(&dir, output.path(), None, &ProcessingParams::default()).unwrap();
    for path in &outputs.indices {
        assert_eq!(read_pixel_i16(path), -19_999, "{path:?}");
    }
    // No companion browse image in the input
    assert!(outputs.companion_browse.is_none());
}

#[test]
fn selected_indices_only() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), S30_ID, VEGETATION, 0);

    let params = ProcessingParams {
        indices: vec![Index::Nbr2, Index::Ndmi],
        browse: false,
        ..Default::default()
    };
    let outputs = generate_vi_granule(&dir, output.path(), None, &params).unwrap();
    assert_eq!(outputs.indices.len(), 2);
    assert!(outputs.browse.is_none());

    let mut names: Vec<String> = std::fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "HLS-VI.S30.T01GEL.2024288T213749.v2.0.NBR2.tif",
            "HLS-VI.S30.T01GEL.2024288T213749.v2.0.NDMI.tif",
        ]
    );
}

#[test]
fn tiff_decoder_reads_deflated_i16() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), S30_ID, VEGETATION, 0);
    let params = ProcessingParams {
        indices: vec![Index::Ndvi],
        browse: false,
        ..Default::default()
    };
    let outputs = generate_vi_granule(&dir, output.path(), None, &params).unwrap();

    let mut decoder = tiff::decoder::Decoder::new(File::open(&outputs.indices[0]).unwrap()).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (1, 1));
    // 8: Adobe deflate
    assert_eq!(decoder.get_tag_u32(tiff::tags::Tag::Compression).unwrap(), 8);
    match decoder.read_image().unwrap() {
        tiff::decoder::DecodingResult::I16(values) => assert_eq!(values, vec![6667]),
        other => panic!("unexpected sample type: {:?}", std::mem::discriminant(&other)),
    }
}

#[test]
fn repeated_runs_produce_identical_pixels() {
    let input = tempfile::tempdir().unwrap();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), L30_ID, VEGETATION, 0);
    let params = ProcessingParams::default();

    let a = generate_vi_granule(&dir, first.path(), None, &params).unwrap();
    let b = generate_vi_granule(&dir, second.path(), None, &params).unwrap();
    for (pa, pb) in a.indices.iter().zip(&b.indices) {
        assert_eq!(read_pixel_i16(pa), read_pixel_i16(pb), "{pa:?}");
    }
}

// ---------------------------------------------------------------------------
// Failures and batch mode
// ---------------------------------------------------------------------------

#[test]
fn missing_band_file_is_reported() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), L30_ID, VEGETATION, 0);
    std::fs::remove_file(dir.join(format!("{}.B05.tif", L30_ID))).unwrap();

    let err = generate_vi_granule(&dir, output.path(), None, &ProcessingParams::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Granule(HlsError::MissingFile { ref kind, .. }) if kind == "B05"
    ));
}

#[test]
fn shape_mismatch_is_reported() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let dir = create_granule(input.path(), L30_ID, VEGETATION, 0);

    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let path = dir.join(format!("{}.B04.tif", L30_ID));
    driver.create_with_band_type::<i16, _>(&path, 2, 1, 1).unwrap();

    let err = generate_vi_granule(&dir, output.path(), None, &ProcessingParams::default())
        .unwrap_err();
    assert!(matches!(err, Error::Granule(HlsError::ShapeMismatch { .. })));
}

#[test]
fn malformed_id_is_rejected() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let err = generate_vi_granule(
        input.path(),
        output.path(),
        Some("HLS.X30.T06WVS.2024120T211159.v2.0"),
        &ProcessingParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Granule(HlsError::GranuleId(_))));
}

#[test]
fn batch_writes_one_directory_per_granule() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    create_granule(input.path(), L30_ID, VEGETATION, 0);
    create_granule(input.path(), S30_ID, VEGETATION, 0);
    std::fs::create_dir(input.path().join("scratch")).unwrap();

    let report =
        process_directory_to_path(input.path(), output.path(), &ProcessingParams::default(), true)
            .unwrap();
    assert_eq!((report.processed, report.skipped, report.errors), (2, 1, 0));
    assert!(
        output
            .path()
            .join("HLS-VI.S30.T01GEL.2024288T213749.v2.0")
            .join("HLS-VI.S30.T01GEL.2024288T213749.v2.0.EVI.tif")
            .is_file()
    );
}

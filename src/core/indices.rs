//! Spectral index formulas and their storage conventions.
//!
//! Each [`Index`] maps to one record in a fixed table holding its long name,
//! the pure function that evaluates it over harmonized bands, and the scale
//! factor and fill value used to store it as `i16`.
use ndarray::{Array2, Zip};

use crate::core::granule::BandData;
use crate::core::masked::MaskedArray;
use crate::types::{Band, Index};

pub type IndexFunction = fn(&BandData) -> MaskedArray;

/// Scale factor of the ratio indices (stored value × 0.0001 = index value).
pub const DEFAULT_SCALE_FACTOR: f64 = 0.0001;
/// Scale factor of TVI, whose natural magnitude is far beyond ±1.
pub const TVI_SCALE_FACTOR: f64 = 0.01;
/// Stored value of invalid pixels.
///
/// Bounded indices (the normalized differences, MSAVI) never reach it. EVI and
/// SAVI are unbounded for degenerate reflectances; a valid result that rounds to
/// exactly this value is stored as fill and reads back as invalid.
pub const FILL_VALUE: i16 = -19_999;

pub struct IndexSpec {
    pub index: Index,
    pub long_name: &'static str,
    pub compute: IndexFunction,
    pub scale_factor: f64,
    pub fill_value: i16,
}

// Ordered as `Index::ALL`.
static INDEX_TABLE: [IndexSpec; 9] = [
    IndexSpec {
        index: Index::Evi,
        long_name: "Enhanced Vegetation Index",
        compute: evi,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Msavi,
        long_name: "Modified Soil-Adjusted Vegetation Index",
        compute: msavi,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Nbr,
        long_name: "Normalized Burn Ratio",
        compute: nbr,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Nbr2,
        long_name: "Normalized Burn Ratio 2",
        compute: nbr2,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Ndmi,
        long_name: "Normalized Difference Moisture Index",
        compute: ndmi,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Ndvi,
        long_name: "Normalized Difference Vegetation Index",
        compute: ndvi,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Ndwi,
        long_name: "Normalized Difference Water Index",
        compute: ndwi,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Savi,
        long_name: "Soil-Adjusted Vegetation Index",
        compute: savi,
        scale_factor: DEFAULT_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
    IndexSpec {
        index: Index::Tvi,
        long_name: "Triangular Vegetation Index",
        compute: tvi,
        scale_factor: TVI_SCALE_FACTOR,
        fill_value: FILL_VALUE,
    },
];

impl Index {
    pub fn spec(self) -> &'static IndexSpec {
        &INDEX_TABLE[self as usize]
    }

    pub fn long_name(self) -> &'static str {
        self.spec().long_name
    }

    pub fn scale_factor(self) -> f64 {
        self.spec().scale_factor
    }

    pub fn fill_value(self) -> i16 {
        self.spec().fill_value
    }

    /// Reverse lookup used when reading back an output raster's `long_name` tag.
    pub fn from_long_name(long_name: &str) -> Option<Index> {
        INDEX_TABLE
            .iter()
            .find(|spec| spec.long_name == long_name)
            .map(|spec| spec.index)
    }

    /// Index value at native (fractional) scale.
    pub fn compute_native(self, data: &BandData) -> MaskedArray {
        (self.spec().compute)(data)
    }

    /// Index value scaled, rounded and stored as `i16`, invalid cells filled.
    pub fn compute(self, data: &BandData) -> Array2<i16> {
        let spec = self.spec();
        quantize(&(spec.compute)(data), spec.scale_factor, spec.fill_value)
    }
}

/// Divide by `scale_factor`, round half away from zero and narrow to `i16`.
///
/// Masked cells, non-finite values and values outside the `i16` range become
/// `fill_value`.
pub fn quantize(native: &MaskedArray, scale_factor: f64, fill_value: i16) -> Array2<i16> {
    Zip::from(&native.data)
        .and(&native.mask)
        .par_map_collect(|&v, &masked| {
            if masked {
                return fill_value;
            }
            let scaled = (v / scale_factor).round();
            if !scaled.is_finite() || scaled < i16::MIN as f64 || scaled > i16::MAX as f64 {
                fill_value
            } else {
                scaled as i16
            }
        })
}

fn normalized_difference(a: &MaskedArray, b: &MaskedArray) -> MaskedArray {
    MaskedArray::zip2(a, b, |a, b| (a - b) / (a + b))
}

pub fn evi(data: &BandData) -> MaskedArray {
    MaskedArray::zip3(&data[Band::B], &data[Band::R], &data[Band::Nir], |b, r, nir| {
        2.5 * (nir - r) / (nir + 6.0 * r - 7.5 * b + 1.0)
    })
}

/// The square-root argument goes negative for some band combinations; those
/// cells evaluate to NaN and end up masked.
pub fn msavi(data: &BandData) -> MaskedArray {
    MaskedArray::zip2(&data[Band::R], &data[Band::Nir], |r, nir| {
        let sqrt_term = (2.0 * nir + 1.0).powi(2) - 8.0 * (nir - r);
        if sqrt_term >= 0.0 {
            (2.0 * nir + 1.0 - sqrt_term.sqrt()) / 2.0
        } else {
            f64::NAN
        }
    })
}

pub fn nbr(data: &BandData) -> MaskedArray {
    normalized_difference(&data[Band::Nir], &data[Band::Swir2])
}

pub fn nbr2(data: &BandData) -> MaskedArray {
    normalized_difference(&data[Band::Swir1], &data[Band::Swir2])
}

pub fn ndmi(data: &BandData) -> MaskedArray {
    normalized_difference(&data[Band::Nir], &data[Band::Swir1])
}

pub fn ndvi(data: &BandData) -> MaskedArray {
    normalized_difference(&data[Band::Nir], &data[Band::R])
}

pub fn ndwi(data: &BandData) -> MaskedArray {
    normalized_difference(&data[Band::G], &data[Band::Nir])
}

pub fn savi(data: &BandData) -> MaskedArray {
    MaskedArray::zip2(&data[Band::R], &data[Band::Nir], |r, nir| {
        1.5 * (nir - r) / (nir + r + 0.5)
    })
}

pub fn tvi(data: &BandData) -> MaskedArray {
    MaskedArray::zip3(&data[Band::G], &data[Band::R], &data[Band::Nir], |g, r, nir| {
        (120.0 * (nir - g) - 200.0 * (r - g)) / 2.0
    })
}

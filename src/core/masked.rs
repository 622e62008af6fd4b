//! Masked arrays: a value grid paired with an invalid-flag grid.
//!
//! A `true` flag marks the cell invalid. Arithmetic helpers evaluate the
//! closure everywhere, OR the input flags, and additionally flag any cell whose
//! result is not finite (zero denominators, square roots of negatives).
use ndarray::{Array2, Zip};

#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    pub data: Array2<f64>,
    pub mask: Array2<bool>,
}

impl MaskedArray {
    /// Pair data with a mask. Returns `None` when the shapes differ.
    pub fn new(data: Array2<f64>, mask: Array2<bool>) -> Option<Self> {
        if data.dim() != mask.dim() {
            return None;
        }
        Some(Self { data, mask })
    }

    /// Wrap data with every cell valid.
    pub fn valid(data: Array2<f64>) -> Self {
        let mask = Array2::from_elem(data.dim(), false);
        Self { data, mask }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Flag every cell for which `pred` holds, keeping existing flags.
    pub fn mask_where<F>(&mut self, pred: F)
    where
        F: Fn(f64) -> bool,
    {
        Zip::from(&mut self.mask)
            .and(&self.data)
            .for_each(|m, &v| *m |= pred(v));
    }

    /// OR an external mask into this array's flags.
    pub fn or_mask(&mut self, other: &Array2<bool>) {
        Zip::from(&mut self.mask)
            .and(other)
            .for_each(|m, &o| *m |= o);
    }

    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.mask[[row, col]]
    }

    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Values with invalid cells replaced by `fill`.
    pub fn filled(&self, fill: f64) -> Array2<f64> {
        Zip::from(&self.data)
            .and(&self.mask)
            .map_collect(|&v, &m| if m { fill } else { v })
    }

    pub fn zip2<F>(a: &MaskedArray, b: &MaskedArray, f: F) -> MaskedArray
    where
        F: Fn(f64, f64) -> f64,
    {
        let data = Zip::from(&a.data)
            .and(&b.data)
            .map_collect(|&x, &y| f(x, y));
        let mask = Zip::from(&a.mask)
            .and(&b.mask)
            .and(&data)
            .map_collect(|&ma, &mb, v| ma || mb || !v.is_finite());
        MaskedArray { data, mask }
    }

    pub fn zip3<F>(a: &MaskedArray, b: &MaskedArray, c: &MaskedArray, f: F) -> MaskedArray
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let data = Zip::from(&a.data)
            .and(&b.data)
            .and(&c.data)
            .map_collect(|&x, &y, &z| f(x, y, z));
        let mask = Zip::from(&a.mask)
            .and(&b.mask)
            .and(&c.mask)
            .and(&data)
            .map_collect(|&ma, &mb, &mc, v| ma || mb || mc || !v.is_finite());
        MaskedArray { data, mask }
    }
}

/// Give every array the union of all arrays' invalid flags.
///
/// An index built from two bands is suppressed wherever any band of the granule
/// is invalid.
pub fn union_of_masks(arrays: &mut [MaskedArray]) {
    let Some(first) = arrays.first() else {
        return;
    };
    let mut union = first.mask.clone();
    for array in &arrays[1..] {
        Zip::from(&mut union)
            .and(&array.mask)
            .for_each(|u, &m| *u |= m);
    }
    for array in arrays.iter_mut() {
        array.mask.assign(&union);
    }
}

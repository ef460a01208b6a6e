//! Canonical interning tables
//!
//! Strings, float lists and image blobs referenced by the opcode stream
//! live in indexed tables on the [`VectorImage`](crate::VectorImage). The
//! resolver's canonicalization pre-pass fills these tables with one entry
//! per distinct value; the indices it hands out are the ones serialized.
//!
//! Floats observed during the pre-pass also decide the document's float
//! width: the arrays stay 32-bit unless some value fails a lossless
//! round trip through `f32`.

use crate::image::ImageData;
use crate::io::FloatArray;
use rustc_hash::FxHashMap;

/// Insertion-ordered interner over `String`
#[derive(Debug, Default)]
pub struct StringTable {
  indices: FxHashMap<String, u32>,
  values: Vec<String>,
}

impl StringTable {
  pub fn intern(&mut self, s: &str) -> u32 {
    if let Some(&i) = self.indices.get(s) {
      return i;
    }
    let index = self.values.len() as u32;
    self.values.push(s.to_owned());
    self.indices.insert(s.to_owned(), index);
    index
  }

  pub fn lookup(&self, s: &str) -> Option<u32> {
    self.indices.get(s).copied()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn into_values(self) -> Vec<String> {
    self.values
  }
}

/// Insertion-ordered interner over float lists, keyed by bit pattern
#[derive(Debug, Default)]
pub struct FloatListTable {
  indices: FxHashMap<Vec<u64>, u32>,
  values: Vec<Vec<f64>>,
}

impl FloatListTable {
  fn key(list: &[f64]) -> Vec<u64> {
    list.iter().map(|f| f.to_bits()).collect()
  }

  pub fn intern(&mut self, list: &[f64]) -> u32 {
    let key = Self::key(list);
    if let Some(&i) = self.indices.get(&key) {
      return i;
    }
    let index = self.values.len() as u32;
    self.values.push(list.to_vec());
    self.indices.insert(key, index);
    index
  }

  pub fn lookup(&self, list: &[f64]) -> Option<u32> {
    self.indices.get(&Self::key(list)).copied()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Materializes the table at the document float width
  pub fn into_arrays(self, big: bool) -> Vec<FloatArray> {
    self
      .values
      .into_iter()
      .map(|list| {
        if big {
          FloatArray::F64(list)
        } else {
          FloatArray::F32(list.into_iter().map(|f| f as f32).collect())
        }
      })
      .collect()
  }
}

/// Insertion-ordered interner over image entries
///
/// Keyed on the byte payload plus placement bits, so the same bytes at two
/// placements are two entries.
#[derive(Debug, Default)]
pub struct ImageTable {
  indices: FxHashMap<(Vec<u8>, [u64; 4]), u32>,
  values: Vec<ImageData>,
}

impl ImageTable {
  fn key(image: &ImageData) -> (Vec<u8>, [u64; 4]) {
    (
      image.data.clone(),
      [
        image.x.to_bits(),
        image.y.to_bits(),
        image.width.to_bits(),
        image.height.to_bits(),
      ],
    )
  }

  pub fn intern(&mut self, image: &ImageData) -> u32 {
    let key = Self::key(image);
    if let Some(&i) = self.indices.get(&key) {
      return i;
    }
    let index = self.values.len() as u32;
    self.values.push(image.clone());
    self.indices.insert(key, index);
    index
  }

  pub fn lookup(&self, image: &ImageData) -> Option<u32> {
    self.indices.get(&Self::key(image)).copied()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn into_values(self) -> Vec<ImageData> {
    self.values
  }
}

/// True if `v` survives narrowing to `f32` exactly
pub fn fits_f32(v: f64) -> bool {
  f64::from(v as f32) == v || v.is_nan()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn string_indices_are_insertion_ordered_and_stable() {
    let mut t = StringTable::default();
    assert_eq!(t.intern("serif"), 0);
    assert_eq!(t.intern("hello"), 1);
    assert_eq!(t.intern("serif"), 0);
    assert_eq!(t.into_values(), vec!["serif".to_owned(), "hello".to_owned()]);
  }

  #[test]
  fn float_lists_key_on_bits() {
    let mut t = FloatListTable::default();
    let a = t.intern(&[0.0, 1.0]);
    let b = t.intern(&[-0.0, 1.0]);
    // Negative zero is a distinct bit pattern and must stay distinct.
    assert_ne!(a, b);
    assert_eq!(t.intern(&[0.0, 1.0]), a);
  }

  #[test]
  fn images_dedup_on_bytes_and_placement() {
    let mut t = ImageTable::default();
    let img = ImageData {
      x: 0.0,
      y: 0.0,
      width: 4.0,
      height: 4.0,
      data: vec![1, 2, 3],
    };
    let moved = ImageData { x: 8.0, ..img.clone() };
    assert_eq!(t.intern(&img), 0);
    assert_eq!(t.intern(&moved), 1);
    assert_eq!(t.intern(&img), 0);
  }

  #[test]
  fn f32_fit_detection() {
    assert!(fits_f32(1.5));
    assert!(fits_f32(0.0));
    assert!(!fits_f32(0.1f64 + 0.2f64));
    assert!(!fits_f32(1e300));
  }
}

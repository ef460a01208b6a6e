//! The frozen intermediate representation
//!
//! [`VectorImage`] is the product of a build: one contiguous opcode stream,
//! two float arrays, and the canonical string/float-list/image tables.
//! It is immutable once built and cheap to traverse; the entity counts
//! exist so a traversal can size its back-reference seek tables up front.

use crate::color::{BlendMode, Color32};
use crate::io::FloatArray;

/// An embedded raster image: placement plus undecoded bytes
///
/// The byte payload is whatever encoded form the source document carried
/// (PNG, JPEG, ...); decoding it is the renderer's business.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
  pub data: Vec<u8>,
}

/// A compact, immutable vector image
///
/// Loading one of these is a single buffer read plus two float arrays:
/// no tree, no parsing. Paths, paints and transforms that repeat in the
/// source are stored once and back-referenced by index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorImage {
  /// Viewport width, if the document declared one
  pub width: Option<f64>,
  /// Viewport height, if the document declared one
  pub height: Option<f64>,
  /// True if the float arrays are 64-bit
  pub big_floats: bool,
  /// Post-composite tint, if any
  pub tint_color: Option<Color32>,
  /// Composite mode for the tint
  pub tint_mode: BlendMode,
  /// The opcode stream
  pub children: Vec<u8>,
  /// Float operands interleaved with the opcodes
  pub args: FloatArray,
  /// 6-float affine matrices, indexed by transform number
  pub transforms: FloatArray,
  /// Canonical string table
  pub strings: Vec<String>,
  /// Canonical float-list table (text coordinate lists)
  pub float_lists: Vec<FloatArray>,
  /// Canonical image table
  pub images: Vec<ImageData>,
  /// Count of distinct paths, for sizing traversal seek tables
  pub num_paths: usize,
  /// Count of distinct paints, for sizing traversal seek tables
  pub num_paints: usize,
}

impl VectorImage {
  /// Viewport size as a pair, when both dimensions are declared
  pub fn size(&self) -> Option<(f64, f64)> {
    match (self.width, self.height) {
      (Some(w), Some(h)) => Some((w, h)),
      _ => None,
    }
  }
}

//! The traversal visitor interface
//!
//! A traversal decodes the opcode stream once and narrates it through this
//! trait. Renderers implement the drawing subset; analysis passes (bounds
//! collection, statistics) implement whatever they care about and inherit
//! no-op defaults for the rest.
//!
//! Path geometry is handed out as a [`PathData`] handle rather than a
//! materialized segment list: the visitor decides whether to walk it, and
//! walking a back-referenced path re-reads the bytes it was first encoded
//! at without disturbing the traversal.

use crate::color::{BlendMode, Color32};
use crate::error::DecodeError;
use crate::geometry::{Affine, Rect};
use crate::image::ImageData;
use crate::io::{ByteReader, FloatArray, FloatReader};
use crate::paint::Paint;
use crate::path::{parse_path, PathVisitor};
use crate::text::SpanAttributes;

/// A decodable view of one path's bytes and float operands
///
/// Holds its own cursors over the shared backing buffers, parked at the
/// position the path was serialized at. [`PathData::visit`] may be called
/// any number of times; each call re-decodes from the start.
pub struct PathData<'a> {
  children: ByteReader<'a>,
  args: FloatReader<'a>,
}

impl<'a> PathData<'a> {
  pub(crate) fn new(
    children_buf: &'a [u8],
    args_buf: &'a FloatArray,
    children_pos: usize,
    args_pos: usize,
  ) -> Self {
    let mut children = ByteReader::new(children_buf);
    children.seek(children_pos);
    let mut args = FloatReader::new(args_buf);
    args.seek(args_pos);
    Self { children, args }
  }

  /// Replays the path into `visitor`
  pub fn visit<V: PathVisitor>(&self, visitor: &mut V) -> Result<(), DecodeError> {
    let mut children = self.children.clone();
    let mut args = self.args.clone();
    parse_path(&mut children, &mut args, visitor)
  }

  /// Decodes into an owned segment list
  pub fn to_path(&self) -> Result<crate::path::Path, DecodeError> {
    let mut path = crate::path::Path::new();
    self.visit(&mut path)?;
    Ok(path)
  }
}

/// Receiver of decoded scene events, in stream order
///
/// Every method has a no-op default so implementations only spell out the
/// events they consume. Alpha values are in `[0, 1]`.
#[allow(unused_variables)]
pub trait ImageVisitor {
  /// Canonical tables, before any other event
  fn init(&mut self, images: &[ImageData], strings: &[String], float_lists: &[FloatArray]) {}

  /// Document start: viewport size and tint
  fn vector(
    &mut self,
    width: Option<f64>,
    height: Option<f64>,
    tint_color: Option<Color32>,
    tint_mode: BlendMode,
  ) {
  }

  fn group(&mut self, transform: Option<Affine>, alpha: Option<f64>, blend: BlendMode) {}

  fn end_group(&mut self) {}

  fn path(&mut self, path: &PathData<'_>, paint: &Paint) {}

  fn clip_path(&mut self, path: &PathData<'_>) {}

  fn image(&mut self, image: &ImageData) {}

  /// Text element start: positions, optional family, element paint
  fn text(&mut self, x: &FloatArray, y: &FloatArray, font_family: Option<&str>, paint: &Paint) {}

  /// Fired before the spans of any element carrying more than one
  fn text_multi_span_chunk(&mut self, span_count: usize) {}

  fn text_span(&mut self, text: &str, attrs: SpanAttributes) {}

  fn text_end(&mut self) {}

  /// Mask bracket start; the mask content follows until `masked_child`
  fn masked(&mut self, bounds: Option<Rect>, uses_luma: bool) {}

  fn masked_child(&mut self) {}

  fn end_masked(&mut self) {}

  fn end_vector(&mut self) {}
}

/// A visitor that ignores everything
///
/// Traversing into one of these is a pure validation pass over the stream.
#[derive(Debug, Default)]
pub struct NullVisitor;

impl ImageVisitor for NullVisitor {}

//! IR writer
//!
//! [`ImageBuilder`] accepts the scene event stream and serializes it into
//! a [`VectorImage`], deduplicating paths, paints and transforms along the
//! way. [`CanonicalCollector`] is the dry-run twin: it implements the same
//! [`SceneSink`] event interface but only interns the canonicalizable
//! values (strings, float lists, image blobs) and watches the floats to
//! decide the document's float width. A build is therefore two walks over
//! the same emission code: collect, then write.
//!
//! Calling events out of order (anything before `vector`, anything after
//! `end_vector`, unbalanced brackets) is a programming error and panics.

use crate::color::{BlendMode, Color32, EncodeSinks, GradientKind, VectorColor};
use crate::geometry::{Affine, Rect};
use crate::image::{ImageData, VectorImage};
use crate::intern::{fits_f32, FloatListTable, ImageTable, StringTable};
use crate::io::{ByteWriter, FloatArray, FloatSink};
use crate::opcode::{
  CLIP_HAS_PATH_NUMBER, CLIP_PATH_BASE, END_GROUP_CODE, END_MASKED_CODE,
  FILL_TYPE_SHIFT, GROUP_BASE, GROUP_HAS_EXTRAS, GROUP_HAS_TRANSFORM,
  GROUP_HAS_TRANSFORM_NUMBER, IMAGE_CODE, MASKED_BASE, MASKED_CHILD_CODE, MASKED_HAS_BOUNDS,
  MASKED_USES_LUMA, PATH_BASE, PATH_HAS_PAINT_NUMBER, PATH_HAS_PATH_NUMBER, STROKE_TYPE_SHIFT,
  TEXT_BASE, TEXT_HAS_FONT_FAMILY, TEXT_HAS_PAINT_NUMBER,
};
use crate::paint::{write_paint, Paint};
use crate::path::{write_path, Path};
use crate::text::SpanAttributes;
use rustc_hash::FxHashMap;

/// The scene event interface shared by the writer and the canonical
/// collector
///
/// Values are passed by reference in their in-memory form; each sink
/// resolves them against its own tables. Event order follows document
/// order with explicit end events for the group, text and mask brackets.
pub trait SceneSink {
  fn vector(
    &mut self,
    width: Option<f64>,
    height: Option<f64>,
    tint_color: Option<Color32>,
    tint_mode: BlendMode,
  );
  fn group(&mut self, transform: Option<Affine>, alpha: Option<f64>, blend: BlendMode);
  fn end_group(&mut self);
  fn path(&mut self, path: &Path, paint: &Paint);
  fn clip_path(&mut self, path: &Path);
  fn image(&mut self, image: &ImageData);
  fn text(&mut self, x: &[f64], y: &[f64], font_family: Option<&str>, paint: &Paint);
  fn text_span(&mut self, text: &str, attrs: SpanAttributes);
  fn text_end(&mut self);
  fn masked(&mut self, bounds: Option<Rect>, uses_luma: bool);
  fn masked_child(&mut self);
  fn end_masked(&mut self);
  fn end_vector(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
  Start,
  Open,
  Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
  Group,
  MaskContent,
  MaskChild,
}

type PathKey = (Vec<u8>, Vec<u64>);

fn path_key(path: &Path) -> PathKey {
  let mut bytes = ByteWriter::new();
  let mut args = FloatSink::new(true);
  write_path(path, &mut bytes, &mut args);
  let floats = match args.into_array() {
    FloatArray::F64(v) => v,
    FloatArray::F32(_) => unreachable!("key sink is always wide"),
  };
  (
    bytes.into_bytes(),
    floats.into_iter().map(f64::to_bits).collect(),
  )
}

struct PendingText {
  x_index: u32,
  y_index: u32,
  font_family: Option<u32>,
  paint: Paint,
  spans: Vec<(u32, SpanAttributes)>,
}

/// Serializes scene events into a [`VectorImage`]
pub struct ImageBuilder {
  state: BuildState,
  brackets: Vec<Bracket>,
  children: ByteWriter,
  args: FloatSink,
  transforms: FloatSink,
  transform_numbers: FxHashMap<[u64; 6], u32>,
  path_numbers: FxHashMap<PathKey, u32>,
  paint_numbers: FxHashMap<Vec<u64>, u32>,
  strings: StringTable,
  float_lists: FloatListTable,
  images: ImageTable,
  big_floats: bool,
  width: Option<f64>,
  height: Option<f64>,
  tint_color: Option<Color32>,
  tint_mode: BlendMode,
  pending_text: Option<PendingText>,
}

impl ImageBuilder {
  /// Creates a writer emitting floats at the given width
  pub fn new(big_floats: bool) -> Self {
    Self {
      state: BuildState::Start,
      brackets: Vec::new(),
      children: ByteWriter::new(),
      args: FloatSink::new(big_floats),
      transforms: FloatSink::new(big_floats),
      transform_numbers: FxHashMap::default(),
      path_numbers: FxHashMap::default(),
      paint_numbers: FxHashMap::default(),
      strings: StringTable::default(),
      float_lists: FloatListTable::default(),
      images: ImageTable::default(),
      big_floats,
      width: None,
      height: None,
      tint_color: None,
      tint_mode: BlendMode::SrcIn,
      pending_text: None,
    }
  }

  /// Installs the canonical tables a collector pass produced
  ///
  /// Must run before `vector`. Every string, float list and image a later
  /// event references has to be present in these tables.
  pub fn init(&mut self, images: ImageTable, strings: StringTable, float_lists: FloatListTable) {
    assert!(
      self.state == BuildState::Start,
      "init must precede vector"
    );
    self.images = images;
    self.strings = strings;
    self.float_lists = float_lists;
  }

  /// Consumes the builder after `end_vector`, yielding the frozen IR
  pub fn finish(self) -> VectorImage {
    assert!(
      self.state == BuildState::Done,
      "finish requires end_vector"
    );
    let big = self.big_floats;
    VectorImage {
      width: self.width,
      height: self.height,
      big_floats: big,
      tint_color: self.tint_color,
      tint_mode: self.tint_mode,
      children: self.children.into_bytes(),
      args: self.args.into_array(),
      transforms: self.transforms.into_array(),
      strings: self.strings.into_values(),
      float_lists: self.float_lists.into_arrays(big),
      images: self.images.into_values(),
      num_paths: self.path_numbers.len(),
      num_paints: self.paint_numbers.len(),
    }
  }

  fn require_open(&self, event: &str) {
    assert!(
      self.state == BuildState::Open,
      "{event} outside vector/end_vector"
    );
  }

  fn sinks(&mut self) -> EncodeSinks<'_> {
    EncodeSinks {
      children: &mut self.children,
      args: &mut self.args,
      transforms: &mut self.transforms,
      transform_numbers: &mut self.transform_numbers,
    }
  }

  /// Writes a paint back-reference or inline body, registering fresh
  /// paints under the next sequential paint number
  fn write_paint_part(&mut self, paint: &Paint, key: Vec<u64>, hit: Option<u32>) {
    match hit {
      Some(n) => self.children.write_smallish(n),
      None => {
        write_paint(paint, &mut self.sinks());
        let number = self.paint_numbers.len() as u32;
        self.paint_numbers.insert(key, number);
      }
    }
  }

  fn write_path_part(&mut self, path: &Path, key: PathKey, hit: Option<u32>) {
    match hit {
      Some(n) => self.children.write_smallish(n),
      None => {
        write_path(path, &mut self.children, &mut self.args);
        let number = self.path_numbers.len() as u32;
        self.path_numbers.insert(key, number);
      }
    }
  }

  fn color_type_flags(paint: &Paint) -> u8 {
    ((paint.fill.type_code() as u8) << FILL_TYPE_SHIFT)
      | ((paint.stroke.type_code() as u8) << STROKE_TYPE_SHIFT)
  }
}

impl SceneSink for ImageBuilder {
  fn vector(
    &mut self,
    width: Option<f64>,
    height: Option<f64>,
    tint_color: Option<Color32>,
    tint_mode: BlendMode,
  ) {
    assert!(
      self.state == BuildState::Start,
      "vector must be the first event"
    );
    self.state = BuildState::Open;
    self.width = width;
    self.height = height;
    self.tint_color = tint_color;
    self.tint_mode = tint_mode;
  }

  fn group(&mut self, transform: Option<Affine>, alpha: Option<f64>, blend: BlendMode) {
    self.require_open("group");
    let number = transform
      .as_ref()
      .and_then(|t| self.sinks().transform_number(t));
    let mut flags = 0u8;
    if transform.is_some() {
      flags |= if number.is_some() {
        GROUP_HAS_TRANSFORM_NUMBER
      } else {
        GROUP_HAS_TRANSFORM
      };
    }
    let has_extras = alpha.is_some() || blend != BlendMode::Normal;
    if has_extras {
      flags |= GROUP_HAS_EXTRAS;
    }
    self.children.write_u8(GROUP_BASE | flags);
    match (transform, number) {
      (Some(_), Some(n)) => self.children.write_smallish(n),
      (Some(t), None) => self.sinks().push_inline_transform(&t),
      (None, _) => {}
    }
    if has_extras {
      let alpha_byte = (alpha.unwrap_or(1.0).clamp(0.0, 1.0) * 255.0).round() as u8;
      self.children.write_u8(alpha_byte);
      self.children.write_u8(blend.to_u8());
    }
    self.brackets.push(Bracket::Group);
  }

  fn end_group(&mut self) {
    self.require_open("end_group");
    assert!(
      self.brackets.pop() == Some(Bracket::Group),
      "end_group without matching group"
    );
    self.children.write_u8(END_GROUP_CODE);
  }

  fn path(&mut self, path: &Path, paint: &Paint) {
    self.require_open("path");
    let pkey = path_key(path);
    let path_hit = self.path_numbers.get(&pkey).copied();
    let paint_key = paint.key();
    let paint_hit = self.paint_numbers.get(&paint_key).copied();

    let mut flags = Self::color_type_flags(paint);
    if path_hit.is_some() {
      flags |= PATH_HAS_PATH_NUMBER;
    }
    if paint_hit.is_some() {
      flags |= PATH_HAS_PAINT_NUMBER;
    }
    self.children.write_u8(PATH_BASE | flags);
    self.write_paint_part(paint, paint_key, paint_hit);
    self.write_path_part(path, pkey, path_hit);
  }

  fn clip_path(&mut self, path: &Path) {
    self.require_open("clip_path");
    let pkey = path_key(path);
    let hit = self.path_numbers.get(&pkey).copied();
    let mut flags = 0u8;
    if hit.is_some() {
      flags |= CLIP_HAS_PATH_NUMBER;
    }
    self.children.write_u8(CLIP_PATH_BASE | flags);
    self.write_path_part(path, pkey, hit);
  }

  fn image(&mut self, image: &ImageData) {
    self.require_open("image");
    let index = self
      .images
      .lookup(image)
      .expect("image not present in canonical tables");
    self.children.write_u8(IMAGE_CODE);
    self.children.write_smallish(index);
  }

  fn text(&mut self, x: &[f64], y: &[f64], font_family: Option<&str>, paint: &Paint) {
    self.require_open("text");
    assert!(self.pending_text.is_none(), "text inside text");
    let x_index = self
      .float_lists
      .lookup(x)
      .expect("x list not present in canonical tables");
    let y_index = self
      .float_lists
      .lookup(y)
      .expect("y list not present in canonical tables");
    let font_family = font_family.map(|f| {
      self
        .strings
        .lookup(f)
        .expect("font family not present in canonical tables")
    });
    self.pending_text = Some(PendingText {
      x_index,
      y_index,
      font_family,
      paint: paint.clone(),
      spans: Vec::new(),
    });
  }

  fn text_span(&mut self, text: &str, attrs: SpanAttributes) {
    self.require_open("text_span");
    let index = self
      .strings
      .lookup(text)
      .expect("span text not present in canonical tables");
    self
      .pending_text
      .as_mut()
      .expect("text_span outside text")
      .spans
      .push((index, attrs));
  }

  fn text_end(&mut self) {
    self.require_open("text_end");
    let pending = self.pending_text.take().expect("text_end outside text");
    let paint_key = pending.paint.key();
    let paint_hit = self.paint_numbers.get(&paint_key).copied();

    let mut flags = Self::color_type_flags(&pending.paint);
    if paint_hit.is_some() {
      flags |= TEXT_HAS_PAINT_NUMBER;
    }
    if pending.font_family.is_some() {
      flags |= TEXT_HAS_FONT_FAMILY;
    }
    self.children.write_u8(TEXT_BASE | flags);
    self.children.write_smallish(pending.x_index);
    self.children.write_smallish(pending.y_index);
    if let Some(f) = pending.font_family {
      self.children.write_smallish(f);
    }
    self.write_paint_part(&pending.paint, paint_key, paint_hit);
    self.children.write_smallish(pending.spans.len() as u32);
    for (string_index, attrs) in pending.spans {
      self.children.write_smallish(string_index);
      self.args.push(attrs.font_size);
      for b in attrs.to_bytes() {
        self.children.write_u8(b);
      }
    }
  }

  fn masked(&mut self, bounds: Option<Rect>, uses_luma: bool) {
    self.require_open("masked");
    let mut flags = 0u8;
    if bounds.is_some() {
      flags |= MASKED_HAS_BOUNDS;
    }
    if uses_luma {
      flags |= MASKED_USES_LUMA;
    }
    self.children.write_u8(MASKED_BASE | flags);
    if let Some(b) = bounds {
      self.args.push(b.x);
      self.args.push(b.y);
      self.args.push(b.width);
      self.args.push(b.height);
    }
    self.brackets.push(Bracket::MaskContent);
  }

  fn masked_child(&mut self) {
    self.require_open("masked_child");
    let top = self.brackets.last_mut().expect("masked_child outside masked");
    assert!(
      *top == Bracket::MaskContent,
      "masked_child without open mask content"
    );
    *top = Bracket::MaskChild;
    self.children.write_u8(MASKED_CHILD_CODE);
  }

  fn end_masked(&mut self) {
    self.require_open("end_masked");
    assert!(
      self.brackets.pop() == Some(Bracket::MaskChild),
      "end_masked without masked_child"
    );
    self.children.write_u8(END_MASKED_CODE);
  }

  fn end_vector(&mut self) {
    self.require_open("end_vector");
    assert!(self.brackets.is_empty(), "end_vector with open brackets");
    assert!(self.pending_text.is_none(), "end_vector inside text");
    self.state = BuildState::Done;
  }
}

// ============================================================================
// Canonicalization pass
// ============================================================================

/// The dry-run sink: interns canonicalizable values and watches floats
///
/// Run the emission over one of these first; the tables it accumulates
/// (and its float-width verdict) seed the real [`ImageBuilder`] for the
/// second, writing pass.
#[derive(Default)]
pub struct CanonicalCollector {
  strings: StringTable,
  float_lists: FloatListTable,
  images: ImageTable,
  needs_big: bool,
}

impl CanonicalCollector {
  pub fn new() -> Self {
    Self::default()
  }

  /// True if some observed float cannot survive narrowing to `f32`
  pub fn big_floats(&self) -> bool {
    self.needs_big
  }

  /// Hands the accumulated tables to a writer
  pub fn into_tables(self) -> (ImageTable, StringTable, FloatListTable) {
    (self.images, self.strings, self.float_lists)
  }

  fn observe(&mut self, v: f64) {
    if !fits_f32(v) {
      self.needs_big = true;
    }
  }

  fn observe_all(&mut self, values: &[f64]) {
    for &v in values {
      self.observe(v);
    }
  }

  fn observe_transform(&mut self, t: &Affine) {
    self.observe_all(&t.components());
  }

  fn observe_color(&mut self, color: &VectorColor) {
    if let VectorColor::Gradient(g) = color {
      if let Some(t) = &g.transform {
        self.observe_transform(t);
      }
      for stop in &g.stops {
        self.observe(stop.offset);
        self.observe_color(&stop.color);
      }
      match g.kind {
        GradientKind::Linear { x1, y1, x2, y2 } => self.observe_all(&[x1, y1, x2, y2]),
        GradientKind::Radial { cx, cy, fx, fy, r } => self.observe_all(&[cx, cy, fx, fy, r]),
        GradientKind::Sweep {
          cx,
          cy,
          start_angle,
          end_angle,
        } => self.observe_all(&[cx, cy, start_angle, end_angle]),
      }
    }
  }

  fn observe_paint(&mut self, paint: &Paint) {
    self.observe_color(&paint.fill);
    self.observe_color(&paint.stroke);
    if let Some(w) = paint.stroke_width {
      self.observe(w);
    }
    if let Some(m) = paint.stroke_miter_limit {
      self.observe(m);
    }
    if let Some(dashes) = &paint.dash_array {
      self.observe_all(dashes);
    }
    if let Some(o) = paint.dash_offset {
      self.observe(o);
    }
  }

  fn observe_path(&mut self, path: &Path) {
    use crate::path::PathSegment::*;
    for seg in &path.segments {
      match *seg {
        MoveTo(p) | LineTo(p) | QuadToShorthand(p) => self.observe_all(&[p.x, p.y]),
        CubicTo(a, b, c) => self.observe_all(&[a.x, a.y, b.x, b.y, c.x, c.y]),
        CubicToShorthand(a, b) | QuadTo(a, b) => self.observe_all(&[a.x, a.y, b.x, b.y]),
        Close => {}
        Oval(r) => self.observe_all(&[r.x, r.y, r.width, r.height]),
        ArcToPoint {
          end,
          rx,
          ry,
          rotation,
          ..
        } => self.observe_all(&[end.x, end.y, rx, ry, rotation]),
      }
    }
  }
}

impl SceneSink for CanonicalCollector {
  fn vector(
    &mut self,
    width: Option<f64>,
    height: Option<f64>,
    _tint_color: Option<Color32>,
    _tint_mode: BlendMode,
  ) {
    if let Some(w) = width {
      self.observe(w);
    }
    if let Some(h) = height {
      self.observe(h);
    }
  }

  fn group(&mut self, transform: Option<Affine>, _alpha: Option<f64>, _blend: BlendMode) {
    if let Some(t) = transform {
      self.observe_transform(&t);
    }
  }

  fn end_group(&mut self) {}

  fn path(&mut self, path: &Path, paint: &Paint) {
    self.observe_path(path);
    self.observe_paint(paint);
  }

  fn clip_path(&mut self, path: &Path) {
    self.observe_path(path);
  }

  fn image(&mut self, image: &ImageData) {
    self.observe_all(&[image.x, image.y, image.width, image.height]);
    self.images.intern(image);
  }

  fn text(&mut self, x: &[f64], y: &[f64], font_family: Option<&str>, paint: &Paint) {
    self.observe_all(x);
    self.observe_all(y);
    self.float_lists.intern(x);
    self.float_lists.intern(y);
    if let Some(f) = font_family {
      self.strings.intern(f);
    }
    self.observe_paint(paint);
  }

  fn text_span(&mut self, text: &str, attrs: SpanAttributes) {
    self.strings.intern(text);
    self.observe(attrs.font_size);
  }

  fn text_end(&mut self) {}

  fn masked(&mut self, bounds: Option<Rect>, _uses_luma: bool) {
    if let Some(b) = bounds {
      self.observe_all(&[b.x, b.y, b.width, b.height]);
    }
  }

  fn masked_child(&mut self) {}

  fn end_masked(&mut self) {}

  fn end_vector(&mut self) {}
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Point;
  use crate::path::PathVisitor;

  fn rect_path() -> Path {
    Path::parse("M0,0 L10,0 L10,10 L0,10 Z").unwrap()
  }

  #[test]
  fn empty_document_produces_empty_streams() {
    let mut b = ImageBuilder::new(false);
    b.vector(Some(100.0), Some(50.0), None, BlendMode::SrcIn);
    b.end_vector();
    let image = b.finish();
    assert_eq!(image.width, Some(100.0));
    assert_eq!(image.height, Some(50.0));
    assert!(image.children.is_empty());
    assert_eq!(image.args.len(), 0);
    assert_eq!(image.transforms.len(), 0);
    assert_eq!(image.num_paths, 0);
    assert_eq!(image.num_paints, 0);
  }

  #[test]
  fn red_rectangle_emits_expected_bytes() {
    let paint = Paint {
      fill: VectorColor::Argb(crate::color::Color32(0xffff0000)),
      ..Paint::default()
    };
    let mut b = ImageBuilder::new(false);
    b.vector(None, None, None, BlendMode::SrcIn);
    b.path(&rect_path(), &paint);
    b.end_vector();
    let image = b.finish();
    // Opcode: fresh path + fresh paint, fill argb (0), stroke none (1).
    assert_eq!(image.children[0], 0b01_00_00);
    // Paint header, argb word, then the three packed path bytes.
    assert_eq!(image.children[1], 0x00);
    assert_eq!(&image.children[2..6], &0xffff0000u32.to_le_bytes());
    assert_eq!(&image.children[6..], &[0x12, 0x22, 0x70]);
    assert_eq!(image.num_paths, 1);
    assert_eq!(image.num_paints, 1);
  }

  #[test]
  fn repeated_path_and_paint_reuse_indices() {
    let paint = Paint::default();
    let mut b = ImageBuilder::new(false);
    b.vector(None, None, None, BlendMode::SrcIn);
    b.path(&rect_path(), &paint);
    let before = b.children.len();
    b.path(&rect_path(), &paint);
    let delta = b.children.len() - before;
    b.end_vector();
    let image = b.finish();
    // Second emit: opcode + paint number 0 + path number 0.
    assert_eq!(delta, 3);
    assert_eq!(&image.children[before..], &[0b01_00_11, 0x00, 0x00]);
    assert_eq!(image.num_paths, 1);
    assert_eq!(image.num_paints, 1);
  }

  #[test]
  fn repeated_group_transform_becomes_a_number() {
    let t = Affine::translate(3.0, 4.0);
    let mut b = ImageBuilder::new(false);
    b.vector(None, None, None, BlendMode::SrcIn);
    b.group(Some(t), None, BlendMode::Normal);
    b.end_group();
    b.group(Some(t), None, BlendMode::Normal);
    b.end_group();
    b.end_vector();
    let image = b.finish();
    assert_eq!(image.transforms.len(), 6);
    assert_eq!(
      image.children,
      vec![
        GROUP_BASE | GROUP_HAS_TRANSFORM,
        END_GROUP_CODE,
        GROUP_BASE | GROUP_HAS_TRANSFORM_NUMBER,
        0x00,
        END_GROUP_CODE,
      ]
    );
  }

  #[test]
  fn group_alpha_and_blend_pack_into_extras() {
    let mut b = ImageBuilder::new(false);
    b.vector(None, None, None, BlendMode::SrcIn);
    b.group(None, Some(0.5), BlendMode::Multiply);
    b.end_group();
    b.end_vector();
    let image = b.finish();
    assert_eq!(image.children[0], GROUP_BASE | GROUP_HAS_EXTRAS);
    assert_eq!(image.children[1], 128);
    assert_eq!(image.children[2], BlendMode::Multiply.to_u8());
  }

  #[test]
  fn collector_decides_float_width() {
    let mut c = CanonicalCollector::new();
    c.vector(Some(100.0), None, None, BlendMode::SrcIn);
    assert!(!c.big_floats());
    let mut path = Path::new();
    path.move_to(Point::new(0.1f64 + 0.2f64, 0.0));
    c.path(&path, &Paint::default());
    assert!(c.big_floats());
  }

  #[test]
  fn collector_feeds_builder_tables() {
    let mut c = CanonicalCollector::new();
    c.vector(None, None, None, BlendMode::SrcIn);
    c.text(&[0.0], &[0.0], Some("serif"), &Paint::default());
    c.text_span("hi", SpanAttributes::default());
    c.text_end();
    c.end_vector();
    let big = c.big_floats();
    let (images, strings, float_lists) = c.into_tables();

    let mut b = ImageBuilder::new(big);
    b.init(images, strings, float_lists);
    b.vector(None, None, None, BlendMode::SrcIn);
    b.text(&[0.0], &[0.0], Some("serif"), &Paint::default());
    b.text_span("hi", SpanAttributes::default());
    b.text_end();
    b.end_vector();
    let image = b.finish();
    assert_eq!(image.strings, vec!["serif".to_owned(), "hi".to_owned()]);
    assert_eq!(image.float_lists.len(), 1);
    assert_eq!(image.num_paints, 1);
  }

  #[test]
  #[should_panic(expected = "path outside vector")]
  fn path_before_vector_panics() {
    let mut b = ImageBuilder::new(false);
    b.path(&rect_path(), &Paint::default());
  }

  #[test]
  #[should_panic(expected = "end_group without matching group")]
  fn unbalanced_end_group_panics() {
    let mut b = ImageBuilder::new(false);
    b.vector(None, None, None, BlendMode::SrcIn);
    b.end_group();
  }
}

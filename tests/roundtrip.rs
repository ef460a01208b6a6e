//! Writer → envelope → traverser round-trip scenarios
//!
//! These drive the public builder API, serialize through the file
//! envelope, and check that traversal reproduces exactly the events and
//! values that were written.

use fastvector::{
  traverse, Affine, BlendMode, CanonicalCollector, Color32, DecodeError, Gradient, GradientKind,
  GradientStop, ImageBuilder, ImageData, ImageVisitor, NullVisitor, Paint, Path, PathData, Rect,
  SceneSink, SpanAttributes, SpreadMethod, VectorColor, VectorImage,
};
use smallvec::smallvec;

// ============================================================================
// Recording visitor
// ============================================================================

/// Records every event compactly for sequence assertions
#[derive(Default)]
struct EventLog {
  events: Vec<String>,
  paths: Vec<Path>,
  paints: Vec<Paint>,
  depth: i32,
  max_depth: i32,
}

impl ImageVisitor for EventLog {
  fn vector(
    &mut self,
    width: Option<f64>,
    height: Option<f64>,
    tint_color: Option<Color32>,
    _tint_mode: BlendMode,
  ) {
    self.events.push(format!(
      "vector({:?},{:?},tint={})",
      width,
      height,
      tint_color.is_some()
    ));
  }

  fn group(&mut self, transform: Option<Affine>, alpha: Option<f64>, _blend: BlendMode) {
    self.depth += 1;
    self.max_depth = self.max_depth.max(self.depth);
    self.events.push(format!(
      "group(t={},a={})",
      transform.is_some(),
      alpha.is_some()
    ));
  }

  fn end_group(&mut self) {
    self.depth -= 1;
    assert!(self.depth >= 0, "group depth went negative");
    self.events.push("end_group".into());
  }

  fn path(&mut self, path: &PathData<'_>, paint: &Paint) {
    self.paths.push(path.to_path().expect("decodable path"));
    self.paints.push(paint.clone());
    self.events.push("path".into());
  }

  fn clip_path(&mut self, path: &PathData<'_>) {
    self.paths.push(path.to_path().expect("decodable clip path"));
    self.events.push("clip_path".into());
  }

  fn image(&mut self, image: &ImageData) {
    self.events.push(format!("image({} bytes)", image.data.len()));
  }

  fn text(
    &mut self,
    _x: &fastvector::io::FloatArray,
    _y: &fastvector::io::FloatArray,
    font_family: Option<&str>,
    paint: &Paint,
  ) {
    self.paints.push(paint.clone());
    self.events.push(format!("text(family={:?})", font_family));
  }

  fn text_multi_span_chunk(&mut self, span_count: usize) {
    self.events.push(format!("chunk({span_count})"));
  }

  fn text_span(&mut self, text: &str, attrs: SpanAttributes) {
    self
      .events
      .push(format!("span({text},{})", attrs.font_size));
  }

  fn text_end(&mut self) {
    self.events.push("text_end".into());
  }

  fn masked(&mut self, bounds: Option<Rect>, uses_luma: bool) {
    self
      .events
      .push(format!("masked(b={},luma={uses_luma})", bounds.is_some()));
  }

  fn masked_child(&mut self) {
    self.events.push("masked_child".into());
  }

  fn end_masked(&mut self) {
    self.events.push("end_masked".into());
  }

  fn end_vector(&mut self) {
    assert_eq!(self.depth, 0, "traversal ended inside a group");
    self.events.push("end_vector".into());
  }
}

fn log_of(image: &VectorImage) -> EventLog {
  let mut log = EventLog::default();
  traverse(image, &mut log).expect("valid stream");
  log
}

fn rect_path() -> Path {
  Path::parse("M0,0 L10,0 L10,10 L0,10 Z").unwrap()
}

fn red_fill() -> Paint {
  Paint {
    fill: VectorColor::Argb(Color32(0xffff0000)),
    ..Paint::default()
  }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn empty_document_round_trips() {
  let mut b = ImageBuilder::new(false);
  b.vector(Some(100.0), Some(50.0), None, BlendMode::SrcIn);
  b.end_vector();
  let image = b.finish();

  let log = log_of(&image);
  assert_eq!(
    log.events,
    vec!["vector(Some(100.0),Some(50.0),tint=false)", "end_vector"]
  );

  let restored = VectorImage::from_bytes(&image.to_bytes()).unwrap();
  assert_eq!(restored, image);
}

#[test]
fn single_path_round_trips_with_paint() {
  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.path(&rect_path(), &red_fill());
  b.end_vector();
  let image = b.finish();

  let log = log_of(&image);
  assert_eq!(log.events, vec!["vector(None,None,tint=false)", "path", "end_vector"]);
  assert_eq!(log.paths[0], rect_path());
  assert_eq!(log.paints[0], red_fill());
}

#[test]
fn shared_path_and_paint_decode_identically() {
  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.path(&rect_path(), &red_fill());
  b.path(&rect_path(), &red_fill());
  b.end_vector();
  let image = b.finish();
  assert_eq!(image.num_paths, 1);
  assert_eq!(image.num_paints, 1);

  let log = log_of(&image);
  assert_eq!(log.paths[0], log.paths[1]);
  assert_eq!(log.paints[0], log.paints[1]);
}

#[test]
fn gradient_paint_survives_the_wire() {
  let gradient = Gradient {
    kind: GradientKind::Linear {
      x1: 0.0,
      y1: 0.0,
      x2: 1.0,
      y2: 0.0,
    },
    object_bounding_box: true,
    spread: SpreadMethod::Pad,
    transform: None,
    stops: smallvec![
      GradientStop {
        offset: 0.0,
        color: VectorColor::Argb(Color32::BLACK),
      },
      GradientStop {
        offset: 1.0,
        color: VectorColor::Argb(Color32::WHITE),
      },
    ],
  };
  let paint = Paint {
    fill: VectorColor::Gradient(Box::new(gradient)),
    ..Paint::default()
  };

  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.path(&rect_path(), &paint);
  b.end_vector();
  let image = b.finish();

  let log = log_of(&image);
  assert_eq!(log.paints[0], paint);

  // And again after the envelope.
  let restored = VectorImage::from_bytes(&image.to_bytes()).unwrap();
  let log = log_of(&restored);
  assert_eq!(log.paints[0], paint);
}

#[test]
fn gradient_with_shared_transform_back_references_it() {
  let t = Affine::translate(2.0, 3.0);
  let gradient_fill = |spread| {
    Paint {
      fill: VectorColor::Gradient(Box::new(Gradient {
        kind: GradientKind::Radial {
          cx: 0.5,
          cy: 0.5,
          fx: 0.5,
          fy: 0.5,
          r: 0.5,
        },
        object_bounding_box: true,
        spread,
        transform: Some(t),
        stops: smallvec![GradientStop {
          offset: 0.0,
          color: VectorColor::Argb(Color32::BLACK),
        }],
      })),
      ..Paint::default()
    }
  };

  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.path(&rect_path(), &gradient_fill(SpreadMethod::Pad));
  // Different spread makes a different paint, but the transform dedups.
  b.path(&Path::parse("M0,0 L1,1").unwrap(), &gradient_fill(SpreadMethod::Repeat));
  b.end_vector();
  let image = b.finish();
  assert_eq!(image.num_paints, 2);
  assert_eq!(image.transforms.len(), 6, "one shared transform");

  let log = log_of(&image);
  let VectorColor::Gradient(g0) = &log.paints[0].fill else {
    panic!("gradient paint");
  };
  let VectorColor::Gradient(g1) = &log.paints[1].fill else {
    panic!("gradient paint");
  };
  assert_eq!(g0.transform, Some(t));
  assert_eq!(g1.transform, Some(t));
}

#[test]
fn group_nesting_balances() {
  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.group(None, None, BlendMode::Normal);
  b.group(Some(Affine::translate(1.0, 0.0)), None, BlendMode::Normal);
  b.path(&rect_path(), &red_fill());
  b.end_group();
  b.path(&rect_path(), &red_fill());
  b.end_group();
  b.end_vector();
  let image = b.finish();

  let log = log_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None,tint=false)",
      "group(t=false,a=false)",
      "group(t=true,a=false)",
      "path",
      "end_group",
      "path",
      "end_group",
      "end_vector",
    ]
  );
  assert_eq!(log.max_depth, 2);
}

#[test]
fn masked_bracket_round_trips() {
  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.masked(Some(Rect::from_xywh(0.0, 0.0, 8.0, 8.0)), true);
  b.path(&rect_path(), &Paint::default());
  b.masked_child();
  b.path(&rect_path(), &red_fill());
  b.end_masked();
  b.end_vector();
  let image = b.finish();

  let log = log_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None,tint=false)",
      "masked(b=true,luma=true)",
      "path",
      "masked_child",
      "path",
      "end_masked",
      "end_vector",
    ]
  );
}

#[test]
fn text_events_round_trip() {
  let mut collector = CanonicalCollector::new();
  let emit = |sink: &mut dyn SceneSink| {
    sink.vector(None, None, None, BlendMode::SrcIn);
    sink.text(&[0.0, 8.0], &[12.0, 12.0], Some("serif"), &Paint::default());
    sink.text_span("ab", SpanAttributes::default());
    sink.text_span(
      "cd",
      SpanAttributes {
        font_size: 20.0,
        ..SpanAttributes::default()
      },
    );
    sink.text_end();
    sink.end_vector();
  };
  emit(&mut collector);
  let big = collector.big_floats();
  let (images, strings, float_lists) = collector.into_tables();
  let mut b = ImageBuilder::new(big);
  b.init(images, strings, float_lists);
  emit(&mut b);
  let image = b.finish();

  let log = log_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None,tint=false)",
      "text(family=Some(\"serif\"))",
      "chunk(2)",
      "span(ab,16)",
      "span(cd,20)",
      "text_end",
      "end_vector",
    ]
  );

  let restored = VectorImage::from_bytes(&image.to_bytes()).unwrap();
  assert_eq!(log_of(&restored).events, log.events);
}

#[test]
fn clip_path_shares_path_numbers_with_paths() {
  let mut b = ImageBuilder::new(false);
  b.vector(None, None, None, BlendMode::SrcIn);
  b.path(&rect_path(), &red_fill());
  b.clip_path(&rect_path());
  b.end_vector();
  let image = b.finish();
  assert_eq!(image.num_paths, 1, "clip path reuses the path table");

  let log = log_of(&image);
  assert_eq!(log.paths[0], log.paths[1]);
}

#[test]
fn tint_survives_envelope_and_traversal() {
  let mut b = ImageBuilder::new(false);
  b.vector(
    Some(24.0),
    Some(24.0),
    Some(Color32::from_rgb(0, 0x80, 0)),
    BlendMode::SrcAtop,
  );
  b.end_vector();
  let image = b.finish();
  let restored = VectorImage::from_bytes(&image.to_bytes()).unwrap();
  assert_eq!(restored.tint_color, Some(Color32::from_rgb(0, 0x80, 0)));
  assert_eq!(restored.tint_mode, BlendMode::SrcAtop);

  let log = log_of(&restored);
  assert_eq!(log.events[0], "vector(Some(24.0),Some(24.0),tint=true)");
}

// ============================================================================
// Malformed streams
// ============================================================================

fn bare_image(children: Vec<u8>) -> VectorImage {
  VectorImage {
    width: None,
    height: None,
    big_floats: false,
    tint_color: None,
    tint_mode: BlendMode::SrcIn,
    children,
    args: fastvector::io::FloatArray::F32(Vec::new()),
    transforms: fastvector::io::FloatArray::F32(Vec::new()),
    strings: Vec::new(),
    float_lists: Vec::new(),
    images: Vec::new(),
    num_paths: 0,
    num_paints: 0,
  }
}

#[test]
fn stray_end_group_fails() {
  let image = bare_image(vec![139]);
  assert_eq!(
    traverse(&image, &mut NullVisitor),
    Err(DecodeError::UnexpectedEndGroup)
  );
}

#[test]
fn unclosed_group_fails() {
  let image = bare_image(vec![128]);
  assert_eq!(
    traverse(&image, &mut NullVisitor),
    Err(DecodeError::UnbalancedGroups(1))
  );
}

#[test]
fn undefined_opcode_fails() {
  let image = bare_image(vec![200]);
  assert_eq!(
    traverse(&image, &mut NullVisitor),
    Err(DecodeError::BadOpcode(200))
  );
}

#[test]
fn paint_back_reference_must_precede_use() {
  // PATH opcode claiming paint number 0 with nothing written yet:
  // flags = path#(1) + paint#(2) + fill none (1<<2) + stroke none (1<<4).
  let image = bare_image(vec![0b01_01_11, 0x00, 0x00]);
  assert_eq!(
    traverse(&image, &mut NullVisitor),
    Err(DecodeError::BadBackReference { index: 0, count: 0 })
  );
}

#[test]
fn truncated_stream_fails() {
  // A PATH opcode with a fresh paint and nothing after it.
  let image = bare_image(vec![0b01_01_00]);
  assert_eq!(
    traverse(&image, &mut NullVisitor),
    Err(DecodeError::Truncated)
  );
}

#[test]
fn mask_codes_must_nest_properly() {
  assert_eq!(
    traverse(&bare_image(vec![144]), &mut NullVisitor),
    Err(DecodeError::MisplacedMaskCode)
  );
  assert_eq!(
    traverse(&bare_image(vec![145]), &mut NullVisitor),
    Err(DecodeError::MisplacedMaskCode)
  );
}

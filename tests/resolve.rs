//! Scene graph → IR → traversal end-to-end scenarios
//!
//! Unit coverage for the resolver lives next to it; these tests run the
//! whole pipeline and assert on what a renderer would actually see.

use fastvector::scene::{
  Coord, GradientShape, GradientTemplate, GradientUnits, NodeData, NodeKind, PaintAttributes,
  PaintServer, SceneGraph, StopColor, StopNode, StyleRule, Stylesheet, TextSpanNode,
};
use fastvector::{
  build_image, traverse, Affine, BlendMode, Color32, ImageData, ImageVisitor, Paint, PathData,
  Rect, ResolveWarning, VectorColor, VectorImage,
};

#[derive(Default)]
struct EventLog {
  events: Vec<String>,
  paints: Vec<Paint>,
}

impl ImageVisitor for EventLog {
  fn vector(
    &mut self,
    width: Option<f64>,
    height: Option<f64>,
    _tint_color: Option<Color32>,
    _tint_mode: BlendMode,
  ) {
    self.events.push(format!("vector({width:?},{height:?})"));
  }

  fn group(&mut self, transform: Option<Affine>, alpha: Option<f64>, _blend: BlendMode) {
    self.events.push(format!(
      "group(t={},a={})",
      transform.is_some(),
      alpha.is_some()
    ));
  }

  fn end_group(&mut self) {
    self.events.push("end_group".into());
  }

  fn path(&mut self, _path: &PathData<'_>, paint: &Paint) {
    self.paints.push(paint.clone());
    self.events.push("path".into());
  }

  fn clip_path(&mut self, _path: &PathData<'_>) {
    self.events.push("clip_path".into());
  }

  fn image(&mut self, image: &ImageData) {
    self.events.push(format!("image({}x{})", image.width, image.height));
  }

  fn text(
    &mut self,
    _x: &fastvector::io::FloatArray,
    _y: &fastvector::io::FloatArray,
    font_family: Option<&str>,
    paint: &Paint,
  ) {
    self.paints.push(paint.clone());
    self.events.push(format!("text({font_family:?})"));
  }

  fn text_span(&mut self, text: &str, _attrs: fastvector::SpanAttributes) {
    self.events.push(format!("span({text})"));
  }

  fn text_end(&mut self) {
    self.events.push("text_end".into());
  }

  fn masked(&mut self, _bounds: Option<Rect>, uses_luma: bool) {
    self.events.push(format!("masked(luma={uses_luma})"));
  }

  fn masked_child(&mut self) {
    self.events.push("masked_child".into());
  }

  fn end_masked(&mut self) {
    self.events.push("end_masked".into());
  }

  fn end_vector(&mut self) {
    self.events.push("end_vector".into());
  }
}

fn events_of(image: &VectorImage) -> EventLog {
  let mut log = EventLog::default();
  traverse(image, &mut log).expect("resolver output must traverse cleanly");
  log
}

fn rect_kind(x: f64, y: f64, w: f64, h: f64) -> NodeKind {
  NodeKind::Rect {
    x,
    y,
    width: w,
    height: h,
    rx: None,
    ry: None,
  }
}

fn solid(rgb: u32) -> PaintAttributes {
  PaintAttributes {
    fill: Some(PaintServer::Color(Color32(0xff00_0000 | rgb))),
    ..PaintAttributes::default()
  }
}

#[test]
fn two_equal_rects_share_everything() {
  let mut g = SceneGraph::new();
  g.width = Some(20.0);
  g.height = Some(20.0);
  let root = g.add_root(NodeData::default());
  for _ in 0..2 {
    g.add_child(
      root,
      NodeData {
        paint: solid(0xff0000),
        ..NodeData::default()
      },
      rect_kind(0.0, 0.0, 10.0, 10.0),
    );
  }
  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());
  assert_eq!(image.num_paths, 1);
  assert_eq!(image.num_paints, 1);

  let log = events_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(Some(20.0),Some(20.0))",
      "group(t=false,a=false)",
      "path",
      "path",
      "end_group",
      "end_vector",
    ]
  );
}

#[test]
fn use_of_defs_content_draws_in_place() {
  let mut g = SceneGraph::new();
  let root = g.add_root(NodeData::default());
  let defs = g.add_child(root, NodeData::default(), NodeKind::Defs);
  g.add_child(
    defs,
    NodeData {
      id: Some("box".into()),
      paint: solid(0x00ff00),
      ..NodeData::default()
    },
    rect_kind(0.0, 0.0, 4.0, 4.0),
  );
  g.add_child(
    root,
    NodeData {
      transform: Some(Affine::translate(8.0, 0.0)),
      ..NodeData::default()
    },
    NodeKind::Use { href: "box".into() },
  );
  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());

  let log = events_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None)",
      "group(t=false,a=false)",
      "group(t=true,a=false)",
      "path",
      "end_group",
      "end_group",
      "end_vector",
    ]
  );
  assert_eq!(
    log.paints[0].fill,
    VectorColor::Argb(Color32::from_rgb(0, 0xff, 0))
  );
}

#[test]
fn mask_emits_the_full_bracket() {
  let mut g = SceneGraph::new();
  let root = g.add_root(NodeData::default());
  let mask = g.add_child(
    root,
    NodeData {
      id: Some("m".into()),
      ..NodeData::default()
    },
    NodeKind::Mask,
  );
  g.add_child(
    mask,
    NodeData {
      paint: solid(0xffffff),
      ..NodeData::default()
    },
    rect_kind(0.0, 0.0, 6.0, 6.0),
  );
  g.add_child(
    root,
    NodeData {
      mask_href: Some("m".into()),
      paint: solid(0x0000ff),
      ..NodeData::default()
    },
    rect_kind(1.0, 1.0, 4.0, 4.0),
  );
  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());

  let log = events_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None)",
      "group(t=false,a=false)",
      "masked(luma=true)",
      "path",
      "masked_child",
      "path",
      "end_masked",
      "end_group",
      "end_vector",
    ]
  );
}

#[test]
fn missing_and_cyclic_references_warn_but_build() {
  let mut g = SceneGraph::new();
  let root = g.add_root(NodeData::default());
  g.add_child(
    root,
    NodeData::default(),
    NodeKind::Use {
      href: "nowhere".into(),
    },
  );
  let a = g.add_child(
    root,
    NodeData {
      id: Some("a".into()),
      ..NodeData::default()
    },
    NodeKind::Group,
  );
  g.add_child(a, NodeData::default(), NodeKind::Use { href: "a".into() });
  g.add_child(
    root,
    NodeData {
      paint: solid(0x123456),
      ..NodeData::default()
    },
    rect_kind(0.0, 0.0, 2.0, 2.0),
  );

  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.contains(&ResolveWarning::MissingReference {
    id: "nowhere".into()
  }));
  assert!(warnings
    .iter()
    .any(|w| matches!(w, ResolveWarning::CircularReference { .. })));

  // The drawable rect still made it through.
  let log = events_of(&image);
  assert!(log.events.contains(&"path".to_string()));
}

#[test]
fn stylesheet_colors_the_rect_through_the_whole_pipeline() {
  let mut g = SceneGraph::new();
  let root = g.add_root(NodeData::default());
  g.add_child(
    root,
    NodeData {
      style_class: Some("hot".into()),
      ..NodeData::default()
    },
    rect_kind(0.0, 0.0, 5.0, 5.0),
  );
  let mut sheet = Stylesheet::new();
  sheet.push(StyleRule {
    element: Some("rect".into()),
    class: Some("hot".into()),
    paint: solid(0xff00ff),
    ..StyleRule::default()
  });

  let (image, _) = build_image(&mut g, &sheet);
  let log = events_of(&image);
  assert_eq!(
    log.paints[0].fill,
    VectorColor::Argb(Color32::from_rgb(0xff, 0, 0xff))
  );
}

#[test]
fn gradient_fill_reaches_the_visitor_resolved() {
  let mut g = SceneGraph::new();
  g.width = Some(100.0);
  g.height = Some(100.0);
  let root = g.add_root(NodeData::default());
  g.add_child(
    root,
    NodeData {
      id: Some("fade".into()),
      ..NodeData::default()
    },
    NodeKind::Gradient {
      shape: GradientShape::Linear,
      template: GradientTemplate {
        units: Some(GradientUnits::UserSpace),
        x2: Some(Coord::Percent(100.0)),
        stops: vec![
          StopNode {
            offset: 0.0,
            color: StopColor::Color(Color32::BLACK),
            opacity: None,
          },
          StopNode {
            offset: 1.0,
            color: StopColor::Color(Color32::WHITE),
            opacity: Some(0.5),
          },
        ],
        ..GradientTemplate::default()
      },
    },
  );
  g.add_child(
    root,
    NodeData {
      paint: PaintAttributes {
        fill: Some(PaintServer::Reference("fade".into())),
        ..PaintAttributes::default()
      },
      ..NodeData::default()
    },
    rect_kind(0.0, 0.0, 100.0, 100.0),
  );

  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());
  let log = events_of(&image);
  let VectorColor::Gradient(gradient) = &log.paints[0].fill else {
    panic!("expected a gradient fill");
  };
  assert!(!gradient.object_bounding_box);
  assert_eq!(
    gradient.kind,
    fastvector::GradientKind::Linear {
      x1: 0.0,
      y1: 0.0,
      x2: 100.0,
      y2: 0.0,
    }
  );
  // Stop opacity folded into the stop color's alpha.
  let VectorColor::Argb(last) = gradient.stops[1].color else {
    panic!("solid stop");
  };
  assert_eq!(last.alpha(), 0x80);
}

#[test]
fn text_and_image_tables_flow_into_the_ir() {
  let mut g = SceneGraph::new();
  let root = g.add_root(NodeData::default());
  g.add_child(
    root,
    NodeData {
      text: fastvector::scene::TextAttributeSet {
        font_family: Some("mono".into()),
        font_size: Some(11.0),
        ..fastvector::scene::TextAttributeSet::default()
      },
      paint: solid(0x222222),
      ..NodeData::default()
    },
    NodeKind::Text {
      x: vec![0.0],
      y: vec![11.0],
      spans: vec![TextSpanNode {
        text: "hi".into(),
        attrs: fastvector::scene::TextAttributeSet::default(),
      }],
    },
  );
  g.add_child(
    root,
    NodeData::default(),
    NodeKind::Image {
      image: ImageData {
        x: 0.0,
        y: 0.0,
        width: 2.0,
        height: 3.0,
        data: vec![9, 9, 9],
      },
    },
  );

  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());
  assert_eq!(image.strings, vec!["mono".to_owned(), "hi".to_owned()]);
  assert_eq!(image.images.len(), 1);
  assert_eq!(image.float_lists.len(), 2);

  let log = events_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None)",
      "group(t=false,a=false)",
      "text(Some(\"mono\"))",
      "span(hi)",
      "text_end",
      "image(2x3)",
      "end_group",
      "end_vector",
    ]
  );
}

#[test]
fn clip_attribute_wraps_content_in_a_clipping_group() {
  let mut g = SceneGraph::new();
  let root = g.add_root(NodeData::default());
  g.add_child(
    root,
    NodeData {
      clip_path: Some(fastvector::Path::parse("M0,0 L4,0 L4,4 Z").unwrap()),
      paint: solid(0x445566),
      ..NodeData::default()
    },
    rect_kind(0.0, 0.0, 8.0, 8.0),
  );
  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());

  let log = events_of(&image);
  assert_eq!(
    log.events,
    vec![
      "vector(None,None)",
      "group(t=false,a=false)",
      "group(t=false,a=false)",
      "clip_path",
      "path",
      "end_group",
      "end_group",
      "end_vector",
    ]
  );
}

#[test]
fn whole_pipeline_survives_the_envelope() {
  let mut g = SceneGraph::new();
  g.width = Some(64.0);
  g.height = Some(64.0);
  g.tint_color = Some(Color32::from_rgb(0, 0, 0xff));
  let root = g.add_root(NodeData::default());
  let group = g.add_child(
    root,
    NodeData {
      transform: Some(Affine::scale(2.0, 2.0)),
      group_alpha: Some(0.5),
      ..NodeData::default()
    },
    NodeKind::Group,
  );
  g.add_child(
    group,
    NodeData {
      paint: solid(0xabcdef),
      ..NodeData::default()
    },
    NodeKind::Ellipse {
      cx: 8.0,
      cy: 8.0,
      rx: 4.0,
      ry: 3.0,
    },
  );

  let (image, warnings) = build_image(&mut g, &Stylesheet::new());
  assert!(warnings.is_empty());

  let bytes = image.to_bytes();
  let restored = VectorImage::from_bytes(&bytes).unwrap();
  assert_eq!(restored, image);
  assert_eq!(restored.to_bytes(), bytes);
  assert_eq!(events_of(&restored).events, events_of(&image).events);
}

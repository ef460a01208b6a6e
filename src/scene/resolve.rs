//! Scene graph resolution and IR emission
//!
//! Two passes over the graph. Pass A applies the stylesheet to every
//! node's attributes. Pass B walks the tree depth-first, cascading
//! inherited paint and text attributes, resolving `use`/mask/gradient
//! references (breaking cycles through a referrers stack), pruning
//! undrawable subtrees, and materializing masks as explicit wrapper
//! nodes. The result is a reference-free tree that is then emitted twice
//! through the same walker: once into a [`CanonicalCollector`] to intern
//! strings, float lists and image blobs and pick the float width, then
//! into the real [`ImageBuilder`].
//!
//! Resolution never fails; everything questionable becomes a
//! [`ResolveWarning`] and a pruned or unmasked subtree.

use crate::builder::{CanonicalCollector, ImageBuilder, SceneSink};
use crate::color::{
  BlendMode, Color32, Gradient, GradientKind, GradientStop, SpreadMethod, VectorColor,
};
use crate::geometry::{Affine, Point, Rect};
use crate::image::{ImageData, VectorImage};
use crate::paint::Paint;
use crate::path::{Path, PathSegment};
use crate::scene::bounds::{document_bounds, node_bounds, FALLBACK};
use crate::scene::{
  Coord, GradientShape, GradientTemplate, GradientUnits, NodeData, NodeId, NodeKind,
  PaintAttributes, PaintServer, SceneGraph, StopColor, Stylesheet, TextAttributeSet,
};
use crate::text::SpanAttributes;
use smallvec::SmallVec;
use thiserror::Error;

/// A non-fatal problem found during resolution
///
/// Warnings never abort a build; the offending reference or subtree is
/// skipped instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveWarning {
  #[error("reference to missing id \"{id}\"")]
  MissingReference { id: String },

  #[error("circular reference through id \"{id}\"")]
  CircularReference { id: String },

  #[error("reference \"{id}\" points at an element of the wrong kind")]
  BadReferenceKind { id: String },

  #[error("transform with zero determinant prunes its subtree")]
  DegenerateTransform,

  #[error("percentage coordinate resolved against fallback bounds")]
  UnresolvedPercentage,
}

/// A resolved, reference-free scene node
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedNode {
  Group {
    transform: Option<Affine>,
    alpha: Option<f64>,
    blend: BlendMode,
    children: Vec<ResolvedNode>,
  },
  Clip(Path),
  Shape { path: Path, paint: Paint },
  Image(ImageData),
  Text {
    x: Vec<f64>,
    y: Vec<f64>,
    font_family: Option<String>,
    paint: Paint,
    spans: Vec<(String, SpanAttributes)>,
  },
  Masked {
    bounds: Option<Rect>,
    uses_luma: bool,
    mask: Vec<ResolvedNode>,
    child: Box<ResolvedNode>,
  },
}

/// Cascaded inheritable state carried down the resolve recursion
#[derive(Debug, Clone, Default)]
struct Cascade {
  paint: PaintAttributes,
  text: TextAttributeSet,
}

impl Cascade {
  fn descend(&self, data: &NodeData) -> Cascade {
    Cascade {
      paint: data.paint.cascade_onto(&self.paint),
      text: data.text.cascade_onto(&self.text),
    }
  }
}

/// Resolves `graph` (after stylesheet application) and builds the IR
///
/// Returns the frozen image together with every warning resolution
/// collected. The graph's node attributes are modified in place by the
/// stylesheet pass and should be considered spent afterwards.
pub fn build_image(
  graph: &mut SceneGraph,
  stylesheet: &Stylesheet,
) -> (VectorImage, Vec<ResolveWarning>) {
  if !stylesheet.is_empty() {
    for i in 0..graph.len() {
      let id = NodeId::from_index(i);
      let tag = graph.node(id).kind.tag();
      stylesheet.apply_to(&mut graph.node_mut(id).data, tag);
    }
  }

  let user_bounds = document_bounds(graph);
  let bounds_is_fallback = user_bounds == FALLBACK && graph.width.is_none();

  let mut resolver = Resolver {
    graph,
    user_bounds,
    bounds_is_fallback,
    warnings: Vec::new(),
    referrers: Vec::new(),
  };
  let resolved = graph
    .root()
    .and_then(|root| resolver.resolve_node(root, &Cascade::default()));
  let warnings = resolver.warnings;

  let mut collector = CanonicalCollector::new();
  emit_document(graph, resolved.as_ref(), &mut collector);
  let big = collector.big_floats();
  let (images, strings, float_lists) = collector.into_tables();

  let mut builder = ImageBuilder::new(big);
  builder.init(images, strings, float_lists);
  emit_document(graph, resolved.as_ref(), &mut builder);
  (builder.finish(), warnings)
}

fn emit_document<S: SceneSink>(graph: &SceneGraph, root: Option<&ResolvedNode>, sink: &mut S) {
  sink.vector(
    graph.width,
    graph.height,
    graph.tint_color,
    graph.tint_mode.unwrap_or(BlendMode::SrcIn),
  );
  if let Some(node) = root {
    emit_node(node, sink);
  }
  sink.end_vector();
}

fn emit_node<S: SceneSink>(node: &ResolvedNode, sink: &mut S) {
  match node {
    ResolvedNode::Group {
      transform,
      alpha,
      blend,
      children,
    } => {
      sink.group(*transform, *alpha, *blend);
      for child in children {
        emit_node(child, sink);
      }
      sink.end_group();
    }
    ResolvedNode::Clip(path) => sink.clip_path(path),
    ResolvedNode::Shape { path, paint } => sink.path(path, paint),
    ResolvedNode::Image(image) => sink.image(image),
    ResolvedNode::Text {
      x,
      y,
      font_family,
      paint,
      spans,
    } => {
      sink.text(x, y, font_family.as_deref(), paint);
      for (text, attrs) in spans {
        sink.text_span(text, *attrs);
      }
      sink.text_end();
    }
    ResolvedNode::Masked {
      bounds,
      uses_luma,
      mask,
      child,
    } => {
      sink.masked(*bounds, *uses_luma);
      for node in mask {
        emit_node(node, sink);
      }
      sink.masked_child();
      emit_node(child, sink);
      sink.end_masked();
    }
  }
}

impl NodeId {
  fn from_index(i: usize) -> Self {
    NodeId(i as u32)
  }
}

struct Resolver<'g> {
  graph: &'g SceneGraph,
  user_bounds: Rect,
  bounds_is_fallback: bool,
  warnings: Vec<ResolveWarning>,
  /// Identities currently being resolved; any reference back into this
  /// stack is treated as missing instead of recursed into
  referrers: Vec<NodeId>,
}

impl<'g> Resolver<'g> {
  fn warn(&mut self, warning: ResolveWarning) {
    self.warnings.push(warning);
  }

  fn resolve_node(&mut self, id: NodeId, parent: &Cascade) -> Option<ResolvedNode> {
    let graph = self.graph;
    if self.referrers.contains(&id) {
      // Tree cycles surface here too, not only reference cycles.
      self.warn(ResolveWarning::CircularReference {
        id: graph.node(id).data.id.clone().unwrap_or_default(),
      });
      return None;
    }
    let node = graph.node(id);
    if !node.data.display {
      return None;
    }
    if let Some(t) = &node.data.transform {
      if t.determinant() == 0.0 {
        self.warn(ResolveWarning::DegenerateTransform);
        return None;
      }
    }

    self.referrers.push(id);
    let cascade = parent.descend(&node.data);
    let content = self.resolve_content(id, &cascade);
    let result = content.and_then(|inner| self.decorate(id, &cascade, inner));
    self.referrers.pop();
    result
  }

  /// Resolves a node's own content, without transform/alpha/blend/clip/
  /// mask decoration
  fn resolve_content(&mut self, id: NodeId, cascade: &Cascade) -> Option<ResolvedNode> {
    let graph = self.graph;
    let node = graph.node(id);
    match &node.kind {
      NodeKind::Root | NodeKind::Group => {
        let children = self.resolve_children(id, cascade);
        if children.is_empty() {
          return None;
        }
        Some(ResolvedNode::Group {
          transform: None,
          alpha: None,
          blend: BlendMode::Normal,
          children,
        })
      }
      NodeKind::Defs => {
        // Resolve for the warnings, draw nothing in place.
        let _ = self.resolve_children(id, cascade);
        None
      }
      // Consumed by reference only.
      NodeKind::Mask | NodeKind::Gradient { .. } => None,
      NodeKind::Use { href } => {
        let target = match graph.lookup(href) {
          Some(t) => t,
          None => {
            self.warn(ResolveWarning::MissingReference { id: href.clone() });
            return None;
          }
        };
        if self.referrers.contains(&target) {
          self.warn(ResolveWarning::CircularReference { id: href.clone() });
          return None;
        }
        self.resolve_node(target, cascade)
      }
      NodeKind::Path { path } => {
        if path.is_empty() {
          return None;
        }
        self.shape(path.clone(), cascade)
      }
      NodeKind::Rect {
        x,
        y,
        width,
        height,
        rx,
        ry,
      } => {
        if *width <= 0.0 || *height <= 0.0 {
          return None;
        }
        self.shape(rect_path(*x, *y, *width, *height, *rx, *ry), cascade)
      }
      NodeKind::Ellipse { cx, cy, rx, ry } => {
        if *rx <= 0.0 || *ry <= 0.0 {
          return None;
        }
        let mut path = Path::new();
        path
          .segments
          .push(PathSegment::Oval(Rect::from_xywh(
            cx - rx,
            cy - ry,
            rx * 2.0,
            ry * 2.0,
          )));
        self.shape(path, cascade)
      }
      NodeKind::Poly { points, closed } => {
        if points.len() < 2 {
          return None;
        }
        let mut path = Path::new();
        path.segments.push(PathSegment::MoveTo(points[0]));
        for p in &points[1..] {
          path.segments.push(PathSegment::LineTo(*p));
        }
        if *closed {
          path.segments.push(PathSegment::Close);
        }
        self.shape(path, cascade)
      }
      NodeKind::Image { image } => {
        if image.width <= 0.0 || image.height <= 0.0 {
          return None;
        }
        Some(ResolvedNode::Image(image.clone()))
      }
      NodeKind::Text { x, y, spans } => self.resolve_text(x, y, spans, cascade),
    }
  }

  fn resolve_children(&mut self, id: NodeId, cascade: &Cascade) -> Vec<ResolvedNode> {
    let graph = self.graph;
    graph
      .node(id)
      .children
      .iter()
      .filter_map(|&child| self.resolve_node(child, cascade))
      .collect()
  }

  fn shape(&mut self, path: Path, cascade: &Cascade) -> Option<ResolvedNode> {
    let paint = self.resolve_paint(&cascade.paint);
    Some(ResolvedNode::Shape { path, paint })
  }

  /// Applies clip, mask, and transform/alpha/blend wrapping, outermost
  /// last
  fn decorate(
    &mut self,
    id: NodeId,
    cascade: &Cascade,
    content: ResolvedNode,
  ) -> Option<ResolvedNode> {
    let data = &self.graph.node(id).data;
    let transform = data.transform;
    let alpha = data.group_alpha;
    let blend = data.blend_mode.unwrap_or_default();
    let clip = data.clip_path.clone();
    let mask_href = data.mask_href.clone();
    let mut inner = content;

    if let Some(clip) = clip {
      inner = ResolvedNode::Group {
        transform: None,
        alpha: None,
        blend: BlendMode::Normal,
        children: vec![ResolvedNode::Clip(clip), inner],
      };
    }

    if let Some(href) = mask_href {
      inner = self.mask_wrap(href, cascade, inner)?;
    }

    if transform.is_some() || alpha.is_some() || blend != BlendMode::Normal {
      inner = group_wrap(transform, alpha, blend, inner);
    }
    Some(inner)
  }

  /// Materializes `mask=url(#id)` as an explicit Masked wrapper
  ///
  /// A missing, mislinked or cyclic mask leaves the child unmasked; a
  /// mask with no drawable content hides the child entirely.
  fn mask_wrap(
    &mut self,
    href: String,
    cascade: &Cascade,
    inner: ResolvedNode,
  ) -> Option<ResolvedNode> {
    let graph = self.graph;
    let mask_id = match graph.lookup(&href) {
      Some(m) => m,
      None => {
        self.warn(ResolveWarning::MissingReference { id: href });
        return Some(inner);
      }
    };
    if !matches!(graph.node(mask_id).kind, NodeKind::Mask) {
      self.warn(ResolveWarning::BadReferenceKind { id: href });
      return Some(inner);
    }
    if self.referrers.contains(&mask_id) {
      self.warn(ResolveWarning::CircularReference { id: href });
      return Some(inner);
    }

    self.referrers.push(mask_id);
    let mask_cascade = cascade.descend(&graph.node(mask_id).data);
    let mask_children = self.resolve_children(mask_id, &mask_cascade);
    self.referrers.pop();

    if mask_children.is_empty() {
      // Nothing drawn into the mask means nothing shows through it.
      return None;
    }
    let bounds = mask_content_bounds(graph, mask_id);
    let uses_luma = can_use_luma(&mask_children);
    Some(ResolvedNode::Masked {
      bounds,
      uses_luma,
      mask: mask_children,
      child: Box::new(inner),
    })
  }

  fn resolve_text(
    &mut self,
    x: &[f64],
    y: &[f64],
    spans: &[crate::scene::TextSpanNode],
    cascade: &Cascade,
  ) -> Option<ResolvedNode> {
    let paint = self.resolve_paint(&cascade.paint);

    // Split consecutive spans whose effective font family differs: the
    // wire form carries one family per text element.
    let mut runs: Vec<(Option<String>, Vec<(String, SpanAttributes)>)> = Vec::new();
    for span in spans {
      if span.text.is_empty() {
        continue;
      }
      let effective = span.attrs.cascade_onto(&cascade.text);
      let family = effective.font_family.clone();
      let attrs = SpanAttributes {
        font_size: effective.font_size.unwrap_or(16.0),
        weight: effective.font_weight.unwrap_or_default(),
        style: effective.font_style.unwrap_or_default(),
        anchor: effective.anchor.unwrap_or_default(),
        decoration: effective.decoration.unwrap_or_default(),
      };
      match runs.last_mut() {
        Some((f, run)) if *f == family => run.push((span.text.clone(), attrs)),
        _ => runs.push((family, vec![(span.text.clone(), attrs)])),
      }
    }
    if runs.is_empty() {
      return None;
    }

    let mut nodes: Vec<ResolvedNode> = runs
      .into_iter()
      .map(|(font_family, spans)| ResolvedNode::Text {
        x: x.to_vec(),
        y: y.to_vec(),
        font_family,
        paint: paint.clone(),
        spans,
      })
      .collect();
    if nodes.len() == 1 {
      nodes.pop()
    } else {
      Some(ResolvedNode::Group {
        transform: None,
        alpha: None,
        blend: BlendMode::Normal,
        children: nodes,
      })
    }
  }

  // --------------------------------------------------------------------
  // Paint resolution
  // --------------------------------------------------------------------

  fn resolve_paint(&mut self, attrs: &PaintAttributes) -> Paint {
    let current = attrs.current_color;
    let fill = self.resolve_server(
      attrs.fill.clone().unwrap_or(PaintServer::Color(Color32::BLACK)),
      attrs.fill_opacity,
      current,
    );
    let stroke = self.resolve_server(
      attrs.stroke.clone().unwrap_or(PaintServer::None),
      attrs.stroke_opacity,
      current,
    );
    Paint {
      fill,
      stroke,
      stroke_width: attrs.stroke_width,
      stroke_miter_limit: attrs.stroke_miter_limit,
      stroke_join: attrs.stroke_join.unwrap_or_default(),
      stroke_cap: attrs.stroke_cap.unwrap_or_default(),
      fill_rule: attrs.fill_rule.unwrap_or_default(),
      dash_array: attrs
        .stroke_dash_array
        .as_ref()
        .map(|d| SmallVec::from_slice(d)),
      dash_offset: attrs.stroke_dash_offset,
    }
  }

  fn resolve_server(
    &mut self,
    server: PaintServer,
    opacity: Option<f64>,
    current: Option<Color32>,
  ) -> VectorColor {
    let opacity = opacity.unwrap_or(1.0);
    match server {
      PaintServer::None => VectorColor::None,
      PaintServer::Color(c) => VectorColor::Argb(c.with_opacity(opacity)),
      PaintServer::CurrentColor => match current {
        Some(c) => VectorColor::Argb(c.with_opacity(opacity)),
        None => VectorColor::CurrentColor,
      },
      PaintServer::Reference(name) => match self.resolve_gradient(&name, current) {
        // Stop alpha stands alone; fill/stroke opacity only scales the
        // solid fallbacks.
        Some(gradient) => VectorColor::Gradient(Box::new(gradient)),
        None => VectorColor::None,
      },
    }
  }

  /// Resolves a gradient reference through its template chain
  fn resolve_gradient(&mut self, name: &str, current: Option<Color32>) -> Option<Gradient> {
    let graph = self.graph;
    let start = match graph.lookup(name) {
      Some(id) => id,
      None => {
        self.warn(ResolveWarning::MissingReference { id: name.to_owned() });
        return None;
      }
    };

    // Collect the template chain, nearest first, breaking href cycles.
    let mut chain: Vec<(&GradientTemplate, GradientShape)> = Vec::new();
    let mut visited: Vec<NodeId> = Vec::new();
    let mut cursor = Some(start);
    while let Some(id) = cursor {
      if visited.contains(&id) {
        self.warn(ResolveWarning::CircularReference { id: name.to_owned() });
        break;
      }
      visited.push(id);
      let NodeKind::Gradient { shape, template } = &graph.node(id).kind else {
        if id == start {
          self.warn(ResolveWarning::BadReferenceKind { id: name.to_owned() });
          return None;
        }
        break;
      };
      chain.push((template, *shape));
      cursor = template.href.as_ref().and_then(|href| {
        let next = graph.lookup(href);
        if next.is_none() {
          self.warn(ResolveWarning::MissingReference { id: href.clone() });
        }
        next
      });
    }

    let shape = chain.first()?.1;
    let eff = |pick: &dyn Fn(&GradientTemplate) -> Option<Coord>| -> Option<Coord> {
      chain.iter().find_map(|(t, _)| pick(t))
    };
    let units = chain
      .iter()
      .find_map(|(t, _)| t.units)
      .unwrap_or(GradientUnits::ObjectBoundingBox);
    let spread = chain
      .iter()
      .find_map(|(t, _)| t.spread)
      .unwrap_or(SpreadMethod::Pad);
    let transform = chain.iter().find_map(|(t, _)| t.transform);
    let stop_nodes = chain
      .iter()
      .map(|(t, _)| &t.stops)
      .find(|stops| !stops.is_empty())?;

    let mut stops: SmallVec<[GradientStop; 4]> = SmallVec::with_capacity(stop_nodes.len());
    for stop in stop_nodes {
      let color = match stop.color {
        StopColor::Color(c) => {
          VectorColor::Argb(c.with_opacity(stop.opacity.unwrap_or(1.0)))
        }
        StopColor::CurrentColor => match current {
          Some(c) => VectorColor::Argb(c.with_opacity(stop.opacity.unwrap_or(1.0))),
          None => VectorColor::CurrentColor,
        },
      };
      stops.push(GradientStop {
        offset: stop.offset.clamp(0.0, 1.0),
        color,
      });
    }

    let object_bounding_box = units == GradientUnits::ObjectBoundingBox;
    let mut resolve = |coord: Option<Coord>, default: Coord, axis: Axis| {
      self.resolve_coord(coord.unwrap_or(default), units, axis)
    };
    let kind = match shape {
      GradientShape::Linear => GradientKind::Linear {
        x1: resolve(eff(&|t| t.x1), Coord::Percent(0.0), Axis::X),
        y1: resolve(eff(&|t| t.y1), Coord::Percent(0.0), Axis::Y),
        x2: resolve(eff(&|t| t.x2), Coord::Percent(100.0), Axis::X),
        y2: resolve(eff(&|t| t.y2), Coord::Percent(0.0), Axis::Y),
      },
      GradientShape::Radial => {
        let cx = eff(&|t| t.cx).unwrap_or(Coord::Percent(50.0));
        let cy = eff(&|t| t.cy).unwrap_or(Coord::Percent(50.0));
        GradientKind::Radial {
          cx: resolve(Some(cx), Coord::Percent(50.0), Axis::X),
          cy: resolve(Some(cy), Coord::Percent(50.0), Axis::Y),
          fx: resolve(eff(&|t| t.fx), cx, Axis::X),
          fy: resolve(eff(&|t| t.fy), cy, Axis::Y),
          r: resolve(eff(&|t| t.r), Coord::Percent(50.0), Axis::Diagonal),
        }
      }
      GradientShape::Sweep => GradientKind::Sweep {
        cx: resolve(eff(&|t| t.cx), Coord::Percent(50.0), Axis::X),
        cy: resolve(eff(&|t| t.cy), Coord::Percent(50.0), Axis::Y),
        start_angle: chain.iter().find_map(|(t, _)| t.start_angle).unwrap_or(0.0),
        end_angle: chain
          .iter()
          .find_map(|(t, _)| t.end_angle)
          .unwrap_or(360.0),
      },
    };

    Some(Gradient {
      kind,
      object_bounding_box,
      spread,
      transform,
      stops,
    })
  }

  fn resolve_coord(&mut self, coord: Coord, units: GradientUnits, axis: Axis) -> f64 {
    match units {
      GradientUnits::ObjectBoundingBox => match coord {
        Coord::Units(v) => v,
        Coord::Percent(p) => p / 100.0,
      },
      GradientUnits::UserSpace => match coord {
        Coord::Units(v) => v,
        Coord::Percent(p) => {
          if self.bounds_is_fallback {
            self.warn(ResolveWarning::UnresolvedPercentage);
          }
          let b = self.user_bounds;
          match axis {
            Axis::X => b.x + p / 100.0 * b.width,
            Axis::Y => b.y + p / 100.0 * b.height,
            Axis::Diagonal => {
              p / 100.0 * ((b.width * b.width + b.height * b.height) / 2.0).sqrt()
            }
          }
        }
      },
    }
  }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
  X,
  Y,
  Diagonal,
}

fn group_wrap(
  transform: Option<Affine>,
  alpha: Option<f64>,
  blend: BlendMode,
  inner: ResolvedNode,
) -> ResolvedNode {
  match inner {
    ResolvedNode::Group {
      transform: None,
      alpha: None,
      blend: BlendMode::Normal,
      children,
    } => ResolvedNode::Group {
      transform,
      alpha,
      blend,
      children,
    },
    other => ResolvedNode::Group {
      transform,
      alpha,
      blend,
      children: vec![other],
    },
  }
}

/// Bounds of a mask's content when the mask node itself reports none
fn mask_content_bounds(graph: &SceneGraph, mask_id: NodeId) -> Option<Rect> {
  let mut acc: Option<Rect> = None;
  for &child in &graph.node(mask_id).children {
    if let Some(b) = node_bounds(graph, child, &mut vec![]) {
      acc = Some(match acc {
        Some(r) => r.union(b),
        None => b,
      });
    }
  }
  acc
}

/// Decides whether luma masking is equivalent to alpha masking for this
/// mask content
///
/// True only while every painted color is fully opaque: images and
/// unresolved `currentColor` disqualify, and any translucent solid or
/// gradient stop forces the alpha path.
fn can_use_luma(nodes: &[ResolvedNode]) -> bool {
  nodes.iter().all(luma_ok)
}

fn luma_ok(node: &ResolvedNode) -> bool {
  match node {
    ResolvedNode::Group { children, .. } => can_use_luma(children),
    ResolvedNode::Clip(_) => true,
    ResolvedNode::Shape { paint, .. } => color_opaque(&paint.fill) && color_opaque(&paint.stroke),
    ResolvedNode::Image(_) => false,
    ResolvedNode::Text { paint, .. } => color_opaque(&paint.fill) && color_opaque(&paint.stroke),
    ResolvedNode::Masked { mask, child, .. } => can_use_luma(mask) && luma_ok(child),
  }
}

fn color_opaque(color: &VectorColor) -> bool {
  match color {
    VectorColor::None => true,
    VectorColor::Argb(c) => c.alpha() == 0xff,
    VectorColor::CurrentColor => false,
    VectorColor::Gradient(g) => g.stops.iter().all(|s| match &s.color {
      VectorColor::Argb(c) => c.alpha() == 0xff,
      VectorColor::None => false,
      _ => false,
    }),
  }
}


// Rounded and plain rectangle outlines.
fn rect_path(x: f64, y: f64, width: f64, height: f64, rx: Option<f64>, ry: Option<f64>) -> Path {
  let (rx, ry) = match (rx, ry) {
    (None, None) => (0.0, 0.0),
    (Some(rx), None) => (rx, rx),
    (None, Some(ry)) => (ry, ry),
    (Some(rx), Some(ry)) => (rx, ry),
  };
  let rx = rx.clamp(0.0, width / 2.0);
  let ry = ry.clamp(0.0, height / 2.0);
  let mut path = Path::new();
  if rx <= 0.0 || ry <= 0.0 {
    path.segments.push(PathSegment::MoveTo(Point::new(x, y)));
    path
      .segments
      .push(PathSegment::LineTo(Point::new(x + width, y)));
    path
      .segments
      .push(PathSegment::LineTo(Point::new(x + width, y + height)));
    path
      .segments
      .push(PathSegment::LineTo(Point::new(x, y + height)));
    path.segments.push(PathSegment::Close);
    return path;
  }
  let right = x + width;
  let bottom = y + height;
  let arc = |end: Point| PathSegment::ArcToPoint {
    end,
    rx,
    ry,
    rotation: 0.0,
    large_arc: false,
    clockwise: true,
  };
  path
    .segments
    .push(PathSegment::MoveTo(Point::new(x + rx, y)));
  path
    .segments
    .push(PathSegment::LineTo(Point::new(right - rx, y)));
  path.segments.push(arc(Point::new(right, y + ry)));
  path
    .segments
    .push(PathSegment::LineTo(Point::new(right, bottom - ry)));
  path.segments.push(arc(Point::new(right - rx, bottom)));
  path
    .segments
    .push(PathSegment::LineTo(Point::new(x + rx, bottom)));
  path.segments.push(arc(Point::new(x, bottom - ry)));
  path
    .segments
    .push(PathSegment::LineTo(Point::new(x, y + ry)));
  path.segments.push(arc(Point::new(x + rx, y)));
  path.segments.push(PathSegment::Close);
  path
}

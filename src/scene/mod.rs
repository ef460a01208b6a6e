//! The declarative scene graph
//!
//! An arena of typed nodes with inheritable attributes, produced by an
//! external source parser and consumed by the resolver. Nodes reference
//! each other by id (`use` targets, masks, gradient templates); nothing
//! holds pointers, so cyclic references are representable and the resolver
//! breaks them.
//!
//! The graph only lives for the duration of a build: after
//! [`build_image`](crate::scene::resolve::build_image) the output
//! [`VectorImage`](crate::VectorImage) stands alone.

pub mod bounds;
pub mod resolve;

use crate::color::{BlendMode, Color32, SpreadMethod};
use crate::geometry::{Affine, Point};
use crate::image::ImageData;
use crate::paint::{FillRule, StrokeCap, StrokeJoin};
use crate::path::Path;
use crate::text::{FontStyle, FontWeight, TextAnchor, TextDecoration};
use rustc_hash::FxHashMap;

/// Index of a node in its [`SceneGraph`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// A fill or stroke source before resolution
#[derive(Debug, Clone, PartialEq)]
pub enum PaintServer {
  /// A literal color
  Color(Color32),
  /// Explicitly unpainted
  None,
  /// The ambient current color
  CurrentColor,
  /// `url(#id)` reference to a gradient node
  Reference(String),
}

/// Inheritable paint attributes; unset fields cascade from the ancestor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintAttributes {
  pub fill: Option<PaintServer>,
  pub fill_opacity: Option<f64>,
  pub fill_rule: Option<FillRule>,
  pub stroke: Option<PaintServer>,
  pub stroke_opacity: Option<f64>,
  pub stroke_width: Option<f64>,
  pub stroke_miter_limit: Option<f64>,
  pub stroke_join: Option<StrokeJoin>,
  pub stroke_cap: Option<StrokeCap>,
  pub stroke_dash_array: Option<Vec<f64>>,
  pub stroke_dash_offset: Option<f64>,
  /// The value `currentColor` resolves to, itself inheritable
  pub current_color: Option<Color32>,
}

macro_rules! cascade_fields {
  ($child:expr, $parent:expr, { $($field:ident),* $(,)? }) => {{
    Self {
      $($field: $child.$field.clone().or_else(|| $parent.$field.clone()),)*
    }
  }};
}

impl PaintAttributes {
  /// Child-over-parent inheritance: set fields win, unset fields fall back
  pub fn cascade_onto(&self, parent: &Self) -> Self {
    cascade_fields!(self, parent, {
      fill,
      fill_opacity,
      fill_rule,
      stroke,
      stroke_opacity,
      stroke_width,
      stroke_miter_limit,
      stroke_join,
      stroke_cap,
      stroke_dash_array,
      stroke_dash_offset,
      current_color,
    })
  }

  /// Stylesheet application: fills only the fields this node left empty
  pub fn fill_unset_from(&mut self, style: &Self) {
    *self = self.cascade_onto(style);
  }
}

/// Inheritable text attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextAttributeSet {
  pub font_family: Option<String>,
  pub font_size: Option<f64>,
  pub font_weight: Option<FontWeight>,
  pub font_style: Option<FontStyle>,
  pub anchor: Option<TextAnchor>,
  pub decoration: Option<TextDecoration>,
}

impl TextAttributeSet {
  pub fn cascade_onto(&self, parent: &Self) -> Self {
    cascade_fields!(self, parent, {
      font_family,
      font_size,
      font_weight,
      font_style,
      anchor,
      decoration,
    })
  }

  pub fn fill_unset_from(&mut self, style: &Self) {
    *self = self.cascade_onto(style);
  }
}

/// Attributes every node carries, inheritable or not
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
  /// Document id, the target of `url(#...)` references
  pub id: Option<String>,
  /// Whitespace-separated class tokens for stylesheet matching
  pub style_class: Option<String>,
  pub transform: Option<Affine>,
  pub paint: PaintAttributes,
  pub text: TextAttributeSet,
  /// `display="none"` prunes the node and its subtree
  pub display: bool,
  /// Group opacity in `[0, 1]`
  pub group_alpha: Option<f64>,
  pub blend_mode: Option<BlendMode>,
  /// `mask="url(#id)"` reference
  pub mask_href: Option<String>,
  /// Clip applied to this node's content
  pub clip_path: Option<Path>,
}

impl Default for NodeData {
  fn default() -> Self {
    Self {
      id: None,
      style_class: None,
      transform: None,
      paint: PaintAttributes::default(),
      text: TextAttributeSet::default(),
      display: true,
      group_alpha: None,
      blend_mode: None,
      mask_href: None,
      clip_path: None,
    }
  }
}

/// A coordinate that may be percentage-valued
///
/// Percentages resolve against the object bounding box (as a fraction) or
/// the user-space viewport, depending on the gradient's unit mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
  Units(f64),
  Percent(f64),
}

/// Unit space for gradient geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientUnits {
  ObjectBoundingBox,
  UserSpace,
}

/// Which gradient element this is; geometry fields apply per shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientShape {
  Linear,
  Radial,
  Sweep,
}

/// The color of one gradient stop before resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopColor {
  Color(Color32),
  CurrentColor,
}

/// One declared gradient stop
#[derive(Debug, Clone, PartialEq)]
pub struct StopNode {
  pub offset: f64,
  pub color: StopColor,
  pub opacity: Option<f64>,
}

/// A gradient definition node, possibly inheriting from a template
///
/// Every field but `shape` is optional; unset fields fall back through the
/// `href` chain, then to the per-shape defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientTemplate {
  pub units: Option<GradientUnits>,
  pub spread: Option<SpreadMethod>,
  pub transform: Option<Affine>,
  pub stops: Vec<StopNode>,
  pub href: Option<String>,
  pub x1: Option<Coord>,
  pub y1: Option<Coord>,
  pub x2: Option<Coord>,
  pub y2: Option<Coord>,
  pub cx: Option<Coord>,
  pub cy: Option<Coord>,
  pub fx: Option<Coord>,
  pub fy: Option<Coord>,
  pub r: Option<Coord>,
  pub start_angle: Option<f64>,
  pub end_angle: Option<f64>,
}

/// One span of a text element; unset attributes inherit from the element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSpanNode {
  pub text: String,
  pub attrs: TextAttributeSet,
}

/// The node variants
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
  /// Document root; behaves as a group
  Root,
  Group,
  /// Container resolved for its definitions only, never drawn in place
  Defs,
  /// Mask content, consumed by reference from `mask_href`
  Mask,
  /// Reference to another node, drawn in place
  Use { href: String },
  Path { path: Path },
  Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rx: Option<f64>,
    ry: Option<f64>,
  },
  Ellipse {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
  },
  Poly { points: Vec<Point>, closed: bool },
  Gradient { shape: GradientShape, template: GradientTemplate },
  Image { image: ImageData },
  Text {
    x: Vec<f64>,
    y: Vec<f64>,
    spans: Vec<TextSpanNode>,
  },
}

impl NodeKind {
  /// Element name used for stylesheet tag matching
  pub fn tag(&self) -> &'static str {
    match self {
      NodeKind::Root => "svg",
      NodeKind::Group => "g",
      NodeKind::Defs => "defs",
      NodeKind::Mask => "mask",
      NodeKind::Use { .. } => "use",
      NodeKind::Path { .. } => "path",
      NodeKind::Rect { .. } => "rect",
      NodeKind::Ellipse { .. } => "ellipse",
      NodeKind::Poly { closed: true, .. } => "polygon",
      NodeKind::Poly { closed: false, .. } => "polyline",
      NodeKind::Gradient {
        shape: GradientShape::Linear,
        ..
      } => "linearGradient",
      NodeKind::Gradient {
        shape: GradientShape::Radial,
        ..
      } => "radialGradient",
      NodeKind::Gradient {
        shape: GradientShape::Sweep,
        ..
      } => "sweepGradient",
      NodeKind::Image { .. } => "image",
      NodeKind::Text { .. } => "text",
    }
  }
}

/// One arena entry
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
  pub data: NodeData,
  pub kind: NodeKind,
  pub children: Vec<NodeId>,
}

/// The whole document: arena, root, id lookup, viewport and tint
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
  nodes: Vec<SceneNode>,
  root: Option<NodeId>,
  ids: FxHashMap<String, NodeId>,
  pub width: Option<f64>,
  pub height: Option<f64>,
  pub tint_color: Option<Color32>,
  pub tint_mode: Option<BlendMode>,
}

impl SceneGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a node without attaching it to a parent
  pub fn add_node(&mut self, data: NodeData, kind: NodeKind) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    if let Some(name) = &data.id {
      self.ids.entry(name.clone()).or_insert(id);
    }
    self.nodes.push(SceneNode {
      data,
      kind,
      children: Vec::new(),
    });
    id
  }

  /// Adds the document root
  pub fn add_root(&mut self, data: NodeData) -> NodeId {
    let id = self.add_node(data, NodeKind::Root);
    self.root = Some(id);
    id
  }

  /// Adds a node as the last child of `parent`
  pub fn add_child(&mut self, parent: NodeId, data: NodeData, kind: NodeKind) -> NodeId {
    let id = self.add_node(data, kind);
    self.nodes[parent.index()].children.push(id);
    id
  }

  pub fn root(&self) -> Option<NodeId> {
    self.root
  }

  pub fn node(&self, id: NodeId) -> &SceneNode {
    &self.nodes[id.index()]
  }

  pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
    &mut self.nodes[id.index()]
  }

  /// Resolves a document id to its node
  pub fn lookup(&self, name: &str) -> Option<NodeId> {
    self.ids.get(name).copied()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}

// ============================================================================
// Stylesheet
// ============================================================================

/// One stylesheet rule: an element filter, an optional class, and the
/// attributes to apply
#[derive(Debug, Clone, Default)]
pub struct StyleRule {
  /// Element name this rule applies to; `None` matches any element
  pub element: Option<String>,
  /// Required class token; `None` makes this a fallback rule
  pub class: Option<String>,
  pub paint: PaintAttributes,
  pub text: TextAttributeSet,
}

/// An ordered list of style rules
///
/// Later rules win, which the application pass realizes by walking in
/// reverse insertion order and only filling still-unset fields.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
  rules: Vec<StyleRule>,
}

impl Stylesheet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, rule: StyleRule) {
    self.rules.push(rule);
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  fn rule_matches_tag(rule: &StyleRule, tag: &str, any: bool) -> bool {
    match &rule.element {
      Some(e) => !any && e == tag,
      None => any,
    }
  }

  /// Applies matching rules to one node's attributes
  ///
  /// Class-matched rules apply first (tagged before untagged), then the
  /// classless fallbacks, each set in reverse insertion order; every rule
  /// only fills fields the node (and earlier rules) left empty.
  pub fn apply_to(&self, data: &mut NodeData, tag: &str) {
    let tokens: Vec<&str> = data
      .style_class
      .as_deref()
      .map(|c| c.split_whitespace().collect())
      .unwrap_or_default();
    for classless in [false, true] {
      for any_tag in [false, true] {
        for rule in self.rules.iter().rev() {
          if !Self::rule_matches_tag(rule, tag, any_tag) {
            continue;
          }
          let class_ok = match (&rule.class, classless) {
            (Some(c), false) => tokens.iter().any(|t| t == c),
            (None, true) => true,
            _ => false,
          };
          if class_ok {
            data.paint.fill_unset_from(&rule.paint);
            data.text.fill_unset_from(&rule.text);
          }
        }
      }
    }
  }
}

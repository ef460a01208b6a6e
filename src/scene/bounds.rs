//! User-space bounding box computation
//!
//! Gradients with user-space units and percentage coordinates need the
//! document's dimensions. When the root declares an explicit width and
//! height those win; otherwise the graph is walked once, unioning each
//! drawable node's bounds mapped through its transform. Path bounds union
//! control points, not true curve extents, which overestimates curves.
//! Stroke widths are not included.

use crate::geometry::{Point, Rect};
use crate::path::{Path, PathVisitor};
use crate::scene::{NodeId, NodeKind, SceneGraph};

/// Bounds fallback for an empty document
pub(crate) const FALLBACK: Rect = Rect {
  x: 0.0,
  y: 0.0,
  width: 100.0,
  height: 100.0,
};

/// Computes the document's user-space bounds
///
/// Explicit root dimensions win; an empty or undrawable document falls
/// back to `(0, 0, 100, 100)`.
pub fn document_bounds(graph: &SceneGraph) -> Rect {
  if let (Some(w), Some(h)) = (graph.width, graph.height) {
    if w > 0.0 && h > 0.0 {
      return Rect::from_xywh(0.0, 0.0, w, h);
    }
  }
  graph
    .root()
    .and_then(|root| node_bounds(graph, root, &mut Vec::new()))
    .filter(|r| !r.is_empty())
    .unwrap_or(FALLBACK)
}

/// Bounds of one node's subtree, mapped through its own transform
///
/// `stack` breaks `use` cycles: a node already being measured contributes
/// nothing.
pub(crate) fn node_bounds(graph: &SceneGraph, id: NodeId, stack: &mut Vec<NodeId>) -> Option<Rect> {
  if stack.contains(&id) {
    return None;
  }
  let node = graph.node(id);
  if !node.data.display {
    return None;
  }
  stack.push(id);
  let local = match &node.kind {
    // Definitions draw nothing in place.
    NodeKind::Defs | NodeKind::Mask | NodeKind::Gradient { .. } => None,
    NodeKind::Root | NodeKind::Group => union_children(graph, id, stack),
    NodeKind::Use { href } => graph
      .lookup(href)
      .and_then(|target| node_bounds(graph, target, stack)),
    NodeKind::Path { path } => path_bounds(path),
    NodeKind::Rect {
      x,
      y,
      width,
      height,
      ..
    } => Some(Rect::from_xywh(*x, *y, *width, *height)),
    NodeKind::Ellipse { cx, cy, rx, ry } => {
      Some(Rect::from_xywh(cx - rx, cy - ry, rx * 2.0, ry * 2.0))
    }
    NodeKind::Poly { points, .. } => {
      let mut acc = BoundsAccumulator::default();
      for p in points {
        acc.include(*p);
      }
      acc.finish()
    }
    NodeKind::Image { image } => Some(Rect::from_xywh(
      image.x,
      image.y,
      image.width,
      image.height,
    )),
    // Without font metrics only the anchor points are known.
    NodeKind::Text { x, y, .. } => {
      let mut acc = BoundsAccumulator::default();
      for (&px, &py) in x.iter().zip(y.iter()) {
        acc.include(Point::new(px, py));
      }
      acc.finish()
    }
  };
  stack.pop();
  let local = local?;
  Some(match node.data.transform {
    Some(t) => t.map_rect(local),
    None => local,
  })
}

fn union_children(graph: &SceneGraph, id: NodeId, stack: &mut Vec<NodeId>) -> Option<Rect> {
  let mut acc: Option<Rect> = None;
  for &child in &graph.node(id).children {
    if let Some(b) = node_bounds(graph, child, stack) {
      acc = Some(match acc {
        Some(r) => r.union(b),
        None => b,
      });
    }
  }
  acc
}

/// Control-point bounds of a path
pub(crate) fn path_bounds(path: &Path) -> Option<Rect> {
  let mut acc = BoundsAccumulator::default();
  path.visit(&mut acc);
  acc.finish()
}

/// Path visitor that unions every coordinate it sees
#[derive(Debug, Default)]
struct BoundsAccumulator {
  bounds: Option<Rect>,
}

impl BoundsAccumulator {
  fn include(&mut self, p: Point) {
    self.bounds = Some(match self.bounds {
      Some(r) => r.include(p),
      None => Rect::from_xywh(p.x, p.y, 0.0, 0.0),
    });
  }

  fn include_rect(&mut self, r: Rect) {
    self.include(Point::new(r.x, r.y));
    self.include(Point::new(r.right(), r.bottom()));
  }

  fn finish(self) -> Option<Rect> {
    self.bounds
  }
}

impl PathVisitor for BoundsAccumulator {
  fn move_to(&mut self, p: Point) {
    self.include(p);
  }

  fn line_to(&mut self, p: Point) {
    self.include(p);
  }

  fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
    self.include(c1);
    self.include(c2);
    self.include(p);
  }

  fn cubic_to_shorthand(&mut self, c2: Point, p: Point) {
    self.include(c2);
    self.include(p);
  }

  fn quad_to(&mut self, c: Point, p: Point) {
    self.include(c);
    self.include(p);
  }

  fn quad_to_shorthand(&mut self, p: Point) {
    self.include(p);
  }

  fn close(&mut self) {}

  fn add_oval(&mut self, bounds: Rect) {
    self.include_rect(bounds);
  }

  fn arc_to_point(
    &mut self,
    end: Point,
    rx: f64,
    ry: f64,
    _rotation: f64,
    _large_arc: bool,
    _clockwise: bool,
  ) {
    // Conservative: the arc stays within the radius of its endpoint.
    self.include(Point::new(end.x - rx, end.y - ry));
    self.include(Point::new(end.x + rx, end.y + ry));
  }
}

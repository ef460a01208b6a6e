//! fastvector: a compact binary IR for 2D vector graphics
//!
//! Loading a vector document usually means parsing XML, cascading styles
//! and chasing references, every time. This crate does that work once:
//! a declarative scene graph resolves into a single contiguous opcode
//! stream plus two float arrays (a [`VectorImage`]), with paths, paints
//! and transforms deduplicated and shared by back-reference. Loading the
//! serialized form back is one buffer read, and traversal streams decoded
//! events straight into a renderer-supplied [`ImageVisitor`].
//!
//! # Pipeline
//!
//! ```text
//! SceneGraph ── resolve/build ──▶ VectorImage ──▶ .fv bytes
//!                                      │
//!                                   traverse
//!                                      ▼
//!                                 ImageVisitor (renderer, bounds, ...)
//! ```
//!
//! Source parsing, rasterization, font shaping and image decoding are
//! external collaborators; the visitor trait is the boundary.

pub mod builder;
pub mod color;
pub mod error;
pub mod file;
pub mod geometry;
pub mod image;
pub mod intern;
pub mod io;
pub mod opcode;
pub mod paint;
pub mod path;
pub mod scene;
pub mod text;
pub mod traverse;
pub mod visitor;

pub use builder::{CanonicalCollector, ImageBuilder, SceneSink};
pub use color::{BlendMode, Color32, Gradient, GradientKind, GradientStop, SpreadMethod, VectorColor};
pub use error::{DecodeError, EnvelopeError, Error, Result};
pub use geometry::{Affine, Point, Rect};
pub use image::{ImageData, VectorImage};
pub use paint::{FillRule, Paint, StrokeCap, StrokeJoin};
pub use path::{Path, PathSegment, PathVisitor};
pub use scene::resolve::{build_image, ResolveWarning};
pub use scene::{SceneGraph, Stylesheet};
pub use text::{FontStyle, FontWeight, SpanAttributes, TextAnchor, TextDecoration};
pub use traverse::traverse;
pub use visitor::{ImageVisitor, NullVisitor, PathData};

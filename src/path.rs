//! Path command codec
//!
//! Path geometry is stored as a stream of 4-bit command nybbles in the
//! child byte stream, with the float operands interleaved into the args
//! array. Two commands pack into each byte, high nybble first; command
//! indices at or above 15 escape through nybble 15 (`index - 14` follows).
//! The terminating `End` command has index 0, so a path that finishes on a
//! half-filled byte ends with a low-nybble zero and nothing else.
//!
//! [`PathWriter`] and [`parse_path`] are exact duals. [`Path`] is the
//! in-memory segment list the scene graph carries; it replays into any
//! [`PathVisitor`] and parses from an SVG `d` attribute string.

use crate::error::DecodeError;
use crate::geometry::{Point, Rect};
use crate::io::{ByteReader, ByteWriter, FloatReader, FloatSink};
use thiserror::Error;

const CMD_END: u8 = 0;
const CMD_MOVE_TO: u8 = 1;
const CMD_LINE_TO: u8 = 2;
const CMD_CUBIC_TO: u8 = 3;
const CMD_CUBIC_TO_SHORTHAND: u8 = 4;
const CMD_QUAD_TO: u8 = 5;
const CMD_QUAD_TO_SHORTHAND: u8 = 6;
const CMD_CLOSE: u8 = 7;
const CMD_CIRCLE: u8 = 8;
const CMD_ELLIPSE: u8 = 9;
const CMD_ARC_CIRC_SMALL_CCW: u8 = 10;
const CMD_ARC_CIRC_SMALL_CW: u8 = 11;
const CMD_ARC_CIRC_LARGE_CCW: u8 = 12;
const CMD_ARC_CIRC_LARGE_CW: u8 = 13;
const CMD_ARC_ELLIPSE_SMALL_CCW: u8 = 14;
const CMD_ARC_ELLIPSE_SMALL_CW: u8 = 15;
const CMD_ARC_ELLIPSE_LARGE_CCW: u8 = 16;
const CMD_ARC_ELLIPSE_LARGE_CW: u8 = 17;

const ESCAPE_NYBBLE: u8 = 15;

/// Consumer of decoded path commands
///
/// Shorthand cubic/quadratic commands are forwarded as-is; reflecting the
/// previous control point about the current endpoint is the visitor's
/// business. `rotation` on arcs is in degrees.
pub trait PathVisitor {
  fn move_to(&mut self, p: Point);
  fn line_to(&mut self, p: Point);
  fn cubic_to(&mut self, c1: Point, c2: Point, p: Point);
  fn cubic_to_shorthand(&mut self, c2: Point, p: Point);
  fn quad_to(&mut self, c: Point, p: Point);
  fn quad_to_shorthand(&mut self, p: Point);
  fn close(&mut self);
  fn add_oval(&mut self, bounds: Rect);
  fn arc_to_point(
    &mut self,
    end: Point,
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    clockwise: bool,
  );
}

/// One in-memory path segment
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
  MoveTo(Point),
  LineTo(Point),
  CubicTo(Point, Point, Point),
  CubicToShorthand(Point, Point),
  QuadTo(Point, Point),
  QuadToShorthand(Point),
  Close,
  /// Axis-aligned oval inscribed in the rectangle; a circle when the
  /// extents agree (which the codec exploits with a shorter command)
  Oval(Rect),
  ArcToPoint {
    end: Point,
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    clockwise: bool,
  },
}

/// An in-memory path: an ordered list of segments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
  pub segments: Vec<PathSegment>,
}

impl Path {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  /// Replays every segment into `visitor`
  pub fn visit<V: PathVisitor>(&self, visitor: &mut V) {
    for seg in &self.segments {
      match *seg {
        PathSegment::MoveTo(p) => visitor.move_to(p),
        PathSegment::LineTo(p) => visitor.line_to(p),
        PathSegment::CubicTo(c1, c2, p) => visitor.cubic_to(c1, c2, p),
        PathSegment::CubicToShorthand(c2, p) => visitor.cubic_to_shorthand(c2, p),
        PathSegment::QuadTo(c, p) => visitor.quad_to(c, p),
        PathSegment::QuadToShorthand(p) => visitor.quad_to_shorthand(p),
        PathSegment::Close => visitor.close(),
        PathSegment::Oval(r) => visitor.add_oval(r),
        PathSegment::ArcToPoint {
          end,
          rx,
          ry,
          rotation,
          large_arc,
          clockwise,
        } => visitor.arc_to_point(end, rx, ry, rotation, large_arc, clockwise),
      }
    }
  }
}

impl PathVisitor for Path {
  fn move_to(&mut self, p: Point) {
    self.segments.push(PathSegment::MoveTo(p));
  }

  fn line_to(&mut self, p: Point) {
    self.segments.push(PathSegment::LineTo(p));
  }

  fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
    self.segments.push(PathSegment::CubicTo(c1, c2, p));
  }

  fn cubic_to_shorthand(&mut self, c2: Point, p: Point) {
    self.segments.push(PathSegment::CubicToShorthand(c2, p));
  }

  fn quad_to(&mut self, c: Point, p: Point) {
    self.segments.push(PathSegment::QuadTo(c, p));
  }

  fn quad_to_shorthand(&mut self, p: Point) {
    self.segments.push(PathSegment::QuadToShorthand(p));
  }

  fn close(&mut self) {
    self.segments.push(PathSegment::Close);
  }

  fn add_oval(&mut self, bounds: Rect) {
    self.segments.push(PathSegment::Oval(bounds));
  }

  fn arc_to_point(
    &mut self,
    end: Point,
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    clockwise: bool,
  ) {
    self.segments.push(PathSegment::ArcToPoint {
      end,
      rx,
      ry,
      rotation,
      large_arc,
      clockwise,
    });
  }
}

// ============================================================================
// Writer
// ============================================================================

/// Nybble-packing path writer
///
/// Borrows the child byte sink and the args sink for the duration of one
/// path. Dropping the writer without calling [`PathWriter::end`] loses the
/// pending half byte; callers always terminate.
pub struct PathWriter<'a> {
  bytes: &'a mut ByteWriter,
  args: &'a mut FloatSink,
  pending: Option<u8>,
}

impl<'a> PathWriter<'a> {
  pub fn new(bytes: &'a mut ByteWriter, args: &'a mut FloatSink) -> Self {
    Self {
      bytes,
      args,
      pending: None,
    }
  }

  fn push_nybble(&mut self, nybble: u8) {
    debug_assert!(nybble < 16);
    match self.pending.take() {
      None => self.pending = Some(nybble << 4),
      Some(high) => self.bytes.write_u8(high | nybble),
    }
  }

  fn push_command(&mut self, index: u8) {
    if index >= ESCAPE_NYBBLE {
      self.push_nybble(ESCAPE_NYBBLE);
      self.push_nybble(index - 14);
    } else {
      self.push_nybble(index);
    }
  }

  fn push_args(&mut self, args: &[f64]) {
    for &a in args {
      self.args.push(a);
    }
  }

  /// Writes the path-terminating command and flushes the pending byte
  pub fn end(mut self) {
    self.push_command(CMD_END);
    if let Some(high) = self.pending.take() {
      self.bytes.write_u8(high);
    }
  }

  /// Serializes one segment
  pub fn write_segment(&mut self, seg: &PathSegment) {
    match *seg {
      PathSegment::MoveTo(p) => {
        self.push_command(CMD_MOVE_TO);
        self.push_args(&[p.x, p.y]);
      }
      PathSegment::LineTo(p) => {
        self.push_command(CMD_LINE_TO);
        self.push_args(&[p.x, p.y]);
      }
      PathSegment::CubicTo(c1, c2, p) => {
        self.push_command(CMD_CUBIC_TO);
        self.push_args(&[c1.x, c1.y, c2.x, c2.y, p.x, p.y]);
      }
      PathSegment::CubicToShorthand(c2, p) => {
        self.push_command(CMD_CUBIC_TO_SHORTHAND);
        self.push_args(&[c2.x, c2.y, p.x, p.y]);
      }
      PathSegment::QuadTo(c, p) => {
        self.push_command(CMD_QUAD_TO);
        self.push_args(&[c.x, c.y, p.x, p.y]);
      }
      PathSegment::QuadToShorthand(p) => {
        self.push_command(CMD_QUAD_TO_SHORTHAND);
        self.push_args(&[p.x, p.y]);
      }
      PathSegment::Close => self.push_command(CMD_CLOSE),
      PathSegment::Oval(r) => {
        if r.width == r.height {
          self.push_command(CMD_CIRCLE);
          self.push_args(&[r.x, r.y, r.width]);
        } else {
          self.push_command(CMD_ELLIPSE);
          self.push_args(&[r.x, r.y, r.width, r.height]);
        }
      }
      PathSegment::ArcToPoint {
        end,
        rx,
        ry,
        rotation,
        large_arc,
        clockwise,
      } => {
        let circular = rx == ry && rotation == 0.0;
        let cmd = match (circular, large_arc, clockwise) {
          (true, false, false) => CMD_ARC_CIRC_SMALL_CCW,
          (true, false, true) => CMD_ARC_CIRC_SMALL_CW,
          (true, true, false) => CMD_ARC_CIRC_LARGE_CCW,
          (true, true, true) => CMD_ARC_CIRC_LARGE_CW,
          (false, false, false) => CMD_ARC_ELLIPSE_SMALL_CCW,
          (false, false, true) => CMD_ARC_ELLIPSE_SMALL_CW,
          (false, true, false) => CMD_ARC_ELLIPSE_LARGE_CCW,
          (false, true, true) => CMD_ARC_ELLIPSE_LARGE_CW,
        };
        self.push_command(cmd);
        if circular {
          self.push_args(&[end.x, end.y, rx]);
        } else {
          self.push_args(&[end.x, end.y, rx, ry, rotation]);
        }
      }
    }
  }
}

/// Serializes a whole path, including the terminator
pub fn write_path(path: &Path, bytes: &mut ByteWriter, args: &mut FloatSink) {
  let mut w = PathWriter::new(bytes, args);
  for seg in &path.segments {
    w.write_segment(seg);
  }
  w.end();
}

// ============================================================================
// Parser
// ============================================================================

struct NybbleReader<'a, 'b> {
  bytes: &'b mut ByteReader<'a>,
  pending_low: Option<u8>,
}

impl<'a, 'b> NybbleReader<'a, 'b> {
  fn next(&mut self) -> Result<u8, DecodeError> {
    if let Some(low) = self.pending_low.take() {
      return Ok(low);
    }
    let byte = self.bytes.read_u8()?;
    self.pending_low = Some(byte & 0x0f);
    Ok(byte >> 4)
  }
}

/// Decodes one path from the byte and float streams, driving `visitor`
///
/// Consumes up to and including the terminating command's byte; the low
/// nybble of a byte whose high nybble terminated the path is discarded.
pub fn parse_path<V: PathVisitor>(
  bytes: &mut ByteReader<'_>,
  args: &mut FloatReader<'_>,
  visitor: &mut V,
) -> Result<(), DecodeError> {
  let mut nybbles = NybbleReader {
    bytes,
    pending_low: None,
  };
  loop {
    let n = nybbles.next()?;
    let cmd = if n == ESCAPE_NYBBLE {
      nybbles.next()? + 14
    } else {
      n
    };
    match cmd {
      CMD_END => return Ok(()),
      CMD_MOVE_TO => {
        let p = read_point(args)?;
        visitor.move_to(p);
      }
      CMD_LINE_TO => {
        let p = read_point(args)?;
        visitor.line_to(p);
      }
      CMD_CUBIC_TO => {
        let c1 = read_point(args)?;
        let c2 = read_point(args)?;
        let p = read_point(args)?;
        visitor.cubic_to(c1, c2, p);
      }
      CMD_CUBIC_TO_SHORTHAND => {
        let c2 = read_point(args)?;
        let p = read_point(args)?;
        visitor.cubic_to_shorthand(c2, p);
      }
      CMD_QUAD_TO => {
        let c = read_point(args)?;
        let p = read_point(args)?;
        visitor.quad_to(c, p);
      }
      CMD_QUAD_TO_SHORTHAND => {
        let p = read_point(args)?;
        visitor.quad_to_shorthand(p);
      }
      CMD_CLOSE => visitor.close(),
      CMD_CIRCLE => {
        let x = args.next()?;
        let y = args.next()?;
        let d = args.next()?;
        visitor.add_oval(Rect::from_xywh(x, y, d, d));
      }
      CMD_ELLIPSE => {
        let x = args.next()?;
        let y = args.next()?;
        let w = args.next()?;
        let h = args.next()?;
        visitor.add_oval(Rect::from_xywh(x, y, w, h));
      }
      CMD_ARC_CIRC_SMALL_CCW..=CMD_ARC_CIRC_LARGE_CW => {
        let end = read_point(args)?;
        let r = args.next()?;
        let large_arc = cmd >= CMD_ARC_CIRC_LARGE_CCW;
        let clockwise = cmd & 1 == 1;
        visitor.arc_to_point(end, r, r, 0.0, large_arc, clockwise);
      }
      CMD_ARC_ELLIPSE_SMALL_CCW..=CMD_ARC_ELLIPSE_LARGE_CW => {
        let end = read_point(args)?;
        let rx = args.next()?;
        let ry = args.next()?;
        let rotation = args.next()?;
        let large_arc = cmd >= CMD_ARC_ELLIPSE_LARGE_CCW;
        let clockwise = cmd & 1 == 1;
        visitor.arc_to_point(end, rx, ry, rotation, large_arc, clockwise);
      }
      other => {
        return Err(DecodeError::BadEnumValue {
          what: "path command",
          value: other,
        })
      }
    }
  }
}

fn read_point(args: &mut FloatReader<'_>) -> Result<Point, DecodeError> {
  let x = args.next()?;
  let y = args.next()?;
  Ok(Point::new(x, y))
}

// ============================================================================
// SVG path data parsing
// ============================================================================

/// Error parsing an SVG `d` attribute string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed path data at byte {at}")]
pub struct PathStringError {
  pub at: usize,
}

struct DParser<'a> {
  input: &'a [u8],
  pos: usize,
}

impl<'a> DParser<'a> {
  fn skip_separators(&mut self) {
    while let Some(&b) = self.input.get(self.pos) {
      if b == b',' || b.is_ascii_whitespace() {
        self.pos += 1;
      } else {
        break;
      }
    }
  }

  fn peek_command(&mut self) -> Option<u8> {
    self.skip_separators();
    self.input.get(self.pos).copied().filter(|b| b.is_ascii_alphabetic())
  }

  fn number(&mut self) -> Result<f64, PathStringError> {
    self.skip_separators();
    let start = self.pos;
    let bytes = self.input;
    let mut p = self.pos;
    if matches!(bytes.get(p), Some(b'+') | Some(b'-')) {
      p += 1;
    }
    while matches!(bytes.get(p), Some(b'0'..=b'9')) {
      p += 1;
    }
    if matches!(bytes.get(p), Some(b'.')) {
      p += 1;
      while matches!(bytes.get(p), Some(b'0'..=b'9')) {
        p += 1;
      }
    }
    if matches!(bytes.get(p), Some(b'e') | Some(b'E')) {
      let mut q = p + 1;
      if matches!(bytes.get(q), Some(b'+') | Some(b'-')) {
        q += 1;
      }
      if matches!(bytes.get(q), Some(b'0'..=b'9')) {
        p = q;
        while matches!(bytes.get(p), Some(b'0'..=b'9')) {
          p += 1;
        }
      }
    }
    let text = std::str::from_utf8(&bytes[start..p]).map_err(|_| PathStringError { at: start })?;
    let value: f64 = text.parse().map_err(|_| PathStringError { at: start })?;
    if !value.is_finite() {
      return Err(PathStringError { at: start });
    }
    self.pos = p;
    Ok(value)
  }

  fn flag(&mut self) -> Result<bool, PathStringError> {
    self.skip_separators();
    match self.input.get(self.pos) {
      Some(b'0') => {
        self.pos += 1;
        Ok(false)
      }
      Some(b'1') => {
        self.pos += 1;
        Ok(true)
      }
      _ => Err(PathStringError { at: self.pos }),
    }
  }

  fn has_more_arguments(&mut self) -> bool {
    self.skip_separators();
    matches!(
      self.input.get(self.pos),
      Some(b'0'..=b'9') | Some(b'+') | Some(b'-') | Some(b'.')
    )
  }
}

impl Path {
  /// Parses an SVG path data string (`M/L/H/V/C/S/Q/T/A/Z`, absolute and
  /// relative)
  ///
  /// Horizontal/vertical lines lower to `LineTo`; relative coordinates
  /// resolve against the running current point; smooth commands become the
  /// shorthand segments. Repeated coordinate groups after a `moveto`
  /// continue as implicit `lineto`s per the SVG grammar.
  pub fn parse(d: &str) -> Result<Path, PathStringError> {
    let mut parser = DParser {
      input: d.as_bytes(),
      pos: 0,
    };
    let mut path = Path::new();
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    while let Some(cmd) = parser.peek_command() {
      parser.pos += 1;
      let relative = cmd.is_ascii_lowercase();
      let offset = |relative: bool, base: Point, x: f64, y: f64| {
        if relative {
          Point::new(base.x + x, base.y + y)
        } else {
          Point::new(x, y)
        }
      };
      match cmd.to_ascii_uppercase() {
        b'M' => {
          let mut first = true;
          loop {
            let x = parser.number()?;
            let y = parser.number()?;
            let p = offset(relative, current, x, y);
            if first {
              path.move_to(p);
              subpath_start = p;
              first = false;
            } else {
              path.line_to(p);
            }
            current = p;
            if !parser.has_more_arguments() {
              break;
            }
          }
        }
        b'L' => loop {
          let x = parser.number()?;
          let y = parser.number()?;
          current = offset(relative, current, x, y);
          path.line_to(current);
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'H' => loop {
          let x = parser.number()?;
          current = if relative {
            Point::new(current.x + x, current.y)
          } else {
            Point::new(x, current.y)
          };
          path.line_to(current);
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'V' => loop {
          let y = parser.number()?;
          current = if relative {
            Point::new(current.x, current.y + y)
          } else {
            Point::new(current.x, y)
          };
          path.line_to(current);
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'C' => loop {
          let c1 = offset(relative, current, parser.number()?, parser.number()?);
          let c2 = offset(relative, current, parser.number()?, parser.number()?);
          let p = offset(relative, current, parser.number()?, parser.number()?);
          path.cubic_to(c1, c2, p);
          current = p;
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'S' => loop {
          let c2 = offset(relative, current, parser.number()?, parser.number()?);
          let p = offset(relative, current, parser.number()?, parser.number()?);
          path.cubic_to_shorthand(c2, p);
          current = p;
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'Q' => loop {
          let c = offset(relative, current, parser.number()?, parser.number()?);
          let p = offset(relative, current, parser.number()?, parser.number()?);
          path.quad_to(c, p);
          current = p;
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'T' => loop {
          let p = offset(relative, current, parser.number()?, parser.number()?);
          path.quad_to_shorthand(p);
          current = p;
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'A' => loop {
          let rx = parser.number()?;
          let ry = parser.number()?;
          let rotation = parser.number()?;
          let large_arc = parser.flag()?;
          let sweep = parser.flag()?;
          let p = offset(relative, current, parser.number()?, parser.number()?);
          path.arc_to_point(p, rx.abs(), ry.abs(), rotation, large_arc, sweep);
          current = p;
          if !parser.has_more_arguments() {
            break;
          }
        },
        b'Z' => {
          path.close();
          current = subpath_start;
        }
        _ => return Err(PathStringError { at: parser.pos - 1 }),
      }
    }
    Ok(path)
  }
}

//! Colors, gradients and their wire encoding
//!
//! A color slot in the IR is one of four kinds, identified by a 2-bit type
//! code carried in the opcode (or, for gradient stops, a type byte in the
//! child stream): an explicit ARGB word, the absence of paint, the ambient
//! `currentColor`, or an inline gradient tree. Gradient stops may carry any
//! of the first three; a stop that claims to be a gradient itself is
//! malformed.

use crate::error::DecodeError;
use crate::geometry::Affine;
use crate::io::{ByteReader, ByteWriter, FloatReader, FloatSink};
use crate::opcode::ColorTypeCode;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

// Gradient header byte layout.
const GRAD_KIND_MASK: u8 = 0b11;
const GRAD_OBJECT_BOUNDING_BOX: u8 = 1 << 2;
const GRAD_SPREAD_SHIFT: u8 = 3;
const GRAD_SPREAD_MASK: u8 = 0b11;
const GRAD_HAS_TRANSFORM: u8 = 1 << 5;
const GRAD_HAS_TRANSFORM_NUMBER: u8 = 1 << 6;

/// A packed non-premultiplied ARGB color
///
/// # Examples
///
/// ```
/// use fastvector::Color32;
///
/// let red = Color32::from_argb(0xff, 0xff, 0x00, 0x00);
/// assert_eq!(red.argb(), 0xffff0000);
/// assert_eq!(red.alpha(), 0xff);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color32(pub u32);

impl Color32 {
  pub const BLACK: Self = Self(0xff00_0000);
  pub const WHITE: Self = Self(0xffff_ffff);
  pub const TRANSPARENT: Self = Self(0);

  pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
    Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
  }

  /// Opaque color from rgb channels
  pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
    Self::from_argb(0xff, r, g, b)
  }

  pub const fn argb(self) -> u32 {
    self.0
  }

  pub const fn alpha(self) -> u8 {
    (self.0 >> 24) as u8
  }

  pub const fn red(self) -> u8 {
    (self.0 >> 16) as u8
  }

  pub const fn green(self) -> u8 {
    (self.0 >> 8) as u8
  }

  pub const fn blue(self) -> u8 {
    self.0 as u8
  }

  /// Scales the alpha channel by `opacity` in `[0, 1]`
  pub fn with_opacity(self, opacity: f64) -> Self {
    let a = (f64::from(self.alpha()) * opacity.clamp(0.0, 1.0)).round() as u8;
    Self((self.0 & 0x00ff_ffff) | (u32::from(a) << 24))
  }

  /// True for pure gray channels at full alpha
  pub fn is_opaque_gray(self) -> bool {
    self.alpha() == 0xff && self.red() == self.green() && self.green() == self.blue()
  }
}

impl fmt::Debug for Color32 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Color32({:#010x})", self.0)
  }
}

/// Blend and composite modes
///
/// The discriminants are the wire indices; new modes append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BlendMode {
  #[default]
  Normal = 0,
  Multiply = 1,
  Screen = 2,
  Overlay = 3,
  Darken = 4,
  Lighten = 5,
  ColorDodge = 6,
  ColorBurn = 7,
  HardLight = 8,
  SoftLight = 9,
  Difference = 10,
  Exclusion = 11,
  Hue = 12,
  Saturation = 13,
  Color = 14,
  Luminosity = 15,
  SrcIn = 16,
  SrcAtop = 17,
  SrcOver = 18,
}

impl BlendMode {
  pub fn to_u8(self) -> u8 {
    self as u8
  }

  pub fn from_u8(v: u8) -> Result<Self, DecodeError> {
    use BlendMode::*;
    Ok(match v {
      0 => Normal,
      1 => Multiply,
      2 => Screen,
      3 => Overlay,
      4 => Darken,
      5 => Lighten,
      6 => ColorDodge,
      7 => ColorBurn,
      8 => HardLight,
      9 => SoftLight,
      10 => Difference,
      11 => Exclusion,
      12 => Hue,
      13 => Saturation,
      14 => Color,
      15 => Luminosity,
      16 => SrcIn,
      17 => SrcAtop,
      18 => SrcOver,
      other => {
        return Err(DecodeError::BadEnumValue {
          what: "blend mode",
          value: other,
        })
      }
    })
  }
}

/// How a gradient repeats outside its stop range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SpreadMethod {
  #[default]
  Pad = 0,
  Reflect = 1,
  Repeat = 2,
}

impl SpreadMethod {
  fn from_bits(bits: u8) -> Result<Self, DecodeError> {
    Ok(match bits {
      0 => SpreadMethod::Pad,
      1 => SpreadMethod::Reflect,
      2 => SpreadMethod::Repeat,
      other => {
        return Err(DecodeError::BadEnumValue {
          what: "spread method",
          value: other,
        })
      }
    })
  }
}

/// Geometry of a gradient, by kind
///
/// Kind codes on the wire: 0 linear, 1 radial, 2 sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientKind {
  Linear {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
  },
  Radial {
    cx: f64,
    cy: f64,
    fx: f64,
    fy: f64,
    r: f64,
  },
  Sweep {
    cx: f64,
    cy: f64,
    start_angle: f64,
    end_angle: f64,
  },
}

impl GradientKind {
  fn code(&self) -> u8 {
    match self {
      GradientKind::Linear { .. } => 0,
      GradientKind::Radial { .. } => 1,
      GradientKind::Sweep { .. } => 2,
    }
  }
}

/// One gradient stop: an offset and a non-gradient color
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
  pub offset: f64,
  pub color: VectorColor,
}

/// A linear, radial or sweep gradient with stops
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
  pub kind: GradientKind,
  /// When true, geometry coordinates are fractions of the painted
  /// object's bounding box rather than user-space units
  pub object_bounding_box: bool,
  pub spread: SpreadMethod,
  pub transform: Option<Affine>,
  pub stops: SmallVec<[GradientStop; 4]>,
}

/// A color slot value
#[derive(Debug, Clone, PartialEq)]
pub enum VectorColor {
  /// Explicit ARGB color
  Argb(Color32),
  /// Nothing is painted on this slot
  None,
  /// Resolved from the ambient current color at render time
  CurrentColor,
  /// An inline gradient
  Gradient(Box<Gradient>),
}

impl VectorColor {
  pub fn type_code(&self) -> ColorTypeCode {
    match self {
      VectorColor::Argb(_) => ColorTypeCode::Argb,
      VectorColor::None => ColorTypeCode::None,
      VectorColor::CurrentColor => ColorTypeCode::CurrentColor,
      VectorColor::Gradient(_) => ColorTypeCode::Gradient,
    }
  }

  pub fn is_none(&self) -> bool {
    matches!(self, VectorColor::None)
  }

  /// Folds this color's identity into a structural hash key
  pub(crate) fn key_into(&self, out: &mut Vec<u64>) {
    match self {
      VectorColor::Argb(c) => {
        out.push(0);
        out.push(u64::from(c.argb()));
      }
      VectorColor::None => out.push(1),
      VectorColor::CurrentColor => out.push(2),
      VectorColor::Gradient(g) => {
        out.push(3);
        out.push(u64::from(g.kind.code()));
        out.push(u64::from(g.object_bounding_box));
        out.push(g.spread as u64);
        match g.transform {
          None => out.push(0),
          Some(t) => {
            out.push(1);
            for c in t.components() {
              out.push(c.to_bits());
            }
          }
        }
        out.push(g.stops.len() as u64);
        for stop in &g.stops {
          out.push(stop.offset.to_bits());
          stop.color.key_into(out);
        }
        for v in gradient_geometry(&g.kind) {
          out.push(v.to_bits());
        }
      }
    }
  }
}

fn gradient_geometry(kind: &GradientKind) -> SmallVec<[f64; 5]> {
  match *kind {
    GradientKind::Linear { x1, y1, x2, y2 } => SmallVec::from_slice(&[x1, y1, x2, y2]),
    GradientKind::Radial { cx, cy, fx, fy, r } => SmallVec::from_slice(&[cx, cy, fx, fy, r]),
    GradientKind::Sweep {
      cx,
      cy,
      start_angle,
      end_angle,
    } => SmallVec::from_slice(&[cx, cy, start_angle, end_angle]),
  }
}

// ============================================================================
// Wire codec
// ============================================================================

/// Write-side sinks shared by the color, paint and opcode encoders
pub(crate) struct EncodeSinks<'a> {
  pub children: &'a mut ByteWriter,
  pub args: &'a mut FloatSink,
  pub transforms: &'a mut FloatSink,
  /// Dedup table from transform component bits to transform number
  pub transform_numbers: &'a mut FxHashMap<[u64; 6], u32>,
}

impl EncodeSinks<'_> {
  fn transform_bits(t: &Affine) -> [u64; 6] {
    let c = t.components();
    [
      c[0].to_bits(),
      c[1].to_bits(),
      c[2].to_bits(),
      c[3].to_bits(),
      c[4].to_bits(),
      c[5].to_bits(),
    ]
  }

  /// Looks the transform up without serializing anything
  pub fn transform_number(&self, t: &Affine) -> Option<u32> {
    self.transform_numbers.get(&Self::transform_bits(t)).copied()
  }

  /// Appends the transform inline, allocating the next transform number
  pub fn push_inline_transform(&mut self, t: &Affine) {
    let number = (self.transforms.len() / 6) as u32;
    for c in t.components() {
      self.transforms.push(c);
    }
    self.transform_numbers.insert(Self::transform_bits(t), number);
  }
}

/// Read-side cursors shared by the color, paint and opcode decoders
pub(crate) struct DecodeCursors<'r, 'a> {
  pub children: &'r mut ByteReader<'a>,
  pub args: &'r mut FloatReader<'a>,
  /// Forward cursor over the transforms array; inline transforms consume
  /// six floats here and allocate the next transform number
  pub transforms: &'r mut FloatReader<'a>,
}

impl DecodeCursors<'_, '_> {
  /// Reads an inline transform at the forward transforms cursor
  pub fn read_inline_transform(&mut self) -> Result<Affine, DecodeError> {
    let at = self.transforms.position();
    let affine = self.transforms.affine_at(at)?;
    self.transforms.seek(at + 6);
    Ok(affine)
  }

  /// Resolves a transform number against the transforms decoded so far
  pub fn transform_by_number(&self, number: u32) -> Result<Affine, DecodeError> {
    let seen = self.transforms.position() / 6;
    let index = number as usize;
    if index >= seen {
      return Err(DecodeError::BadBackReference {
        index,
        count: seen,
      });
    }
    self.transforms.affine_at(index * 6)
  }
}

/// Serializes a color payload; the type code travels separately
///
/// Panics if a gradient stop itself holds a gradient; the resolver never
/// produces one and the wire format cannot carry it.
pub(crate) fn write_color(color: &VectorColor, sinks: &mut EncodeSinks<'_>) {
  match color {
    VectorColor::Argb(c) => sinks.children.write_u32(c.argb()),
    VectorColor::None | VectorColor::CurrentColor => {}
    VectorColor::Gradient(g) => write_gradient(g, sinks),
  }
}

fn write_gradient(g: &Gradient, sinks: &mut EncodeSinks<'_>) {
  let mut header = g.kind.code();
  if g.object_bounding_box {
    header |= GRAD_OBJECT_BOUNDING_BOX;
  }
  header |= (g.spread as u8) << GRAD_SPREAD_SHIFT;
  let transform_number = g.transform.as_ref().and_then(|t| sinks.transform_number(t));
  if let Some(t) = &g.transform {
    if transform_number.is_some() {
      header |= GRAD_HAS_TRANSFORM_NUMBER;
    } else {
      header |= GRAD_HAS_TRANSFORM;
    }
    sinks.children.write_u8(header);
    match transform_number {
      Some(n) => sinks.children.write_smallish(n),
      None => sinks.push_inline_transform(t),
    }
  } else {
    sinks.children.write_u8(header);
  }

  sinks.children.write_smallish(g.stops.len() as u32);
  for stop in &g.stops {
    sinks.args.push(stop.offset);
  }
  for stop in &g.stops {
    let code = stop.color.type_code();
    assert!(
      code != crate::opcode::ColorTypeCode::Gradient,
      "gradient stop colors may not themselves be gradients"
    );
    sinks.children.write_u8(code as u8);
    write_color(&stop.color, sinks);
  }
  for v in gradient_geometry(&g.kind) {
    sinks.args.push(v);
  }
}

/// Decodes a color payload for a known type code
pub(crate) fn read_color(
  code: ColorTypeCode,
  cursors: &mut DecodeCursors<'_, '_>,
) -> Result<VectorColor, DecodeError> {
  Ok(match code {
    ColorTypeCode::Argb => VectorColor::Argb(Color32(cursors.children.read_u32()?)),
    ColorTypeCode::None => VectorColor::None,
    ColorTypeCode::CurrentColor => VectorColor::CurrentColor,
    ColorTypeCode::Gradient => VectorColor::Gradient(Box::new(read_gradient(cursors)?)),
  })
}

fn read_gradient(cursors: &mut DecodeCursors<'_, '_>) -> Result<Gradient, DecodeError> {
  let header = cursors.children.read_u8()?;
  let kind_code = header & GRAD_KIND_MASK;
  let object_bounding_box = header & GRAD_OBJECT_BOUNDING_BOX != 0;
  let spread = SpreadMethod::from_bits((header >> GRAD_SPREAD_SHIFT) & GRAD_SPREAD_MASK)?;

  let transform = if header & GRAD_HAS_TRANSFORM_NUMBER != 0 {
    let n = cursors.children.read_smallish()?;
    Some(cursors.transform_by_number(n)?)
  } else if header & GRAD_HAS_TRANSFORM != 0 {
    Some(cursors.read_inline_transform()?)
  } else {
    None
  };

  let stop_count = cursors.children.read_smallish()? as usize;
  let mut offsets: SmallVec<[f64; 4]> = SmallVec::with_capacity(stop_count);
  for _ in 0..stop_count {
    offsets.push(cursors.args.next()?);
  }
  let mut stops: SmallVec<[GradientStop; 4]> = SmallVec::with_capacity(stop_count);
  for offset in offsets {
    let code = ColorTypeCode::from_bits(cursors.children.read_u8()?);
    if code == ColorTypeCode::Gradient {
      return Err(DecodeError::BadGradientStopColor);
    }
    let color = read_color(code, cursors)?;
    stops.push(GradientStop { offset, color });
  }

  let kind = match kind_code {
    0 => GradientKind::Linear {
      x1: cursors.args.next()?,
      y1: cursors.args.next()?,
      x2: cursors.args.next()?,
      y2: cursors.args.next()?,
    },
    1 => GradientKind::Radial {
      cx: cursors.args.next()?,
      cy: cursors.args.next()?,
      fx: cursors.args.next()?,
      fy: cursors.args.next()?,
      r: cursors.args.next()?,
    },
    2 => GradientKind::Sweep {
      cx: cursors.args.next()?,
      cy: cursors.args.next()?,
      start_angle: cursors.args.next()?,
      end_angle: cursors.args.next()?,
    },
    other => {
      return Err(DecodeError::BadEnumValue {
        what: "gradient kind",
        value: other,
      })
    }
  };

  Ok(Gradient {
    kind,
    object_bounding_box,
    spread,
    transform,
    stops,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::io::FloatArray;
  use smallvec::smallvec;

  fn encode(color: &VectorColor) -> (Vec<u8>, FloatArray, FloatArray) {
    let mut children = ByteWriter::new();
    let mut args = FloatSink::new(true);
    let mut transforms = FloatSink::new(true);
    let mut numbers = FxHashMap::default();
    let mut sinks = EncodeSinks {
      children: &mut children,
      args: &mut args,
      transforms: &mut transforms,
      transform_numbers: &mut numbers,
    };
    write_color(color, &mut sinks);
    (
      children.into_bytes(),
      args.into_array(),
      transforms.into_array(),
    )
  }

  fn decode(code: ColorTypeCode, bytes: &[u8], args: &FloatArray, transforms: &FloatArray) -> VectorColor {
    let mut children = ByteReader::new(bytes);
    let mut args_r = FloatReader::new(args);
    let mut transforms_r = FloatReader::new(transforms);
    // Inline transforms in the encoded form are "seen" for back-reference
    // purposes, mirroring a traversal that decoded them in stream order.
    let mut cursors = DecodeCursors {
      children: &mut children,
      args: &mut args_r,
      transforms: &mut transforms_r,
    };
    let color = read_color(code, &mut cursors).unwrap();
    assert!(children.is_eof());
    assert!(args_r.is_eof());
    color
  }

  fn black_to_white_stops() -> SmallVec<[GradientStop; 4]> {
    smallvec![
      GradientStop {
        offset: 0.0,
        color: VectorColor::Argb(Color32::BLACK),
      },
      GradientStop {
        offset: 1.0,
        color: VectorColor::Argb(Color32::WHITE),
      },
    ]
  }

  #[test]
  fn argb_payload_is_a_little_endian_word() {
    let (bytes, args, _) = encode(&VectorColor::Argb(Color32(0xffff0000)));
    assert_eq!(bytes, 0xffff0000u32.to_le_bytes().to_vec());
    assert!(args.is_empty());
  }

  #[test]
  fn none_and_current_color_have_no_payload() {
    assert!(encode(&VectorColor::None).0.is_empty());
    assert!(encode(&VectorColor::CurrentColor).0.is_empty());
  }

  #[test]
  fn linear_gradient_header_matches_wire_layout() {
    let g = Gradient {
      kind: GradientKind::Linear {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 0.0,
      },
      object_bounding_box: true,
      spread: SpreadMethod::Pad,
      transform: None,
      stops: black_to_white_stops(),
    };
    let color = VectorColor::Gradient(Box::new(g));
    let (bytes, args, transforms) = encode(&color);
    assert_eq!(bytes[0], 0b0000_0100);
    assert_eq!(bytes[1], 0x02);
    // Stop type bytes and argb payloads follow.
    assert_eq!(bytes[2], 0);
    assert_eq!(&bytes[3..7], &0xff000000u32.to_le_bytes());
    assert_eq!(bytes[7], 0);
    assert_eq!(&bytes[8..12], &0xffffffffu32.to_le_bytes());
    // Args: offsets then geometry.
    assert_eq!(args.len(), 6);
    assert_eq!(args.get(0), Some(0.0));
    assert_eq!(args.get(1), Some(1.0));
    assert_eq!(decode(ColorTypeCode::Gradient, &bytes, &args, &transforms), color);
  }

  #[test]
  fn radial_and_sweep_round_trip() {
    for kind in [
      GradientKind::Radial {
        cx: 0.5,
        cy: 0.5,
        fx: 0.25,
        fy: 0.25,
        r: 2.0,
      },
      GradientKind::Sweep {
        cx: 1.0,
        cy: 1.0,
        start_angle: 0.0,
        end_angle: 180.0,
      },
    ] {
      let color = VectorColor::Gradient(Box::new(Gradient {
        kind,
        object_bounding_box: false,
        spread: SpreadMethod::Reflect,
        transform: Some(Affine::translate(2.0, 3.0)),
        stops: black_to_white_stops(),
      }));
      let (bytes, args, transforms) = encode(&color);
      assert_eq!(transforms.len(), 6, "inline transform serialized");
      assert_eq!(decode(ColorTypeCode::Gradient, &bytes, &args, &transforms), color);
    }
  }

  #[test]
  fn gradient_stop_claiming_gradient_is_rejected() {
    // Hand-build a gradient whose single stop carries type code 3.
    let mut children = ByteWriter::new();
    children.write_u8(0); // linear, no flags
    children.write_smallish(1);
    children.write_u8(ColorTypeCode::Gradient as u8);
    let bytes = children.into_bytes();
    let args = FloatArray::F64(vec![0.0]);
    let transforms = FloatArray::F64(vec![]);
    let mut br = ByteReader::new(&bytes);
    let mut ar = FloatReader::new(&args);
    let mut tr = FloatReader::new(&transforms);
    let mut cursors = DecodeCursors {
      children: &mut br,
      args: &mut ar,
      transforms: &mut tr,
    };
    assert_eq!(
      read_color(ColorTypeCode::Gradient, &mut cursors),
      Err(DecodeError::BadGradientStopColor)
    );
  }

  #[test]
  fn blend_modes_round_trip_through_wire_index() {
    for i in 0..=18u8 {
      assert_eq!(BlendMode::from_u8(i).unwrap().to_u8(), i);
    }
    assert!(BlendMode::from_u8(19).is_err());
  }

  #[test]
  fn opacity_scales_alpha_only() {
    let c = Color32::from_argb(0x80, 0x10, 0x20, 0x30).with_opacity(0.5);
    assert_eq!(c.red(), 0x10);
    assert_eq!(c.alpha(), 0x40);
  }

  #[test]
  fn gray_detection_requires_full_alpha() {
    assert!(Color32::from_rgb(0x80, 0x80, 0x80).is_opaque_gray());
    assert!(!Color32::from_argb(0x7f, 0x80, 0x80, 0x80).is_opaque_gray());
    assert!(!Color32::from_rgb(0x80, 0x81, 0x80).is_opaque_gray());
  }
}

//! Paints and their wire encoding
//!
//! A paint bundles the fill and stroke state of one drawn element. On the
//! wire it is a header byte describing which optional fields follow (and
//! the enum-valued stroke properties), an optional dash byte, the two
//! color payloads, and the scalar fields pushed onto the args array. The
//! fill/stroke color *types* are not part of the paint body; they ride in
//! the opcode's flag bits.

use crate::color::{read_color, write_color, DecodeCursors, EncodeSinks, VectorColor};
use crate::error::DecodeError;
use crate::opcode::ColorTypeCode;
use smallvec::SmallVec;

const PAINT_HAS_STROKE_WIDTH: u8 = 1 << 0;
const PAINT_HAS_MITER_LIMIT: u8 = 1 << 1;
const PAINT_JOIN_SHIFT: u8 = 2;
const PAINT_CAP_SHIFT: u8 = 4;
const PAINT_ENUM_MASK: u8 = 0b11;
const PAINT_EVEN_ODD: u8 = 1 << 6;
const PAINT_HAS_DASH: u8 = 1 << 7;

const DASH_HAS_OFFSET: u8 = 1 << 0;

/// Join style where stroked segments meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StrokeJoin {
  #[default]
  Miter = 0,
  Round = 1,
  Bevel = 2,
}

/// Cap style at the open ends of stroked subpaths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StrokeCap {
  #[default]
  Butt = 0,
  Round = 1,
  Square = 2,
}

/// Interior test for filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FillRule {
  #[default]
  NonZero = 0,
  EvenOdd = 1,
}

/// Fill and stroke state for one element
///
/// Defaults match the renderer-facing conventions: stroke width 1, miter
/// limit 4, miter join, butt cap, non-zero fill rule. Optional scalar
/// fields are only serialized when present.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
  pub fill: VectorColor,
  pub stroke: VectorColor,
  pub stroke_width: Option<f64>,
  pub stroke_miter_limit: Option<f64>,
  pub stroke_join: StrokeJoin,
  pub stroke_cap: StrokeCap,
  pub fill_rule: FillRule,
  pub dash_array: Option<SmallVec<[f64; 4]>>,
  pub dash_offset: Option<f64>,
}

impl Default for Paint {
  fn default() -> Self {
    Self {
      fill: VectorColor::Argb(crate::color::Color32::BLACK),
      stroke: VectorColor::None,
      stroke_width: None,
      stroke_miter_limit: None,
      stroke_join: StrokeJoin::Miter,
      stroke_cap: StrokeCap::Butt,
      fill_rule: FillRule::NonZero,
      dash_array: None,
      dash_offset: None,
    }
  }
}

impl Paint {
  /// Effective stroke width, defaulted
  pub fn stroke_width_or_default(&self) -> f64 {
    self.stroke_width.unwrap_or(1.0)
  }

  /// Effective miter limit, defaulted
  pub fn miter_limit_or_default(&self) -> f64 {
    self.stroke_miter_limit.unwrap_or(4.0)
  }

  /// Folds the paint's identity into a structural hash key
  pub(crate) fn key(&self) -> Vec<u64> {
    let mut out = Vec::with_capacity(16);
    self.fill.key_into(&mut out);
    self.stroke.key_into(&mut out);
    out.push(match self.stroke_width {
      None => u64::MAX,
      Some(w) => w.to_bits(),
    });
    out.push(match self.stroke_miter_limit {
      None => u64::MAX,
      Some(m) => m.to_bits(),
    });
    out.push(
      u64::from(self.stroke_join as u8)
        | (u64::from(self.stroke_cap as u8) << 8)
        | (u64::from(self.fill_rule as u8) << 16),
    );
    match &self.dash_array {
      None => out.push(u64::MAX),
      Some(dashes) => {
        out.push(dashes.len() as u64);
        for d in dashes {
          out.push(d.to_bits());
        }
      }
    }
    out.push(match self.dash_offset {
      None => u64::MAX,
      Some(o) => o.to_bits(),
    });
    out
  }
}

/// Serializes a paint body (header, dash byte, colors, scalars)
pub(crate) fn write_paint(paint: &Paint, sinks: &mut EncodeSinks<'_>) {
  let mut header = 0u8;
  if paint.stroke_width.is_some() {
    header |= PAINT_HAS_STROKE_WIDTH;
  }
  if paint.stroke_miter_limit.is_some() {
    header |= PAINT_HAS_MITER_LIMIT;
  }
  header |= (paint.stroke_join as u8) << PAINT_JOIN_SHIFT;
  header |= (paint.stroke_cap as u8) << PAINT_CAP_SHIFT;
  if paint.fill_rule == FillRule::EvenOdd {
    header |= PAINT_EVEN_ODD;
  }
  if paint.dash_array.is_some() {
    header |= PAINT_HAS_DASH;
  }
  sinks.children.write_u8(header);
  if paint.dash_array.is_some() {
    let mut dash_byte = 0u8;
    if paint.dash_offset.is_some() {
      dash_byte |= DASH_HAS_OFFSET;
    }
    sinks.children.write_u8(dash_byte);
  }

  write_color(&paint.fill, sinks);
  write_color(&paint.stroke, sinks);

  if let Some(w) = paint.stroke_width {
    sinks.args.push(w);
  }
  if let Some(m) = paint.stroke_miter_limit {
    sinks.args.push(m);
  }
  if let Some(dashes) = &paint.dash_array {
    sinks.children.write_smallish(dashes.len() as u32);
    for &d in dashes {
      sinks.args.push(d);
    }
    if let Some(o) = paint.dash_offset {
      sinks.args.push(o);
    }
  }
}

/// Decodes a paint body; the color types come from the opcode's flag bits
pub(crate) fn read_paint(
  fill_code: ColorTypeCode,
  stroke_code: ColorTypeCode,
  cursors: &mut DecodeCursors<'_, '_>,
) -> Result<Paint, DecodeError> {
  let header = cursors.children.read_u8()?;
  let dash_byte = if header & PAINT_HAS_DASH != 0 {
    Some(cursors.children.read_u8()?)
  } else {
    None
  };

  let stroke_join = match (header >> PAINT_JOIN_SHIFT) & PAINT_ENUM_MASK {
    0 => StrokeJoin::Miter,
    1 => StrokeJoin::Round,
    2 => StrokeJoin::Bevel,
    other => {
      return Err(DecodeError::BadEnumValue {
        what: "stroke join",
        value: other,
      })
    }
  };
  let stroke_cap = match (header >> PAINT_CAP_SHIFT) & PAINT_ENUM_MASK {
    0 => StrokeCap::Butt,
    1 => StrokeCap::Round,
    2 => StrokeCap::Square,
    other => {
      return Err(DecodeError::BadEnumValue {
        what: "stroke cap",
        value: other,
      })
    }
  };
  let fill_rule = if header & PAINT_EVEN_ODD != 0 {
    FillRule::EvenOdd
  } else {
    FillRule::NonZero
  };

  let fill = read_color(fill_code, cursors)?;
  let stroke = read_color(stroke_code, cursors)?;

  let stroke_width = if header & PAINT_HAS_STROKE_WIDTH != 0 {
    Some(cursors.args.next()?)
  } else {
    None
  };
  let stroke_miter_limit = if header & PAINT_HAS_MITER_LIMIT != 0 {
    Some(cursors.args.next()?)
  } else {
    None
  };

  let (dash_array, dash_offset) = match dash_byte {
    None => (None, None),
    Some(db) => {
      let count = cursors.children.read_smallish()? as usize;
      let mut dashes: SmallVec<[f64; 4]> = SmallVec::with_capacity(count);
      for _ in 0..count {
        dashes.push(cursors.args.next()?);
      }
      let offset = if db & DASH_HAS_OFFSET != 0 {
        Some(cursors.args.next()?)
      } else {
        None
      };
      (Some(dashes), offset)
    }
  };

  Ok(Paint {
    fill,
    stroke,
    stroke_width,
    stroke_miter_limit,
    stroke_join,
    stroke_cap,
    fill_rule,
    dash_array,
    dash_offset,
  })
}

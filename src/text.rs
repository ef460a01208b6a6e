//! Text span attributes and their two-byte wire form
//!
//! A text element stores its per-glyph positions as float-list table
//! references and its content as string table references. Each span also
//! carries a font size (an args float) and this module's packed attribute
//! pair: weight and style in the first byte, anchor and decoration in the
//! second.

use crate::error::DecodeError;

/// CSS-style numeric font weight, in hundreds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FontWeight {
  W100 = 0,
  W200 = 1,
  W300 = 2,
  #[default]
  W400 = 3,
  W500 = 4,
  W600 = 5,
  W700 = 6,
  W800 = 7,
  W900 = 8,
}

impl FontWeight {
  /// Nearest weight for a CSS numeric value
  pub fn from_css_value(v: f64) -> Self {
    use FontWeight::*;
    match v {
      v if v < 150.0 => W100,
      v if v < 250.0 => W200,
      v if v < 350.0 => W300,
      v if v < 450.0 => W400,
      v if v < 550.0 => W500,
      v if v < 650.0 => W600,
      v if v < 750.0 => W700,
      v if v < 850.0 => W800,
      _ => W900,
    }
  }

  fn from_index(v: u8) -> Result<Self, DecodeError> {
    use FontWeight::*;
    Ok(match v {
      0 => W100,
      1 => W200,
      2 => W300,
      3 => W400,
      4 => W500,
      5 => W600,
      6 => W700,
      7 => W800,
      8 => W900,
      other => {
        return Err(DecodeError::BadEnumValue {
          what: "font weight",
          value: other,
        })
      }
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FontStyle {
  #[default]
  Normal = 0,
  Italic = 1,
}

/// Horizontal anchoring of a text run relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TextAnchor {
  #[default]
  Start = 0,
  Middle = 1,
  End = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TextDecoration {
  #[default]
  None = 0,
  Underline = 1,
  Overline = 2,
  LineThrough = 3,
}

/// Resolved per-span text attributes
///
/// `font_size` travels as an args float; the rest packs into two bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanAttributes {
  pub font_size: f64,
  pub weight: FontWeight,
  pub style: FontStyle,
  pub anchor: TextAnchor,
  pub decoration: TextDecoration,
}

impl Default for SpanAttributes {
  fn default() -> Self {
    Self {
      font_size: 16.0,
      weight: FontWeight::default(),
      style: FontStyle::default(),
      anchor: TextAnchor::default(),
      decoration: TextDecoration::default(),
    }
  }
}

impl SpanAttributes {
  /// Packs everything but the font size
  pub(crate) fn to_bytes(self) -> [u8; 2] {
    let b0 = (self.weight as u8) | ((self.style as u8) << 4);
    let b1 = (self.anchor as u8) | ((self.decoration as u8) << 2);
    [b0, b1]
  }

  pub(crate) fn from_bytes(font_size: f64, bytes: [u8; 2]) -> Result<Self, DecodeError> {
    let weight = FontWeight::from_index(bytes[0] & 0x0f)?;
    let style = if bytes[0] & 0x10 != 0 {
      FontStyle::Italic
    } else {
      FontStyle::Normal
    };
    let anchor = match bytes[1] & 0b11 {
      0 => TextAnchor::Start,
      1 => TextAnchor::Middle,
      2 => TextAnchor::End,
      other => {
        return Err(DecodeError::BadEnumValue {
          what: "text anchor",
          value: other,
        })
      }
    };
    let decoration = match (bytes[1] >> 2) & 0b11 {
      0 => TextDecoration::None,
      1 => TextDecoration::Underline,
      2 => TextDecoration::Overline,
      _ => TextDecoration::LineThrough,
    };
    Ok(Self {
      font_size,
      weight,
      style,
      anchor,
      decoration,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn attributes_round_trip_through_two_bytes() {
    let attrs = SpanAttributes {
      font_size: 12.5,
      weight: FontWeight::W700,
      style: FontStyle::Italic,
      anchor: TextAnchor::Middle,
      decoration: TextDecoration::Underline,
    };
    let bytes = attrs.to_bytes();
    assert_eq!(SpanAttributes::from_bytes(12.5, bytes).unwrap(), attrs);
  }

  #[test]
  fn default_attributes_pack_weight_only() {
    let bytes = SpanAttributes::default().to_bytes();
    assert_eq!(bytes, [FontWeight::W400 as u8, 0]);
  }

  #[test]
  fn css_weight_snapping() {
    assert_eq!(FontWeight::from_css_value(400.0), FontWeight::W400);
    assert_eq!(FontWeight::from_css_value(649.0), FontWeight::W600);
    assert_eq!(FontWeight::from_css_value(1000.0), FontWeight::W900);
  }

  #[test]
  fn bad_weight_index_is_rejected() {
    assert!(SpanAttributes::from_bytes(10.0, [9, 0]).is_err());
  }
}

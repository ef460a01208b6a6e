//! Opcode byte layout
//!
//! Every entry in the child stream starts with a single opcode byte. The
//! top bits select the category and the low bits are per-category flags:
//!
//! | range      | category     | flags                                            |
//! |------------|--------------|--------------------------------------------------|
//! | 0..=63     | PATH         | b0 path#, b1 paint#, b2-3 fill, b4-5 stroke      |
//! | 64..=127   | TEXT         | b0 paint#, b1 font family, b2-3 fill, b4-5 stroke|
//! | 128..=135  | GROUP        | b0 transform, b1 transform#, b2 extras           |
//! | 136..=137  | CLIP_PATH    | b0 path#                                         |
//! | 138        | IMAGE        | none                                             |
//! | 139        | END_GROUP    | none                                             |
//! | 140..=143  | MASKED       | b0 mask bounds, b1 luma                          |
//! | 144        | MASKED_CHILD | none                                             |
//! | 145        | END_MASKED   | none                                             |
//!
//! Anything at or above [`FIRST_UNUSED`] is a bad opcode.

use crate::error::DecodeError;

pub const PATH_BASE: u8 = 0;
pub const TEXT_BASE: u8 = 64;
pub const GROUP_BASE: u8 = 128;
pub const CLIP_PATH_BASE: u8 = 136;
pub const IMAGE_CODE: u8 = 138;
pub const END_GROUP_CODE: u8 = 139;
pub const MASKED_BASE: u8 = 140;
pub const MASKED_CHILD_CODE: u8 = 144;
pub const END_MASKED_CODE: u8 = 145;
pub const FIRST_UNUSED: u8 = 146;

// PATH flag bits
pub const PATH_HAS_PATH_NUMBER: u8 = 1 << 0;
pub const PATH_HAS_PAINT_NUMBER: u8 = 1 << 1;

// TEXT flag bits
pub const TEXT_HAS_PAINT_NUMBER: u8 = 1 << 0;
pub const TEXT_HAS_FONT_FAMILY: u8 = 1 << 1;

// Fill/stroke color types occupy the same bits for PATH and TEXT.
pub const FILL_TYPE_SHIFT: u8 = 2;
pub const STROKE_TYPE_SHIFT: u8 = 4;
pub const COLOR_TYPE_MASK: u8 = 0b11;

// GROUP flag bits
pub const GROUP_HAS_TRANSFORM: u8 = 1 << 0;
pub const GROUP_HAS_TRANSFORM_NUMBER: u8 = 1 << 1;
pub const GROUP_HAS_EXTRAS: u8 = 1 << 2;

// CLIP_PATH flag bits
pub const CLIP_HAS_PATH_NUMBER: u8 = 1 << 0;

// MASKED flag bits
pub const MASKED_HAS_BOUNDS: u8 = 1 << 0;
pub const MASKED_USES_LUMA: u8 = 1 << 1;

/// 2-bit color type codes carried in PATH/TEXT opcodes and gradient stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTypeCode {
  /// Explicit ARGB word follows
  Argb = 0,
  /// No paint on this slot
  None = 1,
  /// Resolved from the ambient current color at render time
  CurrentColor = 2,
  /// Inline gradient structure follows
  Gradient = 3,
}

impl ColorTypeCode {
  pub fn from_bits(bits: u8) -> Self {
    match bits & COLOR_TYPE_MASK {
      0 => ColorTypeCode::Argb,
      1 => ColorTypeCode::None,
      2 => ColorTypeCode::CurrentColor,
      _ => ColorTypeCode::Gradient,
    }
  }
}

/// An opcode byte split into category and flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  Path { flags: u8 },
  Text { flags: u8 },
  Group { flags: u8 },
  ClipPath { flags: u8 },
  Image,
  EndGroup,
  Masked { flags: u8 },
  MaskedChild,
  EndMasked,
}

impl Opcode {
  /// Classifies a raw opcode byte by range comparison
  pub fn decode(byte: u8) -> Result<Self, DecodeError> {
    Ok(match byte {
      0..=63 => Opcode::Path { flags: byte },
      64..=127 => Opcode::Text {
        flags: byte - TEXT_BASE,
      },
      128..=135 => Opcode::Group {
        flags: byte - GROUP_BASE,
      },
      136..=137 => Opcode::ClipPath {
        flags: byte - CLIP_PATH_BASE,
      },
      IMAGE_CODE => Opcode::Image,
      END_GROUP_CODE => Opcode::EndGroup,
      140..=143 => Opcode::Masked {
        flags: byte - MASKED_BASE,
      },
      MASKED_CHILD_CODE => Opcode::MaskedChild,
      END_MASKED_CODE => Opcode::EndMasked,
      other => return Err(DecodeError::BadOpcode(other)),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_byte_classifies_or_fails() {
    for byte in 0u8..=255 {
      let decoded = Opcode::decode(byte);
      if byte >= FIRST_UNUSED {
        assert_eq!(decoded, Err(DecodeError::BadOpcode(byte)));
      } else {
        assert!(decoded.is_ok(), "byte {byte} should classify");
      }
    }
  }

  #[test]
  fn flags_are_relative_to_category_base() {
    assert_eq!(
      Opcode::decode(TEXT_BASE + 3).unwrap(),
      Opcode::Text { flags: 3 }
    );
    assert_eq!(
      Opcode::decode(GROUP_BASE + 5).unwrap(),
      Opcode::Group { flags: 5 }
    );
    assert_eq!(
      Opcode::decode(MASKED_BASE + 2).unwrap(),
      Opcode::Masked { flags: 2 }
    );
  }

  #[test]
  fn color_type_codes_cover_two_bits() {
    assert_eq!(ColorTypeCode::from_bits(0), ColorTypeCode::Argb);
    assert_eq!(ColorTypeCode::from_bits(1), ColorTypeCode::None);
    assert_eq!(ColorTypeCode::from_bits(2), ColorTypeCode::CurrentColor);
    assert_eq!(ColorTypeCode::from_bits(3), ColorTypeCode::Gradient);
  }
}

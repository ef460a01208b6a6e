//! The `.fv` file envelope
//!
//! Wraps a [`VectorImage`] in a self-describing container: a big-endian
//! header block (magic, version, entity counts, array lengths) followed by
//! the little-endian float payloads, the canonical tables and the opcode
//! stream. Readers reject a wrong magic or a newer version before touching
//! the body.

use crate::error::{DecodeError, EnvelopeError};
use crate::image::{ImageData, VectorImage};
use crate::io::{ByteReader, ByteWriter, FloatArray};

/// File magic, stored big-endian
pub const MAGIC: u32 = 0xB0B0_1E07;
/// Newest envelope version this build writes and reads
pub const VERSION: u16 = 1;

const FLAG_HAS_WIDTH: u8 = 1 << 0;
const FLAG_HAS_HEIGHT: u8 = 1 << 1;
const FLAG_BIG_FLOATS: u8 = 1 << 2;
const FLAG_HAS_TINT: u8 = 1 << 3;

fn write_float(out: &mut ByteWriter, big: bool, v: f64) {
  if big {
    for b in v.to_le_bytes() {
      out.write_u8(b);
    }
  } else {
    for b in (v as f32).to_le_bytes() {
      out.write_u8(b);
    }
  }
}

fn write_float_array(out: &mut ByteWriter, array: &FloatArray) {
  match array {
    FloatArray::F32(values) => {
      for v in values {
        for b in v.to_le_bytes() {
          out.write_u8(b);
        }
      }
    }
    FloatArray::F64(values) => {
      for v in values {
        for b in v.to_le_bytes() {
          out.write_u8(b);
        }
      }
    }
  }
}

fn f32_le(bytes: &[u8]) -> f32 {
  f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn f64_le(bytes: &[u8]) -> f64 {
  f64::from_le_bytes([
    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
  ])
}

fn read_float(reader: &mut ByteReader<'_>, big: bool) -> Result<f64, DecodeError> {
  if big {
    Ok(f64_le(reader.read_bytes(8)?))
  } else {
    Ok(f64::from(f32_le(reader.read_bytes(4)?)))
  }
}

fn read_float_array(
  reader: &mut ByteReader<'_>,
  big: bool,
  len: usize,
) -> Result<FloatArray, DecodeError> {
  if big {
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
      values.push(f64_le(reader.read_bytes(8)?));
    }
    Ok(FloatArray::F64(values))
  } else {
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
      values.push(f32_le(reader.read_bytes(4)?));
    }
    Ok(FloatArray::F32(values))
  }
}

impl VectorImage {
  /// Serializes into the `.fv` envelope
  pub fn to_bytes(&self) -> Vec<u8> {
    let big = self.big_floats;
    let mut out = ByteWriter::new();
    for b in MAGIC.to_be_bytes() {
      out.write_u8(b);
    }
    out.write_u8(0x00);
    for b in VERSION.to_be_bytes() {
      out.write_u8(b);
    }

    let mut flags = 0u8;
    if self.width.is_some() {
      flags |= FLAG_HAS_WIDTH;
    }
    if self.height.is_some() {
      flags |= FLAG_HAS_HEIGHT;
    }
    if big {
      flags |= FLAG_BIG_FLOATS;
    }
    if self.tint_color.is_some() {
      flags |= FLAG_HAS_TINT;
    }
    out.write_u8(flags);

    for count in [
      self.num_paths as u32,
      self.num_paints as u32,
      self.args.len() as u32,
      self.transforms.len() as u32,
    ] {
      for b in count.to_be_bytes() {
        out.write_u8(b);
      }
    }

    write_float_array(&mut out, &self.args);
    write_float_array(&mut out, &self.transforms);
    if let Some(w) = self.width {
      write_float(&mut out, big, w);
    }
    if let Some(h) = self.height {
      write_float(&mut out, big, h);
    }
    if let Some(tint) = self.tint_color {
      out.write_u32(tint.argb());
      out.write_u8(self.tint_mode.to_u8());
    }

    out.write_smallish(self.strings.len() as u32);
    for s in &self.strings {
      out.write_smallish(s.len() as u32);
      for &b in s.as_bytes() {
        out.write_u8(b);
      }
    }

    out.write_smallish(self.float_lists.len() as u32);
    for list in &self.float_lists {
      out.write_smallish(list.len() as u32);
      write_float_array(&mut out, list);
    }

    out.write_smallish(self.images.len() as u32);
    for image in &self.images {
      write_float(&mut out, big, image.x);
      write_float(&mut out, big, image.y);
      write_float(&mut out, big, image.width);
      write_float(&mut out, big, image.height);
      out.write_smallish(image.data.len() as u32);
      for &b in &image.data {
        out.write_u8(b);
      }
    }

    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(&self.children);
    bytes
  }

  /// Deserializes an `.fv` envelope
  pub fn from_bytes(data: &[u8]) -> Result<VectorImage, EnvelopeError> {
    let mut r = ByteReader::new(data);
    let truncated = |_| EnvelopeError::Truncated;

    let magic = r.read_u32_be().map_err(truncated)?;
    if magic != MAGIC {
      return Err(EnvelopeError::MalformedHeader(magic));
    }
    r.read_u8().map_err(truncated)?; // padding
    let version = r.read_u16_be().map_err(truncated)?;
    if version > VERSION {
      return Err(EnvelopeError::UnsupportedVersion {
        found: version,
        supported: VERSION,
      });
    }
    let flags = r.read_u8().map_err(truncated)?;
    let big = flags & FLAG_BIG_FLOATS != 0;

    let num_paths = r.read_u32_be().map_err(truncated)? as usize;
    let num_paints = r.read_u32_be().map_err(truncated)? as usize;
    let args_len = r.read_u32_be().map_err(truncated)? as usize;
    let transforms_len = r.read_u32_be().map_err(truncated)? as usize;

    let args = read_float_array(&mut r, big, args_len)?;
    let transforms = read_float_array(&mut r, big, transforms_len)?;

    let width = if flags & FLAG_HAS_WIDTH != 0 {
      Some(read_float(&mut r, big)?)
    } else {
      None
    };
    let height = if flags & FLAG_HAS_HEIGHT != 0 {
      Some(read_float(&mut r, big)?)
    } else {
      None
    };
    let (tint_color, tint_mode) = if flags & FLAG_HAS_TINT != 0 {
      let argb = r.read_u32()?;
      let mode = crate::color::BlendMode::from_u8(r.read_u8()?)?;
      (Some(crate::color::Color32(argb)), mode)
    } else {
      (None, crate::color::BlendMode::SrcIn)
    };

    let string_count = r.read_smallish()? as usize;
    let mut strings = Vec::with_capacity(string_count);
    for _ in 0..string_count {
      let len = r.read_smallish()? as usize;
      let bytes = r.read_bytes(len)?;
      strings.push(String::from_utf8(bytes.to_vec()).map_err(|_| EnvelopeError::BadString)?);
    }

    let list_count = r.read_smallish()? as usize;
    let mut float_lists = Vec::with_capacity(list_count);
    for _ in 0..list_count {
      let len = r.read_smallish()? as usize;
      float_lists.push(read_float_array(&mut r, big, len)?);
    }

    let image_count = r.read_smallish()? as usize;
    let mut images = Vec::with_capacity(image_count);
    for _ in 0..image_count {
      let x = read_float(&mut r, big)?;
      let y = read_float(&mut r, big)?;
      let w = read_float(&mut r, big)?;
      let h = read_float(&mut r, big)?;
      let len = r.read_smallish()? as usize;
      let bytes = r.read_bytes(len)?;
      images.push(ImageData {
        x,
        y,
        width: w,
        height: h,
        data: bytes.to_vec(),
      });
    }

    let children = data[r.position()..].to_vec();

    Ok(VectorImage {
      width,
      height,
      big_floats: big,
      tint_color,
      tint_mode,
      children,
      args,
      transforms,
      strings,
      float_lists,
      images,
      num_paths,
      num_paints,
    })
  }
}

//! Streaming IR decoder
//!
//! One forward pass over the opcode stream, dispatching each decoded event
//! to an [`ImageVisitor`]. Back-references are resolved through seek
//! tables rebuilt on every traversal: each fresh path or paint records the
//! stream positions it was serialized at, and a later reference seeks a
//! second set of cursors there; the forward cursors never move backwards.
//!
//! Traversal of a valid stream consumes exactly the bytes, args and
//! transforms that were written; anything left over (or missing) is a
//! decode error.

use crate::color::{BlendMode, DecodeCursors};
use crate::error::DecodeError;
use crate::geometry::{Affine, Rect};
use crate::image::VectorImage;
use crate::io::{ByteReader, FloatReader};
use crate::opcode::{
  ColorTypeCode, Opcode, CLIP_HAS_PATH_NUMBER, FILL_TYPE_SHIFT, GROUP_HAS_EXTRAS,
  GROUP_HAS_TRANSFORM, GROUP_HAS_TRANSFORM_NUMBER, MASKED_HAS_BOUNDS, MASKED_USES_LUMA,
  PATH_HAS_PAINT_NUMBER, PATH_HAS_PATH_NUMBER, STROKE_TYPE_SHIFT, TEXT_HAS_FONT_FAMILY,
  TEXT_HAS_PAINT_NUMBER,
};
use crate::paint::{read_paint, Paint};
use crate::path::parse_path;
use crate::text::SpanAttributes;
use crate::visitor::{ImageVisitor, PathData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
  Group,
  MaskContent,
  MaskChild,
}

/// Decodes `image`'s opcode stream, driving `visitor`
///
/// The visitor receives `init` and `vector` first, then one call per
/// decoded event in stream order, then `end_vector`. Fails without
/// further callbacks on the first malformed byte.
pub fn traverse<V: ImageVisitor>(
  image: &VectorImage,
  visitor: &mut V,
) -> Result<(), DecodeError> {
  Traverser::new(image).run(visitor)
}

struct Traverser<'a> {
  image: &'a VectorImage,
  children: ByteReader<'a>,
  args: FloatReader<'a>,
  transforms: FloatReader<'a>,
  // Rewind cursors over the same buffers, used only to re-read
  // back-referenced paints without moving the forward cursors.
  rewind_children: ByteReader<'a>,
  rewind_args: FloatReader<'a>,
  rewind_transforms: FloatReader<'a>,
  /// (children, args) positions of each fresh path, in first-write order
  path_seek: Vec<(usize, usize)>,
  /// (children, args, transforms) positions of each fresh paint
  paint_seek: Vec<(usize, usize, usize)>,
  brackets: Vec<Bracket>,
}

impl<'a> Traverser<'a> {
  fn new(image: &'a VectorImage) -> Self {
    Self {
      image,
      children: ByteReader::new(&image.children),
      args: FloatReader::new(&image.args),
      transforms: FloatReader::new(&image.transforms),
      rewind_children: ByteReader::new(&image.children),
      rewind_args: FloatReader::new(&image.args),
      rewind_transforms: FloatReader::new(&image.transforms),
      path_seek: Vec::with_capacity(image.num_paths),
      paint_seek: Vec::with_capacity(image.num_paints),
      brackets: Vec::new(),
    }
  }

  fn run<V: ImageVisitor>(&mut self, visitor: &mut V) -> Result<(), DecodeError> {
    let image = self.image;
    visitor.init(&image.images, &image.strings, &image.float_lists);
    visitor.vector(image.width, image.height, image.tint_color, image.tint_mode);

    while !self.children.is_eof() {
      let byte = self.children.read_u8()?;
      match Opcode::decode(byte)? {
        Opcode::Path { flags } => self.decode_path(flags, visitor)?,
        Opcode::Text { flags } => self.decode_text(flags, visitor)?,
        Opcode::Group { flags } => self.decode_group(flags, visitor)?,
        Opcode::ClipPath { flags } => self.decode_clip_path(flags, visitor)?,
        Opcode::Image => {
          let index = self.children.read_smallish()? as usize;
          let data = image.images.get(index).ok_or(DecodeError::BadBackReference {
            index,
            count: image.images.len(),
          })?;
          visitor.image(data);
        }
        Opcode::EndGroup => {
          if self.brackets.pop() != Some(Bracket::Group) {
            return Err(DecodeError::UnexpectedEndGroup);
          }
          visitor.end_group();
        }
        Opcode::Masked { flags } => {
          let bounds = if flags & MASKED_HAS_BOUNDS != 0 {
            let x = self.args.next()?;
            let y = self.args.next()?;
            let w = self.args.next()?;
            let h = self.args.next()?;
            Some(Rect::from_xywh(x, y, w, h))
          } else {
            None
          };
          self.brackets.push(Bracket::MaskContent);
          visitor.masked(bounds, flags & MASKED_USES_LUMA != 0);
        }
        Opcode::MaskedChild => {
          match self.brackets.last_mut() {
            Some(slot) if *slot == Bracket::MaskContent => *slot = Bracket::MaskChild,
            _ => return Err(DecodeError::MisplacedMaskCode),
          }
          visitor.masked_child();
        }
        Opcode::EndMasked => {
          if self.brackets.pop() != Some(Bracket::MaskChild) {
            return Err(DecodeError::MisplacedMaskCode);
          }
          visitor.end_masked();
        }
      }
    }

    if !self.brackets.is_empty() {
      return Err(DecodeError::UnbalancedGroups(self.brackets.len()));
    }
    if !self.args.is_eof() || self.transforms.position() != image.transforms.len() {
      return Err(DecodeError::TrailingData);
    }
    if self.path_seek.len() != image.num_paths {
      return Err(DecodeError::WrongEntityCount {
        kind: "paths",
        expected: image.num_paths,
        found: self.path_seek.len(),
      });
    }
    if self.paint_seek.len() != image.num_paints {
      return Err(DecodeError::WrongEntityCount {
        kind: "paints",
        expected: image.num_paints,
        found: self.paint_seek.len(),
      });
    }
    visitor.end_vector();
    Ok(())
  }

  /// Reads a paint, either fresh at the forward cursors (recording its
  /// positions) or re-decoded at a back-referenced position
  fn read_paint_part(
    &mut self,
    has_number: bool,
    fill_code: ColorTypeCode,
    stroke_code: ColorTypeCode,
  ) -> Result<Paint, DecodeError> {
    if has_number {
      let index = self.children.read_smallish()? as usize;
      let &(cpos, apos, tpos) =
        self
          .paint_seek
          .get(index)
          .ok_or(DecodeError::BadBackReference {
            index,
            count: self.paint_seek.len(),
          })?;
      self.rewind_children.seek(cpos);
      self.rewind_args.seek(apos);
      self.rewind_transforms.seek(tpos);
      let mut cursors = DecodeCursors {
        children: &mut self.rewind_children,
        args: &mut self.rewind_args,
        transforms: &mut self.rewind_transforms,
      };
      read_paint(fill_code, stroke_code, &mut cursors)
    } else {
      self.paint_seek.push((
        self.children.position(),
        self.args.position(),
        self.transforms.position(),
      ));
      let mut cursors = DecodeCursors {
        children: &mut self.children,
        args: &mut self.args,
        transforms: &mut self.transforms,
      };
      read_paint(fill_code, stroke_code, &mut cursors)
    }
  }

  /// Produces the path handle, advancing the forward cursors only past a
  /// fresh path body
  fn read_path_part(&mut self, has_number: bool) -> Result<PathData<'a>, DecodeError> {
    if has_number {
      let index = self.children.read_smallish()? as usize;
      let &(cpos, apos) = self
        .path_seek
        .get(index)
        .ok_or(DecodeError::BadBackReference {
          index,
          count: self.path_seek.len(),
        })?;
      Ok(PathData::new(&self.image.children, &self.image.args, cpos, apos))
    } else {
      let cpos = self.children.position();
      let apos = self.args.position();
      self.path_seek.push((cpos, apos));
      // Walk the body once to advance the forward cursors.
      parse_path(&mut self.children, &mut self.args, &mut SkipPath)?;
      Ok(PathData::new(&self.image.children, &self.image.args, cpos, apos))
    }
  }

  fn decode_path<V: ImageVisitor>(
    &mut self,
    flags: u8,
    visitor: &mut V,
  ) -> Result<(), DecodeError> {
    let fill_code = ColorTypeCode::from_bits(flags >> FILL_TYPE_SHIFT);
    let stroke_code = ColorTypeCode::from_bits(flags >> STROKE_TYPE_SHIFT);
    let paint = self.read_paint_part(
      flags & PATH_HAS_PAINT_NUMBER != 0,
      fill_code,
      stroke_code,
    )?;
    let path = self.read_path_part(flags & PATH_HAS_PATH_NUMBER != 0)?;
    visitor.path(&path, &paint);
    Ok(())
  }

  fn decode_clip_path<V: ImageVisitor>(
    &mut self,
    flags: u8,
    visitor: &mut V,
  ) -> Result<(), DecodeError> {
    let path = self.read_path_part(flags & CLIP_HAS_PATH_NUMBER != 0)?;
    visitor.clip_path(&path);
    Ok(())
  }

  fn decode_group<V: ImageVisitor>(
    &mut self,
    flags: u8,
    visitor: &mut V,
  ) -> Result<(), DecodeError> {
    let transform = if flags & GROUP_HAS_TRANSFORM_NUMBER != 0 {
      let n = self.children.read_smallish()?;
      Some(self.transform_by_number(n)?)
    } else if flags & GROUP_HAS_TRANSFORM != 0 {
      Some(self.read_inline_transform()?)
    } else {
      None
    };
    let (alpha, blend) = if flags & GROUP_HAS_EXTRAS != 0 {
      let alpha = f64::from(self.children.read_u8()?) / 255.0;
      let blend = BlendMode::from_u8(self.children.read_u8()?)?;
      (Some(alpha), blend)
    } else {
      (None, BlendMode::Normal)
    };
    self.brackets.push(Bracket::Group);
    visitor.group(transform, alpha, blend);
    Ok(())
  }

  fn read_inline_transform(&mut self) -> Result<Affine, DecodeError> {
    let at = self.transforms.position();
    let affine = self.transforms.affine_at(at)?;
    self.transforms.seek(at + 6);
    Ok(affine)
  }

  fn transform_by_number(&self, number: u32) -> Result<Affine, DecodeError> {
    let seen = self.transforms.position() / 6;
    let index = number as usize;
    if index >= seen {
      return Err(DecodeError::BadBackReference { index, count: seen });
    }
    self.transforms.affine_at(index * 6)
  }

  fn decode_text<V: ImageVisitor>(
    &mut self,
    flags: u8,
    visitor: &mut V,
  ) -> Result<(), DecodeError> {
    let image = self.image;
    let x_index = self.children.read_smallish()? as usize;
    let y_index = self.children.read_smallish()? as usize;
    let lookup_list = |index: usize| {
      image
        .float_lists
        .get(index)
        .ok_or(DecodeError::BadBackReference {
          index,
          count: image.float_lists.len(),
        })
    };
    let x = lookup_list(x_index)?;
    let y = lookup_list(y_index)?;
    let font_family = if flags & TEXT_HAS_FONT_FAMILY != 0 {
      let index = self.children.read_smallish()? as usize;
      Some(
        image
          .strings
          .get(index)
          .map(String::as_str)
          .ok_or(DecodeError::BadBackReference {
            index,
            count: image.strings.len(),
          })?,
      )
    } else {
      None
    };
    let fill_code = ColorTypeCode::from_bits(flags >> FILL_TYPE_SHIFT);
    let stroke_code = ColorTypeCode::from_bits(flags >> STROKE_TYPE_SHIFT);
    let paint = self.read_paint_part(
      flags & TEXT_HAS_PAINT_NUMBER != 0,
      fill_code,
      stroke_code,
    )?;

    visitor.text(x, y, font_family, &paint);
    let span_count = self.children.read_smallish()? as usize;
    if span_count > 1 {
      visitor.text_multi_span_chunk(span_count);
    }
    for _ in 0..span_count {
      let string_index = self.children.read_smallish()? as usize;
      let text = image
        .strings
        .get(string_index)
        .map(String::as_str)
        .ok_or(DecodeError::BadBackReference {
          index: string_index,
          count: image.strings.len(),
        })?;
      let font_size = self.args.next()?;
      let b0 = self.children.read_u8()?;
      let b1 = self.children.read_u8()?;
      let attrs = SpanAttributes::from_bytes(font_size, [b0, b1])?;
      visitor.text_span(text, attrs);
    }
    visitor.text_end();
    Ok(())
  }
}

/// Path visitor that discards everything; used to advance the forward
/// cursors past a fresh path body
struct SkipPath;

impl crate::path::PathVisitor for SkipPath {
  fn move_to(&mut self, _: crate::geometry::Point) {}
  fn line_to(&mut self, _: crate::geometry::Point) {}
  fn cubic_to(
    &mut self,
    _: crate::geometry::Point,
    _: crate::geometry::Point,
    _: crate::geometry::Point,
  ) {
  }
  fn cubic_to_shorthand(&mut self, _: crate::geometry::Point, _: crate::geometry::Point) {}
  fn quad_to(&mut self, _: crate::geometry::Point, _: crate::geometry::Point) {}
  fn quad_to_shorthand(&mut self, _: crate::geometry::Point) {}
  fn close(&mut self) {}
  fn add_oval(&mut self, _: Rect) {}
  fn arc_to_point(&mut self, _: crate::geometry::Point, _: f64, _: f64, _: f64, _: bool, _: bool) {
  }
}

use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Vec3, Vec4};

use super::vertex_format::VertexFormat;
use super::{CHILD_END_TRANSFORM, NULL_TEXTURE};
use crate::error::{AssetError, Result};

/// Field level access shared by the ASCII and binary encodings. Both
/// encodings store the same fields in the same order, only the spelling of
/// numbers, strings and sentinels differs.
pub trait AssetReader {
    fn origin(&self) -> &Path;

    fn read_i16(&mut self, field: &str) -> Result<i16>;
    fn read_u16(&mut self, field: &str) -> Result<u16>;
    fn read_u32(&mut self, field: &str) -> Result<u32>;
    fn read_f32(&mut self, field: &str) -> Result<f32>;

    fn read_string(&mut self, field: &str) -> Result<String>;

    /// `None` closes the scope of the current hierarchy node.
    fn read_node_name(&mut self, field: &str) -> Result<Option<String>>;

    /// `None` when the material slot has no texture.
    fn read_texture_name(&mut self, field: &str) -> Result<Option<String>>;

    /// Returns `count` vertices laid out back to back, each
    /// `format.byte_size(skinned)` bytes long.
    fn read_vertices(&mut self, format: VertexFormat, skinned: bool, count: usize, field: &str) -> Result<Vec<u8>>;

    fn read_vec3(&mut self, field: &str) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32(field)?, self.read_f32(field)?, self.read_f32(field)?))
    }

    fn read_vec4(&mut self, field: &str) -> Result<Vec4> {
        Ok(Vec4::new(
            self.read_f32(field)?,
            self.read_f32(field)?,
            self.read_f32(field)?,
            self.read_f32(field)?,
        ))
    }

    fn read_f32s(&mut self, count: usize, field: &str) -> Result<Vec<f32>> {
        let mut values = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            values.push(self.read_f32(field)?);
        }
        Ok(values)
    }

    fn read_u32s(&mut self, count: usize, field: &str) -> Result<Vec<u32>> {
        let mut values = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            values.push(self.read_u32(field)?);
        }
        Ok(values)
    }

    fn malformed(&self, field: &str, reason: impl Into<String>) -> AssetError {
        AssetError::Load {
            path: self.origin().to_path_buf(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub struct BinaryReader<R> {
    inner: R,
    origin: PathBuf,
}
impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R, origin: impl Into<PathBuf>) -> Self {
        Self { inner, origin: origin.into() }
    }

    fn read_bytes(&mut self, len: usize, field: &str) -> Result<Vec<u8>> {
        // grow with the data actually present instead of trusting the length prefix
        let mut buffer = Vec::new();
        let read = (&mut self.inner).take(len as u64).read_to_end(&mut buffer);
        read.map_err(|e| self.malformed(field, e.to_string()))?;
        if buffer.len() != len {
            return Err(self.malformed(
                field,
                format!("unexpected end of file, expected {} bytes, got {}", len, buffer.len()),
            ));
        }
        Ok(buffer)
    }

    fn read_text(&mut self, len: usize, field: &str) -> Result<String> {
        let bytes = self.read_bytes(len, field)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<R: Read> AssetReader for BinaryReader<R> {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn read_i16(&mut self, field: &str) -> Result<i16> {
        self.inner.read_i16::<LittleEndian>().map_err(|e| self.malformed(field, e.to_string()))
    }

    fn read_u16(&mut self, field: &str) -> Result<u16> {
        self.inner.read_u16::<LittleEndian>().map_err(|e| self.malformed(field, e.to_string()))
    }

    fn read_u32(&mut self, field: &str) -> Result<u32> {
        self.inner.read_u32::<LittleEndian>().map_err(|e| self.malformed(field, e.to_string()))
    }

    fn read_f32(&mut self, field: &str) -> Result<f32> {
        self.inner.read_f32::<LittleEndian>().map_err(|e| self.malformed(field, e.to_string()))
    }

    fn read_string(&mut self, field: &str) -> Result<String> {
        let len = self.read_u16(field)?;
        self.read_text(len as usize, field)
    }

    fn read_node_name(&mut self, field: &str) -> Result<Option<String>> {
        match self.read_i16(field)? {
            -1 => Ok(None),
            len if len < 0 => Err(self.malformed(field, format!("invalid name length {}", len))),
            len => self.read_text(len as usize, field).map(Some),
        }
    }

    fn read_texture_name(&mut self, field: &str) -> Result<Option<String>> {
        match self.read_u16(field)? {
            0 => Ok(None),
            len => self.read_text(len as usize, field).map(Some),
        }
    }

    fn read_vertices(&mut self, format: VertexFormat, skinned: bool, count: usize, field: &str) -> Result<Vec<u8>> {
        let len = count
            .checked_mul(format.byte_size(skinned))
            .ok_or_else(|| self.malformed(field, format!("vertex count {} overflows", count)))?;
        self.read_bytes(len, field)
    }
}

/// Whitespace separated tokens.
pub struct AsciiReader {
    content: String,
    cursor: usize,
    origin: PathBuf,
}
impl AsciiReader {
    pub fn new(content: String, origin: impl Into<PathBuf>) -> Self {
        Self { content, cursor: 0, origin: origin.into() }
    }

    pub fn from_reader<R: Read>(mut inner: R, origin: impl Into<PathBuf>) -> Result<Self> {
        let origin = origin.into();
        let mut content = String::new();
        inner
            .read_to_string(&mut content)
            .map_err(|source| AssetError::Io { path: origin.clone(), source })?;
        Ok(Self::new(content, origin))
    }

    fn next_token(&mut self, field: &str) -> Result<&str> {
        let rest = &self.content[self.cursor..];
        let Some(start) = rest.find(|c: char| !c.is_whitespace()) else {
            return Err(self.malformed(field, "unexpected end of file"));
        };
        let len = rest[start..].find(char::is_whitespace).unwrap_or(rest.len() - start);
        let begin = self.cursor + start;
        self.cursor = begin + len;
        Ok(&self.content[begin..begin + len])
    }

    fn parse<T: FromStr>(&mut self, field: &str) -> Result<T> {
        let token = self.next_token(field)?.to_string();
        token
            .parse()
            .map_err(|_| self.malformed(field, format!("cannot parse '{}'", token)))
    }
}

impl AssetReader for AsciiReader {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn read_i16(&mut self, field: &str) -> Result<i16> {
        self.parse(field)
    }

    fn read_u16(&mut self, field: &str) -> Result<u16> {
        self.parse(field)
    }

    fn read_u32(&mut self, field: &str) -> Result<u32> {
        self.parse(field)
    }

    fn read_f32(&mut self, field: &str) -> Result<f32> {
        self.parse(field)
    }

    fn read_string(&mut self, field: &str) -> Result<String> {
        self.next_token(field).map(str::to_string)
    }

    fn read_node_name(&mut self, field: &str) -> Result<Option<String>> {
        let token = self.next_token(field)?;
        Ok((token != CHILD_END_TRANSFORM).then(|| token.to_string()))
    }

    fn read_texture_name(&mut self, field: &str) -> Result<Option<String>> {
        let token = self.next_token(field)?;
        Ok((token != NULL_TEXTURE).then(|| token.to_string()))
    }

    fn read_vertices(&mut self, format: VertexFormat, skinned: bool, count: usize, field: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(count.min(65536) * format.byte_size(skinned));
        for _ in 0..count {
            for (_, size) in format.attributes() {
                for _ in 0..size / 4 {
                    bytes.extend_from_slice(&self.read_f32(field)?.to_ne_bytes());
                }
            }
            if skinned {
                // signed in text
                for _ in 0..4 {
                    bytes.extend_from_slice(&self.parse::<i32>(field)?.to_ne_bytes());
                }
                for _ in 0..4 {
                    bytes.extend_from_slice(&self.read_f32(field)?.to_ne_bytes());
                }
            }
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn ascii_sentinels() {
        let mut reader = AsciiReader::new("Hips ChildEndTransform _MainTex null".to_string(), "mem");
        assert_eq!(reader.read_node_name("n").unwrap().as_deref(), Some("Hips"));
        assert_eq!(reader.read_node_name("n").unwrap(), None);
        assert_eq!(reader.read_string("p").unwrap(), "_MainTex");
        assert_eq!(reader.read_texture_name("t").unwrap(), None);
        assert!(matches!(reader.read_u32("count"), Err(AssetError::Load { .. })));
    }

    #[test]
    fn ascii_reports_field_on_bad_number() {
        let mut reader = AsciiReader::new("  12\n abc".to_string(), "model.uma");
        assert_eq!(reader.read_u32("vertex count").unwrap(), 12);
        match reader.read_f32("position") {
            Err(AssetError::Load { path, field, .. }) => {
                assert_eq!(path, PathBuf::from("model.uma"));
                assert_eq!(field, "position");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn binary_node_name_sentinel() {
        let mut data = vec![];
        data.extend_from_slice(&3i16.to_le_bytes());
        data.extend_from_slice(b"Arm");
        data.extend_from_slice(&(-1i16).to_le_bytes());
        let mut reader = BinaryReader::new(Cursor::new(data), "mem");
        assert_eq!(reader.read_node_name("n").unwrap().as_deref(), Some("Arm"));
        assert_eq!(reader.read_node_name("n").unwrap(), None);
    }

    #[test]
    fn binary_truncated_string() {
        let mut data = vec![];
        data.extend_from_slice(&10u16.to_le_bytes());
        data.extend_from_slice(b"abc");
        let mut reader = BinaryReader::new(Cursor::new(data), "mem");
        assert!(matches!(reader.read_string("material name"), Err(AssetError::Load { .. })));
    }

    #[test]
    fn ascii_skinned_vertex_layout() {
        let text = "1 2 3 0.5 0.25 7 8 9 10 0.1 0.2 0.3 0.4";
        let mut reader = AsciiReader::new(text.to_string(), "mem");
        let format = VertexFormat::POSITION | VertexFormat::UV1;
        let bytes = reader.read_vertices(format, true, 1, "vertices").unwrap();
        assert_eq!(bytes.len(), format.byte_size(true));
        let words: Vec<u32> = bytes[20..36]
            .chunks_exact(4)
            .map(|w| u32::from_ne_bytes(w.try_into().unwrap()))
            .collect();
        assert_eq!(words, vec![7, 8, 9, 10]);
        let weight = f32::from_ne_bytes(bytes[48..52].try_into().unwrap());
        assert_eq!(weight, 0.4);
    }

    #[test]
    fn ascii_negative_bone_index_keeps_its_bits() {
        let text = "0 0 0 3 -1 0 0 1 0 0 0";
        let mut reader = AsciiReader::new(text.to_string(), "mem");
        let bytes = reader.read_vertices(VertexFormat::POSITION, true, 1, "vertices").unwrap();
        let words: Vec<u32> = bytes[12..28]
            .chunks_exact(4)
            .map(|w| u32::from_ne_bytes(w.try_into().unwrap()))
            .collect();
        assert_eq!(words, vec![3, u32::MAX, 0, 0]);

        let mut reader = AsciiReader::new("0 0 0 4294967295 0 0 0 1 0 0 0".to_string(), "mem");
        assert!(matches!(
            reader.read_vertices(VertexFormat::POSITION, true, 1, "vertices"),
            Err(AssetError::Load { .. })
        ));
    }
}

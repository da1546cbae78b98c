use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Vec3, Vec4};

use super::vertex_format::VertexFormat;
use super::{CHILD_END_TRANSFORM, NULL_TEXTURE};
use crate::error::{AssetError, Result};

/// Counterpart of [`super::reader::AssetReader`]: emits fields in the order
/// the readers expect them.
pub trait AssetWriter {
    fn origin(&self) -> &Path;

    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_u16(&mut self, value: u16) -> Result<()>;
    fn write_u32(&mut self, value: u32) -> Result<()>;
    fn write_f32(&mut self, value: f32) -> Result<()>;

    fn write_string(&mut self, field: &str, value: &str) -> Result<()>;

    /// `None` writes the scope close marker.
    fn write_node_name(&mut self, name: Option<&str>) -> Result<()>;

    fn write_texture_name(&mut self, name: Option<&str>) -> Result<()>;

    fn write_vertices(&mut self, format: VertexFormat, skinned: bool, bytes: &[u8]) -> Result<()>;

    /// Record separator, only meaningful for text output.
    fn end_record(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn write_vec3(&mut self, value: Vec3) -> Result<()> {
        for v in value.to_array() {
            self.write_f32(v)?;
        }
        Ok(())
    }

    fn write_vec4(&mut self, value: Vec4) -> Result<()> {
        for v in value.to_array() {
            self.write_f32(v)?;
        }
        Ok(())
    }

    fn write_f32s(&mut self, values: &[f32]) -> Result<()> {
        for v in values {
            self.write_f32(*v)?;
        }
        Ok(())
    }

    fn write_u32s(&mut self, values: &[u32]) -> Result<()> {
        for v in values {
            self.write_u32(*v)?;
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> AssetError {
        AssetError::Io { path: self.origin().to_path_buf(), source }
    }
}

fn encode_error(field: &str, value: &str) -> AssetError {
    AssetError::Encode { field: field.to_string(), value: value.to_string() }
}

pub struct BinaryWriter<W> {
    inner: W,
    origin: PathBuf,
}
impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W, origin: impl Into<PathBuf>) -> Self {
        Self { inner, origin: origin.into() }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let written = self.inner.write_all(bytes);
        written.map_err(|e| self.io_error(e))
    }
}

impl<W: Write> AssetWriter for BinaryWriter<W> {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        let written = self.inner.write_i16::<LittleEndian>(value);
        written.map_err(|e| self.io_error(e))
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        let written = self.inner.write_u16::<LittleEndian>(value);
        written.map_err(|e| self.io_error(e))
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        let written = self.inner.write_u32::<LittleEndian>(value);
        written.map_err(|e| self.io_error(e))
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        let written = self.inner.write_f32::<LittleEndian>(value);
        written.map_err(|e| self.io_error(e))
    }

    fn write_string(&mut self, field: &str, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| encode_error(field, value))?;
        self.write_u16(len)?;
        self.write_raw(value.as_bytes())
    }

    fn write_node_name(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            None => self.write_i16(-1),
            Some(name) => {
                let len = i16::try_from(name.len()).map_err(|_| encode_error("transform name", name))?;
                self.write_i16(len)?;
                self.write_raw(name.as_bytes())
            }
        }
    }

    fn write_texture_name(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            None => self.write_u16(0),
            Some("") => Err(encode_error("texture name", "")),
            Some(name) => self.write_string("texture name", name),
        }
    }

    fn write_vertices(&mut self, _format: VertexFormat, _skinned: bool, bytes: &[u8]) -> Result<()> {
        self.write_raw(bytes)
    }

    fn end_record(&mut self) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let flushed = self.inner.flush();
        flushed.map_err(|e| self.io_error(e))
    }
}

pub struct AsciiWriter<W> {
    inner: W,
    origin: PathBuf,
    line_start: bool,
}
impl<W: Write> AsciiWriter<W> {
    pub fn new(inner: W, origin: impl Into<PathBuf>) -> Self {
        Self { inner, origin: origin.into(), line_start: true }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn token(&mut self, token: &str) -> Result<()> {
        let written = if self.line_start {
            write!(self.inner, "{}", token)
        } else {
            write!(self.inner, " {}", token)
        };
        self.line_start = false;
        written.map_err(|e| self.io_error(e))
    }

    fn word<'a>(&self, field: &str, value: &'a str) -> Result<&'a str> {
        if value.is_empty() || value.contains(char::is_whitespace) {
            return Err(encode_error(field, value));
        }
        Ok(value)
    }
}

impl<W: Write> AssetWriter for AsciiWriter<W> {
    fn origin(&self) -> &Path {
        &self.origin
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.token(&value.to_string())
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.token(&value.to_string())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.token(&value.to_string())
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.token(&value.to_string())
    }

    fn write_string(&mut self, field: &str, value: &str) -> Result<()> {
        let value = self.word(field, value)?;
        self.token(value)
    }

    fn write_node_name(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            None => self.token(CHILD_END_TRANSFORM),
            Some(CHILD_END_TRANSFORM) => Err(encode_error("transform name", CHILD_END_TRANSFORM)),
            Some(name) => self.write_string("transform name", name),
        }
    }

    fn write_texture_name(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            None => self.token(NULL_TEXTURE),
            Some(NULL_TEXTURE) => Err(encode_error("texture name", NULL_TEXTURE)),
            Some(name) => self.write_string("texture name", name),
        }
    }

    fn write_vertices(&mut self, format: VertexFormat, skinned: bool, bytes: &[u8]) -> Result<()> {
        let stride = format.byte_size(skinned);
        if stride == 0 {
            return Ok(());
        }
        let word = |chunk: &[u8]| -> [u8; 4] { [chunk[0], chunk[1], chunk[2], chunk[3]] };
        for vertex in bytes.chunks_exact(stride) {
            let mut offset = 0;
            for (_, size) in format.attributes() {
                for chunk in vertex[offset..offset + size].chunks_exact(4) {
                    self.write_f32(f32::from_ne_bytes(word(chunk)))?;
                }
                offset += size;
                self.end_record()?;
            }
            if skinned {
                for chunk in vertex[offset..offset + 16].chunks_exact(4) {
                    self.token(&i32::from_ne_bytes(word(chunk)).to_string())?;
                }
                self.end_record()?;
                for chunk in vertex[offset + 16..offset + 32].chunks_exact(4) {
                    self.write_f32(f32::from_ne_bytes(word(chunk)))?;
                }
                self.end_record()?;
            }
        }
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        if self.line_start {
            return Ok(());
        }
        self.line_start = true;
        let written = self.inner.write_all(b"\n");
        written.map_err(|e| self.io_error(e))
    }

    fn flush(&mut self) -> Result<()> {
        self.end_record()?;
        let flushed = self.inner.flush();
        flushed.map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_rejects_unencodable_names() {
        let mut writer = AsciiWriter::new(Vec::new(), "mem");
        assert!(matches!(writer.write_string("material name", "two words"), Err(AssetError::Encode { .. })));
        assert!(matches!(writer.write_node_name(Some(CHILD_END_TRANSFORM)), Err(AssetError::Encode { .. })));
        assert!(matches!(writer.write_texture_name(Some(NULL_TEXTURE)), Err(AssetError::Encode { .. })));
    }

    #[test]
    fn ascii_lines() {
        let mut buffer = Vec::new();
        {
            let mut writer = AsciiWriter::new(&mut buffer, "mem");
            writer.write_node_name(Some("Hips")).unwrap();
            writer.end_record().unwrap();
            writer.write_vec3(Vec3::new(1.0, 0.5, -2.0)).unwrap();
            writer.end_record().unwrap();
            writer.write_node_name(None).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(String::from_utf8(buffer).unwrap(), "Hips\n1 0.5 -2\nChildEndTransform\n");
    }

    #[test]
    fn ascii_bone_indices_are_signed() {
        let mut bytes = vec![];
        for v in [0.0f32, 1.0, 2.0] {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        for i in [5i32, -1, 0, 0] {
            bytes.extend_from_slice(&i.to_ne_bytes());
        }
        for w in [1.0f32, 0.0, 0.0, 0.0] {
            bytes.extend_from_slice(&w.to_ne_bytes());
        }
        let mut writer = AsciiWriter::new(Vec::new(), "mem");
        writer.write_vertices(VertexFormat::POSITION, true, &bytes).unwrap();
        writer.flush().unwrap();
        assert_eq!(String::from_utf8(writer.inner).unwrap(), "0 1 2\n5 -1 0 0\n1 0 0 0\n");
    }

    #[test]
    fn binary_string_is_length_prefixed() {
        let mut writer = BinaryWriter::new(Vec::new(), "mem");
        writer.write_string("name", "ab").unwrap();
        writer.write_texture_name(None).unwrap();
        writer.write_node_name(None).unwrap();
        assert_eq!(writer.inner, vec![2, 0, b'a', b'b', 0, 0, 0xff, 0xff]);
    }
}

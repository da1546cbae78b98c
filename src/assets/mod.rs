use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use bytemuck::Pod;

use crate::error::{AssetError, Result};

pub mod file_formats;
pub mod manifest;
pub mod material;
pub mod model;
pub mod skinned_model;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetEncoding {
    Ascii,
    Binary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    SkinnedModel,
    Animation,
}

/// Kind and encoding implied by a file extension.
pub fn classify(path: &Path) -> Result<(AssetKind, AssetEncoding)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("uma") => Ok((AssetKind::Model, AssetEncoding::Ascii)),
        Some("umb") => Ok((AssetKind::Model, AssetEncoding::Binary)),
        Some("usa") => Ok((AssetKind::SkinnedModel, AssetEncoding::Ascii)),
        Some("usb") => Ok((AssetKind::SkinnedModel, AssetEncoding::Binary)),
        Some("usaa") => Ok((AssetKind::Animation, AssetEncoding::Ascii)),
        Some("usab") => Ok((AssetKind::Animation, AssetEncoding::Binary)),
        _ => Err(AssetError::Load {
            path: path.to_path_buf(),
            field: "file extension".to_string(),
            reason: "expected one of uma, umb, usa, usb, usaa, usab".to_string(),
        }),
    }
}

impl AssetEncoding {
    pub fn from_path(path: &Path) -> Result<Self> {
        classify(path).map(|(_, encoding)| encoding)
    }
}

/// Directory texture names are relative to.
pub fn asset_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::new(),
    }
}

pub(crate) fn open_file(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| AssetError::Io { path: path.to_path_buf(), source })
}

pub(crate) fn create_file(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| AssetError::Io { path: path.to_path_buf(), source })
}

/// Reinterprets packed vertex bytes as `V`. The caller has validated the
/// stride against `size_of::<V>()`.
pub(crate) fn vertices_from_bytes<V: Pod>(bytes: &[u8], count: usize) -> Vec<V> {
    if std::mem::size_of::<V>() == 0 {
        return vec![V::zeroed(); count];
    }
    bytemuck::pod_collect_to_vec(bytes)
}

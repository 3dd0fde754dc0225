use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use super::archive::Archive;
use super::error::{Result, ZipError};
use crate::io::ReadAt;

/// ZIP member extractor
pub struct ZipExtractor<'a, R> {
    archive: &'a Archive<R>,
}

impl<'a, R: ReadAt> ZipExtractor<'a, R> {
    pub fn new(archive: &'a Archive<R>) -> Self {
        Self { archive }
    }

    /// Stream a member's contents into `writer`, returning the byte count.
    pub fn extract_to_writer<W: Write + ?Sized>(&self, index: usize, writer: &mut W) -> Result<u64> {
        let mut stream = self.archive.open_member(index)?;
        let copied = io::copy(&mut stream, writer).map_err(ZipError::from_io)?;
        stream.close();
        Ok(copied)
    }

    /// Extract member data to memory
    pub fn extract_to_memory(&self, index: usize) -> Result<Vec<u8>> {
        let capacity = self
            .archive
            .members()
            .get(index)
            .map_or(0, |m| m.uncompressed_size as usize);
        let mut data = Vec::with_capacity(capacity);
        self.extract_to_writer(index, &mut data)?;
        Ok(data)
    }

    /// Extract a member to disk, creating parent directories as needed.
    ///
    /// Directory members only create the directory.
    pub fn extract_to_file(&self, index: usize, output_path: &Path) -> Result<u64> {
        let is_directory = self
            .archive
            .members()
            .get(index)
            .is_some_and(|m| m.is_directory);
        if is_directory {
            fs::create_dir_all(output_path)?;
            return Ok(0);
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = io::BufWriter::new(fs::File::create(output_path)?);
        let written = self.extract_to_writer(index, &mut file)?;
        file.flush()?;
        Ok(written)
    }

    /// Extract member to stdout
    pub fn extract_to_stdout(&self, index: usize) -> Result<u64> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let written = self.extract_to_writer(index, &mut lock)?;
        lock.flush()?;
        Ok(written)
    }

    /// Where the member at `index` lands under `root`.
    ///
    /// Absolute names and `..` components are refused. With `junk_paths`
    /// only the final component of the name is kept.
    pub fn output_path(&self, index: usize, root: &Path, junk_paths: bool) -> Result<PathBuf> {
        let name = self
            .archive
            .name_lossy(index)
            .ok_or_else(|| ZipError::NotFound(format!("index {index}")))?;
        let relative = sanitize_name(&name)?;

        let relative = if junk_paths {
            relative
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| ZipError::UnsafePath(name.to_string()))?
        } else {
            relative
        };

        Ok(root.join(relative))
    }
}

/// Turn an archive name into a relative path that stays below its root.
fn sanitize_name(name: &str) -> Result<PathBuf> {
    let unsafe_path = || ZipError::UnsafePath(name.to_string());

    if name.starts_with('/') || name.starts_with('\\') {
        return Err(unsafe_path());
    }

    let mut path = PathBuf::new();
    for part in name.split(['/', '\\']) {
        match Path::new(part).components().next() {
            None | Some(Component::CurDir) => {}
            Some(Component::Normal(_)) if !part.contains(':') => path.push(part),
            _ => return Err(unsafe_path()),
        }
    }

    if path.as_os_str().is_empty() {
        return Err(unsafe_path());
    }
    Ok(path)
}

//! Little-endian primitives and whole-file I/O for pack files
//!
//! Every read from an untrusted buffer goes through [`ByteReader`], which
//! reports `CorruptPack` instead of indexing past the end.

use crate::error::{DataPackError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Bounds-checked cursor over a borrowed pack buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Create a reader positioned at `pos`
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
        if pos > data.len() {
            return Err(DataPackError::corrupt(format!(
                "position {} is past the end of a {} byte buffer",
                pos,
                data.len()
            )));
        }
        Ok(ByteReader { data, pos })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                DataPackError::corrupt(format!(
                    "need {} bytes at offset {}, only {} available",
                    len,
                    self.pos,
                    self.remaining()
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Slice `data[start..end]`, failing with `CorruptPack` on an inverted or
/// out-of-bounds range
pub fn slice_range(data: &[u8], start: usize, end: usize) -> Result<&[u8]> {
    if start > end || end > data.len() {
        return Err(DataPackError::corrupt(format!(
            "resource range {}..{} is invalid for a {} byte buffer",
            start,
            end,
            data.len()
        )));
    }
    Ok(&data[start..end])
}

pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

pub fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Read a whole file into memory
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Write a whole buffer to `path`, replacing any existing file
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(())
}

//! Little-endian byte cursors for fixed-layout headers.
//!
//! Header fields are read and written through these typed primitives so that
//! no call site does its own byte shuffling.

use crate::error::StorageError;

/// Reader over a borrowed byte slice.
///
/// A read that would run past the end fails with
/// [`StorageError::UnexpectedEof`] and leaves the position unchanged.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), StorageError> {
        let new_pos = self.pos.checked_add(n).ok_or(StorageError::UnexpectedEof)?;
        if new_pos > self.data.len() {
            return Err(StorageError::UnexpectedEof);
        }
        self.pos = new_pos;
        Ok(())
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], StorageError> {
        if self.remaining() < N {
            return Err(StorageError::UnexpectedEof);
        }
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    pub(crate) fn read_u16_le(&mut self) -> Result<u16, StorageError> {
        self.read_fixed_bytes().map(u16::from_le_bytes)
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, StorageError> {
        self.read_fixed_bytes().map(u32::from_le_bytes)
    }

    pub(crate) fn read_i32_le(&mut self) -> Result<i32, StorageError> {
        self.read_fixed_bytes().map(i32::from_le_bytes)
    }
}

/// Writer into a caller-provided fixed buffer.
pub(crate) struct ByteWriter<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub(crate) fn bytes_left(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if self.bytes_left() < bytes.len() {
            return Err(StorageError::WriteZero);
        }
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    pub(crate) fn write_u16_le(&mut self, value: u16) -> Result<(), StorageError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub(crate) fn write_u32_le(&mut self, value: u32) -> Result<(), StorageError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub(crate) fn write_i32_le(&mut self, value: i32) -> Result<(), StorageError> {
        self.write_bytes(&value.to_le_bytes())
    }
}

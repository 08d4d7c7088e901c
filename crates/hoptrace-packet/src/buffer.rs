use crate::error::{Error, Result};

/// A byte buffer that holds a mutable or immutable byte slice.
#[derive(Debug)]
pub enum Buffer<'a> {
    Immutable(&'a [u8]),
    Mutable(&'a mut [u8]),
}

impl<'a> Buffer<'a> {
    /// Wrap a mutable slice, checking it can hold at least `min` bytes.
    pub fn mutable(name: &str, min: usize, packet: &'a mut [u8]) -> Result<Self> {
        check_len(name, min, packet.len())?;
        Ok(Buffer::Mutable(packet))
    }

    /// Wrap an immutable slice, checking it can hold at least `min` bytes.
    pub fn immutable(name: &str, min: usize, packet: &'a [u8]) -> Result<Self> {
        check_len(name, min, packet.len())?;
        Ok(Buffer::Immutable(packet))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Immutable(packet) => packet,
            Buffer::Mutable(packet) => packet,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Read a big-endian `u16` at `offset`.
    pub fn get_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes(self.get_bytes(offset))
    }

    /// Write a `u16` at `offset` in big-endian order.
    pub fn set_u16(&mut self, offset: usize, val: u16) {
        self.set_bytes(offset, val.to_be_bytes());
    }

    pub fn get_bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        let slice = self.as_slice();
        core::array::from_fn(|i| slice[offset + i])
    }

    pub fn set_bytes<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) {
        self.as_slice_mut()[offset..offset + N].copy_from_slice(&bytes);
    }

    pub fn read(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    pub fn write(&mut self, offset: usize) -> &mut u8 {
        &mut self.as_slice_mut()[offset]
    }

    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        match self {
            Buffer::Immutable(_) => panic!("write operation called on readonly buffer"),
            Buffer::Mutable(packet) => packet,
        }
    }
}

fn check_len(name: &str, min: usize, len: usize) -> Result<()> {
    if len >= min {
        Ok(())
    } else {
        Err(Error::InsufficientPacketBuffer(String::from(name), min, len))
    }
}

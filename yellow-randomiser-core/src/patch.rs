use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::{RandomiserError, Result};

/// Addressable byte storage an image can be read from.
pub trait ByteSource {
    fn read_byte(&self, address: usize) -> Result<u8>;
}

/// Addressable byte storage an image can be written to.
pub trait ByteSink {
    fn write_byte(&mut self, address: usize, value: u8) -> Result<()>;
}

impl ByteSource for [u8] {
    fn read_byte(&self, address: usize) -> Result<u8> {
        self.get(address)
            .copied()
            .ok_or(RandomiserError::AddressOutOfBounds {
                address,
                len: self.len(),
            })
    }
}

impl ByteSink for [u8] {
    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        let len = self.len();
        let slot = self
            .get_mut(address)
            .ok_or(RandomiserError::AddressOutOfBounds { address, len })?;
        *slot = value;
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn read_byte(&self, address: usize) -> Result<u8> {
        self.as_slice().read_byte(address)
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        self.as_mut_slice().write_byte(address, value)
    }
}

// `&File` implements Read and Seek, so reads don't need a mutable handle.
impl ByteSource for File {
    fn read_byte(&self, address: usize) -> Result<u8> {
        let mut file = self;
        file.seek(SeekFrom::Start(address as u64))?;
        let mut buf = [0u8; 1];
        file.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl ByteSink for File {
    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        self.seek(SeekFrom::Start(address as u64))?;
        self.write_all(&[value])?;
        Ok(())
    }
}

/// One byte of the image and the address it lives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytePatch {
    address: usize,
    value: u8,
}

impl BytePatch {
    pub fn new(address: usize, value: u8) -> Self {
        Self { address, value }
    }

    /// Capture the byte currently stored at `address`.
    pub fn read<S: ByteSource + ?Sized>(source: &S, address: usize) -> Result<Self> {
        Ok(Self {
            address,
            value: source.read_byte(address)?,
        })
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Write this patch's value at its address. No other byte is touched.
    pub fn write<S: ByteSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.write_byte(self.address, self.value)
    }
}

/// An ordered run of patches belonging to one attribute.
///
/// Patches are grouped into records of `width` consecutive entries (one byte
/// per record for a plain stat, two for a pointer pair, three for cry
/// parameters). Randomisation only ever moves whole records, and only within
/// a single group. Addresses never change once the group is read; shuffling
/// produces a new group with the same addresses and a new value sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchGroup {
    name: &'static str,
    width: usize,
    addresses: Vec<usize>,
    values: Vec<u8>,
}

impl PatchGroup {
    /// Read the current value at every address in `addresses`.
    pub fn read<S: ByteSource + ?Sized>(
        source: &S,
        name: &'static str,
        width: usize,
        addresses: Vec<usize>,
    ) -> Result<Self> {
        let values = addresses
            .iter()
            .map(|&address| source.read_byte(address))
            .collect::<Result<Vec<u8>>>()?;
        Self::from_parts(name, width, addresses, values)
    }

    pub fn from_parts(
        name: &'static str,
        width: usize,
        addresses: Vec<usize>,
        values: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || addresses.len() % width != 0 {
            return Err(RandomiserError::Config(format!(
                "patch group '{}' has {} addresses, not a multiple of record width {}",
                name,
                addresses.len(),
                width
            )));
        }
        if addresses.len() != values.len() {
            return Err(RandomiserError::Config(format!(
                "patch group '{}' has {} addresses but {} values",
                name,
                addresses.len(),
                values.len()
            )));
        }

        Ok(Self {
            name,
            width,
            addresses,
            values,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn record_count(&self) -> usize {
        self.addresses.len() / self.width
    }

    pub fn addresses(&self) -> &[usize] {
        &self.addresses
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Values of the `index`th record.
    pub fn record(&self, index: usize) -> &[u8] {
        let start = index * self.width;
        &self.values[start..start + self.width]
    }

    pub fn records(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.values.chunks(self.width)
    }

    /// Same addresses, new values. `values` must be as long as the group.
    pub(crate) fn with_values(&self, values: Vec<u8>) -> Self {
        debug_assert_eq!(values.len(), self.addresses.len());
        Self {
            name: self.name,
            width: self.width,
            addresses: self.addresses.clone(),
            values,
        }
    }

    pub fn patches(&self) -> impl Iterator<Item = BytePatch> + '_ {
        self.addresses
            .iter()
            .zip(&self.values)
            .map(|(&address, &value)| BytePatch::new(address, value))
    }
}

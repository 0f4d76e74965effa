use std::{
    convert::TryFrom,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::{GzDecoder, ZlibDecoder};
use log::debug;

use super::{Compression, NbtIoError};
use crate::{
    option::{OptionState, READ_DEPTH_LIMIT, READ_SIZE_LIMIT},
    NbtCompound,
    NbtList,
    NbtTag,
    TagType,
};

/// The number of decompressed bytes a default reader accepts: 2 MiB.
pub const DEFAULT_SIZE_LIMIT: u64 = 2 * 1024 * 1024;
/// The deepest nesting of compounds and lists a default reader accepts.
pub const DEFAULT_DEPTH_LIMIT: u32 = 512;

// Caps up-front allocations for lists, whose elements are accounted one at a time
const MAX_LIST_PREALLOCATION: usize = 1024;

/// Reads binary NBT data, enforcing limits on the size and depth of the tag tree.
///
/// Sizes are accounted against the decompressed payload: every primitive accounts for its width,
/// and strings and arrays account for their full length before any of it is allocated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NbtReader {
    size_limit: Option<u64>,
    depth_limit: u32,
}

impl Default for NbtReader {
    fn default() -> Self {
        NbtReader {
            size_limit: Some(DEFAULT_SIZE_LIMIT),
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl NbtReader {
    /// Returns a reader with the default size and depth limits.
    pub fn new() -> Self {
        NbtReader::default()
    }

    /// Returns a reader with no size limit. The default depth limit still applies.
    pub fn unlimited() -> Self {
        NbtReader {
            size_limit: None,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Returns a reader with the given limits. A size limit of `None` disables size accounting.
    pub fn with_limits(size_limit: Option<u64>, depth_limit: u32) -> Self {
        NbtReader {
            size_limit,
            depth_limit,
        }
    }

    /// Builds a reader from [`READ_SIZE_LIMIT`] and [`READ_DEPTH_LIMIT`]. A size limit of zero means
    /// unlimited.
    pub fn from_options(options: &OptionState) -> Self {
        let size_limit = match options.value(&READ_SIZE_LIMIT) {
            0 => None,
            limit => Some(limit),
        };

        NbtReader {
            size_limit,
            depth_limit: options.value(&READ_DEPTH_LIMIT),
        }
    }

    /// Returns the size limit of this reader, if any.
    pub fn size_limit(&self) -> Option<u64> {
        self.size_limit
    }

    /// Returns the depth limit of this reader.
    pub fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    /// Reads a named root compound, discarding its name.
    pub fn read<R: Read>(&self, source: R, compression: Compression) -> Result<NbtCompound, NbtIoError> {
        self.read_named(source, compression).map(|(_, root)| root)
    }

    /// Reads a named root compound, returning its name along with the compound.
    pub fn read_named<R: Read>(
        &self,
        source: R,
        compression: Compression,
    ) -> Result<(String, NbtCompound), NbtIoError>
    {
        self.decode(source, compression, |decoder| {
            decoder.expect_root()?;
            let name = decoder.read_string()?;
            let root = decoder.read_compound()?;
            debug!(
                "Read root compound '{}' with {} tags ({} bytes)",
                name,
                root.len(),
                decoder.accounted
            );
            Ok((name, root))
        })
    }

    /// Reads a root compound which is not followed by a name, as sent over the network.
    pub fn read_nameless<R: Read>(
        &self,
        source: R,
        compression: Compression,
    ) -> Result<NbtCompound, NbtIoError>
    {
        self.decode(source, compression, |decoder| {
            decoder.expect_root()?;
            let root = decoder.read_compound()?;
            debug!(
                "Read nameless root compound with {} tags ({} bytes)",
                root.len(),
                decoder.accounted
            );
            Ok(root)
        })
    }

    /// Reads a named root compound from the file at the given path, discarding its name.
    pub fn read_path<P: AsRef<Path>>(
        &self,
        path: P,
        compression: Compression,
    ) -> Result<NbtCompound, NbtIoError>
    {
        self.read_path_named(path, compression).map(|(_, root)| root)
    }

    /// Reads a named root compound from the file at the given path.
    pub fn read_path_named<P: AsRef<Path>>(
        &self,
        path: P,
        compression: Compression,
    ) -> Result<(String, NbtCompound), NbtIoError>
    {
        let path = path.as_ref();
        debug!("Reading {} NBT from {}", compression, path.display());
        self.read_named(BufReader::new(File::open(path)?), compression)
    }

    // Wraps the source in the right decompressor and hands a decoder to the given function
    fn decode<R, T, F>(&self, source: R, compression: Compression, f: F) -> Result<T, NbtIoError>
    where
        R: Read,
        F: FnOnce(&mut TagDecoder<&mut dyn Read>) -> Result<T, NbtIoError>,
    {
        match compression {
            Compression::None => {
                let mut source = source;
                let reader: &mut dyn Read = &mut source;
                f(&mut TagDecoder::new(reader, self))
            }
            Compression::Gzip => {
                let mut source = GzDecoder::new(source);
                let reader: &mut dyn Read = &mut source;
                f(&mut TagDecoder::new(reader, self))
            }
            Compression::Zlib => {
                let mut source = ZlibDecoder::new(source);
                let reader: &mut dyn Read = &mut source;
                f(&mut TagDecoder::new(reader, self))
            }
        }
    }
}

struct TagDecoder<R> {
    reader: R,
    size_limit: Option<u64>,
    depth_limit: u32,
    accounted: u64,
    depth: u32,
}

impl<R: Read> TagDecoder<R> {
    fn new(reader: R, config: &NbtReader) -> Self {
        TagDecoder {
            reader,
            size_limit: config.size_limit,
            depth_limit: config.depth_limit,
            accounted: 0,
            depth: 0,
        }
    }

    // Records that the given number of bytes are about to be read
    fn account(&mut self, bytes: u64) -> Result<(), NbtIoError> {
        self.accounted = self.accounted.saturating_add(bytes);
        match self.size_limit {
            Some(limit) if self.accounted > limit => Err(NbtIoError::SizeLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    fn enter(&mut self) -> Result<(), NbtIoError> {
        if self.depth >= self.depth_limit {
            return Err(NbtIoError::DepthLimitExceeded {
                limit: self.depth_limit,
            });
        }

        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn expect_root(&mut self) -> Result<(), NbtIoError> {
        match self.read_type()? {
            TagType::Compound => Ok(()),
            other => Err(NbtIoError::InvalidRootType(other)),
        }
    }

    fn read_type(&mut self) -> Result<TagType, NbtIoError> {
        self.account(1)?;
        Ok(TagType::try_from(self.reader.read_u8()?)?)
    }

    fn read_length(&mut self) -> Result<usize, NbtIoError> {
        self.account(4)?;
        let length = self.reader.read_i32::<BigEndian>()?;
        if length < 0 {
            return Err(NbtIoError::NegativeLength(length));
        }

        Ok(length as usize)
    }

    fn read_string(&mut self) -> Result<String, NbtIoError> {
        self.account(2)?;
        let length = self.reader.read_u16::<BigEndian>()? as usize;
        self.account(length as u64)?;

        let mut bytes = vec![0u8; length];
        self.reader.read_exact(&mut bytes)?;

        cesu8::from_java_cesu8(&bytes)
            .map(|string| string.into_owned())
            .map_err(|_| NbtIoError::InvalidString)
    }

    fn read_payload(&mut self, tag_type: TagType) -> Result<NbtTag, NbtIoError> {
        let tag = match tag_type {
            TagType::End => NbtTag::End,
            TagType::Byte => {
                self.account(1)?;
                NbtTag::Byte(self.reader.read_i8()?)
            }
            TagType::Short => {
                self.account(2)?;
                NbtTag::Short(self.reader.read_i16::<BigEndian>()?)
            }
            TagType::Int => {
                self.account(4)?;
                NbtTag::Int(self.reader.read_i32::<BigEndian>()?)
            }
            TagType::Long => {
                self.account(8)?;
                NbtTag::Long(self.reader.read_i64::<BigEndian>()?)
            }
            TagType::Float => {
                self.account(4)?;
                NbtTag::Float(self.reader.read_f32::<BigEndian>()?)
            }
            TagType::Double => {
                self.account(8)?;
                NbtTag::Double(self.reader.read_f64::<BigEndian>()?)
            }
            TagType::ByteArray => {
                let length = self.read_length()?;
                self.account(length as u64)?;
                let mut array = vec![0i8; length];
                self.reader.read_i8_into(&mut array)?;
                NbtTag::ByteArray(array)
            }
            TagType::String => NbtTag::String(self.read_string()?),
            TagType::List => NbtTag::List(self.read_list()?),
            TagType::Compound => NbtTag::Compound(self.read_compound()?),
            TagType::IntArray => {
                let length = self.read_length()?;
                self.account(4 * length as u64)?;
                let mut array = vec![0i32; length];
                self.reader.read_i32_into::<BigEndian>(&mut array)?;
                NbtTag::IntArray(array)
            }
            TagType::LongArray => {
                let length = self.read_length()?;
                self.account(8 * length as u64)?;
                let mut array = vec![0i64; length];
                self.reader.read_i64_into::<BigEndian>(&mut array)?;
                NbtTag::LongArray(array)
            }
        };

        Ok(tag)
    }

    fn read_list(&mut self) -> Result<NbtList, NbtIoError> {
        let element_type = self.read_type()?;
        let length = self.read_length()?;

        if element_type == TagType::End && length > 0 {
            return Err(NbtIoError::InvalidListType(length as i32));
        }

        self.enter()?;
        let mut tags = Vec::with_capacity(length.min(MAX_LIST_PREALLOCATION));
        for _ in 0 .. length {
            tags.push(self.read_payload(element_type)?);
        }
        self.exit();

        Ok(NbtList::from_parts(element_type, tags))
    }

    fn read_compound(&mut self) -> Result<NbtCompound, NbtIoError> {
        self.enter()?;
        let mut compound = NbtCompound::new();

        loop {
            let tag_type = self.read_type()?;
            if tag_type == TagType::End {
                break;
            }

            let name = self.read_string()?;
            let tag = self.read_payload(tag_type)?;
            compound.set(name, tag);
        }

        self.exit();
        Ok(compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // {"": {a: 1b}} uncompressed
    const SIMPLE: &[u8] = &[0x0A, 0x00, 0x00, 0x01, 0x00, 0x01, b'a', 0x01, 0x00];

    #[test]
    fn reads_simple_root() {
        let (name, root) = NbtReader::new()
            .read_named(SIMPLE, Compression::None)
            .expect("Failed to read root");
        assert_eq!(name, "");
        assert_eq!(root.get_byte("a"), Some(1));
    }

    #[test]
    fn rejects_non_compound_root() {
        let data: &[u8] = &[0x01, 0x00, 0x00, 0x05];
        match NbtReader::new().read(data, Compression::None) {
            Err(NbtIoError::InvalidRootType(TagType::Byte)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_tag_id() {
        let data: &[u8] = &[0x0A, 0x00, 0x00, 0x0D, 0x00, 0x00];
        assert!(matches!(
            NbtReader::new().read(data, Compression::None),
            Err(NbtIoError::InvalidTagId(13))
        ));
    }

    #[test]
    fn rejects_negative_lengths() {
        let data: &[u8] = &[
            0x0A, 0x00, 0x00, 0x07, 0x00, 0x01, b'b', 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
        ];
        assert!(matches!(
            NbtReader::new().read(data, Compression::None),
            Err(NbtIoError::NegativeLength(-1))
        ));
    }

    #[test]
    fn rejects_typed_end_lists() {
        let data: &[u8] = &[
            0x0A, 0x00, 0x00, 0x09, 0x00, 0x01, b'l', 0x00, 0x00, 0x00, 0x00, 0x02, 0x00,
        ];
        assert!(matches!(
            NbtReader::new().read(data, Compression::None),
            Err(NbtIoError::InvalidListType(2))
        ));
    }

    #[test]
    fn enforces_size_limit() {
        // A byte array claiming 16 MiB of content
        let data: &[u8] = &[
            0x0A, 0x00, 0x00, 0x07, 0x00, 0x01, b'b', 0x01, 0x00, 0x00, 0x00, 0x00,
        ];
        assert!(matches!(
            NbtReader::new().read(data, Compression::None),
            Err(NbtIoError::SizeLimitExceeded {
                limit: DEFAULT_SIZE_LIMIT
            })
        ));

        // The same data without a limit fails only because the source runs dry
        assert!(matches!(
            NbtReader::unlimited().read(data, Compression::None),
            Err(NbtIoError::Io(_))
        ));
    }

    #[test]
    fn enforces_depth_limit() {
        // Root compound holding a compound holding a compound
        let data: &[u8] = &[
            0x0A, 0x00, 0x00, 0x0A, 0x00, 0x01, b'a', 0x0A, 0x00, 0x01, b'b', 0x00, 0x00, 0x00,
        ];
        assert!(NbtReader::with_limits(None, 3).read(data, Compression::None).is_ok());
        assert!(matches!(
            NbtReader::with_limits(None, 2).read(data, Compression::None),
            Err(NbtIoError::DepthLimitExceeded { limit: 2 })
        ));
    }

    #[test]
    fn reads_nameless_root() {
        let data: &[u8] = &[0x0A, 0x03, 0x00, 0x01, b'i', 0x00, 0x00, 0x00, 0x2A, 0x00];
        let root = NbtReader::new()
            .read_nameless(data, Compression::None)
            .expect("Failed to read nameless root");
        assert_eq!(root.get_int("i"), Some(42));
    }
}

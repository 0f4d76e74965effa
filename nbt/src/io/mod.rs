use std::{
    fmt::{self, Display, Formatter},
    io::{self, BufRead, Read, Write},
    str::FromStr,
};

use thiserror::Error;

use crate::{InvalidTagType, NbtCompound, TagType};

mod read;
mod write;

pub use read::{NbtReader, DEFAULT_DEPTH_LIMIT, DEFAULT_SIZE_LIMIT};
pub use write::NbtWriter;

/// The compression applied around a binary NBT payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Compression {
    /// The payload is stored as-is.
    None,
    /// The payload is wrapped in a gzip stream, as done by most files on disk.
    Gzip,
    /// The payload is wrapped in a zlib stream, as done by region file chunks.
    Zlib,
}

impl Compression {
    /// Guesses the compression of a payload from its first bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nbt::io::Compression;
    /// assert_eq!(Compression::detect(&[0x1F, 0x8B, 0x08]), Compression::Gzip);
    /// assert_eq!(Compression::detect(&[0x78, 0x9C]), Compression::Zlib);
    /// assert_eq!(Compression::detect(&[0x0A, 0x00, 0x00]), Compression::None);
    /// ```
    pub fn detect(header: &[u8]) -> Compression {
        match header {
            [0x1F, 0x8B, ..] => Compression::Gzip,
            // The zlib header check bits make the first two bytes a multiple of 31
            [cmf @ 0x78, flg, ..] if ((*cmf as u16) << 8 | *flg as u16) % 31 == 0 =>
                Compression::Zlib,
            _ => Compression::None,
        }
    }

    /// Guesses the compression of a buffered source without consuming any of it.
    pub fn detect_from<R: BufRead + ?Sized>(source: &mut R) -> io::Result<Compression> {
        Ok(Self::detect(source.fill_buf()?))
    }

    /// Returns the lowercase name of this compression.
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
        }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Compression::None
    }
}

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = UnknownCompression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "gzip" | "gz" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            _ => Err(UnknownCompression(s.to_owned())),
        }
    }
}

/// Returned when parsing the name of an unknown compression.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("unknown compression '{0}', expected none, gzip or zlib")]
pub struct UnknownCompression(pub String);

/// An error raised while reading or writing binary NBT.
#[derive(Debug, Error)]
pub enum NbtIoError {
    /// The underlying source or sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A byte which should have been a tag type was not a valid type id.
    #[error("invalid tag type id {0}")]
    InvalidTagId(u8),
    /// The root tag of the payload was not a compound.
    #[error("expected root tag to be a compound, found {0}")]
    InvalidRootType(TagType),
    /// A list or array declared a negative length.
    #[error("negative length {0}")]
    NegativeLength(i32),
    /// A list declared the element type `TAG_End` but was not empty.
    #[error("list of TAG_End with a length of {0}")]
    InvalidListType(i32),
    /// A string was not valid modified UTF-8.
    #[error("invalid modified UTF-8 string")]
    InvalidString,
    /// The payload was larger than the reader allows.
    #[error("size limit of {limit} bytes exceeded")]
    SizeLimitExceeded {
        /// The configured limit.
        limit: u64,
    },
    /// Compounds and lists were nested deeper than the reader allows.
    #[error("maximum nesting depth of {limit} exceeded")]
    DepthLimitExceeded {
        /// The configured limit.
        limit: u32,
    },
    /// A string encodes to more than 65535 bytes.
    #[error("string of {0} encoded bytes is too long")]
    StringTooLong(usize),
    /// A list or array has more elements than an `i32` can count.
    #[error("sequence of {0} elements is too long")]
    LengthTooLong(usize),
    /// A compound holds an end tag, which has no binary representation as a named tag.
    #[error("cannot write TAG_End as the value of '{0}'")]
    EndTagInCompound(String),
    /// A list holds a tag which does not match its element type.
    #[error("list of {expected} contains a {found}")]
    NonHomogenousList {
        /// The element type of the list.
        expected: TagType,
        /// The type of the offending element.
        found: TagType,
    },
}

impl From<InvalidTagType> for NbtIoError {
    fn from(x: InvalidTagType) -> Self {
        NbtIoError::InvalidTagId(x.0)
    }
}

/// Reads a named root compound using a reader with the default limits.
pub fn read_nbt<R: Read>(
    source: R,
    compression: Compression,
) -> Result<(String, NbtCompound), NbtIoError>
{
    NbtReader::new().read_named(source, compression)
}

/// Writes the given compound as a named root using the default compression level.
pub fn write_nbt<W: Write>(
    sink: W,
    root_name: &str,
    root: &NbtCompound,
    compression: Compression,
) -> Result<(), NbtIoError>
{
    NbtWriter::new().write_named(root_name, root, sink, compression)
}

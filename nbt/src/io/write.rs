use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::{GzEncoder, ZlibEncoder};
use log::debug;

use super::{Compression, NbtIoError};
use crate::{NbtCompound, NbtList, NbtTag, TagType};

/// Writes binary NBT data, optionally compressed.
#[derive(Clone, Copy, Debug)]
pub struct NbtWriter {
    level: flate2::Compression,
}

impl Default for NbtWriter {
    fn default() -> Self {
        NbtWriter {
            level: flate2::Compression::default(),
        }
    }
}

impl NbtWriter {
    /// Returns a writer using the default compression level.
    pub fn new() -> Self {
        NbtWriter::default()
    }

    /// Returns a writer using the given compression level for gzip and zlib output.
    pub fn with_level(level: flate2::Compression) -> Self {
        NbtWriter { level }
    }

    /// Writes the given compound as a root with an empty name.
    pub fn write<W: Write>(
        &self,
        root: &NbtCompound,
        sink: W,
        compression: Compression,
    ) -> Result<(), NbtIoError>
    {
        self.write_named("", root, sink, compression)
    }

    /// Writes the given compound as a root with the given name.
    pub fn write_named<W: Write>(
        &self,
        root_name: &str,
        root: &NbtCompound,
        sink: W,
        compression: Compression,
    ) -> Result<(), NbtIoError>
    {
        debug!("Writing root compound '{}' with {} tags", root_name, root.len());
        self.encode(sink, compression, |writer| {
            writer.write_u8(TagType::Compound.id())?;
            write_string(writer, root_name)?;
            write_compound(writer, root)
        })
    }

    /// Writes the given compound as a root which is not followed by a name, as sent over the network.
    pub fn write_nameless<W: Write>(
        &self,
        root: &NbtCompound,
        sink: W,
        compression: Compression,
    ) -> Result<(), NbtIoError>
    {
        debug!("Writing nameless root compound with {} tags", root.len());
        self.encode(sink, compression, |writer| {
            writer.write_u8(TagType::Compound.id())?;
            write_compound(writer, root)
        })
    }

    /// Writes the given compound as a root with an empty name to the file at the given path,
    /// creating or truncating it.
    pub fn write_path<P: AsRef<Path>>(
        &self,
        root: &NbtCompound,
        path: P,
        compression: Compression,
    ) -> Result<(), NbtIoError>
    {
        let path = path.as_ref();
        debug!("Writing {} NBT to {}", compression, path.display());
        self.write(root, BufWriter::new(File::create(path)?), compression)
    }

    // Wraps the sink in the right compressor, and finishes it once the given function is done
    fn encode<W, F>(&self, sink: W, compression: Compression, f: F) -> Result<(), NbtIoError>
    where
        W: Write,
        F: FnOnce(&mut dyn Write) -> Result<(), NbtIoError>,
    {
        match compression {
            Compression::None => {
                let mut sink = sink;
                f(&mut sink)?;
                sink.flush()?;
            }
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(sink, self.level);
                f(&mut encoder)?;
                encoder.finish()?.flush()?;
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(sink, self.level);
                f(&mut encoder)?;
                encoder.finish()?.flush()?;
            }
        }

        Ok(())
    }
}

fn write_compound<W>(writer: &mut W, compound: &NbtCompound) -> Result<(), NbtIoError>
where
    W: Write + ?Sized,
{
    for (name, tag) in compound.iter() {
        if let NbtTag::End = tag {
            return Err(NbtIoError::EndTagInCompound(name.clone()));
        }

        writer.write_u8(tag.id())?;
        write_string(writer, name)?;
        write_tag_body(writer, tag)?;
    }

    // TAG_End
    writer.write_u8(0)?;
    Ok(())
}

fn write_list<W>(writer: &mut W, list: &NbtList) -> Result<(), NbtIoError>
where
    W: Write + ?Sized,
{
    let element_type = list.element_type();
    writer.write_u8(element_type.id())?;
    write_length(writer, list.len())?;

    for tag in list.iter() {
        if tag.tag_type() != element_type {
            return Err(NbtIoError::NonHomogenousList {
                expected: element_type,
                found: tag.tag_type(),
            });
        }

        write_tag_body(writer, tag)?;
    }

    Ok(())
}

fn write_tag_body<W>(writer: &mut W, tag: &NbtTag) -> Result<(), NbtIoError>
where
    W: Write + ?Sized,
{
    match tag {
        NbtTag::End => {}
        NbtTag::Byte(value) => writer.write_i8(*value)?,
        NbtTag::Short(value) => writer.write_i16::<BigEndian>(*value)?,
        NbtTag::Int(value) => writer.write_i32::<BigEndian>(*value)?,
        NbtTag::Long(value) => writer.write_i64::<BigEndian>(*value)?,
        NbtTag::Float(value) => writer.write_f32::<BigEndian>(*value)?,
        NbtTag::Double(value) => writer.write_f64::<BigEndian>(*value)?,
        NbtTag::ByteArray(value) => {
            write_length(writer, value.len())?;
            for byte in value.iter() {
                writer.write_i8(*byte)?;
            }
        }
        NbtTag::String(value) => write_string(writer, value)?,
        NbtTag::List(value) => write_list(writer, value)?,
        NbtTag::Compound(value) => write_compound(writer, value)?,
        NbtTag::IntArray(value) => {
            write_length(writer, value.len())?;
            for int in value.iter() {
                writer.write_i32::<BigEndian>(*int)?;
            }
        }
        NbtTag::LongArray(value) => {
            write_length(writer, value.len())?;
            for long in value.iter() {
                writer.write_i64::<BigEndian>(*long)?;
            }
        }
    }

    Ok(())
}

fn write_length<W>(writer: &mut W, length: usize) -> Result<(), NbtIoError>
where
    W: Write + ?Sized,
{
    if length > i32::MAX as usize {
        return Err(NbtIoError::LengthTooLong(length));
    }

    writer.write_i32::<BigEndian>(length as i32)?;
    Ok(())
}

fn write_string<W>(writer: &mut W, string: &str) -> Result<(), NbtIoError>
where
    W: Write + ?Sized,
{
    // The length prefix counts encoded bytes, not UTF-8 bytes
    let encoded = cesu8::to_java_cesu8(string);
    if encoded.len() > u16::MAX as usize {
        return Err(NbtIoError::StringTooLong(encoded.len()));
    }

    writer.write_u16::<BigEndian>(encoded.len() as u16)?;
    writer.write_all(&encoded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(root: &NbtCompound) -> Result<Vec<u8>, NbtIoError> {
        let mut buffer = Vec::new();
        NbtWriter::new().write(root, &mut buffer, Compression::None)?;
        Ok(buffer)
    }

    #[test]
    fn writes_simple_root() {
        let root = NbtCompound::builder().put_byte("a", 1).build();
        assert_eq!(
            encode(&root).expect("Failed to write root"),
            vec![0x0A, 0x00, 0x00, 0x01, 0x00, 0x01, b'a', 0x01, 0x00]
        );
    }

    #[test]
    fn writes_empty_list_with_element_type() {
        let root = NbtCompound::builder()
            .put_list("l", NbtList::with_element_type(TagType::Int))
            .build();
        assert_eq!(
            encode(&root).expect("Failed to write root"),
            vec![0x0A, 0x00, 0x00, 0x09, 0x00, 0x01, b'l', 0x03, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn encodes_modified_utf8() {
        let root = NbtCompound::builder().put_string("s", "\0").build();
        let bytes = encode(&root).expect("Failed to write root");
        // Type, name, then a two byte length and the two byte encoding of NUL
        assert_eq!(&bytes[7 ..], &[0x00, 0x02, 0xC0, 0x80, 0x00]);
    }

    #[test]
    fn rejects_long_strings() {
        let root = NbtCompound::builder()
            .put_string("s", "x".repeat(u16::MAX as usize + 1))
            .build();
        assert!(matches!(encode(&root), Err(NbtIoError::StringTooLong(65536))));
    }

    #[test]
    fn rejects_end_tags() {
        let mut root = NbtCompound::new();
        root.set("end", NbtTag::End);
        assert!(matches!(encode(&root), Err(NbtIoError::EndTagInCompound(name)) if name == "end"));
    }

    #[test]
    fn rejects_edited_lists() {
        let mut list = NbtList::new();
        list.add(NbtTag::Int(1)).expect("Failed to add int");
        list.add(NbtTag::Int(2)).expect("Failed to add int");
        list[1] = NbtTag::Byte(2);

        let root = NbtCompound::builder().put_list("l", list).build();
        assert!(matches!(
            encode(&root),
            Err(NbtIoError::NonHomogenousList {
                expected: TagType::Int,
                found: TagType::Byte
            })
        ));
    }
}

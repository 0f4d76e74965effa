use std::io::{BufReader, Cursor};

use nbt::{
    io::{read_nbt, write_nbt, Compression, NbtIoError, NbtReader, NbtWriter},
    option::{OptionState, READ_DEPTH_LIMIT, READ_SIZE_LIMIT},
    NbtCompound,
    NbtList,
    NbtTag,
    TagType,
};

fn level() -> NbtCompound {
    let mut inventory = NbtList::new();
    for slot in 0 .. 3 {
        inventory
            .add(NbtTag::Compound(
                NbtCompound::builder()
                    .put_byte("Slot", slot)
                    .put_string("id", "minecraft:stone")
                    .put_byte("Count", 64)
                    .build(),
            ))
            .expect("Failed to add item");
    }

    NbtCompound::builder()
        .put_string("LevelName", "Ünïcode wörld \0 with NUL")
        .put_long("Seed", -4_172_144_997_902_289_642)
        .put_float("Health", 20.0)
        .put_double("SpawnAngle", 0.25)
        .put_short("Air", 300)
        .put_byte_array("Bytes", vec![-1, 0, 1])
        .put_int_array("Ints", vec![i32::MIN, 0, i32::MAX])
        .put_long_array("Longs", vec![i64::MIN, i64::MAX])
        .put_list("Inventory", inventory)
        .put_list("Empty", NbtList::with_element_type(TagType::Double))
        .put_compound("Nested", NbtCompound::builder().put_boolean("flag", true).build())
        .build()
}

fn encode(root: &NbtCompound, compression: Compression) -> Vec<u8> {
    let mut buffer = Vec::new();
    write_nbt(&mut buffer, "Data", root, compression).expect("Failed to write root");
    buffer
}

#[test]
fn round_trips_every_compression() {
    let root = level();

    for compression in [Compression::None, Compression::Gzip, Compression::Zlib] {
        let bytes = encode(&root, compression);
        assert_eq!(Compression::detect(&bytes), compression);

        let (name, read) = read_nbt(Cursor::new(&bytes), compression).expect("Failed to read root");
        assert_eq!(name, "Data");
        assert_eq!(read, root, "Mismatch using {}", compression);
        assert_eq!(
            read.keys().collect::<Vec<_>>(),
            root.keys().collect::<Vec<_>>(),
            "Key order was not preserved"
        );
    }
}

#[test]
fn empty_lists_keep_their_type() {
    let bytes = encode(&level(), Compression::None);
    let read = NbtReader::new()
        .read(Cursor::new(bytes), Compression::None)
        .expect("Failed to read root");
    assert_eq!(read.get_list("Empty").map(NbtList::element_type), Some(TagType::Double));
    assert_eq!(
        read.get_list("Inventory").map(NbtList::element_type),
        Some(TagType::Compound)
    );
}

#[test]
fn detects_compression_from_buffered_source() {
    let bytes = encode(&level(), Compression::Gzip);
    let mut source = BufReader::new(Cursor::new(bytes));
    let compression = Compression::detect_from(&mut source).expect("Failed to peek source");
    assert_eq!(compression, Compression::Gzip);

    let root = NbtReader::new().read(source, compression).expect("Failed to read root");
    assert_eq!(root.get_string("LevelName"), Some("Ünïcode wörld \0 with NUL"));
}

#[test]
fn nameless_roots() {
    let root = level();
    let mut buffer = Vec::new();
    NbtWriter::new()
        .write_nameless(&root, &mut buffer, Compression::None)
        .expect("Failed to write root");
    assert_eq!(&buffer[.. 2], &[0x0A, 0x00]);

    let read = NbtReader::new()
        .read_nameless(Cursor::new(buffer), Compression::None)
        .expect("Failed to read root");
    assert_eq!(read, root);
}

#[test]
fn reader_limits_from_options() {
    let bytes = encode(&level(), Compression::None);

    let tight = OptionState::builder().value(&READ_SIZE_LIMIT, 16).build();
    let result = NbtReader::from_options(&tight).read(Cursor::new(&bytes), Compression::None);
    assert!(matches!(result, Err(NbtIoError::SizeLimitExceeded { limit: 16 })));

    let shallow = OptionState::builder().value(&READ_DEPTH_LIMIT, 1).build();
    let result = NbtReader::from_options(&shallow).read(Cursor::new(&bytes), Compression::None);
    assert!(matches!(result, Err(NbtIoError::DepthLimitExceeded { limit: 1 })));

    let unlimited = OptionState::builder().value(&READ_SIZE_LIMIT, 0).build();
    let reader = NbtReader::from_options(&unlimited);
    assert_eq!(reader.size_limit(), None);
    assert!(reader.read(Cursor::new(&bytes), Compression::None).is_ok());
}

#[test]
fn truncated_input() {
    let bytes = encode(&level(), Compression::None);
    let result = NbtReader::new().read(Cursor::new(&bytes[.. bytes.len() - 5]), Compression::None);
    assert!(matches!(result, Err(NbtIoError::Io(_))));
}

#[test]
fn files() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("level.dat");
    let root = level();

    NbtWriter::new()
        .write_path(&root, &path, Compression::Gzip)
        .expect("Failed to write file");
    let read = NbtReader::new()
        .read_path(&path, Compression::Gzip)
        .expect("Failed to read file");
    assert_eq!(read, root);

    let missing = NbtReader::new().read_path(dir.path().join("missing.dat"), Compression::Gzip);
    assert!(matches!(missing, Err(NbtIoError::Io(_))));
}

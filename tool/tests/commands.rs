use std::fs;

use nbt::{
    config::{CompressionMode, NbtConfig},
    io::{Compression, NbtReader},
    option::READ_DEPTH_LIMIT,
    snbt,
};
use nbt_tool::{compile, dump, examine, write_default_config, CompileOptions, DumpOptions, Settings};
use tempfile::tempdir;

const LEVEL: &str = "{Data: {LevelName: \"World\", Time: 24000l, Spawn: [I; 0, 64, 0]}, Ids: [1b, 2b]}";

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn compile_then_dump() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("level.snbt");
    let output = dir.path().join("level.dat");
    fs::write(&source, LEVEL).expect("Failed to write source");

    let settings = Settings::from_config(NbtConfig::default(), no_env);
    let options = CompileOptions {
        compression: None,
        name: "root".to_owned(),
    };
    compile(&source, &output, &options, &settings).expect("Failed to compile");

    let bytes = fs::read(&output).expect("Failed to read output");
    assert_eq!(Compression::detect(&bytes), Compression::Gzip);
    let (name, root) = NbtReader::new()
        .read_path_named(&output, Compression::Gzip)
        .expect("Failed to read compiled file");
    assert_eq!(name, "root");
    assert_eq!(root, snbt::parse(LEVEL).expect("Failed to parse level"));

    let dumped = dump(&output, &DumpOptions::default(), &settings).expect("Failed to dump");
    assert_eq!(
        dumped,
        "{Data:{LevelName:\"World\",Time:24000l,Spawn:[I;0,64,0]},Ids:[1b,2b]}"
    );

    let options = DumpOptions {
        indent: Some(1),
        legacy: true,
        ..DumpOptions::default()
    };
    let dumped = dump(&output, &options, &settings).expect("Failed to dump");
    assert!(dumped.contains("\n  LevelName: \"World\""));
    assert!(dumped.contains("0:1b"));
}

#[test]
fn config_compression_applies() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("small.snbt");
    let output = dir.path().join("small.nbt");
    fs::write(&source, "{a: 1}").expect("Failed to write source");

    let config = NbtConfig {
        compression: CompressionMode::Zlib,
        ..NbtConfig::default()
    };
    let settings = Settings::from_config(config, no_env);
    compile(&source, &output, &CompileOptions::default(), &settings).expect("Failed to compile");

    let bytes = fs::read(&output).expect("Failed to read output");
    assert_eq!(Compression::detect(&bytes), Compression::Zlib);
    assert_eq!(
        examine(&output, None, &settings).expect("Failed to examine"),
        "CompoundTag{tags={\"a\"=IntTag{value=1}}}"
    );
}

#[test]
fn environment_overrides_config() {
    let settings = Settings::from_config(NbtConfig::default(), |name| {
        (name == "NBT_READ_DEPTH_LIMIT").then(|| "1".to_owned())
    });
    assert_eq!(settings.options.value(&READ_DEPTH_LIMIT), 1);

    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("deep.snbt");
    let output = dir.path().join("deep.nbt");
    fs::write(&source, "{a: {b: 1}}").expect("Failed to write source");

    compile(&source, &output, &CompileOptions::default(), &settings).expect("Failed to compile");
    assert!(dump(&output, &DumpOptions::default(), &settings).is_err());
}

#[test]
fn invalid_input_reports_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("broken.snbt");
    fs::write(&source, "{a: [1, 'two']}").expect("Failed to write source");

    let settings = Settings::from_config(NbtConfig::default(), no_env);
    let error = compile(&source, &dir.path().join("out.nbt"), &CompileOptions::default(), &settings)
        .expect_err("Heterogeneous list compiled");
    assert!(format!("{:#}", error).contains("broken.snbt"));

    let missing = dir.path().join("missing.nbt");
    assert!(examine(&missing, None, &settings).is_err());
}

#[test]
fn default_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");

    let json = write_default_config(Some(&path)).expect("Failed to write config");
    assert_eq!(fs::read_to_string(&path).expect("Failed to read config"), json);

    let settings = Settings::load(Some(&path)).expect("Failed to load config");
    assert_eq!(settings.config, NbtConfig::default());
}

#[test]
fn failed_compile_leaves_no_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("named.snbt");
    let output = dir.path().join("named.nbt");
    fs::write(&source, "{a: 1}").expect("Failed to write source");

    let settings = Settings::from_config(NbtConfig::default(), no_env);
    let options = CompileOptions {
        compression: Some(Compression::None),
        name: "n".repeat(70_000),
    };
    let error = compile(&source, &output, &options, &settings).expect_err("Oversized name encoded");
    assert!(format!("{:#}", error).contains("named.snbt"));
    assert!(!output.exists());

    fs::write(&output, b"previous").expect("Failed to write previous output");
    assert!(compile(&source, &output, &options, &settings).is_err());
    assert_eq!(fs::read(&output).expect("Failed to read output"), b"previous");
}

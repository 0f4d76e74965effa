#![warn(missing_docs)]

//! The commands behind the `nbt` binary, kept separate so they can be driven from tests.

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info};
use nbt::{
    config::{load_config, NbtConfig},
    examine::{Examiner, StringExaminer},
    io::{Compression, NbtReader, NbtWriter},
    option::OptionState,
    snbt::SnbtIo,
    NbtCompound,
    NbtTag,
};

/// The prefix of environment variables overriding options, such as `NBT_READ_SIZE_LIMIT`.
pub const ENV_PREFIX: &str = "";

/// The configuration of a single invocation: the config file, then environment overrides.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    /// The loaded configuration file, or the default configuration.
    pub config: NbtConfig,
    /// Options derived from the configuration and the environment.
    pub options: OptionState,
}

impl Settings {
    /// Loads the configuration file at the given path, if any, and applies environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => NbtConfig::default(),
        };

        Ok(Self::from_config(config, |name| std::env::var(name).ok()))
    }

    /// Layers the given lookup, usually the environment, over the given configuration.
    pub fn from_config<F>(config: NbtConfig, lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let options = OptionState::builder()
            .values(&config.option_state())
            .values_from_source(ENV_PREFIX, lookup)
            .build();

        Settings { config, options }
    }

    fn reader(&self) -> NbtReader {
        NbtReader::from_options(&self.options)
    }
}

/// Options of the `dump` command.
#[derive(Clone, Debug, Default)]
pub struct DumpOptions {
    /// Overrides the compression of the input.
    pub compression: Option<Compression>,
    /// Overrides the number of spaces per indentation level.
    pub indent: Option<u32>,
    /// Writes legacy list indices.
    pub legacy: bool,
}

// Reads a binary file, detecting its compression unless one is given
fn read_file(
    path: &Path,
    compression: Option<Compression>,
    settings: &Settings,
) -> Result<(String, NbtCompound)>
{
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let compression =
        compression.unwrap_or_else(|| settings.config.compression.for_input(&bytes));
    debug!("Reading {} as {}", path.display(), compression);

    settings
        .reader()
        .read_named(Cursor::new(bytes), compression)
        .with_context(|| format!("Failed to decode {}", path.display()))
}

/// Reads a binary NBT file and returns it as SNBT.
pub fn dump(path: &Path, options: &DumpOptions, settings: &Settings) -> Result<String> {
    let (_, root) = read_file(path, options.compression, settings)?;

    let mut io = SnbtIo::from_options(&settings.options);
    if let Some(indent) = options.indent {
        io = io.indent(indent);
    }
    if options.legacy {
        io = io.emit_legacy(true);
    }

    Ok(io.as_string(&root))
}

/// Options of the `compile` command.
#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// Overrides the compression of the output.
    pub compression: Option<Compression>,
    /// The name of the root tag.
    pub name: String,
}

/// Parses an SNBT file and writes it to `output` as binary NBT.
pub fn compile(input: &Path, output: &Path, options: &CompileOptions, settings: &Settings) -> Result<()> {
    let snbt = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let root = SnbtIo::from_options(&settings.options)
        .as_compound(&snbt)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    let compression = options
        .compression
        .unwrap_or_else(|| settings.config.compression.for_output());

    // Encode fully before touching the output so a failure leaves no partial file
    let mut encoded = Vec::new();
    NbtWriter::new()
        .write_named(&options.name, &root, &mut encoded, compression)
        .with_context(|| format!("Failed to encode {}", input.display()))?;
    fs::write(output, &encoded).with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} tags to {} ({})", root.len(), output.display(), compression);
    Ok(())
}

/// Reads a binary NBT file and returns its examination string.
pub fn examine(path: &Path, compression: Option<Compression>, settings: &Settings) -> Result<String> {
    let (_, root) = read_file(path, compression, settings)?;
    Ok(StringExaminer::default().examine(&NbtTag::Compound(root)))
}

/// Returns the default configuration as JSON, writing it to `output` if given.
pub fn write_default_config(output: Option<&PathBuf>) -> Result<String> {
    let json = NbtConfig::default().to_json()?;
    if let Some(path) = output {
        fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote default config to {}", path.display());
    }

    Ok(json)
}

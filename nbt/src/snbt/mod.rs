//! Stringified NBT, the human-readable form of NBT used by commands.
//!
//! ```
//! # use nbt::snbt;
//! let compound = snbt::parse("{name: 'Steve', health: 20.0f, pos: [I; 1, 64, -3]}").unwrap();
//! assert_eq!(compound.get_string("name"), Some("Steve"));
//! assert_eq!(compound.get_float("health"), Some(20.0));
//! assert_eq!(compound.to_snbt(), "{name:\"Steve\",health:20.0f,pos:[I;1,64,-3]}");
//! ```

use std::fmt;

use crate::{
    option::{OptionState, SNBT_ACCEPT_LEGACY, SNBT_EMIT_LEGACY, SNBT_INDENT, SNBT_INDENT_TAB},
    NbtCompound,
    NbtList,
    NbtTag,
};

mod emit;
mod parse;

pub use parse::ParserError;

/// Parses the given string into an NBT tag compound using the default settings.
pub fn parse<T: AsRef<str> + ?Sized>(string_nbt: &T) -> Result<NbtCompound, ParserError> {
    SnbtIo::default().as_compound(string_nbt.as_ref())
}

/// Parses the given string into any NBT tag using the default settings.
///
/// ```
/// # use nbt::{snbt, NbtTag};
/// assert_eq!(snbt::parse_tag("3s").unwrap(), NbtTag::Short(3));
/// assert_eq!(snbt::parse_tag("true").unwrap(), NbtTag::Byte(1));
/// assert_eq!(snbt::parse_tag("3x").unwrap(), NbtTag::from("3x"));
/// ```
pub fn parse_tag<T: AsRef<str> + ?Sized>(string_nbt: &T) -> Result<NbtTag, ParserError> {
    SnbtIo::default().as_tag(string_nbt.as_ref())
}

/// Converts the given tag to compact SNBT.
pub fn to_snbt(tag: &NbtTag) -> String {
    let mut snbt = String::new();
    // Writing to a string cannot fail
    let _ = SnbtIo::default().write_tag(tag, &mut snbt);
    snbt
}

/// Reads and writes SNBT with a particular set of formatting and parsing settings.
///
/// The default settings emit compact SNBT and reject legacy list indices.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SnbtIo {
    indent: Option<String>,
    emit_legacy: bool,
    accept_legacy: bool,
}

impl SnbtIo {
    /// Returns the default settings.
    pub fn new() -> Self {
        SnbtIo::default()
    }

    /// Builds settings from the SNBT options of the given state.
    pub fn from_options(options: &OptionState) -> Self {
        let io = SnbtIo::new()
            .indent(options.value(&SNBT_INDENT))
            .emit_legacy(options.value(&SNBT_EMIT_LEGACY))
            .accept_legacy(options.value(&SNBT_ACCEPT_LEGACY));

        if options.value(&SNBT_INDENT_TAB) {
            io.indent_tab()
        } else {
            io
        }
    }

    /// Emits one entry per line, indenting each level by the given number of spaces. Zero restores
    /// compact output.
    ///
    /// ```
    /// # use nbt::{snbt::SnbtIo, NbtCompound};
    /// let compound = NbtCompound::builder().put_int("a", 1).put_string("b", "x").build();
    /// assert_eq!(SnbtIo::new().indent(2).as_string(&compound), "{\n  a: 1,\n  b: \"x\"\n}");
    /// ```
    pub fn indent(mut self, spaces: u32) -> Self {
        self.indent = if spaces == 0 {
            None
        } else {
            Some(" ".repeat(spaces as usize))
        };
        self
    }

    /// Emits one entry per line, indenting each level with a tab.
    pub fn indent_tab(mut self) -> Self {
        self.indent = Some("\t".to_owned());
        self
    }

    /// Sets whether list elements are emitted with `index:` prefixes, as older versions expect.
    pub fn emit_legacy(mut self, emit_legacy: bool) -> Self {
        self.emit_legacy = emit_legacy;
        self
    }

    /// Sets whether list elements may carry `index:` prefixes when parsing.
    pub fn accept_legacy(mut self, accept_legacy: bool) -> Self {
        self.accept_legacy = accept_legacy;
        self
    }

    /// Converts the given compound to SNBT.
    pub fn as_string(&self, compound: &NbtCompound) -> String {
        let mut snbt = String::with_capacity(2 + 16 * compound.len());
        // Writing to a string cannot fail
        let _ = self.write_compound(compound, &mut snbt);
        snbt
    }

    /// Parses a compound. Anything other than whitespace after its closing brace is an error.
    pub fn as_compound(&self, input: &str) -> Result<NbtCompound, ParserError> {
        parse::parse_compound(input, self.accept_legacy)
    }

    /// Parses any tag. Anything other than whitespace after it is an error.
    pub fn as_tag(&self, input: &str) -> Result<NbtTag, ParserError> {
        parse::parse_tag(input, self.accept_legacy)
    }

    /// Writes the given tag as SNBT.
    pub fn write_tag<W: fmt::Write + ?Sized>(&self, tag: &NbtTag, out: &mut W) -> fmt::Result {
        emit::Emitter::new(self, out).tag(tag)
    }

    /// Writes the given compound as SNBT.
    pub fn write_compound<W: fmt::Write + ?Sized>(
        &self,
        compound: &NbtCompound,
        out: &mut W,
    ) -> fmt::Result
    {
        emit::Emitter::new(self, out).compound(compound)
    }

    /// Writes the given list as SNBT.
    pub fn write_list<W: fmt::Write + ?Sized>(&self, list: &NbtList, out: &mut W) -> fmt::Result {
        emit::Emitter::new(self, out).list(list)
    }
}

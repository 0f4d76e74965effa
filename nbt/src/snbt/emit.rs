use std::fmt::{self, Display, Write};

use super::SnbtIo;
use crate::{NbtCompound, NbtList, NbtTag};

pub(super) struct Emitter<'a, W: ?Sized> {
    io: &'a SnbtIo,
    out: &'a mut W,
    level: usize,
}

impl<'a, W: Write + ?Sized> Emitter<'a, W> {
    pub(super) fn new(io: &'a SnbtIo, out: &'a mut W) -> Self {
        Emitter { io, out, level: 0 }
    }

    pub(super) fn tag(&mut self, tag: &NbtTag) -> fmt::Result {
        match tag {
            // TAG_End has no textual form
            NbtTag::End => Ok(()),
            NbtTag::Byte(value) => write!(self.out, "{}b", value),
            NbtTag::Short(value) => write!(self.out, "{}s", value),
            NbtTag::Int(value) => write!(self.out, "{}", value),
            NbtTag::Long(value) => write!(self.out, "{}l", value),
            NbtTag::Float(value) => {
                self.decimal(*value)?;
                self.out.write_char('f')
            }
            NbtTag::Double(value) => {
                self.decimal(*value)?;
                self.out.write_char('d')
            }
            NbtTag::ByteArray(value) => self.array('B', value, "b"),
            NbtTag::String(value) => write_quoted(self.out, value),
            NbtTag::List(value) => self.list(value),
            NbtTag::Compound(value) => self.compound(value),
            NbtTag::IntArray(value) => self.array('I', value, ""),
            NbtTag::LongArray(value) => self.array('L', value, "l"),
        }
    }

    pub(super) fn compound(&mut self, compound: &NbtCompound) -> fmt::Result {
        if compound.is_empty() {
            return self.out.write_str("{}");
        }

        self.out.write_char('{')?;
        self.level += 1;
        for (index, (key, tag)) in compound.iter().enumerate() {
            self.separator(index)?;
            write_key(self.out, key)?;
            self.out.write_char(':')?;
            if self.io.indent.is_some() {
                self.out.write_char(' ')?;
            }
            self.tag(tag)?;
        }
        self.level -= 1;
        self.line_break()?;
        self.out.write_char('}')
    }

    pub(super) fn list(&mut self, list: &NbtList) -> fmt::Result {
        if list.is_empty() {
            return self.out.write_str("[]");
        }

        self.out.write_char('[')?;
        self.level += 1;
        for (index, tag) in list.iter().enumerate() {
            self.separator(index)?;
            if self.io.emit_legacy {
                write!(self.out, "{}:", index)?;
            }
            self.tag(tag)?;
        }
        self.level -= 1;
        self.line_break()?;
        self.out.write_char(']')
    }

    // Arrays always stay on one line
    fn array<T: Display>(&mut self, prefix: char, values: &[T], suffix: &str) -> fmt::Result {
        write!(self.out, "[{};", prefix)?;
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                self.out.write_char(',')?;
            }
            write!(self.out, "{}{}", value, suffix)?;
        }
        self.out.write_char(']')
    }

    fn decimal<T: Display>(&mut self, value: T) -> fmt::Result {
        let formatted = value.to_string();
        self.out.write_str(&formatted)?;
        // Keep a decimal point so the value reads back as a decimal
        if formatted.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
            self.out.write_str(".0")?;
        }
        Ok(())
    }

    fn separator(&mut self, index: usize) -> fmt::Result {
        if index > 0 {
            self.out.write_char(',')?;
        }
        self.line_break()
    }

    fn line_break(&mut self) -> fmt::Result {
        if let Some(indent) = self.io.indent.as_deref() {
            self.out.write_char('\n')?;
            for _ in 0 .. self.level {
                self.out.write_str(indent)?;
            }
        }
        Ok(())
    }
}

/// Returns whether the given key may be written without quotes.
pub(super) fn is_unquoted_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(super::parse::is_unquoted_char)
}

fn write_key<W: Write + ?Sized>(out: &mut W, key: &str) -> fmt::Result {
    if is_unquoted_key(key) {
        out.write_str(key)
    } else {
        write_quoted(out, key)
    }
}

// Wraps the given string in the quote which needs the fewest escapes
fn write_quoted<W: Write + ?Sized>(out: &mut W, string: &str) -> fmt::Result {
    let quote = if string.contains('"') { '\'' } else { '"' };

    out.write_char(quote)?;
    for ch in string.chars() {
        if ch == quote || ch == '\\' {
            out.write_char('\\')?;
        }
        out.write_char(ch)?;
    }
    out.write_char(quote)
}

#[cfg(test)]
mod tests {
    use crate::{snbt::SnbtIo, NbtCompound, NbtList, NbtTag};

    fn sample() -> NbtCompound {
        let mut list = NbtList::new();
        list.add(NbtTag::Int(1)).expect("Failed to add int");
        list.add(NbtTag::Int(2)).expect("Failed to add int");

        NbtCompound::builder()
            .put_list("list", list)
            .put_compound("inner", NbtCompound::builder().put_byte("b", 1).build())
            .put_int_array("ints", vec![1, 2])
            .build()
    }

    #[test]
    fn numbers() {
        assert_eq!(NbtTag::Byte(-1).to_snbt(), "-1b");
        assert_eq!(NbtTag::Short(2).to_snbt(), "2s");
        assert_eq!(NbtTag::Int(3).to_snbt(), "3");
        assert_eq!(NbtTag::Long(4).to_snbt(), "4l");
        assert_eq!(NbtTag::Float(5.0).to_snbt(), "5.0f");
        assert_eq!(NbtTag::Double(6.5).to_snbt(), "6.5d");
        assert_eq!(NbtTag::Double(-6.0).to_snbt(), "-6.0d");
    }

    #[test]
    fn arrays() {
        assert_eq!(NbtTag::ByteArray(vec![1, -2]).to_snbt(), "[B;1b,-2b]");
        assert_eq!(NbtTag::IntArray(vec![]).to_snbt(), "[I;]");
        assert_eq!(NbtTag::LongArray(vec![7]).to_snbt(), "[L;7l]");
    }

    #[test]
    fn quoting() {
        assert_eq!(NbtTag::from("plain").to_snbt(), "\"plain\"");
        assert_eq!(NbtTag::from("it's").to_snbt(), "\"it's\"");
        assert_eq!(NbtTag::from("say \"hi\"").to_snbt(), "'say \"hi\"'");
        assert_eq!(NbtTag::from("'\"").to_snbt(), "'\\'\"'");
        assert_eq!(NbtTag::from("a\\b").to_snbt(), "\"a\\\\b\"");

        let compound = NbtCompound::builder()
            .put_int("simple_key.1", 1)
            .put_int("with space", 2)
            .put_int("", 3)
            .build();
        assert_eq!(compound.to_snbt(), "{simple_key.1:1,\"with space\":2,\"\":3}");
    }

    #[test]
    fn compact_layout() {
        assert_eq!(
            sample().to_snbt(),
            "{list:[1,2],inner:{b:1b},ints:[I;1,2]}"
        );
        assert_eq!(NbtCompound::new().to_snbt(), "{}");
        assert_eq!(NbtList::new().to_snbt(), "[]");
    }

    #[test]
    fn indented_layout() {
        let expected = "{\n  list: [\n    1,\n    2\n  ],\n  inner: {\n    b: 1b\n  },\n  ints: [I;1,2]\n}";
        assert_eq!(SnbtIo::new().indent(2).as_string(&sample()), expected);

        let tabbed = SnbtIo::new().indent_tab().as_string(&NbtCompound::builder().put_int("a", 1).build());
        assert_eq!(tabbed, "{\n\ta: 1\n}");
    }

    #[test]
    fn legacy_indices() {
        let io = SnbtIo::new().emit_legacy(true);
        assert_eq!(io.as_string(&sample()), "{list:[0:1,1:2],inner:{b:1b},ints:[I;1,2]}");
    }
}

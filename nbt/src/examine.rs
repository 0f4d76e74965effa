//! A structured way of describing values for debugging.
//!
//! A type implements [`Examinable`] by exposing a name and a list of named properties. An
//! [`Examiner`] then turns that description into some output, such as the string produced by
//! [`StringExaminer`].
//!
//! ```
//! # use nbt::{NbtCompound, NbtTag};
//! let compound = NbtCompound::builder().put_int("a", 1).build();
//! assert_eq!(
//!     NbtTag::Compound(compound).examine(),
//!     "CompoundTag{tags={\"a\"=IntTag{value=1}}}"
//! );
//! ```

use std::borrow::Cow;

use crate::{NbtCompound, NbtList, NbtTag};

/// A value which can describe itself through named properties.
pub trait Examinable {
    /// Returns the name the value is examined under, usually the name of its type.
    fn examinable_name(&self) -> &str;

    /// Returns the properties of this value, in a stable order.
    fn examinable_properties(&self) -> Vec<ExaminableProperty<'_>>;

    /// Examines this value with the given examiner.
    fn examine_with<E: Examiner>(&self, examiner: &E) -> E::Output
    where Self: Sized {
        examiner.examine(self)
    }
}

/// Turns an [`Examinable`] into some form of output.
pub trait Examiner {
    /// The result of an examination.
    type Output;

    /// Examines the given value.
    fn examine(&self, examinable: &dyn Examinable) -> Self::Output;
}

/// A named property of an [`Examinable`].
#[derive(Clone)]
pub struct ExaminableProperty<'a> {
    name: &'a str,
    value: PropertyValue<'a>,
}

impl<'a> ExaminableProperty<'a> {
    /// Creates a property with the given name and value.
    pub fn of<V: Into<PropertyValue<'a>>>(name: &'a str, value: V) -> Self {
        ExaminableProperty {
            name,
            value: value.into(),
        }
    }

    /// Returns the name of this property.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the value of this property.
    pub fn value(&self) -> &PropertyValue<'a> {
        &self.value
    }
}

/// The value of an [`ExaminableProperty`].
#[derive(Clone)]
pub enum PropertyValue<'a> {
    /// The absence of a value.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A byte.
    Byte(i8),
    /// A short.
    Short(i16),
    /// An int.
    Int(i32),
    /// A long.
    Long(i64),
    /// A float.
    Float(f32),
    /// A double.
    Double(f64),
    /// A single character.
    Char(char),
    /// A string, which examiners are expected to quote.
    String(Cow<'a, str>),
    /// A value which is written as-is, such as the name of an enum constant.
    Raw(Cow<'a, str>),
    /// An array of bytes.
    ByteArray(&'a [i8]),
    /// An array of ints.
    IntArray(&'a [i32]),
    /// An array of longs.
    LongArray(&'a [i64]),
    /// A nested examinable value.
    Examinable(&'a dyn Examinable),
    /// A sequence of values.
    Sequence(Vec<PropertyValue<'a>>),
    /// A map from string keys to values, in a stable order.
    Map(Vec<(Cow<'a, str>, PropertyValue<'a>)>),
}

macro_rules! property_from {
    ($($type:ty, $variant:ident);*) => {
        $(
            impl<'a> From<$type> for PropertyValue<'a> {
                fn from(value: $type) -> Self {
                    PropertyValue::$variant(value)
                }
            }
        )*
    };
}

property_from!(
    bool, Bool;
    i8, Byte;
    i16, Short;
    i32, Int;
    i64, Long;
    f32, Float;
    f64, Double;
    char, Char;
    &'a [i8], ByteArray;
    &'a [i32], IntArray;
    &'a [i64], LongArray;
    &'a dyn Examinable, Examinable
);

impl<'a> From<&'a str> for PropertyValue<'a> {
    fn from(value: &'a str) -> Self {
        PropertyValue::String(Cow::Borrowed(value))
    }
}

impl<'a> From<String> for PropertyValue<'a> {
    fn from(value: String) -> Self {
        PropertyValue::String(Cow::Owned(value))
    }
}

impl<'a, T: Into<PropertyValue<'a>>> From<Option<T>> for PropertyValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Nil)
    }
}

/// Escapes a string before it is quoted by a [`StringExaminer`].
pub type Escaper = fn(&str) -> String;

/// Escapes backslashes and double quotes.
pub fn escape_quotes(string: &str) -> String {
    let mut escaped = String::with_capacity(string.len());
    for ch in string.chars() {
        if ch == '"' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Examines values into strings of the form `Name{property=value, other=value}`.
///
/// Strings are double quoted, sequences and arrays are written as `[a, b]`, and maps are written
/// as `{"key"=value}`.
#[derive(Clone, Copy)]
pub struct StringExaminer {
    escaper: Escaper,
}

impl Default for StringExaminer {
    fn default() -> Self {
        StringExaminer::simple_escaping()
    }
}

impl StringExaminer {
    /// Returns an examiner which escapes backslashes and double quotes in strings.
    pub fn simple_escaping() -> Self {
        StringExaminer {
            escaper: escape_quotes,
        }
    }

    /// Returns an examiner which escapes strings with the given function.
    pub fn with_escaper(escaper: Escaper) -> Self {
        StringExaminer { escaper }
    }

    fn write_examinable(&self, out: &mut String, examinable: &dyn Examinable) {
        out.push_str(examinable.examinable_name());
        out.push('{');
        for (index, property) in examinable.examinable_properties().iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            out.push_str(property.name);
            out.push('=');
            self.write_value(out, &property.value);
        }
        out.push('}');
    }

    fn write_value(&self, out: &mut String, value: &PropertyValue<'_>) {
        match value {
            PropertyValue::Nil => out.push_str("null"),
            PropertyValue::Bool(value) => out.push_str(&value.to_string()),
            PropertyValue::Byte(value) => out.push_str(&value.to_string()),
            PropertyValue::Short(value) => out.push_str(&value.to_string()),
            PropertyValue::Int(value) => out.push_str(&value.to_string()),
            PropertyValue::Long(value) => out.push_str(&value.to_string()),
            // Debug keeps the decimal point of whole numbers
            PropertyValue::Float(value) => out.push_str(&format!("{:?}", value)),
            PropertyValue::Double(value) => out.push_str(&format!("{:?}", value)),
            PropertyValue::Char(value) => {
                out.push('\'');
                out.push(*value);
                out.push('\'');
            }
            PropertyValue::String(value) => self.write_string(out, value),
            PropertyValue::Raw(value) => out.push_str(value),
            PropertyValue::ByteArray(values) => write_array(out, values),
            PropertyValue::IntArray(values) => write_array(out, values),
            PropertyValue::LongArray(values) => write_array(out, values),
            PropertyValue::Examinable(examinable) => self.write_examinable(out, *examinable),
            PropertyValue::Sequence(values) => {
                out.push('[');
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(out, value);
                }
                out.push(']');
            }
            PropertyValue::Map(entries) => {
                out.push('{');
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_string(out, key);
                    out.push('=');
                    self.write_value(out, value);
                }
                out.push('}');
            }
        }
    }

    fn write_string(&self, out: &mut String, string: &str) {
        out.push('"');
        out.push_str(&(self.escaper)(string));
        out.push('"');
    }
}

fn write_array<T: ToString>(out: &mut String, values: &[T]) {
    out.push('[');
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(&value.to_string());
    }
    out.push(']');
}

impl Examiner for StringExaminer {
    type Output = String;

    fn examine(&self, examinable: &dyn Examinable) -> String {
        let mut out = String::new();
        self.write_examinable(&mut out, examinable);
        out
    }
}

impl Examinable for NbtTag {
    fn examinable_name(&self) -> &str {
        match self {
            NbtTag::End => "EndTag",
            NbtTag::Byte(_) => "ByteTag",
            NbtTag::Short(_) => "ShortTag",
            NbtTag::Int(_) => "IntTag",
            NbtTag::Long(_) => "LongTag",
            NbtTag::Float(_) => "FloatTag",
            NbtTag::Double(_) => "DoubleTag",
            NbtTag::ByteArray(_) => "ByteArrayTag",
            NbtTag::String(_) => "StringTag",
            NbtTag::List(list) => list.examinable_name(),
            NbtTag::Compound(compound) => compound.examinable_name(),
            NbtTag::IntArray(_) => "IntArrayTag",
            NbtTag::LongArray(_) => "LongArrayTag",
        }
    }

    fn examinable_properties(&self) -> Vec<ExaminableProperty<'_>> {
        let value: PropertyValue<'_> = match self {
            NbtTag::End => return Vec::new(),
            NbtTag::Byte(value) => (*value).into(),
            NbtTag::Short(value) => (*value).into(),
            NbtTag::Int(value) => (*value).into(),
            NbtTag::Long(value) => (*value).into(),
            NbtTag::Float(value) => (*value).into(),
            NbtTag::Double(value) => (*value).into(),
            NbtTag::ByteArray(value) => value.as_slice().into(),
            NbtTag::String(value) => value.as_str().into(),
            NbtTag::List(list) => return list.examinable_properties(),
            NbtTag::Compound(compound) => return compound.examinable_properties(),
            NbtTag::IntArray(value) => value.as_slice().into(),
            NbtTag::LongArray(value) => value.as_slice().into(),
        };

        vec![ExaminableProperty::of("value", value)]
    }
}

impl Examinable for NbtList {
    fn examinable_name(&self) -> &str {
        "ListTag"
    }

    fn examinable_properties(&self) -> Vec<ExaminableProperty<'_>> {
        vec![
            ExaminableProperty::of("type", PropertyValue::Raw(self.element_type().name().into())),
            ExaminableProperty::of(
                "tags",
                PropertyValue::Sequence(
                    self.iter()
                        .map(|tag| PropertyValue::Examinable(tag))
                        .collect(),
                ),
            ),
        ]
    }
}

impl Examinable for NbtCompound {
    fn examinable_name(&self) -> &str {
        "CompoundTag"
    }

    fn examinable_properties(&self) -> Vec<ExaminableProperty<'_>> {
        vec![ExaminableProperty::of(
            "tags",
            PropertyValue::Map(
                self.iter()
                    .map(|(key, tag)| (Cow::Borrowed(key.as_str()), PropertyValue::Examinable(tag)))
                    .collect(),
            ),
        )]
    }
}

impl NbtTag {
    /// Examines this tag with the default [`StringExaminer`].
    ///
    /// ```
    /// # use nbt::NbtTag;
    /// assert_eq!(NbtTag::Int(1).examine(), "IntTag{value=1}");
    /// assert_eq!(NbtTag::from("a\"b").examine(), "StringTag{value=\"a\\\"b\"}");
    /// ```
    pub fn examine(&self) -> String {
        StringExaminer::default().examine(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagType;

    struct Position {
        world: Option<String>,
        coordinates: [i32; 3],
    }

    impl Examinable for Position {
        fn examinable_name(&self) -> &str {
            "Position"
        }

        fn examinable_properties(&self) -> Vec<ExaminableProperty<'_>> {
            vec![
                ExaminableProperty::of("world", self.world.as_deref()),
                ExaminableProperty::of("coordinates", &self.coordinates[..]),
            ]
        }
    }

    #[test]
    fn custom_examinables() {
        let position = Position {
            world: None,
            coordinates: [1, -2, 3],
        };
        assert_eq!(
            position.examine_with(&StringExaminer::default()),
            "Position{world=null, coordinates=[1, -2, 3]}"
        );
    }

    #[test]
    fn numeric_tags() {
        assert_eq!(NbtTag::Byte(1).examine(), "ByteTag{value=1}");
        assert_eq!(NbtTag::Float(2.0).examine(), "FloatTag{value=2.0}");
        assert_eq!(NbtTag::Double(0.5).examine(), "DoubleTag{value=0.5}");
        assert_eq!(NbtTag::LongArray(vec![1, 2]).examine(), "LongArrayTag{value=[1, 2]}");
        assert_eq!(NbtTag::End.examine(), "EndTag{}");
    }

    #[test]
    fn containers() {
        let list = NbtList::of(TagType::Int, vec![NbtTag::Int(1), NbtTag::Int(2)])
            .expect("Failed to build list");
        assert_eq!(
            NbtTag::List(list.clone()).examine(),
            "ListTag{type=TAG_Int, tags=[IntTag{value=1}, IntTag{value=2}]}"
        );

        let compound = NbtCompound::builder()
            .put_list("list", list)
            .put_string("name", "x")
            .build();
        assert_eq!(
            NbtTag::Compound(compound).examine(),
            "CompoundTag{tags={\"list\"=ListTag{type=TAG_Int, tags=[IntTag{value=1}, IntTag{value=2}]}, \
             \"name\"=StringTag{value=\"x\"}}}"
        );
    }

    #[test]
    fn custom_escaper() {
        fn upper(string: &str) -> String {
            string.to_uppercase()
        }

        let examiner = StringExaminer::with_escaper(upper);
        assert_eq!(examiner.examine(&NbtTag::from("abc")), "StringTag{value=\"ABC\"}");
    }
}

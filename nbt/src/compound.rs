use std::{
    fmt,
    iter::FromIterator,
    ops::{Index, IndexMut},
};

use doc_comment::doc_comment;
use indexmap::{map, IndexMap};
use lazy_static::lazy_static;

use crate::{list::EMPTY_LIST, snbt::SnbtIo, NbtList, NbtTag, TagType};

lazy_static! {
    static ref EMPTY_COMPOUND: NbtCompound = NbtCompound::new();
}

/// The NBT tag compound type which is essentially just a wrapper for an insertion-ordered map of
/// string keys to tag values.
#[repr(transparent)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NbtCompound(IndexMap<String, NbtTag>);

// Generates a get function for a compound which reads any numeric tag as the requested type,
// along with a variant that falls back to a default value
macro_rules! compound_get {
    ($type:ty, $method:ident, $method_or:ident, $view:ident) => {
        doc_comment! {
            concat!(
                "Returns the value of the numeric tag with the given name as `", stringify!($type), "`.
                If a tag with the given name cannot be found, or the tag is not numeric, then `None` is returned."
            ),
            pub fn $method(&self, name: &str) -> Option<$type> {
                self.0.get(name).and_then(NbtTag::$view)
            }
        }

        doc_comment! {
            concat!(
                "Returns the value of the numeric tag with the given name as `", stringify!($type), "`,
                or `default` if the tag is absent or not numeric."
            ),
            pub fn $method_or(&self, name: &str, default: $type) -> $type {
                self.$method(name).unwrap_or(default)
            }
        }
    };
}

// Generates get and get_mut functions returning references to tag value
// or None if the tag name is invalid or the types do not match
macro_rules! compound_get_ref {
    ($type:ty, $type_mut:ty, $method:ident, $method_mut:ident, $tag:ident) => {
        doc_comment! {
            concat!(
                "Returns a shared reference to the value of the `", stringify!($tag), "` tag with the given name.
                If a tag with the given name cannot be found, or the tag is not a `", stringify!($tag), "` tag,
                then `None` is returned."
            ),
            pub fn $method(&self, name: &str) -> Option<&$type> {
                if let Some(NbtTag::$tag(value)) = self.0.get(name) {
                    Some(value)
                } else {
                    None
                }
            }
        }

        doc_comment! {
            concat!(
                "Returns a mutable reference to the value of the `", stringify!($tag), "` tag with the given name.
                If a tag with the given name cannot be found, or the tag is not a `", stringify!($tag), "` tag,
                then `None` is returned."
            ),
            pub fn $method_mut(&mut self, name: &str) -> Option<&mut $type_mut> {
                if let Some(NbtTag::$tag(value)) = self.0.get_mut(name) {
                    Some(value)
                } else {
                    None
                }
            }
        }
    };
}

// Generates an insert function that wraps the given rust type in an nbt tag
// and inserts it into the inner map
macro_rules! compound_insert {
    ($type:ty, $method:ident) => {
        #[doc = "Inserts a tag with the given value into this compound with the given name. \
            The value will be wrapped in a corresponding `NbtTag` variant."]
        pub fn $method<N: Into<String>>(&mut self, name: N, value: $type) {
            self.0.insert(name.into(), NbtTag::from(value));
        }
    };
}

impl NbtCompound {
    /// Returns a new NBT tag compound with an empty internal map.
    pub fn new() -> Self {
        NbtCompound(IndexMap::new())
    }

    /// Returns a new NBT tag compound with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        NbtCompound(IndexMap::with_capacity(capacity))
    }

    /// Returns a builder which accumulates entries before producing a compound.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nbt::NbtCompound;
    /// let compound = NbtCompound::builder()
    ///     .put_string("action", "open_url")
    ///     .put_int("page", 3)
    ///     .build();
    /// assert_eq!(compound.get_string("action"), Some("open_url"));
    /// ```
    pub fn builder() -> NbtCompoundBuilder {
        NbtCompoundBuilder::new()
    }

    /// Returns a shared reference to an empty compound.
    pub fn empty() -> &'static NbtCompound {
        &*EMPTY_COMPOUND
    }

    /// Converts this tag compound into a valid SNBT string.
    pub fn to_snbt(&self) -> String {
        let mut snbt = String::with_capacity(2 + 16 * self.len());
        // Writing to a string cannot fail
        let _ = SnbtIo::default().write_compound(self, &mut snbt);
        snbt
    }

    // The following just call the corresponding map functions

    /// Returns an iterator over the keys of this tag compound, in insertion order.
    #[inline(always)]
    pub fn keys(&self) -> map::Keys<'_, String, NbtTag> {
        self.0.keys()
    }

    /// Returns an iterator over the values of this tag compound.
    #[inline(always)]
    pub fn values(&self) -> map::Values<'_, String, NbtTag> {
        self.0.values()
    }

    /// Returns an iterator over mutable references to the values of this tag compound.
    #[inline(always)]
    pub fn values_mut(&mut self) -> map::ValuesMut<'_, String, NbtTag> {
        self.0.values_mut()
    }

    /// Returns an iterator over the key-value pairs of this tag compound.
    #[inline(always)]
    pub fn iter(&self) -> map::Iter<'_, String, NbtTag> {
        self.0.iter()
    }

    /// Returns an iterator over mutable references to the key-value pairs of this tag compound.
    #[inline(always)]
    pub fn iter_mut(&mut self) -> map::IterMut<'_, String, NbtTag> {
        self.0.iter_mut()
    }

    /// Returns the number of tags in this compound.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the length of this compound is zero, false otherwise.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes every tag from this compound.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Removes the tag with the given name, returning that tag. The order of the remaining tags is
    /// preserved. If a tag with the given name cannot be found, then `None` is returned.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<NbtTag> {
        self.0.shift_remove(name)
    }

    /// Returns a shared reference to the tag with the given name, or `None` if there is no such tag
    /// with the given name.
    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.0.get(name)
    }

    /// Returns a mutable reference to the tag with the given name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NbtTag> {
        self.0.get_mut(name)
    }

    /// Returns whether or not this compound has a tag with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns whether or not this compound has a tag with the given name whose type is compatible
    /// with `tag_type`. Any numeric tag is compatible with any numeric type.
    pub fn contains_type(&self, name: &str, tag_type: TagType) -> bool {
        self.0
            .get(name)
            .map(|tag| tag_type.is_compatible(tag.tag_type()))
            .unwrap_or(false)
    }

    // Generate the get functions
    compound_get!(i8, get_byte, get_byte_or, byte_value);
    compound_get!(i16, get_short, get_short_or, short_value);
    compound_get!(i32, get_int, get_int_or, int_value);
    compound_get!(i64, get_long, get_long_or, long_value);
    compound_get!(f32, get_float, get_float_or, float_value);
    compound_get!(f64, get_double, get_double_or, double_value);
    compound_get_ref!([i8], Vec<i8>, get_byte_array, get_byte_array_mut, ByteArray);
    compound_get_ref!(str, String, get_string, get_string_mut, String);
    compound_get_ref!(NbtList, NbtList, get_list, get_list_mut, List);
    compound_get_ref!(NbtCompound, NbtCompound, get_compound, get_compound_mut, Compound);
    compound_get_ref!([i32], Vec<i32>, get_int_array, get_int_array_mut, IntArray);
    compound_get_ref!([i64], Vec<i64>, get_long_array, get_long_array_mut, LongArray);

    /// Returns whether or not a numeric tag with the given name is non-zero once narrowed to a byte, as
    /// [`get_byte`](NbtCompound::get_byte) would return it. If there is no tag with the given name, or
    /// the tag is not numeric, then `None` is returned.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_byte(name).map(|value| value != 0)
    }

    /// Like [`get_bool`](NbtCompound::get_bool), returning `default` when the tag is absent or not numeric.
    pub fn get_bool_or(&self, name: &str, default: bool) -> bool {
        self.get_bool(name).unwrap_or(default)
    }

    /// Returns the string with the given name, or `default` if there is no string tag with that name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nbt::NbtCompound;
    /// let compound = NbtCompound::new();
    /// assert_eq!(compound.get_string_or("missing", ""), "");
    /// ```
    pub fn get_string_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get_string(name).unwrap_or(default)
    }

    /// Returns the list with the given name, or a shared empty list.
    pub fn get_list_or_empty(&self, name: &str) -> &NbtList {
        self.get_list(name).unwrap_or(&EMPTY_LIST)
    }

    /// Returns the list with the given name if its element type is compatible with `element_type`.
    /// Since untyped empty lists have the element type `TAG_End`, they only match `TagType::End`.
    pub fn get_list_of(&self, name: &str, element_type: TagType) -> Option<&NbtList> {
        self.get_list(name)
            .filter(|list| element_type.is_compatible(list.element_type()))
    }

    /// Returns the compound with the given name, or a shared empty compound.
    pub fn get_compound_or_empty(&self, name: &str) -> &NbtCompound {
        self.get_compound(name).unwrap_or(&*EMPTY_COMPOUND)
    }

    /// Adds the given `NbtTag` to this compound with the given name, returning the tag it replaced.
    pub fn set<N: Into<String>, T: Into<NbtTag>>(&mut self, name: N, tag: T) -> Option<NbtTag> {
        self.0.insert(name.into(), tag.into())
    }

    // Generate set functions
    compound_insert!(i8, set_byte);
    compound_insert!(i16, set_short);
    compound_insert!(i32, set_int);
    compound_insert!(i64, set_long);
    compound_insert!(f32, set_float);
    compound_insert!(f64, set_double);
    compound_insert!(Vec<i8>, set_byte_array);
    compound_insert!(NbtList, set_list);
    compound_insert!(NbtCompound, set_compound);
    compound_insert!(Vec<i32>, set_int_array);
    compound_insert!(Vec<i64>, set_long_array);

    /// Inserts a string tag with the given name.
    pub fn set_string<N: Into<String>, S: Into<String>>(&mut self, name: N, value: S) {
        self.0.insert(name.into(), NbtTag::String(value.into()));
    }

    /// Inserts a byte tag with the given name, and with a value of `0` or `1` if the given boolean
    /// is `false` or `true` respectively.
    pub fn set_bool<N: Into<String>>(&mut self, name: N, value: bool) {
        self.0.insert(name.into(), NbtTag::from(value));
    }

    /// Copies every tag of `other` into this compound, replacing tags with the same name.
    pub fn put_all(&mut self, other: &NbtCompound) {
        for (name, tag) in other.iter() {
            self.0.insert(name.clone(), tag.clone());
        }
    }
}

impl fmt::Display for NbtCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SnbtIo::default().write_compound(self, f)
    }
}

impl Index<&str> for NbtCompound {
    type Output = NbtTag;

    fn index(&self, name: &str) -> &Self::Output {
        &self.0[name]
    }
}

impl IndexMut<&str> for NbtCompound {
    fn index_mut(&mut self, name: &str) -> &mut Self::Output {
        &mut self.0[name]
    }
}

impl IntoIterator for NbtCompound {
    type IntoIter = map::IntoIter<String, NbtTag>;
    type Item = (String, NbtTag);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NbtCompound {
    type IntoIter = map::Iter<'a, String, NbtTag>;
    type Item = (&'a String, &'a NbtTag);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, NbtTag)> for NbtCompound {
    fn from_iter<I: IntoIterator<Item = (String, NbtTag)>>(iter: I) -> Self {
        NbtCompound(IndexMap::from_iter(iter))
    }
}

impl Extend<(String, NbtTag)> for NbtCompound {
    fn extend<I: IntoIterator<Item = (String, NbtTag)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl AsRef<IndexMap<String, NbtTag>> for NbtCompound {
    fn as_ref(&self) -> &IndexMap<String, NbtTag> {
        &self.0
    }
}

/// Accumulates entries for a [`NbtCompound`].
#[derive(Clone, Debug, Default)]
pub struct NbtCompoundBuilder {
    compound: NbtCompound,
}

// Generates a chained put function on the builder
macro_rules! builder_put {
    ($type:ty, $method:ident) => {
        #[doc = "Puts a tag with the given value and name, wrapping the value in the corresponding `NbtTag` variant."]
        pub fn $method<N: Into<String>>(mut self, name: N, value: $type) -> Self {
            self.compound.0.insert(name.into(), NbtTag::from(value));
            self
        }
    };
}

impl NbtCompoundBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        NbtCompoundBuilder::default()
    }

    /// Puts the given tag with the given name.
    pub fn put<N: Into<String>, T: Into<NbtTag>>(mut self, name: N, tag: T) -> Self {
        self.compound.0.insert(name.into(), tag.into());
        self
    }

    builder_put!(i8, put_byte);
    builder_put!(i16, put_short);
    builder_put!(i32, put_int);
    builder_put!(i64, put_long);
    builder_put!(f32, put_float);
    builder_put!(f64, put_double);
    builder_put!(bool, put_boolean);
    builder_put!(Vec<i8>, put_byte_array);
    builder_put!(NbtList, put_list);
    builder_put!(NbtCompound, put_compound);
    builder_put!(Vec<i32>, put_int_array);
    builder_put!(Vec<i64>, put_long_array);

    /// Puts a string tag with the given name.
    pub fn put_string<N: Into<String>, S: Into<String>>(mut self, name: N, value: S) -> Self {
        self.compound.0.insert(name.into(), NbtTag::String(value.into()));
        self
    }

    /// Copies every entry of `other` into the compound being built.
    pub fn put_all(mut self, other: &NbtCompound) -> Self {
        self.compound.put_all(other);
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> NbtCompound {
        self.compound
    }
}

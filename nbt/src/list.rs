use std::{
    convert::TryFrom,
    fmt,
    ops::{Index, IndexMut},
};

use doc_comment::doc_comment;

use crate::{snbt::SnbtIo, NbtCompound, NbtStructureError, NbtTag, TagType};

pub(crate) static EMPTY_LIST: NbtList = NbtList::new();

/// The NBT tag list type: a vec of NBT tags which all share the list's element type.
///
/// A new list has the element type `TAG_End` and adopts the type of the first tag added to it.
#[derive(Clone, Debug, PartialEq)]
pub struct NbtList {
    element_type: TagType,
    tags: Vec<NbtTag>,
}

// Gets a numeric element from the list as the requested type, or a default value
macro_rules! list_get {
    ($type:ty, $method:ident, $method_or:ident, $view:ident) => {
        doc_comment! {
            concat!(
                "Returns the value of the numeric tag at the given index as `", stringify!($type), "`.
                If the index is out of bounds, or the tag is not numeric, then `None` is returned."
            ),
            pub fn $method(&self, index: usize) -> Option<$type> {
                self.tags.get(index).and_then(NbtTag::$view)
            }
        }

        doc_comment! {
            concat!(
                "Returns the value of the numeric tag at the given index as `", stringify!($type), "`,
                or `default` if the index is out of bounds or the tag is not numeric."
            ),
            pub fn $method_or(&self, index: usize, default: $type) -> $type {
                self.$method(index).unwrap_or(default)
            }
        }
    };
}

// Generates get and get_mut functions that return references to tag values
// Returns None on a type mismatch
macro_rules! list_get_ref {
    ($type:ty, $type_mut:ty, $method:ident, $method_mut:ident, $tag:ident) => {
        doc_comment! {
            concat!(
                "Returns a shared reference to the value of a `", stringify!($tag), "` tag at the given index.
                If the index is out of bounds, or the tag is not a `", stringify!($tag), "` tag, then `None` is returned."
            ),
            pub fn $method(&self, index: usize) -> Option<&$type> {
                if let Some(NbtTag::$tag(value)) = self.tags.get(index) {
                    Some(value)
                } else {
                    None
                }
            }
        }

        doc_comment! {
            concat!(
                "Returns a mutable reference to the value of a `", stringify!($tag), "` tag at the given index.
                If the index is out of bounds, or the tag is not a `", stringify!($tag), "` tag, then `None` is returned."
            ),
            pub fn $method_mut(&mut self, index: usize) -> Option<&mut $type_mut> {
                if let Some(NbtTag::$tag(value)) = self.tags.get_mut(index) {
                    Some(value)
                } else {
                    None
                }
            }
        }
    };
}

impl NbtList {
    /// Returns a new, empty NBT tag list with the element type `TAG_End`.
    pub const fn new() -> Self {
        NbtList {
            element_type: TagType::End,
            tags: Vec::new(),
        }
    }

    /// Returns a new empty list which only accepts tags of the given type.
    pub fn with_element_type(element_type: TagType) -> Self {
        NbtList {
            element_type,
            tags: Vec::new(),
        }
    }

    /// Returns a new, empty list with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        NbtList {
            element_type: TagType::End,
            tags: Vec::with_capacity(capacity),
        }
    }

    /// Creates a list of the given element type from the given tags.
    ///
    /// Fails if any tag does not have exactly the given type, or if the type is `TAG_End` while
    /// tags are present.
    pub fn of(element_type: TagType, tags: Vec<NbtTag>) -> Result<Self, NbtStructureError> {
        if element_type == TagType::End && !tags.is_empty() {
            return Err(NbtStructureError::EndTagInList);
        }

        if let Some(tag) = tags.iter().find(|tag| tag.tag_type() != element_type) {
            return Err(NbtStructureError::TypeMismatch {
                expected: element_type,
                found: tag.tag_type(),
            });
        }

        Ok(NbtList { element_type, tags })
    }

    // Used by the binary reader, which has already validated every tag
    pub(crate) fn from_parts(element_type: TagType, tags: Vec<NbtTag>) -> Self {
        NbtList { element_type, tags }
    }

    /// Returns the type of the elements of this list.
    #[inline]
    pub fn element_type(&self) -> TagType {
        self.element_type
    }

    /// Converts this tag list to a valid SNBT string.
    pub fn to_snbt(&self) -> String {
        let mut snbt = String::with_capacity(2 + 8 * self.len());
        // Writing to a string cannot fail
        let _ = SnbtIo::default().write_list(self, &mut snbt);
        snbt
    }

    /// Unwraps this list into its tags.
    pub fn into_inner(self) -> Vec<NbtTag> {
        self.tags
    }

    // Checks that a tag may be stored in this list
    fn accept(&self, tag: &NbtTag) -> Result<(), NbtStructureError> {
        let tag_type = tag.tag_type();
        if tag_type == TagType::End {
            return Err(NbtStructureError::EndTagInList);
        }

        if self.element_type != TagType::End && self.element_type != tag_type {
            return Err(NbtStructureError::TypeMismatch {
                expected: self.element_type,
                found: tag_type,
            });
        }

        Ok(())
    }

    /// Pushes the given tag to the back of the list.
    ///
    /// If the list has no element type yet, it adopts the type of the tag. Adding `TAG_End`, or a tag of
    /// a different type than the list's element type, fails.
    pub fn add(&mut self, tag: NbtTag) -> Result<(), NbtStructureError> {
        self.accept(&tag)?;
        self.element_type = tag.tag_type();
        self.tags.push(tag);
        Ok(())
    }

    /// Replaces the tag at the given index, returning the previous tag.
    pub fn set(&mut self, index: usize, tag: NbtTag) -> Result<NbtTag, NbtStructureError> {
        let length = self.tags.len();
        if index >= length {
            return Err(NbtStructureError::InvalidIndex { index, length });
        }

        self.accept(&tag)?;
        Ok(std::mem::replace(&mut self.tags[index], tag))
    }

    // The following are just calling the corresponding functions in the underlying vec

    /// Returns an iterator over shared references to tags in this list.
    #[inline(always)]
    pub fn iter(&self) -> std::slice::Iter<'_, NbtTag> {
        self.tags.iter()
    }

    /// Returns an iterator over mutable references to tags in this list.
    ///
    /// Replacing a tag with one of another type leaves the list in a state which cannot be written.
    #[inline(always)]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, NbtTag> {
        self.tags.iter_mut()
    }

    /// Returns the length of this list.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if this tag list has a length of zero, false otherwise.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Removes and returns the tag at the given index. Unlike a Vec, this method will not panic
    /// if the index is out of bounds, rather `None` will be returned. The element type of the list
    /// is kept even if the list becomes empty.
    #[inline]
    pub fn remove(&mut self, index: usize) -> Option<NbtTag> {
        if index < self.tags.len() {
            Some(self.tags.remove(index))
        } else {
            None
        }
    }

    /// Returns a reference to the tag at the given index, or None if the index is out of bounds.
    pub fn get(&self, index: usize) -> Option<&NbtTag> {
        self.tags.get(index)
    }

    // Generate the get functions
    list_get!(i8, get_byte, get_byte_or, byte_value);
    list_get!(i16, get_short, get_short_or, short_value);
    list_get!(i32, get_int, get_int_or, int_value);
    list_get!(i64, get_long, get_long_or, long_value);
    list_get!(f32, get_float, get_float_or, float_value);
    list_get!(f64, get_double, get_double_or, double_value);
    list_get_ref!([i8], Vec<i8>, get_byte_array, get_byte_array_mut, ByteArray);
    list_get_ref!(str, String, get_string, get_string_mut, String);
    list_get_ref!(NbtList, NbtList, get_list, get_list_mut, List);
    list_get_ref!(NbtCompound, NbtCompound, get_compound, get_compound_mut, Compound);
    list_get_ref!([i32], Vec<i32>, get_int_array, get_int_array_mut, IntArray);
    list_get_ref!([i64], Vec<i64>, get_long_array, get_long_array_mut, LongArray);

    /// Returns the string at the given index, or `default` if there is no string at that index.
    pub fn get_string_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.get_string(index).unwrap_or(default)
    }

    /// Returns whether or not a numeric tag at the given index is non-zero once narrowed to a byte,
    /// as [`get_byte`](NbtList::get_byte) would return it. If the index is out of bounds or the tag
    /// at the given index is not numeric, then `None` is returned.
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.tags
            .get(index)
            .and_then(NbtTag::byte_value)
            .map(|value| value != 0)
    }
}

impl Default for NbtList {
    fn default() -> Self {
        NbtList::new()
    }
}

impl TryFrom<Vec<NbtTag>> for NbtList {
    type Error = NbtStructureError;

    /// Infers the element type from the first tag.
    fn try_from(tags: Vec<NbtTag>) -> Result<Self, Self::Error> {
        let element_type = tags.first().map(NbtTag::tag_type).unwrap_or(TagType::End);
        NbtList::of(element_type, tags)
    }
}

impl fmt::Display for NbtList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SnbtIo::default().write_list(self, f)
    }
}

impl Index<usize> for NbtList {
    type Output = NbtTag;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tags[index]
    }
}

impl IndexMut<usize> for NbtList {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.tags[index]
    }
}

impl IntoIterator for NbtList {
    type IntoIter = std::vec::IntoIter<NbtTag>;
    type Item = NbtTag;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a NbtList {
    type IntoIter = std::slice::Iter<'a, NbtTag>;
    type Item = &'a NbtTag;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

use std::{
    convert::TryFrom,
    error::Error,
    fmt::{self, Display, Formatter},
};

use doc_comment::doc_comment;

use crate::{snbt::SnbtIo, NbtCompound, NbtList, NbtStructureError};

/// The type of an NBT tag, with discriminants equal to the type ids used by the binary format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum TagType {
    /// Marks the end of a compound, and the element type of an untyped empty list.
    End = 0,
    /// A signed, one-byte integer.
    Byte = 1,
    /// A signed, two-byte integer.
    Short = 2,
    /// A signed, four-byte integer.
    Int = 3,
    /// A signed, eight-byte integer.
    Long = 4,
    /// A 32-bit floating point value.
    Float = 5,
    /// A 64-bit floating point value.
    Double = 6,
    /// An array of signed, one-byte integers.
    ByteArray = 7,
    /// A modified UTF-8 string.
    String = 8,
    /// A homogeneous list of tags.
    List = 9,
    /// A map of names to tags.
    Compound = 10,
    /// An array of signed, four-byte integers.
    IntArray = 11,
    /// An array of signed, eight-byte integers.
    LongArray = 12,
}

impl TagType {
    /// Returns the binary id of this tag type.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the conventional name of this type, such as `TAG_Compound`.
    pub fn name(self) -> &'static str {
        match self {
            TagType::End => "TAG_End",
            TagType::Byte => "TAG_Byte",
            TagType::Short => "TAG_Short",
            TagType::Int => "TAG_Int",
            TagType::Long => "TAG_Long",
            TagType::Float => "TAG_Float",
            TagType::Double => "TAG_Double",
            TagType::ByteArray => "TAG_Byte_Array",
            TagType::String => "TAG_String",
            TagType::List => "TAG_List",
            TagType::Compound => "TAG_Compound",
            TagType::IntArray => "TAG_Int_Array",
            TagType::LongArray => "TAG_Long_Array",
        }
    }

    /// Returns true if tags of this type hold a single numeric value.
    pub fn is_number(self) -> bool {
        matches!(
            self,
            TagType::Byte
                | TagType::Short
                | TagType::Int
                | TagType::Long
                | TagType::Float
                | TagType::Double
        )
    }

    /// Returns true if a tag of type `other` can be read as this type. Types are compatible if they
    /// are equal, or if both are numeric.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nbt::TagType;
    /// assert!(TagType::Int.is_compatible(TagType::Byte));
    /// assert!(!TagType::Int.is_compatible(TagType::String));
    /// ```
    pub fn is_compatible(self, other: TagType) -> bool {
        self == other || (self.is_number() && other.is_number())
    }
}

impl Display for TagType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a byte does not correspond to any tag type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct InvalidTagType(pub u8);

impl Display for InvalidTagType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tag type id {}", self.0)
    }
}

impl Error for InvalidTagType {}

impl TryFrom<u8> for TagType {
    type Error = InvalidTagType;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        let tag_type = match id {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            _ => return Err(InvalidTagType(id)),
        };

        Ok(tag_type)
    }
}

/// The generic NBT tag type, containing all supported tag variants which wrap around a corresponding rust type.
#[derive(Clone, Debug, PartialEq)]
pub enum NbtTag {
    /// The end tag. It carries no payload and may not appear inside lists or compounds.
    End,
    /// A signed, one-byte integer.
    Byte(i8),
    /// A signed, two-byte integer.
    Short(i16),
    /// A signed, four-byte integer.
    Int(i32),
    /// A signed, eight-byte integer.
    Long(i64),
    /// A 32-bit floating point value.
    Float(f32),
    /// A 64-bit floating point value.
    Double(f64),
    /// An array (vec) of signed, one-byte integers.
    ByteArray(Vec<i8>),
    /// A string, stored as UTF-8 and encoded as modified UTF-8 on the wire.
    String(String),
    /// An NBT tag list.
    List(NbtList),
    /// An NBT tag compound.
    Compound(NbtCompound),
    /// An array (vec) of signed, four-byte integers.
    IntArray(Vec<i32>),
    /// An array (vec) of signed, eight-byte integers.
    LongArray(Vec<i64>),
}

// Generates a numeric accessor which converts between number types the way a cast would
macro_rules! number_view {
    ($($method:ident, $type:ty);*) => {
        $(
            doc_comment! {
                concat!(
                    "Returns the value of this tag as an `", stringify!($type), "` if it is a numeric tag. ",
                    "Values are converted with `as` casts, so narrowing truncates and float-to-integer ",
                    "conversions saturate. Non-numeric tags return `None`."
                ),
                pub fn $method(&self) -> Option<$type> {
                    match *self {
                        NbtTag::Byte(value) => Some(value as $type),
                        NbtTag::Short(value) => Some(value as $type),
                        NbtTag::Int(value) => Some(value as $type),
                        NbtTag::Long(value) => Some(value as $type),
                        NbtTag::Float(value) => Some(value as $type),
                        NbtTag::Double(value) => Some(value as $type),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl NbtTag {
    /// Returns the type of this tag.
    pub fn tag_type(&self) -> TagType {
        match self {
            NbtTag::End => TagType::End,
            NbtTag::Byte(_) => TagType::Byte,
            NbtTag::Short(_) => TagType::Short,
            NbtTag::Int(_) => TagType::Int,
            NbtTag::Long(_) => TagType::Long,
            NbtTag::Float(_) => TagType::Float,
            NbtTag::Double(_) => TagType::Double,
            NbtTag::ByteArray(_) => TagType::ByteArray,
            NbtTag::String(_) => TagType::String,
            NbtTag::List(_) => TagType::List,
            NbtTag::Compound(_) => TagType::Compound,
            NbtTag::IntArray(_) => TagType::IntArray,
            NbtTag::LongArray(_) => TagType::LongArray,
        }
    }

    /// Returns the binary id of this tag's type.
    #[inline]
    pub fn id(&self) -> u8 {
        self.tag_type().id()
    }

    /// Returns true if this tag holds a single numeric value.
    #[inline]
    pub fn is_number(&self) -> bool {
        self.tag_type().is_number()
    }

    number_view!(
        byte_value, i8;
        short_value, i16;
        int_value, i32;
        long_value, i64;
        float_value, f32;
        double_value, f64
    );

    /// Converts this tag into a valid, parsable SNBT string with no extraneous spacing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nbt::{NbtCompound, NbtTag};
    /// assert_eq!(NbtTag::Byte(5).to_snbt(), "5b");
    /// assert_eq!(NbtTag::from("\"Quoted text\"").to_snbt(), "'\"Quoted text\"'");
    ///
    /// let mut compound = NbtCompound::new();
    /// compound.set_long_array("foo", vec![-1, -3, -5]);
    /// assert_eq!(NbtTag::Compound(compound).to_snbt(), "{foo:[L;-1l,-3l,-5l]}");
    /// ```
    pub fn to_snbt(&self) -> String {
        crate::snbt::to_snbt(self)
    }
}

impl Display for NbtTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        SnbtIo::default().write_tag(self, f)
    }
}

// Implement the from trait for all the tag's internal types
macro_rules! tag_from {
    ($($type:ty, $tag:ident),*) => {
        $(
            impl From<$type> for NbtTag {
                fn from(value: $type) -> NbtTag {
                    NbtTag::$tag(value)
                }
            }
        )*
    };
}

tag_from!(
    i8, Byte,
    i16, Short,
    i32, Int,
    i64, Long,
    f32, Float,
    f64, Double,
    Vec<i8>, ByteArray,
    String, String,
    NbtList, List,
    NbtCompound, Compound,
    Vec<i32>, IntArray,
    Vec<i64>, LongArray
);

// String slices are a special case
impl From<&str> for NbtTag {
    fn from(value: &str) -> NbtTag {
        NbtTag::String(value.to_owned())
    }
}

// Booleans have no tag of their own and are stored as bytes
impl From<bool> for NbtTag {
    fn from(value: bool) -> NbtTag {
        NbtTag::Byte(if value { 1 } else { 0 })
    }
}

// Unwraps a tag into its payload if the variant matches exactly
macro_rules! tag_try_into {
    ($($type:ty, $tag:ident),*) => {
        $(
            impl TryFrom<NbtTag> for $type {
                type Error = NbtStructureError;

                fn try_from(tag: NbtTag) -> Result<Self, Self::Error> {
                    match tag {
                        NbtTag::$tag(value) => Ok(value),
                        other => Err(NbtStructureError::TypeMismatch {
                            expected: TagType::$tag,
                            found: other.tag_type(),
                        }),
                    }
                }
            }
        )*
    };
}

tag_try_into!(
    i8, Byte,
    i16, Short,
    i32, Int,
    i64, Long,
    f32, Float,
    f64, Double,
    Vec<i8>, ByteArray,
    String, String,
    NbtList, List,
    NbtCompound, Compound,
    Vec<i32>, IntArray,
    Vec<i64>, LongArray
);

impl<'a> TryFrom<&'a NbtTag> for &'a NbtCompound {
    type Error = NbtStructureError;

    fn try_from(tag: &'a NbtTag) -> Result<Self, Self::Error> {
        match tag {
            NbtTag::Compound(compound) => Ok(compound),
            other => Err(NbtStructureError::TypeMismatch {
                expected: TagType::Compound,
                found: other.tag_type(),
            }),
        }
    }
}

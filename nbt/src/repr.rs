use crate::{NbtCompound, TagType};
use std::{
    collections::{BTreeMap, HashMap},
    convert::TryInto,
    error::Error,
    fmt::{self, Debug, Display, Formatter},
    hash::Hash,
    str::FromStr,
};

/// An error associated with the structure of an NBT tag tree. This error represents a conflict
/// between the expected and actual structure of an NBT tag tree.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum NbtStructureError {
    /// The expected type of a tag was not the type encountered.
    TypeMismatch {
        /// The type that was required.
        expected: TagType,
        /// The type that was present.
        found: TagType,
    },
    /// An index was out of bounds.
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// The length of the list that was indexed.
        length: usize,
    },
    /// A tag in a [`NbtCompound`](crate::NbtCompound) was absent.
    MissingTag(String),
    /// An end tag was added to a list.
    EndTagInList,
}

impl Display for NbtStructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NbtStructureError::TypeMismatch { expected, found } =>
                write!(f, "Type mismatch: expected {}, found {}", expected, found),
            NbtStructureError::InvalidIndex { index, length } =>
                write!(f, "Index {} out of bounds for list of length {}", index, length),
            NbtStructureError::MissingTag(name) => write!(f, "Missing tag '{}'", name),
            NbtStructureError::EndTagInList => write!(f, "Cannot add TAG_End to a list"),
        }
    }
}

impl Error for NbtStructureError {}

/// An error associated with the translation of a NBT representation to a concrete type. This
/// can either be a structure error or a custom error.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum NbtReprError<E> {
    /// An error associated with the NBT tree itself. See [`NbtStructureError`](crate::NbtStructureError).
    Structure(NbtStructureError),
    /// A custom error defining an issue during the conversion process.
    Conversion(E),
}

impl<E> NbtReprError<E> {
    /// Creates a [`Conversion`](crate::NbtReprError::Conversion) variant of this error with
    /// the given error.
    pub fn conversion(x: E) -> Self {
        NbtReprError::Conversion(x)
    }
}

impl<E: Debug> Display for NbtReprError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NbtReprError::Structure(e) => Display::fmt(e, f),
            NbtReprError::Conversion(e) => write!(f, "Conversion failed: {:?}", e),
        }
    }
}

impl<E: Error + 'static> Error for NbtReprError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NbtReprError::Structure(source) => Some(source),
            NbtReprError::Conversion(source) => Some(source),
        }
    }
}

impl<E> From<NbtStructureError> for NbtReprError<E> {
    fn from(x: NbtStructureError) -> Self {
        NbtReprError::Structure(x)
    }
}

/// Defines a type which has a full representation as a [`NbtCompound`].
///
/// Full representation meaning that the type can be constructed from a [`NbtCompound`], and fully serialized
/// as one as well.
pub trait NbtRepr: Sized {
    /// The error type returned if the [`from_nbt`] function fails.
    ///
    /// [`from_nbt`]: crate::NbtRepr::from_nbt
    type Error;

    /// Creates an instance of this type from the given compound.
    ///
    /// The intention is that data is copied, not moved, from the compound to construct this type.
    fn from_nbt(nbt: &NbtCompound) -> Result<Self, Self::Error>;

    /// Writes all necessary data to the given compound to serialize this type.
    ///
    /// Although not enforced, the data written should allow for the type to be reconstructed via the
    /// [`from_nbt`] function.
    ///
    /// [`from_nbt`]: crate::NbtRepr::from_nbt
    fn write_nbt(&self, nbt: &mut NbtCompound);

    /// Converts this type into an owned [`NbtCompound`].
    #[inline]
    fn to_nbt(&self) -> NbtCompound {
        let mut nbt = NbtCompound::new();
        self.write_nbt(&mut nbt);
        nbt
    }
}

/// The conversion error of map representations: the entry under this key could not be converted.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct InvalidEntry(pub String);

impl Display for InvalidEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid map entry '{}'", self.0)
    }
}

impl Error for InvalidEntry {}

// Both map types share the same representation: one compound entry per map entry
macro_rules! map_repr {
    ($map:ident, $($bound:path),*) => {
        impl<K, V> NbtRepr for $map<K, V>
        where
            K: ToString + FromStr $(+ $bound)*,
            V: NbtRepr,
        {
            type Error = NbtReprError<InvalidEntry>;

            fn from_nbt(nbt: &NbtCompound) -> Result<Self, Self::Error> {
                let mut map = $map::new();
                for (key, tag) in nbt.iter() {
                    let parsed = K::from_str(key)
                        .map_err(|_| NbtReprError::conversion(InvalidEntry(key.clone())))?;
                    let compound: &NbtCompound = tag.try_into()?;
                    let value = V::from_nbt(compound)
                        .map_err(|_| NbtReprError::conversion(InvalidEntry(key.clone())))?;
                    map.insert(parsed, value);
                }
                Ok(map)
            }

            fn write_nbt(&self, nbt: &mut NbtCompound) {
                for (key, value) in self.iter() {
                    nbt.set(key.to_string(), value.to_nbt());
                }
            }

            #[inline]
            fn to_nbt(&self) -> NbtCompound {
                let mut nbt = NbtCompound::with_capacity(self.len());
                self.write_nbt(&mut nbt);
                nbt
            }
        }
    };
}

map_repr!(BTreeMap, Ord);
map_repr!(HashMap, Eq, Hash);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl NbtRepr for Point {
        type Error = NbtStructureError;

        fn from_nbt(nbt: &NbtCompound) -> Result<Self, Self::Error> {
            Ok(Point {
                x: nbt.get_int("x").ok_or_else(|| NbtStructureError::MissingTag("x".to_owned()))?,
                y: nbt.get_int("y").ok_or_else(|| NbtStructureError::MissingTag("y".to_owned()))?,
            })
        }

        fn write_nbt(&self, nbt: &mut NbtCompound) {
            nbt.set_int("x", self.x);
            nbt.set_int("y", self.y);
        }
    }

    #[test]
    fn map_repr_test() {
        let mut points = BTreeMap::new();
        points.insert(1u32, Point { x: 1, y: 2 });
        points.insert(7u32, Point { x: -4, y: 0 });

        let nbt = points.to_nbt();
        assert_eq!(nbt.len(), 2);
        assert_eq!(nbt.get_compound("7").and_then(|c| c.get_int("x")), Some(-4));

        let restored = BTreeMap::<u32, Point>::from_nbt(&nbt).expect("Failed to restore map");
        assert_eq!(restored, points);
    }

    #[test]
    fn map_repr_bad_key() {
        let mut nbt = NbtCompound::new();
        nbt.set_compound("not a number", Point { x: 0, y: 0 }.to_nbt());

        let result = HashMap::<u32, Point>::from_nbt(&nbt);
        assert_eq!(
            result,
            Err(NbtReprError::Conversion(InvalidEntry("not a number".to_owned())))
        );
    }

    #[test]
    fn map_repr_wrong_value_type() {
        let mut nbt = NbtCompound::new();
        nbt.set_int("1", 5);

        let result = HashMap::<u32, Point>::from_nbt(&nbt);
        assert!(matches!(
            result,
            Err(NbtReprError::Structure(NbtStructureError::TypeMismatch { .. }))
        ));
    }
}

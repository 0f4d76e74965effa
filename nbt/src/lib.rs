#![warn(missing_docs)]

//! Provides support for encoding and decoding the Named Binary Tag (NBT) format. This crate supports
//! both zlib and gz compression, provides tools for converting NBT to and from stringified NBT (SNBT),
//! and can describe any tag tree through the examination API in [`examine`].

mod compound;
mod list;
mod repr;
mod tag;

/// Loads file-based configuration and converts it into option state.
pub mod config;
/// Defines the examination API used to produce debug descriptions of tags.
pub mod examine;
/// Contains utilities for reading and writing binary NBT data.
pub mod io;
/// Typed option keys and the option state consumed by readers and SNBT writers.
pub mod option;
/// Provides support for SNBT parsing and emitting.
pub mod snbt;

pub use compound::{NbtCompound, NbtCompoundBuilder};
pub use list::NbtList;
pub use repr::{InvalidEntry, NbtRepr, NbtReprError, NbtStructureError};
pub use tag::{InvalidTagType, NbtTag, TagType};

//! Options are identified by namespaced ids such as `nbt:read_size_limit` and carry a typed default.
//! An [`OptionState`] holds the values which were set explicitly; any other option reads as its default.
//!
//! ```
//! # use nbt::option::{OptionState, SNBT_INDENT, SNBT_EMIT_LEGACY};
//! let state = OptionState::builder().value(&SNBT_INDENT, 4).build();
//! assert_eq!(state.value(&SNBT_INDENT), 4);
//! assert!(!state.value(&SNBT_EMIT_LEGACY));
//! ```

use std::{collections::HashMap, env, fmt::Debug};

use log::warn;

use crate::io::{DEFAULT_DEPTH_LIMIT, DEFAULT_SIZE_LIMIT};

/// The maximum number of decompressed bytes a binary reader accepts. Zero disables the limit.
pub const READ_SIZE_LIMIT: OptionKey<u64> = OptionKey::new("nbt:read_size_limit", DEFAULT_SIZE_LIMIT);
/// The maximum nesting depth a binary reader accepts.
pub const READ_DEPTH_LIMIT: OptionKey<u32> = OptionKey::new("nbt:read_depth_limit", DEFAULT_DEPTH_LIMIT);
/// The number of spaces per indentation level of emitted SNBT. Zero emits compact SNBT.
pub const SNBT_INDENT: OptionKey<u32> = OptionKey::new("nbt:snbt_indent", 0);
/// Whether emitted SNBT is indented with one tab per level instead of spaces.
pub const SNBT_INDENT_TAB: OptionKey<bool> = OptionKey::new("nbt:snbt_indent_tab", false);
/// Whether emitted SNBT lists carry legacy `index:` prefixes.
pub const SNBT_EMIT_LEGACY: OptionKey<bool> = OptionKey::new("nbt:snbt_emit_legacy", false);
/// Whether the SNBT parser accepts legacy `index:` prefixes in lists.
pub const SNBT_ACCEPT_LEGACY: OptionKey<bool> = OptionKey::new("nbt:snbt_accept_legacy", false);

static KNOWN_OPTIONS: [&dyn AnyOptionKey; 6] = [
    &READ_SIZE_LIMIT,
    &READ_DEPTH_LIMIT,
    &SNBT_INDENT,
    &SNBT_INDENT_TAB,
    &SNBT_EMIT_LEGACY,
    &SNBT_ACCEPT_LEGACY,
];

/// Returns every option defined by this crate.
pub fn known_options() -> &'static [&'static dyn AnyOptionKey] {
    &KNOWN_OPTIONS
}

/// A type-erased option value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionValue {
    /// A flag.
    Bool(bool),
    /// A small unsigned number.
    U32(u32),
    /// A large unsigned number.
    U64(u64),
}

/// A type which option values may have.
pub trait OptionType: Copy + Debug + Send + Sync + 'static {
    /// Erases the type of this value.
    fn into_value(self) -> OptionValue;

    /// Recovers a value of this type, or `None` if the value has another type.
    fn from_value(value: OptionValue) -> Option<Self>;

    /// Parses a value of this type from text, such as an environment variable.
    fn parse(raw: &str) -> Option<Self>;
}

impl OptionType for bool {
    fn into_value(self) -> OptionValue {
        OptionValue::Bool(self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

impl OptionType for u32 {
    fn into_value(self) -> OptionValue {
        OptionValue::U32(self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::U32(value) => Some(value),
            _ => None,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl OptionType for u64 {
    fn into_value(self) -> OptionValue {
        OptionValue::U64(self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::U64(value) => Some(value),
            _ => None,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

/// A typed key identifying an option, along with the value it takes when unset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OptionKey<V> {
    id: &'static str,
    default: V,
}

impl<V> OptionKey<V> {
    /// Creates a key with the given id and default value.
    pub const fn new(id: &'static str, default: V) -> Self {
        OptionKey { id, default }
    }

    /// Returns the namespaced id of this option.
    pub fn id(&self) -> &'static str {
        self.id
    }
}

impl<V: Copy> OptionKey<V> {
    /// Returns the value this option takes when unset.
    pub fn default_value(&self) -> V {
        self.default
    }
}

/// An option key with its value type erased, used to enumerate options.
pub trait AnyOptionKey: Sync {
    /// Returns the namespaced id of this option.
    fn id(&self) -> &'static str;

    /// Parses a raw value for this option.
    fn parse_value(&self, raw: &str) -> Option<OptionValue>;
}

impl<V: OptionType> AnyOptionKey for OptionKey<V> {
    fn id(&self) -> &'static str {
        self.id
    }

    fn parse_value(&self, raw: &str) -> Option<OptionValue> {
        V::parse(raw).map(OptionType::into_value)
    }
}

/// Returns the environment variable which overrides the option with the given id.
///
/// ```
/// # use nbt::option::env_name;
/// assert_eq!(env_name("", "nbt:snbt_indent"), "NBT_SNBT_INDENT");
/// assert_eq!(env_name("APP_", "nbt:read_size_limit"), "APP_NBT_READ_SIZE_LIMIT");
/// ```
pub fn env_name(prefix: &str, id: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + id.len());
    name.push_str(prefix);
    name.extend(
        id.chars()
            .map(|ch| if ch == ':' || ch == '.' { '_' } else { ch.to_ascii_uppercase() }),
    );
    name
}

/// A set of explicitly assigned option values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionState {
    values: HashMap<&'static str, OptionValue>,
}

impl OptionState {
    /// Returns a state in which every option has its default value.
    pub fn empty() -> Self {
        OptionState::default()
    }

    /// Returns a builder for a new state.
    pub fn builder() -> OptionStateBuilder {
        OptionStateBuilder::default()
    }

    /// Returns whether the given option was assigned explicitly.
    pub fn has<V>(&self, key: &OptionKey<V>) -> bool {
        self.values.contains_key(key.id)
    }

    /// Returns the value of the given option, falling back to its default.
    pub fn value<V: OptionType>(&self, key: &OptionKey<V>) -> V {
        self.values
            .get(key.id)
            .and_then(|value| V::from_value(*value))
            .unwrap_or(key.default)
    }
}

/// Builds an [`OptionState`]. Later assignments of the same option win.
#[derive(Clone, Debug, Default)]
pub struct OptionStateBuilder {
    values: HashMap<&'static str, OptionValue>,
}

impl OptionStateBuilder {
    /// Assigns a value to the given option.
    pub fn value<V: OptionType>(mut self, key: &OptionKey<V>, value: V) -> Self {
        self.values.insert(key.id, value.into_value());
        self
    }

    /// Copies every explicit value of the given state.
    pub fn values(mut self, state: &OptionState) -> Self {
        self.values
            .extend(state.values.iter().map(|(id, value)| (*id, *value)));
        self
    }

    /// Assigns every known option which has a matching environment variable. See [`env_name`].
    pub fn values_from_env(self, prefix: &str) -> Self {
        self.values_from_source(prefix, |name| env::var(name).ok())
    }

    /// Assigns every known option for which `lookup` returns a value, keyed the same way as
    /// environment variables. Values which fail to parse are logged and ignored.
    pub fn values_from_source<F>(mut self, prefix: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in known_options() {
            let name = env_name(prefix, key.id());
            if let Some(raw) = lookup(&name) {
                match key.parse_value(&raw) {
                    Some(value) => {
                        self.values.insert(key.id(), value);
                    }
                    None => warn!("Ignoring invalid value '{}' for option {}", raw, name),
                }
            }
        }

        self
    }

    /// Finishes the builder.
    pub fn build(self) -> OptionState {
        OptionState {
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let state = OptionState::empty();
        assert_eq!(state.value(&READ_SIZE_LIMIT), 2 * 1024 * 1024);
        assert_eq!(state.value(&READ_DEPTH_LIMIT), 512);
        assert!(!state.has(&READ_SIZE_LIMIT));
    }

    #[test]
    fn explicit_values_win() {
        let state = OptionState::builder()
            .value(&SNBT_INDENT, 2)
            .value(&SNBT_INDENT, 4)
            .value(&SNBT_EMIT_LEGACY, true)
            .build();
        assert_eq!(state.value(&SNBT_INDENT), 4);
        assert!(state.value(&SNBT_EMIT_LEGACY));
        assert!(state.has(&SNBT_INDENT));
    }

    #[test]
    fn source_values() {
        let state = OptionState::builder()
            .value(&READ_DEPTH_LIMIT, 16)
            .values_from_source("TEST_", |name| match name {
                "TEST_NBT_READ_SIZE_LIMIT" => Some("0".to_owned()),
                "TEST_NBT_SNBT_ACCEPT_LEGACY" => Some("yes".to_owned()),
                "TEST_NBT_SNBT_INDENT" => Some("lots".to_owned()),
                _ => None,
            })
            .build();

        assert_eq!(state.value(&READ_SIZE_LIMIT), 0);
        assert!(state.value(&SNBT_ACCEPT_LEGACY));
        assert!(!state.has(&SNBT_INDENT), "Unparsable value was assigned.");
        assert_eq!(state.value(&READ_DEPTH_LIMIT), 16);
    }

    #[test]
    fn merging_states() {
        let base = OptionState::builder().value(&SNBT_INDENT, 2).build();
        let merged = OptionState::builder()
            .value(&SNBT_INDENT_TAB, true)
            .values(&base)
            .build();
        assert_eq!(merged.value(&SNBT_INDENT), 2);
        assert!(merged.value(&SNBT_INDENT_TAB));
    }
}

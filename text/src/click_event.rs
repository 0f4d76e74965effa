//! ```
//! # use nbt_text::{click_event, ClickEvent};
//! let event = ClickEvent::suggest_command("/msg ");
//! let nbt = click_event::serialize(&event);
//! assert_eq!(nbt.to_snbt(), "{action:\"suggest_command\",value:\"/msg \"}");
//! assert_eq!(click_event::deserialize(&nbt), Some(event));
//! ```

use nbt::{NbtCompound, NbtRepr, NbtReprError, NbtStructureError};

use crate::{ClickAction, ClickEvent, UnknownClickAction};

const ACTION: &str = "action";
const VALUE: &str = "value";

/// Reads a click event from a compound.
///
/// Returns `None` if the action is missing, empty or unknown. A missing value reads as an empty
/// string.
pub fn deserialize(nbt: &NbtCompound) -> Option<ClickEvent> {
    let action = nbt.get_string_or(ACTION, "");
    if action.is_empty() {
        return None;
    }

    let action = action.parse::<ClickAction>().ok()?;
    Some(ClickEvent::new(action, nbt.get_string_or(VALUE, "")))
}

/// Writes a click event as a compound of its action and value.
pub fn serialize(event: &ClickEvent) -> NbtCompound {
    let mut nbt = NbtCompound::with_capacity(2);
    write(event, &mut nbt);
    nbt
}

fn write(event: &ClickEvent, nbt: &mut NbtCompound) {
    nbt.set_string(ACTION, event.action().name());
    nbt.set_string(VALUE, event.value());
}

impl NbtRepr for ClickEvent {
    type Error = NbtReprError<UnknownClickAction>;

    fn from_nbt(nbt: &NbtCompound) -> Result<Self, Self::Error> {
        let action = nbt
            .get_string(ACTION)
            .ok_or_else(|| NbtStructureError::MissingTag(ACTION.to_owned()))?;
        let action = action.parse::<ClickAction>().map_err(NbtReprError::conversion)?;

        Ok(ClickEvent::new(action, nbt.get_string_or(VALUE, "")))
    }

    fn write_nbt(&self, nbt: &mut NbtCompound) {
        write(self, nbt);
    }
}

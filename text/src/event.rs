use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use nbt::examine::{Examinable, ExaminableProperty, PropertyValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The action performed when a player clicks on text.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    /// Opens a URL in the player's browser.
    OpenUrl,
    /// Opens a file on the player's machine.
    OpenFile,
    /// Runs a command as the player.
    RunCommand,
    /// Replaces the player's chat input with a command.
    SuggestCommand,
    /// Turns a book to a page.
    ChangePage,
    /// Copies text to the player's clipboard.
    CopyToClipboard,
}

impl ClickAction {
    /// Every action, in declaration order.
    pub const ALL: [ClickAction; 6] = [
        ClickAction::OpenUrl,
        ClickAction::OpenFile,
        ClickAction::RunCommand,
        ClickAction::SuggestCommand,
        ClickAction::ChangePage,
        ClickAction::CopyToClipboard,
    ];

    /// Returns the name used for this action in JSON and NBT.
    pub fn name(self) -> &'static str {
        match self {
            ClickAction::OpenUrl => "open_url",
            ClickAction::OpenFile => "open_file",
            ClickAction::RunCommand => "run_command",
            ClickAction::SuggestCommand => "suggest_command",
            ClickAction::ChangePage => "change_page",
            ClickAction::CopyToClipboard => "copy_to_clipboard",
        }
    }
}

impl Display for ClickAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClickAction {
    type Err = UnknownClickAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClickAction::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| UnknownClickAction(s.to_owned()))
    }
}

/// Returned when a click action name is not recognized.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("unknown click event action '{0}'")]
pub struct UnknownClickAction(pub String);

/// An action paired with its argument, such as the URL to open.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ClickEvent {
    action: ClickAction,
    value: String,
}

impl ClickEvent {
    /// Creates an event with the given action and value.
    pub fn new<S: Into<String>>(action: ClickAction, value: S) -> Self {
        ClickEvent {
            action,
            value: value.into(),
        }
    }

    /// Creates an event which opens the given URL.
    pub fn open_url<S: Into<String>>(url: S) -> Self {
        Self::new(ClickAction::OpenUrl, url)
    }

    /// Creates an event which opens the given file.
    pub fn open_file<S: Into<String>>(file: S) -> Self {
        Self::new(ClickAction::OpenFile, file)
    }

    /// Creates an event which runs the given command.
    pub fn run_command<S: Into<String>>(command: S) -> Self {
        Self::new(ClickAction::RunCommand, command)
    }

    /// Creates an event which suggests the given command.
    pub fn suggest_command<S: Into<String>>(command: S) -> Self {
        Self::new(ClickAction::SuggestCommand, command)
    }

    /// Creates an event which turns to the given page.
    pub fn change_page(page: u32) -> Self {
        Self::new(ClickAction::ChangePage, page.to_string())
    }

    /// Creates an event which copies the given text.
    pub fn copy_to_clipboard<S: Into<String>>(text: S) -> Self {
        Self::new(ClickAction::CopyToClipboard, text)
    }

    /// Returns the action of this event.
    pub fn action(&self) -> ClickAction {
        self.action
    }

    /// Returns the argument of the action.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Parses this event from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the JSON form of this event.
    pub fn to_json(&self) -> String {
        // Neither field can fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Examinable for ClickEvent {
    fn examinable_name(&self) -> &str {
        "ClickEvent"
    }

    fn examinable_properties(&self) -> Vec<ExaminableProperty<'_>> {
        vec![
            ExaminableProperty::of("action", PropertyValue::Raw(self.action.name().into())),
            ExaminableProperty::of("value", self.value.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbt::examine::{Examiner, StringExaminer};

    #[test]
    fn action_names() {
        for action in ClickAction::ALL {
            assert_eq!(action.name().parse::<ClickAction>(), Ok(action));
        }
        assert_eq!(
            "OPEN_URL".parse::<ClickAction>(),
            Err(UnknownClickAction("OPEN_URL".to_owned()))
        );
    }

    #[test]
    fn json() {
        let event = ClickEvent::change_page(3);
        assert_eq!(event.to_json(), r#"{"action":"change_page","value":"3"}"#);
        assert_eq!(
            ClickEvent::from_json(r#"{"action":"run_command","value":"/help"}"#)
                .expect("Failed to parse event"),
            ClickEvent::run_command("/help")
        );
        assert!(ClickEvent::from_json(r#"{"action":"explode","value":""}"#).is_err());
    }

    #[test]
    fn examination() {
        let event = ClickEvent::open_url("https://example.com/\"q\"");
        assert_eq!(
            StringExaminer::default().examine(&event),
            "ClickEvent{action=open_url, value=\"https://example.com/\\\"q\\\"\"}"
        );
    }
}

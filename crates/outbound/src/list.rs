//! Interactive list messages.

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::validate::{self, Check, ValidationError};

const TITLE_MAX: usize = 60;
const BODY_MAX: usize = 1024;
const ITEMS_MAX: usize = 10;
const GLOBAL_BUTTON_MAX: usize = 20;
const OPTION_TITLE_MAX: usize = 24;
const OPTION_DESCRIPTION_MAX: usize = 72;

/// A list with a single menu button that opens sections of options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ListMessageWire")]
pub struct ListMessage {
    pub title: String,
    pub body: String,
    /// Omitted from the wire when empty.
    pub msg_id: String,
    /// Label of the button that opens the list.
    pub global_button: String,
    pub items: Vec<ListItem>,
}

/// A titled section of options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub options: Vec<ListItemOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListItemOption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Text echoed back in the `list_reply` when the option is picked.
    #[serde(default, rename = "postbackText")]
    pub postback_text: String,
}

impl ListMessage {
    pub fn validate(&self) -> Check {
        validate::length("title", &self.title, 1, TITLE_MAX)?;
        validate::length("body", &self.body, 1, BODY_MAX)?;
        validate::length("global_button", &self.global_button, 1, GLOBAL_BUTTON_MAX)?;
        if self.items.is_empty() {
            return Err(ValidationError::new("items", validate::Rule::Required));
        }
        validate::count("items", self.items.len(), 1, ITEMS_MAX)?;
        for (i, item) in self.items.iter().enumerate() {
            item.validate(&format!("items[{i}]"))?;
        }
        Ok(())
    }
}

impl ListItem {
    fn validate(&self, path: &str) -> Check {
        validate::required(&format!("{path}.title"), &self.title)?;
        if self.options.is_empty() {
            return Err(ValidationError::new(
                format!("{path}.options"),
                validate::Rule::Required,
            ));
        }
        for (i, option) in self.options.iter().enumerate() {
            option.validate(&format!("{path}.options[{i}]"))?;
        }
        Ok(())
    }
}

impl ListItemOption {
    fn validate(&self, path: &str) -> Check {
        validate::length(&format!("{path}.title"), &self.title, 1, OPTION_TITLE_MAX)?;
        validate::length(
            &format!("{path}.description"),
            &self.description,
            1,
            OPTION_DESCRIPTION_MAX,
        )
    }
}

// ── Wire form ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct TextButton<T> {
    #[serde(rename = "type")]
    kind: T,
    title: T,
}

#[derive(Serialize)]
struct ListMessageRef<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    msgid: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "globalButtons")]
    global_buttons: [TextButton<&'a str>; 1],
    items: &'a [ListItem],
}

#[derive(Deserialize)]
struct ListMessageWire {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    msgid: String,
    #[serde(default, rename = "globalButtons")]
    global_buttons: Vec<TextButton<String>>,
    #[serde(default)]
    items: Vec<ListItem>,
}

impl From<ListMessageWire> for ListMessage {
    fn from(wire: ListMessageWire) -> Self {
        Self {
            title: wire.title,
            body: wire.body,
            msg_id: wire.msgid,
            global_button: wire
                .global_buttons
                .into_iter()
                .next()
                .map(|button| button.title)
                .unwrap_or_default(),
            items: wire.items,
        }
    }
}

impl Serialize for ListMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ListMessageRef {
            title: &self.title,
            body: &self.body,
            msgid: (!self.msg_id.is_empty()).then_some(self.msg_id.as_str()),
            kind: "list",
            global_buttons: [TextButton {
                kind: "text",
                title: &self.global_button,
            }],
            items: &self.items,
        }
        .serialize(serializer)
    }
}

impl Serialize for ListItemOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut option = serializer.serialize_struct("ListItemOption", 4)?;
        option.serialize_field("type", "text")?;
        option.serialize_field("title", &self.title)?;
        option.serialize_field("description", &self.description)?;
        option.serialize_field("postbackText", &self.postback_text)?;
        option.end()
    }
}

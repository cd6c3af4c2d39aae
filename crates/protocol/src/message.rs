//! The nested `message` envelope and the content payloads it dispatches to.
//!
//! A `message` webhook carries a second `{id, source, type, payload}` object.
//! Its `type` selects the content decoder one level down, with the same
//! tolerance for unknown tags as the outer envelope.

use {
    chrono::{DateTime, Utc},
    serde::Deserialize,
    serde_json::value::RawValue,
    tracing::debug,
};

use crate::{
    error::{DecodeError, Result},
    wire::{decode_fragment, epoch_millis, nullable, raw_payload},
};

/// A user-originated message delivered to the business number.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    /// Originating address (the user's phone number).
    pub source: String,
    /// Content discriminator as sent on the wire.
    pub kind: String,
    pub payload: MessageContent,
    pub sender: Option<Sender>,
    pub context: Option<MessageContext>,
}

/// Content of an inbound message, one variant per content tag.
#[derive(Debug, Clone)]
pub enum MessageContent {
    Text(String),
    /// Text produced by tapping a template button.
    ButtonText(String),
    Media(InboundMedia),
    Location(Location),
    Contacts(Vec<Contact>),
    ListReply(ListReply),
    ButtonReply(ButtonReply),
    /// Unknown content tag; the raw payload is kept as sent.
    Uncategorized(Option<Box<RawValue>>),
}

impl MessageContent {
    /// Plain or button text, if this is a text message.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::ButtonText(text) => Some(text),
            _ => None,
        }
    }
}

/// Sender profile attached to inbound messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Sender {
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub country_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dial_code: String,
}

/// Reference to the outbound message this one replies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageContext {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(rename = "gsId", default, deserialize_with = "nullable")]
    pub gateway_id: String,
}

/// Which media tag produced an [`InboundMedia`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Sticker,
    File,
}

impl MediaKind {
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "image" => Some(Self::Image),
            "sticker" => Some(Self::Sticker),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Image => "image",
            Self::Sticker => "sticker",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media attachment; the download URL is only valid until `url_expiry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMedia {
    pub caption: String,
    pub name: String,
    pub url: String,
    pub content_type: String,
    pub url_expiry: DateTime<Utc>,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "nullable")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub longitude: f64,
}

/// Selection from an interactive list message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListReply {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub reply: String,
    #[serde(rename = "postbackText", default, deserialize_with = "nullable")]
    pub postback_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
}

/// Tap on a quick-reply button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ButtonReply {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub reply: String,
}

/// A shared contact card.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "nullable")]
    pub addresses: Vec<ContactAddress>,
    #[serde(default, deserialize_with = "nullable")]
    pub emails: Vec<ContactEmail>,
    #[serde(default, deserialize_with = "nullable")]
    pub ims: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: ContactName,
    #[serde(default, deserialize_with = "nullable")]
    pub org: ContactOrg,
    #[serde(default, deserialize_with = "nullable")]
    pub phones: Vec<ContactPhone>,
    #[serde(default, deserialize_with = "nullable")]
    pub urls: Vec<ContactUrl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactAddress {
    #[serde(default, deserialize_with = "nullable")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub country: String,
    #[serde(rename = "countryCode", default, deserialize_with = "nullable")]
    pub country_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub street: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub zip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactEmail {
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactName {
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub formatted_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactOrg {
    #[serde(default, deserialize_with = "nullable")]
    pub company: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactPhone {
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactUrl {
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
}

// ── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Default, Deserialize)]
struct MessageWire {
    #[serde(default, deserialize_with = "nullable")]
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    source: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: String,
    #[serde(default, deserialize_with = "raw_payload")]
    payload: Option<Box<RawValue>>,
    #[serde(default)]
    sender: Option<Sender>,
    #[serde(default)]
    context: Option<MessageContext>,
}

#[derive(Default, Deserialize)]
struct TextWire {
    #[serde(default, deserialize_with = "nullable")]
    text: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: String,
}

#[derive(Default, Deserialize)]
struct MediaWire {
    #[serde(default, deserialize_with = "nullable")]
    caption: String,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    url: String,
    #[serde(rename = "contentType", default, deserialize_with = "nullable")]
    content_type: String,
    #[serde(rename = "urlExpiry", default, deserialize_with = "nullable")]
    url_expiry: i64,
}

#[derive(Default, Deserialize)]
struct ContactsWire {
    #[serde(default, deserialize_with = "nullable")]
    contacts: Vec<Contact>,
}

impl InboundMessage {
    /// Decode a standalone `message` object.
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: MessageWire =
            serde_json::from_str(json).map_err(|source| DecodeError::payload("message", source))?;
        Self::from_wire(wire)
    }

    pub(crate) fn from_fragment(raw: Option<&RawValue>) -> Result<Self> {
        let wire: MessageWire = decode_fragment("message", raw)?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: MessageWire) -> Result<Self> {
        let payload = decode_content(&wire.kind, wire.payload)?;
        Ok(Self {
            id: wire.id,
            source: wire.source,
            kind: wire.kind,
            payload,
            sender: wire.sender,
            context: wire.context,
        })
    }
}

fn decode_content(kind: &str, raw: Option<Box<RawValue>>) -> Result<MessageContent> {
    let fragment = raw.as_deref();
    let content = match kind {
        "text" => {
            let text: TextWire = decode_fragment("text", fragment)?;
            if text.kind == "button" {
                MessageContent::ButtonText(text.text)
            } else {
                MessageContent::Text(text.text)
            }
        },
        "location" => MessageContent::Location(decode_fragment("location", fragment)?),
        "contact" => {
            let wrapper: ContactsWire = decode_fragment("contact", fragment)?;
            MessageContent::Contacts(wrapper.contacts)
        },
        "list_reply" => MessageContent::ListReply(decode_fragment("list_reply", fragment)?),
        "button_reply" => MessageContent::ButtonReply(decode_fragment("button_reply", fragment)?),
        other => match MediaKind::from_tag(other) {
            Some(media_kind) => {
                let media: MediaWire = decode_fragment("media", fragment)?;
                MessageContent::Media(InboundMedia {
                    caption: media.caption,
                    name: media.name,
                    url: media.url,
                    content_type: media.content_type,
                    url_expiry: epoch_millis("urlExpiry", media.url_expiry)?,
                    kind: media_kind,
                })
            },
            None => {
                debug!(kind = other, "uncategorized message content");
                MessageContent::Uncategorized(raw)
            },
        },
    };
    Ok(content)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn message(kind: &str, payload: &str) -> InboundMessage {
        let json = format!(r#"{{"id":"m-1","source":"15551234567","type":"{kind}","payload":{payload}}}"#);
        InboundMessage::from_json(&json).unwrap()
    }

    #[test]
    fn plain_text() {
        let msg = message("text", r#"{"text":"hello"}"#);
        assert!(matches!(msg.payload, MessageContent::Text(ref t) if t == "hello"));
        assert_eq!(msg.id, "m-1");
        assert_eq!(msg.source, "15551234567");
    }

    #[test]
    fn button_text_is_tagged() {
        let msg = message("text", r#"{"text":"Yes","type":"button"}"#);
        assert!(matches!(msg.payload, MessageContent::ButtonText(ref t) if t == "Yes"));
        assert_eq!(msg.payload.text(), Some("Yes"));
        assert_eq!(msg.kind, "text");
    }

    #[rstest]
    #[case("audio", MediaKind::Audio)]
    #[case("video", MediaKind::Video)]
    #[case("image", MediaKind::Image)]
    #[case("sticker", MediaKind::Sticker)]
    #[case("file", MediaKind::File)]
    fn media_is_annotated_with_kind(#[case] tag: &str, #[case] expected: MediaKind) {
        let msg = message(
            tag,
            r#"{"caption":"pic","name":"a.bin","url":"https://cdn.example/a","contentType":"application/octet-stream","urlExpiry":1700000000000}"#,
        );
        let MessageContent::Media(media) = msg.payload else {
            panic!("expected media payload");
        };
        assert_eq!(media.kind, expected);
        assert_eq!(media.caption, "pic");
        assert_eq!(media.content_type, "application/octet-stream");
        assert_eq!(media.url_expiry.timestamp(), 1_700_000_000);
    }

    #[test]
    fn media_tolerates_null_caption() {
        let msg = message("image", r#"{"caption":null,"url":"https://cdn.example/a","urlExpiry":1700000000999}"#);
        let MessageContent::Media(media) = msg.payload else {
            panic!("expected media payload");
        };
        assert_eq!(media.caption, "");
        assert_eq!(media.url_expiry.timestamp(), 1_700_000_000);
    }

    #[test]
    fn location() {
        let msg = message("location", r#"{"latitude":52.52,"longitude":13.405}"#);
        let MessageContent::Location(loc) = msg.payload else {
            panic!("expected location payload");
        };
        assert_eq!(loc, Location {
            latitude: 52.52,
            longitude: 13.405
        });
    }

    #[test]
    fn contact_wrapper_is_discarded() {
        let msg = message(
            "contact",
            r#"{"contacts":[{
                "addresses":[{"city":"Berlin","countryCode":"de","type":"HOME"}],
                "emails":[{"email":"ana@example.com","type":"WORK"}],
                "ims":[],
                "name":{"first_name":"Ana","formatted_name":"Ana Lima","last_name":"Lima"},
                "org":{"company":"Acme"},
                "phones":[{"phone":"+4915112345678","type":"CELL"}],
                "urls":[{"url":"https://acme.example","type":"WORK"}]
            }]}"#,
        );
        let MessageContent::Contacts(contacts) = msg.payload else {
            panic!("expected contacts payload");
        };
        assert_eq!(contacts.len(), 1);
        let contact = &contacts[0];
        assert_eq!(contact.name.formatted_name, "Ana Lima");
        assert_eq!(contact.org.company, "Acme");
        assert_eq!(contact.addresses[0].country_code, "de");
        assert_eq!(contact.phones[0].kind, "CELL");
        assert_eq!(contact.urls[0].url, "https://acme.example");
        assert_eq!(contact.emails[0].email, "ana@example.com");
    }

    #[test]
    fn list_reply() {
        let msg = message(
            "list_reply",
            r#"{"title":"Pizza","id":"opt-1","reply":"Pizza 1","postbackText":"pizza","description":"Cheese"}"#,
        );
        let MessageContent::ListReply(reply) = msg.payload else {
            panic!("expected list reply");
        };
        assert_eq!(reply.postback_text, "pizza");
        assert_eq!(reply.description, "Cheese");
    }

    #[test]
    fn button_reply() {
        let msg = message("button_reply", r#"{"title":"Yes","id":"qr-1","reply":"Yes 1"}"#);
        let MessageContent::ButtonReply(reply) = msg.payload else {
            panic!("expected button reply");
        };
        assert_eq!(reply, ButtonReply {
            title: "Yes".into(),
            id: "qr-1".into(),
            reply: "Yes 1".into(),
        });
    }

    #[test]
    fn unknown_content_is_uncategorized() {
        let msg = message("reaction", r#"{"emoji":"👍"}"#);
        let MessageContent::Uncategorized(Some(raw)) = msg.payload else {
            panic!("expected uncategorized payload");
        };
        assert_eq!(raw.get(), r#"{"emoji":"👍"}"#);
    }

    #[test]
    fn sender_and_context_are_kept() {
        let msg = InboundMessage::from_json(
            r#"{"id":"m-2","source":"15551234567","type":"text","payload":{"text":"hi"},
                "sender":{"phone":"15551234567","name":"Ana","country_code":"1","dial_code":"5551234567"},
                "context":{"id":"orig-1","gsId":"gs-9"}}"#,
        )
        .unwrap();
        assert_eq!(msg.sender.unwrap().name, "Ana");
        assert_eq!(msg.context.unwrap().gateway_id, "gs-9");
    }

    #[rstest]
    #[case("text", r#"{"text":5}"#, "text")]
    #[case("image", r#"{"urlExpiry":"soon"}"#, "media")]
    #[case("location", r#"{"latitude":"north"}"#, "location")]
    #[case("contact", r#"{"contacts":{}}"#, "contact")]
    #[case("list_reply", "5", "list_reply")]
    #[case("button_reply", r#""yes""#, "button_reply")]
    fn leaf_errors_name_their_layer(#[case] kind: &str, #[case] payload: &str, #[case] layer: &str) {
        let json = format!(r#"{{"id":"m","source":"1","type":"{kind}","payload":{payload}}}"#);
        let err = InboundMessage::from_json(&json).unwrap_err();
        assert_eq!(err.layer(), layer);
        assert!(err.to_string().starts_with(&format!("failed to parse {layer} payload")));
    }

    #[test]
    fn null_content_payload_decodes_to_defaults() {
        assert_eq!(message("text", "null").payload.text(), Some(""));
        let MessageContent::Location(location) = message("location", "null").payload else {
            panic!("expected location");
        };
        assert_eq!(location, Location::default());
    }

    #[test]
    fn nested_null_payload_through_envelope() {
        let event = crate::decode(
            br#"{"app":"DemoApp","timestamp":0,"type":"message","payload":{"id":"m","source":"1","type":"button_reply","payload":null}}"#,
        )
        .unwrap();
        let crate::EventPayload::Message(msg) = event.payload else {
            panic!("expected message");
        };
        assert!(matches!(msg.payload, MessageContent::ButtonReply(ref r) if *r == ButtonReply::default()));
    }

    #[test]
    fn contact_null_strings_are_empty() {
        let msg = message(
            "contact",
            r#"{"contacts":[{"addresses":[{"city":null,"zip":"94107"}],"name":{"first_name":null,"formatted_name":"Ana"},"org":{"company":null},"emails":[{"email":null,"type":"WORK"}]}]}"#,
        );
        let MessageContent::Contacts(contacts) = msg.payload else {
            panic!("expected contacts");
        };
        let contact = &contacts[0];
        assert_eq!(contact.addresses[0].city, "");
        assert_eq!(contact.addresses[0].zip, "94107");
        assert_eq!(contact.name.first_name, "");
        assert_eq!(contact.name.formatted_name, "Ana");
        assert_eq!(contact.org.company, "");
        assert_eq!(contact.emails[0].kind, "WORK");
    }

    #[test]
    fn known_kind_without_payload_fails() {
        let err = InboundMessage::from_json(r#"{"id":"m","source":"1","type":"location"}"#).unwrap_err();
        assert_eq!(err.layer(), "location");
    }
}

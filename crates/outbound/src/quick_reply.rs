//! Quick-reply messages: a content block followed by tappable text options.

use serde::{Serialize, Serializer};

/// One tappable option; sent as `{"text": …, "type": "text"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickReplyOption(pub String);

impl From<&str> for QuickReplyOption {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for QuickReplyOption {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl Serialize for QuickReplyOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            text: &'a str,
            #[serde(rename = "type")]
            kind: &'static str,
        }

        Wire {
            text: &self.0,
            kind: "text",
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickReplyText {
    pub msg_id: String,
    pub header: String,
    pub text: String,
    pub caption: String,
    pub options: Vec<QuickReplyOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickReplyImage {
    pub msg_id: String,
    pub url: String,
    pub text: String,
    pub caption: String,
    pub options: Vec<QuickReplyOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickReplyVideo {
    pub msg_id: String,
    pub url: String,
    pub text: String,
    pub caption: String,
    pub options: Vec<QuickReplyOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickReplyDocument {
    pub msg_id: String,
    pub url: String,
    pub text: String,
    pub caption: String,
    pub filename: String,
    pub options: Vec<QuickReplyOption>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Content<'a> {
    Text {
        header: &'a str,
        text: &'a str,
        caption: &'a str,
    },
    Image {
        url: &'a str,
        text: &'a str,
        caption: &'a str,
    },
    Video {
        url: &'a str,
        text: &'a str,
        caption: &'a str,
    },
    Document {
        url: &'a str,
        text: &'a str,
        caption: &'a str,
        filename: &'a str,
    },
}

#[derive(Serialize)]
struct QuickReplyWire<'a> {
    msgid: &'a str,
    content: Content<'a>,
    options: &'a [QuickReplyOption],
}

impl Serialize for QuickReplyText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuickReplyWire {
            msgid: &self.msg_id,
            content: Content::Text {
                header: &self.header,
                text: &self.text,
                caption: &self.caption,
            },
            options: &self.options,
        }
        .serialize(serializer)
    }
}

impl Serialize for QuickReplyImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuickReplyWire {
            msgid: &self.msg_id,
            content: Content::Image {
                url: &self.url,
                text: &self.text,
                caption: &self.caption,
            },
            options: &self.options,
        }
        .serialize(serializer)
    }
}

impl Serialize for QuickReplyVideo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuickReplyWire {
            msgid: &self.msg_id,
            content: Content::Video {
                url: &self.url,
                text: &self.text,
                caption: &self.caption,
            },
            options: &self.options,
        }
        .serialize(serializer)
    }
}

impl Serialize for QuickReplyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QuickReplyWire {
            msgid: &self.msg_id,
            content: Content::Document {
                url: &self.url,
                text: &self.text,
                caption: &self.caption,
                filename: &self.filename,
            },
            options: &self.options,
        }
        .serialize(serializer)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn options() -> Vec<QuickReplyOption> {
        vec!["A".into(), "B".into()]
    }

    #[test]
    fn image_wire_text() {
        let qr = QuickReplyImage {
            msg_id: "m1".into(),
            url: "http://x/y.png".into(),
            text: "t".into(),
            caption: "c".into(),
            options: options(),
        };
        assert_eq!(
            serde_json::to_string(&qr).unwrap(),
            r#"{"msgid":"m1","content":{"type":"image","url":"http://x/y.png","text":"t","caption":"c"},"options":[{"text":"A","type":"text"},{"text":"B","type":"text"}]}"#
        );
    }

    #[test]
    fn text_content() {
        let qr = QuickReplyText {
            msg_id: "m2".into(),
            header: "h".into(),
            text: "pick one".into(),
            caption: "c".into(),
            options: options(),
        };
        assert_eq!(
            serde_json::to_value(&qr).unwrap()["content"],
            json!({"type": "text", "header": "h", "text": "pick one", "caption": "c"})
        );
    }

    #[test]
    fn video_and_document_use_content_key() {
        let video = serde_json::to_value(QuickReplyVideo {
            url: "https://cdn.example.com/v.mp4".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(video["content"]["type"], "video");
        assert_eq!(video["options"], json!([]));

        let doc = serde_json::to_value(QuickReplyDocument {
            msg_id: "m3".into(),
            filename: "terms.pdf".into(),
            options: vec!["Accept".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            doc,
            json!({
                "msgid": "m3",
                "content": {
                    "type": "document",
                    "url": "",
                    "text": "",
                    "caption": "",
                    "filename": "terms.pdf"
                },
                "options": [{"text": "Accept", "type": "text"}]
            })
        );
    }
}

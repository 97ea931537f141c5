//! Message-only view over an entry log.

use colloquy_common::{Entry, Input, InputItem, OutputItem, Role};

/// One line of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub role: Role,
    pub text: String,
}

impl TranscriptMessage {
    fn new(role: Role, text: String) -> Option<Self> {
        (!text.is_empty()).then_some(Self { role, text })
    }
}

/// Flattens entries to the text messages exchanged, in log order.
///
/// Tool calls, tool outputs, reasoning and hosted tool items are left out. A
/// refusal stands in for the text of a message that has none.
#[must_use]
pub fn transcript(entries: &[Entry]) -> Vec<TranscriptMessage> {
    let mut messages = Vec::new();
    for entry in entries {
        match entry {
            Entry::Request(request) => match &request.input {
                Input::Text(text) => messages.extend(TranscriptMessage::new(Role::User, text.clone())),
                Input::Items(items) => {
                    messages.extend(items.iter().filter_map(|item| match item {
                        InputItem::Message { role, content } => {
                            TranscriptMessage::new(*role, content.text())
                        }
                        _ => None,
                    }));
                }
            },
            Entry::Response(response) => {
                messages.extend(response.output.iter().filter_map(|item| match item {
                    OutputItem::Message(message) => {
                        let text = message.text();
                        let text = if text.is_empty() { message.refusal() } else { text };
                        TranscriptMessage::new(message.role, text)
                    }
                    _ => None,
                }));
            }
        }
    }
    messages
}

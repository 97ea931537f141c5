//! Server-sent events decoding.
//!
//! Two stages: [`payloads`] frames an arbitrarily chunked byte stream into
//! the `data` payloads of its SSE events, and [`decode_events`] turns those
//! payloads into [`StreamEvent`]s. Both stages are lazy and own their
//! upstream, so dropping the event stream drops the HTTP body with it.

use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::{self, Stream, StreamExt};
use log::{debug, trace, warn};
use serde::Deserialize;
use serde::de::Error as _;

use colloquy_common::{DecodePolicy, StreamEvent};

use crate::error::ClientError;
use crate::{EventStream, PayloadStream};

const DONE_SENTINEL: &str = "[DONE]";

/// Frames a byte stream into SSE event payloads.
///
/// Lines may end in `\n`, `\r\n` or a bare `\r`; a blank line dispatches the
/// event. Fields other than `data` are dropped, and multi-line data is joined
/// with `\n`. A transport error, or a body that is not valid UTF-8, is
/// yielded once and ends the stream.
pub fn payloads<S, E>(bytes: S) -> PayloadStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError>,
{
    let events = bytes
        .map(|chunk| chunk.map_err(Into::<ClientError>::into))
        .eventsource()
        .boxed();

    stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        match events.next().await? {
            Ok(event) => {
                trace!("SSE event '{}' with {} data bytes", event.event, event.data.len());
                Some((Ok(event.data), Some(events)))
            }
            Err(EventStreamError::Transport(e)) => Some((Err(e), None)),
            Err(e) => Some((
                Err(ClientError::InvalidResponse(format!("Malformed event stream: {e}"))),
                None,
            )),
        }
    })
    .boxed()
}

/// What a single event payload carries.
#[derive(Debug)]
pub enum Payload {
    /// An empty payload or the `[DONE]` sentinel.
    Ignored,
    /// A decoded event.
    Event(StreamEvent),
    /// A payload that is not a known event.
    Invalid {
        /// The trimmed payload.
        payload: String,
        /// Why it was rejected.
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct EventTag {
    #[serde(rename = "type")]
    kind: String,
}

/// Classifies one `data` payload of an SSE body.
///
/// The payload is trimmed and decoded as JSON; an unknown `type` tag counts
/// as invalid.
#[must_use]
pub fn parse_payload(data: &str) -> Payload {
    let payload = data.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return Payload::Ignored;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(StreamEvent::Unknown) => {
            let kind = serde_json::from_str::<EventTag>(payload)
                .map_or_else(|_| "<missing>".to_string(), |tag| tag.kind);
            Payload::Invalid {
                payload: payload.to_string(),
                source: serde_json::Error::custom(format!("unknown event type `{kind}`")),
            }
        }
        Ok(event) => Payload::Event(event),
        Err(source) => Payload::Invalid {
            payload: payload.to_string(),
            source,
        },
    }
}

/// Decodes SSE payloads into stream events.
///
/// Under [`DecodePolicy::Skip`] invalid payloads are logged and skipped; under
/// [`DecodePolicy::Fail`] the first one ends the stream with
/// [`ClientError::Decode`]. An upstream error is passed through once and
/// ends the stream.
pub fn decode_events(payloads: PayloadStream, policy: DecodePolicy) -> EventStream {
    stream::unfold(Some(payloads), move |state| async move {
        let mut payloads = state?;
        loop {
            match payloads.next().await {
                None => {
                    debug!("Event stream ended");
                    return None;
                }
                Some(Err(e)) => return Some((Err(e), None)),
                Some(Ok(data)) => match parse_payload(&data) {
                    Payload::Ignored => trace!("Ignoring SSE payload: {data}"),
                    Payload::Event(event) => return Some((Ok(event), Some(payloads))),
                    Payload::Invalid { payload, source } => match policy {
                        DecodePolicy::Skip => {
                            warn!("Skipping undecodable stream payload: {source}");
                            debug!("Skipped payload: {payload}");
                        }
                        DecodePolicy::Fail => {
                            return Some((Err(ClientError::Decode { payload, source }), None));
                        }
                    },
                },
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use proptest::prelude::*;

    use super::*;

    const CREATED: &str =
        r#"{"type":"response.created","response":{"id":"r1","status":"in_progress"}}"#;
    const COMPLETED: &str =
        r#"{"type":"response.completed","response":{"id":"r1","status":"completed"}}"#;

    fn payload_stream(payloads: &[&str]) -> PayloadStream {
        let items: Vec<Result<String, ClientError>> =
            payloads.iter().map(|p| Ok((*p).to_string())).collect();
        stream::iter(items).boxed()
    }

    fn byte_stream(chunks: Vec<String>) -> impl Stream<Item = Result<Bytes, ClientError>> {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
    }

    async fn framed(chunks: &[&str]) -> Vec<String> {
        let chunks = chunks.iter().map(|c| (*c).to_string()).collect();
        payloads(byte_stream(chunks))
            .map(Result::unwrap)
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_payloads_joins_chunks_split_mid_event() {
        let frames = framed(&["data: {\"a\"", ":1}\r\n\r\nda", "ta: x\n\n"]).await;
        assert_eq!(frames, vec![r#"{"a":1}"#, "x"]);
    }

    #[tokio::test]
    async fn test_payloads_accepts_bare_carriage_return_line_endings() {
        let body = format!("data: {CREATED}\r\rdata: {COMPLETED}\r\rdata: [DONE]\r\r");
        let events: Vec<_> = decode_events(payloads(byte_stream(vec![body])), DecodePolicy::Skip)
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StreamEvent::ResponseCreated { .. }));
        assert!(matches!(events[1], StreamEvent::ResponseCompleted { .. }));
    }

    #[tokio::test]
    async fn test_payloads_drops_other_fields_and_comments() {
        let frames = framed(&[
            ": keep-alive\n\n",
            "event: response.created\nid: 7\ndata: one\n\n",
            "retry: 1000\ndata: two\n\n",
        ])
        .await;
        assert_eq!(frames, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_payloads_joins_multi_line_data() {
        let frames = framed(&["data: {\"type\":\ndata: 1}\n\n"]).await;
        assert_eq!(frames, vec!["{\"type\":\n1}"]);
    }

    #[tokio::test]
    async fn test_payloads_yields_transport_error_once() {
        let chunks: Vec<Result<Bytes, ClientError>> = vec![
            Ok(Bytes::from_static(b"data: first\n\ndata: partial")),
            Err(ClientError::InvalidResponse("connection reset".to_string())),
            Ok(Bytes::from_static(b"data: never\n\n")),
        ];
        let results: Vec<_> = payloads(stream::iter(chunks)).collect().await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), "first");
        assert!(matches!(results[1], Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_payload_ignores_empty_and_done() {
        assert!(matches!(parse_payload(""), Payload::Ignored));
        assert!(matches!(parse_payload("  "), Payload::Ignored));
        assert!(matches!(parse_payload("[DONE]"), Payload::Ignored));
    }

    #[test]
    fn test_parse_payload_decodes_event() {
        let data = r#" {"type":"response.refusal.delta","output_index":0,"item_id":"m","content_index":0,"delta":"no"} "#;
        let Payload::Event(StreamEvent::RefusalDelta { delta, .. }) = parse_payload(data) else {
            panic!("expected refusal delta");
        };
        assert_eq!(delta, "no");
    }

    #[test]
    fn test_parse_payload_rejects_unknown_type() {
        let Payload::Invalid { payload, source } = parse_payload(r#"{"type":"response.future"}"#)
        else {
            panic!("expected invalid payload");
        };
        assert_eq!(payload, r#"{"type":"response.future"}"#);
        assert!(source.to_string().contains("response.future"));
    }

    #[tokio::test]
    async fn test_decode_events_skips_invalid_payloads() {
        let events: Vec<_> = decode_events(
            payload_stream(&[
                CREATED,
                "",
                r#"{"type":"response.brand_new"}"#,
                "{not json",
                COMPLETED,
                "[DONE]",
            ]),
            DecodePolicy::Skip,
        )
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Ok(StreamEvent::ResponseCreated { .. })
        ));
        assert!(matches!(
            events[1],
            Ok(StreamEvent::ResponseCompleted { .. })
        ));
    }

    #[tokio::test]
    async fn test_decode_events_fail_policy_stops_at_first_invalid() {
        let events: Vec<_> = decode_events(
            payload_stream(&[CREATED, r#"{"type":"response.brand_new"}"#, COMPLETED]),
            DecodePolicy::Fail,
        )
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        let Err(ClientError::Decode { payload, .. }) = &events[1] else {
            panic!("expected decode error");
        };
        assert!(payload.contains("response.brand_new"));
    }

    #[tokio::test]
    async fn test_decode_events_passes_transport_error_through() {
        let items: Vec<Result<String, ClientError>> = vec![
            Ok(CREATED.to_string()),
            Err(ClientError::InvalidResponse("body ended".to_string())),
            Ok("[DONE]".to_string()),
        ];
        let events: Vec<_> = decode_events(stream::iter(items).boxed(), DecodePolicy::Skip)
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Err(ClientError::InvalidResponse(_))));
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_payloads(
            data in proptest::collection::vec("[a-z{}:,\\[\\]]{1,12}", 0..6),
            cuts in proptest::collection::vec(0usize..128, 0..8),
        ) {
            let body: String = data.iter().map(|d| format!("data: {d}\n\n")).collect();

            let mut points: Vec<usize> = cuts.into_iter().map(|c| c.min(body.len())).collect();
            points.sort_unstable();
            let mut chunks = Vec::new();
            let mut start = 0;
            for point in points {
                chunks.push(body[start..point].to_string());
                start = point;
            }
            chunks.push(body[start..].to_string());

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let frames: Vec<String> = runtime.block_on(
                payloads(byte_stream(chunks)).map(Result::unwrap).collect(),
            );

            prop_assert_eq!(frames, data);
        }
    }
}

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use nearby_core::model::DiscoveryError;
use reqwest::Url;
use serde::Deserialize;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{ChannelHandle, RealtimeEventType, RealtimePayload, RealtimeSink};

pub const REALTIME_SCHEMA: &str = "public";
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const PROTOCOL_VERSION: &str = "1.0.0";
const JOIN_REF: &str = "1";

/// websocket url of the hosted realtime service for a project url,
/// e.g. `https://x.supabase.co` becomes `wss://x.supabase.co/realtime/v1/websocket`.
pub fn realtime_url(base_url: &str, api_key: &str) -> Result<Url, DiscoveryError> {
    let mut url = Url::parse(base_url).map_err(|e| {
        DiscoveryError::InvalidUserInput(format!("invalid curated backend url '{base_url}': {e}"))
    })?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(DiscoveryError::InvalidUserInput(format!(
                "curated backend url has unsupported scheme '{other}'"
            )))
        }
    };
    url.set_scheme(scheme).map_err(|_| {
        DiscoveryError::InvalidUserInput(format!("cannot derive a websocket url from {base_url}"))
    })?;
    let path = format!("{}/realtime/v1/websocket", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", api_key)
        .append_pair("vsn", PROTOCOL_VERSION);
    Ok(url)
}

/// message joining the postgres change feed of one table
pub fn join_message(topic: &str, api_key: &str, table: &str) -> serde_json::Value {
    serde_json::json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": REALTIME_SCHEMA, "table": table }
                ],
                "private": false
            },
            "access_token": api_key
        },
        "ref": JOIN_REF,
        "join_ref": JOIN_REF
    })
}

fn heartbeat_message(reference: u64) -> serde_json::Value {
    serde_json::json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string()
    })
}

#[derive(Debug, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostgresChange {
    #[serde(rename = "type")]
    event_type: RealtimeEventType,
    #[serde(default)]
    record: Option<serde_json::Value>,
    #[serde(default)]
    old_record: Option<serde_json::Value>,
}

impl From<PostgresChange> for RealtimePayload {
    fn from(value: PostgresChange) -> Self {
        RealtimePayload {
            event_type: value.event_type,
            new: value.record,
            old: value.old_record,
        }
    }
}

/// what one text frame on the socket means for the channel
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeFrame {
    Joined,
    Change(RealtimePayload),
    Closed,
    Ignored,
}

/// decode a text frame received on `topic`
pub fn decode_frame(topic: &str, text: &str) -> Result<RealtimeFrame, DiscoveryError> {
    let message: PhoenixMessage = serde_json::from_str(text).map_err(|e| {
        DiscoveryError::BackendSubscriptionFailed(format!("undecodable realtime frame: {e}"))
    })?;
    if message.topic != topic {
        return Ok(RealtimeFrame::Ignored);
    }
    let status = message.payload.get("status").and_then(|s| s.as_str());
    match (message.event.as_str(), status) {
        ("phx_reply", Some("ok")) if message.reference.as_deref() == Some(JOIN_REF) => {
            Ok(RealtimeFrame::Joined)
        }
        ("phx_reply", Some("error")) | ("system", Some("error")) => {
            let reason = message
                .payload
                .get("response")
                .or_else(|| message.payload.get("message"))
                .map(|r| r.to_string())
                .unwrap_or_default();
            Err(DiscoveryError::BackendSubscriptionFailed(format!(
                "realtime channel {topic} refused: {reason}"
            )))
        }
        ("postgres_changes", _) => {
            let data = message.payload.get("data").cloned().ok_or_else(|| {
                DiscoveryError::BackendSubscriptionFailed(String::from(
                    "postgres_changes frame without data",
                ))
            })?;
            let change: PostgresChange = serde_json::from_value(data).map_err(|e| {
                DiscoveryError::BackendSubscriptionFailed(format!("invalid postgres change: {e}"))
            })?;
            Ok(RealtimeFrame::Change(change.into()))
        }
        ("phx_close", _) | ("phx_error", _) => Ok(RealtimeFrame::Closed),
        _ => Ok(RealtimeFrame::Ignored),
    }
}

/// the hosted realtime channel on the places table. a spawned task owns the
/// websocket and forwards every change into the sink. the sink is dropped when
/// the socket ends, which ends the subscription reading from it.
pub struct SocketChannelHandle {
    task: JoinHandle<()>,
}

impl SocketChannelHandle {
    /// spawn the socket task on the current tokio runtime
    pub fn open(
        url: Url,
        api_key: String,
        table: String,
        sink: RealtimeSink,
    ) -> Result<Self, DiscoveryError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            DiscoveryError::BackendSubscriptionFailed(format!(
                "realtime channel needs a tokio runtime: {e}"
            ))
        })?;
        let task = runtime.spawn(async move {
            let topic = format!("realtime:{REALTIME_SCHEMA}:{table}");
            match stream_changes(&url, &api_key, &table, &topic, &sink).await {
                Ok(()) => log::info!("realtime channel {topic} ended"),
                Err(e) => log::warn!("{e}"),
            }
        });
        Ok(Self { task })
    }
}

impl ChannelHandle for SocketChannelHandle {
    fn close(&mut self) {
        self.task.abort();
    }
}

impl Drop for SocketChannelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn stream_changes(
    url: &Url,
    api_key: &str,
    table: &str,
    topic: &str,
    sink: &RealtimeSink,
) -> Result<(), DiscoveryError> {
    let failed = |e: tokio_tungstenite::tungstenite::Error| {
        DiscoveryError::BackendSubscriptionFailed(format!("realtime channel {topic}: {e}"))
    };
    let (socket, _) = connect_async(url.as_str()).await.map_err(failed)?;
    let (mut write, mut read) = socket.split();
    write
        .send(Message::text(join_message(topic, api_key, table).to_string()))
        .await
        .map_err(failed)?;

    let mut heartbeat = time::interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut reference: u64 = 1;
    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                reference += 1;
                write
                    .send(Message::text(heartbeat_message(reference).to_string()))
                    .await
                    .map_err(failed)?;
            }
            message = read.next() => match message {
                None => return Ok(()),
                Some(Err(e)) => return Err(failed(e)),
                Some(Ok(Message::Text(text))) => match decode_frame(topic, text.as_str())? {
                    RealtimeFrame::Joined => log::info!("joined realtime channel {topic}"),
                    RealtimeFrame::Change(payload) => {
                        if sink.send(payload).is_err() {
                            return Ok(());
                        }
                    }
                    RealtimeFrame::Closed => return Ok(()),
                    RealtimeFrame::Ignored => {}
                },
                Some(Ok(Message::Close(_))) => return Ok(()),
                Some(Ok(_)) => {}
            },
            _ = sink.closed() => return Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TOPIC: &str = "realtime:public:places";

    #[test]
    fn test_realtime_url() {
        let url = realtime_url("https://example.supabase.co/", "anon").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://example.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
        let local = realtime_url("http://127.0.0.1:54321", "anon").unwrap();
        assert_eq!(local.scheme(), "ws");
        assert!(realtime_url("ftp://example.com", "anon").is_err());
    }

    #[test]
    fn test_join_message() {
        let join = join_message(TOPIC, "anon", "places");
        assert_eq!(join["event"], "phx_join");
        assert_eq!(join["payload"]["access_token"], "anon");
        let changes = &join["payload"]["config"]["postgres_changes"][0];
        assert_eq!(changes["event"], "*");
        assert_eq!(changes["schema"], "public");
        assert_eq!(changes["table"], "places");
    }

    #[test]
    fn test_decode_change() {
        let frame = serde_json::json!({
            "topic": TOPIC,
            "event": "postgres_changes",
            "ref": null,
            "payload": {
                "ids": [12],
                "data": {
                    "type": "UPDATE",
                    "schema": "public",
                    "table": "places",
                    "commit_timestamp": "2025-03-01T10:00:00Z",
                    "record": { "id": 4, "name": "Lalbagh", "latitude": 12.9507, "longitude": 77.5848 },
                    "old_record": { "id": 4 }
                }
            }
        });
        let decoded = decode_frame(TOPIC, &frame.to_string()).unwrap();
        match decoded {
            RealtimeFrame::Change(payload) => {
                assert_eq!(payload.event_type, RealtimeEventType::Update);
                assert_eq!(payload.new.unwrap()["name"], "Lalbagh");
                assert_eq!(payload.old.unwrap()["id"], 4);
            }
            other => panic!("expected a change, found {other:?}"),
        }
    }

    #[test]
    fn test_decode_control_frames() {
        let joined = serde_json::json!({
            "topic": TOPIC, "event": "phx_reply", "ref": "1",
            "payload": { "status": "ok", "response": { "postgres_changes": [] } }
        });
        assert_eq!(
            decode_frame(TOPIC, &joined.to_string()).unwrap(),
            RealtimeFrame::Joined
        );
        let heartbeat_reply = serde_json::json!({
            "topic": "phoenix", "event": "phx_reply", "ref": "2",
            "payload": { "status": "ok", "response": {} }
        });
        assert_eq!(
            decode_frame(TOPIC, &heartbeat_reply.to_string()).unwrap(),
            RealtimeFrame::Ignored
        );
        let closed = serde_json::json!({ "topic": TOPIC, "event": "phx_close", "payload": {} });
        assert_eq!(
            decode_frame(TOPIC, &closed.to_string()).unwrap(),
            RealtimeFrame::Closed
        );
    }

    #[test]
    fn test_refused_join_is_an_error() {
        let refused = serde_json::json!({
            "topic": TOPIC, "event": "phx_reply", "ref": "1",
            "payload": { "status": "error", "response": { "reason": "Unauthorized" } }
        });
        assert!(matches!(
            decode_frame(TOPIC, &refused.to_string()),
            Err(DiscoveryError::BackendSubscriptionFailed(_))
        ));
        assert!(decode_frame(TOPIC, "not json").is_err());
    }

    #[test]
    fn test_open_requires_runtime() {
        let url = realtime_url("http://127.0.0.1:9", "anon").unwrap();
        let (sink, _receiver) = tokio::sync::mpsc::unbounded_channel();
        let result = SocketChannelHandle::open(url, String::from("anon"), String::from("places"), sink);
        assert!(matches!(
            result,
            Err(DiscoveryError::BackendSubscriptionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_socket_ends_subscription() {
        let url = realtime_url("http://127.0.0.1:9", "anon").unwrap();
        let (sink, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let _handle =
            SocketChannelHandle::open(url, String::from("anon"), String::from("places"), sink)
                .unwrap();
        let next = time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .unwrap();
        assert_eq!(next, None);
    }
}

//! Change-feed subscriptions over the Phoenix websocket protocol (`vsn=1.0.0`).
//!
//! One socket per page lifetime, shared by every channel. The socket is opened lazily
//! by the first `subscribe` and closed when the last `Subscription` is dropped.
//! Nothing reconnects on its own after a close; the next `subscribe` opens a fresh
//! socket and rejoins every channel still held.

use crate::api::Filter;
use crate::data::Table;
use leptos_dom::helpers::{set_interval_with_handle, IntervalHandle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

pub(crate) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const PROTOCOL_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum RealtimeError {
    #[error("Invalid realtime URL: {0}")]
    InvalidUrl(String),

    #[error("WebSocket error: {0}")]
    Socket(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub(crate) enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

/// One `postgres_changes` binding: every event kind on `table`, optionally row-filtered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChangeFeed {
    pub table: Table,
    pub filter: Option<Filter>,
}

impl ChangeFeed {
    pub fn filtered(table: Table, filter: Filter) -> Self {
        Self {
            table,
            filter: Some(filter),
        }
    }

    fn to_config(&self) -> Value {
        let mut v = json!({
            "event": "*",
            "schema": "public",
            "table": self.table.to_string(),
        });
        if let Some(f) = &self.filter {
            v["filter"] = json!(f.to_change_filter());
        }
        v
    }
}

/// Connection parameters, taken from the app config and current session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RealtimeConfig {
    pub base_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
}

pub(crate) fn socket_url(base_url: &str, anon_key: &str) -> Result<String, RealtimeError> {
    let base = base_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(RealtimeError::InvalidUrl(base.to_string()));
    };

    Ok(format!(
        "{ws}/realtime/v1/websocket?apikey={}&vsn={PROTOCOL_VERSION}",
        urlencoding::encode(anon_key)
    ))
}

pub(crate) fn join_message(
    topic: &str,
    feeds: &[ChangeFeed],
    access_token: Option<&str>,
    msg_ref: u64,
) -> PhoenixMessage {
    let changes: Vec<Value> = feeds.iter().map(ChangeFeed::to_config).collect();
    let mut payload = json!({
        "config": {
            "broadcast": { "self": false },
            "presence": { "key": "" },
            "postgres_changes": changes,
        }
    });
    if let Some(token) = access_token {
        payload["access_token"] = json!(token);
    }

    PhoenixMessage {
        topic: topic.to_string(),
        event: "phx_join".to_string(),
        payload,
        msg_ref: Some(msg_ref.to_string()),
    }
}

pub(crate) fn leave_message(topic: &str, msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_string(),
        event: "phx_leave".to_string(),
        payload: json!({}),
        msg_ref: Some(msg_ref.to_string()),
    }
}

/// Hands a refreshed JWT to an already joined channel.
pub(crate) fn access_token_message(topic: &str, access_token: &str, msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_string(),
        event: "access_token".to_string(),
        payload: json!({ "access_token": access_token }),
        msg_ref: Some(msg_ref.to_string()),
    }
}

pub(crate) fn heartbeat_message(msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: "phoenix".to_string(),
        event: "heartbeat".to_string(),
        payload: json!({}),
        msg_ref: Some(msg_ref.to_string()),
    }
}

/// Decode a frame into `(topic, change)` when it is a database change notification.
pub(crate) fn parse_change(text: &str) -> Option<(String, ChangeEvent)> {
    let msg: PhoenixMessage = serde_json::from_str(text).ok()?;
    if msg.event != "postgres_changes" {
        return None;
    }

    let data = msg.payload.get("data")?;
    let kind: ChangeKind = serde_json::from_value(data.get("type")?.clone()).ok()?;
    let table = data
        .get("table")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();

    Some((msg.topic, ChangeEvent { table, kind }))
}

/// A failed `phx_reply` (join rejected, bad filter, expired token) as `(topic, reason)`.
pub(crate) fn parse_rejection(text: &str) -> Option<(String, String)> {
    let msg: PhoenixMessage = serde_json::from_str(text).ok()?;
    if msg.event != "phx_reply" {
        return None;
    }
    let status = msg.payload.get("status").and_then(|s| s.as_str())?;
    if status == "ok" {
        return None;
    }
    let reason = msg
        .payload
        .get("response")
        .map(|r| r.to_string())
        .unwrap_or_else(|| status.to_string());
    Some((msg.topic, reason))
}

pub(crate) fn channel_topic(name: &str) -> String {
    let mut bytes = [0u8; 4];
    let suffix = if getrandom::getrandom(&mut bytes).is_ok() {
        bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
    } else {
        "0".to_string()
    };
    format!("realtime:{name}-{suffix}")
}

type ChangeCallback = Rc<dyn Fn(ChangeEvent)>;

struct Channel {
    feeds: Vec<ChangeFeed>,
    on_change: ChangeCallback,
}

/// Join frames for `channels` on a fresh socket, in topic order.
fn rejoin_messages(
    channels: &HashMap<String, Channel>,
    access_token: Option<&str>,
    mut next_ref: impl FnMut() -> u64,
) -> Vec<PhoenixMessage> {
    let mut topics: Vec<&String> = channels.keys().collect();
    topics.sort();
    topics
        .into_iter()
        .map(|topic| join_message(topic, &channels[topic].feeds, access_token, next_ref()))
        .collect()
}

struct Connection {
    socket: WebSocket,
    open: bool,
    closed: bool,
    next_ref: u64,
    access_token: Option<String>,
    channels: HashMap<String, Channel>,
    pending: Vec<String>,
    heartbeat: Option<IntervalHandle>,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

thread_local! {
    static CONNECTION: RefCell<Option<Connection>> = RefCell::new(None);
}

impl Connection {
    fn open(url: &str) -> Result<Self, RealtimeError> {
        let socket =
            WebSocket::new(url).map_err(|e| RealtimeError::Socket(format!("{e:?}")))?;

        let on_open = Closure::<dyn FnMut()>::new(handle_open);
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(|ev: MessageEvent| {
            if let Some(text) = ev.data().as_string() {
                dispatch(&text);
            }
        });
        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(|ev: CloseEvent| {
            handle_close(ev.code());
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            socket,
            open: false,
            closed: false,
            next_ref: 0,
            access_token: None,
            channels: HashMap::new(),
            pending: Vec::new(),
            heartbeat: None,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
        })
    }

    fn bump_ref(&mut self) -> u64 {
        self.next_ref += 1;
        self.next_ref
    }

    fn send_or_queue(&mut self, msg: &PhoenixMessage) {
        let text = match serde_json::to_string(msg) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("realtime: failed to encode {}: {e}", msg.event);
                return;
            }
        };

        if self.open && self.socket.ready_state() == WebSocket::OPEN {
            if let Err(e) = self.socket.send_with_str(&text) {
                tracing::warn!("realtime: send failed: {e:?}");
            }
        } else {
            self.pending.push(text);
        }
    }

    fn shutdown(&mut self) {
        if let Some(h) = self.heartbeat.take() {
            h.clear();
        }
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        let _ = self.socket.close();
        self.closed = true;
    }
}

fn handle_open() {
    let _ = CONNECTION.try_with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        let Some(conn) = slot.as_mut() else {
            return;
        };

        conn.open = true;
        for text in conn.pending.drain(..) {
            if let Err(e) = conn.socket.send_with_str(&text) {
                tracing::warn!("realtime: send failed: {e:?}");
            }
        }
        conn.heartbeat = set_interval_with_handle(send_heartbeat, HEARTBEAT_INTERVAL).ok();
        tracing::debug!("realtime: socket open, {} channel(s)", conn.channels.len());
    });
}

fn handle_close(code: u16) {
    let _ = CONNECTION.try_with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        if let Some(conn) = slot.as_mut() {
            // Closures stay alive until the slot is replaced outside this callback.
            if let Some(h) = conn.heartbeat.take() {
                h.clear();
            }
            conn.open = false;
            conn.closed = true;
            tracing::warn!(
                "realtime: socket closed (code {code}); {} channel(s) stop receiving changes",
                conn.channels.len()
            );
        }
    });
}

fn send_heartbeat() {
    let _ = CONNECTION.try_with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        if let Some(conn) = slot.as_mut() {
            if !conn.closed {
                let r = conn.bump_ref();
                conn.send_or_queue(&heartbeat_message(r));
            }
        }
    });
}

fn dispatch(text: &str) {
    if let Some((topic, reason)) = parse_rejection(text) {
        tracing::warn!("realtime: {topic} rejected: {reason}");
        return;
    }

    let Some((topic, event)) = parse_change(text) else {
        return;
    };

    // Clone the callback out so it runs without the connection borrowed.
    let callback = CONNECTION
        .try_with(|cell| {
            cell.try_borrow()
                .ok()
                .and_then(|slot| {
                    slot.as_ref()
                        .and_then(|c| c.channels.get(&topic).map(|ch| ch.on_change.clone()))
                })
        })
        .ok()
        .flatten();

    if let Some(cb) = callback {
        tracing::debug!("realtime: {} on {}", event.kind, event.table);
        cb(event);
    }
}

/// Live channel. Dropping it leaves the channel.
#[derive(Debug)]
pub(crate) struct Subscription {
    topic: String,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        unsubscribe(&self.topic);
    }
}

pub(crate) fn subscribe(
    config: &RealtimeConfig,
    name: &str,
    feeds: Vec<ChangeFeed>,
    on_change: impl Fn(ChangeEvent) + 'static,
) -> Result<Subscription, RealtimeError> {
    let url = socket_url(&config.base_url, &config.anon_key)?;
    let topic = channel_topic(name);

    let feed_count = CONNECTION
        .try_with(|cell| {
            let mut slot = cell
                .try_borrow_mut()
                .map_err(|_| RealtimeError::Socket("connection busy".to_string()))?;

            if slot.as_ref().map(|c| c.closed).unwrap_or(true) {
                let carried = slot
                    .take()
                    .map(|mut old| {
                        old.shutdown();
                        std::mem::take(&mut old.channels)
                    })
                    .unwrap_or_default();

                let mut conn = Connection::open(&url)?;
                conn.access_token = config.access_token.clone();
                if !carried.is_empty() {
                    tracing::info!("realtime: rejoining {} channel(s) on a new socket", carried.len());
                    let token = conn.access_token.clone();
                    let mut next = conn.next_ref;
                    let joins = rejoin_messages(&carried, token.as_deref(), || {
                        next += 1;
                        next
                    });
                    conn.next_ref = next;
                    for join in &joins {
                        conn.send_or_queue(join);
                    }
                    conn.channels.extend(carried);
                }
                *slot = Some(conn);
            }
            let Some(conn) = slot.as_mut() else {
                return Err(RealtimeError::Socket("connection unavailable".to_string()));
            };
            if config.access_token.is_some() {
                conn.access_token = config.access_token.clone();
            }

            let r = conn.bump_ref();
            let join = join_message(&topic, &feeds, conn.access_token.as_deref(), r);
            let feed_count = feeds.len();
            conn.channels.insert(
                topic.clone(),
                Channel {
                    feeds,
                    on_change: Rc::new(on_change),
                },
            );
            conn.send_or_queue(&join);
            Ok(feed_count)
        })
        .map_err(|_| RealtimeError::Socket("runtime is shutting down".to_string()))?;
    let feed_count = feed_count?;

    tracing::info!("realtime: joined {topic} ({feed_count} feed(s))");
    Ok(Subscription { topic })
}

/// Pass a refreshed access token to every joined channel and to later joins.
pub(crate) fn set_access_token(token: &str) {
    let _ = CONNECTION.try_with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        let Some(conn) = slot.as_mut() else {
            return;
        };
        if conn.access_token.as_deref() == Some(token) {
            return;
        }
        conn.access_token = Some(token.to_string());
        if conn.closed {
            return;
        }

        let mut topics: Vec<String> = conn.channels.keys().cloned().collect();
        topics.sort();
        for topic in topics {
            let r = conn.bump_ref();
            conn.send_or_queue(&access_token_message(&topic, token, r));
        }
        tracing::debug!("realtime: access token updated");
    });
}

fn unsubscribe(topic: &str) {
    let _ = CONNECTION.try_with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        let Some(conn) = slot.as_mut() else {
            return;
        };
        if conn.channels.remove(topic).is_none() {
            return;
        }

        if !conn.closed {
            let r = conn.bump_ref();
            conn.send_or_queue(&leave_message(topic, r));
        }
        tracing::debug!("realtime: left {topic}");

        if conn.channels.is_empty() {
            conn.shutdown();
            *slot = None;
        }
    });
}

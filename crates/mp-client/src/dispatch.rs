use std::collections::HashMap;
use std::sync::Mutex;

use mp_protocol::{
    ConnectPush, DisconnectPush, JoinPush, LeavePush, MessagePush, Method, PublicationPush,
    PushEnvelope, PushType, RefreshPush, SubscribePush, UnsubscribePush,
};
use serde_json::Value;

use crate::event::{ErrorBody, RtEvent};

/// The subset of frame classification shapes decoded off the wire
/// before the id->method lookup can run (`spec.md` §4.4 classification
/// order: error -> id+result -> result.data -> else drop).
enum Frame {
    Error(ErrorBody),
    Reply { id: u32, result: Value },
    Push(PushEnvelope),
}

fn classify(value: &Value) -> Option<Frame> {
    let obj = value.as_object()?;

    if let Some(error) = obj.get("error") {
        return serde_json::from_value::<ErrorBody>(error.clone())
            .ok()
            .map(Frame::Error);
    }

    if let (Some(id), Some(result)) = (obj.get("id"), obj.get("result")) {
        let id = u32::try_from(id.as_u64()?).ok()?;
        return Some(Frame::Reply {
            id,
            result: result.clone(),
        });
    }

    if let Some(result) = obj.get("result") {
        if result.get("data").is_some() {
            return serde_json::from_value::<PushEnvelope>(result.clone())
                .ok()
                .map(Frame::Push);
        }
    }

    None
}

/// Decode a reply's `result` using the method the matching
/// `PendingRequest` recorded. `Method::Send` never reaches here — its
/// pending entry is removed without waiting for a reply.
fn decode_reply(method: Method, id: u32, result: Value) -> Option<RtEvent> {
    macro_rules! decode {
        ($variant:ident) => {
            serde_json::from_value(result)
                .ok()
                .map(|result| RtEvent::$variant { id, result })
        };
    }
    match method {
        Method::Connect => decode!(ConnectReply),
        Method::Subscribe => decode!(SubscribeReply),
        Method::Unsubscribe => decode!(UnsubscribeReply),
        Method::Publish => decode!(PublishReply),
        Method::Presence => decode!(PresenceReply),
        Method::PresenceStats => decode!(PresenceStatsReply),
        Method::History => decode!(HistoryReply),
        Method::Ping => decode!(PingReply),
        Method::Rpc => decode!(RpcReply),
        Method::Refresh => decode!(RefreshReply),
        Method::SubRefresh => decode!(SubRefreshReply),
        Method::Send => None,
    }
}

fn decode_push(envelope: PushEnvelope) -> Option<RtEvent> {
    match envelope.push_type {
        PushType::Publication => serde_json::from_value::<PublicationPush>(envelope.data)
            .ok()
            .map(RtEvent::Publication),
        PushType::Join => serde_json::from_value::<JoinPush>(envelope.data)
            .ok()
            .map(RtEvent::Join),
        PushType::Leave => serde_json::from_value::<LeavePush>(envelope.data)
            .ok()
            .map(RtEvent::Leave),
        PushType::Unsubscribe => serde_json::from_value::<UnsubscribePush>(envelope.data)
            .ok()
            .map(RtEvent::UnsubscribePush),
        PushType::Message => serde_json::from_value::<MessagePush>(envelope.data)
            .ok()
            .map(RtEvent::Message),
        PushType::Subscribe => serde_json::from_value::<SubscribePush>(envelope.data)
            .ok()
            .map(RtEvent::SubscribePush),
        PushType::Connect => serde_json::from_value::<ConnectPush>(envelope.data)
            .ok()
            .map(RtEvent::ConnectPush),
        PushType::Disconnect => serde_json::from_value::<DisconnectPush>(envelope.data)
            .ok()
            .map(RtEvent::Disconnect),
        PushType::Refresh => serde_json::from_value::<RefreshPush>(envelope.data)
            .ok()
            .map(RtEvent::RefreshPush),
    }
}

/// Split a text frame on LF, decode each non-empty piece independently,
/// and emit events in receive order via `emit`. `pending` is consulted
/// (and mutated, for replies) to resolve the method behind an `id`.
pub fn dispatch_frame(
    text: &str,
    pending: &Mutex<HashMap<u32, Method>>,
    emit: &mut dyn FnMut(RtEvent),
) {
    for piece in text.split('\n') {
        if piece.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(piece) else {
            tracing::warn!(piece, "dropping undecodable frame piece");
            continue;
        };
        let Some(frame) = classify(&value) else {
            tracing::warn!(piece, "dropping frame piece matching no known shape");
            continue;
        };
        match frame {
            Frame::Error(err) => emit(RtEvent::ProtocolError(err)),
            Frame::Reply { id, result } => {
                let method = pending.lock().unwrap().remove(&id);
                match method {
                    Some(method) => match decode_reply(method, id, result) {
                        Some(event) => emit(event),
                        None => tracing::warn!(id, ?method, "dropping reply with unparseable result"),
                    },
                    None => tracing::warn!(id, "dropping reply for unknown pending id"),
                }
            }
            Frame::Push(envelope) => match decode_push(envelope) {
                Some(event) => emit(event),
                None => tracing::warn!("dropping push with unparseable data"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_with(id: u32, method: Method) -> Mutex<HashMap<u32, Method>> {
        let mut map = HashMap::new();
        map.insert(id, method);
        Mutex::new(map)
    }

    #[test]
    fn reply_for_unknown_id_is_dropped_without_panicking() {
        let pending = Mutex::new(HashMap::new());
        let mut events = Vec::new();
        dispatch_frame(r#"{"id":9,"result":{}}"#, &pending, &mut |e| events.push(e));
        assert!(events.is_empty());
    }

    #[test]
    fn push_without_type_defaults_to_publication() {
        let pending = Mutex::new(HashMap::new());
        let mut events = Vec::new();
        dispatch_frame(
            r#"{"result":{"data":{"foo":1}}}"#,
            &pending,
            &mut |e| events.push(e),
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RtEvent::Publication(_)));
    }

    #[test]
    fn error_envelope_emits_protocol_error() {
        let pending = Mutex::new(HashMap::new());
        let mut events = Vec::new();
        dispatch_frame(
            r#"{"error":{"code":109,"message":"expired"}}"#,
            &pending,
            &mut |e| events.push(e),
        );
        assert_eq!(events.len(), 1);
        match &events[0] {
            RtEvent::ProtocolError(body) => {
                assert_eq!(body.code, 109);
                assert_eq!(body.message, "expired");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn multi_message_frame_dispatches_in_order_e1() {
        // E1 from spec.md §8: a Subscribe reply followed by a Publication
        // push for an AllocateEventType payload, in one LF-joined frame.
        let pending = pending_with(5, Method::Subscribe);
        let mut events = Vec::new();
        let frame = "{\"id\":5,\"result\":{}}\n{\"result\":{\"data\":{\"EventID\":\"e3e455f8-f977-11e9-bccf-1a111111f111\",\"EventType\":\"AllocateEventType\",\"ServerID\":12345,\"AllocationID\":\"e3e455f8-f977-11e9-bccf-2a222222f222\"}}}";
        dispatch_frame(frame, &pending, &mut |e| events.push(e));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], RtEvent::SubscribeReply { id: 5, .. }));
        match &events[1] {
            RtEvent::Publication(push) => {
                assert_eq!(push.data["EventType"], "AllocateEventType");
                assert_eq!(push.data["ServerID"], 12345);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_shape_is_dropped() {
        let pending = Mutex::new(HashMap::new());
        let mut events = Vec::new();
        dispatch_frame(r#"{"unrelated":true}"#, &pending, &mut |e| events.push(e));
        assert!(events.is_empty());
    }
}

use mp_protocol::{
    ConnectPush, ConnectResult, DisconnectPush, HistoryResult, JoinPush, LeavePush, MessagePush,
    PingResult, PresenceResult, PresenceStatsResult, PublicationPush, PublishResult, RefreshPush,
    RefreshResult, RpcResult, SubRefreshResult, SubscribePush, SubscribeResult, UnsubscribeResult,
    UnsubscribePush,
};

use crate::status::ConnectionStatus;

/// A transport-level error envelope, `{"error":{"code":C,"message":S}}`.
/// Carries no `id`; treated as a transport-level notice rather than a
/// reply to a specific pending request.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ErrorBody {
    pub code: u32,
    pub message: String,
}

/// One emission per decoded message, in receive order: 11 reply kinds,
/// 9 push kinds, and the connection status stream, exactly the
/// contract `spec.md` §4.4/§5 describes for "typed event streams".
#[derive(Debug, Clone)]
pub enum RtEvent {
    Status(ConnectionStatus),
    ProtocolError(ErrorBody),

    ConnectReply { id: u32, result: ConnectResult },
    SubscribeReply { id: u32, result: SubscribeResult },
    UnsubscribeReply { id: u32, result: UnsubscribeResult },
    PublishReply { id: u32, result: PublishResult },
    PresenceReply { id: u32, result: PresenceResult },
    PresenceStatsReply { id: u32, result: PresenceStatsResult },
    HistoryReply { id: u32, result: HistoryResult },
    PingReply { id: u32, result: PingResult },
    RpcReply { id: u32, result: RpcResult },
    RefreshReply { id: u32, result: RefreshResult },
    SubRefreshReply { id: u32, result: SubRefreshResult },

    Publication(PublicationPush),
    Join(JoinPush),
    Leave(LeavePush),
    UnsubscribePush(UnsubscribePush),
    Message(MessagePush),
    SubscribePush(SubscribePush),
    ConnectPush(ConnectPush),
    Disconnect(DisconnectPush),
    RefreshPush(RefreshPush),
}

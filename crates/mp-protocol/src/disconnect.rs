/// Inbound `Push::Disconnect` codes (`spec.md` §6).
///
/// The source assigns the same wire value (3013) to both
/// `ConnectionLimit` and `ChannelLimit`. Rust permits duplicate
/// fieldless-enum discriminants, so both names are preserved; decoding
/// a wire value of 3013 resolves to `ConnectionLimit` (see DESIGN.md
/// Open Questions for the policy rationale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DisconnectCode {
    Normal = 3000,
    Shutdown = 3001,
    InvalidToken = 3002,
    BadRequest = 3003,
    ServerError = 3004,
    Expired = 3005,
    SubExpired = 3006,
    Stale = 3007,
    Slow = 3008,
    WriteError = 3009,
    InsufficientState = 3010,
    ForceReconnect = 3011,
    ForceNoReconnect = 3012,
    ConnectionLimit = 3013,
    ChannelLimit = 3013,
}

impl DisconnectCode {
    pub fn from_wire(code: u32) -> Option<DisconnectCode> {
        match code {
            3000 => Some(DisconnectCode::Normal),
            3001 => Some(DisconnectCode::Shutdown),
            3002 => Some(DisconnectCode::InvalidToken),
            3003 => Some(DisconnectCode::BadRequest),
            3004 => Some(DisconnectCode::ServerError),
            3005 => Some(DisconnectCode::Expired),
            3006 => Some(DisconnectCode::SubExpired),
            3007 => Some(DisconnectCode::Stale),
            3008 => Some(DisconnectCode::Slow),
            3009 => Some(DisconnectCode::WriteError),
            3010 => Some(DisconnectCode::InsufficientState),
            3011 => Some(DisconnectCode::ForceReconnect),
            3012 => Some(DisconnectCode::ForceNoReconnect),
            3013 => Some(DisconnectCode::ConnectionLimit),
            _ => None,
        }
    }
}

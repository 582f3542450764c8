//! mp-query: the SQP UDP query responder.
//!
//! A fleet manager probes a dedicated server's liveness and pulls its
//! `ServerInfo` through a two-step challenge/response exchange over
//! UDP. [`ServerInfo`] holds the mutable fields; [`SqpResponder::bind`]
//! owns the socket and the per-peer challenge state.

mod challenge;
mod packet;
mod responder;
mod server_info;

pub use challenge::ChallengeStore;
pub use packet::{
    CHALLENGE_TYPE, CHUNK_PLAYER_INFO, CHUNK_SERVER_INFO, CHUNK_SERVER_RULES, CHUNK_TEAM_INFO,
    ChallengePacket, Header, QUERY_TYPE, QueryRequest, QueryResponse, ServerInfoSnapshot,
};
pub use responder::SqpResponder;
pub use server_info::ServerInfo;

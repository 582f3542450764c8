//! UDP transport and receive loop for the SQP responder.
//!
//! Mirrors the receiver's accept-loop shape (`services/receiver/src/
//! local_proxy.rs`): a spawned task selects between a shutdown watch
//! and inbound traffic, logging and dropping anything malformed rather
//! than tearing down the socket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::challenge::ChallengeStore;
use crate::packet::{
    CHALLENGE_TYPE, CHUNK_SERVER_INFO, ChallengePacket, Header, QUERY_TYPE, QueryRequest,
    QueryResponse,
};
use crate::server_info::ServerInfo;

const RECV_BUFFER_BYTES: usize = 2 * 1024 * 1024;
const SEND_BUFFER_BYTES: usize = 2 * 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A bound, running SQP responder. Dropping or calling
/// [`SqpResponder::shutdown`] stops the background receive task; the
/// socket itself closes when the last `Arc` to it is dropped.
pub struct SqpResponder {
    shutdown_tx: watch::Sender<bool>,
}

impl SqpResponder {
    /// Bind `0.0.0.0:query_port` with reuse-address and 2 MiB send/recv
    /// buffers, and start the receive task. A bind failure is returned
    /// to the caller rather than panicking — `spec.md` §4.2's "Connect()
    /// returns false and the responder stays disconnected".
    pub async fn bind(query_port: u16, server_info: Arc<ServerInfo>) -> io::Result<Self> {
        let socket = Arc::new(build_socket(query_port)?);
        let challenges = Arc::new(ChallengeStore::new());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            let mut buf = [0u8; 1500];
            let mut tick = tokio::time::interval(POLL_INTERVAL);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = tick.tick() => {}
                    recv = socket.recv_from(&mut buf) => {
                        match recv {
                            Ok((n, peer)) => {
                                debug!(n, %peer, "datagram received");
                                if let Some(response) =
                                    handle_datagram(&buf[..n], &peer.to_string(), &challenges, &server_info)
                                {
                                    if let Err(err) = socket.send_to(&response, peer).await {
                                        warn!(error = %err, %peer, "send_to failed");
                                    }
                                }
                            }
                            Err(err) => warn!(error = %err, "recv_from failed"),
                        }
                    }
                }
            }
        });

        Ok(SqpResponder { shutdown_tx })
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

fn build_socket(query_port: u16) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(RECV_BUFFER_BYTES)?;
    socket.set_send_buffer_size(SEND_BUFFER_BYTES)?;
    socket.set_nonblocking(true)?;
    let addr: SocketAddr = format!("0.0.0.0:{query_port}")
        .parse()
        .expect("formatted IPv4 wildcard address always parses");
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}

/// Pure decision function: given a raw datagram and the peer it came
/// from, decide what (if anything) to send back. Kept free of the
/// socket so the challenge/query scenarios can be unit tested directly.
fn handle_datagram(
    bytes: &[u8],
    peer: &str,
    challenges: &ChallengeStore,
    server_info: &ServerInfo,
) -> Option<Vec<u8>> {
    if bytes.len() < Header::LEN {
        warn!(len = bytes.len(), "datagram shorter than SQP header, dropping");
        return None;
    }

    match bytes[0] {
        CHALLENGE_TYPE => {
            if challenges.has_outstanding(peer) {
                debug!(peer, "challenge already outstanding, dropping");
                return None;
            }
            let token = challenges.issue(peer);
            Some(ChallengePacket::response(token).to_bytes())
        }
        QUERY_TYPE => {
            let request = match QueryRequest::parse(bytes) {
                Ok(request) => request,
                Err(err) => {
                    warn!(error = %err, peer, "malformed QueryRequest, dropping");
                    return None;
                }
            };
            let stored = challenges.take(peer)?;
            if stored != request.header.challenge_token {
                debug!(peer, "challenge token mismatch, dropping");
                return None;
            }
            let server_info = (request.requested_chunks & CHUNK_SERVER_INFO != 0)
                .then(|| server_info.snapshot());
            let response = QueryResponse {
                header: Header {
                    kind: QUERY_TYPE,
                    challenge_token: request.header.challenge_token,
                },
                version: request.version,
                current_packet: 0,
                last_packet: 0,
                server_info,
            };
            response.to_bytes().ok()
        }
        other => {
            warn!(kind = other, peer, "unknown SQP message type, dropping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_server_info() -> ServerInfo {
        let info = ServerInfo::new();
        info.set_current_players(3);
        info.set_max_players(16);
        info.set_server_name("Arena 7");
        info.set_game_type("Deathmatch");
        info.set_build_id("1.4.2");
        info.set_map("de_dust");
        info.set_game_port(7777);
        info
    }

    #[test]
    fn e3_happy_path_challenge_then_query() {
        let challenges = ChallengeStore::new();
        let server_info = sample_server_info();
        let peer = "10.0.0.1:9000";

        let challenge_req = ChallengePacket {
            header: Header {
                kind: CHALLENGE_TYPE,
                challenge_token: 0,
            },
        }
        .to_bytes();
        let response = handle_datagram(&challenge_req, peer, &challenges, &server_info).unwrap();
        assert_eq!(response.len(), 5);
        let parsed = ChallengePacket::parse(&response).unwrap();
        let token = parsed.header.challenge_token;
        assert!(token <= i32::MAX as u32);

        let query_req = QueryRequest {
            header: Header {
                kind: QUERY_TYPE,
                challenge_token: token,
            },
            version: 1,
            requested_chunks: CHUNK_SERVER_INFO,
        }
        .to_bytes();
        let response = handle_datagram(&query_req, peer, &challenges, &server_info).unwrap();
        let parsed = QueryResponse::parse(&response).unwrap();
        let info = parsed.server_info.unwrap();
        assert_eq!(info.current_players, 3);
        assert_eq!(info.max_players, 16);
        assert_eq!(info.server_name, "Arena 7");
        assert_eq!(info.game_port, 7777);
    }

    #[test]
    fn e4_query_without_prior_challenge_is_dropped() {
        let challenges = ChallengeStore::new();
        let server_info = sample_server_info();
        let query_req = QueryRequest {
            header: Header {
                kind: QUERY_TYPE,
                challenge_token: 5,
            },
            version: 1,
            requested_chunks: CHUNK_SERVER_INFO,
        }
        .to_bytes();
        assert!(handle_datagram(&query_req, "10.0.0.2:9000", &challenges, &server_info).is_none());
    }

    #[test]
    fn e4_mismatched_token_consumes_and_drops() {
        let challenges = ChallengeStore::new();
        let server_info = sample_server_info();
        let peer = "10.0.0.3:9000";
        let token = challenges.issue(peer);

        let query_req = QueryRequest {
            header: Header {
                kind: QUERY_TYPE,
                challenge_token: token + 1,
            },
            version: 1,
            requested_chunks: CHUNK_SERVER_INFO,
        }
        .to_bytes();
        assert!(handle_datagram(&query_req, peer, &challenges, &server_info).is_none());
        assert!(!challenges.has_outstanding(peer));
    }

    #[test]
    fn second_challenge_while_outstanding_is_silently_ignored() {
        let challenges = ChallengeStore::new();
        let server_info = sample_server_info();
        let peer = "10.0.0.4:9000";
        let challenge_req = ChallengePacket {
            header: Header {
                kind: CHALLENGE_TYPE,
                challenge_token: 0,
            },
        }
        .to_bytes();

        let first = handle_datagram(&challenge_req, peer, &challenges, &server_info);
        assert!(first.is_some());
        let second = handle_datagram(&challenge_req, peer, &challenges, &server_info);
        assert!(second.is_none());
    }

    #[test]
    fn short_datagram_is_dropped() {
        let challenges = ChallengeStore::new();
        let server_info = sample_server_info();
        assert!(handle_datagram(&[0, 0], "10.0.0.5:9000", &challenges, &server_info).is_none());
    }

    #[test]
    fn unknown_message_type_is_dropped() {
        let challenges = ChallengeStore::new();
        let server_info = sample_server_info();
        let bytes = [9, 0, 0, 0, 0];
        assert!(handle_datagram(&bytes, "10.0.0.6:9000", &challenges, &server_info).is_none());
    }
}

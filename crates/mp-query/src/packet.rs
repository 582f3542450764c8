//! SQP wire structs and codec. All multi-byte integers are big-endian;
//! strings are `u8`-length-prefixed UTF-8 with no terminator (`spec.md`
//! §4.2). Response length fields are back-patched: a placeholder is
//! written, the body serialized, then the placeholder bytes are
//! overwritten in place — the `Vec<u8>` buffer itself doubles as the
//! seekable buffer `spec.md` §7 calls for.

use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub const CHALLENGE_TYPE: u8 = 0;
pub const QUERY_TYPE: u8 = 1;

pub const CHUNK_SERVER_INFO: u8 = 1 << 0;
pub const CHUNK_SERVER_RULES: u8 = 1 << 1;
pub const CHUNK_PLAYER_INFO: u8 = 1 << 2;
pub const CHUNK_TEAM_INFO: u8 = 1 << 3;

/// Common 5-byte header shared by every SQP packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: u8,
    pub challenge_token: u32,
}

impl Header {
    pub const LEN: usize = 5;

    fn read(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Header {
            kind: cursor.read_u8()?,
            challenge_token: cursor.read_u32::<BigEndian>()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.write_u8(self.kind)?;
        out.write_u32::<BigEndian>(self.challenge_token)?;
        Ok(())
    }
}

fn write_lstr(out: &mut Vec<u8>, s: &str) -> io::Result<()> {
    let bytes = s.as_bytes();
    debug_assert!(bytes.len() <= 255, "ServerInfo setters must enforce this");
    out.write_u8(bytes.len() as u8)?;
    out.write_all(bytes)?;
    Ok(())
}

fn read_lstr(cursor: &mut Cursor<&[u8]>) -> io::Result<String> {
    let len = usize::from(cursor.read_u8()?);
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// `ChallengeRequest`/`ChallengeResponse` share one 5-byte layout: the
/// common header alone.
#[derive(Debug, Clone, Copy)]
pub struct ChallengePacket {
    pub header: Header,
}

impl ChallengePacket {
    pub fn response(token: u32) -> Self {
        ChallengePacket {
            header: Header {
                kind: CHALLENGE_TYPE,
                challenge_token: token,
            },
        }
    }

    pub fn parse(bytes: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Ok(ChallengePacket {
            header: Header::read(&mut cursor)?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Header::LEN);
        self.header.write(&mut out).expect("Vec write is infallible");
        out
    }
}

/// Header (5 B) + `version: u16` + `requestedChunks: u8` (8 bytes total).
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest {
    pub header: Header,
    pub version: u16,
    pub requested_chunks: u8,
}

impl QueryRequest {
    pub fn parse(bytes: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = Header::read(&mut cursor)?;
        let version = cursor.read_u16::<BigEndian>()?;
        let requested_chunks = cursor.read_u8()?;
        Ok(QueryRequest {
            header,
            version,
            requested_chunks,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8);
        self.header.write(&mut out).expect("Vec write is infallible");
        out.write_u16::<BigEndian>(self.version).unwrap();
        out.write_u8(self.requested_chunks).unwrap();
        out
    }
}

/// An immutable snapshot of the mutable `ServerInfo` fields, taken
/// under a short lock and then serialized/compared lock-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfoSnapshot {
    pub current_players: u16,
    pub max_players: u16,
    pub server_name: String,
    pub game_type: String,
    pub build_id: String,
    pub map: String,
    pub game_port: u16,
}

impl ServerInfoSnapshot {
    fn encode_body(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.write_u16::<BigEndian>(self.current_players)?;
        out.write_u16::<BigEndian>(self.max_players)?;
        write_lstr(out, &self.server_name)?;
        write_lstr(out, &self.game_type)?;
        write_lstr(out, &self.build_id)?;
        write_lstr(out, &self.map)?;
        out.write_u16::<BigEndian>(self.game_port)?;
        Ok(())
    }

    fn decode_body(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(ServerInfoSnapshot {
            current_players: cursor.read_u16::<BigEndian>()?,
            max_players: cursor.read_u16::<BigEndian>()?,
            server_name: read_lstr(cursor)?,
            game_type: read_lstr(cursor)?,
            build_id: read_lstr(cursor)?,
            map: read_lstr(cursor)?,
            game_port: cursor.read_u16::<BigEndian>()?,
        })
    }
}

/// A `QueryResponse`: header + version + packet indices + the
/// back-patched `packetLength`, optionally followed by a back-patched
/// `serverInfoChunkLength` and the ServerInfo body. Only the
/// ServerInfo chunk is supported; other requested bits are ignored.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub header: Header,
    pub version: u16,
    pub current_packet: u8,
    pub last_packet: u8,
    pub server_info: Option<ServerInfoSnapshot>,
}

impl QueryResponse {
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.header.write(&mut out)?;
        out.write_u16::<BigEndian>(self.version)?;
        out.write_u8(self.current_packet)?;
        out.write_u8(self.last_packet)?;

        let packet_length_at = out.len();
        out.write_u16::<BigEndian>(0)?;
        let body_start = out.len();

        if let Some(info) = &self.server_info {
            let chunk_length_at = out.len();
            out.write_u32::<BigEndian>(0)?;
            let chunk_start = out.len();
            info.encode_body(&mut out)?;
            let chunk_len = u32::try_from(out.len() - chunk_start).expect("chunk fits u32");
            out[chunk_length_at..chunk_length_at + 4].copy_from_slice(&chunk_len.to_be_bytes());
        }

        let packet_len = u16::try_from(out.len() - body_start).expect("packet fits u16");
        out[packet_length_at..packet_length_at + 2].copy_from_slice(&packet_len.to_be_bytes());
        Ok(out)
    }

    pub fn parse(bytes: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = Header::read(&mut cursor)?;
        let version = cursor.read_u16::<BigEndian>()?;
        let current_packet = cursor.read_u8()?;
        let last_packet = cursor.read_u8()?;
        let _packet_length = cursor.read_u16::<BigEndian>()?;

        let server_info = if (cursor.position() as usize) < bytes.len() {
            let _chunk_length = cursor.read_u32::<BigEndian>()?;
            Some(ServerInfoSnapshot::decode_body(&mut cursor)?)
        } else {
            None
        };

        Ok(QueryResponse {
            header,
            version,
            current_packet,
            last_packet,
            server_info,
        })
    }
}

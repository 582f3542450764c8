use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;

/// Per-peer outstanding challenge tokens, keyed by `ip:port` string
/// (`spec.md` §3 ChallengeToken). At most one outstanding challenge per
/// peer; a second `issue` while one is outstanding is a no-op.
#[derive(Default)]
pub struct ChallengeStore {
    tokens: Mutex<HashMap<String, u32>>,
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh non-negative 31-bit token for `peer`, unless one is
    /// already outstanding. Returns the token that is now stored —
    /// either the freshly issued one, or the pre-existing one.
    pub fn issue(&self, peer: &str) -> u32 {
        let mut tokens = self.tokens.lock().unwrap();
        if let Some(existing) = tokens.get(peer) {
            return *existing;
        }
        let token = rand::thread_rng().gen_range(0..=i32::MAX) as u32;
        tokens.insert(peer.to_owned(), token);
        token
    }

    pub fn has_outstanding(&self, peer: &str) -> bool {
        self.tokens.lock().unwrap().contains_key(peer)
    }

    /// Atomically read-and-remove the token stored for `peer`, per the
    /// query phase's "read-and-remove" step.
    pub fn take(&self, peer: &str) -> Option<u32> {
        self.tokens.lock().unwrap().remove(peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuing_twice_for_same_peer_keeps_first_token() {
        let store = ChallengeStore::new();
        let first = store.issue("1.2.3.4:9000");
        let second = store.issue("1.2.3.4:9000");
        assert_eq!(first, second);
    }

    #[test]
    fn take_removes_the_entry() {
        let store = ChallengeStore::new();
        let token = store.issue("1.2.3.4:9000");
        assert_eq!(store.take("1.2.3.4:9000"), Some(token));
        assert!(!store.has_outstanding("1.2.3.4:9000"));
        assert_eq!(store.take("1.2.3.4:9000"), None);
    }

    #[test]
    fn distinct_peers_get_independent_tokens() {
        let store = ChallengeStore::new();
        let a = store.issue("1.1.1.1:1");
        let b = store.issue("2.2.2.2:2");
        assert_ne!(a, b, "collision is astronomically unlikely with 31-bit tokens");
    }

    #[test]
    fn tokens_are_non_negative_31_bit() {
        let store = ChallengeStore::new();
        for i in 0..20 {
            let token = store.issue(&format!("peer-{i}"));
            assert!(token <= i32::MAX as u32);
        }
    }
}

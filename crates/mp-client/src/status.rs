/// RT client connection state machine (`spec.md` §3, §4.4).
///
/// Disconnected -> Connecting on `connect()`.
/// Connecting -> Connected on transport-opened.
/// Connecting -> Disconnected on transport-error.
/// Connected -> Disconnecting on `disconnect()`.
/// Disconnecting -> Disconnected on transport-closed.
/// Any -> Disconnected on transport-closed.
///
/// `disconnect()` from `Connecting` is forbidden, matching the source —
/// preserved as-is rather than silently "fixed" (see DESIGN.md Open
/// Questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Disconnected
    }
}

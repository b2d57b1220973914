use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::time::{SystemTime, UNIX_EPOCH};

/// What an identifier names. The prefix keeps ids self-describing in logs and URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Event,
    Invite,
    Response,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Event => "evt",
            IdKind::Invite => "inv",
            IdKind::Response => "rsp",
        }
    }
}

fn now_nanos() -> u64 {
    // A clock before 1970 degrades to zero; the random half still carries uniqueness.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Generate a new identifier: `<prefix>_<16 hex nanos><16 hex random>`.
///
/// The random half comes from the thread-local CSPRNG, so concurrent callers need
/// no coordination. Output is lowercase ASCII hex plus `_`, safe in URL path segments.
pub fn new_id(kind: IdKind) -> String {
    let random: u64 = rand::thread_rng().gen();
    format!("{}_{:016x}{:016x}", kind.prefix(), now_nanos(), random)
}

/// Unix time in nanoseconds encoded in an id produced by [`new_id`].
pub fn timestamp_of(id: &str) -> Option<u64> {
    let (_, body) = id.split_once('_')?;
    if body.len() != 32 {
        return None;
    }
    u64::from_str_radix(&body[..16], 16).ok()
}

/// Draw from the OS entropy source once. Called at startup; an error here is fatal.
pub fn ensure_entropy() -> Result<(), rand::Error> {
    let mut buf = [0u8; 16];
    OsRng.try_fill_bytes(&mut buf)
}

/// Random token for host authentication, 256 bits as hex.
pub fn new_token() -> String {
    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

//! Admin access gate.
//!
//! A static passkey guards the admin dashboard. On a successful entry the
//! code is obfuscate-encoded (reversible base64) and persisted through an
//! injectable [`TokenStore`]; every later check re-derives the stored token
//! and compares again, so a stale or tampered token simply re-opens the
//! gate. The comparison itself is constant-time, but this is NOT a security
//! boundary: the secret is fully inspectable client-side.

use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Invalid admin passkey, please try again")]
    InvalidPasskey,
}

/// Compares entered codes against the configured secret and issues the
/// reversible client-side token.
pub struct PasskeyGate {
    secret: String,
}

impl PasskeyGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, entered: &str) -> bool {
        entered.as_bytes().ct_eq(self.secret.as_bytes()).into()
    }

    /// Encodes the entered code for client-side persistence, if it matches.
    pub fn issue_token(&self, entered: &str) -> Option<String> {
        self.verify(entered).then(|| STANDARD.encode(entered))
    }

    /// Decodes a persisted token and compares the recovered code again.
    pub fn check_token(&self, token: &str) -> bool {
        let Ok(decoded) = STANDARD.decode(token) else {
            return false;
        };
        match String::from_utf8(decoded) {
            Ok(code) => self.verify(&code),
            Err(_) => false,
        }
    }
}

/// Injectable persistence backend for the gate token.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// In-memory token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

/// Gate plus persistence: the open/closed state is always re-derived from
/// the stored token, never cached.
pub struct GateSession<S: TokenStore> {
    gate: PasskeyGate,
    storage: S,
}

impl<S: TokenStore> GateSession<S> {
    pub fn new(gate: PasskeyGate, storage: S) -> Self {
        Self { gate, storage }
    }

    /// Validates an entered code; persists the obfuscated token on match.
    pub fn unlock(&self, entered: &str) -> Result<(), GateError> {
        match self.gate.issue_token(entered) {
            Some(token) => {
                self.storage.set(&token);
                Ok(())
            }
            None => Err(GateError::InvalidPasskey),
        }
    }

    /// Re-derives the stored token and checks it, as on every page load of a
    /// gated route.
    pub fn is_open(&self) -> bool {
        match self.storage.get() {
            Some(token) => self.gate.check_token(&token),
            None => false,
        }
    }

    pub fn lock(&self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GateSession<MemoryTokenStore> {
        GateSession::new(PasskeyGate::new("123456"), MemoryTokenStore::new())
    }

    #[test]
    fn verify_matches_exact_secret_only() {
        let gate = PasskeyGate::new("123456");
        assert!(gate.verify("123456"));
        assert!(!gate.verify("123457"));
        assert!(!gate.verify("12345"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn issued_token_round_trips() {
        let gate = PasskeyGate::new("123456");
        let token = gate.issue_token("123456").unwrap();
        assert_ne!(token, "123456", "token must be obfuscated");
        assert!(gate.check_token(&token));
    }

    #[test]
    fn no_token_for_wrong_code() {
        let gate = PasskeyGate::new("123456");
        assert!(gate.issue_token("000000").is_none());
    }

    #[test]
    fn tampered_token_fails_check() {
        let gate = PasskeyGate::new("123456");
        assert!(!gate.check_token("not-base64!"));
        assert!(!gate.check_token(&STANDARD.encode("000000")));
    }

    #[test]
    fn unlock_persists_and_opens() {
        let session = session();
        assert!(!session.is_open());

        session.unlock("123456").unwrap();
        assert!(session.is_open());
    }

    #[test]
    fn wrong_code_keeps_gate_closed_with_static_message() {
        let session = session();
        let err = session.unlock("654321").unwrap_err();
        assert_eq!(err.to_string(), "Invalid admin passkey, please try again");
        assert!(!session.is_open());
    }

    #[test]
    fn lock_clears_the_stored_token() {
        let session = session();
        session.unlock("123456").unwrap();
        session.lock();
        assert!(!session.is_open());
    }

    #[test]
    fn stale_token_reopens_gate() {
        let session = session();
        session.storage.set("garbage-token");
        assert!(!session.is_open());
    }
}

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

const TOKEN_BYTES: usize = 16;

/// A freshly issued reset token. Only `hash` and `expires_at` are persisted;
/// `plaintext` goes to the user and is not recoverable afterwards.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub plaintext: String,
    pub hash: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ResetTokenIssuer {
    ttl: Duration,
}

impl ResetTokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    pub fn issue(&self) -> IssuedResetToken {
        self.issue_at(OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, now: OffsetDateTime) -> IssuedResetToken {
        let mut raw = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut raw);
        let plaintext = hex::encode(raw);
        IssuedResetToken {
            hash: hash_reset_token(&plaintext),
            plaintext,
            expires_at: now + self.ttl,
        }
    }
}

/// Hex SHA-256 of the plaintext token; deterministic so lookups can match on it.
pub fn hash_reset_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

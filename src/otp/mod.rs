//! One-time-code verification for the login and registration wizards.
//!
//! Each flow instance is a challenge: Issued on creation, then Verified,
//! Expired, or left Issued after a mismatched submission. Registration
//! flows buffer the validated form payload on the challenge until the code
//! is confirmed. Challenges live only in process memory, like sessions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::utils::generate_otp_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpFlow {
    PublicLogin,
    PublicRegistration,
    HospitalRegistration,
}

#[derive(Debug, Clone)]
struct OtpChallenge {
    flow: OtpFlow,
    code: String,
    issued_at: DateTime<Utc>,
    payload: Value,
}

/// What the caller gets back when a code is issued or reissued.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedOtp {
    pub challenge_id: String,
    pub code: String,
    pub expires_in_secs: i64,
}

#[derive(Debug)]
pub enum OtpVerification {
    /// Code matched inside the window; the buffered payload is handed back
    /// and the challenge is consumed.
    Verified(Value),
    /// The window elapsed before a correct submission.
    Expired,
    /// Wrong code inside the window; the challenge stays issued.
    Mismatch,
    /// No such challenge (never issued, or already consumed).
    Unknown,
}

#[derive(Clone)]
pub struct OtpStore {
    ttl_secs: i64,
    inner: Arc<RwLock<HashMap<String, OtpChallenge>>>,
}

impl OtpStore {
    pub fn new(ttl_secs: i64) -> Self {
        OtpStore {
            ttl_secs,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issues a fresh challenge for a flow, buffering `payload` until the
    /// code is verified.
    pub async fn issue(&self, flow: OtpFlow, payload: Value) -> IssuedOtp {
        let challenge_id = Uuid::new_v4().to_string();
        let code = generate_otp_code();
        self.inner.write().await.insert(
            challenge_id.clone(),
            OtpChallenge {
                flow,
                code: code.clone(),
                issued_at: Utc::now(),
                payload,
            },
        );
        tracing::debug!("Issued {:?} OTP challenge {}", flow, challenge_id);
        IssuedOtp {
            challenge_id,
            code,
            expires_in_secs: self.ttl_secs,
        }
    }

    /// Regenerates the code and restarts the window on an existing
    /// challenge. The previous code stops being accepted. Returns the new
    /// code together with the buffered payload.
    pub async fn resend(&self, challenge_id: &str, flow: OtpFlow) -> Option<(IssuedOtp, Value)> {
        let mut challenges = self.inner.write().await;
        let challenge = challenges.get_mut(challenge_id)?;
        if challenge.flow != flow {
            return None;
        }
        challenge.code = generate_otp_code();
        challenge.issued_at = Utc::now();
        Some((
            IssuedOtp {
                challenge_id: challenge_id.to_string(),
                code: challenge.code.clone(),
                expires_in_secs: self.ttl_secs,
            },
            challenge.payload.clone(),
        ))
    }

    pub async fn verify(&self, challenge_id: &str, code: &str, flow: OtpFlow) -> OtpVerification {
        self.verify_at(challenge_id, code, flow, Utc::now()).await
    }

    async fn verify_at(
        &self,
        challenge_id: &str,
        code: &str,
        flow: OtpFlow,
        now: DateTime<Utc>,
    ) -> OtpVerification {
        let mut challenges = self.inner.write().await;
        let Some(challenge) = challenges.get(challenge_id) else {
            return OtpVerification::Unknown;
        };
        if challenge.flow != flow {
            return OtpVerification::Unknown;
        }
        // Expiry is checked first: a stale code is rejected even if correct.
        if now.signed_duration_since(challenge.issued_at) >= Duration::seconds(self.ttl_secs) {
            challenges.remove(challenge_id);
            return OtpVerification::Expired;
        }
        if challenge.code != code {
            return OtpVerification::Mismatch;
        }
        match challenges.remove(challenge_id) {
            Some(challenge) => OtpVerification::Verified(challenge.payload),
            None => OtpVerification::Unknown,
        }
    }
}

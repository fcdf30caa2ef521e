use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

/// Verify Slack's v0 request signature, rejecting timestamps outside the
/// replay window.
pub fn verify_slack_signature(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
) -> bool {
    if let (Ok(ts), Ok(now)) = (
        timestamp.parse::<u64>(),
        SystemTime::now().duration_since(UNIX_EPOCH),
    ) {
        let now_secs = now.as_secs();
        if now_secs.saturating_sub(ts) > 300 || ts > now_secs + 60 {
            error!("Timestamp out of range, potential replay attack");
            return false;
        }
    }

    let computed_signature = compute_signature(timestamp, request_body, signing_secret);
    if computed_signature.is_empty() {
        return false;
    }

    if computed_signature == signature {
        true
    } else {
        error!(
            "Signature verification failed. Computed: '{}', Received: '{}'",
            computed_signature, signature
        );
        false
    }
}

pub fn compute_signature(timestamp: &str, request_body: &str, signing_secret: &str) -> String {
    let base_string = format!("v0:{timestamp}:{request_body}");
    let mut mac = match Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(base_string.as_bytes());
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

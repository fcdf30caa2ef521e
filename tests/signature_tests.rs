use std::time::{SystemTime, UNIX_EPOCH};

use recap::api::signature::{compute_signature, verify_slack_signature};

fn now_ts() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .to_string()
}

#[test]
fn test_signature_round_trip() {
    let secret = "8f742231b10e8888abcd99yyyzzz85a5";
    let body = "command=%2Frecap&text=&user_id=U123";
    let ts = now_ts();

    let sig = compute_signature(&ts, body, secret);
    assert!(sig.starts_with("v0="));
    assert!(verify_slack_signature(body, &ts, &sig, secret));
}

#[test]
fn test_tampered_body_is_rejected() {
    let secret = "8f742231b10e8888abcd99yyyzzz85a5";
    let ts = now_ts();

    let sig = compute_signature(&ts, "command=%2Frecap", secret);
    assert!(!verify_slack_signature("command=%2Fother", &ts, &sig, secret));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let ts = now_ts();
    let sig = compute_signature(&ts, "body", "secret-a");
    assert!(!verify_slack_signature("body", &ts, &sig, "secret-b"));
}

#[test]
fn test_stale_timestamp_is_rejected() {
    let secret = "s3cr3t";
    let stale = (SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        - 400)
        .to_string();

    let sig = compute_signature(&stale, "body", secret);
    assert!(!verify_slack_signature("body", &stale, &sig, secret));
}

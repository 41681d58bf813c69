use super::{BrokerError, logging};

#[test]
fn test_logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
    logging::init("nonsense");
}

#[test]
fn test_entropy_error_message() {
    let err = BrokerError::from(rand::Error::new(std::io::Error::other("drained")));
    let text = err.to_string();
    assert!(text.starts_with("randomness source unavailable"));
    assert!(text.contains("drained"));
}

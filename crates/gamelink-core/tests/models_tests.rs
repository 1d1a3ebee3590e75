use gamelink_core::models::{AuditAction, SessionStatus, TokenKind, TokenStatus};

#[test]
fn test_token_kind_as_str() {
    assert_eq!(TokenKind::Login.as_str(), "login");
    assert_eq!(TokenKind::Api.as_str(), "api");
}

#[test]
fn test_token_kind_parse() {
    assert_eq!(TokenKind::parse("login"), Some(TokenKind::Login));
    assert_eq!(TokenKind::parse("api"), Some(TokenKind::Api));

    // Anything else is rejected, not defaulted
    assert_eq!(TokenKind::parse("LOGIN"), None);
    assert_eq!(TokenKind::parse(""), None);
    assert_eq!(TokenKind::parse("session"), None);
}

#[test]
fn test_token_status_as_str() {
    assert_eq!(TokenStatus::Active.as_str(), "active");
    assert_eq!(TokenStatus::Used.as_str(), "used");
    assert_eq!(TokenStatus::Expired.as_str(), "expired");
    assert_eq!(TokenStatus::Revoked.as_str(), "revoked");
}

#[test]
fn test_session_status_as_str() {
    assert_eq!(SessionStatus::Active.as_str(), "active");
    assert_eq!(SessionStatus::Offline.as_str(), "offline");
}

#[test]
fn test_audit_action_as_str() {
    assert_eq!(AuditAction::Created.as_str(), "created");
    assert_eq!(AuditAction::Used.as_str(), "used");
    assert_eq!(AuditAction::Expired.as_str(), "expired");
    assert_eq!(AuditAction::Revoked.as_str(), "revoked");
}

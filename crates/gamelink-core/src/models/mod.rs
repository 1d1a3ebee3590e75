pub mod audit_log;
pub mod identity;
pub mod session;
pub mod token;

pub use audit_log::AuditAction;
pub use session::SessionStatus;
pub use token::{TokenKind, TokenStatus};

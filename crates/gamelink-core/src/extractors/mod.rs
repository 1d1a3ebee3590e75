pub mod auth_account;
pub mod json;
pub mod recent;

pub use auth_account::AuthAccount;
pub use json::Json;
pub use recent::RecentQuery;

pub mod audit;
pub mod directory;
pub mod identity;
pub mod jwt;
pub mod reaper;
pub mod secret;
pub mod session;
pub mod tokens;
pub mod verify;

pub use directory::{AccountDirectory, AccountInfo, StaticAccountDirectory};
pub use jwt::{mint, verify_bearer, Claims};
pub use reaper::{Reaper, SweepStats};
pub use secret::{generate_secret, hash_secret, secret_prefix};

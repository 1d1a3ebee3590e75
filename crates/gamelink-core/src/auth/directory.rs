use std::collections::HashMap;

/// Resolved forum account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: i32,
    pub display_name: String,
}

/// Seam to the external account collaborator (the forum member store).
///
/// The engine never reads member rows itself; everything it needs to know
/// about an account comes through this trait. An unknown account at the
/// issuance boundary is `Unauthorized`; at the verification boundary it is
/// folded into `InvalidOrExpiredToken`.
#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn lookup(&self, account_id: i32) -> Option<AccountInfo>;
}

/// In-memory directory seeded from config, for demos and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticAccountDirectory {
    accounts: HashMap<i32, String>,
}

impl StaticAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an "id:name,id:name" seed string. Malformed entries are skipped.
    pub fn from_spec(spec: &str) -> Self {
        let mut accounts = HashMap::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if let Some((id, name)) = entry.split_once(':') {
                if let Ok(id) = id.trim().parse::<i32>() {
                    accounts.insert(id, name.trim().to_string());
                }
            }
        }
        StaticAccountDirectory { accounts }
    }

    pub fn insert(&mut self, id: i32, display_name: impl Into<String>) {
        self.accounts.insert(id, display_name.into());
    }
}

#[async_trait::async_trait]
impl AccountDirectory for StaticAccountDirectory {
    async fn lookup(&self, account_id: i32) -> Option<AccountInfo> {
        self.accounts.get(&account_id).map(|name| AccountInfo {
            id: account_id,
            display_name: name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_spec_parses_entries() {
        let dir = StaticAccountDirectory::from_spec("1:Alice, 42:Bob");
        let alice = dir.lookup(1).await.unwrap();
        assert_eq!(alice.display_name, "Alice");
        let bob = dir.lookup(42).await.unwrap();
        assert_eq!(bob.display_name, "Bob");
        assert!(dir.lookup(7).await.is_none());
    }

    #[tokio::test]
    async fn test_from_spec_skips_malformed() {
        let dir = StaticAccountDirectory::from_spec("nope,3:Carol,:,x:y");
        assert!(dir.lookup(3).await.is_some());
    }

    #[tokio::test]
    async fn test_empty_spec() {
        let dir = StaticAccountDirectory::from_spec("");
        assert!(dir.lookup(1).await.is_none());
    }
}

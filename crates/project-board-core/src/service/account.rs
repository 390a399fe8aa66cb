use tracing::info;

use crate::audit::Auditor;
use crate::error::{BoardError, BoardResult};
use crate::models::Account;
use crate::store::Store;
use crate::views::AccountSummary;

/// Fields of a new account. `credential_hash` is stored as given.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub user_id: String,
    pub credential_hash: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub memo: Option<String>,
}

pub struct AccountService<'a, S: Store + ?Sized> {
    store: &'a S,
    auditor: &'a dyn Auditor,
}

impl<'a, S: Store + ?Sized> AccountService<'a, S> {
    pub fn new(store: &'a S, auditor: &'a dyn Auditor) -> Self {
        Self { store, auditor }
    }

    pub async fn register(&self, new: NewAccount) -> BoardResult<AccountSummary> {
        let account = Account::new(
            new.user_id,
            new.credential_hash,
            new.email,
            new.nickname,
            new.memo,
        );
        account.validate()?;

        let saved = self
            .store
            .insert_account(&account, &self.auditor.stamp())
            .await
            .map_err(BoardError::from_store)?;
        info!(user_id = saved.user_id(), "account registered");
        Ok(AccountSummary::from(&saved))
    }

    pub async fn find(&self, user_id: &str) -> BoardResult<AccountSummary> {
        self.store
            .find_account(user_id)
            .await?
            .map(|a| AccountSummary::from(&a))
            .ok_or_else(|| BoardError::not_found("account", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ActorAuditor;
    use crate::store::memory::InMemoryStore;

    fn new_account(user_id: &str) -> NewAccount {
        NewAccount {
            user_id: user_id.into(),
            credential_hash: "{noop}secret".into(),
            nickname: Some("Tres".into()),
            ..NewAccount::default()
        }
    }

    #[tokio::test]
    async fn test_register_then_find() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("admin");
        let svc = AccountService::new(&store, &auditor);
        let saved = svc.register(new_account("tres")).await.unwrap();
        assert_eq!(saved.display_name(), "Tres");

        let found = svc.find("tres").await.unwrap();
        assert_eq!(found, saved);
        let stored = store.find_account("tres").await.unwrap().unwrap();
        assert_eq!(stored.audit().unwrap().created_by, "admin");
    }

    #[tokio::test]
    async fn test_register_duplicate_conflicts() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("admin");
        let svc = AccountService::new(&store, &auditor);
        svc.register(new_account("tres")).await.unwrap();
        let err = svc.register(new_account("tres")).await.unwrap_err();
        assert!(matches!(err, BoardError::Conflict { entity: "account", .. }));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration_conflicts() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("admin");
        let svc = AccountService::new(&store, &auditor);
        let (a, b) = tokio::join!(
            svc.register(new_account("tres")),
            svc.register(new_account("tres")),
        );
        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(BoardError::Conflict { entity: "account", .. }))));
    }

    #[tokio::test]
    async fn test_register_rejects_long_user_id() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("admin");
        let svc = AccountService::new(&store, &auditor);
        let err = svc.register(new_account(&"u".repeat(51))).await.unwrap_err();
        assert!(matches!(err, BoardError::Invalid { field: "user_id", .. }));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("admin");
        let err = AccountService::new(&store, &auditor)
            .find("nobody")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

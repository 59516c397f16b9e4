use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use receiptdesk_auth::{AdminAccount, OtpChallenge, normalize_email};
use receiptdesk_core::RequestId;
use receiptdesk_intake::{RequestStatus, StoredRequest};

use super::{AdminStore, OtpStore, RequestStore, StoreError};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// In-memory request store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    inner: RwLock<HashMap<RequestId, StoredRequest>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn insert(&self, request: StoredRequest) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(&request.id) {
            return Err(StoreError::Conflict(format!("request {} already exists", request.id)));
        }
        map.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<StoredRequest>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut items: Vec<StoredRequest> = map.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn update_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<Option<StoredRequest>, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        Ok(map.get_mut(&id).map(|r| {
            r.status = status;
            r.clone()
        }))
    }
}

/// In-memory admin accounts keyed by normalized email.
#[derive(Debug, Default)]
pub struct InMemoryAdminStore {
    inner: RwLock<HashMap<String, AdminAccount>>,
}

impl InMemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for InMemoryAdminStore {
    async fn insert(&self, account: AdminAccount) -> Result<(), StoreError> {
        let key = normalize_email(&account.email);
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(&key) {
            return Err(StoreError::Conflict(format!("admin {key} already exists")));
        }
        map.insert(key, account);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&normalize_email(email)).cloned())
    }
}

/// In-memory OTP challenges with a fixed lifetime.
///
/// Expired challenges are swept whenever a new one is stored.
#[derive(Debug)]
pub struct InMemoryOtpStore {
    ttl: Duration,
    inner: RwLock<HashMap<String, OtpChallenge>>,
}

impl InMemoryOtpStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, challenge: OtpChallenge) -> Result<(), StoreError> {
        let ttl = self.ttl;
        let now = challenge.issued_at;
        let mut map = self.inner.write().map_err(poisoned)?;
        map.retain(|_, c| c.is_live(now, ttl));
        map.insert(normalize_email(&challenge.email), challenge);
        Ok(())
    }

    async fn take(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let key = normalize_email(email);
        let mut map = self.inner.write().map_err(poisoned)?;
        let accepted = map.get(&key).is_some_and(|c| c.accepts(code, now, self.ttl));
        if accepted {
            map.remove(&key);
        }
        Ok(accepted)
    }
}

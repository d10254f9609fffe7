use dashmap::DashMap;
use uuid::Uuid;

use hostforge_core::checkout::OrderSession;
use hostforge_core::traits::{Clock, SystemClock};

use crate::error::{Result, ServerError};

/// In-memory store of in-flight checkout sessions, keyed by session id.
/// Sessions are ephemeral by design: they die with the process and expire
/// after sitting idle past the TTL.
pub struct CheckoutStore {
    sessions: DashMap<Uuid, OrderSession>,
    ttl_secs: u64,
}

impl CheckoutStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_secs,
        }
    }

    fn now_secs(&self) -> u64 {
        SystemClock.now_secs()
    }

    /// Store a freshly created session.
    pub fn insert(&self, session: OrderSession) {
        self.sessions.insert(session.id, session);
    }

    /// Fetch a live session by id. Expired sessions are evicted on access.
    pub fn get(&self, id: Uuid) -> Option<OrderSession> {
        let now = self.now_secs();
        let expired = match self.sessions.get(&id) {
            Some(entry) => {
                if !entry.is_expired(self.ttl_secs, now) {
                    return Some(entry.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.sessions.remove(&id);
        }
        None
    }

    /// Mutate a live session in place. The closure runs under the map's
    /// shard lock; it must not touch the store again.
    pub fn update<F>(&self, id: Uuid, f: F) -> Result<OrderSession>
    where
        F: FnOnce(&mut OrderSession, u64) -> Result<()>,
    {
        let now = self.now_secs();
        let mut entry = self
            .sessions
            .get_mut(&id)
            .filter(|e| !e.is_expired(self.ttl_secs, now))
            .ok_or_else(|| ServerError::NotFound(format!("checkout session {id} not found")))?;
        f(entry.value_mut(), now)?;
        Ok(entry.clone())
    }

    /// Remove a session (order placed, or abandoned explicitly).
    pub fn remove(&self, id: Uuid) -> Option<OrderSession> {
        self.sessions.remove(&id).map(|(_, s)| s)
    }

    /// Drop every expired session. Called by the periodic sweep.
    pub fn cleanup_expired(&self) {
        let now = self.now_secs();
        self.sessions
            .retain(|_, session| !session.is_expired(self.ttl_secs, now));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostforge_core::catalog::{BillingCycle, Catalog};
    use hostforge_core::checkout::{CheckoutStep, DetailsInput};

    fn make_session(now: u64) -> OrderSession {
        let catalog = Catalog::builtin();
        OrderSession::new(&catalog, "mc-dirt", BillingCycle::Monthly, now).unwrap()
    }

    fn wall_now() -> u64 {
        SystemClock.now_secs()
    }

    #[test]
    fn test_insert_get_remove() {
        let store = CheckoutStore::new(600);
        let session = make_session(wall_now());
        let id = session.id;
        store.insert(session);
        assert!(store.get(id).is_some());
        assert!(store.remove(id).is_some());
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_stale_session_evicted() {
        let store = CheckoutStore::new(600);
        let session = make_session(wall_now().saturating_sub(3_600));
        let id = session.id;
        store.insert(session);
        assert!(store.get(id).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_update_advances_step() {
        let store = CheckoutStore::new(600);
        let session = make_session(wall_now());
        let id = session.id;
        store.insert(session);

        let input = DetailsInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            country: "GB".to_string(),
            postcode: None,
        };
        let updated = store
            .update(id, |s, now| s.submit_details(&input, now).map_err(Into::into))
            .unwrap();
        assert_eq!(updated.step, CheckoutStep::Payment);
    }

    #[test]
    fn test_update_unknown_session() {
        let store = CheckoutStore::new(600);
        let err = store.update(Uuid::new_v4(), |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }
}

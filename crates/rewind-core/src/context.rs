//! Per-operation provenance.
//!
//! An `AuditContext` carries the actor, correlation id and origin address of
//! one logical operation (typically one request). It is built once and passed
//! to every write made on behalf of that operation; nothing is stored in
//! thread-local or global state.

use std::future::Future;

use crate::entities::Actor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditContext {
    pub actor: Option<Actor>,
    pub correlation_id: Option<String>,
    pub origin_address: Option<String>,
}

impl AuditContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_origin_address(mut self, address: impl Into<String>) -> Self {
        self.origin_address = Some(address.into());
        self
    }

    /// Run `op` with a context whose actor is `actor`.
    ///
    /// Correlation id and origin are inherited. The scoped context is owned by
    /// `op` and gone when it completes, so the actor cannot leak into later
    /// writes made with `self`.
    pub async fn as_actor<F, Fut, T>(&self, actor: Actor, op: F) -> T
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = T>,
    {
        op(self.clone().with_actor(actor)).await
    }

    /// The configured correlation id, or a fresh UUID v4.
    #[must_use]
    pub fn correlation_id_or_generate(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_correlation_ids_are_unique() {
        let ctx = AuditContext::new();
        assert_ne!(
            ctx.correlation_id_or_generate(),
            ctx.correlation_id_or_generate()
        );
        let fixed = AuditContext::new().with_correlation_id("req-1");
        assert_eq!(fixed.correlation_id_or_generate(), "req-1");
    }

    #[tokio::test]
    async fn as_actor_scopes_the_actor() {
        let outer = AuditContext::new().with_correlation_id("req-9");
        let seen = outer
            .as_actor(Actor::Label("importer".into()), |ctx| async move { ctx })
            .await;

        assert_eq!(seen.actor, Some(Actor::Label("importer".into())));
        assert_eq!(seen.correlation_id.as_deref(), Some("req-9"));
        assert_eq!(outer.actor, None);
    }
}

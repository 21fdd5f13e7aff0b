// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tenant Guard (C1).
//!
//! Every entity carries a non-null tenant id; every read and write accepts a
//! [`TenantContext`] and filters/stamps accordingly. Cross-tenant access
//! MUST fail with "not found" semantics — never "forbidden" — so the
//! existence of data in other tenants cannot be inferred (§4.1). No business
//! operation reads the tenant id from user-supplied input: callers obtain a
//! [`TenantContext`] from the authenticated principal (outside the core,
//! per §1 scope) and thread it explicitly — never from thread-local or
//! global state (§9).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use orderflow_core::TenantId;
use orderflow_error::OrderFlowError;
use serde::{Deserialize, Serialize};

/// Identifies the authenticated actor performing an operation, for audit
/// attribution. Not a tenant concept itself, but always carried alongside
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// The tenant identity and (optional) acting user for one request or job.
///
/// Pinned once at job enqueue / request entry (§5) and threaded as an
/// explicit argument through every operation — matcher, extractor, and
/// validator included — never read from ambient state (§9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    tenant_id: TenantId,
    actor: Option<ActorId>,
}

impl TenantContext {
    /// Construct a context with no acting user (system/background jobs).
    #[must_use]
    pub fn system(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            actor: None,
        }
    }

    /// Construct a context attributed to an authenticated operator.
    #[must_use]
    pub fn for_actor(tenant_id: TenantId, actor: ActorId) -> Self {
        Self {
            tenant_id,
            actor: Some(actor),
        }
    }

    /// The tenant this context is scoped to.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// The acting user, if any.
    #[must_use]
    pub fn actor(&self) -> Option<&ActorId> {
        self.actor.as_ref()
    }
}

/// Implemented by every entity that carries a tenant id, so guard helpers
/// can be written generically instead of once per entity type.
pub trait TenantScoped {
    /// The tenant id stamped on this entity.
    fn tenant_id(&self) -> TenantId;
}

/// Returns `true` when `entity` belongs to the context's tenant.
#[must_use]
pub fn owned_by<T: TenantScoped>(ctx: &TenantContext, entity: &T) -> bool {
    entity.tenant_id() == ctx.tenant_id()
}

/// Guard a single-row read: `None` or a row owned by a different tenant both
/// surface as [`OrderFlowError::not_found`] — the two cases are
/// indistinguishable to the caller by design (§4.1).
pub fn guard_read<T: TenantScoped>(
    ctx: &TenantContext,
    entity_kind: &str,
    row: Option<T>,
) -> Result<T, OrderFlowError> {
    match row {
        Some(entity) if owned_by(ctx, &entity) => Ok(entity),
        Some(_) => {
            tracing::warn!(
                tenant_id = %ctx.tenant_id(),
                entity_kind,
                "cross-tenant read attempt suppressed as not-found"
            );
            Err(OrderFlowError::not_found(entity_kind, ctx.tenant_id()))
        }
        None => Err(OrderFlowError::not_found(entity_kind, ctx.tenant_id())),
    }
}

/// Filter a collection down to rows owned by the context's tenant.
///
/// Used by in-memory/mock repositories in place of a `WHERE tenant_id = ?`
/// clause a real store would apply.
pub fn filter_owned<T: TenantScoped>(ctx: &TenantContext, rows: Vec<T>) -> Vec<T> {
    rows.into_iter().filter(|r| owned_by(ctx, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        tenant_id: TenantId,
        value: u32,
    }

    impl TenantScoped for Row {
        fn tenant_id(&self) -> TenantId {
            self.tenant_id
        }
    }

    #[test]
    fn guard_read_accepts_matching_tenant() {
        let tenant = TenantId::new();
        let ctx = TenantContext::system(tenant);
        let row = Row {
            tenant_id: tenant,
            value: 7,
        };
        let got = guard_read(&ctx, "Row", Some(row)).unwrap();
        assert_eq!(got.value, 7);
    }

    #[test]
    fn guard_read_hides_cross_tenant_rows_as_not_found() {
        let ctx = TenantContext::system(TenantId::new());
        let other_tenant_row = Row {
            tenant_id: TenantId::new(),
            value: 1,
        };
        let err = guard_read(&ctx, "Row", Some(other_tenant_row)).unwrap_err();
        assert_eq!(err.code, orderflow_error::ErrorCode::NotFound);
    }

    #[test]
    fn guard_read_missing_row_is_also_not_found() {
        let ctx = TenantContext::system(TenantId::new());
        let err = guard_read::<Row>(&ctx, "Row", None).unwrap_err();
        assert_eq!(err.code, orderflow_error::ErrorCode::NotFound);
    }

    #[test]
    fn filter_owned_drops_other_tenants() {
        let tenant = TenantId::new();
        let ctx = TenantContext::system(tenant);
        let rows = vec![
            Row {
                tenant_id: tenant,
                value: 1,
            },
            Row {
                tenant_id: TenantId::new(),
                value: 2,
            },
            Row {
                tenant_id: tenant,
                value: 3,
            },
        ];
        let kept = filter_owned(&ctx, rows);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.iter().map(|r| r.value).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn actor_context_carries_attribution() {
        let tenant = TenantId::new();
        let ctx = TenantContext::for_actor(tenant, ActorId("ops@example.com".into()));
        assert_eq!(ctx.tenant_id(), tenant);
        assert_eq!(ctx.actor().unwrap().0, "ops@example.com");
    }
}

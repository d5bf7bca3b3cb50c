//! Audited writes for tracked entities.
//!
//! Every mutation of a tracked entity (member, non-member, cash box, box
//! collection, member transaction) commits together with one append-only
//! audit record naming the acting account. Audit rows reference their parent
//! without `ON DELETE CASCADE`; deleting a parent that still has audits fails
//! with a foreign-key conflict unless the caller asks for [`Cascade::AuditsFirst`].

pub mod money;
mod tracked;

use futures::future::BoxFuture;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};
use std::collections::{HashMap, HashSet};

use crate::db::Store;
use crate::entities::{accounts, members};
use crate::services::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Created,
    Modified,
    Approved,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Modified => "MODIFIED",
            Self::Approved => "APPROVED",
        }
    }
}

/// Who did what, and when. Timestamps are assigned by the server.
#[derive(Debug, Clone)]
pub struct Stamp {
    pub action: AuditAction,
    pub actor: i64,
    pub at: String,
}

impl Stamp {
    #[must_use]
    pub fn now(action: AuditAction, actor: i64) -> Self {
        Self {
            action,
            actor,
            at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Uniform read-side view of an audit row.
#[derive(Debug, Clone)]
pub struct AuditView {
    pub id: i64,
    pub action: String,
    pub committed_by: i64,
    pub created_at: String,
    pub snapshot: serde_json::Value,
}

/// An audit row with its actor resolved at read time.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    pub committed_by: i64,
    pub actor_username: Option<String>,
    pub actor_name: Option<String>,
    pub created_at: String,
    pub snapshot: serde_json::Value,
}

/// An entity whose mutations must each produce an audit record.
pub trait Tracked: EntityTrait {
    type Audit: EntityTrait;

    /// Label used in metrics and error messages.
    const KIND: &'static str;

    fn id_column() -> Self::Column;

    fn id_of(model: &Self::Model) -> i64;

    fn audit_parent() -> <Self::Audit as EntityTrait>::Column;

    fn audit_created_at() -> <Self::Audit as EntityTrait>::Column;

    fn audit_id() -> <Self::Audit as EntityTrait>::Column;

    fn audit_record(
        model: &Self::Model,
        stamp: &Stamp,
    ) -> <Self::Audit as EntityTrait>::ActiveModel;

    fn audit_view(record: &<Self::Audit as EntityTrait>::Model) -> AuditView;
}

type AuditActive<T> = <<T as Tracked>::Audit as EntityTrait>::ActiveModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cascade {
    /// Delete the entity's audit trail before the entity itself.
    AuditsFirst,
    /// Delete only the entity; fails with `Conflict` while audits exist.
    None,
}

/// Append the audit record for `model` on `db`, normally an open transaction.
pub async fn append<T, C>(db: &C, model: &T::Model, stamp: &Stamp) -> Result<(), ServiceError>
where
    T: Tracked,
    C: ConnectionTrait,
    AuditActive<T>: ActiveModelTrait<Entity = T::Audit>,
    <T::Audit as EntityTrait>::Model: IntoActiveModel<AuditActive<T>>,
{
    <T::Audit as EntityTrait>::insert(T::audit_record(model, stamp))
        .exec_without_returning(db)
        .await?;

    metrics::counter!(
        "ledger_writes_total",
        "entity" => T::KIND,
        "action" => stamp.action.as_str()
    )
    .increment(1);

    Ok(())
}

/// Run `mutate` and append its audit record in one transaction.
///
/// Either both the mutation and its audit record persist, or neither does:
/// any error (including a failing audit insert) drops the transaction, which
/// rolls it back.
pub async fn commit<T, F>(
    store: &Store,
    action: AuditAction,
    actor: i64,
    mutate: F,
) -> Result<T::Model, ServiceError>
where
    T: Tracked,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T::Model, ServiceError>>
        + Send,
    AuditActive<T>: ActiveModelTrait<Entity = T::Audit>,
    <T::Audit as EntityTrait>::Model: IntoActiveModel<AuditActive<T>>,
{
    let (_write, txn) = store.begin_write().await?;
    let model = mutate(&txn).await?;
    append::<T, _>(&txn, &model, &Stamp::now(action, actor)).await?;
    txn.commit().await?;

    tracing::debug!(
        entity = T::KIND,
        id = T::id_of(&model),
        action = action.as_str(),
        actor,
        "Ledger write committed"
    );

    Ok(model)
}

/// Audit rows for one entity, newest first; ties keep insertion order reversed.
pub async fn trail<T, C>(db: &C, id: i64) -> Result<Vec<AuditView>, ServiceError>
where
    T: Tracked,
    C: ConnectionTrait,
{
    let rows = <T::Audit as EntityTrait>::find()
        .filter(T::audit_parent().eq(id))
        .order_by_desc(T::audit_created_at())
        .order_by_desc(T::audit_id())
        .all(db)
        .await?;

    Ok(rows.iter().map(T::audit_view).collect())
}

/// [`trail`] with each actor's username and member name looked up.
pub async fn history<T, C>(db: &C, id: i64) -> Result<Vec<AuditEntry>, ServiceError>
where
    T: Tracked,
    C: ConnectionTrait,
{
    let views = trail::<T, C>(db, id).await?;
    let actors = resolve_actors(db, views.iter().map(|v| v.committed_by)).await?;

    Ok(views
        .into_iter()
        .map(|view| {
            let actor = actors.get(&view.committed_by);
            AuditEntry {
                id: view.id,
                action: view.action,
                committed_by: view.committed_by,
                actor_username: actor.map(|a| a.0.clone()),
                actor_name: actor.and_then(|a| a.1.clone()),
                created_at: view.created_at,
                snapshot: view.snapshot,
            }
        })
        .collect())
}

async fn resolve_actors<C: ConnectionTrait>(
    db: &C,
    ids: impl Iterator<Item = i64>,
) -> Result<HashMap<i64, (String, Option<String>)>, ServiceError> {
    let ids: Vec<i64> = ids.collect::<HashSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let accounts = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;

    let names: HashMap<i64, String> = members::Entity::find()
        .filter(members::Column::AccountId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.account_id, m.full_name()))
        .collect();

    Ok(accounts
        .into_iter()
        .map(|a| {
            let name = names.get(&a.id).cloned();
            (a.id, (a.username, name))
        })
        .collect())
}

/// Delete a tracked entity, optionally clearing its audit trail first.
pub async fn delete<T>(store: &Store, id: i64, cascade: Cascade) -> Result<(), ServiceError>
where
    T: Tracked,
{
    let (_write, txn) = store.begin_write().await?;

    if cascade == Cascade::AuditsFirst {
        <T::Audit as EntityTrait>::delete_many()
            .filter(T::audit_parent().eq(id))
            .exec(&txn)
            .await?;
    }

    let deleted = T::delete_many()
        .filter(T::id_column().eq(id))
        .exec(&txn)
        .await?;

    if deleted.rows_affected == 0 {
        return Err(ServiceError::not_found(T::KIND, id));
    }

    txn.commit().await?;

    tracing::info!(entity = T::KIND, id, ?cascade, "Tracked entity deleted");
    Ok(())
}

fn snapshot_of<M: serde::Serialize>(model: &M) -> String {
    serde_json::to_string(model).unwrap_or_else(|_| "{}".to_string())
}

fn parse_snapshot(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
}

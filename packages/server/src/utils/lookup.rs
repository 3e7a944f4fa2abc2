use std::collections::HashMap;

use common::Actor;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PrimaryKeyTrait, QueryFilter};

use crate::entity::user;
use crate::error::AppError;
use crate::utils::clock;
use crate::utils::scope::Scoped;

/// Look up a row by primary key, returning 404 with `"{what} not found"`.
pub async fn find<E, C>(db: &C, id: i32, what: &str) -> Result<E::Model, AppError>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    C: ConnectionTrait,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{what} not found")))
}

/// Like [`find`], but rows outside the actor's scope are reported as
/// missing rather than forbidden so ids cannot be probed.
pub async fn find_visible<E, C>(
    db: &C,
    actor: &Actor,
    id: i32,
    what: &str,
) -> Result<E::Model, AppError>
where
    E: Scoped,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    C: ConnectionTrait,
{
    let scope = common::scope_for(E::RESOURCE, actor);
    E::find_by_id(id)
        .filter(E::condition(&scope, clock::today()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{what} not found")))
}

/// User accounts for `ids`, keyed by id. Unknown ids are skipped.
pub async fn accounts<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, user::Model>, AppError> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

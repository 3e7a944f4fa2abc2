use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};

use crate::error::AppError;
use crate::models::shared::{PageQuery, Pagination};

/// Run `select` for the requested page and count the full result set.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    query: &PageQuery,
) -> Result<(Vec<E::Model>, Pagination), AppError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let (page, per_page) = query.resolve();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(page - 1).await?;

    Ok((
        data,
        Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    ))
}

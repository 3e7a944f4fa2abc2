use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "library_book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub author: String,
    #[sea_orm(unique)]
    pub isbn: String,
    pub category: String,
    pub publisher: String,
    pub publication_year: Option<i32>,
    pub total_copies: i32,
    /// Kept within `0..=total_copies` by the issue/return handlers.
    pub available_copies: i32,
    pub shelf_location: String,

    #[sea_orm(has_many)]
    pub issues: HasMany<super::book_issue::Entity>,

    pub added_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

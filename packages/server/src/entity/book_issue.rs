use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_issue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub book_id: i32,
    #[sea_orm(belongs_to, from = "book_id", to = "id", on_delete = "Cascade")]
    pub book: HasOne<super::library_book::Entity>,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id", on_delete = "Cascade")]
    pub student: HasOne<super::student::Entity>,

    pub issue_date: Date,
    pub due_date: Date,
    pub return_date: Option<Date>,
    /// Stored only once a late return is recorded.
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub fine_amount: Decimal,
    pub is_returned: bool,

    pub issued_by: Option<i32>,
    #[sea_orm(belongs_to, from = "issued_by", to = "id", on_delete = "SetNull")]
    pub issuer: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

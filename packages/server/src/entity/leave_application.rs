use common::LeaveStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_application")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub applicant_id: i32,
    #[sea_orm(
        belongs_to,
        relation_enum = "Applicant",
        from = "applicant_id",
        to = "id",
        on_delete = "Cascade"
    )]
    pub applicant: HasOne<super::user::Entity>,

    pub start_date: Date,
    pub end_date: Date,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_on: DateTimeUtc,

    pub reviewed_by: Option<i32>,
    #[sea_orm(
        belongs_to,
        relation_enum = "Reviewer",
        from = "reviewed_by",
        to = "id",
        on_delete = "SetNull"
    )]
    pub reviewer: HasOne<super::user::Entity>,
    pub reviewed_on: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}

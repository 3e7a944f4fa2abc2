use common::Role;
use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapConfig;
use crate::entity::{attendance, classroom, result, user};
use crate::utils::hash;

/// Create the configured administrator unless that username already exists.
///
/// Does nothing when no username or password is configured.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    config: &BootstrapConfig,
) -> Result<(), DbErr> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    let exists = user::Entity::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .count(db)
        .await?
        > 0;
    if exists {
        return Ok(());
    }

    let hash = hash::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;

    user::ActiveModel {
        username: Set(username.clone()),
        password: Set(hash),
        role: Set(Role::Admin),
        email: Set(config.admin_email.clone().unwrap_or_default()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        phone: Set(None),
        address: Set(None),
        date_of_birth: Set(None),
        is_active: Set(true),
        is_staff: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(username = %username, "Seeded bootstrap admin");
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    name: &str,
    stmt: &mut IndexCreateStatement,
) -> Result<(), DbErr> {
    let sql = stmt
        .if_not_exists()
        .name(name)
        .to_string(PostgresQueryBuilder);

    db.execute_unprepared(&sql).await.map_err(|e| {
        tracing::error!("Failed to create index {}: {}", name, e);
        e
    })?;
    info!("Ensured index {} exists", name);
    Ok(())
}

/// Ensure composite unique indexes that schema-sync cannot express.
///
/// These treat NULL as an ordinary value, so a whole-day attendance mark
/// or a result without a subject is still unique. Any failure is returned:
/// the service must not start without them.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_index(
        db,
        "uq_attendance_student_date_subject",
        Index::create()
            .unique()
            .nulls_not_distinct()
            .table(attendance::Entity)
            .col(attendance::Column::StudentId)
            .col(attendance::Column::Date)
            .col(attendance::Column::SubjectId),
    )
    .await?;

    create_index(
        db,
        "uq_result_student_subject_exam",
        Index::create()
            .unique()
            .nulls_not_distinct()
            .table(result::Entity)
            .col(result::Column::StudentId)
            .col(result::Column::SubjectId)
            .col(result::Column::ExamName),
    )
    .await?;

    create_index(
        db,
        "uq_classroom_name_section",
        Index::create()
            .unique()
            .nulls_not_distinct()
            .table(classroom::Entity)
            .col(classroom::Column::Name)
            .col(classroom::Column::Section),
    )
    .await?;

    Ok(())
}

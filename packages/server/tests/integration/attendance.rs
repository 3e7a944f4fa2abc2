use sea_orm::ConnectionTrait;
use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn whole_day_mark_is_unique_per_student_and_date() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
    let student = app.create_student(&admin, "asha", None).await;
    let body = json!({
        "student_id": student.profile_id,
        "date": "2025-03-10",
        "status": "present",
    });

    let first = app
        .post_with_token(routes::ATTENDANCE, &body, &teacher.token)
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["marked_by"], teacher.profile_id);

    let res = app
        .post_with_token(routes::ATTENDANCE, &body, &teacher.token)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn failing_to_build_a_unique_index_is_an_error() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    app.db
        .execute_unprepared("DROP INDEX uq_attendance_student_date_subject")
        .await
        .expect("drop index");

    let body = json!({
        "student_id": student.profile_id,
        "date": "2025-03-10",
        "status": "present",
    });
    for _ in 0..2 {
        let res = app.post_with_token(routes::ATTENDANCE, &body, &admin).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = server::seed::ensure_indexes(&app.db).await;
    assert!(res.is_err(), "duplicate rows must block the unique index");
}

#[tokio::test]
async fn per_subject_marks_coexist_with_the_whole_day() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let maths = app.create_subject(&admin, "Mathematics").await;
    let student = app.create_student(&admin, "asha", None).await;

    for subject in [None, Some(maths)] {
        let res = app
            .post_with_token(
                routes::ATTENDANCE,
                &json!({
                    "student_id": student.profile_id,
                    "subject_id": subject,
                    "date": "2025-03-10",
                    "status": "absent",
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }
}

#[tokio::test]
async fn students_cannot_mark_attendance() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;

    let res = app
        .post_with_token(
            routes::ATTENDANCE,
            &json!({"student_id": student.profile_id, "status": "present"}),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn teacher_without_profile_cannot_mark() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    app.create_account(&admin, "mr_rao", "teacher").await;
    let token = app.login("mr_rao").await;

    let res = app
        .post_with_token(
            routes::ATTENDANCE,
            &json!({"student_id": student.profile_id, "status": "present"}),
            &token,
        )
        .await;

    assert_eq!(res.status, 422);
    assert_eq!(res.body["code"], "PROFILE_MISSING");
}

#[tokio::test]
async fn summary_reports_the_attendance_percentage() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;

    for (date, status) in [
        ("2025-03-10", "present"),
        ("2025-03-11", "present"),
        ("2025-03-12", "present"),
        ("2025-03-13", "absent"),
    ] {
        let res = app
            .post_with_token(
                routes::ATTENDANCE,
                &json!({"student_id": student.profile_id, "date": date, "status": status}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app
        .get_with_token(&routes::student_summary(student.profile_id), &student.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["attendance_total"], 4);
    assert_eq!(res.body["attendance_present"], 3);
    assert!((res.decimal("attendance_percentage") - 75.0).abs() < 1e-9);
}

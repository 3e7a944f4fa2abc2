use serde_json::json;

use crate::common::{TestApp, routes};

async fn apply(app: &TestApp, token: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::LEAVES,
            &json!({
                "start_date": "2025-04-01",
                "end_date": "2025-04-03",
                "reason": "Family wedding",
            }),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "apply failed: {}", res.text);
    assert_eq!(res.body["status"], "pending");
    assert_eq!(res.body["duration_days"], 3);
    res.id()
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;

    let res = app
        .post_with_token(
            routes::LEAVES,
            &json!({
                "start_date": "2025-04-03",
                "end_date": "2025-04-01",
                "reason": "Backwards",
            }),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn teacher_reviews_a_student_application_once() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
    let student = app.create_student(&admin, "asha", None).await;
    let id = apply(&app, &student.token).await;

    let res = app
        .post_with_token(
            &routes::leave_review(id),
            &json!({"decision": "approve", "remarks": "Enjoy"}),
            &teacher.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "approved");
    assert_eq!(res.body["reviewed_by"], teacher.user_id);
    assert!(res.body["reviewed_on"].is_string());

    let res = app
        .post_with_token(
            &routes::leave_review(id),
            &json!({"decision": "reject"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn teacher_cannot_review_a_colleague() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let rao = app.create_teacher(&admin, "mr_rao", &[]).await;
    let iyer = app.create_teacher(&admin, "ms_iyer", &[]).await;
    let id = apply(&app, &iyer.token).await;

    let res = app
        .post_with_token(&routes::leave_review(id), &json!({"decision": "approve"}), &rao.token)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .post_with_token(&routes::leave_review(id), &json!({"decision": "reject"}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "rejected");
}

#[tokio::test]
async fn nobody_reviews_their_own_application() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let id = apply(&app, &admin).await;

    let res = app
        .post_with_token(&routes::leave_review(id), &json!({"decision": "approve"}), &admin)
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn students_cannot_review_and_see_only_their_own() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;
    let ravi = app.create_student(&admin, "ravi", None).await;
    let own = apply(&app, &asha.token).await;
    let other = apply(&app, &ravi.token).await;

    let res = app
        .post_with_token(&routes::leave_review(other), &json!({"decision": "approve"}), &asha.token)
        .await;
    assert_eq!(res.status, 403);

    let res = app.get_with_token(routes::LEAVES, &asha.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], own);
}

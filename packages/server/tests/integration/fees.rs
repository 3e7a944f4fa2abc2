use serde_json::json;

use crate::common::{TestApp, routes};

async fn tuition(app: &TestApp, admin: &str, student_id: i32, due_date: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::FEES,
            &json!({
                "student_id": student_id,
                "fee_type": "tuition",
                "amount": "1200.00",
                "due_date": due_date,
                "academic_year": "2025-2026",
            }),
            admin,
        )
        .await;
    assert_eq!(res.status, 201, "create fee failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn unpaid_fee_past_due_is_overdue_on_creation() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;

    let past = tuition(&app, &admin, student.profile_id, "2020-01-01").await;
    let future = tuition(&app, &admin, student.profile_id, "2099-01-01").await;

    let res = app.get_with_token(&routes::fee(past), &admin).await;
    assert_eq!(res.body["payment_status"], "overdue");
    let res = app.get_with_token(&routes::fee(future), &admin).await;
    assert_eq!(res.body["payment_status"], "pending");
}

#[tokio::test]
async fn payments_move_a_fee_through_partial_to_paid() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    let id = tuition(&app, &admin, student.profile_id, "2099-01-01").await;

    let res = app
        .post_with_token(
            &routes::fee_payments(id),
            &json!({"amount": "500", "transaction_id": "TXN-1"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["payment_status"], "partial");
    assert!((res.decimal("balance") - 700.0).abs() < 1e-9);
    assert_eq!(res.body["transaction_id"], "TXN-1");
    assert!(res.body["payment_date"].is_string());

    let res = app
        .post_with_token(&routes::fee_payments(id), &json!({"amount": "700"}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["payment_status"], "paid");
    assert!(res.decimal("balance").abs() < 1e-9);
}

#[tokio::test]
async fn payment_cannot_exceed_the_balance() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    let id = tuition(&app, &admin, student.profile_id, "2099-01-01").await;

    let res = app
        .post_with_token(&routes::fee_payments(id), &json!({"amount": "1200.01"}), &admin)
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");

    let res = app
        .post_with_token(&routes::fee_payments(id), &json!({"amount": "0"}), &admin)
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn partially_paid_overdue_fee_stays_partial() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    let id = tuition(&app, &admin, student.profile_id, "2020-01-01").await;

    let res = app
        .patch_with_token(&routes::fee(id), &json!({"paid_amount": "100"}), &admin)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["payment_status"], "partial");
}

#[tokio::test]
async fn students_see_only_their_own_fees() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;
    let ravi = app.create_student(&admin, "ravi", None).await;
    let own = tuition(&app, &admin, asha.profile_id, "2099-01-01").await;
    let other = tuition(&app, &admin, ravi.profile_id, "2099-01-01").await;

    let res = app.get_with_token(routes::FEES, &asha.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let ids: Vec<i64> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![own as i64]);

    let res = app.get_with_token(&routes::fee(other), &asha.token).await;
    assert_eq!(res.status, 404);

    let res = app
        .post_with_token(&routes::fee_payments(own), &json!({"amount": "1"}), &asha.token)
        .await;
    assert_eq!(res.status, 403);
}

use serde_json::json;

use crate::common::{TestApp, routes};

async fn add_book(app: &TestApp, admin: &str, isbn: &str, copies: i32) -> i32 {
    let res = app
        .post_with_token(
            routes::BOOKS,
            &json!({
                "title": "A Brief History of Time",
                "author": "Stephen Hawking",
                "isbn": isbn,
                "category": "Science",
                "total_copies": copies,
            }),
            admin,
        )
        .await;
    assert_eq!(res.status, 201, "add book failed: {}", res.text);
    assert_eq!(res.body["available_copies"], copies);
    res.id()
}

#[tokio::test]
async fn duplicate_isbn_is_a_conflict() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    add_book(&app, &admin, "978-0553380163", 2).await;

    let res = app
        .post_with_token(
            routes::BOOKS,
            &json!({
                "title": "Another edition",
                "author": "Stephen Hawking",
                "isbn": "978-0553380163",
                "total_copies": 1,
            }),
            &admin,
        )
        .await;

    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn last_copy_cannot_be_issued_twice() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;
    let ravi = app.create_student(&admin, "ravi", None).await;
    let book = add_book(&app, &admin, "978-0553380163", 1).await;

    let first = app
        .post_with_token(
            routes::ISSUES,
            &json!({"book_id": book, "student_id": asha.profile_id}),
            &admin,
        )
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["is_returned"], false);

    let res = app.get_with_token(&routes::book(book), &admin).await;
    assert_eq!(res.body["available_copies"], 0);
    assert_eq!(res.body["is_available"], false);

    let res = app
        .post_with_token(
            routes::ISSUES,
            &json!({"book_id": book, "student_id": ravi.profile_id}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 409, "{}", res.text);

    let res = app
        .post_with_token(&routes::issue_return(first.id()), &json!({}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app.get_with_token(&routes::book(book), &admin).await;
    assert_eq!(res.body["available_copies"], 1);
}

#[tokio::test]
async fn issuing_a_missing_book_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;

    let res = app
        .post_with_token(
            routes::ISSUES,
            &json!({"book_id": 9999, "student_id": asha.profile_id}),
            &admin,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn late_return_records_a_fine_and_cannot_repeat() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;
    let book = add_book(&app, &admin, "978-0553380163", 2).await;

    let issue = app
        .post_with_token(
            routes::ISSUES,
            &json!({
                "book_id": book,
                "student_id": asha.profile_id,
                "issue_date": "2025-01-01",
            }),
            &admin,
        )
        .await;
    assert_eq!(issue.status, 201, "{}", issue.text);
    assert_eq!(issue.body["due_date"], "2025-01-15");
    assert_eq!(issue.body["is_overdue"], true);

    let res = app
        .post_with_token(
            &routes::issue_return(issue.id()),
            &json!({"return_date": "2025-01-20"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["is_returned"], true);
    assert_eq!(res.body["days_late"], 5);
    assert!((res.decimal("fine_amount") - 25.0).abs() < 1e-9);
    assert!((res.decimal("current_fine") - 25.0).abs() < 1e-9);

    let res = app
        .post_with_token(&routes::issue_return(issue.id()), &json!({}), &admin)
        .await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn available_copies_cannot_exceed_total() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let book = add_book(&app, &admin, "978-0553380163", 2).await;

    let res = app
        .patch_with_token(&routes::book(book), &json!({"available_copies": 3}), &admin)
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .patch_with_token(&routes::book(book), &json!({"total_copies": 5}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total_copies"], 5);
    assert_eq!(res.body["available_copies"], 2);
}

#[tokio::test]
async fn students_see_their_own_loans_and_cannot_issue() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;
    let ravi = app.create_student(&admin, "ravi", None).await;
    let book = add_book(&app, &admin, "978-0553380163", 3).await;
    for student in [asha.profile_id, ravi.profile_id] {
        let res = app
            .post_with_token(
                routes::ISSUES,
                &json!({"book_id": book, "student_id": student}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app.get_with_token(routes::MY_BOOKS, &asha.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["student_id"], asha.profile_id);

    let res = app
        .post_with_token(
            routes::ISSUES,
            &json!({"book_id": book, "student_id": asha.profile_id}),
            &asha.token,
        )
        .await;
    assert_eq!(res.status, 403);
}

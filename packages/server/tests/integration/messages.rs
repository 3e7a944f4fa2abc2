use serde_json::json;

use crate::common::{Member, TestApp, routes};

async fn send(app: &TestApp, from: &str, to: i32, subject: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"recipient_id": to, "subject": subject, "body": "See you at 9."}),
            from,
        )
        .await;
    assert_eq!(res.status, 201, "send failed: {}", res.text);
    assert_eq!(res.body["is_read"], false);
    res.id()
}

async fn pair(app: &TestApp) -> (Member, Member) {
    let admin = app.create_admin("principal").await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
    let student = app.create_student(&admin, "asha", None).await;
    (teacher, student)
}

#[tokio::test]
async fn reading_a_message_marks_it_read_for_the_recipient_only() {
    let app = TestApp::spawn().await;
    let (teacher, student) = pair(&app).await;
    let id = send(&app, &teacher.token, student.user_id, "Homework").await;

    let inbox = app.get_with_token(routes::MESSAGES, &student.token).await;
    assert_eq!(inbox.status, 200, "{}", inbox.text);
    assert_eq!(inbox.body["unread_count"], 1);

    // The sender opening it changes nothing.
    let res = app.get_with_token(&routes::message(id), &teacher.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["is_read"], false);

    let res = app.get_with_token(&routes::message(id), &student.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["is_read"], true);
    let read_at = res.body["read_at"].clone();
    assert!(read_at.is_string());

    // A second read keeps the first timestamp.
    let res = app.get_with_token(&routes::message(id), &student.token).await;
    assert_eq!(res.body["read_at"], read_at);

    let inbox = app.get_with_token(routes::MESSAGES, &student.token).await;
    assert_eq!(inbox.body["unread_count"], 0);
}

#[tokio::test]
async fn third_parties_cannot_open_a_message() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
    let asha = app.create_student(&admin, "asha", None).await;
    let ravi = app.create_student(&admin, "ravi", None).await;
    let id = send(&app, &teacher.token, asha.user_id, "Private").await;

    let res = app.get_with_token(&routes::message(id), &ravi.token).await;
    assert_eq!(res.status, 404);

    // Admins get no special access to other people's mail.
    let res = app.get_with_token(&routes::message(id), &admin).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn reply_goes_back_to_the_other_party() {
    let app = TestApp::spawn().await;
    let (teacher, student) = pair(&app).await;
    let id = send(&app, &teacher.token, student.user_id, "Homework").await;

    let res = app
        .post_with_token(
            &routes::message_reply(id),
            &json!({"body": "Thank you!"}),
            &student.token,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["sender_id"], student.user_id);
    assert_eq!(res.body["recipient_id"], teacher.user_id);
    assert_eq!(res.body["subject"], "Re: Homework");
    assert_eq!(res.body["parent_message_id"], id);

    let sent = app.get_with_token(routes::MESSAGES_SENT, &student.token).await;
    assert_eq!(sent.status, 200, "{}", sent.text);
    assert_eq!(sent.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sending_to_an_unknown_user_is_not_found() {
    let app = TestApp::spawn().await;
    let (teacher, _) = pair(&app).await;

    let res = app
        .post_with_token(
            routes::MESSAGES,
            &json!({"recipient_id": 9999, "subject": "Hello", "body": "Anyone?"}),
            &teacher.token,
        )
        .await;

    assert_eq!(res.status, 404);
}

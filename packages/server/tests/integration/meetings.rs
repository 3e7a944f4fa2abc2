use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn meeting(participants: &[i32]) -> Value {
    json!({
        "title": "Term planning",
        "meeting_type": "staff",
        "meeting_date": "2099-04-02",
        "start_time": "09:00:00",
        "end_time": "10:30:00",
        "location": "Staff room",
        "participant_ids": participants,
    })
}

#[tokio::test]
async fn only_admins_schedule_meetings() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;

    let res = app
        .post_with_token(routes::MEETINGS, &meeting(&[]), &teacher.token)
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn virtual_meeting_needs_a_link() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let mut body = meeting(&[]);
    body["is_virtual"] = json!(true);

    let res = app.post_with_token(routes::MEETINGS, &body, &admin).await;
    assert_eq!(res.status, 400);

    body["meeting_link"] = json!("https://meet.school.test/term");
    let res = app.post_with_token(routes::MEETINGS, &body, &admin).await;
    assert_eq!(res.status, 201, "{}", res.text);
}

#[tokio::test]
async fn organiser_is_not_listed_as_a_participant() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
    let me = app.get_with_token(routes::ME, &admin).await;
    let admin_id = me.id();

    let res = app
        .post_with_token(
            routes::MEETINGS,
            &meeting(&[teacher.user_id, admin_id, teacher.user_id]),
            &admin,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["organized_by"], admin_id);
    assert_eq!(res.body["participant_ids"], json!([teacher.user_id]));
    assert_eq!(res.body["duration"], "1h 30m");
    assert_eq!(res.body["is_upcoming"], true);
}

#[tokio::test]
async fn participants_see_the_meeting_and_others_do_not() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let rao = app.create_teacher(&admin, "mr_rao", &[]).await;
    let iyer = app.create_teacher(&admin, "ms_iyer", &[]).await;
    let id = app
        .post_with_token(routes::MEETINGS, &meeting(&[rao.user_id]), &admin)
        .await
        .id();

    let res = app.get_with_token(&routes::meeting(id), &rao.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app.get_with_token(&routes::meeting(id), &iyer.token).await;
    assert_eq!(res.status, 404);

    let portal = app.get_with_token(routes::MEETING_PORTAL, &rao.token).await;
    assert_eq!(portal.status, 200, "{}", portal.text);
    assert_eq!(portal.body["can_create"], false);
    assert_eq!(portal.body["invited"].as_array().unwrap().len(), 1);
    assert_eq!(portal.body["organized"].as_array().unwrap().len(), 0);
    assert_eq!(portal.body["upcoming"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_organiser_updates_a_meeting() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let other_admin = app.create_admin("deputy").await;
    let rao = app.create_teacher(&admin, "mr_rao", &[]).await;
    let id = app
        .post_with_token(routes::MEETINGS, &meeting(&[rao.user_id]), &admin)
        .await
        .id();
    let update = json!({"status": "completed", "meeting_notes": "Agreed on the exam calendar"});

    let res = app.patch_with_token(&routes::meeting(id), &update, &rao.token).await;
    assert_eq!(res.status, 403);

    let res = app
        .patch_with_token(&routes::meeting(id), &update, &other_admin)
        .await;
    assert_eq!(res.status, 404, "uninvited admins do not see the meeting");

    let res = app.patch_with_token(&routes::meeting(id), &update, &admin).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "completed");
    assert_eq!(res.body["meeting_notes"], "Agreed on the exam calendar");
}

#[tokio::test]
async fn portal_upcoming_skips_meetings_that_already_started() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let rao = app.create_teacher(&admin, "mr_rao", &[]).await;
    let today = chrono::Utc::now().date_naive().to_string();

    // More started meetings today than the portal lists at once.
    for _ in 0..25 {
        let mut body = meeting(&[rao.user_id]);
        body["meeting_date"] = json!(today);
        body["start_time"] = json!("00:00:00");
        body["end_time"] = json!("00:30:00");
        let res = app.post_with_token(routes::MEETINGS, &body, &admin).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }
    let later = app
        .post_with_token(routes::MEETINGS, &meeting(&[rao.user_id]), &admin)
        .await
        .id();

    let portal = app.get_with_token(routes::MEETING_PORTAL, &rao.token).await;

    assert_eq!(portal.status, 200, "{}", portal.text);
    let upcoming = portal.body["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["id"], later);
}

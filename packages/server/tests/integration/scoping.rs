use serde_json::json;

use crate::common::{TestApp, routes};

fn titles(res: &crate::common::TestResponse) -> Vec<String> {
    res.body["data"]
        .as_array()
        .expect("page body should have data")
        .iter()
        .map(|n| n["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn students_cannot_browse_the_student_list() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;

    let res = app.get_with_token(routes::STUDENTS, &student.token).await;
    assert_eq!(res.status, 403);

    let res = app.get_with_token(routes::STUDENTS, &teacher.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn student_without_profile_gets_an_empty_page_and_a_warning() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    app.create_account(&admin, "newcomer", "student").await;
    let token = app.login("newcomer").await;

    let res = app.get_with_token(routes::RESULTS, &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"], json!([]));
    assert_eq!(res.body["warning"], "Please complete your student profile.");
}

#[tokio::test]
async fn students_see_only_their_own_results() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let asha = app.create_student(&admin, "asha", None).await;
    let ravi = app.create_student(&admin, "ravi", None).await;
    let mut ids = Vec::new();
    for student in [asha.profile_id, ravi.profile_id] {
        let res = app
            .post_with_token(
                routes::RESULTS,
                &json!({
                    "student_id": student,
                    "marks": 60,
                    "exam_name": "Final",
                    "exam_date": "2025-06-01",
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        ids.push(res.id());
    }

    // Asking for someone else's rows narrows nothing past the scope.
    let res = app
        .get_with_token(
            &format!("{}?student_id={}", routes::RESULTS, ravi.profile_id),
            &asha.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"], json!([]));

    let res = app.get_with_token(&routes::result(ids[1]), &asha.token).await;
    assert_eq!(res.status, 404);

    let res = app.get_with_token(&routes::result(ids[0]), &asha.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app
        .get_with_token(&routes::student_summary(ravi.profile_id), &asha.token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn notices_follow_audience_and_publish_window() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;

    for (title, audience, publish) in [
        ("Sports day", "all", "2020-01-01"),
        ("Staff meeting", "teacher", "2020-01-01"),
        ("Exam hall rules", "student", "2020-01-01"),
        ("Next term", "student", "2099-01-01"),
    ] {
        let res = app
            .post_with_token(
                routes::NOTICES,
                &json!({
                    "title": title,
                    "content": "Details inside.",
                    "target_role": audience,
                    "publish_date": publish,
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app.get_with_token(routes::NOTICES, &student.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let mut seen = titles(&res);
    seen.sort();
    assert_eq!(seen, vec!["Exam hall rules", "Sports day"]);

    let res = app.get_with_token(routes::NOTICES, &teacher.token).await;
    let mut seen = titles(&res);
    seen.sort();
    assert_eq!(seen, vec!["Sports day", "Staff meeting"]);

    let res = app.get_with_token(routes::NOTICES, &admin).await;
    assert_eq!(titles(&res).len(), 4);
}

#[tokio::test]
async fn dashboard_is_shaped_by_role() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("principal").await;
    let student = app.create_student(&admin, "asha", None).await;
    let reg = app
        .post_without_token(
            routes::REGISTER,
            &json!({
                "username": "pending_pat",
                "password": crate::common::PASSWORD,
                "role": "teacher",
                "email": "pat@school.test",
            }),
        )
        .await;
    assert_eq!(reg.status, 201, "{}", reg.text);

    let res = app.get_with_token(routes::DASHBOARD, &admin).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["role"], "admin");
    assert_eq!(res.body["active_students"], 1);
    let pending = res.body["pending_users"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["username"], "pending_pat");

    let res = app.get_with_token(routes::DASHBOARD, &student.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["role"], "student");
    assert!(res.body["assignments"].is_array());
}

#[tokio::test]
async fn site_branding_is_public() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::SITE).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["header"], "School Management System");
    assert_eq!(res.body["title"], "School Admin");
}

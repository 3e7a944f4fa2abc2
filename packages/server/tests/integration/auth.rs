use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

fn registration(username: &str, role: &str) -> serde_json::Value {
    json!({
        "username": username,
        "password": PASSWORD,
        "role": role,
        "email": format!("{username}@school.test"),
    })
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn registered_accounts_start_inactive() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &registration("asha", "student"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"], "asha");
        assert_eq!(res.body["role"], "student");
        assert_eq!(res.body["is_active"], false);
    }

    #[tokio::test]
    async fn cannot_self_register_as_admin() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &registration("mallory", "admin"))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_username() {
        let app = TestApp::spawn().await;
        let body = registration("asha", "teacher");

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn cannot_register_with_an_invalid_email() {
        let app = TestApp::spawn().await;
        let mut body = registration("asha", "student");
        body["email"] = json!("not-an-email");

        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;
        let mut body = registration("asha", "student");
        body["password"] = json!("short");

        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn inactive_account_cannot_log_in_until_approved() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;

        let reg = app
            .post_without_token(routes::REGISTER, &registration("asha", "student"))
            .await;
        assert_eq!(reg.status, 201);
        let credentials = json!({"username": "asha", "password": PASSWORD});

        let res = app.post_without_token(routes::LOGIN, &credentials).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "ACCOUNT_INACTIVE");

        let approve = app
            .patch_with_token(&routes::user(reg.id()), &json!({"is_active": true}), &admin)
            .await;
        assert_eq!(approve.status, 200, "{}", approve.text);

        let res = app.post_without_token(routes::LOGIN, &credentials).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["role"], "student");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_admin("principal").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "principal", "password": "not the password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_error_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "ghost", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn student_sees_profile_and_capabilities() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let class = app.create_classroom(&admin, "Grade 7", "A").await;
        let student = app.create_student(&admin, "asha", Some(class)).await;

        let res = app.get_with_token(routes::ME, &student.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "student");
        assert_eq!(res.body["student_id"], student.profile_id);
        assert_eq!(res.body["classroom_id"], class);
        assert!(res.body["warning"].is_null());
        let caps: Vec<&str> = res.body["capabilities"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c.as_str())
            .collect();
        assert!(caps.contains(&"assignment:submit"), "{caps:?}");
        assert!(!caps.contains(&"attendance:mark"), "{caps:?}");
    }

    #[tokio::test]
    async fn teacher_without_profile_gets_a_warning() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        app.create_account(&admin, "mr_rao", "teacher").await;
        let token = app.login("mr_rao").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["teacher_id"].is_null());
        assert_eq!(res.body["warning"], "Please complete your teacher profile.");
    }
}

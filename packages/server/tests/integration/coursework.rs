use serde_json::json;

use crate::common::{TestApp, routes};

mod results {
    use super::*;

    #[tokio::test]
    async fn grade_is_derived_from_marks_when_omitted() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let maths = app.create_subject(&admin, "Mathematics").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[maths]).await;
        let student = app.create_student(&admin, "asha", None).await;

        let res = app
            .post_with_token(
                routes::RESULTS,
                &json!({
                    "student_id": student.profile_id,
                    "subject_id": maths,
                    "marks": "84.5",
                    "total_marks": 100,
                    "exam_name": "Midterm",
                    "exam_date": "2025-03-10",
                }),
                &teacher.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["grade"], "A");
        assert!((res.decimal("percentage") - 84.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn explicit_grade_is_kept_when_marks_change() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let student = app.create_student(&admin, "asha", None).await;

        let created = app
            .post_with_token(
                routes::RESULTS,
                &json!({
                    "student_id": student.profile_id,
                    "marks": 40,
                    "exam_name": "Unit test",
                    "exam_date": "2025-02-01",
                    "grade": "B",
                }),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.body["grade"], "B");

        let res = app
            .patch_with_token(&routes::result(created.id()), &json!({"marks": 95}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["grade"], "B");

        let res = app
            .patch_with_token(&routes::result(created.id()), &json!({"grade": null}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["grade"], "A+");
    }

    #[tokio::test]
    async fn duplicate_student_subject_exam_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let student = app.create_student(&admin, "asha", None).await;
        let body = json!({
            "student_id": student.profile_id,
            "marks": 70,
            "exam_name": "Final",
            "exam_date": "2025-06-01",
        });

        let first = app.post_with_token(routes::RESULTS, &body, &admin).await;
        assert_eq!(first.status, 201, "{}", first.text);

        // No subject on either row; still the same result.
        let res = app.post_with_token(routes::RESULTS, &body, &admin).await;
        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn students_cannot_record_results() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let student = app.create_student(&admin, "asha", None).await;

        let res = app
            .post_with_token(
                routes::RESULTS,
                &json!({
                    "student_id": student.profile_id,
                    "marks": 100,
                    "exam_name": "Final",
                    "exam_date": "2025-06-01",
                }),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod submissions {
    use super::*;

    async fn assignment(app: &TestApp, token: &str, classroom_id: i32, due: &str) -> i32 {
        let res = app
            .post_with_token(
                routes::ASSIGNMENTS,
                &json!({
                    "title": "Fractions worksheet",
                    "classroom_id": classroom_id,
                    "due_date": due,
                    "total_marks": 20,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create assignment failed: {}", res.text);
        res.id()
    }

    #[tokio::test]
    async fn work_after_the_due_date_is_flagged_late() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let class = app.create_classroom(&admin, "Grade 7", "A").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
        let student = app.create_student(&admin, "asha", Some(class)).await;

        let past = assignment(&app, &teacher.token, class, "2020-01-01").await;
        let future = assignment(&app, &teacher.token, class, "2099-01-01").await;

        let late = app
            .post_with_token(
                &routes::assignment_submissions(past),
                &json!({"file": "uploads/asha-fractions.pdf"}),
                &student.token,
            )
            .await;
        assert_eq!(late.status, 201, "{}", late.text);
        assert_eq!(late.body["is_late"], true);

        let on_time = app
            .post_with_token(
                &routes::assignment_submissions(future),
                &json!({"file": "uploads/asha-fractions.pdf"}),
                &student.token,
            )
            .await;
        assert_eq!(on_time.status, 201, "{}", on_time.text);
        assert_eq!(on_time.body["is_late"], false);
    }

    #[tokio::test]
    async fn work_handed_in_on_the_due_date_is_on_time() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let class = app.create_classroom(&admin, "Grade 7", "A").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
        let student = app.create_student(&admin, "asha", Some(class)).await;
        let today = chrono::Utc::now().date_naive().to_string();
        let id = assignment(&app, &teacher.token, class, &today).await;

        let res = app
            .post_with_token(
                &routes::assignment_submissions(id),
                &json!({"file": "uploads/asha-fractions.pdf"}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["is_late"], false);
    }

    #[tokio::test]
    async fn students_see_only_their_own_submissions() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let class = app.create_classroom(&admin, "Grade 7", "A").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
        let asha = app.create_student(&admin, "asha", Some(class)).await;
        let ravi = app.create_student(&admin, "ravi", Some(class)).await;
        let id = assignment(&app, &teacher.token, class, "2099-01-01").await;

        for student in [&asha, &ravi] {
            let res = app
                .post_with_token(
                    &routes::assignment_submissions(id),
                    &json!({"file": "uploads/fractions.pdf"}),
                    &student.token,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        for student in [&asha, &ravi] {
            for path in [routes::SUBMISSIONS.to_string(), routes::assignment_submissions(id)] {
                let res = app.get_with_token(&path, &student.token).await;
                assert_eq!(res.status, 200, "{path}: {}", res.text);
                let rows = res.body["data"].as_array().expect("page body should have data");
                assert_eq!(rows.len(), 1, "{path}");
                assert_eq!(rows[0]["student_id"], student.profile_id);
            }
        }

        let res = app
            .get_with_token(&routes::assignment_submissions(id), &teacher.token)
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn second_submission_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let class = app.create_classroom(&admin, "Grade 7", "A").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
        let student = app.create_student(&admin, "asha", Some(class)).await;
        let id = assignment(&app, &teacher.token, class, "2099-01-01").await;
        let body = json!({"file": "uploads/one.pdf"});

        let first = app
            .post_with_token(&routes::assignment_submissions(id), &body, &student.token)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app
            .post_with_token(&routes::assignment_submissions(id), &body, &student.token)
            .await;
        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn assignment_for_another_classroom_is_invisible() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let seven = app.create_classroom(&admin, "Grade 7", "A").await;
        let eight = app.create_classroom(&admin, "Grade 8", "A").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
        let student = app.create_student(&admin, "asha", Some(seven)).await;
        let id = assignment(&app, &teacher.token, eight, "2099-01-01").await;

        let res = app
            .post_with_token(
                &routes::assignment_submissions(id),
                &json!({"file": "uploads/one.pdf"}),
                &student.token,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn grading_reports_a_letter_grade_and_caps_marks() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("principal").await;
        let class = app.create_classroom(&admin, "Grade 7", "A").await;
        let teacher = app.create_teacher(&admin, "mr_rao", &[]).await;
        let student = app.create_student(&admin, "asha", Some(class)).await;
        let id = assignment(&app, &teacher.token, class, "2099-01-01").await;
        let submission = app
            .post_with_token(
                &routes::assignment_submissions(id),
                &json!({"file": "uploads/one.pdf"}),
                &student.token,
            )
            .await
            .id();

        let too_many = app
            .post_with_token(
                &routes::grade_submission(submission),
                &json!({"marks_obtained": 21}),
                &teacher.token,
            )
            .await;
        assert_eq!(too_many.status, 400);

        let res = app
            .post_with_token(
                &routes::grade_submission(submission),
                &json!({"marks_obtained": 15, "remarks": "Good work"}),
                &teacher.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["grade"], "B");
        assert_eq!(res.body["graded_by"], teacher.profile_id);
        assert!(res.body["graded_at"].is_string());
    }
}

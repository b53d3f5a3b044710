use actix_web::{http::header::HeaderValue, test, web, App};
use qcm_generator::{
    auth::StaticUsers,
    models::Question,
    repo::{csv_file::CsvQuestionRepo, inmem::InMemRepo, QuestionRepo},
    routes::{config, AppState},
};
use serde_json::{json, Value};
use std::sync::Arc;

const ADMIN: &str = "admin:4dm1N";
const ALICE: &str = "alice:wonderland";
const BOB: &str = "bob:builder";

fn q(text: &str, subject: &str, usage: &str) -> Question {
    Question {
        question: text.into(),
        subject: subject.into(),
        usage: usage.into(),
        correct: "A".into(),
        response_a: "a".into(),
        response_b: "b".into(),
        response_c: "c".into(),
        ..Default::default()
    }
}

fn seeded() -> Vec<Question> {
    let mut v = vec![
        q("What is a primary key?", "SQL", "Test de positionnement"),
        q("What is a join?", "SQL", "Test de positionnement"),
        q("What is a view?", "SQL", "Test de validation"),
    ];
    for i in 0..12 {
        v.push(q(&format!("Docker question {i}"), "Docker", "Test de validation"));
    }
    v
}

fn state_with(repo: Arc<dyn QuestionRepo>) -> web::Data<AppState> {
    web::Data::new(AppState { repo, users: Arc::new(StaticUsers::default()) })
}

fn new_question(subject: &str) -> Value {
    json!({
        "question": "Which database is document oriented?",
        "subject": subject,
        "use": "Test de validation",
        "correct": "B",
        "responseA": "PostgreSQL",
        "responseB": "MongoDB",
        "responseC": "MySQL, InnoDB"
    })
}

macro_rules! app {
    ($repo:expr) => {
        test::init_service(App::new().app_data(state_with($repo)).configure(config)).await
    };
}

#[actix_web::test]
async fn status_requires_header() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));

    let req = test::TestRequest::get().uri("/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No Authorization header");

    let req = test::TestRequest::get()
        .uri("/status")
        .insert_header(("Auth_header", ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 1}));
}

#[actix_web::test]
async fn status_rejects_bad_credentials() {
    let app = app!(Arc::new(InMemRepo::new()));
    for (cred, detail) in [
        ("alice", "Authorization header should be in the form username:password"),
        ("alice:wonder:land", "Authorization header should be in the form username:password"),
        ("mallory:x", "Specified username mallory does not exist"),
        ("alice:builder", "Mismatch password"),
    ] {
        let req = test::TestRequest::get()
            .uri("/status")
            .insert_header(("Auth_header", cred))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{cred}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], detail);
    }
}

#[actix_web::test]
async fn non_ascii_header_reaches_password_check() {
    let app = app!(Arc::new(InMemRepo::new()));
    let value = HeaderValue::from_bytes("alice:wönderland".as_bytes()).unwrap();
    let req = test::TestRequest::get()
        .uri("/status")
        .insert_header(("Auth_header", value))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Mismatch password");
}

#[actix_web::test]
async fn qcm_caps_sample_and_flags_incomplete() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));
    let req = test::TestRequest::get()
        .uri("/QCM?n_questions=5&subjects=SQL")
        .insert_header(("Auth_header", BOB))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let rows = body["QCM"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(body["imcomplete_answer_flag"], true);
    assert!(rows.iter().all(|r| r["subject"] == "SQL"));
    // every column is present on each record
    for key in ["question", "subject", "use", "correct", "responseA", "responseB", "responseC", "responseD", "remark"] {
        assert!(rows[0].get(key).is_some(), "missing {key}");
    }
}

#[actix_web::test]
async fn qcm_defaults_to_ten_questions() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));
    let req = test::TestRequest::get()
        .uri("/QCM")
        .insert_header(("Auth_header", ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let rows = body["QCM"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(body["imcomplete_answer_flag"], false);
    let mut texts: Vec<_> = rows.iter().map(|r| r["question"].as_str().unwrap()).collect();
    texts.sort();
    texts.dedup();
    assert_eq!(texts.len(), 10);
}

#[actix_web::test]
async fn qcm_filters_on_use_and_trimmed_subjects() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));
    let req = test::TestRequest::get()
        .uri("/QCM?n_questions=20&use=Test%20de%20validation&subjects=SQL,%20Docker%20")
        .insert_header(("Auth_header", ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let rows = body["QCM"].as_array().unwrap();
    assert_eq!(rows.len(), 13);
    assert!(rows.iter().all(|r| r["use"] == "Test de validation"));
    assert_eq!(body["imcomplete_answer_flag"], true);
}

#[actix_web::test]
async fn qcm_no_match_is_404() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));
    let req = test::TestRequest::get()
        .uri("/QCM?subjects=Spark")
        .insert_header(("Auth_header", ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No questions corresponding to specified use and/or subjects");
}

#[actix_web::test]
async fn qcm_rejects_unlisted_sizes() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));
    for n in ["7", "0", "abc"] {
        let req = test::TestRequest::get()
            .uri(&format!("/QCM?n_questions={n}"))
            .insert_header(("Auth_header", ALICE))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422, "n_questions={n}");
    }
}

#[actix_web::test]
async fn auth_is_checked_before_query_validation() {
    let app = app!(Arc::new(InMemRepo::with_questions(seeded())));
    let req = test::TestRequest::get().uri("/QCM?n_questions=7").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn basic_user_cannot_add_question() {
    let app = app!(Arc::new(InMemRepo::new()));
    let req = test::TestRequest::post()
        .uri("/Questions")
        .insert_header(("Auth_header", BOB))
        .set_json(new_question("NoSQL"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Unauthorized action for user bob");

    // role check wins over an invalid body too
    let req = test::TestRequest::post()
        .uri("/Questions")
        .insert_header(("Auth_header", BOB))
        .set_json(json!({"question": "incomplete"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn add_question_validates_body() {
    let app = app!(Arc::new(InMemRepo::new()));

    let mut bad_answer = new_question("NoSQL");
    bad_answer["correct"] = json!("E");
    let mut missing = new_question("NoSQL");
    missing.as_object_mut().unwrap().remove("responseC");

    for body in [bad_answer, missing] {
        let req = test::TestRequest::post()
            .uri("/Questions")
            .insert_header(("Auth_header", ADMIN))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_str().is_some());
    }
}

#[actix_web::test]
async fn admin_added_question_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let repo = CsvQuestionRepo::create(dir.path().join("questions.csv")).unwrap();
    for row in seeded() {
        repo.append(row).await.unwrap();
    }
    let app = app!(Arc::new(repo));

    let req = test::TestRequest::post()
        .uri("/Questions")
        .insert_header(("Auth_header", ADMIN))
        .set_json(new_question("NoSQL"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let stored: Value = test::read_body_json(resp).await;
    assert_eq!(stored["subject"], "NoSQL");
    assert_eq!(stored["correct"], "B");
    assert_eq!(stored["responseD"], "");
    assert_eq!(stored["remark"], "");

    let req = test::TestRequest::get()
        .uri("/QCM?subjects=NoSQL&n_questions=5")
        .insert_header(("Auth_header", ALICE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["QCM"], json!([stored]));
    assert_eq!(body["imcomplete_answer_flag"], true);
}

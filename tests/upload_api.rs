use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;
use tracked::db::Counter;
use tracked::{routes, AppState, MemoryStore, Settings};

const TOKEN: &str = "test_token";

fn state_for(store: &MemoryStore) -> web::Data<AppState> {
    let config = Settings::new_for_test().expect("Failed to load test config");
    web::Data::new(AppState::with_store(config, Arc::new(store.clone())))
}

#[actix_web::test]
async fn test_additive_uploads_accumulate() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    for _ in 0..2 {
        let resp = test::TestRequest::post()
            .uri("/upload/times")
            .insert_header(("Authorization", TOKEN))
            .set_json(json!({"a@steam": 300, "b@steam": 45}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
    }

    for (uri, counter) in [
        ("/upload/rounds", Counter::RoundsPlayed),
        ("/upload/adrenaline", Counter::UsedAdrenaline),
        ("/upload/escapes", Counter::Escapes),
        ("/upload/playerpoints", Counter::Experience),
    ] {
        let resp = test::TestRequest::post()
            .uri(uri)
            .insert_header(("Authorization", TOKEN))
            .set_json(json!({"a@steam": 2}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200, "{} should accept integers", uri);
        assert_eq!(store.player("a@steam").await.unwrap().counter(counter), 2);
    }

    let a = store.player("a@steam").await.unwrap();
    assert_eq!(a.counter(Counter::Playtime), 600);
    assert_eq!(store.player("b@steam").await.unwrap().counter(Counter::Playtime), 90);
}

#[actix_web::test]
async fn test_snake_highscore_keeps_maximum() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    for score in [18, 7, 21] {
        let resp = test::TestRequest::post()
            .uri("/upload/snake")
            .insert_header(("Authorization", TOKEN))
            .set_json(json!({"a@steam": score}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
    }

    assert_eq!(store.player("a@steam").await.unwrap().snakehighscore, Some(21));
}

#[actix_web::test]
async fn test_kills_update_both_players() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    let resp = test::TestRequest::post()
        .uri("/upload/kills")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!([
            {"Attacker": "a@steam", "Target": "b@steam", "Timestamp": 1700000000},
            {"Attacker": "anonymous", "Target": "a@steam", "Timestamp": 1700000010},
            {"Attacker": "a@steam", "Target": " ", "Timestamp": 1700000020}
        ]))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let a = store.player("a@steam").await.unwrap();
    assert_eq!(a.killcount, Some(2));
    assert_eq!(a.deathcount, Some(1));
    assert_eq!(store.player("b@steam").await.unwrap().deathcount, Some(1));
    assert!(store.player("anonymous").await.is_none());
    assert_eq!(store.kills().await.len(), 3);
}

#[actix_web::test]
async fn test_username_last_write_wins() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    for name in ["Alice", "Alicia"] {
        let resp = test::TestRequest::post()
            .uri("/upload/username")
            .insert_header(("Authorization", TOKEN))
            .set_json(json!({"a@steam": name}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
    }

    assert_eq!(
        store.player("a@steam").await.unwrap().username.as_deref(),
        Some("Alicia")
    );
}

#[actix_web::test]
async fn test_fakerank_admin_grant_and_revoke() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;
    let now = chrono::Utc::now().timestamp();

    let resp = test::TestRequest::post()
        .uri("/upload/fakerankadmin")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!({"a@steam": true, "b@steam": false}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let granted = store.player("a@steam").await.unwrap().fakerankadmin_until.unwrap();
    assert!(granted >= now + 14 * 24 * 60 * 60);
    assert_eq!(store.player("b@steam").await.unwrap().fakerankadmin_until, Some(0));

    let resp = test::TestRequest::post()
        .uri("/upload/fakerankadmin")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!({"a@steam": false}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(store.player("a@steam").await.unwrap().fakerankadmin_until, Some(0));

    let resp = test::TestRequest::post()
        .uri("/upload/fakerankallowed")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!({"a@steam": true, "c@steam": false}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    assert!(store.player("a@steam").await.unwrap().fakerank_until.unwrap() >= now);
    assert!(store.player("c@steam").await.is_none());
}

#[actix_web::test]
async fn test_rejects_bad_token_and_bad_payloads() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    let resp = test::TestRequest::post()
        .uri("/upload/times")
        .set_json(json!({"a@steam": 1}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);

    let resp = test::TestRequest::post()
        .uri("/upload/times")
        .insert_header(("Authorization", "not-the-token"))
        .set_json(json!({"a@steam": 1}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);

    let resp = test::TestRequest::post()
        .uri("/upload/times")
        .insert_header(("Authorization", TOKEN))
        .set_payload("{not json")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid JSON");

    let resp = test::TestRequest::post()
        .uri("/upload/adrenaline")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!({"a@steam": 1, "b@steam": 2.5}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid value for key \"b@steam\": expected integer");

    // Validation runs before any write
    assert_eq!(store.player_count().await, 0);
}

#[actix_web::test]
async fn test_experience_endpoints() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    let resp = test::TestRequest::post()
        .uri("/upload/playerpoints")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!({"a@steam": 125}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = test::TestRequest::get()
        .uri("/experience?userId=a%40steam")
        .insert_header(("Authorization", TOKEN))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(test::read_body(resp).await, "125");

    let resp = test::TestRequest::get()
        .uri("/experience?userId=nobody")
        .insert_header(("Authorization", TOKEN))
        .send_request(&app)
        .await;
    assert_eq!(test::read_body(resp).await, "0");

    let resp = test::TestRequest::get()
        .uri("/experience")
        .insert_header(("Authorization", TOKEN))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    let resp = test::TestRequest::get()
        .uri("/public/experience?userId=a%40steam&userId=nobody")
        .insert_header(("Authorization", TOKEN))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([
        {"userId": "a@steam", "experience": 125},
        {"userId": "nobody", "experience": 0}
    ]));
}

#[actix_web::test]
async fn test_batch_experience_repeats_duplicate_ids() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    let resp = test::TestRequest::post()
        .uri("/upload/playerpoints")
        .insert_header(("Authorization", TOKEN))
        .set_json(json!({"a": 33}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = test::TestRequest::get()
        .uri("/public/experience?userId=a&userId=a")
        .insert_header(("Authorization", TOKEN))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([
        {"userId": "a", "experience": 33},
        {"userId": "a", "experience": 33}
    ]));
}

#[actix_web::test]
async fn test_counter_overflow_is_a_server_error() {
    let store = MemoryStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state_for(&store))
            .configure(routes::configure)
    ).await;

    let upload = || {
        test::TestRequest::post()
            .uri("/upload/times")
            .insert_header(("Authorization", TOKEN))
            .set_json(json!({"a": i64::MAX}))
    };

    let resp = upload().send_request(&app).await;
    assert_eq!(resp.status(), 200);

    let resp = upload().send_request(&app).await;
    assert_eq!(resp.status(), 500);
    assert_eq!(
        store.player("a").await.unwrap().counter(Counter::Playtime),
        i64::MAX
    );
}

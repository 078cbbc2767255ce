mod common;

use actix_web::{http::StatusCode, test, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::TcpListener;

use common::{bearer, register_and_login, test_app, test_state};

#[actix_rt::test]
async fn test_task_crud_is_scoped_to_owner() {
    let app = test::init_service(test_app(test_state())).await;
    let token_a = register_and_login(&app, "a@x.com", "pw1").await;
    let token_b = register_and_login(&app, "b@x.com", "pw2").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token_a))
        .set_json(json!({ "title": "T", "description": "D" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["title"], "T");
    assert_eq!(created["description"], "D");
    assert_eq!(created["completed"], false);
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/tasks/{}", id);

    // The owner can read it back.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&token_a))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // Anyone else gets 404 on every verb.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&token_b))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token_b))
        .set_json(json!({ "title": "X", "description": "Y", "completed": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token_b))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token_b))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));

    // Still intact for the owner.
    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token_a))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([created]));
}

#[actix_rt::test]
async fn test_update_and_delete() {
    let app = test::init_service(test_app(test_state())).await;
    let token = register_and_login(&app, "owner@x.com", "pw").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Learn Go", "description": "Study Go basics" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/tasks/{}", created["id"]);

    // Sending back the stored values changes nothing, timestamps included.
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Learn Go", "description": "Study Go basics", "completed": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let unchanged: Value = test::read_body_json(resp).await;
    assert_eq!(unchanged, created);

    actix_rt::time::sleep(std::time::Duration::from_millis(5)).await;

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Learn Rust", "description": "Study Rust basics", "completed": true }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Learn Rust");
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = test::read_body_json(resp).await;
    assert_eq!(deleted["id"], created["id"]);

    // Deleted tasks are gone for good.
    for req in [
        test::TestRequest::delete().uri(&uri),
        test::TestRequest::get().uri(&uri),
    ] {
        let resp = test::call_service(&app, req.insert_header(bearer(&token)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "T", "description": "D", "completed": false }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_invalid_task_payloads_and_ids() {
    let app = test::init_service(test_app(test_state())).await;
    let token = register_and_login(&app, "v@x.com", "pw").await;

    for payload in [
        json!({ "title": "", "description": "D" }),
        json!({ "title": "T", "description": "   " }),
        json!({ "description": "D" }),
        json!({ "title": "T", "description": "D", "completed": "yes" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
    }

    for raw in ["abc", "0", "-1"] {
        let uri = format!("/tasks/{}", raw);
        for req in [
            test::TestRequest::get().uri(&uri),
            test::TestRequest::delete().uri(&uri),
            test::TestRequest::put()
                .uri(&uri)
                .set_json(json!({ "title": "T", "description": "D" })),
        ] {
            let resp = test::call_service(&app, req.insert_header(bearer(&token)).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "id {}", raw);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Invalid Task ID");
        }
    }

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));
}

#[actix_rt::test]
async fn test_client_supplied_ids_are_ignored() {
    let app = test::init_service(test_app(test_state())).await;
    let _first = register_and_login(&app, "first@x.com", "pw").await;
    let token = register_and_login(&app, "second@x.com", "pw").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({
            "id": 999,
            "user_id": 1,
            "title": "T",
            "description": "D",
            "completed": true
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_ne!(created["id"], 999);
    assert_eq!(created["user_id"], 2);
    assert_eq!(created["completed"], true);
}

#[actix_rt::test]
async fn test_collection_served_with_trailing_slash() {
    let app = test::init_service(test_app(test_state())).await;
    let token = register_and_login(&app, "slash@x.com", "pw").await;

    let req = test::TestRequest::post()
        .uri("/tasks/")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "T", "description": "D" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::get()
        .uri("/tasks/")
        .insert_header(bearer(&token))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([created]));

    let req = test::TestRequest::get().uri("/tasks/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_token_for_missing_user_cannot_create() {
    let state = test_state();
    let app = test::init_service(test_app(state.clone())).await;
    let token = state.tokens.issue(999, "ghost@x.com").unwrap();

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "T", "description": "D" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User no longer exists");

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));
}

#[actix_rt::test]
async fn test_live_server_gates_tasks() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let state = test_state();

    let server = HttpServer::new(move || test_app(state.clone()))
        .workers(1)
        .shutdown_timeout(1)
        .listen(listener)
        .unwrap()
        .run();
    let handle = server.handle();
    actix_rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/tasks", addr))
        .json(&json!({ "title": "T", "description": "D" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "Status": "Ok" }));

    handle.stop(true).await;
}

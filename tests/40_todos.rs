mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn add_todo_with_defaults() -> Result<()> {
    let server = common::start_server().await?;
    let list = server.create("/lists", "alice", json!({"name": "Errands"})).await?;

    let (status, body) = server
        .post(&format!("/lists/{}/todos", list), "alice", json!({"title": "Buy milk"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);

    let todo = &body["data"];
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["is_completed"], false);
    assert_eq!(todo["priority"], 0);
    assert!(todo["description"].is_null());
    assert!(todo["due_date"].is_null());
    assert_eq!(todo["list_id"], list);
    assert_eq!(todo["user_id"], "alice");
    Ok(())
}

#[tokio::test]
async fn list_todos_only_returns_that_list() -> Result<()> {
    let server = common::start_server().await?;
    let a = server.create("/lists", "alice", json!({"name": "A"})).await?;
    let b = server.create("/lists", "alice", json!({"name": "B"})).await?;
    server.create(&format!("/lists/{}/todos", a), "alice", json!({"title": "one"})).await?;
    server.create(&format!("/lists/{}/todos", a), "alice", json!({"title": "two"})).await?;
    server.create(&format!("/lists/{}/todos", b), "alice", json!({"title": "three"})).await?;

    let (status, body) = server.get(&format!("/lists/{}/todos", a), "alice").await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body["data"].as_array().unwrap().iter().map(|t| t["title"].clone()).collect();
    assert_eq!(titles, vec![json!("one"), json!("two")]);
    Ok(())
}

#[tokio::test]
async fn replace_resets_omitted_fields() -> Result<()> {
    let server = common::start_server().await?;
    let list = server.create("/lists", "alice", json!({"name": "Work"})).await?;
    let id = server
        .create(
            &format!("/lists/{}/todos", list),
            "alice",
            json!({
                "title": "Report",
                "description": "quarterly",
                "is_completed": true,
                "due_date": "2024-05-01",
                "priority": 3
            }),
        )
        .await?;

    let (status, body) = server.put(&format!("/todos/{}", id), "alice", json!({"title": "Report v2"})).await?;
    assert_eq!(status, StatusCode::OK);
    let todo = &body["data"];
    assert_eq!(todo["title"], "Report v2");
    assert_eq!(todo["is_completed"], false);
    assert_eq!(todo["priority"], 0);
    assert!(todo["description"].is_null());
    assert!(todo["due_date"].is_null());
    assert_eq!(todo["list_id"], list, "replace must not move the todo");
    Ok(())
}

#[tokio::test]
async fn cannot_add_to_someone_elses_list() -> Result<()> {
    let server = common::start_server().await?;
    let bobs = server.create("/lists", "bob", json!({"name": "Bob's"})).await?;

    let (status, body) = server
        .post(&format!("/lists/{}/todos", bobs), "alice", json!({"title": "Sneak"}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo list not found");

    let (_, body) = server.get(&format!("/lists/{}/todos", bobs), "bob").await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn foreign_todos_are_not_found() -> Result<()> {
    let server = common::start_server().await?;
    let list = server.create("/lists", "alice", json!({"name": "Mine"})).await?;
    let id = server
        .create(&format!("/lists/{}/todos", list), "alice", json!({"title": "Secret"}))
        .await?;
    let path = format!("/todos/{}", id);

    let (status, body) = server.get(&path, "bob").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");
    let (status, _) = server.put(&path, "bob", json!({"title": "Mine now"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.delete(&path, "bob").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = server.get(&path, "alice").await?;
    assert_eq!(body["data"]["title"], "Secret");
    Ok(())
}

#[tokio::test]
async fn rejects_bad_todo_payloads() -> Result<()> {
    let server = common::start_server().await?;
    let list = server.create("/lists", "alice", json!({"name": "Work"})).await?;
    let path = format!("/lists/{}/todos", list);

    let (status, body) = server.post(&path, "alice", json!({"title": ""})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = server
        .post(&path, "alice", json!({"title": "Dated", "due_date": "next tuesday"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["due_date"].is_string(), "missing field error: {}", body);

    let (status, body) = server.post(&path, "alice", json!({"description": "no title"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (_, body) = server.get(&path, "alice").await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_todo() -> Result<()> {
    let server = common::start_server().await?;
    let list = server.create("/lists", "alice", json!({"name": "Work"})).await?;
    let id = server
        .create(&format!("/lists/{}/todos", list), "alice", json!({"title": "Done soon"}))
        .await?;

    let (status, _) = server.delete(&format!("/todos/{}", id), "alice").await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = server.get(&format!("/todos/{}", id), "alice").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

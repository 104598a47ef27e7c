#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use parley_api::AppStateInner;
use parley_db::{ChatStore, MemoryStore};

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: impl ChatStore + 'static) -> Self {
        Self {
            router: parley_api::router(AppStateInner::new(store)),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn create_channel(&self, id: &str, owner: &str, topic: &str) {
        let (status, body) = self
            .put("/channels", json!({ "id": id, "owner": owner, "topic": topic }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    pub async fn post_message(&self, channel_id: &str, author: &str, text: &str) {
        let (status, body) = self
            .put(
                &format!("/channels/{channel_id}/messages"),
                json!({ "author": author, "text": text }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    pub async fn members(&self, channel_id: &str) -> Vec<String> {
        let (status, body) = self.get(&format!("/channels/{channel_id}/members")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_value(body).unwrap()
    }

    pub async fn messages(&self, channel_id: &str, query: &str) -> Vec<Value> {
        let (status, body) = self
            .get(&format!("/channels/{channel_id}/messages{query}"))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_value(body).unwrap()
    }
}

pub fn channel_id() -> String {
    format!("C-{}", uuid::Uuid::new_v4().simple())
}

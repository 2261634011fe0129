//! Integration tests for the proxy server and the clients that talk to it.
//!
//! Each test spins up an Axum server on a random port with a stub LLM and
//! exercises the real REST contract, either with raw `reqwest` calls or
//! through the library's own HTTP transport and project client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use async_trait::async_trait;
use rust_decimal::Decimal;

use plan_builder::chat::{ChatReply, ChatSession, FileThreadStore, HttpTransport, MemoryThreadStore};
use plan_builder::error::LlmError;
use plan_builder::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use plan_builder::onboarding::{FormField, OnboardingSession, Step};
use plan_builder::projects::{HttpProjectApi, ProjectApi};
use plan_builder::proxy::{ChatLimits, ChatProxy, ProxyState, app_routes};
use plan_builder::store::{Database, LibSqlBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub LLM provider that answers with the last message it was given.
struct StubLlm;

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }
    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let last = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse {
            content: format!("stub reply to: {last}"),
            input_tokens: 12,
            output_tokens: 4,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }
}

/// LLM provider that always fails.
struct DownLlm;

#[async_trait]
impl LlmProvider for DownLlm {
    fn model_name(&self) -> &str {
        "down"
    }
    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::RequestFailed {
            provider: "down".into(),
            reason: "upstream unavailable".into(),
        })
    }
}

/// Start an Axum server on a random port, return (base_url, db).
async fn start_server(llm: Arc<dyn LlmProvider>) -> (String, Arc<dyn Database>) {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let limits = ChatLimits {
        max_message_chars: 2000,
        max_history_messages: 20,
        ..Default::default()
    };
    let chat = ChatProxy::new(Arc::clone(&db), llm, limits);
    let app = app_routes(ProxyState::new(Arc::clone(&db), chat, "stub"));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), db)
}

async fn post_json(url: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap()
}

// ── Chat proxy ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_opens_thread_then_reuses_it() {
    timeout(TEST_TIMEOUT, async {
        let (base, db) = start_server(Arc::new(StubLlm)).await;

        let resp = post_json(
            &format!("{base}/api/chat"),
            json!({ "messages": [{ "role": "user", "content": "hello" }] }),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let first: Value = resp.json().await.unwrap();
        assert_eq!(first["response"], "stub reply to: hello");
        let thread_id = first["threadId"].as_str().unwrap().to_string();

        let resp = post_json(
            &format!("{base}/api/chat"),
            json!({
                "messages": [{ "role": "user", "content": "again" }],
                "threadId": thread_id,
            }),
        )
        .await;
        let second: Value = resp.json().await.unwrap();
        assert_eq!(second["threadId"], thread_id.as_str());

        let stored = db.list_thread_messages(&thread_id, 50).await.unwrap();
        assert_eq!(stored.len(), 4);
        let cost = db.get_thread_cost(&thread_id).await.unwrap();
        assert_eq!(cost.call_count, 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_rejects_bad_requests() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;
        let url = format!("{base}/api/chat");

        for body in [
            json!({ "messages": [] }),
            json!({ "messages": [{ "role": "user", "content": "   " }] }),
            json!({ "messages": [{ "role": "user", "content": "x".repeat(2001) }] }),
        ] {
            let resp = post_json(&url, body).await;
            assert_eq!(resp.status(), 400);
            let json: Value = resp.json().await.unwrap();
            assert!(json["error"].as_str().is_some());
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_llm_failure_is_bad_gateway() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(DownLlm)).await;
        let resp = post_json(
            &format!("{base}/api/chat"),
            json!({ "messages": [{ "role": "user", "content": "hello" }] }),
        )
        .await;
        assert_eq!(resp.status(), 502);
        let json: Value = resp.json().await.unwrap();
        assert!(json["error"].as_str().unwrap().contains("upstream unavailable"));
    })
    .await
    .expect("test timed out");
}

// ── Assistants ───────────────────────────────────────────────────────

#[tokio::test]
async fn register_assistant_becomes_current() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;

        let resp = reqwest::get(format!("{base}/api/assistants/current")).await.unwrap();
        assert_eq!(resp.status(), 404);

        let resp = post_json(
            &format!("{base}/api/assistants"),
            json!({ "name": "Planner", "instructions": "Be brief." }),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let created: Value = resp.json().await.unwrap();
        let id = created["assistantId"].as_str().unwrap().to_string();
        assert!(id.starts_with("asst_"));

        let current: Value = reqwest::get(format!("{base}/api/assistants/current"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(current["id"], id.as_str());
        assert_eq!(current["name"], "Planner");
        assert_eq!(current["model"], "stub");
        assert_eq!(current["instructions"], "Be brief.");
    })
    .await
    .expect("test timed out");
}

// ── Projects ─────────────────────────────────────────────────────────

#[tokio::test]
async fn project_crud() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;
        let client = reqwest::Client::new();

        let resp = post_json(
            &format!("{base}/api/projects"),
            json!({ "name": "Acme Co", "goal": "Increase Sales" }),
        )
        .await;
        assert_eq!(resp.status(), 201);
        let created: Value = resp.json().await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["status"], "draft");

        let listed: Value = reqwest::get(format!("{base}/api/projects"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let resp = client
            .patch(format!("{base}/api/projects/{id}"))
            .json(&json!({ "status": "active", "industry": "Retail" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let updated: Value = resp.json().await.unwrap();
        assert_eq!(updated["status"], "active");
        assert_eq!(updated["industry"], "Retail");
        assert_eq!(updated["name"], "Acme Co");

        let fetched: Value = reqwest::get(format!("{base}/api/projects/{id}"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(fetched["status"], "active");

        let resp = client
            .delete(format!("{base}/api/projects/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);

        let resp = reqwest::get(format!("{base}/api/projects/{id}")).await.unwrap();
        assert_eq!(resp.status(), 404);
        let resp = client
            .delete(format!("{base}/api/projects/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn project_with_blank_name_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;
        let resp = post_json(&format!("{base}/api/projects"), json!({ "name": "  " })).await;
        assert_eq!(resp.status(), 400);
        let json: Value = resp.json().await.unwrap();
        assert!(json["error"].as_str().unwrap().contains("name"));
    })
    .await
    .expect("test timed out");
}

// ── Library clients against the live server ─────────────────────────

#[tokio::test]
async fn chat_session_keeps_thread_across_restarts() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;
        let tmp = tempfile::tempdir().unwrap();
        let store_path = tmp.path().join("session.json");

        let first_thread = {
            let session = ChatSession::open(
                Arc::new(HttpTransport::new(&base)),
                Arc::new(FileThreadStore::new(&store_path)),
                "plan_builder.thread_id",
            )
            .await;
            let reply = session.send_message("hello").await;
            assert_eq!(reply.text(), Some("stub reply to: hello"));
            session.thread().await.unwrap()
        };

        // A new session over the same file resumes the thread.
        let session = ChatSession::open(
            Arc::new(HttpTransport::new(&base)),
            Arc::new(FileThreadStore::new(&store_path)),
            "plan_builder.thread_id",
        )
        .await;
        assert_eq!(session.thread().await.as_ref(), Some(&first_thread));

        let reply = session.send_message("second").await;
        assert!(matches!(reply, ChatReply::Ok { .. }));
        assert_eq!(session.thread().await.as_ref(), Some(&first_thread));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_session_degrades_when_llm_is_down() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(DownLlm)).await;
        let session = ChatSession::open(
            Arc::new(HttpTransport::new(&base)),
            Arc::new(MemoryThreadStore::new()),
            "test",
        )
        .await;

        let reply = session.send_message("hello").await;
        assert!(reply.is_degraded());
        assert!(!reply.text().unwrap().is_empty());
        assert!(session.thread().await.is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn onboarding_submits_project_and_starts_chat() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server(Arc::new(StubLlm)).await;

        let chat = Arc::new(
            ChatSession::open(
                Arc::new(HttpTransport::new(&base)),
                Arc::new(MemoryThreadStore::new()),
                "test",
            )
            .await,
        );
        let api = Arc::new(HttpProjectApi::new(&base));
        let session = OnboardingSession::new(api.clone(), chat);

        assert!(session.advance().await);
        session.set_field(FormField::CompanyName, "Acme Co").await;
        assert!(session.advance().await);
        session.set_field(FormField::Website, "https://acme.co").await;
        for _ in 0..3 {
            assert!(session.advance().await);
        }
        session.set_field(FormField::Goal, "Increase Sales").await;
        assert!(session.advance().await);
        assert_eq!(session.current_step().await, Step::Summary);

        let outcome = session.submit().await.unwrap();
        assert_eq!(session.current_step().await, Step::Chat);
        let reply = outcome.opening_reply.text().unwrap();
        assert!(reply.starts_with("stub reply to: "));
        assert!(reply.contains("My company is Acme Co."));
        assert!(session.chat().thread().await.is_some());

        let project = api.get_project(outcome.project_id).await.unwrap().unwrap();
        assert_eq!(project.name, "Acme Co");
        assert_eq!(project.website, "https://acme.co");
        assert_eq!(project.goal, "Increase Sales");
    })
    .await
    .expect("test timed out");
}

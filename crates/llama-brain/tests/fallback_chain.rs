//! Fallback chain behaviour against a throwaway local engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use llama_brain::{
    Deadline, EngineStrategy, GenerationOptions, LlamaBrainConfig, LocalHttpBrain, ModelInvoker,
    ModelReply, Turn, ENGINE_ERROR_PREFIX,
};
use mock_brain::{DelayedBrain, EchoBrain, FailingBrain, ScriptedBrain};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct LocalEngine {
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/generate", addr)
}

async fn local_engine(reply: Value) -> (String, LocalEngine) {
    let state = LocalEngine::default();

    let app = Router::new()
        .route(
            "/generate",
            post(
                move |State(state): State<LocalEngine>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        state.hits.fetch_add(1, Ordering::SeqCst);
                        *state.last_body.lock().unwrap() = Some(body);
                        Json(reply)
                    }
                },
            ),
        )
        .with_state(state.clone());

    (serve(app).await, state)
}

fn local_brain(url: &str) -> Arc<LocalHttpBrain> {
    let config = LlamaBrainConfig::builder().local_url(url).build();
    Arc::new(LocalHttpBrain::new(&config).unwrap())
}

#[tokio::test]
async fn unavailable_primary_and_failing_fallback_yield_tagged_error() {
    let app = Router::new().route(
        "/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let url = serve(app).await;

    let primary = Arc::new(FailingBrain::new("engine not loaded"));
    let invoker = ModelInvoker::fallback_only(local_brain(&url)).with_primary(primary.clone());

    let reply = invoker.invoke("hello", GenerationOptions::default()).await;

    assert_eq!(primary.call_count(), 1);
    match reply {
        ModelReply::Failed(message) => {
            assert!(message.starts_with(ENGINE_ERROR_PREFIX));
            assert!(message.contains("500"));
            assert!(message.contains("model crashed"));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
}

#[tokio::test]
async fn fallback_receives_prompt_and_default_options() {
    let (url, engine) = local_engine(json!({"text": "مرحبا"})).await;
    let invoker = ModelInvoker::fallback_only(local_brain(&url));

    let reply = invoker
        .invoke("say hi", GenerationOptions::default().max_tokens(64))
        .await;

    assert_eq!(reply, ModelReply::Text("مرحبا".to_string()));
    let body = engine.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["prompt"], "say hi");
    assert_eq!(body["max_tokens"], 64);
    assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}

#[tokio::test]
async fn fallback_flattens_message_lists() {
    let (url, engine) = local_engine(json!({"output": "done"})).await;
    let invoker = ModelInvoker::fallback_only(local_brain(&url));

    let reply = invoker
        .invoke(
            vec![Turn::system("rules"), Turn::user("question")],
            GenerationOptions::default(),
        )
        .await;

    assert_eq!(reply.as_text(), Some("done"));
    let body = engine.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["prompt"], "system: rules\n\nuser: question");
}

#[tokio::test]
async fn unrecognised_payload_is_structured() {
    let (url, _engine) = local_engine(json!({"tokens": [1, 2]})).await;
    let invoker = ModelInvoker::fallback_only(local_brain(&url));

    let reply = invoker.invoke("x", GenerationOptions::default()).await;

    assert_eq!(reply, ModelReply::Structured(json!({"tokens": [1, 2]})));
}

#[tokio::test]
async fn primary_success_skips_fallback() {
    let (url, engine) = local_engine(json!({"text": "from fallback"})).await;
    let primary = Arc::new(ScriptedBrain::with_replies(["from primary"]));
    let invoker = ModelInvoker::fallback_only(local_brain(&url)).with_primary(primary.clone());

    assert_eq!(invoker.strategy(), EngineStrategy::PrimaryWithFallback);

    let reply = invoker.invoke("x", GenerationOptions::default()).await;

    assert_eq!(reply.as_text(), Some("from primary"));
    assert_eq!(primary.call_count(), 1);
    assert_eq!(engine.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deadline_bounds_the_whole_chain() {
    let primary = Arc::new(DelayedBrain::with_secs(EchoBrain::with_prefix("slow: "), 30));
    let fallback = Arc::new(EchoBrain::with_prefix("fast: "));
    let invoker = ModelInvoker::fallback_only(fallback).with_primary(primary);

    // The primary eats the whole deadline, so the fallback times out too
    let reply = invoker
        .invoke_until(
            "hi",
            GenerationOptions::default(),
            Deadline::after(Duration::from_millis(50)),
        )
        .await;

    assert!(reply.is_failed());
    assert!(reply.into_display().contains("timed out"));
}

#[tokio::test]
async fn expired_deadline_skips_the_engine() {
    let brain = Arc::new(ScriptedBrain::with_replies(["late answer"]));
    let invoker = ModelInvoker::fallback_only(brain.clone());

    let deadline = Deadline::after(Duration::from_millis(1));
    tokio::time::sleep(Duration::from_millis(20)).await;

    let reply = invoker
        .invoke_until("hi", GenerationOptions::default(), deadline)
        .await;

    assert!(reply.is_failed());
    assert!(reply.into_display().contains("timed out"));
    assert_eq!(brain.call_count(), 0);
}

#[tokio::test]
async fn failing_primary_uses_fallback() {
    let primary = Arc::new(FailingBrain::http(401, "bad key"));
    let fallback = Arc::new(EchoBrain::with_prefix("local: "));
    let invoker = ModelInvoker::fallback_only(fallback).with_primary(primary);

    let reply = invoker.invoke("hi", GenerationOptions::default()).await;

    assert_eq!(reply.as_text(), Some("local: hi"));
}

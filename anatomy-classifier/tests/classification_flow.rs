use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anatomy_adapters::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest,
    ModelAdapter,
};
use anatomy_classifier::{ComponentClassifier, PlaceholderClassifier};
use anatomy_primitives::{PlaceholderCategory, Position, Taxonomy};
use async_trait::async_trait;
use futures::stream;
use tokio::time::Instant;

/// Adapter that replays a fixed script, then repeats `fallback` forever.
struct ScriptedAdapter {
    metadata: AdapterMetadata,
    script: Mutex<VecDeque<AdapterResult<String>>>,
    fallback: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    fn new(script: Vec<AdapterResult<String>>, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            metadata: AdapterMetadata::new("test", "scripted"),
            script: Mutex::new(script.into()),
            fallback: fallback.to_owned(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn repeating(response: &str) -> Arc<Self> {
        Self::new(Vec::new(), response)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = request
            .messages()
            .iter()
            .map(|message| message.content().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        self.requests.lock().unwrap().push(content);

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()));
        let text = next?;
        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(text, true))
        })))
    }
}

fn ok(text: &str) -> AdapterResult<String> {
    Ok(text.to_owned())
}

fn components(adapter: &Arc<ScriptedAdapter>) -> ComponentClassifier {
    ComponentClassifier::new(
        Arc::clone(adapter) as Arc<dyn ModelAdapter>,
        Taxonomy::components(),
    )
}

const PROMPT: &str = "You are a travel agent. Plan a trip to {{city}} in JSON.";

#[tokio::test]
async fn unparseable_responses_exhaust_after_max_retries() {
    let adapter = ScriptedAdapter::repeating("Sorry, I cannot help with that.");
    let map = components(&adapter).classify(PROMPT).await;

    assert!(map.is_default());
    assert_eq!(map.len(), 8);
    assert_eq!(adapter.calls(), 3);
}

#[tokio::test]
async fn custom_retry_bound_is_respected() {
    let adapter = ScriptedAdapter::repeating("not json");
    let map = components(&adapter).with_max_retries(5).classify(PROMPT).await;

    assert!(map.is_default());
    assert_eq!(adapter.calls(), 5);
}

#[tokio::test]
async fn success_on_second_attempt_stops_retrying() {
    let adapter = ScriptedAdapter::new(
        vec![
            ok("garbage"),
            ok(r#"{"Profile/Role": "You are a travel agent.", "Directive": "Plan a trip."}"#),
        ],
        r#"{"others": "should never be requested"}"#,
    );
    let map = components(&adapter).classify(PROMPT).await;

    assert_eq!(adapter.calls(), 2);
    assert_eq!(map.get("profile/role"), Some("you are a travel agent."));
    assert_eq!(map.get("directive"), Some("plan a trip."));
    assert_eq!(map.get("others"), Some(""));
}

#[tokio::test]
async fn default_equivalent_responses_are_retried() {
    let adapter = ScriptedAdapter::new(
        vec![
            ok(r#"{"directive": "", "context": ""}"#),
            ok(r#"{"unrelated": "text"}"#),
            ok(r#"{"constraints": "Use JSON."}"#),
        ],
        "unused",
    );
    let map = components(&adapter).classify(PROMPT).await;

    assert_eq!(adapter.calls(), 3);
    assert_eq!(map.get("constraints"), Some("use json."));
}

#[tokio::test]
async fn transport_errors_retry_without_pausing() {
    let adapter = ScriptedAdapter::new(
        vec![
            Err(AdapterError::transport("connection reset")),
            ok(r#"{"directive": "plan"}"#),
        ],
        "unused",
    );
    let started = Instant::now();
    let map = components(&adapter).classify(PROMPT).await;

    assert_eq!(map.get("directive"), Some("plan"));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_pauses_for_advertised_time() {
    let adapter = ScriptedAdapter::new(
        vec![
            Err(AdapterError::rate_limited(
                "Rate limit reached. Please try again in 7.5s.",
                None,
            )),
            ok(r#"{"directive": "plan"}"#),
        ],
        "unused",
    );
    let started = Instant::now();
    let map = components(&adapter).classify(PROMPT).await;
    let elapsed = started.elapsed();

    assert_eq!(map.get("directive"), Some("plan"));
    assert!(elapsed >= Duration::from_millis(7500));
    assert!(elapsed < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_without_hint_uses_fallback_pause() {
    let adapter = ScriptedAdapter::new(
        vec![
            Err(AdapterError::Response {
                reason: "groq returned 429 Too Many Requests: slow down".into(),
            }),
            ok(r#"{"directive": "plan"}"#),
        ],
        "unused",
    );
    let started = Instant::now();
    let map = components(&adapter)
        .with_rate_limit_fallback(Duration::from_secs(30))
        .classify(PROMPT)
        .await;

    assert!(!map.is_default());
    assert!(started.elapsed() >= Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn no_pause_after_final_attempt() {
    let adapter = ScriptedAdapter::new(
        vec![Err(AdapterError::rate_limited("try again in 90s", None))],
        "unused",
    );
    let started = Instant::now();
    let map = components(&adapter).with_max_retries(1).classify(PROMPT).await;

    assert!(map.is_default());
    assert_eq!(adapter.calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(90));
}

#[tokio::test]
async fn component_request_carries_prompt_and_taxonomy() {
    let adapter = ScriptedAdapter::repeating(r#"{"directive": "plan"}"#);
    components(&adapter).classify(PROMPT).await;

    let requests = adapter.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains(PROMPT));
    assert!(requests[0].contains("\"output format/style\": \"\""));
}

#[tokio::test]
async fn component_classification_is_idempotent() {
    let adapter = ScriptedAdapter::repeating(
        r#"{"profile/role": "travel agent", "output format/style": "json"}"#,
    );
    let classifier = components(&adapter);

    let first = classifier.classify(PROMPT).await;
    let second = classifier.classify(PROMPT).await;
    assert_eq!(first, second);
    assert_eq!(first.get("output format/style"), Some("json"));
}

const TEMPLATE: &str = "Use {{chat_history}} to answer the question below.\n\
                        Document: {document}\n\
                        Answer carefully and cite sources where possible.\n\
                        Question: {{question}} PLACEHOLDER";

#[tokio::test]
async fn placeholders_are_classified_in_order() {
    let adapter = ScriptedAdapter::new(
        vec![
            ok("Contextual Information"),
            ok("knowledge input"),
            ok("**User Question**"),
            ok("a label that matches nothing in particular"),
        ],
        "Others",
    );
    let classifier = PlaceholderClassifier::new(Arc::clone(&adapter) as Arc<dyn ModelAdapter>);
    let records = classifier.identify(TEMPLATE).await;

    let summary: Vec<_> = records
        .iter()
        .map(|record| (record.placeholder(), record.category(), record.position()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                "{{chat_history}}",
                PlaceholderCategory::ContextualInformation,
                Position::Beginning
            ),
            ("{document}", PlaceholderCategory::KnowledgeInput, Position::Middle),
            ("{{question}}", PlaceholderCategory::UserQuestion, Position::End),
            ("PLACEHOLDER", PlaceholderCategory::Others, Position::End),
        ]
    );
    assert_eq!(adapter.calls(), 4);

    let requests = adapter.requests();
    assert!(requests[0].contains("'{{chat_history}}'"));
    assert!(requests[2].contains(TEMPLATE));
}

#[tokio::test]
async fn placeholder_failures_do_not_stop_the_batch() {
    let adapter = ScriptedAdapter::new(
        vec![
            Err(AdapterError::rate_limited("Rate limit reached", None)),
            ok("Metadata/Short Phrases"),
        ],
        "Others",
    );
    let classifier = PlaceholderClassifier::new(Arc::clone(&adapter) as Arc<dyn ModelAdapter>);
    let records = classifier.identify("Write about {topic} in {language}.").await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].category(), PlaceholderCategory::Others);
    assert_eq!(records[1].category(), PlaceholderCategory::Metadata);
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test]
async fn templates_without_placeholders_make_no_calls() {
    let adapter = ScriptedAdapter::repeating("User Question");
    let classifier = PlaceholderClassifier::new(Arc::clone(&adapter) as Arc<dyn ModelAdapter>);

    assert!(classifier.identify("Just a plain instruction.").await.is_empty());
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn placeholder_classification_is_idempotent() {
    let adapter = ScriptedAdapter::repeating("Knowledge Input");
    let classifier = PlaceholderClassifier::new(Arc::clone(&adapter) as Arc<dyn ModelAdapter>);

    let first = classifier.identify(TEMPLATE).await;
    let second = classifier.identify(TEMPLATE).await;
    assert_eq!(first, second);
}

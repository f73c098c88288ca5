#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end flow: config on disk, orchestrator wiring, a chat session and
// a scripted completion client standing in for the network

use std::sync::Mutex;
use tempfile::TempDir;

use vatika_support::commands::build_orchestrator_with;
use vatika_support::completion::{CompletionClient, CompletionRequest, EndpointError};
use vatika_support::config::Config;
use vatika_support::knowledge;
use vatika_support::prompt::{PromptAssembler, Role};
use vatika_support::retrieval::{CategoryMatchMode, Retriever, Tag};
use vatika_support::session::{ChatSession, QueryError};

/// Replays scripted answers and keeps every request it saw
struct ScriptedClient {
    answers: Mutex<Vec<Result<String, EndpointError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(answers: Vec<Result<String, EndpointError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("lock not poisoned").clone()
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError> {
        self.requests
            .lock()
            .expect("lock not poisoned")
            .push(request.clone());
        self.answers
            .lock()
            .expect("lock not poisoned")
            .pop()
            .unwrap_or(Err(EndpointError::EmptyResponse))
    }
}

fn saved_config(temp_dir: &TempDir, contents: &str) -> Config {
    std::fs::write(temp_dir.path().join("config.toml"), contents)
        .expect("should write config file");
    Config::load(temp_dir.path()).expect("config should load")
}

#[test]
fn chat_session_end_to_end() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = saved_config(
        &temp_dir,
        r#"
        [endpoint]
        model = "llama-3.1-8b-instant"
        max_tokens = 300

        [retrieval]
        history_window = 2
        "#,
    );

    let client = ScriptedClient::new(vec![
        Ok("We are Aarogya Vatika, part of Aumya Naturals.".to_string()),
        Err(EndpointError::Timeout),
        Ok("Ashoka Capsule is a good start.".to_string()),
    ]);
    let orchestrator = build_orchestrator_with(&config, client);
    let mut session = ChatSession::new();

    let first = session
        .ask(&orchestrator, "Tell me about the company")
        .expect("valid query");
    assert_eq!(first, "We are Aarogya Vatika, part of Aumya Naturals.");

    let faq = session
        .ask(&orchestrator, "Which payment options do you accept?")
        .expect("valid query");
    assert!(faq.starts_with("We accept Credit/Debit Cards"));

    let fallback = session
        .ask(&orchestrator, "Any advice for my digestion?")
        .expect("valid query");
    assert!(fallback.contains("+91-9910474566"));
    assert!(fallback.ends_with("Error: Request timed out"));

    let last = session
        .ask(&orchestrator, "Which product for women's health?")
        .expect("valid query");
    assert_eq!(last, "Ashoka Capsule is a good start.");

    assert_eq!(session.history().len(), 8);

    let requests = orchestrator.client().requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.model == "llama-3.1-8b-instant"));
    assert!(requests.iter().all(|r| r.max_tokens == 300));

    // history_window = 2: system, two prior turns, query
    let final_request = requests.last().expect("three requests");
    assert_eq!(final_request.messages.len(), 4);
    assert_eq!(final_request.messages[1].role, Role::User);
    assert_eq!(
        final_request.messages[1].content,
        "Any advice for my digestion?"
    );
    assert_eq!(final_request.messages[2].role, Role::Assistant);
    assert!(final_request.messages[2].content.starts_with("I apologize"));
    assert!(
        final_request.messages[0]
            .content
            .contains("Wellness Category - Womens Health: Hormonal balance, menstrual care")
    );
}

#[test]
fn invalid_queries_never_reach_endpoint() {
    let orchestrator = build_orchestrator_with(&Config::default(), ScriptedClient::new(vec![]));
    let mut session = ChatSession::new();

    assert_eq!(session.ask(&orchestrator, ""), Err(QueryError::Empty));
    assert_eq!(
        session.ask(&orchestrator, &"?".repeat(600)),
        Err(QueryError::TooLong(600))
    );
    assert!(session.history().is_empty());
    assert!(orchestrator.client().requests().is_empty());
}

#[test]
fn last_wins_config_narrows_category_context() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = saved_config(
        &temp_dir,
        "[retrieval]\ncategory_match = \"last_wins\"\n",
    );
    assert_eq!(config.retrieval.category_match, CategoryMatchMode::LastWins);

    let orchestrator = build_orchestrator_with(
        &config,
        ScriptedClient::new(vec![Ok("ok".to_string())]),
    );
    orchestrator.respond("stress and skin health for my heart", &[]);

    let requests = orchestrator.client().requests();
    let system = &requests[0].messages[0].content;
    assert_eq!(system.matches("Health Category - ").count(), 1);
    assert!(system.contains("Health Category - Mood Stress"));
    assert_eq!(system.matches("Wellness Category - ").count(), 1);
    assert!(system.contains("Wellness Category - Gut Health"));
}

#[test]
fn retrieval_is_idempotent_and_shares_document() {
    let retriever = Retriever::new(knowledge::load());
    let query = "How much does delivery cost for a product? Call me at your phone";

    let first = retriever.match_sections(query);
    let second = retriever.match_sections(query);

    assert_eq!(first.tags(), second.tags());
    assert!(first.contains(Tag::Products));
    assert!(first.contains(Tag::Categories));
    assert!(first.contains(Tag::Shipping));
    assert!(first.contains(Tag::Contact));

    let assembler = PromptAssembler::default();
    assert_eq!(
        assembler.render_context(&first),
        assembler.render_context(&second)
    );

    assert!(std::sync::Arc::ptr_eq(&knowledge::load(), &knowledge::load()));
}

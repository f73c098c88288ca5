use super::*;
use crate::prompt::ChatMessage;

fn sample_request() -> CompletionRequest {
    CompletionRequest {
        model: DEFAULT_MODEL.to_string(),
        messages: vec![
            ChatMessage::system("persona"),
            ChatMessage::user("Do you ship to Pune?"),
        ],
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
        stream: false,
    }
}

#[test]
fn client_targets_chat_completions() {
    let client = HttpCompletionClient::new(&EndpointConfig::default(), Some("key".to_string()))
        .expect("default endpoint is valid");

    assert_eq!(
        client.completions_url().as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
    assert!(client.has_api_key());
}

#[test]
fn invalid_base_url_is_rejected() {
    let config = EndpointConfig {
        base_url: "not a url".to_string(),
        ..EndpointConfig::default()
    };

    assert!(matches!(
        HttpCompletionClient::new(&config, None),
        Err(ConfigError::InvalidUrl(_))
    ));
}

#[test]
fn missing_api_key_fails_without_network() {
    let client = HttpCompletionClient::new(&EndpointConfig::default(), None)
        .expect("default endpoint is valid");
    assert!(!client.has_api_key());

    let result = client.complete(&sample_request());
    assert!(matches!(
        result,
        Err(EndpointError::MissingApiKey(ref var)) if var == "GROQ_API_KEY"
    ));
}

#[test]
fn blank_api_key_counts_as_missing() {
    let client = HttpCompletionClient::new(&EndpointConfig::default(), Some("   ".to_string()))
        .expect("default endpoint is valid");

    assert!(!client.has_api_key());
}

#[test]
fn request_serializes_openai_shape() {
    let json = serde_json::to_value(sample_request()).expect("request should serialize");

    assert_eq!(json["model"], "llama-3.3-70b-versatile");
    assert_eq!(json["max_tokens"], 1024);
    assert_eq!(json["stream"], false);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["role"], "user");
    assert_eq!(json["messages"][1]["content"], "Do you ship to Pune?");

    let temperature = json["temperature"].as_f64().expect("temperature is a number");
    assert!((temperature - 0.3).abs() < 1e-6);
}

#[test]
fn status_codes_map_to_typed_errors() {
    assert!(matches!(
        EndpointError::from(ureq::Error::StatusCode(401)),
        EndpointError::Unauthorized(401)
    ));
    assert!(matches!(
        EndpointError::from(ureq::Error::StatusCode(403)),
        EndpointError::Unauthorized(403)
    ));
    assert!(matches!(
        EndpointError::from(ureq::Error::StatusCode(429)),
        EndpointError::RateLimited
    ));
    assert!(matches!(
        EndpointError::from(ureq::Error::StatusCode(503)),
        EndpointError::Status(503)
    ));
    assert!(matches!(
        EndpointError::from(ureq::Error::Timeout(ureq::Timeout::Global)),
        EndpointError::Timeout
    ));
}

#[test]
fn parse_returns_first_choice_verbatim() {
    let body = r#"{
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "  Namaste! How can I help?\n"}},
            {"index": 1, "message": {"role": "assistant", "content": "second"}}
        ],
        "usage": {"total_tokens": 12}
    }"#;

    assert_eq!(
        parse_completion(body).expect("body is valid"),
        "  Namaste! How can I help?\n"
    );
}

#[test]
fn parse_rejects_empty_choices() {
    assert!(matches!(
        parse_completion(r#"{"choices": []}"#),
        Err(EndpointError::EmptyResponse)
    ));
    assert!(matches!(
        parse_completion(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#),
        Err(EndpointError::EmptyResponse)
    ));
}

#[test]
fn parse_rejects_malformed_body() {
    assert!(matches!(
        parse_completion("<html>bad gateway</html>"),
        Err(EndpointError::MalformedResponse(_))
    ));
    assert!(matches!(
        parse_completion(r#"{"error": {"message": "nope"}}"#),
        Err(EndpointError::MalformedResponse(_))
    ));
}

#[test]
fn boxed_and_borrowed_clients_delegate() {
    struct Echo;

    impl CompletionClient for Echo {
        fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError> {
            Ok(request.messages.len().to_string())
        }
    }

    let boxed: Box<dyn CompletionClient> = Box::new(Echo);
    assert_eq!(boxed.complete(&sample_request()).expect("echo"), "2");

    let echo = Echo;
    let borrowed = &echo;
    assert_eq!(
        CompletionClient::complete(&borrowed, &sample_request()).expect("echo"),
        "2"
    );
}

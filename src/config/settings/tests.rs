use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.endpoint.base_url, "https://api.groq.com/openai/v1");
    assert_eq!(config.endpoint.model, "llama-3.3-70b-versatile");
    assert_eq!(config.endpoint.max_tokens, 1024);
    assert!((config.endpoint.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.endpoint.timeout_seconds, 30);
    assert_eq!(config.endpoint.api_key_env, "GROQ_API_KEY");
    assert_eq!(config.retrieval.category_match, CategoryMatchMode::Accumulate);
    assert_eq!(config.retrieval.history_window, 6);
    assert_eq!(config.retrieval.product_limit, 5);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.endpoint.base_url = "ftp://example.com".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.endpoint.base_url = "not a url".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.endpoint.model = "  ".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.endpoint.max_tokens = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.endpoint.temperature = 2.5;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.endpoint.timeout_seconds = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.endpoint.api_key_env = "A=B".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.retrieval.history_window = 51;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.retrieval.product_limit = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn completions_url_generation() {
    let mut endpoint = EndpointConfig::default();
    assert_eq!(
        endpoint
            .completions_url()
            .expect("default url is valid")
            .as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );

    endpoint.base_url = "http://localhost:8080/v1/".to_string();
    assert_eq!(
        endpoint
            .completions_url()
            .expect("local url is valid")
            .as_str(),
        "http://localhost:8080/v1/chat/completions"
    );

    endpoint.base_url = "http://127.0.0.1:9000".to_string();
    assert_eq!(
        endpoint
            .completions_url()
            .expect("bare host is valid")
            .as_str(),
        "http://127.0.0.1:9000/chat/completions"
    );
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("config should serialize");
    assert!(toml_str.contains("[endpoint]"));
    assert!(toml_str.contains("[retrieval]"));
    assert!(toml_str.contains("category_match = \"accumulate\""));

    let parsed: Config = toml::from_str(&toml_str).expect("config should parse");
    assert_eq!(config, parsed);
}

#[test]
fn partial_toml_uses_defaults() {
    let parsed: Config = toml::from_str(
        r#"
        [endpoint]
        model = "llama-3.1-8b-instant"

        [retrieval]
        category_match = "last_wins"
        "#,
    )
    .expect("partial config should parse");

    assert_eq!(parsed.endpoint.model, "llama-3.1-8b-instant");
    assert_eq!(parsed.endpoint.max_tokens, 1024);
    assert_eq!(parsed.retrieval.category_match, CategoryMatchMode::LastWins);
    assert_eq!(parsed.retrieval.history_window, 6);
}

#[test]
fn setter_validation() {
    let mut endpoint = EndpointConfig::default();

    assert!(
        endpoint
            .set_base_url("http://localhost:11434/v1".to_string())
            .is_ok()
    );
    assert_eq!(endpoint.base_url, "http://localhost:11434/v1");
    assert!(endpoint.set_base_url("file:///tmp".to_string()).is_err());
    assert_eq!(endpoint.base_url, "http://localhost:11434/v1");

    assert!(endpoint.set_model("mixtral".to_string()).is_ok());
    assert!(endpoint.set_model(String::new()).is_err());
    assert_eq!(endpoint.model, "mixtral");

    assert!(endpoint.set_max_tokens(8192).is_ok());
    assert!(endpoint.set_max_tokens(8193).is_err());

    assert!(endpoint.set_temperature(0.0).is_ok());
    assert!(endpoint.set_temperature(-0.1).is_err());

    assert!(endpoint.set_timeout_seconds(300).is_ok());
    assert!(endpoint.set_timeout_seconds(301).is_err());

    assert!(endpoint.set_api_key_env("MY_KEY".to_string()).is_ok());
    assert!(endpoint.set_api_key_env(" ".to_string()).is_err());
    assert_eq!(endpoint.api_key_env, "MY_KEY");

    let mut retrieval = RetrievalConfig::default();
    assert!(retrieval.set_history_window(0).is_ok());
    assert!(retrieval.set_history_window(51).is_err());
    assert_eq!(retrieval.history_window, 0);
    assert!(retrieval.set_product_limit(50).is_ok());
    assert!(retrieval.set_product_limit(0).is_err());
    assert_eq!(retrieval.product_limit, 50);
}

#[test]
fn load_missing_config() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = Config::load(temp_dir.path()).expect("missing file falls back to defaults");

    assert_eq!(config.endpoint, EndpointConfig::default());
    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert_eq!(config.config_file_path(), temp_dir.path().join("config.toml"));
}

#[test]
fn save_and_reload() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_dir = temp_dir.path().join(".vatika-support");

    let mut config = Config::load(&config_dir).expect("defaults load");
    config
        .endpoint
        .set_model("llama-3.1-8b-instant".to_string())
        .expect("model is valid");
    config
        .retrieval
        .set_history_window(4)
        .expect("window is valid");
    config.save().expect("config should save");

    assert!(config_dir.join("config.toml").exists());

    let reloaded = Config::load(&config_dir).expect("saved config reloads");
    assert_eq!(reloaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[endpoint]\ntemperature = 9.0\n",
    )
    .expect("should write config file");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn save_refuses_invalid_config() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let mut config = Config::load(temp_dir.path()).expect("defaults load");
    config.endpoint.max_tokens = 0;

    assert!(config.save().is_err());
    assert!(!temp_dir.path().join("config.toml").exists());
}


use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use tracing::{info, warn};

use crate::completion::{CompletionClient, HttpCompletionClient};
use crate::config::Config;
use crate::knowledge::{self, KnowledgeDocument, SECTION_NAMES};
use crate::orchestrator::{CompletionSettings, ResponseOrchestrator};
use crate::prompt::PromptAssembler;
use crate::retrieval::{FAQ_TABLE, FaqTrigger, Retriever};
use crate::session::{ChatSession, SAMPLE_QUESTIONS, WELCOME_MESSAGE, validate_query};

/// Wire the knowledge document, retrieval tuning and `client` together.
#[inline]
pub fn build_orchestrator_with<C: CompletionClient>(
    config: &Config,
    client: C,
) -> ResponseOrchestrator<C> {
    let retriever =
        Retriever::new(knowledge::load()).with_category_mode(config.retrieval.category_match);
    let assembler = PromptAssembler::default()
        .with_history_window(config.retrieval.history_window)
        .with_product_limit(config.retrieval.product_limit);

    ResponseOrchestrator::new(
        retriever,
        assembler,
        client,
        CompletionSettings::from(&config.endpoint),
    )
}

/// Build the production orchestrator, taking the API key from the
/// environment variable named in the endpoint config.
#[inline]
pub fn build_orchestrator(config: &Config) -> Result<ResponseOrchestrator<HttpCompletionClient>> {
    let api_key = std::env::var(&config.endpoint.api_key_env).ok();
    if api_key.is_none() {
        warn!(
            "{} is not set; only FAQ questions can be answered",
            config.endpoint.api_key_env
        );
    }

    let client = HttpCompletionClient::new(&config.endpoint, api_key)
        .context("Invalid completion endpoint configuration")?;
    info!("Using completion endpoint {}", client.completions_url());

    Ok(build_orchestrator_with(config, client))
}

/// Interactive chat loop
#[inline]
pub fn chat(config: &Config) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let mut session = ChatSession::new();

    println!("{}", style("🪷 Aarogya Vatika Customer Support").bold().green());
    println!();
    println!("{WELCOME_MESSAGE}");
    print_sample_questions();

    loop {
        let line: String = Input::new()
            .with_prompt("💬 You")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("{}", style("Conversation cleared.").dim());
                print_sample_questions();
                continue;
            }
            _ => {}
        }

        match session.ask(&orchestrator, &line) {
            Ok(answer) => {
                println!();
                println!("{} {}", style("🪷").green(), answer);
                println!();
            }
            Err(e) => println!("{}", style(e).yellow()),
        }
    }

    Ok(())
}

/// Answer a single question with no prior history
#[inline]
pub fn ask(config: &Config, query: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    println!("{}", answer_once(&orchestrator, query)?);
    Ok(())
}

#[inline]
pub fn answer_once<C: CompletionClient>(
    orchestrator: &ResponseOrchestrator<C>,
    query: &str,
) -> Result<String> {
    let query = validate_query(query)?;
    Ok(orchestrator.respond(query, &[]))
}

/// Print the scripted answers in the order they are tried
#[inline]
pub fn list_faq() {
    for line in faq_lines() {
        println!("{line}");
    }
}

#[inline]
pub fn faq_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(FAQ_TABLE.len() * 3);

    for (index, entry) in FAQ_TABLE.iter().enumerate() {
        let trigger = match entry.trigger {
            FaqTrigger::All(words) => format!("all of: {}", words.join(", ")),
            FaqTrigger::Any(words) => format!("any of: {}", words.join(", ")),
        };
        lines.push(format!("{}. {} ({})", index + 1, entry.topic, trigger));
        lines.push(format!("   {}", entry.answer));
        lines.push(String::new());
    }

    lines.pop();
    lines
}

/// Print one knowledge section as JSON, or the section names
#[inline]
pub fn show_knowledge(section: Option<&str>) -> crate::Result<()> {
    let document = knowledge::load();

    match section {
        Some(name) => println!("{}", render_section(&document, name)?),
        None => {
            println!("Knowledge base sections (version {}):", document.version());
            for name in SECTION_NAMES {
                println!("  {name}");
            }
        }
    }

    Ok(())
}

#[inline]
pub fn render_section(document: &KnowledgeDocument, name: &str) -> crate::Result<String> {
    let section = document.section(name)?;
    serde_json::to_string_pretty(&section)
        .map_err(|e| crate::SupportError::Knowledge(format!("Failed to render {name}: {e}")))
}

fn print_sample_questions() {
    println!();
    println!("{}", style("🤔 Common Questions").bold().green());
    for question in SAMPLE_QUESTIONS {
        println!("  • {question}");
    }
    println!(
        "{}",
        style("Type /clear to start over or /quit to leave.").dim()
    );
    println!();
}

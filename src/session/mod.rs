//! Conversation state for the interactive front end
//!
//! The core never stores history. A [`ChatSession`] owns it, validates each
//! query before it reaches the orchestrator and records both sides of the
//! exchange afterwards.


use thiserror::Error;
use tracing::debug;

use crate::completion::CompletionClient;
use crate::orchestrator::ResponseOrchestrator;
use crate::prompt::ConversationTurn;

/// Longest accepted query, in characters
pub const MAX_QUERY_CHARS: usize = 500;

pub const WELCOME_MESSAGE: &str = "\
Welcome to Aarogya Vatika! 🌿

I'm here to help you with:
• Product information and recommendations
• Shipping and delivery details
• Return and refund policies
• Ayurvedic wellness guidance
• General store information

How can I assist you today?";

/// Shown while the conversation is still empty
pub const SAMPLE_QUESTIONS: [&str; 3] = [
    "What products do you offer?",
    "What are your shipping and delivery policies?",
    "What is your return and refund policy?",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Please enter a question")]
    Empty,
    #[error("Question is too long ({0} characters, maximum is {MAX_QUERY_CHARS})")]
    TooLong(usize),
}

/// Accept `query` if it has visible content and fits the length limit.
#[inline]
pub fn validate_query(query: &str) -> Result<&str, QueryError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Empty);
    }

    let length = query.chars().count();
    if length > MAX_QUERY_CHARS {
        return Err(QueryError::TooLong(length));
    }

    Ok(trimmed)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    history: Vec<ConversationTurn>,
}

impl ChatSession {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Answer `query` against the turns so far, then record the exchange.
    ///
    /// Rejected queries leave the history untouched.
    #[inline]
    pub fn ask<C: CompletionClient>(
        &mut self,
        orchestrator: &ResponseOrchestrator<C>,
        query: &str,
    ) -> Result<String, QueryError> {
        let query = validate_query(query)?;

        let answer = orchestrator.respond(query, &self.history);

        self.history.push(ConversationTurn::user(query));
        self.history.push(ConversationTurn::assistant(answer.clone()));
        debug!("Session history now holds {} turns", self.history.len());

        Ok(answer)
    }
}

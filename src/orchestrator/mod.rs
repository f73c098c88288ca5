//! Per-query control flow: scripted FAQ answers first, then retrieval,
//! prompt assembly and one completion call.


use tracing::{debug, info, warn};

use crate::completion::{
    CompletionClient, CompletionRequest, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    EndpointError,
};
use crate::config::EndpointConfig;
use crate::knowledge::ContactInfo;
use crate::prompt::{ConversationTurn, PromptAssembler};
use crate::retrieval::Retriever;

/// Model parameters copied into every completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    #[inline]
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl From<&EndpointConfig> for CompletionSettings {
    #[inline]
    fn from(config: &EndpointConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Where an answer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Faq(&'static str),
    Completion(String),
}

impl Reply {
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            Self::Faq(answer) => answer,
            Self::Completion(text) => text,
        }
    }

    #[inline]
    pub fn into_text(self) -> String {
        match self {
            Self::Faq(answer) => answer.to_string(),
            Self::Completion(text) => text,
        }
    }

    #[inline]
    pub fn is_faq(&self) -> bool {
        matches!(self, Self::Faq(_))
    }
}

#[derive(Debug)]
pub struct ResponseOrchestrator<C> {
    retriever: Retriever,
    assembler: PromptAssembler,
    client: C,
    settings: CompletionSettings,
}

impl<C: CompletionClient> ResponseOrchestrator<C> {
    #[inline]
    pub fn new(
        retriever: Retriever,
        assembler: PromptAssembler,
        client: C,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            retriever,
            assembler,
            client,
            settings,
        }
    }

    #[inline]
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    #[inline]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[inline]
    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Answer `query`, surfacing endpoint failures to the caller.
    ///
    /// FAQ hits never touch `history` or the network.
    #[inline]
    pub fn try_respond(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<Reply, EndpointError> {
        if let Some(answer) = self.retriever.match_faq(query) {
            info!("Answered from FAQ table");
            return Ok(Reply::Faq(answer));
        }

        let retrieval = self.retriever.match_sections(query);
        let messages = self.assembler.build_messages(&retrieval, history, query);

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream: false,
        };

        let text = self.client.complete(&request)?;
        debug!("Completion succeeded (length: {})", text.len());
        Ok(Reply::Completion(text))
    }

    /// Answer `query`. Endpoint failures become an apology that points the
    /// customer at the support phone and email.
    #[inline]
    pub fn respond(&self, query: &str, history: &[ConversationTurn]) -> String {
        match self.try_respond(query, history) {
            Ok(reply) => reply.into_text(),
            Err(e) => {
                warn!("Falling back to support contact message: {}", e);
                fallback_message(self.retriever.document().contact(), &e)
            }
        }
    }
}

#[inline]
pub fn fallback_message(contact: &ContactInfo, error: &EndpointError) -> String {
    format!(
        "I apologize, but I'm having trouble processing your request right now. \
         Please contact our customer service team at {} or {} for immediate assistance. \
         Error: {}",
        contact.phone, contact.email, error
    )
}

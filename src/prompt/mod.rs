//! Prompt assembly
//!
//! Turns a [`RetrievalResult`] into a flat context block and wraps it, the
//! persona, a window of recent history and the current query into the
//! message list sent to the completion endpoint.


pub mod message;

pub use message::{ChatMessage, ConversationTurn, Role, Speaker};

use itertools::Itertools;
use tracing::debug;

use crate::retrieval::{RetrievalResult, Tag};

/// Store persona used as the system instruction
pub const DEFAULT_PERSONA: &str = include_str!("../../data/persona.md");
pub const CONTEXT_HEADER: &str = "Relevant Information:";
pub const NO_INFORMATION_PLACEHOLDER: &str = "No specific information found in knowledge base.";
pub const DEFAULT_HISTORY_WINDOW: usize = 6;
pub const DEFAULT_PRODUCT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAssembler {
    persona: String,
    history_window: usize,
    product_limit: usize,
}

impl Default for PromptAssembler {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}

impl PromptAssembler {
    #[inline]
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            history_window: DEFAULT_HISTORY_WINDOW,
            product_limit: DEFAULT_PRODUCT_LIMIT,
        }
    }

    /// Number of most recent history turns forwarded to the model
    #[inline]
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    /// Number of featured products rendered into the context
    #[inline]
    pub fn with_product_limit(mut self, products: usize) -> Self {
        self.product_limit = products;
        self
    }

    #[inline]
    pub fn persona(&self) -> &str {
        &self.persona
    }

    #[inline]
    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Assemble the full request: system prompt with context, recent history,
    /// then the query as the final user message.
    #[inline]
    pub fn build_messages(
        &self,
        retrieval: &RetrievalResult<'_>,
        history: &[ConversationTurn],
        query: &str,
    ) -> Vec<ChatMessage> {
        let recent = &history[history.len().saturating_sub(self.history_window)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt(retrieval)));
        messages.extend(recent.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(query));

        debug!(
            "Assembled {} messages ({} of {} history turns)",
            messages.len(),
            recent.len(),
            history.len()
        );

        messages
    }

    #[inline]
    pub fn system_prompt(&self, retrieval: &RetrievalResult<'_>) -> String {
        format!(
            "{}\n\n{}\n{}",
            self.persona.trim_end(),
            CONTEXT_HEADER,
            self.render_context(retrieval)
        )
    }

    /// Render retrieved sections one tag after another in [`Tag::ALL`] order.
    #[inline]
    pub fn render_context(&self, retrieval: &RetrievalResult<'_>) -> String {
        if retrieval.is_empty() {
            return NO_INFORMATION_PLACEHOLDER.to_string();
        }

        let mut lines = Vec::new();
        for tag in retrieval.tags() {
            self.render_tag(tag, retrieval, &mut lines);
        }
        lines.join("\n")
    }

    fn render_tag(&self, tag: Tag, retrieval: &RetrievalResult<'_>, lines: &mut Vec<String>) {
        match tag {
            Tag::Company => {
                if let Some(company) = retrieval.company() {
                    lines.push(format!("Company: {} - {}", company.name, company.tagline));
                    lines.push(format!("Legacy: {}", company.legacy));
                    lines.push(format!("Products: {}", company.products_count));
                    lines.push(format!("Community: {}", company.community));
                    lines.push(format!(
                        "Contact: {}, {}",
                        company.contact.phone, company.contact.email
                    ));
                    lines.push(format!("Address: {}", company.contact.address));
                }
            }
            Tag::Products => {
                if let Some(products) = retrieval.products() {
                    lines.push("Featured Products:".to_string());
                    lines.extend(
                        products
                            .iter()
                            .take(self.product_limit)
                            .map(|p| format!("- {} by {}: {}", p.name, p.vendor, p.price)),
                    );
                }
            }
            Tag::Categories => {
                if let Some(categories) = retrieval.categories() {
                    lines.push("Wellness Categories:".to_string());
                    lines.extend(categories.iter().map(|c| {
                        format!("- {}: {}", title_case(&c.key), c.description)
                    }));
                }
            }
            Tag::Shipping => {
                if let Some(shipping) = retrieval.shipping() {
                    lines.push("Shipping & Delivery:".to_string());
                    lines.push(format!("- Processing: {}", shipping.processing_time));
                    lines.push(format!("- Delivery: {}", shipping.delivery_time));
                    lines.push(format!("- Coverage: {}", shipping.coverage));
                    lines.push(format!("- Free shipping: {}", shipping.free_shipping));
                    lines.push(format!("- Charges: {}", shipping.shipping_charges));
                }
            }
            Tag::Payment => {
                if let Some(methods) = retrieval.payment() {
                    lines.push(format!("Payment Methods: {}", methods.join(", ")));
                }
            }
            Tag::Returns => {
                if let Some(policy) = retrieval.returns() {
                    lines.push(format!("Return Policy: {}", policy.general));
                    lines.push(format!("Exceptions: {}", policy.exceptions.join(", ")));
                    lines.push(format!("Refund Processing: {}", policy.refund_processing));
                }
            }
            Tag::Contact => {
                // Company lines already carry the contact details
                if let (None, Some(contact)) = (retrieval.company(), retrieval.contact()) {
                    lines.push(format!("Contact: {}, {}", contact.phone, contact.email));
                    lines.push(format!("Address: {}", contact.address));
                }
            }
            Tag::HealthCategory => {
                lines.extend(retrieval.health_categories().iter().map(|c| {
                    format!(
                        "Health Category - {}: {}",
                        title_case(&c.key),
                        c.description
                    )
                }));
            }
            Tag::WellnessCategory => {
                lines.extend(retrieval.wellness_categories().iter().map(|c| {
                    format!(
                        "Wellness Category - {}: {}",
                        title_case(&c.key),
                        c.description
                    )
                }));
            }
        }
    }
}

/// `womens_health` -> `Womens Health`
#[inline]
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .join(" ")
}

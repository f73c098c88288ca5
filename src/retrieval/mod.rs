//! Keyword retrieval over the knowledge document
//!
//! Two independent lookups run against a lowercased query:
//!
//! - [`FAQ_TABLE`], an ordered list of scripted answers where the first hit wins
//! - [`SECTION_TRIGGERS`] plus the two category tables, which select the
//!   sections that are rendered into the model's context
//!
//! Matching is plain case-insensitive substring search. There is no scoring.


use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::knowledge::{
    CategoryEntry, CompanyInfo, ContactInfo, KnowledgeDocument, Product, ReturnPolicy,
    ShippingPolicy,
};

/// Topic tags a [`RetrievalResult`] can carry, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Company,
    Products,
    Categories,
    Shipping,
    Payment,
    Returns,
    Contact,
    HealthCategory,
    WellnessCategory,
}

impl Tag {
    pub const ALL: [Self; 9] = [
        Self::Company,
        Self::Products,
        Self::Categories,
        Self::Shipping,
        Self::Payment,
        Self::Returns,
        Self::Contact,
        Self::HealthCategory,
        Self::WellnessCategory,
    ];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company_info",
            Self::Products => "featured_products",
            Self::Categories => "wellness_categories",
            Self::Shipping => "shipping_delivery",
            Self::Payment => "payment_methods",
            Self::Returns => "return_policy",
            Self::Contact => "contact",
            Self::HealthCategory => "health_category",
            Self::WellnessCategory => "wellness_category",
        }
    }
}

impl fmt::Display for Tag {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hits inside one category table are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMatchMode {
    /// Keep every matching entry, in table order
    #[default]
    Accumulate,
    /// Keep only the last matching entry of each table
    LastWins,
}

/// Keywords that pull one or more sections into the context
#[derive(Debug, Clone, Copy)]
pub struct TriggerSet {
    pub words: &'static [&'static str],
    pub tags: &'static [Tag],
}

impl TriggerSet {
    #[inline]
    pub fn matches(&self, query_lower: &str) -> bool {
        self.words.iter().any(|word| query_lower.contains(word))
    }
}

pub const SECTION_TRIGGERS: [TriggerSet; 6] = [
    TriggerSet {
        words: &["company", "about", "aarogya", "vatika"],
        tags: &[Tag::Company],
    },
    TriggerSet {
        words: &["product", "buy", "shop", "price", "cost"],
        tags: &[Tag::Products, Tag::Categories],
    },
    TriggerSet {
        words: &["shipping", "delivery", "order", "dispatch"],
        tags: &[Tag::Shipping],
    },
    TriggerSet {
        words: &["payment", "pay", "method"],
        tags: &[Tag::Payment],
    },
    TriggerSet {
        words: &["return", "refund", "exchange"],
        tags: &[Tag::Returns],
    },
    TriggerSet {
        words: &["contact", "phone", "email", "address"],
        tags: &[Tag::Contact],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqTrigger {
    /// Every phrase must appear
    All(&'static [&'static str]),
    /// At least one phrase must appear
    Any(&'static [&'static str]),
}

impl FaqTrigger {
    #[inline]
    pub fn matches(&self, query_lower: &str) -> bool {
        match self {
            Self::All(phrases) => phrases.iter().all(|p| query_lower.contains(p)),
            Self::Any(phrases) => phrases.iter().any(|p| query_lower.contains(p)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqEntry {
    pub topic: &'static str,
    pub trigger: FaqTrigger,
    pub answer: &'static str,
}

/// Scripted answers, most specific first. Only the first match fires.
///
/// 1. shipping time: "shipping" and "time"
/// 2. free shipping: "free shipping"
/// 3. returns: "return" or "refund"
/// 4. payment: "payment"
/// 5. consultation: "consultation"
pub static FAQ_TABLE: [FaqEntry; 5] = [
    FaqEntry {
        topic: "shipping-time",
        trigger: FaqTrigger::All(&["shipping", "time"]),
        answer: "Orders are processed within 1-2 days, and delivery takes 3-10 days depending on your location. We ship across India with tracking via SMS/email.",
    },
    FaqEntry {
        topic: "free-shipping",
        trigger: FaqTrigger::All(&["free shipping"]),
        answer: "We offer free shipping on orders above ₹699. For orders below ₹699, there's a flat shipping charge of ₹79, and ₹50 for COD.",
    },
    FaqEntry {
        topic: "returns",
        trigger: FaqTrigger::Any(&["return", "refund"]),
        answer: "Due to the perishable nature of Ayurvedic products, we generally don't accept returns except for damaged products (report within 48 hours) or incorrect items shipped. Refunds are processed within 7-10 business days.",
    },
    FaqEntry {
        topic: "payment",
        trigger: FaqTrigger::All(&["payment"]),
        answer: "We accept Credit/Debit Cards, UPI Payments, Net Banking, and Digital Wallets. All transactions are secured with SSL encryption.",
    },
    FaqEntry {
        topic: "consultation",
        trigger: FaqTrigger::All(&["consultation"]),
        answer: "We offer personalized health consultations with expert Ayurvedic doctors. You can book a consultation through our website.",
    },
];

/// First FAQ entry whose trigger fires for `query`
#[inline]
pub fn find_faq(query: &str) -> Option<&'static FaqEntry> {
    let query_lower = query.to_lowercase();
    FAQ_TABLE.iter().find(|entry| entry.trigger.matches(&query_lower))
}

/// Sections selected for one query. Borrowed from the document, dropped after
/// prompt assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalResult<'a> {
    company: Option<&'a CompanyInfo>,
    products: Option<&'a [Product]>,
    categories: Option<&'a [CategoryEntry]>,
    shipping: Option<&'a ShippingPolicy>,
    payment: Option<&'a [String]>,
    returns: Option<&'a ReturnPolicy>,
    contact: Option<&'a ContactInfo>,
    health_categories: Vec<&'a CategoryEntry>,
    wellness_categories: Vec<&'a CategoryEntry>,
}

impl<'a> RetrievalResult<'a> {
    #[inline]
    pub fn company(&self) -> Option<&'a CompanyInfo> {
        self.company
    }

    #[inline]
    pub fn products(&self) -> Option<&'a [Product]> {
        self.products
    }

    /// The full wellness category table, attached by product queries
    #[inline]
    pub fn categories(&self) -> Option<&'a [CategoryEntry]> {
        self.categories
    }

    #[inline]
    pub fn shipping(&self) -> Option<&'a ShippingPolicy> {
        self.shipping
    }

    #[inline]
    pub fn payment(&self) -> Option<&'a [String]> {
        self.payment
    }

    #[inline]
    pub fn returns(&self) -> Option<&'a ReturnPolicy> {
        self.returns
    }

    #[inline]
    pub fn contact(&self) -> Option<&'a ContactInfo> {
        self.contact
    }

    /// Health categories whose key tokens appeared in the query
    #[inline]
    pub fn health_categories(&self) -> &[&'a CategoryEntry] {
        &self.health_categories
    }

    /// Wellness categories whose key tokens appeared in the query
    #[inline]
    pub fn wellness_categories(&self) -> &[&'a CategoryEntry] {
        &self.wellness_categories
    }

    #[inline]
    pub fn contains(&self, tag: Tag) -> bool {
        match tag {
            Tag::Company => self.company.is_some(),
            Tag::Products => self.products.is_some(),
            Tag::Categories => self.categories.is_some(),
            Tag::Shipping => self.shipping.is_some(),
            Tag::Payment => self.payment.is_some(),
            Tag::Returns => self.returns.is_some(),
            Tag::Contact => self.contact.is_some(),
            Tag::HealthCategory => !self.health_categories.is_empty(),
            Tag::WellnessCategory => !self.wellness_categories.is_empty(),
        }
    }

    /// Populated tags in rendering order
    #[inline]
    pub fn tags(&self) -> Vec<Tag> {
        Tag::ALL
            .into_iter()
            .filter(|tag| self.contains(*tag))
            .collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        Tag::ALL.into_iter().all(|tag| !self.contains(tag))
    }

    fn attach(&mut self, tag: Tag, document: &'a KnowledgeDocument) {
        match tag {
            Tag::Company => self.company = Some(document.company()),
            Tag::Products => self.products = Some(document.featured_products()),
            Tag::Categories => self.categories = Some(document.wellness_categories()),
            Tag::Shipping => self.shipping = Some(document.shipping()),
            Tag::Payment => self.payment = Some(document.payment_methods()),
            Tag::Returns => self.returns = Some(document.return_policy()),
            Tag::Contact => self.contact = Some(document.contact()),
            // Filled per entry by the category scan
            Tag::HealthCategory | Tag::WellnessCategory => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct Retriever {
    document: Arc<KnowledgeDocument>,
    category_mode: CategoryMatchMode,
}

impl Retriever {
    #[inline]
    pub fn new(document: Arc<KnowledgeDocument>) -> Self {
        Self {
            document,
            category_mode: CategoryMatchMode::default(),
        }
    }

    #[inline]
    pub fn with_category_mode(mut self, mode: CategoryMatchMode) -> Self {
        self.category_mode = mode;
        self
    }

    #[inline]
    pub fn document(&self) -> &KnowledgeDocument {
        &self.document
    }

    #[inline]
    pub fn category_mode(&self) -> CategoryMatchMode {
        self.category_mode
    }

    /// Scripted answer for `query`, if any FAQ trigger fires
    #[inline]
    pub fn match_faq(&self, query: &str) -> Option<&'static str> {
        let entry = find_faq(query)?;
        debug!("FAQ trigger '{}' matched", entry.topic);
        Some(entry.answer)
    }

    /// Collect every section whose trigger words appear in `query`.
    ///
    /// An unmatched query yields an empty result.
    #[inline]
    pub fn match_sections(&self, query: &str) -> RetrievalResult<'_> {
        let query_lower = query.to_lowercase();
        let document = self.document.as_ref();
        let mut result = RetrievalResult::default();

        for trigger in SECTION_TRIGGERS
            .iter()
            .filter(|trigger| trigger.matches(&query_lower))
        {
            for tag in trigger.tags {
                result.attach(*tag, document);
            }
        }

        result.health_categories = self.match_categories(document.health_categories(), &query_lower);
        result.wellness_categories =
            self.match_categories(document.wellness_categories(), &query_lower);

        debug!(
            "Retrieved tags {:?} for query (length: {})",
            result.tags(),
            query.len()
        );

        result
    }

    fn match_categories<'a>(
        &self,
        entries: &'a [CategoryEntry],
        query_lower: &str,
    ) -> Vec<&'a CategoryEntry> {
        let mut hits: Vec<&CategoryEntry> = entries
            .iter()
            .filter(|entry| entry.matches(query_lower))
            .collect();

        if self.category_mode == CategoryMatchMode::LastWins && hits.len() > 1 {
            hits = hits.split_off(hits.len() - 1);
        }

        hits
    }
}

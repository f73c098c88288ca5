//! Embedded knowledge base
//!
//! The store front's static facts live in `data/knowledge.toml`, which is
//! compiled into the binary. The document is parsed once per process and
//! handed out as a shared, immutable [`KnowledgeDocument`].


use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::debug;

const EMBEDDED_DOCUMENT: &str = include_str!("../../data/knowledge.toml");

/// Document layout version this build understands
pub const SUPPORTED_VERSION: u32 = 1;

/// Every section name that [`KnowledgeDocument::section`] resolves, in document order
pub const SECTION_NAMES: [&str; 12] = [
    "company_info",
    "philosophy",
    "key_offerings",
    "wellness_categories",
    "featured_products",
    "shipping_delivery",
    "payment_methods",
    "return_policy",
    "privacy_security",
    "featured_articles",
    "testimonials",
    "health_categories",
];

static DOCUMENT: LazyLock<Arc<KnowledgeDocument>> = LazyLock::new(|| {
    match KnowledgeDocument::from_toml(EMBEDDED_DOCUMENT) {
        Ok(document) => Arc::new(document),
        Err(e) => panic!("embedded knowledge document is invalid: {e}"),
    }
});

/// Return the process-wide knowledge document.
///
/// Every call hands out the same allocation.
#[inline]
pub fn load() -> Arc<KnowledgeDocument> {
    Arc::clone(&DOCUMENT)
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to parse knowledge document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unsupported knowledge document version: {0} (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown knowledge section: {name}")]
pub struct UnknownSectionError {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub company: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyInfo {
    pub name: String,
    pub tagline: String,
    pub legacy: String,
    pub products_count: String,
    pub community: String,
    pub website: String,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Philosophy {
    pub core_values: Vec<String>,
    pub approach: String,
}

/// A catalog entry. `price` is display text, never parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub vendor: String,
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    pub key: String,
    pub description: String,
}

impl CategoryEntry {
    /// Underscore-separated parts of the key, e.g. `heart` and `harmony`
    #[inline]
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.key.split('_')
    }

    /// True if any key token occurs anywhere in the (already lowercased) query
    #[inline]
    pub fn matches(&self, query_lower: &str) -> bool {
        self.tokens().any(|token| query_lower.contains(token))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub processing_time: String,
    pub delivery_time: String,
    pub coverage: String,
    pub tracking: String,
    pub free_shipping: String,
    pub shipping_charges: String,
    pub multi_vendor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReturnPolicy {
    pub general: String,
    pub exceptions: Vec<String>,
    pub refund_processing: String,
}

/// Borrowed view of a single named section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Section<'a> {
    Company(&'a CompanyInfo),
    Philosophy(&'a Philosophy),
    Lines(&'a [String]),
    Categories(&'a [CategoryEntry]),
    Products(&'a [Product]),
    Shipping(&'a ShippingPolicy),
    Returns(&'a ReturnPolicy),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeDocument {
    version: u32,
    company_info: CompanyInfo,
    philosophy: Philosophy,
    key_offerings: Vec<String>,
    wellness_categories: Vec<CategoryEntry>,
    featured_products: Vec<Product>,
    shipping_delivery: ShippingPolicy,
    payment_methods: Vec<String>,
    return_policy: ReturnPolicy,
    privacy_security: Vec<String>,
    featured_articles: Vec<String>,
    testimonials: Vec<String>,
    health_categories: Vec<CategoryEntry>,
}

impl KnowledgeDocument {
    #[inline]
    pub fn from_toml(content: &str) -> Result<Self, KnowledgeError> {
        let document: Self = toml::from_str(content)?;
        if document.version != SUPPORTED_VERSION {
            return Err(KnowledgeError::UnsupportedVersion(document.version));
        }

        debug!(
            "Loaded knowledge document v{} ({} products, {} health and {} wellness categories)",
            document.version,
            document.featured_products.len(),
            document.health_categories.len(),
            document.wellness_categories.len()
        );

        Ok(document)
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn company(&self) -> &CompanyInfo {
        &self.company_info
    }

    #[inline]
    pub fn contact(&self) -> &ContactInfo {
        &self.company_info.contact
    }

    #[inline]
    pub fn philosophy(&self) -> &Philosophy {
        &self.philosophy
    }

    #[inline]
    pub fn key_offerings(&self) -> &[String] {
        &self.key_offerings
    }

    #[inline]
    pub fn wellness_categories(&self) -> &[CategoryEntry] {
        &self.wellness_categories
    }

    #[inline]
    pub fn health_categories(&self) -> &[CategoryEntry] {
        &self.health_categories
    }

    /// Featured products in display priority order
    #[inline]
    pub fn featured_products(&self) -> &[Product] {
        &self.featured_products
    }

    #[inline]
    pub fn shipping(&self) -> &ShippingPolicy {
        &self.shipping_delivery
    }

    #[inline]
    pub fn payment_methods(&self) -> &[String] {
        &self.payment_methods
    }

    #[inline]
    pub fn return_policy(&self) -> &ReturnPolicy {
        &self.return_policy
    }

    #[inline]
    pub fn privacy_security(&self) -> &[String] {
        &self.privacy_security
    }

    #[inline]
    pub fn featured_articles(&self) -> &[String] {
        &self.featured_articles
    }

    #[inline]
    pub fn testimonials(&self) -> &[String] {
        &self.testimonials
    }

    /// Look up a section by its document name.
    ///
    /// Names outside [`SECTION_NAMES`] are a caller bug and yield
    /// [`UnknownSectionError`].
    #[inline]
    pub fn section(&self, name: &str) -> Result<Section<'_>, UnknownSectionError> {
        let section = match name {
            "company_info" => Section::Company(&self.company_info),
            "philosophy" => Section::Philosophy(&self.philosophy),
            "key_offerings" => Section::Lines(&self.key_offerings),
            "wellness_categories" => Section::Categories(&self.wellness_categories),
            "featured_products" => Section::Products(&self.featured_products),
            "shipping_delivery" => Section::Shipping(&self.shipping_delivery),
            "payment_methods" => Section::Lines(&self.payment_methods),
            "return_policy" => Section::Returns(&self.return_policy),
            "privacy_security" => Section::Lines(&self.privacy_security),
            "featured_articles" => Section::Lines(&self.featured_articles),
            "testimonials" => Section::Lines(&self.testimonials),
            "health_categories" => Section::Categories(&self.health_categories),
            _ => {
                return Err(UnknownSectionError {
                    name: name.to_string(),
                });
            }
        };
        Ok(section)
    }
}

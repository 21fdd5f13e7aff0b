// SPDX-License-Identifier: MIT OR Apache-2.0
//! The six detection signals (§4.8). S3 is reserved and disabled in v1.

use once_cell::sync::Lazy;
use orderflow_core::trigram_similarity;
use regex::Regex;

/// Which signal produced a score, for debugging and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalId {
    /// Sender email exactly matches a customer contact.
    S1,
    /// Sender domain matches a customer contact's domain.
    S2,
    /// Customer number regex match in document body.
    S4,
    /// Fuzzy company-name match.
    S5,
    /// LLM-provided customer hint, scored as its S1/S4/S5 analog.
    S6,
}

/// A single signal's contribution toward a candidate customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalScore {
    /// Which signal fired.
    pub signal: SignalId,
    /// Its score, already in `[0, 1]`.
    pub score: f64,
}

/// Domains excluded from S2 (generic webmail/ISP providers): a match on
/// one of these carries no customer-identifying signal.
pub const GENERIC_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "outlook.com",
    "hotmail.com",
    "live.com",
    "yahoo.com",
    "yahoo.de",
    "gmx.de",
    "gmx.net",
    "web.de",
    "t-online.de",
    "aol.com",
    "icloud.com",
    "protonmail.com",
];

/// `true` if `domain` is a generic provider domain excluded from S2,
/// case-insensitively.
#[must_use]
pub fn is_generic_email_domain(domain: &str) -> bool {
    let lower = domain.trim().to_lowercase();
    GENERIC_EMAIL_DOMAINS.contains(&lower.as_str())
}

fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// S1: sender email exactly matches a customer contact's email
/// (case-insensitive). Score `0.95`.
#[must_use]
pub fn s1_exact_email_match(sender_email: &str, contact_email: &str) -> Option<SignalScore> {
    (sender_email.trim().eq_ignore_ascii_case(contact_email.trim())).then_some(SignalScore {
        signal: SignalId::S1,
        score: 0.95,
    })
}

/// S2: sender domain matches a customer contact's domain, and neither is
/// a generic provider domain. Score `0.75`.
#[must_use]
pub fn s2_domain_match(sender_email: &str, contact_email: &str) -> Option<SignalScore> {
    let sender_domain = email_domain(sender_email)?.to_lowercase();
    let contact_domain = email_domain(contact_email)?.to_lowercase();
    if sender_domain != contact_domain || is_generic_email_domain(&sender_domain) {
        return None;
    }
    Some(SignalScore {
        signal: SignalId::S2,
        score: 0.75,
    })
}

static CUSTOMER_NUMBER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)Kundennr[.:]?\s*([A-Z0-9-]{3,20})").unwrap(),
        Regex::new(r"(?i)Customer\s*No[.:]?\s*([A-Z0-9-]{3,20})").unwrap(),
        Regex::new(r"(?i)Debitor[.:]?\s*([A-Z0-9-]{3,20})").unwrap(),
    ]
});

/// Extract the first customer-number-looking token from document body
/// text, trying each pattern in order and returning the first match
/// (§4.8 S4 patterns).
#[must_use]
pub fn extract_customer_number(body_text: &str) -> Option<String> {
    for pattern in CUSTOMER_NUMBER_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(body_text) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    None
}

/// S4: an extracted customer-number token matches a customer's ERP
/// customer number exactly (case-insensitive). Score `0.98`.
#[must_use]
pub fn s4_customer_number_match(extracted: &str, erp_customer_number: &str) -> Option<SignalScore> {
    extracted
        .trim()
        .eq_ignore_ascii_case(erp_customer_number.trim())
        .then_some(SignalScore {
            signal: SignalId::S4,
            score: 0.98,
        })
}

/// S5: fuzzy company-name similarity. `min(0.85, 0.40 + 0.60 *
/// similarity)` when `similarity >= 0.40`, otherwise absent.
#[must_use]
pub fn s5_fuzzy_name_match(candidate_name: &str, customer_name: &str) -> Option<SignalScore> {
    let similarity = trigram_similarity(candidate_name, customer_name);
    if similarity < 0.40 {
        return None;
    }
    Some(SignalScore {
        signal: SignalId::S5,
        score: (0.40 + 0.60 * similarity).min(0.85),
    })
}

/// Legal-form tokens used by name extraction to prefer lines that look
/// like a company name (§4.8).
pub const LEGAL_FORM_TOKENS: &[&str] = &["GmbH", "AG", "KG", "OHG", "Ltd", "Inc", "Corp"];

static DATE_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,4}[./-]\d{1,2}[./-]\d{1,4}").unwrap());
static PHONE_FAX_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(tel|fax|phone)[.:]?\s*[+0-9][0-9 ()/-]{5,}").unwrap());
static EMAIL_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s@]+@[^\s@]+\.[^\s@]+").unwrap());

/// Scan the first 500 characters of document text for a line that looks
/// like a company name: 10-100 chars, not a date/phone/email line,
/// containing a legal-form token (§4.8 name extraction).
#[must_use]
pub fn extract_candidate_company_name(document_text: &str) -> Option<String> {
    let window: String = document_text.chars().take(500).collect();
    window
        .lines()
        .map(str::trim)
        .filter(|line| (10..=100).contains(&line.len()))
        .filter(|line| !DATE_LIKE.is_match(line))
        .filter(|line| !PHONE_FAX_LIKE.is_match(line))
        .filter(|line| !EMAIL_LIKE.is_match(line))
        .find(|line| LEGAL_FORM_TOKENS.iter().any(|token| line.contains(token)))
        .map(str::to_string)
}

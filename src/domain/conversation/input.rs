//! Input mini-grammar for the deterministic flows and fast paths.
//!
//! Free text is the only input language the flows accept, so every phrase
//! list lives here as data rather than scattered literals. Matching is
//! case-insensitive substring containment throughout, mirroring how the
//! assistant has always interpreted replies like "confirm address 2" or
//! "no coupon thanks".

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrases that enter the PC-builder flow.
pub const PC_BUILDER_TRIGGERS: [&str; 6] = [
    "build a pc",
    "build pc",
    "custom pc",
    "pc builder",
    "i want to build a pc",
    "help me build a pc",
];

/// Phrases that enter the checkout flow.
pub const CHECKOUT_TRIGGERS: [&str; 6] = [
    "proceed to checkout",
    "checkout",
    "start checkout",
    "buy now",
    "purchase now",
    "go to checkout",
];

/// Words that confirm an order at the review step.
const CONFIRM_WORDS: [&str; 3] = ["yes", "confirm", "ok"];

/// Phrases that decline the coupon step.
const COUPON_DECLINES: [&str; 3] = ["no coupon", "skip", "continue"];

/// Words that mark a builder-step reply as a question rather than a
/// selection.
const QUESTION_INDICATORS: [&str; 22] = [
    "what",
    "which",
    "why",
    "how",
    "when",
    "where",
    "who",
    "tell me",
    "explain",
    "difference",
    "compare",
    "better",
    "recommend",
    "suggest",
    "help",
    "?",
    "confused",
    "don't understand",
    "go back",
    "previous",
    "change",
    "modify",
];

/// Keywords that force a fresh reasoning pass (cache bypass): these
/// queries depend on live store state.
const TRANSACTIONAL_KEYWORDS: [&str; 9] = [
    "cart", "order", "buy", "purchase", "add", "remove", "update", "apply", "coupon",
];

/// Keywords that mark a query as personalized, excluding it from the
/// shared response cache.
const PERSONAL_KEYWORDS: [&str; 5] = ["cart", "order", "my", "i have", "purchase history"];

/// Phrases recognized as a cart-status question (hallucination guard).
const CART_STATUS_PHRASES: [&str; 7] = [
    "what's in my cart",
    "show cart",
    "cart summary",
    "view cart",
    "my cart",
    "cart contents",
    "show my cart",
];

/// Phrases that mark a checkout/order intent, which the hallucination
/// guard must not override.
const CHECKOUT_INTENT_PHRASES: [&str; 5] = ["checkout", "proceed", "place order", "confirm", "buy"];

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());
static TRACKING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^TH-[A-Z0-9]{4,20}$").unwrap());
static ORDER_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,20}$").unwrap());
static ALNUM_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9-]{4,20}$").unwrap());
static APPLY_COUPON_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"apply coupon\s+(\d+)").unwrap());
static APPLY_COUPON_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)apply coupon\s+([A-Za-z0-9]+)").unwrap());

fn lower(input: &str) -> String {
    input.trim().to_lowercase()
}

fn contains_any(input: &str, phrases: &[&str]) -> bool {
    let lowered = lower(input);
    phrases.iter().any(|p| lowered.contains(p))
}

/// Parses a reply that is nothing but a number ("2", " 7 ").
pub fn bare_digit(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed.parse().ok()
    } else {
        None
    }
}

/// Extracts the first number embedded in a reply ("confirm address 2").
pub fn extract_number(input: &str) -> Option<u32> {
    NUMBER_RE
        .captures(input)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// True for the builder skip commands: "0" or anything mentioning "skip".
pub fn is_skip(input: &str) -> bool {
    input.trim() == "0" || lower(input).contains("skip")
}

/// True if the input enters the PC-builder flow.
pub fn matches_pc_builder_trigger(input: &str) -> bool {
    contains_any(input, &PC_BUILDER_TRIGGERS)
}

/// True if the input enters the checkout flow.
pub fn matches_checkout_trigger(input: &str) -> bool {
    contains_any(input, &CHECKOUT_TRIGGERS)
}

/// Resolves an address selection: a bare number, or a number embedded in
/// a "confirm address ..."/"use address ..." phrase. Returns the 1-based
/// index as typed.
pub fn address_selection(input: &str) -> Option<u32> {
    if let Some(n) = bare_digit(input) {
        return Some(n);
    }
    let lowered = lower(input);
    if lowered.contains("confirm address") || lowered.contains("use address") {
        return extract_number(input);
    }
    None
}

/// A coupon choice parsed from free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponChoice {
    /// 1-based index into the coupon menu.
    Index(u32),
    /// A literal code ("apply coupon SAVE20").
    Code(String),
}

/// Parses a coupon selection: a bare menu number, "apply coupon <n>", or
/// "apply coupon <CODE>".
pub fn coupon_selection(input: &str) -> Option<CouponChoice> {
    if let Some(n) = bare_digit(input) {
        return Some(CouponChoice::Index(n));
    }
    let lowered = lower(input);
    if !lowered.contains("apply coupon") {
        return None;
    }
    if let Some(caps) = APPLY_COUPON_INDEX_RE.captures(&lowered) {
        if let Ok(n) = caps[1].parse() {
            return Some(CouponChoice::Index(n));
        }
    }
    APPLY_COUPON_CODE_RE
        .captures(input)
        .map(|caps| CouponChoice::Code(caps[1].to_uppercase()))
}

/// True if the user declines the coupon step.
pub fn declines_coupon(input: &str) -> bool {
    contains_any(input, &COUPON_DECLINES)
}

/// True if the user confirms the order at the review step.
pub fn confirms_order(input: &str) -> bool {
    contains_any(input, &CONFIRM_WORDS) || lower(input).contains("place order")
}

/// True if the user cancels the checkout.
pub fn cancels(input: &str) -> bool {
    lower(input).contains("cancel")
}

/// True if the user accepts the completed build ("yes" / "add to cart").
pub fn accepts_build(input: &str) -> bool {
    let lowered = lower(input);
    lowered.contains("yes") || lowered.contains("add")
}

/// Detects whether a builder-step reply is conversational (a question or
/// a request for guidance) rather than a selection. Numeric replies and
/// skip commands are never questions.
pub fn is_question_or_conversation(input: &str) -> bool {
    let lowered = lower(input);
    if lowered.is_empty() {
        return false;
    }
    if bare_digit(&lowered).is_some() || lowered == "skip" {
        return false;
    }
    QUESTION_INDICATORS.iter().any(|w| lowered.contains(w))
}

/// Canned replies for trivial greetings, skipping the reasoning engine.
pub fn greeting_reply(input: &str) -> Option<&'static str> {
    match lower(input).as_str() {
        "hi" => Some("Hello! I can help you shop. What are you looking for?"),
        "hello" => Some("Hi there! How can I help you today?"),
        "hey" => Some("Hey! What can I help you find?"),
        "help" => {
            Some("I can help you search products, manage your cart, and checkout. What do you need?")
        }
        "thanks" => Some("You're welcome! Anything else I can help with?"),
        "ok" => Some("Great! What would you like to do next?"),
        _ => None,
    }
}

/// Detects bare order/tracking-number-shaped input: "TH-BDB44FF9", a pure
/// numeric order number, or a single alphanumeric code that is clearly
/// not a sentence.
pub fn is_tracking_code(input: &str) -> bool {
    let trimmed = input.trim();
    let upper = trimmed.to_uppercase();

    if TRACKING_RE.is_match(&upper) || ORDER_NUMBER_RE.is_match(trimmed) {
        return true;
    }

    ALNUM_CODE_RE.is_match(&upper)
        && trimmed.split_whitespace().count() == 1
        && !contains_any(trimmed, &["what", "where", "when", "how", "show", "track"])
}

/// True when the query depends on live store state and must bypass the
/// response cache.
pub fn is_transactional(input: &str) -> bool {
    contains_any(input, &TRANSACTIONAL_KEYWORDS)
}

/// True when the query references personal state and must not be cached.
pub fn is_personal(input: &str) -> bool {
    contains_any(input, &PERSONAL_KEYWORDS)
}

/// True for cart-status questions eligible for the hallucination guard.
pub fn is_cart_status_query(input: &str) -> bool {
    contains_any(input, &CART_STATUS_PHRASES)
}

/// True for checkout/order intents the hallucination guard must leave
/// alone.
pub fn is_checkout_intent(input: &str) -> bool {
    contains_any(input, &CHECKOUT_INTENT_PHRASES)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod numbers {
        use super::*;

        #[test]
        fn bare_digit_accepts_trimmed_numbers() {
            assert_eq!(bare_digit(" 3 "), Some(3));
            assert_eq!(bare_digit("12"), Some(12));
        }

        #[test]
        fn bare_digit_rejects_sentences() {
            assert_eq!(bare_digit("option 3"), None);
            assert_eq!(bare_digit(""), None);
            assert_eq!(bare_digit("3.5"), None);
        }

        #[test]
        fn extract_number_finds_embedded_digits() {
            assert_eq!(extract_number("confirm address 2"), Some(2));
            assert_eq!(extract_number("no numbers here"), None);
        }
    }

    mod selections {
        use super::*;

        #[test]
        fn address_selection_accepts_bare_and_phrased() {
            assert_eq!(address_selection("1"), Some(1));
            assert_eq!(address_selection("confirm address 2"), Some(2));
            assert_eq!(address_selection("use address 3 please"), Some(3));
        }

        #[test]
        fn address_selection_rejects_unrelated_text() {
            assert_eq!(address_selection("what addresses do I have?"), None);
        }

        #[test]
        fn coupon_selection_parses_index_and_code() {
            assert_eq!(coupon_selection("2"), Some(CouponChoice::Index(2)));
            assert_eq!(
                coupon_selection("apply coupon 1"),
                Some(CouponChoice::Index(1))
            );
            assert_eq!(
                coupon_selection("apply coupon save20"),
                Some(CouponChoice::Code("SAVE20".to_string()))
            );
        }

        #[test]
        fn coupon_selection_ignores_other_text() {
            assert_eq!(coupon_selection("which coupon is best?"), None);
        }

        #[test]
        fn declines_coupon_matches_phrases() {
            assert!(declines_coupon("no coupon"));
            assert!(declines_coupon("skip"));
            assert!(declines_coupon("continue to final review"));
            assert!(!declines_coupon("apply coupon 1"));
        }
    }

    mod confirmation {
        use super::*;

        #[test]
        fn confirms_order_accepts_variants() {
            assert!(confirms_order("yes"));
            assert!(confirms_order("confirm"));
            assert!(confirms_order("ok, place order"));
        }

        #[test]
        fn cancels_matches_cancel() {
            assert!(cancels("cancel"));
            assert!(cancels("please cancel this"));
            assert!(!cancels("continue"));
        }

        #[test]
        fn accepts_build_on_yes_or_add() {
            assert!(accepts_build("yes"));
            assert!(accepts_build("add them to my cart"));
            assert!(!accepts_build("no thanks"));
        }
    }

    mod triggers {
        use super::*;

        #[test]
        fn pc_builder_triggers_match() {
            assert!(matches_pc_builder_trigger("I want to build a PC"));
            assert!(matches_pc_builder_trigger("open the pc builder"));
            assert!(!matches_pc_builder_trigger("show me laptops"));
        }

        #[test]
        fn checkout_triggers_match() {
            assert!(matches_checkout_trigger("proceed to checkout"));
            assert!(matches_checkout_trigger("Buy now"));
            assert!(!matches_checkout_trigger("what's in my cart"));
        }
    }

    mod question_detection {
        use super::*;

        #[test]
        fn questions_are_detected() {
            assert!(is_question_or_conversation(
                "what's the difference between these two?"
            ));
            assert!(is_question_or_conversation("which one do you recommend"));
            assert!(is_question_or_conversation("compare 1 and 2"));
        }

        #[test]
        fn selections_are_not_questions() {
            assert!(!is_question_or_conversation("2"));
            assert!(!is_question_or_conversation("skip"));
            assert!(!is_question_or_conversation("0"));
        }

        #[test]
        fn empty_input_is_not_a_question() {
            assert!(!is_question_or_conversation("   "));
        }
    }

    mod fast_paths {
        use super::*;

        #[test]
        fn greeting_table_is_exact_match_only() {
            assert!(greeting_reply("hi").is_some());
            assert!(greeting_reply("Hello").is_some());
            assert!(greeting_reply("hi there, how are you").is_none());
        }

        #[test]
        fn tracking_codes_are_detected() {
            assert!(is_tracking_code("TH-BDB44FF9"));
            assert!(is_tracking_code("th-bdb44ff9"));
            assert!(is_tracking_code("100234"));
            assert!(is_tracking_code("A1B2C3D4"));
        }

        #[test]
        fn sentences_are_not_tracking_codes() {
            assert!(!is_tracking_code("track my order please"));
            assert!(!is_tracking_code("where is TH-BDB44FF9"));
            assert!(!is_tracking_code("42"));
        }
    }

    mod cache_gates {
        use super::*;

        #[test]
        fn transactional_queries_bypass_cache() {
            assert!(is_transactional("add this to my cart"));
            assert!(is_transactional("apply coupon SAVE20"));
            assert!(!is_transactional("what are your shipping policies?"));
        }

        #[test]
        fn personal_queries_are_not_cached() {
            assert!(is_personal("show my recent activity"));
            assert!(!is_personal("tell me about gaming laptops"));
        }

        #[test]
        fn cart_status_vs_checkout_intent() {
            assert!(is_cart_status_query("what's in my cart?"));
            assert!(!is_cart_status_query("search for keyboards"));
            assert!(is_checkout_intent("proceed to checkout"));
            assert!(!is_checkout_intent("show cart please")); // status, not intent
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // A bare digit reply is always a selection, never a question.
            #[test]
            fn digits_never_read_as_questions(n in 0u32..10_000) {
                let input = n.to_string();
                prop_assert!(bare_digit(&input).is_some());
                prop_assert!(!is_question_or_conversation(&input));
            }

            // address_selection agrees with bare_digit on pure numbers.
            #[test]
            fn address_selection_consistent_with_bare_digit(n in 1u32..100) {
                prop_assert_eq!(address_selection(&n.to_string()), Some(n));
            }

            // Whitespace padding never changes what a reply parses to.
            #[test]
            fn padding_is_ignored(n in 1u32..100, pad in "[ \t]{0,4}") {
                let padded = format!("{pad}{n}{pad}");
                prop_assert_eq!(bare_digit(&padded), Some(n));
            }
        }
    }
}

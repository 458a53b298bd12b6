//! Suggested categories and an offline keyword categorizer
//!
//! Categories are free-form labels. The suggested set is what the entry form
//! offers; `suggest_category` gives a hint when the user leaves it blank and
//! the server's `/ai/categorize` endpoint is unavailable.
//!
//! Every category is scored against the cleaned description: an exact match of
//! the whole description scores 10, a whole-word match 5 and a match inside a
//! longer word 1. The highest score wins; ties go to the category listed first.

use std::sync::OnceLock;

use regex::Regex;

/// Categories offered when entering a transaction
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Bills & Utilities",
    "Entertainment",
    "Healthcare",
    "Education",
    "Travel",
    "Other",
];

/// Fallback when no keyword matches
pub const DEFAULT_CATEGORY: &str = "Other";

/// Confidence reported for the fallback category, in percent
const FALLBACK_CONFIDENCE: f64 = 50.0;

/// Confidence never exceeds this, in percent
const MAX_CONFIDENCE: f64 = 95.0;

const EXACT_SCORE: u32 = 10;
const WORD_SCORE: u32 = 5;
const PARTIAL_SCORE: u32 = 1;

/// Keyword table; order breaks ties
const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Food & Dining",
        &[
            "restaurant", "food", "cafe", "dining", "bazaar", "grocery", "swiggy", "zomato",
            "dominos", "pizza", "burger", "coffee", "tea", "breakfast", "lunch", "dinner",
            "snacks", "bakery", "supermarket", "vegetables", "fruits", "meat", "dairy",
        ],
    ),
    (
        "Transportation",
        &[
            "petrol", "gas", "uber", "taxi", "transport", "bus", "train", "metro", "auto",
            "rickshaw", "ola", "fuel", "parking", "toll", "vehicle", "car", "bike", "scooter",
        ],
    ),
    (
        "Shopping",
        &[
            "amazon", "shopping", "mall", "store", "purchase", "flipkart", "myntra", "clothes",
            "shirt", "shorts", "jeans", "shoes", "electronics", "laptop", "accessories",
            "jewelry", "cosmetics", "gifts",
        ],
    ),
    (
        "Bills & Utilities",
        &[
            "bill", "electricity", "electric", "water", "internet", "phone", "utility", "mobile",
            "broadband", "wifi", "cylinder", "maintenance", "society", "rent", "emi", "loan",
            "insurance", "subscription",
        ],
    ),
    (
        "Entertainment",
        &[
            "movie", "netflix", "entertainment", "game", "music", "spotify", "youtube",
            "cinema", "theatre", "concert", "sports", "gym", "club", "party",
        ],
    ),
    (
        "Healthcare",
        &[
            "doctor", "hospital", "medicine", "pharmacy", "medical", "health", "clinic",
            "dentist", "checkup", "treatment", "surgery", "ambulance", "lab",
        ],
    ),
    (
        "Education",
        &[
            "school", "college", "university", "course", "tuition", "books", "education",
            "training", "certification", "exam", "fees", "library", "stationery", "uniform",
        ],
    ),
    (
        "Travel",
        &["hotel", "flight", "airline", "booking", "travel", "vacation", "resort", "airbnb"],
    ),
    ("Income", &["salary", "freelance", "income", "payment", "bonus", "refund"]),
    (
        "Investment",
        &[
            "mutual", "fund", "sip", "stock", "share", "investment", "trading", "demat",
            "portfolio", "dividend", "bond", "deposit", "savings", "ppf",
        ],
    ),
];

/// One keyword with its whole-word matcher
struct Keyword {
    word: &'static str,
    whole_word: Regex,
}

fn matchers() -> &'static [(&'static str, Vec<Keyword>)] {
    static MATCHERS: OnceLock<Vec<(&'static str, Vec<Keyword>)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        KEYWORDS
            .iter()
            .map(|(category, words)| {
                // Escaped plain words always compile
                let keywords = words
                    .iter()
                    .filter_map(|word| {
                        Regex::new(&format!(r"\b{}\b", regex::escape(word)))
                            .ok()
                            .map(|whole_word| Keyword {
                                word: *word,
                                whole_word,
                            })
                    })
                    .collect();
                (*category, keywords)
            })
            .collect()
    })
}

/// Lowercase, punctuation replaced by spaces, whitespace collapsed
fn clean_description(description: &str) -> String {
    let spaced: String = description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn score(cleaned: &str, keywords: &[Keyword]) -> u32 {
    keywords
        .iter()
        .filter(|k| cleaned.contains(k.word))
        .map(|k| {
            if cleaned == k.word {
                EXACT_SCORE
            } else if k.whole_word.is_match(cleaned) {
                WORD_SCORE
            } else {
                PARTIAL_SCORE
            }
        })
        .sum()
}

/// Guess a category from a transaction description
pub fn suggest_category(description: &str) -> &'static str {
    let cleaned = clean_description(description);
    if cleaned.is_empty() {
        return DEFAULT_CATEGORY;
    }

    let mut best = (DEFAULT_CATEGORY, 0);
    for (category, keywords) in matchers() {
        let points = score(&cleaned, keywords);
        if points > best.1 {
            best = (*category, points);
        }
    }
    best.0
}

/// How sure the keyword match is for `category`, in percent (0-95)
///
/// The share of the category's keywords found in the description. Categories
/// without keywords, including the fallback, report 50.
pub fn keyword_confidence(description: &str, category: &str) -> f64 {
    let Some((_, words)) = KEYWORDS.iter().find(|(c, _)| *c == category) else {
        return FALLBACK_CONFIDENCE;
    };
    let lower = description.to_lowercase();
    let matches = words.iter().filter(|w| lower.contains(*w)).count();
    (matches as f64 / words.len() as f64 * 100.0).min(MAX_CONFIDENCE)
}

/// True if `category` is one of the suggested labels (case-insensitive)
pub fn is_suggested(category: &str) -> bool {
    SUGGESTED_CATEGORIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(category.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_category() {
        assert_eq!(suggest_category("Big Bazaar"), "Food & Dining");
        assert_eq!(suggest_category("PETROL PUMP #12"), "Transportation");
        assert_eq!(suggest_category("Amazon Purchase"), "Shopping");
        assert_eq!(suggest_category("Electric Bill"), "Bills & Utilities");
        assert_eq!(suggest_category("Netflix movie night"), "Entertainment");
        assert_eq!(suggest_category("Salary Deposit"), "Income");
        assert_eq!(suggest_category("Mystery vendor"), "Other");
        assert_eq!(suggest_category("   "), "Other");
    }

    #[test]
    fn test_whole_words_beat_fragments() {
        // "bus" inside "Business", "gas" inside "Vegas", "bill" inside "Billabong"
        assert_eq!(suggest_category("Business lunch"), "Food & Dining");
        assert_eq!(suggest_category("Vegas hotel"), "Travel");
        assert_eq!(suggest_category("Billabong shorts"), "Shopping");
    }

    #[test]
    fn test_fragment_alone_still_counts() {
        assert_eq!(suggest_category("Carpool"), "Transportation");
    }

    #[test]
    fn test_punctuation_is_ignored() {
        assert_eq!(suggest_category("UBER*TRIP"), "Transportation");
        assert_eq!(suggest_category("coffee."), "Food & Dining");
    }

    #[test]
    fn test_scores_add_up() {
        // Two Food keywords outweigh one Bills keyword
        assert_eq!(suggest_category("Pizza and coffee, water"), "Food & Dining");
    }

    #[test]
    fn test_ties_go_to_earlier_category() {
        // "cafe" (Food) and "payment" (Income) both score 5
        assert_eq!(suggest_category("Cafe payment"), "Food & Dining");
    }

    #[test]
    fn test_keyword_confidence() {
        assert_eq!(keyword_confidence("Mystery vendor", DEFAULT_CATEGORY), 50.0);
        assert_eq!(keyword_confidence("anything", "Unknown"), 50.0);

        let travel = keyword_confidence("Hotel booking", "Travel");
        assert!((travel - 25.0).abs() < 1e-9, "got {}", travel);

        assert!(keyword_confidence("Uber", "Transportation") > 0.0);
        assert!(keyword_confidence("Uber", "Transportation") <= MAX_CONFIDENCE);
    }

    #[test]
    fn test_is_suggested() {
        assert!(is_suggested("travel"));
        assert!(is_suggested(" Food & Dining "));
        assert!(!is_suggested("Income"));
        assert_eq!(SUGGESTED_CATEGORIES.last(), Some(&DEFAULT_CATEGORY));
    }
}

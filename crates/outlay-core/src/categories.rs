//! Spending categories and the static synonym table
//!
//! The allowed-category list is versioned configuration: the classifier's
//! system prompt and the normalization set are both built from it, so the
//! two can never diverge.

/// The fixed, ordered set of spending categories.
///
/// Order matters: AI-fallback option lists preserve this order, and every
/// category attached to a rule or returned to a caller must be a member.
pub const ALLOWED_CATEGORIES: [&str; 17] = [
    "Food",          // groceries, restaurants, coffee, snacks
    "Travel",        // fuel, cab, flights, metro, parking
    "Shopping",      // clothes, electronics, accessories
    "Utilities",     // electricity, water, gas, internet, phone
    "Housing",       // rent, maintenance, home repairs
    "Healthcare",    // doctor visits, pharmacy, health checkup
    "Entertainment", // movies, OTT, gaming, outings
    "Investment",    // stocks, equity mutual funds, SIP, gold
    "Loans",         // EMI, credit card payment, personal loan
    "Insurance",     // life, health, vehicle, home
    "Grooming",      // haircut, salon, spa, beauty, cosmetics
    "Subscription",  // Netflix, Spotify, news, memberships
    "Education",     // school fees, courses, books
    "Taxes",         // income tax, GST, penalties
    "Gifts",         // birthdays, festivals, anniversaries (incl. donations)
    "Pet Care",      // food, grooming, vet
    "Other",         // uncategorized / misc
];

/// Predefined keyword -> category mappings, checked by substring against the
/// lowercased raw text before any stored rule or AI lookup.
///
/// Iteration order is significant: the first matching keyword wins, so this
/// is a slice rather than a map.
pub const SYNONYMS: &[(&str, &str)] = &[
    // Food
    ("groceries", "Food"),
    ("grocery", "Food"),
    ("restaurant", "Food"),
    ("dining", "Food"),
    ("lunch", "Food"),
    ("dinner", "Food"),
    ("pizza", "Food"),
    ("breakfast", "Food"),
    ("snacks", "Food"),
    ("coffee", "Food"),
    ("swiggy", "Food"),
    ("zomato", "Food"),
    ("ubereats", "Food"),
    // Travel
    ("travel", "Travel"),
    ("transport", "Travel"),
    ("taxi", "Travel"),
    ("uber", "Travel"),
    ("ola", "Travel"),
    ("bus", "Travel"),
    ("train", "Travel"),
    ("flight", "Travel"),
    ("airline", "Travel"),
    ("fuel", "Travel"),
    ("petrol", "Travel"),
    ("gas", "Travel"),
    // Entertainment (experiences & gaming, not subscriptions)
    ("entertainment", "Entertainment"),
    ("cinema", "Entertainment"),
    ("movie", "Entertainment"),
    ("movies", "Entertainment"),
    ("theatre", "Entertainment"),
    ("outing", "Entertainment"),
    ("playstation", "Entertainment"),
    ("xbox", "Entertainment"),
    ("gaming", "Entertainment"),
    // Shopping
    ("shopping", "Shopping"),
    ("amazon", "Shopping"),
    ("flipkart", "Shopping"),
    ("myntra", "Shopping"),
    ("apparel", "Shopping"),
    ("clothing", "Shopping"),
    ("mall", "Shopping"),
    ("electronics", "Shopping"),
    ("gadget", "Shopping"),
    ("laptop", "Shopping"),
    ("mobile", "Shopping"),
    // Utilities
    ("utilities", "Utilities"),
    ("electricity", "Utilities"),
    ("water", "Utilities"),
    ("internet", "Utilities"),
    ("broadband", "Utilities"),
    ("jio", "Utilities"),
    ("airtel", "Utilities"),
    ("bsnl", "Utilities"),
    ("bill", "Utilities"),
    ("phone", "Utilities"),
    ("gas bill", "Utilities"),
    // Healthcare
    ("health", "Healthcare"),
    ("healthcare", "Healthcare"),
    ("medicine", "Healthcare"),
    ("hospital", "Healthcare"),
    ("doctor", "Healthcare"),
    ("pharmacy", "Healthcare"),
    ("apollo", "Healthcare"),
    ("pharmeasy", "Healthcare"),
    ("practo", "Healthcare"),
    // Subscription (recurring digital services)
    ("netflix", "Subscription"),
    ("spotify", "Subscription"),
    ("prime", "Subscription"),
    ("disney", "Subscription"),
    ("hotstar", "Subscription"),
    ("sunnxt", "Subscription"),
    ("membership", "Subscription"),
    ("subscription", "Subscription"),
    ("zee5", "Subscription"),
    ("apple music", "Subscription"),
    ("youtube premium", "Subscription"),
];

/// Check whether `category` is one of the allowed names (exact match).
pub fn is_allowed(category: &str) -> bool {
    ALLOWED_CATEGORIES.contains(&category)
}

/// Normalize a raw classifier suggestion against the allowed set.
///
/// Matching is case-insensitive but exact: synonyms are deliberately not
/// consulted, so a raw "groceries" does NOT become "Food" here. Anything
/// outside the allowed set maps to "Other".
pub fn normalize_suggestion(raw: &str) -> &'static str {
    let wanted = raw.trim().to_lowercase();
    ALLOWED_CATEGORIES
        .iter()
        .find(|c| c.to_lowercase() == wanted)
        .copied()
        .unwrap_or("Other")
}

/// First synonym whose keyword occurs in the lowercased text.
pub fn match_synonym(lowered_text: &str) -> Option<&'static str> {
    SYNONYMS
        .iter()
        .find(|(keyword, _)| lowered_text.contains(keyword))
        .map(|(_, category)| *category)
}

//! Merge and dedup engine.
//!
//! Candidates from all strategies are concatenated, stably sorted by
//! descending confidence, and admitted greedily: a profile gets in
//! unless it duplicates one already admitted. Greedy selection is
//! order-dependent rather than globally optimal, but deterministic:
//! ties keep their original concatenation order.
//!
//! Two profiles are duplicates when their names are similar AND they
//! either share a non-empty company or have similar titles. Profiles
//! without a name are never judged duplicates.

use std::cmp::Ordering;

use persona_core::Profile;

/// Merge candidate lists into one deduplicated, confidence-ranked
/// sequence.
pub fn merge_profiles(candidate_lists: Vec<Vec<Profile>>) -> Vec<Profile> {
    let mut all: Vec<Profile> = candidate_lists.into_iter().flatten().collect();
    all.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));

    let mut admitted: Vec<Profile> = Vec::new();
    for profile in all {
        if !admitted.iter().any(|kept| is_duplicate(&profile, kept)) {
            admitted.push(profile);
        }
    }
    admitted
}

/// Duplicate judgment: similar names AND (same non-empty company OR
/// similar titles).
fn is_duplicate(a: &Profile, b: &Profile) -> bool {
    let (Some(name_a), Some(name_b)) = (a.name.as_deref(), b.name.as_deref()) else {
        return false;
    };
    if !names_similar(name_a, name_b) {
        return false;
    }

    let same_company = match (a.company.as_deref(), b.company.as_deref()) {
        (Some(ca), Some(cb)) => !ca.trim().is_empty() && ca.trim() == cb.trim(),
        _ => false,
    };
    if same_company {
        return true;
    }

    match (a.title.as_deref(), b.title.as_deref()) {
        (Some(ta), Some(tb)) => titles_similar(ta, tb),
        _ => false,
    }
}

/// Case-fold and collapse runs of whitespace.
fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Name similarity: equal after normalization, equal with spaces
/// removed, or an initials-vs-full-name variant.
pub fn names_similar(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }

    if a == b {
        return true;
    }
    if a.replace(' ', "") == b.replace(' ', "") {
        return true;
    }

    initials_variant(&a, &b) || initials_variant(&b, &a)
}

/// True when `short` abbreviates `full`: its first token is a single
/// letter (optionally dotted) matching the first letter of `full`'s
/// first token, and any remaining tokens agree. Covers both "J" vs
/// "John Smith" and "J. Smith" vs "John Smith".
fn initials_variant(short: &str, full: &str) -> bool {
    let short_tokens: Vec<&str> = short.split(' ').collect();
    let full_tokens: Vec<&str> = full.split(' ').collect();

    let (Some(first_short), Some(first_full)) = (short_tokens.first(), full_tokens.first()) else {
        return false;
    };

    let initial = first_short.trim_end_matches('.');
    if initial.chars().count() != 1 || first_full.chars().count() <= 1 {
        return false;
    }
    if initial.chars().next() != first_full.chars().next() {
        return false;
    }

    match short_tokens.len() {
        1 => full_tokens.len() > 1,
        _ => short_tokens[1..] == full_tokens[1..],
    }
}

/// Title similarity: equal after normalization or with spaces removed.
pub fn titles_similar(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.replace(' ', "") == b.replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::ExtractionStrategy;

    fn profile(name: &str, title: &str, company: &str, confidence: f64) -> Profile {
        let mut p = Profile::new("https://example.com/team", ExtractionStrategy::Heuristic);
        p.name = (!name.is_empty()).then(|| name.to_string());
        p.title = (!title.is_empty()).then(|| title.to_string());
        p.company = (!company.is_empty()).then(|| company.to_string());
        p.with_confidence(confidence)
    }

    #[test]
    fn test_names_similar_exact_and_spacing() {
        assert!(names_similar("Ada Lovelace", "ada  lovelace"));
        assert!(names_similar("AdaLovelace", "Ada Lovelace"));
        assert!(!names_similar("Ada Lovelace", "Grace Hopper"));
    }

    #[test]
    fn test_names_similar_initials() {
        assert!(names_similar("J. Smith", "John Smith"));
        assert!(names_similar("John Smith", "J. Smith"));
        assert!(names_similar("J", "John Smith"));
        assert!(!names_similar("John Smith", "Jane Doe"));
        assert!(!names_similar("J. Brown", "John Smith"));
    }

    #[test]
    fn test_names_similar_is_symmetric() {
        let pairs = [
            ("J. Smith", "John Smith"),
            ("John Smith", "Jane Doe"),
            ("AdaLovelace", "Ada Lovelace"),
            ("Grace Hopper", "Grace  hopper"),
            ("M", "Mary Shelley"),
            ("K. Godel", "Kurt Godel"),
        ];
        for (a, b) in pairs {
            assert_eq!(names_similar(a, b), names_similar(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }

    #[test]
    fn test_titles_similar() {
        assert!(titles_similar("Chief Analyst", "chief  analyst"));
        assert!(titles_similar("ChiefAnalyst", "Chief Analyst"));
        assert!(!titles_similar("Chief Analyst", "Engineer"));
    }

    #[test]
    fn test_merge_ranks_by_confidence() {
        let merged = merge_profiles(vec![
            vec![profile("Ada Lovelace", "Analyst", "", 0.5)],
            vec![profile("Grace Hopper", "Admiral", "", 0.9)],
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name.as_deref(), Some("Grace Hopper"));
        assert_eq!(merged[1].name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_merge_keeps_highest_confidence_duplicate() {
        let merged = merge_profiles(vec![
            vec![profile("Ada Lovelace", "", "Engines Ltd", 0.4)],
            vec![profile("Ada Lovelace", "", "Engines Ltd", 0.9)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].confidence, 0.9);
    }

    #[test]
    fn test_merge_duplicate_by_similar_title() {
        let merged = merge_profiles(vec![
            vec![profile("J. Smith", "Chief Analyst", "", 0.6)],
            vec![profile("John Smith", "chief analyst", "", 0.8)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name.as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_same_name_different_company_not_duplicate() {
        let merged = merge_profiles(vec![
            vec![profile("John Smith", "Engineer", "Acme", 0.7)],
            vec![profile("John Smith", "Painter", "Globex", 0.6)],
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_nameless_profiles_never_deduped() {
        let merged = merge_profiles(vec![
            vec![profile("", "Engineer", "Acme", 0.7)],
            vec![profile("", "Engineer", "Acme", 0.6)],
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = vec![
            profile("Ada Lovelace", "Analyst", "Engines Ltd", 0.8),
            profile("Grace Hopper", "Admiral", "US Navy", 0.7),
        ];

        let once = merge_profiles(vec![batch.clone()]);
        let doubled = merge_profiles(vec![batch.clone(), batch]);
        assert_eq!(once.len(), doubled.len());

        let names = |v: &[Profile]| {
            v.iter().map(|p| p.name.clone().unwrap_or_default()).collect::<Vec<_>>()
        };
        assert_eq!(names(&once), names(&doubled));
    }

    #[test]
    fn test_ties_keep_concatenation_order() {
        let merged = merge_profiles(vec![
            vec![profile("Ada Lovelace", "Analyst", "", 0.5)],
            vec![profile("Grace Hopper", "Admiral", "", 0.5)],
        ]);
        assert_eq!(merged[0].name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(merged[1].name.as_deref(), Some("Grace Hopper"));
    }
}

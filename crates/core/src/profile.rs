//! Profile data model shared by all extraction strategies.
//!
//! A [`Profile`] is one person-record pulled off a page. All content
//! fields are optional; a profile is only worth keeping when
//! [`Profile::is_meaningful`] holds, and every extractor filters on that
//! before returning candidates.

use serde::{Deserialize, Serialize};

/// Social platform keys recognized across extractors and the AI wire
/// contract, in confidence-scoring order.
pub const SOCIAL_PLATFORMS: [&str; 6] =
    ["linkedin", "twitter", "github", "website", "instagram", "facebook"];

/// Per-platform links for a single profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
}

impl SocialLinks {
    /// Number of populated links.
    pub fn count(&self) -> usize {
        SOCIAL_PLATFORMS.iter().filter(|p| self.get(p).is_some()).count()
    }

    /// True when no link is populated.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Get a link by platform key.
    pub fn get(&self, platform: &str) -> Option<&str> {
        let slot = match platform {
            "linkedin" => &self.linkedin,
            "twitter" => &self.twitter,
            "github" => &self.github,
            "website" => &self.website,
            "instagram" => &self.instagram,
            "facebook" => &self.facebook,
            _ => return None,
        };
        slot.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Set a link by platform key. Returns false for unknown platforms.
    ///
    /// An existing link is never overwritten; the first capture wins,
    /// matching the top-to-bottom document order extractors scan in.
    pub fn set(&mut self, platform: &str, url: String) -> bool {
        let slot = match platform {
            "linkedin" => &mut self.linkedin,
            "twitter" => &mut self.twitter,
            "github" => &mut self.github,
            "website" => &mut self.website,
            "instagram" => &mut self.instagram,
            "facebook" => &mut self.facebook,
            _ => return false,
        };
        if slot.is_none() {
            *slot = Some(url);
        }
        true
    }
}

/// Tag identifying which extractor produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    SiteSpecific,
    Heuristic,
    Ai,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::SiteSpecific => "site_specific",
            ExtractionStrategy::Heuristic => "heuristic",
            ExtractionStrategy::Ai => "ai",
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted person-record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,

    /// Source page URL this profile was extracted from.
    pub extracted_from: String,

    /// Extractor-assigned confidence, clamped to 0.0..=1.0.
    pub confidence: f64,

    /// Which extractor produced this profile.
    pub strategy: ExtractionStrategy,

    /// Opaque original payload, extractor-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,
}

impl Profile {
    /// Create an empty profile attributed to `url` and `strategy`.
    pub fn new(url: impl Into<String>, strategy: ExtractionStrategy) -> Self {
        Self {
            name: None,
            title: None,
            email: None,
            phone: None,
            bio: None,
            company: None,
            location: None,
            image: None,
            social_links: SocialLinks::default(),
            extracted_from: url.into(),
            confidence: 0.0,
            strategy,
            raw_data: None,
        }
    }

    /// Set the confidence, clamping into 0.0..=1.0.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// A profile is meaningful only if at least one of name, title, or
    /// email is non-empty after trimming. Extractors discard candidates
    /// that fail this.
    pub fn is_meaningful(&self) -> bool {
        [&self.name, &self.title, &self.email]
            .iter()
            .any(|f| field_is_set(f))
    }

    /// Count of populated basic fields (of the 8 candidate fields).
    pub fn filled_basic_fields(&self) -> usize {
        [
            &self.name,
            &self.title,
            &self.email,
            &self.phone,
            &self.bio,
            &self.company,
            &self.location,
            &self.image,
        ]
        .iter()
        .filter(|f| field_is_set(f))
        .count()
    }
}

fn field_is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_not_meaningful() {
        let profile = Profile::new("https://example.com", ExtractionStrategy::Heuristic);
        assert!(!profile.is_meaningful());
        assert_eq!(profile.filled_basic_fields(), 0);
    }

    #[test]
    fn test_whitespace_fields_not_meaningful() {
        let mut profile = Profile::new("https://example.com", ExtractionStrategy::Heuristic);
        profile.name = Some("   ".to_string());
        profile.title = Some(String::new());
        assert!(!profile.is_meaningful());
    }

    #[test]
    fn test_any_of_name_title_email_is_meaningful() {
        for field in ["name", "title", "email"] {
            let mut profile = Profile::new("https://example.com", ExtractionStrategy::Ai);
            match field {
                "name" => profile.name = Some("Ada Lovelace".to_string()),
                "title" => profile.title = Some("Engineer".to_string()),
                _ => profile.email = Some("ada@example.com".to_string()),
            }
            assert!(profile.is_meaningful(), "field {field} should be enough");
        }
    }

    #[test]
    fn test_bio_alone_not_meaningful() {
        let mut profile = Profile::new("https://example.com", ExtractionStrategy::Heuristic);
        profile.bio = Some("A long biography".to_string());
        assert!(!profile.is_meaningful());
        assert_eq!(profile.filled_basic_fields(), 1);
    }

    #[test]
    fn test_confidence_clamped() {
        let profile =
            Profile::new("https://example.com", ExtractionStrategy::Ai).with_confidence(1.7);
        assert_eq!(profile.confidence, 1.0);

        let profile =
            Profile::new("https://example.com", ExtractionStrategy::Ai).with_confidence(-0.2);
        assert_eq!(profile.confidence, 0.0);
    }

    #[test]
    fn test_social_links_set_get() {
        let mut links = SocialLinks::default();
        assert!(links.is_empty());

        assert!(links.set("github", "https://github.com/ada".to_string()));
        assert!(!links.set("myspace", "https://myspace.com/ada".to_string()));

        assert_eq!(links.get("github"), Some("https://github.com/ada"));
        assert_eq!(links.get("twitter"), None);
        assert_eq!(links.count(), 1);
    }

    #[test]
    fn test_social_links_first_capture_wins() {
        let mut links = SocialLinks::default();
        links.set("linkedin", "https://linkedin.com/in/first".to_string());
        links.set("linkedin", "https://linkedin.com/in/second".to_string());
        assert_eq!(links.get("linkedin"), Some("https://linkedin.com/in/first"));
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&ExtractionStrategy::SiteSpecific).unwrap();
        assert_eq!(json, "\"site_specific\"");
        assert_eq!(ExtractionStrategy::Ai.to_string(), "ai");
    }

    #[test]
    fn test_profile_roundtrip() {
        let mut profile = Profile::new("https://example.com/team", ExtractionStrategy::Heuristic);
        profile.name = Some("Grace Hopper".to_string());
        profile.social_links.set("github", "https://github.com/grace".to_string());
        let profile = profile.with_confidence(0.6);

        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(back.strategy, ExtractionStrategy::Heuristic);
        assert_eq!(back.social_links.get("github"), Some("https://github.com/grace"));
    }
}

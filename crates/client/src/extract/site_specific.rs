//! Hand-tuned extraction rules for known profile hosts.
//!
//! Evaluated first and trusted most: when the URL matches a known host
//! pattern, these rules read the site's own markup conventions directly
//! instead of guessing. Unknown hosts yield nothing and the generic
//! strategies take over.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use persona_core::{Error, ExtractionStrategy, Profile};

use super::{ProfileExtractor, absolutize, clean_text};
use crate::fetch::url::host_in_domain;

/// Confidence assigned to rule-matched profiles.
const SITE_CONFIDENCE: f64 = 0.9;

/// Extractor backed by a per-host rule table.
#[derive(Debug, Default)]
pub struct SiteSpecificExtractor;

impl SiteSpecificExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProfileExtractor for SiteSpecificExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::SiteSpecific
    }

    async fn extract(&self, html: &str, url: &Url) -> Result<Vec<Profile>, Error> {
        let Some(host) = url.host_str() else {
            return Ok(Vec::new());
        };

        let profiles = if host_in_domain(host, "linkedin.com") {
            extract_linkedin(html, url)
        } else if host_in_domain(host, "github.com") {
            extract_github(html, url)
        } else {
            Vec::new()
        };

        Ok(profiles.into_iter().filter(Profile::is_meaningful).collect())
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

fn first_text(doc: &Html, css: &str) -> Option<String> {
    let sel = selector(css);
    doc.select(&sel).map(|el| clean_text(&el)).find(|t| !t.is_empty())
}

fn first_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let sel = selector(css);
    doc.select(&sel).find_map(|el| el.value().attr(attr).map(str::to_string))
}

/// LinkedIn public profile page: one profile per page, read off the
/// top-card markup.
fn extract_linkedin(html: &str, url: &Url) -> Vec<Profile> {
    let doc = Html::parse_document(html);

    let mut profile = Profile::new(url.as_str(), ExtractionStrategy::SiteSpecific);
    profile.name = first_text(&doc, "h1.text-heading-xlarge, .pv-text-details__left-panel h1, h1.top-card-layout__title");
    profile.title = first_text(&doc, ".text-body-medium.break-words, .top-card-layout__headline");
    profile.location =
        first_text(&doc, ".pv-text-details__left-panel .text-body-small, .top-card__subline-item");
    profile.bio = first_text(&doc, ".pv-about-section .pv-about__summary-text, .core-section-container__content p");
    profile.image = first_attr(&doc, "img.pv-top-card-profile-picture__image, img.top-card-layout__entity-image", "src")
        .and_then(|src| absolutize(url, &src));
    profile.social_links.set("linkedin", url.to_string());

    vec![profile.with_confidence(SITE_CONFIDENCE)]
}

/// GitHub user page: vcard markup carries the whole identity block.
fn extract_github(html: &str, url: &Url) -> Vec<Profile> {
    let doc = Html::parse_document(html);

    let mut profile = Profile::new(url.as_str(), ExtractionStrategy::SiteSpecific);
    profile.name = first_text(&doc, ".vcard-fullname, span.p-name");
    profile.company = first_text(&doc, ".vcard-detail .p-org, span.p-org");
    profile.location = first_text(&doc, "li[itemprop='homeLocation'], span.p-label");
    profile.bio = first_text(&doc, ".user-profile-bio, div.p-note");
    profile.image = first_attr(&doc, "img.avatar-user, img.avatar", "src")
        .and_then(|src| absolutize(url, &src));
    profile.email = first_attr(&doc, "li[itemprop='email'] a[href^='mailto:']", "href")
        .map(|href| href.trim_start_matches("mailto:").to_string());
    profile.social_links.set("github", url.to_string());
    if let Some(site) = first_attr(&doc, "li[itemprop='url'] a", "href") {
        if let Some(abs) = absolutize(url, &site) {
            profile.social_links.set("website", abs);
        }
    }

    vec![profile.with_confidence(SITE_CONFIDENCE)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKEDIN_FIXTURE: &str = r#"
        <html><body>
            <div class="pv-top-card">
                <h1 class="text-heading-xlarge">Linus Torvalds</h1>
                <div class="text-body-medium break-words">Creator of Linux</div>
                <div class="pv-text-details__left-panel">
                    <span class="text-body-small">Portland, Oregon</span>
                </div>
                <img class="pv-top-card-profile-picture__image" src="/media/linus.jpg" />
            </div>
        </body></html>
    "#;

    const GITHUB_FIXTURE: &str = r#"
        <html><body>
            <img class="avatar avatar-user" src="https://avatars.example.com/u/1" />
            <span class="p-name vcard-fullname">Grace Hopper</span>
            <span class="p-org">US Navy</span>
            <span class="p-label">Arlington, VA</span>
            <div class="p-note user-profile-bio">Compiler pioneer.</div>
            <li itemprop="url"><a href="https://gracehopper.example.com">site</a></li>
        </body></html>
    "#;

    async fn extract(html: &str, url: &str) -> Vec<Profile> {
        let extractor = SiteSpecificExtractor::new();
        let url = Url::parse(url).unwrap();
        extractor.extract(html, &url).await.unwrap()
    }

    #[tokio::test]
    async fn test_linkedin_profile() {
        let profiles = extract(LINKEDIN_FIXTURE, "https://www.linkedin.com/in/torvalds").await;
        assert_eq!(profiles.len(), 1);

        let p = &profiles[0];
        assert_eq!(p.name.as_deref(), Some("Linus Torvalds"));
        assert_eq!(p.title.as_deref(), Some("Creator of Linux"));
        assert_eq!(p.location.as_deref(), Some("Portland, Oregon"));
        assert_eq!(p.image.as_deref(), Some("https://www.linkedin.com/media/linus.jpg"));
        assert_eq!(p.strategy, ExtractionStrategy::SiteSpecific);
        assert_eq!(p.confidence, 0.9);
        assert_eq!(
            p.social_links.get("linkedin"),
            Some("https://www.linkedin.com/in/torvalds")
        );
    }

    #[tokio::test]
    async fn test_github_profile() {
        let profiles = extract(GITHUB_FIXTURE, "https://github.com/grace").await;
        assert_eq!(profiles.len(), 1);

        let p = &profiles[0];
        assert_eq!(p.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(p.company.as_deref(), Some("US Navy"));
        assert_eq!(p.bio.as_deref(), Some("Compiler pioneer."));
        assert_eq!(p.social_links.get("github"), Some("https://github.com/grace"));
        assert_eq!(p.social_links.get("website"), Some("https://gracehopper.example.com"));
    }

    #[tokio::test]
    async fn test_unknown_host_yields_nothing() {
        let profiles = extract(LINKEDIN_FIXTURE, "https://example.com/team").await;
        assert!(profiles.is_empty());
    }

    #[tokio::test]
    async fn test_empty_markup_discarded() {
        let profiles =
            extract("<html><body></body></html>", "https://www.linkedin.com/in/ghost").await;
        assert!(profiles.is_empty());
    }
}

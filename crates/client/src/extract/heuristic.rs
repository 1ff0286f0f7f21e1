//! Generic structural profile extraction.
//!
//! Site-agnostic middle strategy: scan the document for markers that
//! people-pages share across the web. Container elements whose class
//! names look like profile/member/team cards, headings with name-like
//! classes, anchors pointing at known social hosts, and mailto links.
//! No host knowledge is used.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use persona_core::{Error, ExtractionStrategy, Profile};

use super::{ProfileExtractor, absolutize, clean_text, social_platform_for};

/// Class substrings that mark an element as a profile-ish container.
const CONTAINER_MARKERS: [&str; 8] =
    ["profile", "user", "member", "team", "person", "staff", "people", "employee"];

/// Class substrings that mark a name-bearing element.
const NAME_MARKERS: [&str; 4] = ["name", "author", "person", "fullname"];

/// Class substrings that mark a job-title element.
const TITLE_MARKERS: [&str; 5] = ["title", "role", "position", "job", "headline"];

/// Base confidence for heuristic hits; field coverage nudges it up.
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_CAP: f64 = 0.85;

/// Site-agnostic CSS-pattern extractor.
#[derive(Debug, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProfileExtractor for HeuristicExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Heuristic
    }

    async fn extract(&self, html: &str, url: &Url) -> Result<Vec<Profile>, Error> {
        Ok(extract_profiles(html, url))
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

fn class_contains(element: &ElementRef<'_>, markers: &[&str]) -> bool {
    element.value().attr("class").is_some_and(|classes| {
        let classes = classes.to_lowercase();
        markers.iter().any(|m| classes.contains(m))
    })
}

fn extract_profiles(html: &str, url: &Url) -> Vec<Profile> {
    let doc = Html::parse_document(html);

    let mut profiles = profiles_from_containers(&doc, url);
    if profiles.is_empty()
        && let Some(profile) = page_level_profile(&doc, url)
    {
        profiles.push(profile);
    }
    profiles
}

/// One profile per marked container that holds exactly one heading.
///
/// Wrapper sections (a team grid around the individual cards) match the
/// same class markers but carry several headings; requiring a single
/// heading keeps extraction at the per-person level.
fn profiles_from_containers(doc: &Html, url: &Url) -> Vec<Profile> {
    let container_sel = selector("div, li, article, section");
    let heading_sel = selector("h1, h2, h3, h4");

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut profiles = Vec::new();

    for container in doc.select(&container_sel) {
        if !class_contains(&container, &CONTAINER_MARKERS) {
            continue;
        }

        let headings: Vec<ElementRef<'_>> = container.select(&heading_sel).collect();
        if headings.len() != 1 {
            continue;
        }

        let profile = profile_from_container(&container, &headings[0], url);
        if !profile.is_meaningful() {
            continue;
        }

        let key = profile.name.as_deref().unwrap_or_default().to_lowercase();
        if seen_names.insert(key) {
            profiles.push(profile);
        }
    }

    profiles
}

fn profile_from_container(container: &ElementRef<'_>, heading: &ElementRef<'_>, url: &Url) -> Profile {
    let mut profile = Profile::new(url.as_str(), ExtractionStrategy::Heuristic);

    let heading_text = clean_text(heading);
    if !heading_text.is_empty() {
        profile.name = Some(heading_text);
    } else {
        profile.name = marked_text(container, &NAME_MARKERS);
    }

    profile.title = marked_text(container, &TITLE_MARKERS);
    profile.image = first_image(container, url);
    collect_contacts(container, url, &mut profile);

    let bump = 0.05 * profile.filled_basic_fields().saturating_sub(1) as f64;
    profile.with_confidence((BASE_CONFIDENCE + bump).min(CONFIDENCE_CAP))
}

/// Fallback when no container matched: a page that is itself a single
/// profile, recognized purely by marker classes on its headings.
fn page_level_profile(doc: &Html, url: &Url) -> Option<Profile> {
    let heading_sel = selector("h1, h2, h3");
    let name = doc
        .select(&heading_sel)
        .filter(|el| class_contains(el, &NAME_MARKERS))
        .map(|el| clean_text(&el))
        .find(|t| !t.is_empty())?;

    let mut profile = Profile::new(url.as_str(), ExtractionStrategy::Heuristic);
    profile.name = Some(name);

    let root = doc.root_element();
    profile.title = marked_text(&root, &TITLE_MARKERS);
    collect_contacts(&root, url, &mut profile);

    let bump = 0.05 * profile.filled_basic_fields().saturating_sub(1) as f64;
    let profile = profile.with_confidence((BASE_CONFIDENCE + bump).min(CONFIDENCE_CAP));
    profile.is_meaningful().then_some(profile)
}

/// First non-empty text under an element whose class matches `markers`,
/// excluding headings (those are handled by the caller).
fn marked_text(scope: &ElementRef<'_>, markers: &[&str]) -> Option<String> {
    let sel = selector("p, span, div, em, strong");
    scope
        .select(&sel)
        .filter(|el| class_contains(el, markers))
        .map(|el| clean_text(&el))
        .find(|t| !t.is_empty() && t.len() < 200)
}

fn first_image(scope: &ElementRef<'_>, url: &Url) -> Option<String> {
    let sel = selector("img[src]");
    scope
        .select(&sel)
        .filter_map(|el| el.value().attr("src"))
        .find(|src| !src.contains("1x1") && !src.contains("pixel") && src.len() >= 8)
        .and_then(|src| absolutize(url, src))
}

/// Harvest social links and email from anchors, falling back to a text
/// scan for emails printed in the clear.
fn collect_contacts(scope: &ElementRef<'_>, url: &Url, profile: &mut Profile) {
    let anchor_sel = selector("a[href]");
    for anchor in scope.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else { continue };

        if let Some(address) = href.strip_prefix("mailto:") {
            let address = address.split('?').next().unwrap_or(address).trim();
            if profile.email.is_none() && !address.is_empty() {
                profile.email = Some(address.to_string());
            }
            continue;
        }

        if let Some(resolved) = absolutize(url, href)
            && let Some(platform) = social_platform_for(&resolved)
        {
            profile.social_links.set(platform, resolved);
        }
    }

    if profile.email.is_none() {
        let text: String = scope.text().collect::<Vec<_>>().join(" ");
        let email_re = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("invalid email pattern");
        profile.email = email_re.find(&text).map(|m| m.as_str().to_string());
    }
}

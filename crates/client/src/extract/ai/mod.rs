//! AI-model profile extraction fallback.
//!
//! The most expensive strategy, run last and only while the cheaper
//! extractors have not already filled the request. The document is
//! condensed to a text representation, embedded in a fixed
//! ONLY-real-data instruction prompt, and sent to a chat-completions
//! service. Model output is free-form text, so parsing is defensive:
//!
//! 1. up to [`MAX_ATTEMPTS`] calls on failure or malformed JSON
//! 2. the first brace-delimited object is cut out of the reply
//! 3. a line-oriented `key: value` parse is the last resort
//!
//! Every failure mode degrades to an empty candidate list; nothing
//! propagates out of [`AiExtractor::extract`].

pub mod client;

pub use client::{ChatClient, ChatConfig};

use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use persona_core::{Error, ExtractionStrategy, Profile};

use super::{ProfileExtractor, absolutize, clean_text};

/// Retry budget for one extraction.
const MAX_ATTEMPTS: usize = 3;

/// Default character budget for the condensed page text.
const DEFAULT_CONTENT_BUDGET: usize = 8_000;

/// Instruction template. The trailing page content is appended per call.
const EXTRACTION_PROMPT: &str = r#"You are an expert web data assistant. Analyze the following page content and extract the people profiles that actually appear in it.

CRITICAL: only extract REAL data that exists in the content. Do NOT generate fake or placeholder values. If you see "Linus Torvalds" in the content, extract that exact name; if you see "Creator of Linux" as a title, extract that exact title. If no clear profile data exists, return an empty profiles array.

Focus on:
1. Real names (from headings, titles, or profile sections)
2. Actual job titles (from the text, not generic ones)
3. Real company information
4. Actual social media links (LinkedIn, Twitter, GitHub, etc.)
5. Real biographical text
6. Profile image URLs that appear in the content

Return ONLY a JSON object in exactly this shape:
{
    "profiles": [
        {
            "name": "exact name from page or null",
            "title": "exact title from page or null",
            "email": "email from page or null",
            "phone": "phone from page or null",
            "bio": "actual bio text from page or null",
            "company": "company name from page or null",
            "location": "location from page or null",
            "socialLinks": {
                "linkedin": "actual linkedin url or null",
                "twitter": "actual twitter url or null",
                "github": "actual github url or null",
                "website": "actual website url or null",
                "instagram": "actual instagram url or null",
                "facebook": "actual facebook url or null"
            },
            "image": "actual image url from page or null"
        }
    ]
}

Remember: only extract real data that exists in the content. No fake data."#;

/// Extractor that delegates to a generative-text service.
pub struct AiExtractor {
    chat: ChatClient,
    max_content_chars: usize,
}

impl AiExtractor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat, max_content_chars: DEFAULT_CONTENT_BUDGET }
    }

    /// Override the condensed-content character budget.
    pub fn with_content_budget(mut self, chars: usize) -> Self {
        self.max_content_chars = chars;
        self
    }

    /// Call the model and parse its reply, retrying on malformed JSON.
    async fn request_profiles(&self, content: &str) -> Vec<AiProfile> {
        let prompt = format!("{EXTRACTION_PROMPT}\n\nPage content:\n{content}");
        let mut last_reply: Option<String> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let reply = match self.chat.complete(&prompt).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "AI call failed");
                    continue;
                }
            };

            match extract_json_object(&reply) {
                Some(span) => match serde_json::from_str::<AiPayload>(span) {
                    Ok(payload) => return payload.profiles,
                    Err(e) => {
                        tracing::debug!(attempt, error = %e, "malformed payload JSON");
                        last_reply = Some(reply);
                    }
                },
                // no JSON at all: go straight to the line-oriented fallback
                None => return parse_manual(&reply).into_iter().collect(),
            }
        }

        tracing::warn!("AI extraction exhausted {MAX_ATTEMPTS} attempts");
        last_reply.and_then(|r| parse_manual(&r)).into_iter().collect()
    }
}

#[async_trait]
impl ProfileExtractor for AiExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Ai
    }

    async fn extract(&self, html: &str, url: &Url) -> Result<Vec<Profile>, Error> {
        let condensed = condense_markup(html, self.max_content_chars);
        if condensed.trim().is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.request_profiles(&condensed).await;
        Ok(candidates.into_iter().filter_map(|ai| to_profile(ai, url)).collect())
    }
}

/// Wire shape of the documented `{"profiles": [...]}` payload.
#[derive(Debug, Default, Deserialize)]
struct AiPayload {
    #[serde(default)]
    profiles: Vec<AiProfile>,
}

/// One profile as the model reports it (camelCase wire contract).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AiProfile {
    name: Option<String>,
    title: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    company: Option<String>,
    location: Option<String>,
    image: Option<String>,
    social_links: AiSocialLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct AiSocialLinks {
    linkedin: Option<String>,
    twitter: Option<String>,
    github: Option<String>,
    website: Option<String>,
    instagram: Option<String>,
    facebook: Option<String>,
}

impl AiSocialLinks {
    fn entries(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("linkedin", &self.linkedin),
            ("twitter", &self.twitter),
            ("github", &self.github),
            ("website", &self.website),
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
        ]
    }

    fn set(&mut self, platform: &str, value: String) {
        match platform {
            "linkedin" => self.linkedin = Some(value),
            "twitter" => self.twitter = Some(value),
            "github" => self.github = Some(value),
            "website" => self.website = Some(value),
            "instagram" => self.instagram = Some(value),
            "facebook" => self.facebook = Some(value),
            _ => {}
        }
    }

    fn filled(&self) -> usize {
        self.entries().iter().filter(|(_, v)| is_set(v)).count()
    }

    fn cleaned(self) -> Self {
        Self {
            linkedin: cleaned(self.linkedin),
            twitter: cleaned(self.twitter),
            github: cleaned(self.github),
            website: cleaned(self.website),
            instagram: cleaned(self.instagram),
            facebook: cleaned(self.facebook),
        }
    }
}

impl AiProfile {
    /// Normalize model quirks: empty strings and literal "null" become
    /// real absences.
    fn cleaned(self) -> Self {
        Self {
            name: cleaned(self.name),
            title: cleaned(self.title),
            email: cleaned(self.email),
            phone: cleaned(self.phone),
            bio: cleaned(self.bio),
            company: cleaned(self.company),
            location: cleaned(self.location),
            image: cleaned(self.image),
            social_links: self.social_links.cleaned(),
        }
    }

    fn filled_basic(&self) -> usize {
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
        .filter(|f| is_set(f))
        .count()
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn cleaned(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

/// Confidence for an AI-extracted profile: 0.1 per basic field, 0.05
/// per social link, 0.1 bonus when at least 3 basic fields are filled,
/// capped at 1.0.
fn ai_confidence(profile: &AiProfile) -> f64 {
    let filled = profile.filled_basic();
    let mut score = 0.1 * filled as f64 + 0.05 * profile.social_links.filled() as f64;
    if filled >= 3 {
        score += 0.1;
    }
    score.min(1.0)
}

/// Convert a wire profile into the domain model, absolutizing URLs and
/// discarding non-meaningful candidates.
fn to_profile(ai: AiProfile, url: &Url) -> Option<Profile> {
    let ai = ai.cleaned();

    let mut profile = Profile::new(url.as_str(), ExtractionStrategy::Ai);
    profile.name = ai.name.clone();
    profile.title = ai.title.clone();
    profile.email = ai.email.clone();
    profile.phone = ai.phone.clone();
    profile.bio = ai.bio.clone();
    profile.company = ai.company.clone();
    profile.location = ai.location.clone();
    profile.image = ai.image.as_deref().and_then(|i| absolutize(url, i));

    for (platform, link) in ai.social_links.entries() {
        if let Some(link) = link.as_deref()
            && let Some(resolved) = absolutize(url, link)
        {
            profile.social_links.set(platform, resolved);
        }
    }

    let confidence = ai_confidence(&ai);
    profile.raw_data = serde_json::to_value(&ai).ok();

    let profile = profile.with_confidence(confidence);
    profile.is_meaningful().then_some(profile)
}

/// Cut the first brace-delimited object out of free-form model output.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Line-oriented `key: value` parse, the last resort when the model
/// answered in prose.
fn parse_manual(text: &str) -> Option<AiProfile> {
    let mut profile = AiProfile::default();
    let mut any = false;

    for line in text.lines() {
        let line = line.trim().trim_start_matches(['-', '*', ' ']);
        let Some((key, value)) = line.split_once(':') else { continue };

        let key = key.trim().to_lowercase().replace(['*', '"', '`'], "");
        let value = value.trim().trim_matches(['"', ',', '`']).to_string();
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            continue;
        }

        match key.as_str() {
            "name" => profile.name = Some(value),
            "title" => profile.title = Some(value),
            "email" => profile.email = Some(value),
            "phone" => profile.phone = Some(value),
            "bio" => profile.bio = Some(value),
            "company" => profile.company = Some(value),
            "location" => profile.location = Some(value),
            "image" => profile.image = Some(value),
            "linkedin" | "twitter" | "github" | "website" | "instagram" | "facebook" => {
                profile.social_links.set(&key, value)
            }
            _ => continue,
        }
        any = true;
    }

    any.then(|| profile.cleaned())
}

const NOISE_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Class tokens the original page decorates noise with.
const NOISE_CLASSES: [&str; 10] = [
    "advertisement",
    "ads",
    "banner",
    "popup",
    "cookie-notice",
    "newsletter",
    "sidebar",
    "navigation",
    "menu",
    "breadcrumb",
];

fn in_noise(element: &ElementRef<'_>) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|ancestor| {
        let value = ancestor.value();
        if NOISE_TAGS.contains(&value.name()) {
            return true;
        }
        value.attr("class").is_some_and(|classes| {
            classes
                .to_lowercase()
                .split_whitespace()
                .any(|token| NOISE_CLASSES.contains(&token))
        })
    })
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Reduce a document to the condensed text representation sent to the
/// model: headings, sufficiently long text blocks, and link pairs, with
/// chrome and ad-like containers stripped, truncated to `budget` chars.
fn condense_markup(html: &str, budget: usize) -> String {
    let doc = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    let heading_sel = selector("h1, h2, h3");
    for heading in doc.select(&heading_sel) {
        if in_noise(&heading) {
            continue;
        }
        let text = clean_text(&heading);
        if !text.is_empty() && seen.insert(text.clone()) {
            lines.push(format!("HEADING: {text}"));
        }
    }

    let block_sel = selector("p, li, blockquote");
    for block in doc.select(&block_sel) {
        if in_noise(&block) {
            continue;
        }
        let text = clean_text(&block);
        if text.len() > 10 && seen.insert(text.clone()) {
            lines.push(text);
        }
    }

    let anchor_sel = selector("a[href]");
    for anchor in doc.select(&anchor_sel) {
        if in_noise(&anchor) {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else { continue };
        let text = clean_text(&anchor);
        if text.is_empty() || href.trim().is_empty() {
            continue;
        }
        let line = format!("LINK: {text} -> {href}");
        if seen.insert(line.clone()) {
            lines.push(line);
        }
    }

    let mut out = lines.join("\n");
    truncate_to_budget(&mut out, budget);
    out
}

fn truncate_to_budget(text: &mut String, budget: usize) {
    if text.len() <= budget {
        return;
    }
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

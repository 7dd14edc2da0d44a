//! Story card view-model.
//!
//! A [`StoryCard`] is built from a [`Story`] once, and can then be turned
//! into escaped HTML or into terminal lines. Both renderings show the same
//! content in the same order.

use crate::protocol::{Character, Story};
use std::time::{Duration, Instant};

/// Time between appending a card and starting its fade-in.
pub const REVEAL_DELAY: Duration = Duration::from_millis(50);
/// Length of the fade-in itself.
pub const REVEAL_DURATION: Duration = Duration::from_millis(600);

const CARD_CLASS: &str = "bg-gray-900 border border-gray-800 rounded-2xl p-6 shadow-lg transition-all hover:shadow-indigo-700/30";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryCard {
    pub title: String,
    pub genre_subgenre: String,
    pub premise: String,
    pub characters: Vec<CharacterLine>,
    pub central_conflict: String,
    pub themes: String,
    pub tone_and_style: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterLine {
    pub name: String,
    pub summary: String,
}

impl CharacterLine {
    pub fn from_character(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            summary: format!(
                "{}, {}, motivated by {}",
                character.role, character.personality, character.motivation
            ),
        }
    }

    /// `name — role, personality, motivated by motivation`
    pub fn to_plain(&self) -> String {
        format!("{} — {}", self.name, self.summary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardLine {
    Title(String),
    Caption(String),
    Paragraph(String),
    Heading(&'static str),
    Character(CharacterLine),
    Field { label: &'static str, value: String },
    Rationale(String),
}

impl StoryCard {
    pub fn from_story(story: &Story) -> Self {
        Self {
            title: story.title.clone(),
            genre_subgenre: story.genre_subgenre.clone(),
            premise: story.premise.clone(),
            characters: story
                .main_characters
                .iter()
                .map(CharacterLine::from_character)
                .collect(),
            central_conflict: story.central_conflict.clone(),
            themes: story.themes.join(", "),
            tone_and_style: story.tone_and_style.clone(),
            rationale: story.why_it_works_for_this_writer.clone(),
        }
    }

    pub fn lines(&self) -> Vec<CardLine> {
        let mut lines = vec![
            CardLine::Title(self.title.clone()),
            CardLine::Caption(self.genre_subgenre.clone()),
            CardLine::Paragraph(self.premise.clone()),
            CardLine::Heading("Main Characters"),
        ];
        lines.extend(self.characters.iter().cloned().map(CardLine::Character));
        lines.push(CardLine::Field {
            label: "Central Conflict:",
            value: self.central_conflict.clone(),
        });
        lines.push(CardLine::Field {
            label: "Themes:",
            value: self.themes.clone(),
        });
        lines.push(CardLine::Field {
            label: "Tone & Style:",
            value: self.tone_and_style.clone(),
        });
        lines.push(CardLine::Rationale(self.rationale.clone()));
        lines
    }

    pub fn to_plain_text(&self) -> String {
        self.lines()
            .iter()
            .map(|line| match line {
                CardLine::Title(text) => text.clone(),
                CardLine::Caption(text) => text.clone(),
                CardLine::Paragraph(text) => text.clone(),
                CardLine::Heading(text) => text.to_string(),
                CardLine::Character(character) => format!("  - {}", character.to_plain()),
                CardLine::Field { label, value } => format!("{} {}", label, value),
                CardLine::Rationale(text) => format!("Why it works for you: {}", text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_html(&self) -> String {
        let characters: String = self
            .characters
            .iter()
            .map(|character| {
                format!(
                    "<li><strong>{}</strong> — {}</li>",
                    escape_html(&character.name),
                    escape_html(&character.summary)
                )
            })
            .collect();

        format!(
            concat!(
                "<div class=\"{class}\">\n",
                "  <h2 class=\"text-2xl font-bold text-indigo-400 mb-2\">{title}</h2>\n",
                "  <p class=\"text-sm text-gray-400 mb-3 italic\">{genre}</p>\n",
                "  <p class=\"mb-4\">{premise}</p>\n",
                "  <div class=\"mb-4\">\n",
                "    <h3 class=\"font-semibold text-indigo-300 mb-1\">Main Characters</h3>\n",
                "    <ul class=\"list-disc list-inside text-sm space-y-1\">{characters}</ul>\n",
                "  </div>\n",
                "  <p><strong>Central Conflict:</strong> {conflict}</p>\n",
                "  <p><strong>Themes:</strong> {themes}</p>\n",
                "  <p><strong>Tone &amp; Style:</strong> {tone}</p>\n",
                "  <p class=\"mt-2 text-gray-400 text-sm\"><strong>Why it works for you:</strong> {why}</p>\n",
                "</div>"
            ),
            class = CARD_CLASS,
            title = escape_html(&self.title),
            genre = escape_html(&self.genre_subgenre),
            premise = escape_html(&self.premise),
            characters = characters,
            conflict = escape_html(&self.central_conflict),
            themes = escape_html(&self.themes),
            tone = escape_html(&self.tone_and_style),
            why = escape_html(&self.rationale),
        )
    }
}

pub fn error_html(message: &str) -> String {
    format!(
        "<p class=\"text-red-400 text-center\">{}</p>",
        escape_html(message)
    )
}

/// Wraps rendered fragments into a standalone page.
pub fn page_html(fragments: &[String]) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>Story concepts</title>\n",
            "<script src=\"https://cdn.tailwindcss.com\"></script>\n",
            "</head>\n",
            "<body class=\"bg-gray-950 text-gray-100\">\n",
            "<div id=\"output\" class=\"max-w-3xl mx-auto p-6 space-y-6\">\n",
            "{}\n",
            "</div>\n",
            "</body>\n",
            "</html>\n"
        ),
        fragments.join("\n")
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fade-in state of an appended card. Purely cosmetic: content is in the
/// output from the moment the card is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    appended_at: Instant,
}

impl Reveal {
    pub fn start(now: Instant) -> Self {
        Self { appended_at: now }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.appended_at);
        if elapsed < REVEAL_DELAY {
            return 0.0;
        }
        let progress = (elapsed - REVEAL_DELAY).as_secs_f32() / REVEAL_DURATION.as_secs_f32();
        ease(progress.min(1.0))
    }
}

// Smoothstep, close enough to CSS `ease` for a terminal.
fn ease(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Story {
        Story {
            title: "Salt & Smoke".to_string(),
            genre_subgenre: "Fantasy / Heist".to_string(),
            premise: "A smuggler owes a debt.".to_string(),
            main_characters: vec![
                Character {
                    name: "Mara".to_string(),
                    role: "smuggler".to_string(),
                    personality: "wry".to_string(),
                    motivation: "freedom".to_string(),
                },
                Character {
                    name: "Ox".to_string(),
                    role: "enforcer".to_string(),
                    personality: "gentle".to_string(),
                    motivation: "his sister".to_string(),
                },
            ],
            central_conflict: "The debt comes due".to_string(),
            themes: vec!["loyalty".to_string(), "greed".to_string(), "home".to_string()],
            tone_and_style: "Brisk".to_string(),
            why_it_works_for_this_writer: "You like capers".to_string(),
        }
    }

    #[test]
    fn character_lines_follow_card_format() {
        let card = StoryCard::from_story(&story());
        let plain: Vec<String> = card.characters.iter().map(CharacterLine::to_plain).collect();

        assert_eq!(
            plain,
            vec![
                "Mara — smuggler, wry, motivated by freedom",
                "Ox — enforcer, gentle, motivated by his sister"
            ]
        );
        assert_eq!(card.themes, "loyalty, greed, home");
    }

    #[test]
    fn lines_keep_card_order() {
        let lines = StoryCard::from_story(&story()).lines();

        assert_eq!(lines[0], CardLine::Title("Salt & Smoke".to_string()));
        assert_eq!(lines[3], CardLine::Heading("Main Characters"));
        assert!(matches!(lines[4], CardLine::Character(_)));
        assert!(matches!(lines[5], CardLine::Character(_)));
        assert_eq!(
            lines[6],
            CardLine::Field {
                label: "Central Conflict:",
                value: "The debt comes due".to_string()
            }
        );
        assert_eq!(lines.last(), Some(&CardLine::Rationale("You like capers".to_string())));
    }

    #[test]
    fn html_escapes_story_text() {
        let mut hostile = story();
        hostile.title = "<script>alert('x')</script>".to_string();
        hostile.main_characters[0].name = "<img src=x onerror=y>".to_string();

        let html = StoryCard::from_story(&hostile).to_html();

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("<strong>&lt;img src=x onerror=y&gt;</strong> — smuggler, wry, motivated by freedom"));
        assert!(html.contains("<strong>Themes:</strong> loyalty, greed, home"));
    }

    #[test]
    fn empty_story_renders_without_content() {
        let html = StoryCard::from_story(&Story::default()).to_html();
        assert!(html.contains("<h2 class=\"text-2xl font-bold text-indigo-400 mb-2\"></h2>"));
        assert!(html.contains("<ul class=\"list-disc list-inside text-sm space-y-1\"></ul>"));
    }

    #[test]
    fn error_html_matches_inline_message() {
        assert_eq!(
            error_html("Error connecting to API."),
            "<p class=\"text-red-400 text-center\">Error connecting to API.</p>"
        );
    }

    #[test]
    fn reveal_starts_hidden_and_settles_visible() {
        let start = Instant::now();
        let reveal = Reveal::start(start);

        assert_eq!(reveal.opacity(start), 0.0);
        assert_eq!(reveal.opacity(start + Duration::from_millis(49)), 0.0);
        let midway = reveal.opacity(start + REVEAL_DELAY + REVEAL_DURATION / 2);
        assert!(midway > 0.0 && midway < 1.0);
        assert_eq!(reveal.opacity(start + REVEAL_DELAY), 0.0);
        assert_eq!(reveal.opacity(start + REVEAL_DELAY + REVEAL_DURATION), 1.0);
        assert_eq!(reveal.opacity(start + Duration::from_secs(5)), 1.0);
    }
}

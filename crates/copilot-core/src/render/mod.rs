//! Response rendering pipeline.
//!
//! Turns a message's raw content and intent tag into a structured display:
//! bold-span parsing for every intent, plus best-effort extraction of an
//! embedded JSON reminder payload for the `recordatorio` intent. Rendering
//! is pure: the same `(content, intent)` always yields the same output and
//! the message record is never touched.

use crate::session::DEFAULT_INTENT;
use crate::slash_command;
use chrono::{DateTime, Locale, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Intent tag that triggers the reminder formatting pass.
pub const REMINDER_INTENT: &str = "recordatorio";

/// Lexical `**...**` delimiter pattern. Deliberately not a markdown parser.
static BOLD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Display strftime pattern for reminder dates, filled in with the
/// configured locale's weekday and month names.
const DATE_DISPLAY: &str = "%A, %-d de %B de %Y, %H:%M";

/// Locale and field configuration for the reminder formatter.
///
/// There is exactly one formatting function; historical variants that
/// disagreed on locale and date-field naming are expressed as configuration
/// here instead of duplicated code.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Locale used for weekday/month names in reminder dates.
    pub locale: Locale,
    /// Keys whose values are reformatted as dates when they parse as an
    /// ISO-like timestamp. Order records the legacy field precedence,
    /// primary first.
    pub date_keys: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            locale: Locale::es_ES,
            date_keys: vec![
                "fecha_ejecucion".to_string(),
                "fecha".to_string(),
                "fecha_hora".to_string(),
            ],
        }
    }
}

impl RenderConfig {
    fn is_date_key(&self, key: &str) -> bool {
        self.date_keys.iter().any(|candidate| candidate == key)
    }
}

/// A run of text within a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Text passed through verbatim.
    Plain(String),
    /// Text that was delimited by `**...**`.
    Bold(String),
}

/// One labeled row extracted from a reminder payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    /// Humanized field name (underscores to spaces, capitalized).
    pub label: String,
    /// Rendered field value.
    pub value: String,
}

/// A structural unit of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBlock {
    /// Free text, split into plain and bold runs.
    Paragraph(Vec<Span>),
    /// Labeled rows from an embedded reminder payload.
    Fields(Vec<FieldRow>),
}

/// How the message should be framed by the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Plain chat bubble (the `default` intent).
    Bubble,
    /// Titled intent card.
    Card { icon: String, title: String },
}

/// The complete rendered form of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub frame: Frame,
    pub blocks: Vec<DisplayBlock>,
}

/// Renders a message's content under the given intent tag.
pub fn render_message(content: &str, intent: &str, config: &RenderConfig) -> RenderedMessage {
    let blocks = if intent == REMINDER_INTENT {
        render_reminder(content, config)
    } else {
        vec![DisplayBlock::Paragraph(bold_spans(content))]
    };

    RenderedMessage {
        frame: frame_for_intent(intent),
        blocks,
    }
}

fn frame_for_intent(intent: &str) -> Frame {
    if intent == DEFAULT_INTENT {
        return Frame::Bubble;
    }
    match slash_command::find_command(intent) {
        Some(command) => Frame::Card {
            icon: command.icon.to_string(),
            title: command.label.to_string(),
        },
        None => Frame::Card {
            icon: "🤖".to_string(),
            title: humanize_key(intent),
        },
    }
}

/// Splits content on the `**...**` delimiter into plain and bold runs.
///
/// Unmatched or absent delimiters leave the whole string as a single plain
/// run.
pub fn bold_spans(content: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for captures in BOLD_PATTERN.captures_iter(content) {
        let delimited = captures.get(0).unwrap();
        if delimited.start() > cursor {
            spans.push(Span::Plain(content[cursor..delimited.start()].to_string()));
        }
        let inner = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        spans.push(Span::Bold(inner.to_string()));
        cursor = delimited.end();
    }

    if cursor < content.len() || spans.is_empty() {
        spans.push(Span::Plain(content[cursor..].to_string()));
    }

    spans
}

/// Reminder pass: extract and format the embedded JSON payload, falling
/// back to plain bold-span rendering when nothing parseable is present.
fn render_reminder(content: &str, config: &RenderConfig) -> Vec<DisplayBlock> {
    let Some((before, object, after)) = extract_embedded_object(content) else {
        debug!("no parseable reminder payload, rendering as plain text");
        return vec![DisplayBlock::Paragraph(bold_spans(content))];
    };

    let mut blocks = Vec::new();
    if !before.is_empty() {
        blocks.push(DisplayBlock::Paragraph(bold_spans(before)));
    }
    blocks.push(DisplayBlock::Fields(field_rows(&object, config)));
    if !after.is_empty() {
        blocks.push(DisplayBlock::Paragraph(bold_spans(after)));
    }
    blocks
}

/// Locates the substring bounded by the first `{` and the last `}` and
/// parses it as a JSON object.
fn extract_embedded_object(content: &str) -> Option<(&str, Map<String, Value>, &str)> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }

    let fragment = &content[start..=end];
    let value: Value = serde_json::from_str(fragment).ok()?;
    let object = value.as_object()?.clone();

    Some((&content[..start], object, &content[end + 1..]))
}

fn field_rows(object: &Map<String, Value>, config: &RenderConfig) -> Vec<FieldRow> {
    object
        .iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            let rendered = if config.is_date_key(key) {
                format_reminder_date(&raw, config.locale).unwrap_or(raw)
            } else {
                raw
            };
            FieldRow {
                label: humanize_key(key),
                value: rendered,
            }
        })
        .collect()
}

/// Reformats an ISO-like timestamp into a locale-formatted, human-readable
/// weekday/date/time string. Returns `None` when the value does not parse,
/// leaving the raw string in place.
fn format_reminder_date(raw: &str, locale: Locale) -> Option<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.format_localized(DATE_DISPLAY, locale).to_string());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        let parsed: DateTime<Utc> = parsed.and_utc();
        return Some(parsed.format_localized(DATE_DISPLAY, locale).to_string());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        let parsed: DateTime<Utc> = parsed.and_utc();
        return Some(parsed.format_localized(DATE_DISPLAY, locale).to_string());
    }
    None
}

/// Humanizes a snake_case key: underscores to spaces, first letter
/// capitalized.
fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

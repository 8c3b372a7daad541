use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a journal entry.
///
/// Fresh ids are UUID v4 strings. Older journals stored numeric ids, which are
/// read back as their decimal text so they keep comparing equal across loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new() -> Self {
        EntryId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<EntryId, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<StoredId>::deserialize(deserializer)? {
        Some(StoredId::Text(text)) => EntryId(text),
        Some(StoredId::Number(number)) => EntryId(number.to_string()),
        None => EntryId::default(),
    };
    Ok(id)
}

fn text_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn tags_or_default<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Style selectors: anything but a known name, `null` and numbers included,
/// reads as the default style.
fn style_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(name)) => T::from(name),
        _ => T::default(),
    })
}

/// Card background. Unknown names read back as `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Background {
    #[default]
    Default,
    Peach,
    LightBlue,
    Dark,
}

impl Background {
    pub const ALL: [Background; 4] = [
        Background::Default,
        Background::Peach,
        Background::LightBlue,
        Background::Dark,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Background::Default => "default",
            Background::Peach => "peach",
            Background::LightBlue => "light-blue",
            Background::Dark => "dark",
        }
    }
}

impl From<String> for Background {
    fn from(value: String) -> Self {
        Background::ALL
            .into_iter()
            .find(|b| b.as_str() == value.trim())
            .unwrap_or_default()
    }
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        value.as_str().to_string()
    }
}

/// Card typeface. Unknown names read back as `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Font {
    #[default]
    Default,
    Serif,
    Handwritten,
    Monospace,
}

impl Font {
    pub const ALL: [Font; 4] = [Font::Default, Font::Serif, Font::Handwritten, Font::Monospace];

    pub fn as_str(self) -> &'static str {
        match self {
            Font::Default => "default",
            Font::Serif => "serif",
            Font::Handwritten => "handwritten",
            Font::Monospace => "monospace",
        }
    }
}

impl From<String> for Font {
    fn from(value: String) -> Self {
        Font::ALL
            .into_iter()
            .find(|f| f.as_str() == value.trim())
            .unwrap_or_default()
    }
}

impl From<Font> for String {
    fn from(value: Font) -> Self {
        value.as_str().to_string()
    }
}

/// Weather conditions captured when the entry was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub icon: String,
    pub temperature: String,
    pub weather_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// A journal entry as stored on disk.
///
/// Text fields tolerate `null` and absence so that one damaged record still
/// renders instead of taking the whole journal down with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: EntryId,
    #[serde(default, deserialize_with = "text_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub date: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub mood: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub content: String,
    #[serde(default, deserialize_with = "tags_or_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "style_or_default")]
    pub background: Background,
    #[serde(default, deserialize_with = "style_or_default")]
    pub font: Font,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
}

impl Entry {
    /// Moment the entry is about, if its date string can be read.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_entry_date(&self.date)
    }

    pub fn calendar_day(&self) -> Option<NaiveDate> {
        self.parsed_date().map(|dt| dt.date())
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

/// An entry as produced by the creation form, before it has an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub title: String,
    pub date: String,
    pub mood: String,
    pub content: String,
    pub tags: Vec<String>,
    pub background: Background,
    pub font: Font,
    pub weather: Option<WeatherSnapshot>,
}

impl EntryDraft {
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            title: self.title,
            date: self.date,
            mood: self.mood,
            content: self.content,
            tags: self.tags,
            background: self.background,
            font: self.font,
            weather: self.weather,
        }
    }
}

/// Reads the date formats a journal entry may carry.
///
/// Plain dates map to midnight. RFC 3339 timestamps are moved into the local
/// time zone before the calendar day is taken.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

/// "28 Nov 2025" style date for entry cards; unreadable dates are shown as-is.
pub fn format_card_date(raw: &str) -> String {
    match parse_entry_date(raw) {
        Some(dt) => dt.format("%d %b %Y").to_string(),
        None => raw.to_string(),
    }
}

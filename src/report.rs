//! Plain-text and JSON output for the headless `list` and `moods` commands.

use crate::entry::{format_card_date, Entry};
use crate::query::Page;
use serde_json::{json, Value};
use std::fmt::Write;

pub fn list_text(page: &Page) -> String {
    if page.entries.is_empty() {
        return if page.total_matches == 0 {
            "No entries found.\n".to_string()
        } else {
            format!("Page {} is empty.\n", page.page)
        };
    }

    let mut out = String::new();
    for entry in &page.entries {
        write_entry(&mut out, entry);
    }
    let noun = if page.total_matches == 1 { "entry" } else { "entries" };
    let _ = writeln!(
        out,
        "Page {} of {} ({} {noun})",
        page.page, page.total_pages, page.total_matches
    );
    out
}

fn write_entry(out: &mut String, entry: &Entry) {
    let mood = match entry.mood.trim() {
        "" => "Unknown",
        mood => mood,
    };
    let _ = writeln!(
        out,
        "{} · {} · {mood}",
        entry.display_title(),
        format_card_date(&entry.date),
    );
    if let Some(weather) = &entry.weather {
        let _ = write!(out, "  {} {} {}", weather.icon, weather.temperature, weather.weather_type);
        if let Some(location) = &weather.location_name {
            let _ = write!(out, " · {location}");
        }
        out.push('\n');
    }
    for line in entry.content.lines() {
        let _ = writeln!(out, "  {line}");
    }
    if !entry.tags.is_empty() {
        let tags: Vec<String> = entry.tags.iter().map(|t| format!("#{t}")).collect();
        let _ = writeln!(out, "  {}", tags.join(" "));
    }
    out.push('\n');
}

pub fn list_json(page: &Page) -> Value {
    json!({
        "page": page.page,
        "totalPages": page.total_pages,
        "totalMatches": page.total_matches,
        "entries": page.entries,
    })
}

pub fn moods_text(moods: &[(String, usize)]) -> String {
    if moods.is_empty() {
        return "No entries yet to analyse mood.\n".to_string();
    }
    let width = moods.iter().map(|(m, _)| m.chars().count()).max().unwrap_or(0);
    let mut out = String::from("Mood summary\n");
    for (mood, count) in moods {
        let _ = writeln!(out, "  {mood:<width$}  {count}");
    }
    out
}

/// Moods as an array so the first-seen order survives.
pub fn moods_json(moods: &[(String, usize)]) -> Value {
    Value::Array(
        moods
            .iter()
            .map(|(mood, count)| json!({ "mood": mood, "count": count }))
            .collect(),
    )
}

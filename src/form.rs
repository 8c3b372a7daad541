//! The new-entry form: field editing, focus, and validation into an
//! [`EntryDraft`].

use crate::entry::{Background, EntryDraft, Font, WeatherSnapshot};
use crate::error::{Field, FieldError};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Date,
    Mood,
    Content,
    Tags,
    Background,
    Font,
    Location,
}

impl FormField {
    pub const ORDER: [FormField; 8] = [
        FormField::Title,
        FormField::Date,
        FormField::Mood,
        FormField::Content,
        FormField::Tags,
        FormField::Background,
        FormField::Font,
        FormField::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Date => "Date (YYYY-MM-DD)",
            FormField::Mood => "Mood",
            FormField::Content => "Content",
            FormField::Tags => "Tags (comma-separated)",
            FormField::Background => "Background",
            FormField::Font => "Font",
            FormField::Location => "Location (Enter to fetch weather)",
        }
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

impl From<Field> for FormField {
    fn from(field: Field) -> Self {
        match field {
            Field::Title => FormField::Title,
            Field::Date => FormField::Date,
            Field::Mood => FormField::Mood,
            Field::Content => FormField::Content,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherStatus {
    Idle,
    Fetching(String),
    Ready,
    Failed,
}

impl WeatherStatus {
    pub fn message(&self, weather: Option<&WeatherSnapshot>) -> String {
        match self {
            WeatherStatus::Idle => "Enter a city name to fetch the weather.".to_string(),
            WeatherStatus::Fetching(_) => "Fetching weather…".to_string(),
            WeatherStatus::Ready => match weather.and_then(|w| w.location_name.as_deref()) {
                Some(location) => format!("Weather updated for {location}."),
                None => "Weather updated.".to_string(),
            },
            WeatherStatus::Failed => "Could not fetch weather. Please try again.".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntryForm {
    pub title: String,
    pub date: String,
    pub mood: String,
    pub content: String,
    pub tags: String,
    pub background: Background,
    pub font: Font,
    pub location: String,
    pub weather: Option<WeatherSnapshot>,
    pub weather_status: WeatherStatus,
    focus: FormField,
    errors: Vec<FieldError>,
}

impl EntryForm {
    pub fn new(today: NaiveDate) -> Self {
        EntryForm {
            title: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            mood: String::new(),
            content: String::new(),
            tags: String::new(),
            background: Background::Default,
            font: Font::Default,
            location: String::new(),
            weather: None,
            weather_status: WeatherStatus::Idle,
            focus: FormField::Title,
            errors: Vec::new(),
        }
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % FormField::ORDER.len();
        self.focus = FormField::ORDER[next];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ORDER.len();
        let prev = (self.focus.index() + len - 1) % len;
        self.focus = FormField::ORDER[prev];
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Date => Some(&mut self.date),
            FormField::Mood => Some(&mut self.mood),
            FormField::Content => Some(&mut self.content),
            FormField::Tags => Some(&mut self.tags),
            FormField::Location => Some(&mut self.location),
            FormField::Background | FormField::Font => None,
        }
    }

    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Title => Some(&self.title),
            FormField::Date => Some(&self.date),
            FormField::Mood => Some(&self.mood),
            FormField::Content => Some(&self.content),
            FormField::Tags => Some(&self.tags),
            FormField::Location => Some(&self.location),
            FormField::Background | FormField::Font => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let focus = self.focus;
        if let Some(text) = self.text_mut(focus) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        let focus = self.focus;
        if let Some(text) = self.text_mut(focus) {
            text.pop();
        }
    }

    /// Steps the focused selector through its options.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Background => {
                self.background = step(&Background::ALL, self.background, forward);
            }
            FormField::Font => self.font = step(&Font::ALL, self.font, forward),
            _ => {}
        }
    }

    /// City to look up, or `None` when the location field is blank.
    pub fn request_weather(&mut self) -> Option<String> {
        let city = self.location.trim();
        if city.is_empty() {
            self.weather_status = WeatherStatus::Idle;
            return None;
        }
        let city = city.to_string();
        self.weather_status = WeatherStatus::Fetching(city.clone());
        Some(city)
    }

    pub fn weather_fetched(&mut self, weather: WeatherSnapshot) {
        self.weather = Some(weather);
        self.weather_status = WeatherStatus::Ready;
    }

    /// A failed lookup keeps whatever weather was fetched before.
    pub fn weather_failed(&mut self) {
        self.weather_status = WeatherStatus::Failed;
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| FormField::from(e.field) == field)
            .map(|e| e.message.as_str())
    }

    /// "Form has 2 errors: Title is required. Mood is required"
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let count = self.errors.len();
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        Some(format!(
            "Form has {count} error{}: {}",
            if count > 1 { "s" } else { "" },
            messages.join(". ")
        ))
    }

    /// Validates the form. On failure the errors are kept for display and
    /// focus moves to the first invalid field.
    pub fn submit(&mut self) -> Result<EntryDraft, Vec<FieldError>> {
        self.errors = validate(self);
        if let Some(first) = self.errors.first() {
            self.focus = first.field.into();
            return Err(self.errors.clone());
        }

        Ok(EntryDraft {
            title: self.title.trim().to_string(),
            date: self.date.trim().to_string(),
            mood: self.mood.trim().to_string(),
            content: self.content.trim().to_string(),
            tags: parse_tags(&self.tags),
            background: self.background,
            font: self.font,
            weather: self.weather.clone(),
        })
    }
}

fn validate(form: &EntryForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.title.trim().is_empty() {
        errors.push(FieldError::new(Field::Title, "Title is required"));
    }
    if form.date.trim().is_empty() {
        errors.push(FieldError::new(Field::Date, "Date is required"));
    }
    if form.mood.trim().is_empty() {
        errors.push(FieldError::new(Field::Mood, "Mood is required"));
    }
    if form.content.trim().is_empty() {
        errors.push(FieldError::new(Field::Content, "Content is required"));
    }
    errors
}

fn step<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    let index = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    options[next]
}

/// Splits comma-separated tags, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
    }

    fn type_text(form: &mut EntryForm, text: &str) {
        for c in text.chars() {
            form.insert_char(c);
        }
    }

    #[test]
    fn new_form_defaults_to_today() {
        let form = EntryForm::new(today());
        assert_eq!(form.date, "2025-11-28");
        assert_eq!(form.focus(), FormField::Title);
    }

    #[test]
    fn submit_reports_errors_and_focuses_first_invalid_field() {
        let mut form = EntryForm::new(today());
        type_text(&mut form, "Walk");

        let errors = form.submit().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Mood, Field::Content]);
        assert_eq!(form.focus(), FormField::Mood);
        assert_eq!(form.error_for(FormField::Content), Some("Content is required"));
        assert_eq!(
            form.error_summary().as_deref(),
            Some("Form has 2 errors: Mood is required. Content is required")
        );
    }

    #[test]
    fn submit_builds_a_trimmed_draft() {
        let mut form = EntryForm::new(today());
        type_text(&mut form, "  Sunny ");
        form.focus_next();
        form.focus_next();
        type_text(&mut form, "happy");
        form.focus_next();
        type_text(&mut form, "warm day");
        form.focus_next();
        type_text(&mut form, "beach, , summer ,");
        form.focus_next();
        form.cycle(true);
        form.focus_next();
        form.cycle(false);

        let draft = form.submit().unwrap();
        assert_eq!(draft.title, "Sunny");
        assert_eq!(draft.date, "2025-11-28");
        assert_eq!(draft.tags, vec!["beach", "summer"]);
        assert_eq!(draft.background, Background::Peach);
        assert_eq!(draft.font, Font::Monospace);
        assert_eq!(draft.weather, None);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = EntryForm::new(today());
        form.focus_prev();
        assert_eq!(form.focus(), FormField::Location);
        form.focus_next();
        assert_eq!(form.focus(), FormField::Title);
    }

    #[test]
    fn selectors_ignore_typing() {
        let mut form = EntryForm::new(today());
        for _ in 0..5 {
            form.focus_next();
        }
        assert_eq!(form.focus(), FormField::Background);
        form.insert_char('x');
        form.backspace();
        assert_eq!(form.background, Background::Default);
        assert_eq!(form.text(FormField::Background), None);
    }

    #[test]
    fn weather_requests_need_a_city() {
        let mut form = EntryForm::new(today());
        assert_eq!(form.request_weather(), None);
        assert_eq!(
            form.weather_status.message(None),
            "Enter a city name to fetch the weather."
        );

        form.location = " Lisbon ".to_string();
        assert_eq!(form.request_weather().as_deref(), Some("Lisbon"));
        assert_eq!(form.weather_status, WeatherStatus::Fetching("Lisbon".to_string()));

        form.weather_failed();
        assert_eq!(
            form.weather_status.message(form.weather.as_ref()),
            "Could not fetch weather. Please try again."
        );
    }

    #[test]
    fn tags_split_on_commas() {
        assert_eq!(parse_tags("a, b ,c"), vec!["a", "b", "c"]);
        assert!(parse_tags(" , ").is_empty());
    }
}

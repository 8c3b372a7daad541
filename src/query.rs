//! The dashboard's view of the journal.
//!
//! [`query`] is a pure function of the collection, the current [`ViewState`],
//! today's date and the page size. Event handlers produce new `ViewState`
//! values instead of mutating shared settings.

use crate::entry::Entry;
use chrono::{NaiveDate, NaiveDateTime};
use std::num::NonZeroUsize;

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(size) => size,
    None => panic!("page size must be non-zero"),
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    /// Reads a sort selector label; anything mentioning "oldest" sorts
    /// ascending.
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("oldest") {
            SortOrder::OldestFirst
        } else {
            SortOrder::NewestFirst
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::NewestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::NewestFirst,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest first",
            SortOrder::OldestFirst => "Oldest first",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    All,
    TodayOnly,
}

impl DateFilter {
    pub fn toggled(self) -> Self {
        match self {
            DateFilter::All => DateFilter::TodayOnly,
            DateFilter::TodayOnly => DateFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateFilter::All => "All dates",
            DateFilter::TodayOnly => "Today only",
        }
    }
}

/// Session parameters that decide which entries are on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search: String,
    sort: SortOrder,
    date_filter: DateFilter,
    page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            search: String::new(),
            sort: SortOrder::default(),
            date_filter: DateFilter::default(),
            page: 1,
        }
    }
}

impl ViewState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn date_filter(&self) -> DateFilter {
        self.date_filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// New search term; always returns to the first page.
    pub fn with_search(self, raw: &str) -> Self {
        ViewState {
            search: normalize(raw),
            page: 1,
            ..self
        }
    }

    pub fn with_sort(self, sort: SortOrder) -> Self {
        ViewState { sort, ..self }
    }

    pub fn with_date_filter(self, date_filter: DateFilter) -> Self {
        ViewState {
            date_filter,
            ..self
        }
    }

    pub fn with_page(self, page: usize) -> Self {
        ViewState {
            page: page.max(1),
            ..self
        }
    }
}

/// Lowercased, trimmed search text.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub entries: Vec<Entry>,
    /// The page actually shown, after clamping into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Search, filter, sort and paginate `entries` for display.
pub fn query(
    entries: &[Entry],
    view: &ViewState,
    today: NaiveDate,
    page_size: NonZeroUsize,
) -> Page {
    let matched = matching_entries(entries, view, today);
    let size = page_size.get();
    let total_pages = matched.len().div_ceil(size).max(1);
    let page = view.page.clamp(1, total_pages);

    let visible = matched
        .iter()
        .skip((page - 1) * size)
        .take(size)
        .map(|entry| (*entry).clone())
        .collect();

    Page {
        entries: visible,
        page,
        total_pages,
        total_matches: matched.len(),
    }
}

/// Every entry passing the search and date filter, in display order.
pub fn matching_entries<'a>(
    entries: &'a [Entry],
    view: &ViewState,
    today: NaiveDate,
) -> Vec<&'a Entry> {
    let mut matched: Vec<&Entry> = entries
        .iter()
        .filter(|entry| matches_search(entry, &view.search))
        .filter(|entry| match view.date_filter {
            DateFilter::All => true,
            DateFilter::TodayOnly => entry.calendar_day() == Some(today),
        })
        .collect();
    sort_by_date(&mut matched, view.sort);
    matched
}

fn matches_search(entry: &Entry, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let mut haystack = [
        entry.title.as_str(),
        entry.content.as_str(),
        entry.mood.as_str(),
    ]
    .join(" ");
    for tag in &entry.tags {
        haystack.push(' ');
        haystack.push_str(tag);
    }
    haystack.to_lowercase().contains(term)
}

/// Orders entries by date. Entries whose date cannot be read stay in the slots
/// they already occupy; the dated ones are stably sorted through the others.
fn sort_by_date(entries: &mut [&Entry], order: SortOrder) {
    let mut slots = Vec::new();
    let mut dated: Vec<(NaiveDateTime, &Entry)> = Vec::new();
    for (slot, entry) in entries.iter().enumerate() {
        if let Some(when) = entry.parsed_date() {
            slots.push(slot);
            dated.push((when, *entry));
        }
    }

    match order {
        SortOrder::OldestFirst => dated.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::NewestFirst => dated.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    for (slot, (_, entry)) in slots.into_iter().zip(dated) {
        entries[slot] = entry;
    }
}

/// How many entries were written in each mood, in order of first appearance.
/// Entries without a mood are counted under "Unknown".
pub fn mood_summary(entries: &[Entry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in entries {
        let mood = match entry.mood.trim() {
            "" => "Unknown",
            mood => mood,
        };
        match counts.iter_mut().find(|(name, _)| name == mood) {
            Some((_, count)) => *count += 1,
            None => counts.push((mood.to_string(), 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::entry;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn collection() -> Vec<Entry> {
        let mut rain = entry("1", "Rain day", "2024-01-01", "sad", &[]);
        rain.content = "wet".to_string();
        let mut sunny = entry("2", "Sunny", "2024-06-01", "happy", &["beach"]);
        sunny.content = "warm".to_string();
        vec![rain, sunny]
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    fn ref_ids<'a>(entries: &[&'a Entry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    /// A mixed journal: several dates, a repeated date, unreadable dates.
    fn journal() -> Vec<Entry> {
        vec![
            entry("a", "Market", "2024-03-10", "happy", &["food"]),
            entry("b", "Lost notes", "sometime", "confused", &[]),
            entry("c", "Hike", "2024-05-02", "tired", &["outdoors", "beach"]),
            entry("d", "Beach", "2023-12-31", "happy", &[]),
            entry("e", "Dentist", "2024-03-10", "anxious", &[]),
            entry("f", "Undated", "", "", &[]),
            entry("g", "Concert", "2024-07-04T21:30", "elated", &["music"]),
            entry("h", "Rainy walk", "2024-01-15", "calm", &["outdoors"]),
            entry("i", "Garden", "2024-04-20", "happy", &[]),
            entry("j", "Books", "2024-02-29", "calm", &["reading"]),
            entry("k", "Kitchen", "2024-06-18", "proud", &["food"]),
        ]
    }

    #[test]
    fn newest_first_scenario() {
        let page = query(&collection(), &ViewState::default(), day(2024, 7, 1), DEFAULT_PAGE_SIZE);
        assert_eq!(ids(&page.entries), vec!["2", "1"]);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_matches, 2);
    }

    #[test]
    fn search_scenario() {
        let view = ViewState::default().with_search("beach");
        let page = query(&collection(), &view, day(2024, 7, 1), DEFAULT_PAGE_SIZE);
        assert_eq!(ids(&page.entries), vec!["2"]);
    }

    #[test]
    fn search_is_case_insensitive_over_all_text_fields() {
        let entries = journal();
        let today = day(2024, 7, 1);
        for (term, expected) in [
            ("BEACH", vec!["c", "d"]),
            ("  Outdoors ", vec!["c", "h"]),
            ("happy", vec!["i", "a", "d"]),
            ("kitchen content", vec!["k"]),
            ("nothing like this", vec![]),
        ] {
            let view = ViewState::default().with_search(term);
            assert_eq!(ref_ids(&matching_entries(&entries, &view, today)), expected, "{term}");
        }
    }

    #[test]
    fn search_results_are_a_subset_of_the_unfiltered_view() {
        let entries = journal();
        let today = day(2024, 7, 1);
        let all = ref_ids(&matching_entries(&entries, &ViewState::default(), today));
        for term in ["a", "beach", "happy", "2024", "zzz", "o"] {
            let view = ViewState::default().with_search(term);
            for id in ref_ids(&matching_entries(&entries, &view, today)) {
                assert!(all.contains(&id), "{id} for {term:?}");
            }
        }
    }

    #[test]
    fn pages_cover_every_match_exactly_once() {
        let entries = journal();
        let today = day(2024, 7, 1);
        for sort in [SortOrder::NewestFirst, SortOrder::OldestFirst] {
            let base = ViewState::default().with_sort(sort);
            let expected = ref_ids(&matching_entries(&entries, &base, today));
            for size in 1..=4 {
                let size = NonZeroUsize::new(size).unwrap();
                let first = query(&entries, &base, today, size);
                let mut seen = Vec::new();
                for page in 1..=first.total_pages {
                    let view = base.clone().with_page(page);
                    let result = query(&entries, &view, today, size);
                    assert_eq!(result.page, page);
                    seen.extend(result.entries.iter().map(|e| e.id.as_str().to_string()));
                }
                assert_eq!(seen, expected, "page size {size}");
            }
        }
    }

    #[test]
    fn unreadable_dates_keep_their_positions() {
        let entries = journal();
        let newest = matching_entries(&entries, &ViewState::default(), day(2024, 7, 1));
        assert_eq!(
            ref_ids(&newest),
            vec!["g", "b", "k", "c", "i", "f", "a", "e", "j", "h", "d"]
        );

        let view = ViewState::default().with_sort(SortOrder::OldestFirst);
        let oldest = matching_entries(&entries, &view, day(2024, 7, 1));
        assert_eq!(
            ref_ids(&oldest),
            vec!["d", "b", "h", "j", "a", "f", "e", "i", "c", "k", "g"]
        );
    }

    #[test]
    fn today_filter_matches_calendar_day_and_skips_unreadable_dates() {
        let entries = journal();
        let view = ViewState::default().with_date_filter(DateFilter::TodayOnly);

        let page = query(&entries, &view, day(2024, 3, 10), DEFAULT_PAGE_SIZE);
        assert_eq!(ids(&page.entries), vec!["a", "e"]);

        let page = query(&entries, &view, day(2024, 7, 4), DEFAULT_PAGE_SIZE);
        assert_eq!(ids(&page.entries), vec!["g"]);

        let page = query(&entries, &view, day(2030, 1, 1), DEFAULT_PAGE_SIZE);
        assert!(page.entries.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn page_is_clamped_when_results_shrink() {
        let entries = journal();
        let today = day(2024, 7, 1);
        let size = NonZeroUsize::new(2).unwrap();

        let view = ViewState::default().with_page(6);
        let page = query(&entries, &view, today, size);
        assert_eq!(page.page, 6);
        assert_eq!(page.total_pages, 6);

        let filtered = view.with_date_filter(DateFilter::TodayOnly);
        let page = query(&entries, &filtered, today, size);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn search_resets_to_first_page() {
        let view = ViewState::default().with_page(3).with_search("Beach");
        assert_eq!(view.page(), 1);
        assert_eq!(view.search(), "beach");
        assert_eq!(ViewState::default().with_page(0).page(), 1);
    }

    #[test]
    fn query_is_deterministic() {
        let entries = journal();
        let view = ViewState::default().with_search("o").with_page(2);
        let size = NonZeroUsize::new(3).unwrap();
        let today = day(2024, 7, 1);
        assert_eq!(
            query(&entries, &view, today, size),
            query(&entries, &view, today, size)
        );
    }

    #[test]
    fn sort_labels() {
        assert_eq!(SortOrder::from_label("Oldest First"), SortOrder::OldestFirst);
        assert_eq!(SortOrder::from_label("newest"), SortOrder::NewestFirst);
        assert_eq!(SortOrder::from_label(""), SortOrder::NewestFirst);
    }

    #[test]
    fn mood_summary_scenario() {
        assert_eq!(
            mood_summary(&collection()),
            vec![("sad".to_string(), 1), ("happy".to_string(), 1)]
        );
    }

    #[test]
    fn mood_summary_groups_missing_moods_as_unknown() {
        let summary = mood_summary(&journal());
        assert_eq!(summary[0], ("happy".to_string(), 3));
        assert!(summary.contains(&("Unknown".to_string(), 1)));
        assert!(mood_summary(&[]).is_empty());
    }
}

use crate::announce::{Priority, StatusLine};
use crate::app::App;
use crate::entry::{format_card_date, Background, Entry, Font, WeatherSnapshot};
use crate::form::{EntryForm, FormField};
use crate::store::EntryStore;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const CARD_HEIGHT: u16 = 6;
const EMPTY_JOURNAL: &str = "No entries yet. Create a new one to get started!";
const NO_MATCHES: &str = "No entries match the current search or filter.";

pub fn draw<S: EntryStore>(frame: &mut Frame, app: &App<S>) {
    match app.form() {
        Some(form) => draw_form(frame, form, app.status()),
        None => draw_dashboard(frame, app),
    }
}

fn draw_dashboard<S: EntryStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new("Weather Journal")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_search_bar(frame, chunks[1], app);
    draw_cards(frame, chunks[2], app);
    frame.render_widget(pagination(app), chunks[3]);
    frame.render_widget(status_line(app.status()), chunks[4]);
    frame.render_widget(dashboard_controls(app.is_searching()), chunks[5]);

    if let Some(deleted) = app.pending_undo() {
        draw_undo_toast(frame, chunks[2], deleted);
    }
    if app.show_moods() {
        draw_mood_summary(frame, &app.moods());
    }
}

fn draw_search_bar<S: EntryStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mut search = app.search_input().to_string();
    let border = if app.is_searching() {
        search.push('|');
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search_box = Paragraph::new(search).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Search (/)"),
    );
    frame.render_widget(search_box, columns[0]);

    let view = app.view();
    let matches = app.page().total_matches;
    let indicators = Line::from(vec![
        Span::styled(view.sort().label(), Style::default().fg(Color::Magenta)),
        Span::raw(" · "),
        Span::styled(view.date_filter().label(), Style::default().fg(Color::Magenta)),
        Span::raw(format!(" · {matches} shown of {}", app.entries().len())),
    ]);
    let indicator_box =
        Paragraph::new(indicators).block(Block::default().borders(Borders::ALL).title("View"));
    frame.render_widget(indicator_box, columns[1]);
}

fn draw_cards<S: EntryStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let page = app.page();
    if page.entries.is_empty() {
        let message = if app.entries().is_empty() {
            EMPTY_JOURNAL
        } else {
            NO_MATCHES
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Entries"));
        frame.render_widget(empty, area);
        return;
    }

    let mut y = area.y;
    for (index, entry) in page.entries.iter().enumerate() {
        if y + CARD_HEIGHT > area.bottom() {
            break;
        }
        let card = Rect::new(area.x, y, area.width, CARD_HEIGHT);
        draw_card(frame, card, entry, index == app.selected());
        y += CARD_HEIGHT;
    }
}

fn draw_card(frame: &mut Frame, area: Rect, entry: &Entry, selected: bool) {
    let inner_width = usize::from(area.width.saturating_sub(2));
    let style = card_style(entry.background).add_modifier(font_modifier(entry.font));

    let border = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(truncate(entry.display_title(), inner_width.saturating_sub(2)));

    let first_line = entry.content.lines().next().unwrap_or("");
    let tags: Vec<String> = entry.tags.iter().map(|t| format!("#{t}")).collect();
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format_card_date(&entry.date),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  Mood: {}", entry.mood)),
        ]),
        weather_line(entry.weather.as_ref()),
        Line::from(truncate(first_line, inner_width)),
        Line::from(Span::styled(
            truncate(&tags.join(" "), inner_width),
            Style::default().fg(Color::Cyan),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).style(style).block(block), area);
}

fn card_style(background: Background) -> Style {
    match background {
        Background::Default => Style::default(),
        Background::Peach => Style::default()
            .bg(Color::Rgb(255, 218, 185))
            .fg(Color::Black),
        Background::LightBlue => Style::default()
            .bg(Color::Rgb(173, 216, 230))
            .fg(Color::Black),
        Background::Dark => Style::default()
            .bg(Color::Rgb(40, 40, 40))
            .fg(Color::White),
    }
}

fn font_modifier(font: Font) -> Modifier {
    match font {
        Font::Serif => Modifier::BOLD,
        Font::Handwritten => Modifier::ITALIC,
        Font::Default | Font::Monospace => Modifier::empty(),
    }
}

fn weather_line(weather: Option<&WeatherSnapshot>) -> Line<'static> {
    let Some(weather) = weather else {
        return Line::from(Span::styled(
            "No weather recorded",
            Style::default().add_modifier(Modifier::DIM),
        ));
    };

    let icon = if weather.icon.is_empty() {
        "⛅"
    } else {
        weather.icon.as_str()
    };
    let mut text = format!("{icon} {} {}", weather.temperature, weather.weather_type);
    if let Some(location) = &weather.location_name {
        text.push_str(&format!(" · {location}"));
    }
    if let Some(humidity) = weather.humidity {
        text.push_str(&format!(" · {humidity:.0}% humidity"));
    }
    if let Some(wind) = weather.wind_speed {
        text.push_str(&format!(" · {wind:.1} km/h wind"));
    }
    Line::from(text)
}

fn pagination<S: EntryStore>(app: &App<S>) -> Paragraph<'static> {
    let page = app.page();
    let mut spans = vec![Span::raw("Page ")];
    for number in 1..=page.total_pages {
        let label = format!(" {number} ");
        if number == page.page {
            spans.push(Span::styled(
                label,
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(label));
        }
    }
    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

fn status_line(status: &StatusLine) -> Paragraph<'static> {
    let Some(current) = status.current() else {
        return Paragraph::new("");
    };
    let style = match current.priority {
        Priority::Polite => Style::default().fg(Color::Green),
        Priority::Assertive => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    Paragraph::new(Span::styled(current.message.clone(), style))
}

fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(action),
    ]
}

fn dashboard_controls(searching: bool) -> Paragraph<'static> {
    let hints: Vec<[Span<'static>; 2]> = if searching {
        vec![key_hint("Enter", " apply  "), key_hint("Esc", " done")]
    } else {
        vec![
            key_hint("/", " search  "),
            key_hint("s", " sort  "),
            key_hint("t", " today  "),
            key_hint("←→", " pages  "),
            key_hint("d", " delete  "),
            key_hint("u", " undo  "),
            key_hint("m", " moods  "),
            key_hint("n", " new  "),
            key_hint("q", " quit"),
        ]
    };
    Paragraph::new(Line::from(hints.into_iter().flatten().collect::<Vec<_>>()))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

fn draw_undo_toast(frame: &mut Frame, area: Rect, deleted: &Entry) {
    let text = format!("\"{}\" deleted.", deleted.display_title());
    let width = (text.width() as u16 + 4).max(30).min(area.width);
    let toast = Rect::new(
        area.right().saturating_sub(width),
        area.bottom().saturating_sub(4),
        width,
        4.min(area.height),
    );

    let lines = vec![
        Line::from(truncate(&text, usize::from(width.saturating_sub(2)))),
        Line::from(vec![
            Span::styled("u", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Undo   "),
            Span::styled("x", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" ×"),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Entry deleted."));
    frame.render_widget(Clear, toast);
    frame.render_widget(paragraph, toast);
}

fn draw_mood_summary(frame: &mut Frame, moods: &[(String, usize)]) {
    let area = centered_rect(50, 50, frame.area());
    let longest = moods.iter().map(|(m, _)| m.width()).max().unwrap_or(0);
    let items: Vec<ListItem> = moods
        .iter()
        .map(|(mood, count)| {
            let padding = " ".repeat(longest - mood.width());
            ListItem::new(Line::from(vec![
                Span::styled(format!("{mood}{padding}"), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {count:>3} ")),
                Span::styled("█".repeat(*count), Style::default().fg(Color::Magenta)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Mood summary")
            .title_bottom(Line::from("m / Esc to close").alignment(Alignment::Right)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(list, area);
}

fn draw_form(frame: &mut Frame, form: &EntryForm, status: &StatusLine) {
    let mut constraints = vec![Constraint::Length(1)];
    for field in FormField::ORDER {
        constraints.push(match field {
            FormField::Content => Constraint::Min(5),
            _ => Constraint::Length(3),
        });
    }
    constraints.extend([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
    ]);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(frame.area());

    let heading = Paragraph::new("New Journal Entry")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(heading, chunks[0]);

    for (index, field) in FormField::ORDER.into_iter().enumerate() {
        draw_field(frame, chunks[index + 1], form, field);
    }

    let weather_end = FormField::ORDER.len() + 1;
    let mut weather_lines = vec![Line::from(Span::styled(
        form.weather_status.message(form.weather.as_ref()),
        Style::default().fg(Color::DarkGray),
    ))];
    if form.weather.is_some() {
        weather_lines.push(weather_line(form.weather.as_ref()));
    }
    frame.render_widget(Paragraph::new(weather_lines), chunks[weather_end]);

    frame.render_widget(status_line(status), chunks[weather_end + 1]);

    let hints = [
        key_hint("Tab", " next  "),
        key_hint("←→", " choose  "),
        key_hint("Ctrl-W", " weather  "),
        key_hint("Ctrl-S", " save  "),
        key_hint("Esc", " cancel"),
    ];
    let controls = Paragraph::new(Line::from(hints.into_iter().flatten().collect::<Vec<_>>()))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    frame.render_widget(controls, chunks[weather_end + 2]);
}

fn draw_field(frame: &mut Frame, area: Rect, form: &EntryForm, field: FormField) {
    let focused = form.focus() == field;
    let error = form.error_for(field);

    let title = match error {
        Some(message) => format!("{} ({message})", field.label()),
        None => field.label().to_string(),
    };
    let border = match (error, focused) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Yellow),
        (None, false) => Style::default(),
    };

    let value = match field {
        FormField::Background => selector(form.background.as_str(), focused),
        FormField::Font => selector(form.font.as_str(), focused),
        _ => {
            let mut text = form.text(field).unwrap_or_default().to_string();
            if focused {
                text.push('|');
            }
            text
        }
    };

    let paragraph = Paragraph::new(value).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

fn selector(value: &str, focused: bool) -> String {
    if focused {
        format!("◀ {value} ▶")
    } else {
        value.to_string()
    }
}

/// Cuts `text` to at most `width` terminal columns, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

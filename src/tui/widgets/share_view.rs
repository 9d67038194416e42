use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListState, Paragraph};

use crate::Config;
use crate::models::{CareSheet, SharedLogView, SharedRoutineView, Species};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::routine_list::{render_routine_list, RoutineRow};
use crate::utils::age_years;

/// "Breed • Species • N yrs" subtitle used by all public share headers.
fn subtitle_parts(
    breed: Option<&str>,
    species: Option<Species>,
    birth_date: Option<&str>,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(breed) = breed.map(str::trim).filter(|b| !b.is_empty()) {
        parts.push(breed.to_string());
    }
    if let Some(species) = species {
        parts.push(species.label().to_string());
    }
    if let Some(age) = birth_date.and_then(age_years) {
        parts.push(format!("{} yr{}", age, if age == 1 { "" } else { "s" }));
    }
    parts.join(" • ")
}

fn header_lines<'a>(
    title: String,
    subtitle: String,
    allergies: Option<&str>,
    vet: (Option<&str>, Option<&str>),
    emergency: (Option<&str>, Option<&str>),
    fg: Style,
    dim: Style,
) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(title, fg.add_modifier(Modifier::BOLD)))];
    if !subtitle.is_empty() {
        lines.push(Line::from(Span::styled(subtitle, dim)));
    }
    if let Some(allergies) = allergies {
        lines.push(Line::from(Span::styled(
            format!("⚠ Allergies: {allergies}"),
            Style::default().fg(ratatui::style::Color::Yellow),
        )));
    }
    let (vet_name, vet_number) = vet;
    if let Some(number) = vet_number {
        lines.push(Line::from(Span::styled(
            format!("{}: {}", vet_name.unwrap_or("Vet"), number),
            dim,
        )));
    }
    let (contact_name, contact_number) = emergency;
    if let Some(number) = contact_number {
        lines.push(Line::from(Span::styled(
            format!("{}: {}", contact_name.unwrap_or("Emergency"), number),
            dim,
        )));
    }
    lines
}

pub fn render_shared_log(f: &mut Frame, area: Rect, view: &SharedLogView, config: &Config) {
    let theme = config.get_active_theme();
    let fg = Style::default().fg(parse_color(&theme.fg));
    let dim = Style::default().fg(parse_color(&theme.tab_bg));

    let local = view.logged_at.with_timezone(&chrono::Local);
    let mut lines = vec![
        Line::from(Span::styled(
            view.title.clone(),
            fg.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} • {}", view.pet_name, local.format("%Y-%m-%d %H:%M")),
            dim,
        )),
    ];
    if let Some(ref content) = view.content {
        lines.push(Line::from(""));
        for text_line in content.lines() {
            lines.push(Line::from(Span::styled(text_line.to_string(), fg)));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Shared Log"))
        .style(fg)
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_shared_routine(f: &mut Frame, area: Rect, view: &SharedRoutineView, config: &Config) {
    let theme = config.get_active_theme();
    let fg = Style::default().fg(parse_color(&theme.fg));
    let dim = Style::default().fg(parse_color(&theme.tab_bg));

    let mut lines = header_lines(
        format!("{}'s Profile", view.pet_name),
        subtitle_parts(view.breed.as_deref(), view.species, view.birth_date.as_deref()),
        view.allergies.as_deref(),
        (view.vet_name.as_deref(), view.vet_contact_number.as_deref()),
        (
            view.emergency_contact_name.as_deref(),
            view.emergency_contact_number.as_deref(),
        ),
        fg,
        dim,
    );

    lines.push(Line::from(""));
    let status = if view.is_completed_for_current_period {
        "✓ Done"
    } else {
        "○ Pending"
    };
    lines.push(Line::from(Span::styled(
        format!("{} {}  {}", view.display_task_type().icon(), view.name, status),
        fg,
    )));
    if let Some(detail) = view
        .description
        .as_deref()
        .or(view.medicine_instructions.as_deref())
    {
        lines.push(Line::from(Span::styled(format!("  {detail}"), dim)));
    }
    if let Some(time) = view.time_of_day_hhmm() {
        lines.push(Line::from(Span::styled(format!("  {time}"), dim)));
    }
    lines.push(Line::from(""));
    let complete = crate::utils::format_key_binding_for_display(&config.key_bindings.complete);
    lines.push(Line::from(Span::styled(
        format!("Press {complete} to mark as done"),
        dim,
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Shared Routine"))
        .style(fg)
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_care_sheet(
    f: &mut Frame,
    area: Rect,
    sheet: &CareSheet,
    list_state: &mut ListState,
    config: &Config,
) {
    let theme = config.get_active_theme();
    let fg = Style::default().fg(parse_color(&theme.fg));
    let dim = Style::default().fg(parse_color(&theme.tab_bg));

    let header = header_lines(
        format!(
            "{} Daily care for {}",
            sheet.species.unwrap_or(Species::Dog).emoji(),
            sheet.pet_name
        ),
        subtitle_parts(sheet.breed.as_deref(), sheet.species, sheet.birth_date.as_deref()),
        sheet.allergies.as_deref(),
        (sheet.vet_name.as_deref(), sheet.vet_contact_number.as_deref()),
        (
            sheet.emergency_contact_name.as_deref(),
            sheet.emergency_contact_number.as_deref(),
        ),
        fg,
        dim,
    );
    let header_height = header.len() as u16 + 1;

    let sections = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(3)])
        .split(area);

    let header_paragraph = Paragraph::new(header)
        .style(fg)
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(header_paragraph, sections[0]);

    if sheet.routines.is_empty() {
        let empty = Paragraph::new("No routines yet.")
            .block(Block::default().borders(Borders::ALL).title("Daily Routine"))
            .style(dim);
        f.render_widget(empty, sections[1]);
        return;
    }

    let rows: Vec<RoutineRow> = sheet
        .routines
        .iter()
        .map(RoutineRow::from_care_sheet_routine)
        .collect();
    let completed = sheet
        .routines
        .iter()
        .filter(|r| r.is_completed_for_current_period)
        .count();
    let header_text = format!("Daily Routine ({completed}/{} done)", sheet.routines.len());
    render_routine_list(f, sections[1], &rows, Some(&header_text), list_state, config);
}

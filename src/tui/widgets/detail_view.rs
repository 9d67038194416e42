use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarState};
use ratskin::RatSkin;
use std::cmp;
use termimad::minimad::Text as MinimadText;

use crate::Config;
use crate::models::{Log, Pet, Routine};
use crate::tui::widgets::color::parse_color;
use crate::utils::age_years;

/// Markdown summary for the pet profile pane.
pub fn pet_markdown(pet: &Pet) -> String {
    let mut content = format!("# {} {}\n\n", pet.species.emoji(), pet.name);

    let mut subtitle = pet.breed_or_species();
    if let Some(age) = pet.birth_date.as_deref().and_then(age_years) {
        subtitle.push_str(&format!(" • {} yr{}", age, if age == 1 { "" } else { "s" }));
    }
    content.push_str(&format!("{subtitle}\n"));

    if let Some(ref allergies) = pet.allergies {
        content.push_str(&format!("\n**⚠ Allergies:** {allergies}\n"));
    }
    if let Some(ref temperament) = pet.temperament {
        content.push_str(&format!("\n**Temperament:** {temperament}\n"));
    }
    if pet.has_emergency_info() {
        content.push_str("\n**Emergency contacts**\n\n");
        if let Some(ref number) = pet.vet_contact_number {
            let vet = pet.vet_name.as_deref().unwrap_or("Vet");
            content.push_str(&format!("* {vet}: {number}\n"));
        }
        if let Some(ref number) = pet.emergency_contact_number {
            let name = pet.emergency_contact_name.as_deref().unwrap_or("Emergency");
            content.push_str(&format!("* {name}: {number}\n"));
        }
    }
    if let Some(ref notes) = pet.notes {
        content.push_str("\n**Notes:**\n\n");
        content.push_str(notes);
        content.push('\n');
    }

    content
}

/// Markdown detail for a selected routine.
pub fn routine_markdown(routine: &Routine) -> String {
    let mut content = format!(
        "**Task:** {} {}\n",
        routine.display_task_type().icon(),
        routine.name
    );
    content.push_str(&format!(
        "**Status:** {}\n",
        if routine.is_completed_for_current_period {
            "done for this period"
        } else {
            "pending"
        }
    ));
    content.push_str(&format!(
        "**Recurrence:** {}\n",
        routine.recurrence_type.label()
    ));
    if let Some(time) = routine.time_of_day_hhmm() {
        content.push_str(&format!("**Time:** {time}\n"));
    }
    if let Some(ref description) = routine.description {
        content.push_str(&format!("\n{description}\n"));
    }
    if let Some(ref medicine) = routine.medicine {
        content.push_str(&format!("\n**Medicine:** {medicine}\n"));
        if let Some(ref instructions) = routine.medicine_instructions {
            content.push_str(&format!("**Instructions:** {instructions}\n"));
        }
    }
    if routine.remind_me {
        let after = routine
            .remind_minutes_after
            .map(|m| format!(" ({m} min after)"))
            .unwrap_or_default();
        content.push_str(&format!("\n**Reminder:** on{after}\n"));
    }
    if let Some(last) = routine.last_completed_at {
        let local = last.with_timezone(&chrono::Local);
        content.push_str(&format!(
            "\n**Last completed:** {}\n",
            local.format("%Y-%m-%d %H:%M")
        ));
    }
    content
}

/// Markdown detail for a selected log entry.
pub fn log_markdown(log: &Log) -> String {
    let local = log.logged_at.with_timezone(&chrono::Local);
    let mut content = format!("**{}**\n", log.title);
    content.push_str(&format!("{}\n", local.format("%Y-%m-%d %H:%M")));
    if let Some(ref body) = log.content {
        content.push_str("\n");
        content.push_str(body);
        content.push('\n');
    }
    content
}

/// Render a markdown string into a bordered pane with a scrollbar.
pub fn render_markdown_view(
    f: &mut Frame,
    area: Rect,
    title: &str,
    markdown: &str,
    config: &Config,
    scroll_offset: usize,
) {
    if area.width < 2 || area.height < 2 {
        return;
    }

    // Content + scrollbar columns
    let horizontal = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let content_area = horizontal[0];
    let scrollbar_area = horizontal[1];

    let viewport_height = (area.height - 2) as usize;
    let text_width = content_area.width.saturating_sub(2) as usize;

    // Parse markdown with ratskin (needs the width for wrapping)
    let input = MinimadText::from(markdown);
    let text_width_u16: u16 = text_width.try_into().unwrap_or(u16::MAX);
    let content_lines = RatSkin::default().parse(input, text_width_u16);

    let ratatui_lines: Vec<Line> = content_lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect();
    let content_text = Text::from(ratatui_lines);

    let total_lines = content_text.lines.len();
    let max_scroll = total_lines.saturating_sub(viewport_height);
    let scroll_offset = cmp::min(scroll_offset, max_scroll);

    let start_line = scroll_offset;
    let end_line = cmp::min(start_line + viewport_height, total_lines);
    let visible_text = if start_line < total_lines {
        Text::from(content_text.lines[start_line..end_line].to_vec())
    } else {
        Text::default()
    };

    let base_style = Style::default().fg(parse_color(&config.get_active_theme().fg));
    let paragraph = Paragraph::new(visible_text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(base_style)
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            content_area.y + 1,
            scrollbar_area.width,
            content_area.height.saturating_sub(2),
        );

        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(scroll_offset);

        let scrollbar = Scrollbar::default()
            .orientation(ratatui::widgets::ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecurrenceType, Species};

    #[test]
    fn pet_markdown_includes_contacts_and_allergies() {
        let pet = Pet {
            id: "p1".to_string(),
            name: "Rex".to_string(),
            species: Species::Dog,
            breed: Some("Lab".to_string()),
            birth_date: None,
            notes: None,
            temperament: None,
            vet_name: Some("Dr. Paws".to_string()),
            vet_contact_number: Some("+1 555".to_string()),
            emergency_contact_name: None,
            emergency_contact_number: None,
            allergies: Some("Chicken".to_string()),
        };
        let md = pet_markdown(&pet);
        assert!(md.contains("Rex"));
        assert!(md.contains("Allergies:** Chicken"));
        assert!(md.contains("Dr. Paws: +1 555"));
    }

    #[test]
    fn routine_markdown_reports_completion_state() {
        let routine = Routine {
            id: "r1".to_string(),
            pet_id: "p1".to_string(),
            name: "Dinner".to_string(),
            description: None,
            task_type: None,
            recurrence_type: RecurrenceType::Daily,
            time_of_day: Some("18:00".to_string()),
            remind_me: false,
            remind_minutes_after: None,
            medicine: None,
            medicine_instructions: None,
            last_completed_at: None,
            is_completed_for_current_period: false,
            share_token: None,
        };
        let md = routine_markdown(&routine);
        assert!(md.contains("pending"));
        assert!(md.contains("**Time:** 18:00"));
    }
}

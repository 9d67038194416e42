use chrono::{Local, TimeZone, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Flex, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, StatefulWidget};

use crate::tui::app::{App, FeedbackField, SettingsEntry, DELETE_ACCOUNT_PHRASE};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Days until an epoch-milliseconds expiry, rounded up.
pub fn days_remaining(until_ms: i64, now_ms: i64) -> i64 {
    let day_ms: i64 = 1000 * 60 * 60 * 24;
    let diff = until_ms - now_ms;
    // Equivalent to `diff.div_ceil(day_ms)` (signed `div_ceil` is still
    // unstable): quotient rounded toward positive infinity.
    let q = diff / day_ms;
    let r = diff % day_ms;
    if (r > 0 && day_ms > 0) || (r < 0 && day_ms < 0) {
        q + 1
    } else {
        q
    }
}

fn format_subscription_date(until_ms: i64) -> String {
    match Utc.timestamp_millis_opt(until_ms).single() {
        Some(instant) => instant
            .with_timezone(&Local)
            .format("%B %-d, %Y")
            .to_string(),
        None => "unknown".to_string(),
    }
}

pub fn render_settings(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.config.get_active_theme();
    let fg = Style::default().fg(parse_color(&theme.fg));
    let dim = Style::default().fg(parse_color(&theme.tab_bg));
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };

    // Header: account + subscription state
    let mut header: Vec<Line> = Vec::new();
    if let Some(identity) = app.session.identity() {
        header.push(Line::from(Span::styled(
            format!("{} <{}>", identity.name, identity.email),
            fg.add_modifier(Modifier::BOLD),
        )));
        if app.session.is_pro_member() {
            if let Some(until) = identity.pro_member_until {
                let days = days_remaining(until, Utc::now().timestamp_millis());
                header.push(Line::from(Span::styled(
                    format!(
                        "Pro member — valid until {} ({days} days remaining)",
                        format_subscription_date(until)
                    ),
                    dim,
                )));
            }
        } else {
            let upgrade =
                crate::utils::format_key_binding_for_display(&app.config.key_bindings.upgrade);
            header.push(Line::from(Span::styled(
                format!("Free tier (1 pet limit) — press {upgrade} to upgrade"),
                dim,
            )));
        }
    }
    let header_height = header.len() as u16 + 1;

    let sections = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(3)])
        .split(area);

    f.render_widget(Paragraph::new(header).style(fg), sections[0]);

    // Entries list
    let items: Vec<ListItem> = app
        .settings
        .entries
        .iter()
        .map(|entry| {
            let label = match entry {
                SettingsEntry::Theme => format!("Theme: {}", app.config.current_theme),
                SettingsEntry::Feedback => "Send feedback".to_string(),
                SettingsEntry::DeletePet(index) => {
                    let name = app
                        .pets
                        .get(*index)
                        .map(|p| format!("{} ({})", p.name, p.breed_or_species()))
                        .unwrap_or_else(|| "?".to_string());
                    format!("Delete pet: {name}")
                }
                SettingsEntry::SignOut => "Sign out".to_string(),
                SettingsEntry::DeleteAccount => "Delete account…".to_string(),
            };
            ListItem::new(label)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Preferences"))
        .style(fg)
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));
    StatefulWidget::render(list, sections[1], f.buffer_mut(), &mut app.settings.list_state);

    // Overlays
    if app.settings.feedback.is_some() {
        render_feedback_overlay(f, f.area(), app);
    }
    if app.settings.delete_account.is_some() {
        render_delete_account_overlay(f, f.area(), app);
    }
}

fn render_feedback_overlay(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.settings.feedback.as_ref() else {
        return;
    };
    let theme = app.config.get_active_theme();
    let fg = Style::default().fg(parse_color(&theme.fg));
    let dim = Style::default().fg(parse_color(&theme.tab_bg));
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight = Style::default()
        .fg(get_contrast_text_color(highlight_bg))
        .bg(highlight_bg);

    let popup = popup_area(area, 50, 40);
    f.render_widget(Clear, popup);

    let stars: String = (1..=5)
        .map(|n| if n <= form.stars { '★' } else { '☆' })
        .collect();

    let mut lines = vec![Line::from("")];
    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(ratatui::style::Color::Red),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("  Rating  ", fg),
        Span::styled(
            stars,
            if form.current_field == FeedbackField::Stars {
                highlight
            } else {
                fg
            },
        ),
        Span::styled("  (1-5 or ←/→)", dim),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Note    ", fg),
        Span::styled(
            {
                let text = form.note.text();
                if text.is_empty() && form.current_field != FeedbackField::Note {
                    "optional".to_string()
                } else {
                    text
                }
            },
            if form.current_field == FeedbackField::Note {
                highlight
            } else {
                dim
            },
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab switch field • Enter send • Esc cancel",
        dim,
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Send Feedback")
                .title_alignment(Alignment::Center),
        )
        .style(fg);
    f.render_widget(paragraph, popup);
}

fn render_delete_account_overlay(f: &mut Frame, area: Rect, app: &App) {
    let Some(modal) = app.settings.delete_account.as_ref() else {
        return;
    };
    let theme = app.config.get_active_theme();
    let fg = Style::default().fg(parse_color(&theme.fg));
    let dim = Style::default().fg(parse_color(&theme.tab_bg));
    let red = Style::default().fg(ratatui::style::Color::Red);

    let popup = popup_area(area, 56, 40);
    f.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  This action is irreversible. All your pets, routines",
            fg,
        )),
        Line::from(Span::styled("  and logs will be permanently deleted.", fg)),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Type {DELETE_ACCOUNT_PHRASE} to confirm:"),
            fg,
        )),
        Line::from(Span::styled(format!("  {}█", modal.confirm.text()), fg)),
    ];
    if let Some(ref error) = modal.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {error}"), red)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter delete permanently • Esc cancel",
        dim,
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Delete Account")
                .title_alignment(Alignment::Center)
                .style(red),
        )
        .style(fg);
    f.render_widget(paragraph, popup);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = RatLayout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = RatLayout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_remaining_rounds_up() {
        let day = 1000 * 60 * 60 * 24;
        assert_eq!(days_remaining(day, 0), 1);
        assert_eq!(days_remaining(day + 1, 0), 2);
        assert_eq!(days_remaining(day * 30, 0), 30);
    }
}

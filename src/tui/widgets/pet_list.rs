use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget,
};
use std::collections::HashMap;

use crate::Config;
use crate::models::Pet;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Sidebar list of pets with per-pet routine progress, e.g.
/// `🐕 Rex  2/3 done`.
pub fn render_pet_list(
    f: &mut Frame,
    area: Rect,
    pets: &[Pet],
    progress: &HashMap<String, (usize, usize)>,
    list_state: &mut ListState,
    config: &Config,
) {
    // Max width for truncation (borders + padding)
    let max_width = area.width.saturating_sub(4) as usize;

    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let items: Vec<ListItem> = pets
        .iter()
        .map(|pet| {
            let progress_str = progress
                .get(&pet.id)
                .map(|(completed, total)| format!("  {completed}/{total} done"))
                .unwrap_or_default();
            let mut title = format!("{} {}{}", pet.species.emoji(), pet.name, progress_str);
            if title.chars().count() > max_width {
                title = title.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }
            ListItem::new(title)
        })
        .collect();

    // Reserve a column for the scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let title = format!("Your Pets ({})", pets.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(parse_color(&active_theme.fg)))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    // Scrollbar only when the list overflows
    let total_items = pets.len();
    let visible_items = list_area.height.saturating_sub(2) as usize;
    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        if scrollbar_inner_area.height > 0 {
            let selected_index = list_state.selected().unwrap_or(0);
            let scroll_position = if selected_index < visible_items {
                0
            } else {
                selected_index.saturating_sub(visible_items - 1)
            };

            let mut scrollbar_state = ScrollbarState::new(total_items)
                .viewport_content_length(visible_items)
                .position(scroll_position);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
        }
    }
}

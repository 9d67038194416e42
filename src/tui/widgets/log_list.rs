use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget};

use crate::Config;
use crate::models::Log;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

pub fn render_log_list(
    f: &mut Frame,
    area: Rect,
    logs: &[Log],
    list_state: &mut ListState,
    config: &Config,
) {
    let max_width = area.width.saturating_sub(4) as usize;

    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let items: Vec<ListItem> = logs
        .iter()
        .map(|log| {
            let mut title = log.title.clone();
            if title.chars().count() > max_width {
                title = title.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }
            let local = log.logged_at.with_timezone(&chrono::Local);
            let date_line = format!("    {}", local.format("%Y-%m-%d %H:%M"));
            ListItem::new(vec![Line::from(title), Line::from(date_line)])
        })
        .collect();

    let title = format!("Logs ({})", logs.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(parse_color(&active_theme.fg)))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, area, f.buffer_mut(), list_state);
}

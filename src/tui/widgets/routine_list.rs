use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget};

use crate::Config;
use crate::models::{CareSheetRoutine, Routine};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Display row shared between the owner view and the care-sheet view;
/// care-sheet entries have no resource id, only their embedded token.
pub struct RoutineRow {
    pub icon: &'static str,
    pub name: String,
    pub subtitle: Option<String>,
    pub time: Option<String>,
    pub done: bool,
}

impl RoutineRow {
    pub fn from_routine(routine: &Routine) -> Self {
        Self {
            icon: routine.display_task_type().icon(),
            name: routine.name.clone(),
            subtitle: routine
                .description
                .clone()
                .or_else(|| routine.medicine_instructions.clone()),
            time: routine.time_of_day_hhmm().map(str::to_string),
            done: routine.is_completed_for_current_period,
        }
    }

    pub fn from_care_sheet_routine(routine: &CareSheetRoutine) -> Self {
        Self {
            icon: routine.display_task_type().icon(),
            name: routine.name.clone(),
            subtitle: routine
                .description
                .clone()
                .or_else(|| routine.medicine_instructions.clone()),
            time: routine.time_of_day_hhmm().map(str::to_string),
            done: routine.is_completed_for_current_period,
        }
    }

    fn first_line(&self, max_width: usize) -> String {
        let status = if self.done { "✓" } else { "○" };
        let time = self
            .time
            .as_deref()
            .map(|t| format!(" [{t}]"))
            .unwrap_or_default();
        let mut line = format!("{} {} {}{}", status, self.icon, self.name, time);
        if line.chars().count() > max_width {
            line = line.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
        }
        line
    }
}

pub fn render_routine_list(
    f: &mut Frame,
    area: Rect,
    rows: &[RoutineRow],
    header: Option<&str>,
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

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            match row.subtitle.as_deref() {
                Some(subtitle) if !subtitle.is_empty() => {
                    let mut second = format!("    {subtitle}");
                    if second.chars().count() > max_width {
                        second =
                            second.chars().take(max_width.saturating_sub(3)).collect::<String>()
                                + "...";
                    }
                    ListItem::new(vec![Line::from(row.first_line(max_width)), Line::from(second)])
                }
                _ => ListItem::new(row.first_line(max_width)),
            }
        })
        .collect();

    // Header carries the "N of M completed today" summary
    let title = header.unwrap_or("Daily Routine").to_string();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(parse_color(&active_theme.fg)))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, area, f.buffer_mut(), list_state);
}

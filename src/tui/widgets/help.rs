use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let bindings = &config.key_bindings;
    let display = format_key_binding_for_display;
    let rows: Vec<(String, &str)> = vec![
        (display(&bindings.quit), "Quit"),
        (display(&bindings.list_up), "Move up"),
        (display(&bindings.list_down), "Move down"),
        (display(&bindings.select), "Open / confirm"),
        (display(&bindings.tab_left), "Previous tab"),
        (display(&bindings.tab_right), "Next tab"),
        (display(&bindings.new), "New pet / task / log"),
        (display(&bindings.edit), "Edit selected"),
        (display(&bindings.delete), "Delete selected"),
        (display(&bindings.complete), "Complete routine"),
        (display(&bindings.share), "Copy share link"),
        (display(&bindings.refresh), "Refresh data"),
        (display(&bindings.upgrade), "Upgrade to Pro"),
        (display(&bindings.settings), "Preferences"),
        (display(&bindings.save), "Save form"),
        ("Esc".to_string(), "Back / cancel"),
        (display(&bindings.help), "This help"),
    ];

    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let mut lines = vec![Line::from("")];
    for (key, action) in rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {key:>key_width$}  "),
                Style::default().fg(fg_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(action, Style::default().fg(fg_color)),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Keyboard Shortcuts")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color));

    f.render_widget(paragraph, popup_area);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

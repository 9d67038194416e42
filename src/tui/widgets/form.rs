use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::models::{Species, TaskType, REMIND_MINUTES_CHOICES};
use crate::tui::app::{
    LogField, LogForm, PetField, PetForm, RoutineField, RoutineForm, SignInState,
};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::editor::Editor;

struct FormStyle {
    fg: Style,
    active: Style,
    error: Style,
    dim: Style,
}

fn form_style(config: &Config) -> FormStyle {
    let theme = config.get_active_theme();
    let fg = parse_color(&theme.fg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };
    FormStyle {
        fg: Style::default().fg(fg),
        active: Style::default().fg(highlight_fg).bg(highlight_bg),
        error: Style::default().fg(ratatui::style::Color::Red),
        dim: Style::default().fg(parse_color(&theme.tab_bg)),
    }
}

/// Editor contents on one line, with a block cursor when the field is
/// active. Newlines in multi-line fields show as ⏎.
fn editor_value(editor: &Editor, active: bool) -> String {
    let mut value = String::new();
    let (cursor_row, cursor_col) = editor.cursor();
    for (row, line) in editor.lines().iter().enumerate() {
        if row > 0 {
            value.push('⏎');
        }
        if active && row == cursor_row {
            let chars: Vec<char> = line.chars().collect();
            let (before, after) = chars.split_at(cursor_col.min(chars.len()));
            value.extend(before);
            value.push('█');
            value.extend(after);
        } else {
            value.push_str(line);
        }
    }
    if !active && value.is_empty() {
        value.push('-');
    }
    value
}

fn text_row<'a>(label: &str, editor: &Editor, active: bool, styles: &FormStyle) -> Line<'a> {
    let marker = if active { "› " } else { "  " };
    Line::from(vec![
        Span::styled(format!("{marker}{label:<22}"), styles.fg),
        Span::styled(
            editor_value(editor, active),
            if active { styles.active } else { styles.fg },
        ),
    ])
}

fn choice_row<'a>(label: &str, value: String, active: bool, styles: &FormStyle) -> Line<'a> {
    let marker = if active { "› " } else { "  " };
    let rendered = if active { format!("◀ {value} ▶") } else { value };
    Line::from(vec![
        Span::styled(format!("{marker}{label:<22}"), styles.fg),
        Span::styled(rendered, if active { styles.active } else { styles.fg }),
    ])
}

fn footer_lines<'a>(styles: &FormStyle, config: &Config) -> Vec<Line<'a>> {
    let save = crate::utils::format_key_binding_for_display(&config.key_bindings.save);
    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Tab/Enter next field • {save} save • Esc cancel"),
            styles.dim,
        )),
    ]
}

pub fn render_pet_form(f: &mut Frame, area: Rect, form: &PetForm, config: &Config) {
    let styles = form_style(config);
    let mut lines: Vec<Line> = Vec::new();

    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(error.clone(), styles.error)));
        lines.push(Line::from(""));
    }

    let active = |field: PetField| form.current_field == field;
    lines.push(text_row("Name *", &form.name, active(PetField::Name), &styles));
    lines.push(choice_row(
        "Species *",
        format!("{} {}", form.species().emoji(), form.species().label()),
        active(PetField::Species),
        &styles,
    ));
    lines.push(text_row("Breed", &form.breed, active(PetField::Breed), &styles));
    lines.push(text_row(
        "Birth date (YYYY-MM-DD)",
        &form.birth_date,
        active(PetField::BirthDate),
        &styles,
    ));
    lines.push(text_row(
        "Temperament",
        &form.temperament,
        active(PetField::Temperament),
        &styles,
    ));
    lines.push(text_row("Notes", &form.notes, active(PetField::Notes), &styles));
    lines.push(text_row(
        "Vet name",
        &form.vet_name,
        active(PetField::VetName),
        &styles,
    ));
    lines.push(text_row(
        "Vet contact",
        &form.vet_contact_number,
        active(PetField::VetContact),
        &styles,
    ));
    lines.push(text_row(
        "Emergency contact name",
        &form.emergency_contact_name,
        active(PetField::EmergencyName),
        &styles,
    ));
    lines.push(text_row(
        "Emergency contact no.",
        &form.emergency_contact_number,
        active(PetField::EmergencyNumber),
        &styles,
    ));
    lines.push(text_row(
        "Allergies",
        &form.allergies,
        active(PetField::Allergies),
        &styles,
    ));
    lines.extend(footer_lines(&styles, config));

    let title = if form.editing_pet_id.is_some() {
        "Edit Pet"
    } else {
        "Add Pet"
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(styles.fg);
    f.render_widget(paragraph, area);
}

pub fn render_routine_form(
    f: &mut Frame,
    area: Rect,
    form: &RoutineForm,
    config: &Config,
    is_pro_member: bool,
) {
    let styles = form_style(config);
    let mut lines: Vec<Line> = Vec::new();

    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(error.clone(), styles.error)));
        lines.push(Line::from(""));
    }

    let active = |field: RoutineField| form.current_field == field;
    lines.push(choice_row(
        "Task type",
        format!("{} {}", form.task_type().icon(), form.task_type().label()),
        active(RoutineField::TaskType),
        &styles,
    ));
    lines.push(text_row("Name *", &form.name, active(RoutineField::Name), &styles));
    lines.push(text_row(
        "Description",
        &form.description,
        active(RoutineField::Description),
        &styles,
    ));
    lines.push(text_row(
        "Time (HH:MM)",
        &form.time_of_day,
        active(RoutineField::TimeOfDay),
        &styles,
    ));
    lines.push(choice_row(
        "Recurrence",
        form.recurrence().label().to_string(),
        active(RoutineField::Recurrence),
        &styles,
    ));

    if form.task_type() == TaskType::Medicine {
        lines.push(text_row(
            "Medicine *",
            &form.medicine,
            active(RoutineField::Medicine),
            &styles,
        ));
        lines.push(text_row(
            "Instructions",
            &form.medicine_instructions,
            active(RoutineField::MedicineInstructions),
            &styles,
        ));
    }

    lines.push(Line::from(""));
    if is_pro_member {
        lines.push(choice_row(
            "Email reminder",
            if form.remind_me { "[x] on" } else { "[ ] off" }.to_string(),
            active(RoutineField::RemindMe),
            &styles,
        ));
        if form.remind_me {
            let minutes = REMIND_MINUTES_CHOICES
                [form.remind_minutes_index % REMIND_MINUTES_CHOICES.len()];
            lines.push(choice_row(
                "Remind after",
                format!("{minutes} minutes"),
                active(RoutineField::RemindMinutes),
                &styles,
            ));
        }
    } else {
        // Free tier: the reminder stays visible but locked; whatever the
        // form says, the save payload forces it off
        let upgrade = crate::utils::format_key_binding_for_display(&config.key_bindings.upgrade);
        lines.push(Line::from(Span::styled(
            format!("  🔒 Email reminder — Pro feature ({upgrade} to upgrade)"),
            styles.dim,
        )));
    }
    lines.extend(footer_lines(&styles, config));

    let title = if form.editing_routine_id.is_some() {
        "Edit Task"
    } else {
        "Add Task"
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(styles.fg);
    f.render_widget(paragraph, area);
}

pub fn render_log_form(f: &mut Frame, area: Rect, form: &LogForm, config: &Config) {
    let styles = form_style(config);
    let mut lines: Vec<Line> = Vec::new();

    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(error.clone(), styles.error)));
        lines.push(Line::from(""));
    }

    let active = |field: LogField| form.current_field == field;
    lines.push(text_row("Title *", &form.title, active(LogField::Title), &styles));
    lines.push(text_row(
        "Date & time",
        &form.logged_at,
        active(LogField::LoggedAt),
        &styles,
    ));
    lines.push(text_row(
        "Content",
        &form.content,
        active(LogField::Content),
        &styles,
    ));
    lines.extend(footer_lines(&styles, config));

    let title = if form.editing_log_id.is_some() {
        "Edit Log"
    } else {
        "Add Log"
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(styles.fg);
    f.render_widget(paragraph, area);
}

pub fn render_sign_in(f: &mut Frame, area: Rect, state: &SignInState, config: &Config) {
    let styles = form_style(config);
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Welcome to PawLog 🐾",
            styles.fg.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Sign in with Google: obtain an OAuth access token for this",
            styles.fg,
        )),
        Line::from(Span::styled(
            "deployment and paste it below, then press Enter.",
            styles.fg,
        )),
        Line::from(""),
    ];

    if !config.google_client_id.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("OAuth client: {}", config.google_client_id),
            styles.dim,
        )));
        lines.push(Line::from(""));
    }

    if let Some(ref error) = state.error {
        lines.push(Line::from(Span::styled(error.clone(), styles.error)));
        lines.push(Line::from(Span::styled("Press Esc to dismiss.", styles.dim)));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  Access token  ", styles.fg),
        Span::styled(editor_value(&state.access_token, true), styles.active),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Sign In"))
        .style(styles.fg)
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Species choices cycled by the pet form.
pub const SPECIES_CHOICES: [Species; 2] = [Species::Dog, Species::Cat];

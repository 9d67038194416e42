use chrono::{Local, Timelike};
use ratatui::Frame;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::{ActiveForm, App, Page, SharedView, Tab};
use crate::tui::widgets;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::routine_list::RoutineRow;
use crate::tui::Layout;
use crate::utils::{format_key_binding_for_display, greeting_for_hour};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    // Outer border with the app name centered in the top border
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("PawLog")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_top_strip(f, app, layout);
    render_sidebar(f, app, layout);
    render_main(f, app, layout);

    // Overlays after normal content
    if app.show_help {
        widgets::help::render_help(f, f.area(), &app.config);
    }
    if let Some(target) = app.modals.delete_confirmation.clone() {
        widgets::confirm_delete::render_confirm_delete(
            f,
            f.area(),
            &target,
            app.modals.delete_modal_selection,
            &app.config,
        );
    }

    let key_hints = get_key_hints(app);
    widgets::status_bar::render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_ref(),
        &key_hints,
        &app.config,
    );
}

fn render_top_strip(f: &mut Frame, app: &App, layout: &Layout) {
    match app.page {
        Page::PetDetail => {
            widgets::tabs::render_tabs(f, layout.tabs_area, app.detail_tab, &app.config);
        }
        Page::Dashboard => {
            let (text, emoji) = greeting_for_hour(Local::now().hour());
            let name = app
                .session
                .identity()
                .map(|i| i.first_name().to_string())
                .unwrap_or_else(|| "there".to_string());
            widgets::tabs::render_title(
                f,
                layout.tabs_area,
                &format!("{text}, {name}! {emoji}"),
                &app.config,
            );
        }
        Page::SignIn => widgets::tabs::render_title(f, layout.tabs_area, "Sign In", &app.config),
        Page::Settings => {
            widgets::tabs::render_title(f, layout.tabs_area, "Preferences", &app.config)
        }
        Page::PetForm | Page::RoutineForm | Page::LogForm => {}
        Page::SharedLog => {
            widgets::tabs::render_title(f, layout.tabs_area, "Shared with you", &app.config)
        }
        Page::SharedRoutine | Page::CareSheet => {
            widgets::tabs::render_title(f, layout.tabs_area, "Shared with you 🐾", &app.config)
        }
    }
}

fn render_sidebar(f: &mut Frame, app: &mut App, layout: &Layout) {
    if layout.sidebar_area.width == 0 {
        return;
    }
    match app.page {
        Page::Dashboard => {
            let pets = app.pets.clone();
            widgets::pet_list::render_pet_list(
                f,
                layout.sidebar_area,
                &pets,
                &app.progress_by_pet,
                &mut app.pet_list_state,
                &app.config,
            );
        }
        Page::PetDetail => match app.detail_tab {
            Tab::Routines => {
                let rows: Vec<RoutineRow> =
                    app.routines.iter().map(RoutineRow::from_routine).collect();
                let (completed, total) = app.routine_progress();
                let header = format!("Daily Routine ({completed}/{total} done)");
                widgets::routine_list::render_routine_list(
                    f,
                    layout.sidebar_area,
                    &rows,
                    Some(&header),
                    &mut app.routine_list_state,
                    &app.config,
                );
            }
            Tab::Logs => {
                let logs = app.logs.clone();
                widgets::log_list::render_log_list(
                    f,
                    layout.sidebar_area,
                    &logs,
                    &mut app.log_list_state,
                    &app.config,
                );
            }
        },
        _ => {}
    }
}

fn render_main(f: &mut Frame, app: &mut App, layout: &Layout) {
    let area = layout.main_area;

    // Page-level fetch failures replace the main pane
    if let Some(error) = app.page_error.clone() {
        let theme = app.config.get_active_theme();
        let paragraph = Paragraph::new(error)
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .style(Style::default().fg(ratatui::style::Color::Red).bg(parse_color(&theme.bg)))
            .wrap(ratatui::widgets::Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    match app.page {
        Page::SignIn => widgets::form::render_sign_in(f, area, &app.sign_in, &app.config),
        Page::Dashboard => render_dashboard_main(f, app, area),
        Page::PetDetail => render_pet_detail_main(f, app, area),
        Page::PetForm => {
            if let Some(ActiveForm::Pet(form)) = app.form.as_ref() {
                widgets::form::render_pet_form(f, area, form, &app.config);
            }
        }
        Page::RoutineForm => {
            if let Some(ActiveForm::Routine(form)) = app.form.as_ref() {
                let is_pro = app.session.is_pro_member();
                widgets::form::render_routine_form(f, area, form, &app.config, is_pro);
            }
        }
        Page::LogForm => {
            if let Some(ActiveForm::Log(form)) = app.form.as_ref() {
                widgets::form::render_log_form(f, area, form, &app.config);
            }
        }
        Page::Settings => widgets::settings_view::render_settings(f, area, app),
        Page::SharedLog => {
            if let Some(SharedView::Log(view)) = app.shared.clone() {
                widgets::share_view::render_shared_log(f, area, &view, &app.config);
            }
        }
        Page::SharedRoutine => {
            if let Some(SharedView::Routine(view)) = app.shared.clone() {
                widgets::share_view::render_shared_routine(f, area, &view, &app.config);
            }
        }
        Page::CareSheet => {
            if let Some(SharedView::CareSheet(sheet)) = app.shared.clone() {
                widgets::share_view::render_care_sheet(
                    f,
                    area,
                    &sheet,
                    &mut app.shared_list_state,
                    &app.config,
                );
            }
        }
    }
}

fn render_dashboard_main(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let theme = app.config.get_active_theme();
    if app.pets.is_empty() {
        let new = format_key_binding_for_display(&app.config.key_bindings.new);
        let paragraph = Paragraph::new(format!(
            "No pets yet. Add your first furry friend!\n\nPress {new} to add a pet."
        ))
        .block(Block::default().borders(Borders::ALL).title("Your Pets"))
        .style(Style::default().fg(parse_color(&theme.fg)))
        .wrap(ratatui::widgets::Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let Some(pet) = app.pets.get(app.selected_pet_index) else {
        return;
    };
    let mut markdown = widgets::detail_view::pet_markdown(pet);

    // Free-tier upsell under the pet card
    if !app.session.is_pro_member() {
        let upgrade = format_key_binding_for_display(&app.config.key_bindings.upgrade);
        markdown.push_str("\n---\n\n**⭐ PawLog Pro**\n\n");
        if app.pets.len() >= 1 {
            markdown.push_str("You are on the Free Tier (1 pet limit reached). ");
        } else {
            markdown.push_str("You are on the Free Tier. ");
        }
        markdown.push_str(&format!(
            "Upgrade to add unlimited pets — press {upgrade} ($4.99/mo).\n"
        ));
    }

    widgets::detail_view::render_markdown_view(
        f,
        area,
        &pet.name,
        &markdown,
        &app.config,
        0,
    );
}

fn render_pet_detail_main(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let (title, markdown) = match app.detail_tab {
        Tab::Routines => match app.selected_routine() {
            Some(routine) => ("Task".to_string(), widgets::detail_view::routine_markdown(routine)),
            None => pet_fallback(app),
        },
        Tab::Logs => match app.selected_log() {
            Some(log) => ("Log".to_string(), widgets::detail_view::log_markdown(log)),
            None => pet_fallback(app),
        },
    };
    widgets::detail_view::render_markdown_view(f, area, &title, &markdown, &app.config, 0);
}

fn pet_fallback(app: &App) -> (String, String) {
    match app.current_pet.as_ref() {
        Some(pet) => (
            format!("{}'s Profile", pet.name),
            widgets::detail_view::pet_markdown(pet),
        ),
        None => ("Profile".to_string(), String::new()),
    }
}

fn get_key_hints(app: &App) -> Vec<String> {
    let bindings = &app.config.key_bindings;
    let display = format_key_binding_for_display;
    match app.page {
        Page::SignIn => vec![
            "Enter: Sign in".to_string(),
            "Esc: Dismiss error / quit".to_string(),
        ],
        Page::Dashboard => {
            let mut hints = vec![
                format!("{}: Quit", display(&bindings.quit)),
                format!("{}: Open pet", display(&bindings.select)),
                format!("{}: New pet", display(&bindings.new)),
                format!("{}: Refresh", display(&bindings.refresh)),
            ];
            if !app.session.is_pro_member() {
                hints.push(format!("{}: Upgrade", display(&bindings.upgrade)));
            }
            hints.push(format!("{}: Preferences", display(&bindings.settings)));
            hints.push(format!("{}: Help", display(&bindings.help)));
            hints
        }
        Page::PetDetail => vec![
            "Esc: Back".to_string(),
            format!("{}/{}: Tabs", display(&bindings.tab_left), display(&bindings.tab_right)),
            format!("{}: Complete", display(&bindings.complete)),
            format!("{}: New", display(&bindings.new)),
            format!("{}: Edit", display(&bindings.edit)),
            format!("{}: Delete", display(&bindings.delete)),
            format!("{}: Share", display(&bindings.share)),
            "c: Care sheet".to_string(),
            format!("{}: Help", display(&bindings.help)),
        ],
        Page::PetForm | Page::RoutineForm | Page::LogForm => vec![
            "Tab/Enter: Next field".to_string(),
            format!("{}: Save", display(&bindings.save)),
            "Esc: Cancel".to_string(),
        ],
        Page::Settings => vec![
            "↑/↓: Navigate".to_string(),
            "Enter: Select".to_string(),
            "Esc: Back".to_string(),
        ],
        Page::SharedLog => vec![
            format!("{}: Refresh", display(&bindings.refresh)),
            "Esc: Close".to_string(),
        ],
        Page::SharedRoutine => vec![
            format!("{}: Complete", display(&bindings.complete)),
            format!("{}: Refresh", display(&bindings.refresh)),
            "Esc: Close".to_string(),
        ],
        Page::CareSheet => vec![
            "↑/↓: Navigate".to_string(),
            format!("{}: Complete", display(&bindings.complete)),
            format!("{}: Refresh", display(&bindings.refresh)),
            "Esc: Close".to_string(),
        ],
    }
}

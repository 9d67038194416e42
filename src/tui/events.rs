use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;

use crate::models::TaskType;
use crate::tui::app::{
    ActiveForm, App, DeleteTarget, FeedbackField, LogField, Page, PetField, RoutineField, Tab,
};
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::form::SPECIES_CHOICES;
use crate::models::REMIND_MINUTES_CHOICES;
use crate::utils::{has_primary_modifier, parse_key_binding};

/// Guard that ensures terminal state is restored even on panic
/// If the terminal is left in raw mode or the alternate screen, the user's
/// shell is unusable afterwards.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Does a key event match a configured binding string like "q" or "Ctrl+s"?
fn matches_binding(key_event: &KeyEvent, binding: &str) -> bool {
    match parse_key_binding(binding) {
        Ok(parsed) => {
            key_event.code == parsed.key_code
                && (!parsed.requires_ctrl || has_primary_modifier(key_event.modifiers))
        }
        Err(_) => false,
    }
}

/// Pages whose sidebar shows a list.
pub fn sidebar_hidden(app: &App) -> bool {
    !matches!(app.page, Page::Dashboard | Page::PetDetail)
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering the alternate screen so the
    // error lands in the normal terminal
    let (width, height) = terminal_size()?;

    use crate::tui::layout::Layout;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        // Expire status messages and fire due checkout refreshes
        app.tick();

        let terminal_size = terminal.size()?;
        use ratatui::layout::Rect;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        let hidden = sidebar_hidden(&app);
        terminal.draw(|f| {
            let layout =
                Layout::calculate(terminal_rect, app.config.sidebar_width_percent, hidden);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only process Press events to avoid double-processing on Windows
        if event::poll(std::time::Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.kind == KeyEventKind::Press
                        && handle_key_event(&mut app, key_event)
                    {
                        break; // Quit requested
                    }
                }
                Event::Resize(_, _) => {
                    // Layout is recomputed on the next draw
                }
                _ => {}
            }
        }
    }

    guard.restore()?;

    Ok(())
}

/// Handle a key press. Returns true when the app should quit.
fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    // Overlays take priority over page handlers
    if app.show_help {
        if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('q'))
            || matches_binding(&key_event, &app.config.key_bindings.help)
        {
            app.show_help = false;
        }
        return false;
    }

    if app.modals.delete_confirmation.is_some() {
        handle_delete_modal(app, key_event);
        return false;
    }

    match app.page {
        Page::SignIn => handle_sign_in_keys(app, key_event),
        Page::Dashboard => handle_dashboard_keys(app, key_event),
        Page::PetDetail => handle_pet_detail_keys(app, key_event),
        Page::PetForm | Page::RoutineForm | Page::LogForm => handle_form_keys(app, key_event),
        Page::Settings => handle_settings_keys(app, key_event),
        Page::SharedLog | Page::SharedRoutine | Page::CareSheet => {
            handle_shared_keys(app, key_event)
        }
    }
}

fn handle_delete_modal(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down => {
            // Two options: Delete / Cancel
            app.modals.delete_modal_selection = 1 - app.modals.delete_modal_selection;
        }
        KeyCode::Enter => {
            if app.modals.delete_modal_selection == 0 {
                app.confirm_delete();
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}

fn handle_sign_in_keys(app: &mut App, key_event: KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Esc => {
            if app.sign_in.error.is_some() {
                // Dismiss the error, stay anonymous
                app.sign_in.error = None;
                false
            } else {
                true
            }
        }
        KeyCode::Enter => {
            app.submit_sign_in();
            false
        }
        _ => {
            edit_key(&mut app.sign_in.access_token, key_event);
            false
        }
    }
}

fn handle_dashboard_keys(app: &mut App, key_event: KeyEvent) -> bool {
    let bindings = app.config.key_bindings.clone();
    if matches_binding(&key_event, &bindings.quit) {
        return true;
    }
    if matches_binding(&key_event, &bindings.help) {
        app.show_help = true;
    } else if matches_binding(&key_event, &bindings.settings) {
        app.open_settings();
    } else if matches_binding(&key_event, &bindings.list_up) || key_event.code == KeyCode::Up {
        app.select_pet_up();
    } else if matches_binding(&key_event, &bindings.list_down) || key_event.code == KeyCode::Down {
        app.select_pet_down();
    } else if matches_binding(&key_event, &bindings.select) {
        if app.checkout.awaiting_return {
            // The user is back from the external checkout
            app.confirm_checkout_return();
        } else {
            app.open_selected_pet();
        }
    } else if matches_binding(&key_event, &bindings.new) {
        app.open_pet_form(None);
    } else if matches_binding(&key_event, &bindings.refresh) {
        app.load_dashboard();
    } else if matches_binding(&key_event, &bindings.upgrade) {
        app.start_checkout();
    }
    false
}

fn handle_pet_detail_keys(app: &mut App, key_event: KeyEvent) -> bool {
    let bindings = app.config.key_bindings.clone();
    if matches_binding(&key_event, &bindings.quit) {
        return true;
    }
    if key_event.code == KeyCode::Esc {
        app.page = Page::Dashboard;
        app.load_dashboard();
        return false;
    }
    if matches_binding(&key_event, &bindings.help) {
        app.show_help = true;
    } else if matches_binding(&key_event, &bindings.settings) {
        app.open_settings();
    } else if matches_binding(&key_event, &bindings.tab_left)
        || matches_binding(&key_event, &bindings.tab_right)
    {
        app.detail_tab = match app.detail_tab {
            Tab::Routines => Tab::Logs,
            Tab::Logs => Tab::Routines,
        };
    } else if matches_binding(&key_event, &bindings.list_up) || key_event.code == KeyCode::Up {
        app.detail_select_up();
    } else if matches_binding(&key_event, &bindings.list_down) || key_event.code == KeyCode::Down {
        app.detail_select_down();
    } else if matches_binding(&key_event, &bindings.new) {
        match app.detail_tab {
            Tab::Routines => app.open_routine_form(None),
            Tab::Logs => app.open_log_form(None),
        }
    } else if matches_binding(&key_event, &bindings.edit) {
        match app.detail_tab {
            Tab::Routines => {
                // Completed routines hide their edit affordance
                if let Some(routine) = app.selected_routine().cloned() {
                    if !routine.is_completed_for_current_period {
                        app.open_routine_form(Some(&routine));
                    }
                }
            }
            Tab::Logs => {
                if let Some(log) = app.selected_log().cloned() {
                    app.open_log_form(Some(&log));
                }
            }
        }
    } else if matches_binding(&key_event, &bindings.delete) {
        match app.detail_tab {
            Tab::Routines => {
                if let Some(routine) = app.selected_routine().cloned() {
                    app.request_delete(DeleteTarget::Routine(routine));
                }
            }
            Tab::Logs => {
                if let Some(log) = app.selected_log().cloned() {
                    app.request_delete(DeleteTarget::Log(log));
                }
            }
        }
    } else if matches_binding(&key_event, &bindings.complete) {
        if app.detail_tab == Tab::Routines {
            app.complete_selected_routine();
        }
    } else if matches_binding(&key_event, &bindings.share) {
        match app.detail_tab {
            Tab::Routines => app.share_selected_routine(),
            Tab::Logs => app.share_selected_log(),
        }
    } else if key_event.code == KeyCode::Char('c') {
        app.copy_care_sheet_link();
    } else if matches_binding(&key_event, &bindings.refresh) {
        if let Some(pet_id) = app.current_pet.as_ref().map(|p| p.id.clone()) {
            app.open_pet(&pet_id);
        }
    } else if matches_binding(&key_event, &bindings.upgrade) {
        app.start_checkout();
    } else if matches_binding(&key_event, &bindings.select) && app.checkout.awaiting_return {
        app.confirm_checkout_return();
    }
    false
}

fn handle_settings_keys(app: &mut App, key_event: KeyEvent) -> bool {
    // Feedback overlay
    if app.settings.feedback.is_some() {
        handle_feedback_keys(app, key_event);
        return false;
    }
    // Typed delete-account confirmation
    if app.settings.delete_account.is_some() {
        match key_event.code {
            KeyCode::Esc => app.settings.delete_account = None,
            KeyCode::Enter => app.confirm_delete_account(),
            _ => {
                if let Some(modal) = app.settings.delete_account.as_mut() {
                    edit_key(&mut modal.confirm, key_event);
                }
            }
        }
        return false;
    }

    let bindings = app.config.key_bindings.clone();
    if matches_binding(&key_event, &bindings.quit) {
        return true;
    }
    match key_event.code {
        KeyCode::Esc => {
            app.page = Page::Dashboard;
            app.load_dashboard();
        }
        KeyCode::Up => app.settings_select_up(),
        KeyCode::Down => app.settings_select_down(),
        KeyCode::Enter => app.activate_settings_entry(),
        _ => {
            if matches_binding(&key_event, &bindings.list_up) {
                app.settings_select_up();
            } else if matches_binding(&key_event, &bindings.list_down) {
                app.settings_select_down();
            } else if matches_binding(&key_event, &bindings.upgrade) {
                app.start_checkout();
            } else if matches_binding(&key_event, &bindings.select)
                && app.checkout.awaiting_return
            {
                app.confirm_checkout_return();
            } else if matches_binding(&key_event, &bindings.help) {
                app.show_help = true;
            }
        }
    }
    false
}

fn handle_feedback_keys(app: &mut App, key_event: KeyEvent) {
    let Some(form) = app.settings.feedback.as_mut() else {
        return;
    };
    match key_event.code {
        KeyCode::Esc => app.settings.feedback = None,
        KeyCode::Enter => app.submit_feedback(),
        KeyCode::Tab => {
            form.current_field = match form.current_field {
                FeedbackField::Stars => FeedbackField::Note,
                FeedbackField::Note => FeedbackField::Stars,
            };
        }
        KeyCode::Char(c @ '1'..='5') if form.current_field == FeedbackField::Stars => {
            form.stars = c as u8 - b'0';
        }
        KeyCode::Left if form.current_field == FeedbackField::Stars => {
            form.stars = form.stars.saturating_sub(1);
        }
        KeyCode::Right if form.current_field == FeedbackField::Stars => {
            form.stars = (form.stars + 1).min(5);
        }
        _ if form.current_field == FeedbackField::Note => {
            edit_key(&mut form.note, key_event);
        }
        _ => {}
    }
}

fn handle_shared_keys(app: &mut App, key_event: KeyEvent) -> bool {
    let bindings = app.config.key_bindings.clone();
    if matches_binding(&key_event, &bindings.quit) || key_event.code == KeyCode::Esc {
        return true;
    }
    if matches_binding(&key_event, &bindings.refresh) {
        app.load_shared();
    } else if matches_binding(&key_event, &bindings.complete)
        || key_event.code == KeyCode::Enter
    {
        match app.page {
            Page::SharedRoutine => app.complete_shared_routine(),
            Page::CareSheet => app.complete_care_sheet_routine(),
            _ => {}
        }
    } else if matches_binding(&key_event, &bindings.list_up) || key_event.code == KeyCode::Up {
        app.shared_select_up();
    } else if matches_binding(&key_event, &bindings.list_down) || key_event.code == KeyCode::Down
    {
        app.shared_select_down();
    }
    false
}

// ---- form handling ----

/// Fields currently visible in the routine form; medicine fields only for
/// medicine tasks, reminder fields only for pro members (and the delay
/// only when the reminder is on).
fn visible_routine_fields(form: &crate::tui::app::RoutineForm, is_pro: bool) -> Vec<RoutineField> {
    RoutineField::ORDER
        .iter()
        .copied()
        .filter(|field| match field {
            RoutineField::Medicine | RoutineField::MedicineInstructions => {
                form.task_type() == TaskType::Medicine
            }
            RoutineField::RemindMe => is_pro,
            RoutineField::RemindMinutes => is_pro && form.remind_me,
            _ => true,
        })
        .collect()
}

fn step<T: Copy + PartialEq>(order: &[T], current: T, forward: bool) -> T {
    let len = order.len();
    let index = order.iter().position(|f| *f == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    order[next]
}

fn form_step_field(app: &mut App, forward: bool) {
    let is_pro = app.session.is_pro_member();
    match app.form.as_mut() {
        Some(ActiveForm::Pet(form)) => {
            form.current_field = step(&PetField::ORDER, form.current_field, forward);
        }
        Some(ActiveForm::Routine(form)) => {
            let order = visible_routine_fields(form, is_pro);
            form.current_field = step(&order, form.current_field, forward);
        }
        Some(ActiveForm::Log(form)) => {
            form.current_field = step(&LogField::ORDER, form.current_field, forward);
        }
        None => {}
    }
}

/// The editor behind the focused field, if it is a text field.
fn current_editor(app: &mut App) -> Option<&mut Editor> {
    if app.page == Page::SignIn {
        return Some(&mut app.sign_in.access_token);
    }
    match app.form.as_mut()? {
        ActiveForm::Pet(form) => match form.current_field {
            PetField::Name => Some(&mut form.name),
            PetField::Species => None,
            PetField::Breed => Some(&mut form.breed),
            PetField::BirthDate => Some(&mut form.birth_date),
            PetField::Temperament => Some(&mut form.temperament),
            PetField::Notes => Some(&mut form.notes),
            PetField::VetName => Some(&mut form.vet_name),
            PetField::VetContact => Some(&mut form.vet_contact_number),
            PetField::EmergencyName => Some(&mut form.emergency_contact_name),
            PetField::EmergencyNumber => Some(&mut form.emergency_contact_number),
            PetField::Allergies => Some(&mut form.allergies),
        },
        ActiveForm::Routine(form) => match form.current_field {
            RoutineField::Name => Some(&mut form.name),
            RoutineField::Description => Some(&mut form.description),
            RoutineField::TimeOfDay => Some(&mut form.time_of_day),
            RoutineField::Medicine => Some(&mut form.medicine),
            RoutineField::MedicineInstructions => Some(&mut form.medicine_instructions),
            _ => None,
        },
        ActiveForm::Log(form) => match form.current_field {
            LogField::Title => Some(&mut form.title),
            LogField::LoggedAt => Some(&mut form.logged_at),
            LogField::Content => Some(&mut form.content),
        },
    }
}

/// Cycle the focused choice field. Returns false when the focused field is
/// not a choice.
fn form_cycle_choice(app: &mut App, forward: bool) -> bool {
    match app.form.as_mut() {
        Some(ActiveForm::Pet(form)) if form.current_field == PetField::Species => {
            form.species_index = (form.species_index + 1) % SPECIES_CHOICES.len();
            true
        }
        Some(ActiveForm::Routine(form)) => match form.current_field {
            RoutineField::TaskType => {
                let len = crate::tui::app::TASK_TYPE_CHOICES.len();
                form.task_type_index = if forward {
                    (form.task_type_index + 1) % len
                } else {
                    (form.task_type_index + len - 1) % len
                };
                true
            }
            RoutineField::Recurrence => {
                let len = crate::tui::app::RECURRENCE_CHOICES.len();
                form.recurrence_index = if forward {
                    (form.recurrence_index + 1) % len
                } else {
                    (form.recurrence_index + len - 1) % len
                };
                true
            }
            RoutineField::RemindMe => {
                form.remind_me = !form.remind_me;
                true
            }
            RoutineField::RemindMinutes => {
                let len = REMIND_MINUTES_CHOICES.len();
                form.remind_minutes_index = if forward {
                    (form.remind_minutes_index + 1) % len
                } else {
                    (form.remind_minutes_index + len - 1) % len
                };
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Whether the focused field is multi-line (Enter inserts a newline there).
fn form_in_multiline_field(app: &App) -> bool {
    match app.form.as_ref() {
        Some(ActiveForm::Pet(form)) => form.current_field == PetField::Notes,
        Some(ActiveForm::Log(form)) => form.current_field == LogField::Content,
        _ => false,
    }
}

fn handle_form_keys(app: &mut App, key_event: KeyEvent) -> bool {
    let bindings = app.config.key_bindings.clone();

    if matches_binding(&key_event, &bindings.save) {
        app.save_form();
        return false;
    }
    match key_event.code {
        KeyCode::Esc => {
            app.cancel_form();
            return false;
        }
        KeyCode::Tab => {
            form_step_field(app, true);
            return false;
        }
        KeyCode::BackTab => {
            form_step_field(app, false);
            return false;
        }
        KeyCode::Enter => {
            if form_in_multiline_field(app) {
                if let Some(editor) = current_editor(app) {
                    editor.insert_newline();
                }
            } else {
                form_step_field(app, true);
            }
            return false;
        }
        KeyCode::Left | KeyCode::Right => {
            let forward = key_event.code == KeyCode::Right;
            if form_cycle_choice(app, forward) {
                return false;
            }
            // Text field: move the cursor instead
            if let Some(editor) = current_editor(app) {
                if forward {
                    editor.move_right();
                } else {
                    editor.move_left();
                }
            }
            return false;
        }
        KeyCode::Char(' ') => {
            // Space toggles choices, types into text fields
            if form_cycle_choice(app, true) {
                return false;
            }
        }
        _ => {}
    }

    if let Some(editor) = current_editor(app) {
        edit_key(editor, key_event);
    } else if matches!(key_event.code, KeyCode::Up | KeyCode::Down) {
        // Arrow navigation across fields when not editing text
        form_step_field(app, key_event.code == KeyCode::Down);
    }
    false
}

/// Apply a plain editing key to an editor.
fn edit_key(editor: &mut Editor, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}

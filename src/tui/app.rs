use ratatui::widgets::ListState;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::api::{self, ApiClient};
use crate::completion;
use crate::config::Config;
use crate::models::{
    CareSheet, Log, Pet, RecurrenceType, Routine, ShareToken, SharedLogView, SharedRoutineView,
    Species, TaskType, REMIND_MINUTES_CHOICES,
};
use crate::session::Session;
use crate::tui::widgets::editor::Editor;

/// How long a status-bar message stays visible.
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

/// Bounded identity refresh delays after the user confirms returning from
/// checkout: the provider's webhook may land a moment after the redirect.
const CHECKOUT_REFRESH_DELAYS: [Duration; 2] =
    [Duration::from_millis(1500), Duration::from_millis(3500)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    SignIn,
    Dashboard,
    PetDetail,
    PetForm,
    RoutineForm,
    LogForm,
    Settings,
    SharedLog,
    SharedRoutine,
    CareSheet,
}

/// Tabs inside the pet detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Routines,
    Logs,
}

/// Which public view a share token opens.
#[derive(Debug, Clone)]
pub enum SharedTarget {
    Log(ShareToken),
    Routine(ShareToken),
    CareSheet(ShareToken),
}

/// Resolved projection behind a share token.
#[derive(Debug, Clone)]
pub enum SharedView {
    Log(SharedLogView),
    Routine(SharedRoutineView),
    CareSheet(CareSheet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Log,
    Routine,
    CareSheet,
}

/// Public link for a minted token, mirroring the web client's routes.
pub fn share_url(web_origin: &str, kind: ShareKind, token: &ShareToken) -> String {
    let origin = web_origin.trim_end_matches('/');
    match kind {
        ShareKind::Log => format!("{origin}/share/{token}"),
        ShareKind::Routine => format!("{origin}/share/routine/{token}"),
        ShareKind::CareSheet => format!("{origin}/share/caresheet/{token}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetField {
    Name,
    Species,
    Breed,
    BirthDate,
    Temperament,
    Notes,
    VetName,
    VetContact,
    EmergencyName,
    EmergencyNumber,
    Allergies,
}

impl PetField {
    pub const ORDER: [PetField; 11] = [
        PetField::Name,
        PetField::Species,
        PetField::Breed,
        PetField::BirthDate,
        PetField::Temperament,
        PetField::Notes,
        PetField::VetName,
        PetField::VetContact,
        PetField::EmergencyName,
        PetField::EmergencyNumber,
        PetField::Allergies,
    ];
}

#[derive(Debug, Clone)]
pub struct PetForm {
    pub current_field: PetField,
    pub name: Editor,
    pub species_index: usize, // 0 = Dog, 1 = Cat
    pub breed: Editor,
    pub birth_date: Editor,
    pub temperament: Editor,
    pub notes: Editor,
    pub vet_name: Editor,
    pub vet_contact_number: Editor,
    pub emergency_contact_name: Editor,
    pub emergency_contact_number: Editor,
    pub allergies: Editor,
    pub editing_pet_id: Option<String>, // None for new pets
    pub error: Option<String>,
}

impl PetForm {
    pub fn new() -> Self {
        Self {
            current_field: PetField::Name,
            name: Editor::new(),
            species_index: 0,
            breed: Editor::new(),
            birth_date: Editor::new(),
            temperament: Editor::new(),
            notes: Editor::new(),
            vet_name: Editor::new(),
            vet_contact_number: Editor::new(),
            emergency_contact_name: Editor::new(),
            emergency_contact_number: Editor::new(),
            allergies: Editor::new(),
            editing_pet_id: None,
            error: None,
        }
    }

    pub fn from_pet(pet: &Pet) -> Self {
        let text = |value: &Option<String>| Editor::from_text(value.as_deref().unwrap_or(""));
        Self {
            current_field: PetField::Name,
            name: Editor::from_text(&pet.name),
            species_index: match pet.species {
                Species::Dog => 0,
                Species::Cat => 1,
            },
            breed: text(&pet.breed),
            // Date inputs show the plain YYYY-MM-DD prefix
            birth_date: Editor::from_text(
                pet.birth_date.as_deref().map(|d| d.get(..10).unwrap_or(d)).unwrap_or(""),
            ),
            temperament: text(&pet.temperament),
            notes: text(&pet.notes),
            vet_name: text(&pet.vet_name),
            vet_contact_number: text(&pet.vet_contact_number),
            emergency_contact_name: text(&pet.emergency_contact_name),
            emergency_contact_number: text(&pet.emergency_contact_number),
            allergies: text(&pet.allergies),
            editing_pet_id: Some(pet.id.clone()),
            error: None,
        }
    }

    pub fn species(&self) -> Species {
        if self.species_index == 1 {
            Species::Cat
        } else {
            Species::Dog
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineField {
    TaskType,
    Name,
    Description,
    TimeOfDay,
    Recurrence,
    Medicine,
    MedicineInstructions,
    RemindMe,
    RemindMinutes,
}

impl RoutineField {
    pub const ORDER: [RoutineField; 9] = [
        RoutineField::TaskType,
        RoutineField::Name,
        RoutineField::Description,
        RoutineField::TimeOfDay,
        RoutineField::Recurrence,
        RoutineField::Medicine,
        RoutineField::MedicineInstructions,
        RoutineField::RemindMe,
        RoutineField::RemindMinutes,
    ];
}

pub const TASK_TYPE_CHOICES: [TaskType; 3] = [TaskType::Food, TaskType::Walk, TaskType::Medicine];
pub const RECURRENCE_CHOICES: [RecurrenceType; 3] = [
    RecurrenceType::Daily,
    RecurrenceType::Weekly,
    RecurrenceType::Custom,
];

#[derive(Debug, Clone)]
pub struct RoutineForm {
    pub pet_id: String,
    pub current_field: RoutineField,
    pub task_type_index: usize,
    pub name: Editor,
    pub description: Editor,
    pub time_of_day: Editor,
    pub recurrence_index: usize,
    pub medicine: Editor,
    pub medicine_instructions: Editor,
    pub remind_me: bool,
    pub remind_minutes_index: usize,
    pub editing_routine_id: Option<String>,
    pub error: Option<String>,
}

impl RoutineForm {
    pub fn new(pet_id: String) -> Self {
        Self {
            pet_id,
            current_field: RoutineField::TaskType,
            task_type_index: 0,
            name: Editor::new(),
            description: Editor::new(),
            time_of_day: Editor::from_text("09:00"),
            recurrence_index: 0,
            medicine: Editor::new(),
            medicine_instructions: Editor::new(),
            remind_me: false,
            // Default reminder delay is 10 minutes
            remind_minutes_index: 1,
            editing_routine_id: None,
            error: None,
        }
    }

    pub fn from_routine(routine: &Routine) -> Self {
        let text = |value: &Option<String>| Editor::from_text(value.as_deref().unwrap_or(""));
        let task_type = routine.display_task_type();
        Self {
            pet_id: routine.pet_id.clone(),
            current_field: RoutineField::TaskType,
            task_type_index: TASK_TYPE_CHOICES
                .iter()
                .position(|t| *t == task_type)
                .unwrap_or(0),
            name: Editor::from_text(&routine.name),
            description: text(&routine.description),
            time_of_day: Editor::from_text(routine.time_of_day_hhmm().unwrap_or("09:00")),
            recurrence_index: RECURRENCE_CHOICES
                .iter()
                .position(|r| *r == routine.recurrence_type)
                .unwrap_or(0),
            medicine: text(&routine.medicine),
            medicine_instructions: text(&routine.medicine_instructions),
            remind_me: routine.remind_me,
            remind_minutes_index: routine
                .remind_minutes_after
                .and_then(|m| REMIND_MINUTES_CHOICES.iter().position(|c| *c == m))
                .unwrap_or(1),
            editing_routine_id: Some(routine.id.clone()),
            error: None,
        }
    }

    pub fn task_type(&self) -> TaskType {
        TASK_TYPE_CHOICES[self.task_type_index % TASK_TYPE_CHOICES.len()]
    }

    pub fn recurrence(&self) -> RecurrenceType {
        RECURRENCE_CHOICES[self.recurrence_index % RECURRENCE_CHOICES.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogField {
    Title,
    LoggedAt,
    Content,
}

impl LogField {
    pub const ORDER: [LogField; 3] = [LogField::Title, LogField::LoggedAt, LogField::Content];
}

#[derive(Debug, Clone)]
pub struct LogForm {
    pub pet_id: String,
    pub current_field: LogField,
    pub title: Editor,
    /// Local date-time as "YYYY-MM-DD HH:MM".
    pub logged_at: Editor,
    pub content: Editor,
    pub editing_log_id: Option<String>,
    pub error: Option<String>,
}

impl LogForm {
    pub fn new(pet_id: String, now_local: chrono::NaiveDateTime) -> Self {
        Self {
            pet_id,
            current_field: LogField::Title,
            title: Editor::new(),
            logged_at: Editor::from_text(&now_local.format("%Y-%m-%d %H:%M").to_string()),
            content: Editor::new(),
            editing_log_id: None,
            error: None,
        }
    }

    pub fn from_log(log: &Log) -> Self {
        let local = log.logged_at.with_timezone(&chrono::Local).naive_local();
        Self {
            pet_id: log.pet_id.clone(),
            current_field: LogField::Title,
            title: Editor::from_text(&log.title),
            logged_at: Editor::from_text(&local.format("%Y-%m-%d %H:%M").to_string()),
            content: Editor::from_text(log.content.as_deref().unwrap_or("")),
            editing_log_id: Some(log.id.clone()),
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ActiveForm {
    Pet(PetForm),
    Routine(RoutineForm),
    Log(LogForm),
}

#[derive(Debug, Clone, Default)]
pub struct SignInState {
    pub access_token: Editor,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum DeleteTarget {
    Pet(Pet),
    Routine(Routine),
    Log(Log),
}

impl DeleteTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            DeleteTarget::Pet(_) => "Pet",
            DeleteTarget::Routine(_) => "Routine",
            DeleteTarget::Log(_) => "Log",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            DeleteTarget::Pet(pet) => &pet.name,
            DeleteTarget::Routine(routine) => &routine.name,
            DeleteTarget::Log(log) => &log.title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_confirmation: Option<DeleteTarget>,
    pub delete_modal_selection: usize, // 0 = Delete, 1 = Cancel
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEntry {
    Theme,
    Feedback,
    DeletePet(usize), // index into pets
    SignOut,
    DeleteAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackField {
    Stars,
    Note,
}

#[derive(Debug, Clone)]
pub struct FeedbackForm {
    pub stars: u8,
    pub note: Editor,
    pub current_field: FeedbackField,
    pub error: Option<String>,
}

impl FeedbackForm {
    pub fn new() -> Self {
        Self {
            stars: 0,
            note: Editor::new(),
            current_field: FeedbackField::Stars,
            error: None,
        }
    }
}

/// Account deletion requires typing the confirmation phrase.
pub const DELETE_ACCOUNT_PHRASE: &str = "DELETE";

#[derive(Debug, Clone, Default)]
pub struct DeleteAccountModal {
    pub confirm: Editor,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsState {
    pub entries: Vec<SettingsEntry>,
    pub selected_index: usize,
    pub list_state: ListState,
    pub feedback: Option<FeedbackForm>,
    pub delete_account: Option<DeleteAccountModal>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Bounded identity-refresh poll after an external checkout. Once the user
/// confirms they are back, two delayed refreshes are scheduled; firing a
/// deadline removes it, so a poll never repeats.
#[derive(Debug, Clone, Default)]
pub struct CheckoutPoll {
    pub awaiting_return: bool,
    deadlines: Vec<Instant>,
}

impl CheckoutPoll {
    /// Consume the success marker and schedule the delayed refreshes.
    pub fn schedule(&mut self, now: Instant) {
        self.awaiting_return = false;
        self.deadlines = CHECKOUT_REFRESH_DELAYS.iter().map(|d| now + *d).collect();
    }

    /// Number of deadlines that have come due; due deadlines are removed.
    pub fn take_due(&mut self, now: Instant) -> usize {
        let before = self.deadlines.len();
        self.deadlines.retain(|deadline| *deadline > now);
        before - self.deadlines.len()
    }

    pub fn is_polling(&self) -> bool {
        !self.deadlines.is_empty()
    }
}

pub struct App {
    // Core infrastructure
    pub config: Config,
    pub profile: crate::utils::Profile,
    pub api: ApiClient,
    pub session: Session,

    // Navigation
    pub page: Page,
    pub show_help: bool,

    // Dashboard data
    pub pets: Vec<Pet>,
    pub progress_by_pet: HashMap<String, (usize, usize)>, // completed / total
    pub selected_pet_index: usize,
    pub pet_list_state: ListState,

    // Pet detail data
    pub current_pet: Option<Pet>,
    pub routines: Vec<Routine>,
    pub logs: Vec<Log>,
    pub detail_tab: Tab,
    pub selected_routine_index: usize,
    pub routine_list_state: ListState,
    pub selected_log_index: usize,
    pub log_list_state: ListState,

    // Grouped state
    pub form: Option<ActiveForm>,
    pub sign_in: SignInState,
    pub settings: SettingsState,
    pub modals: ModalState,
    pub status: StatusState,
    pub checkout: CheckoutPoll,

    // Page-level fetch error (list fetches); action errors go to status
    pub page_error: Option<String>,

    // Public share viewing
    pub shared_target: Option<SharedTarget>,
    pub shared: Option<SharedView>,
    pub selected_shared_routine_index: usize,
    pub shared_list_state: ListState,
}

impl App {
    pub fn new(
        config: Config,
        profile: crate::utils::Profile,
        api: ApiClient,
        session: Session,
    ) -> Self {
        let page = if session.is_authenticated() {
            Page::Dashboard
        } else {
            Page::SignIn
        };
        let mut app = Self::empty(config, profile, api, session, page);
        if app.page == Page::Dashboard {
            app.load_dashboard();
        }
        app
    }

    /// Entry point for the three public share viewers; works without an
    /// identity, so an anonymous session is fine here.
    pub fn new_shared(
        config: Config,
        profile: crate::utils::Profile,
        api: ApiClient,
        target: SharedTarget,
    ) -> Self {
        let session = Session::restore_default(profile);
        let page = match target {
            SharedTarget::Log(_) => Page::SharedLog,
            SharedTarget::Routine(_) => Page::SharedRoutine,
            SharedTarget::CareSheet(_) => Page::CareSheet,
        };
        let mut app = Self::empty(config, profile, api, session, page);
        app.shared_target = Some(target);
        app.load_shared();
        app
    }

    fn empty(
        config: Config,
        profile: crate::utils::Profile,
        api: ApiClient,
        session: Session,
        page: Page,
    ) -> Self {
        Self {
            config,
            profile,
            api,
            session,
            page,
            show_help: false,
            pets: Vec::new(),
            progress_by_pet: HashMap::new(),
            selected_pet_index: 0,
            pet_list_state: ListState::default(),
            current_pet: None,
            routines: Vec::new(),
            logs: Vec::new(),
            detail_tab: Tab::Routines,
            selected_routine_index: 0,
            routine_list_state: ListState::default(),
            selected_log_index: 0,
            log_list_state: ListState::default(),
            form: None,
            sign_in: SignInState::default(),
            settings: SettingsState::default(),
            modals: ModalState::default(),
            status: StatusState::default(),
            checkout: CheckoutPoll::default(),
            page_error: None,
            shared_target: None,
            shared: None,
            selected_shared_routine_index: 0,
            shared_list_state: ListState::default(),
        }
    }

    // ---- status bar ----

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.message = Some(message.into());
        self.status.message_time = Some(Instant::now());
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(set_at) = self.status.message_time {
            if set_at.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status.message = None;
                self.status.message_time = None;
            }
        }
    }

    /// Per-frame housekeeping: expire the status message and fire any due
    /// checkout refreshes.
    pub fn tick(&mut self) {
        self.check_status_message_timeout();
        if self.checkout.take_due(Instant::now()) > 0 {
            self.session.refresh(&self.api);
            if self.session.is_pro_member() {
                self.set_status("Pro upgrade confirmed 🎉");
            }
        }
    }

    // ---- dashboard ----

    pub fn load_dashboard(&mut self) {
        self.page_error = None;
        // Pick up asynchronous account changes on every dashboard entry
        self.session.refresh(&self.api);
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            self.page = Page::SignIn;
            return;
        };
        match api::pets::get_pets(&self.api, &user_id) {
            Ok(pets) => {
                self.pets = pets;
                if self.selected_pet_index >= self.pets.len() {
                    self.selected_pet_index = 0;
                }
                self.sync_pet_list_state();
                self.load_progress(&user_id);
            }
            Err(e) => self.page_error = Some(e.to_string()),
        }
    }

    /// Per-pet routine progress shown on the dashboard cards. This is a
    /// secondary fetch; a failure leaves the card without a counter.
    fn load_progress(&mut self, user_id: &str) {
        self.progress_by_pet.clear();
        for pet in &self.pets {
            if let Ok(routines) = api::routines::get_routines(&self.api, &pet.id, user_id) {
                let completed = routines
                    .iter()
                    .filter(|r| r.is_completed_for_current_period)
                    .count();
                self.progress_by_pet
                    .insert(pet.id.clone(), (completed, routines.len()));
            }
        }
    }

    pub fn sync_pet_list_state(&mut self) {
        if self.pets.is_empty() {
            self.pet_list_state.select(None);
        } else {
            self.pet_list_state.select(Some(self.selected_pet_index));
        }
    }

    pub fn select_pet_up(&mut self) {
        if self.selected_pet_index > 0 {
            self.selected_pet_index -= 1;
        }
        self.sync_pet_list_state();
    }

    pub fn select_pet_down(&mut self) {
        if self.selected_pet_index + 1 < self.pets.len() {
            self.selected_pet_index += 1;
        }
        self.sync_pet_list_state();
    }

    // ---- pet detail ----

    pub fn open_selected_pet(&mut self) {
        let Some(pet) = self.pets.get(self.selected_pet_index) else {
            return;
        };
        let pet_id = pet.id.clone();
        self.open_pet(&pet_id);
    }

    pub fn open_pet(&mut self, pet_id: &str) {
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            return;
        };
        self.page_error = None;
        self.detail_tab = Tab::Routines;
        self.page = Page::PetDetail;

        let fetched = api::pets::get_pet(&self.api, pet_id, &user_id)
            .and_then(|pet| {
                let routines = api::routines::get_routines(&self.api, pet_id, &user_id)?;
                Ok((pet, routines))
            })
            .and_then(|(pet, routines)| {
                let logs = api::logs::get_logs(&self.api, pet_id, &user_id)?;
                Ok((pet, routines, logs))
            });
        match fetched {
            Ok((pet, routines, logs)) => {
                self.current_pet = Some(pet);
                self.set_routines(routines);
                self.set_logs(logs);
            }
            Err(e) => self.page_error = Some(e.to_string()),
        }
    }

    fn set_routines(&mut self, mut routines: Vec<Routine>) {
        // Same ordering as the web client: by time of day, missing last-ish
        routines.sort_by_key(|r| r.time_of_day.clone().unwrap_or_default());
        self.routines = routines;
        if self.selected_routine_index >= self.routines.len() {
            self.selected_routine_index = 0;
        }
        self.sync_detail_list_state();
    }

    fn set_logs(&mut self, mut logs: Vec<Log>) {
        // Newest first
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        self.logs = logs;
        if self.selected_log_index >= self.logs.len() {
            self.selected_log_index = 0;
        }
        self.sync_detail_list_state();
    }

    pub fn sync_detail_list_state(&mut self) {
        if self.routines.is_empty() {
            self.routine_list_state.select(None);
        } else {
            self.routine_list_state.select(Some(self.selected_routine_index));
        }
        if self.logs.is_empty() {
            self.log_list_state.select(None);
        } else {
            self.log_list_state.select(Some(self.selected_log_index));
        }
    }

    pub fn reload_routines(&mut self) {
        let (Some(pet), Some(user_id)) = (
            self.current_pet.as_ref().map(|p| p.id.clone()),
            self.session.user_id().map(str::to_string),
        ) else {
            return;
        };
        match api::routines::get_routines(&self.api, &pet, &user_id) {
            Ok(routines) => self.set_routines(routines),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn reload_logs(&mut self) {
        let (Some(pet), Some(user_id)) = (
            self.current_pet.as_ref().map(|p| p.id.clone()),
            self.session.user_id().map(str::to_string),
        ) else {
            return;
        };
        match api::logs::get_logs(&self.api, &pet, &user_id) {
            Ok(logs) => self.set_logs(logs),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn detail_select_up(&mut self) {
        match self.detail_tab {
            Tab::Routines => {
                if self.selected_routine_index > 0 {
                    self.selected_routine_index -= 1;
                }
            }
            Tab::Logs => {
                if self.selected_log_index > 0 {
                    self.selected_log_index -= 1;
                }
            }
        }
        self.sync_detail_list_state();
    }

    pub fn detail_select_down(&mut self) {
        match self.detail_tab {
            Tab::Routines => {
                if self.selected_routine_index + 1 < self.routines.len() {
                    self.selected_routine_index += 1;
                }
            }
            Tab::Logs => {
                if self.selected_log_index + 1 < self.logs.len() {
                    self.selected_log_index += 1;
                }
            }
        }
        self.sync_detail_list_state();
    }

    pub fn selected_routine(&self) -> Option<&Routine> {
        self.routines.get(self.selected_routine_index)
    }

    pub fn selected_log(&self) -> Option<&Log> {
        self.logs.get(self.selected_log_index)
    }

    /// Completed-vs-total for the header ("2 of 3 completed today").
    pub fn routine_progress(&self) -> (usize, usize) {
        let completed = self
            .routines
            .iter()
            .filter(|r| r.is_completed_for_current_period)
            .count();
        (completed, self.routines.len())
    }

    // ---- completion ----

    pub fn complete_selected_routine(&mut self) {
        let Some(routine) = self.selected_routine() else {
            return;
        };
        if routine.is_completed_for_current_period {
            // Already done for this period; nothing to submit
            return;
        }
        let id = routine.id.clone();
        match api::routines::complete_routine(&self.api, &id) {
            Ok(updated) => {
                // Targeted merge; on a stale list fall back to a refetch
                if !completion::merge_completed(&mut self.routines, updated) {
                    self.reload_routines();
                }
                self.set_status("Marked as done ✓");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ---- sharing ----

    pub fn share_selected_routine(&mut self) {
        let Some(routine) = self.selected_routine() else {
            return;
        };
        let id = routine.id.clone();
        match api::routines::share_routine(&self.api, &id) {
            Ok(token) => {
                let url = share_url(&self.config.web_origin, ShareKind::Routine, &token);
                self.offer_link(url);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn share_selected_log(&mut self) {
        let (Some(log), Some(user_id)) = (
            self.selected_log().map(|l| l.id.clone()),
            self.session.user_id().map(str::to_string),
        ) else {
            return;
        };
        match api::logs::share_log(&self.api, &log, &user_id) {
            Ok(token) => {
                let url = share_url(&self.config.web_origin, ShareKind::Log, &token);
                self.offer_link(url);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn copy_care_sheet_link(&mut self) {
        let (Some(pet), Some(user_id)) = (
            self.current_pet.as_ref().map(|p| p.id.clone()),
            self.session.user_id().map(str::to_string),
        ) else {
            return;
        };
        match api::pets::create_care_sheet_share(&self.api, &pet, &user_id) {
            Ok(token) => {
                let url = share_url(&self.config.web_origin, ShareKind::CareSheet, &token);
                self.offer_link(url);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Put a link on the clipboard, falling back to showing it in the
    /// status bar when no clipboard is available (e.g. over SSH).
    fn offer_link(&mut self, url: String) {
        match copy_to_clipboard(&url) {
            Ok(()) => self.set_status("Link copied to clipboard"),
            Err(_) => self.set_status(url),
        }
    }

    // ---- forms ----

    pub fn open_pet_form(&mut self, editing: Option<&Pet>) {
        self.form = Some(ActiveForm::Pet(match editing {
            Some(pet) => PetForm::from_pet(pet),
            None => PetForm::new(),
        }));
        self.page = Page::PetForm;
    }

    pub fn open_routine_form(&mut self, editing: Option<&Routine>) {
        let Some(pet_id) = self.current_pet.as_ref().map(|p| p.id.clone()) else {
            return;
        };
        self.form = Some(ActiveForm::Routine(match editing {
            Some(routine) => RoutineForm::from_routine(routine),
            None => RoutineForm::new(pet_id),
        }));
        self.page = Page::RoutineForm;
    }

    pub fn open_log_form(&mut self, editing: Option<&Log>) {
        let Some(pet_id) = self.current_pet.as_ref().map(|p| p.id.clone()) else {
            return;
        };
        self.form = Some(ActiveForm::Log(match editing {
            Some(log) => LogForm::from_log(log),
            None => LogForm::new(pet_id, chrono::Local::now().naive_local()),
        }));
        self.page = Page::LogForm;
    }

    pub fn cancel_form(&mut self) {
        let return_page = match self.form.take() {
            Some(ActiveForm::Pet(_)) => Page::Dashboard,
            Some(ActiveForm::Routine(_)) | Some(ActiveForm::Log(_)) => Page::PetDetail,
            None => Page::Dashboard,
        };
        self.page = return_page;
    }

    pub fn save_form(&mut self) {
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            return;
        };
        let Some(form) = self.form.clone() else {
            return;
        };
        match form {
            ActiveForm::Pet(pet_form) => self.save_pet_form(pet_form, &user_id),
            ActiveForm::Routine(routine_form) => self.save_routine_form(routine_form, &user_id),
            ActiveForm::Log(log_form) => self.save_log_form(log_form, &user_id),
        }
    }

    fn form_error(&mut self, message: String) {
        match self.form.as_mut() {
            Some(ActiveForm::Pet(f)) => f.error = Some(message),
            Some(ActiveForm::Routine(f)) => f.error = Some(message),
            Some(ActiveForm::Log(f)) => f.error = Some(message),
            None => self.set_status(message),
        }
    }

    fn save_pet_form(&mut self, form: PetForm, user_id: &str) {
        if form.name.text().trim().is_empty() {
            self.form_error("Name is required.".to_string());
            return;
        }
        let payload = api::pets::PetPayload::from_form(
            &form.name.text(),
            form.species(),
            &form.breed.text(),
            &form.birth_date.text(),
            &form.notes.text(),
            &form.temperament.text(),
            &form.vet_name.text(),
            &form.vet_contact_number.text(),
            &form.emergency_contact_name.text(),
            &form.emergency_contact_number.text(),
            &form.allergies.text(),
        );
        let result = match &form.editing_pet_id {
            Some(id) => api::pets::update_pet(&self.api, id, &payload, user_id),
            None => api::pets::create_pet(&self.api, &payload, user_id),
        };
        match result {
            Ok(_) => {
                self.form = None;
                self.page = Page::Dashboard;
                self.load_dashboard();
                self.set_status("Pet saved");
            }
            Err(e) => self.form_error(e.to_string()),
        }
    }

    fn save_routine_form(&mut self, form: RoutineForm, user_id: &str) {
        if form.name.text().trim().is_empty() {
            self.form_error("Name is required.".to_string());
            return;
        }
        // Medicine fields only apply to medicine tasks
        let is_medicine = form.task_type() == TaskType::Medicine;
        let medicine = if is_medicine { form.medicine.text() } else { String::new() };
        let instructions = if is_medicine {
            form.medicine_instructions.text()
        } else {
            String::new()
        };
        let payload = api::routines::RoutinePayload::from_form(
            &form.pet_id,
            &form.name.text(),
            &form.description.text(),
            form.recurrence(),
            &form.time_of_day.text(),
            form.remind_me,
            &medicine,
            &instructions,
            self.session.is_pro_member(),
        );
        let result = match &form.editing_routine_id {
            Some(id) => api::routines::update_routine(&self.api, id, &payload),
            None => api::routines::create_routine(&self.api, &payload, user_id),
        };
        match result {
            Ok(_) => {
                self.form = None;
                self.page = Page::PetDetail;
                self.reload_routines();
                self.set_status("Task saved");
            }
            Err(e) => self.form_error(e.to_string()),
        }
    }

    fn save_log_form(&mut self, form: LogForm, user_id: &str) {
        if form.title.text().trim().is_empty() {
            self.form_error("Title is required.".to_string());
            return;
        }
        let logged_at = match parse_local_datetime(&form.logged_at.text()) {
            Some(instant) => instant,
            None => {
                self.form_error("Date & time must be YYYY-MM-DD HH:MM.".to_string());
                return;
            }
        };
        let payload = api::logs::LogPayload::from_form(
            &form.pet_id,
            &form.title.text(),
            &form.content.text(),
            logged_at,
        );
        let result = match &form.editing_log_id {
            Some(id) => api::logs::update_log(&self.api, id, &payload, user_id),
            None => api::logs::create_log(&self.api, &payload, user_id),
        };
        match result {
            Ok(_) => {
                self.form = None;
                self.page = Page::PetDetail;
                self.detail_tab = Tab::Logs;
                self.reload_logs();
                self.set_status("Log saved");
            }
            Err(e) => self.form_error(e.to_string()),
        }
    }

    // ---- sign in / out ----

    pub fn submit_sign_in(&mut self) {
        let token = self.sign_in.access_token.text();
        let token = token.trim();
        if token.is_empty() {
            self.sign_in.error = Some("Paste a Google access token first.".to_string());
            return;
        }
        match self.session.sign_in_with_access_token(&self.api, token) {
            Ok(identity) => {
                self.sign_in = SignInState::default();
                self.page = Page::Dashboard;
                self.load_dashboard();
                self.set_status(format!("Welcome, {}!", identity.first_name()));
            }
            // Session stays anonymous; the error is dismissible (Esc)
            Err(e) => self.sign_in.error = Some(e.to_string()),
        }
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
        self.pets.clear();
        self.progress_by_pet.clear();
        self.current_pet = None;
        self.routines.clear();
        self.logs.clear();
        self.page = Page::SignIn;
    }

    // ---- checkout ----

    pub fn start_checkout(&mut self) {
        if self.session.is_pro_member() {
            return;
        }
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            return;
        };
        match api::checkout::create_pro_checkout(&self.api, &user_id, &self.config.web_origin) {
            Ok(session) => {
                let _ = copy_to_clipboard(&session.url);
                self.checkout.awaiting_return = true;
                self.set_status(
                    "Checkout link copied — finish in your browser, then press Enter here",
                );
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// The user says checkout finished: refresh now and schedule the two
    /// bounded retries. The awaiting marker is cleared first so this never
    /// runs twice for one checkout.
    pub fn confirm_checkout_return(&mut self) {
        if !self.checkout.awaiting_return {
            return;
        }
        self.checkout.schedule(Instant::now());
        self.session.refresh(&self.api);
    }

    // ---- delete confirmation ----

    pub fn request_delete(&mut self, target: DeleteTarget) {
        self.modals.delete_confirmation = Some(target);
        self.modals.delete_modal_selection = 0;
    }

    pub fn cancel_delete(&mut self) {
        self.modals.delete_confirmation = None;
    }

    pub fn confirm_delete(&mut self) {
        let Some(target) = self.modals.delete_confirmation.take() else {
            return;
        };
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            return;
        };
        let result = match &target {
            DeleteTarget::Pet(pet) => api::pets::delete_pet(&self.api, &pet.id, &user_id),
            DeleteTarget::Routine(routine) => api::routines::delete_routine(&self.api, &routine.id),
            DeleteTarget::Log(log) => api::logs::delete_log(&self.api, &log.id, &user_id),
        };
        match result {
            Ok(()) => match target {
                DeleteTarget::Pet(pet) => {
                    self.pets.retain(|p| p.id != pet.id);
                    if self.selected_pet_index >= self.pets.len() {
                        self.selected_pet_index = 0;
                    }
                    self.sync_pet_list_state();
                    self.rebuild_settings_entries();
                    self.set_status(format!("{} deleted", pet.name));
                }
                DeleteTarget::Routine(_) => {
                    self.reload_routines();
                    self.set_status("Task deleted");
                }
                DeleteTarget::Log(_) => {
                    self.reload_logs();
                    self.set_status("Log deleted");
                }
            },
            // Prior data stays intact on failure
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ---- settings ----

    pub fn open_settings(&mut self) {
        self.rebuild_settings_entries();
        self.settings.selected_index = 0;
        self.settings.list_state.select(Some(0));
        self.page = Page::Settings;
    }

    pub fn rebuild_settings_entries(&mut self) {
        let mut entries = vec![SettingsEntry::Theme, SettingsEntry::Feedback];
        for index in 0..self.pets.len() {
            entries.push(SettingsEntry::DeletePet(index));
        }
        entries.push(SettingsEntry::SignOut);
        entries.push(SettingsEntry::DeleteAccount);
        self.settings.entries = entries;
        if self.settings.selected_index >= self.settings.entries.len() {
            self.settings.selected_index = 0;
        }
        self.settings
            .list_state
            .select(Some(self.settings.selected_index));
    }

    pub fn settings_select_up(&mut self) {
        if self.settings.selected_index > 0 {
            self.settings.selected_index -= 1;
        }
        self.settings
            .list_state
            .select(Some(self.settings.selected_index));
    }

    pub fn settings_select_down(&mut self) {
        if self.settings.selected_index + 1 < self.settings.entries.len() {
            self.settings.selected_index += 1;
        }
        self.settings
            .list_state
            .select(Some(self.settings.selected_index));
    }

    pub fn activate_settings_entry(&mut self) {
        let Some(entry) = self
            .settings
            .entries
            .get(self.settings.selected_index)
            .copied()
        else {
            return;
        };
        match entry {
            SettingsEntry::Theme => self.cycle_theme(),
            SettingsEntry::Feedback => self.settings.feedback = Some(FeedbackForm::new()),
            SettingsEntry::DeletePet(index) => {
                if let Some(pet) = self.pets.get(index) {
                    self.request_delete(DeleteTarget::Pet(pet.clone()));
                }
            }
            SettingsEntry::SignOut => self.sign_out(),
            SettingsEntry::DeleteAccount => {
                self.settings.delete_account = Some(DeleteAccountModal::default());
            }
        }
    }

    pub fn cycle_theme(&mut self) {
        let themes = self.config.get_available_themes();
        if themes.is_empty() {
            return;
        }
        let current = themes
            .iter()
            .position(|t| *t == self.config.current_theme)
            .unwrap_or(0);
        let next = themes[(current + 1) % themes.len()].clone();
        if self.config.set_theme(&next).is_ok() {
            let _ = self.config.save_with_profile(self.profile);
            self.set_status(format!("Theme: {next}"));
        }
    }

    pub fn submit_feedback(&mut self) {
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            return;
        };
        let Some(form) = self.settings.feedback.clone() else {
            return;
        };
        match api::feedback::submit_feedback(&self.api, form.stars, &form.note.text(), &user_id) {
            Ok(()) => {
                self.settings.feedback = None;
                self.set_status("Thanks for the feedback!");
            }
            Err(e) => {
                if let Some(feedback) = self.settings.feedback.as_mut() {
                    feedback.error = Some(e.to_string());
                }
            }
        }
    }

    pub fn confirm_delete_account(&mut self) {
        let Some(modal) = self.settings.delete_account.as_ref() else {
            return;
        };
        if modal.confirm.text() != DELETE_ACCOUNT_PHRASE {
            if let Some(modal) = self.settings.delete_account.as_mut() {
                modal.error = Some(format!("Type {DELETE_ACCOUNT_PHRASE} to confirm."));
            }
            return;
        }
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            return;
        };
        match api::users::delete_user(&self.api, &user_id, &user_id) {
            Ok(()) => {
                self.settings.delete_account = None;
                self.sign_out();
                self.set_status("Account deleted");
            }
            Err(e) => {
                if let Some(modal) = self.settings.delete_account.as_mut() {
                    modal.error = Some(e.to_string());
                }
            }
        }
    }

    // ---- public share views ----

    pub fn load_shared(&mut self) {
        self.page_error = None;
        let Some(target) = self.shared_target.clone() else {
            return;
        };
        let loaded = match &target {
            SharedTarget::Log(token) => {
                api::logs::get_shared_log(&self.api, token).map(SharedView::Log)
            }
            SharedTarget::Routine(token) => {
                api::routines::get_shared_routine(&self.api, token).map(SharedView::Routine)
            }
            SharedTarget::CareSheet(token) => {
                api::caresheet::get_care_sheet(&self.api, token).map(SharedView::CareSheet)
            }
        };
        match loaded {
            Ok(view) => {
                if let SharedView::CareSheet(sheet) = &view {
                    if self.selected_shared_routine_index >= sheet.routines.len() {
                        self.selected_shared_routine_index = 0;
                    }
                    self.shared_list_state
                        .select((!sheet.routines.is_empty()).then_some(self.selected_shared_routine_index));
                }
                self.shared = Some(view);
            }
            Err(e) => self.page_error = Some(e.to_string()),
        }
    }

    /// Complete via the routine share token (shared routine page).
    pub fn complete_shared_routine(&mut self) {
        let Some(SharedTarget::Routine(token)) = self.shared_target.clone() else {
            return;
        };
        match api::routines::complete_shared_routine(&self.api, &token) {
            Ok(updated) => {
                self.shared = Some(SharedView::Routine(updated));
                self.set_status("Marked as done ✓");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn shared_select_up(&mut self) {
        if self.selected_shared_routine_index > 0 {
            self.selected_shared_routine_index -= 1;
            self.shared_list_state
                .select(Some(self.selected_shared_routine_index));
        }
    }

    pub fn shared_select_down(&mut self) {
        if let Some(SharedView::CareSheet(sheet)) = &self.shared {
            if self.selected_shared_routine_index + 1 < sheet.routines.len() {
                self.selected_shared_routine_index += 1;
                self.shared_list_state
                    .select(Some(self.selected_shared_routine_index));
            }
        }
    }

    /// Complete the selected care-sheet routine via its embedded token.
    pub fn complete_care_sheet_routine(&mut self) {
        let Some(SharedView::CareSheet(sheet)) = &self.shared else {
            return;
        };
        let Some(routine) = sheet.routines.get(self.selected_shared_routine_index) else {
            return;
        };
        let token = routine.share_token.clone();
        match api::routines::complete_shared_routine(&self.api, &token) {
            Ok(updated) => {
                if let Some(SharedView::CareSheet(sheet)) = self.shared.as_mut() {
                    completion::merge_shared_completed(&mut sheet.routines, &token, &updated);
                }
                self.set_status("Marked as done ✓");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }
}

/// Parse "YYYY-MM-DD HH:MM" in local time into a UTC instant.
pub fn parse_local_datetime(text: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::{Local, NaiveDateTime, TimeZone, Utc};
    let naive = NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M").ok()?;
    let local = Local.from_local_datetime(&naive).single()?;
    Some(local.with_timezone(&Utc))
}

fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text.to_string()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_urls_match_the_web_routes() {
        let token = ShareToken::new("tok123");
        assert_eq!(
            share_url("https://pawlog.app", ShareKind::Log, &token),
            "https://pawlog.app/share/tok123"
        );
        assert_eq!(
            share_url("https://pawlog.app/", ShareKind::Routine, &token),
            "https://pawlog.app/share/routine/tok123"
        );
        assert_eq!(
            share_url("https://pawlog.app", ShareKind::CareSheet, &token),
            "https://pawlog.app/share/caresheet/tok123"
        );
    }

    #[test]
    fn checkout_poll_fires_each_deadline_once() {
        let mut poll = CheckoutPoll::default();
        poll.awaiting_return = true;
        let start = Instant::now();
        poll.schedule(start);

        // Scheduling consumes the return marker
        assert!(!poll.awaiting_return);
        assert!(poll.is_polling());

        assert_eq!(poll.take_due(start), 0);
        assert_eq!(poll.take_due(start + Duration::from_millis(2000)), 1);
        // The fired deadline does not fire again
        assert_eq!(poll.take_due(start + Duration::from_millis(2000)), 0);
        assert_eq!(poll.take_due(start + Duration::from_millis(4000)), 1);
        assert!(!poll.is_polling());
        assert_eq!(poll.take_due(start + Duration::from_secs(60)), 0);
    }

    #[test]
    fn parse_local_datetime_round_trips_format() {
        let parsed = parse_local_datetime("2026-08-05 14:30").unwrap();
        let local = parsed.with_timezone(&chrono::Local);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2026-08-05 14:30");
        assert!(parse_local_datetime("2026-08-05").is_none());
        assert!(parse_local_datetime("yesterday").is_none());
    }

    #[test]
    fn routine_form_round_trips_choices() {
        let form = RoutineForm::new("p1".to_string());
        assert_eq!(form.task_type(), TaskType::Food);
        assert_eq!(form.recurrence(), RecurrenceType::Daily);
        assert_eq!(
            REMIND_MINUTES_CHOICES[form.remind_minutes_index],
            10,
            "default reminder delay is 10 minutes"
        );
    }
}

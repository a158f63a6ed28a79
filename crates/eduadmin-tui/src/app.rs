//! Application state management for eduadmin.
//!
//! This module contains the core `App` struct. It owns the configuration,
//! session, API client and the `Store` cache, tracks UI state (route, history,
//! selection, overlays, toast), and coordinates background fetches.
//!
//! Network calls run in spawned tokio tasks holding a clone of the API client.
//! Their results come back over an mpsc channel tagged with the `FetchTicket`
//! issued when the fetch began, and are applied to the store on the UI task by
//! `check_background_tasks`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use eduadmin_core::api::{ApiClient, ApiError, PageResult, TestsQuery, UpdateResult};
use eduadmin_core::auth::Session;
use eduadmin_core::config::Config;
use eduadmin_core::models::{parse_record, parse_records, Role, TeacherName, Test, User};
use eduadmin_core::store::{
    age_display, CollectionKey, EntityKind, FetchTarget, FetchTicket, FlatCollection, Metadata,
    Page, StalenessPolicy, Store, TeacherFilter,
};

use crate::route::Route;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// How long a toast stays in the status bar.
const TOAST_DURATION: Duration = Duration::from_secs(5);

/// Field holding a record's id in API payloads.
pub const ID_FIELD: &str = "_id";

/// Maximum back-navigation depth.
const MAX_HISTORY: usize = 50;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    SelectingTeacher,
    ConfirmingQuit,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// Short-lived notification shown in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    shown_at: Instant,
}

impl Toast {
    fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_DURATION
    }
}

/// Editable state of the user detail view.
///
/// `is_active` is a local copy seeded from the cached record. It diverges
/// when toggled and is reset from the server's record after a successful
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub user_id: String,
    pub is_active: Option<bool>,
    pub is_updating: bool,
    pub load_error: Option<String>,
}

impl UserForm {
    fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_active: None,
            is_updating: false,
            load_error: None,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned fetch tasks back to the UI task.
#[derive(Debug)]
pub enum FetchResult {
    TestsPage {
        ticket: FetchTicket,
        result: Result<PageResult, ApiError>,
    },
    TeacherNames {
        ticket: FetchTicket,
        result: Result<Vec<Value>, ApiError>,
    },
    Users {
        ticket: FetchTicket,
        result: Result<Vec<Value>, ApiError>,
    },
    User {
        ticket: FetchTicket,
        result: Result<Value, ApiError>,
    },
    UserUpdated {
        id: String,
        result: Result<UpdateResult, ApiError>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    pub store: Store,
    policy: StalenessPolicy,

    // UI state
    pub state: AppState,
    pub route: Route,
    history: Vec<Route>,
    pub selection: usize,
    pub teacher_selection: usize,
    pub user_form: Option<UserForm>,
    pub toast: Option<Toast>,

    // Background task channel
    fetch_tx: mpsc::Sender<FetchResult>,
    fetch_rx: mpsc::Receiver<FetchResult>,
}

impl App {
    /// Create the application from disk config and session.
    ///
    /// `base_url` overrides the configured API address.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let mut config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        if let Some(url) = base_url {
            config.base_url = url;
        }

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let mut session = Session::new(cache_dir);
        if let Err(e) = session.load() {
            warn!(error = %e, "Failed to load session");
        }

        let mut api = ApiClient::new(config.base_url.clone(), config.request_timeout())?;
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
        }

        Ok(Self::with_services(config, session, api))
    }

    /// Assemble an `App` around already-built services.
    pub fn with_services(config: Config, session: Session, api: ApiClient) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let policy = config.staleness_policy();

        Self {
            config,
            session,
            api,
            store: Store::new(),
            policy,
            state: AppState::Normal,
            route: Route::default(),
            history: Vec::new(),
            selection: 0,
            teacher_selection: 0,
            user_form: None,
            toast: None,
            fetch_tx,
            fetch_rx,
        }
    }

    // ===== Profile =====

    /// Fetch the signed-in user's record before the first view is entered.
    ///
    /// The tests list is keyed differently for teachers, so the role must be
    /// known up front. Failure leaves the app usable as a non-teacher.
    pub async fn load_profile(&mut self) {
        let Some(user_id) = self.session.user_id().map(str::to_string) else {
            debug!("No signed-in user, skipping profile");
            return;
        };
        let Some(ticket) = self.store.begin_entity_fetch(&EntityKind::Users, &user_id, true) else {
            return;
        };

        match self.api.fetch_user(&user_id).await {
            Ok(record) => {
                self.store.complete_entity(&ticket, record);
                info!(user_id = %user_id, teacher = self.is_teacher(), "Profile loaded");
            }
            Err(e) => {
                self.store.fail_entity(&ticket);
                warn!(error = %e, "Failed to load profile");
                self.toast_error(e.user_message(&self.config.generic_error_message));
            }
        }
    }

    pub fn current_user(&self) -> Option<User> {
        let id = self.session.user_id()?;
        parse_record(self.store.get_entity(&EntityKind::Users, id)?)
    }

    pub fn is_teacher(&self) -> bool {
        self.current_user().is_some_and(|u| u.is_teacher())
    }

    // ===== Toasts =====

    pub fn toast_info(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(ToastLevel::Info, message));
    }

    pub fn toast_success(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(ToastLevel::Success, message));
    }

    pub fn toast_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(ToastLevel::Error, message));
    }

    fn error_message(&self, err: &ApiError) -> String {
        err.user_message(&self.config.generic_error_message)
    }

    // ===== Navigation =====

    /// Navigate to `route`, remembering the current one for `go_back`.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            self.enter_route();
            return;
        }
        debug!(from = %self.route, to = %route, "Navigate");
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push(previous);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
        self.selection = 0;
        self.enter_route();
    }

    /// Return to the previous route. Returns false when there is none.
    pub fn go_back(&mut self) -> bool {
        match self.history.pop() {
            Some(route) => {
                self.route = route;
                self.selection = 0;
                self.enter_route();
                true
            }
            None => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Start whatever fetches the current route needs.
    pub fn enter_route(&mut self) {
        match self.route.clone() {
            Route::Tests { page, teacher } => {
                self.state = AppState::Normal;
                self.ensure_teacher_names();
                self.load_tests(page, &teacher, false);
            }
            Route::Users { role } => {
                self.load_users(role, false);
            }
            Route::User { id } => {
                if self.user_form.as_ref().map(|f| f.user_id.as_str()) != Some(id.as_str()) {
                    self.user_form = Some(UserForm::new(id.clone()));
                }
                self.seed_user_form();
                self.load_user(&id, false);
            }
        }
    }

    /// Go to `page` of the tests list with the current teacher filter.
    ///
    /// Pages below 1 are rejected and nothing happens.
    pub fn go_to_page(&mut self, page: i64) -> bool {
        let Route::Tests { teacher, .. } = &self.route else {
            return false;
        };
        let Ok(page) = u32::try_from(page) else {
            debug!(page, "Rejecting page out of range");
            return false;
        };
        if page < 1 {
            debug!(page, "Rejecting page below 1");
            return false;
        }
        let teacher = teacher.clone();
        self.navigate(Route::Tests { page, teacher });
        true
    }

    pub fn next_page(&mut self) -> bool {
        let Route::Tests { page, .. } = self.route else {
            return false;
        };
        if !self.has_next_page() {
            return false;
        }
        self.go_to_page(i64::from(page) + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        let Route::Tests { page, .. } = self.route else {
            return false;
        };
        self.go_to_page(i64::from(page) - 1)
    }

    /// Whether a page after the current one exists, per the loaded page's
    /// `hasNextPage` flag. Pages without data (loading or failed) have none.
    pub fn has_next_page(&self) -> bool {
        self.current_tests_page()
            .filter(|p| p.data.is_some())
            .is_some_and(|p| p.has_next_page)
    }

    /// Switch the teacher filter, starting again from page 1.
    pub fn select_teacher(&mut self, teacher: TeacherFilter) {
        self.state = AppState::Normal;
        self.navigate(Route::Tests { page: 1, teacher });
    }

    /// Refetch whatever the current view shows, bypassing the cache.
    pub fn retry(&mut self) {
        match self.route.clone() {
            Route::Tests { page, teacher } => {
                if self.store.collections().get_collection_error(&CollectionKey::TeacherNames).is_some() {
                    self.load_teacher_names(true);
                }
                self.load_tests(page, &teacher, true);
            }
            Route::Users { role } => self.load_users(role, true),
            Route::User { id } => {
                if let Some(form) = self.user_form.as_mut() {
                    form.load_error = None;
                }
                self.load_user(&id, true);
            }
        }
    }

    // ===== Tests list =====

    /// Cache key of the tests list for `teacher`.
    ///
    /// Teachers only ever see their own tests, so they share one key
    /// regardless of filter.
    pub fn tests_key(&self, teacher: &TeacherFilter) -> CollectionKey {
        if self.is_teacher() {
            CollectionKey::OwnTests
        } else {
            CollectionKey::Tests(teacher.clone())
        }
    }

    fn current_tests_key(&self) -> Option<CollectionKey> {
        match &self.route {
            Route::Tests { teacher, .. } => Some(self.tests_key(teacher)),
            _ => None,
        }
    }

    pub fn current_tests_page(&self) -> Option<&Page> {
        let Route::Tests { page, .. } = &self.route else {
            return None;
        };
        let key = self.current_tests_key()?;
        self.store.collections().get_page_data(&key, *page)
    }

    pub fn current_tests_metadata(&self) -> Option<Metadata> {
        let key = self.current_tests_key()?;
        self.store.collections().get_metadata(&key)
    }

    pub fn current_tests(&self) -> Vec<Test> {
        self.current_tests_page()
            .map(|p| parse_records(p.items()))
            .unwrap_or_default()
    }

    /// Fetch a tests page unless it is cached and fresh (or `force` is set).
    pub fn load_tests(&mut self, page: u32, teacher: &TeacherFilter, force: bool) {
        let key = self.tests_key(teacher);
        if !self.store.collections().has_collection(&key) {
            self.store.collections_mut().initialize(&key, true);
        }

        let cached = self.store.collections().get_page_data(&key, page).is_some();
        let stale = self.store.collections().is_page_stale(&key, page, &self.policy);
        if cached && !stale && !force {
            return;
        }

        let ticket = match self.store.begin_page_fetch(&key, page, force) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, %key, "Cannot fetch tests page");
                return;
            }
        };

        let query = TestsQuery {
            page,
            limit: self.config.page_size,
            teacher_id: match key {
                CollectionKey::OwnTests => None,
                _ => Some(teacher.as_param().to_string()),
            },
        };
        debug!(%key, page, force, "Fetching tests page");

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_tests(&query).await;
            Self::send_result(&tx, FetchResult::TestsPage { ticket, result }).await;
        });
    }

    // ===== Teacher selector =====

    /// Teacher names are loaded once per session; teachers never see the selector.
    pub fn ensure_teacher_names(&mut self) {
        if self.is_teacher() {
            return;
        }
        let untouched = self
            .store
            .collections()
            .get_collection(&CollectionKey::TeacherNames)
            .map_or(true, |c| c.items.is_none() && c.error.is_none() && !c.is_loading);
        if untouched {
            self.load_teacher_names(false);
        }
    }

    pub fn load_teacher_names(&mut self, force: bool) {
        let key = CollectionKey::TeacherNames;
        if !self.store.collections().has_collection(&key) {
            self.store.collections_mut().initialize(&key, false);
        }
        let ticket = match self.store.begin_collection_fetch(&key, force) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Cannot fetch teacher names");
                return;
            }
        };

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_teacher_names().await;
            Self::send_result(&tx, FetchResult::TeacherNames { ticket, result }).await;
        });
    }

    /// Selector options: "All" followed by every known teacher.
    pub fn teacher_options(&self) -> Vec<(TeacherFilter, String)> {
        let teachers: Vec<TeacherName> = self
            .store
            .collections()
            .get_collection_data(&CollectionKey::TeacherNames)
            .map(parse_records)
            .unwrap_or_default();

        std::iter::once((TeacherFilter::All, "All".to_string()))
            .chain(
                teachers
                    .iter()
                    .map(|t| (TeacherFilter::Teacher(t.id.clone()), t.label())),
            )
            .collect()
    }

    /// Label of the teacher filter currently applied.
    pub fn current_teacher_label(&self) -> String {
        let Route::Tests { teacher, .. } = &self.route else {
            return String::new();
        };
        self.teacher_options()
            .into_iter()
            .find(|(filter, _)| filter == teacher)
            .map(|(_, label)| label)
            .unwrap_or_else(|| teacher.as_param().to_string())
    }

    pub fn open_teacher_selector(&mut self) {
        if self.is_teacher() || !matches!(self.route, Route::Tests { .. }) {
            return;
        }
        let options = self.teacher_options();
        let current = match &self.route {
            Route::Tests { teacher, .. } => options.iter().position(|(f, _)| f == teacher),
            _ => None,
        };
        self.teacher_selection = current.unwrap_or(0);
        self.state = AppState::SelectingTeacher;
    }

    // ===== Users list =====

    pub fn users_key(role: Option<Role>) -> CollectionKey {
        CollectionKey::Users(role)
    }

    pub fn current_users(&self) -> Option<&FlatCollection> {
        let Route::Users { role } = &self.route else {
            return None;
        };
        self.store.collections().get_collection(&Self::users_key(*role))
    }

    pub fn current_user_list(&self) -> Vec<User> {
        self.current_users()
            .and_then(|c| c.items.as_deref())
            .map(parse_records)
            .unwrap_or_default()
    }

    pub fn load_users(&mut self, role: Option<Role>, force: bool) {
        let key = Self::users_key(role);
        if !self.store.collections().has_collection(&key) {
            self.store.collections_mut().initialize(&key, false);
        }

        let needs_fetch = force
            || self
                .store
                .collections()
                .get_collection(&key)
                .map_or(true, |c| match c.fetched_at {
                    Some(at) => self.policy.is_stale(at),
                    None => c.items.is_none() && c.error.is_none(),
                });
        if !needs_fetch {
            return;
        }

        let ticket = match self.store.begin_collection_fetch(&key, force) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, %key, "Cannot fetch users");
                return;
            }
        };
        debug!(%key, force, "Fetching users");

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_users(role).await;
            Self::send_result(&tx, FetchResult::Users { ticket, result }).await;
        });
    }

    pub fn cycle_role_filter(&mut self) {
        if let Route::Users { role } = self.route {
            self.navigate(Route::Users { role: Role::cycle(role) });
        }
    }

    /// Open the detail view of the selected user in the list.
    pub fn open_selected_user(&mut self) {
        let Some(user) = self.current_user_list().into_iter().nth(self.selection) else {
            return;
        };
        self.navigate(Route::User { id: user.id });
    }

    // ===== User detail =====

    pub fn user_record(&self, id: &str) -> Option<&Value> {
        self.store.get_entity(&EntityKind::Users, id)
    }

    pub fn viewed_user(&self) -> Option<User> {
        let form = self.user_form.as_ref()?;
        parse_record(self.user_record(&form.user_id)?)
    }

    /// The viewed record is cached but has no readable shape (e.g. no `_id`).
    pub fn is_viewed_user_unreadable(&self) -> bool {
        let Some(form) = self.user_form.as_ref() else {
            return false;
        };
        self.user_record(&form.user_id).is_some() && self.viewed_user().is_none()
    }

    pub fn is_user_loading(&self, id: &str) -> bool {
        self.store.is_entity_loading(&EntityKind::Users, id)
    }

    pub fn load_user(&mut self, id: &str, force: bool) {
        if !force && self.user_record(id).is_some() {
            return;
        }
        let Some(ticket) = self.store.begin_entity_fetch(&EntityKind::Users, id, force) else {
            return;
        };
        debug!(user_id = id, force, "Fetching user");

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = api.fetch_user(&id).await;
            Self::send_result(&tx, FetchResult::User { ticket, result }).await;
        });
    }

    /// Seed the form's local `is_active` from the cached record, once.
    fn seed_user_form(&mut self) {
        let Some(form) = self.user_form.as_ref() else {
            return;
        };
        if form.is_active.is_some() {
            return;
        }
        let record_active = self
            .user_record(&form.user_id)
            .and_then(parse_record::<User>)
            .map(|u| u.is_active);
        if let Some(form) = self.user_form.as_mut() {
            form.is_active = record_active;
        }
    }

    fn reset_user_form(&mut self) {
        if let Some(form) = self.user_form.as_mut() {
            form.is_active = None;
        }
        self.seed_user_form();
    }

    pub fn toggle_user_active(&mut self) {
        let Some(form) = self.user_form.as_mut() else {
            return;
        };
        if form.is_updating {
            return;
        }
        if let Some(active) = form.is_active.as_mut() {
            *active = !*active;
        }
    }

    /// Whether the local toggle differs from the cached record.
    pub fn user_has_changed(&self) -> bool {
        let (Some(form), Some(user)) = (self.user_form.as_ref(), self.viewed_user()) else {
            return false;
        };
        form.is_active.is_some_and(|active| active != user.is_active)
    }

    pub fn can_submit_user_update(&self) -> bool {
        let Some(form) = self.user_form.as_ref() else {
            return false;
        };
        self.user_has_changed() && !form.is_updating && !self.is_user_loading(&form.user_id)
    }

    pub fn submit_user_update(&mut self) {
        if !self.can_submit_user_update() {
            return;
        }
        let Some(form) = self.user_form.as_mut() else {
            return;
        };
        let Some(active) = form.is_active else {
            return;
        };
        form.is_updating = true;
        let id = form.user_id.clone();
        info!(user_id = %id, is_active = active, "Updating user");

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let patch = json!({ "isActive": active });
            let result = api.update_user(&id, &patch).await;
            Self::send_result(&tx, FetchResult::UserUpdated { id, result }).await;
        });
    }

    // ===== Background results =====

    /// Helper to send fetch results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<FetchResult>, result: FetchResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.fetch_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_fetch_result(result);
        }

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    /// Apply one fetch result to the store.
    ///
    /// Results whose ticket has been superseded are dropped by the store and
    /// raise no toast.
    pub fn process_fetch_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::TestsPage { ticket, result } => match result {
                Ok(page) => {
                    if let Err(e) = self
                        .store
                        .complete_page(&ticket, page.items, page.pagination.as_ref())
                    {
                        warn!(error = %e, "Failed to store tests page");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch tests page");
                    let message = self.error_message(&e);
                    if matches!(self.store.fail_page(&ticket, message.clone()), Ok(true)) {
                        self.toast_error(message);
                    }
                }
            },
            FetchResult::TeacherNames { ticket, result } => match result {
                Ok(items) => {
                    debug!(count = items.len(), "Teacher names loaded");
                    if let Err(e) = self.store.complete_collection(&ticket, items) {
                        warn!(error = %e, "Failed to store teacher names");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch teacher names");
                    let message = self.error_message(&e);
                    if matches!(self.store.fail_collection(&ticket, message.clone()), Ok(true)) {
                        self.toast_error(message);
                    }
                }
            },
            FetchResult::Users { ticket, result } => match result {
                Ok(items) => {
                    if let Err(e) = self.store.complete_collection(&ticket, items) {
                        warn!(error = %e, "Failed to store users");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch users");
                    let message = self.error_message(&e);
                    if matches!(self.store.fail_collection(&ticket, message.clone()), Ok(true)) {
                        self.toast_error(message);
                    }
                }
            },
            FetchResult::User { ticket, result } => {
                let id = match ticket.target() {
                    FetchTarget::Entity(_, id) => id.clone(),
                    _ => return,
                };
                match result {
                    Ok(record) => {
                        if self.store.complete_entity(&ticket, record) {
                            if let Some(form) = self.user_form.as_mut().filter(|f| f.user_id == id) {
                                form.load_error = None;
                                self.reset_user_form();
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, user_id = %id, "Failed to fetch user");
                        let message = self.error_message(&e);
                        if self.store.fail_entity(&ticket) {
                            if let Some(form) = self.user_form.as_mut().filter(|f| f.user_id == id) {
                                form.load_error = Some(message.clone());
                            }
                            self.toast_error(message);
                        }
                    }
                }
            }
            FetchResult::UserUpdated { id, result } => {
                if let Some(form) = self.user_form.as_mut().filter(|f| f.user_id == id) {
                    form.is_updating = false;
                }
                match result {
                    Ok(update) => {
                        let patched = self.store.propagate_entity(
                            &EntityKind::Users,
                            &id,
                            &update.record,
                            ID_FIELD,
                            &CollectionKey::user_lists(),
                        );
                        info!(user_id = %id, patched, "User updated");
                        if self.user_form.as_ref().is_some_and(|f| f.user_id == id) {
                            self.reset_user_form();
                        }
                        self.toast_success(update.message.unwrap_or_else(|| "Saved".to_string()));
                    }
                    Err(e) => {
                        warn!(error = %e, user_id = %id, "Failed to update user");
                        let message = self.error_message(&e);
                        self.toast_error(message);
                    }
                }
            }
        }
    }

    // ===== Status =====

    /// Age of the data the current view shows, for the status bar.
    pub fn data_age(&self) -> Option<String> {
        let fetched_at = match &self.route {
            Route::Tests { .. } => self.current_tests_page()?.fetched_at?,
            Route::Users { .. } => self.current_users()?.fetched_at?,
            Route::User { .. } => return None,
        };
        Some(age_display(fetched_at))
    }
}

// ============================================================================
// Tests
// ============================================================================

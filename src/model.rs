use arboard::Clipboard;
use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::auth::{self, Session, SessionStore};
use crate::domain::{AppConfig, Message};
use crate::inputter::Inputter;
use crate::mock;
use crate::records::{
    AdminRecord, AdminRole, AdminStatus, ApprovalStatus, ClientRecord, ClientSortKey, ClientStatus,
};
use crate::table::TableState;

#[derive(Debug, PartialEq)]
pub enum Status {
    Running,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Clients,
    Admins,
    Approvals,
}

impl Screen {
    /// Screens reachable once logged in, in tab order.
    pub const TABS: [Screen; 4] = [
        Screen::Dashboard,
        Screen::Clients,
        Screen::Admins,
        Screen::Approvals,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Dashboard => "Dashboard",
            Screen::Clients => "Clients",
            Screen::Admins => "Admins",
            Screen::Approvals => "Approvals",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Default)]
pub struct LoginForm {
    pub email: Inputter,
    pub password: Inputter,
    pub focus: Option<LoginField>,
    pub error: Option<String>,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            focus: Some(LoginField::Email),
            ..Self::default()
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Some(LoginField::Email) => Some(LoginField::Password),
            _ => Some(LoginField::Email),
        };
    }
}

pub struct ClientsView {
    pub table: TableState<ClientRecord>,
    /// Row cursor within the visible page.
    pub cursor: usize,
    pub searching: bool,
    pub search: Inputter,
}

pub struct AdminStats {
    pub total: usize,
    pub active: usize,
    pub super_admins: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminModalKind {
    Add,
    Edit,
    Deactivate,
    Reactivate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Role,
}

#[derive(Default)]
pub struct AdminForm {
    pub name: Inputter,
    pub email: Inputter,
    pub role: Option<AdminRole>,
    pub focus: Option<FormField>,
    pub name_error: Option<&'static str>,
    pub email_error: Option<&'static str>,
}

impl AdminForm {
    fn empty() -> Self {
        Self {
            role: Some(AdminRole::Admin),
            focus: Some(FormField::Name),
            ..Self::default()
        }
    }

    fn prefilled(admin: &AdminRecord) -> Self {
        Self {
            name: Inputter::with_value(&admin.name),
            email: Inputter::with_value(&admin.email),
            role: Some(admin.role),
            focus: Some(FormField::Name),
            name_error: None,
            email_error: None,
        }
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            Some(FormField::Name) => Some(FormField::Email),
            Some(FormField::Email) => Some(FormField::Role),
            _ => Some(FormField::Name),
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Some(FormField::Name) => Some(FormField::Role),
            Some(FormField::Email) => Some(FormField::Name),
            _ => Some(FormField::Email),
        };
    }

    fn cycle_role(&mut self) {
        let current = self.role.unwrap_or(AdminRole::Admin);
        let pos = AdminRole::ALL
            .iter()
            .position(|&r| r == current)
            .unwrap_or(0);
        self.role = Some(AdminRole::ALL[(pos + 1) % AdminRole::ALL.len()]);
    }

    /// Same rules as the add/edit form of the web original.
    pub fn validate(&mut self) -> bool {
        let name = self.name.value().trim();
        self.name_error = if name.is_empty() {
            Some("Name is required")
        } else if name.chars().count() < 2 {
            Some("Name must be at least 2 characters")
        } else {
            None
        };

        let email = self.email.value().trim();
        self.email_error = if email.is_empty() {
            Some("Email is required")
        } else if !valid_email(email) {
            Some("Please enter a valid email address")
        } else {
            None
        };

        self.name_error.is_none() && self.email_error.is_none()
    }
}

/// Shape check equivalent to the original's `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
pub fn valid_email(s: &str) -> bool {
    let part_ok = |p: &str| !p.is_empty() && !p.chars().any(|c| c.is_whitespace() || c == '@');
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    part_ok(local) && part_ok(host) && part_ok(tld)
}

pub struct AdminModal {
    pub kind: AdminModalKind,
    /// Roster index the modal acts on, None for Add.
    pub target: Option<usize>,
    pub form: AdminForm,
}

pub struct AdminsView {
    pub roster: Vec<AdminRecord>,
    pub cursor: usize,
    pub searching: bool,
    pub search: Inputter,
    pub role_filter: Option<AdminRole>,
    pub status_filter: Option<AdminStatus>,
    pub modal: Option<AdminModal>,
    next_id: usize,
}

impl AdminsView {
    fn new(roster: Vec<AdminRecord>) -> Self {
        let next_id = roster
            .iter()
            .filter_map(|a| a.id.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            roster,
            cursor: 0,
            searching: false,
            search: Inputter::default(),
            role_filter: None,
            status_filter: None,
            modal: None,
            next_id,
        }
    }

    /// Search, role and status filters are AND combined, like the web page.
    pub fn filtered(&self) -> Vec<usize> {
        let query = self.search.value().trim().to_lowercase();
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                (query.is_empty() || a.matches(&query))
                    && self.role_filter.is_none_or(|r| a.role == r)
                    && self.status_filter.is_none_or(|s| a.status == s)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn stats(&self) -> AdminStats {
        AdminStats {
            total: self.roster.len(),
            active: self
                .roster
                .iter()
                .filter(|a| a.status == AdminStatus::Active)
                .count(),
            super_admins: self
                .roster
                .iter()
                .filter(|a| a.role == AdminRole::SuperAdmin && a.status == AdminStatus::Active)
                .count(),
        }
    }

    fn selected(&self) -> Option<usize> {
        self.filtered().get(self.cursor).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocReview {
    Pending,
    Verified,
    Rejected,
}

impl DocReview {
    pub fn label(self) -> &'static str {
        match self {
            DocReview::Pending => "pending",
            DocReview::Verified => "verified",
            DocReview::Rejected => "rejected",
        }
    }
}

pub struct RequestDetail {
    /// Index into the full request list.
    pub request: usize,
    pub doc_cursor: usize,
    /// Per-document review marks, parallel to the request's kyc list.
    pub reviews: Vec<DocReview>,
}

pub struct ApprovalsView {
    pub requests: Vec<crate::records::ApprovalRequest>,
    pub cursor: usize,
    pub filter: Option<ApprovalStatus>,
    pub detail: Option<RequestDetail>,
}

impl ApprovalsView {
    pub fn filtered(&self) -> Vec<usize> {
        self.requests
            .iter()
            .enumerate()
            .filter(|(_, r)| self.filter.is_none_or(|f| r.status == f))
            .map(|(idx, _)| idx)
            .collect()
    }
}

pub struct DashboardStats {
    pub total_clients: usize,
    pub verified: usize,
    pub pending: usize,
    pub suspended: usize,
    pub active_admins: usize,
    pub pending_approvals: usize,
}

pub struct Model {
    pub status: Status,
    pub screen: Screen,
    pub session: Option<Session>,
    pub login: LoginForm,
    pub clients: ClientsView,
    pub admins: AdminsView,
    pub approvals: ApprovalsView,
    pub show_help: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
    session_store: SessionStore,
    clipboard: Option<Clipboard>,
    rng: StdRng,
}

impl Model {
    pub fn init(config: AppConfig) -> Self {
        let session_store = SessionStore::new(&config.session_file);
        let session = session_store.load();
        let screen = if session.is_some() {
            Screen::Dashboard
        } else {
            Screen::Login
        };

        let clipboard = match Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                warn!("Clipboard unavailable: {e}");
                None
            }
        };

        Self {
            status: Status::Running,
            screen,
            session,
            login: LoginForm::new(),
            clients: ClientsView {
                table: TableState::new(mock::clients(config.seed), config.page_size),
                cursor: 0,
                searching: false,
                search: Inputter::default(),
            },
            admins: AdminsView::new(mock::admins()),
            approvals: ApprovalsView {
                requests: mock::approvals(),
                cursor: 0,
                filter: None,
                detail: None,
            },
            show_help: false,
            status_message: "Started backoffice".to_string(),
            last_status_message_update: Instant::now(),
            rng: StdRng::seed_from_u64(config.seed),
            session_store,
            clipboard,
        }
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    /// True while keystrokes belong to a text field or a modal form and
    /// must reach the model unmapped.
    pub fn capturing_input(&self) -> bool {
        match self.screen {
            Screen::Login => true,
            Screen::Clients => self.clients.searching,
            Screen::Admins => self.admins.searching || self.admins.modal.is_some(),
            Screen::Dashboard | Screen::Approvals => false,
        }
    }

    pub fn kpis(&self) -> DashboardStats {
        let by_status = |status: ClientStatus| {
            self.clients
                .table
                .rows()
                .iter()
                .filter(|c| c.status == status)
                .count()
        };
        DashboardStats {
            total_clients: self.clients.table.rows().len(),
            verified: by_status(ClientStatus::Verified),
            pending: by_status(ClientStatus::Pending),
            suspended: by_status(ClientStatus::Suspended),
            active_admins: self.admins.stats().active,
            pending_approvals: self
                .approvals
                .requests
                .iter()
                .filter(|r| r.status == ApprovalStatus::Pending)
                .count(),
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    pub fn update(&mut self, message: Message) {
        trace!("Update: screen {:?}, message {:?}", self.screen, message);

        if self.show_help {
            if let Message::Exit | Message::Help = message {
                self.show_help = false;
            }
            return;
        }

        match message {
            Message::Quit => self.quit(),
            Message::Help => self.show_help = true,
            Message::Logout => self.logout(),
            Message::NextScreen => self.cycle_screen(1),
            Message::PrevScreen => self.cycle_screen(-1),
            _ => match self.screen {
                Screen::Login => {
                    if let Message::RawKey(key) = message {
                        self.login_key(key);
                    }
                }
                Screen::Dashboard => {}
                Screen::Clients => self.update_clients(message),
                Screen::Admins => self.update_admins(message),
                Screen::Approvals => self.update_approvals(message),
            },
        }
    }

    fn cycle_screen(&mut self, step: i32) {
        if self.session.is_none() {
            return;
        }
        let pos = Screen::TABS
            .iter()
            .position(|&s| s == self.screen)
            .unwrap_or(0) as i32;
        let n = Screen::TABS.len() as i32;
        self.screen = Screen::TABS[((pos + step).rem_euclid(n)) as usize];
    }

    // -------------------- Login ---------------------- //

    fn login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.toggle_focus()
            }
            KeyCode::Enter => match self.login.focus {
                Some(LoginField::Email) => self.login.focus = Some(LoginField::Password),
                _ => self.try_login(),
            },
            _ => {
                let field = match self.login.focus {
                    Some(LoginField::Password) => &mut self.login.password,
                    _ => &mut self.login.email,
                };
                field.read(key);
                self.login.error = None;
            }
        }
    }

    fn try_login(&mut self) {
        let email = self.login.email.value().trim().to_string();
        match auth::authenticate(&email, self.login.password.value()) {
            Some(user) => {
                info!("Login succeeded for {}", user.email);
                let session = Session {
                    token: auth::issue_token(&mut self.rng),
                    user,
                };
                if let Err(e) = self.session_store.save(&session) {
                    warn!("Could not persist session: {e}");
                }
                self.session = Some(session);
                self.login = LoginForm::new();
                self.screen = Screen::Dashboard;
                self.set_status_message(format!("Logged in as {email}"));
            }
            None => {
                debug!("Login rejected for {email:?}");
                self.login.password.clear();
                self.login.error = Some("Invalid email or password".to_string());
            }
        }
    }

    fn logout(&mut self) {
        if self.session.is_none() {
            return;
        }
        if let Err(e) = self.session_store.clear() {
            warn!("Could not clear stored session: {e}");
        }
        info!("Logged out");
        self.session = None;
        self.login = LoginForm::new();
        self.screen = Screen::Login;
        self.set_status_message("Logged out");
    }

    // -------------------- Clients ---------------------- //

    fn update_clients(&mut self, message: Message) {
        match message {
            Message::RawKey(key) if self.clients.searching => self.clients_search_key(key),
            Message::Search => {
                self.clients.search.set(self.clients.table.query());
                self.clients.searching = true;
            }
            Message::MoveUp => self.clients.cursor = self.clients.cursor.saturating_sub(1),
            Message::MoveDown => {
                let visible = self.clients.table.window().visible.len();
                if visible > 0 {
                    self.clients.cursor = std::cmp::min(self.clients.cursor + 1, visible - 1);
                }
            }
            Message::NextPage => {
                self.clients.table.next_page();
                self.clients.cursor = 0;
            }
            Message::PrevPage => {
                self.clients.table.prev_page();
                self.clients.cursor = 0;
            }
            Message::FirstPage => {
                self.clients.table.first_page();
                self.clients.cursor = 0;
            }
            Message::LastPage => {
                self.clients.table.last_page();
                self.clients.cursor = 0;
            }
            Message::SortColumn(idx) => {
                if let Some(&key) = ClientSortKey::COLUMNS.get(idx) {
                    self.clients.table.toggle_sort(key);
                }
            }
            Message::CycleStatusFilter => {
                let next = cycle_option(&ClientStatus::ALL, self.clients.table.status_filter());
                self.clients.table.set_status_filter(next);
                self.clients.cursor = 0;
                self.set_status_message(match next {
                    Some(s) => format!("Status filter: {}", s.label()),
                    None => "Status filter: All".to_string(),
                });
            }
            Message::CyclePageSize => {
                self.clients.table.cycle_page_size();
                self.clients.cursor = 0;
                self.set_status_message(format!(
                    "Page size: {} / page",
                    self.clients.table.page_size()
                ));
            }
            Message::CopyRow => self.copy_selected_client(),
            _ => (),
        }
    }

    /// The query is applied live on every keystroke; Enter keeps it,
    /// Esc drops it entirely.
    fn clients_search_key(&mut self, key: KeyEvent) {
        let result = self.clients.search.read(key);
        if result.canceled {
            self.clients.searching = false;
            self.clients.search.clear();
            self.clients.table.set_query("");
        } else if result.finished {
            self.clients.searching = false;
        } else {
            self.clients.table.set_query(result.value);
        }
        self.clients.cursor = 0;
    }

    fn copy_selected_client(&mut self) {
        let window = self.clients.table.window();
        let Some(&idx) = window.visible.get(self.clients.cursor) else {
            self.set_status_message("No row selected");
            return;
        };
        let record = self.clients.table.row(idx);
        let cells = [
            record.name.clone(),
            record.email.clone(),
            record.status.label().to_string(),
            format!("{:.2}", record.balance),
            record.registered_label(),
        ];
        let line = cells
            .iter()
            .map(|c| wrap_cell_content(c))
            .collect::<Vec<String>>()
            .join(",");

        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(line) {
                Ok(()) => self.set_status_message(format!("Copied row for {}", record.name)),
                Err(e) => {
                    warn!("Error copying to clipboard: {e:?}");
                    self.set_status_message("Could not copy to clipboard");
                }
            },
            None => self.set_status_message("Clipboard unavailable"),
        }
    }

    // -------------------- Admins ---------------------- //

    fn update_admins(&mut self, message: Message) {
        match message {
            Message::RawKey(key) if self.admins.modal.is_some() => self.admin_modal_key(key),
            Message::RawKey(key) if self.admins.searching => {
                let result = self.admins.search.read(key);
                if result.canceled {
                    self.admins.searching = false;
                    self.admins.search.clear();
                } else if result.finished {
                    self.admins.searching = false;
                }
                self.admins.cursor = 0;
            }
            Message::Search => self.admins.searching = true,
            Message::MoveUp => self.admins.cursor = self.admins.cursor.saturating_sub(1),
            Message::MoveDown => {
                let len = self.admins.filtered().len();
                if len > 0 {
                    self.admins.cursor = std::cmp::min(self.admins.cursor + 1, len - 1);
                }
            }
            Message::CycleRoleFilter => {
                self.admins.role_filter = cycle_option(&AdminRole::ALL, self.admins.role_filter);
                self.admins.cursor = 0;
            }
            Message::CycleStatusFilter => {
                self.admins.status_filter = cycle_option(
                    &[AdminStatus::Active, AdminStatus::Inactive],
                    self.admins.status_filter,
                );
                self.admins.cursor = 0;
            }
            Message::OpenAdd => {
                self.admins.modal = Some(AdminModal {
                    kind: AdminModalKind::Add,
                    target: None,
                    form: AdminForm::empty(),
                });
            }
            Message::OpenEdit => {
                if let Some(idx) = self.admins.selected() {
                    self.admins.modal = Some(AdminModal {
                        kind: AdminModalKind::Edit,
                        target: Some(idx),
                        form: AdminForm::prefilled(&self.admins.roster[idx]),
                    });
                }
            }
            Message::Deactivate => self.open_status_modal(AdminModalKind::Deactivate),
            Message::Reactivate => self.open_status_modal(AdminModalKind::Reactivate),
            _ => (),
        }
    }

    fn open_status_modal(&mut self, kind: AdminModalKind) {
        let Some(idx) = self.admins.selected() else {
            return;
        };
        let expected = match kind {
            AdminModalKind::Deactivate => AdminStatus::Active,
            _ => AdminStatus::Inactive,
        };
        if self.admins.roster[idx].status != expected {
            return;
        }
        self.admins.modal = Some(AdminModal {
            kind,
            target: Some(idx),
            form: AdminForm::empty(),
        });
    }

    fn admin_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.admins.modal.as_mut() else {
            return;
        };
        match modal.kind {
            AdminModalKind::Deactivate | AdminModalKind::Reactivate => match key.code {
                KeyCode::Enter => self.confirm_status_change(),
                KeyCode::Esc => self.admins.modal = None,
                _ => (),
            },
            AdminModalKind::Add | AdminModalKind::Edit => match key.code {
                KeyCode::Esc => self.admins.modal = None,
                KeyCode::Tab | KeyCode::Down => modal.form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => modal.form.focus_prev(),
                KeyCode::Enter => self.submit_admin_form(),
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                    if modal.form.focus == Some(FormField::Role) =>
                {
                    modal.form.cycle_role()
                }
                _ => {
                    match modal.form.focus {
                        Some(FormField::Name) => {
                            modal.form.name.read(key);
                        }
                        Some(FormField::Email) => {
                            modal.form.email.read(key);
                        }
                        _ => (),
                    };
                }
            },
        }
    }

    fn confirm_status_change(&mut self) {
        let Some(modal) = self.admins.modal.take() else {
            return;
        };
        let Some(idx) = modal.target else {
            return;
        };
        let admin = &mut self.admins.roster[idx];
        admin.status = match modal.kind {
            AdminModalKind::Deactivate => AdminStatus::Inactive,
            _ => AdminStatus::Active,
        };
        let verb = match admin.status {
            AdminStatus::Inactive => "Deactivated",
            AdminStatus::Active => "Reactivated",
        };
        let name = admin.name.clone();
        self.set_status_message(format!("{verb} {name}"));
    }

    fn submit_admin_form(&mut self) {
        let Some(modal) = self.admins.modal.as_mut() else {
            return;
        };
        if !modal.form.validate() {
            return;
        }
        let name = modal.form.name.value().trim().to_string();
        let email = modal.form.email.value().trim().to_string();
        let role = modal.form.role.unwrap_or(AdminRole::Admin);
        let kind = modal.kind;
        let target = modal.target;
        self.admins.modal = None;

        match kind {
            AdminModalKind::Add => {
                let now = Local::now().naive_local();
                let id = self.admins.next_id.to_string();
                self.admins.next_id += 1;
                self.admins.roster.push(AdminRecord {
                    id,
                    name: name.clone(),
                    email,
                    role,
                    status: AdminStatus::Active,
                    created: now.date(),
                    last_login: now,
                });
                self.set_status_message(format!("Added admin {name}"));
            }
            AdminModalKind::Edit => {
                if let Some(idx) = target {
                    let admin = &mut self.admins.roster[idx];
                    admin.name = name.clone();
                    admin.email = email;
                    admin.role = role;
                    self.set_status_message(format!("Updated admin {name}"));
                }
            }
            _ => (),
        }
    }

    // -------------------- Approvals ---------------------- //

    fn update_approvals(&mut self, message: Message) {
        match message {
            Message::MoveUp => match self.approvals.detail.as_mut() {
                Some(detail) => detail.doc_cursor = detail.doc_cursor.saturating_sub(1),
                None => self.approvals.cursor = self.approvals.cursor.saturating_sub(1),
            },
            Message::MoveDown => match self.approvals.detail.as_mut() {
                Some(detail) => {
                    let docs = self.approvals.requests[detail.request].kyc.len();
                    if docs > 0 {
                        detail.doc_cursor = std::cmp::min(detail.doc_cursor + 1, docs - 1);
                    }
                }
                None => {
                    let len = self.approvals.filtered().len();
                    if len > 0 {
                        self.approvals.cursor = std::cmp::min(self.approvals.cursor + 1, len - 1);
                    }
                }
            },
            Message::CycleStatusFilter if self.approvals.detail.is_none() => {
                self.approvals.filter = cycle_option(&ApprovalStatus::ALL, self.approvals.filter);
                self.approvals.cursor = 0;
            }
            Message::Enter => {
                if self.approvals.detail.is_none()
                    && let Some(&idx) = self.approvals.filtered().get(self.approvals.cursor)
                {
                    // Every attached document starts out unreviewed
                    let reviews = vec![DocReview::Pending; self.approvals.requests[idx].kyc.len()];
                    self.approvals.detail = Some(RequestDetail {
                        request: idx,
                        doc_cursor: 0,
                        reviews,
                    });
                }
            }
            Message::Exit => self.approvals.detail = None,
            Message::Approve => self.resolve_request(ApprovalStatus::Approved),
            Message::Reject => self.resolve_request(ApprovalStatus::Rejected),
            Message::VerifyDocument => self.review_document(DocReview::Verified),
            Message::RejectDocument => self.review_document(DocReview::Rejected),
            _ => (),
        }
    }

    fn resolve_request(&mut self, status: ApprovalStatus) {
        let Some(detail) = self.approvals.detail.take() else {
            return;
        };
        let request = &mut self.approvals.requests[detail.request];
        request.status = status;
        let id = request.id.clone();
        self.set_status_message(format!("Request {id} {}", status.label()));
    }

    fn review_document(&mut self, review: DocReview) {
        if let Some(detail) = self.approvals.detail.as_mut()
            && let Some(slot) = detail.reviews.get_mut(detail.doc_cursor)
        {
            *slot = review;
        }
    }
}

/// Advance an optional filter through None -> each variant -> None.
fn cycle_option<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => {
            let pos = all.iter().position(|&v| v == value).unwrap_or(0);
            all.get(pos + 1).copied()
        }
    }
}

/// CSV-quote a cell the way the clipboard export expects it.
fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|ch| ch == ' ' || ch == '\t' || ch == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping || needs_escaping {
        out = format!("\"{out}\"");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_config(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            event_poll_time: 10,
            page_size: 10,
            session_file: dir.path().join("session.json"),
            seed: 42,
        }
    }

    fn model() -> (Model, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let model = Model::init(test_config(&dir));
        (model, dir)
    }

    fn type_str(model: &mut Model, s: &str) {
        for c in s.chars() {
            model.update(Message::RawKey(KeyEvent::from(KeyCode::Char(c))));
        }
    }

    fn key(model: &mut Model, code: KeyCode) {
        model.update(Message::RawKey(KeyEvent::from(code)));
    }

    fn login(model: &mut Model) {
        type_str(model, "admin@admin.com");
        key(model, KeyCode::Tab);
        type_str(model, "admin123");
        key(model, KeyCode::Enter);
    }

    #[test]
    fn starts_at_the_login_screen_without_a_session() {
        let (model, _dir) = model();
        assert_eq!(model.screen, Screen::Login);
        assert!(model.session.is_none());
        assert!(model.capturing_input());
    }

    #[test]
    fn successful_login_opens_the_dashboard_and_stores_the_session() {
        let (mut m, dir) = model();
        login(&mut m);
        assert_eq!(m.screen, Screen::Dashboard);
        assert!(m.session.is_some());

        // A fresh model over the same session file stays logged in
        let restarted = Model::init(test_config(&dir));
        assert_eq!(restarted.screen, Screen::Dashboard);
        assert_eq!(restarted.session, m.session);
    }

    #[test]
    fn failed_login_shows_an_error_and_stays_put() {
        let (mut m, _dir) = model();
        type_str(&mut m, "admin@admin.com");
        key(&mut m, KeyCode::Tab);
        type_str(&mut m, "nope");
        key(&mut m, KeyCode::Enter);
        assert_eq!(m.screen, Screen::Login);
        assert!(m.login.error.is_some());
        assert_eq!(m.login.password.value(), "");
    }

    #[test]
    fn logout_clears_the_stored_session() {
        let (mut m, dir) = model();
        login(&mut m);
        m.update(Message::Logout);
        assert_eq!(m.screen, Screen::Login);
        assert!(m.session.is_none());

        let restarted = Model::init(test_config(&dir));
        assert_eq!(restarted.screen, Screen::Login);
    }

    #[test]
    fn management_screens_are_guarded_behind_login() {
        let (mut m, _dir) = model();
        m.update(Message::NextScreen);
        assert_eq!(m.screen, Screen::Login);

        login(&mut m);
        m.update(Message::NextScreen);
        assert_eq!(m.screen, Screen::Clients);
        m.update(Message::PrevScreen);
        m.update(Message::PrevScreen);
        assert_eq!(m.screen, Screen::Approvals);
    }

    #[test]
    fn client_search_is_live_and_resets_the_page() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Clients;
        m.update(Message::LastPage);
        assert_eq!(m.clients.table.window().page, 12);

        m.update(Message::Search);
        assert!(m.capturing_input());
        type_str(&mut m, "gmail");
        assert_eq!(m.clients.table.query(), "gmail");
        assert_eq!(m.clients.table.window().page, 1);

        key(&mut m, KeyCode::Enter);
        assert!(!m.clients.searching);
        assert_eq!(m.clients.table.query(), "gmail");
    }

    #[test]
    fn canceling_the_search_drops_the_query() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Clients;
        m.update(Message::Search);
        type_str(&mut m, "nina");
        key(&mut m, KeyCode::Esc);
        assert_eq!(m.clients.table.query(), "");
        assert!(!m.clients.searching);
    }

    #[test]
    fn status_filter_cycles_through_all_states() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Clients;
        let mut seen = vec![m.clients.table.status_filter()];
        for _ in 0..4 {
            m.update(Message::CycleStatusFilter);
            seen.push(m.clients.table.status_filter());
        }
        assert_eq!(
            seen,
            vec![
                None,
                Some(ClientStatus::Verified),
                Some(ClientStatus::Suspended),
                Some(ClientStatus::Pending),
                None
            ]
        );
    }

    #[test]
    fn sort_column_toggles_through_the_cycle() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Clients;
        m.update(Message::SortColumn(3));
        assert!(m.clients.table.sort().is_some());
        m.update(Message::SortColumn(3));
        m.update(Message::SortColumn(3));
        assert!(m.clients.table.sort().is_none());
    }

    #[test]
    fn adding_an_admin_validates_the_form() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Admins;
        let before = m.admins.roster.len();

        m.update(Message::OpenAdd);
        // Empty form is rejected
        key(&mut m, KeyCode::Enter);
        assert!(m.admins.modal.is_some());
        let form = &m.admins.modal.as_ref().unwrap().form;
        assert_eq!(form.name_error, Some("Name is required"));
        assert_eq!(form.email_error, Some("Email is required"));

        type_str(&mut m, "Zara");
        key(&mut m, KeyCode::Tab);
        type_str(&mut m, "zara@fpmarkets.com");
        key(&mut m, KeyCode::Enter);
        assert!(m.admins.modal.is_none());
        assert_eq!(m.admins.roster.len(), before + 1);
        let added = m.admins.roster.last().unwrap();
        assert_eq!(added.name, "Zara");
        assert_eq!(added.status, AdminStatus::Active);
        assert_eq!(added.id, "7");
    }

    #[test]
    fn bad_email_is_rejected_by_the_form() {
        let mut form = AdminForm::empty();
        form.name.set("Zara");
        form.email.set("not-an-email");
        assert!(!form.validate());
        assert_eq!(form.email_error, Some("Please enter a valid email address"));
        assert!(form.name_error.is_none());

        form.email.set("zara@fpmarkets.com");
        assert!(form.validate());
    }

    #[test]
    fn email_shape_check_matches_the_original_rule() {
        assert!(valid_email("a@b.co"));
        assert!(valid_email("first.last@sub.domain.org"));
        assert!(!valid_email("plain"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.d"));
        assert!(!valid_email("@b.co"));
        assert!(!valid_email("a@.co"));
        assert!(!valid_email("a@b."));
    }

    #[test]
    fn deactivate_and_reactivate_flip_an_admins_status() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Admins;
        // Cursor starts on Nina, who is active
        m.update(Message::Deactivate);
        assert!(m.admins.modal.is_some());
        key(&mut m, KeyCode::Enter);
        assert_eq!(m.admins.roster[0].status, AdminStatus::Inactive);

        m.update(Message::Reactivate);
        key(&mut m, KeyCode::Enter);
        assert_eq!(m.admins.roster[0].status, AdminStatus::Active);
    }

    #[test]
    fn admin_filters_are_and_combined() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Admins;
        m.admins.search.set("a");
        m.admins.role_filter = Some(AdminRole::Admin);
        m.admins.status_filter = Some(AdminStatus::Active);
        for &idx in &m.admins.filtered() {
            let admin = &m.admins.roster[idx];
            assert!(admin.matches("a"));
            assert_eq!(admin.role, AdminRole::Admin);
            assert_eq!(admin.status, AdminStatus::Active);
        }
    }

    #[test]
    fn approving_a_request_updates_its_status() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Approvals;
        m.update(Message::Enter);
        assert!(m.approvals.detail.is_some());
        m.update(Message::Approve);
        assert!(m.approvals.detail.is_none());
        assert_eq!(m.approvals.requests[0].status, ApprovalStatus::Approved);
    }

    #[test]
    fn document_reviews_start_pending_and_can_be_marked() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Approvals;
        m.update(Message::Enter);
        {
            let detail = m.approvals.detail.as_ref().unwrap();
            assert_eq!(detail.reviews, vec![DocReview::Pending; 2]);
        }
        m.update(Message::VerifyDocument);
        m.update(Message::MoveDown);
        m.update(Message::RejectDocument);
        let detail = m.approvals.detail.as_ref().unwrap();
        assert_eq!(detail.reviews, vec![DocReview::Verified, DocReview::Rejected]);
    }

    #[test]
    fn approval_filter_narrows_the_list() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.screen = Screen::Approvals;
        assert_eq!(m.approvals.filtered().len(), 5);
        m.update(Message::CycleStatusFilter);
        assert_eq!(m.approvals.filter, Some(ApprovalStatus::Pending));
        assert_eq!(m.approvals.filtered().len(), 3);
    }

    #[test]
    fn csv_cells_are_quoted_when_needed() {
        assert_eq!(wrap_cell_content("plain"), "plain");
        assert_eq!(wrap_cell_content("two words"), "\"two words\"");
        assert_eq!(wrap_cell_content("a,b"), "\"a,b\"");
        assert_eq!(wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn help_popup_swallows_other_input() {
        let (mut m, _dir) = model();
        login(&mut m);
        m.update(Message::Help);
        assert!(m.show_help);
        m.update(Message::NextScreen);
        assert_eq!(m.screen, Screen::Dashboard);
        m.update(Message::Exit);
        assert!(!m.show_help);
    }
}

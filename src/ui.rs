use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Padding, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::domain::HELP_TEXT;
use crate::inputter::Inputter;
use crate::model::{
    AdminModal, AdminModalKind, DocReview, FormField, LoginField, Model, Screen,
};
use crate::records::{AdminStatus, ApprovalStatus, ClientSortKey, ClientStatus};
use crate::table::{SortDir, SortSpec};

pub const TABS_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const TABLE_FOOTER_HEIGHT: u16 = 1;

pub fn draw(model: &Model, frame: &mut Frame<'_>) {
    if model.screen == Screen::Login {
        draw_login(model, frame);
        return;
    }

    let [tabs_area, body, statusline] = Layout::vertical([
        Constraint::Length(TABS_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(STATUSLINE_HEIGHT),
    ])
    .areas(frame.area());

    draw_tabs(model, frame, tabs_area);
    match model.screen {
        Screen::Dashboard => draw_dashboard(model, frame, body),
        Screen::Clients => draw_clients(model, frame, body),
        Screen::Admins => draw_admins(model, frame, body),
        Screen::Approvals => draw_approvals(model, frame, body),
        Screen::Login => unreachable!("login never reaches the tabbed layout"),
    }
    draw_statusline(model, frame, statusline);

    if let Some(modal) = &model.admins.modal {
        draw_admin_modal(modal, frame);
    }
    if model.approvals.detail.is_some() {
        draw_approval_detail(model, frame);
    }
    if model.show_help {
        draw_help(frame);
    }
}

fn draw_tabs(model: &Model, frame: &mut Frame<'_>, area: Rect) {
    let selected = Screen::TABS
        .iter()
        .position(|&s| s == model.screen)
        .unwrap_or(0);
    let tabs = Tabs::new(Screen::TABS.iter().map(|s| s.title()))
        .select(selected)
        .highlight_style(ratatui::style::Style::new().bold().reversed());
    frame.render_widget(tabs, area);
}

fn draw_statusline(model: &Model, frame: &mut Frame<'_>, area: Rect) {
    let user = model
        .session
        .as_ref()
        .map(|s| {
            if s.user.is_admin() {
                format!("{} (admin)", s.user.name)
            } else {
                s.user.name.clone()
            }
        })
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::raw(" "),
        Span::raw(model.status_message.clone()),
        Span::raw(" "),
    ])
    .left_aligned();
    let right = Line::from(format!("{user} | ? help | q quit ")).right_aligned();
    frame.render_widget(Paragraph::new(line), area);
    frame.render_widget(Paragraph::new(right), area);
}

// -------------------- Login ---------------------- //

fn draw_login(model: &Model, frame: &mut Frame<'_>) {
    let area = centered_rect(46, 11, frame.area());
    let block = Block::bordered()
        .title(Line::from(" Back Office Login ".bold()).centered())
        .padding(Padding::horizontal(1));

    let email_focused = model.login.focus == Some(LoginField::Email);
    let mut lines = vec![
        Line::raw(""),
        input_line("Email:    ", &model.login.email, email_focused, false),
        Line::raw(""),
        input_line("Password: ", &model.login.password, !email_focused, true),
        Line::raw(""),
    ];
    match &model.login.error {
        Some(error) => lines.push(Line::from(error.clone().red())),
        None => lines.push(Line::raw("")),
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(
        "Tab switch field | Enter submit | Esc quit".dim(),
    ));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

/// Single form line with a block caret at the cursor position.
fn input_line<'a>(label: &'a str, input: &Inputter, focused: bool, mask: bool) -> Line<'a> {
    let shown: String = if mask {
        "*".repeat(input.value().chars().count())
    } else {
        input.value().to_string()
    };
    let mut spans = vec![Span::raw(label).bold()];
    if focused {
        let cursor = input.cursor();
        let before: String = shown.chars().take(cursor).collect();
        let at: String = shown.chars().skip(cursor).take(1).collect();
        let after: String = shown.chars().skip(cursor + 1).collect();
        spans.push(Span::raw(before));
        spans.push(Span::raw(if at.is_empty() { " ".to_string() } else { at }).reversed());
        spans.push(Span::raw(after));
    } else {
        spans.push(Span::raw(shown));
    }
    Line::from(spans)
}

// -------------------- Dashboard ---------------------- //

fn draw_dashboard(model: &Model, frame: &mut Frame<'_>, area: Rect) {
    let kpis = model.kpis();
    let block = Block::bordered()
        .title(" Overview ")
        .padding(Padding::uniform(1));
    let lines = vec![
        Line::from(vec![
            "Clients:            ".into(),
            kpis.total_clients.to_string().bold(),
        ]),
        Line::from(format!(
            "  verified {} / pending {} / suspended {}",
            kpis.verified, kpis.pending, kpis.suspended
        )),
        Line::raw(""),
        Line::from(vec![
            "Active admins:      ".into(),
            kpis.active_admins.to_string().bold(),
        ]),
        Line::from(vec![
            "Pending approvals:  ".into(),
            kpis.pending_approvals.to_string().bold(),
        ]),
    ];
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

// -------------------- Clients ---------------------- //

fn draw_clients(model: &Model, frame: &mut Frame<'_>, area: Rect) {
    let [filter_area, table_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(TABLE_FOOTER_HEIGHT),
    ])
    .areas(area);

    let window = model.clients.table.window();

    // Filter bar
    let mut spans: Vec<Span<'_>> = Vec::new();
    if model.clients.searching {
        spans.push(" Search: ".bold());
        let caret = input_line("", &model.clients.search, true, false);
        spans.extend(caret.spans);
    } else {
        spans.push(" Search: ".into());
        spans.push(if model.clients.table.query().is_empty() {
            "(none, press /)".dim()
        } else {
            Span::raw(model.clients.table.query().to_string()).yellow()
        });
    }
    spans.push(" | Status: ".into());
    spans.push(
        match model.clients.table.status_filter() {
            Some(status) => Span::raw(status.label()),
            None => Span::raw("All"),
        }
        .bold(),
    );
    spans.push(format!(" | {} / page", model.clients.table.page_size()).into());
    frame.render_widget(Paragraph::new(Line::from(spans)), filter_area);

    // Table
    let header = Row::new(
        [
            ("[1] Client Name", ClientSortKey::Name),
            ("[2] Email", ClientSortKey::Email),
            ("[3] Status", ClientSortKey::Status),
            ("[4] Balance", ClientSortKey::Balance),
            ("[5] Registered", ClientSortKey::Registered),
        ]
        .map(|(title, key)| Cell::from(format!("{title}{}", sort_marker(model.clients.table.sort(), key)))),
    )
    .bold();

    let rows: Vec<Row<'_>> = if window.visible.is_empty() {
        vec![Row::new(vec![
            Cell::from("No clients match your filters.".dim()),
        ])]
    } else {
        window
            .visible
            .iter()
            .enumerate()
            .map(|(i, &idx)| {
                let c = model.clients.table.row(idx);
                let row = Row::new(vec![
                    Cell::from(c.name.clone()),
                    Cell::from(c.email.clone()),
                    Cell::from(status_span(c.status)),
                    Cell::from(format_currency(c.balance)),
                    Cell::from(c.registered_label()),
                ]);
                if i == model.clients.cursor {
                    row.reversed()
                } else {
                    row
                }
            })
            .collect()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(22),
            Constraint::Percentage(30),
            Constraint::Percentage(14),
            Constraint::Percentage(16),
            Constraint::Percentage(18),
        ],
    )
    .header(header)
    .block(Block::bordered().title(" Client Management "));
    frame.render_widget(table, table_area);

    // Footer: counts plus the bounded page window
    let mut footer: Vec<Span<'_>> = vec![
        format!(
            " Showing {} of {} clients | Page ",
            window.visible.len(),
            window.total
        )
        .into(),
    ];
    for &page in &window.page_numbers {
        if page == window.page {
            footer.push(format!("[{page}]").bold().reversed());
        } else {
            footer.push(format!(" {page} ").into());
        }
    }
    footer.push(format!(" of {}", window.total_pages).into());
    frame.render_widget(Paragraph::new(Line::from(footer)), footer_area);
}

fn sort_marker(sort: Option<SortSpec<ClientSortKey>>, key: ClientSortKey) -> &'static str {
    match sort {
        Some(SortSpec { key: k, dir }) if k == key => match dir {
            SortDir::Ascending => " ^",
            SortDir::Descending => " v",
        },
        _ => "",
    }
}

fn status_span(status: ClientStatus) -> Span<'static> {
    match status {
        ClientStatus::Verified => Span::raw("Verified").green(),
        ClientStatus::Suspended => Span::raw("Suspended").red(),
        ClientStatus::Pending => Span::raw("Pending").yellow(),
    }
}

/// `-$1,234.50` style, two decimals, thousands separators.
pub fn format_currency(n: f64) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    let cents_total = (n.abs() * 100.0).round() as i64;
    let whole = (cents_total / 100).to_string();
    let cents = cents_total % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    format!("{sign}${grouped}.{cents:02}")
}

// -------------------- Admins ---------------------- //

fn draw_admins(model: &Model, frame: &mut Frame<'_>, area: Rect) {
    let [stats_area, filter_area, table_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let stats = model.admins.stats();
    frame.render_widget(
        Paragraph::new(format!(
            " Total {} | Active {} | Active super admins {}",
            stats.total, stats.active, stats.super_admins
        )),
        stats_area,
    );

    let mut spans: Vec<Span<'_>> = Vec::new();
    if model.admins.searching {
        spans.push(" Search: ".bold());
        spans.extend(input_line("", &model.admins.search, true, false).spans);
    } else {
        spans.push(" Search: ".into());
        spans.push(if model.admins.search.value().is_empty() {
            "(none, press /)".dim()
        } else {
            Span::raw(model.admins.search.value().to_string()).yellow()
        });
    }
    spans.push(" | Role: ".into());
    spans.push(
        match model.admins.role_filter {
            Some(role) => Span::raw(role.label()),
            None => Span::raw("all"),
        }
        .bold(),
    );
    spans.push(" | Status: ".into());
    spans.push(
        match model.admins.status_filter {
            Some(status) => Span::raw(status.label()),
            None => Span::raw("all"),
        }
        .bold(),
    );
    frame.render_widget(Paragraph::new(Line::from(spans)), filter_area);

    let header = Row::new(["Name", "Email", "Role", "Status", "Created", "Last Login"]).bold();
    let filtered = model.admins.filtered();
    let rows: Vec<Row<'_>> = if filtered.is_empty() {
        vec![Row::new(vec![Cell::from("No admins match your filters.".dim())])]
    } else {
        filtered
            .iter()
            .enumerate()
            .map(|(i, &idx)| {
                let a = &model.admins.roster[idx];
                let status = match a.status {
                    AdminStatus::Active => Span::raw(a.status.label()).green(),
                    AdminStatus::Inactive => Span::raw(a.status.label()).red(),
                };
                let row = Row::new(vec![
                    Cell::from(a.name.clone()),
                    Cell::from(a.email.clone()),
                    Cell::from(a.role.label()),
                    Cell::from(status),
                    Cell::from(a.created_label()),
                    Cell::from(a.last_login_label()),
                ]);
                if i == model.admins.cursor {
                    row.reversed()
                } else {
                    row
                }
            })
            .collect()
    };
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(16),
            Constraint::Percentage(26),
            Constraint::Percentage(14),
            Constraint::Percentage(12),
            Constraint::Percentage(14),
            Constraint::Percentage(18),
        ],
    )
    .header(header)
    .block(Block::bordered().title(" Admin Management "));
    frame.render_widget(table, table_area);
}

fn draw_admin_modal(modal: &AdminModal, frame: &mut Frame<'_>) {
    match modal.kind {
        AdminModalKind::Deactivate | AdminModalKind::Reactivate => {
            let verb = if modal.kind == AdminModalKind::Deactivate {
                "Deactivate"
            } else {
                "Reactivate"
            };
            let area = centered_rect(44, 6, frame.area());
            let block = Block::bordered()
                .title(format!(" {verb} admin "))
                .padding(Padding::horizontal(1));
            let text = Text::from(vec![
                Line::raw(""),
                Line::from(format!("{verb} this admin account?")),
                Line::from("Enter confirm | Esc cancel".dim()),
            ]);
            frame.render_widget(Clear, area);
            frame.render_widget(Paragraph::new(text).block(block), area);
        }
        AdminModalKind::Add | AdminModalKind::Edit => {
            let title = if modal.kind == AdminModalKind::Add {
                " Add admin "
            } else {
                " Edit admin "
            };
            let area = centered_rect(52, 12, frame.area());
            let block = Block::bordered().title(title).padding(Padding::horizontal(1));

            let mut lines = vec![
                Line::raw(""),
                input_line(
                    "Name:  ",
                    &modal.form.name,
                    modal.form.focus == Some(FormField::Name),
                    false,
                ),
            ];
            lines.push(match modal.form.name_error {
                Some(error) => Line::from(error.red()),
                None => Line::raw(""),
            });
            lines.push(input_line(
                "Email: ",
                &modal.form.email,
                modal.form.focus == Some(FormField::Email),
                false,
            ));
            lines.push(match modal.form.email_error {
                Some(error) => Line::from(error.red()),
                None => Line::raw(""),
            });
            let role_label = modal.form.role.map(|r| r.label()).unwrap_or("Admin");
            let role_span = if modal.form.focus == Some(FormField::Role) {
                Span::raw(format!("< {role_label} >")).reversed()
            } else {
                Span::raw(role_label)
            };
            lines.push(Line::from(vec!["Role:  ".bold(), role_span]));
            lines.push(Line::raw(""));
            lines.push(Line::from(
                "Tab next field | Enter save | Esc cancel".dim(),
            ));

            frame.render_widget(Clear, area);
            frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
        }
    }
}

// -------------------- Approvals ---------------------- //

fn draw_approvals(model: &Model, frame: &mut Frame<'_>, area: Rect) {
    let [filter_area, table_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(TABLE_FOOTER_HEIGHT),
    ])
    .areas(area);

    let filter_label = match model.approvals.filter {
        Some(status) => status.label(),
        None => "all",
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            " Status: ".into(),
            filter_label.bold(),
            " (press f)".dim(),
        ])),
        filter_area,
    );

    let filtered = model.approvals.filtered();
    let header = Row::new(["Requester", "Email", "Type", "Amount", "Submitted", "Status"]).bold();
    let rows: Vec<Row<'_>> = if filtered.is_empty() {
        vec![Row::new(vec![Cell::from("No requests in this state.".dim())])]
    } else {
        filtered
            .iter()
            .enumerate()
            .map(|(i, &idx)| {
                let r = &model.approvals.requests[idx];
                let amount = r
                    .amount
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string());
                let row = Row::new(vec![
                    Cell::from(r.requester.clone()),
                    Cell::from(r.email.clone()),
                    Cell::from(r.request_type.clone()),
                    Cell::from(amount),
                    Cell::from(r.submitted_at.format("%Y-%m-%d %H:%M").to_string()),
                    Cell::from(approval_span(r.status)),
                ]);
                if i == model.approvals.cursor {
                    row.reversed()
                } else {
                    row
                }
            })
            .collect()
    };
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(16),
            Constraint::Percentage(24),
            Constraint::Percentage(16),
            Constraint::Percentage(12),
            Constraint::Percentage(18),
            Constraint::Percentage(14),
        ],
    )
    .header(header)
    .block(Block::bordered().title(" Approval Management "));
    frame.render_widget(table, table_area);

    frame.render_widget(
        Paragraph::new(format!(
            " Showing {} of {} requests",
            filtered.len(),
            model.approvals.requests.len()
        )),
        footer_area,
    );
}

fn approval_span(status: ApprovalStatus) -> Span<'static> {
    match status {
        ApprovalStatus::Pending => Span::raw(status.label()).yellow(),
        ApprovalStatus::Approved => Span::raw(status.label()).green(),
        ApprovalStatus::Rejected => Span::raw(status.label()).red(),
    }
}

fn draw_approval_detail(model: &Model, frame: &mut Frame<'_>) {
    let Some(detail) = &model.approvals.detail else {
        return;
    };
    let request = &model.approvals.requests[detail.request];

    let area = centered_rect(60, (10 + request.kyc.len() as u16).min(frame.area().height), frame.area());
    let block = Block::bordered()
        .title(format!(" Request {} ", request.id))
        .padding(Padding::horizontal(1));

    let mut lines = vec![
        Line::from(vec![
            "Requester: ".bold(),
            format!("{} <{}>", request.requester, request.email).into(),
        ]),
        Line::from(vec!["Type:      ".bold(), request.request_type.clone().into()]),
        Line::from(vec![
            "Amount:    ".bold(),
            request
                .amount
                .map(format_currency)
                .unwrap_or_else(|| "-".to_string())
                .into(),
        ]),
        Line::from(vec![
            "Status:    ".bold(),
            approval_span(request.status),
        ]),
        Line::raw(""),
        Line::from("KYC documents:".bold()),
    ];
    if request.kyc.is_empty() {
        lines.push(Line::from("  (none)".dim()));
    }
    for (i, doc) in request.kyc.iter().enumerate() {
        let review = detail
            .reviews
            .get(i)
            .copied()
            .unwrap_or(DocReview::Pending);
        let mark = match review {
            DocReview::Pending => Span::raw("[pending]").yellow(),
            DocReview::Verified => Span::raw("[verified]").green(),
            DocReview::Rejected => Span::raw("[rejected]").red(),
        };
        let mut line = Line::from(vec![
            format!("  {} - {} ", doc.doc_type, doc.filename).into(),
            mark,
        ]);
        if i == detail.doc_cursor {
            line = line.reversed();
        }
        lines.push(line);
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(
        "v verify doc | x reject doc | a approve | r reject | Esc close".dim(),
    ));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// -------------------- Popups ---------------------- //

fn draw_help(frame: &mut Frame<'_>) {
    let area = centered_rect(60, 32, frame.area());
    let block = Block::bordered().title(" Help ").padding(Padding::horizontal(1));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(HELP_TEXT).block(block), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent};

use crate::domain::{AppConfig, AppError, Message};
use crate::model::{Model, Screen};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, AppError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(model, key));
        }
        Ok(None)
    }

    fn handle_key(&self, model: &Model, key: KeyEvent) -> Option<Message> {
        // Text fields and modal forms consume keystrokes unmapped
        let message = if model.capturing_input() {
            Some(Message::RawKey(key))
        } else {
            Self::global_key(key).or_else(|| Self::screen_key(model.screen, key))
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn global_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('L') => Some(Message::Logout),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Tab => Some(Message::NextScreen),
            KeyCode::BackTab => Some(Message::PrevScreen),
            _ => None,
        }
    }

    fn screen_key(screen: Screen, key: KeyEvent) -> Option<Message> {
        match screen {
            // Login keys arrive as RawKey via capturing_input
            Screen::Login | Screen::Dashboard => common_key(key),
            Screen::Clients => clients_key(key),
            Screen::Admins => admins_key(key),
            Screen::Approvals => approvals_key(key),
        }
    }
}

fn common_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
        KeyCode::Esc => Some(Message::Exit),
        KeyCode::Enter => Some(Message::Enter),
        _ => None,
    }
}

fn clients_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(Message::PrevPage),
        KeyCode::Right | KeyCode::Char('l') => Some(Message::NextPage),
        KeyCode::Home => Some(Message::FirstPage),
        KeyCode::End => Some(Message::LastPage),
        KeyCode::Char('/') => Some(Message::Search),
        KeyCode::Char('f') => Some(Message::CycleStatusFilter),
        KeyCode::Char('z') => Some(Message::CyclePageSize),
        KeyCode::Char('y') => Some(Message::CopyRow),
        KeyCode::Char(c @ '1'..='5') => {
            Some(Message::SortColumn(c as usize - '1' as usize))
        }
        _ => common_key(key),
    }
}

fn admins_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Char('/') => Some(Message::Search),
        KeyCode::Char('f') => Some(Message::CycleRoleFilter),
        KeyCode::Char('s') => Some(Message::CycleStatusFilter),
        KeyCode::Char('a') => Some(Message::OpenAdd),
        KeyCode::Char('e') => Some(Message::OpenEdit),
        KeyCode::Char('d') => Some(Message::Deactivate),
        KeyCode::Char('r') => Some(Message::Reactivate),
        _ => common_key(key),
    }
}

fn approvals_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Char('f') => Some(Message::CycleStatusFilter),
        KeyCode::Char('a') => Some(Message::Approve),
        KeyCode::Char('r') => Some(Message::Reject),
        KeyCode::Char('v') => Some(Message::VerifyDocument),
        KeyCode::Char('x') => Some(Message::RejectDocument),
        _ => common_key(key),
    }
}

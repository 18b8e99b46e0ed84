use ratatui::crossterm::event::KeyEvent;
use std::path::PathBuf;
use thiserror::Error;

/// Page sizes the page-size selector cycles through.
pub const PAGE_SIZES: [usize; 3] = [10, 20, 50];

/// Errors that can bubble up to the main loop.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    SessionFormat(#[from] serde_json::Error),
    #[error("could not expand path {0}: {1}")]
    PathExpansion(String, String),
    #[error("invalid page size {0}, expected one of {PAGE_SIZES:?}")]
    InvalidPageSize(usize),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub session_file: PathBuf,
    pub seed: u64,
}

/// Messages produced by the controller from key events.
/// The model interprets them relative to the active screen.
#[derive(Debug, Clone, Copy)]
pub enum Message {
    Quit,
    Logout,
    NextScreen,
    PrevScreen,
    Help,
    Enter,
    Exit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    Search,
    CycleStatusFilter,
    CycleRoleFilter,
    CyclePageSize,
    SortColumn(usize),
    CopyRow,
    OpenAdd,
    OpenEdit,
    Deactivate,
    Reactivate,
    Approve,
    Reject,
    VerifyDocument,
    RejectDocument,
    // Forwarded unmodified while a text input or form has focus
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 Global
   Tab / Shift-Tab   switch screen
   ?                 toggle this help
   L                 logout
   q                 quit

 Clients
   Up/Down           move row cursor
   Left/Right        previous/next page
   Home/End          first/last page
   1..5              sort by column (asc -> desc -> off)
   /                 edit search query (Enter keep, Esc clear)
   f                 cycle status filter
   z                 cycle page size (10/20/50)
   y                 copy selected row to clipboard

 Admins
   Up/Down           move row cursor
   /                 edit search query
   f                 cycle role filter
   s                 cycle status filter
   a / e             add / edit admin
   d / r             deactivate / reactivate admin

 Approvals
   Up/Down           move cursor
   f                 cycle status filter
   Enter             open request details
   (details) v / x   verify / reject document
   (details) a / r   approve / reject request
   Esc               close details
";

use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

use crate::table::TableRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Verified,
    Suspended,
    Pending,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 3] = [
        ClientStatus::Verified,
        ClientStatus::Suspended,
        ClientStatus::Pending,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClientStatus::Verified => "Verified",
            ClientStatus::Suspended => "Suspended",
            ClientStatus::Pending => "Pending",
        }
    }
}

/// One row of client data. Immutable for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: ClientStatus,
    pub balance: f64,
    pub registered: NaiveDate,
}

impl ClientRecord {
    pub fn registered_label(&self) -> String {
        self.registered.format("%Y-%m-%d").to_string()
    }
}

/// Sortable client table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSortKey {
    Name,
    Email,
    Status,
    Balance,
    Registered,
}

impl ClientSortKey {
    pub const COLUMNS: [ClientSortKey; 5] = [
        ClientSortKey::Name,
        ClientSortKey::Email,
        ClientSortKey::Status,
        ClientSortKey::Balance,
        ClientSortKey::Registered,
    ];
}

impl TableRow for ClientRecord {
    type SortKey = ClientSortKey;
    type Status = ClientStatus;

    /// The five derived text fields of the record. Numbers and dates are
    /// matched on their string representation, so "2024" hits every
    /// registration date in that year.
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.email.to_lowercase().contains(query)
            || self.status.label().to_lowercase().contains(query)
            || self.balance.to_string().contains(query)
            || self.registered_label().contains(query)
    }

    fn status(&self) -> ClientStatus {
        self.status
    }

    fn compare(&self, other: &Self, key: ClientSortKey) -> Ordering {
        match key {
            ClientSortKey::Name => self.name.cmp(&other.name),
            ClientSortKey::Email => self.email.cmp(&other.email),
            ClientSortKey::Status => self.status.label().cmp(other.status.label()),
            ClientSortKey::Balance => self
                .balance
                .partial_cmp(&other.balance)
                .unwrap_or(Ordering::Equal),
            ClientSortKey::Registered => self.registered.cmp(&other.registered),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Moderator,
}

impl AdminRole {
    pub const ALL: [AdminRole; 3] = [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Moderator];

    pub fn label(self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "Super Admin",
            AdminRole::Admin => "Admin",
            AdminRole::Moderator => "Moderator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStatus {
    Active,
    Inactive,
}

impl AdminStatus {
    pub fn label(self) -> &'static str {
        match self {
            AdminStatus::Active => "active",
            AdminStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub created: NaiveDate,
    pub last_login: NaiveDateTime,
}

impl AdminRecord {
    pub fn created_label(&self) -> String {
        self.created.format("%Y-%m-%d").to_string()
    }

    pub fn last_login_label(&self) -> String {
        self.last_login.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Admin search only covers name and email.
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query) || self.email.to_lowercase().contains(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KycDocument {
    pub id: String,
    pub doc_type: String,
    pub filename: String,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub id: String,
    pub requester: String,
    pub email: String,
    pub request_type: String,
    pub amount: Option<f64>,
    pub submitted_at: NaiveDateTime,
    pub status: ApprovalStatus,
    pub kyc: Vec<KycDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(name: &str, email: &str, status: ClientStatus, balance: f64, ymd: (i32, u32, u32)) -> ClientRecord {
        ClientRecord {
            id: "c_1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            status,
            balance,
            registered: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
        }
    }

    #[test]
    fn query_matches_any_derived_text_field() {
        let c = client(
            "Nina Mizi",
            "nina.mizi@gmail.com",
            ClientStatus::Pending,
            -123.45,
            (2024, 3, 7),
        );
        assert!(c.matches("nina"));
        assert!(c.matches("gmail"));
        assert!(c.matches("pending"));
        assert!(c.matches("-123.45"));
        assert!(c.matches("2024"));
        assert!(c.matches("03-07"));
        assert!(!c.matches("verified"));
        assert!(!c.matches("zzz"));
    }

    #[test]
    fn textual_fields_compare_case_sensitively() {
        let a = client("Zed", "a@x.com", ClientStatus::Verified, 0.0, (2024, 1, 1));
        let b = client("abe", "b@x.com", ClientStatus::Verified, 0.0, (2024, 1, 1));
        // Uppercase sorts before lowercase in byte order
        assert_eq!(a.compare(&b, ClientSortKey::Name), Ordering::Less);
    }

    #[test]
    fn balance_compares_numerically() {
        let a = client("a", "a@x.com", ClientStatus::Verified, 9.5, (2024, 1, 1));
        let b = client("b", "b@x.com", ClientStatus::Verified, 100.0, (2024, 1, 1));
        assert_eq!(a.compare(&b, ClientSortKey::Balance), Ordering::Less);
        // As strings "100" < "9.5" would hold, which is exactly what we avoid
        assert_eq!(b.compare(&a, ClientSortKey::Balance), Ordering::Greater);
    }

    #[test]
    fn registration_date_orders_chronologically() {
        let a = client("a", "a@x.com", ClientStatus::Verified, 0.0, (2023, 12, 31));
        let b = client("b", "b@x.com", ClientStatus::Verified, 0.0, (2024, 1, 1));
        assert_eq!(a.compare(&b, ClientSortKey::Registered), Ordering::Less);
    }

    #[test]
    fn admin_search_covers_name_and_email_only() {
        let admin = AdminRecord {
            id: "1".to_string(),
            name: "Nina".to_string(),
            email: "nina@fpmarkets.com".to_string(),
            role: AdminRole::SuperAdmin,
            status: AdminStatus::Active,
            created: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            last_login: NaiveDate::from_ymd_opt(2024, 11, 12)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };
        assert!(admin.matches("nina"));
        assert!(admin.matches("fpmarkets"));
        assert!(!admin.matches("super"));
    }
}

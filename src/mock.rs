use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::records::{
    AdminRecord, AdminRole, AdminStatus, ApprovalRequest, ApprovalStatus, ClientRecord,
    ClientStatus, KycDocument,
};

pub const CLIENT_COUNT: usize = 120;
const REGISTRATION_YEARS: i64 = 3;

const NAMES: [&str; 25] = [
    "Nina",
    "Danish",
    "Danish Haiqal",
    "Adlina",
    "Ilham Sofiya",
    "Azalea Azril",
    "Aca",
    "Lola",
    "Luna",
    "Pika",
    "Ryan",
    "Syamil",
    "Khai",
    "Amir",
    "Oyo",
    "Afgan",
    "Billie Eilish",
    "Charles Leclerc",
    "Nina Mizi",
    "Mizi Sharif",
    "Aishah Mohamad",
    "Jack Scott",
    "Ellie Adams",
    "Lola Danish",
    "Bel",
];

const DOMAINS: [&str; 2] = ["yahoo.com", "gmail.com"];

/// Lowercase the name and turn every run of non-letters into a single dot.
fn email_handle(name: &str) -> String {
    let mut handle = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() {
            handle.push(c);
        } else if !handle.ends_with('.') {
            handle.push('.');
        }
    }
    handle
}

fn random_email(name: &str, rng: &mut StdRng) -> String {
    let domain = DOMAINS.choose(rng).copied().unwrap_or(DOMAINS[0]);
    format!("{}@{}", email_handle(name), domain)
}

fn random_registration_date(today: NaiveDate, rng: &mut StdRng) -> NaiveDate {
    let span_days = REGISTRATION_YEARS * 365;
    today - Duration::days(rng.gen_range(0..=span_days))
}

/// Round to cents so balances print with at most two decimals.
fn to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Generate the fixed client list shown in the clients table. The records
/// are immutable for the lifetime of the session; the same seed always
/// produces the same list.
pub fn clients(seed: u64) -> Vec<ClientRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let today = Local::now().date_naive();

    let records = (0..CLIENT_COUNT)
        .map(|i| {
            let name = NAMES.choose(&mut rng).copied().unwrap_or(NAMES[0]);
            ClientRecord {
                id: format!("c_{}", i + 1),
                name: name.to_string(),
                email: random_email(name, &mut rng),
                status: ClientStatus::ALL
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(ClientStatus::Pending),
                // Uniform in [-1000, 9000), overdrafts allowed
                balance: to_cents(rng.gen_range(-1000.0..9000.0)),
                registered: random_registration_date(today, &mut rng),
            }
        })
        .collect();
    debug!("Generated {} client records from seed {}", CLIENT_COUNT, seed);
    records
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap_or_default()
}

fn admin(
    id: &str,
    name: &str,
    email: &str,
    role: AdminRole,
    status: AdminStatus,
    created: NaiveDate,
    last_login: NaiveDateTime,
) -> AdminRecord {
    AdminRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        status,
        created,
        last_login,
    }
}

/// The fixed admin roster the admins screen starts from.
pub fn admins() -> Vec<AdminRecord> {
    vec![
        admin(
            "1",
            "Nina",
            "nina@fpmarkets.com",
            AdminRole::SuperAdmin,
            AdminStatus::Active,
            date(2024, 1, 15),
            datetime(2024, 11, 12, 9, 30),
        ),
        admin(
            "2",
            "Aca",
            "aca@fpmarkets.com",
            AdminRole::Admin,
            AdminStatus::Active,
            date(2024, 2, 20),
            datetime(2024, 11, 12, 8, 15),
        ),
        admin(
            "3",
            "Ampiya",
            "ampiya@fpmarkets.com",
            AdminRole::Admin,
            AdminStatus::Active,
            date(2024, 3, 10),
            datetime(2024, 11, 11, 16, 45),
        ),
        admin(
            "4",
            "Khai",
            "khai@fpmarkets.com",
            AdminRole::Moderator,
            AdminStatus::Active,
            date(2024, 5, 2),
            datetime(2024, 11, 10, 13, 20),
        ),
        admin(
            "5",
            "Lola",
            "lola@fpmarkets.com",
            AdminRole::Moderator,
            AdminStatus::Inactive,
            date(2024, 5, 30),
            datetime(2024, 9, 28, 11, 5),
        ),
        admin(
            "6",
            "Danish",
            "danish@fpmarkets.com",
            AdminRole::Admin,
            AdminStatus::Inactive,
            date(2024, 6, 18),
            datetime(2024, 10, 15, 10, 30),
        ),
    ]
}

fn doc(id: &str, doc_type: &str, filename: &str, uploaded_at: NaiveDateTime) -> KycDocument {
    KycDocument {
        id: id.to_string(),
        doc_type: doc_type.to_string(),
        filename: filename.to_string(),
        uploaded_at,
    }
}

/// The fixed approval queue the approvals screen starts from.
pub fn approvals() -> Vec<ApprovalRequest> {
    vec![
        ApprovalRequest {
            id: "req-1".to_string(),
            requester: "Mimi".to_string(),
            email: "mimi@example.com".to_string(),
            request_type: "Withdrawal".to_string(),
            amount: Some(5000.0),
            submitted_at: datetime(2025, 11, 10, 9, 12),
            status: ApprovalStatus::Pending,
            kyc: vec![
                doc("d1", "ID Card", "mimi-id.jpg", datetime(2025, 11, 10, 9, 10)),
                doc(
                    "d2",
                    "Proof of Address",
                    "mimi-utility.pdf",
                    datetime(2025, 11, 10, 9, 11),
                ),
            ],
        },
        ApprovalRequest {
            id: "req-2".to_string(),
            requester: "Syafiq".to_string(),
            email: "syafiq@example.com".to_string(),
            request_type: "KYC Update".to_string(),
            amount: None,
            submitted_at: datetime(2025, 11, 8, 14, 5),
            status: ApprovalStatus::Pending,
            kyc: vec![doc("d3", "ID Card", "syafiq-id.png", datetime(2025, 11, 8, 14, 3))],
        },
        ApprovalRequest {
            id: "req-3".to_string(),
            requester: "Abu".to_string(),
            email: "abu@example.com".to_string(),
            request_type: "Account Closure".to_string(),
            amount: None,
            submitted_at: datetime(2025, 10, 29, 11, 22),
            status: ApprovalStatus::Approved,
            kyc: Vec::new(),
        },
        ApprovalRequest {
            id: "req-4".to_string(),
            requester: "Danish".to_string(),
            email: "danish@example.com".to_string(),
            request_type: "Large Transfer".to_string(),
            amount: Some(25000.0),
            submitted_at: datetime(2025, 11, 1, 16, 40),
            status: ApprovalStatus::Rejected,
            kyc: Vec::new(),
        },
        ApprovalRequest {
            id: "req-5".to_string(),
            requester: "Charles".to_string(),
            email: "charles@example.com".to_string(),
            request_type: "Withdrawal".to_string(),
            amount: Some(1200.0),
            submitted_at: datetime(2025, 11, 12, 8, 3),
            status: ApprovalStatus::Pending,
            kyc: vec![doc("d4", "ID Card", "charles-id.jpg", datetime(2025, 11, 12, 8, 0))],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn generates_the_full_client_list() {
        let list = clients(7);
        assert_eq!(list.len(), CLIENT_COUNT);
        assert_eq!(list[0].id, "c_1");
        assert_eq!(list[CLIENT_COUNT - 1].id, "c_120");
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = clients(42);
        let b = clients(42);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.email, y.email);
            assert_eq!(x.balance, y.balance);
            assert_eq!(x.registered, y.registered);
        }
    }

    #[test]
    fn emails_are_derived_from_the_name() {
        assert_eq!(email_handle("Danish Haiqal"), "danish.haiqal");
        assert_eq!(email_handle("Nina"), "nina");
        assert_eq!(email_handle("O'yo  2"), "o.yo.");
        for c in clients(3) {
            let (handle, domain) = c.email.split_once('@').unwrap();
            assert!(DOMAINS.contains(&domain));
            assert!(handle.chars().all(|ch| ch.is_ascii_lowercase() || ch == '.'));
        }
    }

    #[test]
    fn balances_are_cent_rounded_and_in_range() {
        for c in clients(11) {
            assert!(c.balance >= -1000.0 && c.balance < 9000.0);
            let cents = c.balance * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn registration_dates_fall_in_the_last_three_years() {
        let today = Local::now().date_naive();
        let oldest = today - Duration::days(REGISTRATION_YEARS * 365);
        for c in clients(5) {
            assert!(c.registered <= today);
            assert!(c.registered >= oldest);
        }
    }

    #[test]
    fn roster_and_queue_have_the_expected_shape() {
        let roster = admins();
        assert!(roster.iter().any(|a| a.role == AdminRole::SuperAdmin));
        assert!(roster.iter().any(|a| a.status == AdminStatus::Inactive));

        let queue = approvals();
        assert_eq!(queue.len(), 5);
        assert_eq!(
            queue
                .iter()
                .filter(|r| r.status == ApprovalStatus::Pending)
                .count(),
            3
        );
        assert!(queue.iter().any(|r| !r.kyc.is_empty()));
    }
}

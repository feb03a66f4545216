use chrono::{NaiveDate, NaiveDateTime};
#[cfg(feature = "ssr")]
use diesel::prelude::*;
#[cfg(feature = "ssr")]
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One baby-shower instance hosted by one user. The birth outcome fields stay NULL until the
/// host records the actual birth, at which point winners can be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::events))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub mother_name: String,
    pub partner_name: Option<String>,
    pub event_code: String,
    pub event_date: NaiveDate,
    pub due_date: NaiveDate,
    pub guess_price_cents: i32,
    pub theme: String,
    pub name_game_enabled: i32,
    pub host_id: Option<i32>,
    pub birth_date: Option<NaiveDate>,
    pub birth_hour: Option<i32>,
    pub birth_minute: Option<i32>,
    pub birth_name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Event {
    pub fn name_game(&self) -> bool {
        self.name_game_enabled == 1
    }

    pub fn is_free(&self) -> bool {
        self.guess_price_cents == 0
    }
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::events)]
pub struct NewEvent<'a> {
    pub title: &'a str,
    pub mother_name: &'a str,
    pub partner_name: Option<&'a str>,
    pub event_code: String,
    pub event_date: NaiveDate,
    pub due_date: NaiveDate,
    pub guess_price_cents: i32,
    pub theme: &'a str,
    pub name_game_enabled: i32,
    pub host_id: Option<i32>,
    // birth outcome and created_at use defaults
}

/// A guest or host identity. Payment totals are always derived by summing guesses, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::users))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub nickname: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.name)
    }

    /// Whether the profile carries the contact fields the host needs for payment tracking.
    pub fn payment_contact_complete(&self) -> bool {
        self.nickname.is_some() && self.phone.is_some()
    }
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub nickname: Option<&'a str>,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    // created_at uses default
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::guesses))]
#[cfg_attr(feature = "ssr", diesel(check_for_backend(Sqlite)))]
pub struct Guess {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub kind: String,
    pub value: String,
    pub payment_status: String,
    pub created_at: NaiveDateTime,
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::guesses)]
pub struct NewGuess<'a> {
    pub event_id: i32,
    pub user_id: i32,
    pub kind: &'a str,
    pub value: &'a str,
    pub payment_status: &'a str,
    // created_at uses default
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession {
    pub user_id: i32,
    pub event_id: i32,
    pub token: String,
    // created_at uses default
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::host_sessions)]
pub struct NewHostSession {
    pub token: String,
    // created_at uses default; no expires_at (NULL for indefinite)
}

/// The four guessable slot domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuessKind {
    Date,
    Hour,
    Minute,
    Name,
}

impl GuessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuessKind::Date => "date",
            GuessKind::Hour => "hour",
            GuessKind::Minute => "minute",
            GuessKind::Name => "name",
        }
    }

    pub fn parse(s: &str) -> Option<GuessKind> {
        match s {
            "date" => Some(GuessKind::Date),
            "hour" => Some(GuessKind::Hour),
            "minute" => Some(GuessKind::Minute),
            "name" => Some(GuessKind::Name),
            _ => None,
        }
    }
}

impl fmt::Display for GuessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<PaymentStatus> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enough of an event to render a pick list during login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i32,
    pub title: String,
    pub mother_name: String,
    pub event_code: String,
    pub event_date: NaiveDate,
    pub guess_price_cents: i32,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        EventSummary {
            id: event.id,
            title: event.title.clone(),
            mother_name: event.mother_name.clone(),
            event_code: event.event_code.clone(),
            event_date: event.event_date,
            guess_price_cents: event.guess_price_cents,
        }
    }
}

/// Backend verdict after a login request. These statuses drive the client-side step machine in
/// `crate::login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoginStatus {
    /// An event code or mother search is required before anything else.
    NeedEvent,
    /// Free event, unknown guest: only a name is needed.
    NeedNameOnly { event: EventSummary },
    /// Known guest, but the profile is missing payment-contact fields.
    NeedProfileInfo { event: EventSummary },
    /// Paid event, unknown guest: full contact details are needed.
    NeedUserInfo { event: EventSummary },
    /// A mother-name search matched these events (possibly none).
    EventsFound { candidates: Vec<EventSummary> },
    LoggedIn,
}

/// One claimed slot as the availability calculators in `crate::grid` see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakenSlot {
    pub kind: GuessKind,
    pub value: String,
    pub guesser: String,
    pub payment: PaymentStatus,
}

/// A guess joined with its guesser's display name, for host and event views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub id: i32,
    pub user_id: i32,
    pub guesser: String,
    pub kind: GuessKind,
    pub value: String,
    pub payment: PaymentStatus,
}

/// Per-guest payment rollup for one event. Owed is guess count times the event price; settled
/// counts only guesses marked paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user_id: i32,
    pub guesser: String,
    pub guess_count: i64,
    pub pending_count: i64,
    pub partial_count: i64,
    pub paid_count: i64,
    pub owed_cents: i64,
    pub settled_cents: i64,
}

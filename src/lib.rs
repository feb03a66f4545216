pub mod app;
pub mod grid;
pub mod login;
pub mod model;
#[cfg(feature = "ssr")]
pub mod schema;

#[cfg(feature = "ssr")]
use chrono::NaiveDate;
#[cfg(feature = "ssr")]
use diesel::connection::SimpleConnection;
#[cfg(feature = "ssr")]
use diesel::prelude::*;
#[cfg(feature = "ssr")]
use diesel::SqliteConnection;
#[cfg(feature = "ssr")]
use dotenvy::dotenv;
#[cfg(feature = "ssr")]
use rand::distr::Alphanumeric;
#[cfg(feature = "ssr")]
use rand::Rng;
#[cfg(feature = "ssr")]
use std::collections::HashMap;
#[cfg(feature = "ssr")]
use std::env;
#[cfg(feature = "ssr")]
use uuid::Uuid;

#[cfg(feature = "ssr")]
use crate::model::{
    Event, EventSummary, Guess, GuessKind, GuessRecord, LedgerEntry, LoginStatus, NewEvent,
    NewGuess, NewHostSession, NewSession, NewUser, PaymentStatus, TakenSlot, User,
};
#[cfg(feature = "ssr")]
use crate::schema::{events, guesses, host_sessions, sessions, users};

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}

#[cfg(feature = "ssr")]
pub fn establish_connection() -> SqliteConnection {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    let mut conn = SqliteConnection::establish(&database_url)
        .expect(&format!("Error connecting to {}", database_url));

    // Enable WAL mode to allow concurrent reads during writes, and a timeout to retry locked
    // operations.
    conn.batch_execute(
        "PRAGMA foreign_keys = ON; \
        PRAGMA journal_mode = WAL; \
        PRAGMA synchronous = NORMAL; \
        PRAGMA busy_timeout = 10000;",
    )
    .expect("Failed to set SQLite PRAGMAs");

    conn
}

/// Creates all tables if they don't exist yet. Used by the `init_database` binary and by the
/// test suite against in-memory databases.
#[cfg(feature = "ssr")]
pub fn create_schema(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    conn.batch_execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            nickname TEXT,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            mother_name TEXT NOT NULL,
            partner_name TEXT,
            event_code TEXT NOT NULL UNIQUE,
            event_date DATE NOT NULL,
            due_date DATE NOT NULL,
            guess_price_cents INTEGER NOT NULL DEFAULT 0,
            theme TEXT NOT NULL DEFAULT '',
            name_game_enabled INTEGER NOT NULL DEFAULT 0,
            host_id INTEGER REFERENCES users(id),
            birth_date DATE,
            birth_hour INTEGER,
            birth_minute INTEGER,
            birth_name TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS guesses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES events(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            kind TEXT NOT NULL,
            value TEXT NOT NULL,
            payment_status TEXT NOT NULL DEFAULT 'pending',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            event_id INTEGER NOT NULL REFERENCES events(id),
            token TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS host_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            token TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TIMESTAMP
        );",
    )?;
    Ok(())
}

/// Domain failures surfaced through the Diesel error type, the same way invalid registrations
/// are reported elsewhere in the data layer.
#[cfg(feature = "ssr")]
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("that slot is already taken")]
    SlotTaken,
    #[error("invalid {kind} guess: {value}")]
    InvalidValue { kind: GuessKind, value: String },
    #[error("the name game is not enabled for this event")]
    NameGameDisabled,
    #[error("not allowed")]
    NotAllowed,
    #[error("could not generate a unique event code")]
    CodeExhausted,
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "ssr")]
fn domain_err(err: PoolError) -> diesel::result::Error {
    diesel::result::Error::QueryBuilderError(Box::new(err))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The host-editable subset of an event.
#[cfg(feature = "ssr")]
#[derive(Debug, Clone)]
pub struct EventDraft<'a> {
    pub title: &'a str,
    pub mother_name: &'a str,
    pub partner_name: Option<&'a str>,
    pub event_date: NaiveDate,
    pub due_date: NaiveDate,
    pub guess_price_cents: i32,
    pub theme: &'a str,
    pub name_game_enabled: bool,
    pub host_id: Option<i32>,
}

/// Generates a 6-character uppercase alphanumeric join code not used by any existing event.
#[cfg(feature = "ssr")]
fn generate_event_code(conn: &mut SqliteConnection) -> Result<String, diesel::result::Error> {
    for _ in 0..32 {
        let code: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();
        let clashes: i64 = events::table
            .filter(events::event_code.eq(&code))
            .count()
            .get_result(conn)?;
        if clashes == 0 {
            return Ok(code);
        }
    }
    Err(domain_err(PoolError::CodeExhausted))
}

/// Creates an event with a freshly generated join code.
#[cfg(feature = "ssr")]
pub fn create_event(
    conn: &mut SqliteConnection,
    draft: &EventDraft<'_>,
) -> Result<Event, diesel::result::Error> {
    conn.transaction(|conn| {
        let event_code = generate_event_code(conn)?;
        let new_event = NewEvent {
            title: draft.title,
            mother_name: draft.mother_name,
            partner_name: draft.partner_name,
            event_code,
            event_date: draft.event_date,
            due_date: draft.due_date,
            guess_price_cents: draft.guess_price_cents,
            theme: draft.theme,
            name_game_enabled: draft.name_game_enabled as i32,
            host_id: draft.host_id,
        };
        diesel::insert_into(events::table)
            .values(&new_event)
            .get_result(conn)
    })
}

#[cfg(feature = "ssr")]
pub fn get_event(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Event, diesel::result::Error> {
    events::table
        .filter(events::id.eq(event_id))
        .select(Event::as_select())
        .first(conn)
}

/// Looks an event up by its join code, case-insensitively.
#[cfg(feature = "ssr")]
pub fn get_event_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Event, diesel::result::Error> {
    let code = code.trim().to_uppercase();
    events::table
        .filter(events::event_code.eq(code))
        .select(Event::as_select())
        .first(conn)
}

#[cfg(feature = "ssr")]
pub fn get_all_events(conn: &mut SqliteConnection) -> Result<Vec<Event>, diesel::result::Error> {
    events::table
        .order(events::event_date.asc())
        .select(Event::as_select())
        .load(conn)
}

/// Applies the settings form to an event. The join code and birth outcome are not touched here.
#[cfg(feature = "ssr")]
pub fn update_event_settings(
    conn: &mut SqliteConnection,
    event_id: i32,
    draft: &EventDraft<'_>,
) -> Result<Event, diesel::result::Error> {
    diesel::update(events::table.filter(events::id.eq(event_id)))
        .set((
            events::title.eq(draft.title),
            events::mother_name.eq(draft.mother_name),
            events::partner_name.eq(draft.partner_name),
            events::event_date.eq(draft.event_date),
            events::due_date.eq(draft.due_date),
            events::guess_price_cents.eq(draft.guess_price_cents),
            events::theme.eq(draft.theme),
            events::name_game_enabled.eq(draft.name_game_enabled as i32),
        ))
        .get_result(conn)
}

/// Records the actual birth so winners can be computed. Hour and minute must be in range when
/// present.
#[cfg(feature = "ssr")]
pub fn set_birth_outcome(
    conn: &mut SqliteConnection,
    event_id: i32,
    birth_date: Option<NaiveDate>,
    birth_hour: Option<i32>,
    birth_minute: Option<i32>,
    birth_name: Option<&str>,
) -> Result<Event, diesel::result::Error> {
    if let Some(hour) = birth_hour {
        if !(0..24).contains(&hour) {
            return Err(domain_err(PoolError::InvalidValue {
                kind: GuessKind::Hour,
                value: hour.to_string(),
            }));
        }
    }
    if let Some(minute) = birth_minute {
        if !(0..60).contains(&minute) {
            return Err(domain_err(PoolError::InvalidValue {
                kind: GuessKind::Minute,
                value: minute.to_string(),
            }));
        }
    }

    diesel::update(events::table.filter(events::id.eq(event_id)))
        .set((
            events::birth_date.eq(birth_date),
            events::birth_hour.eq(birth_hour),
            events::birth_minute.eq(birth_minute),
            events::birth_name.eq(birth_name.map(|n| n.trim().to_string())),
        ))
        .get_result(conn)
}

/// Case-insensitive substring search on the mother's name, used by the search-mother login
/// path. The match runs in Rust rather than through LIKE so `%` and `_` in the query are
/// ordinary characters. An empty query matches nothing.
#[cfg(feature = "ssr")]
pub fn find_events_by_mother(
    conn: &mut SqliteConnection,
    query: &str,
) -> Result<Vec<Event>, diesel::result::Error> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(vec![]);
    }
    let all = events::table
        .order(events::event_date.asc())
        .select(Event::as_select())
        .load::<Event>(conn)?;
    Ok(all
        .into_iter()
        .filter(|event| event.mother_name.to_lowercase().contains(&needle))
        .collect())
}

// ---------------------------------------------------------------------------
// Users, login branching, and sessions
// ---------------------------------------------------------------------------

#[cfg(feature = "ssr")]
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(feature = "ssr")]
pub fn lookup_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    users::table
        .filter(users::email.eq(normalize_email(email)))
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// First login step: an event context is always required before anything else, so the answer is
/// `NeedEvent` for any non-empty email.
#[cfg(feature = "ssr")]
pub fn start_login(email: &str) -> Result<LoginStatus, diesel::result::Error> {
    if normalize_email(email).is_empty() {
        return Err(domain_err(PoolError::Other(
            "An email address is required".to_string(),
        )));
    }
    Ok(LoginStatus::NeedEvent)
}

/// Decides what a guest still has to provide before they can enter an event, and logs them in
/// when nothing is missing. Returns the status plus a session token once logged in.
///
/// Branching: an unknown email needs only a name on free events and full contact details on paid
/// ones; a known guest missing payment-contact fields completes their profile only when the
/// event charges.
#[cfg(feature = "ssr")]
pub fn resolve_event_login(
    conn: &mut SqliteConnection,
    email: &str,
    event_id: i32,
) -> Result<(LoginStatus, Option<String>), diesel::result::Error> {
    conn.transaction(|conn| {
        let event = get_event(conn, event_id)?;
        let summary = EventSummary::from(&event);

        match lookup_user_by_email(conn, email)? {
            None => {
                if event.is_free() {
                    Ok((LoginStatus::NeedNameOnly { event: summary }, None))
                } else {
                    Ok((LoginStatus::NeedUserInfo { event: summary }, None))
                }
            }
            Some(user) => {
                if !event.is_free() && !user.payment_contact_complete() {
                    Ok((LoginStatus::NeedProfileInfo { event: summary }, None))
                } else {
                    let token = create_session(conn, user.id, event.id)?;
                    Ok((LoginStatus::LoggedIn, Some(token)))
                }
            }
        }
    })
}

/// Event-code login step: resolves the code, then branches as `resolve_event_login`.
#[cfg(feature = "ssr")]
pub fn login_with_code(
    conn: &mut SqliteConnection,
    email: &str,
    code: &str,
) -> Result<(LoginStatus, Option<String>), diesel::result::Error> {
    let event = get_event_by_code(conn, code)?;
    resolve_event_login(conn, email, event.id)
}

/// Name-only signup, accepted only on free events: creates (or renames) the user row and logs
/// them in. Paid events are rejected so the contact fields can never be skipped.
#[cfg(feature = "ssr")]
pub fn complete_name_only(
    conn: &mut SqliteConnection,
    email: &str,
    name: &str,
    event_id: i32,
) -> Result<String, diesel::result::Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(domain_err(PoolError::Other("A name is required".to_string())));
    }

    conn.transaction(|conn| {
        let event = get_event(conn, event_id)?;
        if !event.is_free() {
            // Paid events go through `complete_user_info`.
            return Err(domain_err(PoolError::NotAllowed));
        }
        let email = normalize_email(email);

        let user = match lookup_user_by_email(conn, &email)? {
            Some(user) => {
                diesel::update(users::table.filter(users::id.eq(user.id)))
                    .set(users::name.eq(name))
                    .get_result::<User>(conn)?
            }
            None => diesel::insert_into(users::table)
                .values(&NewUser {
                    name,
                    nickname: None,
                    email: &email,
                    phone: None,
                })
                .get_result::<User>(conn)?,
        };

        create_session(conn, user.id, event.id)
    })
}

/// Full-profile signup (or profile completion) and login.
#[cfg(feature = "ssr")]
pub fn complete_user_info(
    conn: &mut SqliteConnection,
    email: &str,
    name: &str,
    nickname: &str,
    phone: &str,
    event_id: i32,
) -> Result<String, diesel::result::Error> {
    let name = name.trim();
    let nickname = nickname.trim();
    let phone = phone.trim();
    if name.is_empty() || nickname.is_empty() || phone.is_empty() {
        return Err(domain_err(PoolError::Other(
            "Name, nickname, and phone are all required".to_string(),
        )));
    }

    conn.transaction(|conn| {
        let event = get_event(conn, event_id)?;
        let email = normalize_email(email);

        let user = match lookup_user_by_email(conn, &email)? {
            Some(user) => diesel::update(users::table.filter(users::id.eq(user.id)))
                .set((
                    users::name.eq(name),
                    users::nickname.eq(Some(nickname)),
                    users::phone.eq(Some(phone)),
                ))
                .get_result::<User>(conn)?,
            None => diesel::insert_into(users::table)
                .values(&NewUser {
                    name,
                    nickname: Some(nickname),
                    email: &email,
                    phone: Some(phone),
                })
                .get_result::<User>(conn)?,
        };

        create_session(conn, user.id, event.id)
    })
}

/// Generates a UUID session token binding the user to the event. Any previous sessions for the
/// user are dropped first.
#[cfg(feature = "ssr")]
pub fn create_session(
    conn: &mut SqliteConnection,
    user_id: i32,
    event_id: i32,
) -> Result<String, diesel::result::Error> {
    diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;

    let token = Uuid::new_v4().to_string();
    let new_session = NewSession {
        user_id,
        event_id,
        token: token.clone(),
    };
    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(token)
}

/// Resolves a session token to the logged-in user and the event they joined.
/// Validates the token as a UUID first.
#[cfg(feature = "ssr")]
pub fn get_user_by_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<(User, Event), diesel::result::Error> {
    if Uuid::parse_str(token).is_err() {
        return Err(diesel::result::Error::NotFound);
    }

    let (user, event_id): (User, i32) = sessions::table
        .filter(sessions::token.eq(token))
        .inner_join(users::table.on(sessions::user_id.eq(users::id)))
        .select((User::as_select(), sessions::event_id))
        .first(conn)?;

    let event = get_event(conn, event_id)?;
    Ok((user, event))
}

/// Deletes the session behind a token. A no-op for unknown tokens.
#[cfg(feature = "ssr")]
pub fn delete_session(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(sessions::table.filter(sessions::token.eq(token))).execute(conn)
}

/// Creates a host session and returns the token.
#[cfg(feature = "ssr")]
pub fn create_host_session(conn: &mut SqliteConnection) -> Result<String, diesel::result::Error> {
    let token = Uuid::new_v4().to_string();
    let new_session = NewHostSession {
        token: token.clone(),
    };
    diesel::insert_into(host_sessions::table)
        .values(&new_session)
        .execute(conn)?;
    Ok(token)
}

/// Validates a host token. Returns true if the provided token exists in the host_sessions table.
#[cfg(feature = "ssr")]
pub fn validate_host_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<bool, diesel::result::Error> {
    if Uuid::parse_str(token).is_err() {
        return Ok(false);
    }
    let count: i64 = host_sessions::table
        .filter(host_sessions::token.eq(token))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

// ---------------------------------------------------------------------------
// Guesses
// ---------------------------------------------------------------------------

/// Who is asking for a mutation on someone's guess.
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, Copy)]
pub enum Actor {
    Guest(i32),
    Host,
}

// Validates a raw guess value for its kind and returns the canonical form stored in the
// database: ISO dates, decimal hours/minutes, trimmed names.
#[cfg(feature = "ssr")]
fn canonicalize_guess(
    event: &Event,
    kind: GuessKind,
    value: &str,
) -> Result<String, diesel::result::Error> {
    let raw = value.trim();
    let invalid = || {
        domain_err(PoolError::InvalidValue {
            kind,
            value: raw.to_string(),
        })
    };

    match kind {
        GuessKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string())
            .map_err(|_| invalid()),
        GuessKind::Hour => match raw.parse::<u32>() {
            Ok(h) if h < 24 => Ok(h.to_string()),
            _ => Err(invalid()),
        },
        GuessKind::Minute => match raw.parse::<u32>() {
            Ok(m) if m < 60 => Ok(m.to_string()),
            _ => Err(invalid()),
        },
        GuessKind::Name => {
            if !event.name_game() {
                return Err(domain_err(PoolError::NameGameDisabled));
            }
            if raw.is_empty() {
                return Err(invalid());
            }
            Ok(raw.to_string())
        }
    }
}

/// Places a guess, enforcing that the slot is free. Names are compared case-insensitively for
/// the conflict check; new guesses start out pending.
#[cfg(feature = "ssr")]
pub fn place_guess(
    conn: &mut SqliteConnection,
    event_id: i32,
    user_id: i32,
    kind: GuessKind,
    value: &str,
) -> Result<Guess, diesel::result::Error> {
    conn.transaction(|conn| {
        let event = get_event(conn, event_id)?;
        let canonical = canonicalize_guess(&event, kind, value)?;

        let taken = match kind {
            GuessKind::Name => {
                // Name values are free-form, so compare case-insensitively in Rust.
                let existing: Vec<String> = guesses::table
                    .filter(guesses::event_id.eq(event_id))
                    .filter(guesses::kind.eq(kind.as_str()))
                    .select(guesses::value)
                    .load(conn)?;
                let wanted = canonical.to_lowercase();
                existing.iter().any(|v| v.trim().to_lowercase() == wanted)
            }
            _ => {
                let clashes: i64 = guesses::table
                    .filter(guesses::event_id.eq(event_id))
                    .filter(guesses::kind.eq(kind.as_str()))
                    .filter(guesses::value.eq(&canonical))
                    .count()
                    .get_result(conn)?;
                clashes > 0
            }
        };
        if taken {
            return Err(domain_err(PoolError::SlotTaken));
        }

        let new_guess = NewGuess {
            event_id,
            user_id,
            kind: kind.as_str(),
            value: &canonical,
            payment_status: PaymentStatus::Pending.as_str(),
        };
        diesel::insert_into(guesses::table)
            .values(&new_guess)
            .get_result(conn)
    })
}

/// Deletes a guess. Guests may only delete their own; the host may delete any.
/// Returns the number of affected rows.
#[cfg(feature = "ssr")]
pub fn delete_guess(
    conn: &mut SqliteConnection,
    guess_id: i32,
    actor: Actor,
) -> Result<usize, diesel::result::Error> {
    conn.transaction(|conn| {
        let guess: Guess = guesses::table
            .filter(guesses::id.eq(guess_id))
            .select(Guess::as_select())
            .first(conn)?;

        if let Actor::Guest(user_id) = actor {
            if guess.user_id != user_id {
                return Err(domain_err(PoolError::NotAllowed));
            }
        }

        diesel::delete(guesses::table.filter(guesses::id.eq(guess_id))).execute(conn)
    })
}

/// All guesses for an event joined with their guessers' display names, oldest first.
#[cfg(feature = "ssr")]
pub fn guesses_for_event(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<GuessRecord>, diesel::result::Error> {
    let rows: Vec<(Guess, User)> = guesses::table
        .filter(guesses::event_id.eq(event_id))
        .inner_join(users::table.on(guesses::user_id.eq(users::id)))
        .order(guesses::created_at.asc())
        .select((Guess::as_select(), User::as_select()))
        .load(conn)?;

    Ok(rows
        .iter()
        .filter_map(|(guess, user)| {
            // Rows with an unknown kind or payment status shouldn't exist; skip them rather
            // than failing the whole listing.
            let kind = GuessKind::parse(&guess.kind)?;
            let payment = PaymentStatus::parse(&guess.payment_status)?;
            Some(GuessRecord {
                id: guess.id,
                user_id: guess.user_id,
                guesser: user.display_name().to_string(),
                kind,
                value: guess.value.clone(),
                payment,
            })
        })
        .collect())
}

/// The event's claimed slots in the shape the grid calculators consume.
#[cfg(feature = "ssr")]
pub fn taken_slots(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<TakenSlot>, diesel::result::Error> {
    Ok(guesses_for_event(conn, event_id)?
        .into_iter()
        .map(|record| TakenSlot {
            kind: record.kind,
            value: record.value,
            guesser: record.guesser,
            payment: record.payment,
        })
        .collect())
}

/// One guest's guesses within an event, oldest first.
#[cfg(feature = "ssr")]
pub fn guesses_for_user(
    conn: &mut SqliteConnection,
    event_id: i32,
    user_id: i32,
) -> Result<Vec<Guess>, diesel::result::Error> {
    guesses::table
        .filter(guesses::event_id.eq(event_id))
        .filter(guesses::user_id.eq(user_id))
        .order(guesses::created_at.asc())
        .select(Guess::as_select())
        .load(conn)
}

/// Host bookkeeping: marks a guess pending, partial, or paid.
#[cfg(feature = "ssr")]
pub fn set_payment_status(
    conn: &mut SqliteConnection,
    guess_id: i32,
    status: PaymentStatus,
) -> Result<Guess, diesel::result::Error> {
    diesel::update(guesses::table.filter(guesses::id.eq(guess_id)))
        .set(guesses::payment_status.eq(status.as_str()))
        .get_result(conn)
}

/// Per-guest payment rollup for an event: counts per status, amount owed (guess count times the
/// event price), and the settled amount (paid guesses only). Sorted by guesser name.
#[cfg(feature = "ssr")]
pub fn payment_ledger(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<LedgerEntry>, diesel::result::Error> {
    let event = get_event(conn, event_id)?;
    let price = event.guess_price_cents as i64;

    let mut by_user: HashMap<i32, LedgerEntry> = HashMap::new();
    for record in guesses_for_event(conn, event_id)? {
        let entry = by_user.entry(record.user_id).or_insert_with(|| LedgerEntry {
            user_id: record.user_id,
            guesser: record.guesser.clone(),
            guess_count: 0,
            pending_count: 0,
            partial_count: 0,
            paid_count: 0,
            owed_cents: 0,
            settled_cents: 0,
        });
        entry.guess_count += 1;
        match record.payment {
            PaymentStatus::Pending => entry.pending_count += 1,
            PaymentStatus::Partial => entry.partial_count += 1,
            PaymentStatus::Paid => entry.paid_count += 1,
        }
    }

    let mut ledger: Vec<LedgerEntry> = by_user
        .into_values()
        .map(|mut entry| {
            entry.owed_cents = entry.guess_count * price;
            entry.settled_cents = entry.paid_count * price;
            entry
        })
        .collect();
    ledger.sort_by(|a, b| a.guesser.to_lowercase().cmp(&b.guesser.to_lowercase()));
    Ok(ledger)
}

/// Guesses matching the recorded birth outcome. Empty until the host records one. Name guesses
/// are compared case-insensitively.
#[cfg(feature = "ssr")]
pub fn winning_guesses(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<GuessRecord>, diesel::result::Error> {
    let event = get_event(conn, event_id)?;

    let birth_date = event.birth_date.map(|d| d.format("%Y-%m-%d").to_string());
    let birth_hour = event.birth_hour.map(|h| h.to_string());
    let birth_minute = event.birth_minute.map(|m| m.to_string());
    let birth_name = event.birth_name.as_deref().map(|n| n.trim().to_lowercase());

    Ok(guesses_for_event(conn, event_id)?
        .into_iter()
        .filter(|record| match record.kind {
            GuessKind::Date => birth_date.as_deref() == Some(record.value.as_str()),
            GuessKind::Hour => birth_hour.as_deref() == Some(record.value.as_str()),
            GuessKind::Minute => birth_minute.as_deref() == Some(record.value.as_str()),
            GuessKind::Name => {
                birth_name.as_deref() == Some(record.value.trim().to_lowercase().as_str())
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// Deletes all guesses and guest sessions, keeping events and user identities.
#[cfg(feature = "ssr")]
pub fn clear_all_guesses(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    conn.transaction(|conn| {
        diesel::delete(guesses::table).execute(conn)?;
        diesel::delete(sessions::table).execute(conn)?;
        Ok(())
    })
}

/// Resets the entire database to its initial state.
#[cfg(feature = "ssr")]
pub fn reset_database(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    conn.transaction(|conn| {
        diesel::delete(sessions::table).execute(conn)?;
        diesel::delete(host_sessions::table).execute(conn)?;
        diesel::delete(guesses::table).execute(conn)?;
        diesel::delete(events::table).execute(conn)?;
        diesel::delete(users::table).execute(conn)?;
        Ok(())
    })
}

#[cfg(all(test, feature = "ssr"))]
mod tests {
    use super::*;

    // Each test gets its own in-memory database with a fresh schema, so tests stay independent
    // without touching a developer database.
    fn test_conn() -> SqliteConnection {
        let mut conn =
            SqliteConnection::establish(":memory:").expect("Failed to open in-memory SQLite");
        conn.batch_execute("PRAGMA foreign_keys = ON;")
            .expect("Failed to set PRAGMAs");
        create_schema(&mut conn).expect("Failed to create schema");
        conn
    }

    fn draft<'a>(mother: &'a str, price: i32, name_game: bool) -> EventDraft<'a> {
        EventDraft {
            title: "Baby Pool",
            mother_name: mother,
            partner_name: Some("Jordan"),
            event_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            guess_price_cents: price,
            theme: "meadow",
            name_game_enabled: name_game,
            host_id: None,
        }
    }

    fn seed_user(conn: &mut SqliteConnection, name: &str, email: &str, complete: bool) -> User {
        diesel::insert_into(users::table)
            .values(&NewUser {
                name,
                nickname: complete.then_some(name),
                email,
                phone: complete.then_some("555-0100"),
            })
            .get_result(conn)
            .expect("Failed to seed user")
    }

    #[test]
    fn test_create_event_generates_code() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, true)).unwrap();

        assert_eq!(event.title, "Baby Pool");
        assert_eq!(event.mother_name, "Dana");
        assert_eq!(event.guess_price_cents, 500);
        assert!(event.name_game());
        assert!(!event.is_free());
        assert_eq!(event.event_code.len(), 6);
        assert_eq!(event.event_code, event.event_code.to_uppercase());
        assert!(event.birth_date.is_none());

        // Codes stay unique across events.
        let other = create_event(&mut conn, &draft("Rosa", 0, false)).unwrap();
        assert_ne!(event.event_code, other.event_code);
    }

    #[test]
    fn test_get_event_by_code_is_case_insensitive() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();

        let found = get_event_by_code(&mut conn, &event.event_code.to_lowercase()).unwrap();
        assert_eq!(found.id, event.id);

        let found = get_event_by_code(&mut conn, &format!("  {}  ", event.event_code)).unwrap();
        assert_eq!(found.id, event.id);

        assert!(matches!(
            get_event_by_code(&mut conn, "NOPE42"),
            Err(diesel::result::Error::NotFound)
        ));
    }

    #[test]
    fn test_update_event_settings() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();

        let mut changed = draft("Dana May", 250, true);
        changed.title = "The Big Reveal";
        changed.theme = "stars";
        let updated = update_event_settings(&mut conn, event.id, &changed).unwrap();

        assert_eq!(updated.title, "The Big Reveal");
        assert_eq!(updated.mother_name, "Dana May");
        assert_eq!(updated.guess_price_cents, 250);
        assert_eq!(updated.theme, "stars");
        assert!(updated.name_game());
        // The join code never changes through the settings form.
        assert_eq!(updated.event_code, event.event_code);
    }

    #[test]
    fn test_find_events_by_mother() {
        let mut conn = test_conn();
        create_event(&mut conn, &draft("Dana May", 0, false)).unwrap();
        create_event(&mut conn, &draft("Rosa", 0, false)).unwrap();

        let hits = find_events_by_mother(&mut conn, "dana").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].mother_name, "Dana May");

        let hits = find_events_by_mother(&mut conn, "a").unwrap();
        assert_eq!(hits.len(), 2);

        assert!(find_events_by_mother(&mut conn, "zzz").unwrap().is_empty());
    }

    #[test]
    fn test_find_events_by_mother_treats_wildcards_literally() {
        let mut conn = test_conn();
        create_event(&mut conn, &draft("Dana May", 0, false)).unwrap();
        create_event(&mut conn, &draft("Rosa", 0, false)).unwrap();

        assert!(find_events_by_mother(&mut conn, "%").unwrap().is_empty());
        assert!(find_events_by_mother(&mut conn, "_").unwrap().is_empty());
        assert!(find_events_by_mother(&mut conn, "").unwrap().is_empty());
        assert!(find_events_by_mother(&mut conn, "  ").unwrap().is_empty());
    }

    #[test]
    fn test_start_login_requires_email() {
        assert_eq!(
            start_login("guest@example.com").unwrap(),
            LoginStatus::NeedEvent
        );
        assert!(start_login("   ").is_err());
    }

    #[test]
    fn test_login_branching_unknown_guest() {
        let mut conn = test_conn();
        let free = create_event(&mut conn, &draft("Dana", 0, false)).unwrap();
        let paid = create_event(&mut conn, &draft("Rosa", 500, false)).unwrap();

        let (status, token) =
            resolve_event_login(&mut conn, "new@example.com", free.id).unwrap();
        assert!(matches!(status, LoginStatus::NeedNameOnly { .. }));
        assert!(token.is_none());

        let (status, token) =
            resolve_event_login(&mut conn, "new@example.com", paid.id).unwrap();
        match status {
            LoginStatus::NeedUserInfo { event } => assert_eq!(event.id, paid.id),
            other => panic!("expected NeedUserInfo, got {:?}", other),
        }
        assert!(token.is_none());
    }

    #[test]
    fn test_login_branching_known_guest() {
        let mut conn = test_conn();
        let paid = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();
        let free = create_event(&mut conn, &draft("Rosa", 0, false)).unwrap();
        seed_user(&mut conn, "Sam", "sam@example.com", false);
        seed_user(&mut conn, "Priya", "priya@example.com", true);

        // Incomplete profile on a paid event: profile completion required.
        let (status, token) =
            resolve_event_login(&mut conn, "sam@example.com", paid.id).unwrap();
        assert!(matches!(status, LoginStatus::NeedProfileInfo { .. }));
        assert!(token.is_none());

        // The same incomplete profile is fine on a free event.
        let (status, token) =
            resolve_event_login(&mut conn, "sam@example.com", free.id).unwrap();
        assert_eq!(status, LoginStatus::LoggedIn);
        assert!(Uuid::parse_str(&token.unwrap()).is_ok());

        // A complete profile goes straight in on the paid event.
        let (status, token) =
            resolve_event_login(&mut conn, "priya@example.com", paid.id).unwrap();
        assert_eq!(status, LoginStatus::LoggedIn);
        assert!(token.is_some());
    }

    #[test]
    fn test_login_with_code() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 0, false)).unwrap();
        seed_user(&mut conn, "Sam", "sam@example.com", false);

        let (status, token) =
            login_with_code(&mut conn, "sam@example.com", &event.event_code.to_lowercase())
                .unwrap();
        assert_eq!(status, LoginStatus::LoggedIn);
        assert!(token.is_some());

        // An unknown code surfaces as NotFound so the client can stay on the code step.
        assert!(matches!(
            login_with_code(&mut conn, "sam@example.com", "NOPE42"),
            Err(diesel::result::Error::NotFound)
        ));
    }

    #[test]
    fn test_complete_name_only() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 0, false)).unwrap();

        let token = complete_name_only(&mut conn, "New@Example.com", " Sam ", event.id).unwrap();
        let (user, logged_event) = get_user_by_token(&mut conn, &token).unwrap();
        assert_eq!(user.name, "Sam");
        assert_eq!(user.email, "new@example.com");
        assert!(user.nickname.is_none());
        assert_eq!(logged_event.id, event.id);

        assert!(complete_name_only(&mut conn, "x@example.com", "  ", event.id).is_err());
    }

    #[test]
    fn test_complete_name_only_rejects_paid_events() {
        let mut conn = test_conn();
        let paid = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();

        let (status, _) = resolve_event_login(&mut conn, "new@example.com", paid.id).unwrap();
        assert!(matches!(status, LoginStatus::NeedUserInfo { .. }));

        // The endpoint can be hit directly, so the branching has to hold server-side too.
        assert!(complete_name_only(&mut conn, "new@example.com", "Sam", paid.id).is_err());
        assert!(lookup_user_by_email(&mut conn, "new@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_complete_user_info_fills_profile() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();
        let existing = seed_user(&mut conn, "Sam", "sam@example.com", false);

        let token = complete_user_info(
            &mut conn,
            "sam@example.com",
            "Sam",
            "Sammy",
            "555-0199",
            event.id,
        )
        .unwrap();
        let (user, _) = get_user_by_token(&mut conn, &token).unwrap();
        assert_eq!(user.id, existing.id);
        assert_eq!(user.nickname.as_deref(), Some("Sammy"));
        assert_eq!(user.phone.as_deref(), Some("555-0199"));
        assert!(user.payment_contact_complete());

        // And a brand-new email creates a row.
        let token = complete_user_info(
            &mut conn,
            "alex@example.com",
            "Alex",
            "Al",
            "555-0142",
            event.id,
        )
        .unwrap();
        let (user, _) = get_user_by_token(&mut conn, &token).unwrap();
        assert_eq!(user.email, "alex@example.com");

        assert!(complete_user_info(&mut conn, "x@example.com", "X", "", "", event.id).is_err());
    }

    #[test]
    fn test_sessions() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 0, false)).unwrap();
        let user = seed_user(&mut conn, "Sam", "sam@example.com", true);

        let first = create_session(&mut conn, user.id, event.id).unwrap();
        let second = create_session(&mut conn, user.id, event.id).unwrap();
        assert_ne!(first, second);

        // The old token is gone; only the newest session works.
        assert!(get_user_by_token(&mut conn, &first).is_err());
        let (found, found_event) = get_user_by_token(&mut conn, &second).unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found_event.id, event.id);

        assert!(get_user_by_token(&mut conn, "not-a-uuid").is_err());

        assert_eq!(delete_session(&mut conn, &second).unwrap(), 1);
        assert!(get_user_by_token(&mut conn, &second).is_err());
        assert_eq!(delete_session(&mut conn, &second).unwrap(), 0);
    }

    #[test]
    fn test_host_sessions() {
        let mut conn = test_conn();
        let token = create_host_session(&mut conn).unwrap();
        assert!(validate_host_token(&mut conn, &token).unwrap());
        assert!(!validate_host_token(&mut conn, "not-a-uuid").unwrap());
        assert!(!validate_host_token(&mut conn, &Uuid::new_v4().to_string()).unwrap());
    }

    #[test]
    fn test_place_guess_kinds_and_validation() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, true)).unwrap();
        let user = seed_user(&mut conn, "Sam", "sam@example.com", true);

        let date = place_guess(&mut conn, event.id, user.id, GuessKind::Date, "2025-07-04").unwrap();
        assert_eq!(date.value, "2025-07-04");
        assert_eq!(date.payment_status, "pending");

        // Hours and minutes are stored in canonical decimal form.
        let hour = place_guess(&mut conn, event.id, user.id, GuessKind::Hour, " 07 ").unwrap();
        assert_eq!(hour.value, "7");
        let minute = place_guess(&mut conn, event.id, user.id, GuessKind::Minute, "59").unwrap();
        assert_eq!(minute.value, "59");

        let name = place_guess(&mut conn, event.id, user.id, GuessKind::Name, " Willow ").unwrap();
        assert_eq!(name.value, "Willow");

        // Invalid values of every kind.
        assert!(place_guess(&mut conn, event.id, user.id, GuessKind::Date, "July 4th").is_err());
        assert!(place_guess(&mut conn, event.id, user.id, GuessKind::Hour, "24").is_err());
        assert!(place_guess(&mut conn, event.id, user.id, GuessKind::Minute, "60").is_err());
        assert!(place_guess(&mut conn, event.id, user.id, GuessKind::Name, "  ").is_err());
    }

    #[test]
    fn test_place_guess_slot_conflicts() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, true)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true);
        let priya = seed_user(&mut conn, "Priya", "priya@example.com", true);

        place_guess(&mut conn, event.id, sam.id, GuessKind::Date, "2025-07-04").unwrap();
        let err = place_guess(&mut conn, event.id, priya.id, GuessKind::Date, "2025-07-04")
            .expect_err("Should conflict");
        assert!(matches!(err, diesel::result::Error::QueryBuilderError(_)));

        // Same value in another kind's domain is fine, and so is the same date in another event.
        place_guess(&mut conn, event.id, priya.id, GuessKind::Date, "2025-07-05").unwrap();
        let other = create_event(&mut conn, &draft("Rosa", 500, false)).unwrap();
        place_guess(&mut conn, other.id, priya.id, GuessKind::Date, "2025-07-04").unwrap();

        // Name conflicts are case-insensitive.
        place_guess(&mut conn, event.id, sam.id, GuessKind::Name, "Willow").unwrap();
        assert!(place_guess(&mut conn, event.id, priya.id, GuessKind::Name, "willow").is_err());
    }

    #[test]
    fn test_name_game_flag() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 0, false)).unwrap();
        let user = seed_user(&mut conn, "Sam", "sam@example.com", true);

        let err = place_guess(&mut conn, event.id, user.id, GuessKind::Name, "Willow")
            .expect_err("Name game is disabled");
        assert!(matches!(err, diesel::result::Error::QueryBuilderError(_)));
    }

    #[test]
    fn test_delete_guess_permissions() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true);
        let priya = seed_user(&mut conn, "Priya", "priya@example.com", true);

        let guess =
            place_guess(&mut conn, event.id, sam.id, GuessKind::Date, "2025-07-04").unwrap();

        // Another guest can't delete it.
        assert!(delete_guess(&mut conn, guess.id, Actor::Guest(priya.id)).is_err());

        // The owner can.
        assert_eq!(delete_guess(&mut conn, guess.id, Actor::Guest(sam.id)).unwrap(), 1);

        // And the host can delete anyone's.
        let guess =
            place_guess(&mut conn, event.id, priya.id, GuessKind::Hour, "3").unwrap();
        assert_eq!(delete_guess(&mut conn, guess.id, Actor::Host).unwrap(), 1);

        // Deleting a missing guess is NotFound.
        assert!(matches!(
            delete_guess(&mut conn, 999, Actor::Host),
            Err(diesel::result::Error::NotFound)
        ));
    }

    #[test]
    fn test_guesses_for_event_uses_display_names() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true); // nickname "Sam"
        let plain = seed_user(&mut conn, "Alex", "alex@example.com", false); // no nickname

        place_guess(&mut conn, event.id, sam.id, GuessKind::Hour, "3").unwrap();
        place_guess(&mut conn, event.id, plain.id, GuessKind::Hour, "4").unwrap();

        let records = guesses_for_event(&mut conn, event.id).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.guesser == "Sam" && r.value == "3"));
        assert!(records.iter().any(|r| r.guesser == "Alex" && r.value == "4"));

        let slots = taken_slots(&mut conn, event.id).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.kind == GuessKind::Hour));
    }

    #[test]
    fn test_payment_ledger() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, true)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true);
        let priya = seed_user(&mut conn, "Priya", "priya@example.com", true);

        let g1 = place_guess(&mut conn, event.id, sam.id, GuessKind::Date, "2025-07-04").unwrap();
        let g2 = place_guess(&mut conn, event.id, sam.id, GuessKind::Hour, "3").unwrap();
        place_guess(&mut conn, event.id, sam.id, GuessKind::Name, "Willow").unwrap();
        place_guess(&mut conn, event.id, priya.id, GuessKind::Minute, "30").unwrap();

        set_payment_status(&mut conn, g1.id, PaymentStatus::Paid).unwrap();
        set_payment_status(&mut conn, g2.id, PaymentStatus::Partial).unwrap();

        let ledger = payment_ledger(&mut conn, event.id).unwrap();
        assert_eq!(ledger.len(), 2);

        // Sorted by guesser name: Priya before Sam.
        assert_eq!(ledger[0].guesser, "Priya");
        assert_eq!(ledger[0].guess_count, 1);
        assert_eq!(ledger[0].pending_count, 1);
        assert_eq!(ledger[0].owed_cents, 500);
        assert_eq!(ledger[0].settled_cents, 0);

        assert_eq!(ledger[1].guesser, "Sam");
        assert_eq!(ledger[1].guess_count, 3);
        assert_eq!(ledger[1].pending_count, 1);
        assert_eq!(ledger[1].partial_count, 1);
        assert_eq!(ledger[1].paid_count, 1);
        assert_eq!(ledger[1].owed_cents, 1500);
        assert_eq!(ledger[1].settled_cents, 500);
    }

    #[test]
    fn test_winning_guesses() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, true)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true);
        let priya = seed_user(&mut conn, "Priya", "priya@example.com", true);

        place_guess(&mut conn, event.id, sam.id, GuessKind::Date, "2025-07-04").unwrap();
        place_guess(&mut conn, event.id, priya.id, GuessKind::Date, "2025-07-05").unwrap();
        place_guess(&mut conn, event.id, sam.id, GuessKind::Hour, "3").unwrap();
        place_guess(&mut conn, event.id, priya.id, GuessKind::Minute, "30").unwrap();
        place_guess(&mut conn, event.id, priya.id, GuessKind::Name, "willow").unwrap();

        // No outcome recorded yet: nobody has won.
        assert!(winning_guesses(&mut conn, event.id).unwrap().is_empty());

        set_birth_outcome(
            &mut conn,
            event.id,
            NaiveDate::from_ymd_opt(2025, 7, 5),
            Some(3),
            Some(45),
            Some("Willow"),
        )
        .unwrap();

        let winners = winning_guesses(&mut conn, event.id).unwrap();
        assert_eq!(winners.len(), 3);
        assert!(winners
            .iter()
            .any(|w| w.kind == GuessKind::Date && w.guesser == "Priya"));
        assert!(winners
            .iter()
            .any(|w| w.kind == GuessKind::Hour && w.guesser == "Sam"));
        // The minute guess (30 vs 45) doesn't win; the name matches case-insensitively.
        assert!(winners
            .iter()
            .any(|w| w.kind == GuessKind::Name && w.guesser == "Priya"));

        // Out-of-range outcomes are rejected.
        assert!(set_birth_outcome(&mut conn, event.id, None, Some(24), None, None).is_err());
        assert!(set_birth_outcome(&mut conn, event.id, None, None, Some(60), None).is_err());
    }

    #[test]
    fn test_clear_all_guesses() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true);
        place_guess(&mut conn, event.id, sam.id, GuessKind::Hour, "3").unwrap();
        create_session(&mut conn, sam.id, event.id).unwrap();

        clear_all_guesses(&mut conn).unwrap();

        assert!(guesses_for_event(&mut conn, event.id).unwrap().is_empty());
        let session_count: i64 = sessions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(session_count, 0);
        // Events and users survive.
        assert!(get_event(&mut conn, event.id).is_ok());
        assert!(lookup_user_by_email(&mut conn, "sam@example.com")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_reset_database() {
        let mut conn = test_conn();
        let event = create_event(&mut conn, &draft("Dana", 500, false)).unwrap();
        let sam = seed_user(&mut conn, "Sam", "sam@example.com", true);
        place_guess(&mut conn, event.id, sam.id, GuessKind::Hour, "3").unwrap();
        create_session(&mut conn, sam.id, event.id).unwrap();
        create_host_session(&mut conn).unwrap();

        reset_database(&mut conn).unwrap();

        assert!(get_all_events(&mut conn).unwrap().is_empty());
        assert!(lookup_user_by_email(&mut conn, "sam@example.com")
            .unwrap()
            .is_none());
        let guess_count: i64 = guesses::table.count().get_result(&mut conn).unwrap();
        assert_eq!(guess_count, 0);
        let host_count: i64 = host_sessions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(host_count, 0);
    }
}

use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::server_fn::error::NoCustomError;
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::use_navigate,
    path, NavigateOptions,
};
use std::env;

use crate::grid::{day_grid, hour_grid, minute_grid, name_board, SlotStatus};
use crate::login::{LoginFlow, LoginStep};
use crate::model::{
    Event, Guess, GuessKind, GuessRecord, LedgerEntry, LoginStatus, PaymentStatus, TakenSlot, User,
};
use chrono::Datelike;

#[cfg(feature = "ssr")]
use crate::{
    complete_name_only, complete_user_info, create_event, create_host_session, delete_guess,
    delete_session, find_events_by_mother, get_all_events, get_event, get_user_by_token,
    login_with_code, payment_ledger, place_guess, resolve_event_login, set_birth_outcome,
    set_payment_status, start_login, taken_slots, update_event_settings, validate_host_token,
    winning_guesses, Actor, EventDraft,
};
#[cfg(feature = "ssr")]
use crate::model::EventSummary;

#[cfg(feature = "ssr")]
use diesel::r2d2::{ConnectionManager, Pool};
#[cfg(feature = "ssr")]
use diesel::SqliteConnection;
#[cfg(feature = "ssr")]
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

// ---------------------------------------------------------------------------
// Server-side helpers
// ---------------------------------------------------------------------------

#[cfg(feature = "ssr")]
async fn extract_cookie(name: &str) -> Result<Option<String>, ServerFnError<NoCustomError>> {
    use axum::http::HeaderMap;
    use leptos_axum::extract;

    let headers: HeaderMap = extract()
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    let prefix = format!("{}=", name);
    if let Some(cookie_header) = headers.get(axum::http::header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(value) = cookie.strip_prefix(prefix.as_str()) {
                    return Ok(Some(value.to_string()));
                }
            }
        }
    }
    Ok(None)
}

#[cfg(feature = "ssr")]
fn set_cookie(name: &str, value: &str, max_age: i64) -> Result<(), ServerFnError<NoCustomError>> {
    use leptos_axum::ResponseOptions;
    let resp: ResponseOptions = expect_context();
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        name, value, max_age
    );
    resp.insert_header(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(&cookie)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?,
    );
    Ok(())
}

// Resolves the current request's guest session, if any.
#[cfg(feature = "ssr")]
async fn current_session(
    pool: DbPool,
) -> Result<Option<(User, Event)>, ServerFnError<NoCustomError>> {
    let token = extract_cookie("session_token").await?;
    let result = tokio::task::spawn_blocking(
        move || -> Result<Option<(User, Event)>, ServerFnError<NoCustomError>> {
            let mut conn = pool
                .get()
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
            if let Some(t) = token {
                Ok(get_user_by_token(&mut conn, &t).ok())
            } else {
                Ok(None)
            }
        },
    )
    .await;

    match result {
        Ok(session) => session,
        Err(e) => Err(ServerFnError::ServerError(e.to_string())),
    }
}

// Returns an empty result if the current request is from the host, or an error otherwise.
#[cfg(feature = "ssr")]
async fn check_host() -> Result<(), ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let token = extract_cookie("host_token").await?;

    let result = tokio::task::spawn_blocking(move || -> Result<bool, ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        match token {
            Some(t) => validate_host_token(&mut conn, &t)
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string())),
            None => Ok(false),
        }
    })
    .await;

    match result {
        Ok(Ok(true)) => Ok(()),
        Ok(Ok(false)) => Err(ServerFnError::ServerError("Unauthorized".to_string())),
        Ok(Err(e)) => Err(e),
        Err(e) => Err(ServerFnError::ServerError(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Login server functions. Each returns a LoginStatus that drives the client-side step machine.
// ---------------------------------------------------------------------------

#[server(StartLogin)]
pub async fn start_login_handler(
    email: String,
) -> Result<LoginStatus, ServerFnError<NoCustomError>> {
    tokio::task::spawn_blocking(move || {
        start_login(&email).map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(SearchMother)]
pub async fn search_mother_handler(
    query: String,
) -> Result<LoginStatus, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        let events = find_events_by_mother(&mut conn, &query)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        Ok(LoginStatus::EventsFound {
            candidates: events.iter().map(EventSummary::from).collect(),
        })
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(LoginWithCode)]
pub async fn login_with_code_handler(
    email: String,
    code: String,
) -> Result<LoginStatus, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let result = tokio::task::spawn_blocking(
        move || -> Result<(LoginStatus, Option<String>), ServerFnError<NoCustomError>> {
            let mut conn = pool
                .get()
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
            login_with_code(&mut conn, &email, &code).map_err(|e| match e {
                diesel::result::Error::NotFound => ServerFnError::<NoCustomError>::ServerError(
                    "No event found for that code".to_string(),
                ),
                other => ServerFnError::ServerError(other.to_string()),
            })
        },
    )
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    let (status, token) = result?;
    if let Some(token) = token {
        set_cookie("session_token", &token, 86400 * 30)?;
    }
    Ok(status)
}

#[server(SelectEvent)]
pub async fn select_event_handler(
    email: String,
    event_id: i32,
) -> Result<LoginStatus, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let result = tokio::task::spawn_blocking(
        move || -> Result<(LoginStatus, Option<String>), ServerFnError<NoCustomError>> {
            let mut conn = pool
                .get()
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
            resolve_event_login(&mut conn, &email, event_id)
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
        },
    )
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    let (status, token) = result?;
    if let Some(token) = token {
        set_cookie("session_token", &token, 86400 * 30)?;
    }
    Ok(status)
}

#[server(CompleteNameOnly)]
pub async fn complete_name_only_handler(
    email: String,
    name: String,
    event_id: i32,
) -> Result<LoginStatus, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let token = tokio::task::spawn_blocking(move || -> Result<String, ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        complete_name_only(&mut conn, &email, &name, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))??;

    set_cookie("session_token", &token, 86400 * 30)?;
    Ok(LoginStatus::LoggedIn)
}

#[server(CompleteUserInfo)]
pub async fn complete_user_info_handler(
    email: String,
    name: String,
    nickname: String,
    phone: String,
    event_id: i32,
) -> Result<LoginStatus, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let token = tokio::task::spawn_blocking(move || -> Result<String, ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        complete_user_info(&mut conn, &email, &name, &nickname, &phone, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))??;

    set_cookie("session_token", &token, 86400 * 30)?;
    Ok(LoginStatus::LoggedIn)
}

#[server(GetCurrentUser)]
pub async fn get_current_user() -> Result<Option<(User, Event)>, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    current_session(pool).await
}

#[server(Logout)]
pub async fn logout() -> Result<(), ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    if let Some(token) = extract_cookie("session_token").await? {
        tokio::task::spawn_blocking(move || -> Result<(), ServerFnError<NoCustomError>> {
            let mut conn = pool
                .get()
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
            delete_session(&mut conn, &token)
                .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))??;
    }
    set_cookie("session_token", "", 0)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Guess server functions
// ---------------------------------------------------------------------------

#[server(GetTakenSlots)]
pub async fn get_taken_slots(
    event_id: i32,
) -> Result<Vec<TakenSlot>, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        taken_slots(&mut conn, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(PlaceGuess)]
pub async fn place_guess_handler(
    kind: String,
    value: String,
) -> Result<(), ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let (user, event) = current_session(pool.clone())
        .await?
        .ok_or_else(|| ServerFnError::<NoCustomError>::ServerError("Not logged in".to_string()))?;
    let kind = GuessKind::parse(&kind).ok_or_else(|| {
        ServerFnError::<NoCustomError>::ServerError(format!("Unknown guess kind: {}", kind))
    })?;

    tokio::task::spawn_blocking(move || -> Result<(), ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        place_guess(&mut conn, event.id, user.id, kind, &value)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(GetMyGuesses)]
pub async fn get_my_guesses() -> Result<Vec<Guess>, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let Some((user, event)) = current_session(pool.clone()).await? else {
        return Ok(vec![]);
    };

    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        crate::guesses_for_user(&mut conn, event.id, user.id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(DeleteGuess)]
pub async fn delete_guess_handler(guess_id: i32) -> Result<(), ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();

    // The host may delete any guess; a guest only their own.
    let actor = if check_host().await.is_ok() {
        Actor::Host
    } else {
        let (user, _) = current_session(pool.clone()).await?.ok_or_else(|| {
            ServerFnError::<NoCustomError>::ServerError("Not logged in".to_string())
        })?;
        Actor::Guest(user.id)
    };

    tokio::task::spawn_blocking(move || -> Result<(), ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        delete_guess(&mut conn, guess_id, actor)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(GetWinners)]
pub async fn get_winners(
    event_id: i32,
) -> Result<Vec<GuessRecord>, ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        winning_guesses(&mut conn, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

// ---------------------------------------------------------------------------
// Host server functions
// ---------------------------------------------------------------------------

#[server(HostLogin)]
pub async fn host_login(password: String) -> Result<(), ServerFnError<NoCustomError>> {
    let pool: DbPool = expect_context();
    let host_password = env::var("HOST_PASSWORD").map_err(|_| {
        ServerFnError::<NoCustomError>::ServerError("Host password not set".to_string())
    })?;

    if password != host_password {
        return Err(ServerFnError::ServerError("Invalid password".to_string()));
    }

    let token = tokio::task::spawn_blocking(move || -> Result<String, ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        create_host_session(&mut conn)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))??;

    set_cookie("host_token", &token, 86400)?;
    Ok(())
}

#[server(HostLogout)]
pub async fn host_logout() -> Result<(), ServerFnError<NoCustomError>> {
    set_cookie("host_token", "", 0)?;
    Ok(())
}

// Checks if the current request is from the host. Returns true if it is, false otherwise.
#[server(IsHost)]
pub async fn is_host() -> Result<bool, ServerFnError<NoCustomError>> {
    Ok(check_host().await.is_ok())
}

#[server(CreateEvent)]
#[allow(clippy::too_many_arguments)]
pub async fn create_event_handler(
    title: String,
    mother_name: String,
    partner_name: String,
    event_date: String,
    due_date: String,
    guess_price_cents: i32,
    theme: String,
    name_game_enabled: bool,
) -> Result<Event, ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();

    let event_date = parse_date(&event_date)?;
    let due_date = parse_date(&due_date)?;

    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        let draft = EventDraft {
            title: &title,
            mother_name: &mother_name,
            partner_name: (!partner_name.trim().is_empty()).then_some(partner_name.trim()),
            event_date,
            due_date,
            guess_price_cents,
            theme: &theme,
            name_game_enabled,
            host_id: None,
        };
        create_event(&mut conn, &draft)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(UpdateEvent)]
#[allow(clippy::too_many_arguments)]
pub async fn update_event_handler(
    event_id: i32,
    title: String,
    mother_name: String,
    partner_name: String,
    event_date: String,
    due_date: String,
    guess_price_cents: i32,
    theme: String,
    name_game_enabled: bool,
) -> Result<Event, ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();

    let event_date = parse_date(&event_date)?;
    let due_date = parse_date(&due_date)?;

    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        let draft = EventDraft {
            title: &title,
            mother_name: &mother_name,
            partner_name: (!partner_name.trim().is_empty()).then_some(partner_name.trim()),
            event_date,
            due_date,
            guess_price_cents,
            theme: &theme,
            name_game_enabled,
            host_id: None,
        };
        update_event_settings(&mut conn, event_id, &draft)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(GetEvents)]
pub async fn get_events() -> Result<Vec<Event>, ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        get_all_events(&mut conn)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(SetBirthOutcome)]
pub async fn set_birth_outcome_handler(
    event_id: i32,
    birth_date: String,
    birth_hour: String,
    birth_minute: String,
    birth_name: String,
) -> Result<(), ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();

    // Empty form fields mean "not recorded".
    let date = if birth_date.trim().is_empty() {
        None
    } else {
        Some(parse_date(&birth_date)?)
    };
    let hour = parse_optional_int(&birth_hour)?;
    let minute = parse_optional_int(&birth_minute)?;
    let name = (!birth_name.trim().is_empty()).then(|| birth_name.trim().to_string());

    tokio::task::spawn_blocking(move || -> Result<(), ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        set_birth_outcome(&mut conn, event_id, date, hour, minute, name.as_deref())
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(GetLedger)]
pub async fn get_ledger(event_id: i32) -> Result<Vec<LedgerEntry>, ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        payment_ledger(&mut conn, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(GetEventGuesses)]
pub async fn get_event_guesses(
    event_id: i32,
) -> Result<Vec<GuessRecord>, ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        crate::guesses_for_event(&mut conn, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

#[server(SetPaymentStatus)]
pub async fn set_payment_status_handler(
    guess_id: i32,
    status: String,
) -> Result<(), ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();
    let status = PaymentStatus::parse(&status).ok_or_else(|| {
        ServerFnError::<NoCustomError>::ServerError(format!("Unknown payment status: {}", status))
    })?;

    tokio::task::spawn_blocking(move || -> Result<(), ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        set_payment_status(&mut conn, guess_id, status)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?
}

/// SVG QR code for an event's join link, for printed invitations.
#[server(EventQr)]
pub async fn event_qr(event_id: i32) -> Result<String, ServerFnError<NoCustomError>> {
    check_host().await?;
    let pool: DbPool = expect_context();

    let event = tokio::task::spawn_blocking(move || -> Result<Event, ServerFnError<NoCustomError>> {
        let mut conn = pool
            .get()
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
        get_event(&mut conn, event_id)
            .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
    })
    .await
    .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))??;

    let base = env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let join_url = format!("{}/login?code={}", base, event.event_code);

    use qrcode::render::svg;
    use qrcode::QrCode;
    let code = QrCode::new(join_url.as_bytes())
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(180, 180)
        .build())
}

#[cfg(feature = "ssr")]
fn parse_date(s: &str) -> Result<chrono::NaiveDate, ServerFnError<NoCustomError>> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        ServerFnError::<NoCustomError>::ServerError(format!("Invalid date: {}", s))
    })
}

#[cfg(feature = "ssr")]
fn parse_optional_int(s: &str) -> Result<Option<i32>, ServerFnError<NoCustomError>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<i32>().map(Some).map_err(|_| {
        ServerFnError::<NoCustomError>::ServerError(format!("Invalid number: {}", s))
    })
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        // injects a stylesheet into the document <head>
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/baby-pool.css" />

        // sets the document title
        <Title text="Baby Pool" />

        <Router>
            <main>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=path!("/") view=Home />
                    <Route path=path!("/login") view=Login />
                    <Route path=path!("/host/login") view=HostLogin />
                    <Route path=path!("/host") view=HostDashboard />
                </Routes>
            </main>
        </Router>
    }
}

fn format_price(cents: i32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[component]
fn Home() -> impl IntoView {
    let current_user = Resource::new(|| (), |_| get_current_user());
    let is_host_res = Resource::new(|| (), |_| is_host());

    view! {
        <div>
            <h1>"Baby Pool"</h1>
            <Suspense fallback=|| {
                view! { "Checking login..." }
            }>
                {move || {
                    current_user
                        .with(|u_res| match u_res {
                            Some(Ok(Some((user, event)))) => {
                                view! {
                                    <GuessBoard user=user.clone() event=event.clone() />
                                }
                                    .into_any()
                            }
                            _ => {
                                view! {
                                    <p>"Guess the birth date, time, and name - small stakes, big bragging rights."</p>
                                    <p>
                                        <a href="/login">"Join an event"</a>
                                    </p>
                                }
                                    .into_any()
                            }
                        })
                }}
            </Suspense>
            <Suspense>
                {move || {
                    is_host_res
                        .with(|host| match host {
                            Some(Ok(true)) => {
                                view! {
                                    <p>
                                        <a href="/host">"Host Dashboard"</a>
                                    </p>
                                }
                                    .into_any()
                            }
                            _ => view! {}.into_any(),
                        })
                }}
            </Suspense>
        </div>
    }
}

/// The logged-in guest's view: event header, the four guessing grids, and their own guesses.
#[component]
fn GuessBoard(user: User, event: Event) -> impl IntoView {
    let taken_fetcher = Resource::new(move || event.id, |id| get_taken_slots(id));
    let my_guesses_fetcher = Resource::new(|| (), |_| get_my_guesses());
    let winners_fetcher = Resource::new(move || event.id, |id| get_winners(id));
    let guess_error = RwSignal::new(String::new());

    let outcome_recorded = event.birth_date.is_some() || event.birth_name.is_some();

    // Claiming a slot is the same flow for every grid: place the guess, then refresh the taken
    // slots and the guest's own list.
    let claim = move |kind: GuessKind, value: String| {
        spawn_local(async move {
            match place_guess_handler(kind.as_str().to_string(), value).await {
                Ok(_) => {
                    guess_error.set(String::new());
                    taken_fetcher.refetch();
                    my_guesses_fetcher.refetch();
                }
                Err(e) => guess_error.set(e.to_string()),
            }
        });
    };

    let remove = move |guess_id: i32| {
        spawn_local(async move {
            match delete_guess_handler(guess_id).await {
                Ok(_) => {
                    guess_error.set(String::new());
                    taken_fetcher.refetch();
                    my_guesses_fetcher.refetch();
                }
                Err(e) => guess_error.set(e.to_string()),
            }
        });
    };

    let do_logout = move |_| {
        spawn_local(async move {
            let _ = logout().await;
            let navigate = use_navigate();
            navigate("/", NavigateOptions::default());
        });
    };

    let event_for_view = event.clone();
    let name_game = event.name_game();

    view! {
        <div class=format!("board theme-{}", event.theme)>
            <header>
                <h2>{event_for_view.title.clone()}</h2>
                <p>
                    "For " {event_for_view.mother_name.clone()}
                    {event_for_view
                        .partner_name
                        .clone()
                        .map(|p| format!(" & {}", p))
                        .unwrap_or_default()} " - due "
                    {event_for_view.due_date.format("%B %-d, %Y").to_string()}
                </p>
                <p>
                    "Welcome, " {user.display_name().to_string()} ". Each guess costs "
                    {format_price(event_for_view.guess_price_cents)} "."
                </p>
                <button on:click=do_logout>"Log out"</button>
            </header>

            {move || {
                if !guess_error.get().is_empty() {
                    view! { <p class="error">{guess_error.get()}</p> }.into_any()
                } else {
                    view! {}.into_any()
                }
            }}

            {outcome_recorded
                .then(|| {
                    view! {
                        <section>
                            <h3>"The baby is here! Winners"</h3>
                            <Suspense fallback=|| {
                                view! { "Loading..." }
                            }>
                                {move || {
                                    winners_fetcher
                                        .with(|res| match res {
                                            Some(Ok(winners)) if !winners.is_empty() => {
                                                winners
                                                    .iter()
                                                    .map(|w| {
                                                        view! {
                                                            <p>
                                                                {w.guesser.clone()} " won the " {w.kind.to_string()}
                                                                " game with " {w.value.clone()}
                                                            </p>
                                                        }
                                                    })
                                                    .collect_view()
                                                    .into_any()
                                            }
                                            Some(Ok(_)) => view! { <p>"Nobody guessed it!"</p> }.into_any(),
                                            _ => view! { "Loading..." }.into_any(),
                                        })
                                }}
                            </Suspense>
                        </section>
                    }
                })}

            <Suspense fallback=|| {
                view! { "Loading grids..." }
            }>
                {move || {
                    taken_fetcher
                        .with(|res| match res {
                            Some(Ok(taken)) => {
                                let taken = taken.clone();
                                let due = event_for_view.due_date;
                                view! {
                                    <DayGridView
                                        year=due.year()
                                        month=due.month()
                                        taken=taken.clone()
                                        on_claim=claim
                                    />
                                    <HourGridView taken=taken.clone() on_claim=claim />
                                    <MinuteGridView taken=taken.clone() on_claim=claim />
                                    {name_game
                                        .then(|| {
                                            view! { <NameBoardView taken=taken.clone() on_claim=claim /> }
                                        })}
                                }
                                    .into_any()
                            }
                            _ => view! { "Error loading grids" }.into_any(),
                        })
                }}
            </Suspense>

            <section>
                <h3>"My guesses"</h3>
                <Suspense fallback=|| {
                    view! { "Loading..." }
                }>
                    {move || {
                        my_guesses_fetcher
                            .with(|res| match res {
                                Some(Ok(guesses)) if !guesses.is_empty() => {
                                    guesses
                                        .iter()
                                        .map(|guess| {
                                            let id = guess.id;
                                            view! {
                                                <p>
                                                    {guess.kind.clone()} ": " {guess.value.clone()} " ("
                                                    {guess.payment_status.clone()} ") "
                                                    <button on:click=move |_| remove(id)>"Remove"</button>
                                                </p>
                                            }
                                        })
                                        .collect_view()
                                        .into_any()
                                }
                                Some(Ok(_)) => view! { <p>"No guesses yet."</p> }.into_any(),
                                _ => view! { "Loading..." }.into_any(),
                            })
                    }}
                </Suspense>
            </section>
        </div>
    }
}

fn slot_title(status: &SlotStatus) -> String {
    match status {
        SlotStatus::Available => "Available".to_string(),
        SlotStatus::Taken { guesser, payment } => format!("{} ({})", guesser, payment),
    }
}

#[component]
fn DayGridView(
    year: i32,
    month: u32,
    taken: Vec<TakenSlot>,
    on_claim: impl Fn(GuessKind, String) + Copy + 'static,
) -> impl IntoView {
    let slots = day_grid(year, month, &taken);

    view! {
        <section>
            <h3>"Pick a birth date"</h3>
            <div class="grid grid-days">
                {slots
                    .into_iter()
                    .map(|slot| {
                        let value = slot.date.format("%Y-%m-%d").to_string();
                        let label = slot.date.day().to_string();
                        let available = slot.status.is_available();
                        let title = slot_title(&slot.status);
                        view! {
                            <button
                                class=if available { "slot available" } else { "slot taken" }
                                title=title
                                disabled=!available
                                on:click=move |_| on_claim(GuessKind::Date, value.clone())
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
fn HourGridView(
    taken: Vec<TakenSlot>,
    on_claim: impl Fn(GuessKind, String) + Copy + 'static,
) -> impl IntoView {
    let slots = hour_grid(&taken);

    view! {
        <section>
            <h3>"Pick an hour"</h3>
            <div class="grid grid-hours">
                {slots
                    .into_iter()
                    .map(|slot| {
                        let value = slot.hour.to_string();
                        let available = slot.status.is_available();
                        let title = slot_title(&slot.status);
                        view! {
                            <button
                                class=if available { "slot available" } else { "slot taken" }
                                title=title
                                disabled=!available
                                on:click=move |_| on_claim(GuessKind::Hour, value.clone())
                            >
                                {slot.label.clone()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
fn MinuteGridView(
    taken: Vec<TakenSlot>,
    on_claim: impl Fn(GuessKind, String) + Copy + 'static,
) -> impl IntoView {
    let slots = minute_grid(&taken);

    view! {
        <section>
            <h3>"Pick a minute"</h3>
            <div class="grid grid-minutes">
                {slots
                    .into_iter()
                    .map(|slot| {
                        let value = slot.minute.to_string();
                        let label = format!(":{:02}", slot.minute);
                        let available = slot.status.is_available();
                        let title = slot_title(&slot.status);
                        view! {
                            <button
                                class=if available { "slot available" } else { "slot taken" }
                                title=title
                                disabled=!available
                                on:click=move |_| on_claim(GuessKind::Minute, value.clone())
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
fn NameBoardView(
    taken: Vec<TakenSlot>,
    on_claim: impl Fn(GuessKind, String) + Copy + 'static,
) -> impl IntoView {
    let claims = name_board(&taken);
    let new_name = RwSignal::new(String::new());

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get();
        if name.trim().is_empty() {
            return;
        }
        new_name.set(String::new());
        on_claim(GuessKind::Name, name);
    };

    view! {
        <section>
            <h3>"Name game"</h3>
            <ul>
                {claims
                    .into_iter()
                    .map(|claim| {
                        view! {
                            <li>{claim.name} " - " {claim.guesser} " (" {claim.payment.to_string()} ")"</li>
                        }
                    })
                    .collect_view()}
            </ul>
            <form on:submit=submit>
                <label>
                    "Your name guess: "
                    <input
                        type="text"
                        prop:value=move || new_name.get()
                        on:input=move |ev| new_name.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit">"Claim"</button>
            </form>
        </section>
    }
}

/// The multi-step guest login. All step handling goes through the `LoginFlow` reducer; each
/// request's resulting status is applied to it, and errors keep the guest on the current step.
#[component]
fn Login() -> impl IntoView {
    let flow = RwSignal::new(LoginFlow::new());
    let email = RwSignal::new(String::new());
    let code = RwSignal::new(String::new());
    let mother = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let nickname = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());

    // Applies a server verdict and leaves the page once the reducer reaches LoggedIn.
    let apply_status = move |status: LoginStatus| {
        flow.update(|f| f.apply(status));
        if flow.get_untracked().step() == LoginStep::LoggedIn {
            let navigate = use_navigate();
            navigate("/", NavigateOptions::default());
        }
    };

    let submit_email = move |ev: SubmitEvent| {
        ev.prevent_default();
        let e = email.get();
        if e.trim().is_empty() {
            flow.update(|f| f.fail("Please enter your email."));
            return;
        }
        spawn_local(async move {
            match start_login_handler(e.clone()).await {
                Ok(status) => {
                    flow.update(|f| f.set_email(&e));
                    apply_status(status);
                }
                Err(err) => flow.update(|f| f.fail(err.to_string())),
            }
        });
    };

    let submit_code = move |ev: SubmitEvent| {
        ev.prevent_default();
        let c = code.get();
        if c.trim().is_empty() {
            flow.update(|f| f.fail("Please enter the event code."));
            return;
        }
        let e = flow.get_untracked().email().to_string();
        spawn_local(async move {
            match login_with_code_handler(e, c).await {
                Ok(status) => apply_status(status),
                Err(err) => flow.update(|f| f.fail(err.to_string())),
            }
        });
    };

    let submit_search = move |ev: SubmitEvent| {
        ev.prevent_default();
        let q = mother.get();
        if q.trim().is_empty() {
            flow.update(|f| f.fail("Please enter the mother's name."));
            return;
        }
        spawn_local(async move {
            match search_mother_handler(q).await {
                Ok(status) => apply_status(status),
                Err(err) => flow.update(|f| f.fail(err.to_string())),
            }
        });
    };

    let pick_event = move |event_id: i32| {
        let e = flow.get_untracked().email().to_string();
        spawn_local(async move {
            match select_event_handler(e, event_id).await {
                Ok(status) => apply_status(status),
                Err(err) => flow.update(|f| f.fail(err.to_string())),
            }
        });
    };

    let submit_name = move |ev: SubmitEvent| {
        ev.prevent_default();
        let snapshot = flow.get_untracked();
        let Some(event) = snapshot.event().cloned() else {
            flow.update(|f| f.fail("No event selected."));
            return;
        };
        let n = name.get();
        if n.trim().is_empty() {
            flow.update(|f| f.fail("Please enter your name."));
            return;
        }
        let e = snapshot.email().to_string();
        spawn_local(async move {
            match complete_name_only_handler(e, n, event.id).await {
                Ok(status) => apply_status(status),
                Err(err) => flow.update(|f| f.fail(err.to_string())),
            }
        });
    };

    let submit_user_info = move |ev: SubmitEvent| {
        ev.prevent_default();
        let snapshot = flow.get_untracked();
        let Some(event) = snapshot.event().cloned() else {
            flow.update(|f| f.fail("No event selected."));
            return;
        };
        let n = name.get();
        let nick = nickname.get();
        let p = phone.get();
        if n.trim().is_empty() || nick.trim().is_empty() || p.trim().is_empty() {
            flow.update(|f| f.fail("Name, nickname, and phone are all required."));
            return;
        }
        let e = snapshot.email().to_string();
        spawn_local(async move {
            match complete_user_info_handler(e, n, nick, p, event.id).await {
                Ok(status) => apply_status(status),
                Err(err) => flow.update(|f| f.fail(err.to_string())),
            }
        });
    };

    view! {
        <div>
            <h1>"Join a Baby Pool"</h1>

            {move || {
                let current = flow.get();
                match current.step() {
                    LoginStep::Email => {
                        view! {
                            <form on:submit=submit_email>
                                <label>
                                    "Email: "
                                    <input
                                        type="email"
                                        prop:value=move || email.get()
                                        on:input=move |ev| email.set(event_target_value(&ev))
                                    />
                                </label>
                                <button type="submit">"Continue"</button>
                            </form>
                        }
                            .into_any()
                    }
                    LoginStep::EventCode => {
                        view! {
                            <form on:submit=submit_code>
                                <label>
                                    "Event code: "
                                    <input
                                        type="text"
                                        prop:value=move || code.get()
                                        on:input=move |ev| code.set(event_target_value(&ev))
                                    />
                                </label>
                                <button type="submit">"Join"</button>
                            </form>
                            <p>"Don't have a code?"</p>
                            <form on:submit=submit_search>
                                <label>
                                    "Search by the mother's name: "
                                    <input
                                        type="text"
                                        prop:value=move || mother.get()
                                        on:input=move |ev| mother.set(event_target_value(&ev))
                                    />
                                </label>
                                <button type="submit">"Search"</button>
                            </form>
                        }
                            .into_any()
                    }
                    LoginStep::MotherSearch => {
                        let candidates = current.candidates().to_vec();
                        view! {
                            <h2>"Matching events"</h2>
                            {if candidates.is_empty() {
                                view! { <p>"No events matched. Try another search."</p> }
                                    .into_any()
                            } else {
                                candidates
                                    .iter()
                                    .map(|summary| {
                                        let id = summary.id;
                                        view! {
                                            <p>
                                                {summary.title.clone()} " (for "
                                                {summary.mother_name.clone()} ", "
                                                {summary.event_date.format("%B %-d, %Y").to_string()}
                                                ") "
                                                <button on:click=move |_| pick_event(id)>"This one"</button>
                                            </p>
                                        }
                                    })
                                    .collect_view()
                                    .into_any()
                            }}
                            <form on:submit=submit_search>
                                <label>
                                    "Search again: "
                                    <input
                                        type="text"
                                        prop:value=move || mother.get()
                                        on:input=move |ev| mother.set(event_target_value(&ev))
                                    />
                                </label>
                                <button type="submit">"Search"</button>
                            </form>
                        }
                            .into_any()
                    }
                    LoginStep::NameOnly => {
                        view! {
                            <h2>"Almost there"</h2>
                            <form on:submit=submit_name>
                                <label>
                                    "Your name: "
                                    <input
                                        type="text"
                                        prop:value=move || name.get()
                                        on:input=move |ev| name.set(event_target_value(&ev))
                                    />
                                </label>
                                <button type="submit">"Join the pool"</button>
                            </form>
                        }
                            .into_any()
                    }
                    LoginStep::UserInfo => {
                        let blurb = if current.profile_only() {
                            "We just need a couple more details for payment tracking."
                        } else {
                            "Tell us who you are so the host can track payments."
                        };
                        view! {
                            <h2>{blurb}</h2>
                            <form on:submit=submit_user_info>
                                <label>
                                    "Name: "
                                    <input
                                        type="text"
                                        prop:value=move || name.get()
                                        on:input=move |ev| name.set(event_target_value(&ev))
                                    />
                                </label>
                                <label>
                                    "Nickname: "
                                    <input
                                        type="text"
                                        prop:value=move || nickname.get()
                                        on:input=move |ev| nickname.set(event_target_value(&ev))
                                    />
                                </label>
                                <label>
                                    "Phone: "
                                    <input
                                        type="text"
                                        prop:value=move || phone.get()
                                        on:input=move |ev| phone.set(event_target_value(&ev))
                                    />
                                </label>
                                <button type="submit">"Join the pool"</button>
                            </form>
                        }
                            .into_any()
                    }
                    LoginStep::LoggedIn => view! { <p>"You're in! Redirecting..."</p> }.into_any(),
                }
            }}

            {move || {
                flow.get()
                    .error()
                    .map(|err| view! { <p class="error">{err.to_string()}</p> })
            }}
        </div>
    }
}

#[component]
fn HostLogin() -> impl IntoView {
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let p = password.get();
        if p.is_empty() {
            error.set("Please enter password.".to_string());
            return;
        }
        spawn_local(async move {
            match host_login(p).await {
                Ok(_) => {
                    error.set(String::new());
                    let navigate = use_navigate();
                    navigate("/host", NavigateOptions::default());
                }
                Err(e) => error.set(e.to_string()),
            }
        });
    };

    view! {
        <div>
            <h1>"Host Login"</h1>
            <form on:submit=submit>
                <label>
                    "Password: "
                    <input
                        type="password"
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit">"Login"</button>
            </form>
            {move || {
                if !error.get().is_empty() {
                    view! { <p>{error.get()}</p> }.into_any()
                } else {
                    view! {}.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn HostDashboard() -> impl IntoView {
    // Fetchers for various resources (state).
    let is_host_fetcher = Resource::new(|| (), |_| is_host());
    let events_fetcher = Resource::new(|| (), |_| get_events());

    // Redirect to the host login page on the next "tick" if the visitor isn't the host.
    // NOTE: This effect does not capture any reactive values, so it won't run again.
    let navigate = use_navigate();
    Effect::new(move || {
        is_host_fetcher.with(|maybe_result| {
            if let Some(Ok(false)) = maybe_result {
                navigate("/host/login", NavigateOptions::default());
            }
        });
    });

    // Which event's ledger/guesses/winners are shown. 0 means none selected, and nothing is
    // fetched until one is.
    let selected_event = RwSignal::new(0i32);
    let ledger_fetcher = Resource::new(
        move || selected_event.get(),
        |id| async move {
            if id == 0 {
                return Ok(vec![]);
            }
            get_ledger(id).await
        },
    );
    let guesses_fetcher = Resource::new(
        move || selected_event.get(),
        |id| async move {
            if id == 0 {
                return Ok(vec![]);
            }
            get_event_guesses(id).await
        },
    );
    let winners_fetcher = Resource::new(
        move || selected_event.get(),
        |id| async move {
            if id == 0 {
                return Ok(vec![]);
            }
            get_winners(id).await
        },
    );
    let qr_fetcher = Resource::new(
        move || selected_event.get(),
        |id| async move {
            if id == 0 {
                return Ok(String::new());
            }
            event_qr(id).await
        },
    );

    // Signals for the create-event form.
    let new_title = RwSignal::new(String::new());
    let new_mother = RwSignal::new(String::new());
    let new_partner = RwSignal::new(String::new());
    let new_event_date = RwSignal::new(String::new());
    let new_due_date = RwSignal::new(String::new());
    let new_price = RwSignal::new(0i32);
    let new_theme = RwSignal::new("meadow".to_string());
    let new_name_game = RwSignal::new(false);
    let create_error = RwSignal::new(String::new());

    let create_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let title = new_title.get();
        let mother = new_mother.get();
        if title.is_empty() || mother.is_empty() {
            create_error.set("Title and mother's name are required.".to_string());
            return;
        }
        spawn_local(async move {
            match create_event_handler(
                title,
                mother,
                new_partner.get_untracked(),
                new_event_date.get_untracked(),
                new_due_date.get_untracked(),
                new_price.get_untracked(),
                new_theme.get_untracked(),
                new_name_game.get_untracked(),
            )
            .await
            {
                Ok(event) => {
                    create_error.set(String::new());
                    new_title.set(String::new());
                    new_mother.set(String::new());
                    new_partner.set(String::new());
                    selected_event.set(event.id);
                    events_fetcher.refetch();
                }
                Err(e) => create_error.set(e.to_string()),
            }
        });
    };

    // Signals for the birth-outcome form.
    let outcome_date = RwSignal::new(String::new());
    let outcome_hour = RwSignal::new(String::new());
    let outcome_minute = RwSignal::new(String::new());
    let outcome_name = RwSignal::new(String::new());
    let outcome_error = RwSignal::new(String::new());

    let outcome_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let event_id = selected_event.get();
        if event_id == 0 {
            outcome_error.set("Select an event first.".to_string());
            return;
        }
        spawn_local(async move {
            match set_birth_outcome_handler(
                event_id,
                outcome_date.get_untracked(),
                outcome_hour.get_untracked(),
                outcome_minute.get_untracked(),
                outcome_name.get_untracked(),
            )
            .await
            {
                Ok(_) => {
                    outcome_error.set(String::new());
                    events_fetcher.refetch();
                    winners_fetcher.refetch();
                }
                Err(e) => outcome_error.set(e.to_string()),
            }
        });
    };

    let set_payment = move |guess_id: i32, status: String| {
        spawn_local(async move {
            match set_payment_status_handler(guess_id, status).await {
                Ok(_) => {
                    guesses_fetcher.refetch();
                    ledger_fetcher.refetch();
                }
                Err(e) => log!("Error setting payment status: {}", e),
            }
        });
    };

    let remove_guess = move |guess_id: i32| {
        spawn_local(async move {
            match delete_guess_handler(guess_id).await {
                Ok(_) => {
                    guesses_fetcher.refetch();
                    ledger_fetcher.refetch();
                }
                Err(e) => log!("Error deleting guess: {}", e),
            }
        });
    };

    let logout = move |_| {
        spawn_local(async move {
            let _ = host_logout().await;
            let navigate = use_navigate();
            navigate("/", NavigateOptions::default());
        });
    };

    view! {
        <Suspense fallback=|| {
            "Loading..."
        }>
            {move || {
                if let Some(Ok(true)) = is_host_fetcher.get() {
                    view! {
                        <div class="host-container">
                            <header class="host-header">
                                <h1>"Host Dashboard"</h1>
                                <button class="btn-logout" on:click=logout>
                                    "Logout"
                                </button>
                            </header>

                            <section class="host-section">
                                <h2>"Create Event"</h2>
                                <form class="host-form" on:submit=create_submit>
                                    <div class="form-group">
                                        <label>
                                            "Title: "
                                            <input
                                                class="form-input"
                                                type="text"
                                                placeholder="e.g., Dana's Baby Pool"
                                                prop:value=move || new_title.get()
                                                on:input=move |ev| new_title.set(event_target_value(&ev))
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Mother: "
                                            <input
                                                class="form-input"
                                                type="text"
                                                prop:value=move || new_mother.get()
                                                on:input=move |ev| new_mother.set(event_target_value(&ev))
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Partner: "
                                            <input
                                                class="form-input"
                                                type="text"
                                                prop:value=move || new_partner.get()
                                                on:input=move |ev| new_partner.set(event_target_value(&ev))
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Shower date: "
                                            <input
                                                class="form-input"
                                                type="date"
                                                prop:value=move || new_event_date.get()
                                                on:input=move |ev| new_event_date.set(event_target_value(&ev))
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Due date: "
                                            <input
                                                class="form-input"
                                                type="date"
                                                prop:value=move || new_due_date.get()
                                                on:input=move |ev| new_due_date.set(event_target_value(&ev))
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Price per guess (cents): "
                                            <input
                                                class="form-input"
                                                type="number"
                                                prop:value=move || format!("{}", new_price.get())
                                                on:input=move |ev| {
                                                    if let Ok(value) = event_target_value(&ev).parse::<i32>() {
                                                        new_price.set(value);
                                                    }
                                                }
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Theme: "
                                            <input
                                                class="form-input"
                                                type="text"
                                                prop:value=move || new_theme.get()
                                                on:input=move |ev| new_theme.set(event_target_value(&ev))
                                            />
                                        </label>
                                    </div>
                                    <div class="form-group">
                                        <label>
                                            "Name game: "
                                            <input
                                                type="checkbox"
                                                prop:checked=move || new_name_game.get()
                                                on:change=move |ev| {
                                                    new_name_game.set(event_target_checked(&ev))
                                                }
                                            />
                                        </label>
                                    </div>
                                    <button type="submit" class="btn-primary">
                                        "Create"
                                    </button>
                                </form>
                                {move || {
                                    if !create_error.get().is_empty() {
                                        view! { <p class="error">{create_error.get()}</p> }.into_any()
                                    } else {
                                        view! {}.into_any()
                                    }
                                }}
                            </section>

                            <section class="host-section">
                                <h2>"Events"</h2>
                                <div class="table-responsive">
                                    <table class="host-table">
                                        <tbody>
                                            <tr>
                                                <th>"Title"</th>
                                                <th>"Mother"</th>
                                                <th>"Code"</th>
                                                <th>"Due"</th>
                                                <th>"Price"</th>
                                                <th>""</th>
                                            </tr>
                                            <Suspense fallback=|| {
                                                view! {
                                                    <tr>
                                                        <td colspan="6">"Loading..."</td>
                                                    </tr>
                                                }
                                            }>
                                                {move || {
                                                    events_fetcher
                                                        .with(|maybe_result| match maybe_result {
                                                            Some(Ok(events)) => {
                                                                if events.is_empty() {
                                                                    return view! {
                                                                        <tr>
                                                                            <td colspan="6">"No events yet"</td>
                                                                        </tr>
                                                                    }
                                                                        .into_any();
                                                                }
                                                                events
                                                                    .iter()
                                                                    .map(|event| {
                                                                        let id = event.id;
                                                                        view! {
                                                                            <tr>
                                                                                <td>{event.title.clone()}</td>
                                                                                <td>{event.mother_name.clone()}</td>
                                                                                <td>{event.event_code.clone()}</td>
                                                                                <td>{event.due_date.format("%Y-%m-%d").to_string()}</td>
                                                                                <td>{format_price(event.guess_price_cents)}</td>
                                                                                <td>
                                                                                    <button
                                                                                        class="btn-secondary"
                                                                                        on:click=move |_| selected_event.set(id)
                                                                                    >
                                                                                        "Manage"
                                                                                    </button>
                                                                                </td>
                                                                            </tr>
                                                                        }
                                                                    })
                                                                    .collect_view()
                                                                    .into_any()
                                                            }
                                                            _ => {
                                                                view! {
                                                                    <tr>
                                                                        <td colspan="6">"Loading..."</td>
                                                                    </tr>
                                                                }
                                                                    .into_any()
                                                            }
                                                        })
                                                }}
                                            </Suspense>
                                        </tbody>
                                    </table>
                                </div>
                            </section>

                            {move || {
                                (selected_event.get() != 0)
                                    .then(|| {
                                        view! {
                                            <section class="host-section">
                                                <h2>"Invite"</h2>
                                                <button
                                                    class="btn-secondary"
                                                    on:click=move |_| {
                                                        let code = events_fetcher
                                                            .get_untracked()
                                                            .and_then(|res| res.ok())
                                                            .and_then(|events| {
                                                                events
                                                                    .iter()
                                                                    .find(|e| e.id == selected_event.get_untracked())
                                                                    .map(|e| e.event_code.clone())
                                                            });
                                                        let Some(code) = code else {
                                                            return;
                                                        };
                                                        #[cfg(feature = "hydrate")]
                                                        {
                                                            let window = web_sys::window().expect("window");
                                                            let promise =
                                                                window.navigator().clipboard().write_text(&code);
                                                            let future =
                                                                wasm_bindgen_futures::JsFuture::from(promise);
                                                            wasm_bindgen_futures::spawn_local(async move {
                                                                match future.await {
                                                                    Ok(_) => log!("Copied join code"),
                                                                    Err(e) => log!("Clipboard error: {:?}", e),
                                                                }
                                                            });
                                                        }
                                                        #[cfg(not(feature = "hydrate"))]
                                                        let _ = code;
                                                    }
                                                >
                                                    "Copy join code"
                                                </button>
                                                <Suspense fallback=|| {
                                                    view! { "Generating QR..." }
                                                }>
                                                    {move || {
                                                        qr_fetcher
                                                            .with(|res| match res {
                                                                Some(Ok(svg)) => {
                                                                    view! { <div class="qr" inner_html=svg.clone() /> }
                                                                        .into_any()
                                                                }
                                                                _ => view! { "Error generating QR" }.into_any(),
                                                            })
                                                    }}
                                                </Suspense>
                                            </section>

                                            <section class="host-section">
                                                <h2>"Record the Birth"</h2>
                                                <form class="host-form" on:submit=outcome_submit>
                                                    <div class="form-group">
                                                        <label>
                                                            "Birth date: "
                                                            <input
                                                                class="form-input"
                                                                type="date"
                                                                prop:value=move || outcome_date.get()
                                                                on:input=move |ev| outcome_date.set(event_target_value(&ev))
                                                            />
                                                        </label>
                                                    </div>
                                                    <div class="form-group">
                                                        <label>
                                                            "Hour (0-23): "
                                                            <input
                                                                class="form-input"
                                                                type="number"
                                                                prop:value=move || outcome_hour.get()
                                                                on:input=move |ev| outcome_hour.set(event_target_value(&ev))
                                                            />
                                                        </label>
                                                    </div>
                                                    <div class="form-group">
                                                        <label>
                                                            "Minute (0-59): "
                                                            <input
                                                                class="form-input"
                                                                type="number"
                                                                prop:value=move || outcome_minute.get()
                                                                on:input=move |ev| {
                                                                    outcome_minute.set(event_target_value(&ev))
                                                                }
                                                            />
                                                        </label>
                                                    </div>
                                                    <div class="form-group">
                                                        <label>
                                                            "Name: "
                                                            <input
                                                                class="form-input"
                                                                type="text"
                                                                prop:value=move || outcome_name.get()
                                                                on:input=move |ev| outcome_name.set(event_target_value(&ev))
                                                            />
                                                        </label>
                                                    </div>
                                                    <button type="submit" class="btn-primary">
                                                        "Record"
                                                    </button>
                                                </form>
                                                {move || {
                                                    if !outcome_error.get().is_empty() {
                                                        view! { <p class="error">{outcome_error.get()}</p> }
                                                            .into_any()
                                                    } else {
                                                        view! {}.into_any()
                                                    }
                                                }}
                                                <h3>"Winners"</h3>
                                                <Suspense>
                                                    {move || {
                                                        winners_fetcher
                                                            .with(|res| match res {
                                                                Some(Ok(winners)) if !winners.is_empty() => {
                                                                    winners
                                                                        .iter()
                                                                        .map(|w| {
                                                                            view! {
                                                                                <p>
                                                                                    {w.guesser.clone()} " - " {w.kind.to_string()} " - "
                                                                                    {w.value.clone()}
                                                                                </p>
                                                                            }
                                                                        })
                                                                        .collect_view()
                                                                        .into_any()
                                                                }
                                                                Some(Ok(_)) => {
                                                                    view! { <p>"No winners yet."</p> }.into_any()
                                                                }
                                                                _ => view! {}.into_any(),
                                                            })
                                                    }}
                                                </Suspense>
                                            </section>

                                            <section class="host-section">
                                                <h2>"Payment Ledger"</h2>
                                                <div class="table-responsive">
                                                    <table class="host-table">
                                                        <tbody>
                                                            <tr>
                                                                <th>"Guest"</th>
                                                                <th>"Guesses"</th>
                                                                <th>"Pending"</th>
                                                                <th>"Partial"</th>
                                                                <th>"Paid"</th>
                                                                <th>"Owed"</th>
                                                                <th>"Settled"</th>
                                                            </tr>
                                                            <Suspense>
                                                                {move || {
                                                                    ledger_fetcher
                                                                        .with(|res| match res {
                                                                            Some(Ok(ledger)) => {
                                                                                ledger
                                                                                    .iter()
                                                                                    .map(|entry| {
                                                                                        view! {
                                                                                            <tr>
                                                                                                <td>{entry.guesser.clone()}</td>
                                                                                                <td>{entry.guess_count}</td>
                                                                                                <td>{entry.pending_count}</td>
                                                                                                <td>{entry.partial_count}</td>
                                                                                                <td>{entry.paid_count}</td>
                                                                                                <td>{format_price(entry.owed_cents as i32)}</td>
                                                                                                <td>{format_price(entry.settled_cents as i32)}</td>
                                                                                            </tr>
                                                                                        }
                                                                                    })
                                                                                    .collect_view()
                                                                                    .into_any()
                                                                            }
                                                                            _ => view! {}.into_any(),
                                                                        })
                                                                }}
                                                            </Suspense>
                                                        </tbody>
                                                    </table>
                                                </div>
                                            </section>

                                            <section class="host-section">
                                                <h2>"Guesses"</h2>
                                                <div class="table-responsive">
                                                    <table class="host-table">
                                                        <tbody>
                                                            <tr>
                                                                <th>"Guest"</th>
                                                                <th>"Kind"</th>
                                                                <th>"Value"</th>
                                                                <th>"Payment"</th>
                                                                <th>"Actions"</th>
                                                            </tr>
                                                            <Suspense>
                                                                {move || {
                                                                    guesses_fetcher
                                                                        .with(|res| match res {
                                                                            Some(Ok(records)) => {
                                                                                records
                                                                                    .iter()
                                                                                    .map(|record| {
                                                                                        let id = record.id;
                                                                                        view! {
                                                                                            <tr>
                                                                                                <td>{record.guesser.clone()}</td>
                                                                                                <td>{record.kind.to_string()}</td>
                                                                                                <td>{record.value.clone()}</td>
                                                                                                <td>{record.payment.to_string()}</td>
                                                                                                <td>
                                                                                                    <select
                                                                                                        prop:value=record.payment.as_str()
                                                                                                        on:change=move |ev| {
                                                                                                            set_payment(id, event_target_value(&ev))
                                                                                                        }
                                                                                                    >
                                                                                                        <option value="pending">"pending"</option>
                                                                                                        <option value="partial">"partial"</option>
                                                                                                        <option value="paid">"paid"</option>
                                                                                                    </select>
                                                                                                    <button
                                                                                                        class="btn-danger"
                                                                                                        on:click=move |_| remove_guess(id)
                                                                                                    >
                                                                                                        "Delete"
                                                                                                    </button>
                                                                                                </td>
                                                                                            </tr>
                                                                                        }
                                                                                    })
                                                                                    .collect_view()
                                                                                    .into_any()
                                                                            }
                                                                            _ => view! {}.into_any(),
                                                                        })
                                                                }}
                                                            </Suspense>
                                                        </tbody>
                                                    </table>
                                                </div>
                                            </section>
                                        }
                                            .into_any()
                                    })
                            }}
                        </div>
                    }
                        .into_any()
                } else {
                    view! { "Loading..." }.into_any()
                }
            }}
        </Suspense>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "$0.00");
        assert_eq!(format_price(5), "$0.05");
        assert_eq!(format_price(250), "$2.50");
        assert_eq!(format_price(1000), "$10.00");
    }

    #[test]
    fn test_slot_title() {
        assert_eq!(slot_title(&SlotStatus::Available), "Available");
        assert_eq!(
            slot_title(&SlotStatus::Taken {
                guesser: "Sam".to_string(),
                payment: PaymentStatus::Paid,
            }),
            "Sam (paid)"
        );
    }
}

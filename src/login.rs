//! The guest login step machine.
//!
//! `Email -> EventCode | MotherSearch -> NameOnly | UserInfo -> LoggedIn`. Exactly one step is
//! active at any time. Transitions are driven by the `LoginStatus` the backend returns for each
//! request; a failed request records an error and stays on the current step. A status that is
//! not a legal transition from the current step is ignored.

use crate::model::{EventSummary, LoginStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    /// Entry point: the guest identifies themselves by email.
    Email,
    /// The guest types the event code from their invitation.
    EventCode,
    /// Alternative to the code: search events by the mother's name and pick one.
    MotherSearch,
    /// Free event, unknown guest: a name is all we need.
    NameOnly,
    /// Paid event: full contact details (or the missing profile fields).
    UserInfo,
    LoggedIn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginFlow {
    step: LoginStep,
    email: String,
    event: Option<EventSummary>,
    candidates: Vec<EventSummary>,
    profile_only: bool,
    error: Option<String>,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        LoginFlow {
            step: LoginStep::Email,
            email: String::new(),
            event: None,
            candidates: vec![],
            profile_only: false,
            error: None,
        }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// The event the guest is joining, known once the backend has resolved one.
    pub fn event(&self) -> Option<&EventSummary> {
        self.event.as_ref()
    }

    /// Mother-search results to pick from. Only meaningful on `MotherSearch`.
    pub fn candidates(&self) -> &[EventSummary] {
        &self.candidates
    }

    /// On `UserInfo`: true when the guest already exists and only the payment-contact fields are
    /// missing.
    pub fn profile_only(&self) -> bool {
        self.profile_only
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records the email the guest identified with. Does not advance by itself; the backend's
    /// `NeedEvent` answer does.
    pub fn set_email(&mut self, email: &str) {
        self.email = email.trim().to_string();
    }

    /// Applies a backend status. Legal transitions advance and clear any error; everything else
    /// is a no-op.
    pub fn apply(&mut self, status: LoginStatus) {
        use LoginStep::*;

        let next = match (self.step, status) {
            (Email, LoginStatus::NeedEvent) => Some(EventCode),
            (Email | EventCode | MotherSearch, LoginStatus::EventsFound { candidates }) => {
                self.candidates = candidates;
                Some(MotherSearch)
            }
            (EventCode | MotherSearch, LoginStatus::NeedNameOnly { event }) => {
                self.event = Some(event);
                Some(NameOnly)
            }
            (EventCode | MotherSearch, LoginStatus::NeedProfileInfo { event }) => {
                self.event = Some(event);
                self.profile_only = true;
                Some(UserInfo)
            }
            (EventCode | MotherSearch, LoginStatus::NeedUserInfo { event }) => {
                self.event = Some(event);
                self.profile_only = false;
                Some(UserInfo)
            }
            (EventCode | MotherSearch | NameOnly | UserInfo, LoginStatus::LoggedIn) => {
                Some(LoggedIn)
            }
            _ => None,
        };

        if let Some(step) = next {
            self.step = step;
            self.error = None;
        }
    }

    /// A request failed: show the message, stay on the current step.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Back to the landing state, dropping everything gathered so far.
    pub fn reset(&mut self) {
        *self = LoginFlow::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(id: i32, mother: &str) -> EventSummary {
        EventSummary {
            id,
            title: format!("Shower for {}", mother),
            mother_name: mother.to_string(),
            event_code: "ABC123".to_string(),
            event_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            guess_price_cents: 500,
        }
    }

    #[test]
    fn test_event_code_path_to_user_info() {
        let mut flow = LoginFlow::new();
        assert_eq!(flow.step(), LoginStep::Email);

        flow.set_email("  guest@example.com ");
        assert_eq!(flow.email(), "guest@example.com");

        flow.apply(LoginStatus::NeedEvent);
        assert_eq!(flow.step(), LoginStep::EventCode);

        flow.apply(LoginStatus::NeedUserInfo {
            event: summary(1, "Dana"),
        });
        assert_eq!(flow.step(), LoginStep::UserInfo);
        assert!(!flow.profile_only());
        assert_eq!(flow.event().unwrap().id, 1);

        flow.apply(LoginStatus::LoggedIn);
        assert_eq!(flow.step(), LoginStep::LoggedIn);
    }

    #[test]
    fn test_name_only_path() {
        let mut flow = LoginFlow::new();
        flow.apply(LoginStatus::NeedEvent);
        flow.apply(LoginStatus::NeedNameOnly {
            event: summary(2, "Rosa"),
        });
        assert_eq!(flow.step(), LoginStep::NameOnly);

        flow.apply(LoginStatus::LoggedIn);
        assert_eq!(flow.step(), LoginStep::LoggedIn);
    }

    #[test]
    fn test_profile_info_marks_prefill() {
        let mut flow = LoginFlow::new();
        flow.apply(LoginStatus::NeedEvent);
        flow.apply(LoginStatus::NeedProfileInfo {
            event: summary(3, "Mei"),
        });
        assert_eq!(flow.step(), LoginStep::UserInfo);
        assert!(flow.profile_only());
    }

    #[test]
    fn test_mother_search_path() {
        let mut flow = LoginFlow::new();

        // Search is available straight from the email step.
        flow.apply(LoginStatus::EventsFound {
            candidates: vec![summary(1, "Dana"), summary(2, "Rosa")],
        });
        assert_eq!(flow.step(), LoginStep::MotherSearch);
        assert_eq!(flow.candidates().len(), 2);

        // A second search replaces the candidates.
        flow.apply(LoginStatus::EventsFound {
            candidates: vec![summary(2, "Rosa")],
        });
        assert_eq!(flow.step(), LoginStep::MotherSearch);
        assert_eq!(flow.candidates().len(), 1);

        // Picking an event continues through the usual branching.
        flow.apply(LoginStatus::NeedNameOnly {
            event: summary(2, "Rosa"),
        });
        assert_eq!(flow.step(), LoginStep::NameOnly);
    }

    #[test]
    fn test_exactly_one_step_and_illegal_statuses_ignored() {
        let mut flow = LoginFlow::new();

        // LoggedIn straight from Email is not a legal transition.
        flow.apply(LoginStatus::LoggedIn);
        assert_eq!(flow.step(), LoginStep::Email);

        // Nor is a name-only prompt without an event context.
        flow.apply(LoginStatus::NeedNameOnly {
            event: summary(1, "Dana"),
        });
        assert_eq!(flow.step(), LoginStep::Email);
        assert!(flow.event().is_none());

        // NeedEvent once on the code step is a no-op as well.
        flow.apply(LoginStatus::NeedEvent);
        assert_eq!(flow.step(), LoginStep::EventCode);
        flow.apply(LoginStatus::NeedEvent);
        assert_eq!(flow.step(), LoginStep::EventCode);
    }

    #[test]
    fn test_error_stays_on_step_and_clears_on_advance() {
        let mut flow = LoginFlow::new();
        flow.apply(LoginStatus::NeedEvent);

        flow.fail("No event found for that code");
        assert_eq!(flow.step(), LoginStep::EventCode);
        assert_eq!(flow.error(), Some("No event found for that code"));

        // A later successful transition clears the error.
        flow.apply(LoginStatus::NeedUserInfo {
            event: summary(1, "Dana"),
        });
        assert_eq!(flow.step(), LoginStep::UserInfo);
        assert!(flow.error().is_none());
    }

    #[test]
    fn test_reset() {
        let mut flow = LoginFlow::new();
        flow.set_email("guest@example.com");
        flow.apply(LoginStatus::NeedEvent);
        flow.fail("nope");

        flow.reset();
        assert_eq!(flow, LoginFlow::new());
    }
}

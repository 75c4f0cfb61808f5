//! Commands addressed to a switch.

use crate::id::SwitchId;

/// What a command asks a switch to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Activate,
    Deactivate,
}

impl Action {
    /// Parse a command payload.
    ///
    /// Surrounding ASCII whitespace is ignored and matching is
    /// case-insensitive. Returns `None` for anything but `on` / `off`.
    #[must_use]
    pub fn from_payload(payload: &str) -> Option<Self> {
        let token = payload.trim_matches(|c: char| c.is_ascii_whitespace());
        if token.eq_ignore_ascii_case("on") {
            Some(Self::Activate)
        } else if token.eq_ignore_ascii_case("off") {
            Some(Self::Deactivate)
        } else {
            None
        }
    }
}

/// A decoded command for one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub switch_id: SwitchId,
    pub action: Action,
}

impl Command {
    #[must_use]
    pub fn new(switch_id: SwitchId, action: Action) -> Self {
        Self { switch_id, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_on_case_insensitively() {
        assert_eq!(Action::from_payload("on"), Some(Action::Activate));
        assert_eq!(Action::from_payload("ON"), Some(Action::Activate));
        assert_eq!(Action::from_payload("On"), Some(Action::Activate));
    }

    #[test]
    fn should_parse_off_case_insensitively() {
        assert_eq!(Action::from_payload("off"), Some(Action::Deactivate));
        assert_eq!(Action::from_payload("OFF"), Some(Action::Deactivate));
    }

    #[test]
    fn should_ignore_trailing_newline() {
        assert_eq!(Action::from_payload("on\n"), Some(Action::Activate));
        assert_eq!(Action::from_payload(" off\r\n"), Some(Action::Deactivate));
    }

    #[test]
    fn should_reject_unknown_payloads() {
        assert_eq!(Action::from_payload(""), None);
        assert_eq!(Action::from_payload("toggle"), None);
        assert_eq!(Action::from_payload("onn"), None);
        assert_eq!(Action::from_payload("1"), None);
    }
}

//! User-facing flows built on the device session.
//!
//! Each submodule covers one screen of the web client: speech generation, pricing and
//! checkout, and the payment-success refresh.

pub mod generate;
pub mod pricing;
pub mod success;

use crate::session::Session;

/// Print the device id and its balance.
pub fn print_status(session: &Session) {
    print!("{}", format_status(session));
}

/// Render the status lines. A balance no status fetch has backed is flagged as such.
pub fn format_status(session: &Session) -> String {
    let unconfirmed = if session.is_confirmed { "" } else { " (not yet confirmed)" };
    format!(
        "Device:     {}{}\nRemaining:  {} generation(s){}\nPremium:    {}{}\n",
        session.device_id,
        if session.is_fallback { " (fallback)" } else { "" },
        session.tokens_remaining,
        unconfirmed,
        if session.is_premium { "yes" } else { "no" },
        unconfirmed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_marks_placeholder_balance() {
        let session = Session { device_id: "abc123".into(), is_initialized: true, ..Session::default() };
        let status = format_status(&session);
        assert!(status.contains("Remaining:  5 generation(s) (not yet confirmed)"));
        assert!(status.contains("Premium:    no (not yet confirmed)"));
    }

    #[test]
    fn test_status_after_confirmed_fetch() {
        let session = Session {
            device_id: "abc123".into(),
            tokens_remaining: 12,
            is_premium: true,
            is_initialized: true,
            is_confirmed: true,
            ..Session::default()
        };
        assert_eq!(format_status(&session), "Device:     abc123\nRemaining:  12 generation(s)\nPremium:    yes\n");
    }

    #[test]
    fn test_status_marks_fallback_device() {
        let session = Session { device_id: "fallback-a1b2c3d4".into(), is_fallback: true, ..Session::default() };
        assert!(format_status(&session).starts_with("Device:     fallback-a1b2c3d4 (fallback)\n"));
    }
}

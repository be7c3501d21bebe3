//! Static lookup tables for numeric device codes.
//!
//! Pure data: translates inverter status and error codes into
//! human-readable strings. Unknown codes yield a formatted fallback.

use std::borrow::Cow;

/// Operating state reported in `DeviceStatus.StatusCode`.
pub fn status_text(code: i64) -> Cow<'static, str> {
    match code {
        0..=6 => Cow::Borrowed("Startup"),
        7 => Cow::Borrowed("Running"),
        8 => Cow::Borrowed("Standby"),
        9 => Cow::Borrowed("Bootloading"),
        10 => Cow::Borrowed("Error"),
        11 => Cow::Borrowed("Idle"),
        12 => Cow::Borrowed("Ready"),
        13 => Cow::Borrowed("Sleeping"),
        _ => Cow::Owned(format!("Unknown status code {}", code)),
    }
}

/// Fault reported in `DeviceStatus.ErrorCode`. Zero means no error.
pub fn error_text(code: i64) -> Cow<'static, str> {
    match code {
        0 => Cow::Borrowed("No error"),
        102 => Cow::Borrowed("AC voltage too high"),
        103 => Cow::Borrowed("AC voltage too low"),
        105 => Cow::Borrowed("AC frequency too high"),
        106 => Cow::Borrowed("AC frequency too low"),
        107 => Cow::Borrowed("AC grid outside the permissible limits"),
        108 => Cow::Borrowed("Stand alone operation detected"),
        240 => Cow::Borrowed("Arc detected"),
        241 => Cow::Borrowed("Arc detection self-test failed"),
        301 => Cow::Borrowed("Overcurrent AC"),
        302 => Cow::Borrowed("Overcurrent DC"),
        303 => Cow::Borrowed("DC module over temperature"),
        304 => Cow::Borrowed("AC module over temperature"),
        306 => Cow::Borrowed("Power low - DC input below limit"),
        307 => Cow::Borrowed("DC input voltage too low for feed-in"),
        401 => Cow::Borrowed("No communication with power stage"),
        509 => Cow::Borrowed("No energy fed into the grid in the last 24 hours"),
        522 => Cow::Borrowed("DC input 1 voltage too low"),
        523 => Cow::Borrowed("DC input 2 voltage too low"),
        567 => Cow::Borrowed("Grid frequency too low"),
        _ => Cow::Owned(format!("Unknown error code {}", code)),
    }
}

//! Binary trial responses and their parsing from host-side encodings.
//!
//! Hosts record responses as button labels, booleans, or 0/1 integers. All of
//! them funnel through [`Response`]; anything else is rejected with
//! [`ADOError::InvalidResponse`] before it can reach the posterior.
use std::str::FromStr;

use crate::ado::errors::{ADOError, ADOResult};

/// Observed response on a single trial.
///
/// `Clear` is the "positive" category whose probability the psychometric
/// function models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Response {
    Clear,
    NotClear,
}

impl Response {
    /// `true` for [`Response::Clear`].
    pub fn is_clear(self) -> bool {
        matches!(self, Response::Clear)
    }

    /// 1 for clear, 0 for not clear (the encoding used in exported trial data).
    pub fn as_u8(self) -> u8 {
        match self {
            Response::Clear => 1,
            Response::NotClear => 0,
        }
    }

    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            Response::Clear => "clear",
            Response::NotClear => "not_clear",
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<bool> for Response {
    fn from(clear: bool) -> Self {
        if clear { Response::Clear } else { Response::NotClear }
    }
}

impl TryFrom<i64> for Response {
    type Error = ADOError;

    fn try_from(value: i64) -> ADOResult<Self> {
        match value {
            1 => Ok(Response::Clear),
            0 => Ok(Response::NotClear),
            other => Err(ADOError::InvalidResponse { value: other.to_string() }),
        }
    }
}

impl FromStr for Response {
    type Err = ADOError;

    /// Parse a response label (case-insensitive, surrounding whitespace ignored).
    ///
    /// Accepts `clear | yes | y | true | 1` and
    /// `not_clear | not clear | not-clear | notclear | unclear | no | n | false | 0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" | "yes" | "y" | "true" | "1" => Ok(Response::Clear),
            "not_clear" | "not clear" | "not-clear" | "notclear" | "unclear" | "no" | "n"
            | "false" | "0" => Ok(Response::NotClear),
            _ => Err(ADOError::InvalidResponse { value: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("Clear".parse::<Response>(), Ok(Response::Clear));
        assert_eq!("  YES ".parse::<Response>(), Ok(Response::Clear));
        assert_eq!("not_clear".parse::<Response>(), Ok(Response::NotClear));
        assert_eq!("Not Clear".parse::<Response>(), Ok(Response::NotClear));
        assert_eq!("0".parse::<Response>(), Ok(Response::NotClear));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        match "maybe".parse::<Response>() {
            Err(ADOError::InvalidResponse { value }) => assert_eq!(value, "maybe"),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
        assert!("".parse::<Response>().is_err());
    }

    #[test]
    fn integers_outside_zero_one_are_rejected() {
        assert_eq!(Response::try_from(1), Ok(Response::Clear));
        assert_eq!(Response::try_from(0), Ok(Response::NotClear));
        assert!(matches!(Response::try_from(2), Err(ADOError::InvalidResponse { .. })));
        assert!(matches!(Response::try_from(-1), Err(ADOError::InvalidResponse { .. })));
    }

    #[test]
    fn encodings_round_trip_through_bool() {
        for r in [Response::Clear, Response::NotClear] {
            assert_eq!(Response::from(r.is_clear()), r);
            assert_eq!(Response::try_from(r.as_u8() as i64), Ok(r));
        }
    }
}

//! Status values declared with `status "#msg"` or `status "@msg"`.

use std::fmt;

#[cfg(test)]
mod tests;

/// The outcome a function reports.
///
/// Errors are fatal for the current operation. Suspensions ask the caller
/// to supply more input or output room and retry.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    Ok,
    Error(String),
    Suspension(String),
}

impl Status {
    /// Parse the unquoted text of a status literal. `None` if the sigil is
    /// neither `#` nor `@`, or the message is empty.
    pub fn parse(text: &str) -> Option<Status> {
        let mut chars = text.chars();
        let sigil = chars.next()?;
        let message = chars.as_str();
        if message.is_empty() {
            return None;
        }
        match sigil {
            '#' => Some(Status::Error(message.to_owned())),
            '@' => Some(Status::Suspension(message.to_owned())),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Ok => "",
            Status::Error(m) | Status::Suspension(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn is_suspension(&self) -> bool {
        matches!(self, Status::Suspension(_))
    }
}

/// Renders the source form, sigil included, without quotes.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => Ok(()),
            Status::Error(m) => write!(f, "#{m}"),
            Status::Suspension(m) => write!(f, "@{m}"),
        }
    }
}

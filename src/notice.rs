//! Transient status messages shown after a save or a form submission.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a success notice stays visible.
pub const SUCCESS_TTL_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A success message dismisses itself; an error stays until dismissed and
/// invites a retry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub retryable: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notice {
    pub fn success(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            retryable: false,
            created_at: now,
            expires_at: Some(now + Duration::seconds(SUCCESS_TTL_SECS)),
        }
    }

    pub fn error(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            retryable: true,
            created_at: now,
            expires_at: None,
        }
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Drop `notice` once it has expired.
pub fn prune(notice: &mut Option<Notice>, now: DateTime<Utc>) {
    if notice.as_ref().is_some_and(|n| !n.is_visible(now)) {
        *notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_expires_after_three_seconds() {
        let now = Utc::now();
        let notice = Notice::success("Salvo", now);
        assert!(notice.is_visible(now + Duration::milliseconds(2999)));
        assert!(!notice.is_visible(now + Duration::seconds(3)));
        assert!(!notice.retryable);
    }

    #[test]
    fn test_error_stays_until_dismissed() {
        let now = Utc::now();
        let notice = Notice::error("Falhou", now);
        assert!(notice.is_visible(now + Duration::hours(1)));
        assert!(notice.retryable);
        assert!(notice.is_error());
    }

    #[test]
    fn test_prune_clears_expired() {
        let now = Utc::now();
        let mut notice = Some(Notice::success("ok", now));
        prune(&mut notice, now + Duration::seconds(1));
        assert!(notice.is_some());
        prune(&mut notice, now + Duration::seconds(5));
        assert!(notice.is_none());
    }
}

//! Maps a review verdict to the session-control action.

use crate::verdict::{ReviewStatus, ReviewVerdict};

/// The engine's final word on whether the session may stop. Exactly one of
/// allow or block applies; `block_reason` is set iff `allow_stop` is false.
#[derive(Debug, Clone)]
pub struct SessionControl {
    pub allow_stop: bool,
    pub block_reason: Option<String>,
    pub status_line: String,
}

impl SessionControl {
    pub fn allow(status_line: impl Into<String>) -> Self {
        Self {
            allow_stop: true,
            block_reason: None,
            status_line: status_line.into(),
        }
    }

    pub fn block(reason: impl Into<String>, status_line: impl Into<String>) -> Self {
        Self {
            allow_stop: false,
            block_reason: Some(reason.into()),
            status_line: status_line.into(),
        }
    }
}

/// Pure, total mapping from verdict status to session control. When the host
/// is already re-invoking after a prior block (`stop_hook_active`), every
/// status collapses to allow so the host is never looped indefinitely.
pub fn decide(verdict: &ReviewVerdict, stop_hook_active: bool) -> SessionControl {
    if stop_hook_active {
        return SessionControl::allow(format!("review summary: {}", verdict.message));
    }

    match verdict.status {
        ReviewStatus::OnTrack => SessionControl::allow(format!("on track: {}", verdict.message)),
        ReviewStatus::Deviation => SessionControl::block(
            format!(
                "Deviation detected: {} Realign the changes with the active task's requirements before stopping.",
                verdict.message
            ),
            format!("deviation detected: {}", verdict.message),
        ),
        ReviewStatus::NeedsVerification => SessionControl::block(
            format!(
                "Verification needed: {} Run the relevant tests or otherwise verify the claimed behavior before stopping.",
                verdict.message
            ),
            format!("needs verification: {}", verdict.message),
        ),
        ReviewStatus::CriticalFailure => SessionControl::allow(format!(
            "CRITICAL FAILURE: {} Stopping now; continuing would risk making things worse. Manual review recommended.",
            verdict.message
        )),
        ReviewStatus::ReviewFailed => SessionControl::allow(format!(
            "warning: review unavailable ({}); work was committed so nothing is lost",
            verdict.message
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ReviewStatus; 5] = [
        ReviewStatus::OnTrack,
        ReviewStatus::Deviation,
        ReviewStatus::NeedsVerification,
        ReviewStatus::CriticalFailure,
        ReviewStatus::ReviewFailed,
    ];

    fn verdict(status: ReviewStatus) -> ReviewVerdict {
        ReviewVerdict {
            status,
            message: "msg".to_string(),
            commit_message: String::new(),
            details: None,
        }
    }

    #[test]
    fn every_status_maps_to_the_expected_shape() {
        for status in ALL_STATUSES {
            let control = decide(&verdict(status), false);
            let expect_block = matches!(
                status,
                ReviewStatus::Deviation | ReviewStatus::NeedsVerification
            );
            assert_eq!(control.allow_stop, !expect_block, "{status:?}");
            assert_eq!(control.block_reason.is_some(), expect_block, "{status:?}");
            assert!(!control.status_line.is_empty(), "{status:?}");
        }
    }

    #[test]
    fn forced_continuation_always_allows_stop() {
        for status in ALL_STATUSES {
            let control = decide(&verdict(status), true);
            assert!(control.allow_stop, "{status:?}");
            assert!(control.block_reason.is_none(), "{status:?}");
        }
    }

    #[test]
    fn deviation_reason_instructs_realignment() {
        let control = decide(&verdict(ReviewStatus::Deviation), false);
        let reason = control.block_reason.unwrap();
        assert!(reason.contains("Realign"));
    }

    #[test]
    fn needs_verification_reason_instructs_testing() {
        let control = decide(&verdict(ReviewStatus::NeedsVerification), false);
        let reason = control.block_reason.unwrap();
        assert!(reason.contains("verify") || reason.contains("tests"));
    }
}

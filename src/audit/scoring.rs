//! Report score and terminal status

use crate::models::ReportStatus;

/// Points lost per critical issue
pub const CRITICAL_PENALTY: u32 = 20;
/// Points lost per major issue
pub const MAJOR_PENALTY: u32 = 10;

/// `max(0, 100 - 20 * critical - 10 * major)`
pub fn score(critical: usize, major: usize) -> u8 {
    let penalty = (critical as u32)
        .saturating_mul(CRITICAL_PENALTY)
        .saturating_add((major as u32).saturating_mul(MAJOR_PENALTY));
    100u32.saturating_sub(penalty) as u8
}

/// 0 critical: ready, 1-2: needs fixes, 3 or more: major revision.
/// Only critical issues move the status.
pub fn status(critical: usize) -> ReportStatus {
    match critical {
        0 => ReportStatus::Ready,
        1 | 2 => ReportStatus::NeedsFixes,
        _ => ReportStatus::MajorRevision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score() {
        assert_eq!(score(0, 0), 100);
        assert_eq!(score(2, 0), 60);
        assert_eq!(score(1, 3), 50);
        assert_eq!(score(5, 1), 0);
        assert_eq!(score(usize::MAX, usize::MAX), 0);
    }

    #[test]
    fn test_status_cut_points() {
        assert_eq!(status(0), ReportStatus::Ready);
        assert_eq!(status(1), ReportStatus::NeedsFixes);
        assert_eq!(status(2), ReportStatus::NeedsFixes);
        assert_eq!(status(3), ReportStatus::MajorRevision);
        assert_eq!(status(9), ReportStatus::MajorRevision);
    }
}

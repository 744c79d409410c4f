// RoboTrace - core/labels.rs
//
// Value translation: raw drive/charge status codes to display labels.
// Pure lookups; unknown codes never fail and keep the raw code text.

use crate::core::model::{format_number, CellValue};
use std::fmt;

// =============================================================================
// Drive state
// =============================================================================

/// Robot motion state, decoded from the integer drive status code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DriveState {
    Stopped,
    Running,
    Completed,
    Cancelled,
    ObstacleDetour,
    Failed,
    PlatformStop,
    UiStop,
    EmergencyStop,
    Undrivable,
    PlatformStopReleased,
    Manual,
    MapSwitch,
    Queueing,
    /// Any code outside the table, carrying the raw code text verbatim.
    Unknown(String),
}

impl DriveState {
    /// Decode a numeric drive status code.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Stopped,
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            4 => Self::ObstacleDetour,
            5 => Self::Failed,
            6 => Self::PlatformStop,
            8 => Self::UiStop,
            9 => Self::EmergencyStop,
            12 => Self::Undrivable,
            13 => Self::PlatformStopReleased,
            14 => Self::Manual,
            15 => Self::MapSwitch,
            16 => Self::Queueing,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Decode a raw cell. Non-integral or non-numeric input becomes
    /// `Unknown` with the coerced number text (`NaN` for garbage).
    pub fn from_cell(cell: &CellValue) -> Self {
        let n = cell.as_number();
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
            Self::from_code(n as i64)
        } else {
            Self::Unknown(format_number(n))
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        let fixed = match self {
            Self::Stopped => "대기(Stop)",
            Self::Running => "주행중(Run)",
            Self::Completed => "주행 완료",
            Self::Cancelled => "주행 취소",
            Self::ObstacleDetour => "장애물 감지 (경로 변경)",
            Self::Failed => "주행 실패",
            Self::PlatformStop => "플랫폼 요청에 의한 정지",
            Self::UiStop => "UI 정지",
            Self::EmergencyStop => "비상버튼 정지",
            Self::Undrivable => "주행 불가",
            Self::PlatformStopReleased => "플랫폼 정지 해제",
            Self::Manual => "수동 주행",
            Self::MapSwitch => "맵 전환",
            Self::Queueing => "줄서기",
            Self::Unknown(code) => return unknown_label(code),
        };
        fixed.to_string()
    }
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// =============================================================================
// Charge state
// =============================================================================

/// Charging flag, decoded from a boolean-like value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChargeState {
    Charging,
    NotCharging,
    /// Anything other than true/false, carrying the lowercased key.
    Unknown(String),
}

impl ChargeState {
    /// Decode a charge key. Matching is case-insensitive.
    pub fn from_key(raw: &str) -> Self {
        let key = raw.to_lowercase();
        match key.as_str() {
            "true" => Self::Charging,
            "false" => Self::NotCharging,
            _ => Self::Unknown(key),
        }
    }

    pub fn from_cell(cell: &CellValue) -> Self {
        Self::from_key(&cell.to_string())
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::Charging => "충전중".to_string(),
            Self::NotCharging => "미충전".to_string(),
            Self::Unknown(key) => unknown_label(key),
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn unknown_label(code: &str) -> String {
    format!("unknown({code})")
}

// =============================================================================
// Free-function lookups
// =============================================================================

/// Label for an integer drive status code.
pub fn drive_label(code: i64) -> String {
    DriveState::from_code(code).label()
}

/// Label for a boolean-like charge value (`true`, `"TRUE"`, `"false"`, ...).
pub fn charge_label(raw: &CellValue) -> String {
    ChargeState::from_cell(raw).label()
}

/// Every known drive code, in table order.
pub const KNOWN_DRIVE_CODES: &[i64] = &[0, 1, 2, 3, 4, 5, 6, 8, 9, 12, 13, 14, 15, 16];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_drive_codes_have_fixed_labels() {
        let expected = [
            (0, "대기(Stop)"),
            (1, "주행중(Run)"),
            (2, "주행 완료"),
            (3, "주행 취소"),
            (4, "장애물 감지 (경로 변경)"),
            (5, "주행 실패"),
            (6, "플랫폼 요청에 의한 정지"),
            (8, "UI 정지"),
            (9, "비상버튼 정지"),
            (12, "주행 불가"),
            (13, "플랫폼 정지 해제"),
            (14, "수동 주행"),
            (15, "맵 전환"),
            (16, "줄서기"),
        ];
        assert_eq!(expected.len(), KNOWN_DRIVE_CODES.len());
        for (code, label) in expected {
            assert_eq!(drive_label(code), label, "code {code}");
        }
    }

    #[test]
    fn test_unknown_drive_codes_keep_code_verbatim() {
        for code in [-1, 7, 10, 11, 17, 999] {
            assert_eq!(drive_label(code), format!("unknown({code})"));
        }
    }

    #[test]
    fn test_drive_from_cell_text_and_garbage() {
        assert_eq!(DriveState::from_cell(&CellValue::Text("2".into())), DriveState::Completed);
        assert_eq!(
            DriveState::from_cell(&CellValue::Number(1.5)).label(),
            "unknown(1.5)"
        );
        assert_eq!(
            DriveState::from_cell(&CellValue::Text("run".into())).label(),
            "unknown(NaN)"
        );
        assert_eq!(DriveState::from_cell(&CellValue::Empty).label(), "unknown(NaN)");
    }

    #[test]
    fn test_charge_label_is_case_insensitive() {
        let upper = charge_label(&CellValue::Text("TRUE".into()));
        let lower = charge_label(&CellValue::Text("true".into()));
        let boolean = charge_label(&CellValue::Bool(true));
        assert_eq!(upper, "충전중");
        assert_eq!(upper, lower);
        assert_eq!(lower, boolean);
        assert_eq!(charge_label(&CellValue::Text("False".into())), "미충전");
    }

    #[test]
    fn test_charge_unknown_values() {
        assert_eq!(charge_label(&CellValue::Number(1.0)), "unknown(1)");
        assert_eq!(charge_label(&CellValue::Text("Yes".into())), "unknown(yes)");
        assert_eq!(charge_label(&CellValue::Empty), "unknown(-)");
    }
}

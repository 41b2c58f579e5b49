//! Lights — what hangs behind each window of the model and how to reach it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp attached to light change notifications.
pub type Timestamp = DateTime<Utc>;

/// Output line of an MCP23017 expander: two 8-bit ports, `A` and `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pin {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
}

impl Pin {
    /// Every line of a board, port `A` first.
    pub const ALL: [Self; 16] = [
        Self::A0,
        Self::A1,
        Self::A2,
        Self::A3,
        Self::A4,
        Self::A5,
        Self::A6,
        Self::A7,
        Self::B0,
        Self::B1,
        Self::B2,
        Self::B3,
        Self::B4,
        Self::B5,
        Self::B6,
        Self::B7,
    ];

    /// The line name as printed on the board (`"A0"` … `"B7"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A0 => "A0",
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::A6 => "A6",
            Self::A7 => "A7",
            Self::B0 => "B0",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::B3 => "B3",
            Self::B4 => "B4",
            Self::B5 => "B5",
            Self::B6 => "B6",
            Self::B7 => "B7",
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a valid line name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pin {0:?}")]
pub struct ParsePinError(pub String);

impl FromStr for Pin {
    type Err = ParsePinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pin| pin.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePinError(s.to_string()))
    }
}

/// Hardware address of a single light: expander board + output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightAddress {
    /// I²C address of the expander board.
    pub board: u8,
    pub pin: Pin,
}

impl LightAddress {
    #[must_use]
    pub const fn new(board: u8, pin: Pin) -> Self {
        Self { board, pin }
    }
}

impl fmt::Display for LightAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}/{}", self.board, self.pin)
    }
}

/// What a light represents in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    /// Porch light over the entrance; always on while the live flow runs.
    ServiceEntrance,
    /// Landing light in the stairwell between flats.
    ServiceNoManLand,
    ShortWindow,
    LongWindow,
    /// Painted wall segment with no bulb behind it.
    WallStub,
}

impl LightKind {
    /// Shared lights owned by no unit.
    #[must_use]
    pub fn is_service(self) -> bool {
        matches!(self, Self::ServiceEntrance | Self::ServiceNoManLand)
    }

    #[must_use]
    pub fn is_window(self) -> bool {
        matches!(self, Self::ShortWindow | Self::LongWindow)
    }
}

/// Facade a light faces. Only used for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Left,
    Right,
}

/// A single light of the building map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    /// Owning unit (flat) number; `0` means the light belongs to no unit.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub side: Side,
    pub kind: LightKind,
    /// Hardware address; always `None` for [`LightKind::WallStub`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<LightAddress>,
}

impl Light {
    /// Address to drive, or `None` for lights that must never reach hardware.
    #[must_use]
    pub fn hardware_address(&self) -> Option<LightAddress> {
        match self.kind {
            LightKind::WallStub => None,
            _ => self.addr,
        }
    }
}

/// Change notification broadcast by a lights controller after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinState {
    pub addr: LightAddress,
    pub is_on: bool,
    pub at: Timestamp,
}

impl PinState {
    #[must_use]
    pub fn now(addr: LightAddress, is_on: bool) -> Self {
        Self {
            addr,
            is_on,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_pin_case_insensitively() {
        assert_eq!("a3".parse::<Pin>().unwrap(), Pin::A3);
        assert_eq!("B7".parse::<Pin>().unwrap(), Pin::B7);
    }

    #[test]
    fn should_reject_unknown_pin() {
        let err = "C1".parse::<Pin>().unwrap_err();
        assert_eq!(err, ParsePinError("C1".to_string()));
    }

    #[test]
    fn should_list_sixteen_distinct_pins() {
        let mut pins = Pin::ALL.to_vec();
        pins.dedup();
        assert_eq!(pins.len(), 16);
    }

    #[test]
    fn should_display_address_with_hex_board() {
        let addr = LightAddress::new(0x25, Pin::A1);
        assert_eq!(addr.to_string(), "0x25/A1");
    }

    #[test]
    fn should_serialize_address_with_pin_name() {
        let addr = LightAddress::new(32, Pin::B2);
        let json = serde_json::to_value(addr).unwrap();
        assert_eq!(json, serde_json::json!({"board": 32, "pin": "B2"}));
    }

    #[test]
    fn should_hide_address_of_wall_stub() {
        let stub = Light {
            number: 3,
            side: Side::Front,
            kind: LightKind::WallStub,
            addr: Some(LightAddress::new(0x20, Pin::A0)),
        };
        assert_eq!(stub.hardware_address(), None);
    }

    #[test]
    fn should_expose_address_of_window() {
        let addr = LightAddress::new(0x20, Pin::A0);
        let window = Light {
            number: 3,
            side: Side::Left,
            kind: LightKind::LongWindow,
            addr: Some(addr),
        };
        assert_eq!(window.hardware_address(), Some(addr));
    }

    #[test]
    fn should_classify_kinds() {
        assert!(LightKind::ServiceEntrance.is_service());
        assert!(LightKind::ServiceNoManLand.is_service());
        assert!(!LightKind::ShortWindow.is_service());
        assert!(LightKind::ShortWindow.is_window());
        assert!(LightKind::LongWindow.is_window());
        assert!(!LightKind::WallStub.is_window());
    }

    #[test]
    fn should_deserialize_light_with_defaults() {
        let light: Light = serde_json::from_value(serde_json::json!({
            "kind": "service_no_man_land",
            "addr": {"board": 37, "pin": "A2"}
        }))
        .unwrap();
        assert_eq!(light.number, 0);
        assert_eq!(light.side, Side::Front);
        assert_eq!(light.kind, LightKind::ServiceNoManLand);
    }
}

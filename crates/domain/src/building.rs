//! Building map — the static layout of every light in the model.
//!
//! Levels are ordered ground floor first; lights within a level are ordered
//! left to right as seen from the street. The map is loaded once at startup
//! and shared read-only by all flows.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::light::{Light, LightAddress, LightKind};

/// One floor of the building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub lights: Vec<Light>,
}

/// Static layout: levels → lights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingMap {
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl BuildingMap {
    /// Build a map from raw levels.
    #[must_use]
    pub fn new(levels: Vec<Vec<Light>>) -> Self {
        Self {
            levels: levels.into_iter().map(|lights| Level { lights }).collect(),
        }
    }

    fn lights(&self) -> impl Iterator<Item = &Light> {
        self.levels.iter().flat_map(|level| level.lights.iter())
    }

    /// Distinct occupancy unit numbers, ascending. Unit `0` is excluded.
    #[must_use]
    pub fn units(&self) -> Vec<u32> {
        self.lights()
            .filter(|light| light.kind.is_window() && light.number != 0)
            .map(|light| light.number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Addresses of the unit's window lights, in map order. Wall stubs are skipped.
    #[must_use]
    pub fn windows_of(&self, unit: u32) -> Vec<LightAddress> {
        self.lights()
            .filter(|light| light.number == unit && light.kind.is_window())
            .filter_map(Light::hardware_address)
            .collect()
    }

    /// Addresses of every light of the given kind, in map order.
    #[must_use]
    pub fn addresses_of_kind(&self, kind: LightKind) -> Vec<LightAddress> {
        self.lights()
            .filter(|light| light.kind == kind)
            .filter_map(Light::hardware_address)
            .collect()
    }

    /// Every addressable light, in map order.
    #[must_use]
    pub fn addresses(&self) -> Vec<LightAddress> {
        self.lights().filter_map(Light::hardware_address).collect()
    }

    /// Look up the light wired to `addr`.
    #[must_use]
    pub fn light_at(&self, addr: LightAddress) -> Option<&Light> {
        self.lights()
            .find(|light| light.hardware_address() == Some(addr))
    }

    /// Distinct boards referenced by the map, ascending.
    #[must_use]
    pub fn boards(&self) -> Vec<u8> {
        self.addresses()
            .into_iter()
            .map(|addr| addr.board)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Check the map's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, scanning levels in order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lights().next().is_none() {
            return Err(ValidationError::EmptyBuilding);
        }

        let mut seen = HashSet::new();
        for (level, lights) in self.levels.iter().enumerate() {
            for (position, light) in lights.lights.iter().enumerate() {
                match (light.kind, light.addr) {
                    (LightKind::WallStub, Some(_)) => {
                        return Err(ValidationError::AddressedStub { level, position });
                    }
                    (LightKind::WallStub, None) => continue,
                    (_, None) => {
                        return Err(ValidationError::MissingAddress { level, position });
                    }
                    (kind, Some(addr)) => {
                        if kind.is_service() && light.number != 0 {
                            return Err(ValidationError::OwnedServiceLight {
                                level,
                                position,
                                number: light.number,
                            });
                        }
                        if kind.is_window() && light.number == 0 {
                            return Err(ValidationError::UnownedWindow { level, position });
                        }
                        if !seen.insert(addr) {
                            return Err(ValidationError::DuplicateAddress(addr));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{Pin, Side};

    fn light(number: u32, kind: LightKind, addr: Option<LightAddress>) -> Light {
        Light {
            number,
            side: Side::Front,
            kind,
            addr,
        }
    }

    fn at(pin: Pin) -> Option<LightAddress> {
        Some(LightAddress::new(0x20, pin))
    }

    // e w(1) _(1) w(1)
    // s w(2) _(2) w(2)
    fn two_level_map() -> BuildingMap {
        BuildingMap::new(vec![
            vec![
                light(0, LightKind::ServiceEntrance, at(Pin::A0)),
                light(1, LightKind::ShortWindow, at(Pin::A1)),
                light(1, LightKind::WallStub, None),
                light(1, LightKind::LongWindow, at(Pin::A2)),
            ],
            vec![
                light(0, LightKind::ServiceNoManLand, at(Pin::A3)),
                light(2, LightKind::ShortWindow, at(Pin::A4)),
                light(2, LightKind::WallStub, None),
                light(2, LightKind::ShortWindow, at(Pin::A5)),
            ],
        ])
    }

    #[test]
    fn should_list_units_without_zero() {
        assert_eq!(two_level_map().units(), vec![1, 2]);
    }

    #[test]
    fn should_return_windows_of_unit_skipping_stubs() {
        let map = two_level_map();
        assert_eq!(
            map.windows_of(1),
            vec![
                LightAddress::new(0x20, Pin::A1),
                LightAddress::new(0x20, Pin::A2)
            ]
        );
    }

    #[test]
    fn should_return_no_windows_for_unknown_unit() {
        assert!(two_level_map().windows_of(42).is_empty());
    }

    #[test]
    fn should_find_service_lights_by_kind() {
        let map = two_level_map();
        assert_eq!(
            map.addresses_of_kind(LightKind::ServiceNoManLand),
            vec![LightAddress::new(0x20, Pin::A3)]
        );
        assert_eq!(
            map.addresses_of_kind(LightKind::ServiceEntrance),
            vec![LightAddress::new(0x20, Pin::A0)]
        );
    }

    #[test]
    fn should_list_all_addresses_in_map_order() {
        let map = two_level_map();
        assert_eq!(map.addresses().len(), 6);
        assert_eq!(map.addresses()[0], LightAddress::new(0x20, Pin::A0));
    }

    #[test]
    fn should_find_light_by_address() {
        let map = two_level_map();
        let found = map.light_at(LightAddress::new(0x20, Pin::A4)).unwrap();
        assert_eq!(found.number, 2);
        assert!(map.light_at(LightAddress::new(0x21, Pin::A4)).is_none());
    }

    #[test]
    fn should_list_distinct_boards() {
        let mut map = two_level_map();
        map.levels[1].lights[1].addr = Some(LightAddress::new(0x22, Pin::A4));
        assert_eq!(map.boards(), vec![0x20, 0x22]);
    }

    #[test]
    fn should_accept_valid_map() {
        assert!(two_level_map().validate().is_ok());
    }

    #[test]
    fn should_reject_empty_map() {
        assert_eq!(
            BuildingMap::default().validate(),
            Err(ValidationError::EmptyBuilding)
        );
    }

    #[test]
    fn should_reject_addressed_stub() {
        let mut map = two_level_map();
        map.levels[0].lights[2].addr = at(Pin::B0);
        assert_eq!(
            map.validate(),
            Err(ValidationError::AddressedStub {
                level: 0,
                position: 2
            })
        );
    }

    #[test]
    fn should_reject_window_without_address() {
        let mut map = two_level_map();
        map.levels[1].lights[3].addr = None;
        assert_eq!(
            map.validate(),
            Err(ValidationError::MissingAddress {
                level: 1,
                position: 3
            })
        );
    }

    #[test]
    fn should_reject_service_light_owned_by_unit() {
        let mut map = two_level_map();
        map.levels[1].lights[0].number = 2;
        assert!(matches!(
            map.validate(),
            Err(ValidationError::OwnedServiceLight { number: 2, .. })
        ));
    }

    #[test]
    fn should_reject_window_without_unit() {
        let mut map = two_level_map();
        map.levels[0].lights[1].number = 0;
        assert!(matches!(
            map.validate(),
            Err(ValidationError::UnownedWindow { level: 0, .. })
        ));
    }

    #[test]
    fn should_reject_duplicate_address() {
        let mut map = two_level_map();
        map.levels[1].lights[1].addr = at(Pin::A1);
        assert_eq!(
            map.validate(),
            Err(ValidationError::DuplicateAddress(LightAddress::new(
                0x20,
                Pin::A1
            )))
        );
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let map = two_level_map();
        let json = serde_json::to_string(&map).unwrap();
        let parsed: BuildingMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }
}

//! Which units are currently being lived in.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;

/// Occupancy table owned by the live scheduling loop.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    units: BTreeMap<u32, bool>,
}

impl Occupancy {
    /// Every unit starts idle.
    pub fn new(units: impl IntoIterator<Item = u32>) -> Self {
        Self {
            units: units.into_iter().map(|unit| (unit, false)).collect(),
        }
    }

    /// Mark a uniformly random idle unit active and return it.
    ///
    /// Returns `None` when every unit is already active (or there are none).
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u32> {
        let idle: Vec<u32> = self
            .units
            .iter()
            .filter(|(_, active)| !**active)
            .map(|(unit, _)| *unit)
            .collect();
        let unit = *idle.choose(rng)?;
        self.units.insert(unit, true);
        Some(unit)
    }

    /// Mark `unit` idle again. Unknown units are ignored.
    pub fn release(&mut self, unit: u32) {
        if let Some(active) = self.units.get_mut(&unit) {
            *active = false;
        }
    }

    pub fn active_count(&self) -> usize {
        self.units.values().filter(|active| **active).count()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

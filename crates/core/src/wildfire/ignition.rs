//! External ignition triggers (lightning, user clicks, scripted arson).

use super::Clock;
use rustc_hash::FxHashSet;

/// Decides whether a cell is forced to attempt ignition this tick.
///
/// Queried from rayon workers, hence `Sync`.
pub trait IgnitionSource: Sync {
    fn ignites(&self, x: u32, y: u32, clock: Clock) -> bool;
}

impl<F> IgnitionSource for F
where
    F: Fn(u32, u32, Clock) -> bool + Sync,
{
    fn ignites(&self, x: u32, y: u32, clock: Clock) -> bool {
        self(x, y, clock)
    }
}

/// Never triggers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIgnition;

impl IgnitionSource for NoIgnition {
    fn ignites(&self, _x: u32, _y: u32, _clock: Clock) -> bool {
        false
    }
}

/// Fixed set of cells that trigger every tick while present.
#[derive(Clone, Debug, Default)]
pub struct IgnitionSet {
    cells: FxHashSet<(u32, u32)>,
}

impl IgnitionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the cell was already present.
    pub fn insert(&mut self, x: u32, y: u32) -> bool {
        self.cells.insert((x, y))
    }

    pub fn remove(&mut self, x: u32, y: u32) -> bool {
        self.cells.remove(&(x, y))
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.cells.contains(&(x, y))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(u32, u32)> for IgnitionSet {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl IgnitionSource for IgnitionSet {
    fn ignites(&self, x: u32, y: u32, _clock: Clock) -> bool {
        self.contains(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_membership() {
        let mut set: IgnitionSet = [(1, 2), (3, 4)].into_iter().collect();
        let clock = Clock::default();
        assert!(set.ignites(1, 2, clock));
        assert!(!set.ignites(2, 1, clock));
        assert!(!set.insert(3, 4));
        assert!(set.remove(3, 4));
        assert_eq!(set.len(), 1);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_closure_source() {
        let source = |x: u32, _y: u32, clock: Clock| x == 0 && clock.frame == 3;
        assert!(source.ignites(0, 9, Clock::new(0.0, 3)));
        assert!(!source.ignites(0, 9, Clock::new(0.0, 4)));
        assert!(!NoIgnition.ignites(0, 0, Clock::default()));
    }
}

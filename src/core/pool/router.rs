//! Least-loaded routing.
//!
//! A greedy partial scan rather than a true minimum: the unit at the front is
//! compared with the others in order, and the first one carrying strictly
//! less work is swapped to the front and chosen. When nothing is lighter the
//! front unit is chosen again. The busiest unit always gets relief, but the
//! lightest unit is not guaranteed to be picked.

/// Anything that reports how many requests it is holding
pub trait Load {
    fn in_flight(&self) -> usize;
}

/// Pick the next target; it is always left at index 0.
///
/// Returns `None` only when `units` is empty.
pub fn next_unit<T: Load>(units: &mut [T]) -> Option<&mut T> {
    let front = units.first()?.in_flight();

    if let Some(lighter) = units
        .iter()
        .skip(1)
        .position(|unit| unit.in_flight() < front)
    {
        units.swap(0, lighter + 1);
    }

    units.first_mut()
}

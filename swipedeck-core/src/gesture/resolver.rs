//! Pure classification of a drag offset into a swipe outcome.

use std::collections::BTreeSet;

use crate::types::{Offset, SwipeDirection};

/// What a released drag turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The card leaves the deck in this direction.
    Commit(SwipeDirection),
    /// The card returns to rest.
    Cancel,
}

/// Geometric direction of `offset`, checked in priority order
/// Right, Left, Up, Down. Horizontal wins on diagonals.
pub fn geometric_direction(
    offset: Offset,
    threshold: f32,
) -> Option<SwipeDirection> {
    if offset.x > threshold {
        Some(SwipeDirection::Right)
    } else if offset.x < -threshold {
        Some(SwipeDirection::Left)
    } else if offset.y < -threshold {
        Some(SwipeDirection::Up)
    } else if offset.y > threshold {
        Some(SwipeDirection::Down)
    } else {
        None
    }
}

/// Direction shown on the live overlay while dragging: the geometric
/// direction, if it is enabled.
pub fn provisional_direction(
    offset: Offset,
    threshold: f32,
    enabled: &BTreeSet<SwipeDirection>,
) -> Option<SwipeDirection> {
    geometric_direction(offset, threshold).filter(|dir| enabled.contains(dir))
}

/// Decide what happens when the pointer is released at `offset`.
///
/// Only horizontal excess or upward excess can commit; a purely downward drag
/// always cancels. A committing drag whose direction is disabled also cancels.
pub fn classify(
    offset: Offset,
    threshold: f32,
    enabled: &BTreeSet<SwipeDirection>,
) -> Outcome {
    let should_commit = offset.x.abs() > threshold || offset.y < -threshold;
    if !should_commit {
        return Outcome::Cancel;
    }

    match provisional_direction(offset, threshold, enabled) {
        Some(direction) => Outcome::Commit(direction),
        None => Outcome::Cancel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f32 = 100.0;

    fn all() -> BTreeSet<SwipeDirection> {
        SwipeDirection::ALL.into_iter().collect()
    }

    fn default_set() -> BTreeSet<SwipeDirection> {
        [SwipeDirection::Left, SwipeDirection::Right, SwipeDirection::Up]
            .into_iter()
            .collect()
    }

    #[test]
    fn inside_threshold_box_cancels() {
        let enabled = all();
        for &(x, y) in &[
            (0.0, 0.0),
            (T, 0.0),
            (-T, 0.0),
            (50.0, -T),
            (-20.0, 400.0),
            (T, T * 3.0),
        ] {
            assert_eq!(
                classify(Offset::new(x, y), T, &enabled),
                Outcome::Cancel,
                "offset ({x}, {y})"
            );
        }
    }

    #[test]
    fn rightward_commits_only_when_enabled() {
        let offset = Offset::new(T + 0.5, 30.0);
        assert_eq!(
            classify(offset, T, &all()),
            Outcome::Commit(SwipeDirection::Right)
        );

        let without_right: BTreeSet<_> =
            [SwipeDirection::Left, SwipeDirection::Up].into_iter().collect();
        assert_eq!(classify(offset, T, &without_right), Outcome::Cancel);
    }

    #[test]
    fn leftward_and_upward_commit() {
        let enabled = default_set();
        assert_eq!(
            classify(Offset::new(-150.0, 0.0), T, &enabled),
            Outcome::Commit(SwipeDirection::Left)
        );
        assert_eq!(
            classify(Offset::new(10.0, -150.0), T, &enabled),
            Outcome::Commit(SwipeDirection::Up)
        );
    }

    #[test]
    fn diagonal_resolves_horizontally() {
        assert_eq!(
            classify(Offset::new(T + 1.0, -T - 1.0), T, &all()),
            Outcome::Commit(SwipeDirection::Right)
        );
        assert_eq!(
            classify(Offset::new(-T - 1.0, -T - 1.0), T, &all()),
            Outcome::Commit(SwipeDirection::Left)
        );
    }

    #[test]
    fn downward_alone_never_commits() {
        assert_eq!(classify(Offset::new(0.0, 500.0), T, &all()), Outcome::Cancel);
    }

    #[test]
    fn provisional_direction_reports_down_only_if_enabled() {
        let offset = Offset::new(0.0, 150.0);
        assert_eq!(
            provisional_direction(offset, T, &all()),
            Some(SwipeDirection::Down)
        );
        assert_eq!(provisional_direction(offset, T, &default_set()), None);
    }
}

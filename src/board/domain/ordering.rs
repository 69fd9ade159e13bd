//! Order computation for sibling lists.
//!
//! Columns on a board and tasks in a column are both sibling lists: items
//! with an identifier and a [`SortOrder`], displayed in ascending order.
//! The engine places items between neighbours by midpoint and only falls
//! back to renumbering the whole list when two neighbours are too close to
//! fit another value between them.
#![expect(
    clippy::float_arithmetic,
    reason = "fractional sort orders are computed by midpoint"
)]

use super::{OrderingError, SortOrder};

/// One member of an ordered sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling<K> {
    /// Sibling identifier.
    pub id: K,
    /// Current order value.
    pub order: SortOrder,
}

impl<K> Sibling<K> {
    /// Creates a sibling entry.
    #[must_use]
    pub const fn new(id: K, order: SortOrder) -> Self {
        Self { id, order }
    }
}

/// New order value to write for one sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<K> {
    /// Sibling identifier.
    pub id: K,
    /// Order value to persist.
    pub order: SortOrder,
}

/// Where a new item goes, plus any siblings that had to be renumbered to
/// make room for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<K> {
    /// Order value for the inserted item.
    pub order: SortOrder,
    /// Existing siblings whose order changes; empty unless renumbered.
    pub renumbered: Vec<Assignment<K>>,
}

impl<K> Placement<K> {
    const fn at(order: SortOrder) -> Self {
        Self {
            order,
            renumbered: Vec::new(),
        }
    }

    /// Whether the placement required renumbering existing siblings.
    #[must_use]
    pub fn is_renumbered(&self) -> bool {
        !self.renumbered.is_empty()
    }
}

/// Numeric parameters of the ordering scheme.
///
/// # Examples
///
/// ```
/// use taskboard::board::domain::{OrderingPolicy, SortOrder};
///
/// let policy = OrderingPolicy::default();
/// let next = policy
///     .append_order(&[SortOrder::ZERO, SortOrder::from_index(1)])
///     .expect("finite order");
/// assert_eq!(next, SortOrder::from_index(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderingPolicy {
    step: f64,
    min_gap: f64,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            step: 1.0,
            min_gap: 0.000_001,
        }
    }
}

impl OrderingPolicy {
    /// Creates a policy with a custom step and minimum midpoint gap.
    ///
    /// `step` separates appended items and renumbered siblings; neighbours
    /// closer than `min_gap` trigger a renumbering pass.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::InvalidPolicy`] unless both values are
    /// positive and finite.
    pub fn new(step: f64, min_gap: f64) -> Result<Self, OrderingError> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        if !valid(step) || !valid(min_gap) {
            return Err(OrderingError::InvalidPolicy);
        }
        Ok(Self { step, min_gap })
    }

    /// Returns the distance between consecutive appended items.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Returns the smallest gap that is still split by midpoint.
    #[must_use]
    pub const fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Order value for an item appended after every existing sibling.
    ///
    /// Returns [`SortOrder::ZERO`] for an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::NonFinite`] if the result overflows.
    pub fn append_order(&self, existing: &[SortOrder]) -> Result<SortOrder, OrderingError> {
        existing
            .iter()
            .copied()
            .max()
            .map_or(Ok(SortOrder::ZERO), |max| SortOrder::new(max.value() + self.step))
    }

    /// Places a new item next to the given neighbours.
    ///
    /// `previous` is the sibling the item follows and `next` the sibling it
    /// precedes. With only `previous` the item goes right after it; with only
    /// `next` right before it; with neither it is appended.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::UnknownSibling`] when a neighbour is not in
    /// `siblings`, [`OrderingError::NotAdjacent`] when both are given but not
    /// consecutive, and [`OrderingError::NonFinite`] on overflow.
    pub fn insert_order<K: Copy + Eq>(
        &self,
        siblings: &[Sibling<K>],
        previous: Option<K>,
        next: Option<K>,
    ) -> Result<Placement<K>, OrderingError> {
        let sorted = sorted(siblings);
        let index_of = |id: K| {
            sorted
                .iter()
                .position(|sibling| sibling.id == id)
                .ok_or(OrderingError::UnknownSibling)
        };
        let index = match (previous, next) {
            (None, None) => sorted.len(),
            (Some(prev), None) => index_of(prev)? + 1,
            (None, Some(following)) => index_of(following)?,
            (Some(prev), Some(following)) => {
                let prev_index = index_of(prev)?;
                if index_of(following)? != prev_index + 1 {
                    return Err(OrderingError::NotAdjacent);
                }
                prev_index + 1
            }
        };
        self.place(&sorted, index)
    }

    /// Places a new item so that it ends up at `index` in display order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::IndexOutOfRange`] when `index` exceeds the
    /// number of siblings, and [`OrderingError::NonFinite`] on overflow.
    pub fn insert_at<K: Copy>(
        &self,
        siblings: &[Sibling<K>],
        index: usize,
    ) -> Result<Placement<K>, OrderingError> {
        if index > siblings.len() {
            return Err(OrderingError::IndexOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        self.place(&sorted(siblings), index)
    }

    /// Computes the order writes that move the item at display index `from`
    /// to display index `to`.
    ///
    /// Only siblings whose value must change are returned: usually just the
    /// moved item, or the renumbered list when its new neighbours leave no
    /// room. Moving an item onto itself returns nothing.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::IndexOutOfRange`] when either index is not a
    /// valid display index, and [`OrderingError::NonFinite`] on overflow.
    pub fn reorder<K: Copy>(
        &self,
        siblings: &[Sibling<K>],
        from: usize,
        to: usize,
    ) -> Result<Vec<Assignment<K>>, OrderingError> {
        let len = siblings.len();
        for index in [from, to] {
            if index >= len {
                return Err(OrderingError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(Vec::new());
        }

        let mut remaining = sorted(siblings);
        let moved = remaining.remove(from);
        let placement = self.place(&remaining, to)?;
        let mut assignments = placement.renumbered;
        if placement.order != moved.order {
            assignments.push(Assignment {
                id: moved.id,
                order: placement.order,
            });
        }
        Ok(assignments)
    }

    /// Reassigns `0, step, 2·step, …` to every sibling in display order.
    #[must_use]
    pub fn renumber<K: Copy>(&self, siblings: &[Sibling<K>]) -> Vec<Assignment<K>> {
        let mut next = 0.0;
        sorted(siblings)
            .into_iter()
            .map(|sibling| {
                let order = SortOrder(next);
                next += self.step;
                Assignment {
                    id: sibling.id,
                    order,
                }
            })
            .collect()
    }

    fn place<K: Copy>(
        &self,
        sorted: &[Sibling<K>],
        index: usize,
    ) -> Result<Placement<K>, OrderingError> {
        let previous = index.checked_sub(1).and_then(|i| sorted.get(i));
        let next = sorted.get(index);
        match (previous, next) {
            (None, None) => Ok(Placement::at(SortOrder::ZERO)),
            (Some(prev), None) => SortOrder::new(prev.order.value() + self.step).map(Placement::at),
            (None, Some(following)) => {
                SortOrder::new(following.order.value() - self.step).map(Placement::at)
            }
            (Some(prev), Some(following)) => Ok(self
                .midpoint(prev.order, following.order)
                .map_or_else(|| self.renumber_around(sorted, index), Placement::at)),
        }
    }

    fn midpoint(&self, lower: SortOrder, upper: SortOrder) -> Option<SortOrder> {
        let gap = upper.value() - lower.value();
        if !gap.is_finite() || gap <= self.min_gap {
            return None;
        }
        SortOrder::new(lower.value() + gap / 2.0)
            .ok()
            .filter(|mid| lower < *mid && *mid < upper)
    }

    /// Renumbers `sorted` leaving a hole at `index` for the new item.
    fn renumber_around<K: Copy>(&self, sorted: &[Sibling<K>], index: usize) -> Placement<K> {
        let mut next = 0.0;
        let mut hole = SortOrder::ZERO;
        let mut renumbered = Vec::new();
        for (position, sibling) in sorted.iter().enumerate() {
            if position == index {
                hole = SortOrder(next);
                next += self.step;
            }
            let order = SortOrder(next);
            next += self.step;
            if order != sibling.order {
                renumbered.push(Assignment {
                    id: sibling.id,
                    order,
                });
            }
        }
        if index >= sorted.len() {
            hole = SortOrder(next);
        }
        Placement {
            order: hole,
            renumbered,
        }
    }
}

fn sorted<K: Copy>(siblings: &[Sibling<K>]) -> Vec<Sibling<K>> {
    let mut sorted = siblings.to_vec();
    sorted.sort_by_key(|sibling| sibling.order);
    sorted
}

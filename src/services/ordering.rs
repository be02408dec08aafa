//! Sibling ordering.
//!
//! Nested lanes (a column's cards) are kept physically sorted, so their
//! helpers take and return whole `Vec`s. Flat collections (backlog stories,
//! story-map tasks) hold many lanes in one `Vec`; for those, array position
//! means nothing and only `order` within a lane counts.

use crate::domain::common::{Identified, Ordered, Timestamped};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn delta(self) -> isize {
        match self {
            Direction::Left | Direction::Up => -1,
            Direction::Right | Direction::Down => 1,
        }
    }
}

/// Neighbour index of `index` within a lane of `len` items, if there is one.
pub fn step_target(len: usize, index: usize, direction: Direction) -> Option<usize> {
    if index >= len {
        return None;
    }
    index
        .checked_add_signed(direction.delta())
        .filter(|target| *target < len)
}

/// Assign `order = position` to every element.
pub fn renumber<T: Ordered>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index);
    }
}

/// Move the element at `from` to `to` and renumber. Out-of-range indices
/// leave the lane as it was.
pub fn reorder<T: Ordered + Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut result = items.to_vec();
    if from >= result.len() || to >= result.len() {
        return result;
    }
    let item = result.remove(from);
    result.insert(to, item);
    renumber(&mut result);
    result
}

/// Stable sort by the current `order`, then renumber from zero.
pub fn reindex<T: Ordered + Clone>(items: &[T]) -> Vec<T> {
    let mut result = items.to_vec();
    result.sort_by_key(|item| item.order());
    renumber(&mut result);
    result
}

/// Sort a single-lane collection, move `from` to `to` (clamped to the last
/// slot) and stamp the moved item.
pub fn reorder_touching<T>(items: &[T], from: usize, to: usize) -> Vec<T>
where
    T: Ordered + Timestamped + Clone,
{
    let lane = reindex(items);
    let to = to.min(lane.len().saturating_sub(1));
    let mut lane = reorder(&lane, from, to);
    if from < lane.len() {
        if let Some(moved) = lane.get_mut(to) {
            moved.touch();
        }
    }
    lane
}

/// The members of one lane, ascending by `order`.
pub fn sorted_lane<T, F>(items: &[T], in_lane: F) -> Vec<T>
where
    T: Ordered + Clone,
    F: Fn(&T) -> bool,
{
    let mut lane: Vec<T> = items.iter().filter(|item| in_lane(item)).cloned().collect();
    lane.sort_by_key(|item| item.order());
    lane
}

/// Positions in `items` of one lane's members, ascending by `order` with ties
/// broken by array position.
fn lane_positions<T, F>(items: &[T], in_lane: F) -> Vec<usize>
where
    T: Ordered,
    F: Fn(&T) -> bool,
{
    let mut positions: Vec<usize> = (0..items.len()).filter(|&i| in_lane(&items[i])).collect();
    positions.sort_by_key(|&i| (items[i].order(), i));
    positions
}

/// Renumber one lane of a flat collection in place.
pub fn reindex_lane<T, F>(items: &mut [T], in_lane: F)
where
    T: Ordered,
    F: Fn(&T) -> bool,
{
    for (order, position) in lane_positions(items, in_lane).into_iter().enumerate() {
        items[position].set_order(order);
    }
}

/// Renumber every lane of a flat collection in place. `lane_of` maps an item
/// to its lane key.
pub fn reindex_lanes<T, K, F>(items: &mut [T], lane_of: F)
where
    T: Ordered,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut lanes: HashMap<K, Vec<usize>> = HashMap::new();
    for (position, item) in items.iter().enumerate() {
        lanes.entry(lane_of(item)).or_default().push(position);
    }
    for positions in lanes.values_mut() {
        positions.sort_by_key(|&i| (items[i].order(), i));
        for (order, &position) in positions.iter().enumerate() {
            items[position].set_order(order);
        }
    }
}

/// Renumber the destination lane after some items joined it: the members
/// already there keep their sequence and the newcomers follow in their
/// previous relative order.
pub fn append_to_lane<T, F, M>(items: &mut [T], in_lane: F, is_newcomer: M)
where
    T: Ordered,
    F: Fn(&T) -> bool,
    M: Fn(&T) -> bool,
{
    let (newcomers, residents): (Vec<usize>, Vec<usize>) = lane_positions(items, in_lane)
        .into_iter()
        .partition(|&i| is_newcomer(&items[i]));
    for (order, position) in residents.into_iter().chain(newcomers).enumerate() {
        items[position].set_order(order);
    }
}

/// Move one item of a flat collection into a lane at `target_index`.
///
/// `in_source` and `in_target` describe the lanes before the move; `relink`
/// rewrites the item's lane reference. Both lanes are renumbered. Returns
/// `false` when the item is absent.
pub fn move_across_lanes<T, S, D, R>(
    items: &mut [T],
    item_id: &str,
    in_source: S,
    in_target: D,
    target_index: usize,
    relink: R,
) -> bool
where
    T: Ordered + Identified,
    S: Fn(&T) -> bool,
    D: Fn(&T) -> bool,
    R: FnOnce(&mut T),
{
    let Some(moved) = items.iter().position(|item| item.id() == item_id) else {
        return false;
    };

    let source: Vec<usize> = lane_positions(items, &in_source)
        .into_iter()
        .filter(|&i| i != moved)
        .collect();
    let mut target: Vec<usize> = lane_positions(items, &in_target)
        .into_iter()
        .filter(|&i| i != moved)
        .collect();
    let index = target_index.min(target.len());
    target.insert(index, moved);

    relink(&mut items[moved]);

    for (order, &position) in source.iter().enumerate() {
        items[position].set_order(order);
    }
    for (order, &position) in target.iter().enumerate() {
        items[position].set_order(order);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        id: String,
        lane: &'static str,
        order: usize,
    }

    impl Ordered for Slot {
        fn order(&self) -> usize {
            self.order
        }

        fn set_order(&mut self, order: usize) {
            self.order = order;
        }
    }

    impl Identified for Slot {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn slot(id: &str, lane: &'static str, order: usize) -> Slot {
        Slot {
            id: id.to_string(),
            lane,
            order,
        }
    }

    fn ids(items: &[Slot]) -> Vec<&str> {
        items.iter().map(|s| s.id.as_str()).collect()
    }

    fn lane_ids(items: &[Slot], lane: &str) -> Vec<String> {
        sorted_lane(items, |s| s.lane == lane)
            .into_iter()
            .map(|s| s.id)
            .collect()
    }

    #[test]
    fn test_step_target_bounds() {
        assert_eq!(step_target(3, 0, Direction::Left), None);
        assert_eq!(step_target(3, 0, Direction::Right), Some(1));
        assert_eq!(step_target(3, 2, Direction::Down), None);
        assert_eq!(step_target(3, 2, Direction::Up), Some(1));
        assert_eq!(step_target(0, 0, Direction::Right), None);
    }

    #[test]
    fn test_reorder_moves_and_renumbers() {
        let items = vec![slot("a", "x", 0), slot("b", "x", 1), slot("c", "x", 2)];
        let moved = reorder(&items, 0, 2);
        assert_eq!(ids(&moved), vec!["b", "c", "a"]);
        assert_eq!(moved.iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let items = vec![slot("a", "x", 0), slot("b", "x", 1)];
        assert_eq!(reorder(&items, 0, 5), items);
        assert_eq!(reorder(&items, 7, 0), items);
    }

    #[test]
    fn test_reindex_closes_gaps_and_sorts() {
        let items = vec![slot("a", "x", 9), slot("b", "x", 2), slot("c", "x", 2)];
        let fixed = reindex(&items);
        assert_eq!(ids(&fixed), vec!["b", "c", "a"]);
        assert_eq!(fixed.iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_reindex_lanes_keeps_positions() {
        let mut items = vec![
            slot("a", "x", 4),
            slot("b", "y", 7),
            slot("c", "x", 1),
            slot("d", "y", 7),
        ];
        reindex_lanes(&mut items, |s| s.lane);
        assert_eq!(ids(&items), vec!["a", "b", "c", "d"]);
        assert_eq!(items.iter().map(|s| s.order).collect::<Vec<_>>(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_append_to_lane_puts_newcomers_last() {
        let mut items = vec![
            slot("n1", "x", 0),
            slot("r1", "x", 0),
            slot("n2", "x", 1),
            slot("r2", "x", 1),
        ];
        append_to_lane(&mut items, |s| s.lane == "x", |s| s.id.starts_with('n'));
        assert_eq!(lane_ids(&items, "x"), vec!["r1", "r2", "n1", "n2"]);
    }

    #[test]
    fn test_move_across_lanes() {
        let mut items = vec![
            slot("a", "x", 0),
            slot("b", "x", 1),
            slot("c", "y", 0),
        ];
        let moved = move_across_lanes(
            &mut items,
            "a",
            |s| s.lane == "x",
            |s| s.lane == "y",
            0,
            |s| s.lane = "y",
        );
        assert!(moved);
        assert_eq!(lane_ids(&items, "x"), vec!["b"]);
        assert_eq!(lane_ids(&items, "y"), vec!["a", "c"]);
        assert_eq!(items[1].order, 0);
    }

    #[test]
    fn test_move_within_lane_to_end() {
        let mut items = vec![slot("a", "x", 0), slot("b", "x", 1), slot("c", "x", 2)];
        let in_x = |s: &Slot| s.lane == "x";
        assert!(move_across_lanes(&mut items, "a", in_x, in_x, 3, |_| {}));
        assert_eq!(lane_ids(&items, "x"), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_unknown_item() {
        let mut items = vec![slot("a", "x", 0)];
        assert!(!move_across_lanes(&mut items, "zz", |_| true, |_| true, 0, |_| {}));
        assert_eq!(items[0].order, 0);
    }
}

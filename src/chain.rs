// Body segment chain: movement propagation, direction arbitration, growth
//
// Segments live in one contiguous vector, index 0 is the head and the last
// index is the tail. Trailing segments carry no direction of their own.

use std::collections::HashSet;

use crate::types::{Coord, Direction, Segment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentChain {
    segments: Vec<Coord>,
    direction: Direction,
    pending_direction: Direction,
    pending_growth: u32,
}

impl SegmentChain {
    /// Creates a single-segment chain facing `direction`
    pub fn new(head: Coord, direction: Direction) -> Self {
        SegmentChain {
            segments: vec![head],
            direction,
            pending_direction: direction,
            pending_growth: 0,
        }
    }

    /// Requests a new direction for the next committed tick
    ///
    /// Returns false and leaves the pending value untouched when `direction`
    /// reverses the committed direction. The last accepted call before a
    /// commit wins.
    pub fn set_pending_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Promotes the pending direction; called once per tick before `advance`
    pub fn commit_pending_direction(&mut self) {
        self.direction = self.pending_direction;
    }

    /// Moves the chain one cell along the committed direction
    ///
    /// With `wrap_enabled` the new head is folded onto the torus; otherwise it
    /// may land outside the board and the caller decides what that means.
    /// Every trailing segment takes the pre-move position of the segment ahead
    /// of it. A pending growth unit appends a segment where the tail was.
    pub fn advance(&mut self, board_width: i32, board_height: i32, wrap_enabled: bool) {
        let mut new_head = self.direction.apply(&self.segments[0]);
        if wrap_enabled {
            new_head = new_head.wrapped(board_width, board_height);
        }

        let old_tail = self.tail();

        // Walking tail-to-head only ever reads slots that have not been
        // overwritten yet, so each copy sees the pre-move snapshot.
        for i in (1..self.segments.len()).rev() {
            self.segments[i] = self.segments[i - 1];
        }
        self.segments[0] = new_head;

        if self.pending_growth > 0 {
            self.segments.push(old_tail);
            self.pending_growth -= 1;
        }
    }

    /// Queues one growth unit, materialised on the next `advance`
    pub fn queue_growth(&mut self) {
        self.pending_growth += 1;
    }

    /// Moves only the head; the engine uses it to fold a head that reached
    /// collision resolution without being wrapped
    pub fn relocate_head(&mut self, coord: Coord) {
        self.segments[0] = coord;
    }

    /// Snapshot of every segment, head first
    pub fn occupied_coordinates(&self) -> Vec<Segment> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, &coord)| Segment { coord, is_head: i == 0 })
            .collect()
    }

    /// Same coordinates as `occupied_coordinates`, as a lookup set
    pub fn occupied_set(&self) -> HashSet<Coord> {
        self.segments.iter().copied().collect()
    }

    pub fn head_coordinate(&self) -> Coord {
        self.segments[0]
    }

    pub fn tail(&self) -> Coord {
        self.segments[self.segments.len() - 1]
    }

    /// Returns true if `coord` matches any segment other than the head
    pub fn collides_with_body(&self, coord: Coord) -> bool {
        self.segments[1..].contains(&coord)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn pending_growth(&self) -> u32 {
        self.pending_growth
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a chain keeps at least its head
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(chain: &SegmentChain) -> Vec<Coord> {
        chain.occupied_coordinates().iter().map(|s| s.coord).collect()
    }

    /// Builds a straight chain of `len` segments ending at `head`, facing East
    fn east_chain(head: Coord, len: usize) -> SegmentChain {
        let start = Coord::new(head.x - (len as i32 - 1), head.y);
        let mut chain = SegmentChain::new(start, Direction::East);
        for _ in 1..len {
            chain.queue_growth();
            chain.advance(100, 100, false);
        }
        chain
    }

    #[test]
    fn test_reversal_rejected() {
        let mut chain = SegmentChain::new(Coord::new(5, 5), Direction::East);
        assert!(!chain.set_pending_direction(Direction::West));
        chain.commit_pending_direction();
        assert_eq!(chain.direction(), Direction::East);
    }

    #[test]
    fn test_last_pending_call_wins() {
        let mut chain = SegmentChain::new(Coord::new(5, 5), Direction::East);
        assert!(chain.set_pending_direction(Direction::North));
        assert!(chain.set_pending_direction(Direction::South));
        chain.commit_pending_direction();
        assert_eq!(chain.direction(), Direction::South);
    }

    #[test]
    fn test_double_press_cannot_bypass_guard() {
        // Heading East: North is accepted, but West is still judged against
        // the committed East, so the chain never reverses within one tick.
        let mut chain = SegmentChain::new(Coord::new(5, 5), Direction::East);
        assert!(chain.set_pending_direction(Direction::North));
        assert!(!chain.set_pending_direction(Direction::West));
        chain.commit_pending_direction();
        assert_eq!(chain.direction(), Direction::North);
    }

    #[test]
    fn test_advance_without_wrap_leaves_board() {
        let mut chain = SegmentChain::new(Coord::new(9, 3), Direction::East);
        chain.advance(10, 10, false);
        assert_eq!(chain.head_coordinate(), Coord::new(10, 3));
    }

    #[test]
    fn test_advance_with_wrap_folds_head() {
        let mut chain = SegmentChain::new(Coord::new(0, 0), Direction::North);
        chain.advance(5, 5, true);
        assert_eq!(chain.head_coordinate(), Coord::new(0, 4));
    }

    #[test]
    fn test_trail_follows_previous_positions() {
        let mut chain = east_chain(Coord::new(5, 5), 3);
        assert_eq!(coords(&chain), vec![Coord::new(5, 5), Coord::new(4, 5), Coord::new(3, 5)]);

        chain.set_pending_direction(Direction::South);
        chain.commit_pending_direction();
        chain.advance(100, 100, false);

        assert_eq!(coords(&chain), vec![Coord::new(5, 6), Coord::new(5, 5), Coord::new(4, 5)]);
    }

    #[test]
    fn test_growth_appends_at_old_tail() {
        let mut chain = SegmentChain::new(Coord::new(2, 2), Direction::East);
        chain.queue_growth();
        assert_eq!(chain.len(), 1);

        chain.advance(10, 10, false);
        assert_eq!(chain.len(), 2);
        assert_eq!(coords(&chain), vec![Coord::new(3, 2), Coord::new(2, 2)]);
        assert_eq!(chain.pending_growth(), 0);

        // No further growth without another queued unit
        chain.advance(10, 10, false);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_multiple_growth_units_materialise_one_per_advance() {
        let mut chain = SegmentChain::new(Coord::new(0, 0), Direction::East);
        chain.queue_growth();
        chain.queue_growth();

        chain.advance(10, 10, false);
        assert_eq!(chain.len(), 2);
        chain.advance(10, 10, false);
        assert_eq!(chain.len(), 3);
        chain.advance(10, 10, false);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_snapshot_tags_only_head() {
        let chain = east_chain(Coord::new(5, 5), 4);
        let snapshot = chain.occupied_coordinates();
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot[0].is_head);
        assert!(snapshot[1..].iter().all(|s| !s.is_head));
    }

    #[test]
    fn test_collides_with_body_ignores_head() {
        let chain = east_chain(Coord::new(5, 5), 3);
        assert!(!chain.collides_with_body(Coord::new(5, 5)));
        assert!(chain.collides_with_body(Coord::new(4, 5)));
        assert!(!chain.collides_with_body(Coord::new(0, 0)));
    }

    #[test]
    fn test_head_may_enter_vacated_tail_cell() {
        // A 4-segment loop: the head steps into the cell the tail just left
        let mut chain = east_chain(Coord::new(5, 5), 4);
        for dir in [Direction::South, Direction::West, Direction::North] {
            chain.set_pending_direction(dir);
            chain.commit_pending_direction();
            chain.advance(100, 100, false);
        }
        assert_eq!(chain.head_coordinate(), Coord::new(4, 5));
        assert!(!chain.collides_with_body(chain.head_coordinate()));
        assert_eq!(chain.occupied_set().len(), chain.len());
    }
}

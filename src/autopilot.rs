// Greedy direction chooser used to drive headless sessions
//
// Acts as the external input source: it only reads engine state through the
// query API and feeds a direction back through `set_pending_direction`.

use crate::engine::Engine;
use crate::types::{Cell, Coord, Direction};

/// Picks the safe, non-reversing direction that gets closest to the food
///
/// Falls back to the committed direction when no move is safe or the
/// candidates are exhausted.
pub fn choose_direction(engine: &Engine) -> Direction {
    let current = engine.direction();
    let legal_moves = generate_safe_moves(engine);

    if legal_moves.is_empty() {
        return current;
    }

    let head = engine.head();
    let Some(food) = engine.food() else {
        // Nothing to chase, keep going straight if that is safe
        return if legal_moves.contains(&current) {
            current
        } else {
            legal_moves[0]
        };
    };

    legal_moves
        .iter()
        .min_by_key(|&&dir| {
            let next = next_cell(engine, dir, head);
            // Prefer the current heading on ties to avoid needless zig-zags
            (distance(engine, next, food), dir != current)
        })
        .copied()
        .unwrap_or(current)
}

/// All directions that neither reverse the head nor run into something
pub fn generate_safe_moves(engine: &Engine) -> Vec<Direction> {
    let current = engine.direction();
    let head = engine.head();
    let chain = engine.chain();

    // The tail moves out of the way unless the chain is about to grow
    let body_check_len = if chain.pending_growth() > 0 {
        chain.len()
    } else {
        chain.len().saturating_sub(1)
    };
    let body: Vec<Coord> = engine
        .segments()
        .iter()
        .skip(1)
        .take(body_check_len.saturating_sub(1))
        .map(|s| s.coord)
        .collect();

    Direction::all()
        .iter()
        .filter(|&&dir| !current.is_opposite(dir))
        .filter(|&&dir| {
            let next = next_cell(engine, dir, head);
            match engine.cell_at(next.x, next.y) {
                Ok(Cell::Obstacle) | Err(_) => false,
                Ok(_) => !body.contains(&next),
            }
        })
        .copied()
        .collect()
}

fn next_cell(engine: &Engine, dir: Direction, head: Coord) -> Coord {
    let next = dir.apply(&head);
    if engine.wrap_enabled() {
        next.wrapped(engine.width(), engine.height())
    } else {
        next
    }
}

/// Manhattan distance, measured around the torus when wrapping is on
fn distance(engine: &Engine, a: Coord, b: Coord) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if engine.wrap_enabled() {
        dx.min(engine.width() - dx) + dy.min(engine.height() - dy)
    } else {
        dx + dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::chain::SegmentChain;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    /// Engine on a board whose only free cell for food is `food`
    fn engine_with_food(
        width: i32,
        height: i32,
        head: Coord,
        food: Coord,
        obstacles: &[Coord],
        wrap: bool,
    ) -> Engine {
        let blocked: HashSet<Coord> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Coord::new(x, y)))
            .filter(|c| *c != food)
            .collect();
        let board = Board::new(width, height, obstacles, &blocked, StdRng::seed_from_u64(0)).unwrap();
        let chain = SegmentChain::new(head, Direction::East);
        let mut engine =
            Engine::from_parts(board, chain, Duration::from_millis(100), wrap, 0).unwrap();
        engine.start_at(Instant::now());
        engine
    }

    #[test]
    fn test_never_reverses() {
        let engine = engine_with_food(10, 10, Coord::new(5, 5), Coord::new(0, 5), &[], false);
        let moves = generate_safe_moves(&engine);
        assert!(!moves.contains(&Direction::West));
        assert_ne!(choose_direction(&engine), Direction::West);
    }

    #[test]
    fn test_heads_towards_food() {
        let engine = engine_with_food(10, 10, Coord::new(5, 5), Coord::new(5, 1), &[], false);
        assert_eq!(choose_direction(&engine), Direction::North);
    }

    #[test]
    fn test_avoids_walls_without_wrap() {
        let engine = engine_with_food(10, 10, Coord::new(9, 5), Coord::new(0, 0), &[], false);
        let moves = generate_safe_moves(&engine);
        assert!(!moves.contains(&Direction::East));
    }

    #[test]
    fn test_uses_wrap_shortcut() {
        // Food is one step away across the right edge
        let engine = engine_with_food(10, 10, Coord::new(9, 5), Coord::new(0, 5), &[], true);
        assert_eq!(choose_direction(&engine), Direction::East);
    }

    #[test]
    fn test_avoids_obstacles() {
        let engine = engine_with_food(
            10,
            10,
            Coord::new(5, 5),
            Coord::new(9, 5),
            &[Coord::new(6, 5)],
            false,
        );
        let moves = generate_safe_moves(&engine);
        assert!(!moves.contains(&Direction::East));
        assert_ne!(choose_direction(&engine), Direction::East);
    }
}

use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::{Direction, TileCoord};

/// Breadth-first search from `start` to the nearest tile in `goals` (graph
/// distance over the four-connected grid), returning only the first step to
/// take. Neighbors expand in the fixed order right, left, down, up, which
/// breaks ties among equal-length paths reproducibly. Returns
/// `Direction::None` when `start` is itself a goal or no goal is reachable.
pub fn shortest_first_step<F>(start: TileCoord, goals: &[TileCoord], passable: F) -> Direction
where
    F: Fn(i32, i32) -> bool,
{
    if goals.is_empty() {
        return Direction::None;
    }
    let is_goal = |x: i32, y: i32| goals.iter().any(|g| g.x == x && g.y == y);

    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let mut came_from: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut queue: VecDeque<(i32, i32)> = VecDeque::new();
    visited.insert((start.x, start.y));
    queue.push_back((start.x, start.y));

    let mut reached = None;
    while let Some((cx, cy)) = queue.pop_front() {
        if is_goal(cx, cy) {
            reached = Some((cx, cy));
            break;
        }
        for dir in Direction::CARDINALS {
            let (dx, dy) = dir.offset();
            let next = (cx + dx, cy + dy);
            if visited.contains(&next) {
                continue;
            }
            if !passable(next.0, next.1) {
                continue;
            }
            visited.insert(next);
            came_from.insert(next, (cx, cy));
            queue.push_back(next);
        }
    }

    let Some(mut current) = reached else {
        return Direction::None;
    };
    if current == (start.x, start.y) {
        return Direction::None;
    }
    // Walk the predecessor chain back to the tile adjacent to start.
    while let Some(&prev) = came_from.get(&current) {
        if prev == (start.x, start.y) {
            break;
        }
        current = prev;
    }

    match (current.0 - start.x, current.1 - start.y) {
        (1, 0) => Direction::Right,
        (-1, 0) => Direction::Left,
        (0, 1) => Direction::Down,
        (0, -1) => Direction::Up,
        _ => Direction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::shortest_first_step;
    use crate::types::{Direction, TileCoord};
    use crate::world::GridMap;

    fn tile(x: i32, y: i32) -> TileCoord {
        TileCoord { x, y }
    }

    fn passable_in(map: &GridMap) -> impl Fn(i32, i32) -> bool + '_ {
        |x, y| map.is_passable(x, y, false)
    }

    #[test]
    fn straight_corridor_reduces_graph_distance_each_step() {
        let map = GridMap::parse(&["#######", "#P...M#", "#######"]).unwrap();
        let goal = [map.adversary_spawn()];
        let mut from = map.player_spawn();
        for expected_remaining in (1..=4).rev() {
            let step = shortest_first_step(from, &goal, passable_in(&map));
            assert_eq!(step, Direction::Right);
            from = tile(from.x + 1, from.y);
            assert_eq!((goal[0].x - from.x).abs(), expected_remaining - 1);
        }
        assert_eq!(
            shortest_first_step(from, &goal, passable_in(&map)),
            Direction::None
        );
    }

    #[test]
    fn start_on_goal_returns_none() {
        let map = GridMap::parse(&["###", "#P#", "#M#", "###"]).unwrap();
        let start = map.player_spawn();
        assert_eq!(
            shortest_first_step(start, &[start], passable_in(&map)),
            Direction::None
        );
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let map = GridMap::parse(&["#####", "#P#M#", "#####"]).unwrap();
        assert_eq!(
            shortest_first_step(
                map.player_spawn(),
                &[map.adversary_spawn()],
                passable_in(&map)
            ),
            Direction::None
        );
    }

    #[test]
    fn empty_goal_set_returns_none() {
        let map = GridMap::parse(&["###", "#P#", "#M#", "###"]).unwrap();
        assert_eq!(
            shortest_first_step(map.player_spawn(), &[], passable_in(&map)),
            Direction::None
        );
    }

    #[test]
    fn nearest_of_several_goals_wins() {
        let map = GridMap::parse(&["#######", "#..P.M#", "#######"]).unwrap();
        let goals = [tile(1, 1), map.adversary_spawn()];
        // Adversary tile is two steps away, (1, 1) is two steps too; the
        // right neighbor is expanded first, so the tie resolves right.
        assert_eq!(
            shortest_first_step(map.player_spawn(), &goals, passable_in(&map)),
            Direction::Right
        );
    }

    #[test]
    fn identical_queries_are_idempotent() {
        let map = GridMap::parse(&[
            "#########",
            "#P......#",
            "#.#####.#",
            "#.......#",
            "#.#####M#",
            "#########",
        ])
        .unwrap();
        let goals = [map.adversary_spawn(), tile(7, 1)];
        let first = shortest_first_step(map.player_spawn(), &goals, passable_in(&map));
        for _ in 0..10 {
            assert_eq!(
                shortest_first_step(map.player_spawn(), &goals, passable_in(&map)),
                first
            );
        }
    }

    #[test]
    fn routes_around_walls() {
        let map = GridMap::parse(&["#####", "#P..#", "###.#", "#M..#", "#####"]).unwrap();
        let step = shortest_first_step(
            map.player_spawn(),
            &[map.adversary_spawn()],
            passable_in(&map),
        );
        assert_eq!(step, Direction::Right);
    }
}

use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Lifecycle phase derived from the `game_started` / `game_over` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    GameOver,
}

/// Snapshot of the simulation.
///
/// The engine is the only writer; everything outside it works on owned
/// copies handed out by [`GameEngine::state`](super::GameEngine::state) or
/// borrowed immutably during a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Body segments, head first
    pub snake: Vec<Position>,
    pub food: Position,
    /// Committed heading
    pub direction: Direction,
    pub score: u32,
    pub game_over: bool,
    pub game_started: bool,
}

impl GameState {
    /// Fresh, not yet started state: a straight snake whose head is at `head`,
    /// trailing away from `direction`
    pub fn new(head: Position, direction: Direction, length: usize, food: Position) -> Self {
        let mut snake = Vec::with_capacity(length.max(1));
        snake.push(head);

        let (dx, dy) = direction.delta();
        for i in 1..length {
            let prev = snake[i - 1];
            snake.push(prev.moved_by(-dx, -dy));
        }

        Self {
            snake,
            food,
            direction,
            score: 0,
            game_over: false,
            game_started: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.game_started {
            Phase::Running
        } else {
            Phase::NotStarted
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    /// Head segment. The snake is never empty.
    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn tail(&self) -> Position {
        self.snake[self.snake.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    /// Check if a position is occupied by any snake segment
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(5, 6));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
    }

    #[test]
    fn test_initial_snake_layout() {
        let state = GameState::new(Position::new(10, 7), Direction::Right, 3, Position::new(0, 0));
        assert_eq!(
            state.snake,
            vec![Position::new(10, 7), Position::new(9, 7), Position::new(8, 7)]
        );
        assert_eq!(state.head(), Position::new(10, 7));
        assert_eq!(state.tail(), Position::new(8, 7));
        assert_eq!(state.score, 0);
        assert_eq!(state.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_phase_flags() {
        let mut state = GameState::new(Position::new(5, 5), Direction::Right, 3, Position::new(0, 0));
        state.game_started = true;
        assert_eq!(state.phase(), Phase::Running);
        assert!(state.is_running());

        state.game_over = true;
        assert_eq!(state.phase(), Phase::GameOver);
        assert!(!state.is_running());
    }

    #[test]
    fn test_occupancy() {
        let state = GameState::new(Position::new(5, 5), Direction::Right, 3, Position::new(9, 9));
        assert!(state.is_occupied_by_snake(Position::new(5, 5)));
        assert!(state.is_occupied_by_snake(Position::new(3, 5)));
        assert!(!state.is_occupied_by_snake(Position::new(9, 9)));
    }
}

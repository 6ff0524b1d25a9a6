use std::time::{Duration, Instant};

use crate::game::{CommandSource, Direction, GameState, Phase};

/// Estimated calories per posture-driven command
const POSE_MOVE_CALORIES: f32 = 0.5;
/// Estimated calories per keyboard command
const KEYBOARD_MOVE_CALORIES: f32 = 0.3;

/// Raise counts per posture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostureCounts {
    pub left_hand: u32,
    pub right_hand: u32,
    pub left_leg: u32,
    pub right_leg: u32,
}

impl PostureCounts {
    fn record(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.left_hand += 1,
            Direction::Right => self.right_hand += 1,
            Direction::Down => self.left_leg += 1,
            Direction::Up => self.right_leg += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.left_hand + self.right_hand + self.left_leg + self.right_leg
    }
}

/// Session statistics, fed by engine notifications and by the commands the
/// play loop forwards.
///
/// Per-game numbers reset when the engine returns to the not-started phase;
/// session numbers (best score, games played, posture counts, calories) last
/// for the whole session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    food_score: u32,
    phase: Phase,
    game_start: Option<Instant>,
    pub elapsed_time: Duration,
    pub score: u32,
    pub snake_length: usize,
    pub food_eaten: u32,
    pub moves: u32,
    pub high_score: u32,
    pub games_played: u32,
    pub postures: PostureCounts,
    pub total_moves: u32,
    calories: f32,
}

impl SessionStats {
    /// `food_score` is the score awarded per food, used to derive food eaten
    pub fn new(food_score: u32) -> Self {
        Self {
            food_score,
            phase: Phase::NotStarted,
            game_start: None,
            elapsed_time: Duration::ZERO,
            score: 0,
            snake_length: 0,
            food_eaten: 0,
            moves: 0,
            high_score: 0,
            games_played: 0,
            postures: PostureCounts::default(),
            total_moves: 0,
            calories: 0.0,
        }
    }

    /// Fold in a state notification
    pub fn on_state(&mut self, state: &GameState, now: Instant) {
        let phase = state.phase();

        match (self.phase, phase) {
            (Phase::Running, Phase::Running) => {}
            (_, Phase::Running) => {
                self.game_start = Some(now);
                self.elapsed_time = Duration::ZERO;
                self.moves = 0;
            }
            (Phase::Running, Phase::GameOver) => {
                self.update(now);
                self.game_start = None;
                self.games_played += 1;
                self.high_score = self.high_score.max(state.score);
            }
            (_, Phase::NotStarted) => {
                self.game_start = None;
                self.elapsed_time = Duration::ZERO;
                self.moves = 0;
            }
            _ => {}
        }

        self.phase = phase;
        self.score = state.score;
        self.snake_length = state.len();
        self.food_eaten = if self.food_score == 0 {
            0
        } else {
            state.score / self.food_score
        };
    }

    /// Count a direction command forwarded to the engine
    pub fn on_command(&mut self, source: CommandSource, direction: Direction) {
        self.moves += 1;
        self.total_moves += 1;

        match source {
            CommandSource::Pose => {
                self.postures.record(direction);
                self.calories += POSE_MOVE_CALORIES;
            }
            CommandSource::Keyboard => self.calories += KEYBOARD_MOVE_CALORIES,
        }
    }

    /// Refresh the running game clock
    pub fn update(&mut self, now: Instant) {
        if let Some(start) = self.game_start {
            self.elapsed_time = now.saturating_duration_since(start);
        }
    }

    pub fn calories(&self) -> u32 {
        self.calories.floor() as u32
    }

    /// Commands per minute over the current game
    pub fn moves_per_minute(&self) -> u32 {
        let secs = self.elapsed_time.as_secs();
        if secs == 0 {
            return 0;
        }
        ((self.moves as f64 / secs as f64) * 60.0).round() as u32
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    fn state(score: u32, started: bool, over: bool) -> GameState {
        let mut state = GameState::new(Position::new(5, 5), Direction::Right, 3, Position::new(0, 0));
        state.score = score;
        state.game_started = started;
        state.game_over = over;
        state
    }

    #[test]
    fn test_time_formatting() {
        let mut stats = SessionStats::new(10);
        stats.elapsed_time = Duration::from_secs(125);
        assert_eq!(stats.format_time(), "02:05");

        stats.elapsed_time = Duration::from_secs(0);
        assert_eq!(stats.format_time(), "00:00");

        stats.elapsed_time = Duration::from_secs(3661);
        assert_eq!(stats.format_time(), "61:01");
    }

    #[test]
    fn test_high_score_tracking() {
        let mut stats = SessionStats::new(10);
        let t0 = Instant::now();

        for score in [30, 10, 50] {
            stats.on_state(&state(0, true, false), t0);
            stats.on_state(&state(score, true, true), t0);
        }

        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.high_score, 50);
        assert_eq!(stats.food_eaten, 5);
    }

    #[test]
    fn test_game_clock() {
        let mut stats = SessionStats::new(10);
        let t0 = Instant::now();

        stats.update(t0 + Duration::from_secs(5));
        assert_eq!(stats.elapsed_time, Duration::ZERO);

        stats.on_state(&state(0, true, false), t0);
        stats.update(t0 + Duration::from_secs(42));
        assert_eq!(stats.format_time(), "00:42");

        // frozen after game over
        stats.on_state(&state(20, true, true), t0 + Duration::from_secs(60));
        stats.update(t0 + Duration::from_secs(90));
        assert_eq!(stats.elapsed_time, Duration::from_secs(60));

        stats.on_state(&state(0, false, false), t0 + Duration::from_secs(95));
        assert_eq!(stats.elapsed_time, Duration::ZERO);
        assert_eq!(stats.score, 0);
    }

    #[test]
    fn test_command_counting_and_calories() {
        let mut stats = SessionStats::new(10);

        stats.on_command(CommandSource::Pose, Direction::Left);
        stats.on_command(CommandSource::Pose, Direction::Up);
        stats.on_command(CommandSource::Pose, Direction::Up);
        stats.on_command(CommandSource::Keyboard, Direction::Down);

        assert_eq!(stats.postures.left_hand, 1);
        assert_eq!(stats.postures.right_leg, 2);
        assert_eq!(stats.postures.left_leg, 0);
        assert_eq!(stats.postures.total(), 3);
        assert_eq!(stats.total_moves, 4);
        // 3 * 0.5 + 0.3 = 1.8
        assert_eq!(stats.calories(), 1);
    }

    #[test]
    fn test_moves_per_minute() {
        let mut stats = SessionStats::new(10);
        assert_eq!(stats.moves_per_minute(), 0);

        for _ in 0..15 {
            stats.on_command(CommandSource::Keyboard, Direction::Up);
        }
        stats.elapsed_time = Duration::from_secs(30);
        assert_eq!(stats.moves_per_minute(), 30);
    }
}

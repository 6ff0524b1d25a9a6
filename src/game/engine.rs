use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    action::Direction,
    config::GameConfig,
    grid::{is_in_bounds, pick_free_cell},
    state::{GameState, Phase, Position},
};

/// Type of collision that ended a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the grid
    Wall,
    /// Snake ran into one of its own segments
    SelfCollision,
}

/// What a single call to [`GameEngine::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Engine was not running, nothing changed
    Idle,
    /// Snake moved onto a free cell
    Moved,
    /// Snake moved onto the food and grew by one
    AteFood,
    /// Snake collided and the game is over
    Collided(CollisionType),
}

/// Handle returned by [`GameEngine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&GameState)>;

/// Owns the authoritative game state and advances it one tick at a time.
///
/// Every mutating operation (start, a running step, reset, a resize that
/// changes state) notifies all subscribers with the new state. No-ops notify
/// nobody.
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl GameEngine {
    /// Create a new engine in the not-started phase
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, rand::thread_rng().gen())
    }

    /// Create an engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = Self::initial_state(&config, &mut rng);

        Self {
            config,
            state,
            rng,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    fn initial_state(config: &GameConfig, rng: &mut StdRng) -> GameState {
        let head = Position::new(
            (config.grid_width / 2) as i32,
            (config.grid_height / 2) as i32,
        );

        let mut state = GameState::new(
            head,
            Direction::Right,
            config.initial_snake_length,
            Position::new(0, 0),
        );
        state.food = pick_free_cell(rng, config.grid_width, config.grid_height, &state.snake);
        state
    }

    /// Owned copy of the current state
    pub fn state(&self) -> GameState {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current grid size as (width, height)
    pub fn grid_size(&self) -> (u32, u32) {
        (self.config.grid_width, self.config.grid_height)
    }

    /// Register a listener called with the new state after every mutation
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GameState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, callback) in self.subscribers.iter_mut() {
            callback(state);
        }
    }

    /// Discard the current game and start a new one
    pub fn start(&mut self) {
        self.state = Self::initial_state(&self.config, &mut self.rng);
        self.state.game_started = true;
        info!(
            "game started on {}x{} grid",
            self.config.grid_width, self.config.grid_height
        );
        self.notify();
    }

    /// Discard the current game and return to the not-started phase
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.config, &mut self.rng);
        debug!("game reset");
        self.notify();
    }

    /// Commit a new heading.
    ///
    /// Ignored unless running, when `direction` is `None`, or when it is the
    /// reverse of the committed heading. Several calls between two ticks
    /// each check against the heading committed at that moment; the last
    /// accepted one is what the next step uses.
    pub fn set_direction(&mut self, direction: Option<Direction>) {
        let Some(direction) = direction else {
            return;
        };

        if !self.state.is_running() || self.state.direction.is_opposite(direction) {
            return;
        }

        self.state.direction = direction;
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) -> StepOutcome {
        if !self.state.is_running() {
            return StepOutcome::Idle;
        }

        let new_head = self.state.head().moved_in_direction(self.state.direction);

        if let Some(collision) = self.check_collision(new_head) {
            self.state.game_over = true;
            info!(
                "game over ({:?}) with score {} and length {}",
                collision,
                self.state.score,
                self.state.len()
            );
            self.notify();
            return StepOutcome::Collided(collision);
        }

        self.state.snake.insert(0, new_head);

        let outcome = if new_head == self.state.food {
            self.state.score += self.config.food_score;
            self.state.food = pick_free_cell(
                &mut self.rng,
                self.config.grid_width,
                self.config.grid_height,
                &self.state.snake,
            );
            debug!(
                "food eaten, score {}, next food at ({}, {})",
                self.state.score, self.state.food.x, self.state.food.y
            );
            StepOutcome::AteFood
        } else {
            self.state.snake.pop();
            StepOutcome::Moved
        };

        trace!("head moved to ({}, {})", new_head.x, new_head.y);
        self.notify();
        outcome
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !is_in_bounds(pos, self.config.grid_width, self.config.grid_height) {
            return Some(CollisionType::Wall);
        }

        if self.state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Change the grid dimensions.
    ///
    /// A game that has not started is rebuilt for the new grid. A running
    /// game keeps going: food outside the new bounds is moved, and a snake
    /// that no longer fits ends the game.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.grid_size() {
            return;
        }

        self.config.grid_width = width;
        self.config.grid_height = height;
        debug!("grid resized to {}x{}", width, height);

        match self.state.phase() {
            Phase::NotStarted => {
                self.state = Self::initial_state(&self.config, &mut self.rng);
                self.notify();
            }
            Phase::Running => {
                let mut changed = false;

                if !is_in_bounds(self.state.food, width, height) {
                    self.state.food = pick_free_cell(&mut self.rng, width, height, &self.state.snake);
                    changed = true;
                }

                if self
                    .state
                    .snake
                    .iter()
                    .any(|segment| !is_in_bounds(*segment, width, height))
                {
                    self.state.game_over = true;
                    info!("game over: snake no longer fits {}x{} grid", width, height);
                    changed = true;
                }

                if changed {
                    self.notify();
                }
            }
            Phase::GameOver => {}
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

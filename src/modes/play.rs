//! Interactive play mode
//!
//! One cooperative loop drives everything: a fixed-interval timer steps the
//! engine, a second timer samples the pose feed through the classifier, key
//! presses steer immediately, and a render timer redraws. Direction commands
//! that land between two ticks overwrite each other; the engine keeps no
//! queue.

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::cell::RefCell;
use std::io::{Stderr, stderr};
use std::rc::Rc;
use std::time::Instant;
use tokio::time::interval;

use crate::config::AppConfig;
use crate::game::{CommandSource, Direction, GameConfig, GameEngine, Phase, compute_grid};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::SessionStats;
use crate::pose::{DirectionClassifier, PoseSource};
use crate::render::{PoseView, Renderer};

pub struct PlayMode {
    config: AppConfig,
    engine: GameEngine,
    stats: Rc<RefCell<SessionStats>>,
    classifier: DirectionClassifier,
    pose_source: Option<Box<dyn PoseSource>>,
    renderer: Renderer,
    input_handler: InputHandler,
    last_emitted: Option<Direction>,
    should_quit: bool,
}

impl PlayMode {
    /// Build the mode. `pose_source` is `None` for keyboard-only play.
    pub fn new(config: AppConfig, pose_source: Option<Box<dyn PoseSource>>) -> Self {
        let mut engine = match config.seed {
            Some(seed) => GameEngine::with_seed(config.game.clone(), seed),
            None => GameEngine::new(config.game.clone()),
        };

        let stats = Rc::new(RefCell::new(SessionStats::new(config.game.food_score)));
        let sink = Rc::clone(&stats);
        engine.subscribe(move |state| sink.borrow_mut().on_state(state, Instant::now()));

        Self {
            classifier: DirectionClassifier::new(config.classifier.clone()),
            config,
            engine,
            stats,
            pose_source,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            last_emitted: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        if self.config.auto_grid {
            let size = terminal.size().context("Failed to read terminal size")?;
            self.fit_grid_to_terminal(size.width, size.height);
        }

        info!(
            "play mode on {}x{} grid, tick {}ms, pose feed {}",
            self.engine.grid_size().0,
            self.engine.grid_size().1,
            self.config.tick_ms,
            if self.pose_source.is_some() { "attached" } else { "off" }
        );

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.config.tick_interval());
        let mut sample_timer = interval(self.config.sample_interval());
        let mut render_timer = interval(self.config.render_interval());

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => warn!("terminal event error: {}", err),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.engine.step();
                }

                // Pose sampling
                _ = sample_timer.tick(), if self.pose_source.is_some() => {
                    self.sample_pose(Instant::now());
                }

                // Render frame
                _ = render_timer.tick() => {
                    let now = Instant::now();
                    self.stats.borrow_mut().update(now);
                    let state = self.engine.state();
                    let grid = self.engine.grid_size();
                    let pose = self.pose_view(now);
                    let stats = self.stats.borrow();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &state, grid, &stats, &pose);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }
                let action = self.input_handler.handle_key_event(key);
                self.handle_key_action(action);
            }
            Event::Resize(width, height) if self.config.auto_grid => {
                self.fit_grid_to_terminal(width, height);
            }
            _ => {}
        }
    }

    fn handle_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Steer(direction) => self.apply_command(CommandSource::Keyboard, direction),
            KeyAction::Start => {
                if self.engine.phase() != Phase::Running {
                    self.engine.start();
                }
            }
            KeyAction::Reset => self.reset_game(),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    /// Run one pose sample through the classifier and forward any command
    fn sample_pose(&mut self, now: Instant) {
        let Some(source) = self.pose_source.as_mut() else {
            return;
        };

        let pose = source.next_pose();
        if let Some(direction) = self.classifier.evaluate(pose.as_ref(), now) {
            self.last_emitted = Some(direction);
            self.apply_command(CommandSource::Pose, direction);
        }
    }

    /// Forward a direction command, starting a game that was never started
    fn apply_command(&mut self, source: CommandSource, direction: Direction) {
        if !self.engine.state().game_started {
            self.engine.start();
        }
        self.engine.set_direction(Some(direction));
        self.stats.borrow_mut().on_command(source, direction);
    }

    fn reset_game(&mut self) {
        self.engine.reset();
        self.classifier.reset();
        self.last_emitted = None;
    }

    /// Resize the grid to the board area of a `width` x `height` terminal.
    /// Terminals too small for a playable grid leave the grid unchanged.
    fn fit_grid_to_terminal(&mut self, width: u16, height: u16) {
        let (columns, rows) = Renderer::board_capacity(Rect::new(0, 0, width, height));
        let layout = compute_grid(columns, rows, 1, 1);

        let candidate = GameConfig {
            grid_width: layout.width,
            grid_height: layout.height,
            ..self.engine.config().clone()
        };
        if let Err(msg) = candidate.validate() {
            warn!("terminal {}x{} too small for a grid: {}", width, height, msg);
            return;
        }

        self.engine.resize(layout.width, layout.height);
    }

    fn pose_view(&self, now: Instant) -> PoseView {
        PoseView {
            active: self
                .pose_source
                .as_ref()
                .is_some_and(|source| !source.is_exhausted()),
            pending: self.classifier.pending(),
            progress: self.classifier.progress(now),
            last_emitted: self.last_emitted,
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

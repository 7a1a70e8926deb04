//! Simulation state and the per-frame step.
//!
//! Everything here is a free function over [`GameState`] so a whole run can be
//! driven without a terminal. The loop in `main` owns the only instance.

use crate::constants::*;
use crate::geometry::{Point, Rect};
use log::{debug, info, trace};
use rand::Rng;

// ── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    /// Top-left corner of the bounding square.
    pub pos: Point,
    pub velocity: f32,
    pub acceleration: f32,
    pub radius: f32,
}

impl Avatar {
    pub fn new() -> Self {
        Self {
            pos: Point::new(AVATAR_START_X, AVATAR_START_Y),
            velocity: 0.0,
            acceleration: GRAVITY,
            radius: AVATAR_RADIUS,
        }
    }

    pub fn bounds(&self) -> Rect {
        let side = self.radius * 2.0;
        Rect::new(self.pos.x, self.pos.y, side, side)
    }

    pub fn center(&self) -> Point {
        Point::new(self.pos.x + self.radius, self.pos.y + self.radius)
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new()
    }
}

/// An upper and a lower pipe sharing one x coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstaclePair {
    pub x: f32,
    pub upper_height: f32,
    pub lower_height: f32,
    pub scored: bool,
}

impl ObstaclePair {
    /// Builds a pair whose gap starts `upper_height` below the top edge.
    pub fn new(x: f32, upper_height: f32) -> Self {
        // 600 - (upper + gap) is exact for upper + gap in [300, 1200], so the
        // three heights always sum back to the window height.
        let lower_height = WINDOW_HEIGHT - (upper_height + PIPE_GAP);
        Self {
            x,
            upper_height,
            lower_height,
            scored: false,
        }
    }

    pub fn upper(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.upper_height)
    }

    pub fn lower(&self) -> Rect {
        Rect::new(
            self.x,
            self.upper_height + PIPE_GAP,
            PIPE_WIDTH,
            self.lower_height,
        )
    }

    pub fn is_off_screen(&self) -> bool {
        self.x + PIPE_WIDTH < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Lost,
    Won,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub avatar: Avatar,
    pub obstacles: Vec<ObstaclePair>,
    pub score: i32,
    pub spawn_timer: f32,
    pub run_state: RunState,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            avatar: Avatar::new(),
            obstacles: Vec::new(),
            score: START_SCORE,
            spawn_timer: 0.0,
            run_state: RunState::Running,
        }
    }

    pub fn is_over(&self) -> bool {
        self.run_state != RunState::Running
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn restart_button() -> Rect {
    Rect::new(RESTART_X, RESTART_Y, RESTART_W, RESTART_H)
}

// ── Physics ─────────────────────────────────────────────────────────────────

/// Semi-implicit Euler: velocity first, then position with the new velocity.
pub fn apply_gravity(avatar: &mut Avatar, dt: f32) {
    avatar.velocity += avatar.acceleration * dt;
    avatar.pos.y += avatar.velocity * dt;
}

pub fn impulse(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    state.avatar.velocity = -state.avatar.acceleration * IMPULSE_FACTOR;
}

// ── Obstacles ───────────────────────────────────────────────────────────────

pub fn spawn_obstacle<R: Rng + ?Sized>(rng: &mut R) -> ObstaclePair {
    let upper = rng.gen_range(MIN_PIPE_HEIGHT..=MAX_PIPE_HEIGHT);
    trace!("spawning pipe pair, upper height {upper:.1}");
    ObstaclePair::new(PIPE_SPAWN_X, upper)
}

/// Scrolls every pair left and drops the ones past the left edge.
pub fn advance_obstacles(obstacles: &mut Vec<ObstaclePair>, dt: f32) {
    for pair in obstacles.iter_mut() {
        pair.x -= PIPE_SPEED * dt;
    }
    obstacles.retain(|p| !p.is_off_screen());
}

// ── Rules ───────────────────────────────────────────────────────────────────

pub fn check_collision(avatar: &Avatar, obstacles: &[ObstaclePair]) -> bool {
    let bounds = avatar.bounds();
    obstacles
        .iter()
        .any(|p| bounds.intersects(&p.upper()) || bounds.intersects(&p.lower()))
}

pub fn out_of_bounds(avatar: &Avatar) -> bool {
    avatar.pos.y < 0.0 || avatar.pos.y > WINDOW_HEIGHT
}

/// Decrements the score once for each pair the avatar has newly passed.
/// Returns how many pairs were scored this call.
pub fn check_score(state: &mut GameState) -> u32 {
    let avatar_x = state.avatar.pos.x;
    let mut passed = 0;
    for pair in state.obstacles.iter_mut() {
        if !pair.scored && avatar_x > pair.x {
            pair.scored = true;
            passed += 1;
        }
    }
    state.score -= passed as i32;
    passed
}

/// Advances one frame. Does nothing once the run has ended.
pub fn update<R: Rng + ?Sized>(state: &mut GameState, dt: f32, rng: &mut R) {
    if state.is_over() {
        return;
    }

    apply_gravity(&mut state.avatar, dt);

    state.spawn_timer += dt;
    if state.spawn_timer >= PIPE_SPAWN_INTERVAL {
        state.spawn_timer = 0.0;
        let pair = spawn_obstacle(rng);
        state.obstacles.push(pair);
    }
    advance_obstacles(&mut state.obstacles, dt);

    if check_collision(&state.avatar, &state.obstacles) {
        debug!("avatar hit a pipe at y={:.1}", state.avatar.pos.y);
        state.run_state = RunState::Lost;
        return;
    }
    if out_of_bounds(&state.avatar) {
        debug!("avatar left the screen at y={:.1}", state.avatar.pos.y);
        state.run_state = RunState::Lost;
        return;
    }

    if check_score(state) > 0 {
        debug!("score now {}", state.score);
    }
    if state.score <= 0 {
        info!("target reached, run won");
        state.run_state = RunState::Won;
    }
}

pub fn restart(state: &mut GameState) {
    info!("restarting run");
    *state = GameState::new();
}

/// Restarts if the run is over and `point` hits the restart button.
pub fn try_restart_at(state: &mut GameState, point: Point) -> bool {
    if state.is_over() && restart_button().contains(point) {
        restart(state);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    /// A pair far to the left of the avatar with its gap around the avatar.
    fn passed_pair() -> ObstaclePair {
        ObstaclePair::new(0.0, 200.0)
    }

    #[test]
    fn test_gravity_scenario() {
        let mut avatar = Avatar::new();
        assert_eq!(avatar.pos.y, 300.0);
        apply_gravity(&mut avatar, 1.0);
        assert_eq!(avatar.velocity, 100.0);
        assert_eq!(avatar.pos.y, 400.0);
    }

    #[test]
    fn test_velocity_accumulates_gravity_times_dt() {
        let mut avatar = Avatar::new();
        avatar.velocity = -37.5;
        apply_gravity(&mut avatar, 0.25);
        assert_eq!(avatar.velocity, -37.5 + GRAVITY * 0.25);
    }

    #[test]
    fn test_impulse_sets_upward_velocity() {
        let mut state = GameState::new();
        state.avatar.velocity = 80.0;
        impulse(&mut state);
        assert_eq!(state.avatar.velocity, -GRAVITY * 0.5);
    }

    #[test]
    fn test_impulse_ignored_after_run_ends() {
        let mut state = GameState::new();
        state.run_state = RunState::Lost;
        state.avatar.velocity = 80.0;
        impulse(&mut state);
        assert_eq!(state.avatar.velocity, 80.0);
    }

    #[test]
    fn test_spawn_heights_fill_window() {
        let mut rng = rng();
        for _ in 0..1000 {
            let pair = spawn_obstacle(&mut rng);
            assert_eq!(pair.x, PIPE_SPAWN_X);
            assert!(pair.upper_height >= MIN_PIPE_HEIGHT);
            assert!(pair.upper_height <= MAX_PIPE_HEIGHT);
            assert_eq!(pair.upper_height + PIPE_GAP + pair.lower_height, WINDOW_HEIGHT);
            assert!(!pair.scored);
        }
    }

    #[test]
    fn test_pair_rects_leave_gap() {
        let pair = ObstaclePair::new(400.0, 120.0);
        assert_eq!(pair.upper(), Rect::new(400.0, 0.0, PIPE_WIDTH, 120.0));
        assert_eq!(pair.lower().y, 370.0);
        assert_eq!(pair.lower().bottom(), WINDOW_HEIGHT);
    }

    #[test]
    fn test_spawn_timer_fires_at_interval() {
        let mut state = GameState::new();
        let mut rng = rng();
        for _ in 0..5 {
            update(&mut state, 0.25, &mut rng);
            impulse(&mut state);
        }
        assert!(state.obstacles.is_empty());
        update(&mut state, 0.25, &mut rng);
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.spawn_timer, 0.0);
        // Spawned then scrolled within the same step.
        assert_eq!(state.obstacles[0].x, PIPE_SPAWN_X - PIPE_SPEED * 0.25);
    }

    #[test]
    fn test_advance_moves_and_prunes() {
        let mut obstacles = vec![ObstaclePair::new(-45.0, 100.0), ObstaclePair::new(500.0, 100.0)];
        advance_obstacles(&mut obstacles, 0.25);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].x, 475.0);
    }

    #[test]
    fn test_collision_with_upper_pipe() {
        let avatar = Avatar::new();
        let pair = ObstaclePair::new(110.0, 320.0);
        assert!(check_collision(&avatar, &[pair]));
    }

    #[test]
    fn test_no_collision_inside_gap() {
        let avatar = Avatar::new();
        let pair = ObstaclePair::new(110.0, 200.0);
        assert!(!check_collision(&avatar, &[pair]));
    }

    #[test]
    fn test_collision_loses_regardless_of_score() {
        let mut state = GameState::new();
        state.score = 1;
        state.obstacles.push(ObstaclePair::new(90.0, 350.0));
        update(&mut state, 0.0, &mut rng());
        assert_eq!(state.run_state, RunState::Lost);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_out_of_bounds_loses() {
        let mut state = GameState::new();
        state.avatar.pos.y = -1.0;
        update(&mut state, 0.0, &mut rng());
        assert_eq!(state.run_state, RunState::Lost);

        let mut state = GameState::new();
        state.avatar.pos.y = WINDOW_HEIGHT + 0.5;
        update(&mut state, 0.0, &mut rng());
        assert_eq!(state.run_state, RunState::Lost);
    }

    #[test]
    fn test_score_once_per_pair() {
        let mut state = GameState::new();
        state.obstacles.push(passed_pair());
        assert_eq!(check_score(&mut state), 1);
        assert_eq!(state.score, 19);
        for _ in 0..10 {
            assert_eq!(check_score(&mut state), 0);
        }
        assert_eq!(state.score, 19);
        assert!(state.obstacles[0].scored);
    }

    #[test]
    fn test_pair_ahead_not_scored() {
        let mut state = GameState::new();
        state.obstacles.push(ObstaclePair::new(100.0, 200.0));
        assert_eq!(check_score(&mut state), 0);
        assert_eq!(state.score, START_SCORE);
    }

    #[test]
    fn test_twenty_pairs_win() {
        let mut state = GameState::new();
        for _ in 0..20 {
            state.obstacles.push(passed_pair());
        }
        update(&mut state, 0.0, &mut rng());
        assert_eq!(state.score, 0);
        assert_eq!(state.run_state, RunState::Won);
    }

    #[test]
    fn test_ended_run_is_frozen() {
        let mut state = GameState::new();
        state.run_state = RunState::Won;
        let before = state.clone();
        update(&mut state, 0.5, &mut rng());
        assert_eq!(state, before);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = GameState::new();
        state.avatar.pos.y = 12.0;
        state.avatar.velocity = 33.0;
        state.score = 4;
        state.spawn_timer = 1.2;
        state.obstacles.push(passed_pair());
        state.run_state = RunState::Lost;
        restart(&mut state);
        assert_eq!(state, GameState::new());
        assert_eq!(state.avatar.pos, Point::new(100.0, 300.0));
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_restart_click_requires_ended_run() {
        let mut state = GameState::new();
        let inside = Point::new(400.0, 420.0);
        state.score = 7;
        assert!(!try_restart_at(&mut state, inside));
        assert_eq!(state.score, 7);

        state.run_state = RunState::Won;
        assert!(!try_restart_at(&mut state, Point::new(10.0, 10.0)));
        assert_eq!(state.run_state, RunState::Won);
        assert!(try_restart_at(&mut state, inside));
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.score, START_SCORE);
    }
}

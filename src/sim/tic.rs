use super::{Command, InputCmd, Mobile, move_mobile};
use crate::world::Map;
use std::time::{Duration, Instant};

pub const DEFAULT_TICK_RATE: u32 = 60;

/// Map units per tic at full deflection.
pub const SPEED: f64 = 3.0;
/// Radians per tic for keyboard turning.
pub const TURN_SPEED: f64 = 0.1;
/// Radians per pixel of horizontal mouse motion.
pub const SENSITIVITY: f64 = 0.002;
/// Player circle radius, map units.
pub const PLAYER_RADIUS: f64 = 8.0;

/// Never run more than this many tics in one `pump`; after a long stall the
/// simulation skips ahead instead of trying to catch up.
const MAX_CATCH_UP: u32 = 10;

/// Everything the simulation owns: the map, the player and the few UI
/// toggles commands can flip.
#[derive(Debug)]
pub struct Game {
    pub map: Map,
    pub player: Mobile,
    pub show_map: bool,
    pub grab_mouse: bool,
    quit: bool,
    tics: u64,
}

impl Game {
    pub fn new(map: Map, player: Mobile) -> Self {
        Self {
            map,
            player,
            show_map: false,
            grab_mouse: false,
            quit: false,
            tics: 0,
        }
    }

    #[inline]
    pub fn tics(&self) -> u64 {
        self.tics
    }

    #[inline]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// React to a one-shot command. Held commands are ignored here; they
    /// reach the game through [`InputCmd`].
    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::ToggleMap => self.show_map = !self.show_map,
            Command::ToggleGrab => self.grab_mouse = !self.grab_mouse,
            Command::Quit => self.quit = true,
            _ => {}
        }
        log::debug!("{cmd:?}");
    }

    /// Run one fixed-rate game tic: turn, then move with wall sliding.
    pub fn tick(&mut self, cmd: &InputCmd) {
        let turn = cmd.turn * TURN_SPEED + cmd.mouse_dx * SENSITIVITY;
        if turn != 0.0 {
            self.player.turn(turn);
        }

        let speed = if cmd.walk { SPEED * 0.5 } else { SPEED };
        let dir = self.player.forward() * cmd.forward + self.player.right() * cmd.strafe;
        self.player.vel = dir * speed;

        self.player = move_mobile(&self.map, self.player);
        self.tics += 1;

        log::trace!("tic {} pos {:?}", self.tics, self.player.pos);
    }
}

/// Drives [`Game::tick`] at a fixed rate, independent of the frame rate.
pub struct TicRunner {
    tic: Duration,
    last: Instant,
    /// Mouse motion seen by frames that ran no tic.
    pending_dx: f64,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE)
    }
}

impl TicRunner {
    pub fn new(rate: u32) -> Self {
        Self::starting_at(rate, Instant::now())
    }

    fn starting_at(rate: u32, now: Instant) -> Self {
        Self {
            tic: Duration::from_micros(1_000_000 / rate.max(1) as u64),
            last: now,
            pending_dx: 0.0,
        }
    }

    #[inline]
    pub fn tic_duration(&self) -> Duration {
        self.tic
    }

    /// Advance enough tics to synchronise the simulation with real time.
    /// Returns how many ran.
    pub fn pump(&mut self, game: &mut Game, cmd: &InputCmd) -> u32 {
        self.pump_until(Instant::now(), game, cmd)
    }

    fn pump_until(&mut self, now: Instant, game: &mut Game, cmd: &InputCmd) -> u32 {
        // mouse motion is turned exactly once, by the first tic that runs
        let mut cmd = *cmd;
        cmd.mouse_dx += std::mem::take(&mut self.pending_dx);

        let mut ran = 0;
        while now.duration_since(self.last) >= self.tic {
            if ran == MAX_CATCH_UP {
                log::warn!("simulation fell behind, skipping ahead");
                self.last = now;
                break;
            }
            game.tick(&cmd);
            cmd.mouse_dx = 0.0;
            self.last += self.tic;
            ran += 1;
        }

        if ran == 0 {
            self.pending_dx = cmd.mouse_dx;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Vector, VectorExt};
    use crate::world::geometry::approx_eq;
    use crate::world::map::square_room;

    fn game() -> Game {
        Game::new(
            square_room(200.0),
            Mobile::new(Vector::ZERO, Vector::X, PLAYER_RADIUS),
        )
    }

    #[test]
    fn forward_moves_by_speed() {
        let mut g = game();
        g.tick(&InputCmd {
            forward: 1.0,
            ..Default::default()
        });
        assert!(g.player.pos.approx_eq(Vector::new(SPEED, 0.0)));
        assert_eq!(g.player.vel, Vector::ZERO);
        assert_eq!(g.tics(), 1);
    }

    #[test]
    fn walking_halves_speed_and_strafe_goes_right() {
        let mut g = game();
        g.tick(&InputCmd {
            strafe: 1.0,
            walk: true,
            ..Default::default()
        });
        assert!(g.player.pos.approx_eq(Vector::new(0.0, SPEED * 0.5)));
    }

    #[test]
    fn keyboard_and_mouse_turn_add_up() {
        let mut g = game();
        g.tick(&InputCmd {
            turn: 1.0,
            mouse_dx: 50.0,
            ..Default::default()
        });
        let angle = Vector::X.angle_to(g.player.forward());
        assert!(approx_eq(angle, TURN_SPEED + 50.0 * SENSITIVITY));
    }

    #[test]
    fn player_stays_inside_room() {
        let mut g = game();
        let cmd = InputCmd {
            forward: 1.0,
            strafe: 1.0,
            ..Default::default()
        };
        for _ in 0..200 {
            g.tick(&cmd);
        }
        let limit = 100.0 - PLAYER_RADIUS;
        assert!(g.player.pos.x <= limit + 1e-9 && g.player.pos.y <= limit + 1e-9);
        assert!(g.player.pos.x > limit - 5.0, "should have reached the wall");
    }

    #[test]
    fn one_shot_commands_flip_state() {
        let mut g = game();
        g.handle(Command::ToggleMap);
        g.handle(Command::ToggleGrab);
        g.handle(Command::Forward);
        assert!(g.show_map && g.grab_mouse && !g.should_quit());
        g.handle(Command::ToggleMap);
        g.handle(Command::Quit);
        assert!(!g.show_map && g.should_quit());
    }

    #[test]
    fn pump_runs_whole_tics_only() {
        let start = Instant::now();
        let mut runner = TicRunner::starting_at(60, start);
        let mut g = game();
        let idle = InputCmd::default();

        let tic = runner.tic_duration();
        assert_eq!(runner.pump_until(start + tic / 2, &mut g, &idle), 0);
        assert_eq!(runner.pump_until(start + tic * 3 + tic / 2, &mut g, &idle), 3);
        assert_eq!(g.tics(), 3);
    }

    #[test]
    fn pump_caps_catch_up() {
        let start = Instant::now();
        let mut runner = TicRunner::starting_at(60, start);
        let mut g = game();
        let ran = runner.pump_until(start + Duration::from_secs(5), &mut g, &InputCmd::default());
        assert_eq!(ran, MAX_CATCH_UP);
    }

    #[test]
    fn mouse_motion_is_not_lost_between_tics() {
        let start = Instant::now();
        let mut runner = TicRunner::starting_at(60, start);
        let mut g = game();
        let tic = runner.tic_duration();
        let look = InputCmd {
            mouse_dx: 100.0,
            ..Default::default()
        };

        // frame too short for a tic: motion is kept
        runner.pump_until(start + tic / 4, &mut g, &look);
        assert_eq!(g.player.forward(), Vector::X);

        // next frame runs two tics, the motion is applied once
        runner.pump_until(start + tic * 2, &mut g, &look);
        let angle = Vector::X.angle_to(g.player.forward());
        assert!(approx_eq(angle, 200.0 * SENSITIVITY));
    }
}

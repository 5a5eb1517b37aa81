mod collision;
mod input;
mod mobile;
mod tic;

pub use collision::{
    Collision, Contact, ContactKind, MAX_SLIDE_DEPTH, STAND_OFF, check_collision, check_point,
    check_segment, move_mobile, move_once,
};
pub use input::{Command, InputCmd, KeyMap};
pub use mobile::Mobile;
pub use tic::{
    DEFAULT_TICK_RATE, Game, PLAYER_RADIUS, SENSITIVITY, SPEED, TURN_SPEED, TicRunner,
};

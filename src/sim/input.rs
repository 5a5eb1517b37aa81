//! Keyboard / mouse → per-tic command.
//!
//! Keys are looked up in a [`KeyMap`] and turned into [`Command`]s; the held
//! ones are folded into an [`InputCmd`] that the tic consumes, the one-shot
//! ones are handed back to the caller as events.

use minifb::Key;

/// Everything a key can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    /// Move at half speed while held.
    Walk,
    ToggleMap,
    ToggleGrab,
    Quit,
}

impl Command {
    /// Held commands act on every tic their key is down; the rest fire once
    /// per key press.
    #[inline]
    pub fn is_held(self) -> bool {
        !matches!(self, Command::ToggleMap | Command::ToggleGrab | Command::Quit)
    }
}

/// Key → command table. A key carries at most one command; a command can
/// sit on any number of keys.
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: Vec<(Key, Command)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        use Command::*;
        Self {
            bindings: vec![
                (Key::W, Forward),
                (Key::Up, Forward),
                (Key::S, Backward),
                (Key::Down, Backward),
                (Key::A, StrafeLeft),
                (Key::D, StrafeRight),
                (Key::H, TurnLeft),
                (Key::Left, TurnLeft),
                (Key::L, TurnRight),
                (Key::Right, TurnRight),
                (Key::LeftShift, Walk),
                (Key::Tab, ToggleMap),
                (Key::G, ToggleGrab),
                (Key::Q, Quit),
                (Key::Escape, Quit),
            ],
        }
    }
}

impl KeyMap {
    /// Table with no bindings at all.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `key` to `cmd`, replacing whatever `key` did before.
    pub fn bind(&mut self, key: Key, cmd: Command) {
        self.unbind(key);
        self.bindings.push((key, cmd));
    }

    pub fn unbind(&mut self, key: Key) {
        self.bindings.retain(|&(k, _)| k != key);
    }

    #[inline]
    pub fn command(&self, key: Key) -> Option<Command> {
        self.bindings
            .iter()
            .find_map(|&(k, c)| (k == key).then_some(c))
    }

    /// Commands for `keys`, unbound keys skipped.
    pub fn commands<'a, I>(&'a self, keys: I) -> impl Iterator<Item = Command> + 'a
    where
        I: IntoIterator<Item = Key>,
        I::IntoIter: 'a,
    {
        keys.into_iter().filter_map(|k| self.command(k))
    }
}

/// What the player asks for during one tic.
///
/// Axes are in `-1 ..= 1`; positive means forward / right / clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputCmd {
    pub forward: f64,
    pub strafe: f64,
    pub turn: f64,
    pub walk: bool,
    /// Relative horizontal mouse motion, pixels.
    pub mouse_dx: f64,
}

impl InputCmd {
    /// Fold the currently held commands into a tic command. Opposing
    /// directions cancel, and binding a direction twice does not go faster.
    pub fn from_held<I>(held: I, mouse_dx: f64) -> Self
    where
        I: IntoIterator<Item = Command>,
    {
        let mut down = [false; 6];
        let mut walk = false;
        for cmd in held {
            match cmd {
                Command::Forward => down[0] = true,
                Command::Backward => down[1] = true,
                Command::StrafeRight => down[2] = true,
                Command::StrafeLeft => down[3] = true,
                Command::TurnRight => down[4] = true,
                Command::TurnLeft => down[5] = true,
                Command::Walk => walk = true,
                _ => {}
            }
        }
        let axis = |pos: bool, neg: bool| pos as i32 as f64 - neg as i32 as f64;

        Self {
            forward: axis(down[0], down[1]),
            strafe: axis(down[2], down[3]),
            turn: axis(down[4], down[5]),
            walk,
            mouse_dx,
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.turn == 0.0 && self.mouse_dx == 0.0
    }
}

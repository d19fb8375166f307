//! Non-blocking operator key input.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{debug, warn};
use wavestream_core::command::KeyInput;

/// A source of operator keys polled once per loop iteration.
pub trait KeySource {
    /// Returns at most one pending key without blocking.
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>>;
}

/// Puts the terminal in raw mode and restores it when dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        debug!("Terminal switched to raw mode");
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        match terminal::disable_raw_mode() {
            Ok(()) => debug!("Terminal restored"),
            Err(err) => warn!(error = %err, "Failed to restore terminal mode"),
        }
    }
}

/// Keys read from the controlling terminal in raw mode.
#[derive(Debug)]
pub struct TerminalKeys {
    _raw: RawModeGuard,
}

impl TerminalKeys {
    pub fn acquire() -> io::Result<Self> {
        Ok(Self {
            _raw: RawModeGuard::acquire()?,
        })
    }
}

impl KeySource for TerminalKeys {
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = map_key(key) {
                    return Ok(Some(input));
                }
            }
        }
        Ok(None)
    }
}

fn map_key(key: KeyEvent) -> Option<KeyInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyInput::Interrupt)
        }
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        _ => None,
    }
}

/// Never yields a key. Used when stdin is not a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl KeySource for Headless {
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        Ok(None)
    }
}

/// Replays a fixed sequence of keys, one per poll.
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeys {
    keys: VecDeque<Option<KeyInput>>,
}

impl ScriptedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a key for the next free poll.
    pub fn key(mut self, c: char) -> Self {
        self.keys.push_back(Some(KeyInput::Char(c)));
        self
    }

    /// Queues `polls` polls that return nothing.
    pub fn idle(mut self, polls: usize) -> Self {
        self.keys.extend(std::iter::repeat(None).take(polls));
        self
    }

    pub fn interrupt(mut self) -> Self {
        self.keys.push_back(Some(KeyInput::Interrupt));
        self
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        Ok(self.keys.pop_front().flatten())
    }
}

impl<K: KeySource + ?Sized> KeySource for Box<K> {
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        (**self).poll_key()
    }
}

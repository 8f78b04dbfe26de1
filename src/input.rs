use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// number of keys on the hex keypad
pub const KEY_COUNT: usize = 16;

/// Key matrix shared between the input thread (writer) and the interpreter
/// (reader). Each key is its own atomic; nobody needs a consistent view of
/// more than one key at a time.
#[derive(Debug, Default)]
pub struct KeyLatch {
    keys: [AtomicBool; KEY_COUNT],
}

impl KeyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// key index is masked to 4 bits
    pub fn set(&self, key: u8, down: bool) {
        self.keys[(key & 0xf) as usize].store(down, Ordering::Relaxed);
    }

    /// key index is masked to 4 bits
    pub fn is_down(&self, key: u8) -> bool {
        self.keys[(key & 0xf) as usize].load(Ordering::Relaxed)
    }

    /// lowest-numbered key currently held
    pub fn first_down(&self) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|&k| self.is_down(k))
    }

    pub fn release_all(&self) {
        for k in &self.keys {
            k.store(false, Ordering::Relaxed);
        }
    }
}

/// Emulator controls that don't go to the keypad.
#[derive(Debug, Default)]
pub struct Controls {
    pub quit: AtomicBool,
    pub paused: AtomicBool,
    pub step_once: AtomicBool,
}

impl Controls {
    pub fn new(paused: bool) -> Self {
        Controls {
            paused: AtomicBool::new(paused),
            ..Self::default()
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }

    /// true if the driver may run an instruction now; consumes a pending
    /// single-step while paused
    pub fn may_step(&self) -> bool {
        !self.paused.load(Ordering::Relaxed) || self.step_once.swap(false, Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// hex keypad key 0x0-0xf went down
    Key(u8),
    Pause,
    Step,
    Quit,
}

/// map of the left-hand side of a qwerty keyboard onto the COSMAC hex keypad
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// reads keypresses
pub trait Input {
    /// wait up to `timeout` for the next event we understand
    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, io::Error>;
}

/// keyboard input from the terminal, read with crossterm in raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }

    fn map_key(&self, evt: KeyEvent) -> Option<InputEvent> {
        match evt.code {
            KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            KeyCode::Char('p') => Some(InputEvent::Pause),
            KeyCode::Char('n') => Some(InputEvent::Step),
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => Some(InputEvent::Key(*mapped_key)),
                None => {
                    log::warn!("can't map {:?} to a COSMAC key", key);
                    None
                }
            },
            _ => None,
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("failed to leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, io::Error> {
        if !poll(timeout)? {
            return Ok(None);
        }
        match read()? {
            Event::Key(evt) => Ok(self.map_key(evt)),
            _ => Ok(None),
        }
    }
}

/// dummy Input implementation for testing
pub struct DummyInput {
    events: VecDeque<InputEvent>,
}

impl DummyInput {
    pub fn new(events: &[InputEvent]) -> Self {
        DummyInput {
            events: events.iter().copied().collect(),
        }
    }
}

impl Input for DummyInput {
    fn next_event(&mut self, _timeout: Duration) -> Result<Option<InputEvent>, io::Error> {
        Ok(self.events.pop_front())
    }
}

/// Terminals only report key presses (plus autorepeat), never releases, so a
/// key counts as held until this long after its last press.
pub const KEY_HOLD: Duration = Duration::from_millis(150);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Moves events from an `Input` onto the shared latch and controls.
pub struct InputPump<I: Input> {
    input: I,
    latch: Arc<KeyLatch>,
    controls: Arc<Controls>,
    pressed_at: [Option<Instant>; KEY_COUNT],
}

impl<I: Input> InputPump<I> {
    pub fn new(input: I, latch: Arc<KeyLatch>, controls: Arc<Controls>) -> Self {
        InputPump {
            input,
            latch,
            controls,
            pressed_at: [None; KEY_COUNT],
        }
    }

    /// handle at most one event, then release keys whose hold has run out
    pub fn pump_once(&mut self, now: Instant) -> Result<(), io::Error> {
        match self.input.next_event(POLL_INTERVAL)? {
            Some(InputEvent::Key(k)) => {
                let k = k & 0xf;
                self.latch.set(k, true);
                self.pressed_at[k as usize] = Some(now);
            }
            Some(InputEvent::Pause) => {
                let was = self.controls.paused.fetch_xor(true, Ordering::Relaxed);
                log::info!("{}", if was { "resumed" } else { "paused" });
            }
            Some(InputEvent::Step) => self.controls.step_once.store(true, Ordering::Relaxed),
            Some(InputEvent::Quit) => self.controls.quit.store(true, Ordering::Relaxed),
            None => {}
        }

        for (k, pressed) in self.pressed_at.iter_mut().enumerate() {
            if matches!(pressed, Some(t) if now.saturating_duration_since(*t) >= KEY_HOLD) {
                self.latch.set(k as u8, false);
                *pressed = None;
            }
        }
        Ok(())
    }
}

/// run the pump on its own thread until quit is requested; if input fails
/// the thread asks the emulator to quit too
pub fn spawn_input_thread<I>(mut pump: InputPump<I>) -> thread::JoinHandle<Result<(), io::Error>>
where
    I: Input + Send + 'static,
{
    thread::spawn(move || {
        let mut result = Ok(());
        while !pump.controls.should_quit() {
            if let Err(e) = pump.pump_once(Instant::now()) {
                log::error!("input: {}", e);
                pump.controls.quit.store(true, Ordering::Relaxed);
                result = Err(e);
            }
        }
        pump.latch.release_all();
        result
    })
}

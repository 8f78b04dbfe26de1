use beep::beep;
use std::error::Error;

/// The buzzer. The emulator calls `sync` after every step with whether the
/// sound timer is running; implementations only see the edges.
pub trait Sound {
    fn start(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_sounding(&self) -> bool;

    fn sync(&mut self, active: bool) -> Result<(), Box<dyn Error>> {
        match (active, self.is_sounding()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker tone, via the `beep` crate (needs access to the console device)
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn start(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_sounding(&self) -> bool {
        self.is_beeping
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.is_beeping {
            let _ = beep(0);
        }
    }
}

/// silence, but keeps track of what would have been heard
#[derive(Default)]
pub struct Mute {
    sounding: bool,
    pub starts: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn start(&mut self) -> Result<(), Box<dyn Error>> {
        self.sounding = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.sounding = false;
        Ok(())
    }

    fn is_sounding(&self) -> bool {
        self.sounding
    }
}

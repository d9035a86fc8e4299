use super::concurrent;
use embedded_hal::digital::v2::{InputPin, OutputPin};

#[derive(Debug, PartialEq)]
pub enum Error {}

/// A pin that replays a recorded sequence of line levels, one per read.
///
/// Tests are run concurrently, so each pin tracks its read cursor under a
/// unique name in a shared registry rather than in a static.
#[derive(Debug)]
pub struct Pin {
    line_levels: Option<Vec<u8>>,
    name: &'static str,
    idle_level: bool,
}

impl Pin {
    pub fn new(name: &'static str) -> Pin {
        concurrent::reset_cursor(name);
        Pin {
            line_levels: None,
            name,
            idle_level: false,
        }
    }

    /// Sets the level reported forever when no transmission is loaded.
    pub fn set_idle_level(&mut self, is_high: bool) {
        self.idle_level = is_high;
        self.line_levels = None;
    }

    /// Loads the levels the pin will report, one per read.
    pub fn set_line_levels(&mut self, levels: Vec<u8>) {
        self.line_levels = Some(levels);
        concurrent::reset_cursor(self.name);
    }
}

impl InputPin for Pin {
    type Error = Error;

    fn is_high(&self) -> Result<bool, Self::Error> {
        if self.line_levels.is_none() {
            return Ok(self.idle_level);
        }

        let index = concurrent::advance_cursor(self.name);
        Ok(self.line_levels.as_ref().unwrap()[index] > 0)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|is_high| !is_high)
    }
}

impl OutputPin for Pin {
    type Error = Error;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

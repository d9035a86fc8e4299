use embedded_hal::digital::v2::InputPin;
use heapless::Vec;

use crate::frame::Level;

/// How many consecutive unchanged reads mark the end of a transmission.
pub const MAX_UNCHANGED_SAMPLES: u16 = 100;

/// Default capacity for one acquisition window, in samples.
///
/// A full transmission is bounded by the preamble, 40 pulses of a few
/// samples each, and the unchanged tail, so this leaves generous headroom.
pub const SAMPLE_CAPACITY: usize = 1024;

/// Captures one acquisition window from the line.
///
/// Reads the pin as fast as the HAL allows, recording every observed level
/// (including the trailing run of repeated values), until the level has
/// remained unchanged for more than `max_unchanged` consecutive reads or
/// the buffer is full. The caller must have performed the wake sequence
/// (drive the line low, then release it) before calling this; HAL read
/// errors propagate unchanged.
pub fn capture<TPin, TError, const N: usize>(
    pin: &TPin,
    max_unchanged: u16,
) -> Result<Vec<Level, N>, TError>
where
    TPin: InputPin<Error = TError>,
{
    let mut samples = Vec::new();
    let mut last: Option<Level> = None;
    let mut unchanged = 0u16;

    loop {
        let level = Level::from(pin.is_high()?);
        if samples.push(level).is_err() {
            // Hard cap on the window.
            break;
        }
        if last == Some(level) {
            unchanged += 1;
            if unchanged > max_unchanged {
                break;
            }
        } else {
            unchanged = 0;
            last = Some(level);
        }
    }

    Ok(samples)
}

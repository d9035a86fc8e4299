use core::fmt;

/// The number of data pulses the sensor sends in one transmission.
pub const PULSES_PER_FRAME: usize = 40;

/// The number of bytes packed into one frame: humidity integer, humidity
/// fraction, temperature integer, temperature fraction, checksum.
pub const BYTES_PER_FRAME: usize = 5;

/// A single line-level sample, captured once per polling tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(is_high: bool) -> Level {
        if is_high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// A detected deviation from the expected frame shape or checksum.
///
/// Corruption is frequent under electrical noise and is reported as an
/// ordinary value so callers can retry or record a sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CorruptFrame {
    /// The sample sequence did not frame into exactly
    /// [`PULSES_PER_FRAME`] pulses.
    WrongPulseCount(usize),
    /// The checksum byte did not match the truncated sum of the four data
    /// bytes.
    ChecksumMismatch { expected: u8, actual: u8 },
}

impl fmt::Display for CorruptFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptFrame::WrongPulseCount(count) => {
                write!(f, "framed {} pulses, expected {}", count, PULSES_PER_FRAME)
            }
            CorruptFrame::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum byte {:#04x}, expected {:#04x}", actual, expected)
            }
        }
    }
}

/// A validated reading decoded from one frame.
///
/// The fractional humidity and temperature bytes participate in checksum
/// validation but are not surfaced; this sensor family reports 0 for both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Relative humidity, in whole percent.
    pub humidity: u8,
    /// Temperature, in whole degrees Celsius.
    pub temperature: u8,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RH: {}%, T: {}\u{00B0}C", self.humidity, self.temperature)
    }
}

/// Framing progress over one sample sequence.
///
/// Each state is entered exactly once, in order, except for the
/// `DataPullUp`/`DataPullDown` pair, which alternates once per data pulse.
/// A single sample causes at most one transition.
#[derive(Clone, Copy, PartialEq)]
enum FramerState {
    InitPullDown,
    InitPullUp,
    DataFirstPullDown,
    DataPullUp,
    DataPullDown,
}

/// Scans the sample sequence for the preamble and measures the width of
/// every data pulse, in sample ticks.
///
/// The running counter advances on every sample and is reset when a pulse
/// starts, so a recorded width equals the length of the pulse's HIGH run.
/// Pulses beyond [`PULSES_PER_FRAME`] are counted but not stored.
fn measure_pulses(samples: &[Level]) -> Result<[u32; PULSES_PER_FRAME], CorruptFrame> {
    let mut widths = [0u32; PULSES_PER_FRAME];
    let mut count = 0usize;
    let mut state = FramerState::InitPullDown;
    let mut run_length = 0u32;

    for &level in samples {
        run_length += 1;
        match state {
            FramerState::InitPullDown if level == Level::Low => {
                state = FramerState::InitPullUp;
            }
            FramerState::InitPullUp if level == Level::High => {
                state = FramerState::DataFirstPullDown;
            }
            FramerState::DataFirstPullDown if level == Level::Low => {
                state = FramerState::DataPullUp;
            }
            FramerState::DataPullUp if level == Level::High => {
                // Start of a pulse; time it from here.
                run_length = 0;
                state = FramerState::DataPullDown;
            }
            FramerState::DataPullDown if level == Level::Low => {
                if count < PULSES_PER_FRAME {
                    widths[count] = run_length;
                }
                count += 1;
                state = FramerState::DataPullUp;
            }
            _ => {}
        }
    }

    if count != PULSES_PER_FRAME {
        return Err(CorruptFrame::WrongPulseCount(count));
    }
    Ok(widths)
}

/// Midpoint between the shortest and longest pulse in the frame.
///
/// The threshold adapts per frame, which tolerates clock-rate and
/// temperature-dependent timing drift between transmissions. A frame
/// containing only one kind of pulse classifies as all zero bits.
fn pulse_threshold(widths: &[u32]) -> u32 {
    let mut shortest = u32::MAX;
    let mut longest = 0u32;
    for &width in widths {
        if width < shortest {
            shortest = width;
        }
        if width > longest {
            longest = width;
        }
    }
    (shortest + longest) / 2
}

fn pack_byte(widths: &[u32], threshold: u32) -> u8 {
    let mut byte = 0u8;
    for i in 0..8 {
        if widths[i] > threshold {
            byte |= 1 << (7 - i);
        }
    }
    byte
}

/// Decodes an already-measured pulse-width list into a reading.
///
/// Classifies each width against the per-frame threshold, packs the bits
/// into [`BYTES_PER_FRAME`] bytes most-significant-bit first, and validates
/// the checksum. Any list length other than [`PULSES_PER_FRAME`] is
/// corrupt.
pub fn decode_pulses(widths: &[u32]) -> Result<Reading, CorruptFrame> {
    if widths.len() != PULSES_PER_FRAME {
        return Err(CorruptFrame::WrongPulseCount(widths.len()));
    }

    let threshold = pulse_threshold(widths);
    let mut bytes = [0u8; BYTES_PER_FRAME];
    for (i, bit_widths) in widths.chunks(8).enumerate() {
        bytes[i] = pack_byte(bit_widths, threshold);
    }

    let sum: u16 = bytes[0] as u16 + bytes[1] as u16 + bytes[2] as u16 + bytes[3] as u16;
    // The low byte of the sum should match the checksum byte.
    let expected = sum.to_be_bytes()[1];
    if bytes[4] != expected {
        return Err(CorruptFrame::ChecksumMismatch {
            expected,
            actual: bytes[4],
        });
    }

    Ok(Reading {
        humidity: bytes[0],
        temperature: bytes[2],
    })
}

/// Decodes one captured sample sequence into a validated reading.
///
/// This is a pure function of its input: the same sample sequence always
/// produces the same outcome, and corruption is returned as a value rather
/// than raised.
pub fn decode(samples: &[Level]) -> Result<Reading, CorruptFrame> {
    decode_pulses(&measure_pulses(samples)?)
}

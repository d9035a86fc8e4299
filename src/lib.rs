#![no_std]

/// A driver for reading DHT11 humidity/temperature sensors over a single GPIO pin.
pub mod dht11;
/// Decoding of the sensor's self-clocked pulse transmission into a validated reading.
///
/// Everything in this module is a pure transformation over an already-captured
/// sample buffer; it performs no I/O and holds no state between calls.
pub mod frame;
/// Capture of raw line-level samples for one acquisition window.
pub mod sampler;

use core::time::Duration;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::frame::{self, CorruptFrame, Reading};
use crate::sampler::{self, SAMPLE_CAPACITY};

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<TIoError> {
    /// Wrapped error from the HAL.
    Wrapped(TIoError),
    /// Invalid argument was provided.
    InvalidArgument,
    /// The transmission did not decode to a valid reading for any attempt.
    Corrupt(CorruptFrame),
}

impl<TIoError> From<TIoError> for Error<TIoError> {
    fn from(error: TIoError) -> Error<TIoError> {
        Error::Wrapped(error)
    }
}

/// The minimum read interval of a DHT11.
///
/// Note that this can vary a bit by device, so check your device's datasheet
/// to be sure. Try doubling this value if you are encountering problems.
pub const MIN_READ_INTERVAL: Duration = Duration::from_millis(1000);

// The host holds the line idle, then pulls it down for long enough that the
// sensor cannot miss the request.
const WAKE_IDLE_DURATION: Duration = Duration::from_millis(50);
const WAKE_PULL_DOWN_DURATION: Duration = Duration::from_millis(20);

/// Options to modify the behavior of the driver.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// The minimum time interval that must pass between reads. Cannot be
    /// below the sensor's absolute minimum read interval
    /// ([`MIN_READ_INTERVAL`]).
    pub min_read_interval: Duration,
    /// The maximum number of read attempts for any call to [`Dht11::read`].
    ///
    /// Keep in mind the `min_read_interval` when setting this option. For
    /// example, if the `min_read_interval` is set to 2 seconds, and this is
    /// set to 3 attempts, each read could take over 6 seconds.
    pub max_attempts: u8,
}

pub const DEFAULT_OPTIONS: Options = Options {
    min_read_interval: MIN_READ_INTERVAL,
    max_attempts: 1,
};

/// A DHT11 sensor on a single open-drain pin.
///
/// The pin must implement both [`InputPin`] and [`OutputPin`]; setting it
/// high releases the line so the sensor can drive the response.
#[derive(Debug)]
pub struct Dht11<TPin, TimeFn, ElapsedFn, TTime>
where
    TimeFn: Fn() -> TTime,
    ElapsedFn: Fn(TTime) -> Duration,
    TTime: Copy,
{
    pin: TPin,
    last_read_time: TTime,
    time_fn: TimeFn,
    elapsed_since_fn: ElapsedFn,
    options: Options,
}

impl<TPin, TError, TimeFn, ElapsedFn, TTime> Dht11<TPin, TimeFn, ElapsedFn, TTime>
where
    TPin: InputPin<Error = TError> + OutputPin<Error = TError>,
    TimeFn: Fn() -> TTime,
    ElapsedFn: Fn(TTime) -> Duration,
    TTime: Copy,
{
    /// Constructs a DHT sensor that reads from the given pin.
    ///
    /// Reads can sometimes be more reliable with a longer delay, eg. 2
    /// seconds, so consider setting the `options` value with a longer
    /// minimum read interval if error rates are high. If options is `None`,
    /// then [`DEFAULT_OPTIONS`] is used.
    ///
    /// Setting [`Options::max_attempts`] to a value greater than 1 will
    /// enable [`Dht11::read`] to seamlessly retry [`Error::Corrupt`]
    /// results. Keep in mind that the minimum read interval must pass
    /// between each attempt, so each attempt adds significantly to the
    /// duration of a read.
    ///
    /// The provided `time_fn` closure should provide some representation of
    /// a given instant that can be used with `elapsed_since_fn` to determine
    /// how much time has passed since then. It does not need to reflect real
    /// dates and times, but only needs to be capable of providing reasonably
    /// accurate durations (i.e. with millisecond precision or better).
    pub fn new(
        pin: TPin,
        time_fn: TimeFn,
        elapsed_since_fn: ElapsedFn,
        options: Option<Options>,
    ) -> Result<Dht11<TPin, TimeFn, ElapsedFn, TTime>, Error<TError>> {
        Ok(Dht11 {
            pin,
            last_read_time: time_fn(),
            time_fn,
            elapsed_since_fn,
            options: if options.is_none() {
                DEFAULT_OPTIONS
            } else {
                let options = options.unwrap();
                if options.min_read_interval < MIN_READ_INTERVAL || options.max_attempts < 1 {
                    return Err(Error::InvalidArgument);
                }
                options
            },
        })
    }

    /// Reads one validated measurement from the sensor.
    ///
    /// This will asynchronously sleep using the provided `delay_fn` if
    /// `read` is called within the minimum read interval of the sensor. The
    /// provided function needs to be capable of millisecond precision or
    /// better.
    ///
    /// Corrupt transmissions are decoded again from a fresh acquisition, up
    /// to [`Options::max_attempts`] attempts; wrapped HAL errors are
    /// returned immediately.
    ///
    /// Due to the tight timing necessary to distinguish bits in the
    /// sensor's response, this performs blocking I/O reads while receiving
    /// data. This blocking portion takes a few milliseconds.
    pub async fn read<DelayFn, EmptyFuture>(
        &mut self,
        delay_fn: DelayFn,
    ) -> Result<Reading, Error<TError>>
    where
        DelayFn: Copy + Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        let mut last_result: Option<Result<Reading, Error<TError>>> = None;
        for _ in 0..self.options.max_attempts {
            last_result = Some(self.read_once(delay_fn).await);
            match last_result.as_ref().unwrap() {
                &Ok(_) => return last_result.unwrap(),
                &Err(Error::Corrupt(_)) => {}
                _ => return last_result.unwrap(),
            }
        }
        if let Some(final_result) = last_result {
            return final_result;
        }
        panic!("The sensor was never read. This should not be possible.");
    }

    async fn read_once<DelayFn, EmptyFuture>(
        &mut self,
        delay_fn: DelayFn,
    ) -> Result<Reading, Error<TError>>
    where
        DelayFn: Fn(Duration) -> EmptyFuture,
        EmptyFuture: core::future::Future<Output = ()>,
    {
        let elapsed_since_last_read = (self.elapsed_since_fn)(self.last_read_time);
        if elapsed_since_last_read < self.options.min_read_interval {
            let to_wait = self.options.min_read_interval - elapsed_since_last_read;
            delay_fn(to_wait).await;
        }

        // Wake sequence: hold the line idle, pull it down to request data,
        // then release it so the sensor can drive the response.
        self.pin.set_high()?;
        delay_fn(WAKE_IDLE_DURATION).await;
        self.pin.set_low()?;
        delay_fn(WAKE_PULL_DOWN_DURATION).await;
        self.pin.set_high()?;

        let samples = sampler::capture::<_, _, SAMPLE_CAPACITY>(
            &self.pin,
            sampler::MAX_UNCHANGED_SAMPLES,
        )?;
        self.last_read_time = (self.time_fn)();

        frame::decode(&samples).map_err(Error::Corrupt)
    }
}

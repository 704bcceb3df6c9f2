//! Timestamp generation for a run.

use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::Tz;

use crate::error::LossError;

/// Largest allowed sampling interval, one day.
pub const MAX_INTERVAL_MINUTES: u32 = 24 * 60;

/// A clock that steps a timezone-aware instant at a fixed interval.
///
/// Steps are taken in absolute time, so a DST shift changes the wall-clock
/// labels but never the spacing.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Timelike};
/// use chrono_tz::Tz;
/// use clearsky_loss::sim::clock::Clock;
///
/// let start = Tz::UTC.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
/// let mut clock = Clock::new(start, Duration::hours(1), 3);
/// let mut hours = Vec::new();
///
/// clock.run(|t| hours.push(t.hour()));
/// assert_eq!(hours, vec![0, 1, 2]);
/// ```
pub struct Clock {
    /// Instant of step 0
    start: DateTime<Tz>,
    /// Spacing between steps
    step: Duration,
    /// Current step
    current: usize,
    /// Total steps to produce
    total: usize,
}

impl Clock {
    /// Creates a clock that yields `total` instants starting at `start`.
    ///
    /// # Arguments
    ///
    /// * `start` - First instant produced
    /// * `step` - Spacing between instants
    /// * `total` - Number of instants produced
    pub fn new(start: DateTime<Tz>, step: Duration, total: usize) -> Self {
        Self {
            start,
            step,
            current: 0,
            total,
        }
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some(instant)` - The instant for the current step before advancing
    /// * `None` - If the clock has produced all its steps
    pub fn tick(&mut self) -> Option<DateTime<Tz>> {
        if self.current >= self.total {
            return None;
        }
        let offset = self.step * i32::try_from(self.current).ok()?;
        self.current += 1;
        Some(self.start + offset)
    }

    /// Runs a function for each remaining instant.
    pub fn run(&mut self, mut f: impl FnMut(DateTime<Tz>)) {
        while let Some(t) = self.tick() {
            f(t);
        }
    }
}

/// Ordered, evenly spaced timestamps in one timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Tz>>,
    interval: Duration,
}

impl TimeSeries {
    /// Every interval of a calendar year in `tz`, from 1 January 00:00
    /// inclusive to the next 1 January 00:00 exclusive.
    ///
    /// An hourly 2017 series has 8760 points.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the interval is out of range or local
    /// midnight on 1 January does not exist in `tz`.
    pub fn year(year: i32, tz: Tz, interval_minutes: u32) -> Result<Self, LossError> {
        let start = local_midnight(tz, year, 1, 1)?;
        let end = local_midnight(tz, year + 1, 1, 1)?;
        Self::range(start, end, interval_minutes)
    }

    /// Every interval in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the interval is out of range or the range
    /// contains no instant.
    pub fn range(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        interval_minutes: u32,
    ) -> Result<Self, LossError> {
        let interval = interval(interval_minutes)?;
        let span = end.signed_duration_since(start);
        if span <= Duration::zero() {
            return Err(LossError::invalid(
                "end",
                end.to_rfc3339(),
                format!("must be after start {}", start.to_rfc3339()),
            ));
        }
        let steps = span.num_seconds() / interval.num_seconds();
        let total = if span.num_seconds() % interval.num_seconds() == 0 {
            steps
        } else {
            steps + 1
        };
        let total = usize::try_from(total).map_err(|_| {
            LossError::invalid("end", end.to_rfc3339(), "range is too long")
        })?;

        let mut timestamps = Vec::with_capacity(total);
        Clock::new(start, interval, total).run(|t| timestamps.push(t));
        Ok(Self {
            timestamps,
            interval,
        })
    }

    /// Wraps caller-supplied timestamps sampled every `interval_minutes`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the list is empty, not strictly increasing,
    /// or the interval is out of range.
    pub fn from_timestamps(
        timestamps: Vec<DateTime<Tz>>,
        interval_minutes: u32,
    ) -> Result<Self, LossError> {
        let interval = interval(interval_minutes)?;
        if timestamps.is_empty() {
            return Err(LossError::invalid(
                "timestamps",
                "[]",
                "time series must contain at least one timestamp",
            ));
        }
        if let Some(w) = timestamps.windows(2).find(|w| w[1] <= w[0]) {
            return Err(LossError::invalid(
                "timestamps",
                w[1].to_rfc3339(),
                format!("must be after {}", w[0].to_rfc3339()),
            ));
        }
        Ok(Self {
            timestamps,
            interval,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Tz>] {
        &self.timestamps
    }

    /// Sampling interval in hours, used to turn W/m² sums into energy.
    pub fn interval_hours(&self) -> f64 {
        self.interval.num_seconds() as f64 / 3600.0
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timestamps.first().map(|t| t.timezone())
    }
}

fn interval(minutes: u32) -> Result<Duration, LossError> {
    if minutes == 0 || minutes > MAX_INTERVAL_MINUTES {
        return Err(LossError::invalid(
            "interval_minutes",
            minutes,
            "must be within [1, 1440]",
        ));
    }
    Ok(Duration::minutes(i64::from(minutes)))
}

fn local_midnight(tz: Tz, year: i32, month: u32, day: u32) -> Result<DateTime<Tz>, LossError> {
    tz.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .earliest()
        .ok_or_else(|| {
            LossError::invalid(
                "year",
                year,
                format!("midnight on {year}-{month:02}-{day:02} does not exist in {tz}"),
            )
        })
}

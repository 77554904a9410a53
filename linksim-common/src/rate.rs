use std::{
    fmt,
    ops::{Div, Mul},
};

use crate::{DataSize, TimeDelta};

const MICROS_PER_SEC: u128 = 1_000_000;
const BITS_PER_BYTE: u128 = 8;

/// A data rate in bits per second.
///
/// Cross-type arithmetic with [`DataSize`] and [`TimeDelta`] is the heart of
/// the token-bucket math and is rounded deterministically: streaming a rate
/// over a duration floors to whole bytes, while the time needed to stream a
/// size rounds up to the next microsecond. The pair is consistent: waiting
/// exactly `size / rate` always accumulates at least `size`, and waiting one
/// microsecond less never does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataRate(u64);

impl DataRate {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn bits_per_sec(bits_per_sec: u64) -> Self {
        Self(bits_per_sec)
    }

    #[inline]
    pub const fn kilobits_per_sec(kilobits_per_sec: u64) -> Self {
        Self(kilobits_per_sec * 1000)
    }

    #[inline]
    pub const fn bytes_per_sec(bytes_per_sec: u64) -> Self {
        Self(bytes_per_sec * 8)
    }

    #[inline]
    pub const fn as_bits_per_sec(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Mul<u64> for DataRate {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self {
        Self(self.0 * rhs)
    }
}

/// The amount of data streamed at `rate` over `duration`, floored to whole
/// bytes. Computed in 128 bits so that arbitrarily long idle periods at high
/// rates cannot overflow; the result saturates at the maximum [`DataSize`].
impl Mul<TimeDelta> for DataRate {
    type Output = DataSize;

    fn mul(self, duration: TimeDelta) -> DataSize {
        debug_assert!(duration >= TimeDelta::ZERO, "cannot stream over a negative duration");
        let micros = duration.as_micros().max(0) as u128;
        let bytes = self.0 as u128 * micros / (BITS_PER_BYTE * MICROS_PER_SEC);
        DataSize::bytes(bytes.min(u64::MAX as u128) as u64)
    }
}

impl Mul<DataRate> for TimeDelta {
    type Output = DataSize;

    fn mul(self, rate: DataRate) -> DataSize {
        rate * self
    }
}

/// The time needed to stream `self` at `rate`, rounded up to the first whole
/// microsecond at which the floored accumulation covers the size.
impl Div<DataRate> for DataSize {
    type Output = TimeDelta;

    fn div(self, rate: DataRate) -> TimeDelta {
        assert!(!rate.is_zero(), "cannot divide a data size by a zero rate");
        let microbits = self.as_bytes() as u128 * BITS_PER_BYTE * MICROS_PER_SEC;
        let micros = microbits.div_ceil(rate.0 as u128);
        TimeDelta::micros(micros.min(i64::MAX as u128) as i64)
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps", self.0)
    }
}

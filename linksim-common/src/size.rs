use std::{
    fmt,
    ops::{Add, AddAssign, Div, Mul, Sub, SubAssign},
};

/// An amount of data, counted in whole bytes.
///
/// All arithmetic is integer and exact. Subtracting more than is available is
/// a caller bug, caught by a debug assertion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataSize(u64);

impl DataSize {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn kilobytes(kilobytes: u64) -> Self {
        Self(kilobytes * 1000)
    }

    #[inline]
    pub const fn as_bytes(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two sizes, clamping at the maximum representable size.
    #[inline]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Add for DataSize {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for DataSize {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for DataSize {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        debug_assert!(self.0 >= rhs.0, "data size underflow: {self} - {rhs}");
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for DataSize {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<u64> for DataSize {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Mul<DataSize> for u64 {
    type Output = DataSize;

    fn mul(self, rhs: DataSize) -> DataSize {
        rhs * self
    }
}

impl Div<u64> for DataSize {
    type Output = Self;

    fn div(self, rhs: u64) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} B", self.0)
    }
}

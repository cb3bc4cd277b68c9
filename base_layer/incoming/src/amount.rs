// Copyright 2024. The Tari Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::{
    fmt::{Display, Error, Formatter},
    iter::Sum,
    ops::{Add, Mul},
    str::FromStr,
};

use newtype_ops::newtype_ops;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// All selection and fee calculations should use this newtype to prevent bugs related to rounding errors and unit
/// conversion errors. One NAV is 100,000,000 navtoshi.
///
/// ```edition2018
/// use rts_incoming::amount::Navtoshi;
///
/// let a = Navtoshi::from(500);
/// let b = Navtoshi::from(50);
/// assert_eq!(a + b, Navtoshi::from(550));
/// ```
#[derive(Copy, Default, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Navtoshi(pub u64);

#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
pub enum NavtoshiError {
    #[error("Failed to parse value: {0}")]
    ParseError(String),
}

/// A convenience constant that makes it easier to define NAV amounts.
/// ```edition2018
///   use rts_incoming::amount::{nT, Navtoshi, NAV};
///   assert_eq!(Navtoshi::from(42), 42 * nT);
///   assert_eq!(1 * NAV, 100_000_000.into());
/// ```
#[allow(non_upper_case_globals)]
pub const nT: Navtoshi = Navtoshi(1);
pub const NAV: Navtoshi = Navtoshi(100_000_000);

// You can only add or subtract navtoshi from navtoshi
newtype_ops! { [Navtoshi] {add sub} {:=} Self Self }
newtype_ops! { [Navtoshi] {add sub} {:=} &Self &Self }
newtype_ops! { [Navtoshi] {add sub} {:=} Self &Self }

// Multiplication and division only makes sense when navtoshi is multiplied/divided by a scalar
newtype_ops! { [Navtoshi] {mul div rem} {:=} Self u64 }

impl Mul<Navtoshi> for u64 {
    type Output = Navtoshi;

    fn mul(self, rhs: Navtoshi) -> Self::Output {
        Navtoshi(self * rhs.0)
    }
}

impl Navtoshi {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, v: Navtoshi) -> Option<Navtoshi> {
        self.0.checked_add(v.0).map(Navtoshi)
    }

    pub fn checked_sub(self, v: Navtoshi) -> Option<Navtoshi> {
        self.0.checked_sub(v.0).map(Navtoshi)
    }

    pub fn checked_mul(self, v: u64) -> Option<Navtoshi> {
        self.0.checked_mul(v).map(Navtoshi)
    }
}

impl Display for Navtoshi {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        if *self < NAV {
            write!(f, "{} nT", self.0)
        } else {
            Nav::from(*self).fmt(f)
        }
    }
}

impl From<Navtoshi> for u64 {
    fn from(v: Navtoshi) -> Self {
        v.0
    }
}

impl From<u64> for Navtoshi {
    fn from(v: u64) -> Self {
        Navtoshi(v)
    }
}

impl From<Nav> for Navtoshi {
    fn from(v: Nav) -> Self {
        Navtoshi((v.0 * 1e8).round() as u64)
    }
}

impl FromStr for Navtoshi {
    type Err = NavtoshiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let processed = s.replace(',', "").replace(' ', "").to_ascii_lowercase();
        let is_navtoshi = processed.ends_with("nt") || !processed.ends_with("nav");
        let processed = processed.replace("nt", "").replace("nav", "");
        if processed.starts_with('-') {
            return Err(NavtoshiError::ParseError("value cannot be negative".to_string()));
        }
        if is_navtoshi {
            processed
                .parse::<u64>()
                .map(Navtoshi::from)
                .map_err(|e| NavtoshiError::ParseError(e.to_string()))
        } else {
            let nav = processed
                .parse::<f64>()
                .map_err(|e| NavtoshiError::ParseError(e.to_string()))?;
            // `as u64` saturates, so NaN, infinity and out of range values must be caught here
            if !nav.is_finite() || nav * 1e8 >= u64::MAX as f64 {
                return Err(NavtoshiError::ParseError(format!("{} is not a valid NAV amount", nav)));
            }
            Ok(Navtoshi::from(Nav::from(nav)))
        }
    }
}

impl<'a> Sum<&'a Navtoshi> for Navtoshi {
    fn sum<I: Iterator<Item = &'a Navtoshi>>(iter: I) -> Navtoshi {
        iter.fold(Navtoshi::from(0), Add::add)
    }
}

impl Sum<Navtoshi> for Navtoshi {
    fn sum<I: Iterator<Item = Navtoshi>>(iter: I) -> Navtoshi {
        iter.fold(Navtoshi::from(0), Add::add)
    }
}

/// A convenience struct for representing whole NAV. You should **never** use Nav in selection or fee calculations,
/// because Nav wraps a floating point value. Use Navtoshi for that instead.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Nav(f64);

newtype_ops! { [Nav] {add sub} {:=} Self Self }

impl Display for Nav {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{:0.8} NAV", self.0)
    }
}

impl From<Nav> for f64 {
    fn from(v: Nav) -> Self {
        v.0
    }
}

impl From<f64> for Nav {
    fn from(v: f64) -> Self {
        Nav(v)
    }
}

impl From<Navtoshi> for Nav {
    fn from(v: Navtoshi) -> Self {
        Nav(v.0 as f64 * 1e-8)
    }
}

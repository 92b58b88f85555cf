//! Millisecond-precision subtitle timestamps.

use crate::error::PodclipError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A point in a media timeline, stored as whole milliseconds.
///
/// Parses `HH:MM:SS,mmm` (SubRip) as well as `HH:MM:SS.mmm`, and always
/// displays in SubRip form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn since(&self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0).map(Duration::from_millis)
    }

    /// Shift back by `origin`, clamping at zero.
    pub fn saturating_sub(&self, origin: Timestamp) -> Timestamp {
        Timestamp(self.0.saturating_sub(origin.0))
    }

    /// Seek position understood by ffmpeg (`HH:MM:SS.mmm`).
    pub fn to_ffmpeg(&self) -> String {
        let (h, m, s, ms) = self.parts();
        format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
    }

    fn parts(&self) -> (u64, u64, u64, u64) {
        let hours = self.0 / 3_600_000;
        let minutes = (self.0 % 3_600_000) / 60_000;
        let secs = (self.0 % 60_000) / 1000;
        let ms = self.0 % 1000;
        (hours, minutes, secs, ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s, ms) = self.parts();
        write!(f, "{:02}:{:02}:{:02},{:03}", h, m, s, ms)
    }
}

impl FromStr for Timestamp {
    type Err = PodclipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PodclipError::Subtitle(format!("Invalid timestamp: '{}'", s));

        let trimmed = s.trim();
        let (clock, millis) = match trimmed.rsplit_once([',', '.']) {
            Some((clock, frac)) => {
                if frac.is_empty() || frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                // "5" after the separator means 500ms, not 5ms.
                let padded = format!("{:0<3}", frac);
                (clock, padded.parse::<u64>().map_err(|_| invalid())?)
            }
            None => (trimmed, 0),
        };

        let fields: Vec<&str> = clock.split(':').collect();
        if fields.len() != 3 {
            return Err(invalid());
        }

        // Hours are capped at three digits, as in SRT timing lines.
        if fields[0].len() > 3 {
            return Err(invalid());
        }

        let mut values = [0u64; 3];
        for (slot, field) in values.iter_mut().zip(&fields) {
            if field.is_empty() || field.len() > 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = field.parse().map_err(|_| invalid())?;
        }

        let [hours, minutes, secs] = values;
        if minutes >= 60 || secs >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + secs * 1000 + millis))
            .map(Timestamp)
            .ok_or_else(invalid)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

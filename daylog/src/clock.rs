use crate::error::Result;
use crate::level::LogLevel;
use crate::sink::{DestinationSet, FanOut, LogLayout};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::sync::Arc;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
pub(crate) const DAY_KEY_FORMAT: &str = "%Y%m%d";

/// Отформатированное показание часов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClockReading {
    pub(crate) timestamp: String,
    pub(crate) day_key: String,
}

impl ClockReading {
    pub(crate) fn at<Tz>(now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        ClockReading {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            day_key: now.format(DAY_KEY_FORMAT).to_string(),
        }
    }
}

/// Текущее время, ключ дня и активный набор приёмников. Живёт под одним
/// RwLock, так что читатель всегда видит согласованную тройку.
pub(crate) struct ClockState {
    timestamp: String,
    day_key: String,
    destinations: Arc<DestinationSet>,
}

impl ClockState {
    pub(crate) fn open(layout: &LogLayout, reading: ClockReading, debug: bool) -> Result<Self> {
        let destinations = Arc::new(DestinationSet::open(layout, &reading.day_key, debug)?);
        Ok(ClockState {
            timestamp: reading.timestamp,
            day_key: reading.day_key,
            destinations,
        })
    }

    pub(crate) fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub(crate) fn day_key(&self) -> &str {
        &self.day_key
    }

    pub(crate) fn sink(&self, level: LogLevel) -> Arc<FanOut> {
        Arc::clone(self.destinations.sink(level))
    }

    /// Открывает новый набор, если день сменился, и подменяет старый целиком.
    /// Вызывается под эксклюзивной блокировкой.
    pub(crate) fn rotate_if_needed(
        &mut self,
        layout: &LogLayout,
        day_key: &str,
        debug: bool,
    ) -> Result<bool> {
        if self.destinations.day_key() == day_key {
            return Ok(false);
        }
        self.destinations = Arc::new(DestinationSet::open(layout, day_key, debug)?);
        Ok(true)
    }

    /// Применяет новое показание: сначала ротация, потом публикация ключа дня.
    /// При ошибке ротации состояние не меняется.
    pub(crate) fn advance(
        &mut self,
        layout: &LogLayout,
        reading: ClockReading,
        debug: bool,
    ) -> Result<bool> {
        let rotated = self.rotate_if_needed(layout, &reading.day_key, debug)?;
        self.timestamp = reading.timestamp;
        self.day_key = reading.day_key;
        Ok(rotated)
    }
}

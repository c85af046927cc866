// =============================================================================
// Market Hours — weekday + session window gate
// =============================================================================
//
// Times are exchange-local wall-clock times.  The day is split into:
//
//   pre-market   extended_open .. regular_open
//   open         regular_open  ..= regular_close
//   after-hours  regular_close .. extended_close
//   closed       everything else, and all of Saturday / Sunday
//
// `SessionKind::Regular` scans only while open; `SessionKind::Extended`
// also scans during the pre-market and after-hours shoulders.
//
// Exchange-local time comes from `utc_offset_minutes` when set (e.g. -300
// for CDT, -360 for CST).  When unset the host's local timezone is used, so
// the host must run on exchange time.
// =============================================================================

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::SessionKind;

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn default_extended_open() -> NaiveTime {
    hm(8, 0)
}

fn default_regular_open() -> NaiveTime {
    hm(8, 30)
}

fn default_regular_close() -> NaiveTime {
    hm(15, 0)
}

fn default_extended_close() -> NaiveTime {
    hm(15, 30)
}

/// Trading-day schedule.  Window defaults are US central exchange times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketHours {
    #[serde(default)]
    pub session: SessionKind,
    #[serde(default = "default_extended_open")]
    pub extended_open: NaiveTime,
    #[serde(default = "default_regular_open")]
    pub regular_open: NaiveTime,
    #[serde(default = "default_regular_close")]
    pub regular_close: NaiveTime,
    #[serde(default = "default_extended_close")]
    pub extended_close: NaiveTime,
    /// Fixed exchange offset from UTC; `None` => host local time.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            session: SessionKind::Regular,
            extended_open: default_extended_open(),
            regular_open: default_regular_open(),
            regular_close: default_regular_close(),
            extended_close: default_extended_close(),
            utc_offset_minutes: None,
        }
    }
}

/// Where `now` falls in the trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketPhase {
    PreMarket,
    Open,
    AfterHours,
    Closed,
}

impl std::fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreMarket => write!(f, "Pre-market"),
            Self::Open => write!(f, "Open"),
            Self::AfterHours => write!(f, "After-hours"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

impl MarketHours {
    /// Exchange-local wall time for the instant `utc`.
    pub fn exchange_time(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        let offset = self
            .utc_offset_minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt);
        match offset {
            Some(offset) => utc.with_timezone(&offset).naive_local(),
            None => utc.with_timezone(&Local).naive_local(),
        }
    }

    pub fn phase(&self, now: NaiveDateTime) -> MarketPhase {
        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketPhase::Closed;
        }
        let t = now.time();
        if self.regular_open <= t && t <= self.regular_close {
            MarketPhase::Open
        } else if self.extended_open <= t && t < self.regular_open {
            MarketPhase::PreMarket
        } else if self.regular_close < t && t <= self.extended_close {
            MarketPhase::AfterHours
        } else {
            MarketPhase::Closed
        }
    }

    /// Whether the scanner should run at `now` for the configured session.
    pub fn is_market_open(&self, now: NaiveDateTime) -> bool {
        match (self.session, self.phase(now)) {
            (_, MarketPhase::Open) => true,
            (SessionKind::Extended, MarketPhase::PreMarket | MarketPhase::AfterHours) => true,
            _ => false,
        }
    }
}

/// Free-function form of [`MarketHours::is_market_open`].
pub fn is_market_open(now: NaiveDateTime, hours: &MarketHours) -> bool {
    hours.is_market_open(now)
}

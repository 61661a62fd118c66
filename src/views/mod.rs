//! Consumer-facing derived views. Each view is a fixed recipe of dataset operations over one
//! level's cumulative series, recomputed on every request because its parameters decide
//! which places qualify.

pub mod highlight;
pub mod meta;
pub mod params;
pub mod recipes;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::engine::SeriesError;
use crate::geo::Level;

pub use highlight::{resolve_highlights, Selection};
pub use meta::{attribution, Attribution};
pub use params::{ViewParams, ViewRequest, ViewSettings};
pub use recipes::{compute_view, ViewOutput};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("unknown level '{0}'")]
    UnknownLevel(String),

    #[error("unknown view '{0}'")]
    UnknownView(String),

    #[error("level {0} has no data loaded")]
    LevelUnavailable(Level),

    #[error("invalid {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error(transparent)]
    Engine(#[from] SeriesError),
}

/// Cumulative input a view starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Base {
    Confirmed,
    Deaths,
    /// Confirmed cases over the trailing window.
    Recent,
}

/// Which reference data a view is normalized by; decides its source attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    Counts,
    PerMillion,
    PerBed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Confirmed,
    Deaths,
    Recent,
    ConfirmedPerMillion,
    DeathsPerMillion,
    RecentPerMillion,
    RecentPerBed,
    ChangeConfirmed,
    ChangeDeaths,
    ChangeRecent,
    GrowthConfirmed,
    GrowthDeaths,
    GrowthRecent,
}

impl ViewKind {
    pub const ALL: [ViewKind; 13] = [
        ViewKind::Confirmed,
        ViewKind::Deaths,
        ViewKind::Recent,
        ViewKind::ConfirmedPerMillion,
        ViewKind::DeathsPerMillion,
        ViewKind::RecentPerMillion,
        ViewKind::RecentPerBed,
        ViewKind::ChangeConfirmed,
        ViewKind::ChangeDeaths,
        ViewKind::ChangeRecent,
        ViewKind::GrowthConfirmed,
        ViewKind::GrowthDeaths,
        ViewKind::GrowthRecent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Deaths => "deaths",
            Self::Recent => "recent",
            Self::ConfirmedPerMillion => "confirmed-per-million",
            Self::DeathsPerMillion => "deaths-per-million",
            Self::RecentPerMillion => "recent-per-million",
            Self::RecentPerBed => "recent-per-bed",
            Self::ChangeConfirmed => "change-confirmed",
            Self::ChangeDeaths => "change-deaths",
            Self::ChangeRecent => "change-recent",
            Self::GrowthConfirmed => "growth-confirmed",
            Self::GrowthDeaths => "growth-deaths",
            Self::GrowthRecent => "growth-recent",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed Cases",
            Self::Deaths => "Known Deaths",
            Self::Recent => "Recent Cases",
            Self::ConfirmedPerMillion => "Confirmed Cases per Million People",
            Self::DeathsPerMillion => "Known Deaths per Million People",
            Self::RecentPerMillion => "Recent Cases per Million People",
            Self::RecentPerBed => "Recent Cases per Hospital Bed",
            Self::ChangeConfirmed => "Change in Confirmed Cases",
            Self::ChangeDeaths => "Change in Known Deaths",
            Self::ChangeRecent => "Change in Recent Cases",
            Self::GrowthConfirmed => "Growth Rate of Confirmed Cases",
            Self::GrowthDeaths => "Growth Rate of Known Deaths",
            Self::GrowthRecent => "Growth Rate of Recent Cases",
        }
    }

    pub fn base(&self) -> Base {
        match self {
            Self::Confirmed
            | Self::ConfirmedPerMillion
            | Self::ChangeConfirmed
            | Self::GrowthConfirmed => Base::Confirmed,
            Self::Deaths | Self::DeathsPerMillion | Self::ChangeDeaths | Self::GrowthDeaths => {
                Base::Deaths
            }
            Self::Recent
            | Self::RecentPerMillion
            | Self::RecentPerBed
            | Self::ChangeRecent
            | Self::GrowthRecent => Base::Recent,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Self::ConfirmedPerMillion | Self::DeathsPerMillion | Self::RecentPerMillion => {
                Family::PerMillion
            }
            Self::RecentPerBed => Family::PerBed,
            _ => Family::Counts,
        }
    }

    pub fn default_threshold(&self) -> f64 {
        match self {
            Self::Confirmed | Self::Recent => 100.0,
            Self::Deaths => 10.0,
            Self::ConfirmedPerMillion | Self::RecentPerMillion => 10.0,
            Self::DeathsPerMillion => 1.0,
            Self::RecentPerBed => 0.01,
            Self::ChangeConfirmed | Self::ChangeRecent => 100.0,
            Self::ChangeDeaths => 10.0,
            Self::GrowthConfirmed | Self::GrowthRecent => 100.0,
            Self::GrowthDeaths => 10.0,
        }
    }

    /// Lag used by change and growth views.
    pub fn default_periods(&self) -> Option<usize> {
        match self {
            Self::ChangeConfirmed | Self::ChangeDeaths | Self::ChangeRecent => Some(3),
            Self::GrowthConfirmed | Self::GrowthDeaths | Self::GrowthRecent => Some(5),
            _ => None,
        }
    }

    pub fn uses_min_population(&self) -> bool {
        self.family() != Family::Counts
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ViewError::UnknownView(s.to_string()))
    }
}

/// Parse a level name into the view error space.
pub fn parse_level(raw: &str) -> Result<Level, ViewError> {
    raw.parse::<Level>()
        .map_err(|_| ViewError::UnknownLevel(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_names_round_trip() {
        for kind in ViewKind::ALL {
            assert_eq!(kind.as_str().parse::<ViewKind>().unwrap(), kind);
        }
        assert_eq!(
            "growth_recent".parse::<ViewKind>().unwrap(),
            ViewKind::GrowthRecent
        );
        assert!(matches!(
            "sparkline".parse::<ViewKind>(),
            Err(ViewError::UnknownView(_))
        ));
    }

    #[test]
    fn only_normalized_views_take_a_population_floor() {
        assert!(!ViewKind::Confirmed.uses_min_population());
        assert!(ViewKind::RecentPerBed.uses_min_population());
        assert_eq!(ViewKind::GrowthDeaths.default_periods(), Some(5));
        assert_eq!(ViewKind::Recent.base(), Base::Recent);
    }
}

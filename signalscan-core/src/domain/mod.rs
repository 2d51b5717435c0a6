//! Domain types: bars, series, timeframes.

pub mod bar;
pub mod series;
pub mod timeframe;

pub use bar::PriceBar;
pub use series::{NormalizeReport, PriceSeries};
pub use timeframe::{Interval, Period, TimeframeParseError};

/// Symbol type alias
pub type Symbol = String;

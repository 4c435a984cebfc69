//! Charts module - Static chart rendering

mod plotter;
mod style;

pub use plotter::{ChartPlotter, CHART_SIZE, CURVE_POINTS};
pub use style::{HighlightGroup, HighlightStyles, DEFAULT_POINT_COLOR};

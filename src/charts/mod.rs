//! Chart data adapters.
//!
//! Pure functions mapping fetched race/result arrays into scaled coordinate
//! data for the two visualizations: the race-by-race line graph and the
//! per-season box plot. No I/O and no rendering here; the `ui` module feeds
//! the derived domains and series into ratatui widgets.

pub mod boxplot;
pub mod line;
pub mod scale;

pub use boxplot::{box_plot_data, outliers, BoxGlyph, BoxPlotData, PAIR_OFFSET};
pub use line::{line_chart_data, LineChartData, LineSeries};
pub use scale::{BandScale, LinearScale};

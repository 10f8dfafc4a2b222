//! Line-graph adapter: race-by-race grid and finishing positions.
//!
//! Turns one or two drivers' `RaceResult` series into plottable point
//! series with shared axis domains. The half-round horizontal padding and
//! the one-position vertical padding keep plotted points off the axes'
//! edges; sharing one domain across both drivers keeps a comparison
//! visually aligned.

use crate::models::RaceResult;

/// Point series for one driver: finishing positions and grid positions,
/// both over round number.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub result: Vec<(f64, f64)>,
    pub grid: Vec<(f64, f64)>,
}

/// Chart-ready data: shared domains plus one series set per driver.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChartData {
    /// [min(round) - 0.5, max(round) + 0.5] across all supplied drivers
    pub x_bounds: [f64; 2],
    /// [-1, max(value) + 1] over both grid and result series of all drivers
    pub y_bounds: [f64; 2],
    pub series: Vec<LineSeries>,
}

/// Build line-chart data for up to two drivers. Returns `None` when no
/// supplied driver has any race yet (nothing to derive a domain from).
pub fn line_chart_data(drivers: &[(&str, &[RaceResult])]) -> Option<LineChartData> {
    let mut min_round: Option<u32> = None;
    let mut max_round: Option<u32> = None;
    let mut max_value: Option<u32> = None;

    for (_, races) in drivers {
        for race in races.iter() {
            min_round = Some(min_round.map_or(race.round, |m| m.min(race.round)));
            max_round = Some(max_round.map_or(race.round, |m| m.max(race.round)));
            let local_max = race.grid.max(race.result);
            max_value = Some(max_value.map_or(local_max, |m| m.max(local_max)));
        }
    }

    let (min_round, max_round, max_value) = (min_round?, max_round?, max_value?);

    let series = drivers
        .iter()
        .map(|(label, races)| LineSeries {
            label: label.to_string(),
            result: races
                .iter()
                .map(|r| (r.round as f64, r.result as f64))
                .collect(),
            grid: races
                .iter()
                .map(|r| (r.round as f64, r.grid as f64))
                .collect(),
        })
        .collect();

    Some(LineChartData {
        x_bounds: [min_round as f64 - 0.5, max_round as f64 + 0.5],
        y_bounds: [-1.0, max_value as f64 + 1.0],
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(round: u32, grid: u32, result: u32) -> RaceResult {
        RaceResult { round, grid, result }
    }

    #[test]
    fn test_single_driver_domains() {
        let races = vec![race(1, 3, 1), race(3, 9, 2), race(5, 4, 6)];
        let data = line_chart_data(&[("Norris", &races)]).unwrap();

        assert_eq!(data.x_bounds, [0.5, 5.5]);
        assert_eq!(data.y_bounds, [-1.0, 10.0]);
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series[0].result, vec![(1.0, 1.0), (3.0, 2.0), (5.0, 6.0)]);
        assert_eq!(data.series[0].grid, vec![(1.0, 3.0), (3.0, 9.0), (5.0, 4.0)]);
    }

    #[test]
    fn test_two_drivers_share_domains() {
        let a = vec![race(2, 1, 1), race(4, 2, 3)];
        let b = vec![race(1, 18, 12), race(6, 5, 4)];
        let data = line_chart_data(&[("Norris", &a), ("Piastri", &b)]).unwrap();

        // Rounds span 1..6 across both drivers
        assert_eq!(data.x_bounds, [0.5, 6.5]);
        // The largest value anywhere (grid 18) sets the shared ceiling
        assert_eq!(data.y_bounds, [-1.0, 19.0]);
        assert_eq!(data.series.len(), 2);
        assert_eq!(data.series[1].label, "Piastri");
    }

    #[test]
    fn test_grid_values_count_toward_domain() {
        // Finishing positions are low but a back-of-grid start must widen
        // the vertical domain
        let races = vec![race(1, 20, 2)];
        let data = line_chart_data(&[("Hulkenberg", &races)]).unwrap();
        assert_eq!(data.y_bounds, [-1.0, 21.0]);
    }

    #[test]
    fn test_no_races_yields_none() {
        assert!(line_chart_data(&[("Norris", &[])]).is_none());
        assert!(line_chart_data(&[]).is_none());
    }

    #[test]
    fn test_one_driver_empty_other_not() {
        let a = vec![race(2, 3, 1)];
        let data = line_chart_data(&[("Norris", &a), ("Rookie", &[])]).unwrap();
        assert_eq!(data.x_bounds, [1.5, 2.5]);
        assert!(data.series[1].result.is_empty());
    }
}

//! Box-plot adapter: per-season finishing-position distributions.
//!
//! Turns one or two drivers' season summaries into glyphs with a shared
//! categorical domain (season labels) and a shared numeric domain, so
//! compared drivers line up season by season. When two drivers are shown,
//! each season's pair of boxes is offset from the category center so
//! neither box fully occludes the other.

use crate::models::SeasonBoxPlot;

/// Horizontal offset of each box from its season's center when two drivers
/// are compared, expressed in band-width units. The renderer multiplies by
/// the band scale's bandwidth.
pub const PAIR_OFFSET: f64 = 0.18;

/// One drawable box: summary statistics plus the outlying raw positions.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGlyph {
    /// Season label this box belongs to
    pub season: String,
    /// Index of the driver series this box belongs to (0 or 1)
    pub series: usize,
    /// Offset from the category center, in band-width units
    pub offset: f64,
    pub min: f64,
    pub first_quartile: f64,
    pub median: f64,
    pub third_quartile: f64,
    pub max: f64,
    pub outliers: Vec<f64>,
}

/// Chart-ready data: shared domains plus every drawable box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotData {
    /// Union of both drivers' season labels, ascending
    pub seasons: Vec<String>,
    /// [global min, global max] across all supplied summaries
    pub value_bounds: [f64; 2],
    pub labels: Vec<String>,
    pub glyphs: Vec<BoxGlyph>,
}

/// Raw positions falling strictly outside [first quartile, third quartile].
pub fn outliers(plot: &SeasonBoxPlot) -> Vec<f64> {
    plot.positions
        .iter()
        .copied()
        .filter(|p| *p < plot.first_quartile || *p > plot.third_quartile)
        .collect()
}

/// Build box-plot data for up to two drivers. Returns `None` when no
/// supplied driver has any season summary.
pub fn box_plot_data(drivers: &[(&str, &[SeasonBoxPlot])]) -> Option<BoxPlotData> {
    let mut season_years: Vec<i32> = drivers
        .iter()
        .flat_map(|(_, plots)| plots.iter().map(|p| p.x))
        .collect();
    season_years.sort_unstable();
    season_years.dedup();
    if season_years.is_empty() {
        return None;
    }

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, plots) in drivers {
        for plot in plots.iter() {
            lo = lo.min(plot.min);
            hi = hi.max(plot.max);
        }
    }

    let paired = drivers.len() > 1;
    let mut glyphs = Vec::new();
    for (series, (_, plots)) in drivers.iter().enumerate() {
        let offset = if paired {
            if series == 0 {
                -PAIR_OFFSET
            } else {
                PAIR_OFFSET
            }
        } else {
            0.0
        };
        for plot in plots.iter() {
            glyphs.push(BoxGlyph {
                season: plot.x.to_string(),
                series,
                offset,
                min: plot.min,
                first_quartile: plot.first_quartile,
                median: plot.median,
                third_quartile: plot.third_quartile,
                max: plot.max,
                outliers: outliers(plot),
            });
        }
    }

    Some(BoxPlotData {
        seasons: season_years.iter().map(|y| y.to_string()).collect(),
        value_bounds: [lo, hi],
        labels: drivers.iter().map(|(label, _)| label.to_string()).collect(),
        glyphs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot(x: i32, min: f64, q1: f64, median: f64, q3: f64, max: f64, positions: &[f64]) -> SeasonBoxPlot {
        SeasonBoxPlot {
            x,
            min,
            first_quartile: q1,
            median,
            third_quartile: q3,
            max,
            positions: positions.to_vec(),
        }
    }

    #[test]
    fn test_outlier_rule_is_strict_iqr() {
        let p = plot(2024, 1.0, 2.0, 5.0, 8.0, 15.0, &[1.0, 2.0, 5.0, 8.0, 9.0, 15.0]);
        let out = outliers(&p);
        // 9 and the extremes fall outside [2, 8]; 5 and the quartile values do not
        assert!(out.contains(&9.0));
        assert!(out.contains(&1.0));
        assert!(out.contains(&15.0));
        assert!(!out.contains(&5.0));
        assert!(!out.contains(&2.0));
        assert!(!out.contains(&8.0));
    }

    #[test]
    fn test_single_driver_boxes_are_centered() {
        let plots = vec![plot(2023, 1.0, 3.0, 6.0, 10.0, 20.0, &[])];
        let data = box_plot_data(&[("Alonso", &plots)]).unwrap();
        assert_eq!(data.seasons, vec!["2023"]);
        assert_eq!(data.value_bounds, [1.0, 20.0]);
        assert_eq!(data.glyphs[0].offset, 0.0);
    }

    #[test]
    fn test_two_drivers_share_domains_and_offset() {
        let a = vec![
            plot(2022, 2.0, 4.0, 6.0, 9.0, 14.0, &[]),
            plot(2024, 1.0, 2.0, 3.0, 5.0, 8.0, &[]),
        ];
        let b = vec![plot(2023, 3.0, 5.0, 8.0, 12.0, 19.0, &[])];
        let data = box_plot_data(&[("Alonso", &a), ("Stroll", &b)]).unwrap();

        // Union of seasons, ascending
        assert_eq!(data.seasons, vec!["2022", "2023", "2024"]);
        // Global extremes across both drivers
        assert_eq!(data.value_bounds, [1.0, 19.0]);

        // Pair offsets are symmetric around the category center
        assert!(data.glyphs.iter().filter(|g| g.series == 0).all(|g| g.offset == -PAIR_OFFSET));
        assert!(data.glyphs.iter().filter(|g| g.series == 1).all(|g| g.offset == PAIR_OFFSET));
        assert_eq!(data.labels, vec!["Alonso", "Stroll"]);
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(box_plot_data(&[]).is_none());
        assert!(box_plot_data(&[("Alonso", &[])]).is_none());
    }
}

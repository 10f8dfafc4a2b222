//! Scale helpers mapping data domains onto output ranges.
//!
//! The adapters in this module's siblings compute *domains*; these scales
//! turn domain values into terminal-canvas coordinates when rendering.

/// Linear mapping from a numeric domain onto a numeric range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            // Degenerate domain collapses to the range start
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Categorical band scale: evenly spaced bands across a range, one per
/// category, with a fractional padding between them.
#[derive(Debug, Clone)]
pub struct BandScale {
    categories: Vec<String>,
    range: [f64; 2],
    padding: f64,
}

impl BandScale {
    pub fn new(categories: Vec<String>, range: [f64; 2], padding: f64) -> Self {
        Self {
            categories,
            range,
            padding: padding.clamp(0.0, 0.9),
        }
    }

    fn step(&self) -> f64 {
        let n = self.categories.len().max(1) as f64;
        (self.range[1] - self.range[0]) / n
    }

    /// Width of one band (step minus padding)
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Center coordinate of a category's band
    pub fn center(&self, category: &str) -> Option<f64> {
        let index = self.categories.iter().position(|c| c == category)?;
        Some(self.range[0] + self.step() * (index as f64 + 0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale_maps_endpoints_and_midpoint() {
        let scale = LinearScale::new([0.0, 10.0], [0.0, 100.0]);
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(10.0), 100.0);
        assert_eq!(scale.map(5.0), 50.0);
    }

    #[test]
    fn test_linear_scale_inverted_range() {
        // Screen y grows downward: domain min maps to the range bottom
        let scale = LinearScale::new([-1.0, 10.0], [40.0, 0.0]);
        assert_eq!(scale.map(-1.0), 40.0);
        assert_eq!(scale.map(10.0), 0.0);
    }

    #[test]
    fn test_linear_scale_degenerate_domain() {
        let scale = LinearScale::new([3.0, 3.0], [0.0, 10.0]);
        assert_eq!(scale.map(3.0), 0.0);
    }

    #[test]
    fn test_band_scale_centers_are_evenly_spaced() {
        let scale = BandScale::new(
            vec!["2022".into(), "2023".into(), "2024".into()],
            [0.0, 90.0],
            0.4,
        );
        assert_eq!(scale.center("2022"), Some(15.0));
        assert_eq!(scale.center("2023"), Some(45.0));
        assert_eq!(scale.center("2024"), Some(75.0));
        assert_eq!(scale.center("2021"), None);
        assert!((scale.bandwidth() - 18.0).abs() < 1e-9);
    }
}

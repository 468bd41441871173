use serde::{Deserialize, Serialize};

/// Linear map from a value domain to a pixel range. Values outside the domain
/// extrapolate; nothing is clamped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f32; 2],
    pub range: [f32; 2],
}

impl LinearScale {
    pub fn new(domain: [f32; 2], range: [f32; 2]) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f32) -> f32 {
        let span = self.domain[1] - self.domain[0];
        if span.abs() < f32::EPSILON {
            return self.range[0];
        }

        let t = (value - self.domain[0]) / span;
        self.range[0] + t * (self.range[1] - self.range[0])
    }
}

/// Square-root scale: area, not radius, stays proportional to the value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SqrtScale {
    pub domain: [f32; 2],
    pub range: [f32; 2],
}

impl SqrtScale {
    pub fn new(domain: [f32; 2], range: [f32; 2]) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f32) -> f32 {
        LinearScale::new([signed_sqrt(self.domain[0]), signed_sqrt(self.domain[1])], self.range)
            .map(signed_sqrt(value))
    }
}

fn signed_sqrt(value: f32) -> f32 {
    if value < 0.0 {
        -(-value).sqrt()
    } else {
        value.sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MagnitudeScale {
    Linear { domain: [f32; 2], range: [f32; 2] },
    Sqrt { domain: [f32; 2], range: [f32; 2] },
}

impl MagnitudeScale {
    pub fn radius(&self, magnitude: f32) -> f32 {
        match *self {
            Self::Linear { domain, range } => LinearScale::new(domain, range).map(magnitude),
            Self::Sqrt { domain, range } => SqrtScale::new(domain, range).map(magnitude),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpacityScale {
    pub domain: [f32; 2],
    pub range: [f32; 2],
    pub threshold: f32,
}

impl OpacityScale {
    pub fn opacity(&self, value: f32) -> f32 {
        let magnitude = value.abs();
        if magnitude > self.threshold {
            1.0
        } else {
            LinearScale::new(self.domain, self.range).map(magnitude)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn linear_maps_endpoints_and_extrapolates() {
        let x = LinearScale::new([0.0, 60.0], [50.0, 850.0]);
        assert!(close(x.map(0.0), 50.0));
        assert!(close(x.map(60.0), 850.0));
        assert!(close(x.map(30.0), 450.0));
        assert!(close(x.map(75.0), 1050.0));
        assert!(close(x.map(-15.0), -150.0));
    }

    #[test]
    fn signed_domain_centres_zero() {
        let x = LinearScale::new([-15.0, 15.0], [50.0, 850.0]);
        assert!(close(x.map(0.0), 450.0));
        assert!(close(x.map(-15.0), 50.0));
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let x = LinearScale::new([5.0, 5.0], [10.0, 20.0]);
        assert!(close(x.map(42.0), 10.0));
    }

    #[test]
    fn sqrt_keeps_area_proportional() {
        let size = SqrtScale::new([0.0, 20.0], [8.0, 50.0]);
        assert!(close(size.map(0.0), 8.0));
        assert!(close(size.map(20.0), 50.0));
        assert!(close(size.map(5.0), 8.0 + 42.0 * 0.5));
    }

    #[test]
    fn magnitude_scale_dispatches_by_kind() {
        let linear = MagnitudeScale::Linear {
            domain: [0.0, 35.0],
            range: [2.0, 50.0],
        };
        let sqrt = MagnitudeScale::Sqrt {
            domain: [0.0, 20.0],
            range: [8.0, 50.0],
        };
        assert!(close(linear.radius(35.0), 50.0));
        assert!(close(linear.radius(17.5), 26.0));
        assert!(close(sqrt.radius(20.0), 50.0));
    }

    #[test]
    fn opacity_saturates_above_threshold() {
        let opacity = OpacityScale {
            domain: [0.0, 20.0],
            range: [0.3, 1.0],
            threshold: 20.0,
        };
        assert!(close(opacity.opacity(0.0), 0.3));
        assert!(close(opacity.opacity(-10.0), 0.65));
        assert!(close(opacity.opacity(20.0), 1.0));
        assert!(close(opacity.opacity(45.0), 1.0));
    }
}

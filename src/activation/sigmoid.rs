use std::f64::consts::E;

/// Smallest distance kept between an activation and either asymptote.
///
/// In `f64` the logistic curve rounds to exactly 0.0 or 1.0 once `|x|`
/// passes roughly 37, which would zero the derivative and break the
/// open-interval contract of a layer's output.
const SATURATION_MARGIN: f64 = 1e-15;

/// Logistic activation `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sigmoid;

impl Sigmoid {
    /// Element-wise activation; always strictly inside (0, 1).
    pub fn function(&self, x: f64) -> f64 {
        let y = 1.0 / (1.0 + E.powf(-x));
        y.clamp(SATURATION_MARGIN, 1.0 - SATURATION_MARGIN)
    }

    /// Derivative expressed through the activation's own output: `y·(1−y)`.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        y * (1.0 - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn centre_is_one_half() {
        assert_relative_eq!(Sigmoid.function(0.0), 0.5);
        assert_relative_eq!(Sigmoid.derivative_from_output(0.5), 0.25);
    }

    #[test]
    fn extreme_inputs_never_reach_the_asymptotes() {
        for x in [-1e6, -750.0, -40.0, 40.0, 750.0, 1e6] {
            let y = Sigmoid.function(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
            assert!(Sigmoid.derivative_from_output(y) > 0.0);
        }
    }

    #[test]
    fn is_monotonic() {
        let ys: Vec<f64> = (-10..=10).map(|x| Sigmoid.function(x as f64)).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }
}

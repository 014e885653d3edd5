use crate::error::{Error, Result};
use std::f64::consts::E;

/// Named activation registry.
///
/// Each variant carries its forward function and derivative; derivatives are
/// evaluated at the pre-activation value. `Rectified` is a combinator that
/// zeroes negative inputs (and their derivative) while passing the wrapped
/// base function through for non-negative inputs — `relu` is
/// `Rectified(Linear)` and `resig` is `Rectified(Sigmoid)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Linear,
    Sigmoid,
    Step,
    BipolarStep,
    Tanh,
    /// Scaled tanh: 1.7159 · tanh(2x/3).
    LecunTanh,
    /// Complementary log-log: 1 − e^(−eˣ).
    Cloglog,
    Softplus,
    InverseLogit,
    Rectified(Box<Activation>),
    /// Caller-supplied function/derivative pair installed through
    /// `Network::set_activation`.
    Custom {
        function: fn(f64) -> f64,
        derivative: fn(f64) -> f64,
    },
}

impl Activation {
    /// Resolves a registry name to an activation.
    ///
    /// Recognized names: `linear` (alias `identity`), `sigmoid`, `step`,
    /// `bipolar`, `tanh`, `lecun_tanh`, `cloglog`, `softplus`,
    /// `inverse_logit`, `relu`, `resig`.
    pub fn from_name(name: &str) -> Result<Activation> {
        match name {
            "linear" | "identity" => Ok(Activation::Linear),
            "sigmoid" => Ok(Activation::Sigmoid),
            "step" => Ok(Activation::Step),
            "bipolar" => Ok(Activation::BipolarStep),
            "tanh" => Ok(Activation::Tanh),
            "lecun_tanh" => Ok(Activation::LecunTanh),
            "cloglog" => Ok(Activation::Cloglog),
            "softplus" => Ok(Activation::Softplus),
            "inverse_logit" => Ok(Activation::InverseLogit),
            "relu" => Ok(Activation::Rectified(Box::new(Activation::Linear))),
            "resig" => Ok(Activation::Rectified(Box::new(Activation::Sigmoid))),
            other => Err(Error::UnknownActivation(other.to_string())),
        }
    }

    /// Registry name, for diagnostics (`list_net`).
    pub fn name(&self) -> String {
        match self {
            Activation::Linear => "linear".into(),
            Activation::Sigmoid => "sigmoid".into(),
            Activation::Step => "step".into(),
            Activation::BipolarStep => "bipolar".into(),
            Activation::Tanh => "tanh".into(),
            Activation::LecunTanh => "lecun_tanh".into(),
            Activation::Cloglog => "cloglog".into(),
            Activation::Softplus => "softplus".into(),
            Activation::InverseLogit => "inverse_logit".into(),
            Activation::Rectified(base) => match **base {
                Activation::Linear => "relu".into(),
                Activation::Sigmoid => "resig".into(),
                ref other => format!("rectified_{}", other.name()),
            },
            Activation::Custom { .. } => "custom".into(),
        }
    }

    /// Element-wise forward value.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            Activation::Step => {
                if x >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::BipolarStep => {
                if x >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Activation::Tanh => x.tanh(),
            Activation::LecunTanh => 1.7159 * (2.0 * x / 3.0).tanh(),
            Activation::Cloglog => 1.0 - (-E.powf(x)).exp(),
            Activation::Softplus => (1.0 + E.powf(x)).ln(),
            Activation::InverseLogit => 1.0 / (1.0 + E.powf(-x)),
            Activation::Rectified(base) => {
                if x < 0.0 {
                    0.0
                } else {
                    base.function(x)
                }
            }
            Activation::Custom { function, .. } => function(x),
        }
    }

    /// Element-wise derivative, evaluated at the pre-activation value.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            Activation::Step => 0.0,
            Activation::BipolarStep => 0.0,
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::LecunTanh => {
                let t = (2.0 * x / 3.0).tanh();
                1.7159 * (2.0 / 3.0) * (1.0 - t * t)
            }
            Activation::Cloglog => (x - E.powf(x)).exp(),
            Activation::Softplus => 1.0 / (1.0 + E.powf(-x)),
            Activation::InverseLogit => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            Activation::Rectified(base) => {
                if x < 0.0 {
                    0.0
                } else {
                    base.derivative(x)
                }
            }
            Activation::Custom { derivative, .. } => derivative(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_is_rectified_linear() {
        let relu = Activation::from_name("relu").unwrap();
        assert_eq!(relu.function(-2.0), 0.0);
        assert_eq!(relu.function(3.0), 3.0);
        assert_eq!(relu.derivative(-2.0), 0.0);
        assert_eq!(relu.derivative(3.0), 1.0);
    }

    #[test]
    fn resig_passes_sigmoid_through_for_non_negative_inputs() {
        let resig = Activation::from_name("resig").unwrap();
        let sigmoid = Activation::Sigmoid;
        assert_eq!(resig.function(1.5), sigmoid.function(1.5));
        assert_eq!(resig.function(-1.5), 0.0);
        assert_eq!(resig.derivative(1.5), sigmoid.derivative(1.5));
    }

    #[test]
    fn unknown_name_is_an_error() {
        match Activation::from_name("swish") {
            Err(crate::error::Error::UnknownActivation(name)) => assert_eq!(name, "swish"),
            other => panic!("expected UnknownActivation, got {other:?}"),
        }
    }

    #[test]
    fn softplus_derivative_is_the_logistic_function() {
        let softplus = Activation::Softplus;
        let sigmoid = Activation::Sigmoid;
        for &x in &[-2.0, -0.5, 0.0, 0.5, 2.0] {
            assert!((softplus.derivative(x) - sigmoid.function(x)).abs() < 1e-12);
        }
    }
}

use serde::{Deserialize, Serialize};

/// Learning-rate decay schedule: maps the current step counter to an
/// effective rate.
///
/// `"exp"` gives a0·e^(−k·step); any other kind name (including `"none"`)
/// selects the constant schedule at a0, which is the documented extension
/// point for further forms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decay {
    Constant { a0: f64 },
    Exp { a0: f64, k: f64 },
}

impl Decay {
    pub fn from_name(kind: &str, a0: f64, k: f64) -> Decay {
        match kind {
            "exp" => Decay::Exp { a0, k },
            _ => Decay::Constant { a0 },
        }
    }

    /// Effective rate at the given step (epoch counter).
    pub fn rate(&self, step: usize) -> f64 {
        match *self {
            Decay::Constant { a0 } => a0,
            Decay::Exp { a0, k } => a0 * (-k * step as f64).exp(),
        }
    }

    /// Dimensionless decay multiplier at the given step, for scaling a rate
    /// the schedule does not own (the bias learning rate).
    pub fn factor(&self, step: usize) -> f64 {
        match *self {
            Decay::Constant { .. } => 1.0,
            Decay::Exp { k, .. } => (-k * step as f64).exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_decay_shrinks_with_the_step_counter() {
        let decay = Decay::from_name("exp", 1.0, 0.5);
        assert_eq!(decay.rate(0), 1.0);
        assert!((decay.rate(2) - (-1.0f64).exp()).abs() < 1e-12);
        assert!(decay.rate(3) < decay.rate(2));
    }

    #[test]
    fn unknown_kinds_fall_back_to_constant() {
        let decay = Decay::from_name("polynomial", 0.05, 3.0);
        assert_eq!(decay.rate(0), 0.05);
        assert_eq!(decay.rate(100), 0.05);
    }
}

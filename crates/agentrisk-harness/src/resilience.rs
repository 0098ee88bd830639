use serde::{Deserialize, Serialize};

/// How much of its baseline reliability a graph retains under perturbation.
///
/// 1.0 when both rates are effectively zero; otherwise the clamped relative
/// improvement of the perturbed failure rate over the baseline.
pub fn resilience_index(baseline_fail: f64, perturbed_fail: f64) -> f64 {
    let eps = 1e-6;
    if baseline_fail <= eps && perturbed_fail <= eps {
        return 1.0;
    }
    (1.0 - perturbed_fail / baseline_fail.max(eps)).clamp(0.0, 1.0)
}

/// Entropy/resilience quadrant classification, thresholded at 0.5 on both
/// axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    Fragile,
    #[serde(rename = "Chaotic Fragility")]
    ChaoticFragility,
    Robust,
    Antifragile,
}

impl Quadrant {
    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::Fragile => "Fragile",
            Quadrant::ChaoticFragility => "Chaotic Fragility",
            Quadrant::Robust => "Robust",
            Quadrant::Antifragile => "Antifragile",
        }
    }
}

pub fn quadrant(entropy_score: f64, resilience: f64) -> Quadrant {
    let entropy_high = entropy_score >= 0.5;
    let resilience_high = resilience >= 0.5;
    match (entropy_high, resilience_high) {
        (false, false) => Quadrant::Fragile,
        (true, false) => Quadrant::ChaoticFragility,
        (false, true) => Quadrant::Robust,
        (true, true) => Quadrant::Antifragile,
    }
}

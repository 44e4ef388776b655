use crate::defs::Continuous;
use std::iter::zip;

/// Per-step discount for a continuously compounded `interest_rate` (percent).
pub fn discount_factor(interest_rate: Continuous, time_step: Continuous) -> Continuous {
    (-interest_rate * time_step / 100.).exp()
}

pub fn l2_norm(v: &[Continuous]) -> Continuous {
    v.iter().map(|x| x * x).sum::<Continuous>().sqrt()
}

/// Change between successive iterates in percent of the previous one.
///
/// The ratio of L2 norms equals the ratio of RMS values, so the measure does
/// not depend on the number of states nor on the scale of the values.
///
/// `None` when the previous iterate is identically zero and the new one is
/// not: no relative change can be measured. Two zero iterates give `0`.
pub fn relative_rms_change(v_old: &[Continuous], v_new: &[Continuous]) -> Option<Continuous> {
    let diff = zip(v_old, v_new)
        .map(|(o, n)| (n - o) * (n - o))
        .sum::<Continuous>()
        .sqrt();
    let old = l2_norm(v_old);

    if old == 0. {
        (diff == 0.).then_some(0.)
    } else {
        Some(100. * diff / old)
    }
}

/// `Σ_{t=from}^{to} γ^t`.
pub fn geometric_sum(gamma: Continuous, from: i32, to: i32) -> Continuous {
    (from..=to).map(|t| gamma.powi(t)).sum()
}

//! Pareto dominance (spec §4.F). Objectives 0-2 (distance, time, cost) are
//! minimized; 3-4 (utilization, accessibility) are maximized. Dominance is
//! defined after converting every objective to "bigger is better".

use crate::domain::types::NUM_OBJECTIVES;

const MINIMIZE: [bool; NUM_OBJECTIVES] = [true, true, true, false, false];

fn as_maximize(objectives: &[f64; NUM_OBJECTIVES]) -> [f64; NUM_OBJECTIVES] {
    let mut out = *objectives;
    for (value, &minimize) in out.iter_mut().zip(MINIMIZE.iter()) {
        if minimize {
            *value = -*value;
        }
    }
    out
}

/// `p` dominates `q` iff every (maximize-converted) component of `p` is >=
/// the corresponding component of `q`, and at least one is strictly greater.
pub fn dominates(p: &[f64; NUM_OBJECTIVES], q: &[f64; NUM_OBJECTIVES]) -> bool {
    let pm = as_maximize(p);
    let qm = as_maximize(q);
    let mut strictly_better = false;
    for i in 0..NUM_OBJECTIVES {
        if pm[i] < qm[i] {
            return false;
        }
        if pm[i] > qm[i] {
            strictly_better = true;
        }
    }
    strictly_better
}

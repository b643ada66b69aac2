//! Fast non-dominated sort (spec §4.F): partitions a population into fronts
//! F0, F1, ... by iteratively extracting members dominated by no one else
//! remaining. O(M N^2) with M=5 objectives, N=|population|.

use crate::domain::types::Solution;
use crate::solver::nsga2::dominance::dominates;

/// Returns fronts as index lists into `population`, best front first. Also
/// writes each solution's `rank` field in place.
pub fn fast_non_dominated_sort(population: &mut [Solution]) -> Vec<Vec<usize>> {
    let n = population.len();
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut first_front = Vec::new();

    for p in 0..n {
        for q in 0..n {
            if p == q {
                continue;
            }
            if dominates(&population[p].objectives, &population[q].objectives) {
                dominated_by[p].push(q);
            } else if dominates(&population[q].objectives, &population[p].objectives) {
                domination_count[p] += 1;
            }
        }
        if domination_count[p] == 0 {
            population[p].rank = 0;
            first_front.push(p);
        }
    }
    fronts.push(first_front);

    let mut current = 0;
    while !fronts[current].is_empty() {
        let mut next_front = Vec::new();
        for &p in &fronts[current] {
            for &q in &dominated_by[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    population[q].rank = current + 1;
                    next_front.push(q);
                }
            }
        }
        current += 1;
        fronts.push(next_front);
    }
    fronts.pop();

    fronts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Allocation;

    fn sol(objectives: [f64; 5]) -> Solution {
        let mut s = Solution::new(Allocation::new());
        s.objectives = objectives;
        s
    }

    #[test]
    fn first_front_holds_non_dominated_members() {
        let mut population = vec![
            sol([100.0, 10.0, 50.0, 0.9, 0.5]),
            sol([50.0, 10.0, 50.0, 0.1, 0.5]),
            sol([200.0, 20.0, 80.0, 0.05, 0.2]),
        ];
        let fronts = fast_non_dominated_sort(&mut population);
        assert!(fronts[0].contains(&0));
        assert!(fronts[0].contains(&1));
        assert!(!fronts[0].contains(&2));
        assert_eq!(population[2].rank, 1);
    }
}

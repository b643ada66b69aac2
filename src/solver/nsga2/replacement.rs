//! Elitist mu+lambda replacement (spec §4.F): merge parents and offspring,
//! re-sort into fronts, fill the next generation front by front; the front
//! that would overflow contributes its largest-crowding-distance members.

use crate::domain::types::Solution;
use crate::solver::nsga2::crowding::assign_crowding_distance;
use crate::solver::nsga2::sorting::fast_non_dominated_sort;

pub fn replace(mut combined: Vec<Solution>, population_size: usize) -> Vec<Solution> {
    let fronts = fast_non_dominated_sort(&mut combined);

    let mut selected_indices = Vec::with_capacity(population_size);
    for front in &fronts {
        assign_crowding_distance(front, &mut combined);
        if selected_indices.len() + front.len() <= population_size {
            selected_indices.extend(front.iter().copied());
        } else {
            let remaining = population_size - selected_indices.len();
            let mut ranked = front.clone();
            ranked.sort_by(|&a, &b| combined[b].crowding_distance.total_cmp(&combined[a].crowding_distance));
            selected_indices.extend(ranked.into_iter().take(remaining));
            break;
        }
        if selected_indices.len() == population_size {
            break;
        }
    }

    let mut slots: Vec<Option<Solution>> = combined.into_iter().map(Some).collect();
    selected_indices
        .into_iter()
        .map(|idx| slots[idx].take().expect("index selected at most once per front"))
        .collect()
}

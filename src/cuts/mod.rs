//! The cut engine: a registry of cut generators, duplicate and density suppression,
//! and aging for cuts installed into the relaxation.

pub mod conic_support;
pub mod gomory;

use std::hash::Hasher;
use std::time::Instant;

use fnv::FnvHashSet;
use fnv::FnvHasher;

use crate::basic_types::GeneratorStrategy;
use crate::basic_types::Random;
use crate::basic_types::Statistics;
use crate::basic_types::StorageKey;
use crate::model::LinearConstraint;
use crate::model::Problem;
use crate::relaxation::RowHandle;

/// A source of valid linear inequalities for the current relaxation point.
pub trait CutGenerator {
    fn name(&self) -> &str;
    fn strategy(&self) -> GeneratorStrategy;
    fn frequency(&self) -> u32;
    fn generate(&mut self, problem: &Problem, x: &[f64], next_id: &mut u32) -> Vec<LinearConstraint>;

    /// `true` if this generator's cuts stay exempt from dense-cut suppression (but
    /// not from duplicate-cut suppression). Outer-approximation cuts that certify
    /// conic feasibility are essential in this sense; defaults to `false`.
    fn is_essential(&self) -> bool {
        false
    }
}

/// A cut produced by a generator, tagged with the generator's name so the caller
/// can attribute it to the right statistics bucket.
#[derive(Debug, Clone)]
pub struct GeneratedCut {
    pub generator_name: String,
    pub constraint: LinearConstraint,
}

/// A cut installed into the relaxation, tracked for backtrack removal.
#[derive(Debug, Clone)]
struct InstalledCut {
    handle: RowHandle,
    age: u32,
}

/// Bookkeeping the search driver consults before adding a generator's candidate cut
/// to the relaxation: reject duplicates (by random-projection hash) and cuts denser
/// than `dense_cutoff` times the column count, and age out cuts that stop being
/// tight once a node using them is left behind.
pub struct CutEngine {
    generators: Vec<Box<dyn CutGenerator>>,
    projection: Vec<f64>,
    seen_hashes: FnvHashSet<u64>,
    installed: Vec<InstalledCut>,
    next_cut_id: u32,
    dense_cutoff: f64,
    max_age: u32,
}

impl std::fmt::Debug for CutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CutEngine")
            .field("generators", &self.generators.len())
            .field("projection", &self.projection)
            .field("seen_hashes", &self.seen_hashes)
            .field("installed", &self.installed)
            .field("next_cut_id", &self.next_cut_id)
            .field("dense_cutoff", &self.dense_cutoff)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl CutEngine {
    pub fn new(num_variables: usize, dense_cutoff: f64, max_age: u32, seed: u64) -> Self {
        CutEngine {
            generators: Vec::new(),
            projection: Random::projection_vector(seed, num_variables),
            seen_hashes: FnvHashSet::default(),
            installed: Vec::new(),
            next_cut_id: 0,
            dense_cutoff,
            max_age,
        }
    }

    pub fn register(&mut self, generator: Box<dyn CutGenerator>) {
        self.generators.push(generator);
    }

    fn hash_cut(&self, cut: &LinearConstraint) -> u64 {
        Self::hash_cut_with(&self.projection, cut)
    }

    fn hash_cut_with(projection: &[f64], cut: &LinearConstraint) -> u64 {
        let projected: f64 = cut
            .entries
            .iter()
            .map(|(v, c)| c * projection[v.index()])
            .sum();
        let mut hasher = FnvHasher::default();
        hasher.write_u64((projected * 1.0e6).round() as i64 as u64);
        hasher.write_u64((cut.lower_bound * 1.0e6).round() as i64 as u64);
        hasher.write_u64((cut.upper_bound * 1.0e6).round() as i64 as u64);
        hasher.finish()
    }

    fn is_too_dense(&self, cut: &LinearConstraint, num_variables: usize) -> bool {
        Self::is_too_dense_with(self.dense_cutoff, cut, num_variables)
    }

    fn is_too_dense_with(dense_cutoff: f64, cut: &LinearConstraint, num_variables: usize) -> bool {
        (cut.entries.len() as f64) > dense_cutoff * (num_variables as f64)
    }

    /// Runs every generator whose strategy fires at `(depth, node_count)`, filters
    /// duplicates and (for non-essential generators) overly dense candidates, and
    /// returns the survivors tagged with their originating generator's name, ready
    /// to be added to the relaxation. Updates `statistics` with each generator's
    /// call count, cuts produced/accepted, and wall-clock time spent generating.
    pub fn collect_cuts(
        &mut self,
        problem: &Problem,
        x: &[f64],
        depth: u32,
        node_count: u64,
        statistics: &mut Statistics,
    ) -> Vec<GeneratedCut> {
        let mut accepted = Vec::new();
        let num_variables = problem.num_variables();
        let dense_cutoff = self.dense_cutoff;
        let projection = self.projection.clone();
        for generator in &mut self.generators {
            if !generator
                .strategy()
                .should_run(depth, node_count, generator.frequency())
            {
                continue;
            }
            let name = generator.name().to_owned();
            let started = Instant::now();
            let candidates = generator.generate(problem, x, &mut self.next_cut_id);
            let essential = generator.is_essential();

            let generator_stats = statistics.generator_mut(&name);
            generator_stats.calls += 1;
            generator_stats.cuts_produced += candidates.len() as u64;
            generator_stats.current_strategy = generator.strategy();
            generator_stats.time_spent += started.elapsed();

            for cut in candidates {
                if !essential && Self::is_too_dense_with(dense_cutoff, &cut, num_variables) {
                    continue;
                }
                let hash = Self::hash_cut_with(&projection, &cut);
                if self.seen_hashes.contains(&hash) {
                    continue;
                }
                self.seen_hashes.insert(hash);
                statistics.generator_mut(&name).cuts_accepted += 1;
                accepted.push(GeneratedCut {
                    generator_name: name.clone(),
                    constraint: cut,
                });
            }
        }
        accepted
    }

    pub fn track_installed(&mut self, handle: RowHandle) {
        self.installed.push(InstalledCut { handle, age: 0 });
    }

    /// Ages every tracked cut by one node and returns the handles that exceeded
    /// `max_age`, which the caller should remove from the relaxation.
    pub fn age_and_collect_expired(&mut self) -> Vec<RowHandle> {
        let mut expired = Vec::new();
        self.installed.retain_mut(|cut| {
            cut.age += 1;
            if cut.age > self.max_age {
                expired.push(cut.handle);
                false
            } else {
                true
            }
        });
        expired
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::LinearRowId;
    use crate::basic_types::VariableId;

    fn make_cut(id: u32, entries: Vec<(VariableId, f64)>, lower: f64, upper: f64) -> LinearConstraint {
        LinearConstraint::new(LinearRowId(id), entries, lower, upper).unwrap()
    }

    #[test]
    fn identical_cuts_are_deduplicated() {
        let mut engine = CutEngine::new(3, 1.0, 10, 7);
        let a = make_cut(0, vec![(VariableId(0), 1.0), (VariableId(1), 1.0)], 0.0, 5.0);
        let b = make_cut(1, vec![(VariableId(0), 1.0), (VariableId(1), 1.0)], 0.0, 5.0);
        assert_eq!(engine.hash_cut(&a), engine.hash_cut(&b));
    }

    #[test]
    fn dense_cuts_are_rejected() {
        let engine = CutEngine::new(2, 0.4, 10, 7);
        let dense = make_cut(
            0,
            vec![(VariableId(0), 1.0), (VariableId(1), 1.0)],
            0.0,
            1.0,
        );
        assert!(engine.is_too_dense(&dense, 2));
    }

    #[test]
    fn cuts_expire_after_max_age() {
        let mut engine = CutEngine::new(2, 1.0, 1, 7);
        engine.track_installed(RowHandle(0));
        assert!(engine.age_and_collect_expired().is_empty());
        assert_eq!(engine.age_and_collect_expired(), vec![RowHandle(0)]);
    }
}

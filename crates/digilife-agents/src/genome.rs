//! Creature genome: a variable-length instruction sequence.
//!
//! The instructions themselves do not drive movement. They give each lineage
//! a heritable identity: species are bucketed by instruction set, and
//! collaboration is gated on how many instructions two creatures share.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shortest genome that mutation may produce.
pub const MIN_GENOME_LEN: usize = 10;
/// Longest genome that mutation may produce.
pub const MAX_GENOME_LEN: usize = 50;
/// Length of a freshly generated genome.
pub const RANDOM_GENOME_LEN: usize = 20;

/// The instruction alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    MoveForward,
    TurnLeft,
    TurnRight,
    SeekFood,
    SeekCreature,
    Flee,
    Rest,
    Reproduce,
}

impl Instruction {
    pub const ALL: [Instruction; 8] = [
        Instruction::MoveForward,
        Instruction::TurnLeft,
        Instruction::TurnRight,
        Instruction::SeekFood,
        Instruction::SeekCreature,
        Instruction::Flee,
        Instruction::Rest,
        Instruction::Reproduce,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Instruction {
        *Self::ALL.choose(rng).unwrap_or(&Instruction::MoveForward)
    }
}

/// Ordered instruction sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    pub instructions: Vec<Instruction>,
}

impl Genome {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// A genome of [`RANDOM_GENOME_LEN`] uniformly drawn instructions.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let instructions = (0..RANDOM_GENOME_LEN).map(|_| Instruction::random(rng)).collect();
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Length the genome grows toward for a parent of the given complexity.
    pub fn target_length(parent_complexity: f64) -> usize {
        let growth = (parent_complexity.max(0.0) / 50.0).floor() as usize;
        (RANDOM_GENOME_LEN + growth).min(MAX_GENOME_LEN)
    }

    /// Create a mutated copy.
    ///
    /// Each position mutates with probability `rate` into one of:
    /// substitution (60%), insertion (25%), deletion (7%) or duplication (8%).
    /// Insertion and duplication only apply below the target length and skip
    /// over the new instruction. Deletion only applies above
    /// [`MIN_GENOME_LEN`] and leaves the cursor in place, so the instruction
    /// that shifts into the slot gets its own roll in the same sweep.
    /// Afterwards the genome may grow toward the target, 30% per slot.
    pub fn mutate<R: Rng + ?Sized>(&self, parent_complexity: f64, rate: f64, rng: &mut R) -> Genome {
        let target = Self::target_length(parent_complexity);
        let mut out = self.instructions.clone();

        let mut i = 0;
        while i < out.len() {
            if rng.random::<f64>() >= rate {
                i += 1;
                continue;
            }

            let kind: f64 = rng.random();
            if kind < 0.6 {
                out[i] = Instruction::random(rng);
                i += 1;
            } else if kind < 0.85 {
                if out.len() < target {
                    out.insert(i, Instruction::random(rng));
                    i += 1;
                }
                i += 1;
            } else if kind < 0.92 {
                if out.len() > MIN_GENOME_LEN {
                    out.remove(i);
                } else {
                    i += 1;
                }
            } else {
                if out.len() < target {
                    let copy = out[i];
                    out.insert(i, copy);
                    i += 1;
                }
                i += 1;
            }
        }

        while out.len() < target && rng.random::<f64>() < 0.3 {
            out.push(Instruction::random(rng));
        }

        Genome::new(out)
    }

    /// Single-point crossover: this genome's head, `other`'s tail.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Genome, rng: &mut R) -> Genome {
        let shortest = self.len().min(other.len());
        if shortest < 2 {
            return self.clone();
        }
        let point = rng.random_range(1..shortest);
        let mut instructions = self.instructions[..point].to_vec();
        instructions.extend_from_slice(&other.instructions[point..]);
        Genome::new(instructions)
    }

    /// Distinct instructions present in the genome.
    pub fn instruction_set(&self) -> BTreeSet<Instruction> {
        self.instructions.iter().copied().collect()
    }

    /// Jaccard similarity of the two instruction sets. Zero if either is empty.
    pub fn jaccard(&self, other: &Genome) -> f64 {
        let a = self.instruction_set();
        let b = other.instruction_set();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let shared = a.intersection(&b).count() as f64;
        let union = a.union(&b).count() as f64;
        shared / union
    }

    pub fn is_within_bounds(&self) -> bool {
        (MIN_GENOME_LEN..=MAX_GENOME_LEN).contains(&self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_genome_has_standard_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let g = Genome::random(&mut rng);
        assert_eq!(g.len(), RANDOM_GENOME_LEN);
        assert!(g.is_within_bounds());
    }

    #[test]
    fn target_length_grows_with_complexity() {
        assert_eq!(Genome::target_length(0.0), 20);
        assert_eq!(Genome::target_length(149.0), 22);
        assert_eq!(Genome::target_length(5000.0), 50);
    }

    #[test]
    fn zero_rate_only_grows() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let g = Genome::random(&mut rng);
        let child = g.mutate(0.0, 0.0, &mut rng);
        assert_eq!(child, g);

        let grown = g.mutate(1000.0, 0.0, &mut rng);
        assert_eq!(&grown.instructions[..20], &g.instructions[..]);
        assert!(grown.len() >= 20);
    }

    #[test]
    fn deletion_floor_is_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let g = Genome::new(vec![Instruction::Rest; MIN_GENOME_LEN]);
        for _ in 0..200 {
            let child = g.mutate(0.0, 1.0, &mut rng);
            assert!(child.len() >= MIN_GENOME_LEN);
        }
    }

    #[test]
    fn full_rate_mutation_of_twenty_stays_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(20);
        let g = Genome::new((0..20).map(|_| Instruction::random(&mut rng)).collect());
        for i in 0..1000 {
            let complexity = if i % 2 == 0 { 0.0 } else { 5000.0 };
            let child = g.mutate(complexity, 1.0, &mut rng);
            assert!(
                (MIN_GENOME_LEN..=MAX_GENOME_LEN).contains(&child.len()),
                "length {} on call {}",
                child.len(),
                i
            );
        }
    }

    #[test]
    fn chained_mutation_stays_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut g = Genome::random(&mut rng);
        for step in 0..500 {
            g = g.mutate(step as f64 * 10.0, 0.5, &mut rng);
            assert!(g.is_within_bounds(), "length {} at step {}", g.len(), step);
        }
    }

    #[test]
    fn crossover_takes_head_and_tail() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let a = Genome::new(vec![Instruction::Rest; 20]);
        let b = Genome::new(vec![Instruction::Flee; 30]);
        let child = a.crossover(&b, &mut rng);
        assert_eq!(child.len(), 30);
        assert_eq!(child.instructions[0], Instruction::Rest);
        assert_eq!(child.instructions[29], Instruction::Flee);
    }

    #[test]
    fn jaccard_similarity() {
        let a = Genome::new(vec![Instruction::Rest, Instruction::Flee]);
        let b = Genome::new(vec![Instruction::Rest, Instruction::SeekFood]);
        assert!((a.jaccard(&b) - 1.0 / 3.0).abs() < 1e-10);
        assert_eq!(a.jaccard(&Genome::new(vec![])), 0.0);
        assert_eq!(a.jaccard(&a), 1.0);
    }

    #[test]
    fn serializes_as_symbols() {
        let g = Genome::new(vec![Instruction::SeekFood]);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, r#"{"instructions":["SEEK_FOOD"]}"#);
    }
}

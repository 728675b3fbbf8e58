//! Emergent vocabulary.
//!
//! Each word is tied to a named situation (a predicate over what the
//! speaker currently perceives). Repeatedly finding itself in that situation
//! builds an association; once the association count reaches the learning
//! threshold the creature can say the word.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complexity from which the advanced words become available.
pub const ADVANCED_VOCABULARY_COMPLEXITY: f64 = 1500.0;
/// Complexity from which a creature with no learned word experiments.
pub const EXPERIMENT_COMPLEXITY: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Word {
    Hunger,
    Food,
    Help,
    Hello,
    Danger,
    Good,
    Bad,
    Gather,
    Breed,
    Defend,
    DangerHere,
    Explore,
    Rest,
    Attack,
    Flee,
    Share,
}

impl Word {
    pub const BASIC: [Word; 7] = [
        Word::Hunger,
        Word::Food,
        Word::Help,
        Word::Hello,
        Word::Danger,
        Word::Good,
        Word::Bad,
    ];

    pub const ADVANCED: [Word; 9] = [
        Word::Gather,
        Word::Breed,
        Word::Defend,
        Word::DangerHere,
        Word::Explore,
        Word::Rest,
        Word::Attack,
        Word::Flee,
        Word::Share,
    ];

    /// Words a complex newborn already knows.
    pub const INNATE: [Word; 3] = [Word::Hello, Word::Good, Word::Food];

    /// Whether the situation this word names holds for the speaker.
    pub fn applies(self, f: &Perception) -> bool {
        match self {
            Word::Hunger => f.energy_ratio < 0.4,
            Word::Food => f.sees_food && f.energy_ratio < 0.6,
            Word::Help => f.energy_ratio < 0.2,
            Word::Hello => f.sees_creature && f.energy_ratio > 0.5,
            Word::Danger => f.threat,
            Word::Good => f.energy_ratio > 0.75,
            Word::Bad => f.energy_ratio < 0.25,
            Word::Gather => f.crowd >= 3,
            Word::Breed => f.can_reproduce,
            Word::Defend => f.threat && f.fitness > 100.0,
            Word::DangerHere => f.threat && f.energy_ratio < 0.5,
            Word::Explore => !f.food_in_reach,
            Word::Rest => f.energy_ratio > 0.8 && f.age > 100.0,
            Word::Attack => f.is_predator && f.energy_ratio > 0.4,
            Word::Flee => f.threat && f.fitness < 50.0,
            Word::Share => f.sees_food && f.energy_ratio > 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Word::Hunger => "hunger",
            Word::Food => "food",
            Word::Help => "help",
            Word::Hello => "hello",
            Word::Danger => "danger",
            Word::Good => "good",
            Word::Bad => "bad",
            Word::Gather => "gather",
            Word::Breed => "breed",
            Word::Defend => "defend",
            Word::DangerHere => "danger-here",
            Word::Explore => "explore",
            Word::Rest => "rest",
            Word::Attack => "attack",
            Word::Flee => "flee",
            Word::Share => "share",
        }
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a speaker perceives at the moment it considers speaking.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    pub energy_ratio: f64,
    /// Food within 100 px.
    pub sees_food: bool,
    /// Another creature within 50 px.
    pub sees_creature: bool,
    /// A predator other than the speaker within 100 px.
    pub threat: bool,
    pub can_reproduce: bool,
    pub is_predator: bool,
    pub fitness: f64,
    pub age: f64,
    /// Creatures within 100 px, the speaker included.
    pub crowd: usize,
    /// Food within 150 px.
    pub food_in_reach: bool,
}

/// Per-creature vocabulary state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocalSystem {
    /// Word to times spoken.
    vocabulary: BTreeMap<Word, u32>,
    /// Word to association count.
    associations: BTreeMap<Word, u32>,
    threshold: u32,
}

impl VocalSystem {
    /// Creatures born at or above `innate_complexity` start with the innate words learned.
    pub fn new(complexity: f64, innate_complexity: f64, threshold: u32) -> Self {
        let mut vocal = Self {
            vocabulary: BTreeMap::new(),
            associations: BTreeMap::new(),
            threshold,
        };
        if complexity >= innate_complexity {
            for word in Word::INNATE {
                vocal.associations.insert(word, threshold);
            }
        }
        vocal
    }

    pub fn has_learned(&self, word: Word) -> bool {
        self.associations.get(&word).is_some_and(|&n| n >= self.threshold)
    }

    pub fn try_learn(&mut self, word: Word) {
        *self.associations.entry(word).or_insert(0) += 1;
    }

    pub fn learned_words(&self) -> Vec<Word> {
        self.associations
            .iter()
            .filter(|(_, &n)| n >= self.threshold)
            .map(|(&w, _)| w)
            .collect()
    }

    pub fn times_spoken(&self, word: Word) -> u32 {
        self.vocabulary.get(&word).copied().unwrap_or(0)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.learned_words().len()
    }

    /// Pick a word for the current situation, learning along the way.
    ///
    /// The first applicable learned word wins. Applicable words that are not
    /// yet learned gain an association. Without an applicable learned word a
    /// random learned one is repeated, and a creature that knows nothing but
    /// is complex enough experiments with a basic word.
    pub fn choose_word<R: Rng + ?Sized>(
        &mut self,
        perception: &Perception,
        complexity: f64,
        rng: &mut R,
    ) -> Option<Word> {
        let advanced: &[Word] = if complexity >= ADVANCED_VOCABULARY_COMPLEXITY {
            &Word::ADVANCED
        } else {
            &[]
        };

        for &word in Word::BASIC.iter().chain(advanced) {
            if word.applies(perception) {
                if self.has_learned(word) {
                    return Some(word);
                }
                self.try_learn(word);
            }
        }

        let learned = self.learned_words();
        if let Some(&word) = learned.choose(rng) {
            return Some(word);
        }

        if complexity >= EXPERIMENT_COMPLEXITY {
            let word = *Word::INNATE.choose(rng)?;
            self.try_learn(word);
            let boosted = self.associations.get(&word).copied().unwrap_or(0) + 2;
            self.associations.insert(word, boosted.min(self.threshold));
            return Some(word);
        }

        None
    }

    /// Record that `word` was spoken.
    pub fn record_spoken(&mut self, word: Word) {
        *self.vocabulary.entry(word).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hungry() -> Perception {
        Perception {
            energy_ratio: 0.3,
            ..Default::default()
        }
    }

    #[test]
    fn complex_newborns_know_innate_words() {
        let vocal = VocalSystem::new(600.0, 500.0, 5);
        for word in Word::INNATE {
            assert!(vocal.has_learned(word));
        }
        let simple = VocalSystem::new(100.0, 500.0, 5);
        assert!(simple.learned_words().is_empty());
    }

    #[test]
    fn repeated_context_teaches_word() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut vocal = VocalSystem::new(0.0, 500.0, 3);
        for _ in 0..2 {
            assert_eq!(vocal.choose_word(&hungry(), 550.0, &mut rng), None);
        }
        assert!(!vocal.has_learned(Word::Hunger));
        // Third association completes learning within the same call.
        assert_eq!(vocal.choose_word(&hungry(), 550.0, &mut rng), Some(Word::Hunger));
        assert!(vocal.has_learned(Word::Hunger));
        assert_eq!(vocal.choose_word(&hungry(), 550.0, &mut rng), Some(Word::Hunger));
    }

    #[test]
    fn experiments_when_complex_and_ignorant() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut vocal = VocalSystem::new(0.0, 500.0, 5);
        let calm = Perception {
            energy_ratio: 0.7,
            food_in_reach: true,
            ..Default::default()
        };
        let word = vocal.choose_word(&calm, 650.0, &mut rng);
        assert!(word.is_some_and(|w| Word::INNATE.contains(&w)));
    }

    #[test]
    fn advanced_words_need_high_complexity() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut vocal = VocalSystem::new(0.0, 500.0, 1);
        let crowded = Perception {
            energy_ratio: 0.7,
            crowd: 4,
            food_in_reach: true,
            ..Default::default()
        };
        vocal.choose_word(&crowded, 550.0, &mut rng);
        assert!(!vocal.has_learned(Word::Gather));
        vocal.choose_word(&crowded, 1600.0, &mut rng);
        assert!(vocal.has_learned(Word::Gather));
    }

    #[test]
    fn predicates() {
        let p = Perception {
            energy_ratio: 0.9,
            age: 150.0,
            ..Default::default()
        };
        assert!(Word::Good.applies(&p));
        assert!(Word::Rest.applies(&p));
        assert!(Word::Explore.applies(&p));
        assert!(!Word::Hunger.applies(&p));
        assert!(!Word::Danger.applies(&p));
    }
}

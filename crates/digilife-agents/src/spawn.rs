//! Food spawn policies.
//!
//! The world asks its policy for new food every tick. The default
//! [`RateSpawnPolicy`] emits items at a steady rate; [`NoFoodPolicy`]
//! starves the world, which is useful for controlled experiments.

use digilife_core::types::{FoodItem, FoodKind, Position, SimRng};
use rand::Rng;

/// Fraction of items placed well away from the border.
const INNER_FRACTION: f64 = 0.8;
const INNER_MARGIN: f64 = 100.0;
const OUTER_MARGIN: f64 = 10.0;

/// Trait for food spawn policies.
pub trait FoodSpawnPolicy: Send {
    /// Food to add to a `width` × `height` world after `dt` seconds.
    fn spawn(&mut self, dt: f64, width: f64, height: f64, rng: &mut SimRng) -> Vec<FoodItem>;

    /// Change the spawn rate, in items per second. Policies without a rate ignore this.
    fn set_rate(&mut self, _rate: f64) {}
}

/// Emit one item every `1 / rate` simulated seconds.
#[derive(Debug, Clone)]
pub struct RateSpawnPolicy {
    rate: f64,
    timer: f64,
}

impl RateSpawnPolicy {
    pub fn new(rate: f64) -> Self {
        Self { rate, timer: 0.0 }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl FoodSpawnPolicy for RateSpawnPolicy {
    fn spawn(&mut self, dt: f64, width: f64, height: f64, rng: &mut SimRng) -> Vec<FoodItem> {
        if self.rate <= 0.0 {
            return Vec::new();
        }
        self.timer += dt;
        let interval = 1.0 / self.rate;

        let mut spawned = Vec::new();
        while self.timer >= interval {
            self.timer -= interval;
            spawned.push(random_food(width, height, rng));
        }
        spawned
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate.max(0.0);
    }
}

/// Never spawn food.
pub struct NoFoodPolicy;

impl FoodSpawnPolicy for NoFoodPolicy {
    fn spawn(&mut self, _dt: f64, _width: f64, _height: f64, _rng: &mut SimRng) -> Vec<FoodItem> {
        Vec::new()
    }
}

/// A random food item, usually away from the walls.
pub fn random_food<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> FoodItem {
    let preferred = if rng.random::<f64>() < INNER_FRACTION {
        INNER_MARGIN
    } else {
        OUTER_MARGIN
    };
    // Small worlds cannot honour a wide margin.
    let margin = preferred.min(width / 2.0).min(height / 2.0).max(0.0);
    let position = Position::new(
        uniform(rng, margin, width - margin),
        uniform(rng, margin, height - margin),
    );
    FoodItem::new(FoodKind::from_roll(rng.random::<f64>()), position)
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_rate_policy_emits_one_item_per_interval() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut policy = RateSpawnPolicy::new(5.0);

        let mut total = 0;
        for _ in 0..10 {
            total += policy.spawn(0.1, 1400.0, 900.0, &mut rng).len();
        }
        // One simulated second at five per second.
        assert!((4..=5).contains(&total), "spawned {total}");
    }

    #[test]
    fn test_zero_rate_spawns_nothing() {
        let mut rng = SimRng::seed_from_u64(2);
        let mut policy = RateSpawnPolicy::new(0.0);
        assert!(policy.spawn(100.0, 1400.0, 900.0, &mut rng).is_empty());
    }

    #[test]
    fn test_spawned_food_stays_inside_world() {
        let mut rng = SimRng::seed_from_u64(3);
        for _ in 0..500 {
            let food = random_food(400.0, 300.0, &mut rng);
            assert!(food.position.x >= 10.0 && food.position.x <= 390.0);
            assert!(food.position.y >= 10.0 && food.position.y <= 290.0);
        }
    }

    #[test]
    fn test_no_food_policy() {
        let mut rng = SimRng::seed_from_u64(4);
        let mut policy = NoFoodPolicy;
        assert!(policy.spawn(10.0, 100.0, 100.0, &mut rng).is_empty());
    }
}

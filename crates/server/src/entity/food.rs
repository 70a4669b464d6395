//! Food pellets.

use super::palette::FOOD_COLORS;
use glam::Vec2;
use rand::Rng;

/// Ambient food keeps this distance from the world edges.
const AMBIENT_MARGIN: f32 = 100.0;
/// Death-drop food is this much larger than ambient food.
const DEATH_DROP_SCALE: f32 = 1.8;
/// Nutrition of a death-drop pellet.
const DEATH_DROP_VALUE: usize = 3;

/// Where a pellet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodOrigin {
    /// Scattered to keep the population floor.
    Ambient,
    /// Left along the body of a dying snake.
    DeathDrop,
    /// Shed from the tail of a boosting snake.
    BoostDrop,
}

/// A collectible pellet.
#[derive(Debug, Clone)]
pub struct Food {
    pub id: u64,
    pub position: Vec2,
    pub color: &'static str,
    pub radius: f32,
    /// Segments added to the snake that eats it.
    pub value: usize,
    pub origin: FoodOrigin,
}

impl Food {
    /// Pellet of the given origin at `position`; size and value follow the origin.
    pub fn new<R: Rng>(
        id: u64,
        position: Vec2,
        origin: FoodOrigin,
        base_radius: f32,
        rng: &mut R,
    ) -> Self {
        let (radius, value) = match origin {
            FoodOrigin::DeathDrop => (base_radius * DEATH_DROP_SCALE, DEATH_DROP_VALUE),
            FoodOrigin::Ambient | FoodOrigin::BoostDrop => (base_radius, 1),
        };
        Self {
            id,
            position,
            color: FOOD_COLORS[rng.random_range(0..FOOD_COLORS.len())],
            radius,
            value,
            origin,
        }
    }

    /// Random pellet inside the world, away from the edges.
    pub fn ambient<R: Rng>(id: u64, world_size: f32, base_radius: f32, rng: &mut R) -> Self {
        let span = (world_size - 2.0 * AMBIENT_MARGIN).max(0.0);
        let position = Vec2::new(
            AMBIENT_MARGIN + rng.random::<f32>() * span,
            AMBIENT_MARGIN + rng.random::<f32>() * span,
        );
        Self::new(id, position, FoodOrigin::Ambient, base_radius, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_ambient_inside_margin() {
        let mut rng = StdRng::seed_from_u64(1);
        for id in 0..500 {
            let food = Food::ambient(id, 6000.0, 5.0, &mut rng);
            assert!(food.position.x >= 100.0 && food.position.x <= 5900.0);
            assert!(food.position.y >= 100.0 && food.position.y <= 5900.0);
            assert_eq!(food.value, 1);
            assert_eq!(food.radius, 5.0);
            assert!(FOOD_COLORS.contains(&food.color));
        }
    }

    #[test]
    fn test_drop_sizes() {
        let mut rng = StdRng::seed_from_u64(2);
        let big = Food::new(1, Vec2::new(50.0, 50.0), FoodOrigin::DeathDrop, 5.0, &mut rng);
        assert_eq!(big.value, 3);
        assert!((big.radius - 9.0).abs() < 1e-5);
        assert_eq!(big.origin, FoodOrigin::DeathDrop);

        let small = Food::new(2, Vec2::new(50.0, 50.0), FoodOrigin::BoostDrop, 5.0, &mut rng);
        assert_eq!(small.value, 1);
        assert_eq!(small.radius, 5.0);
        assert_eq!(small.position, Vec2::new(50.0, 50.0));
    }
}

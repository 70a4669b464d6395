use rand::Rng;

/// Names given to AI snakes.
const AI_NAMES: &[&str] = &[
    "Viper", "Cobra", "Python", "Mamba", "Naga", "Serpent", "Basilisk", "Hydra", "Rattler", "Boa",
    "Adder", "Asp", "Draco", "Slyther", "Fang", "Scales", "Striker", "Shadow", "Venom", "Blaze",
];

/// Pick a random AI name.
pub fn random_name<R: Rng>(rng: &mut R) -> String {
    AI_NAMES[rng.random_range(0..AI_NAMES.len())].to_string()
}

/// Byte-oriented randomness source used by prime search, witness selection, padding
/// and session secrets.
pub trait Rand: Default {
    fn rand(&mut self, random: &mut [u8]);
}

mod default_rand;
pub use default_rand::DefaultRand;

mod seeded_rand;
pub use seeded_rand::SeededRand;

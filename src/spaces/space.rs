// Common trait for observation and action spaces.

use rand::Rng;

/// A set of valid values that can be sampled from and tested for membership.
/// `Element` is the value type living in the space (e.g. u32 for Discrete,
/// an n-dimensional array for BoxSpace).
pub trait Space {
    type Element;

    /// Draw a sample from the space using the provided RNG.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element;

    /// Return true if the given element is a valid member of the space.
    fn contains(&self, elem: &Self::Element) -> bool;
}

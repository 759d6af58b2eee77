/// Spaces describing pipeline actions and observations.

pub mod space;

use ndarray::{ArrayD, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

pub use space::Space;

/// A discrete space of integers in [0, n).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    n: u32,
}

impl Discrete {
    pub fn new(n: u32) -> Self {
        assert!(n > 0, "Discrete space requires n > 0");
        Self { n }
    }

    pub fn n(&self) -> u32 { self.n }
}

impl Space for Discrete {
    type Element = u32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        if self.n == 1 { return 0; }
        let dist = Uniform::from(0..self.n);
        dist.sample(rng)
    }

    fn contains(&self, elem: &Self::Element) -> bool { *elem < self.n }
}

/// A box of `f32` values with shared inclusive bounds and a fixed shape,
/// e.g. `[4, 84, 84]` for a stack of four 84x84 frames.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace {
    low: f32,
    high: f32,
    shape: Vec<usize>,
}

impl BoxSpace {
    pub fn new(low: f32, high: f32, shape: Vec<usize>) -> Self {
        assert!(low <= high, "BoxSpace low {low} > high {high}");
        Self { low, high, shape }
    }

    pub fn low(&self) -> f32 { self.low }
    pub fn high(&self) -> f32 { self.high }
    pub fn shape(&self) -> &[usize] { &self.shape }
}

impl Space for BoxSpace {
    type Element = ArrayD<f32>;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        let dist = Uniform::new_inclusive(self.low, self.high);
        ArrayD::from_shape_simple_fn(IxDyn(&self.shape), || dist.sample(rng))
    }

    fn contains(&self, elem: &Self::Element) -> bool {
        elem.shape() == self.shape.as_slice()
            && elem.iter().all(|&v| self.low <= v && v <= self.high)
    }
}

use ndarray::Array3;
use platformer_wrappers::{BoxSpace, Discrete, Resolution, RewardShaper, Space, StepInfo, reduce_frame};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

proptest! {
    // Reduced frames always have the target shape, whatever the input size
    #[test]
    fn reduced_shape_is_fixed(h in 1usize..96, w in 1usize..96, th in 1u32..64, tw in 1u32..64, fill in any::<u8>()) {
        let raw = Array3::from_elem((h, w, 3), fill);
        let frame = reduce_frame(Some(&raw), Resolution::new(th, tw)).unwrap();
        prop_assert_eq!(frame.dim(), (1, th as usize, tw as usize));
        let space = BoxSpace::new(0.0, 255.0, vec![1, th as usize, tw as usize]);
        prop_assert!(space.contains(&frame.into_dyn()));
    }

    // The absent frame is all zeros at any resolution
    #[test]
    fn absent_frame_is_zero(th in 1u32..128, tw in 1u32..128) {
        let frame = reduce_frame(None, Resolution::new(th, tw)).unwrap();
        prop_assert_eq!(frame.dim(), (1, th as usize, tw as usize));
        prop_assert!(frame.iter().all(|&v| v == 0.0));
    }

    // Progress never contributes outside [0, 2]
    #[test]
    fn distance_term_bounded(moves in proptest::collection::vec(-50.0f64..50.0, 1..40)) {
        let mut shaper = RewardShaper::default();
        let mut distance = 40.0;
        for dx in moves {
            distance += dx;
            let r = shaper.shape(&StepInfo { distance, time: 400.0, player_status: 0.0, score: 0.0 }, false);
            prop_assert!((0.0..=2.0).contains(&r));
            if dx >= 2.5 { prop_assert_eq!(r, 2.0); }
            if dx <= -0.5 { prop_assert_eq!(r, 0.0); }
        }
    }

    // Action sampling stays in range and is deterministic per seed
    #[test]
    fn discrete_sampling_contains_and_deterministic(n in 1u32..64, seed in any::<u64>()) {
        let d = Discrete::new(n);
        let mut rng1 = StdRng::seed_from_u64(seed);
        let mut rng2 = StdRng::seed_from_u64(seed);
        for _ in 0..50 {
            let v1 = d.sample(&mut rng1);
            prop_assert!(d.contains(&v1));
            prop_assert_eq!(v1, d.sample(&mut rng2));
        }
    }
}

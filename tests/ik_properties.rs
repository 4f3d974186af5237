//! Property tests for the shared math primitives

use glam::Vec2;
use proptest::prelude::*;

use sinew::math::damp::damp;
use sinew::math::ik::{BendDir, TwoBoneIk};

fn bend_from(flag: bool) -> BendDir {
    if flag {
        BendDir::Positive
    } else {
        BendDir::Negative
    }
}

proptest! {
    /// Segment lengths hold for ANY target, reachable or not
    #[test]
    fn prop_segment_lengths_preserved(
        l1 in 1.0f32..50.0,
        l2 in 1.0f32..50.0,
        root_x in -200.0f32..200.0,
        root_y in -200.0f32..200.0,
        target_x in -400.0f32..400.0,
        target_y in -400.0f32..400.0,
        bend in any::<bool>(),
    ) {
        let chain = TwoBoneIk::new(l1, l2).unwrap();
        let root = Vec2::new(root_x, root_y);
        let target = Vec2::new(target_x, target_y);
        let solution = chain.solve(root, target, bend_from(bend));

        prop_assert!(solution.mid.is_finite());
        prop_assert!(solution.end.is_finite());

        let seg1 = (solution.mid - root).length();
        let seg2 = (solution.end - solution.mid).length();
        prop_assert!((seg1 - l1).abs() < l1 * 1e-2 + 1e-2, "proximal {seg1} vs {l1}");
        prop_assert!((seg2 - l2).abs() < l2 * 1e-2 + 1e-2, "distal {seg2} vs {l2}");
    }

    /// Targets inside the reachable band are hit exactly
    #[test]
    fn prop_reachable_target_hit(
        l1 in 5.0f32..40.0,
        l2 in 5.0f32..40.0,
        angle in 0.0f32..std::f32::consts::TAU,
        reach_fraction in 0.05f32..0.95,
        bend in any::<bool>(),
    ) {
        let chain = TwoBoneIk::new(l1, l2).unwrap();
        let min = (l1 - l2).abs() + 1e-2;
        let max = l1 + l2 - 1e-2;
        let dist = min + (max - min) * reach_fraction;
        let target = Vec2::new(angle.cos(), angle.sin()) * dist;

        let solution = chain.solve(Vec2::ZERO, target, bend_from(bend));
        prop_assert!(
            (solution.end - target).length() < (l1 + l2) * 1e-3 + 1e-2,
            "end {:?} missed target {:?}",
            solution.end,
            target
        );
    }

    /// Unreachable targets are clamped onto the reach circle
    #[test]
    fn prop_unreachable_target_clamped(
        l1 in 5.0f32..40.0,
        l2 in 5.0f32..40.0,
        angle in 0.0f32..std::f32::consts::TAU,
        overshoot in 1.1f32..50.0,
    ) {
        let chain = TwoBoneIk::new(l1, l2).unwrap();
        let target = Vec2::new(angle.cos(), angle.sin()) * (l1 + l2) * overshoot;

        let solution = chain.solve(Vec2::ZERO, target, BendDir::Positive);
        let end_dist = solution.end.length();
        prop_assert!(end_dist <= l1 + l2);
        prop_assert!(end_dist >= (l1 + l2) * 0.99);
    }

    /// Damped interpolation never overshoots and never reverses
    #[test]
    fn prop_damp_bounded_and_monotonic(
        current in -100.0f32..100.0,
        target in -100.0f32..100.0,
        speed in 0.0f32..100.0,
        dt in 0.0f32..1.0,
    ) {
        let next = damp(current, target, speed, dt);
        let lo = current.min(target);
        let hi = current.max(target);
        prop_assert!(next >= lo - 1e-4 && next <= hi + 1e-4, "overshoot: {next}");
    }

    /// Halving the timestep does not change where damping converges
    #[test]
    fn prop_damp_frame_rate_independent(
        current in -50.0f32..50.0,
        target in -50.0f32..50.0,
        speed in 0.1f32..50.0,
        dt in 0.001f32..0.1,
    ) {
        let one_step = damp(current, target, speed, 2.0 * dt);
        let two_steps = damp(damp(current, target, speed, dt), target, speed, dt);
        prop_assert!((one_step - two_steps).abs() < 1e-3);
    }
}

#[test]
fn test_zero_length_segment_is_construction_error() {
    assert!(TwoBoneIk::new(0.0, 5.0).is_err());
    assert!(TwoBoneIk::new(5.0, 0.0).is_err());
}

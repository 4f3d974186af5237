//! Combat posing integration tests

use glam::Vec2;

use sinew::animator::Animator;
use sinew::core::types::{ActionState, CharacterId, Context};

const DT: f32 = 1.0 / 60.0;

fn animator() -> Animator {
    Animator::with_defaults(CharacterId::new()).unwrap()
}

/// Sweep an attack from t=0 to t=1 over `frames` frames, returning the
/// right-hand x position and wrist pronation per frame
fn attack_sweep(animator: &mut Animator, frames: usize) -> Vec<(f32, f32, f32)> {
    let mut samples = Vec::new();
    for i in 0..frames {
        let t = i as f32 / (frames - 1) as f32;
        let ctx = Context {
            action: ActionState::Attacking,
            action_time: t,
            ..Default::default()
        };
        let frame = animator.advance(DT, &ctx);
        samples.push((
            t,
            frame.pose.right_arm.hand.position.x,
            frame.pose.right_arm.wrist.pronation,
        ));
    }
    samples
}

#[test]
fn test_attack_reach_envelope_peaks_mid_swing() {
    let mut animator = animator();
    // Settle into idle first so the sweep starts from rest
    for _ in 0..120 {
        animator.advance(DT, &Context::default());
    }

    // A realistically paced attack: 0.6 seconds
    let samples = attack_sweep(&mut animator, 36);

    let (peak_t, peak_x, _) = samples
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    let start_x = samples.first().unwrap().1;
    let end_x = samples.last().unwrap().1;

    // Windup -> peak -> retract: the maximum sits near the middle and
    // clearly above both ends
    assert!(
        (0.3..=0.8).contains(&peak_t),
        "reach peaked at t={peak_t}, expected mid-swing"
    );
    assert!(peak_x > start_x + 5.0);
    assert!(peak_x > end_x + 5.0);
}

#[test]
fn test_pronation_negative_only_inside_swing_window() {
    let mut animator = animator();
    let window_end = animator.config().arm.swing_end;
    let window_begin = animator.config().arm.swing_begin;
    for _ in 0..120 {
        animator.advance(DT, &Context::default());
    }

    let samples = attack_sweep(&mut animator, 36);
    // The damped wrist needs a few frames to swing back positive after
    // the window closes, so allow a lag margin past the trailing edge
    let margin = 0.25;
    for (t, _, pronation) in samples {
        if pronation < -0.05 {
            assert!(
                t >= window_begin && t <= window_end + margin,
                "pronated at t={t}, outside [{window_begin}, {window_end}]"
            );
        }
    }
}

#[test]
fn test_pronation_reaches_target_mid_window() {
    let mut animator = animator();
    let amount = animator.config().arm.pronation_amount;
    // Hold the mid-window pose until the wrist settles
    let ctx = Context {
        action: ActionState::Attacking,
        action_time: 0.5,
        ..Default::default()
    };
    let mut frame = animator.advance(DT, &ctx);
    for _ in 0..300 {
        frame = animator.advance(DT, &ctx);
    }
    assert!((frame.pose.right_arm.wrist.pronation + amount).abs() < 0.02);
}

#[test]
fn test_blocking_guards_above_torso() {
    let mut animator = animator();
    let ctx = Context {
        action: ActionState::Blocking,
        ..Default::default()
    };
    let mut frame = animator.advance(DT, &ctx);
    for _ in 0..300 {
        frame = animator.advance(DT, &ctx);
    }
    for arm in [&frame.pose.left_arm, &frame.pose.right_arm] {
        assert!(
            arm.hand.position.y > frame.pose.torso.position.y,
            "guard hand below torso"
        );
        assert!(arm.hand.position.x > 0.0, "guard hand behind the facing");
    }
}

#[test]
fn test_facing_mirrors_attack() {
    let mut right = animator();
    let mut left = animator();
    let ctx_right = Context {
        action: ActionState::Attacking,
        action_time: 0.5,
        ..Default::default()
    };
    let ctx_left = Context {
        facing: -1.0,
        ..ctx_right.clone()
    };

    let mut frame_right = right.advance(DT, &ctx_right);
    let mut frame_left = left.advance(DT, &ctx_left);
    for _ in 0..300 {
        frame_right = right.advance(DT, &ctx_right);
        frame_left = left.advance(DT, &ctx_left);
    }

    let reach_right = frame_right.pose.right_arm.hand.position.x;
    let reach_left = frame_left.pose.right_arm.hand.position.x;
    assert!(reach_right > 0.0);
    assert!(reach_left < 0.0);
    assert!((reach_right + reach_left).abs() < 1.5, "mirror is not symmetric");
}

#[test]
fn test_walk_swings_arms_antiphase() {
    let mut animator = animator();
    let mut pos = Vec2::ZERO;
    let mut lefts = Vec::new();
    let mut rights = Vec::new();
    for i in 0..600 {
        pos.x += 150.0 * DT;
        let ctx = Context {
            position: pos,
            velocity: Vec2::new(150.0, 0.0),
            ..Default::default()
        };
        let frame = animator.advance(DT, &ctx);
        if i > 120 {
            lefts.push(frame.pose.left_arm.hand.position.x);
            rights.push(frame.pose.right_arm.hand.position.x);
        }
    }

    let mean = |v: &[f32]| v.iter().sum::<f32>() / v.len() as f32;
    let left_mean = mean(&lefts);
    let right_mean = mean(&rights);

    // The swing actually happens...
    let left_span = lefts.iter().fold(0.0_f32, |m, &x| m.max((x - left_mean).abs()));
    assert!(left_span > 1.0, "arms barely swing ({left_span})");

    // ...and the two hands oscillate in opposition
    let correlation: f32 = lefts
        .iter()
        .zip(rights.iter())
        .map(|(&l, &r)| (l - left_mean) * (r - right_mean))
        .sum();
    assert!(correlation < 0.0, "arm swings are not anti-phase");
}

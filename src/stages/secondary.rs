//! Trailing cloth/hair chains and equipment impulse response
//!
//! Each chain point relaxes toward its predecessor plus a directional
//! bias (rest hang, wind, momentum trail, per-index oscillation). This is
//! a deterministic approximation driven by an internal clock, not a
//! physical integrator. Equipment anchors to the weapon hand with a
//! jiggle and an impulse accumulator for discrete hits.

use glam::Vec2;

use crate::core::config::SecondaryConfig;
use crate::core::types::{Context, ImpulseEvent};
use crate::math::damp::{damp, damp_angle, damp_vec2};
use crate::pose::Pose;
use crate::stages::combat::WEAPON_HAND;
use crate::stages::{EquipmentPose, FrameAux, PoseStage};

/// One trailing item anchored to the weapon hand
#[derive(Debug, Clone, Copy)]
struct EquipmentState {
    /// Smoothed anchor-following position (before impulse)
    smoothed: Vec2,
    orientation: f32,
    /// Decaying accumulator for discrete hit impulses
    impulse: Vec2,
}

pub struct SecondaryMotionStage {
    cfg: SecondaryConfig,
    /// Internal clock driving the oscillations (deterministic)
    time: f32,
    /// Cloth chain, anchored at the pelvis; fixed length, never resized
    cloth: Vec<Vec2>,
    /// Hair chain, anchored at the head; fixed length, never resized
    hair: Vec<Vec2>,
    equipment: EquipmentState,
    initialized: bool,
}

impl SecondaryMotionStage {
    pub fn new(cfg: SecondaryConfig) -> Self {
        let cloth = vec![Vec2::ZERO; cfg.cloth_points];
        let hair = vec![Vec2::ZERO; cfg.hair_points];
        Self {
            cfg,
            time: 0.0,
            cloth,
            hair,
            equipment: EquipmentState {
                smoothed: Vec2::ZERO,
                orientation: 0.0,
                impulse: Vec2::ZERO,
            },
            initialized: false,
        }
    }

    /// Drop every chain straight down from its anchor
    fn settle(&mut self, cloth_anchor: Vec2, hair_anchor: Vec2, hand: Vec2) {
        for (i, point) in self.cloth.iter_mut().enumerate() {
            *point = cloth_anchor - Vec2::new(0.0, self.cfg.cloth_spacing * i as f32);
        }
        for (i, point) in self.hair.iter_mut().enumerate() {
            *point = hair_anchor - Vec2::new(0.0, self.cfg.hair_spacing * i as f32);
        }
        self.equipment.smoothed = hand;
    }

    fn impulse_vector(&self, event: ImpulseEvent, facing: f32) -> Vec2 {
        match event {
            // Landing jolts gear straight down
            ImpulseEvent::Landing => Vec2::new(0.0, -self.cfg.landing_impulse),
            // Hits knock backward and slightly up
            ImpulseEvent::Hurt => Vec2::new(
                -facing * self.cfg.hurt_impulse,
                self.cfg.hurt_impulse * 0.3,
            ),
            ImpulseEvent::BlockImpact => Vec2::new(-facing * self.cfg.block_impulse, 0.0),
        }
    }

    fn relax_chain(
        points: &mut [Vec2],
        anchor: Vec2,
        spacing: f32,
        damping: f32,
        drift: f32,
        oscillation: impl Fn(usize) -> Vec2,
        dt: f32,
    ) {
        points[0] = anchor;
        for i in 1..points.len() {
            let target = points[i - 1] + Vec2::new(drift, -spacing) + oscillation(i);
            points[i] = damp_vec2(points[i], target, damping, dt);
        }
    }
}

impl PoseStage for SecondaryMotionStage {
    fn name(&self) -> &'static str {
        "secondary"
    }

    fn apply(&mut self, dt: f32, ctx: &Context, pose: &mut Pose, aux: &mut FrameAux) {
        self.time += dt;

        let cloth_anchor = pose.pelvis.position + Vec2::new(-ctx.facing * 2.0, 2.0);
        let hair_anchor = pose.head.position + Vec2::new(0.0, 3.0);
        let hand = pose.arm(WEAPON_HAND).hand.position;
        let wrist_rotation = pose.arm(WEAPON_HAND).wrist.rotation;

        if !self.initialized {
            self.settle(cloth_anchor, hair_anchor, hand);
            self.initialized = true;
        }

        // Shared horizontal drift: wind pushes, momentum trails behind
        let drift = ctx.wind * self.cfg.wind_factor - ctx.velocity.x * self.cfg.momentum_factor;

        let time = self.time;
        let sway = self.cfg.cloth_sway;
        let sway_freq = self.cfg.cloth_sway_freq;
        Self::relax_chain(
            &mut self.cloth,
            cloth_anchor,
            self.cfg.cloth_spacing,
            self.cfg.cloth_damping,
            drift,
            |i| Vec2::new((time * sway_freq + i as f32 * 1.3).sin() * sway, 0.0),
            dt,
        );

        let bounce = self.cfg.hair_bounce;
        let bounce_freq = self.cfg.hair_bounce_freq;
        Self::relax_chain(
            &mut self.hair,
            hair_anchor,
            self.cfg.hair_spacing,
            self.cfg.hair_damping,
            drift,
            |i| Vec2::new(0.0, (time * bounce_freq + i as f32 * 0.9).sin() * bounce),
            dt,
        );

        // Discrete events feed the accumulator, which decays exponentially
        for &event in &aux.impulses {
            self.equipment.impulse += self.impulse_vector(event, ctx.facing);
        }
        self.equipment.impulse *= (-self.cfg.impulse_decay * dt).exp();

        let jiggle = Vec2::new(
            (self.time * self.cfg.jiggle_freq).sin() * self.cfg.jiggle_amount,
            (self.time * self.cfg.jiggle_freq * 0.8).cos() * self.cfg.jiggle_amount * 0.5,
        );
        self.equipment.smoothed = damp_vec2(
            self.equipment.smoothed,
            hand + jiggle,
            self.cfg.equipment_damping,
            dt,
        );
        self.equipment.orientation = damp_angle(
            self.equipment.orientation,
            wrist_rotation,
            self.cfg.equipment_damping,
            dt,
        );

        aux.secondary.cloth = self.cloth.clone();
        aux.secondary.hair = self.hair.clone();
        aux.secondary.equipment = vec![EquipmentPose {
            position: self.equipment.smoothed + self.equipment.impulse,
            orientation: self.equipment.orientation,
        }];
    }
}

//! Headless animation driver
//!
//! Runs one or more animators against a seeded synthetic input stream and
//! logs procedural metrics. Useful for eyeballing determinism and tuning
//! without a renderer attached.
//!
//! Usage:
//!   live_anim --seconds 5 --characters 3 --seed 7
//!   live_anim --dump > trace.jsonl

use ahash::AHashMap;
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sinew::animator::Animator;
use sinew::core::types::{ActionState, CharacterId, Context};
use sinew::pool::AnimatorPool;

#[derive(Parser, Debug)]
#[command(name = "live_anim", about = "Headless procedural animation driver")]
struct Args {
    /// Simulated duration in seconds
    #[arg(long, default_value_t = 5.0)]
    seconds: f32,

    /// Simulation rate in frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for the synthetic input stream
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Number of characters to animate
    #[arg(long, default_value_t = 1)]
    characters: usize,

    /// Emit one JSON frame per line to stdout (first character only)
    #[arg(long, default_value_t = false)]
    dump: bool,
}

/// Synthetic pilot: wanders, occasionally attacks, blocks or jumps
struct Pilot {
    rng: ChaCha8Rng,
    ctx: Context,
    action_timer: f32,
    airborne_timer: f32,
}

impl Pilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            ctx: Context::default(),
            action_timer: 0.0,
            airborne_timer: 0.0,
        }
    }

    fn step(&mut self, dt: f32) -> Context {
        // Wander: retarget velocity now and then
        if self.rng.gen_bool(0.02) {
            let speed = self.rng.gen_range(0.0..220.0);
            let facing = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            self.ctx.velocity = Vec2::new(facing * speed, 0.0);
            self.ctx.facing = facing;
        }
        self.ctx.position += self.ctx.velocity * dt;

        // Action state machine: short attacks and blocks
        if self.action_timer > 0.0 {
            self.action_timer -= dt;
            self.ctx.action_time = (1.0 - self.action_timer / 0.4).clamp(0.0, 1.0);
            if self.action_timer <= 0.0 {
                self.ctx.action = ActionState::Idle;
                self.ctx.action_time = 0.0;
            }
        } else if self.rng.gen_bool(0.01) {
            self.ctx.action = if self.rng.gen_bool(0.7) {
                ActionState::Attacking
            } else {
                ActionState::Blocking
            };
            self.action_timer = 0.4;
            self.ctx.action_time = 0.0;
        }

        // Occasional hop to exercise landing impulses
        if self.airborne_timer > 0.0 {
            self.airborne_timer -= dt;
            self.ctx.grounded = self.airborne_timer <= 0.0;
        } else if self.rng.gen_bool(0.005) {
            self.airborne_timer = 0.3;
            self.ctx.grounded = false;
        }

        self.ctx.wind = (self.ctx.position.x * 0.001).sin() * 0.4;
        self.ctx.clone()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    tracing::info!(
        "Starting live_anim: {} character(s), {}s at {} fps, seed {}",
        args.characters,
        args.seconds,
        args.fps,
        args.seed
    );

    let dt = 1.0 / args.fps.max(1) as f32;
    let frames = (args.seconds * args.fps as f32) as usize;

    let mut pool = AnimatorPool::new();
    let mut pilots: Vec<(CharacterId, Pilot)> = Vec::new();
    for i in 0..args.characters.max(1) {
        let id = CharacterId::new();
        pool.insert(Animator::with_defaults(id).expect("default rig is valid"));
        pilots.push((id, Pilot::new(args.seed.wrapping_add(i as u64))));
    }
    let first_id = pilots[0].0;

    let mut total_events = 0usize;
    for frame_idx in 0..frames {
        let mut contexts = AHashMap::new();
        for (id, pilot) in &mut pilots {
            contexts.insert(*id, pilot.step(dt));
        }

        let results = pool.advance_all(dt, &contexts);
        for (id, frame) in &results {
            total_events += frame.events.len();
            if args.dump && *id == first_id {
                match serde_json::to_string(frame) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("frame serialization failed: {e}"),
                }
            }
        }

        // One metrics line per simulated second
        if frame_idx % args.fps as usize == 0 {
            if let Some((_, frame)) = results.iter().find(|(id, _)| *id == first_id) {
                tracing::info!(
                    "t={:.1}s phase={:.2} moving={} planted={:?} events_so_far={}",
                    frame_idx as f32 * dt,
                    frame.metrics.gait_phase,
                    frame.metrics.moving,
                    frame.metrics.planted,
                    total_events
                );
            }
        }
    }

    tracing::info!("Done: {frames} frames, {total_events} animation events");
}

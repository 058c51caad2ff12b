//! Headless demo: a handful of goblins stamped from prototypes, driven by
//! the transform, animation, render, and collision systems for a few
//! simulated seconds.
//!
//! Run with `RUST_LOG=debug cargo run --example goblins` to watch the
//! frame-by-frame logging.

use stencil::prelude::*;

const HIT: Action = Action(1);
const WAVE: Action = Action(2);

static SHEET: &str = r#"[
    {
        "name": "Goblin",
        "properties": {
            "position": [0.0, 0.0],
            "velocity": [12.0, 0.0],
            "size": [16.0, 16.0],
            "frame_time": 0.25,
            "looping": true
        },
        "systems": ["Transform", "Animation", "Collision", "Render"],
        "frames": [
            {"x": 0.0,  "y": 0.0, "w": 16.0, "h": 16.0},
            {"x": 16.0, "y": 0.0, "w": 16.0, "h": 16.0},
            {"x": 32.0, "y": 0.0, "w": 16.0, "h": 16.0},
            {"x": 48.0, "y": 0.0, "w": 16.0, "h": 16.0}
        ]
    },
    {
        "name": "Wall",
        "properties": {
            "position": [96.0, 0.0],
            "size": [16.0, 64.0]
        },
        "systems": ["Collision", "Render"]
    }
]"#;

fn main() -> Result<()> {
    env_logger::init();

    let mut world = World::new();
    world.add_system(Box::new(TransformSystem::new()))?;
    world.add_system(Box::new(AnimationSystem::new()))?;
    world.add_system(Box::new(RenderSystem::new(RecordingTarget::new())))?;
    world.set_collision_system(Box::new(AabbCollisionSystem::new(HIT)))?;

    let loaded = world.load_prototype_sheet(SHEET)?;
    println!("loaded {loaded} prototypes");

    let goblin = world.spawn("Goblin")?;
    let wall = world.spawn("Wall")?;
    world.subscribe(HIT, Target::Entity(goblin));

    world.timers_mut().schedule("wave", 2.0, true, WAVE)?;
    world.subscribe(WAVE, Target::Entity(goblin));

    // 240 frames at 60 Hz: four seconds of simulation.
    let dt = 1.0 / 60.0;
    for _ in 0..240 {
        world.step(dt);

        let events = world
            .entities_mut()
            .get_mut(goblin)
            .expect("goblin is alive")
            .take_events();
        for event in events {
            match event.source {
                EventSource::Collision(data) => {
                    println!("goblin hit {} (mtv {:?})", data.other, data.mtv);
                    // Bounce: undo the overlap and reverse course.
                    let props = world
                        .entities_mut()
                        .get_mut(goblin)
                        .expect("goblin is alive")
                        .props_mut();
                    *props.get_mut::<Vec2>(keys::POSITION)? += data.mtv;
                    let velocity = props.get_mut::<Vec2>(keys::VELOCITY)?;
                    velocity.x = -velocity.x;
                }
                EventSource::Timer { name } => println!("timer \"{name}\" fired"),
                EventSource::Input(_) => {}
            }
        }
    }

    let props = world
        .entities()
        .get(goblin)
        .expect("goblin is alive")
        .props();
    let position = props.get::<Vec2>(keys::POSITION)?;
    let frame = props.get_or::<u32>(keys::FRAME, 0);
    println!("goblin ended at {position:?}, animation frame {frame}");

    // The recording render target kept every draw command from the last
    // frame batch; show how many entities made it to "screen".
    if let Some(system) = world.system_mut("Render") {
        println!("render roster holds {} entities", system.registered().len());
    }
    let _ = wall;

    Ok(())
}

#[macro_use]
extern crate tracing;

use pseudo3d::{
    logging::init_logging,
    prelude::*,
    settings::SETTINGS_FILE_NAME,
};
use std::env::args;
use anyhow::*;


const CLI_INTRO: &'static str = r#"Pseudo3D physics sandbox.

Runs a small scripted scene headlessly and logs what the bodies do."#;

const CLI_HELP: &'static str = r#"
Examples:

    [this command]
    Run the sandbox for the default number of ticks.

    [this command] --ticks=600 --settings=physics.json
    Run for 600 ticks, with the player built from the given physics settings.

    [this command] --write-settings
    Write the default physics settings to physics.json and exit.

Env var examples:
    RUST_LOG=pseudo3d=trace
    Changes logging levels"#;

/// Ticks between state dumps.
const LOG_INTERVAL: u64 = 20;

/// Walking speed, per tick.
const WALK: f32 = 0.1;


fn main() -> Result<()> {
    println!("{}", CLI_INTRO);
    let args = args().collect::<Vec<_>>();
    if args.iter().any(|arg| arg == "--help") {
        println!("{}", CLI_HELP);
        return Ok(());
    }
    init_logging()?;

    if args.iter().any(|arg| arg == "--write-settings") {
        PhysicsSettings::default().write(SETTINGS_FILE_NAME)?;
        info!("wrote default settings to {}", SETTINGS_FILE_NAME);
        return Ok(());
    }

    let ticks = match args.iter().find_map(|arg| arg.strip_prefix("--ticks=")) {
        Some(s) => s.parse::<u64>().with_context(|| format!("invalid tick count {:?}", s))?,
        None => 240,
    };
    let settings = match args.iter().find_map(|arg| arg.strip_prefix("--settings=")) {
        Some(path) => PhysicsSettings::try_read(path)?,
        None => PhysicsSettings::default(),
    };

    let (mut scene, player, dummy) = build_scene(&settings)?;
    info!(bodies = scene.len(), ticks, "running sandbox");
    for _ in 0..ticks {
        scene.tick();
        if scene.ticks() % LOG_INTERVAL == 0 {
            log_body(&scene, "player", player);
            log_body(&scene, "dummy", dummy);
        }
    }
    info!(ticks = scene.ticks(), "sandbox finished");
    Ok(())
}

// build the scene: a pushable player, a dummy copied from it, and a floor of static blocks
fn build_scene(settings: &PhysicsSettings) -> Result<(Scene, BodyKey, BodyKey)> {
    let mut scene = Scene::new();

    let mut player = RigidBody::from_settings(settings)?;
    player.set_dimensions(0.8, 2.0, 0.8)?;
    player.set_pushable(true);
    let mut dummy = player.clone();
    dummy.set_position([2.5, 0.0, -1.5]);

    let player = scene.add(player);
    let dummy = scene.add(dummy);

    for j in -8..=8 {
        for i in -3..=0 {
            let mut block = RigidBody::new();
            block.set_kinematic(false);
            block.set_position([j as f32, -4.75, i as f32]);
            scene.add(block);
        }
    }
    debug!(bodies = scene.len(), "built sandbox scene");

    scene.add_injection(move |scene| script(scene, player));
    Ok((scene, player, dummy))
}

// stand in for keyboard input: walk right, jump, then walk back left into the dummy
fn script(scene: &mut Scene, player: BodyKey) {
    let t = scene.ticks();
    let body = &mut scene[player];
    let vel = body.velocity();
    let vel = match t {
        0..=59 => vel,
        60..=99 => vel.with_x(WALK).with_z(-WALK * 0.15),
        100 => vel.with_y(0.75),
        101..=129 => vel.with_x(0.0).with_z(0.0),
        130..=199 => vel.with_x(-WALK).with_z(0.0),
        _ => vel.with_x(0.0),
    };
    body.set_velocity(vel);
}

fn log_body(scene: &Scene, name: &str, key: BodyKey) {
    let body = &scene[key];
    info!(
        tick = scene.ticks(),
        pos = ?body.position(),
        vel = ?body.velocity(),
        grounded = body.collides_on(Side::Bottom),
        "{}", name
    );
}

//! A field of batched 2D squares plus a player square driven by the arrow
//! keys. Every square shares one geometry and one program, so the whole
//! field renders from a single vertex buffer with per-entity color and
//! transform uniforms.

use aura::*;

fn main() {
    env_logger::init();

    let config = GameConfig::new()
        .title("Aura — batched squares")
        .size(960, 540)
        .clear_color(Color::rgb(0.08, 0.08, 0.1));

    Game::run(config, |boot| {
        boot.register_geometry(shapes::square());
        boot.register_geometry(shapes::triangle());
        boot.register_program(programs::basic())
            .expect("built-in program compiles");
        boot.register_program(programs::vertex_color())
            .expect("built-in program compiles");

        // A 6x4 grid of slowly spinning squares.
        for row in 0..4 {
            for col in 0..6 {
                let hue = (row * 6 + col) as f32 / 24.0;
                let speed = 0.5 + hue * 1.5;
                boot.world.add_entity(
                    Entity::new("tile")
                        .with_transform(
                            Transform::from_2d(
                                Vec2::new(120.0 + col as f32 * 140.0, 90.0 + row as f32 * 120.0),
                                0.0,
                            )
                            .uniform_scale(48.0),
                        )
                        .with_model(Model::new("square"))
                        .with_shader(ShaderRef::new("basic"))
                        .with_flat_color(FlatColor(Color::rgb(hue, 0.4, 1.0 - hue)))
                        .with_update(move |c, dt| {
                            if let Some(t) = c.transform.as_mut() {
                                t.rotate_z(speed * dt);
                            }
                        }),
                );
            }
        }

        // One gradient triangle to show per-vertex color batching.
        boot.world.add_entity(
            Entity::new("gradient")
                .with_transform(Transform::from_2d(Vec2::new(480.0, 270.0), 0.0).uniform_scale(160.0))
                .with_model(Model::new("triangle"))
                .with_shader(ShaderRef::new("vertex_color"))
                .with_multi_color(MultiColor(vec![Color::RED, Color::GREEN, Color::BLUE])),
        );

        let player = boot.world.add_entity(
            Entity::new("player")
                .with_transform(Transform::from_2d(Vec2::new(480.0, 40.0), 0.0).uniform_scale(32.0))
                .with_model(Model::new("square"))
                .with_shader(ShaderRef::new("basic"))
                .with_flat_color(FlatColor(Color::WHITE)),
        );

        boot.register_state(
            "main",
            GameState::new(move |tick| {
                let dx = tick.input.axis(KeyCode::ArrowLeft, KeyCode::ArrowRight);
                let dy = tick.input.axis(KeyCode::ArrowDown, KeyCode::ArrowUp);
                if let Some(entity) = tick.world.entity_mut(player) {
                    if let Some(t) = entity.components.transform.as_mut() {
                        t.translate(Vec3::new(dx, dy, 0.0) * 240.0 * tick.dt);
                    }
                }
            }),
        );
        boot.start_in("main");
    });
}

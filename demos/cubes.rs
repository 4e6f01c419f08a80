//! Spinning 3D cubes with a WASD fly camera, rendered in depth-tested mode.

use aura::*;

fn main() {
    env_logger::init();

    let config = GameConfig::new()
        .title("Aura — cubes")
        .size(960, 540)
        .mode(RenderMode::ThreeD)
        .clear_color(Color::rgb(0.05, 0.05, 0.08));

    Game::run(config, |boot| {
        boot.register_geometry(shapes::cube());
        boot.register_geometry(shapes::cube_wireframe());
        boot.register_program(programs::basic_3d())
            .expect("built-in program compiles");

        boot.world.add_camera(
            "fly",
            Camera::perspective(std::f32::consts::FRAC_PI_3, 960.0 / 540.0, 0.1, 200.0)
                .with_position(Vec3::new(0.0, 2.0, 10.0)),
        );
        boot.world.set_active_camera("fly");

        for i in 0..5 {
            let offset = i as f32 - 2.0;
            boot.world.add_entity(
                Entity::new("cube")
                    .with_transform(
                        Transform::from_position(Vec3::new(offset * 3.0, 0.0, 0.0))
                            .uniform_scale(1.5),
                    )
                    .with_model(Model::new("cube"))
                    .with_shader(ShaderRef::new("basic_3d"))
                    .with_flat_color(FlatColor(Color::rgb(
                        0.3 + i as f32 * 0.15,
                        0.8 - i as f32 * 0.12,
                        0.9,
                    )))
                    .with_update(move |c, dt| {
                        if let Some(t) = c.transform.as_mut() {
                            t.rotate(Quat::from_euler(
                                EulerRot::XYZ,
                                dt * (0.4 + offset * 0.1),
                                dt * 0.7,
                                0.0,
                            ));
                        }
                    }),
            );
        }

        // A wireframe boundary box drifting through the field.
        boot.world.add_entity(
            Entity::new("bounds")
                .with_transform(
                    Transform::from_position(Vec3::new(0.0, 0.0, -6.0))
                        .uniform_scale(10.0)
                        .velocity(Vec3::new(0.0, 0.0, 0.4)),
                )
                .with_model(Model::new("cube_wireframe"))
                .with_shader(ShaderRef::new("basic_3d"))
                .with_flat_color(FlatColor(Color::rgba(1.0, 1.0, 1.0, 0.3))),
        );

        boot.register_state(
            "fly",
            GameState::new(|tick| {
                let forward = tick.input.axis(KeyCode::KeyS, KeyCode::KeyW);
                let right = tick.input.axis(KeyCode::KeyA, KeyCode::KeyD);
                let camera = tick.world.active_camera_mut();
                camera.move_forward(forward * 8.0 * tick.dt);
                camera.move_right(right * 8.0 * tick.dt);
            }),
        );
        boot.start_in("fly");
    });
}

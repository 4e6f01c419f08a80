//! The frame loop and game state machine.
//!
//! [`Game::run`] opens a window, brings up the GPU, hands a [`Bootstrap`]
//! context to the application's setup closure (this is where every geometry,
//! shader program, atlas, state, and initial entity gets registered), and
//! then drives the fixed per-frame order:
//!
//! 1. input snapshot (accumulated from window events),
//! 2. apply any queued state switch, then the active state's tick,
//! 3. system passes (velocity integration),
//! 4. world reconciliation (pending entity adds/removes + update hooks),
//! 5. render: batch the live set and replay it on the GPU.
//!
//! State switches requested mid-frame — from a tick or from outside — are
//! queued and applied at the start of the *next* frame, never mid-frame.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::color::Color;
use crate::geometry::{Geometry, GeometryRegistry};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::render::{Batcher, RenderError, RenderMode, Renderer, TextureAtlas, WgpuDevice};
use crate::shader::{ShaderProgramSpec, ShaderRegistry};
use crate::systems;
use crate::world::World;

/// Window and engine configuration consumed by [`Game::run`].
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    pub mode: RenderMode,
    world_bounds: Option<Vec2>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Aura".to_owned(),
            width: 960,
            height: 540,
            clear_color: Color::BLACK,
            mode: RenderMode::TwoD,
            world_bounds: None,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// World-space bounds; defaults to the window size in pixels.
    pub fn world_bounds(mut self, bounds: Vec2) -> Self {
        self.world_bounds = Some(bounds);
        self
    }

    fn resolved_bounds(&self) -> Vec2 {
        self.world_bounds
            .unwrap_or_else(|| Vec2::new(self.width as f32, self.height as f32))
    }
}

/// Everything a state's tick closure can reach.
pub struct Tick<'a> {
    pub world: &'a mut World,
    pub input: &'a Input,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the game started.
    pub time: f32,
    switch: Option<String>,
}

impl Tick<'_> {
    /// Requests a state switch, applied at the start of the next frame.
    pub fn switch_state(&mut self, name: impl Into<String>) {
        self.switch = Some(name.into());
    }
}

type TickFn = Box<dyn FnMut(&mut Tick)>;
type HookFn = Box<dyn FnMut(&mut World)>;

/// One game state: a per-frame tick plus optional enter/exit hooks.
///
/// Hooks get the world so they can populate or clean up entities — leaving
/// the old state's entities behind is a choice, not a default;
/// `world.clear_entities()` in `on_exit` is the usual cleanup.
pub struct GameState {
    tick: TickFn,
    on_enter: Option<HookFn>,
    on_exit: Option<HookFn>,
}

impl GameState {
    pub fn new(tick: impl FnMut(&mut Tick) + 'static) -> Self {
        Self {
            tick: Box::new(tick),
            on_enter: None,
            on_exit: None,
        }
    }

    pub fn on_enter(mut self, hook: impl FnMut(&mut World) + 'static) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    pub fn on_exit(mut self, hook: impl FnMut(&mut World) + 'static) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }
}

/// Named states with one active at a time and queued switches.
#[derive(Default)]
pub struct StateMachine {
    states: HashMap<String, GameState>,
    active: Option<String>,
    pending: Option<String>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, state: GameState) {
        self.states.insert(name.into(), state);
    }

    /// Queues a switch; the target becomes active at the next frame start.
    /// Also how the initial state is selected during bootstrap.
    pub fn switch_to(&mut self, name: impl Into<String>) {
        self.pending = Some(name.into());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Applies a queued switch: old state's exit hook, then the new state's
    /// enter hook. Switching to an unregistered state is fatal.
    pub(crate) fn apply_pending(&mut self, world: &mut World) {
        let Some(target) = self.pending.take() else {
            return;
        };
        assert!(
            self.states.contains_key(&target),
            "state '{target}' is not registered"
        );
        if let Some(active) = &self.active {
            if let Some(hook) = self.states.get_mut(active).and_then(|s| s.on_exit.as_mut()) {
                hook(world);
            }
        }
        log::debug!("state switch: {:?} -> '{target}'", self.active);
        self.active = Some(target.clone());
        if let Some(hook) = self.states.get_mut(&target).and_then(|s| s.on_enter.as_mut()) {
            hook(world);
        }
    }

    /// Runs the active state's tick; a switch it requests is queued for the
    /// next frame.
    pub(crate) fn tick(&mut self, world: &mut World, input: &Input, dt: f32, time: f32) {
        let Some(active) = self.active.clone() else {
            return;
        };
        let Some(state) = self.states.get_mut(&active) else {
            return;
        };
        let mut tick = Tick {
            world,
            input,
            dt,
            time,
            switch: None,
        };
        (state.tick)(&mut tick);
        if let Some(target) = tick.switch {
            self.pending = Some(target);
        }
    }
}

/// Registration surface handed to the setup closure, once, after the GPU
/// exists and before the first frame.
///
/// The bootstrap contract: every shader program and geometry an entity will
/// reference must be registered here — an entity reaching the renderer with
/// an unregistered name is a fatal configuration error at first render.
pub struct Bootstrap<'a> {
    pub world: &'a mut World,
    pub states: &'a mut StateMachine,
    pub geometries: &'a mut GeometryRegistry,
    pub shaders: &'a mut ShaderRegistry,
    renderer: &'a mut Renderer<WgpuDevice>,
}

impl Bootstrap<'_> {
    pub fn register_geometry(&mut self, geometry: Geometry) {
        self.geometries.register(geometry);
    }

    /// Registers and compiles a shader program; compile failure is fatal
    /// here, with the backend diagnostic attached.
    pub fn register_program(&mut self, spec: ShaderProgramSpec) -> Result<(), RenderError> {
        self.renderer.register_program(&spec)?;
        self.shaders.register(spec);
        Ok(())
    }

    /// Registers a texture atlas; usable immediately via its placeholder.
    pub fn create_atlas(&mut self, atlas: TextureAtlas) -> Result<(), RenderError> {
        self.renderer.create_atlas(atlas)
    }

    pub fn register_state(&mut self, name: impl Into<String>, state: GameState) {
        self.states.register(name, state);
    }

    /// Selects the state the game starts in.
    pub fn start_in(&mut self, name: impl Into<String>) {
        self.states.switch_to(name);
    }
}

type SetupFn = Box<dyn FnOnce(&mut Bootstrap)>;

struct Running {
    window: Arc<Window>,
    renderer: Renderer<WgpuDevice>,
    batcher: Batcher,
    world: World,
    states: StateMachine,
    geometries: GeometryRegistry,
    shaders: ShaderRegistry,
    input: Input,
    clear_color: Color,
    start_time: Instant,
    last_frame: Instant,
}

enum App {
    Pending {
        config: GameConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
}

/// Entry point: owns the window, the event loop, and the per-frame order.
pub struct Game;

impl Game {
    /// Runs the game until the window closes.
    ///
    /// `setup` is called once, after the GPU is up, to register resources
    /// and states and to spawn the initial entities.
    ///
    /// # Panics
    ///
    /// Panics on window/GPU bring-up failure and on any fatal render error —
    /// both indicate misconfiguration that the next frame could not recover
    /// from.
    pub fn run(config: GameConfig, setup: impl FnOnce(&mut Bootstrap) + 'static) {
        let event_loop = EventLoop::new().expect("failed to create event loop");
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::Pending {
            config,
            setup: Some(Box::new(setup)),
        };
        event_loop.run_app(&mut app).expect("event loop failed");
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let App::Pending { config, setup } = self else {
            return;
        };

        let attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("failed to create window"),
        );

        let gpu = GpuContext::new(window.clone());
        let mut renderer = Renderer::new(WgpuDevice::new(gpu));
        renderer.set_mode(config.mode);
        let clear_color = config.clear_color;

        let mut world = World::new(config.resolved_bounds());
        let mut states = StateMachine::new();
        let mut geometries = GeometryRegistry::new();
        let mut shaders = ShaderRegistry::new();

        let setup_fn = setup.take().expect("setup runs once");
        setup_fn(&mut Bootstrap {
            world: &mut world,
            states: &mut states,
            geometries: &mut geometries,
            shaders: &mut shaders,
            renderer: &mut renderer,
        });

        *self = App::Running(Box::new(Running {
            window,
            renderer,
            batcher: Batcher::new(),
            world,
            states,
            geometries,
            shaders,
            input: Input::new(),
            clear_color,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        }));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(run) = self else {
            return;
        };

        run.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                run.renderer.resize(size.width, size.height);
                if size.height > 0 {
                    run.world
                        .active_camera_mut()
                        .set_aspect(size.width as f32 / size.height as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let time = run.start_time.elapsed().as_secs_f32();
                let dt = now.duration_since(run.last_frame).as_secs_f32();
                run.last_frame = now;

                run.states.apply_pending(&mut run.world);
                run.states.tick(&mut run.world, &run.input, dt, time);
                systems::integrate_velocities(&mut run.world, dt);
                run.world.update(dt);

                run.renderer.poll_texture_loads();
                run.renderer.begin_frame(run.clear_color);
                if let Err(error) = run.batcher.render_frame(
                    &run.world,
                    &run.geometries,
                    &run.shaders,
                    &mut run.renderer,
                ) {
                    panic!("render failed: {error}");
                }
                run.renderer.end_frame();

                run.input.end_frame();
                run.window.request_redraw();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    fn world() -> World {
        World::new(Vec2::new(10.0, 10.0))
    }

    #[test]
    fn switches_apply_at_frame_start_not_mid_tick() {
        let mut machine = StateMachine::new();
        machine.register(
            "menu",
            GameState::new(|tick| tick.switch_state("play")),
        );
        machine.register("play", GameState::new(|_| {}));
        machine.switch_to("menu");

        let mut world = world();
        let input = Input::new();

        machine.apply_pending(&mut world);
        assert_eq!(machine.active(), Some("menu"));

        // The tick requests "play", but the active state does not change
        // until the next frame's apply.
        machine.tick(&mut world, &input, 0.016, 0.0);
        assert_eq!(machine.active(), Some("menu"));

        machine.apply_pending(&mut world);
        assert_eq!(machine.active(), Some("play"));
    }

    #[test]
    fn enter_and_exit_hooks_see_the_world() {
        let mut machine = StateMachine::new();
        machine.register(
            "populated",
            GameState::new(|_| {})
                .on_enter(|world| {
                    world.add_entity(Entity::new("spawned"));
                })
                .on_exit(|world| world.clear_entities()),
        );
        machine.register("empty", GameState::new(|_| {}));

        let mut world = world();
        machine.switch_to("populated");
        machine.apply_pending(&mut world);
        world.update(0.016);
        assert_eq!(world.filter_by_tag("spawned").len(), 1);

        machine.switch_to("empty");
        machine.apply_pending(&mut world);
        world.update(0.016);
        assert!(world.entities().is_empty());
    }

    #[test]
    #[should_panic(expected = "state 'nowhere' is not registered")]
    fn switching_to_unknown_state_is_fatal() {
        let mut machine = StateMachine::new();
        machine.switch_to("nowhere");
        machine.apply_pending(&mut world());
    }
}

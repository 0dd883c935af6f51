use bevy::{
    ecs::system::SystemState,
    input::common_conditions::input_just_pressed,
    math::{uvec2, vec2},
    prelude::*,
    utils::HashMap,
};

use crate::{
    board::{Board, Seed, StepOutcome},
    config::LifeConfig,
    frame::{Frame, Palette, Rgb48},
    prelude::*,
    state::GameState,
};

/// Drives the simulation on a fixed timestep and mirrors the LED frame buffer on screen.
pub struct LifePlugin {
    pub config: LifeConfig,
    pub seed: Seed,
}

impl Plugin for LifePlugin {
    fn build(&self, app: &mut App) {
        let board = Board::new(&self.config, self.seed.clone());
        let frame = Frame::new(board.width(), board.height(), self.config.color_depth);
        info!(
            "{}x{} matrix, {}-bit color, seeded with {} live cells",
            board.width(),
            board.height(),
            frame.depth().bits(),
            board.population()
        );

        app.insert_resource(MatrixLayout::new(board.size()))
            .insert_resource(board)
            .insert_resource(frame)
            .insert_resource(self.config.clone())
            .init_resource::<LedPalette>()
            .init_resource::<Stuck>()
            .add_systems(
                OnEnter(GameState::Load),
                (load_meshes_and_materials, spawn_matrix).chain(),
            );

        // a zero delay runs one generation per rendered frame
        match self.config.fixed_timestep() {
            Some(timestep) => {
                app.insert_resource(Time::<Fixed>::from_duration(timestep))
                    .add_systems(
                        FixedUpdate,
                        evolve_board.run_if(in_state(GameState::Running)),
                    );
            }
            None => {
                app.add_systems(
                    Update,
                    evolve_board
                        .run_if(in_state(GameState::Running))
                        .before(render_frame),
                );
            }
        }

        app.add_systems(
            Update,
            (
                (
                    render_frame.run_if(resource_changed::<Board>),
                    paint_leds.run_if(resource_changed::<Frame>),
                )
                    .chain()
                    .run_if(not(in_state(GameState::Load))),
                reseed_board.run_if(
                    input_just_pressed(KeyCode::KeyR).and(not(in_state(GameState::Load))),
                ),
                evolve_board.run_if(
                    input_just_pressed(KeyCode::KeyN).and(in_state(GameState::Paused)),
                ),
                toggle_paused_and_running.run_if(
                    input_just_pressed(KeyCode::Enter)
                        .and(in_state(GameState::Running).or(in_state(GameState::Paused))),
                ),
            ),
        );
    }
}

// ——> SYSTEMS

/// initialize meshes and materials in a resource
fn load_meshes_and_materials(
    world: &mut World,
    params: &mut SystemState<(
        ResMut<Assets<Mesh>>,
        ResMut<Assets<ColorMaterial>>,
        Res<MatrixLayout>,
    )>,
) {
    let (mut meshes, mut materials, layout) = params.get_mut(world);
    let led = meshes.add(Circle::new(layout.led_size.min_element() * 0.5));
    let border_vert = meshes.add(Rectangle::new(
        BORDER_WIDTH_PX,
        layout.pixel_size().y + 2.0 * BORDER_WIDTH_PX,
    ));
    let border_horiz = meshes.add(Rectangle::new(
        layout.pixel_size().x + 2.0 * BORDER_WIDTH_PX,
        BORDER_WIDTH_PX,
    ));
    let border_mat = materials.add(ColorMaterial::from_color(BORDER_COLOR));

    world.insert_resource(MeshAndMats {
        led,
        border_vert,
        border_horiz,
        border_mat,
        pixel_mats: HashMap::default(),
    });
}

/// spawn one mesh per LED plus the frame around them
fn spawn_matrix(
    mut commands: Commands,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut meshes_and_mats: ResMut<MeshAndMats>,
    layout: Res<MatrixLayout>,
    frame: Res<Frame>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let size = layout.size;
    let leds = (0..size.y)
        .flat_map(|y| (0..size.x).map(move |x| uvec2(x, y)))
        .map(|pos| {
            let material = meshes_and_mats.pixel_material(frame.get(pos), &mut materials);
            (
                Led(pos),
                Mesh2d(meshes_and_mats.led.clone()),
                MeshMaterial2d(material),
                Transform::from_translation(layout.led_translation(pos))
                    .with_scale(layout.led_scale.extend(1.0)),
            )
        })
        .collect::<Vec<_>>();
    commands.spawn_batch(leds);

    let half = layout.pixel_size() * 0.5 + Vec2::splat(BORDER_WIDTH_PX * 0.5);
    let borders = [
        (&meshes_and_mats.border_vert, vec2(-half.x, 0.0)),
        (&meshes_and_mats.border_vert, vec2(half.x, 0.0)),
        (&meshes_and_mats.border_horiz, vec2(0.0, half.y)),
        (&meshes_and_mats.border_horiz, vec2(0.0, -half.y)),
    ]
    .map(|(mesh, offset)| {
        (
            Border,
            Mesh2d(mesh.clone()),
            MeshMaterial2d(meshes_and_mats.border_mat.clone()),
            Transform::from_translation((layout.center + offset).extend(0.0)),
        )
    });
    commands.spawn_batch(borders);

    next_state.set(GameState::Running);
}

/// advance one generation, logging cycles and resets
fn evolve_board(mut board: ResMut<Board>, mut stuck: ResMut<Stuck>) {
    let outcome = board.step();
    if stuck.observe(outcome) {
        match outcome {
            StepOutcome::Cycle { period } => info!(
                "board is cycling with period {period} at generation {}",
                board.generation()
            ),
            StepOutcome::Reset { period } => info!(
                "period {period} cycle detected, reseeded with {} live cells",
                board.population()
            ),
            StepOutcome::Evolved => {}
        }
    }
    debug!(
        "generation {}, population {}\n{}",
        board.generation(),
        board.population(),
        *board
    );
}

fn reseed_board(mut board: ResMut<Board>, mut stuck: ResMut<Stuck>) {
    board.seed();
    **stuck = false;
    info!("reseeded with {} live cells", board.population());
}

fn toggle_paused_and_running(
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    match state.get() {
        GameState::Paused => next_state.set(GameState::Running),
        GameState::Running => next_state.set(GameState::Paused),
        GameState::Load => unreachable!(),
    }
}

fn render_frame(board: Res<Board>, palette: Res<LedPalette>, mut frame: ResMut<Frame>) {
    frame.render(&board, &palette);
}

fn paint_leds(
    mut led_query: Query<(&Led, &mut MeshMaterial2d<ColorMaterial>)>,
    frame: Res<Frame>,
    mut meshes_and_mats: ResMut<MeshAndMats>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (led, mut material) in led_query.iter_mut() {
        let handle = meshes_and_mats.pixel_material(frame.get(**led), &mut materials);
        if material.0 != handle {
            material.0 = handle;
        }
    }
}

// ——> COMPONENTS

/// One LED of the matrix, at its pixel position.
#[derive(Component, Debug, Deref)]
#[require(Mesh2d)]
struct Led(UVec2);

#[derive(Component)]
#[require(Mesh2d)]
struct Border;

// ——> RESOURCES

/// hold handles for meshes and materials
#[derive(Resource)]
struct MeshAndMats {
    led: Handle<Mesh>,
    border_vert: Handle<Mesh>,
    border_horiz: Handle<Mesh>,
    border_mat: Handle<ColorMaterial>,
    /// one material per distinct pixel colour, created on first use
    pixel_mats: HashMap<Rgb48, Handle<ColorMaterial>>,
}

impl MeshAndMats {
    fn pixel_material(
        &mut self,
        color: Rgb48,
        materials: &mut Assets<ColorMaterial>,
    ) -> Handle<ColorMaterial> {
        self.pixel_mats
            .entry(color)
            .or_insert_with(|| materials.add(ColorMaterial::from_color(Color::from(color))))
            .clone()
    }
}

#[derive(Resource, Debug, Default, Deref)]
struct LedPalette(Palette);

/// set while the board repeats itself without being reset
#[derive(Resource, Debug, Default, Deref, DerefMut)]
struct Stuck(bool);

impl Stuck {
    /// Feeds one step outcome through the latch. Returns whether it is worth
    /// logging: the first generation of a cycle and every reset are, the rest
    /// of a cycle is not.
    fn observe(&mut self, outcome: StepOutcome) -> bool {
        match outcome {
            StepOutcome::Evolved => {
                self.0 = false;
                false
            }
            StepOutcome::Cycle { .. } => !std::mem::replace(&mut self.0, true),
            StepOutcome::Reset { .. } => {
                self.0 = false;
                true
            }
        }
    }
}

/// Where the LEDs sit in the preview window.
#[derive(Resource, Debug, Clone, Copy)]
struct MatrixLayout {
    /// the center of the matrix
    center: Vec2,
    /// LEDs on each axis
    size: UVec2,
    /// LED pitch in pixels
    led_size: Vec2,
    /// scale of each LED within its pitch (should be 0.0 - 1.0)
    led_scale: Vec2,
}

impl MatrixLayout {
    fn new(size: UVec2) -> Self {
        Self {
            center: MATRIX_POS,
            size,
            led_size: LED_SIZE_PX,
            led_scale: LED_SCALE,
        }
    }

    /// computes full size of the matrix in pixels
    #[inline]
    fn pixel_size(&self) -> Vec2 {
        self.size.as_vec2() * self.led_size
    }

    /// Row 0 is the top row of the panel.
    #[inline]
    fn led_translation(&self, pos: UVec2) -> Vec3 {
        let top_left = self.center + vec2(-0.5, 0.5) * self.pixel_size();
        let offset = (pos.as_vec2() + Vec2::splat(0.5)) * self.led_size;
        (top_left + vec2(offset.x, -offset.y)).extend(10.0)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use bevy::{ecs::system::RunSystemOnce, math::vec3};

    use super::*;
    use crate::cell::Status;

    fn plugin(gen_delay_ms: u64) -> LifePlugin {
        LifePlugin {
            config: LifeConfig {
                width: 8,
                height: 8,
                gen_delay_ms,
                clear_on_loop: false,
                seed: Some(1),
                ..LifeConfig::default()
            },
            seed: Seed::Random(0),
        }
    }

    #[test]
    fn gen_delay_sets_fixed_timestep() {
        let mut app = App::new();
        app.add_plugins(plugin(100));
        let fixed = app.world().resource::<Time<Fixed>>();
        assert_eq!(Duration::from_millis(100), fixed.timestep());
    }

    #[test]
    fn zero_gen_delay_builds_without_fixed_timestep() {
        let mut app = App::new();
        app.add_plugins(plugin(0));
        assert!(app.world().get_resource::<Time<Fixed>>().is_none());
        assert!(app.world().get_resource::<Board>().is_some());
    }

    #[test]
    fn cycle_is_reported_once() {
        let mut stuck = Stuck::default();
        assert!(!stuck.observe(StepOutcome::Evolved));
        assert!(stuck.observe(StepOutcome::Cycle { period: 2 }));
        assert!(!stuck.observe(StepOutcome::Cycle { period: 2 }));
        assert!(*stuck);

        assert!(!stuck.observe(StepOutcome::Evolved));
        assert!(!*stuck);
        assert!(stuck.observe(StepOutcome::Cycle { period: 1 }));

        assert!(stuck.observe(StepOutcome::Reset { period: 1 }));
        assert!(!*stuck);
        assert!(stuck.observe(StepOutcome::Reset { period: 1 }));
    }

    #[test]
    fn evolve_system_keeps_running_a_still_life() {
        let config = plugin(100).config;
        let mut board = Board::new(&config, Seed::Random(0));
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            board.set(uvec2(x, y), Status::Alive);
        }

        let mut world = World::new();
        world.insert_resource(board);
        world.init_resource::<Stuck>();

        world.run_system_once(evolve_board).unwrap();
        assert!(**world.resource::<Stuck>());
        world.run_system_once(evolve_board).unwrap();

        let board = world.resource::<Board>();
        assert_eq!(2, board.generation());
        assert_eq!(4, board.population());
        assert!(**world.resource::<Stuck>());
    }

    #[test]
    fn layout_works() {
        let layout = MatrixLayout {
            center: Vec2::ZERO,
            size: uvec2(8, 4),
            led_size: Vec2::splat(8.0),
            led_scale: Vec2::splat(0.9),
        };

        assert_eq!(vec2(64., 32.), layout.pixel_size());
        assert_eq!(vec3(-28.0, 12.0, 10.), layout.led_translation(uvec2(0, 0)));
        assert_eq!(vec3(28.0, -12.0, 10.), layout.led_translation(uvec2(7, 3)));
    }

    #[test]
    fn pixel_materials_are_shared() {
        let mut materials = Assets::<ColorMaterial>::default();
        let mut mats = MeshAndMats {
            led: Handle::default(),
            border_vert: Handle::default(),
            border_horiz: Handle::default(),
            border_mat: Handle::default(),
            pixel_mats: HashMap::default(),
        };
        let green = Rgb48::from_rgb24(0, 0xff, 0);
        let a = mats.pixel_material(green, &mut materials);
        let b = mats.pixel_material(green, &mut materials);
        let c = mats.pixel_material(Rgb48::BLACK, &mut materials);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(2, materials.len());
    }
}

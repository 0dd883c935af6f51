use bevy::prelude::*;

#[derive(States, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// spawning the LED meshes
    #[default]
    Load,
    Paused,
    Running,
}

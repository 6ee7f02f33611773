//! Core types and utilities shared by the fluid solver and the automaton

pub mod noise;
pub mod rng;
pub mod vec3;

pub use noise::NoiseGenerator;
pub use rng::{CellRng, RollStream};
pub use vec3::{Vec2, Vec3};

//! Grid-based first-person raycasting engine.
//!
//! A viewpoint with a facing vector and a perpendicular field-of-view plane
//! casts one ray per screen column into a 2D tile map. Each ray marches from
//! gridline to gridline until it strikes an occupied cell; the resulting
//! distance, material code, and surface orientation drive the rendered column
//! height and shading.
//!
//! The engine itself is [`viewpoint`], [`world`], and [`raycast`]. Window
//! creation, input, and pixel pushing live in the binary; [`renderer`] and
//! [`scaler`] only translate already-computed hit data into framebuffer
//! writes.

pub mod raycast;
pub mod renderer;
pub mod scaler;
pub mod viewpoint;
pub mod world;

//! Test doubles shared by unit and integration tests.

pub mod mock_mojang;

pub use mock_mojang::{png_texture, MockCall, MockMojangApi};

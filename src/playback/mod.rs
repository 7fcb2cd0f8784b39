/// Playback module
///
/// This module handles:
/// - The playback session state machine (controller.rs)
/// - The live resource seam and its events (resource.rs)
/// - Tap disambiguation on the video surface (gesture.rs)
/// - Keyboard shortcuts (keyboard.rs)
/// - Optional platform capabilities (platform.rs)

pub mod controller;
pub mod gesture;
pub mod keyboard;
pub mod platform;
pub mod resource;

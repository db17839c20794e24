//! User interface rendering and input handling.
//!
//! This module provides all crossterm-facing functionality:
//!
//! - **keymapper**: Keyboard input to raw input event mapping
//! - **screen**: Per-session scrollback buffers
//! - **renderer**: Tab bar, content, prompt line, and status bar painting

pub mod keymapper;
pub mod renderer;
pub mod screen;

pub use keymapper::KeyMapper;
pub use renderer::{prompt, Renderer, UiOverlay};
pub use screen::Screen;

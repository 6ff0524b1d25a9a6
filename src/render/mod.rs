pub mod renderer;

pub use renderer::{PoseView, Renderer};

mod component;
mod geometry;
mod layout;
mod path;
mod render;
mod scene;
mod state;
mod style;
mod traffic;
mod types;

pub use component::NetworkCanvas;
pub use layout::LayoutConfig;
pub use path::{PathOrder, PathTiming};
pub use traffic::TrafficTiming;

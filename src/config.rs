//! Viewer configuration. All values are compiled-in defaults.

use crate::components::network::{LayoutConfig, PathOrder, PathTiming, TrafficTiming};

/// Everything the viewer can be tuned with.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
	/// Location of the graph document, relative to the page.
	pub graph_url: String,
	/// Location of the best-path document, relative to the page.
	pub path_url: String,
	/// Force simulation settings.
	pub layout: LayoutConfig,
	/// Packet timings.
	pub animation: AnimationConfig,
	/// Ordering of the path edge set.
	pub path_order: PathOrder,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			graph_url: "../results/input_graph.json".into(),
			path_url: "../results/best_path.json".into(),
			layout: LayoutConfig::default(),
			animation: AnimationConfig::default(),
			path_order: PathOrder::default(),
		}
	}
}

/// Packet timings for both animators, in milliseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationConfig {
	/// Background traffic cycle.
	pub traffic: TrafficTiming,
	/// Best-path run.
	pub path: PathTiming,
}

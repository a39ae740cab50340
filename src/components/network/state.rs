use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::geometry::Point;
use super::layout::Layout;
use super::path::{PathAnimator, path_edge_set};
use super::scene::Scene;
use super::traffic::TrafficAnimator;
use super::types::Packet;
use crate::config::{AnimationConfig, ViewerConfig};
use crate::data::Network;

const DEFAULT_DT: f32 = 0.016;
const MAX_DT: f64 = 0.05;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<usize>,
	pub start: Point,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start: Point,
	pub transform_start: Point,
}

/// Everything one mounted canvas needs: layout, scene, both animators and
/// the view. Driven by [`NetworkViewState::tick`] once per frame.
pub struct NetworkViewState {
	pub layout: Layout,
	pub scene: Scene,
	pub traffic: Option<TrafficAnimator>,
	pub path: PathAnimator,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	animation: AnimationConfig,
	rng: SmallRng,
	clock: Option<f64>,
	/// Run requested before the first frame; started by the next tick.
	queued_run: bool,
}

impl NetworkViewState {
	pub fn new(network: &Network, config: &ViewerConfig, width: f64, height: f64, seed: u64) -> Self {
		let topology = &network.topology;
		let layout = Layout::new(topology, &config.layout, Point::new(width / 2.0, height / 2.0));
		let scene = Scene::build(topology, layout.positions());
		let path = PathAnimator::new(
			path_edge_set(topology, &network.best_path.path, config.path_order),
			scene.edges().len(),
			config.animation.path.clone(),
		);

		Self {
			layout,
			scene,
			traffic: None,
			path,
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation: config.animation.clone(),
			rng: SmallRng::seed_from_u64(seed),
			clock: None,
			queued_run: false,
		}
	}

	/// Advance everything to frame time `now` (milliseconds).
	pub fn tick(&mut self, now: f64) {
		let dt = self
			.clock
			.map_or(DEFAULT_DT, |last| ((now - last) / 1000.0).clamp(0.0, MAX_DT) as f32);
		self.clock = Some(now);

		let positions = self.layout.tick(dt);
		self.scene.sync(positions);

		match self.traffic.as_mut() {
			Some(traffic) => traffic.advance(now, &mut self.rng),
			None => {
				self.traffic = Some(TrafficAnimator::start(
					self.scene.handles(),
					self.animation.traffic.clone(),
					now,
					&mut self.rng,
				));
			}
		}

		if std::mem::take(&mut self.queued_run) {
			self.path.trigger(now);
		}
		self.path.advance(now);
	}

	/// Restart the best-path run from the current frame time. Before the
	/// first frame there is no time yet, so the run waits for it.
	pub fn run_path(&mut self) {
		match self.clock {
			Some(now) => self.path.trigger(now),
			None => self.queued_run = true,
		}
	}

	/// True while a run waits for the first frame.
	pub fn run_queued(&self) -> bool {
		self.queued_run
	}

	/// Time of the last frame, zero before the first one.
	pub fn now(&self) -> f64 {
		self.clock.unwrap_or(0.0)
	}

	pub fn background_packets(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
		let now = self.now();
		self.traffic
			.iter()
			.flat_map(|traffic| traffic.packets())
			.filter_map(move |packet| self.place(packet, packet.progress(now)?))
	}

	pub fn path_packets(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
		self.path
			.moving(self.now())
			.filter_map(|(packet, t)| self.place(packet, t))
	}

	fn place(&self, packet: &Packet, t: f64) -> Option<(Point, f64)> {
		let segment = self.scene.segment(packet.edge)?;
		Some((segment.point_at_fraction(t), packet.kind.radius()))
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		// hit radius is in graph space and scales with zoom like the nodes
		self.layout
			.node_at(self.screen_to_graph(sx, sy), super::style::HIT_RADIUS)
	}

	pub fn begin_drag(&mut self, slot: usize, sx: f64, sy: f64) {
		self.drag = DragState {
			active: true,
			node: Some(slot),
			start: Point::new(sx, sy),
			node_start: self.layout.positions().get(slot).copied().unwrap_or_default(),
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(slot) = self.drag.node.filter(|_| self.drag.active) else {
			return;
		};
		let p = Point::new(
			self.drag.node_start.x + (sx - self.drag.start.x) / self.transform.k,
			self.drag.node_start.y + (sy - self.drag.start.y) / self.transform.k,
		);
		self.layout.pin(slot, p);
		self.scene.sync(self.layout.positions());
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start: Point::new(sx, sy),
			transform_start: Point::new(self.transform.x, self.transform.y),
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start.x + (sx - self.pan.start.x);
			self.transform.y = self.pan.transform_start.y + (sy - self.pan.start.y);
		}
	}

	pub fn end_gestures(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
	}

	/// Zoom by `factor` around screen point `(sx, sy)`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.set_center(Point::new(width / 2.0, height / 2.0));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::types::EdgeHandle;
	use crate::data::loader::parse_network;

	const GRAPH: &str = r#"{
		"start_node": 1, "end_node": 4,
		"nodes": {
			"1": { "id": 1, "type": "PC" },
			"2": { "id": 2, "type": "GATEWAY" },
			"3": { "id": 3, "type": "COMPUTE" },
			"4": { "id": 4, "type": "SERVER" },
			"5": { "id": 5, "type": "STORAGE" }
		},
		"edges": [
			{ "node_a": 1, "node_b": 2 },
			{ "node_a": 3, "node_b": 2 },
			{ "node_a": 3, "node_b": 4 },
			{ "node_a": 5, "node_b": 2 }
		]
	}"#;

	fn state() -> NetworkViewState {
		let network = parse_network("g", GRAPH, "p", r#"{ "path": [1, 2, 3, 4] }"#).unwrap();
		NetworkViewState::new(&network, &ViewerConfig::default(), 800.0, 600.0, 42)
	}

	#[test]
	fn renders_one_visual_per_node_and_edge() {
		let s = state();
		assert_eq!(s.scene.nodes().len(), 5);
		assert_eq!(s.scene.edges().len(), 4);
		assert_eq!(s.path.path_edges().len(), 3);
	}

	#[test]
	fn first_tick_starts_traffic_on_every_edge() {
		let mut s = state();
		assert_eq!(s.background_packets().count(), 0);
		s.tick(1000.0);
		assert_eq!(s.traffic.as_ref().map(|t| t.packets().count()), Some(4));
		assert_eq!(s.background_packets().count(), 4);
		for (_, r) in s.background_packets() {
			assert_eq!(r, 2.0);
		}
	}

	#[test]
	fn packets_sit_on_their_edges() {
		let mut s = state();
		s.tick(0.0);
		for t in (16..2000).step_by(16) {
			s.tick(t as f64);
		}
		let traffic = s.traffic.as_ref().unwrap();
		for packet in traffic.packets() {
			let seg = s.scene.segment(packet.edge).unwrap();
			let t = packet.progress(s.now()).unwrap();
			let p = seg.point_at_fraction(t);
			let along = seg.start.distance(p) + p.distance(seg.end);
			assert!((along - seg.total_length()).abs() < 1e-6);
		}
	}

	#[test]
	fn retrigger_mid_run_restarts_cleanly() {
		let mut s = state();
		s.tick(0.0);
		s.run_path();
		s.tick(1200.0);
		assert!(s.path.is_active(EdgeHandle::new(0)));

		s.tick(1300.0);
		s.run_path();
		assert_eq!(s.path.in_flight().len(), 3);
		for handle in s.scene.handles() {
			assert!(!s.path.is_active(handle));
		}
		assert_eq!(s.path_packets().count(), 1);

		s.tick(1300.0 + 800.0 + 1000.0);
		for handle in s.path.path_edges() {
			assert!(s.path.is_active(*handle));
		}
		assert!(!s.path.is_active(EdgeHandle::new(3)));
		assert_eq!(s.path_packets().count(), 0);
	}

	#[test]
	fn run_before_first_frame_starts_at_that_frame() {
		let mut s = state();
		s.run_path();
		assert!(s.run_queued());
		assert!(s.path.in_flight().is_empty());

		s.tick(250_000.0);
		assert!(!s.run_queued());
		assert_eq!(s.path.runs(), 1);
		assert_eq!(s.path.in_flight().len(), 3);
		assert_eq!(s.path.in_flight()[0].spawned_at, 250_000.0);
		for handle in s.scene.handles() {
			assert!(!s.path.is_active(handle));
		}

		s.tick(250_000.0 + 1000.0);
		assert!(s.path.is_active(EdgeHandle::new(0)));
		assert!(!s.path.is_active(EdgeHandle::new(2)));
	}

	#[test]
	fn self_loop_edge_carries_traffic_in_place() {
		let graph = r#"{
			"nodes": [{ "id": 1, "type": "PC" }, { "id": 2, "type": "SERVER" }],
			"edges": [{ "node_a": 1, "node_b": 1 }, { "node_a": 1, "node_b": 2 }]
		}"#;
		let network = parse_network("g", graph, "p", r#"{ "path": [1, 1, 2] }"#).unwrap();
		let mut s = NetworkViewState::new(&network, &ViewerConfig::default(), 800.0, 600.0, 7);
		for t in 0..60 {
			s.tick(t as f64 * 16.0);
		}
		let looped = s.scene.segment(EdgeHandle::new(0)).unwrap();
		assert_eq!(looped.total_length(), 0.0);
		assert_eq!(looped.start, s.scene.nodes()[0].position);
		assert_eq!(s.background_packets().count(), 2);
		assert_eq!(s.path.path_edges().len(), 2);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut s = state();
		let before = s.screen_to_graph(300.0, 200.0);
		s.zoom_at(300.0, 200.0, 1.1);
		let after = s.screen_to_graph(300.0, 200.0);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
		s.zoom_at(0.0, 0.0, 1000.0);
		assert_eq!(s.transform.k, 10.0);
	}

	#[test]
	fn dragging_pins_the_node() {
		let mut s = state();
		s.tick(0.0);
		let p = s.layout.positions()[2];
		let slot = s.node_at_position(p.x, p.y).unwrap();
		s.begin_drag(slot, p.x, p.y);
		s.drag_to(p.x + 50.0, p.y - 20.0);
		s.end_gestures();
		let moved = s.scene.nodes()[slot].position;
		assert!((moved.x - (p.x + 50.0)).abs() < 1e-3);
		assert!((moved.y - (p.y - 20.0)).abs() < 1e-3);
	}
}

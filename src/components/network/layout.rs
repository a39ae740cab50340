use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::geometry::Point;
use crate::data::Topology;

/// Force simulation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub node_mass: f32,
	/// Radius of the ring nodes start on.
	pub initial_radius: f64,
	/// Share of the centroid offset removed each tick, 0 disables centring.
	pub centering: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 280.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
			initial_radius: 120.0,
			centering: 1.0,
		}
	}
}

/// Owns node positions. Everything else reads them through [`Layout::positions`].
pub struct Layout {
	graph: ForceGraph<usize, ()>,
	positions: Vec<Point>,
	center: Point,
	centering: f64,
}

impl Layout {
	pub fn new(topology: &Topology, config: &LayoutConfig, center: Point) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.force_charge,
			force_spring: config.force_spring,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping_factor,
		});

		let count = topology.nodes().len();
		let mut indices = Vec::with_capacity(count);
		let mut positions = Vec::with_capacity(count);
		for slot in 0..count {
			let angle = (slot as f64) * 2.0 * PI / count as f64;
			let p = Point::new(
				center.x + config.initial_radius * angle.cos(),
				center.y + config.initial_radius * angle.sin(),
			);
			indices.push(graph.add_node(NodeData {
				x: p.x as f32,
				y: p.y as f32,
				mass: config.node_mass,
				is_anchor: false,
				user_data: slot,
			}));
			positions.push(p);
		}

		// force_graph rejects self-loops; they carry no spring force anyway and
		// stay in the scene as zero-length edges.
		for edge in topology.edges().iter().filter(|edge| edge.a != edge.b) {
			if let (Some(&a), Some(&b)) = (indices.get(edge.a), indices.get(edge.b)) {
				graph.add_edge(a, b, EdgeData::default());
			}
		}

		Self {
			graph,
			positions,
			center,
			centering: config.centering,
		}
	}

	/// Advance the simulation by `dt` seconds and return the new snapshot.
	pub fn tick(&mut self, dt: f32) -> &[Point] {
		self.graph.update(dt);
		self.recenter();
		self.snapshot();
		&self.positions
	}

	/// Positions as of the last tick, indexed by node slot.
	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	pub fn set_center(&mut self, center: Point) {
		self.center = center;
	}

	/// Topmost node within `radius` of `p`.
	pub fn node_at(&self, p: Point, radius: f64) -> Option<usize> {
		self.positions
			.iter()
			.enumerate()
			.rev()
			.find(|(_, q)| q.distance(p) < radius)
			.map(|(slot, _)| slot)
	}

	/// Fix a node at `p`; the simulation stops moving it.
	pub fn pin(&mut self, slot: usize, p: Point) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data == slot {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = true;
			}
		});
		if let Some(pos) = self.positions.get_mut(slot) {
			*pos = p;
		}
	}

	/// Shift free nodes so the centroid moves toward the centre.
	fn recenter(&mut self) {
		if self.centering <= 0.0 || self.positions.is_empty() {
			return;
		}
		let (mut sx, mut sy, mut n) = (0.0_f64, 0.0_f64, 0usize);
		self.graph.visit_nodes(|node| {
			sx += node.x() as f64;
			sy += node.y() as f64;
			n += 1;
		});
		if n == 0 {
			return;
		}
		let (dx, dy) = (
			((self.center.x - sx / n as f64) * self.centering) as f32,
			((self.center.y - sy / n as f64) * self.centering) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += dx;
				node.data.y += dy;
			}
		});
	}

	fn snapshot(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			if let Some(pos) = positions.get_mut(node.data.user_data) {
				*pos = Point::new(node.x() as f64, node.y() as f64);
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::document::GraphDocument;

	fn ring(n: usize) -> Topology {
		let nodes: Vec<String> = (0..n)
			.map(|i| format!(r#"{{ "id": {i}, "type": "PC" }}"#))
			.collect();
		let edges: Vec<String> = (0..n)
			.map(|i| format!(r#"{{ "node_a": {i}, "node_b": {} }}"#, (i + 1) % n))
			.collect();
		let json = format!(
			r#"{{ "nodes": [{}], "edges": [{}] }}"#,
			nodes.join(","),
			edges.join(",")
		);
		Topology::from_document(GraphDocument::from_json(&json).unwrap()).unwrap()
	}

	#[test]
	fn starts_on_a_ring_around_the_center() {
		let center = Point::new(400.0, 300.0);
		let layout = Layout::new(&ring(6), &LayoutConfig::default(), center);
		assert_eq!(layout.positions().len(), 6);
		for p in layout.positions() {
			assert!((p.distance(center) - 120.0).abs() < 1e-6);
		}
	}

	#[test]
	fn tick_keeps_centroid_on_center() {
		let center = Point::new(400.0, 300.0);
		let mut layout = Layout::new(&ring(5), &LayoutConfig::default(), center);
		for _ in 0..30 {
			layout.tick(0.016);
		}
		let n = layout.positions().len() as f64;
		let cx = layout.positions().iter().map(|p| p.x).sum::<f64>() / n;
		let cy = layout.positions().iter().map(|p| p.y).sum::<f64>() / n;
		assert!((cx - center.x).abs() < 0.5, "cx = {cx}");
		assert!((cy - center.y).abs() < 0.5, "cy = {cy}");
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut layout = Layout::new(&ring(4), &LayoutConfig::default(), Point::new(0.0, 0.0));
		let target = Point::new(500.0, -200.0);
		layout.pin(2, target);
		for _ in 0..10 {
			layout.tick(0.016);
		}
		let p = layout.positions()[2];
		assert!((p.x - target.x).abs() < 1e-3 && (p.y - target.y).abs() < 1e-3);
	}

	#[test]
	fn self_loop_does_not_break_the_simulation() {
		let json = r#"{
			"nodes": [{ "id": 1, "type": "PC" }, { "id": 2, "type": "SERVER" }],
			"edges": [{ "node_a": 1, "node_b": 1 }, { "node_a": 1, "node_b": 2 }]
		}"#;
		let topology = Topology::from_document(GraphDocument::from_json(json).unwrap()).unwrap();
		let mut layout = Layout::new(&topology, &LayoutConfig::default(), Point::new(0.0, 0.0));
		for _ in 0..20 {
			layout.tick(0.016);
		}
		assert_eq!(layout.positions().len(), 2);
		assert!(layout.positions().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn hit_testing_finds_nearby_node() {
		let layout = Layout::new(&ring(4), &LayoutConfig::default(), Point::new(0.0, 0.0));
		let p = layout.positions()[1];
		assert_eq!(layout.node_at(Point::new(p.x + 3.0, p.y), 10.0), Some(1));
		assert_eq!(layout.node_at(Point::new(1000.0, 1000.0), 10.0), None);
	}
}

use super::geometry::{Point, Segment};
use super::style;
use super::types::EdgeHandle;
use crate::data::Topology;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeRole {
	#[default]
	Plain,
	Start,
	End,
}

/// Drawable node: disc, icon and label at the node's current position.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub slot: usize,
	pub label: String,
	/// Secondary line under the label.
	pub detail: Option<String>,
	pub fill: Option<&'static str>,
	pub icon: Option<&'static str>,
	pub role: NodeRole,
	pub position: Point,
}

/// Drawable line of one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	pub handle: EdgeHandle,
	pub a: usize,
	pub b: usize,
	pub caption: Option<String>,
	pub segment: Segment,
}

fn edge_caption(latency: Option<f64>, bandwidth: Option<f64>) -> Option<String> {
	match (latency, bandwidth) {
		(Some(ms), Some(bw)) => Some(format!("{ms:.0} ms / {bw:.0} Mb/s")),
		(Some(ms), None) => Some(format!("{ms:.0} ms")),
		(None, Some(bw)) => Some(format!("{bw:.0} Mb/s")),
		(None, None) => None,
	}
}

/// One visual per node and per edge, kept in step with the layout.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<NodeVisual>,
	edges: Vec<EdgeVisual>,
}

impl Scene {
	pub fn build(topology: &Topology, positions: &[Point]) -> Self {
		let nodes = topology
			.nodes()
			.iter()
			.enumerate()
			.map(|(slot, node)| NodeVisual {
				slot,
				label: node.label(),
				detail: node.performance.map(|perf| format!("perf {perf:.0}")),
				fill: style::fill_color(&node.kind),
				icon: style::icon_path(&node.kind),
				role: if topology.start_slot() == Some(slot) {
					NodeRole::Start
				} else if topology.end_slot() == Some(slot) {
					NodeRole::End
				} else {
					NodeRole::Plain
				},
				position: Point::default(),
			})
			.collect();

		let edges = topology
			.edges()
			.iter()
			.enumerate()
			.map(|(i, edge)| EdgeVisual {
				handle: EdgeHandle::new(i),
				a: edge.a,
				b: edge.b,
				caption: edge_caption(edge.latency, edge.bandwidth),
				segment: Segment::default(),
			})
			.collect();

		let mut scene = Self { nodes, edges };
		scene.sync(positions);
		scene
	}

	/// Per-tick update: move every node and both ends of every edge.
	pub fn sync(&mut self, positions: &[Point]) {
		for node in &mut self.nodes {
			if let Some(&p) = positions.get(node.slot) {
				node.position = p;
			}
		}
		for edge in &mut self.edges {
			if let (Some(&a), Some(&b)) = (positions.get(edge.a), positions.get(edge.b)) {
				edge.segment = Segment::new(a, b);
			}
		}
	}

	pub fn nodes(&self) -> &[NodeVisual] {
		&self.nodes
	}

	pub fn edges(&self) -> &[EdgeVisual] {
		&self.edges
	}

	pub fn handles(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
		self.edges.iter().map(|e| e.handle)
	}

	/// Current geometry of an edge.
	pub fn segment(&self, handle: EdgeHandle) -> Option<Segment> {
		self.edges.get(handle.index()).map(|e| e.segment)
	}
}

//! Best-path animation: matching path steps to edges and replaying the walk.

use log::debug;

use super::types::{EdgeHandle, Packet, PacketKind};
use crate::data::{NodeId, Topology, TopologyEdge};

/// How entries of the path edge set are ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathOrder {
	/// By path step, so packets follow the walk.
	#[default]
	Traversal,
	/// By position in the edge list, regardless of the walk.
	EdgeIteration,
}

/// Timing of a path run, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct PathTiming {
	/// Start offset between consecutive entries.
	pub stagger: f64,
	pub duration: f64,
}

impl Default for PathTiming {
	fn default() -> Self {
		Self {
			stagger: 400.0,
			duration: 1000.0,
		}
	}
}

/// Edges matching consecutive pairs of `path`, in either direction.
///
/// Every matching edge is included, so parallel edges all animate and a
/// revisited step contributes its edges again. Pairs with no edge, or with an
/// id missing from the topology, contribute nothing.
pub fn path_edge_set(topology: &Topology, path: &[NodeId], order: PathOrder) -> Vec<EdgeHandle> {
	let steps: Vec<Option<(usize, usize)>> = path
		.windows(2)
		.map(|pair| Some((topology.slot_of(&pair[0])?, topology.slot_of(&pair[1])?)))
		.collect();
	let edges = topology.edges();
	let set: Vec<EdgeHandle> = match order {
		PathOrder::Traversal => steps
			.iter()
			.flat_map(|step| {
				edges
					.iter()
					.enumerate()
					.filter(move |(_, edge)| joins_step(edge, step))
					.map(|(i, _)| EdgeHandle::new(i))
			})
			.collect(),
		PathOrder::EdgeIteration => edges
			.iter()
			.enumerate()
			.flat_map(|(i, edge)| {
				steps
					.iter()
					.filter(move |step| joins_step(edge, step))
					.map(move |_| EdgeHandle::new(i))
			})
			.collect(),
	};

	let unmatched = steps
		.iter()
		.filter(|step| !edges.iter().any(|edge| joins_step(edge, step)))
		.count();
	if unmatched > 0 {
		debug!("{unmatched} of {} path steps have no edge", steps.len());
	}
	set
}

fn joins_step(edge: &TopologyEdge, step: &Option<(usize, usize)>) -> bool {
	step.is_some_and(|(x, y)| edge.joins(x, y))
}

/// Staggered packets along the path edge set, with per-edge active flags.
pub struct PathAnimator {
	edges: Vec<EdgeHandle>,
	in_flight: Vec<Packet>,
	active: Vec<bool>,
	timing: PathTiming,
	runs: u64,
}

impl PathAnimator {
	/// `edge_count` is the number of edges in the scene; flags exist for all of them.
	pub fn new(edges: Vec<EdgeHandle>, edge_count: usize, timing: PathTiming) -> Self {
		Self {
			edges,
			in_flight: Vec::new(),
			active: vec![false; edge_count],
			timing,
			runs: 0,
		}
	}

	/// Drop any run in progress and schedule a fresh one starting at `now`.
	pub fn trigger(&mut self, now: f64) {
		self.in_flight.clear();
		self.active.fill(false);
		let PathTiming { stagger, duration } = self.timing;
		self.in_flight.extend(self.edges.iter().enumerate().map(|(i, &edge)| Packet {
			edge,
			kind: PacketKind::Path,
			spawned_at: now + i as f64 * stagger,
			duration,
		}));
		self.runs += 1;
		debug!("Path run {} scheduled over {} edges", self.runs, self.edges.len());
	}

	/// Retire packets that have arrived by `now`, activating their edges.
	/// Returns how many arrived.
	pub fn advance(&mut self, now: f64) -> usize {
		let active = &mut self.active;
		let before = self.in_flight.len();
		self.in_flight.retain(|packet| {
			if !packet.is_complete(now) {
				return true;
			}
			if let Some(flag) = active.get_mut(packet.edge.index()) {
				*flag = true;
			}
			false
		});
		before - self.in_flight.len()
	}

	/// Scheduled and moving packets.
	pub fn in_flight(&self) -> &[Packet] {
		&self.in_flight
	}

	/// Packets that have started moving by `now`, with their progress.
	pub fn moving(&self, now: f64) -> impl Iterator<Item = (&Packet, f64)> + '_ {
		self.in_flight
			.iter()
			.filter_map(move |p| p.progress(now).map(|t| (p, t)))
	}

	pub fn is_active(&self, edge: EdgeHandle) -> bool {
		self.active.get(edge.index()).copied().unwrap_or(false)
	}

	pub fn path_edges(&self) -> &[EdgeHandle] {
		&self.edges
	}

	pub fn runs(&self) -> u64 {
		self.runs
	}
}

//! Validated network topology built from a [`GraphDocument`].

use std::collections::HashMap;

use log::warn;

use super::document::{GraphDocument, NodeId, NodeKind};

/// Reasons a graph document cannot become a [`Topology`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
	/// Two node records share an id.
	#[error("duplicate node id {0}")]
	DuplicateNode(NodeId),

	/// An edge names a node that is not in the node table.
	#[error("edge {index} ({node_a} - {node_b}) references unknown node {missing}")]
	UnknownEndpoint {
		/// Position of the edge in the document.
		index: usize,
		/// First endpoint as written.
		node_a: NodeId,
		/// Second endpoint as written.
		node_b: NodeId,
		/// The endpoint that could not be resolved.
		missing: NodeId,
	},
}

/// A node of the topology.
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyNode {
	/// Identifier from the document.
	pub id: NodeId,
	/// Node type.
	pub kind: NodeKind,
	/// Optional performance score.
	pub performance: Option<f64>,
}

impl TopologyNode {
	/// Display label, `"{type}-{id}"`.
	pub fn label(&self) -> String {
		format!("{}-{}", self.kind, self.id)
	}
}

/// An undirected edge with both endpoints resolved to node slots.
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyEdge {
	/// Slot of the first endpoint.
	pub a: usize,
	/// Slot of the second endpoint.
	pub b: usize,
	/// Optional link latency.
	pub latency: Option<f64>,
	/// Optional link bandwidth.
	pub bandwidth: Option<f64>,
}

impl TopologyEdge {
	/// Whether this edge joins `x` and `y`, in either direction.
	pub fn joins(&self, x: usize, y: usize) -> bool {
		(self.a == x && self.b == y) || (self.a == y && self.b == x)
	}
}

/// Node table plus ordered edge list. Every edge endpoint is a valid slot.
#[derive(Clone, Debug, Default)]
pub struct Topology {
	nodes: Vec<TopologyNode>,
	edges: Vec<TopologyEdge>,
	slots: HashMap<NodeId, usize>,
	start: Option<usize>,
	end: Option<usize>,
}

impl Topology {
	/// Validate a document and resolve its edges.
	pub fn from_document(doc: GraphDocument) -> Result<Self, TopologyError> {
		let records = doc.nodes.into_records();
		let mut nodes = Vec::with_capacity(records.len());
		let mut slots = HashMap::with_capacity(records.len());

		for record in records {
			if slots.insert(record.id.clone(), nodes.len()).is_some() {
				return Err(TopologyError::DuplicateNode(record.id));
			}
			nodes.push(TopologyNode {
				id: record.id,
				kind: record.kind,
				performance: record.performance,
			});
		}

		let edges = doc
			.edges
			.into_iter()
			.enumerate()
			.map(|(index, edge)| {
				let resolve = |id: &NodeId| {
					slots
						.get(id)
						.copied()
						.ok_or_else(|| TopologyError::UnknownEndpoint {
							index,
							node_a: edge.node_a.clone(),
							node_b: edge.node_b.clone(),
							missing: id.clone(),
						})
				};
				Ok(TopologyEdge {
					a: resolve(&edge.node_a)?,
					b: resolve(&edge.node_b)?,
					latency: edge.latency,
					bandwidth: edge.bandwidth,
				})
			})
			.collect::<Result<Vec<_>, TopologyError>>()?;

		let lookup_marker = |marker: Option<NodeId>, what: &str| {
			let id = marker?;
			let slot = slots.get(&id).copied();
			if slot.is_none() {
				warn!("{what} node {id} is not in the node table");
			}
			slot
		};
		let start = lookup_marker(doc.start_node, "start");
		let end = lookup_marker(doc.end_node, "end");

		Ok(Self {
			nodes,
			edges,
			slots,
			start,
			end,
		})
	}

	/// All nodes, indexed by slot.
	pub fn nodes(&self) -> &[TopologyNode] {
		&self.nodes
	}

	/// All edges in document order.
	pub fn edges(&self) -> &[TopologyEdge] {
		&self.edges
	}

	/// Slot of a node id.
	pub fn slot_of(&self, id: &NodeId) -> Option<usize> {
		self.slots.get(id).copied()
	}

	/// Slot of the route's start node, when the document names one.
	pub fn start_slot(&self) -> Option<usize> {
		self.start
	}

	/// Slot of the route's end node, when the document names one.
	pub fn end_slot(&self) -> Option<usize> {
		self.end
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn topology(json: &str) -> Result<Topology, TopologyError> {
		Topology::from_document(GraphDocument::from_json(json).unwrap())
	}

	#[test]
	fn resolves_edges_to_slots() {
		let topo = topology(
			r#"{
				"start_node": 3, "end_node": 1,
				"nodes": [ { "id": 1, "type": "PC" }, { "id": 3, "type": "GATEWAY" } ],
				"edges": [ { "node_a": 3, "node_b": 1 } ]
			}"#,
		)
		.unwrap();
		assert_eq!(topo.nodes().len(), 2);
		assert_eq!(topo.edges()[0].a, 1);
		assert_eq!(topo.edges()[0].b, 0);
		assert!(topo.edges()[0].joins(0, 1));
		assert_eq!(topo.start_slot(), Some(1));
		assert_eq!(topo.end_slot(), Some(0));
		assert_eq!(topo.nodes()[1].label(), "GATEWAY-3");
	}

	#[test]
	fn missing_endpoint_is_fatal() {
		let err = topology(
			r#"{
				"nodes": [ { "id": 1, "type": "PC" } ],
				"edges": [ { "node_a": 1, "node_b": 7 } ]
			}"#,
		)
		.unwrap_err();
		assert!(matches!(
			err,
			TopologyError::UnknownEndpoint { index: 0, ref missing, .. } if missing.as_str() == "7"
		));
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let err = topology(
			r#"{
				"nodes": [ { "id": 1, "type": "PC" }, { "id": "1", "type": "SERVER" } ],
				"edges": []
			}"#,
		)
		.unwrap_err();
		assert_eq!(err, TopologyError::DuplicateNode(NodeId::new(1)));
	}

	#[test]
	fn unknown_markers_are_dropped() {
		let topo = topology(
			r#"{
				"start_node": 42,
				"nodes": [ { "id": 1, "type": "PC" } ],
				"edges": []
			}"#,
		)
		.unwrap();
		assert_eq!(topo.start_slot(), None);
	}
}

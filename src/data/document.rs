//! Wire formats of the two input documents.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Node identifier, normalised to text so `1` and `"1"` name the same node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawId")]
pub struct NodeId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Int(i64),
	Text(String),
}

impl From<RawId> for NodeId {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Int(n) => Self(n.to_string()),
			RawId::Text(s) => Self(s),
		}
	}
}

impl NodeId {
	/// Build an id from anything printable.
	pub fn new(id: impl fmt::Display) -> Self {
		Self(id.to_string())
	}

	/// The id text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Role of a node in the network. Unrecognised type names are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum NodeKind {
	/// End-user machine.
	Pc,
	/// Network gateway.
	Gateway,
	/// Compute node.
	Compute,
	/// Storage node.
	Storage,
	/// Server.
	Server,
	/// Any type name outside the known set.
	Other(String),
}

impl From<String> for NodeKind {
	fn from(name: String) -> Self {
		match name.as_str() {
			"PC" => Self::Pc,
			"GATEWAY" => Self::Gateway,
			"COMPUTE" => Self::Compute,
			"STORAGE" => Self::Storage,
			"SERVER" => Self::Server,
			_ => Self::Other(name),
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Pc => f.write_str("PC"),
			Self::Gateway => f.write_str("GATEWAY"),
			Self::Compute => f.write_str("COMPUTE"),
			Self::Storage => f.write_str("STORAGE"),
			Self::Server => f.write_str("SERVER"),
			Self::Other(name) => f.write_str(name),
		}
	}
}

/// One node entry of the graph document.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeRecord {
	/// Node identifier.
	pub id: NodeId,
	/// Node type.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Relative performance score assigned by the generator.
	#[serde(default)]
	pub performance: Option<f64>,
}

/// One edge entry of the graph document.
#[derive(Clone, Debug, Deserialize)]
pub struct EdgeRecord {
	/// First endpoint.
	pub node_a: NodeId,
	/// Second endpoint.
	pub node_b: NodeId,
	/// Link latency, if the generator recorded one.
	#[serde(default)]
	pub latency: Option<f64>,
	/// Link bandwidth, if the generator recorded one.
	#[serde(default)]
	pub bandwidth: Option<f64>,
}

/// The node table is either keyed by id or a plain list.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NodeTable {
	/// `{ "<id>": { "id": .., "type": .. }, .. }`
	Keyed(BTreeMap<String, NodeRecord>),
	/// `[ { "id": .., "type": .. }, .. ]`
	List(Vec<NodeRecord>),
}

impl NodeTable {
	/// Node records in table order.
	pub fn into_records(self) -> Vec<NodeRecord> {
		match self {
			Self::Keyed(map) => map.into_values().collect(),
			Self::List(list) => list,
		}
	}
}

/// Graph topology document.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphDocument {
	/// All nodes.
	pub nodes: NodeTable,
	/// All edges, in document order.
	pub edges: Vec<EdgeRecord>,
	/// Source of the optimised route.
	#[serde(default)]
	pub start_node: Option<NodeId>,
	/// Destination of the optimised route.
	#[serde(default)]
	pub end_node: Option<NodeId>,
}

impl GraphDocument {
	/// Parse a graph document from JSON text.
	pub fn from_json(text: &str) -> serde_json::Result<Self> {
		serde_json::from_str(text)
	}
}

/// Best-path document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BestPathDocument {
	/// Node ids in walk order.
	pub path: Vec<NodeId>,
	/// Score of the path as reported by the optimiser.
	#[serde(default)]
	pub fitness: Option<f64>,
}

impl BestPathDocument {
	/// Parse a best-path document from JSON text.
	pub fn from_json(text: &str) -> serde_json::Result<Self> {
		serde_json::from_str(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_ids_normalise_numbers_and_strings() {
		let ids: Vec<NodeId> = serde_json::from_str(r#"[1, "1", "gw"]"#).unwrap();
		assert_eq!(ids[0], ids[1]);
		assert_eq!(ids[2].as_str(), "gw");
	}

	#[test]
	fn parses_keyed_node_table() {
		let doc = GraphDocument::from_json(
			r#"{
				"nodes": { "1": { "id": 1, "type": "PC" }, "2": { "id": 2, "type": "SERVER" } },
				"edges": [ { "node_a": 1, "node_b": 2 } ]
			}"#,
		)
		.unwrap();
		let nodes = doc.nodes.into_records();
		assert_eq!(nodes.len(), 2);
		assert_eq!(nodes[1].kind, NodeKind::Server);
		assert_eq!(doc.edges.len(), 1);
		assert!(doc.start_node.is_none());
	}

	#[test]
	fn parses_generator_output() {
		let doc = GraphDocument::from_json(
			r#"{
				"start_node": 0,
				"end_node": 1,
				"nodes": [
					{ "id": 0, "type": "GATEWAY", "performance": 40 },
					{ "id": 1, "type": "STORAGE", "performance": 75 }
				],
				"edges": [ { "node_a": 0, "node_b": 1, "latency": 12.5, "bandwidth": 100 } ]
			}"#,
		)
		.unwrap();
		assert_eq!(doc.start_node, Some(NodeId::new(0)));
		assert_eq!(doc.edges[0].latency, Some(12.5));
		let nodes = doc.nodes.into_records();
		assert_eq!(nodes[0].performance, Some(40.0));
	}

	#[test]
	fn unknown_type_is_kept_verbatim() {
		let record: NodeRecord = serde_json::from_str(r#"{ "id": 9, "type": "ROUTER" }"#).unwrap();
		assert_eq!(record.kind, NodeKind::Other("ROUTER".into()));
		assert_eq!(record.kind.to_string(), "ROUTER");
	}

	#[test]
	fn best_path_with_fitness() {
		let doc = BestPathDocument::from_json(r#"{ "fitness": 0.82, "path": [0, 3, 1] }"#).unwrap();
		assert_eq!(doc.path.len(), 3);
		assert_eq!(doc.fitness, Some(0.82));
	}

	#[test]
	fn missing_edges_is_malformed() {
		assert!(GraphDocument::from_json(r#"{ "nodes": [] }"#).is_err());
	}
}

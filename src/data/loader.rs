//! Fetches the graph and best-path documents.

use gloo_net::http::Request;
use log::{debug, info};

use super::document::{BestPathDocument, GraphDocument};
use super::topology::{Topology, TopologyError};

/// Failure to produce a [`Network`]. Any of these aborts the whole render.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// The request never produced a response.
	#[error("failed to fetch {url}: {message}")]
	Fetch {
		/// Requested URL.
		url: String,
		/// Transport error text.
		message: String,
	},

	/// The server answered with a non-success status.
	#[error("{url} returned HTTP {status}")]
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},

	/// The body was not a valid document.
	#[error("malformed JSON in {url}: {source}")]
	Malformed {
		/// Requested URL.
		url: String,
		/// Parser error.
		#[source]
		source: serde_json::Error,
	},

	/// The graph document was well formed but inconsistent.
	#[error(transparent)]
	Topology(#[from] TopologyError),
}

/// Topology together with the best path to animate over it.
#[derive(Clone, Debug, Default)]
pub struct Network {
	/// Validated topology.
	pub topology: Topology,
	/// Best-path result.
	pub best_path: BestPathDocument,
}

impl Network {
	/// One-line description for the overlay.
	pub fn summary(&self) -> String {
		let hops = self.best_path.path.len().saturating_sub(1);
		let mut text = format!(
			"{} nodes, {} edges, best path of {} hops",
			self.topology.nodes().len(),
			self.topology.edges().len(),
			hops
		);
		if let Some(fitness) = self.best_path.fitness {
			text.push_str(&format!(" (fitness {fitness:.3})"));
		}
		text
	}
}

/// Fetch both documents concurrently and build the network.
pub async fn load_network(graph_url: &str, path_url: &str) -> Result<Network, LoadError> {
	let (graph_text, path_text) = futures::try_join!(fetch_text(graph_url), fetch_text(path_url))?;
	let network = parse_network(graph_url, &graph_text, path_url, &path_text)?;
	info!("Loaded network: {}", network.summary());
	Ok(network)
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
	debug!("Fetching {url}");
	let response = Request::get(url)
		.send()
		.await
		.map_err(|e| LoadError::Fetch {
			url: url.to_string(),
			message: e.to_string(),
		})?;
	if !response.ok() {
		return Err(LoadError::Status {
			url: url.to_string(),
			status: response.status(),
		});
	}
	response.text().await.map_err(|e| LoadError::Fetch {
		url: url.to_string(),
		message: e.to_string(),
	})
}

/// Parse already-fetched document bodies. URLs are only used in errors.
pub fn parse_network(
	graph_url: &str,
	graph_text: &str,
	path_url: &str,
	path_text: &str,
) -> Result<Network, LoadError> {
	let graph = GraphDocument::from_json(graph_text).map_err(|source| LoadError::Malformed {
		url: graph_url.to_string(),
		source,
	})?;
	let best_path = BestPathDocument::from_json(path_text).map_err(|source| LoadError::Malformed {
		url: path_url.to_string(),
		source,
	})?;
	Ok(Network {
		topology: Topology::from_document(graph)?,
		best_path,
	})
}

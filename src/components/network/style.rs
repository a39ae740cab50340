use crate::data::NodeKind;

pub const NODE_RADIUS: f64 = 20.0;
pub const HIT_RADIUS: f64 = 22.0;
pub const ICON_SIZE: f64 = 24.0;
pub const LABEL_OFFSET: f64 = 36.0;
pub const NODE_STROKE: &str = "#374151";

/// Disc fill for a node type. Unknown types get none.
pub fn fill_color(kind: &NodeKind) -> Option<&'static str> {
	match kind {
		NodeKind::Pc => Some("#93c5fd"),
		NodeKind::Gateway => Some("#fde047"),
		NodeKind::Compute => Some("#86efac"),
		NodeKind::Storage => Some("#d1d5db"),
		NodeKind::Server => Some("#fca5a5"),
		NodeKind::Other(_) => None,
	}
}

/// Icon asset for a node type. Unknown types get none.
pub fn icon_path(kind: &NodeKind) -> Option<&'static str> {
	match kind {
		NodeKind::Pc => Some("assets/pc.svg"),
		NodeKind::Gateway => Some("assets/gateway.svg"),
		NodeKind::Compute => Some("assets/compute.svg"),
		NodeKind::Storage => Some("assets/storage.svg"),
		NodeKind::Server => Some("assets/server.svg"),
		NodeKind::Other(_) => None,
	}
}

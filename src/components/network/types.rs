/// Animation handle of an edge: its position in the topology's edge list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeHandle(usize);

impl EdgeHandle {
	pub const fn new(index: usize) -> Self {
		Self(index)
	}

	pub const fn index(self) -> usize {
		self.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketKind {
	/// Decorative traffic on every edge.
	Background,
	/// Best-path traversal.
	Path,
}

impl PacketKind {
	pub const fn radius(self) -> f64 {
		match self {
			Self::Background => 2.0,
			Self::Path => 4.0,
		}
	}
}

/// One marker travelling along an edge. Times are in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Packet {
	pub edge: EdgeHandle,
	pub kind: PacketKind,
	pub spawned_at: f64,
	pub duration: f64,
}

impl Packet {
	/// Elapsed fraction at `now`, or `None` before the packet has started moving.
	pub fn progress(&self, now: f64) -> Option<f64> {
		if now < self.spawned_at {
			return None;
		}
		if self.duration <= 0.0 {
			return Some(1.0);
		}
		Some(((now - self.spawned_at) / self.duration).min(1.0))
	}

	pub fn arrives_at(&self) -> f64 {
		self.spawned_at + self.duration.max(0.0)
	}

	pub fn is_complete(&self, now: f64) -> bool {
		now >= self.arrives_at()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn progress_is_linear_and_clamped() {
		let packet = Packet {
			edge: EdgeHandle::new(0),
			kind: PacketKind::Path,
			spawned_at: 400.0,
			duration: 1000.0,
		};
		assert_eq!(packet.progress(399.0), None);
		assert_eq!(packet.progress(400.0), Some(0.0));
		assert_eq!(packet.progress(900.0), Some(0.5));
		assert_eq!(packet.progress(5000.0), Some(1.0));
		assert!(!packet.is_complete(1399.0));
		assert!(packet.is_complete(1400.0));
	}

	#[test]
	fn path_packets_are_larger() {
		assert!(PacketKind::Path.radius() > PacketKind::Background.radius());
	}
}

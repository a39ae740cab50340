//! Background traffic: one perpetual packet cycle per edge.
//!
//! Each edge alternates between travelling and a short respawn pause. The
//! cycles are plain state values advanced by [`TrafficAnimator::advance`]
//! once per frame.

use rand::Rng;

use super::types::{EdgeHandle, Packet, PacketKind};

/// Timing of the background cycle, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficTiming {
	pub min_duration: f64,
	pub max_duration: f64,
	pub max_respawn_delay: f64,
}

impl Default for TrafficTiming {
	fn default() -> Self {
		Self {
			min_duration: 3000.0,
			max_duration: 6000.0,
			max_respawn_delay: 1000.0,
		}
	}
}

impl TrafficTiming {
	fn duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
		if self.max_duration > self.min_duration {
			rng.gen_range(self.min_duration..self.max_duration)
		} else {
			self.min_duration
		}
	}

	fn respawn_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
		if self.max_respawn_delay > 0.0 {
			rng.gen_range(0.0..self.max_respawn_delay)
		} else {
			0.0
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
	Idle { resume_at: f64 },
	Traveling(Packet),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeTraffic {
	pub edge: EdgeHandle,
	pub phase: Phase,
}

pub struct TrafficAnimator {
	lanes: Vec<EdgeTraffic>,
	timing: TrafficTiming,
}

impl TrafficAnimator {
	/// Put one packet on every edge, all starting at `now`.
	pub fn start<R: Rng + ?Sized>(
		edges: impl IntoIterator<Item = EdgeHandle>,
		timing: TrafficTiming,
		now: f64,
		rng: &mut R,
	) -> Self {
		let lanes = edges
			.into_iter()
			.map(|edge| EdgeTraffic {
				edge,
				phase: Phase::Traveling(spawn(edge, now, timing.duration(rng))),
			})
			.collect();
		Self {
			lanes,
			timing,
		}
	}

	/// Move every edge's cycle forward to `now`.
	///
	/// Transitions land at their scheduled times, not at `now`. A lane that
	/// has fallen more than one full travel time behind (a backgrounded tab)
	/// restarts at `now` instead of replaying the missed cycles.
	pub fn advance<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) {
		let Self { lanes, timing } = self;
		for lane in lanes.iter_mut() {
			loop {
				match lane.phase {
					Phase::Traveling(packet) if packet.is_complete(now) => {
						lane.phase = Phase::Idle {
							resume_at: packet.arrives_at() + timing.respawn_delay(rng),
						};
					}
					Phase::Idle { resume_at } if now >= resume_at => {
						let at = if now - resume_at > timing.max_duration {
							now
						} else {
							resume_at
						};
						lane.phase = Phase::Traveling(spawn(lane.edge, at, timing.duration(rng)));
					}
					_ => break,
				}
			}
		}
	}

	/// Packets currently on the wire.
	pub fn packets(&self) -> impl Iterator<Item = &Packet> + '_ {
		self.lanes.iter().filter_map(|lane| match &lane.phase {
			Phase::Traveling(packet) => Some(packet),
			Phase::Idle { .. } => None,
		})
	}

	#[cfg(test)]
	pub fn packet_on(&self, edge: EdgeHandle) -> Option<&Packet> {
		self.packets().find(|p| p.edge == edge)
	}

	#[cfg(test)]
	pub fn lanes(&self) -> &[EdgeTraffic] {
		&self.lanes
	}
}

fn spawn(edge: EdgeHandle, at: f64, duration: f64) -> Packet {
	Packet {
		edge,
		kind: PacketKind::Background,
		spawned_at: at,
		duration,
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	fn handles(n: usize) -> Vec<EdgeHandle> {
		(0..n).map(EdgeHandle::new).collect()
	}

	#[test]
	fn every_edge_starts_travelling() {
		let mut rng = SmallRng::seed_from_u64(1);
		let traffic = TrafficAnimator::start(handles(5), TrafficTiming::default(), 0.0, &mut rng);
		assert_eq!(traffic.packets().count(), 5);
		for packet in traffic.packets() {
			assert_eq!(packet.kind, PacketKind::Background);
			assert!((3000.0..6000.0).contains(&packet.duration));
		}
	}

	#[test]
	fn completed_packet_respawns_on_same_edge_after_short_delay() {
		let mut rng = SmallRng::seed_from_u64(2);
		let mut traffic = TrafficAnimator::start(handles(1), TrafficTiming::default(), 0.0, &mut rng);
		let first = *traffic.packet_on(EdgeHandle::new(0)).unwrap();

		traffic.advance(first.arrives_at(), &mut rng);
		let resume_at = match traffic.lanes()[0].phase {
			Phase::Idle { resume_at } => resume_at,
			Phase::Traveling(p) => p.spawned_at,
		};
		assert!(resume_at >= first.arrives_at());
		assert!(resume_at < first.arrives_at() + 1000.0);

		traffic.advance(first.arrives_at() + 1000.0, &mut rng);
		let second = traffic.packet_on(EdgeHandle::new(0)).unwrap();
		assert_eq!(second.spawned_at, resume_at);
		assert_eq!(second.edge, EdgeHandle::new(0));
	}

	#[test]
	fn cycle_never_stops() {
		let mut rng = SmallRng::seed_from_u64(3);
		let edges = handles(4);
		let mut traffic = TrafficAnimator::start(edges.clone(), TrafficTiming::default(), 0.0, &mut rng);
		let mut last_seen = vec![0.0_f64; edges.len()];
		let mut spawns = vec![0.0_f64; edges.len()];
		let mut respawned = 0;
		let mut now = 0.0;
		while now < 120_000.0 {
			now += 16.0;
			traffic.advance(now, &mut rng);
			for (i, &edge) in edges.iter().enumerate() {
				if let Some(packet) = traffic.packet_on(edge) {
					last_seen[i] = now;
					if packet.spawned_at != spawns[i] {
						spawns[i] = packet.spawned_at;
						respawned += 1;
					}
				}
				assert!(now - last_seen[i] < 1000.0 + 2.0 * 16.0, "edge {i} silent at {now}");
			}
		}
		assert!(respawned >= 4 * 15, "only {respawned} respawns");
	}

	#[test]
	fn long_gap_restarts_at_current_time() {
		let mut rng = SmallRng::seed_from_u64(4);
		let mut traffic = TrafficAnimator::start(handles(2), TrafficTiming::default(), 0.0, &mut rng);
		traffic.advance(3_600_000.0, &mut rng);
		for lane in traffic.lanes() {
			match lane.phase {
				Phase::Traveling(p) => assert_eq!(p.spawned_at, 3_600_000.0),
				Phase::Idle { resume_at } => panic!("lane idle until {resume_at}"),
			}
		}
	}

	#[test]
	fn lanes_are_not_in_lock_step() {
		let mut rng = SmallRng::seed_from_u64(5);
		let traffic = TrafficAnimator::start(handles(8), TrafficTiming::default(), 0.0, &mut rng);
		let first = traffic.packets().next().unwrap().duration;
		assert!(traffic.packets().any(|p| p.duration != first));
	}
}

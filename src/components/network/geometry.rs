/// A point in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Exact at both ends: `t = 0` gives `self`, `t = 1` gives `other`.
	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(
			self.x * (1.0 - t) + other.x * t,
			self.y * (1.0 - t) + other.y * t,
		)
	}
}

/// Straight line between two edge endpoints at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
	pub start: Point,
	pub end: Point,
}

impl Segment {
	pub const fn new(start: Point, end: Point) -> Self {
		Self { start, end }
	}

	pub fn total_length(&self) -> f64 {
		self.start.distance(self.end)
	}

	/// Point `length` units from the start, clamped to the segment.
	pub fn point_at_length(&self, length: f64) -> Point {
		let total = self.total_length();
		if total <= f64::EPSILON {
			return self.start;
		}
		self.point_at_fraction(length / total)
	}

	/// Point at fraction `t` of the way from start to end, `t` clamped to [0, 1].
	pub fn point_at_fraction(&self, t: f64) -> Point {
		self.start.lerp(self.end, t.clamp(0.0, 1.0))
	}
}

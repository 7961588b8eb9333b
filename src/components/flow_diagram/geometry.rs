/// A point in view-box pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance_to(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}

	fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
	pub start: Point,
	pub end: Point,
	pub length: f64,
}

/// A polyline a packet travels along, with segment lengths precomputed.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
	waypoints: Vec<Point>,
	segments: Vec<Segment>,
	total: f64,
}

impl Path {
	/// Panics on fewer than two waypoints; paths only come from layout math.
	pub fn new(waypoints: Vec<Point>) -> Self {
		assert!(
			waypoints.len() >= 2,
			"path needs at least two waypoints, got {}",
			waypoints.len()
		);
		let segments: Vec<Segment> = waypoints
			.windows(2)
			.map(|w| Segment {
				start: w[0],
				end: w[1],
				length: w[0].distance_to(w[1]),
			})
			.collect();
		let total = segments.iter().map(|s| s.length).sum();
		Self {
			waypoints,
			segments,
			total,
		}
	}

	pub fn total_length(&self) -> f64 {
		self.total
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn waypoints(&self) -> &[Point] {
		&self.waypoints
	}

	pub fn start(&self) -> Point {
		self.waypoints[0]
	}

	pub fn end(&self) -> Point {
		self.waypoints[self.waypoints.len() - 1]
	}

	/// Position after walking `distance` along the path, clamped to its ends.
	pub fn position_at(&self, distance: f64) -> Point {
		if distance <= 0.0 {
			return self.start();
		}
		if distance >= self.total {
			return self.end();
		}
		let mut remaining = distance;
		for seg in &self.segments {
			if remaining <= seg.length {
				let t = if seg.length > 0.0 {
					remaining / seg.length
				} else {
					0.0
				};
				return seg.start.lerp(seg.end, t);
			}
			remaining -= seg.length;
		}
		// float residue from the running subtraction
		self.end()
	}
}

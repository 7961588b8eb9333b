/// Animation tuning for the packet simulation.
///
/// Distances are view-box pixels, times are seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowConfig {
	/// Packet travel speed in px/s.
	pub speed: f64,
	/// Time between trunk spawns.
	pub spawn_interval: f64,
	pub fade_in: f64,
	pub fade_out: f64,
	/// Extra distance a lane's y may sit outside the y-range a spine packet
	/// swept this tick and still fork.
	pub fork_tolerance: f64,
	/// Distance past a spine path's end before the packet is dropped.
	pub overshoot: f64,
	pub branch_overshoot: f64,
	/// Upper bound on a single tick, so a resumed tab doesn't flood the diagram.
	pub max_dt: f64,
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			speed: 150.0,
			spawn_interval: 0.38,
			fade_in: 22.0,
			fade_out: 28.0,
			fork_tolerance: 10.0,
			overshoot: 30.0,
			branch_overshoot: 25.0,
			max_dt: 0.05,
		}
	}
}

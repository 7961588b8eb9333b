//! Packets travelling trunk → spine → branch.
//!
//! One `tick` per animation frame. All mutable state (the three packet lists,
//! the spawn accumulator and the id counter) lives in `FlowSimulation`.

use log::trace;

use super::config::FlowConfig;
use super::geometry::Point;
use super::layout::{Layout, SpineDirection};

/// Slack for the spawn accumulator so a run of frames summing to a whole
/// number of intervals still spawns on the last one.
const SPAWN_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct TrunkPacket {
	pub id: u64,
	pub distance: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpinePacket {
	pub id: u64,
	pub distance: f64,
	pub direction: SpineDirection,
	/// Lanes this packet has already forked into.
	emitted: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BranchPacket {
	pub id: u64,
	pub lane: usize,
	pub distance: f64,
}

/// A packet resolved to a drawable position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LivePacket {
	pub position: Point,
	pub opacity: f64,
}

#[derive(Clone, Debug)]
pub struct FlowSimulation {
	config: FlowConfig,
	trunk: Vec<TrunkPacket>,
	spine: Vec<SpinePacket>,
	branch: Vec<BranchPacket>,
	spawn_timer: f64,
	next_id: u64,
}

impl Default for FlowSimulation {
	fn default() -> Self {
		Self::new(FlowConfig::default())
	}
}

impl FlowSimulation {
	pub fn new(config: FlowConfig) -> Self {
		Self {
			config,
			trunk: Vec::new(),
			spine: Vec::new(),
			branch: Vec::new(),
			spawn_timer: 0.0,
			next_id: 0,
		}
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.trunk.is_empty() && self.spine.is_empty() && self.branch.is_empty()
	}

	/// Drops every packet and restarts the spawn timer. Ids keep counting up.
	pub fn reset(&mut self) {
		self.trunk.clear();
		self.spine.clear();
		self.branch.clear();
		self.spawn_timer = 0.0;
	}

	fn next_id(&mut self) -> u64 {
		self.next_id += 1;
		self.next_id
	}

	pub fn spawn_trunk(&mut self) -> u64 {
		let id = self.next_id();
		self.trunk.push(TrunkPacket { id, distance: 0.0 });
		id
	}

	pub fn tick(&mut self, dt: f64, layout: &Layout) {
		if !dt.is_finite() {
			return;
		}
		let dt = dt.clamp(0.0, self.config.max_dt);
		let step = self.config.speed * dt;

		self.spawn_timer += dt;
		while self.spawn_timer + SPAWN_EPSILON >= self.config.spawn_interval {
			self.spawn_timer -= self.config.spawn_interval;
			self.spawn_trunk();
		}

		self.advance_trunk(step, layout);
		self.advance_spine(step, layout);
		self.advance_branches(step, layout);
	}

	fn advance_trunk(&mut self, step: f64, layout: &Layout) {
		let total = layout.trunk().total_length();
		let mut forked = 0;
		self.trunk.retain_mut(|p| {
			p.distance += step;
			if p.distance >= total {
				trace!("trunk packet {} reached the fan-out", p.id);
				forked += 1;
				return false;
			}
			true
		});

		for _ in 0..forked {
			for &direction in layout.fork_directions() {
				let id = self.next_id();
				self.spine.push(SpinePacket {
					id,
					distance: 0.0,
					direction,
					emitted: vec![false; layout.leaf_count()],
				});
			}
		}
	}

	fn advance_spine(&mut self, step: f64, layout: &Layout) {
		let (fan_y, tolerance) = (layout.fan_out().y, self.config.fork_tolerance);
		let mut forks = Vec::new();

		for packet in &mut self.spine {
			let path = layout.spine(packet.direction);
			let before = path.position_at(packet.distance).y;
			packet.distance += step;
			let after = path.position_at(packet.distance).y;

			// every lane crossed this tick forks, however large the step
			let (lo, hi) = (before.min(after) - tolerance, before.max(after) + tolerance);
			for (lane, emitted) in packet.emitted.iter_mut().enumerate() {
				let lane_y = layout.lane_y(lane);
				if *emitted || !packet.direction.serves(lane_y, fan_y) {
					continue;
				}
				if (lo..=hi).contains(&lane_y) {
					trace!("spine packet {} forking into lane {lane}", packet.id);
					*emitted = true;
					forks.push(lane);
				}
			}
		}

		let overshoot = self.config.overshoot;
		self.spine
			.retain(|p| p.distance <= layout.spine(p.direction).total_length() + overshoot);

		for lane in forks {
			let id = self.next_id();
			self.branch.push(BranchPacket {
				id,
				lane,
				distance: 0.0,
			});
		}
	}

	fn advance_branches(&mut self, step: f64, layout: &Layout) {
		let (branches, overshoot) = (layout.branches(), self.config.branch_overshoot);
		self.branch.retain_mut(|p| {
			p.distance += step;
			let live = p.distance <= branches[p.lane].total_length() + overshoot;
			if !live {
				trace!("branch packet {} retired from lane {}", p.id, p.lane);
			}
			live
		});
	}

	/// Fade in from the path start, fade out towards its end.
	pub fn opacity(&self, distance: f64, path_length: f64) -> f64 {
		let fade_in = (distance / self.config.fade_in).min(1.0);
		let fade_out = ((path_length - distance) / self.config.fade_out).min(1.0);
		(fade_in * fade_out).clamp(0.0, 1.0)
	}

	pub fn live_packets(&self, layout: &Layout) -> Vec<LivePacket> {
		let trunk = layout.trunk();
		let trunks = self.trunk.iter().map(|p| LivePacket {
			position: trunk.position_at(p.distance),
			opacity: self.opacity(p.distance, trunk.total_length()),
		});
		let spines = self.spine.iter().map(|p| {
			let path = layout.spine(p.direction);
			LivePacket {
				position: path.position_at(p.distance),
				opacity: self.opacity(p.distance, path.total_length()),
			}
		});
		let branches = self.branch.iter().map(|p| {
			let path = &layout.branches()[p.lane];
			LivePacket {
				position: path.position_at(p.distance),
				opacity: self.opacity(p.distance, path.total_length()),
			}
		});
		trunks.chain(spines).chain(branches).collect()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::{BTreeMap, BTreeSet};

	use super::*;

	fn manual_config() -> FlowConfig {
		FlowConfig {
			spawn_interval: f64::INFINITY,
			..Default::default()
		}
	}

	/// Runs until the simulation drains, recording every branch packet by id.
	fn collect_branches(sim: &mut FlowSimulation, layout: &Layout, dt: f64) -> BTreeMap<u64, usize> {
		let mut seen = BTreeMap::new();
		for _ in 0..100_000 {
			sim.tick(dt, layout);
			for p in &sim.branch {
				seen.insert(p.id, p.lane);
			}
			if sim.is_empty() {
				return seen;
			}
		}
		panic!("simulation never drained");
	}

	#[test]
	fn test_spawn_timer_counts_trunk_packets() {
		let layout = Layout::compute(false, 4);
		// each run covers exactly 1.9s, five spawn intervals
		for (dt, frames) in [(0.038, 50), (0.019, 100), (0.02, 95), (0.01, 190), (0.05, 38)] {
			let mut sim = FlowSimulation::default();
			for _ in 0..frames {
				sim.tick(dt, &layout);
			}
			assert_eq!(sim.trunk.len(), 5, "dt {dt}");
			assert!(sim.spine.is_empty(), "dt {dt}");
		}
	}

	#[test]
	fn test_spawn_timer_waits_for_a_full_interval() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::default();
		for _ in 0..37 {
			sim.tick(0.01, &layout);
		}
		assert!(sim.trunk.is_empty());
		sim.tick(0.01, &layout);
		assert_eq!(sim.trunk.len(), 1);
	}

	#[test]
	fn test_spawn_timer_catches_up() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::new(FlowConfig {
			spawn_interval: 0.25,
			max_dt: 1.0,
			..Default::default()
		});
		sim.tick(1.0, &layout);
		assert_eq!(sim.trunk.len(), 4);
	}

	#[test]
	fn test_dt_is_clamped() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::new(manual_config());
		sim.spawn_trunk();
		sim.tick(10.0, &layout);
		let d = sim.trunk[0].distance;
		assert!((d - 7.5).abs() < 1e-9, "distance {d}");

		sim.tick(f64::NAN, &layout);
		sim.tick(-1.0, &layout);
		assert_eq!(sim.trunk[0].distance, d);
	}

	#[test]
	fn test_wide_trunk_forks_into_up_and_down() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::default();
		let first = sim.spawn_trunk();
		let mut ticks = 0;
		while sim.spine.is_empty() {
			sim.tick(0.016, &layout);
			ticks += 1;
			assert!(ticks < 1000);
		}
		// 485px at 150px/s
		assert_eq!(ticks, 203);
		assert!(sim.trunk.iter().all(|p| p.id != first));
		let directions: Vec<SpineDirection> =
			sim.spine.iter().map(|p| p.direction).collect();
		assert_eq!(directions, vec![SpineDirection::Up, SpineDirection::Down]);
		assert!(sim.spine.iter().all(|p| p.emitted.len() == 4));
	}

	#[test]
	fn test_trunk_forks_exactly_once() {
		for (narrow, spines) in [(false, 2), (true, 1)] {
			let layout = Layout::compute(narrow, 4);
			let mut sim = FlowSimulation::new(manual_config());
			sim.spawn_trunk();
			// past the trunk end, before any spine packet can retire
			for _ in 0..250 {
				sim.tick(0.016, &layout);
			}
			assert!(sim.trunk.is_empty());
			assert_eq!(sim.spine.len(), spines);
		}
	}

	#[test]
	fn test_narrow_spine_emits_each_lane_once() {
		let layout = Layout::compute(true, 4);
		for dt in [0.016, 0.05] {
			let mut sim = FlowSimulation::new(manual_config());
			sim.spawn_trunk();
			let seen = collect_branches(&mut sim, &layout, dt);
			assert_eq!(seen.len(), 4, "dt {dt}");
			let lanes: BTreeSet<usize> = seen.values().copied().collect();
			assert_eq!(lanes, BTreeSet::from([0, 1, 2, 3]), "dt {dt}");
		}
	}

	#[test]
	fn test_wide_spines_split_lanes() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::new(manual_config());
		sim.spawn_trunk();
		let seen = collect_branches(&mut sim, &layout, 0.016);
		let lanes: Vec<usize> = seen.values().copied().collect();
		assert_eq!(lanes.len(), 4);
		assert_eq!(lanes.iter().copied().collect::<BTreeSet<_>>().len(), 4);
	}

	#[test]
	fn test_large_ticks_never_skip_a_lane() {
		let layout = Layout::compute(true, 4);
		let mut sim = FlowSimulation::new(FlowConfig {
			spawn_interval: f64::INFINITY,
			fork_tolerance: 0.0,
			max_dt: 0.5,
			..Default::default()
		});
		sim.spawn_trunk();
		let seen = collect_branches(&mut sim, &layout, 0.5);
		assert_eq!(seen.len(), 4);
	}

	#[test]
	fn test_branch_retires_after_overshoot() {
		let layout = Layout::compute(true, 4);
		let mut sim = FlowSimulation::new(manual_config());
		sim.branch.push(BranchPacket {
			id: 99,
			lane: 2,
			distance: 0.0,
		});
		// 76px branch + 25px overshoot at 150px/s
		let lifetime = (76.0 + 25.0) / 150.0;
		let mut elapsed = 0.0;
		while elapsed < lifetime - 0.02 {
			sim.tick(0.01, &layout);
			elapsed += 0.01;
		}
		assert_eq!(sim.branch.len(), 1);
		for _ in 0..4 {
			sim.tick(0.01, &layout);
		}
		assert!(sim.branch.is_empty());
	}

	#[test]
	fn test_everything_drains_without_new_spawns() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::default();
		for _ in 0..300 {
			sim.tick(0.016, &layout);
		}
		assert!(!sim.is_empty());
		let mut sim = FlowSimulation {
			config: manual_config(),
			..sim
		};
		let _ = collect_branches(&mut sim, &layout, 0.016);
		assert!(sim.is_empty());
	}

	#[test]
	fn test_reset_clears_packets_and_timer() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::default();
		for _ in 0..400 {
			sim.tick(0.016, &layout);
		}
		let last_id = sim.next_id;
		sim.reset();
		assert!(sim.is_empty());
		assert_eq!(sim.spawn_timer, 0.0);
		assert!(sim.spawn_trunk() > last_id);
	}

	#[test]
	fn test_opacity_fades_at_both_ends() {
		let sim = FlowSimulation::default();
		assert_eq!(sim.opacity(0.0, 200.0), 0.0);
		assert_eq!(sim.opacity(11.0, 200.0), 0.5);
		assert_eq!(sim.opacity(100.0, 200.0), 1.0);
		assert_eq!(sim.opacity(186.0, 200.0), 0.5);
		assert_eq!(sim.opacity(200.0, 200.0), 0.0);
		assert_eq!(sim.opacity(220.0, 200.0), 0.0);
	}

	#[test]
	fn test_live_packets_resolve_positions() {
		let layout = Layout::compute(false, 4);
		let mut sim = FlowSimulation::new(manual_config());
		sim.spawn_trunk();
		sim.trunk[0].distance = 45.0;
		let live = sim.live_packets(&layout);
		assert_eq!(live.len(), 1);
		assert_eq!(live[0].position, Point::new(175.0, 303.0));
		assert_eq!(live[0].opacity, 1.0);
	}
}

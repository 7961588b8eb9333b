//! Fixed card positions and packet paths for the two diagram modes.
//!
//! Everything here is pure arithmetic over the constants below, so the same
//! inputs always produce bit-identical layouts.

use super::geometry::{Path, Point};

pub const CARD_W: f64 = 130.0;
pub const CARD_H: f64 = 130.0;

const CHAIN_RADIUS: f64 = 22.0;
const LEAF_RADIUS: f64 = 18.0;
const TOP_PAD: f64 = 10.0;

// Wide mode
const WIDE_VGAP: f64 = 22.0;
const WIDE_HGAP: f64 = 90.0;
const WIDE_RIGHT_PAD: f64 = 30.0;

// Narrow mode
const NARROW_VSTEP: f64 = 96.0;
const GRID_GAP_X: f64 = 22.0;
const GRID_GAP_Y: f64 = 22.0;
const GRID_TOP_GAP: f64 = 84.0;
const NARROW_SIDE_PAD: f64 = 40.0;
const NARROW_BOTTOM_PAD: f64 = 18.0;

/// Which way a spine packet travels from the fan-out point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpineDirection {
	Up,
	Down,
}

impl SpineDirection {
	/// Up packets serve lanes strictly above the fan-out, down packets the rest.
	pub fn serves(self, lane_y: f64, fan_y: f64) -> bool {
		match self {
			SpineDirection::Up => lane_y < fan_y,
			SpineDirection::Down => lane_y >= fan_y,
		}
	}
}

/// Top-left corner of a card plus its corner radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSlot {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

impl CardSlot {
	fn new(x: f64, y: f64, radius: f64) -> Self {
		Self { x, y, radius }
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + CARD_W && p.y >= self.y && p.y <= self.y + CARD_H
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + CARD_W / 2.0, self.y + CARD_H / 2.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct WideLayout {
	pub width: f64,
	pub height: f64,
	/// Studio, creative, ops.
	pub chain: [CardSlot; 3],
	pub leaves: Vec<CardSlot>,
	pub trunk: Path,
	pub spine_up: Path,
	pub spine_down: Path,
	pub branches: Vec<Path>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NarrowLayout {
	pub width: f64,
	pub height: f64,
	pub chain: [CardSlot; 3],
	pub leaves: Vec<CardSlot>,
	pub trunk: Path,
	pub spine: Path,
	pub branches: Vec<Path>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Layout {
	Wide(WideLayout),
	Narrow(NarrowLayout),
}

impl Layout {
	pub fn compute(narrow: bool, leaf_count: usize) -> Self {
		assert!(leaf_count > 0, "layout needs at least one leaf node");
		if narrow {
			Layout::Narrow(narrow_layout(leaf_count))
		} else {
			Layout::Wide(wide_layout(leaf_count))
		}
	}

	pub fn is_narrow(&self) -> bool {
		matches!(self, Layout::Narrow(_))
	}

	pub fn width(&self) -> f64 {
		match self {
			Layout::Wide(l) => l.width,
			Layout::Narrow(l) => l.width,
		}
	}

	pub fn height(&self) -> f64 {
		match self {
			Layout::Wide(l) => l.height,
			Layout::Narrow(l) => l.height,
		}
	}

	pub fn trunk(&self) -> &Path {
		match self {
			Layout::Wide(l) => &l.trunk,
			Layout::Narrow(l) => &l.trunk,
		}
	}

	pub fn spine(&self, direction: SpineDirection) -> &Path {
		match (self, direction) {
			(Layout::Wide(l), SpineDirection::Up) => &l.spine_up,
			(Layout::Wide(l), SpineDirection::Down) => &l.spine_down,
			(Layout::Narrow(l), _) => &l.spine,
		}
	}

	/// Spine packets a trunk packet turns into when it reaches the fan-out.
	pub fn fork_directions(&self) -> &'static [SpineDirection] {
		match self {
			Layout::Wide(_) => &[SpineDirection::Up, SpineDirection::Down],
			Layout::Narrow(_) => &[SpineDirection::Down],
		}
	}

	pub fn branches(&self) -> &[Path] {
		match self {
			Layout::Wide(l) => &l.branches,
			Layout::Narrow(l) => &l.branches,
		}
	}

	pub fn leaf_count(&self) -> usize {
		self.branches().len()
	}

	/// Y coordinate where lane `i` leaves the spine.
	pub fn lane_y(&self, lane: usize) -> f64 {
		self.branches()[lane].start().y
	}

	pub fn fan_out(&self) -> Point {
		self.trunk().end()
	}

	pub fn chain_slots(&self) -> &[CardSlot; 3] {
		match self {
			Layout::Wide(l) => &l.chain,
			Layout::Narrow(l) => &l.chain,
		}
	}

	pub fn leaf_slots(&self) -> &[CardSlot] {
		match self {
			Layout::Wide(l) => &l.leaves,
			Layout::Narrow(l) => &l.leaves,
		}
	}

	/// Dashed wire pieces drawn under the cards.
	pub fn connectors(&self) -> Vec<(Point, Point)> {
		match self {
			Layout::Wide(l) => {
				let pts = l.trunk.waypoints();
				// trunk waypoints alternate card edge / card edge; wires fill the gaps
				let mut wires: Vec<(Point, Point)> =
					pts.chunks_exact(2).map(|w| (w[0], w[1])).collect();
				wires.push((l.spine_up.end(), l.spine_down.end()));
				wires.extend(
					l.branches
						.iter()
						.map(|b| (b.waypoints()[0], b.waypoints()[1])),
				);
				wires
			}
			Layout::Narrow(l) => {
				let mut wires: Vec<(Point, Point)> =
					l.trunk.segments().iter().map(|s| (s.start, s.end)).collect();
				wires.push((l.spine.start(), l.spine.end()));
				wires.extend(l.branches.iter().map(|b| (b.start(), b.end())));
				wires
			}
		}
	}
}

fn wide_layout(leaf_count: usize) -> WideLayout {
	let n = leaf_count as f64;
	let team_h = n * CARD_H + (n - 1.0) * WIDE_VGAP;
	let height = team_h + TOP_PAD * 2.0;
	let mid_y = height / 2.0;

	let col_studio = 0.0;
	let col_creative = col_studio + CARD_W + WIDE_HGAP;
	let col_ops = col_creative + CARD_W + WIDE_HGAP;
	let col_team = col_ops + CARD_W + WIDE_HGAP;
	let spine_x = col_ops + CARD_W + WIDE_HGAP / 2.0;
	let chain_y = mid_y - CARD_H / 2.0;

	let member_y = |i: usize| TOP_PAD + i as f64 * (CARD_H + WIDE_VGAP);
	let lane_y = |i: usize| member_y(i) + CARD_H / 2.0;

	let trunk = Path::new(vec![
		Point::new(col_studio + CARD_W, mid_y),
		Point::new(col_creative, mid_y),
		Point::new(col_creative + CARD_W, mid_y),
		Point::new(col_ops, mid_y),
		Point::new(col_ops + CARD_W, mid_y),
		Point::new(spine_x, mid_y),
	]);
	let fan = Point::new(spine_x, mid_y);
	let spine_up = Path::new(vec![fan, Point::new(spine_x, lane_y(0))]);
	let spine_down = Path::new(vec![fan, Point::new(spine_x, lane_y(leaf_count - 1))]);

	let branches = (0..leaf_count)
		.map(|i| {
			let y = lane_y(i);
			Path::new(vec![
				Point::new(spine_x, y),
				Point::new(col_team, y),
				Point::new(col_team + CARD_W / 2.0, y),
			])
		})
		.collect();

	WideLayout {
		width: col_team + CARD_W + WIDE_RIGHT_PAD,
		height,
		chain: [
			CardSlot::new(col_studio, chain_y, CHAIN_RADIUS),
			CardSlot::new(col_creative, chain_y, CHAIN_RADIUS),
			CardSlot::new(col_ops, chain_y, CHAIN_RADIUS),
		],
		leaves: (0..leaf_count)
			.map(|i| CardSlot::new(col_team, member_y(i), LEAF_RADIUS))
			.collect(),
		trunk,
		spine_up,
		spine_down,
		branches,
	}
}

fn narrow_layout(leaf_count: usize) -> NarrowLayout {
	let studio_y = TOP_PAD;
	let creative_y = studio_y + CARD_H + NARROW_VSTEP;
	let ops_y = creative_y + CARD_H + NARROW_VSTEP;

	let grid_top = ops_y + CARD_H + GRID_TOP_GAP;
	let grid_w = CARD_W * 2.0 + GRID_GAP_X;
	let width = (grid_w + NARROW_SIDE_PAD).max(CARD_W + NARROW_SIDE_PAD);
	let center_x = width / 2.0;
	let grid_left = center_x - grid_w / 2.0;
	let grid_right = grid_left + CARD_W + GRID_GAP_X;
	let rows = leaf_count.div_ceil(2);
	let row_y = |r: usize| grid_top + r as f64 * (CARD_H + GRID_GAP_Y);

	let leaves: Vec<CardSlot> = (0..leaf_count)
		.map(|i| {
			let x = if i % 2 == 0 { grid_left } else { grid_right };
			CardSlot::new(x, row_y(i / 2), LEAF_RADIUS)
		})
		.collect();

	let chain_x = center_x - CARD_W / 2.0;
	let chain = [
		CardSlot::new(chain_x, studio_y, CHAIN_RADIUS),
		CardSlot::new(chain_x, creative_y, CHAIN_RADIUS),
		CardSlot::new(chain_x, ops_y, CHAIN_RADIUS),
	];

	let spine_x = center_x;
	let trunk = Path::new(chain.iter().map(|c| Point::new(spine_x, c.center().y)).collect());
	// runs down to the last row so every lane's branch point sits on it
	let spine = Path::new(vec![
		trunk.end(),
		Point::new(spine_x, row_y(rows - 1) + CARD_H / 2.0),
	]);
	let branches = leaves
		.iter()
		.map(|slot| {
			let lane = slot.center();
			Path::new(vec![Point::new(spine_x, lane.y), lane])
		})
		.collect();

	NarrowLayout {
		width,
		height: row_y(rows - 1) + CARD_H + NARROW_BOTTOM_PAD,
		chain,
		leaves,
		trunk,
		spine,
		branches,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_wide_layout_coordinates() {
		let layout = Layout::compute(false, 4);
		let Layout::Wide(wide) = &layout else {
			panic!("expected wide layout");
		};
		assert_eq!(wide.width, 820.0);
		assert_eq!(wide.height, 606.0);
		assert_eq!(wide.chain[1], CardSlot::new(220.0, 238.0, 22.0));
		assert_eq!(wide.leaves[2], CardSlot::new(660.0, 314.0, 18.0));
		assert_eq!(layout.fan_out(), Point::new(615.0, 303.0));
		assert_eq!(wide.trunk.total_length(), 485.0);
		assert_eq!(wide.spine_up.end(), Point::new(615.0, 75.0));
		assert_eq!(wide.spine_down.end(), Point::new(615.0, 531.0));
		assert_eq!(
			(0..4).map(|i| layout.lane_y(i)).collect::<Vec<_>>(),
			vec![75.0, 227.0, 379.0, 531.0]
		);
		assert_eq!(wide.branches[0].end(), Point::new(725.0, 75.0));
		assert_eq!(wide.branches[0].total_length(), 110.0);
	}

	#[test]
	fn test_narrow_layout_coordinates() {
		let layout = Layout::compute(true, 4);
		let Layout::Narrow(narrow) = &layout else {
			panic!("expected narrow layout");
		};
		assert_eq!(narrow.width, 322.0);
		assert_eq!(narrow.height, 976.0);
		assert_eq!(narrow.chain[2], CardSlot::new(96.0, 462.0, 22.0));
		assert_eq!(narrow.leaves[0], CardSlot::new(20.0, 676.0, 18.0));
		assert_eq!(narrow.leaves[3], CardSlot::new(172.0, 828.0, 18.0));
		assert_eq!(narrow.trunk.total_length(), 452.0);
		assert_eq!(narrow.spine.start(), Point::new(161.0, 527.0));
		assert_eq!(narrow.spine.end(), Point::new(161.0, 893.0));
		assert_eq!(narrow.branches[1].end(), Point::new(237.0, 741.0));
		assert_eq!(narrow.branches[2].total_length(), 76.0);
	}

	#[test]
	fn test_layout_is_idempotent() {
		for narrow in [false, true] {
			assert_eq!(Layout::compute(narrow, 4), Layout::compute(narrow, 4));
		}
	}

	#[test]
	fn test_narrow_spine_reaches_every_lane() {
		for leaves in 1..=7 {
			let layout = Layout::compute(true, leaves);
			let spine = layout.spine(SpineDirection::Down);
			for lane in 0..leaves {
				let y = layout.lane_y(lane);
				assert!(y >= spine.start().y && y <= spine.end().y);
			}
		}
	}

	#[test]
	fn test_wide_lanes_split_by_direction() {
		let layout = Layout::compute(false, 4);
		let fan_y = layout.fan_out().y;
		let up: Vec<usize> = (0..4)
			.filter(|&i| SpineDirection::Up.serves(layout.lane_y(i), fan_y))
			.collect();
		let down: Vec<usize> = (0..4)
			.filter(|&i| SpineDirection::Down.serves(layout.lane_y(i), fan_y))
			.collect();
		assert_eq!(up, vec![0, 1]);
		assert_eq!(down, vec![2, 3]);
		assert_eq!(layout.fork_directions().len(), 2);
	}

	#[test]
	fn test_odd_wide_middle_lane_goes_down() {
		let layout = Layout::compute(false, 3);
		assert_eq!(layout.lane_y(1), layout.fan_out().y);
		assert!(SpineDirection::Down.serves(layout.lane_y(1), layout.fan_out().y));
		assert!(!SpineDirection::Up.serves(layout.lane_y(1), layout.fan_out().y));
	}

	#[test]
	fn test_connectors_cover_gaps_and_branches() {
		let wide = Layout::compute(false, 4);
		let wires = wide.connectors();
		assert_eq!(wires.len(), 3 + 1 + 4);
		assert_eq!(wires[0], (Point::new(130.0, 303.0), Point::new(220.0, 303.0)));
		assert_eq!(wires[3], (Point::new(615.0, 75.0), Point::new(615.0, 531.0)));

		let narrow = Layout::compute(true, 4);
		assert_eq!(narrow.connectors().len(), 2 + 1 + 4);
	}

	#[test]
	fn test_card_slot_contains() {
		let slot = CardSlot::new(10.0, 20.0, 18.0);
		assert!(slot.contains(Point::new(10.0, 20.0)));
		assert!(slot.contains(Point::new(140.0, 150.0)));
		assert!(!slot.contains(Point::new(141.0, 80.0)));
	}
}

use log::debug;

use super::config::FlowConfig;
use super::geometry::Point;
use super::layout::{CardSlot, Layout};
use super::simulation::FlowSimulation;
use super::types::{Roster, TeamNode};

/// Maps view-box coordinates onto the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardId {
	Origin,
	Creative,
	Ops,
	Leaf(usize),
}

pub struct FlowDiagramState {
	pub roster: Roster,
	pub layout: Layout,
	pub simulation: FlowSimulation,
	pub transform: ViewTransform,
	pub hover: Option<CardId>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
}

impl FlowDiagramState {
	pub fn new(roster: Roster, config: FlowConfig, narrow: bool, width: f64) -> Self {
		let layout = Layout::compute(narrow, roster.leaves.len());
		let mut state = Self {
			roster,
			layout,
			simulation: FlowSimulation::new(config),
			transform: ViewTransform::default(),
			hover: None,
			width,
			height: 0.0,
			animation_running: true,
		};
		state.resize(width);
		state
	}

	/// Switches layout mode. Packets are tied to the old paths, so they go too.
	pub fn set_narrow(&mut self, narrow: bool) {
		if self.layout.is_narrow() == narrow {
			return;
		}
		debug!(
			"flow diagram switching to {} layout",
			if narrow { "narrow" } else { "wide" }
		);
		self.layout = Layout::compute(narrow, self.roster.leaves.len());
		self.simulation.reset();
		self.hover = None;
		self.resize(self.width);
	}

	/// Fits the view box to `width`; height follows its aspect ratio.
	pub fn resize(&mut self, width: f64) {
		let k = if width > 0.0 {
			width / self.layout.width()
		} else {
			1.0
		};
		self.width = width;
		self.height = self.layout.height() * k;
		self.transform = ViewTransform { x: 0.0, y: 0.0, k };
	}

	pub fn tick(&mut self, dt: f64) {
		if self.animation_running {
			self.simulation.tick(dt, &self.layout);
		}
	}

	pub fn screen_to_layout(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Every card with its slot and node, chain first.
	pub fn cards(&self) -> impl Iterator<Item = (CardId, &CardSlot, &TeamNode)> {
		let [origin, creative, ops] = self.layout.chain_slots();
		[
			(CardId::Origin, origin, &self.roster.origin),
			(CardId::Creative, creative, &self.roster.creative),
			(CardId::Ops, ops, &self.roster.ops),
		]
		.into_iter()
		.chain(
			self.layout
				.leaf_slots()
				.iter()
				.zip(&self.roster.leaves)
				.enumerate()
				.map(|(i, (slot, node))| (CardId::Leaf(i), slot, node)),
		)
	}

	pub fn card_at(&self, sx: f64, sy: f64) -> Option<CardId> {
		let p = self.screen_to_layout(sx, sy);
		self.cards()
			.find(|(_, slot, _)| slot.contains(p))
			.map(|(id, _, _)| id)
	}

	pub fn set_hover(&mut self, card: Option<CardId>) {
		self.hover = card;
	}

	pub fn is_hovered(&self, card: CardId) -> bool {
		self.hover == Some(card)
	}
}

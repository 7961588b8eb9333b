/// Crop tuning for a circular avatar, as percentages of the avatar diameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarCrop {
	pub zoom_percent: f64,
	pub focus_x_percent: f64,
	pub focus_y_percent: f64,
}

impl Default for AvatarCrop {
	fn default() -> Self {
		Self {
			zoom_percent: 165.0,
			focus_x_percent: 50.0,
			focus_y_percent: 50.0,
		}
	}
}

impl AvatarCrop {
	pub fn new(zoom_percent: f64, focus_x_percent: f64, focus_y_percent: f64) -> Self {
		Self {
			zoom_percent,
			focus_x_percent,
			focus_y_percent,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamNode {
	pub name: Option<String>,
	pub role: String,
	pub photo: Option<String>,
	pub initials: Option<String>,
	pub tag: Option<String>,
	pub crop: AvatarCrop,
}

impl TeamNode {
	pub fn new(name: &str, initials: &str) -> Self {
		Self {
			name: Some(name.into()),
			initials: Some(initials.into()),
			..Default::default()
		}
	}

	pub fn with_photo(mut self, photo: &str, crop: AvatarCrop) -> Self {
		self.photo = Some(photo.into());
		self.crop = crop;
		self
	}

	pub fn with_role(mut self, role: &str) -> Self {
		self.role = role.into();
		self
	}

	pub fn with_tag(mut self, tag: &str) -> Self {
		self.tag = Some(tag.into());
		self
	}

	/// Text drawn when there is no usable photo.
	pub fn initials_glyph(&self) -> &str {
		self.initials.as_deref().unwrap_or("")
	}

	pub fn display_name(&self) -> &str {
		self.name.as_deref().unwrap_or("")
	}

	fn has_glyph(&self) -> bool {
		self.photo.is_some() || self.initials.as_deref().is_some_and(|s| !s.is_empty())
	}
}

/// The fixed org chart: studio, two leads, then the team members.
#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
	pub origin: TeamNode,
	pub creative: TeamNode,
	pub ops: TeamNode,
	pub leaves: Vec<TeamNode>,
}

impl Roster {
	pub fn new(origin: TeamNode, creative: TeamNode, ops: TeamNode, leaves: Vec<TeamNode>) -> Self {
		assert!(!leaves.is_empty(), "roster needs at least one team member");
		let roster = Self {
			origin,
			creative,
			ops,
			leaves,
		};
		for node in roster.nodes() {
			assert!(
				node.has_glyph(),
				"node {:?} has neither a photo nor initials",
				node.name
			);
		}
		roster
	}

	pub fn nodes(&self) -> impl Iterator<Item = &TeamNode> {
		[&self.origin, &self.creative, &self.ops]
			.into_iter()
			.chain(self.leaves.iter())
	}
}

impl Default for Roster {
	fn default() -> Self {
		Self::new(
			TeamNode::new("Tanosei Studio", "TS"),
			TeamNode::new("Creative Lead", "S").with_photo(
				"/illustrations/sushan.png",
				AvatarCrop::new(200.0, 60.0, 20.0),
			)
			.with_role("Product-Led Motion")
			.with_tag("Product owner"),
			TeamNode::new("Ops", "OP"),
			vec![
				TeamNode::new("Design Lead", "DL").with_photo(
					"/illustrations/sakshyam.png",
					AvatarCrop::new(195.0, 58.0, 0.0),
				)
				.with_tag("Core"),
				TeamNode::new("Storyboard", "SB").with_photo(
					"/illustrations/sunil.png",
					AvatarCrop::new(110.0, 55.0, 0.0),
				),
				TeamNode::new("Motion Lead", "ML").with_photo(
					"/illustrations/avisek.png",
					AvatarCrop::new(230.0, 50.0, 0.0),
				)
				.with_tag("Core"),
				TeamNode::new("Motion Designer", "MD").with_photo(
					"/illustrations/rohil.png",
					AvatarCrop::new(140.0, 18.0, 0.0),
				),
			],
		)
	}
}

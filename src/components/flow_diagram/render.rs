use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, Path2d};

use super::layout::{CARD_H, CARD_W, CardSlot};
use super::state::{CardId, FlowDiagramState};
use super::types::{AvatarCrop, Roster, TeamNode};

const WIRE_COLOR: &str = "rgba(255, 255, 255, 0.10)";
const CARD_FILL: &str = "rgb(12, 12, 12)";
const STROKE_IDLE: &str = "rgba(255, 255, 255, 0.10)";
const STROKE_HOVER: &str = "rgba(255, 255, 255, 0.22)";
const FONT: &str = "\"DM Sans\", sans-serif";

const AVATAR_RADIUS: f64 = 22.0;
const AVATAR_CY: f64 = 40.0;

// Studio mark, drawn at LOGO_SCALE. Bounding box starts near (71, 67).
const LOGO_PATHS: &[&str] = &[
	"M71.211 258.453L71.211 163.678L71.211 87.162C71.211 74.4614 83.7004 67.488 92.7003 72.6307L152.706 107.171L152.706 265.423L130.571 269.742L130.572 276.101L152.706 271.472L162.723 269.375L274.349 246.21V335.3L152.393 334.675C101.22 334.675 71.211 290.544 71.211 258.453Z",
	"M213.42 193.732L161.703 223.687L161.821 163.659L165.881 161.265C167.856 163.644 169.986 165.935 172.271 168.125C184.107 179.473 198.472 186.554 213.462 189.409L213.42 193.732Z",
];
const LOGO_SCALE: f64 = 0.14;

/// Avatar images and the studio mark, built once per component.
pub struct CardAssets {
	images: HashMap<String, HtmlImageElement>,
	logo: Vec<Path2d>,
	_on_error: Vec<Closure<dyn FnMut()>>,
}

impl CardAssets {
	pub fn load(roster: &Roster) -> Self {
		let mut images = HashMap::new();
		let mut on_error = Vec::new();
		for src in roster.nodes().filter_map(|n| n.photo.as_deref()) {
			if images.contains_key(src) {
				continue;
			}
			let Ok(img) = HtmlImageElement::new() else {
				warn!("could not create image element for {}", src);
				continue;
			};
			let owned = src.to_string();
			let cb = Closure::<dyn FnMut()>::new(move || {
				warn!("avatar {} failed to load, drawing initials", owned);
			});
			img.set_onerror(Some(cb.as_ref().unchecked_ref()));
			img.set_src(src);
			images.insert(src.to_string(), img);
			on_error.push(cb);
		}

		let logo = LOGO_PATHS
			.iter()
			.filter_map(|d| Path2d::new_with_path_string(d).ok())
			.collect();

		Self {
			images,
			logo,
			_on_error: on_error,
		}
	}

	/// The decoded image for `src`, if it finished loading.
	fn ready(&self, src: &str) -> Option<&HtmlImageElement> {
		self.images
			.get(src)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

/// Destination square for an avatar photo inside its clip circle.
///
/// `zoom_percent` scales the photo relative to the circle's diameter and the
/// focus percentages pick which part of the overflow stays visible.
pub fn avatar_rect(crop: &AvatarCrop, cx: f64, cy: f64, r: f64) -> (f64, f64, f64) {
	let size = crop.zoom_percent / 100.0 * (r * 2.0);
	let overflow = size - r * 2.0;
	let x = (cx - r - overflow * crop.focus_x_percent / 100.0).round();
	let y = (cy - r - overflow * crop.focus_y_percent / 100.0).round();
	(x, y, size)
}

pub fn render(state: &FlowDiagramState, assets: &CardAssets, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_connectors(state, ctx);
	draw_packets(state, ctx);
	draw_cards(state, assets, ctx);
	ctx.restore();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	ctx.quadratic_curve_to(x + w, y, x + w, y + r);
	ctx.line_to(x + w, y + h - r);
	ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	ctx.line_to(x + r, y + h);
	ctx.quadratic_curve_to(x, y + h, x, y + h - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}

fn draw_connectors(state: &FlowDiagramState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(WIRE_COLOR);
	ctx.set_line_width(1.5);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(9.0),
	));
	for (a, b) in state.layout.connectors() {
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_packets(state: &FlowDiagramState, ctx: &CanvasRenderingContext2d) {
	for packet in state.simulation.live_packets(&state.layout) {
		if packet.opacity <= 0.0 {
			continue;
		}
		let (x, y) = (packet.position.x, packet.position.y);
		ctx.set_global_alpha(packet.opacity);

		rounded_rect(ctx, x - 6.0, y - 6.0, 12.0, 12.0, 2.5);
		ctx.set_fill_style_str("rgba(140, 200, 255, 0.08)");
		ctx.fill();

		rounded_rect(ctx, x - 3.5, y - 3.5, 7.0, 7.0, 1.6);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_cards(state: &FlowDiagramState, assets: &CardAssets, ctx: &CanvasRenderingContext2d) {
	for (id, slot, node) in state.cards() {
		if id == CardId::Origin {
			draw_studio_card(slot, assets, ctx);
		} else {
			draw_member_card(slot, node, state.is_hovered(id), assets, ctx);
		}
	}
}

fn draw_studio_card(slot: &CardSlot, assets: &CardAssets, ctx: &CanvasRenderingContext2d) {
	rounded_rect(ctx, slot.x, slot.y, CARD_W, CARD_H, slot.radius);
	ctx.set_fill_style_str(CARD_FILL);
	ctx.fill();
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.14)");
	ctx.set_line_width(1.0);
	ctx.stroke();

	// centre the ~28x38 rendered mark
	let ox = (CARD_W / 2.0 - 14.0 - 71.0 * LOGO_SCALE).round();
	let oy = (CARD_H / 2.0 - 19.0 - 67.0 * LOGO_SCALE).round();
	ctx.save();
	let _ = ctx.translate(slot.x + ox, slot.y + oy);
	let _ = ctx.scale(LOGO_SCALE, LOGO_SCALE);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.86)");
	for path in &assets.logo {
		ctx.fill_with_path_2d(path);
	}
	ctx.restore();
}

fn draw_member_card(
	slot: &CardSlot,
	node: &TeamNode,
	hovered: bool,
	assets: &CardAssets,
	ctx: &CanvasRenderingContext2d,
) {
	rounded_rect(ctx, slot.x, slot.y, CARD_W, CARD_H, slot.radius);
	ctx.set_fill_style_str(CARD_FILL);
	ctx.fill();
	ctx.set_stroke_style_str(if hovered { STROKE_HOVER } else { STROKE_IDLE });
	ctx.set_line_width(1.0);
	ctx.stroke();

	let cx = slot.x + CARD_W / 2.0;
	draw_avatar(node, cx, slot.y + AVATAR_CY, hovered, assets, ctx);

	ctx.set_text_align("center");
	ctx.set_font(&format!("800 12px {}", FONT));
	ctx.set_fill_style_str(if hovered {
		"rgba(255, 255, 255, 0.78)"
	} else {
		"rgba(255, 255, 255, 0.50)"
	});
	let _ = ctx.fill_text(node.display_name(), cx, slot.y + 83.0);

	if !node.role.is_empty() {
		ctx.set_font(&format!("9.5px {}", FONT));
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.22)");
		let _ = ctx.fill_text(&node.role, cx, slot.y + 100.0);
	}

	if let Some(tag) = &node.tag {
		draw_tag(tag, cx, slot.y + 108.0, ctx);
	}
	ctx.set_text_align("start");
}

fn draw_avatar(
	node: &TeamNode,
	cx: f64,
	cy: f64,
	hovered: bool,
	assets: &CardAssets,
	ctx: &CanvasRenderingContext2d,
) {
	let r = AVATAR_RADIUS;
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.04)");
	ctx.fill();
	ctx.set_stroke_style_str(if hovered {
		"rgba(255, 255, 255, 0.18)"
	} else {
		"rgba(255, 255, 255, 0.10)"
	});
	ctx.set_line_width(1.0);
	ctx.stroke();

	// Missing or broken photos fall back to initials.
	let Some(img) = node.photo.as_deref().and_then(|src| assets.ready(src)) else {
		ctx.set_text_align("center");
		ctx.set_font(&format!("800 13px {}", FONT));
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.55)");
		let _ = ctx.fill_text(node.initials_glyph(), cx, cy + 6.0);
		return;
	};

	let (dx, dy, size) = avatar_rect(&node.crop, cx, cy, r);
	// "slice" fit: centre square of the source
	let (nw, nh) = (img.natural_width() as f64, img.natural_height() as f64);
	let side = nw.min(nh);
	ctx.save();
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
	ctx.clip();
	let _ = ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
		img,
		(nw - side) / 2.0,
		(nh - side) / 2.0,
		side,
		side,
		dx,
		dy,
		size,
		size,
	);
	ctx.restore();

	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("rgba(0, 0, 0, 0.06)");
	ctx.fill();
}

fn draw_tag(tag: &str, cx: f64, top: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(&format!("700 8px {}", FONT));
	let text_w = ctx.measure_text(tag).map(|m| m.width()).unwrap_or(40.0);
	let (w, h) = (text_w + 14.0, 15.0);
	rounded_rect(ctx, cx - w / 2.0, top, w, h, h / 2.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.06)");
	ctx.fill();
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.12)");
	ctx.set_line_width(1.0);
	ctx.stroke();
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.55)");
	let _ = ctx.fill_text(tag, cx, top + 10.5);
}

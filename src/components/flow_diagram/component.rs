use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::config::FlowConfig;
use super::render::{self, CardAssets};
use super::state::FlowDiagramState;
use super::types::Roster;

fn is_narrow(window: &Window, breakpoint: f64) -> bool {
	window
		.inner_width()
		.ok()
		.and_then(|w| w.as_f64())
		.is_some_and(|w| w <= breakpoint)
}

fn prefers_reduced_motion(window: &Window) -> bool {
	window
		.match_media("(prefers-reduced-motion: reduce)")
		.ok()
		.flatten()
		.is_some_and(|mq| mq.matches())
}

fn fit_width(canvas: &HtmlCanvasElement, max_width: f64) -> f64 {
	canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(max_width)
		.min(max_width)
}

fn size_canvas(canvas: &HtmlCanvasElement, state: &FlowDiagramState) {
	canvas.set_width(state.width as u32);
	canvas.set_height(state.height.ceil() as u32);
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// The browser callbacks one mounted diagram keeps alive.
#[derive(Clone, Default)]
struct FrameLoop {
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	resize: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
	fn listen_resize(&self, window: &Window, cb: Closure<dyn FnMut()>) {
		let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		*self.resize.borrow_mut() = Some(cb);
	}

	fn request_frame(&self, window: &Window) {
		if let Some(ref cb) = *self.animate.borrow() {
			self.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	}

	/// Cancels the pending frame, detaches the resize listener and drops both
	/// closures, which breaks the animate closure's reference to itself.
	fn stop(&self) {
		let window = web_sys::window();
		if let (Some(id), Some(win)) = (self.frame.take(), &window) {
			let _ = win.cancel_animation_frame(id);
		}
		if let (Some(cb), Some(win)) = (self.resize.borrow_mut().take(), &window) {
			let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		self.animate.borrow_mut().take();
	}
}

#[component]
pub fn FlowDiagramCanvas(
	#[prop(into)] roster: Signal<Roster>,
	#[prop(default = 980.0)] max_width: f64,
	#[prop(default = 860.0)] breakpoint: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<FlowDiagramState>>> = Rc::new(RefCell::new(None));
	let frame_loop = FrameLoop::default();
	let (state_init, loop_init) = (state.clone(), frame_loop.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		// tracked: a new roster rebuilds the diagram from scratch
		let roster = roster.get();
		if loop_init.animate.borrow().is_some() {
			debug!("flow diagram roster changed, restarting");
		}
		loop_init.stop();

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("flow diagram: no window");
			return;
		};
		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			error!("flow diagram: canvas has no 2d context");
			return;
		};

		let assets = CardAssets::load(&roster);
		let narrow = is_narrow(&window, breakpoint);
		let mut initial = FlowDiagramState::new(
			roster,
			FlowConfig::default(),
			narrow,
			fit_width(&canvas, max_width),
		);
		initial.animation_running = !prefers_reduced_motion(&window);
		size_canvas(&canvas, &initial);
		info!(
			"flow diagram mounted ({} layout, {} members)",
			if narrow { "narrow" } else { "wide" },
			initial.roster.leaves.len()
		);
		*state_init.borrow_mut() = Some(initial);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		loop_init.listen_resize(
			&window,
			Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.set_narrow(is_narrow(&win, breakpoint));
					s.resize(fit_width(&canvas_resize, max_width));
					size_canvas(&canvas_resize, s);
				}
			}),
		);

		let (state_anim, loop_anim) = (state_init.clone(), loop_init.clone());
		let mut last_ts: Option<f64> = None;
		*loop_init.animate.borrow_mut() = Some(Closure::new(move |ts: f64| {
			let dt = last_ts.map_or(0.0, |prev| (ts - prev) / 1000.0);
			last_ts = Some(ts);
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(dt);
				render::render(s, &assets, &ctx);
			}
			if let Some(win) = web_sys::window() {
				loop_anim.request_frame(&win);
			}
		}));
		loop_init.request_frame(&window);
	});

	let loop_cleanup = SendWrapper::new(frame_loop);
	on_cleanup(move || {
		debug!("flow diagram unmounted");
		loop_cleanup.stop();
	});

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			let card = s.card_at(x, y);
			s.set_hover(card);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.set_hover(None);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="flow-diagram-canvas"
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			style="display: block; margin: 0 auto; cursor: default;"
		/>
	}
}

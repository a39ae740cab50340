use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::{self, IconSet};
use super::state::NetworkViewState;
use crate::config::ViewerConfig;
use crate::data::Network;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type ResizeCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Liveness flag shared by the owner's cleanup and the frame loop.
/// `on_cleanup` needs it to be `Send + Sync`.
#[derive(Clone, Debug)]
struct Mounted(Arc<AtomicBool>);

impl Mounted {
	fn new() -> Self {
		Self(Arc::new(AtomicBool::new(true)))
	}

	fn unmount(&self) {
		self.0.store(false, Ordering::Relaxed);
	}

	fn is_mounted(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

/// Stop drawing: detach the resize listener and release the view state.
fn shut_down(
	window: &Window,
	state: &Rc<RefCell<Option<NetworkViewState>>>,
	resize_cb: &ResizeCallback,
) {
	if let Some(cb) = resize_cb.borrow_mut().take() {
		if let Err(err) =
			window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
		{
			error!("Resize listener not removed: {err:?}");
		}
	}
	state.borrow_mut().take();
	info!("Network canvas unmounted, animation stopped");
}

/// Canvas showing one network: layout, background traffic and the best path.
/// Every change of `run_requests` restarts the path animation.
#[component]
pub fn NetworkCanvas(
	network: Network,
	#[prop(into)] run_requests: Signal<u32>,
	#[prop(optional)] config: ViewerConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<NetworkViewState>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: ResizeCallback = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	// Cleared on unmount; the frame loop sees it and shuts itself down.
	let mounted = Mounted::new();
	let mounted_cleanup = mounted.clone();
	on_cleanup(move || mounted_cleanup.unmount());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("No window; network canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has an unexpected type");
					return;
				}
			},
			_ => {
				error!("Canvas 2d context unavailable");
				return;
			}
		};

		let seed = js_sys::Date::now() as u64;
		let view_state = NetworkViewState::new(&network, &config, w, h, seed);
		let icons = IconSet::load(&view_state.scene);
		info!(
			"Rendering {} nodes, {} edges, {} path edges",
			view_state.scene.nodes().len(),
			view_state.scene.edges().len(),
			view_state.path.path_edges().len()
		);
		*state_init.borrow_mut() = Some(view_state);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				if let Err(err) =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
				{
					error!("Resize listener not attached: {err:?}");
				}
			}
		}

		let (state_anim, animate_inner, resize_inner, mounted) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			mounted.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let Some(win) = web_sys::window() else {
				return;
			};
			if !mounted.is_mounted() {
				shut_down(&win, &state_anim, &resize_inner);
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(now);
				render::render(s, &icons, &ctx);
			}
			if let Some(cb) = animate_inner.borrow().as_ref() {
				if let Err(err) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					error!("Animation frame not scheduled: {err:?}");
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Err(err) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				error!("Animation loop not started: {err:?}");
			}
		}
	});

	let state_run = state.clone();
	Effect::new(move |previous: Option<u32>| {
		let requested = run_requests.get();
		if previous.is_some_and(|p| p != requested) {
			if let Some(ref mut s) = *state_run.borrow_mut() {
				s.run_path();
				if s.run_queued() {
					info!("Path run waits for the first frame");
					return requested;
				}
				info!(
					"Path run {} started at {:.0} ms with {} packets",
					s.path.runs(),
					s.now(),
					s.path.in_flight().len()
				);
			}
		}
		requested
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			match s.node_at_position(x, y) {
				Some(slot) => s.begin_drag(slot, x, y),
				None => s.begin_pan(x, y),
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
			} else {
				s.pan_to(x, y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.end_gestures();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_gestures();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unmount_is_seen_by_every_clone() {
		let mounted = Mounted::new();
		let in_loop = mounted.clone();
		assert!(in_loop.is_mounted());
		mounted.unmount();
		assert!(!in_loop.is_mounted());
		assert!(!mounted.is_mounted());
	}
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent,
	TouchEvent, WheelEvent, Window,
};

use super::config::GraphConfig;
use super::layout_store::LayoutStore;
use super::radial::DayFocus;
use super::render;
use super::state::{GraphController, GraphEvent};
use super::types::{Day, GraphData, LayoutMode, Point};

/// A DOM listener that is removed from its target when dropped.
pub struct ListenerGuard {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl ListenerGuard {
	pub fn new(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(web_sys::Event) + 'static,
	) -> Result<Self, JsValue> {
		let callback = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
		target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Held for as long as the canvas is mounted. Dropping it detaches every
/// listener and stops the frame loop on its next tick.
struct Subscriptions {
	_listeners: Vec<ListenerGuard>,
	running: Rc<Cell<bool>>,
}

impl Drop for Subscriptions {
	fn drop(&mut self) {
		self.running.set(false);
	}
}

struct Surface {
	controller: GraphController,
	focus: DayFocus,
}

type SharedSurface = Rc<RefCell<Surface>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(800.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(600.0),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
	canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("2d context unavailable"))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(JsValue::from)
}

fn local_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	client_x: i32,
	client_y: i32,
) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
	))
}

/// Forwards queued controller events to the host. Focus requests also start
/// the rotation animation. The surface borrow is released before the host
/// callback runs.
fn flush(surface: &SharedSurface, on_event: Option<Callback<GraphEvent>>) {
	let events = {
		let mut s = surface.borrow_mut();
		let events = s.controller.drain_events();
		for event in &events {
			if let GraphEvent::FocusDay {
				rotation_deg,
				duration_ms,
				revert_after_ms,
				..
			} = event
			{
				s.focus.start(
					*rotation_deg,
					js_sys::Date::now(),
					*duration_ms,
					*revert_after_ms,
				);
			}
		}
		events
	};
	for event in events {
		debug!("graph event: {event:?}");
		if let Some(on_event) = on_event {
			on_event.run(event);
		}
	}
}

fn request_frame(callback: &FrameCallback) {
	if let (Some(window), Some(cb)) = (web_sys::window(), callback.borrow().as_ref()) {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}

fn start_frame_loop(surface: SharedSurface, ctx: CanvasRenderingContext2d, running: Rc<Cell<bool>>) {
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let animate_inner = animate.clone();
	*animate.borrow_mut() = Some(Closure::new(move || {
		if !running.get() {
			let _ = animate_inner.borrow_mut().take();
			return;
		}
		{
			let mut s = surface.borrow_mut();
			let rotation = s.focus.advance(js_sys::Date::now());
			s.controller.set_rotation(rotation);
			let (w, h) = s.controller.viewport();
			let pivot = s.controller.rotation_pivot();
			render::render(&s.controller.frame(), &ctx, w, h, rotation, pivot);
		}
		request_frame(&animate_inner);
	}));
	request_frame(&animate);
}

/// Canvas surface for a conflict graph or a weekly radial graph.
///
/// Changing `data` or `dataset` re-activates the view; positions persist per
/// dataset through `store` (browser storage by default, memory when that is
/// unavailable).
#[component]
pub fn RoutineGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] dataset: Signal<String>,
	#[prop(default = LayoutMode::Circular)] mode: LayoutMode,
	#[prop(optional)] config: Option<GraphConfig>,
	#[prop(optional)] store: Option<LayoutStore>,
	#[prop(optional, into)] selected_day: Option<Signal<Option<Day>>>,
	/// Each change of this counter asks the host to export the current view.
	#[prop(optional, into)]
	export_requests: Option<Signal<u32>>,
	#[prop(optional, into)] on_event: Option<Callback<GraphEvent>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let config = match config.validate() {
		Ok(()) => config,
		Err(err) => {
			error!("Invalid graph config, using defaults: {err}");
			GraphConfig::default()
		}
	};
	let store = store.unwrap_or_else(|| {
		LayoutStore::browser_or_memory(&config.storage_namespace, config.schema_version)
	});

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: SharedSurface = Rc::new(RefCell::new(Surface {
		controller: GraphController::new(config, mode, store, 800.0, 600.0),
		focus: DayFocus::default(),
	}));
	let subscriptions = StoredValue::new_local(None::<Subscriptions>);
	on_cleanup(move || {
		let _ = subscriptions.try_update_value(|s| s.take());
	});

	let surface_init = surface.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let graph = data.get();
		let key = dataset.get();
		let canvas: HtmlCanvasElement = canvas.into();

		if subscriptions.with_value(Option::is_none) {
			let Some(window) = web_sys::window() else {
				error!("No window; graph canvas not mounted");
				return;
			};
			let (w, h) = if fullscreen {
				window_size(&window)
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
			let ctx = match context_2d(&canvas) {
				Ok(ctx) => ctx,
				Err(err) => {
					error!("Cannot draw graph: {err:?}");
					return;
				}
			};
			surface_init.borrow_mut().controller.resize(w, h);

			let mut listeners = Vec::new();
			if fullscreen {
				let (surface_resize, canvas_resize) = (surface_init.clone(), canvas.clone());
				let guard = ListenerGuard::new(&window, "resize", move |_| {
					let Some(win) = web_sys::window() else {
						return;
					};
					let (nw, nh) = window_size(&win);
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					surface_resize.borrow_mut().controller.resize(nw, nh);
				});
				match guard {
					Ok(guard) => listeners.push(guard),
					Err(err) => error!("Cannot listen for resize: {err:?}"),
				}
			}

			let running = Rc::new(Cell::new(true));
			start_frame_loop(surface_init.clone(), ctx, running.clone());
			subscriptions.set_value(Some(Subscriptions {
				_listeners: listeners,
				running,
			}));
		}

		surface_init.borrow_mut().controller.activate(&key, graph);
	});

	if let Some(selected_day) = selected_day {
		let surface_day = surface.clone();
		Effect::new(move |_| {
			if let Some(day) = selected_day.get() {
				surface_day.borrow_mut().controller.select_day(day);
				flush(&surface_day, on_event);
			}
		});
	}

	if let Some(export_requests) = export_requests {
		let surface_export = surface.clone();
		Effect::new(move |_| {
			if export_requests.get() > 0 {
				surface_export.borrow_mut().controller.request_export();
				flush(&surface_export, on_event);
			}
		});
	}

	let surface_md = surface.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		surface_md.borrow_mut().controller.pointer_down(p);
		flush(&surface_md, on_event);
	};

	let surface_mm = surface.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		surface_mm.borrow_mut().controller.pointer_move(p);
		flush(&surface_mm, on_event);
	};

	let surface_mu = surface.clone();
	let on_mouseup = move |_: MouseEvent| {
		surface_mu.borrow_mut().controller.pointer_up();
		flush(&surface_mu, on_event);
	};

	let surface_ml = surface.clone();
	let on_mouseleave = move |_: MouseEvent| {
		surface_ml.borrow_mut().controller.pointer_leave_canvas();
		flush(&surface_ml, on_event);
	};

	let surface_wh = surface.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		surface_wh.borrow_mut().controller.wheel(p, ev.delta_y());
	};

	let surface_ts = surface.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let Some(touch) = ev.touches().get(0) else {
			return;
		};
		let Some(p) = local_point(canvas_ref, touch.client_x(), touch.client_y()) else {
			return;
		};
		let mut s = surface_ts.borrow_mut();
		// Touch has no hover; resolve the node under the finger first.
		if let Some(i) = s.controller.node_at(p) {
			let id = s.controller.nodes()[i].id.clone();
			s.controller.pointer_enter(&id);
		}
		s.controller.pointer_down(p);
		drop(s);
		flush(&surface_ts, on_event);
	};

	let surface_tm = surface.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(touch) = ev.touches().get(0) else {
			return;
		};
		let Some(p) = local_point(canvas_ref, touch.client_x(), touch.client_y()) else {
			return;
		};
		surface_tm.borrow_mut().controller.pointer_move(p);
		flush(&surface_tm, on_event);
	};

	let surface_te = surface.clone();
	let on_touchend = move |_: TouchEvent| {
		let mut s = surface_te.borrow_mut();
		s.controller.pointer_up();
		s.controller.pointer_leave_canvas();
		drop(s);
		flush(&surface_te, on_event);
	};

	let surface_kd = surface.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		let consumed = {
			let mut s = surface_kd.borrow_mut();
			match ev.key().as_str() {
				// Running off either end lets the browser move focus on.
				"Tab" if ev.shift_key() => s.controller.focus_prev(),
				"Tab" => s.controller.focus_next(),
				"Escape" => {
					s.controller.blur();
					false
				}
				key => s.controller.key_down(key),
			}
		};
		if consumed {
			ev.prevent_default();
		}
		flush(&surface_kd, on_event);
	};

	let surface_bl = surface.clone();
	let on_blur = move |_| {
		surface_bl.borrow_mut().controller.blur();
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="routine-graph-canvas"
			tabindex="0"
			role="img"
			aria-label=move || format!("{} graph", dataset.get())
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:keydown=on_keydown
			on:blur=on_blur
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

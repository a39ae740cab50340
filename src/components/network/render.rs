use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::geometry::Point;
use super::scene::{NodeRole, Scene};
use super::state::NetworkViewState;
use super::style::{ICON_SIZE, LABEL_OFFSET, NODE_RADIUS, NODE_STROKE};

const BACKGROUND: &str = "#0f172a";
const EDGE_COLOR: &str = "#475569";
const ACTIVE_EDGE_COLOR: &str = "#22c55e";
const BG_PACKET_COLOR: &str = "#38bdf8";
const PATH_PACKET_COLOR: &str = "#f97316";
const LABEL_COLOR: &str = "#e5e7eb";

/// Icon images, one per asset path, created once per mounted canvas.
#[derive(Default)]
pub struct IconSet {
	images: HashMap<&'static str, HtmlImageElement>,
}

impl IconSet {
	pub fn load(scene: &Scene) -> Self {
		let mut images = HashMap::new();
		for src in scene.nodes().iter().filter_map(|n| n.icon) {
			if images.contains_key(src) {
				continue;
			}
			match HtmlImageElement::new() {
				Ok(img) => {
					img.set_src(src);
					images.insert(src, img);
				}
				Err(e) => warn!("Could not create image for {src}: {e:?}"),
			}
		}
		Self { images }
	}

	/// The image for `src` once it has finished loading.
	fn ready(&self, src: &str) -> Option<&HtmlImageElement> {
		self.images
			.get(src)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

pub fn render(state: &NetworkViewState, icons: &IconSet, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_packets(ctx, state.background_packets(), BG_PACKET_COLOR);
	draw_packets(ctx, state.path_packets(), PATH_PACKET_COLOR);
	draw_nodes(state, icons, ctx);
	ctx.restore();
}

fn draw_edges(state: &NetworkViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for edge in state.scene.edges() {
		let seg = edge.segment;
		let active = state.path.is_active(edge.handle);
		if active {
			ctx.set_stroke_style_str(ACTIVE_EDGE_COLOR);
			ctx.set_line_width(3.0);
		} else {
			ctx.set_stroke_style_str(EDGE_COLOR);
			ctx.set_line_width(1.5);
		}
		ctx.begin_path();
		ctx.move_to(seg.start.x, seg.start.y);
		ctx.line_to(seg.end.x, seg.end.y);
		ctx.stroke();

		if let Some(caption) = &edge.caption {
			let mid = seg.point_at_length(seg.total_length() / 2.0);
			ctx.set_fill_style_str(EDGE_COLOR);
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(caption, mid.x, mid.y - 4.0);
		}
	}
}

fn draw_packets(
	ctx: &CanvasRenderingContext2d,
	packets: impl Iterator<Item = (Point, f64)>,
	color: &str,
) {
	ctx.set_fill_style_str(color);
	for (p, radius) in packets {
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.fill();
	}
}

fn draw_nodes(state: &NetworkViewState, icons: &IconSet, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for node in state.scene.nodes() {
		let (x, y) = (node.position.x, node.position.y);

		if node.role != NodeRole::Plain {
			ctx.begin_path();
			let _ = ctx.arc(x, y, NODE_RADIUS + 5.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(if node.role == NodeRole::Start {
				"#a78bfa"
			} else {
				"#f472b6"
			});
			ctx.set_line_width(2.5);
			ctx.stroke();
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		if let Some(fill) = node.fill {
			ctx.set_fill_style_str(fill);
			ctx.fill();
		}
		ctx.set_stroke_style_str(NODE_STROKE);
		ctx.set_line_width(1.5);
		ctx.stroke();

		if let Some(img) = node.icon.and_then(|src| icons.ready(src)) {
			let half = ICON_SIZE / 2.0;
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				img,
				x - half,
				y - half,
				ICON_SIZE,
				ICON_SIZE,
			);
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(0.5)));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&node.label, x, y + LABEL_OFFSET);
		if let Some(detail) = &node.detail {
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			let _ = ctx.fill_text(detail, x, y + LABEL_OFFSET + 12.0);
		}
	}
}

use super::types::Point;

/// Uniform scale plus translation: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: ViewTransform = ViewTransform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	pub fn screen_to_graph(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}
}

/// Turns `p` about `pivot` by `degrees`, clockwise on screen (y grows
/// downwards), the same sense as a canvas `rotate`.
pub fn rotate_about(p: Point, pivot: Point, degrees: f64) -> Point {
	if degrees == 0.0 {
		return p;
	}
	let (sin, cos) = degrees.to_radians().sin_cos();
	let d = p - pivot;
	Point::new(
		pivot.x + d.x * cos - d.y * sin,
		pivot.y + d.x * sin + d.y * cos,
	)
}

/// Inclusive zoom bounds. Translation is never bounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
	pub min: f64,
	pub max: f64,
}

impl Default for ZoomLimits {
	fn default() -> Self {
		Self { min: 0.5, max: 3.0 }
	}
}

impl ZoomLimits {
	pub fn clamp(&self, k: f64) -> f64 {
		if k.is_nan() {
			return self.min;
		}
		k.clamp(self.min, self.max)
	}

	/// Sets the scale to `requested` (clamped) keeping the graph point under
	/// `anchor` fixed on screen.
	pub fn zoom_about(&self, transform: &mut ViewTransform, anchor: Point, requested: f64) {
		let new_k = self.clamp(requested);
		let ratio = new_k / transform.k;
		transform.x = anchor.x - (anchor.x - transform.x) * ratio;
		transform.y = anchor.y - (anchor.y - transform.y) * ratio;
		transform.k = new_k;
	}
}

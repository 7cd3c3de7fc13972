// Viewport camera: map metres <-> canvas pixels (y axis flipped)
use crate::msg::geometry_msgs::Quaternion;

const ZOOM_MIN: f64 = 2.0;
const ZOOM_MAX: f64 = 800.0;

/// A point in the map frame, metres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for MapPoint {
    type Output = MapPoint;
    fn sub(self, rhs: MapPoint) -> MapPoint {
        MapPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A point on the canvas, pixels from the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    /// Pixels per metre.
    pub zoom: f64,
    /// Canvas position of the map origin.
    pub offset_x: f64,
    pub offset_y: f64,
    pub panning: bool,
    pub last_x: f64,
    pub last_y: f64,
    /// Set once the camera has been fitted to a map.
    pub initialized: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 40.0,
            offset_x: 0.0,
            offset_y: 0.0,
            panning: false,
            last_x: 0.0,
            last_y: 0.0,
            initialized: false,
        }
    }
}

impl Camera {
    pub fn screen_to_map(&self, p: ScreenPoint) -> MapPoint {
        MapPoint::new(
            (p.x - self.offset_x) / self.zoom,
            (self.offset_y - p.y) / self.zoom,
        )
    }

    pub fn map_to_screen(&self, p: MapPoint) -> ScreenPoint {
        ScreenPoint::new(
            p.x * self.zoom + self.offset_x,
            self.offset_y - p.y * self.zoom,
        )
    }

    /// Zoom around a canvas point so it keeps showing the same map point.
    pub fn zoom_at(&mut self, at: ScreenPoint, wheel_delta: f64) {
        let anchor = self.screen_to_map(at);
        let zoom_change = (-wheel_delta * 0.001).exp();
        self.zoom = (self.zoom * zoom_change).clamp(ZOOM_MIN, ZOOM_MAX);
        self.offset_x = at.x - anchor.x * self.zoom;
        self.offset_y = at.y + anchor.y * self.zoom;
    }

    pub fn begin_pan(&mut self, x: f64, y: f64) {
        self.panning = true;
        self.last_x = x;
        self.last_y = y;
    }

    pub fn pan_to(&mut self, x: f64, y: f64) {
        if !self.panning {
            return;
        }
        self.offset_x += x - self.last_x;
        self.offset_y += y - self.last_y;
        self.last_x = x;
        self.last_y = y;
    }

    /// Show the map rectangle `[min, min + size]` centred on the canvas.
    pub fn fit(&mut self, min: MapPoint, size_x: f64, size_y: f64, canvas_w: f64, canvas_h: f64) {
        if size_x <= 0.0 || size_y <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }
        self.zoom = (canvas_w / size_x).min(canvas_h / size_y).clamp(ZOOM_MIN, ZOOM_MAX);
        let cx = min.x + size_x * 0.5;
        let cy = min.y + size_y * 0.5;
        self.offset_x = canvas_w * 0.5 - cx * self.zoom;
        self.offset_y = canvas_h * 0.5 + cy * self.zoom;
        self.initialized = true;
    }
}

/// Screen rotation in degrees (clockwise, canvas convention) for a map-frame
/// orientation.
pub fn quaternion_to_screen_angle(q: &Quaternion) -> f64 {
    -q.yaw().to_degrees()
}

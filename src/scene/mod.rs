//! Retained scene: everything the canvas shows, independent of how it is
//! drawn.

mod layer;
pub mod render;

pub use layer::Layer;

use crate::msg::nav_msgs::OccupancyGrid;
use crate::state::{Camera, MapPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// Live robot pose.
    Robot,
    /// Last submitted goal.
    Goal,
    /// Heading preview while dragging.
    Orientation,
}

/// Bitmap marker geometry, used when a marker image is configured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageStyle {
    /// Side length in metres.
    pub size: f64,
    pub alpha: f64,
    pub pulse: bool,
}

impl MarkerKind {
    pub fn image_style(self) -> ImageStyle {
        match self {
            MarkerKind::Robot => ImageStyle {
                size: 2.0,
                alpha: 1.0,
                pulse: true,
            },
            MarkerKind::Goal => ImageStyle {
                size: 2.5,
                alpha: 0.7,
                pulse: true,
            },
            MarkerKind::Orientation => ImageStyle {
                size: 2.5,
                alpha: 0.7,
                pulse: false,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: MapPoint,
    /// Screen rotation in degrees, clockwise.
    pub rotation: f64,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            kind,
            position: MapPoint::default(),
            rotation: 0.0,
        }
    }

    pub fn place(&mut self, position: MapPoint, rotation: f64) {
        self.position = position;
        self.rotation = rotation;
    }
}

/// Occupancy grid converted to RGBA, north up.
#[derive(Clone, Debug, PartialEq)]
pub struct GridImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    /// Map position of the lower-left corner of cell (0,0).
    pub origin: MapPoint,
    /// Metres per cell.
    pub resolution: f64,
    /// Bumped on every new map so renderers can cache the bitmap.
    pub version: u64,
}

const OCCUPIED: u8 = 0;
const FREE: u8 = 255;
const UNKNOWN: u8 = 127;
/// Largest map accepted, in cells.
pub const MAX_GRID_CELLS: usize = 1 << 26;

impl GridImage {
    /// `None` when the declared size cannot be allocated as a bitmap.
    pub fn from_grid(grid: &OccupancyGrid, version: u64) -> Option<Self> {
        let w = usize::try_from(grid.info.width).ok()?;
        let h = usize::try_from(grid.info.height).ok()?;
        let cells = w.checked_mul(h).filter(|&n| n <= MAX_GRID_CELLS)?;
        let mut rgba = vec![0u8; cells.checked_mul(4)?];
        for row in 0..h {
            // ROS rows start at the map origin (bottom); image rows start at the top
            let dst_row = h - 1 - row;
            for col in 0..w {
                let value = grid.data.get(row * w + col).copied().unwrap_or(-1);
                let shade = match value {
                    100 => OCCUPIED,
                    0 => FREE,
                    _ => UNKNOWN,
                };
                let i = (dst_row * w + col) * 4;
                rgba[i..i + 4].copy_from_slice(&[shade, shade, shade, 255]);
            }
        }
        let origin = &grid.info.origin.position;
        Some(Self {
            width: grid.info.width,
            height: grid.info.height,
            rgba,
            origin: MapPoint::new(origin.x, origin.y),
            resolution: grid.info.resolution as f64,
            version,
        })
    }

    /// Map extent in metres.
    pub fn size(&self) -> (f64, f64) {
        (
            self.width as f64 * self.resolution,
            self.height as f64 * self.resolution,
        )
    }
}

pub struct Scene {
    pub camera: Camera,
    pub grid: Layer<GridImage>,
    pub cloud: Layer<Vec<MapPoint>>,
    pub path: Layer<Vec<MapPoint>>,
    pub robot: Layer<Marker>,
    pub goal: Layer<Marker>,
    pub preview: Layer<Marker>,
    pub show_cloud: bool,
    pub show_path: bool,
    /// URL of the bitmap used for markers; vector shapes when unset.
    pub marker_image: Option<String>,
    /// Canvas size in pixels, kept current by the view.
    pub canvas_size: (f64, f64),
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            grid: Layer::default(),
            cloud: Layer::default(),
            path: Layer::default(),
            robot: Layer::default(),
            goal: Layer::default(),
            preview: Layer::default(),
            show_cloud: true,
            show_path: true,
            marker_image: None,
            canvas_size: (600.0, 600.0),
        }
    }
}

impl Scene {
    /// Frame the current map on the canvas.
    pub fn fit_to_grid(&mut self) {
        let Some(grid) = self.grid.get() else {
            return;
        };
        let (w, h) = grid.size();
        let origin = grid.origin;
        let (cw, ch) = self.canvas_size;
        self.camera.fit(origin, w, h, cw, ch);
    }
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::AppContext;
use crate::msg::nav_msgs::OccupancyGrid;
use crate::scene::{GridImage, Scene};
use crate::transport::Topic;

/// Keeps the scene's map layer in sync with the occupancy grid topic.
pub struct GridClient {
    scene: Rc<RefCell<Scene>>,
    maps: Cell<u64>,
}

impl GridClient {
    pub fn new(ctx: &AppContext) -> Rc<Self> {
        let client = Rc::new(Self {
            scene: ctx.scene.clone(),
            maps: Cell::new(0),
        });
        let weak = Rc::downgrade(&client);
        Topic::<OccupancyGrid>::new(&ctx.ros, ctx.config.map_topic.as_str()).subscribe(
            move |grid| {
                if let Some(client) = weak.upgrade() {
                    client.show(&grid);
                }
            },
        );
        client
    }

    fn show(&self, grid: &OccupancyGrid) {
        let version = self.maps.get() + 1;
        let Some(image) = GridImage::from_grid(grid, version) else {
            tracing::warn!(
                "skipping {}x{} map: too large to draw",
                grid.info.width,
                grid.info.height
            );
            return;
        };
        self.maps.set(version);
        tracing::info!(
            "map {}x{} at {} m/cell",
            image.width,
            image.height,
            image.resolution
        );
        let mut scene = self.scene.borrow_mut();
        scene.grid.replace(image);
        if !scene.camera.initialized {
            scene.fit_to_grid();
        }
    }
}

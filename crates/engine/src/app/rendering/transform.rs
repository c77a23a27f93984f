use crate::app::{Camera, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Projects a world point onto the screen of a top-down camera. World +x is
/// screen right and world +z is screen up; height (y) is ignored.
pub fn world_to_screen_px(camera: &Camera, window_size: (u32, u32), world: Vec3) -> (i32, i32) {
    let pixels_per_world = camera_pixels_per_world(camera);
    let x = (world.x - camera.center.x) * pixels_per_world + window_size.0 as f32 * 0.5;
    let y = window_size.1 as f32 * 0.5 - (world.z - camera.center.z) * pixels_per_world;
    (x.round() as i32, y.round() as i32)
}

pub(crate) fn camera_pixels_per_world(camera: &Camera) -> f32 {
    if camera.pixels_per_world.is_finite() && camera.pixels_per_world > f32::EPSILON {
        camera.pixels_per_world
    } else {
        crate::app::scene::CAMERA_PIXELS_PER_WORLD_DEFAULT
    }
}

use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{BoundsOverlay, Camera, RenderableKind, SceneWorld, Vec3, VisualObject};

use super::transform::camera_pixels_per_world;
use super::{world_to_screen_px, Viewport, PLACEHOLDER_HALF_SIZE_PX};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];
const GRID_CELL_WORLD: f32 = 2.0;
const GRID_MAJOR_EVERY: i32 = 5;
const GRID_MINOR_COLOR: [u8; 4] = [35, 39, 46, 255];
const GRID_MAJOR_COLOR: [u8; 4] = [52, 58, 70, 255];
const BOUNDS_COLOR: [u8; 4] = [200, 90, 90, 255];
const ANIMATED_HIGHLIGHT_COLOR: [u8; 4] = [255, 210, 70, 255];
const ANIMATED_HIGHLIGHT_HALF_SIZE_PX: i32 = 8;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let width = self.viewport.width;
        let height = self.viewport.height;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        draw_world_grid(frame, width, height, world.camera());
        if let Some(overlay) = world.bounds_overlay() {
            draw_bounds_overlay(frame, width, height, world.camera(), overlay);
        }

        let mut draw_order: Vec<&VisualObject> = world.visuals().iter().collect();
        sort_for_draw(&mut draw_order);
        for visual in draw_order {
            draw_visual(frame, width, height, world.camera(), visual);
        }

        self.pixels.render()
    }
}

/// Lower visuals first so taller ones overlap them; spawn order breaks ties.
fn sort_for_draw(visuals: &mut [&VisualObject]) {
    visuals.sort_by(|a, b| {
        a.transform
            .position
            .y
            .total_cmp(&b.transform.position.y)
            .then(a.applied_spawn_order().cmp(&b.applied_spawn_order()))
    });
}

fn renderable_color(kind: RenderableKind) -> [u8; 4] {
    match kind {
        RenderableKind::Placeholder => PLACEHOLDER_COLOR,
        RenderableKind::Tinted { rgba } => rgba,
    }
}

fn draw_visual(frame: &mut [u8], width: u32, height: u32, camera: &Camera, visual: &VisualObject) {
    let (cx, cy) = world_to_screen_px(camera, (width, height), visual.transform.position);
    if visual.animator.is_any_set() {
        draw_square_outline(
            frame,
            width,
            height,
            cx,
            cy,
            ANIMATED_HIGHLIGHT_HALF_SIZE_PX,
            ANIMATED_HIGHLIGHT_COLOR,
        );
    }
    draw_square(
        frame,
        width,
        height,
        cx,
        cy,
        PLACEHOLDER_HALF_SIZE_PX,
        renderable_color(visual.renderable.kind),
    );
}

fn draw_bounds_overlay(
    frame: &mut [u8],
    width: u32,
    height: u32,
    camera: &Camera,
    overlay: BoundsOverlay,
) {
    let half = overlay.half_extent.abs();
    let (left, top) = world_to_screen_px(camera, (width, height), Vec3::new(-half, 0.0, half));
    let (right, bottom) = world_to_screen_px(camera, (width, height), Vec3::new(half, 0.0, -half));
    for x in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, top, BOUNDS_COLOR);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, BOUNDS_COLOR);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, y, BOUNDS_COLOR);
        write_pixel_rgba_clipped(frame, width as usize, right, y, BOUNDS_COLOR);
    }
}

fn draw_world_grid(frame: &mut [u8], width: u32, height: u32, camera: &Camera) {
    if width == 0 || height == 0 {
        return;
    }

    let pixels_per_world = camera_pixels_per_world(camera);
    let (ix_start, ix_end, iz_start, iz_end) =
        visible_grid_index_bounds(camera.center, width, height, pixels_per_world);

    for ix in ix_start..=ix_end {
        let world_x = ix as f32 * GRID_CELL_WORLD;
        let (screen_x, _) = world_to_screen_px(
            camera,
            (width, height),
            Vec3::new(world_x, 0.0, camera.center.z),
        );
        draw_vertical_line_clipped(frame, width, height, screen_x, grid_color(ix));
    }

    for iz in iz_start..=iz_end {
        let world_z = iz as f32 * GRID_CELL_WORLD;
        let (_, screen_y) = world_to_screen_px(
            camera,
            (width, height),
            Vec3::new(camera.center.x, 0.0, world_z),
        );
        draw_horizontal_line_clipped(frame, width, height, screen_y, grid_color(iz));
    }
}

fn grid_color(index: i32) -> [u8; 4] {
    if is_major_index(index) {
        GRID_MAJOR_COLOR
    } else {
        GRID_MINOR_COLOR
    }
}

fn visible_grid_index_bounds(
    camera_center: Vec3,
    width: u32,
    height: u32,
    pixels_per_world: f32,
) -> (i32, i32, i32, i32) {
    let half_w_world = width as f32 / (2.0 * pixels_per_world);
    let half_h_world = height as f32 / (2.0 * pixels_per_world);
    let min_x = camera_center.x - half_w_world;
    let max_x = camera_center.x + half_w_world;
    let min_z = camera_center.z - half_h_world;
    let max_z = camera_center.z + half_h_world;

    let ix_start = (min_x / GRID_CELL_WORLD).floor() as i32 - 1;
    let ix_end = (max_x / GRID_CELL_WORLD).ceil() as i32 + 1;
    let iz_start = (min_z / GRID_CELL_WORLD).floor() as i32 - 1;
    let iz_end = (max_z / GRID_CELL_WORLD).ceil() as i32 + 1;
    (ix_start, ix_end, iz_start, iz_end)
}

fn is_major_index(idx: i32) -> bool {
    idx.rem_euclid(GRID_MAJOR_EVERY) == 0
}

fn draw_vertical_line_clipped(frame: &mut [u8], width: u32, height: u32, x: i32, color: [u8; 4]) {
    if width == 0 || height == 0 || x < 0 || x >= width as i32 {
        return;
    }
    for y in 0..height as i32 {
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn draw_horizontal_line_clipped(frame: &mut [u8], width: u32, height: u32, y: i32, color: [u8; 4]) {
    if width == 0 || height == 0 || y < 0 || y >= height as i32 {
        return;
    }
    for x in 0..width as i32 {
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn draw_square(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    for y in (cy - half_size)..=(cy + half_size) {
        for x in (cx - half_size)..=(cx + half_size) {
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_square_outline(
    frame: &mut [u8],
    width: u32,
    _height: u32,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    let left = cx - half_size;
    let right = cx + half_size;
    let top = cy - half_size;
    let bottom = cy + half_size;

    for x in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}

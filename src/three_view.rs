// Filament view: CPU ray-cast of the conductive filament inside its cell.
// The egui texture cache is only built with the `gui` feature.

use nalgebra::{Point3, Vector3};

use crate::camera::OrbitCamera;

/// Cell (glass) radius and half height in scene units.
const CELL_RADIUS: f32 = 0.45;
const CELL_HALF_HEIGHT: f32 = 0.6;
const FILAMENT_HALF_HEIGHT: f32 = 0.5;

pub fn filament_radius(w: f64) -> f32 {
    0.05 + w.clamp(0.0, 1.0) as f32 * 0.35
}

/// Heat in [0, 1]; saturates at 100 mW.
pub fn visual_heat(power: f64) -> f32 {
    (power / 0.1).clamp(0.0, 1.0) as f32
}

/// RGBA8 image, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct FilamentImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl FilamentImage {
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [self.rgba[idx], self.rgba[idx + 1], self.rgba[idx + 2], self.rgba[idx + 3]]
    }
}

struct Hit {
    t: f32,
    normal: Vector3<f32>,
}

// Ray against a closed cylinder along y centered at the origin.
fn hit_cylinder(origin: &Point3<f32>, dir: &Vector3<f32>, radius: f32, half_height: f32) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    let mut consider = |t: f32, normal: Vector3<f32>| {
        if t > 1e-4 && best.as_ref().map_or(true, |b| t < b.t) {
            best = Some(Hit { t, normal });
        }
    };

    // side
    let a = dir.x * dir.x + dir.z * dir.z;
    if a > 1e-8 {
        let b = 2.0 * (origin.x * dir.x + origin.z * dir.z);
        let c = origin.x * origin.x + origin.z * origin.z - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            for t in [(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)] {
                let p = origin + dir * t;
                if p.y.abs() <= half_height {
                    consider(t, Vector3::new(p.x, 0.0, p.z) / radius);
                }
            }
        }
    }

    // caps
    if dir.y.abs() > 1e-8 {
        for cap in [half_height, -half_height] {
            let t = (cap - origin.y) / dir.y;
            let p = origin + dir * t;
            if p.x * p.x + p.z * p.z <= radius * radius {
                consider(t, Vector3::new(0.0, cap.signum(), 0.0));
            }
        }
    }

    best
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

/// Renders the filament for state `w` and dissipated `power` as seen from `camera`.
pub fn render_filament(camera: &OrbitCamera, w: f64, power: f64, width: usize, height: usize) -> FilamentImage {
    let width = width.max(1);
    let height = height.max(1);
    let aspect = width as f32 / height as f32;
    let radius = filament_radius(w);
    let heat = visual_heat(power);

    // cool metal -> glowing orange
    let base = mix([0.55, 0.6, 0.7], [1.0, 0.45, 0.1], heat);
    let light = Vector3::new(0.5, 0.8, 0.6).normalize();
    let mut rgba = vec![0u8; width * height * 4];

    for y in 0..height {
        for x in 0..width {
            let ndc_x = (x as f32 + 0.5) / width as f32 * 2.0 - 1.0;
            let ndc_y = 1.0 - (y as f32 + 0.5) / height as f32 * 2.0;
            let (origin, dir) = camera.ray(ndc_x, ndc_y, aspect);
            let dir = dir.into_inner();

            // background - dark vertical gradient
            let mut col = mix([0.03, 0.03, 0.04], [0.1, 0.1, 0.13], (ndc_y + 1.0) * 0.5);

            if let Some(hit) = hit_cylinder(&origin, &dir, radius, FILAMENT_HALF_HEIGHT) {
                let diffuse = hit.normal.dot(&light).max(0.0);
                let shade = 0.2 + 0.8 * diffuse;
                let glow = 0.6 * heat;
                col = [
                    base[0] * shade + glow,
                    base[1] * shade + glow * 0.5,
                    base[2] * shade,
                ];
            }

            // translucent cell with a brighter rim at grazing angles
            if let Some(hit) = hit_cylinder(&origin, &dir, CELL_RADIUS, CELL_HALF_HEIGHT) {
                let facing = hit.normal.dot(&-dir).abs();
                let alpha = 0.12 + 0.25 * (1.0 - facing).powi(3);
                col = mix(col, [0.6, 0.85, 0.95], alpha);
            }

            let idx = (y * width + x) * 4;
            rgba[idx] = (col[0].clamp(0.0, 1.0) * 255.0) as u8;
            rgba[idx + 1] = (col[1].clamp(0.0, 1.0) * 255.0) as u8;
            rgba[idx + 2] = (col[2].clamp(0.0, 1.0) * 255.0) as u8;
            rgba[idx + 3] = 255;
        }
    }

    FilamentImage { width, height, rgba }
}

#[cfg(feature = "gui")]
pub use self::texture::ThreeViewRenderer;

#[cfg(feature = "gui")]
mod texture {
    use eframe::egui;

    use super::{filament_radius, render_filament, visual_heat};
    use crate::camera::OrbitCamera;

    /// Keeps the filament texture and only re-renders when the view changed.
    pub struct ThreeViewRenderer {
        texture: Option<egui::TextureHandle>,
        last_size: [usize; 2],
        last_radius: f32,
        last_heat: f32,
        last_camera: Option<OrbitCamera>,
    }

    impl Default for ThreeViewRenderer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ThreeViewRenderer {
        pub fn new() -> Self {
            Self { texture: None, last_size: [0, 0], last_radius: -1.0, last_heat: -1.0, last_camera: None }
        }

        /// Ensure the texture for the given state/size exists and is up to date. Returns the texture id.
        pub fn ensure_texture(
            &mut self,
            ctx: &egui::Context,
            camera: &OrbitCamera,
            w: f64,
            power: f64,
            size: egui::Vec2,
        ) -> egui::TextureId {
            // half resolution keeps the CPU path interactive
            let width = (size.x * 0.5).max(1.0) as usize;
            let height = (size.y * 0.5).max(1.0) as usize;
            let radius = filament_radius(w);
            let heat = visual_heat(power);

            let changed = self.last_size != [width, height]
                || (radius - self.last_radius).abs() > 0.002
                || (heat - self.last_heat).abs() > 0.01
                || self.last_camera.as_ref() != Some(camera);

            if !changed {
                if let Some(tex) = &self.texture {
                    return tex.id();
                }
            }

            let img = render_filament(camera, w, power, width, height);
            let color = egui::ColorImage::from_rgba_unmultiplied([img.width, img.height], &img.rgba);
            let tex = ctx.load_texture("filament_view", color, egui::TextureOptions::LINEAR);
            let id = tex.id();
            self.texture = Some(tex);
            self.last_size = [width, height];
            self.last_radius = radius;
            self.last_heat = heat;
            self.last_camera = Some(*camera);
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a hot filament is the only red-dominant thing in the scene
    fn glowing_pixels(img: &FilamentImage) -> usize {
        (0..img.height)
            .flat_map(|y| (0..img.width).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                let [r, _, b, _] = img.pixel(x, y);
                r as i32 > b as i32 + 40
            })
            .count()
    }

    #[test]
    fn test_radius_and_heat_mapping() {
        assert_eq!(filament_radius(0.0), 0.05);
        assert!((filament_radius(1.0) - 0.4).abs() < 1e-6);
        assert_eq!(visual_heat(0.0), 0.0);
        assert_eq!(visual_heat(0.05), 0.5);
        assert_eq!(visual_heat(3.0), 1.0);
    }

    #[test]
    fn test_hit_cylinder_side_and_cap() {
        let hit = hit_cylinder(&Point3::new(0.0, 0.0, 5.0), &Vector3::new(0.0, 0.0, -1.0), 1.0, 1.0).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.normal.z - 1.0).abs() < 1e-5);

        let hit = hit_cylinder(&Point3::new(0.2, 5.0, 0.0), &Vector3::new(0.0, -1.0, 0.0), 1.0, 1.0).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vector3::new(0.0, 1.0, 0.0));

        assert!(hit_cylinder(&Point3::new(3.0, 0.0, 5.0), &Vector3::new(0.0, 0.0, -1.0), 1.0, 1.0).is_none());
    }

    #[test]
    fn test_image_dimensions() {
        let img = render_filament(&OrbitCamera::default(), 0.5, 0.0, 32, 24);
        assert_eq!(img.rgba.len(), 32 * 24 * 4);
        assert!(img.rgba.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_thicker_filament_covers_more_pixels() {
        let cam = OrbitCamera::default();
        let thin = render_filament(&cam, 0.0, 1.0, 64, 64);
        let thick = render_filament(&cam, 1.0, 1.0, 64, 64);
        assert!(glowing_pixels(&thick) > glowing_pixels(&thin));
        assert!(glowing_pixels(&thin) > 0);
    }

    #[test]
    fn test_heat_shifts_color_toward_red() {
        let cam = OrbitCamera::default();
        let cold = render_filament(&cam, 1.0, 0.0, 33, 33);
        let hot = render_filament(&cam, 1.0, 1.0, 33, 33);
        let [cr, _, cb, _] = cold.pixel(16, 16);
        let [hr, _, hb, _] = hot.pixel(16, 16);
        assert!(hr > cr);
        assert!(hb < cb);
    }
}

use nalgebra::{Isometry3, Perspective3, Point3, Unit, Vector3};

/// Orbit camera around a target point. Angles are in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self { target: Point3::origin(), radius: 3.0, yaw: 45.0, pitch: 30.0 }
    }
}

impl OrbitCamera {
    pub const FOV_DEG: f32 = 45.0;
    pub const MIN_RADIUS: f32 = 0.5;
    pub const MAX_RADIUS: f32 = 10.0;

    pub fn eye(&self) -> Point3<f32> {
        // keep clear of the poles so look_at has a usable up vector
        let p = self.pitch.clamp(-89.0, 89.0).to_radians();
        let y = self.yaw.to_radians();
        let offset = Vector3::new(y.cos() * p.cos(), p.sin(), y.sin() * p.cos()) * self.radius;
        self.target + offset
    }

    pub fn view_matrix(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye(), &self.target, &Vector3::y())
    }

    pub fn projection(&self, aspect: f32) -> Perspective3<f32> {
        Perspective3::new(aspect, Self::FOV_DEG.to_radians(), 0.1, 100.0)
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.radius = (self.radius - scroll * 0.2).clamp(Self::MIN_RADIUS, Self::MAX_RADIUS);
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.5;
        self.pitch += dy * 0.5;
    }

    /// Primary ray through normalized device coordinates (-1..1, y up).
    pub fn ray(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> (Point3<f32>, Unit<Vector3<f32>>) {
        let eye = self.eye();
        let forward = (self.target - eye).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        let half = (Self::FOV_DEG.to_radians() * 0.5).tan();
        let dir = forward + right * (ndc_x * half * aspect) + up * (ndc_y * half);
        (eye, Unit::new_normalize(dir))
    }
}

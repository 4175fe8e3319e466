//! Perspective camera and pointer picking.

use glam::{Mat4, Vec2, Vec3};

/// A ray in world space. `direction` is normalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Right-handed perspective camera looking at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 8.0, 28.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 70.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    /// Update the aspect ratio. Degenerate sizes are ignored.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection with a `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through a point in normalised device coordinates.
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - self.position).normalize_or(Vec3::NEG_Z);
        Ray {
            origin: self.position,
            direction,
        }
    }

    /// World point `depth` units along the ray under pixel `px`.
    pub fn project_pointer(&self, px: Vec2, viewport: Vec2, depth: f32) -> Vec3 {
        self.ray(screen_to_ndc(px, viewport)).at(depth)
    }
}

/// Pixel coordinates (origin top-left, y down) to NDC (y up).
pub fn screen_to_ndc(px: Vec2, viewport: Vec2) -> Vec2 {
    let size = viewport.max(Vec2::ONE);
    Vec2::new(px.x / size.x * 2.0 - 1.0, 1.0 - px.y / size.y * 2.0)
}

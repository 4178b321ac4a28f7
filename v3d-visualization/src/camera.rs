//! Camera utilities for 3D visualization

use nalgebra::{Matrix4, Perspective3, Point2, Point3, Unit, UnitQuaternion, Vector3, Vector4};

/// Closest the camera may get to its target
const MIN_DISTANCE: f32 = 0.05;

/// A perspective camera orbiting a target point.
///
/// Screen coordinates used by [`Camera::project`] and
/// [`Camera::screen_to_ray`] are viewport pixels with the origin at the top
/// left.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Rotate the camera around the target: `horizontal` about the up axis,
    /// `vertical` about the camera's right axis (radians). Vertical rotation
    /// stops short of the poles.
    pub fn orbit(&mut self, horizontal: f32, vertical: f32) {
        let Some(up) = Unit::try_new(self.up, f32::EPSILON) else {
            return;
        };
        let mut offset = self.position - self.target;

        offset = UnitQuaternion::from_axis_angle(&up, -horizontal) * offset;

        if let Some(right) = Unit::try_new(offset.cross(&self.up), f32::EPSILON) {
            let pitched = UnitQuaternion::from_axis_angle(&right, vertical) * offset;
            if pitched.normalize().dot(&up.into_inner()).abs() < 0.999 {
                offset = pitched;
            }
        }

        self.position = self.target + offset;
    }

    /// Translate camera and target in the view plane. Deltas are fractions
    /// of the current target distance.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position).normalize();
        let Some(right) = forward.cross(&self.up).try_normalize(f32::EPSILON) else {
            return;
        };
        let cam_up = right.cross(&forward);
        let scale = self.distance();
        let delta = (-right * dx + cam_up * dy) * scale;
        self.position += delta;
        self.target += delta;
    }

    /// Move toward (positive) or away from (negative) the target by a
    /// fraction of the current distance
    pub fn zoom(&mut self, amount: f32) {
        let offset = self.position - self.target;
        let distance = offset.norm();
        let new_distance = (distance * (1.0 - amount)).max(MIN_DISTANCE);
        self.position = self.target + offset * (new_distance / distance.max(f32::EPSILON));
    }

    /// Restore the default view, keeping the aspect ratio
    pub fn reset(&mut self) {
        let aspect_ratio = self.aspect_ratio;
        *self = Self::default();
        self.aspect_ratio = aspect_ratio;
    }

    /// Aim at the center of the box and back off along the current view
    /// direction until its bounding sphere fills the field of view
    pub fn frame_bounds(&mut self, min: &Point3<f32>, max: &Point3<f32>) {
        let center = nalgebra::center(min, max);
        let radius = ((max - min).norm() * 0.5).max(0.5);
        let half_fov = (self.fov.min(self.fov * self.aspect_ratio.min(1.0)) * 0.5).max(0.01);
        let distance = radius / half_fov.sin();

        let direction = (self.position - self.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Camera::default().position.coords.normalize());

        self.target = center;
        self.position = center + direction * distance;
        self.near = (distance - radius).max(distance * 0.01);
        self.far = (distance + radius) * 10.0;
    }

    /// Project a world point to viewport pixels. `None` for points at or
    /// behind the camera plane.
    pub fn project(&self, world: &Point3<f32>, width: f32, height: f32) -> Option<Point2<f32>> {
        let clip = self.view_projection() * world.to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(Point2::new(
            (ndc_x + 1.0) * 0.5 * width,
            (1.0 - ndc_y) * 0.5 * height,
        ))
    }

    /// World-space ray through a viewport pixel: `(origin on the near plane,
    /// unit direction)`
    pub fn screen_to_ray(
        &self,
        screen_x: f32,
        screen_y: f32,
        width: f32,
        height: f32,
    ) -> Option<(Point3<f32>, Vector3<f32>)> {
        let inverse = self.view_projection().try_inverse()?;
        let ndc_x = 2.0 * screen_x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_y / height;

        let near = Point3::from_homogeneous(inverse * Vector4::new(ndc_x, ndc_y, -1.0, 1.0))?;
        let far = Point3::from_homogeneous(inverse * Vector4::new(ndc_x, ndc_y, 1.0, 1.0))?;
        let direction = (far - near).try_normalize(f32::EPSILON)?;
        Some((near, direction))
    }
}

impl Default for Camera {
    /// Oblique view of the ground plane, z up
    fn default() -> Self {
        Self::new(
            Point3::new(12.0, -12.0, 10.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            200.0,
        )
    }
}

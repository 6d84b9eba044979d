//! Named regions: the village zombies roam in and the points they spawn at.

use engine_core::{Transform, Vec2, Vec3};
use rand::Rng;

use crate::config::{CircleConfig, RectConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaShape {
    Circle { radius: f32 },
    /// Half sizes on the area's local X and Z.
    Rect { half_extents: Vec2 },
}

/// A named region with its own frame, so rectangles can be rotated.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub name: String,
    pub frame: Transform,
    pub shape: AreaShape,
}

impl Area {
    pub fn circle(name: impl Into<String>, center: Vec3, radius: f32) -> Self {
        Self {
            name: name.into(),
            frame: Transform::from_position(center),
            shape: AreaShape::Circle {
                radius: radius.max(0.0),
            },
        }
    }

    /// Rectangle of full `size` on local X/Z, turned `yaw` radians.
    pub fn rect(name: impl Into<String>, center: Vec3, size: Vec2, yaw: f32) -> Self {
        Self {
            name: name.into(),
            frame: Transform::from_position_yaw(center, yaw),
            shape: AreaShape::Rect {
                half_extents: size.abs() * 0.5,
            },
        }
    }

    pub fn center(&self) -> Vec3 {
        self.frame.position
    }

    /// Containment on the ground plane; height is ignored.
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.frame.inverse_transform_point(point);
        match self.shape {
            AreaShape::Circle { radius } => Vec2::new(local.x, local.z).length() <= radius,
            AreaShape::Rect { half_extents } => {
                local.x.abs() <= half_extents.x && local.z.abs() <= half_extents.y
            }
        }
    }

    /// Uniform random point in the area at the center's height.
    ///
    /// Circles sample the enclosing sphere and drop the vertical component,
    /// so points bunch slightly toward the middle.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let local = match self.shape {
            AreaShape::Circle { radius } => {
                let p = loop {
                    let v = Vec3::new(
                        rng.gen_range(-1.0..=1.0),
                        rng.gen_range(-1.0..=1.0),
                        rng.gen_range(-1.0..=1.0),
                    );
                    if v.length_squared() <= 1.0 {
                        break v;
                    }
                };
                Vec3::new(p.x, 0.0, p.z) * radius
            }
            AreaShape::Rect { half_extents } => Vec3::new(
                sample_symmetric(rng, half_extents.x),
                0.0,
                sample_symmetric(rng, half_extents.y),
            ),
        };
        self.frame.position + self.frame.rotation * local
    }
}

fn sample_symmetric<R: Rng>(rng: &mut R, half: f32) -> f32 {
    if half <= 0.0 {
        0.0
    } else {
        rng.gen_range(-half..=half)
    }
}

impl From<&RectConfig> for Area {
    fn from(c: &RectConfig) -> Self {
        Area::rect(c.name.clone(), c.center, c.size, c.yaw_degrees.to_radians())
    }
}

impl From<&CircleConfig> for Area {
    fn from(c: &CircleConfig) -> Self {
        Area::circle(c.name.clone(), c.center, c.radius)
    }
}

use crate::geometry::{DynamicPosition, DynamicTransform, Vec2};
use nalgebra::vector;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ARENA_WIDTH: f64 = 800.0;
pub const DEFAULT_ARENA_HEIGHT: f64 = 600.0;

/// A fully elastic bounce.
pub const DEFAULT_BOUNCE_FACTOR: f64 = 2.0;

/// Axis-aligned arena spanning `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryContact {
    pub penetration: f64,
    /// Unit normal pointing back into the arena.
    pub normal: Vec2,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        vector![self.width / 2.0, self.height / 2.0]
    }

    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x <= self.width
            && position.y <= self.height
    }

    /// First wall a body of `radius` at `position` overlaps, if any.
    pub fn boundary_contact(&self, radius: f64, position: Vec2) -> Option<BoundaryContact> {
        if position.x <= radius {
            return Some(BoundaryContact {
                penetration: radius - position.x,
                normal: vector![1.0, 0.0],
            });
        }
        if position.x > self.width - radius {
            return Some(BoundaryContact {
                penetration: position.x - (self.width - radius),
                normal: vector![-1.0, 0.0],
            });
        }
        if position.y <= radius {
            return Some(BoundaryContact {
                penetration: radius - position.y,
                normal: vector![0.0, 1.0],
            });
        }
        if position.y > self.height - radius {
            return Some(BoundaryContact {
                penetration: position.y - (self.height - radius),
                normal: vector![0.0, -1.0],
            });
        }
        None
    }

    pub fn resolve_collision(
        &self,
        transform: &DynamicTransform,
        radius: f64,
        bounce_factor: f64,
    ) -> DynamicTransform {
        let contact = match self.boundary_contact(radius, transform.position()) {
            Some(contact) => contact,
            None => return *transform,
        };
        let mut velocity = transform.velocity();
        let into_wall = velocity.dot(&contact.normal);
        if into_wall < 0.0 {
            velocity -= contact.normal * (2.0 * into_wall);
        }
        let push = contact.normal * (contact.penetration * bounce_factor);
        let position = transform.position() + push;
        DynamicTransform::new(
            DynamicPosition::new(position, velocity),
            transform.orientation,
            transform.angular_velocity,
        )
    }
}

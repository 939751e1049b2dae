//! Physics backend contract.
//!
//! The engine never integrates actor bodies itself: the controller writes a
//! desired linear velocity, the backend owns positions and steps them. Any
//! rigid-body library can sit behind [`PhysicsBackend`]; [`KinematicBackend`]
//! is the minimal implementation used headless and in tests.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::field::dims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

pub trait PhysicsBackend {
    /// Register a body at `position`.
    fn create_body(&mut self, position: Vector3<f32>) -> BodyHandle;

    fn remove_body(&mut self, handle: BodyHandle);

    /// `None` once the body was removed.
    fn translation(&self, handle: BodyHandle) -> Option<Vector3<f32>>;

    /// Teleport without touching velocity.
    fn set_translation(&mut self, handle: BodyHandle, position: Vector3<f32>);

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>>;

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vector3<f32>);

    /// Advance every body by `dt` seconds.
    fn step(&mut self, dt: f32);
}

#[derive(Debug, Clone)]
struct KinematicBody {
    position: Vector3<f32>,
    velocity: Vector3<f32>,
}

/// Velocity integration with gravity down to the turf. No collisions.
/// Slots of removed bodies are handed out again by `create_body`.
#[derive(Debug, Clone)]
pub struct KinematicBackend {
    bodies: Vec<Option<KinematicBody>>,
    free: Vec<u32>,
    gravity: f32,
}

impl Default for KinematicBackend {
    fn default() -> Self {
        Self::new(9.8)
    }
}

impl KinematicBackend {
    pub fn new(gravity: f32) -> Self {
        Self { bodies: Vec::new(), free: Vec::new(), gravity }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut KinematicBody> {
        self.bodies.get_mut(handle.0 as usize).and_then(Option::as_mut)
    }

    fn body(&self, handle: BodyHandle) -> Option<&KinematicBody> {
        self.bodies.get(handle.0 as usize).and_then(Option::as_ref)
    }
}

impl PhysicsBackend for KinematicBackend {
    fn create_body(&mut self, position: Vector3<f32>) -> BodyHandle {
        let body = Some(KinematicBody { position, velocity: Vector3::zeros() });
        if let Some(index) = self.free.pop() {
            self.bodies[index as usize] = body;
            return BodyHandle(index);
        }
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(body);
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if let Some(slot) = self.bodies.get_mut(handle.0 as usize) {
            if slot.take().is_some() {
                self.free.push(handle.0);
            }
        }
    }

    fn translation(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.body(handle).map(|b| b.position)
    }

    fn set_translation(&mut self, handle: BodyHandle, position: Vector3<f32>) {
        if let Some(body) = self.body_mut(handle) {
            body.position = position;
        }
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.body(handle).map(|b| b.velocity)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vector3<f32>) {
        if let Some(body) = self.body_mut(handle) {
            body.velocity = velocity;
        }
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let gravity = self.gravity;
        for body in self.bodies.iter_mut().flatten() {
            if body.position.y > dims::GROUND_Y || body.velocity.y > 0.0 {
                body.velocity.y -= gravity * dt;
            }
            body.position += body.velocity * dt;
            if body.position.y < dims::GROUND_Y {
                body.position.y = dims::GROUND_Y;
                body.velocity.y = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_integrates_velocity() {
        let mut backend = KinematicBackend::default();
        let h = backend.create_body(Vector3::new(0.0, dims::GROUND_Y, 0.0));
        backend.set_linear_velocity(h, Vector3::new(2.0, 0.0, -4.0));
        backend.step(0.5);
        let p = backend.translation(h).unwrap();
        assert!((p.x - 1.0).abs() < 0.001);
        assert!((p.z + 2.0).abs() < 0.001);
        assert!((p.y - dims::GROUND_Y).abs() < 0.001);
    }

    #[test]
    fn test_jump_lands_on_ground() {
        let mut backend = KinematicBackend::default();
        let h = backend.create_body(Vector3::new(0.0, dims::GROUND_Y, 0.0));
        backend.set_linear_velocity(h, Vector3::new(0.0, 3.0, 0.0));
        for _ in 0..120 {
            backend.step(1.0 / 60.0);
        }
        let p = backend.translation(h).unwrap();
        assert!((p.y - dims::GROUND_Y).abs() < 0.001);
        assert_eq!(backend.linear_velocity(h).unwrap().y, 0.0);
    }

    #[test]
    fn test_removed_body_is_gone() {
        let mut backend = KinematicBackend::default();
        let a = backend.create_body(Vector3::zeros());
        let b = backend.create_body(Vector3::zeros());
        backend.remove_body(a);
        assert!(backend.translation(a).is_none());
        assert!(backend.translation(b).is_some());
        assert_eq!(backend.body_count(), 1);
        // Writes to a removed body are ignored
        backend.set_linear_velocity(a, Vector3::new(1.0, 0.0, 0.0));
        assert!(backend.linear_velocity(a).is_none());
    }

    #[test]
    fn test_slots_reused_after_remove() {
        let mut backend = KinematicBackend::default();
        let keep = backend.create_body(Vector3::zeros());
        for i in 0..100 {
            let h = backend.create_body(Vector3::new(i as f32, dims::GROUND_Y, 0.0));
            backend.remove_body(h);
            // A second remove must not free the slot twice
            backend.remove_body(h);
        }
        assert_eq!(backend.bodies.len(), 2);
        assert_eq!(backend.body_count(), 1);

        let a = backend.create_body(Vector3::new(5.0, dims::GROUND_Y, 0.0));
        let b = backend.create_body(Vector3::new(6.0, dims::GROUND_Y, 0.0));
        assert_ne!(a, b);
        assert_ne!(a, keep);
        assert_eq!(backend.bodies.len(), 3);
        assert_eq!(backend.translation(a).unwrap().x, 5.0);
        assert_eq!(backend.linear_velocity(a).unwrap(), Vector3::zeros());
    }
}

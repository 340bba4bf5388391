use {
    crate::constants::{
        AIR_RESISTANCE, BOUNDS, GRAVITY, SPAWN_HEIGHT, SPAWN_SPREAD, WIND_STRENGTH,
    },
    core::f32::consts::TAU,
    glam::{Mat4, Quat, Vec2, Vec3},
    rand::Rng,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snowflake {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// Degrees.
    pub angle: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
}

impl Snowflake {
    /// A fresh flake just above the top edge.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let x = rng.random_range(-SPAWN_SPREAD..SPAWN_SPREAD);
        let vx = (rng.random::<f32>() - 0.5) * 0.1;
        let vy = -0.001 - rng.random::<f32>() * 0.3;

        Self {
            position: Vec2::new(x, SPAWN_HEIGHT),
            velocity: Vec2::new(vx, vy),
            size: 0.02 + rng.random::<f32>() * 0.08,
            angle: rng.random_range(0.0..360.0),
            rotation_speed: (rng.random::<f32>() - 0.5) * 0.5,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.velocity.x += Self::wind(self.position);
        self.velocity.y += GRAVITY * dt;

        // Damping is applied once per step, not scaled by dt.
        self.velocity *= AIR_RESISTANCE;

        self.position += self.velocity * dt;
        self.angle += self.rotation_speed * dt;

        if self.is_out_of_bounds() {
            self.respawn(rng);
        }
    }

    /// Moves the flake back to the top with a slow fresh velocity. Size,
    /// angle and rotation speed carry over.
    pub fn respawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.position = Vec2::new(rng.random_range(-1.0..1.0), SPAWN_HEIGHT);
        self.velocity = Vec2::new(
            (rng.random::<f32>() - 0.5) * 0.001,
            -0.001 - rng.random::<f32>() * 0.003,
        );
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.position.y < -BOUNDS || self.position.x < -BOUNDS || self.position.x > BOUNDS
    }

    /// Translate, then rotate about z, then scale the unit quad.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(self.size, self.size, 1.0),
            Quat::from_rotation_z(self.angle.to_radians()),
            self.position.extend(0.0),
        )
    }

    // Lateral sway keyed to position rather than time.
    fn wind(position: Vec2) -> f32 {
        ((position.x * 0.2 + position.y - 0.5) * TAU).sin() * WIND_STRENGTH
    }
}

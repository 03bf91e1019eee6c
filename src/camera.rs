use cgmath::{InnerSpace, Point3, Vector3};

#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub horizontal_angle: f32, // yaw, 0 looks down +Z
    pub vertical_angle: f32,   // pitch, 0 looks at the horizon

    pub fov: f32, // in deg
    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub speed: f32,       // units per second
    pub mouse_speed: f32, // radians per pixel
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 5.0),
            horizontal_angle: -3.14,
            vertical_angle: 0.0,
            fov: 45.0,
            aspect_ratio: 800.0 / 600.0,
            near_plane: 1.0,
            far_plane: 100.0,
            speed: 3.0,
            mouse_speed: 0.005,
        }
    }
}

impl FlyCamera {
    const MAX_PITCH: f32 = 1.55;
    const MOVE_SCALE: f32 = 5.0;

    pub fn direction(&self) -> Vector3<f32> {
        let (h, v) = (self.horizontal_angle, self.vertical_angle);
        Vector3::new(v.cos() * h.sin(), v.sin(), v.cos() * h.cos())
    }

    pub fn right(&self) -> Vector3<f32> {
        let h = self.horizontal_angle - std::f32::consts::FRAC_PI_2;
        Vector3::new(h.sin(), 0.0, h.cos())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.right().cross(self.direction())
    }

    pub fn view(&self) -> cgmath::Matrix4<f32> {
        let eye = Point3::new(self.position.x, self.position.y, self.position.z);
        cgmath::Matrix4::look_at_rh(eye, eye + self.direction(), self.up())
    }

    pub fn projection(&self) -> cgmath::Matrix4<f32> {
        cgmath::perspective(
            cgmath::Deg(self.fov),
            self.aspect_ratio,
            self.near_plane,
            self.far_plane,
        )
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.horizontal_angle -= self.mouse_speed * dx;
        self.vertical_angle = (self.vertical_angle - self.mouse_speed * dy)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    // forward and strafe are -1, 0 or 1
    pub fn travel(&mut self, forward: f32, strafe: f32, delta_time: f32) {
        let step = self.speed * Self::MOVE_SCALE * delta_time;
        let mut motion = self.direction() * forward + self.right() * strafe;
        if motion.magnitude2() > 0.0 {
            motion = motion.normalize();
            self.position += motion * step;
        }
    }
}

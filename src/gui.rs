use std::time::{Duration, Instant};

use egui::{Align, Key, Layout, PointerButton, Sense};
use log::{debug, info};
use winit::window::Window;

use crate::{
    lights::{Attenuation, LightColor},
    material::MaterialType,
    scene::Scene,
    viewport::Viewport,
};

// Clamp the maximum delta movement so camera doesn't spin uncontrollably
const MAX_MOUSE_DELTA: f32 = 75.0;

#[derive(Debug)]
pub struct FpsCounter {
    frame_count: u32,
    accumulator: Duration,
    fps: u32,
}

impl FpsCounter {
    const INTERVAL: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self {
            frame_count: 0,
            accumulator: Duration::ZERO,
            fps: 0,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.accumulator += dt;
        self.frame_count += 1;

        if self.accumulator >= Self::INTERVAL {
            self.fps = (self.frame_count as f32 / self.accumulator.as_secs_f32()) as u32;
            self.accumulator = Duration::ZERO;
            self.frame_count = 0;
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

pub struct Gui {
    panel_rect: Option<egui::Rect>,
    pixels_per_point: f32,

    last_frame_time: Instant,
    fps: FpsCounter,
}

impl Gui {
    pub fn new() -> Self {
        Self {
            panel_rect: None,
            pixels_per_point: 1.0,
            last_frame_time: Instant::now(),
            fps: FpsCounter::new(),
        }
    }

    // None until the first frame has been laid out
    pub fn get_viewport(&self, window: &Window) -> Option<Viewport> {
        self.panel_rect.map(|rect| {
            Viewport::from_ui_rect(rect, self.pixels_per_point, window.inner_size().height)
        })
    }

    pub fn update(
        &mut self,
        raw_input: egui::RawInput,
        ctx: &egui::Context,
        context: &glow::Context,
        scene: &mut Scene,
    ) -> egui::FullOutput {
        let now = Instant::now();
        let dt = now - self.last_frame_time;
        self.last_frame_time = now;
        self.fps.tick(dt);

        let mut reload_shaders = false;

        let full_output = ctx.run(raw_input, |ctx| {
            egui::SidePanel::left("Models")
                .min_width(180.0)
                .resizable(true)
                .show(ctx, |ui| {
                    ui.heading(scene.name.clone());
                    ui.separator();

                    let texture_names: Vec<String> =
                        scene.textures.iter().map(|t| t.name.clone()).collect();

                    for (i, model) in scene.models.iter_mut().enumerate() {
                        ui.collapsing(model.name.clone(), |ui| {
                            egui::ComboBox::from_id_salt(("material", i))
                                .selected_text(model.material.label())
                                .show_ui(ui, |ui| {
                                    for material in MaterialType::ALL {
                                        ui.selectable_value(
                                            &mut model.material,
                                            material,
                                            material.label(),
                                        );
                                    }
                                });

                            vector_row(ui, "Position", &mut model.position, 0.1);

                            ui.label(format!(
                                "{} vertices, {} triangles",
                                model.mesh.vertex_count(),
                                model.mesh.triangle_count()
                            ));
                            match model.texture {
                                Some(handle) if model.mesh.has_uvs() => {
                                    let name = texture_names
                                        .get(handle.index())
                                        .map(String::as_str)
                                        .unwrap_or("?");
                                    ui.label(format!("Texture: {}", name));
                                }
                                _ => {
                                    ui.label("Untextured");
                                }
                            }
                        });
                    }

                    ui.separator();
                    if ui.button("Reload shaders (R)").clicked() {
                        reload_shaders = true;
                    }
                });

            egui::SidePanel::right("Lighting")
                .min_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.heading("Material");
                        let params = &mut scene.params;
                        ui.add(egui::Slider::new(&mut params.shininess, 1.0..=256.0).text("Shininess"));
                        ui.add(egui::Slider::new(&mut params.roughness, 0.0..=1.0).text("Roughness"));
                        ui.add(egui::Slider::new(&mut params.intensity, 0.0..=4.0).text("Intensity"));
                        ui.add(
                            egui::Slider::new(&mut params.reflectance, 0.0..=1.0).text("Reflectance"),
                        );

                        ui.separator();
                        ui.collapsing("Directional light", |ui| {
                            let light = &mut scene.lights.directional;
                            ui.checkbox(&mut light.active, "Active");
                            vector_row(ui, "Direction", &mut light.direction, 0.05);
                            color_rows(ui, &mut light.color);
                        });

                        for (i, light) in scene.lights.points.iter_mut().enumerate() {
                            ui.collapsing(format!("Point light {}", i + 1), |ui| {
                                ui.checkbox(&mut light.active, "Active");
                                vector_row(ui, "Position", &mut light.position, 0.1);
                                color_rows(ui, &mut light.color);
                                attenuation_rows(ui, &mut light.attenuation);
                            });
                        }

                        ui.collapsing("Spot light", |ui| {
                            let light = &mut scene.lights.spot;
                            ui.checkbox(&mut light.active, "Active");
                            color_rows(ui, &mut light.color);
                            ui.add(egui::Slider::new(&mut light.cut_off, 0.0..=1.0).text("Cut off"));
                            ui.add(
                                egui::Slider::new(&mut light.outer_cut_off, 0.0..=1.0)
                                    .text("Outer cut off"),
                            );
                            attenuation_rows(ui, &mut light.attenuation);
                        });
                    });
                });

            egui::CentralPanel::default()
                .frame(egui::Frame::default())
                .show(ctx, |ui| {
                    let rect = ui.max_rect();
                    let response = ui.interact(rect, ui.id().with("scene"), Sense::drag());

                    if response.dragged_by(PointerButton::Secondary) {
                        let delta = response.drag_delta();
                        scene.camera.rotate(
                            delta.x.clamp(-MAX_MOUSE_DELTA, MAX_MOUSE_DELTA),
                            delta.y.clamp(-MAX_MOUSE_DELTA, MAX_MOUSE_DELTA),
                        );
                    }

                    // Keyboard only drives the camera while no text field owns it
                    if !ctx.wants_keyboard_input() {
                        let (forward, strafe, reload) = ui.input(|input| {
                            let axis = |positive: Key, negative: Key| {
                                input.key_down(positive) as i32 as f32
                                    - input.key_down(negative) as i32 as f32
                            };
                            (
                                axis(Key::W, Key::S),
                                axis(Key::D, Key::A),
                                input.key_pressed(Key::R),
                            )
                        });
                        scene.camera.travel(forward, strafe, dt.as_secs_f32());
                        reload_shaders |= reload;
                    }

                    ui.horizontal(|ui| {
                        ui.label("Right mouse: look, WASD: move");
                        ui.allocate_ui_with_layout(
                            ui.available_size(),
                            Layout::right_to_left(Align::Center),
                            |ui| {
                                ui.label(format!("FPS: {}", self.fps.fps()));
                            },
                        );
                    });

                    // Set the viewport which the scene will render in
                    self.panel_rect = Some(rect);
                    self.pixels_per_point = ctx.pixels_per_point();
                });
        });

        if reload_shaders {
            info!("Reloading shaders");
            scene.shaders.reload(context);
        }
        debug!("Frame took {:?}", dt);

        full_output
    }
}

fn vector_row(ui: &mut egui::Ui, label: &str, value: &mut cgmath::Vector3<f32>, speed: f64) {
    ui.horizontal(|ui| {
        ui.label(label);
        // Adds space between the text and inputs
        ui.allocate_ui_with_layout(
            ui.available_size(),
            Layout::right_to_left(Align::Center),
            |ui| {
                // The inputs are in the reverse order
                ui.add(egui::DragValue::new(&mut value.z).speed(speed));
                ui.add(egui::DragValue::new(&mut value.y).speed(speed));
                ui.add(egui::DragValue::new(&mut value.x).speed(speed));
            },
        );
    });
}

fn color_rows(ui: &mut egui::Ui, color: &mut LightColor) {
    for (label, rgb) in [
        ("Ambient", &mut color.ambient),
        ("Diffuse", &mut color.diffuse),
        ("Specular", &mut color.specular),
    ] {
        ui.horizontal(|ui| {
            ui.color_edit_button_rgb(rgb);
            ui.label(label);
        });
    }
}

fn attenuation_rows(ui: &mut egui::Ui, attenuation: &mut Attenuation) {
    ui.horizontal(|ui| {
        ui.label("Attenuation");
        ui.add(egui::DragValue::new(&mut attenuation.constant).speed(0.01).range(0.0..=10.0));
        ui.add(egui::DragValue::new(&mut attenuation.linear).speed(0.01).range(0.0..=10.0));
        ui.add(egui::DragValue::new(&mut attenuation.quadratic).speed(0.001).range(0.0..=10.0));
    });
}

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Context as _;
use egui_glow::Painter;
use glutin::config::ConfigTemplate;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use egui_winit::State as EguiState;

mod camera;
mod config;
mod data;
mod gui;
mod handles;
mod lights;
mod loader;
mod material;
mod mesh;
mod opengl;
mod renderer;
mod scene;
mod shaders;
mod textures;
mod viewport;

use config::{LaunchOptions, SceneConfig};
use gui::Gui;
use renderer::Renderer;
use scene::Scene;

struct Graphics {
    window: Window,
    current_context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    gl: Arc<glow::Context>,

    gui: Gui,
    scene: Option<Scene>,

    egui_context: egui::Context,
    egui_painter: Painter,
    egui_state: EguiState,
}

struct App {
    options: LaunchOptions,
    scene_config: SceneConfig,
    graphics: Option<Graphics>,
}

impl App {
    fn new(options: LaunchOptions, scene_config: SceneConfig) -> Self {
        Self {
            options,
            scene_config,
            graphics: None,
        }
    }

    fn create_graphics(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Graphics> {
        let attributes = Window::default_attributes()
            .with_title("Lighting demo")
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = event_loop
            .create_window(attributes)
            .context("creating the window")?;

        // Get platform-specific handles to the display and window
        let display_handle = window.display_handle()?.as_raw();
        let window_handle = window.window_handle()?.as_raw();

        #[cfg(target_os = "windows")]
        let preference = DisplayApiPreference::Wgl(Some(window_handle));
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let preference = DisplayApiPreference::Egl;

        let display = unsafe { Display::new(display_handle, preference) }
            .context("creating the GL display")?;

        let config = unsafe { display.find_configs(ConfigTemplate::default()) }?
            .next()
            .context("no suitable GL config")?;

        let physical_size = window.inner_size();
        let width = NonZeroU32::new(physical_size.width).context("window has zero width")?;
        let height = NonZeroU32::new(physical_size.height).context("window has zero height")?;

        let surface_attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(window_handle, width, height);

        // The shaders are written against GLSL 330 core
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(window_handle));

        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("creating the window surface")?;
        let non_current_context = unsafe { display.create_context(&config, &context_attributes) }
            .context("creating the GL context")?;
        let current_context = non_current_context.make_current(&surface)?;

        let gl = unsafe {
            Arc::new(glow::Context::from_loader_function_cstr(|s| {
                display.get_proc_address(s)
            }))
        };

        let scene = Scene::load(&gl, &self.scene_config)?;

        let egui_context = egui::Context::default();
        let egui_painter = Painter::new(gl.clone(), "", None, false)
            .map_err(|e| anyhow::anyhow!("creating the egui painter: {:?}", e))?;
        let egui_state = EguiState::new(
            egui_context.clone(),
            egui_context.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        info!(
            "Window {}x{} ready",
            physical_size.width, physical_size.height
        );

        Ok(Graphics {
            window,
            current_context,
            surface,
            gl,
            gui: Gui::new(),
            scene: Some(scene),
            egui_context,
            egui_painter,
            egui_state,
        })
    }
}

impl Graphics {
    fn redraw(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        Renderer::clear(&self.gl);

        // Run the UI code
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self
            .gui
            .update(raw_input, &self.egui_context, &self.gl, scene);

        // Handle the platform output (like copy/paste)
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let clipped_primitives = self
            .egui_context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let physical_size = self.window.inner_size();
        self.egui_painter.paint_and_update_textures(
            [physical_size.width, physical_size.height],
            full_output.pixels_per_point,
            &clipped_primitives,
            &full_output.textures_delta,
        );

        if let Some(viewport) = self.gui.get_viewport(&self.window) {
            scene
                .camera
                .set_aspect_ratio(viewport.width as f32, viewport.height as f32);
            Renderer::render(&self.gl, scene, &viewport);
        }

        if let Err(e) = self.surface.swap_buffers(&self.current_context) {
            error!("Failed to swap buffers: {}", e);
        }

        self.window.request_redraw();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.surface.resize(&self.current_context, width, height);
        }
        self.window.request_redraw();
    }

    fn destroy(mut self) {
        if let Some(scene) = self.scene.take() {
            scene.destroy(&self.gl);
        }
        self.egui_painter.destroy();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        match self.create_graphics(event_loop) {
            Ok(graphics) => {
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(e) => {
                error!("Startup failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        // give egui any winit events
        _ = graphics
            .egui_state
            .on_window_event(&graphics.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => graphics.resize(size),
            WindowEvent::RedrawRequested => graphics.redraw(),
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = self.graphics.take() {
            graphics.destroy();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = LaunchOptions::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let scene_config = SceneConfig::load_or_default(&options.scene)?;

    let event_loop = EventLoop::new()?;

    // ControlFlow::Wait pauses the event loop if no events are available to process.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(options, scene_config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

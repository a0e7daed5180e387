/// Terminal viewer for hyperboloid lattice towers
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use hypertower_core::{build_tower, mesh::tower_mesh, Camera, Mesh, Orbit, TowerGeometry, TowerSpec};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod panel;
pub mod renderer;

pub use config::{ConfigError, SpecArgs, TowerConfig};
pub use panel::ParameterPanel;
pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
const ORBIT_STEP: f32 = 0.1;
const AUTO_ROTATE_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Wireframe,
    Solid,
}

/// Interactive viewer state.
///
/// The app is the single owner of the current `TowerSpec`. Every edit
/// replaces the spec and rebuilds the geometry; the solid mesh derived from
/// the old geometry is dropped with it.
pub struct TerminalApp {
    spec: TowerSpec,
    geometry: TowerGeometry,
    mesh: Option<Mesh>,
    panel: ParameterPanel,
    orbit: Orbit,
    camera: Camera,
    renderer: AsciiRenderer,
    mode: RenderMode,
    auto_rotate: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(spec: TowerSpec) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(spec, width as usize, height as usize))
    }

    /// Build the app for a fixed screen size without touching the terminal.
    pub fn with_size(spec: TowerSpec, width: usize, height: usize) -> Self {
        let geometry = build_tower(&spec);
        let camera = terminal_camera(width, height);
        let orbit = frame(&geometry, &camera);

        let mut app = Self {
            spec,
            geometry,
            mesh: None,
            panel: ParameterPanel::new(),
            orbit,
            camera,
            renderer: AsciiRenderer::new(width, height),
            mode: RenderMode::Wireframe,
            auto_rotate: true,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.orbit.apply(&mut app.camera);
        app
    }

    pub fn spec(&self) -> &TowerSpec {
        &self.spec
    }

    pub fn geometry(&self) -> &TowerGeometry {
        &self.geometry
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Replace the spec and rebuild everything derived from it.
    pub fn set_spec(&mut self, spec: TowerSpec) {
        if spec == self.spec {
            return;
        }
        self.spec = spec;
        self.geometry = build_tower(&self.spec);
        self.mesh = None;
        tracing::info!(
            struts = self.geometry.struts.len(),
            rings = self.geometry.rings.len(),
            "tower rebuilt"
        );
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(width, height) => self.resize(width as usize, height as usize),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('w') | KeyCode::Up => self.orbit.rotate(0.0, ORBIT_STEP),
            KeyCode::Char('s') | KeyCode::Down => self.orbit.rotate(0.0, -ORBIT_STEP),
            KeyCode::Char('a') | KeyCode::Left => self.orbit.rotate(-ORBIT_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.orbit.rotate(ORBIT_STEP, 0.0),
            KeyCode::Char('z') => self.orbit.zoom(0.9),
            KeyCode::Char('x') => self.orbit.zoom(1.1),
            KeyCode::Char('f') => self.orbit = frame(&self.geometry, &self.camera),
            KeyCode::Char(' ') => self.auto_rotate = !self.auto_rotate,
            KeyCode::Char('v') => {
                self.mode = match self.mode {
                    RenderMode::Wireframe => RenderMode::Solid,
                    RenderMode::Solid => RenderMode::Wireframe,
                }
            }
            KeyCode::Tab => self.panel.select_next(),
            KeyCode::BackTab => self.panel.select_previous(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.set_spec(self.panel.adjust(&self.spec, 1)),
            KeyCode::Char('-') | KeyCode::Char('_') => self.set_spec(self.panel.adjust(&self.spec, -1)),
            _ => {}
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.renderer.resize(width, height);
        let fov = self.camera.fov;
        self.camera = terminal_camera(width, height);
        self.camera.fov = fov;
    }

    fn update(&mut self) {
        if self.auto_rotate {
            self.orbit.rotate(AUTO_ROTATE_STEP, 0.0);
        }
        self.orbit.apply(&mut self.camera);
    }

    /// Rasterize the current geometry into the renderer's buffers.
    pub fn rasterize(&mut self) {
        self.renderer.clear();
        match self.mode {
            RenderMode::Wireframe => self.renderer.render_wireframe(&self.geometry, &self.camera),
            RenderMode::Solid => {
                let mesh = self
                    .mesh
                    .get_or_insert_with(|| tower_mesh(&self.geometry, self.spec.strut_radius));
                self.renderer.render_mesh(mesh, &self.camera);
            }
        }
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    fn render(&mut self) -> io::Result<()> {
        self.rasterize();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Hypertower | FPS: {:.1} | Orbit: WASD/Arrows Z/X F  Params: Tab +/-  V=View Space=Spin Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        let waist = &self.geometry.waist;
        let mut lines = self.panel.lines(&self.spec);
        lines.push(format!(
            "  struts {}  rings {}  waist r={:.2} @ {:.3}",
            self.geometry.struts.len(),
            self.geometry.rings.len(),
            waist.radius,
            waist.position
        ));
        for (row, line) in lines.iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, row as u16 + 1),
                SetForegroundColor(Color::Green),
                Print(line),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}

fn terminal_camera(width: usize, height: usize) -> Camera {
    let mut camera = Camera::new(width as u32, height as u32);
    camera.aspect = width as f32 / (height.max(1) as f32 * CELL_ASPECT);
    camera
}

fn frame(geometry: &TowerGeometry, camera: &Camera) -> Orbit {
    Orbit::framing(geometry.height() as f32, geometry.max_radius() as f32, camera.fov)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_adjust_rebuilds_geometry() {
        let mut app = TerminalApp::with_size(TowerSpec::default(), 80, 40);
        let before = app.geometry().struts.len();

        // Height, base, top, sections
        for _ in 0..3 {
            app.handle_event(key(KeyCode::Tab));
        }
        app.handle_event(key(KeyCode::Char('+')));

        assert_eq!(app.spec().section_count, 7);
        assert_eq!(app.geometry().sections.len(), 7);
        assert!(app.geometry().struts.len() > before);
    }

    #[test]
    fn test_quit() {
        let mut app = TerminalApp::with_size(TowerSpec::default(), 80, 40);
        app.handle_event(key(KeyCode::Char('q')));
        assert!(!app.is_running());
    }

    #[test]
    fn test_view_toggle_rasterizes_mesh() {
        let spec = TowerSpec {
            strut_count: 6,
            strut_radius: 8.0,
            show_rings: false,
            ..TowerSpec::default()
        };
        let mut app = TerminalApp::with_size(spec, 60, 30);
        app.rasterize();
        assert!(app.renderer().covered_cells() > 0);

        app.handle_event(key(KeyCode::Char('v')));
        assert_eq!(app.mode(), RenderMode::Solid);
        app.rasterize();
        assert!(app.renderer().covered_cells() > 0);
    }

    #[test]
    fn test_resize() {
        let mut app = TerminalApp::with_size(TowerSpec::default(), 80, 40);
        app.handle_event(Event::Resize(100, 20));
        assert_eq!(app.renderer().width(), 100);
        assert_eq!(app.renderer().height(), 20);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the herb garden.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Keyboard arrows and WASD drive the directional buttons, a left mouse drag
//! drives the virtual joystick. Both sources are always forwarded; the input
//! controller decides which one is active.

use garden_core::{InputGesture, InputMode, MoveDirection, PointerPosition, ZoomStep};
use garden_rendering::{
    Color, FrameClock, FrameControl, FrameInput, Palette, Presentation, RenderingBackend, Scene,
};
use glam::Vec2;
use log::info;
use macroquad::input::{
    is_key_down, is_key_pressed, is_key_released, is_mouse_button_down,
    is_mouse_button_pressed, is_mouse_button_released, mouse_position, KeyCode, MouseButton,
};
use std::time::Duration;

const HUD_FONT_SIZE: f32 = 22.0;
const HUD_MARGIN: f32 = 16.0;
const KNOB_RADIUS: f32 = 14.0;

/// Keys mapped onto each movement button.
const DIRECTION_KEYS: [(KeyCode, MoveDirection); 8] = [
    (KeyCode::Up, MoveDirection::Forward),
    (KeyCode::W, MoveDirection::Forward),
    (KeyCode::Down, MoveDirection::Back),
    (KeyCode::S, MoveDirection::Back),
    (KeyCode::Left, MoveDirection::Left),
    (KeyCode::A, MoveDirection::Left),
    (KeyCode::Right, MoveDirection::Right),
    (KeyCode::D, MoveDirection::Right),
];

/// Tracks clicks on the on-screen mode button so they can be merged with
/// keyboard input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PanelInputState {
    mode_toggle_latched: bool,
}

impl PanelInputState {
    /// Returns whether the panel requested a mode toggle and clears the latch
    /// so the action fires only once.
    pub fn take_mode_toggle(&mut self) -> bool {
        let latched = self.mode_toggle_latched;
        self.mode_toggle_latched = false;
        latched
    }

    /// Records that the mode button was clicked this frame.
    pub fn register_mode_toggle(&mut self) {
        self.mode_toggle_latched = true;
    }
}

/// Raw pointer state sampled once per frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Pointer location in screen pixels.
    pub position: Vec2,
    /// Whether the primary button went down this frame.
    pub pressed: bool,
    /// Whether the primary button is held.
    pub down: bool,
    /// Whether the primary button went up this frame.
    pub released: bool,
}

/// Converts pointer samples into joystick gestures.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    dragging: bool,
    last: Option<Vec2>,
}

impl PointerTracker {
    /// Feeds one sample and returns the joystick gesture it implies, if any.
    ///
    /// A move is only reported while a drag is in progress and the pointer
    /// actually changed position.
    pub fn observe(&mut self, sample: PointerSample) -> Option<InputGesture> {
        let point = PointerPosition::new(sample.position.x, sample.position.y);

        if sample.pressed && !self.dragging {
            self.dragging = true;
            self.last = Some(sample.position);
            return Some(InputGesture::JoystickGrant { point });
        }

        if !self.dragging {
            return None;
        }

        if sample.released || !sample.down {
            self.dragging = false;
            self.last = None;
            return Some(InputGesture::JoystickRelease);
        }

        if self.last == Some(sample.position) {
            return None;
        }

        self.last = Some(sample.position);
        Some(InputGesture::JoystickMove { point })
    }

    /// Whether a drag is currently in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` leaves the garden.
    quit_requested: bool,
    /// `M` or `Tab` switches between joystick and buttons.
    toggle_mode: bool,
    /// `=` or keypad `+` zooms in, `-` or keypad `-` zooms out.
    zoom: Option<ZoomStep>,
    /// `I` or `Enter` opens the detail card of the nearby plant.
    request_detail: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let toggle_mode = is_key_pressed(KeyCode::M) || is_key_pressed(KeyCode::Tab);
        let zoom = if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
            Some(ZoomStep::In)
        } else if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
            Some(ZoomStep::Out)
        } else {
            None
        };
        let request_detail = is_key_pressed(KeyCode::I) || is_key_pressed(KeyCode::Enter);

        Self {
            quit_requested,
            toggle_mode,
            zoom,
            request_detail,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Counts frames and reports the rate once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> anyhow::Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            palette,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.viewport.width().round() as i32,
            window_height: scene.viewport.height().round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut clock = FrameClock::new();
            let mut fps_counter = FpsCounter::default();
            let mut panel_input = PanelInputState::default();
            let mut pointer = PointerTracker::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                if let Ok(viewport) = garden_rendering::Viewport::new(screen_width, screen_height)
                {
                    scene.viewport = viewport;
                }

                let frame_dt = clock.advance(macroquad::time::get_time() * 1_000.0);
                let mode_button = mode_button_bounds(screen_width);
                let frame_input = gather_frame_input(
                    keyboard,
                    panel_input.take_mode_toggle(),
                    &mut pointer,
                    mode_button,
                );

                if update_scene(frame_dt, frame_input, &mut scene) == FrameControl::Exit {
                    break;
                }

                draw_plants(&scene, &palette);
                draw_player(&scene, &palette);
                draw_joystick(&scene, &palette);
                draw_hud(&scene, &palette);
                if draw_mode_button(&scene, &palette, mode_button) {
                    panel_input.register_mode_toggle();
                }

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        info!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen rectangle of the mode button as `(top_left, size)`.
fn mode_button_bounds(screen_width: f32) -> (Vec2, Vec2) {
    let size = Vec2::new(150.0, 36.0);
    (Vec2::new(screen_width - size.x - HUD_MARGIN, HUD_MARGIN), size)
}

fn contains(bounds: (Vec2, Vec2), point: Vec2) -> bool {
    let (origin, size) = bounds;
    point.cmpge(origin).all() && point.cmple(origin + size).all()
}

fn gather_frame_input(
    keyboard: KeyboardShortcuts,
    mode_toggle: bool,
    pointer: &mut PointerTracker,
    mode_button: (Vec2, Vec2),
) -> FrameInput {
    let mut gestures = Vec::new();

    for (key, direction) in DIRECTION_KEYS {
        if is_key_pressed(key) {
            gestures.push(InputGesture::ButtonPressIn { direction });
        } else if is_key_released(key) && !direction_still_held(direction) {
            gestures.push(InputGesture::ButtonPressOut { direction });
        }
    }

    let (cursor_x, cursor_y) = mouse_position();
    let position = Vec2::new(cursor_x, cursor_y);
    let pressed = is_mouse_button_pressed(MouseButton::Left);
    let over_button = contains(mode_button, position);
    if !(pressed && over_button && !pointer.is_dragging()) {
        let sample = PointerSample {
            position,
            pressed,
            down: is_mouse_button_down(MouseButton::Left),
            released: is_mouse_button_released(MouseButton::Left),
        };
        gestures.extend(pointer.observe(sample));
    }

    FrameInput {
        gestures,
        mode_toggle: mode_toggle || keyboard.toggle_mode,
        zoom: keyboard.zoom,
        request_detail: keyboard.request_detail,
        exit_requested: keyboard.quit_requested,
    }
}

/// Releasing one of two keys bound to the same direction keeps the button held.
fn direction_still_held(direction: MoveDirection) -> bool {
    DIRECTION_KEYS
        .iter()
        .any(|&(key, bound)| bound == direction && is_key_down(key))
}

fn draw_plants(scene: &Scene, palette: &Palette) {
    for sprite in &scene.plants {
        let fill = if sprite.nearby {
            palette.nearby_plant
        } else {
            palette.plant
        };
        let position = sprite.screen_position;
        macroquad::shapes::draw_circle(
            position.x,
            position.y,
            sprite.radius,
            to_macroquad_color(fill),
        );
        if sprite.nearby {
            macroquad::shapes::draw_circle_lines(
                position.x,
                position.y,
                sprite.radius + 4.0,
                2.0,
                to_macroquad_color(palette.text),
            );
        }

        let label_size = HUD_FONT_SIZE * 0.8;
        let width = sprite.label.chars().count() as f32 * label_size * 0.45;
        let _ = macroquad::text::draw_text(
            &sprite.label,
            position.x - width * 0.5,
            position.y + sprite.radius + label_size,
            label_size,
            to_macroquad_color(palette.text),
        );
    }
}

fn draw_player(scene: &Scene, palette: &Palette) {
    let center = scene.player_position();
    let fill = if scene.player.moving {
        palette.player.lighten(0.25)
    } else {
        palette.player
    };
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        scene.player.radius,
        to_macroquad_color(fill),
    );
}

fn draw_joystick(scene: &Scene, palette: &Palette) {
    let Some(joystick) = scene.joystick else {
        return;
    };

    macroquad::shapes::draw_circle_lines(
        joystick.anchor.x,
        joystick.anchor.y,
        joystick.reach,
        3.0,
        to_macroquad_color(palette.joystick_base),
    );
    let knob = joystick.knob();
    macroquad::shapes::draw_circle(
        knob.x,
        knob.y,
        KNOB_RADIUS,
        to_macroquad_color(palette.joystick_knob),
    );
}

fn draw_hud(scene: &Scene, palette: &Palette) {
    let text_color = to_macroquad_color(palette.text);
    let hud = &scene.hud;
    let mut line = HUD_MARGIN + HUD_FONT_SIZE;
    let line_height = HUD_FONT_SIZE * 1.2;

    let mut write = |text: &str| {
        let _ = macroquad::text::draw_text(text, HUD_MARGIN, line, HUD_FONT_SIZE, text_color);
        line += line_height;
    };

    write(&hud.banner);
    write(&format!("Zoom {:.1}x", hud.zoom));
    match &hud.nearby_label {
        Some(name) => write(&format!("Near {name} (press I for details)")),
        None => write("Walk up to a plant to learn about it"),
    }

    let Some(detail) = &hud.detail else {
        return;
    };

    let width = (scene.viewport.width() - 2.0 * HUD_MARGIN).min(520.0);
    let rows = 2 + detail.benefits.len();
    let height = rows as f32 * line_height + 2.0 * HUD_MARGIN;
    let left = HUD_MARGIN;
    let top = scene.viewport.height() - height - HUD_MARGIN;
    macroquad::shapes::draw_rectangle(
        left,
        top,
        width,
        height,
        to_macroquad_color(Color::new(0.0, 0.0, 0.0, 0.7)),
    );

    let mut row = top + HUD_MARGIN + HUD_FONT_SIZE;
    let mut card_line = |text: &str| {
        let _ = macroquad::text::draw_text(
            text,
            left + HUD_MARGIN,
            row,
            HUD_FONT_SIZE,
            text_color,
        );
        row += line_height;
    };
    card_line(&detail.name);
    card_line(&detail.description);
    for benefit in &detail.benefits {
        card_line(&format!("* {benefit}"));
    }
}

/// Draws the mode button and reports whether it was clicked this frame.
fn draw_mode_button(scene: &Scene, palette: &Palette, bounds: (Vec2, Vec2)) -> bool {
    let (origin, size) = bounds;
    let label = match scene.hud.input_mode {
        InputMode::Joystick => "Mode: joystick",
        InputMode::Buttons => "Mode: buttons",
    };

    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(palette.plant.with_alpha(0.6)),
    );
    macroquad::shapes::draw_rectangle_lines(
        origin.x,
        origin.y,
        size.x,
        size.y,
        2.0,
        to_macroquad_color(palette.text),
    );
    let _ = macroquad::text::draw_text(
        label,
        origin.x + 10.0,
        origin.y + size.y * 0.65,
        HUD_FONT_SIZE * 0.9,
        to_macroquad_color(palette.text),
    );

    let (cursor_x, cursor_y) = mouse_position();
    is_mouse_button_pressed(MouseButton::Left) && contains(bounds, Vec2::new(cursor_x, cursor_y))
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_button_hugs_top_right_corner() {
        let (origin, size) = mode_button_bounds(800.0);

        assert_eq!(origin.x + size.x, 800.0 - HUD_MARGIN);
        assert_eq!(origin.y, HUD_MARGIN);
        assert!(contains((origin, size), origin + size * 0.5));
        assert!(!contains((origin, size), Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn every_direction_has_two_keys() {
        for direction in MoveDirection::ALL {
            let keys = DIRECTION_KEYS
                .iter()
                .filter(|(_, bound)| *bound == direction)
                .count();
            assert_eq!(keys, 2, "{direction:?}");
        }
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);

        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), Some(4.0));
        assert_eq!(counter.record_frame(frame), None);
    }

    #[test]
    fn color_conversion_preserves_channels() {
        let converted = to_macroquad_color(Color::new(0.1, 0.2, 0.3, 0.4));

        assert_eq!(
            (converted.r, converted.g, converted.b, converted.a),
            (0.1, 0.2, 0.3, 0.4)
        );
    }
}

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas;
use sdl2::video::Window;

use crate::joypad::Button;
use crate::nes::Nes;
use crate::screen_buffer::ScreenBuffer;

/// NTSC frame rate the loop paces itself against
const TARGET_FPS: f64 = 60.0988;

/// EventLoop manages the SDL2 window, input and frame pacing for the
/// emulator. It exits when Escape is pressed or the window is closed.
pub struct EventLoop {
    _sdl_context: sdl2::Sdl,
    canvas: Option<Canvas<Window>>,
    event_pump: sdl2::EventPump,
    speed: f32,
}

impl EventLoop {
    const MIN_SCALE: f32 = 1.0;
    const MAX_SCALE: f32 = 5.0;
    const MIN_SPEED: f32 = 0.1;
    const MAX_SPEED: f32 = 10.0;

    /// Creates a new EventLoop.
    ///
    /// # Arguments
    ///
    /// * `headless` - If `true`, no window is created (useful for testing).
    /// * `video_scale` - Window scaling factor, clamped to [1.0, 5.0].
    /// * `speed` - Emulation speed multiplier, clamped to [0.1, 10.0].
    ///
    /// # Errors
    ///
    /// Returns an error if SDL2 initialization fails, the event pump cannot
    /// be created, or (when `headless` is `false`) the window cannot be
    /// created.
    pub fn new(headless: bool, video_scale: f32, speed: f32) -> Result<Self, String> {
        let video_scale = Self::clamp_scale(video_scale);
        let speed = Self::clamp_speed(speed);

        let sdl_context = sdl2::init()?;
        let event_pump = sdl_context.event_pump()?;

        let canvas = if headless {
            None
        } else {
            Some(Self::create_window_and_canvas(&sdl_context, video_scale)?)
        };

        Ok(EventLoop {
            _sdl_context: sdl_context,
            canvas,
            event_pump,
            speed,
        })
    }

    /// Clamps the video scaling factor to the valid range [1.0, 5.0].
    fn clamp_scale(scale: f32) -> f32 {
        if scale < Self::MIN_SCALE {
            log::warn!(
                "video scale {} below minimum, clamping to {}",
                scale,
                Self::MIN_SCALE
            );
            Self::MIN_SCALE
        } else if scale > Self::MAX_SCALE {
            log::warn!(
                "video scale {} above maximum, clamping to {}",
                scale,
                Self::MAX_SCALE
            );
            Self::MAX_SCALE
        } else {
            scale
        }
    }

    /// Clamps the speed multiplier to the valid range [0.1, 10.0].
    fn clamp_speed(speed: f32) -> f32 {
        if speed < Self::MIN_SPEED {
            log::warn!(
                "speed {} below minimum, clamping to {}",
                speed,
                Self::MIN_SPEED
            );
            Self::MIN_SPEED
        } else if speed > Self::MAX_SPEED {
            log::warn!(
                "speed {} above maximum, clamping to {}",
                speed,
                Self::MAX_SPEED
            );
            Self::MAX_SPEED
        } else {
            speed
        }
    }

    fn create_window_and_canvas(
        sdl_context: &sdl2::Sdl,
        scale: f32,
    ) -> Result<Canvas<Window>, String> {
        let scaled_width = (ScreenBuffer::WIDTH as f32 * scale) as u32;
        let scaled_height = (ScreenBuffer::HEIGHT as f32 * scale) as u32;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window("famicore", scaled_width, scaled_height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        canvas.set_draw_color(sdl2::pixels::Color::RGB(0, 0, 0));
        canvas.clear();
        canvas.present();

        Ok(canvas)
    }

    fn map_key(keycode: Keycode) -> Option<Button> {
        match keycode {
            Keycode::X => Some(Button::A),
            Keycode::Z => Some(Button::B),
            Keycode::RShift => Some(Button::Select),
            Keycode::Return => Some(Button::Start),
            Keycode::Up => Some(Button::Up),
            Keycode::Down => Some(Button::Down),
            Keycode::Left => Some(Button::Left),
            Keycode::Right => Some(Button::Right),
            _ => None,
        }
    }

    /// Drains the event queue, forwarding key state to the first joypad.
    /// Returns `true` if quit was requested.
    fn handle_events(event_pump: &mut sdl2::EventPump, nes: &mut Nes) -> bool {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return true,
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(button) = Self::map_key(keycode) {
                        nes.set_joypad1_button(button, true);
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(button) = Self::map_key(keycode) {
                        nes.set_joypad1_button(button, false);
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Copies the PPU screen buffer into the streaming texture and presents
    /// it, scaled to the window.
    fn render_frame(
        canvas: &mut Canvas<Window>,
        texture: &mut sdl2::render::Texture,
        nes: &Nes,
    ) -> Result<(), String> {
        let ppu = nes.ppu.borrow();
        let screen = ppu.screen();

        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                if pitch == screen.pitch() {
                    // Fast path: the texture rows are packed like ours
                    buffer[..screen.as_bytes().len()].copy_from_slice(screen.as_bytes());
                } else {
                    // Slow path: copy row by row to handle non-standard pitch
                    for y in 0..ScreenBuffer::HEIGHT {
                        for x in 0..ScreenBuffer::WIDTH {
                            let (r, g, b) = screen.pixel(x, y);
                            let offset = y as usize * pitch + x as usize * 3;
                            buffer[offset] = r;
                            buffer[offset + 1] = g;
                            buffer[offset + 2] = b;
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        canvas.set_draw_color(sdl2::pixels::Color::RGB(0, 0, 0));
        canvas.clear();
        canvas
            .copy(texture, None, None)
            .map_err(|e| e.to_string())?;
        canvas.present();

        Ok(())
    }

    /// Runs the loop: poll events, emulate one frame, draw it, then sleep
    /// off the remainder of the frame period.
    pub fn run(&mut self, nes: &mut Nes) -> Result<(), String> {
        let target_frame_time = 1.0 / (TARGET_FPS * self.speed as f64);

        let timer = self._sdl_context.timer()?;
        let performance_frequency = timer.performance_frequency() as f64;
        let mut last_frame_time = timer.performance_counter();

        if let Some(ref mut canvas) = self.canvas {
            let texture_creator = canvas.texture_creator();
            let mut texture = texture_creator
                .create_texture_streaming(
                    PixelFormatEnum::RGB24,
                    ScreenBuffer::WIDTH,
                    ScreenBuffer::HEIGHT,
                )
                .map_err(|e| e.to_string())?;

            loop {
                if Self::handle_events(&mut self.event_pump, nes) {
                    return Ok(());
                }

                nes.run_frame().map_err(|e| e.to_string())?;
                Self::render_frame(canvas, &mut texture, nes)?;

                let current_time = timer.performance_counter();
                let elapsed =
                    (current_time - last_frame_time) as f64 / performance_frequency;
                last_frame_time = current_time;
                if elapsed < target_frame_time {
                    std::thread::sleep(std::time::Duration::from_secs_f64(
                        target_frame_time - elapsed,
                    ));
                }
            }
        } else {
            // Headless: emulate without drawing, still paced and responsive
            // to quit events
            loop {
                if Self::handle_events(&mut self.event_pump, nes) {
                    return Ok(());
                }

                nes.run_frame().map_err(|e| e.to_string())?;

                let current_time = timer.performance_counter();
                let elapsed =
                    (current_time - last_frame_time) as f64 / performance_frequency;
                last_frame_time = current_time;
                if elapsed < target_frame_time {
                    std::thread::sleep(std::time::Duration::from_secs_f64(
                        target_frame_time - elapsed,
                    ));
                }
            }
        }
    }
}

//! Diagnostic overlay showing the estimated camera movement on each frame.

use image::Rgb;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::camera_motion::MotionVector;
use crate::frame::Frame;

/// Panel drawn in the top-left corner as (x, y, width, height).
pub const PANEL_RECT: (i32, i32, u32, u32) = (0, 0, 500, 100);

/// Weight of the white panel when blended over the frame.
pub const PANEL_ALPHA: f32 = 0.6;

const TEXT_SCALE: u32 = 3;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Draw the camera movement panel on a copy of every frame.
///
/// Frames past the end of `movement` show a zero vector.
pub fn draw_camera_movement(frames: &[Frame], movement: &[MotionVector]) -> Vec<Frame> {
    frames
        .iter()
        .enumerate()
        .map(|(frame_num, frame)| {
            let mut output = frame.clone();
            let vector = movement.get(frame_num).copied().unwrap_or(MotionVector::ZERO);
            draw_movement_panel(&mut output, vector);
            output
        })
        .collect()
}

/// Draw the camera movement panel onto a single frame in place.
pub fn draw_movement_panel(frame: &mut Frame, vector: MotionVector) {
    let (x, y, width, height) = PANEL_RECT;

    let mut overlay = frame.clone();
    draw_filled_rect_mut(&mut overlay, Rect::at(x, y).of_size(width, height), WHITE);
    blend_region(frame, &overlay, PANEL_RECT, PANEL_ALPHA);

    draw_text(frame, &format!("Camera Movement X: {:.2}", vector.dx), 10, 30);
    draw_text(frame, &format!("Camera Movement Y: {:.2}", vector.dy), 10, 60);
}

/// `frame = alpha * overlay + (1 - alpha) * frame` inside `rect`.
fn blend_region(frame: &mut Frame, overlay: &Frame, rect: (i32, i32, u32, u32), alpha: f32) {
    let (x0, y0, width, height) = rect;
    let x0 = x0.max(0) as u32;
    let y0 = y0.max(0) as u32;
    let x1 = (x0 + width).min(frame.width());
    let y1 = (y0 + height).min(frame.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let top = overlay.get_pixel(x, y);
            let bottom = frame.get_pixel_mut(x, y);
            for c in 0..3 {
                let value = alpha * top[c] as f32 + (1.0 - alpha) * bottom[c] as f32;
                bottom[c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Draw `text` in black with its baseline at `(x, baseline)`.
fn draw_text(frame: &mut Frame, text: &str, x: i32, baseline: i32) {
    let top = baseline - (GLYPH_HEIGHT * TEXT_SCALE) as i32;

    for (i, ch) in text.to_uppercase().chars().enumerate() {
        let char_x = x + (i as u32 * GLYPH_ADVANCE * TEXT_SCALE) as i32;

        for (row, &bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    let px = char_x + (col * TEXT_SCALE) as i32;
                    let py = top + (row as u32 * TEXT_SCALE) as i32;
                    draw_filled_rect_mut(frame, Rect::at(px, py).of_size(TEXT_SCALE, TEXT_SCALE), BLACK);
                }
            }
        }
    }
}

/// 5x7 bitmap for the characters the panel uses.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ' ' => [0; 7],
        // Box for anything else
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

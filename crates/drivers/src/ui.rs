use std::time::Duration;

use color_probe_adapters::{present_metrics, present_outcome};
use color_probe_application::{
    AnalysisService, GatewayMetricsQuery, LoadImageCommand, PickColorCommand, PollOutcomeCommand,
    ResetSessionCommand, StartAnalysisCommand,
};
use color_probe_domain::{pack_rgb, SessionEvent, SessionPhase};
use font8x8::UnicodeFonts;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

const WINDOW_WIDTH: usize = 960;
const WINDOW_HEIGHT: usize = 600;
const CANVAS_MARGIN: usize = 20;
const HEADER_TOP: usize = 16;
const HEADER_HEIGHT: usize = 44;
const WORKAREA_TOP: usize = 76;
const WORKAREA_BOTTOM_MARGIN: usize = 24;
const SPLIT_GUTTER: usize = 20;
const INFO_PANEL_WIDTH: usize = 300;
const STAGE_INSET: usize = 12;
const SWATCH_SIZE: usize = 48;
const LINE_HEIGHT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImageStage {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl ImageStage {
    fn click_position(&self, mouse_x: f32, mouse_y: f32) -> Option<(f32, f32)> {
        let local_x = mouse_x - self.left as f32;
        let local_y = mouse_y - self.top as f32;
        if local_x < 0.0 || local_y < 0.0 {
            return None;
        }
        if local_x >= self.width as f32 || local_y >= self.height as f32 {
            return None;
        }
        Some((local_x, local_y))
    }
}

pub fn launch_window(
    service: &mut AnalysisService,
    base_url: &str,
    image_path: Option<String>,
) -> Result<(), String> {
    let width = WINDOW_WIDTH;
    let height = WINDOW_HEIGHT;

    let mut window = Window::new(
        &format!("color-probe | {base_url}"),
        width,
        height,
        WindowOptions::default(),
    )
    .map_err(|error| format!("failed to start UI window: {error}"))?;
    window.limit_update_rate(Some(Duration::from_micros(16_000)));

    let mut buffer = vec![0x1B1F26_u32; width * height];
    let mut status = "load an image to start".to_string();
    let mut last_path = image_path;
    if let Some(path) = last_path.clone() {
        status = load_into_session(service, path);
    }

    let mut was_mouse_down = false;
    while window.is_open() && !window.is_key_down(Key::Escape) {
        if window.is_key_pressed(Key::A, KeyRepeat::No) {
            status = match service.start_analysis(StartAnalysisCommand) {
                Ok(ticket) => format!("analysis {} submitted", ticket.get()),
                Err(error) => error.to_string(),
            };
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            service.reset(ResetSessionCommand);
            status = "session reset".to_string();
        }
        if window.is_key_pressed(Key::O, KeyRepeat::No) {
            status = match last_path.clone() {
                Some(path) => load_into_session(service, path),
                None => "no image path to reload".to_string(),
            };
        }

        let mouse_down = window.get_mouse_down(MouseButton::Left);
        if mouse_down && !was_mouse_down {
            if let Some((mouse_x, mouse_y)) = window.get_mouse_pos(MouseMode::Discard) {
                if let Some(stage) = current_stage(service, width, height) {
                    if let Some((click_x, click_y)) = stage.click_position(mouse_x, mouse_y) {
                        status = match service.pick_color(PickColorCommand {
                            rendered_width: stage.width as f32,
                            rendered_height: stage.height as f32,
                            click_x,
                            click_y,
                        }) {
                            Ok(sample) => format!(
                                "sampled rgb=({}, {}, {})",
                                sample.red, sample.green, sample.blue
                            ),
                            Err(error) => error.to_string(),
                        };
                    }
                }
            }
        }
        was_mouse_down = mouse_down;

        if let Some(event) = service
            .poll_outcome(PollOutcomeCommand)
            .map_err(|error| format!("outcome poll failed: {error}"))?
        {
            match event {
                SessionEvent::AnalysisFinished(_) => {
                    status = present_outcome(service.session().outcome());
                }
                SessionEvent::StrayReportIgnored(ticket) => {
                    status = format!("ignored stray result {}", ticket.get());
                }
                _ => {}
            }
        }

        draw_background(&mut buffer, width, height);
        draw_header(&mut buffer, width);
        draw_image_panel(&mut buffer, width, height, service);
        draw_info_panel(&mut buffer, width, height, service, &status);

        let metrics = service
            .gateway_metrics(GatewayMetricsQuery)
            .map_err(|error| format!("metrics poll failed: {error}"))?;
        window.set_title(&format!(
            "color-probe | {} | phase={} | {} | click sample | a analyze | o reload | r reset | esc quit",
            base_url,
            phase_label(service.session().phase()),
            present_metrics(&metrics)
        ));

        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|error| format!("failed to update UI window: {error}"))?;
    }

    Ok(())
}

fn load_into_session(service: &mut AnalysisService, path: String) -> String {
    match service.load_image(LoadImageCommand { path: path.clone() }) {
        Ok(_) => {
            log::info!("loaded image {path}");
            format!("loaded {path}")
        }
        Err(error) => error.to_string(),
    }
}

fn current_stage(service: &AnalysisService, width: usize, height: usize) -> Option<ImageStage> {
    let asset = service.session().asset()?;
    fit_stage(
        asset.natural_width(),
        asset.natural_height(),
        width,
        height,
    )
}

fn fit_stage(
    natural_width: u32,
    natural_height: u32,
    window_width: usize,
    window_height: usize,
) -> Option<ImageStage> {
    let area_left = image_panel_left() + STAGE_INSET;
    let area_top = image_panel_top() + STAGE_INSET;
    let area_right = image_panel_right(window_width).saturating_sub(STAGE_INSET);
    let area_bottom = image_panel_bottom(window_height).saturating_sub(STAGE_INSET);
    let max_width = area_right.saturating_sub(area_left);
    let max_height = area_bottom.saturating_sub(area_top);
    if max_width == 0 || max_height == 0 || natural_width == 0 || natural_height == 0 {
        return None;
    }

    let scale = (max_width as f32 / natural_width as f32)
        .min(max_height as f32 / natural_height as f32);
    let stage_width = ((natural_width as f32 * scale).max(1.0)).round() as usize;
    let stage_height = ((natural_height as f32 * scale).max(1.0)).round() as usize;

    Some(ImageStage {
        left: area_left + (max_width.saturating_sub(stage_width)) / 2,
        top: area_top + (max_height.saturating_sub(stage_height)) / 2,
        width: stage_width.min(max_width),
        height: stage_height.min(max_height),
    })
}

fn draw_image_panel(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    service: &AnalysisService,
) {
    let panel_left = image_panel_left();
    let panel_top = image_panel_top();
    let panel_width = image_panel_right(width).saturating_sub(panel_left);
    let panel_height = image_panel_bottom(height).saturating_sub(panel_top);
    fill_rect(buffer, width, panel_left, panel_top, panel_width, panel_height, 0x10131A);
    draw_rect(buffer, width, panel_left, panel_top, panel_width, panel_height, 0x3A4354);

    let Some(asset) = service.session().asset() else {
        draw_text(
            buffer,
            width,
            panel_left + STAGE_INSET,
            panel_top + STAGE_INSET,
            "NO IMAGE LOADED",
            0x5A667A,
        );
        return;
    };
    let Some(stage) = fit_stage(asset.natural_width(), asset.natural_height(), width, height)
    else {
        return;
    };

    let natural_width = asset.natural_width() as usize;
    let natural_height = asset.natural_height() as usize;
    let pixels = asset.pixels();
    for y in 0..stage.height {
        let src_y = y * natural_height / stage.height;
        for x in 0..stage.width {
            let src_x = x * natural_width / stage.width;
            let color = pixels[src_y * natural_width + src_x];
            set_pixel(buffer, width, stage.left + x, stage.top + y, color);
        }
    }

    if let Some(sample) = service.session().sample() {
        draw_marker(
            buffer,
            width,
            stage.left + sample.display_x.max(0.0) as usize,
            stage.top + sample.display_y.max(0.0) as usize,
        );
    }
}

fn draw_marker(buffer: &mut [u32], width: usize, x: usize, y: usize) {
    for offset in 2..7 {
        set_pixel(buffer, width, x + offset, y, 0xFFFFFF);
        set_pixel(buffer, width, x.saturating_sub(offset), y, 0xFFFFFF);
        set_pixel(buffer, width, x, y + offset, 0xFFFFFF);
        set_pixel(buffer, width, x, y.saturating_sub(offset), 0xFFFFFF);
    }
    draw_rect(buffer, width, x.saturating_sub(2), y.saturating_sub(2), 5, 5, 0x1B1F26);
}

fn draw_info_panel(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    service: &AnalysisService,
    status: &str,
) {
    let left = info_panel_left(width);
    let top = image_panel_top();
    let panel_width = info_panel_right(width).saturating_sub(left);
    let panel_height = image_panel_bottom(height).saturating_sub(top);
    fill_rect(buffer, width, left, top, panel_width, panel_height, 0x232938);
    draw_rect(buffer, width, left, top, panel_width, panel_height, 0x3A4354);

    let text_left = left + 16;
    let mut cursor = top + 16;
    draw_text(
        buffer,
        width,
        text_left,
        cursor,
        &format!("PHASE: {}", phase_label(service.session().phase())),
        0xE8EBF2,
    );
    cursor += LINE_HEIGHT * 2;

    match service.session().sample() {
        Some(sample) => {
            let swatch = pack_rgb(sample.red, sample.green, sample.blue);
            fill_rect(buffer, width, text_left, cursor, SWATCH_SIZE, SWATCH_SIZE, swatch);
            draw_rect(buffer, width, text_left, cursor, SWATCH_SIZE, SWATCH_SIZE, 0xE8EBF2);
            draw_text(
                buffer,
                width,
                text_left + SWATCH_SIZE + 12,
                cursor + SWATCH_SIZE / 2 - 4,
                &format!("R {} G {} B {}", sample.red, sample.green, sample.blue),
                0xE8EBF2,
            );
            cursor += SWATCH_SIZE + LINE_HEIGHT;
        }
        None => {
            draw_text(
                buffer,
                width,
                text_left,
                cursor,
                "CLICK THE IMAGE TO SAMPLE",
                0x8A93A6,
            );
            cursor += LINE_HEIGHT * 2;
        }
    }

    for line in wrap_text(&present_outcome(service.session().outcome()), 34) {
        draw_text(buffer, width, text_left, cursor, &line, 0xC8D0DE);
        cursor += LINE_HEIGHT;
    }
    cursor += LINE_HEIGHT;

    for line in wrap_text(status, 34) {
        draw_text(buffer, width, text_left, cursor, &line, 0x8A93A6);
        cursor += LINE_HEIGHT;
    }

    let help_top = image_panel_bottom(height).saturating_sub(LINE_HEIGHT * 4 + 8);
    for (index, line) in ["A  ANALYZE", "O  RELOAD IMAGE", "R  RESET", "ESC  QUIT"]
        .iter()
        .enumerate()
    {
        draw_text(
            buffer,
            width,
            text_left,
            help_top + index * LINE_HEIGHT,
            line,
            0x5A667A,
        );
    }
}

fn draw_background(buffer: &mut [u32], width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            buffer[y * width + x] = 0x1B1F26;
        }
    }
}

fn draw_header(buffer: &mut [u32], width: usize) {
    let left = CANVAS_MARGIN;
    let band_width = width.saturating_sub(CANVAS_MARGIN * 2);
    fill_rect(buffer, width, left, HEADER_TOP, band_width, HEADER_HEIGHT, 0x232938);
    draw_rect(buffer, width, left, HEADER_TOP, band_width, HEADER_HEIGHT, 0x3A4354);
    fill_rect(buffer, width, left + 10, HEADER_TOP + 8, 6, HEADER_HEIGHT - 16, 0xF05C4B);
    draw_text(
        buffer,
        width,
        left + 26,
        HEADER_TOP + 18,
        "COLOR PROBE",
        0xE8EBF2,
    );
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "IDLE",
        SessionPhase::ImageLoaded => "IMAGE LOADED",
        SessionPhase::SampleReady => "SAMPLE READY",
        SessionPhase::Analyzing => "ANALYZING",
    }
}

fn image_panel_left() -> usize {
    CANVAS_MARGIN
}

fn image_panel_top() -> usize {
    WORKAREA_TOP
}

fn image_panel_right(width: usize) -> usize {
    width.saturating_sub(CANVAS_MARGIN + INFO_PANEL_WIDTH + SPLIT_GUTTER)
}

fn image_panel_bottom(height: usize) -> usize {
    height.saturating_sub(WORKAREA_BOTTOM_MARGIN)
}

fn info_panel_left(width: usize) -> usize {
    image_panel_right(width).saturating_add(SPLIT_GUTTER)
}

fn info_panel_right(width: usize) -> usize {
    width.saturating_sub(CANVAS_MARGIN)
}

fn set_pixel(buffer: &mut [u32], width: usize, x: usize, y: usize, color: u32) {
    let height = buffer.len() / width;
    if x < width && y < height {
        buffer[y * width + x] = color;
    }
}

fn fill_rect(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize, color: u32) {
    for y in top..top.saturating_add(h) {
        for x in left..left.saturating_add(w) {
            set_pixel(buffer, width, x, y, color);
        }
    }
}

fn draw_rect(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize, color: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let right = left + w - 1;
    let bottom = top + h - 1;
    for x in left..=right {
        set_pixel(buffer, width, x, top, color);
        set_pixel(buffer, width, x, bottom, color);
    }
    for y in top..=bottom {
        set_pixel(buffer, width, left, y, color);
        set_pixel(buffer, width, right, y, color);
    }
}

fn draw_text(buffer: &mut [u32], width: usize, x: usize, y: usize, text: &str, color: u32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if ch == '\n' {
            continue;
        }
        draw_char(buffer, width, cursor_x, y, ch, color);
        cursor_x = cursor_x.saturating_add(8);
    }
}

fn draw_char(buffer: &mut [u32], width: usize, x: usize, y: usize, ch: char, color: u32) {
    let glyph = font8x8::BASIC_FONTS.get(ch).unwrap_or([0; 8]);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if (bits >> col) & 1 == 1 {
                set_pixel(buffer, width, x + col, y + row, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_preserves_aspect_ratio_and_centers() {
        let stage = fit_stage(100, 100, WINDOW_WIDTH, WINDOW_HEIGHT).expect("stage");
        assert_eq!(stage.width, stage.height);
        let area_left = image_panel_left() + STAGE_INSET;
        let area_right = image_panel_right(WINDOW_WIDTH) - STAGE_INSET;
        assert!(stage.left >= area_left);
        assert!(stage.left + stage.width <= area_right);
    }

    #[test]
    fn click_inside_stage_maps_to_local_coordinates() {
        let stage = ImageStage {
            left: 40,
            top: 90,
            width: 200,
            height: 100,
        };
        assert_eq!(stage.click_position(50.0, 100.0), Some((10.0, 10.0)));
        assert_eq!(stage.click_position(40.0, 90.0), Some((0.0, 0.0)));
    }

    #[test]
    fn click_outside_stage_is_ignored() {
        let stage = ImageStage {
            left: 40,
            top: 90,
            width: 200,
            height: 100,
        };
        assert_eq!(stage.click_position(39.0, 100.0), None);
        assert_eq!(stage.click_position(50.0, 300.0), None);
        assert_eq!(stage.click_position(240.0, 100.0), None);
    }

    #[test]
    fn wrapped_text_respects_the_column_limit() {
        let lines = wrap_text("analysis failed: the service rejected the request", 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.len() <= 20));
    }

    #[test]
    fn phase_labels_cover_all_phases() {
        assert_eq!(phase_label(SessionPhase::Idle), "IDLE");
        assert_eq!(phase_label(SessionPhase::ImageLoaded), "IMAGE LOADED");
        assert_eq!(phase_label(SessionPhase::SampleReady), "SAMPLE READY");
        assert_eq!(phase_label(SessionPhase::Analyzing), "ANALYZING");
    }
}

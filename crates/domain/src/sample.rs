use crate::{unpack_rgb, DomainError, ImageAsset};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    pub display_x: f32,
    pub display_y: f32,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorSample {
    pub fn rgb(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Maps a click on the rendered image back to the original-resolution
/// pixel and reads its color. Pure: identical inputs yield identical
/// samples.
pub fn sample_color(
    asset: &ImageAsset,
    rendered_width: f32,
    rendered_height: f32,
    click_x: f32,
    click_y: f32,
) -> Result<ColorSample, DomainError> {
    if !rendered_width.is_finite() || !rendered_height.is_finite() {
        return Err(DomainError::EmptyRenderArea);
    }
    if rendered_width <= 0.0 || rendered_height <= 0.0 {
        return Err(DomainError::EmptyRenderArea);
    }
    if !click_x.is_finite() {
        return Err(DomainError::NonFiniteClick("x"));
    }
    if !click_y.is_finite() {
        return Err(DomainError::NonFiniteClick("y"));
    }

    let scale_x = asset.natural_width() as f32 / rendered_width;
    let scale_y = asset.natural_height() as f32 / rendered_height;
    let pixel_x = clamp_coordinate(click_x * scale_x, asset.natural_width());
    let pixel_y = clamp_coordinate(click_y * scale_y, asset.natural_height());

    let [red, green, blue] = unpack_rgb(asset.pixel_at(pixel_x, pixel_y));
    Ok(ColorSample {
        display_x: click_x,
        display_y: click_y,
        red,
        green,
        blue,
    })
}

fn clamp_coordinate(value: f32, bound: u32) -> u32 {
    let floored = value.floor();
    if floored <= 0.0 {
        return 0;
    }
    (floored as u32).min(bound - 1)
}

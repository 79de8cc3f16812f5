//! Game screen — the emulator screenshot drawn with half-block pixels, or the
//! live stream URL when one is configured.

use base64::Engine;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::debug;

use crate::app::App;

/// A decoded screenshot, kept between frames.
pub struct Screen {
    image: RgbImage,
}

impl Screen {
    #[cfg(test)]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Scale to fit `width` x `height` cells. Each cell holds two vertical
    /// pixels: the upper half block in fg, the lower in bg.
    pub fn lines(&self, width: u16, height: u16) -> Vec<Line<'static>> {
        let (iw, ih) = self.image.dimensions();
        if iw == 0 || ih == 0 || width == 0 || height == 0 {
            return Vec::new();
        }

        let max_w = width as u32;
        let max_h = height as u32 * 2;
        let scale = f64::min(max_w as f64 / iw as f64, max_h as f64 / ih as f64);
        let tw = ((iw as f64 * scale).floor() as u32).clamp(1, max_w);
        let th = ((ih as f64 * scale).floor() as u32).clamp(1, max_h);
        let scaled = image::imageops::resize(&self.image, tw, th, FilterType::Nearest);

        let pad_left = ((max_w - tw) / 2) as usize;
        let pad_top = ((max_h - th) / 4) as usize;

        let mut lines: Vec<Line> = Vec::with_capacity(pad_top + th.div_ceil(2) as usize);
        for _ in 0..pad_top {
            lines.push(Line::raw(""));
        }
        for y in (0..th).step_by(2) {
            let mut spans = Vec::with_capacity(tw as usize + 1);
            spans.push(Span::raw(" ".repeat(pad_left)));
            for x in 0..tw {
                let top = *scaled.get_pixel(x, y);
                let bottom = if y + 1 < th {
                    *scaled.get_pixel(x, y + 1)
                } else {
                    Rgb([0, 0, 0])
                };
                spans.push(Span::styled(
                    "▀",
                    Style::default().fg(rgb(top)).bg(rgb(bottom)),
                ));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

fn rgb(px: Rgb<u8>) -> Color {
    Color::Rgb(px[0], px[1], px[2])
}

/// Decode a base64 image payload (optionally a `data:` URL).
/// Returns `None` for empty or undecodable payloads.
pub fn decode(payload: &str) -> Option<Screen> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }
    let data = payload
        .split_once("base64,")
        .map(|(_, d)| d)
        .unwrap_or(payload);

    let bytes = match base64::engine::general_purpose::STANDARD.decode(data) {
        Ok(b) => b,
        Err(e) => {
            debug!("Screenshot is not valid base64: {}", e);
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(Screen {
            image: img.to_rgb8(),
        }),
        Err(e) => {
            debug!("Screenshot is not a readable image: {}", e);
            None
        }
    }
}

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Game ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let snapshot = &app.snapshot;
    let showing = if let Some(url) = &snapshot.stream_url {
        let stream = Paragraph::new(vec![
            Line::raw(""),
            Line::styled("Live stream", Style::default().fg(Color::White).bold()),
            Line::styled(url.clone(), Style::default().fg(Color::Cyan).underlined()),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(stream, inner);
        true
    } else if let Some(screen) = &app.screen {
        frame.render_widget(Paragraph::new(screen.lines(inner.width, inner.height)), inner);
        true
    } else {
        let text = if snapshot.game.screenshot.trim().is_empty() {
            "Waiting for game screen..."
        } else {
            "Screenshot unavailable"
        };
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        let middle = Rect {
            y: inner.y + inner.height / 2,
            height: inner.height.min(1),
            ..inner
        };
        frame.render_widget(placeholder, middle);
        false
    };

    if showing && snapshot.is_connected() && inner.width >= 8 && inner.height >= 1 {
        let badge = Rect {
            x: inner.x + inner.width - 7,
            y: inner.y,
            width: 7,
            height: 1,
        };
        let live = Paragraph::new(Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Red)),
            Span::styled("LIVE", Style::default().fg(Color::White).bold()),
        ]));
        frame.render_widget(live, badge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedash_core::events::DashboardEvent;
    use pokedash_core::store::StateStore;
    use std::io::Cursor;

    use crate::ui::tests::render_to_string;

    fn png_base64(w: u32, h: u32) -> String {
        let img = RgbImage::from_pixel(w, h, Rgb([200, 30, 30]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
    }

    #[test]
    fn test_decode_png() {
        let screen = decode(&png_base64(160, 144)).unwrap();
        assert_eq!(screen.dimensions(), (160, 144));

        let data_url = format!("data:image/png;base64,{}", png_base64(4, 4));
        assert!(decode(&data_url).is_some());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("").is_none());
        assert!(decode("!!not base64!!").is_none());
        // valid base64, not an image
        assert!(decode("aGVsbG8gd29ybGQ=").is_none());
    }

    #[test]
    fn test_lines_fit_area() {
        let screen = decode(&png_base64(4, 4)).unwrap();
        let lines = screen.lines(8, 4);
        assert_eq!(lines.len(), 4);
        // padding span + 8 pixel columns
        assert_eq!(lines[0].spans.len(), 9);
        assert!(screen.lines(0, 4).is_empty());
    }

    #[test]
    fn test_placeholder_without_screenshot() {
        let app = App::new(StateStore::new(50).snapshot());
        let out = render_to_string(40, 8, |f| draw(f, &app, f.area()));
        assert!(out.contains("Waiting for game screen..."));
        assert!(!out.contains("LIVE"));
    }

    #[test]
    fn test_undecodable_screenshot() {
        let mut store = StateStore::new(50);
        store.apply(DashboardEvent::Screenshot("garbage".into()));
        let app = App::new(store.snapshot());
        let out = render_to_string(40, 8, |f| draw(f, &app, f.area()));
        assert!(out.contains("Screenshot unavailable"));
    }

    #[test]
    fn test_live_badge_over_screenshot() {
        let mut store = StateStore::new(50);
        store.apply(DashboardEvent::Connected);
        store.apply(DashboardEvent::Screenshot(png_base64(16, 16)));
        let app = App::new(store.snapshot());
        let out = render_to_string(40, 12, |f| draw(f, &app, f.area()));
        assert!(out.contains("LIVE"));
    }

    #[test]
    fn test_stream_takes_priority() {
        let mut store = StateStore::new(50);
        store.apply(DashboardEvent::Connected);
        store.apply(DashboardEvent::Screenshot(png_base64(16, 16)));
        store.apply(DashboardEvent::StreamUrl("http://gym:8080/video".into()));
        let app = App::new(store.snapshot());
        let out = render_to_string(60, 10, |f| draw(f, &app, f.area()));
        assert!(out.contains("Live stream"));
        assert!(out.contains("http://gym:8080/video"));
        assert!(out.contains("LIVE"));
    }
}

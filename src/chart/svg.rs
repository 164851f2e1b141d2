use std::fmt::Write;

use super::surface::{
    Color, DrawingSurface, Fill, GradientId, Point, Rect, Stroke, TextAlign, TextStyle,
};

#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    defs: Vec<String>,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            body: String::new(),
        }
    }

    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height),
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            for def in &self.defs {
                out.push_str(def);
            }
            out.push_str("</defs>");
        }
        out.push_str(&self.body);
        out.push_str("</svg>");
        out
    }
}

impl DrawingSurface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let _ = write!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}"{} stroke-width="{}"/>"#,
            fmt_num(from.x),
            fmt_num(from.y),
            fmt_num(to.x),
            fmt_num(to.y),
            stroke.color.hex(),
            opacity_attr("stroke-opacity", stroke.color),
            fmt_num(stroke.width),
        );
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.width),
            fmt_num(rect.height),
            fill_attr(fill),
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"{}/>"#,
            fmt_num(center.x),
            fmt_num(center.y),
            fmt_num(radius),
            color.hex(),
            opacity_attr("fill-opacity", color),
        );
    }

    fn text(&mut self, text: &str, at: Point, style: TextStyle) {
        let anchor = match style.align {
            TextAlign::Start => "start",
            TextAlign::Middle => "middle",
            TextAlign::End => "end",
        };
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{anchor}">{}</text>"#,
            fmt_num(at.x),
            fmt_num(at.y),
            fmt_num(style.size),
            style.color.hex(),
            escape_xml(text),
        );
    }

    fn vertical_gradient(
        &mut self,
        top: f64,
        bottom: f64,
        top_color: Color,
        bottom_color: Color,
    ) -> Fill {
        let id = GradientId(self.defs.len());
        self.defs.push(format!(
            r#"<linearGradient id="{}" gradientUnits="userSpaceOnUse" x1="0" y1="{}" x2="0" y2="{}"><stop offset="0" stop-color="{}" stop-opacity="{}"/><stop offset="1" stop-color="{}" stop-opacity="{}"/></linearGradient>"#,
            gradient_name(id),
            fmt_num(top),
            fmt_num(bottom),
            top_color.hex(),
            fmt_num(top_color.alpha),
            bottom_color.hex(),
            fmt_num(bottom_color.alpha),
        ));
        Fill::Gradient(id)
    }
}

fn gradient_name(id: GradientId) -> String {
    format!("grad-{}", id.0)
}

fn fill_attr(fill: &Fill) -> String {
    match fill {
        Fill::Solid(color) => format!(
            r#"fill="{}"{}"#,
            color.hex(),
            opacity_attr("fill-opacity", *color)
        ),
        Fill::Gradient(id) => format!(r#"fill="url(#{})""#, gradient_name(*id)),
    }
}

fn opacity_attr(name: &str, color: Color) -> String {
    if color.alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" {name}="{}""#, fmt_num(color.alpha))
    }
}

fn fmt_num(value: f64) -> String {
    let mut s = format!("{value:.2}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(fmt_num(50.0), "50");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn document_wraps_body_and_defs() {
        let mut surface = SvgSurface::new(200.0, 100.0);
        let green = Color::rgb(16, 185, 129);
        let fill = surface.vertical_gradient(10.0, 90.0, green, green.with_alpha(0.3));
        surface.fill_rect(
            Rect {
                x: 5.0,
                y: 10.0,
                width: 20.0,
                height: 80.0,
            },
            &fill,
        );
        let svg = surface.finish();

        assert!(svg.starts_with(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"100\""
        ));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<defs><linearGradient id=\"grad-0\""));
        assert!(svg.contains("stop-opacity=\"0.3\""));
        assert!(svg.contains("fill=\"url(#grad-0)\""));
    }

    #[test]
    fn text_is_escaped() {
        let mut surface = SvgSurface::new(100.0, 100.0);
        surface.text(
            "Income <real> & \"nominal\"",
            Point::new(1.0, 2.0),
            TextStyle {
                color: Color::rgb(0, 0, 0),
                size: 12.0,
                align: TextAlign::Middle,
            },
        );
        let svg = surface.finish();

        assert!(svg.contains("Income &lt;real&gt; &amp; &quot;nominal&quot;"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(!svg.contains("<defs>"));
    }

    #[test]
    fn translucent_colors_emit_opacity() {
        let mut surface = SvgSurface::new(100.0, 100.0);
        surface.fill_circle(Point::new(1.0, 1.0), 4.0, Color::rgb(255, 0, 0).with_alpha(0.5));
        surface.fill_circle(Point::new(2.0, 2.0), 4.0, Color::rgb(255, 0, 0));
        let svg = surface.finish();

        assert_eq!(svg.matches("fill-opacity=\"0.5\"").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 2);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f64,
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Color),
    Gradient(GradientId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientId(pub usize);

/// Coordinates are pixels with the origin at the top-left corner. The caller
/// sizes the surface; renderers never resize it.
pub trait DrawingSurface {
    fn size(&self) -> (f64, f64);
    fn line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn fill_rect(&mut self, rect: Rect, fill: &Fill);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);
    fn text(&mut self, text: &str, at: Point, style: TextStyle);
    fn vertical_gradient(
        &mut self,
        top: f64,
        bottom: f64,
        top_color: Color,
        bottom_color: Color,
    ) -> Fill;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        rect: Rect,
        fill: Fill,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Color,
    },
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
    Gradient {
        id: GradientId,
        top: f64,
        bottom: f64,
        top_color: Color,
        bottom_color: Color,
    },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point, &Point, &Stroke)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Line { from, to, stroke } => Some((from, to, stroke)),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = (&Rect, &Fill)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Rect { rect, fill } => Some((rect, fill)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (&Point, f64, &Color)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => Some((center, *radius, color)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        self.commands.push(DrawCommand::Rect {
            rect,
            fill: fill.clone(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, at: Point, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style,
        });
    }

    fn vertical_gradient(
        &mut self,
        top: f64,
        bottom: f64,
        top_color: Color,
        bottom_color: Color,
    ) -> Fill {
        let id = GradientId(
            self.commands
                .iter()
                .filter(|cmd| matches!(cmd, DrawCommand::Gradient { .. }))
                .count(),
        );
        self.commands.push(DrawCommand::Gradient {
            id,
            top,
            bottom,
            top_color,
            bottom_color,
        });
        Fill::Gradient(id)
    }
}

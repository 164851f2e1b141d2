pub const DOMAIN_HEADROOM: f64 = 1.1;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum XLayout {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartMapper {
    width: f64,
    height: f64,
    padding: f64,
    min_value: f64,
    max_value: f64,
    len: usize,
    layout: XLayout,
}

impl ChartMapper {
    pub fn new(
        (width, height): (f64, f64),
        padding: f64,
        (min_value, max_value): (f64, f64),
        len: usize,
        layout: XLayout,
    ) -> Self {
        Self {
            width,
            height,
            padding,
            min_value,
            max_value,
            len,
            layout,
        }
    }

    pub fn for_series<'a, I>(
        size: (f64, f64),
        padding: f64,
        series: I,
        len: usize,
        layout: XLayout,
    ) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        Self::new(size, padding, value_domain(series), len, layout)
    }

    pub fn plot_width(&self) -> f64 {
        (self.width - 2.0 * self.padding).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - 2.0 * self.padding).max(0.0)
    }

    pub fn left(&self) -> f64 {
        self.padding
    }

    pub fn right(&self) -> f64 {
        self.padding + self.plot_width()
    }

    pub fn top(&self) -> f64 {
        self.padding
    }

    pub fn bottom(&self) -> f64 {
        self.padding + self.plot_height()
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slot_width(&self) -> f64 {
        let divisions = match self.layout {
            XLayout::Line => self.len.saturating_sub(1),
            XLayout::Bar => self.len,
        };
        if divisions == 0 {
            return self.plot_width();
        }
        self.plot_width() / divisions as f64
    }

    pub fn map_x(&self, index: usize) -> f64 {
        if self.layout == XLayout::Line && self.len <= 1 {
            return self.left() + self.plot_width() / 2.0;
        }
        self.left() + index as f64 * self.slot_width()
    }

    pub fn map_y(&self, value: f64) -> f64 {
        let span = self.max_value - self.min_value;
        if span <= 0.0 || !span.is_finite() {
            return self.bottom();
        }
        let t = (value - self.min_value) / span;
        self.bottom() - t * self.plot_height()
    }
}

/// Value domain `[0, max * 1.1]`; an all-zero or empty input falls back to `[0, 1]`.
pub fn value_domain<'a, I>(series: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let max = series
        .into_iter()
        .flat_map(|values| values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return (0.0, 1.0);
    }
    (0.0, max * DOMAIN_HEADROOM)
}

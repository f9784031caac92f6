use crate::format::escape_html;

pub const GRID_STROKE: &str = "rgba(79,87,79,0.2)";
pub const LABEL_FILL: &str = "#4f574f";

fn coord(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Accumulates SVG markup for a single chart.
pub struct SvgWriter {
    buf: String,
}

impl SvgWriter {
    pub fn new(width: f64, height: f64) -> Self {
        let mut buf = String::new();
        buf.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img">"#,
            w = coord(width),
            h = coord(height),
        ));
        Self { buf }
    }

    pub fn grid_line(&mut self, x1: f64, x2: f64, y: f64) {
        self.buf.push_str(&format!(
            r#"<line x1="{}" x2="{}" y1="{y}" y2="{y}" stroke="{GRID_STROKE}" stroke-dasharray="3 4"/>"#,
            coord(x1),
            coord(x2),
            y = coord(y),
        ));
    }

    pub fn text(&mut self, x: f64, y: f64, anchor: &str, size: u32, content: &str) {
        self.buf.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="{anchor}" font-size="{size}" fill="{LABEL_FILL}">{}</text>"#,
            coord(x),
            coord(y),
            escape_html(content),
        ));
    }

    /// Multi-line label, one `tspan` per line stepping down 12px.
    pub fn text_lines(&mut self, x: f64, y: f64, size: u32, lines: &[String]) {
        let x = coord(x);
        self.buf.push_str(&format!(
            r#"<text x="{x}" y="{}" text-anchor="middle" font-size="{size}" fill="{LABEL_FILL}">"#,
            coord(y),
        ));
        for (index, line) in lines.iter().enumerate() {
            let dy = if index == 0 { 0 } else { 12 };
            self.buf.push_str(&format!(
                r#"<tspan x="{x}" dy="{dy}">{}</tspan>"#,
                escape_html(line)
            ));
        }
        self.buf.push_str("</text>");
    }

    pub fn path(&mut self, points: &[Option<(f64, f64)>], stroke: &str) {
        let mut d = String::new();
        let mut pen_down = false;
        for point in points {
            match point {
                Some((x, y)) => {
                    if !d.is_empty() {
                        d.push(' ');
                    }
                    d.push_str(if pen_down { "L " } else { "M " });
                    d.push_str(&coord(*x));
                    d.push(' ');
                    d.push_str(&coord(*y));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        if d.is_empty() {
            return;
        }
        self.buf.push_str(&format!(
            r#"<path d="{d}" fill="none" stroke="{stroke}" stroke-width="3"/>"#
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64, fill: &str, clipped: bool, tooltip: &str) {
        let class = if clipped { r#" class="is-clipped""# } else { "" };
        self.buf.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{fill}"{class}><title>{}</title></circle>"#,
            coord(cx),
            coord(cy),
            coord(radius),
            escape_html(tooltip),
        ));
    }

    /// Small upward marker above a point whose value runs past the axis cap.
    pub fn clip_marker(&mut self, x: f64, y: f64) {
        self.buf.push_str(&format!(
            r#"<path d="M {} {} l 5 8 l -10 0 z" fill="{LABEL_FILL}" class="clip-marker"/>"#,
            coord(x),
            coord(y - 14.0),
        ));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: &str,
        clipped: bool,
        tooltip: &str,
    ) {
        let class = if clipped { r#" class="is-clipped""# } else { "" };
        self.buf.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="4" fill="{fill}"{class}><title>{}</title></rect>"#,
            coord(x),
            coord(y),
            coord(width),
            coord(height),
            escape_html(tooltip),
        ));
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</svg>");
        self.buf
    }
}

//! SVG export of a recorded overlay.

use std::fmt::Write;

use crate::recording::RecordingSurface;

/// Serialize every recorded stroke as an SVG document.
pub fn to_svg(surface: &RecordingSurface) -> String {
    let size = surface.size();
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.width,
        h = size.height
    );
    for stroke in surface.strokes() {
        let style = &stroke.style;
        let _ = write!(
            svg,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}""#,
            stroke.path.to_svg(),
            style.hex(),
            style.width
        );
        if style.rgba[3] < u8::MAX {
            let _ = write!(svg, r#" stroke-opacity="{:.3}""#, style.opacity());
        }
        svg.push_str("/>\n");
    }
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{LineStyle, Surface};
    use kurbo::{BezPath, Point, Size};

    #[test]
    fn test_empty_document() {
        let mut surface = RecordingSurface::new();
        surface.resize(Size::new(300.0, 200.0));
        let svg = to_svg(&surface);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 300 200""#));
        assert!(!svg.contains("<path"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_paths_carry_style() {
        let mut surface = RecordingSurface::new();
        surface.resize(Size::new(100.0, 100.0));
        let mut path = BezPath::new();
        path.move_to(Point::new(1.0, 2.0));
        path.line_to(Point::new(3.0, 4.0));
        surface.stroke(&path, &LineStyle::new(2.0, [255, 0, 0, 255])).unwrap();
        surface.stroke(&path, &LineStyle::new(1.0, [0, 0, 255, 128])).unwrap();

        let svg = to_svg(&surface);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(r##"stroke="#ff0000" stroke-width="2"/>"##));
        assert!(svg.contains(r#"stroke-opacity="0.502""#));
        assert!(svg.contains(r#"d="M1"#));
        assert!(svg.contains("L3"));
    }
}

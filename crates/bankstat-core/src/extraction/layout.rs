use crate::extraction::{PageFragments, PositionedFragment};

/// Fragments closer than this vertically belong to the same line.
pub const LINE_TOLERANCE: f32 = 3.0;

/// A reading-order line reconstructed from positioned fragments.
#[derive(Debug, Clone)]
pub struct Line {
    pub y: f32,
    pub fragments: Vec<PositionedFragment>,
}

impl Line {
    /// Human-readable text of the line, fragments joined left to right.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group fragments into lines by vertical proximity.
///
/// A fragment joins the most recent line whose y differs by less than the
/// tolerance, else it opens a new line. Lines come back top-to-bottom
/// (coordinates are top-origin, so ascending y) with fragments ordered
/// left-to-right.
pub fn reconstruct_lines(fragments: &[PositionedFragment]) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for frag in fragments {
        match lines
            .iter()
            .rposition(|l| (l.y - frag.y).abs() < LINE_TOLERANCE)
        {
            Some(i) => lines[i].fragments.push(frag.clone()),
            None => lines.push(Line {
                y: frag.y,
                fragments: vec![frag.clone()],
            }),
        }
    }

    lines.sort_by(|a, b| a.y.total_cmp(&b.y));
    for line in &mut lines {
        line.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Reconstruct lines for every page, concatenated in page order.
pub fn pages_to_lines(pages: &[PageFragments]) -> Vec<Line> {
    pages
        .iter()
        .flat_map(|p| reconstruct_lines(&p.fragments))
        .collect()
}

/// Full reconstructed document text, one reconstructed line per text line.
pub fn full_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> PositionedFragment {
        PositionedFragment {
            text: text.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn test_grouping_by_proximity() {
        let fragments = vec![
            frag("Date", 10.0, 100.0),
            frag("Amount", 200.0, 101.5),
            frag("01/02/2024", 10.0, 120.0),
            frag("42.00", 200.0, 121.0),
        ];
        let lines = reconstruct_lines(&fragments);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Date Amount");
        assert_eq!(lines[1].text(), "01/02/2024 42.00");
    }

    #[test]
    fn test_fragments_sorted_left_to_right() {
        let fragments = vec![frag("world", 90.0, 10.0), frag("hello", 10.0, 11.0)];
        let lines = reconstruct_lines(&fragments);
        assert_eq!(lines[0].text(), "hello world");
    }

    #[test]
    fn test_lines_sorted_top_to_bottom() {
        let fragments = vec![frag("bottom", 10.0, 300.0), frag("top", 10.0, 50.0)];
        let lines = reconstruct_lines(&fragments);
        assert_eq!(lines[0].text(), "top");
        assert_eq!(lines[1].text(), "bottom");
    }

    #[test]
    fn test_tolerance_boundary() {
        // Exactly 3 units apart starts a new line.
        let fragments = vec![frag("a", 10.0, 10.0), frag("b", 20.0, 13.0)];
        let lines = reconstruct_lines(&fragments);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_full_text() {
        let fragments = vec![frag("hello", 10.0, 10.0), frag("again", 10.0, 30.0)];
        let lines = reconstruct_lines(&fragments);
        assert_eq!(full_text(&lines), "hello\nagain");
    }
}

//! Hit testing: image-local point → label lookup.
//!
//! Walks the label stack top-down (last painted = topmost) so overlapping
//! labels resolve to the one the user sees.

use kurbo::Point;
use ov_core::id::LabelId;
use ov_core::metrics::{TextMetrics, label_bounds};
use ov_core::store::TextLabelStore;

/// Find the topmost label whose box contains `point`.
/// Returns `None` when the point is on the background.
pub fn hit_test(labels: &TextLabelStore, point: Point, metrics: &impl TextMetrics) -> Option<LabelId> {
    labels
        .iter()
        .rev()
        .find(|label| label_bounds(label, metrics).contains(point))
        .map(|label| label.id)
}

/// All labels under `point`, topmost first.
pub fn hit_test_all(labels: &TextLabelStore, point: Point, metrics: &impl TextMetrics) -> Vec<LabelId> {
    labels
        .iter()
        .rev()
        .filter(|label| label_bounds(label, metrics).contains(point))
        .map(|label| label.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ov_core::id::IdGenerator;
    use ov_core::metrics::ApproxMetrics;
    use ov_core::model::LabelDefaults;

    fn store() -> (TextLabelStore, LabelId, LabelId) {
        let mut store = TextLabelStore::with_generator(IdGenerator::seeded(11));
        let defaults = LabelDefaults::default().with_content("Hello");
        // 30px font → 90 × 36 boxes
        let bottom = store.add(Point::new(0.0, 0.0), &defaults);
        let top = store.add(Point::new(50.0, 20.0), &defaults);
        (store, bottom, top)
    }

    #[test]
    fn topmost_label_wins() {
        let (store, bottom, top) = store();
        assert_eq!(hit_test(&store, Point::new(60.0, 30.0), &ApproxMetrics), Some(top));
        assert_eq!(hit_test(&store, Point::new(10.0, 10.0), &ApproxMetrics), Some(bottom));
        assert_eq!(
            hit_test_all(&store, Point::new(60.0, 30.0), &ApproxMetrics),
            vec![top, bottom]
        );
    }

    #[test]
    fn background_misses() {
        let (store, _, _) = store();
        assert_eq!(hit_test(&store, Point::new(400.0, 400.0), &ApproxMetrics), None);
        assert_eq!(hit_test(&store, Point::new(-1.0, 5.0), &ApproxMetrics), None);
    }
}

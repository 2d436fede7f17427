use crate::Swatch;

/// Orderings for presenting or exporting a color tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most common color first.
    #[default]
    CountDesc,
    /// Least common color first.
    CountAsc,
    /// Brightest color first, by relative luminance.
    Luminance,
    /// Ascending HSL hue; achromatic colors sort as hue 0.
    Hue,
}

/// All the sorts are stable: swatches that compare equal keep their tally
/// order, so a given tally always presents the same way.
pub(crate) fn sort_swatches(swatches: &mut [Swatch], order: SortOrder) {
    match order {
        SortOrder::CountDesc => swatches.sort_by(|lhs, rhs| rhs.count().cmp(&lhs.count())),
        SortOrder::CountAsc => swatches.sort_by(|lhs, rhs| lhs.count().cmp(&rhs.count())),
        SortOrder::Luminance => {
            swatches.sort_by(|lhs, rhs| rhs.luminance().total_cmp(&lhs.luminance()))
        }
        SortOrder::Hue => swatches.sort_by(|lhs, rhs| lhs.hsl().0.total_cmp(&rhs.hsl().0)),
    }
}

//! Highlight Styling
//! Country -> colour mapping used by the scatter charts.

use crate::data::MergedRecord;
use plotters::style::RGBColor;
use std::collections::BTreeMap;

/// Points of countries without a highlight
pub const DEFAULT_POINT_COLOR: RGBColor = RGBColor(211, 211, 211); // Light gray

/// Explicit country -> colour map.
///
/// With no entries every point is drawn in `DEFAULT_POINT_COLOR` under a
/// single legend entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightStyles {
    colors: BTreeMap<String, [u8; 3]>,
}

/// Highlighted points of one country.
pub struct HighlightGroup<'a> {
    pub country: &'a str,
    pub color: RGBColor,
    pub records: Vec<&'a MergedRecord>,
}

impl HighlightStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rgb_map(colors: &BTreeMap<String, [u8; 3]>) -> Self {
        Self {
            colors: colors.clone(),
        }
    }

    pub fn with(mut self, country: impl Into<String>, rgb: [u8; 3]) -> Self {
        self.colors.insert(country.into(), rgb);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color_for(&self, country: &str) -> Option<RGBColor> {
        self.colors
            .get(country)
            .map(|&[r, g, b]| RGBColor(r, g, b))
    }

    /// Split records into un-highlighted points and one group per highlighted
    /// country that has at least one record. Groups follow country name order.
    pub fn partition<'a>(
        &'a self,
        records: &'a [MergedRecord],
    ) -> (Vec<&'a MergedRecord>, Vec<HighlightGroup<'a>>) {
        let others = records
            .iter()
            .filter(|r| !self.colors.contains_key(&r.country))
            .collect();

        let groups = self
            .colors
            .iter()
            .filter_map(|(country, &[r, g, b])| {
                let subset: Vec<&MergedRecord> =
                    records.iter().filter(|rec| &rec.country == country).collect();
                (!subset.is_empty()).then(|| HighlightGroup {
                    country: country.as_str(),
                    color: RGBColor(r, g, b),
                    records: subset,
                })
            })
            .collect();

        (others, groups)
    }
}

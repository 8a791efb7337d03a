use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::ArtifactKind;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Group colours for the scene outline
// ---------------------------------------------------------------------------

/// Maps group indices present in the scene to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct GroupColors {
    mapping: BTreeMap<usize, Color32>,
}

impl GroupColors {
    pub fn new(groups: impl IntoIterator<Item = usize>) -> Self {
        let groups: Vec<usize> = groups.into_iter().collect();
        let palette = generate_palette(groups.len());
        GroupColors {
            mapping: groups.into_iter().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, group: usize) -> Color32 {
        self.mapping.get(&group).copied().unwrap_or(Color32::GRAY)
    }
}

/// Fixed accent per artifact kind.
pub fn kind_color(kind: ArtifactKind) -> Color32 {
    match kind {
        ArtifactKind::Transform => Color32::from_rgb(230, 180, 80),
        ArtifactKind::Volume => Color32::from_rgb(140, 190, 240),
        ArtifactKind::Segmentation => Color32::from_rgb(120, 210, 140),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn unknown_group_is_gray() {
        let colors = GroupColors::new([3, 7]);
        assert_ne!(colors.color_for(3), colors.color_for(7));
        assert_eq!(colors.color_for(5), Color32::GRAY);
    }
}

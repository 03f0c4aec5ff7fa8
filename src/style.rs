use crate::series::SeriesId;

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Point marker drawn at each measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Triangle,
    Square,
    Cross,
}

/// Palettes, one per source tag partition
const PALETTES: &[&[Rgb]] = &[
    &[
        Rgb(0x93, 0x70, 0xDB), // Medium purple
        Rgb(0x7B, 0x68, 0xEE), // Medium slate blue
        Rgb(0x4B, 0x00, 0x82), // Indigo
    ],
    &[
        Rgb(0xFF, 0xB3, 0x47), // Light orange
        Rgb(0xFF, 0x8C, 0x00), // Dark orange
        Rgb(0xFF, 0x45, 0x00), // Orange red
    ],
    &[
        Rgb(0x8F, 0xBC, 0x8F), // Dark sea green
        Rgb(0x3C, 0xB3, 0x71), // Medium sea green
        Rgb(0x00, 0x64, 0x00), // Dark green
    ],
    &[
        Rgb(0x87, 0xCE, 0xEB), // Sky blue
        Rgb(0x1E, 0x90, 0xFF), // Dodger blue
        Rgb(0x00, 0x00, 0x8B), // Dark blue
    ],
];

const MARKERS: &[Marker] = &[Marker::Circle, Marker::Triangle, Marker::Square, Marker::Cross];

/// Color and marker for one series
#[derive(Debug, Clone, PartialEq)]
pub struct StyleAssignment {
    pub id: SeriesId,
    pub color: Rgb,
    pub marker: Marker,
}

/// Style lookup for a set of series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    assignments: Vec<StyleAssignment>,
}

impl Styles {
    pub fn get(&self, id: &SeriesId) -> Option<&StyleAssignment> {
        self.assignments.iter().find(|a| a.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleAssignment> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Assign styles to series identities.
///
/// Identities are partitioned by source tag in first-seen order. Each
/// partition gets its own palette and marker; within a partition colors
/// follow config key order, cycling when the palette runs out. The marker
/// shifts by one each time the palettes wrap, so the first
/// `PALETTES.len() * MARKERS.len()` tags all get a distinct pair.
pub fn assign(ids: &[SeriesId]) -> Styles {
    let mut partitions: Vec<(Option<&str>, Vec<&SeriesId>)> = Vec::new();
    for id in ids {
        let tag = id.source_tag.as_deref();
        match partitions.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, members)) => members.push(id),
            None => partitions.push((tag, vec![id])),
        }
    }

    let mut assignments = Vec::new();
    for (partition_idx, (_, mut members)) in partitions.into_iter().enumerate() {
        members.sort_by(|a, b| a.config_key.cmp(&b.config_key));
        members.dedup();

        let palette = PALETTES[partition_idx % PALETTES.len()];
        let marker = MARKERS[(partition_idx + partition_idx / PALETTES.len()) % MARKERS.len()];

        for (i, id) in members.into_iter().enumerate() {
            assignments.push(StyleAssignment {
                id: id.clone(),
                color: palette[i % palette.len()],
                marker,
            });
        }
    }

    Styles { assignments }
}

use super::geometry::winning_index;
use super::spin::{SpinController, SpinTuning};
use crate::gui::images::ImageId;
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumString};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SectorId(String);

crate::impl_string_newtype!(SectorId);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SectorKind {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectorContent {
    Text(String),
    Image(ImageId),
}

/// Placement tweaks for image sectors, relative to the default fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageAdjust {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation_degrees: f64,
}

impl Default for ImageAdjust {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_degrees: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub id: SectorId,
    pub content: SectorContent,
    pub color: Srgba<f64>,
    pub adjust: ImageAdjust,
    /// Reserved for weighted wheels. Every sector gets the same share regardless.
    pub weight: Option<f64>,
}

impl Sector {
    pub fn text(id: impl Into<String>, label: impl Into<String>, color: Srgba<f64>) -> Self {
        Self {
            id: SectorId::new(id),
            content: SectorContent::Text(label.into()),
            color,
            adjust: ImageAdjust::default(),
            weight: None,
        }
    }

    pub fn image(id: impl Into<String>, source: impl Into<String>, color: Srgba<f64>) -> Self {
        Self {
            id: SectorId::new(id),
            content: SectorContent::Image(ImageId::new(source)),
            color,
            adjust: ImageAdjust::default(),
            weight: None,
        }
    }

    pub fn with_adjust(mut self, adjust: ImageAdjust) -> Self {
        self.adjust = adjust;
        self
    }

    pub fn kind(&self) -> SectorKind {
        match self.content {
            SectorContent::Text(_) => SectorKind::Text,
            SectorContent::Image(_) => SectorKind::Image,
        }
    }

    pub fn image_id(&self) -> Option<&ImageId> {
        match &self.content {
            SectorContent::Image(id) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    /// Short human-readable description, used for the result label and logs.
    pub fn summary(&self) -> String {
        match &self.content {
            SectorContent::Text(label) => label.clone(),
            SectorContent::Image(_) => format!("Image ({})", self.id),
        }
    }
}

/// Delivered to the host once per completed spin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub winner: Option<Sector>,
}

/// Read-only view of everything a draw pass needs.
#[derive(Debug, Clone, Copy)]
pub struct WheelFrame<'a> {
    pub rotation: f64,
    pub sectors: &'a [Sector],
    pub highlight: bool,
}

impl WheelFrame<'_> {
    /// Wedge under the pointer for the current rotation, whether or not it is highlighted.
    pub fn pointer_index(&self) -> Option<usize> {
        winning_index(self.rotation, self.sectors.len())
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.pointer_index().filter(|_| self.highlight)
    }
}

pub struct Wheel {
    sectors: Vec<Sector>,
    spin: SpinController,
    rng: fastrand::Rng,
}

impl Wheel {
    pub fn new(sectors: Vec<Sector>, tuning: SpinTuning) -> Self {
        Self::with_rng(sectors, tuning, fastrand::Rng::new())
    }

    pub fn with_rng(sectors: Vec<Sector>, tuning: SpinTuning, rng: fastrand::Rng) -> Self {
        Self {
            sectors,
            spin: SpinController::new(tuning),
            rng,
        }
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn spin(&self) -> &SpinController {
        &self.spin
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_spinning()
    }

    pub fn can_spin(&self) -> bool {
        !self.sectors.is_empty() && !self.spin.is_spinning()
    }

    /// Swaps the sector list and reports whether it changed. The rotation is kept, so a stopped
    /// wheel highlights whichever new wedge lands under the pointer.
    pub fn set_sectors(&mut self, sectors: Vec<Sector>) -> bool {
        if self.sectors == sectors {
            return false;
        }
        self.sectors = sectors;
        true
    }

    pub fn set_tuning(&mut self, tuning: SpinTuning) {
        self.spin.set_tuning(tuning);
    }

    pub fn start_spin(&mut self) -> bool {
        let started = self.spin.start(self.sectors.len(), &mut self.rng);
        if started {
            log::info!(
                "Spin started with {} sectors, velocity {:.3}",
                self.sectors.len(),
                self.spin.velocity()
            );
        }
        started
    }

    pub fn advance(&mut self) -> Option<SpinOutcome> {
        let stop = self.spin.tick(self.sectors.len())?;
        let winner = stop.index.and_then(|i| self.sectors.get(i)).cloned();
        match &winner {
            Some(sector) => log::info!("Spin finished on '{}'", sector.summary()),
            None => log::info!("Spin finished with no sectors left"),
        }
        Some(SpinOutcome { winner })
    }

    pub fn frame(&self) -> WheelFrame<'_> {
        WheelFrame {
            rotation: self.spin.rotation(),
            sectors: &self.sectors,
            highlight: self.spin.is_settled() && !self.sectors.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> Srgba<f64> {
        Srgba::new(0.5, 0.5, 0.5, 1.0)
    }

    fn food() -> Vec<Sector> {
        ["Pizza", "Burger", "Sushi", "Ramen", "Curry", "Pasta"]
            .iter()
            .enumerate()
            .map(|(i, name)| Sector::text(i.to_string(), *name, color()))
            .collect()
    }

    fn seeded(sectors: Vec<Sector>, seed: u64) -> Wheel {
        Wheel::with_rng(sectors, SpinTuning::default(), fastrand::Rng::with_seed(seed))
    }

    fn spin_to_end(wheel: &mut Wheel) -> SpinOutcome {
        for _ in 0..100_000 {
            if let Some(outcome) = wheel.advance() {
                return outcome;
            }
        }
        panic!("spin never finished");
    }

    #[test]
    fn test_sector_kind_deserialization() {
        let cases = vec![
            ("\"text\"", SectorKind::Text),
            ("\"Text\"", SectorKind::Text),
            ("\"IMAGE\"", SectorKind::Image),
            ("\"image\"", SectorKind::Image),
        ];

        for (json, expected) in cases {
            let deserialized: SectorKind = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert!(serde_json::from_str::<SectorKind>("\"video\"").is_err());
    }

    #[test]
    fn test_image_id_ignores_empty_source() {
        let blank = Sector::image("a", "", color());
        assert_eq!(blank.kind(), SectorKind::Image);
        assert!(blank.image_id().is_none());

        let cat = Sector::image("b", "/tmp/cat.png", color());
        assert_eq!(cat.image_id().map(|id| id.as_str()), Some("/tmp/cat.png"));
        assert!(Sector::text("c", "x", color()).image_id().is_none());
    }

    #[test]
    fn test_empty_wheel_never_spins() {
        let mut wheel = seeded(Vec::new(), 1);
        assert!(!wheel.can_spin());
        assert!(!wheel.start_spin());
        assert!(!wheel.is_spinning());
        for _ in 0..100 {
            assert!(wheel.advance().is_none());
        }
    }

    #[test]
    fn test_outcome_matches_highlighted_wedge() {
        let sectors = food();
        let mut wheel = seeded(sectors.clone(), 77);
        assert!(wheel.start_spin());
        assert!(!wheel.can_spin());

        let frame = wheel.frame();
        assert!(!frame.highlight);
        assert!(frame.highlighted_index().is_none());

        let outcome = spin_to_end(&mut wheel);
        let frame = wheel.frame();
        let index = frame.highlighted_index().unwrap();
        assert_eq!(outcome.winner.as_ref(), Some(&sectors[index]));
        assert!(wheel.can_spin());
    }

    #[test]
    fn test_outcome_emitted_once() {
        let mut wheel = seeded(food(), 8);
        wheel.start_spin();
        spin_to_end(&mut wheel);
        for _ in 0..100 {
            assert!(wheel.advance().is_none());
        }
    }

    #[test]
    fn test_no_highlight_before_first_spin() {
        let wheel = seeded(food(), 1);
        let frame = wheel.frame();
        assert!(!frame.highlight);
        assert_eq!(frame.pointer_index(), Some(4));
    }

    #[test]
    fn test_sectors_removed_mid_spin() {
        let mut wheel = seeded(food(), 4);
        wheel.start_spin();
        wheel.advance();
        wheel.set_sectors(Vec::new());

        let outcome = spin_to_end(&mut wheel);
        assert_eq!(outcome.winner, None);
        assert!(!wheel.frame().highlight);
    }

    #[test]
    fn test_changed_sectors_move_highlight() {
        let mut wheel = seeded(food(), 12);
        wheel.start_spin();
        spin_to_end(&mut wheel);
        assert!(wheel.frame().highlight);

        assert!(!wheel.set_sectors(food()));
        assert!(wheel.frame().highlight);

        let mut fewer = food();
        fewer.pop();
        assert!(wheel.set_sectors(fewer));

        let rotation = wheel.spin().rotation();
        let frame = wheel.frame();
        assert!(frame.highlight);
        assert_eq!(frame.highlighted_index(), winning_index(rotation, 5));
    }

    #[test]
    fn test_outcome_and_highlight_share_the_stopping_tick() {
        let mut wheel = seeded(food(), 21);
        wheel.start_spin();
        loop {
            let rotation = wheel.spin().rotation();
            match wheel.advance() {
                Some(outcome) => {
                    let frame = wheel.frame();
                    assert_eq!(frame.rotation, rotation);
                    let index = frame.highlighted_index().unwrap();
                    assert_eq!(outcome.winner.as_ref(), Some(&wheel.sectors()[index]));
                    break;
                }
                None => assert!(!wheel.frame().highlight),
            }
        }
    }

    #[test]
    fn test_weight_does_not_change_selection() {
        let plain = food();
        let weighted: Vec<_> = food()
            .into_iter()
            .enumerate()
            .map(|(i, mut s)| {
                s.weight = Some((i * 10) as f64);
                s
            })
            .collect();

        let mut a = seeded(plain, 31);
        let mut b = seeded(weighted, 31);
        a.start_spin();
        b.start_spin();
        let wa = spin_to_end(&mut a).winner.unwrap();
        let wb = spin_to_end(&mut b).winner.unwrap();
        assert_eq!(wa.id, wb.id);
        assert_eq!(a.spin().rotation(), b.spin().rotation());
    }
}

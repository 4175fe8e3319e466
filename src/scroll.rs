//! Scroll-driven shape selection.
//!
//! A host reports how far each page section has scrolled through the
//! viewport (`0` entering, `1` leaving). The section closest to the middle
//! of its run wins, and a morph is requested only when the winner changes.

/// Picks the active section from per-section scroll progress.
#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    active: Option<usize>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section to start on before any scroll input.
    ///
    /// Returns `Some(0)` exactly once so the host can issue the initial
    /// morph; afterwards returns `None`.
    pub fn initial(&mut self) -> Option<usize> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(0);
        Some(0)
    }

    /// Feed fresh progress values. Returns the new section when it changed.
    pub fn update(&mut self, progress: &[f32]) -> Option<usize> {
        let next = most_centered(progress)?;
        if self.active == Some(next) {
            return None;
        }
        log::debug!("Active section {:?} -> {}", self.active, next);
        self.active = Some(next);
        Some(next)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }
}

/// Index of the on-screen section whose progress is nearest to 0.5.
///
/// Sections outside `[0, 1]` are off screen. If none are on screen, the
/// first section that has started (`p > 0`) is used.
pub fn most_centered(progress: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &p) in progress.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            continue;
        }
        let score = 1.0 - (p - 0.5).abs();
        match best {
            Some((_, top)) if top >= score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
        .or_else(|| progress.iter().position(|&p| p > 0.0))
}

/// Progress of each of `sections` stacked one-viewport sections when the
/// page is scrolled `scroll` viewports down. Section `i` is centred at
/// `scroll == i`, where its progress is 0.5.
pub fn page_progress(scroll: f32, sections: usize, out: &mut Vec<f32>) {
    out.clear();
    out.extend((0..sections).map(|i| (scroll - i as f32 + 1.0) * 0.5));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_centered_section_wins() {
        assert_eq!(most_centered(&[1.0, 0.45, 0.1, -0.2]), Some(1));
        assert_eq!(most_centered(&[0.9, 0.2]), Some(1));
    }

    #[test]
    fn test_ties_keep_first() {
        assert_eq!(most_centered(&[0.25, 0.75]), Some(0));
    }

    #[test]
    fn test_fallback_to_first_started() {
        assert_eq!(most_centered(&[-0.5, 1.4, 2.0]), Some(1));
        assert_eq!(most_centered(&[-1.0, -0.5]), None);
        assert_eq!(most_centered(&[]), None);
    }

    #[test]
    fn test_page_progress_centres_sections() {
        let mut progress = Vec::new();
        page_progress(2.0, 4, &mut progress);
        assert_eq!(progress, vec![1.5, 1.0, 0.5, 0.0]);
        assert_eq!(most_centered(&progress), Some(2));

        page_progress(0.4, 4, &mut progress);
        assert_eq!(most_centered(&progress), Some(0));
        page_progress(0.6, 4, &mut progress);
        assert_eq!(most_centered(&progress), Some(1));
    }

    #[test]
    fn test_tracker_emits_on_change_only() {
        let mut tracker = SectionTracker::new();
        assert_eq!(tracker.initial(), Some(0));
        assert_eq!(tracker.initial(), None);
        assert_eq!(tracker.update(&[0.5, -0.3]), None);
        assert_eq!(tracker.update(&[1.2, 0.4]), Some(1));
        assert_eq!(tracker.update(&[1.3, 0.5]), None);
        assert_eq!(tracker.active(), Some(1));
    }
}

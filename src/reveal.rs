//! Staged reveal timeline.
//!
//! After the homepage preloader finishes (every category card image settled,
//! plus a short pause), the page reveals itself in stages:
//!
//! ```text
//! t = 0                     preloader fades out
//! t = content_delay         header and title fade in
//! t = images_delay          card i: overlay slides away after i × stagger
//!                           card i: label fades in after i × stagger + label_offset
//! ```
//!
//! The generator writes the per-card delays as inline `transition-delay`
//! styles, so `site.js` only has to flip two classes at the right moments.
//! Services entries reveal as they scroll into view, staggered by index.

use crate::config::RevealConfig;

/// Delays in milliseconds, derived from [`RevealConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub complete_delay: u32,
    pub content_delay: u32,
    pub images_delay: u32,
    stagger: u32,
    label_offset: u32,
    services_stagger: u32,
}

impl Timeline {
    pub fn new(config: &RevealConfig) -> Self {
        Self {
            complete_delay: config.complete_delay_ms,
            content_delay: config.content_delay_ms,
            images_delay: config.images_delay_ms,
            stagger: config.stagger_ms,
            label_offset: config.label_offset_ms,
            services_stagger: config.services_stagger_ms,
        }
    }

    /// Delay of card `index`'s image, relative to the images stage.
    pub fn card_image_delay(&self, index: usize) -> u32 {
        self.stagger.saturating_mul(index as u32)
    }

    /// Delay of card `index`'s label, relative to the images stage.
    pub fn card_label_delay(&self, index: usize) -> u32 {
        self.card_image_delay(index).saturating_add(self.label_offset)
    }

    /// Delay of services entry `index` once it scrolls into view.
    pub fn service_delay(&self, index: usize) -> u32 {
        self.services_stagger.saturating_mul(index as u32)
    }

    /// When the last of `cards` labels has started, relative to the end of
    /// the preloader. Used by the browser tests to know when to look.
    pub fn settled_after(&self, cards: usize) -> u32 {
        let last = cards.saturating_sub(1);
        self.images_delay.saturating_add(self.card_label_delay(last))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(&RevealConfig::default())
    }
}

/// Inline style carrying a transition delay.
pub fn delay_style(ms: u32) -> String {
    format!("transition-delay: {ms}ms")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeline() {
        let t = Timeline::default();
        assert_eq!(t.complete_delay, 300);
        assert_eq!(t.content_delay, 100);
        assert_eq!(t.images_delay, 800);
    }

    #[test]
    fn cards_stagger_by_index() {
        let t = Timeline::default();
        let images: Vec<u32> = (0..4).map(|i| t.card_image_delay(i)).collect();
        let labels: Vec<u32> = (0..4).map(|i| t.card_label_delay(i)).collect();
        assert_eq!(images, vec![0, 150, 300, 450]);
        assert_eq!(labels, vec![300, 450, 600, 750]);
    }

    #[test]
    fn services_stagger_by_index() {
        let t = Timeline::default();
        assert_eq!(t.service_delay(0), 0);
        assert_eq!(t.service_delay(3), 300);
    }

    #[test]
    fn settled_after_last_label() {
        let t = Timeline::default();
        assert_eq!(t.settled_after(4), 800 + 750);
        assert_eq!(t.settled_after(0), 800 + 300);
    }

    #[test]
    fn custom_config_flows_through() {
        let config = RevealConfig {
            stagger_ms: 50,
            label_offset_ms: 10,
            ..RevealConfig::default()
        };
        let t = Timeline::new(&config);
        assert_eq!(t.card_label_delay(2), 110);
    }

    #[test]
    fn huge_delays_saturate() {
        let config = RevealConfig {
            images_delay_ms: u32::MAX,
            ..RevealConfig::default()
        };
        assert_eq!(Timeline::new(&config).settled_after(4), u32::MAX);
    }

    #[test]
    fn delay_style_formats_milliseconds() {
        assert_eq!(delay_style(450), "transition-delay: 450ms");
    }
}

//! Autonomous options chosen on the init menu.

use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    field::Alliance,
    opcontrol::buttons::{Button, ButtonEdges},
};

/// Largest number of spike-mark samples the mission will try to cycle.
pub const MAX_CYCLES: u8 = 3;
/// Longest selectable start delay.
pub const MAX_START_DELAY: Duration = Duration::from_secs(15);

/// What the preloaded game element is scored as.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMode {
    /// Clip the preloaded specimen onto the high chamber.
    #[default]
    Specimen,
    /// Drop the preloaded sample in the high basket.
    Sample,
}

/// Where the robot ends the period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParkLocation {
    /// Touch the low rung for a level-one ascent.
    #[default]
    Ascent,
    /// Stay where the last phase left the robot.
    None,
}

/// Everything the operator can choose before the start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonOptions {
    pub alliance:      Alliance,
    /// Spike-mark samples to collect and score, `0..=MAX_CYCLES`.
    pub cycles:        u8,
    pub scoring:       ScoringMode,
    /// Skip all scoring and only park.
    pub park_only:     bool,
    pub score_preload: bool,
    pub start_delay:   Duration,
    pub park:          ParkLocation,
    /// Cycles that would start after this much of the period are skipped.
    pub cycle_cutoff:  Duration,
}

impl Default for AutonOptions {
    fn default() -> Self {
        Self {
            alliance:      Alliance::Blue,
            cycles:        MAX_CYCLES,
            scoring:       ScoringMode::Specimen,
            park_only:     false,
            score_preload: true,
            start_delay:   Duration::ZERO,
            park:          ParkLocation::Ascent,
            cycle_cutoff:  Duration::from_secs(22),
        }
    }
}

impl AutonOptions {
    /// Applies one loop of init-menu presses. Returns `true` if anything
    /// changed.
    ///
    /// | Button | Effect |
    /// |---|---|
    /// | cross | toggle alliance |
    /// | circle | toggle specimen / sample preload |
    /// | square | toggle park-only |
    /// | triangle | toggle preload scoring |
    /// | left bumper | toggle ascent park |
    /// | dpad up / down | more / fewer cycles |
    /// | dpad right / left | longer / shorter start delay |
    pub fn apply_menu(&mut self, edges: &ButtonEdges) -> bool {
        let before = *self;
        if edges.pressed(Button::Cross) {
            self.alliance = self.alliance.toggled();
        }
        if edges.pressed(Button::Circle) {
            self.scoring = match self.scoring {
                ScoringMode::Specimen => ScoringMode::Sample,
                ScoringMode::Sample => ScoringMode::Specimen,
            };
        }
        if edges.pressed(Button::Square) {
            self.park_only = !self.park_only;
        }
        if edges.pressed(Button::Triangle) {
            self.score_preload = !self.score_preload;
        }
        if edges.pressed(Button::LeftBumper) {
            self.park = match self.park {
                ParkLocation::Ascent => ParkLocation::None,
                ParkLocation::None => ParkLocation::Ascent,
            };
        }
        if edges.pressed(Button::DpadUp) && self.cycles < MAX_CYCLES {
            self.cycles += 1;
        }
        if edges.pressed(Button::DpadDown) {
            self.cycles = self.cycles.saturating_sub(1);
        }
        if edges.pressed(Button::DpadRight) {
            self.start_delay = (self.start_delay + Duration::from_secs(1)).min(MAX_START_DELAY);
        }
        if edges.pressed(Button::DpadLeft) {
            self.start_delay = self.start_delay.saturating_sub(Duration::from_secs(1));
        }

        let changed = *self != before;
        if changed {
            info!("{}", self.summary());
        }
        changed
    }

    /// One-line description for telemetry.
    pub fn summary(&self) -> String {
        format!(
            "{:?} alliance, {} preload{}, {} cycles, delay {}, park {:?}{}",
            self.alliance,
            match self.scoring {
                ScoringMode::Specimen => "specimen",
                ScoringMode::Sample => "sample",
            },
            if self.score_preload { "" } else { " (not scored)" },
            self.cycles,
            humantime::format_duration(self.start_delay),
            self.park,
            if self.park_only { ", PARK ONLY" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcontrol::buttons::GamepadState;

    fn press(options: &mut AutonOptions, button: Button) -> bool {
        let mut edges = ButtonEdges::default();
        edges.capture(GamepadState::with(button));
        options.apply_menu(&edges)
    }

    #[test]
    fn toggles_flip_back_and_forth() {
        let mut o = AutonOptions::default();
        assert!(press(&mut o, Button::Cross));
        assert_eq!(o.alliance, Alliance::Red);
        press(&mut o, Button::Cross);
        assert_eq!(o.alliance, Alliance::Blue);

        press(&mut o, Button::Circle);
        assert_eq!(o.scoring, ScoringMode::Sample);
        press(&mut o, Button::Square);
        assert!(o.park_only);
        press(&mut o, Button::Triangle);
        assert!(!o.score_preload);
        press(&mut o, Button::LeftBumper);
        assert_eq!(o.park, ParkLocation::None);
    }

    #[test]
    fn counters_stay_in_range() {
        let mut o = AutonOptions::default();
        assert!(!press(&mut o, Button::DpadUp));
        assert_eq!(o.cycles, MAX_CYCLES);
        for _ in 0..5 {
            press(&mut o, Button::DpadDown);
        }
        assert_eq!(o.cycles, 0);

        assert!(!press(&mut o, Button::DpadLeft));
        for _ in 0..20 {
            press(&mut o, Button::DpadRight);
        }
        assert_eq!(o.start_delay, MAX_START_DELAY);
    }

    #[test]
    fn held_button_acts_once() {
        let mut o = AutonOptions::default();
        let mut edges = ButtonEdges::default();
        edges.capture(GamepadState::with(Button::DpadDown));
        o.apply_menu(&edges);
        edges.capture(GamepadState::with(Button::DpadDown));
        o.apply_menu(&edges);
        assert_eq!(o.cycles, MAX_CYCLES - 1);
    }
}

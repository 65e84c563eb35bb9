#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Preflight,
    Intro,
    DrillF,
    DrillJ,
    DrillMix,
    GameTutorial,
    Game,
    Summary,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Preflight => "Keyboard check",
            Stage::Intro => "Intro",
            Stage::DrillF => "Drill F",
            Stage::DrillJ => "Drill J",
            Stage::DrillMix => "F/J Alternating",
            Stage::GameTutorial => "Game practice",
            Stage::Game => "Mini-game",
            Stage::Summary => "Summary",
        }
    }

    pub fn is_drill(self) -> bool {
        matches!(self, Stage::DrillF | Stage::DrillJ | Stage::DrillMix)
    }

    /// Position in the lesson flow, used for the overall progress bar.
    pub fn ordinal(self) -> usize {
        match self {
            Stage::Preflight => 0,
            Stage::Intro => 1,
            Stage::DrillF => 2,
            Stage::DrillJ => 3,
            Stage::DrillMix => 4,
            Stage::GameTutorial => 5,
            Stage::Game => 6,
            Stage::Summary => 7,
        }
    }

    pub const COUNT: usize = 8;
}

/// Sub-steps of the intro stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroStep {
    Posture,
    DiscoverF,
    DiscoverJ,
    Ready,
}

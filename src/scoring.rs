use crate::matching::MatchFlags;

/// What the player declared for a trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Response {
    /// No key before the deadline.
    None,
    /// `l`: the position repeats.
    Location,
    /// `a`: the color repeats.
    Color,
    /// space: both repeat.
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub correct: bool,
    pub points: u32,
}

impl Resolution {
    const MISS: Resolution = Resolution {
        correct: false,
        points: 0,
    };

    fn hit(points: u32) -> Self {
        Self {
            correct: true,
            points,
        }
    }
}

/// Scores a response against the true match set.
///
/// A claim earns points only when it names exactly the modalities that
/// matched: `l` with a position-only match, `a` with a color-only match,
/// space when both match. Anything else, including silence, scores zero.
pub fn resolve(response: Response, flags: MatchFlags) -> Resolution {
    match (response, flags.visual_match, flags.color_match) {
        (Response::Location, true, false) => Resolution::hit(1),
        (Response::Color, false, true) => Resolution::hit(1),
        (Response::Both, true, true) => Resolution::hit(2),
        _ => Resolution::MISS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FLAGS: [MatchFlags; 4] = [
        MatchFlags {
            visual_match: false,
            color_match: false,
        },
        MatchFlags {
            visual_match: true,
            color_match: false,
        },
        MatchFlags {
            visual_match: false,
            color_match: true,
        },
        MatchFlags {
            visual_match: true,
            color_match: true,
        },
    ];

    #[test]
    fn exact_claims_score() {
        assert_eq!(
            resolve(Response::Location, MatchFlags::new(true, false)),
            Resolution {
                correct: true,
                points: 1
            }
        );
        assert_eq!(
            resolve(Response::Color, MatchFlags::new(false, true)),
            Resolution {
                correct: true,
                points: 1
            }
        );
        assert_eq!(
            resolve(Response::Both, MatchFlags::new(true, true)),
            Resolution {
                correct: true,
                points: 2
            }
        );
    }

    #[test]
    fn partial_claim_on_double_match_scores_nothing() {
        let both = MatchFlags::new(true, true);
        assert_eq!(resolve(Response::Location, both), Resolution::MISS);
        assert_eq!(resolve(Response::Color, both), Resolution::MISS);
    }

    #[test]
    fn overbroad_claim_scores_nothing() {
        assert_eq!(
            resolve(Response::Both, MatchFlags::new(true, false)),
            Resolution::MISS
        );
        assert_eq!(
            resolve(Response::Both, MatchFlags::new(false, true)),
            Resolution::MISS
        );
        assert_eq!(
            resolve(Response::Both, MatchFlags::new(false, false)),
            Resolution::MISS
        );
    }

    #[test]
    fn wrong_modality_scores_nothing() {
        assert_eq!(
            resolve(Response::Location, MatchFlags::new(false, true)),
            Resolution::MISS
        );
        assert_eq!(
            resolve(Response::Color, MatchFlags::new(true, false)),
            Resolution::MISS
        );
        assert_eq!(
            resolve(Response::Location, MatchFlags::new(false, false)),
            Resolution::MISS
        );
    }

    #[test]
    fn silence_never_scores() {
        for flags in ALL_FLAGS {
            assert_eq!(resolve(Response::None, flags), Resolution::MISS);
        }
    }

    #[test]
    fn points_never_exceed_opportunities() {
        for flags in ALL_FLAGS {
            for response in [
                Response::None,
                Response::Location,
                Response::Color,
                Response::Both,
            ] {
                let r = resolve(response, flags);
                assert!(r.points <= flags.count());
                assert_eq!(r.correct, r.points > 0);
            }
        }
    }
}

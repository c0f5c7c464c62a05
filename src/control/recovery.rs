use crate::config::ControllerConfig;
use crate::error::ConfigError;
use log::{debug, info};
use rand::Rng;

/// Forward speeds below this magnitude count as standing still, in world units per second.
pub const STILLNESS_THRESHOLD: f64 = 10.0;

/// The throttle used to drive away from the spot the vehicle was stuck in.
pub const CLEARING_THROTTLE: f64 = 0.5;

/// The phase of the stuck recovery state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryPhase {
    /// Normal path following.
    Normal,
    /// Reversing away from whatever the vehicle is stuck on.
    Reversing,
    /// Driving forward again before path following resumes.
    PostRecovery,
}

/// What the controller should do this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecoveryAction {
    /// Run the path following controller.
    Pursue,
    /// Reverse at full throttle with fixed steering.
    /// `engage` is set on the tick reversing starts.
    Reverse { steering: f64, engage: bool },
    /// Drive forward to clear the recovery spot.
    /// `engage` is set on the tick the forward gear is restored.
    Clear { engage: bool },
    /// Cut the throttle for one tick before path following resumes.
    Release,
}

/// Detects when the vehicle is stuck and sequences the manoeuvre which frees it.
///
/// While not reversing, `stuck_timer` accumulates the time spent standing still.
/// Reversing is encoded by a negative `stuck_timer`, counting up towards zero.
#[derive(Clone, Debug)]
pub struct StuckRecovery {
    max_stuck_time: f64,
    unstuck_time: f64,
    enabled: bool,
    stuck_timer: f64,
    recovery_steer_sign: f64,
    post_recovery_timer: f64,
    is_post_recovery: bool,
}

impl StuckRecovery {
    /// Creates the state machine, disabled if the timings are invalid.
    pub(crate) fn new(config: &ControllerConfig) -> (Self, Option<ConfigError>) {
        let error = config.validate_recovery().err();
        let recovery = Self {
            max_stuck_time: config.max_stuck_time,
            unstuck_time: config.unstuck_time,
            enabled: error.is_none(),
            stuck_timer: 0.0,
            recovery_steer_sign: 1.0,
            post_recovery_timer: 0.0,
            is_post_recovery: false,
        };
        (recovery, error)
    }

    /// Whether stuck detection is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The current phase.
    pub fn phase(&self) -> RecoveryPhase {
        if self.is_post_recovery {
            RecoveryPhase::PostRecovery
        } else if self.stuck_timer < 0.0 {
            RecoveryPhase::Reversing
        } else {
            RecoveryPhase::Normal
        }
    }

    /// Time spent standing still, or while reversing, minus the time left to reverse.
    pub fn stuck_timer(&self) -> f64 {
        self.stuck_timer
    }

    /// The steering used while reversing, either -1 or 1.
    pub fn recovery_steer_sign(&self) -> f64 {
        self.recovery_steer_sign
    }

    /// The time left driving forward after reversing.
    pub fn post_recovery_timer(&self) -> f64 {
        self.post_recovery_timer
    }

    /// Advances the state machine by one tick.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    /// * `forward_speed` - The vehicle's signed forward speed
    /// * `rng` - Chooses the steering direction when reversing begins
    pub(crate) fn update<R: Rng + ?Sized>(&mut self, dt: f64, forward_speed: f64, rng: &mut R) -> RecoveryAction {
        if !self.enabled {
            return RecoveryAction::Pursue;
        }

        match self.phase() {
            RecoveryPhase::Normal => {
                if forward_speed.abs() < STILLNESS_THRESHOLD {
                    self.stuck_timer += dt;
                } else {
                    self.stuck_timer = 0.0;
                }

                if self.stuck_timer <= self.max_stuck_time {
                    return RecoveryAction::Pursue;
                }

                info!("Vehicle stuck for {:.2}s, reversing.", self.stuck_timer);
                self.stuck_timer = -self.unstuck_time;
                self.recovery_steer_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                RecoveryAction::Reverse {
                    steering: self.recovery_steer_sign,
                    engage: true,
                }
            }
            RecoveryPhase::Reversing => {
                self.stuck_timer += dt;
                if self.stuck_timer < 0.0 {
                    return RecoveryAction::Reverse {
                        steering: self.recovery_steer_sign,
                        engage: false,
                    };
                }

                debug!("Finished reversing, driving forward.");
                self.stuck_timer = 0.0;
                self.is_post_recovery = true;
                self.post_recovery_timer = 0.5 * self.max_stuck_time;
                RecoveryAction::Clear { engage: true }
            }
            RecoveryPhase::PostRecovery => {
                self.post_recovery_timer -= dt;
                if self.post_recovery_timer > 0.0 {
                    return RecoveryAction::Clear { engage: false };
                }

                debug!("Recovery complete, resuming path following.");
                self.is_post_recovery = false;
                self.post_recovery_timer = 0.0;
                self.stuck_timer = 0.0;
                RecoveryAction::Release
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn recovery(max_stuck_time: f64, unstuck_time: f64) -> StuckRecovery {
        let config = ControllerConfig {
            max_stuck_time,
            unstuck_time,
            ..Default::default()
        };
        StuckRecovery::new(&config).0
    }

    #[test]
    fn triggers_once_stuck_time_is_exceeded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut fsm = recovery(3.0, 1.5);

        // Exactly reaching the limit is not enough
        for _ in 0..6 {
            assert_eq!(fsm.update(0.5, 0.0, &mut rng), RecoveryAction::Pursue);
        }
        assert_eq!(fsm.stuck_timer(), 3.0);

        let action = fsm.update(0.5, 5.0, &mut rng);
        assert!(matches!(action, RecoveryAction::Reverse { engage: true, .. }));
        assert_eq!(fsm.phase(), RecoveryPhase::Reversing);
        assert_eq!(fsm.stuck_timer(), -1.5);
        assert_eq!(fsm.recovery_steer_sign().abs(), 1.0);
    }

    #[test]
    fn moving_resets_the_stuck_timer() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut fsm = recovery(3.0, 1.5);
        for _ in 0..5 {
            fsm.update(0.5, 0.0, &mut rng);
        }
        fsm.update(0.5, -250.0, &mut rng);
        assert_eq!(fsm.stuck_timer(), 0.0);
        assert_eq!(fsm.phase(), RecoveryPhase::Normal);
    }

    #[test]
    fn full_recovery_cycle() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut fsm = recovery(2.0, 1.5);
        while fsm.update(0.5, 0.0, &mut rng) == RecoveryAction::Pursue {}
        let sign = fsm.recovery_steer_sign();

        // Reversing holds its steering until the countdown expires
        for _ in 0..2 {
            assert_eq!(
                fsm.update(0.5, -100.0, &mut rng),
                RecoveryAction::Reverse {
                    steering: sign,
                    engage: false
                }
            );
        }
        assert_eq!(fsm.update(0.5, -100.0, &mut rng), RecoveryAction::Clear { engage: true });
        assert_eq!(fsm.phase(), RecoveryPhase::PostRecovery);
        assert_eq!(fsm.post_recovery_timer(), 1.0);

        assert_eq!(fsm.update(0.5, 50.0, &mut rng), RecoveryAction::Clear { engage: false });
        assert_eq!(fsm.update(0.5, 50.0, &mut rng), RecoveryAction::Release);
        assert_eq!(fsm.phase(), RecoveryPhase::Normal);
        assert_eq!(fsm.stuck_timer(), 0.0);
        assert_eq!(fsm.update(0.5, 0.0, &mut rng), RecoveryAction::Pursue);
        assert_eq!(fsm.stuck_timer(), 0.5);
    }

    #[test]
    fn steering_direction_is_seeded() {
        let signs = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut fsm = recovery(0.5, 0.5);
            (0..200)
                .filter_map(|_| match fsm.update(0.25, 0.0, &mut rng) {
                    RecoveryAction::Reverse { steering, engage: true } => Some(steering),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        let first = signs(1234);
        assert!(first.len() > 10);
        assert_eq!(first, signs(1234));
        assert!(first.contains(&1.0) && first.contains(&-1.0));
    }

    #[test]
    fn invalid_timings_disable_recovery() {
        let config = ControllerConfig {
            unstuck_time: 0.0,
            ..Default::default()
        };
        let (mut fsm, error) = StuckRecovery::new(&config);
        assert!(matches!(error, Some(ConfigError::Recovery { .. })));
        assert!(!fsm.is_enabled());

        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(fsm.update(1.0, 0.0, &mut rng), RecoveryAction::Pursue);
        }
    }
}

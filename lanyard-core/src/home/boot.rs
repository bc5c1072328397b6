//! Boot phase
//!
//! A persisted counter walks the badge through its first boots:
//!
//! | counter | phase      | action                                   |
//! |---------|------------|------------------------------------------|
//! | 0       | FirstBoot  | launch setup                             |
//! | 1       | SecondBoot | launch onboarding, counter = 2           |
//! | 2       | ThirdBoot  | sync clock if unset, check, counter = 3  |
//! | 3+      | Normal     | refresh only when needed, else recall    |

use lanyard_hal::{App, Clock, ConfigStore, ResetCause};

use crate::settings::{keys, StoreExt};

/// Unix time before which the wall clock counts as never set
pub const CLOCK_VALID_AFTER: u64 = 1_482_192_000;

/// Check whether the wall clock still needs setting
pub fn clock_unset<C: Clock>(clock: &mut C) -> bool {
    clock.unix_time() < CLOCK_VALID_AFTER
}

/// Where the badge is in its first-boot sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootPhase {
    FirstBoot,
    SecondBoot,
    ThirdBoot,
    Normal,
}

impl BootPhase {
    /// Decode the persisted counter
    pub fn from_counter(counter: u8) -> Self {
        match counter {
            0 => BootPhase::FirstBoot,
            1 => BootPhase::SecondBoot,
            2 => BootPhase::ThirdBoot,
            _ => BootPhase::Normal,
        }
    }

    /// Counter value that decodes to this phase
    pub fn counter(&self) -> u8 {
        match self {
            BootPhase::FirstBoot => 0,
            BootPhase::SecondBoot => 1,
            BootPhase::ThirdBoot => 2,
            BootPhase::Normal => 3,
        }
    }

    /// Read the persisted counter
    pub async fn load<S: ConfigStore>(store: &mut S) -> Self {
        Self::from_counter(store.get_u8(keys::BADGE, keys::SETUP_STATE, 0).await)
    }

    /// Counter value to persist when this phase is entered
    ///
    /// FirstBoot leaves the counter to the setup app.
    pub fn next_counter(&self) -> Option<u8> {
        match self {
            BootPhase::SecondBoot => Some(2),
            BootPhase::ThirdBoot => Some(3),
            BootPhase::FirstBoot | BootPhase::Normal => None,
        }
    }

    /// Persist the advance to the next phase
    pub async fn advance<S: ConfigStore>(&self, store: &mut S) {
        if let Some(next) = self.next_counter() {
            if let Err(e) = store.set_u8(keys::BADGE, keys::SETUP_STATE, next).await {
                warn!("Advancing boot phase failed: {}", e);
            }
        }
    }
}

/// What to do before the home screen appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootPlan {
    /// Hand over to another app right away
    Launch(App),
    /// Go online to sync the clock when `sync_clock`, then handle updates
    Refresh { sync_clock: bool, check: UpdateCheck },
    /// Stay offline and reuse the persisted update decision
    Recall,
}

/// Whether a refresh boot asks the server about updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateCheck {
    /// Check even if the clock sync failed
    Forced,
    /// Check only once the clock is known good
    IfSynced,
    /// Reuse the persisted decision
    Skip,
}

impl BootPlan {
    /// Decide the startup work for `phase`
    pub fn for_phase(phase: BootPhase, clock_unset: bool, reset_cause: ResetCause) -> Self {
        match phase {
            BootPhase::FirstBoot => BootPlan::Launch(App::Setup),
            BootPhase::SecondBoot => BootPlan::Launch(App::Onboarding),
            BootPhase::ThirdBoot => BootPlan::Refresh {
                sync_clock: clock_unset,
                check: UpdateCheck::Forced,
            },
            // Waking from sleep never asks the server, the clock may still need setting
            BootPhase::Normal => match (clock_unset, reset_cause) {
                (false, ResetCause::SleepWake) => BootPlan::Recall,
                (true, ResetCause::SleepWake) => BootPlan::Refresh {
                    sync_clock: true,
                    check: UpdateCheck::Skip,
                },
                (sync_clock, ResetCause::PowerOn) => BootPlan::Refresh {
                    sync_clock,
                    check: UpdateCheck::IfSynced,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MemoryStore};
    use embassy_futures::block_on;

    #[test]
    fn test_counter_decoding() {
        assert_eq!(BootPhase::from_counter(0), BootPhase::FirstBoot);
        assert_eq!(BootPhase::from_counter(1), BootPhase::SecondBoot);
        assert_eq!(BootPhase::from_counter(2), BootPhase::ThirdBoot);
        assert_eq!(BootPhase::from_counter(3), BootPhase::Normal);
        assert_eq!(BootPhase::from_counter(200), BootPhase::Normal);

        for phase in [
            BootPhase::FirstBoot,
            BootPhase::SecondBoot,
            BootPhase::ThirdBoot,
            BootPhase::Normal,
        ] {
            assert_eq!(BootPhase::from_counter(phase.counter()), phase);
        }
    }

    #[test]
    fn test_phase_advances_one_step_per_boot() {
        let mut store = MemoryStore::new();
        let mut seen = std::vec::Vec::new();
        for _ in 0..5 {
            let phase = block_on(BootPhase::load(&mut store));
            seen.push(phase);
            block_on(phase.advance(&mut store));
            if phase == BootPhase::FirstBoot {
                // Setup app finishes and moves the counter on
                store.insert(keys::BADGE, keys::SETUP_STATE, &[1]);
            }
        }
        assert_eq!(
            seen,
            [
                BootPhase::FirstBoot,
                BootPhase::SecondBoot,
                BootPhase::ThirdBoot,
                BootPhase::Normal,
                BootPhase::Normal,
            ]
        );
    }

    #[test]
    fn test_plans() {
        use BootPlan::*;
        use ResetCause::*;
        use UpdateCheck::*;

        assert_eq!(BootPlan::for_phase(BootPhase::FirstBoot, true, PowerOn), Launch(App::Setup));
        assert_eq!(
            BootPlan::for_phase(BootPhase::SecondBoot, false, SleepWake),
            Launch(App::Onboarding)
        );
        assert_eq!(
            BootPlan::for_phase(BootPhase::ThirdBoot, false, SleepWake),
            Refresh { sync_clock: false, check: Forced }
        );
        assert_eq!(
            BootPlan::for_phase(BootPhase::ThirdBoot, true, PowerOn),
            Refresh { sync_clock: true, check: Forced }
        );
        assert_eq!(
            BootPlan::for_phase(BootPhase::Normal, false, PowerOn),
            Refresh { sync_clock: false, check: IfSynced }
        );
        assert_eq!(
            BootPlan::for_phase(BootPhase::Normal, true, PowerOn),
            Refresh { sync_clock: true, check: IfSynced }
        );
        // Sleep wake syncs an unset clock but never fetches
        assert_eq!(
            BootPlan::for_phase(BootPhase::Normal, true, SleepWake),
            Refresh { sync_clock: true, check: Skip }
        );
        assert_eq!(BootPlan::for_phase(BootPhase::Normal, false, SleepWake), Recall);
    }

    #[test]
    fn test_clock_threshold() {
        let mut clock = ManualClock::new(0);
        clock.set_unix(CLOCK_VALID_AFTER - 1);
        assert!(clock_unset(&mut clock));
        clock.set_unix(CLOCK_VALID_AFTER);
        assert!(!clock_unset(&mut clock));
    }
}

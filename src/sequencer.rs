use crate::timer::PhaseKind;

/// Work/break cycle bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    pub completed_work_count: u32,
    /// Kept at least 1 by the constructors; zero reads as 1.
    pub long_break_frequency: u32,
}

impl CycleState {
    pub fn new(long_break_frequency: u32) -> Self {
        Self {
            completed_work_count: 0,
            long_break_frequency: long_break_frequency.max(1),
        }
    }

    pub fn set_frequency(&mut self, long_break_frequency: u32) {
        self.long_break_frequency = long_break_frequency.max(1);
    }

    /// 1-based slot of the upcoming (or current) work phase in its cycle.
    pub fn position_in_cycle(&self) -> u32 {
        self.completed_work_count % self.long_break_frequency.max(1) + 1
    }
}

/// Picks the phase that follows `just_finished`.
///
/// A finished work phase counts toward the long-break cycle; every
/// `long_break_frequency`-th one earns a long break. Breaks always lead back
/// to work, whatever their outcome.
pub fn next_phase(just_finished: PhaseKind, cycle: &mut CycleState) -> PhaseKind {
    match just_finished {
        PhaseKind::Work => {
            cycle.completed_work_count += 1;
            if cycle.completed_work_count % cycle.long_break_frequency.max(1) == 0 {
                PhaseKind::LongBreak
            } else {
                PhaseKind::ShortBreak
            }
        }
        PhaseKind::ShortBreak | PhaseKind::LongBreak => PhaseKind::Work,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn long_break_every_fourth_work() {
        let mut cycle = CycleState::new(4);
        let seq: Vec<_> = (0..9).map(|_| next_phase(PhaseKind::Work, &mut cycle)).collect();
        assert_eq!(
            seq,
            vec![
                PhaseKind::ShortBreak,
                PhaseKind::ShortBreak,
                PhaseKind::ShortBreak,
                PhaseKind::LongBreak,
                PhaseKind::ShortBreak,
                PhaseKind::ShortBreak,
                PhaseKind::ShortBreak,
                PhaseKind::LongBreak,
                PhaseKind::ShortBreak,
            ]
        );
        assert_eq!(cycle.completed_work_count, 9);
    }

    #[test]
    fn breaks_lead_to_work_without_counting() {
        let mut cycle = CycleState::new(4);
        assert_eq!(next_phase(PhaseKind::ShortBreak, &mut cycle), PhaseKind::Work);
        assert_eq!(next_phase(PhaseKind::LongBreak, &mut cycle), PhaseKind::Work);
        assert_eq!(cycle.completed_work_count, 0);
    }

    #[test]
    fn frequency_one_always_long() {
        let mut cycle = CycleState::new(1);
        assert_eq!(next_phase(PhaseKind::Work, &mut cycle), PhaseKind::LongBreak);
        assert_eq!(next_phase(PhaseKind::Work, &mut cycle), PhaseKind::LongBreak);
    }

    #[test]
    fn zero_frequency_is_clamped() {
        let cycle = CycleState::new(0);
        assert_eq!(cycle.long_break_frequency, 1);
    }

    #[test]
    fn position_tolerates_zeroed_frequency() {
        let cycle = CycleState { completed_work_count: 5, long_break_frequency: 0 };
        assert_eq!(cycle.position_in_cycle(), 1);
    }

    #[test]
    fn position_wraps_with_cycle() {
        let mut cycle = CycleState::new(3);
        assert_eq!(cycle.position_in_cycle(), 1);
        next_phase(PhaseKind::Work, &mut cycle);
        next_phase(PhaseKind::Work, &mut cycle);
        assert_eq!(cycle.position_in_cycle(), 3);
        next_phase(PhaseKind::Work, &mut cycle);
        assert_eq!(cycle.position_in_cycle(), 1);
    }

    fn kind() -> impl Strategy<Value = PhaseKind> {
        prop_oneof![
            Just(PhaseKind::Work),
            Just(PhaseKind::ShortBreak),
            Just(PhaseKind::LongBreak),
        ]
    }

    proptest! {
        #[test]
        fn prop_deterministic_for_same_inputs(
            finished in kind(),
            count in 0u32..10_000,
            freq in 1u32..50,
        ) {
            let start = CycleState { completed_work_count: count, long_break_frequency: freq };
            let (mut a, mut b) = (start, start);
            prop_assert_eq!(next_phase(finished, &mut a), next_phase(finished, &mut b));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_never_break_to_break(finished in kind(), count in 0u32..10_000, freq in 1u32..50) {
            let mut cycle = CycleState { completed_work_count: count, long_break_frequency: freq };
            let next = next_phase(finished, &mut cycle);
            prop_assert!(finished.is_break() != next.is_break());
        }
    }
}

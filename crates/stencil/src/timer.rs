//! # Timer Service — Named One-Shot and Repeating Timers
//!
//! Timers are scheduled by name, advanced once per frame by
//! [`TimerService::tick`], and fire [`ActionEvent`]s carrying their action
//! code when their elapsed time reaches the duration.
//!
//! A repeating timer carries leftover time into the next interval
//! (`elapsed -= duration` on firing, not `= 0`), so its long-run rate stays
//! correct and the drift per firing is bounded by the tick granularity. A
//! non-repeating timer fires exactly once and is removed in the same tick.
//!
//! Entries live in a `Vec` rather than a map: timers that expire in the same
//! tick fire in insertion order, deterministically.

use crate::error::{Error, Result};
use crate::event::{Action, ActionEvent};

struct TimerEntry {
    name: String,
    duration: f32,
    elapsed: f32,
    repeat: bool,
    active: bool,
    action: Action,
}

/// Owns every scheduled timer, keyed by event name.
#[derive(Default)]
pub struct TimerService {
    timers: Vec<TimerEntry>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer that fires `action` after `duration` seconds,
    /// repeating if `repeat` is set.
    ///
    /// Fails with [`Error::DuplicateId`] if `name` is already scheduled.
    pub fn schedule(
        &mut self,
        name: impl Into<String>,
        duration: f32,
        repeat: bool,
        action: Action,
    ) -> Result<()> {
        let name = name.into();
        if self.timers.iter().any(|t| t.name == name) {
            return Err(Error::duplicate("timer", name));
        }
        if duration <= 0.0 {
            log::warn!("timer \"{name}\" scheduled with duration {duration}; fires every tick");
        }
        self.timers.push(TimerEntry {
            name,
            duration,
            elapsed: 0.0,
            repeat,
            active: true,
            action,
        });
        Ok(())
    }

    /// Remove the timer named `name` before it fires (or between firings of
    /// a repeating timer).
    ///
    /// Fails with [`Error::NotFound`] if no such timer is scheduled — which
    /// includes a non-repeating timer that already fired and was removed.
    pub fn cancel(&mut self, name: &str) -> Result<()> {
        let before = self.timers.len();
        self.timers.retain(|t| t.name != name);
        if self.timers.len() == before {
            return Err(Error::not_found("timer", name));
        }
        Ok(())
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.timers.iter().any(|t| t.name == name)
    }

    /// Accumulated time toward the next firing, for introspection.
    pub fn elapsed(&self, name: &str) -> Option<f32> {
        self.timers.iter().find(|t| t.name == name).map(|t| t.elapsed)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance every active timer by `dt` seconds and collect the events of
    /// timers that fired, in insertion order. Fired non-repeating timers are
    /// removed before returning.
    ///
    /// At most one firing per timer per tick: a repeating timer whose
    /// backlog exceeds one interval catches up over subsequent ticks.
    pub fn tick(&mut self, dt: f32) -> Vec<ActionEvent> {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            if !timer.active {
                continue;
            }
            timer.elapsed += dt;
            if timer.elapsed >= timer.duration {
                log::debug!("timer \"{}\" fired action {}", timer.name, timer.action);
                fired.push(ActionEvent::timer(timer.name.clone(), timer.action));
                if timer.repeat {
                    timer.elapsed -= timer.duration;
                } else {
                    timer.active = false;
                }
            }
        }
        self.timers.retain(|t| t.active);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;

    #[test]
    fn duplicate_name_rejected() {
        let mut timers = TimerService::new();
        timers.schedule("wave", 1.0, false, Action(1)).unwrap();
        assert!(matches!(
            timers.schedule("wave", 2.0, true, Action(2)),
            Err(Error::DuplicateId { .. })
        ));
        // The original schedule is untouched.
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn cancel_unknown_is_not_found() {
        let mut timers = TimerService::new();
        assert!(matches!(
            timers.cancel("ghost"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn one_shot_fires_exactly_once() {
        let mut timers = TimerService::new();
        timers.schedule("boom", 1.0, false, Action(9)).unwrap();

        assert!(timers.tick(0.5).is_empty());
        let fired = timers.tick(0.6);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].action, Action(9));

        // However many ticks follow, it never fires again.
        for _ in 0..5 {
            assert!(timers.tick(10.0).is_empty());
        }
        assert!(!timers.is_scheduled("boom"));
    }

    #[test]
    fn repeating_timer_carries_over_leftover_time() {
        // Duration 5.0, three ticks of 2.0: one firing on the third tick,
        // elapsed left at 1.0.
        let mut timers = TimerService::new();
        timers.schedule("spawnWave", 5.0, true, Action(42)).unwrap();

        assert!(timers.tick(2.0).is_empty());
        assert!(timers.tick(2.0).is_empty());
        let fired = timers.tick(2.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].action, Action(42));
        assert_eq!(
            fired[0].source,
            EventSource::Timer {
                name: "spawnWave".into()
            }
        );
        assert_eq!(timers.elapsed("spawnWave"), Some(1.0));
        assert!(timers.is_scheduled("spawnWave"));
    }

    #[test]
    fn same_tick_firings_are_in_insertion_order() {
        let mut timers = TimerService::new();
        timers.schedule("second", 1.0, false, Action(2)).unwrap();
        timers.schedule("first", 0.5, false, Action(1)).unwrap();

        // Both expire on this tick; insertion order wins, not duration.
        let fired = timers.tick(2.0);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].action, Action(2));
        assert_eq!(fired[1].action, Action(1));
    }

    #[test]
    fn cancel_between_repeats() {
        let mut timers = TimerService::new();
        timers.schedule("pulse", 1.0, true, Action(3)).unwrap();
        assert_eq!(timers.tick(1.0).len(), 1);

        timers.cancel("pulse").unwrap();
        assert!(timers.tick(5.0).is_empty());
    }
}

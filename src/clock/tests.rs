use super::*;
use crate::schedule::MinuteRange;
use chrono::{Duration, NaiveDate};
use std::time::Duration as StdDuration;

fn monday_morning() -> NaiveDateTime {
    // 2024-06-10 is a Monday
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn break_config(name: &str, frequency: TimeSpan, length: TimeSpan) -> BreakConfig {
    BreakConfig {
        name: name.to_string(),
        enabled: true,
        frequency,
        length,
        postpone_length: TimeSpan::from_mins(2),
        postpone_limit: 1,
        notification: NotificationStyle::Notification,
        sound: None,
        notify_before: None,
        ideas: Vec::new(),
    }
}

fn settings_with(breaks: Vec<BreakConfig>) -> Settings {
    Settings {
        breaks,
        ..Settings::default()
    }
}

fn micro_only() -> Settings {
    settings_with(vec![break_config(
        "micro",
        TimeSpan::from_mins(10),
        TimeSpan::from_secs(20),
    )])
}

/// Ticks once per second from just after `from` up to and including `to`.
fn run(
    clock: &mut BreakClock,
    from: NaiveDateTime,
    to: NaiveDateTime,
    idle: impl Fn(NaiveDateTime) -> IdleStatus,
) -> Vec<(NaiveDateTime, ClockEvent)> {
    let mut events = Vec::new();
    let mut now = from;
    while now < to {
        now += Duration::seconds(1);
        for event in clock.tick(now, idle(now)) {
            events.push((now, event));
        }
    }
    events
}

fn active(_: NaiveDateTime) -> IdleStatus {
    IdleStatus::active()
}

fn started(events: &[(NaiveDateTime, ClockEvent)]) -> Vec<(NaiveDateTime, String)> {
    events
        .iter()
        .filter_map(|(at, event)| match event {
            ClockEvent::BreakStarted(active) => Some((*at, active.name.clone())),
            _ => None,
        })
        .collect()
}

fn assert_schedule_in_future(clock: &BreakClock, now: NaiveDateTime) {
    for (name, due) in clock.schedule.upcoming() {
        assert!(due > now, "{name} is due at {due}, which is not after {now}");
    }
}

#[test]
fn break_becomes_due_one_frequency_after_start() {
    for minutes in [1, 7, 25] {
        let start = monday_morning();
        let frequency = TimeSpan::from_mins(minutes);
        let settings = settings_with(vec![break_config("b", frequency, TimeSpan::from_secs(10))]);
        let mut clock = BreakClock::new(&settings, start);

        let due_at = start + frequency.as_delta();
        let events = run(&mut clock, start, due_at, active);

        assert_eq!(started(&events), vec![(due_at, "b".to_string())]);
    }
}

#[test]
fn completed_break_is_rescheduled_a_full_frequency_after_it_ends() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let ends_at = start + Duration::minutes(10) + Duration::seconds(20);
    let events = run(&mut clock, start, ends_at, active);

    assert!(events.iter().any(|(at, event)| *at == ends_at
        && *event
            == ClockEvent::BreakFinished {
                name: "micro".to_string(),
                early: false
            }));
    assert!(clock.active().is_none());
    assert_eq!(clock.schedule.get("micro"), Some(ends_at + Duration::minutes(10)));
}

#[test]
fn schedule_entries_are_always_in_the_future() {
    let start = monday_morning();
    let mut settings = settings_with(vec![
        break_config("a", TimeSpan::from_mins(3), TimeSpan::from_secs(30)),
        break_config("b", TimeSpan::from_mins(4), TimeSpan::from_mins(1)),
        break_config("c", TimeSpan::from_mins(6), TimeSpan::from_secs(10)),
    ]);
    settings.natural_breaks.inactivity_reset = TimeSpan::from_mins(2);
    let mut clock = BreakClock::new(&settings, start);

    let mut now = start;
    for second in 1..=3600 {
        now += Duration::seconds(1);
        let idle = if (1200..1400).contains(&second) {
            IdleStatus::idle(StdDuration::from_secs(second - 1200))
        } else {
            IdleStatus::active()
        };
        clock.tick(now, idle);
        if second % 500 == 0 && clock.active().is_some() {
            let _ = clock.postpone(now);
        }
        assert_schedule_in_future(&clock, now);
    }
}

#[test]
fn long_lock_resets_without_idle_notification() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let lock_start = start + Duration::minutes(1);
    let unlock = lock_start + Duration::minutes(45);
    let events = run(&mut clock, start, unlock, |now| {
        if now >= lock_start && now < unlock {
            IdleStatus::locked(StdDuration::ZERO)
        } else {
            IdleStatus::active()
        }
    });

    assert!(started(&events).is_empty());
    assert!(!events
        .iter()
        .any(|(_, event)| matches!(event, ClockEvent::NaturalBreakEnded { .. })));
    assert_eq!(
        events.last(),
        Some(&(
            unlock,
            ClockEvent::ScheduleReset {
                reason: ResetReason::LongLock {
                    locked_for: TimeSpan::from_mins(45)
                }
            }
        ))
    );
    assert_eq!(clock.status(), ClockStatus::Running);
    assert_eq!(clock.schedule.get("micro"), Some(unlock + Duration::minutes(10)));
}

#[test]
fn short_lock_ends_with_natural_break_notification() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let lock_start = start + Duration::minutes(1);
    let unlock = lock_start + Duration::minutes(3);
    let events = run(&mut clock, start, unlock, |now| {
        if now >= lock_start && now < unlock {
            IdleStatus::locked(StdDuration::ZERO)
        } else {
            IdleStatus::active()
        }
    });

    assert_eq!(
        events.last(),
        Some(&(
            unlock,
            ClockEvent::NaturalBreakEnded {
                away_for: TimeSpan::from_mins(3)
            }
        ))
    );
}

#[test]
fn lock_is_ignored_when_reset_on_lock_is_off() {
    let start = monday_morning();
    let mut settings = micro_only();
    settings.reset_on_lock = false;
    settings.natural_breaks.enabled = false;
    let mut clock = BreakClock::new(&settings, start);

    let due_at = start + Duration::minutes(10);
    let events = run(&mut clock, start, due_at, |_| IdleStatus::locked(StdDuration::ZERO));

    assert_eq!(started(&events), vec![(due_at, "micro".to_string())]);
}

#[test]
fn idle_past_threshold_is_a_natural_break() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let leave = start + Duration::minutes(2);
    let back = leave + Duration::minutes(7);
    let events = run(&mut clock, start, back, |now| {
        if now >= leave && now < back {
            IdleStatus::idle((now - leave).to_std().unwrap())
        } else {
            IdleStatus::active()
        }
    });

    let became_away = leave + Duration::minutes(5);
    assert!(events.contains(&(
        became_away,
        ClockEvent::NaturalBreakStarted {
            idle_for: TimeSpan::from_mins(5),
            locked: false
        }
    )));
    assert!(events.contains(&(
        back,
        ClockEvent::NaturalBreakEnded {
            away_for: TimeSpan::from_mins(7)
        }
    )));
    assert!(started(&events).is_empty());
    assert_eq!(clock.schedule.get("micro"), Some(back + Duration::minutes(10)));
}

#[test]
fn idle_below_threshold_keeps_the_schedule() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let due_at = start + Duration::minutes(10);
    let events = run(&mut clock, start, due_at, |now| {
        IdleStatus::idle(((now - start) / 3).to_std().unwrap())
    });

    assert_eq!(started(&events), vec![(due_at, "micro".to_string())]);
}

#[test]
fn idle_is_ignored_during_an_active_break() {
    let start = monday_morning();
    let mut settings = settings_with(vec![break_config(
        "long",
        TimeSpan::from_mins(30),
        TimeSpan::from_mins(10),
    )]);
    settings.natural_breaks.inactivity_reset = TimeSpan::from_mins(1);
    let mut clock = BreakClock::new(&settings, start);

    let due_at = start + Duration::minutes(30);
    run(&mut clock, start, due_at, active);
    let ends_at = due_at + Duration::minutes(10);
    let events = run(&mut clock, due_at, ends_at, |now| {
        if now < ends_at {
            IdleStatus::idle((now - due_at).to_std().unwrap())
        } else {
            IdleStatus::active()
        }
    });

    assert_eq!(
        events.last().map(|(_, event)| event),
        Some(&ClockEvent::BreakFinished {
            name: "long".to_string(),
            early: false
        })
    );
    assert!(!events
        .iter()
        .any(|(_, event)| matches!(event, ClockEvent::NaturalBreakStarted { .. })));
}

#[test]
fn sleep_longer_than_interval_resets_instead_of_firing() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    run(&mut clock, start, start + Duration::minutes(2), active);
    let wake = start + Duration::minutes(20);
    let events = clock.tick(wake, IdleStatus::active());

    assert_eq!(
        events,
        vec![ClockEvent::ScheduleReset {
            reason: ResetReason::Sleep {
                gap: TimeSpan::from_mins(18)
            }
        }]
    );
    assert_eq!(clock.schedule.get("micro"), Some(wake + Duration::minutes(10)));
}

#[test]
fn short_gap_does_not_reset() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let events = clock.tick(start + Duration::minutes(3), IdleStatus::active());

    assert!(events.is_empty());
    assert_eq!(clock.schedule.get("micro"), Some(start + Duration::minutes(10)));
}

#[test]
fn sleep_drops_an_active_break() {
    let start = monday_morning();
    let mut settings = micro_only();
    settings.breaks[0].length = TimeSpan::from_mins(5);
    let mut clock = BreakClock::new(&settings, start);

    run(&mut clock, start, start + Duration::minutes(10), active);
    assert!(clock.active().is_some());

    clock.tick(start + Duration::minutes(40), IdleStatus::active());

    assert!(clock.active().is_none());
}

#[test]
fn clock_moving_backwards_reseeds() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let earlier = start - Duration::hours(1);
    let events = clock.tick(earlier, IdleStatus::active());

    assert_eq!(
        events,
        vec![ClockEvent::ScheduleReset {
            reason: ResetReason::ClockMovedBackwards
        }]
    );
    assert_eq!(clock.schedule.get("micro"), Some(earlier + Duration::minutes(10)));
}

#[test]
fn slow_ticks_are_not_mistaken_for_sleep() {
    let start = monday_morning();
    let mut settings = settings_with(vec![break_config(
        "micro",
        TimeSpan::from_mins(1),
        TimeSpan::from_secs(20),
    )]);
    settings.tick_interval_ms = 60_000;
    let mut clock = BreakClock::new(&settings, start);

    let due_at = start + Duration::minutes(1);
    let events = clock.tick(due_at, IdleStatus::active());
    assert!(matches!(events.as_slice(), [ClockEvent::BreakStarted(active)] if active.name == "micro"));

    let next_tick = due_at + Duration::minutes(1);
    assert_eq!(
        clock.tick(next_tick, IdleStatus::active()),
        vec![ClockEvent::BreakFinished {
            name: "micro".to_string(),
            early: false
        }]
    );
    assert_eq!(clock.schedule.get("micro"), Some(next_tick + Duration::minutes(1)));
}

#[test]
fn late_tick_close_to_the_frequency_still_starts_the_break() {
    let start = monday_morning();
    let mut settings = settings_with(vec![break_config(
        "eyes",
        TimeSpan::from_secs(40),
        TimeSpan::from_secs(10),
    )]);
    settings.tick_interval_ms = 30_000;
    let mut clock = BreakClock::new(&settings, start);

    let events = clock.tick(start + Duration::seconds(40), IdleStatus::active());

    assert!(matches!(events.as_slice(), [ClockEvent::BreakStarted(active)] if active.name == "eyes"));
}

#[test]
fn sleep_while_locked_ends_with_long_lock() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let lock_start = start + Duration::minutes(1);
    run(&mut clock, start, lock_start, active);
    let locked_at = lock_start + Duration::seconds(1);
    assert!(matches!(
        clock.tick(locked_at, IdleStatus::locked(StdDuration::ZERO)).as_slice(),
        [ClockEvent::NaturalBreakStarted { locked: true, .. }]
    ));

    let wake = locked_at + Duration::hours(2);
    assert!(clock.tick(wake, IdleStatus::locked(StdDuration::ZERO)).is_empty());
    assert!(clock.schedule.is_empty());

    let unlock = wake + Duration::seconds(1);
    let events = clock.tick(unlock, IdleStatus::active());

    assert_eq!(
        events,
        vec![ClockEvent::ScheduleReset {
            reason: ResetReason::LongLock {
                locked_for: TimeSpan::from_secs(2 * 3600 + 1)
            }
        }]
    );
    assert_eq!(clock.schedule.get("micro"), Some(unlock + Duration::minutes(10)));
}

#[test]
fn sleep_while_paused_resets_nothing() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);
    clock.pause(None);

    let wake = start + Duration::hours(2);
    assert!(clock.tick(wake, IdleStatus::active()).is_empty());
    assert!(clock.schedule.is_empty());
    assert_eq!(clock.status(), ClockStatus::Paused { until: None });

    clock.resume(wake).unwrap();
    assert_eq!(clock.schedule.get("micro"), Some(wake + Duration::minutes(10)));
}

#[test]
fn sleep_past_a_timed_pause_only_resumes() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);
    clock.pause(Some(start + Duration::minutes(30)));

    let wake = start + Duration::hours(2);
    let events = clock.tick(wake, IdleStatus::active());

    assert_eq!(
        events,
        vec![ClockEvent::ScheduleReset {
            reason: ResetReason::Resumed
        }]
    );
    assert_eq!(clock.schedule.get("micro"), Some(wake + Duration::minutes(10)));
}

#[test]
fn absurd_idle_time_counts_from_now() {
    for idle_for in [StdDuration::MAX, StdDuration::from_secs(1 << 50)] {
        let start = monday_morning();
        let mut clock = BreakClock::new(&micro_only(), start);

        let now = start + Duration::seconds(1);
        let events = clock.tick(now, IdleStatus::idle(idle_for));

        assert_eq!(
            events,
            vec![ClockEvent::NaturalBreakStarted {
                idle_for: TimeSpan::from_secs(0),
                locked: false
            }]
        );
        assert_eq!(clock.status(), ClockStatus::Away { since: now });
    }
}

#[test]
fn postponing_is_limited() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let due_at = start + Duration::minutes(10);
    run(&mut clock, start, due_at, active);
    assert!(clock.can_postpone());

    let event = clock.postpone(due_at).unwrap();
    let postponed_to = due_at + Duration::minutes(2);
    assert_eq!(
        event,
        ClockEvent::BreakPostponed {
            name: "micro".to_string(),
            until: postponed_to,
            postpones_used: 1
        }
    );

    let events = run(&mut clock, due_at, postponed_to, active);
    assert_eq!(started(&events), vec![(postponed_to, "micro".to_string())]);
    assert_eq!(clock.active().map(|active| active.postpones_used), Some(1));
    assert!(!clock.can_postpone());

    assert_eq!(
        clock.postpone(postponed_to),
        Err(ClockError::PostponeLimitReached {
            name: "micro".to_string(),
            limit: 1
        })
    );
    assert_eq!(clock.postpones_used("micro"), 1);
    assert!(clock.active().is_some());
}

#[test]
fn postpone_count_resets_after_the_break_is_taken() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let due_at = start + Duration::minutes(10);
    run(&mut clock, start, due_at, active);
    clock.postpone(due_at).unwrap();
    let postponed_to = due_at + Duration::minutes(2);
    run(&mut clock, due_at, postponed_to + Duration::seconds(20), active);

    assert_eq!(clock.postpones_used("micro"), 0);
}

#[test]
fn postponing_without_an_active_break_fails() {
    let mut clock = BreakClock::new(&micro_only(), monday_morning());

    assert_eq!(clock.postpone(monday_morning()), Err(ClockError::NoActiveBreak));
    assert!(!clock.can_postpone());
}

#[test]
fn zero_postpone_limit_disables_postponing() {
    let start = monday_morning();
    let mut settings = micro_only();
    settings.breaks[0].postpone_limit = 0;
    let mut clock = BreakClock::new(&settings, start);

    run(&mut clock, start, start + Duration::minutes(10), active);

    assert!(!clock.can_postpone());
    assert!(matches!(
        clock.postpone(start + Duration::minutes(10)),
        Err(ClockError::PostponeLimitReached { limit: 0, .. })
    ));
}

#[test]
fn skipping_an_active_break_reschedules_at_full_frequency() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let due_at = start + Duration::minutes(10);
    run(&mut clock, start, due_at, active);
    let skip_at = due_at + Duration::seconds(5);

    let event = clock.skip(skip_at).unwrap();

    assert_eq!(
        event,
        ClockEvent::BreakSkipped {
            name: "micro".to_string(),
            next_due: skip_at + Duration::minutes(10)
        }
    );
    assert!(clock.active().is_none());
    assert_eq!(clock.schedule.get("micro"), Some(skip_at + Duration::minutes(10)));
}

#[test]
fn skipping_without_an_active_break_skips_the_next_one() {
    let start = monday_morning();
    let settings = settings_with(vec![
        break_config("short", TimeSpan::from_mins(10), TimeSpan::from_secs(20)),
        break_config("long", TimeSpan::from_mins(30), TimeSpan::from_mins(5)),
    ]);
    let mut clock = BreakClock::new(&settings, start);

    let skip_at = start + Duration::minutes(4);
    let event = clock.skip(skip_at).unwrap();

    assert_eq!(
        event,
        ClockEvent::BreakSkipped {
            name: "short".to_string(),
            next_due: skip_at + Duration::minutes(10)
        }
    );
    assert_eq!(clock.schedule.get("long"), Some(start + Duration::minutes(30)));
}

#[test]
fn longest_due_break_wins_and_covers_the_others() {
    let start = monday_morning();
    let settings = settings_with(vec![
        break_config("short", TimeSpan::from_mins(10), TimeSpan::from_secs(20)),
        break_config("long", TimeSpan::from_mins(10), TimeSpan::from_mins(1)),
    ]);
    let mut clock = BreakClock::new(&settings, start);

    let due_at = start + Duration::minutes(10);
    let events = run(&mut clock, start, due_at, active);

    assert_eq!(started(&events), vec![(due_at, "long".to_string())]);
    assert_eq!(clock.active().map(|a| a.covers.clone()), Some(vec!["short".to_string()]));
    assert!(clock.schedule.is_empty());

    let ends_at = due_at + Duration::minutes(1);
    run(&mut clock, due_at, ends_at, active);

    assert_eq!(clock.schedule.get("short"), Some(ends_at + Duration::minutes(10)));
    assert_eq!(clock.schedule.get("long"), Some(ends_at + Duration::minutes(10)));
}

#[test]
fn break_falling_due_during_another_waits_for_it_to_end() {
    let start = monday_morning();
    let settings = settings_with(vec![
        break_config("a", TimeSpan::from_mins(5), TimeSpan::from_secs(20)),
        break_config("b", TimeSpan::from_secs(310), TimeSpan::from_mins(1)),
    ]);
    let mut clock = BreakClock::new(&settings, start);

    let a_ends = start + Duration::seconds(320);
    let events = run(&mut clock, start, a_ends, active);

    assert_eq!(
        started(&events),
        vec![
            (start + Duration::minutes(5), "a".to_string()),
            (a_ends, "b".to_string()),
        ]
    );
}

#[test]
fn finishing_early_counts_as_taking_shorter_breaks() {
    let start = monday_morning();
    let settings = settings_with(vec![
        break_config("short", TimeSpan::from_mins(10), TimeSpan::from_secs(20)),
        break_config("long", TimeSpan::from_mins(30), TimeSpan::from_mins(5)),
    ]);
    let mut clock = BreakClock::new(&settings, start);

    let now = start + Duration::minutes(8);
    clock.start_now(now, Some("long")).unwrap();
    let finish_at = now + Duration::minutes(2);
    let event = clock.finish(finish_at).unwrap();

    assert_eq!(
        event,
        ClockEvent::BreakFinished {
            name: "long".to_string(),
            early: true
        }
    );
    assert_eq!(clock.schedule.get("short"), Some(finish_at + Duration::minutes(10)));
    assert_eq!(clock.schedule.get("long"), Some(finish_at + Duration::minutes(30)));
}

#[test]
fn start_now_rejects_conflicts() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    assert_eq!(
        clock.start_now(start, Some("lunch")),
        Err(ClockError::UnknownBreak("lunch".to_string()))
    );
    assert!(matches!(clock.start_now(start, None), Ok(ClockEvent::BreakStarted(_))));
    assert_eq!(
        clock.start_now(start, None),
        Err(ClockError::BreakAlreadyActive("micro".to_string()))
    );
}

#[test]
fn upcoming_warning_fires_once() {
    let start = monday_morning();
    let mut settings = micro_only();
    settings.breaks[0].notify_before = Some(TimeSpan::from_secs(10));
    let mut clock = BreakClock::new(&settings, start);

    let events = run(&mut clock, start, start + Duration::minutes(10), active);
    let warnings: Vec<_> = events
        .iter()
        .filter(|(_, event)| matches!(event, ClockEvent::BreakUpcoming { .. }))
        .collect();

    assert_eq!(
        warnings,
        vec![&(
            start + Duration::seconds(590),
            ClockEvent::BreakUpcoming {
                name: "micro".to_string(),
                starts_in: TimeSpan::from_secs(10)
            }
        )]
    );
}

#[test]
fn no_breaks_outside_working_hours() {
    // Monday 16:55, five minutes before the end of the working day
    let start = monday_morning() + Duration::hours(6) + Duration::minutes(55);
    let mut settings = micro_only();
    settings.working_hours.enabled = true;
    let mut clock = BreakClock::new(&settings, start);

    let end_of_day = monday_morning() + Duration::hours(7);
    let events = run(&mut clock, start, start + Duration::minutes(30), active);

    assert!(started(&events).is_empty());
    assert_eq!(
        events,
        vec![(
            end_of_day,
            ClockEvent::ScheduleCleared {
                reason: ClearReason::OutsideWorkingHours
            }
        )]
    );
    assert_eq!(clock.status(), ClockStatus::OutsideWorkingHours);
    assert!(clock.schedule.is_empty());
}

#[test]
fn schedule_restarts_when_working_hours_begin() {
    // Monday 08:58
    let start = monday_morning() - Duration::hours(1) - Duration::minutes(2);
    let mut settings = micro_only();
    settings.working_hours.enabled = true;
    settings.working_hours.monday.ranges = vec![MinuteRange::new(9 * 60, 12 * 60)];
    let mut clock = BreakClock::new(&settings, start);
    assert_eq!(clock.status(), ClockStatus::OutsideWorkingHours);

    let nine = start + Duration::minutes(2);
    let events = run(&mut clock, start, nine + Duration::minutes(10), active);

    assert_eq!(events[0], (nine, ClockEvent::ScheduleReset { reason: ResetReason::WorkingHours }));
    assert_eq!(started(&events), vec![(nine + Duration::minutes(10), "micro".to_string())]);
}

#[test]
fn timed_pause_resumes_by_itself() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let until = start + Duration::minutes(15);
    assert_eq!(
        clock.pause(Some(until)),
        ClockEvent::ScheduleCleared {
            reason: ClearReason::Paused
        }
    );
    assert_eq!(clock.status(), ClockStatus::Paused { until: Some(until) });

    let events = run(&mut clock, start, until, active);

    assert_eq!(
        events,
        vec![(
            until,
            ClockEvent::ScheduleReset {
                reason: ResetReason::Resumed
            }
        )]
    );
    assert_eq!(clock.schedule.get("micro"), Some(until + Duration::minutes(10)));
}

#[test]
fn indefinite_pause_waits_for_resume() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    assert_eq!(clock.resume(start), Err(ClockError::NotPaused));
    clock.pause(None);
    let later = start + Duration::minutes(25);
    let events = run(&mut clock, start, later, active);
    assert!(events.is_empty());
    assert_eq!(clock.skip(later), Err(ClockError::NothingScheduled));
    assert_eq!(clock.start_now(later, None), Err(ClockError::NotRunning));

    clock.resume(later).unwrap();

    assert_eq!(clock.status(), ClockStatus::Running);
    assert_eq!(clock.schedule.get("micro"), Some(later + Duration::minutes(10)));
}

#[test]
fn applying_settings_reschedules_everything() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);

    let mut settings = micro_only();
    settings.breaks[0].frequency = TimeSpan::from_mins(20);
    settings.breaks.push(BreakConfig {
        enabled: false,
        ..break_config("off", TimeSpan::from_mins(5), TimeSpan::from_secs(5))
    });
    let now = start + Duration::minutes(5);
    clock.apply_settings(&settings, now);

    assert_eq!(clock.breaks().len(), 1);
    assert_eq!(clock.schedule.get("micro"), Some(now + Duration::minutes(20)));
    assert_eq!(clock.schedule.get("off"), None);
}

#[test]
fn active_break_reports_progress() {
    let start = monday_morning();
    let mut clock = BreakClock::new(&micro_only(), start);
    clock.start_now(start, None).unwrap();

    let active = clock.active().unwrap();

    assert_eq!(active.progress(start + Duration::seconds(5)), 0.25);
    assert_eq!(active.remaining(start + Duration::seconds(5)), TimeSpan::from_secs(15));
    assert_eq!(active.progress(start + Duration::minutes(1)), 1.0);
}

use chrono::NaiveTime;
use session_calendar::{
    CalendarConfig, ScheduleError, generate_slots, generate_slots_for_config,
    generate_slots_from_str,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn hourly_slots_for_a_twelve_hour_day() {
    let slots = generate_slots_from_str("08:00", "20:00", 60).unwrap();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0].start_time, t(8, 0));
    assert_eq!(slots[0].end_time, t(9, 0));
    assert_eq!(slots[0].label, "8:00 AM");
    assert_eq!(slots[11].start_time, t(19, 0));
    assert_eq!(slots[11].end_time, t(20, 0));
    assert_eq!(slots[11].label, "7:00 PM");
    assert_eq!(slots[11].range_label(), "19:00-20:00");
}

#[test]
fn slots_are_contiguous_and_cover_the_range() {
    for interval in [15, 25, 45, 60, 90, 240] {
        let slots = generate_slots(t(7, 30), t(18, 10), interval).unwrap();
        assert_eq!(slots.first().unwrap().start_time, t(7, 30));
        assert_eq!(slots.last().unwrap().end_time, t(18, 10));
        for slot in &slots {
            assert!(slot.start_time < slot.end_time);
            assert!(slot.duration_minutes() <= interval);
        }
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
    }
}

#[test]
fn uneven_interval_clips_last_slot() {
    let slots = generate_slots(t(9, 0), t(10, 0), 25).unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[2].start_time, t(9, 50));
    assert_eq!(slots[2].end_time, t(10, 0));
}

#[test]
fn non_positive_interval_is_rejected() {
    for interval in [0, -15] {
        let err = generate_slots(t(8, 0), t(9, 0), interval).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfiguration(_)));
    }
}

#[test]
fn start_not_before_end_is_rejected() {
    assert!(generate_slots(t(9, 0), t(9, 0), 30).is_err());
    assert!(generate_slots(t(10, 0), t(9, 0), 30).is_err());
    assert!(generate_slots_from_str("late", "20:00", 30).is_err());
}

#[test]
fn config_drives_default_slots() {
    let config = CalendarConfig {
        day_start: t(15, 0),
        day_end: t(18, 0),
        slot_interval_minutes: 30,
        ..CalendarConfig::default()
    };
    let slots = generate_slots_for_config(&config).unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0].label, "3:00 PM");
}

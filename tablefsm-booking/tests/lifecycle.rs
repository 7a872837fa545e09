use tablefsm_booking::{
    driver, Booking, BookingRequest, Notice, Phase, BOOKING_CANCELLED, BOOKING_RECEIVED,
    LOCATION_CONFIRMED, START_PRESSED, STOP_PRESSED, TRIGGER,
};
use tablefsm_machine::flags::{bit, EventMask};
use tokio::sync::mpsc::channel;

// a control bit outside the booking mask
const HALT: EventMask = bit(31);

#[tokio::test]
async fn a_full_cycle_returns_to_idle() {
    let mut booking = Booking::new();
    booking.offer(BookingRequest {
        id: 42,
        start_tm: 1_735_731_000,
        end_tm: 1_735_734_600,
        duration_min: 60,
    });

    let (send, mut recv) = channel::<Notice>(8);
    let driver = driver(booking).with_halt_mask(HALT).with_output(send);
    let events = driver.events();
    let task = tokio::spawn(driver.task(Phase::Idle));

    assert_eq!(recv.recv().await, Some(Notice::AwaitingBooking));

    // one step consumed per post, paced by reading the narration back
    events.post(TRIGGER);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingStart));
    events.post(TRIGGER);
    assert_eq!(recv.recv().await, Some(Notice::RideOngoing));
    events.post(TRIGGER);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingConfirmation));
    events.post(TRIGGER);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingBooking));

    events.post(HALT);
    let (phase, booking) = task.await.unwrap().unwrap();
    assert_eq!(phase, Phase::Idle);
    assert_eq!(booking.id, 42);
    assert_eq!(booking.start_tm, Some(1_735_731_000));
    assert_eq!(booking.end_tm, Some(1_735_734_600));
}

#[tokio::test]
async fn named_event_kinds_drive_the_cycle() {
    let (send, mut recv) = channel::<Notice>(8);
    let driver = driver(Booking::new()).with_halt_mask(HALT).with_output(send);
    let events = driver.events();
    let task = tokio::spawn(driver.task(Phase::Idle));

    assert_eq!(recv.recv().await, Some(Notice::AwaitingBooking));
    events.post(BOOKING_RECEIVED);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingStart));
    events.post(START_PRESSED);
    assert_eq!(recv.recv().await, Some(Notice::RideOngoing));
    events.post(STOP_PRESSED);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingConfirmation));
    events.post(LOCATION_CONFIRMED);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingBooking));

    events.post(HALT);
    let (phase, _booking) = task.await.unwrap().unwrap();
    assert_eq!(phase, Phase::Idle);
}

#[tokio::test]
async fn a_reserved_kind_does_not_advance_the_cycle() {
    let (send, mut recv) = channel::<Notice>(8);
    let driver = driver(Booking::new()).with_halt_mask(HALT).with_output(send);
    let events = driver.events();
    let task = tokio::spawn(driver.task(Phase::Idle));

    assert_eq!(recv.recv().await, Some(Notice::AwaitingBooking));
    // the cancel flag wakes the loop but no run action consumes it
    events.post(BOOKING_CANCELLED);
    events.post(TRIGGER);
    assert_eq!(recv.recv().await, Some(Notice::AwaitingStart));

    events.post(HALT);
    let (phase, _booking) = task.await.unwrap().unwrap();
    assert_eq!(phase, Phase::Waiting);
}

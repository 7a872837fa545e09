#![doc = include_str!("../README.md")]

use core::fmt;
use serde::{Deserialize, Serialize};
use tablefsm::{Drain, State};
use tablefsm_machine::{
    flags::{bit, EventMask},
    output::OutputBuffer,
    Deliver, Driver,
};

/// The single mock input, one button edge standing in for every kind.
pub const TRIGGER: EventMask = bit(0);
/// A booking payload arrived from the backend.
pub const BOOKING_RECEIVED: EventMask = bit(1);
/// The rider pressed start.
pub const START_PRESSED: EventMask = bit(2);
/// The rider pressed finish.
pub const STOP_PRESSED: EventMask = bit(3);
/// The drop-off location was confirmed.
pub const LOCATION_CONFIRMED: EventMask = bit(4);
/// Reserved for the backend command channel; no transition consumes it yet.
pub const BOOKING_CANCELLED: EventMask = bit(5);
/// Reserved for the backend command channel; no transition consumes it yet.
pub const BOOKING_CHANGED: EventMask = bit(6);

/// Every booking event bit a driver waits on.
pub const BOOKING_MASK: EventMask = TRIGGER
    | BOOKING_RECEIVED
    | START_PRESSED
    | STOP_PRESSED
    | LOCATION_CONFIRMED
    | BOOKING_CANCELLED
    | BOOKING_CHANGED;

/// The phases of one reservation cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// No booking; waiting for one to arrive.
    Idle,
    /// Booking accepted; waiting for the ride to start.
    Waiting,
    /// Ride in progress.
    Ongoing,
    /// Ride ended; waiting for the drop-off to be confirmed.
    Finishing,
    /// Reserved terminal phase. No transition reaches it and the table has
    /// no entry for it, so requesting it would halt the driver.
    Done,
}

/// Human readable status lines, one per phase entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Notice {
    AwaitingBooking,
    AwaitingStart,
    RideOngoing,
    AwaitingConfirmation,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = match self {
            Notice::AwaitingBooking => "waiting for a booking",
            Notice::AwaitingStart => "booking accepted, waiting for the ride to start",
            Notice::RideOngoing => "ride ongoing, parked and on time",
            Notice::AwaitingConfirmation => "waiting for the drop-off location to be confirmed",
        };
        f.write_str(line)
    }
}

/// The payload a backend delivers when a booking is assigned to this device.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: u16,
    /// Seconds since the Unix epoch.
    pub start_tm: u64,
    /// Seconds since the Unix epoch.
    pub end_tm: u64,
    /// Ride duration in minutes, for the countdown.
    pub duration_min: u16,
}

/// The per-session reservation record.
///
/// Exactly one exists at a time. The driver owns it and only the state
/// callbacks it invokes mutate it, so no locking is involved anywhere in
/// the booking path. `start_tm` and `end_tm` are meaningful only once a
/// booking has been accepted, that is from `Phase::Waiting` on.
#[derive(Debug, Default)]
pub struct Booking {
    pub id: u16,
    pub start_tm: Option<u64>,
    pub end_tm: Option<u64>,
    events: EventMask,
    pending: Option<BookingRequest>,
    out: OutputBuffer<Notice>,
}

impl Booking {
    pub fn new() -> Self {
        Default::default()
    }

    /// Offer a payload for the next acceptance. The mock setup never calls
    /// this and the cycle then runs with stub data.
    pub fn offer(&mut self, request: BookingRequest) {
        self.pending = Some(request);
    }

    /// The event snapshot delivered for the current step.
    pub fn events(&self) -> EventMask {
        self.events
    }

    fn fired(&self, mask: EventMask) -> bool {
        self.events & mask != 0
    }

    fn say(&mut self, notice: Notice) {
        self.out.push(notice);
    }

    fn accept(&mut self) {
        if let Some(request) = self.pending.take() {
            self.id = request.id;
            self.start_tm = Some(request.start_tm);
            self.end_tm = Some(request.end_tm);
        }
    }
}

impl Drain for Booking {
    type Item = Notice;

    fn drain_all(&mut self) -> impl Iterator<Item = Notice> + Send {
        self.out.drain_all()
    }
}

impl Deliver for Booking {
    fn deliver(&mut self, events: EventMask) {
        self.events = events;
    }
}

fn idle_entry(b: &mut Booking) {
    b.say(Notice::AwaitingBooking);
}

fn idle_run(b: &mut Booking) -> Option<Phase> {
    if b.fired(BOOKING_RECEIVED | TRIGGER) {
        b.accept();
        Some(Phase::Waiting)
    } else {
        None
    }
}

fn waiting_entry(b: &mut Booking) {
    b.say(Notice::AwaitingStart);
}

fn waiting_run(b: &mut Booking) -> Option<Phase> {
    b.fired(START_PRESSED | TRIGGER).then_some(Phase::Ongoing)
}

fn waiting_exit(_b: &mut Booking) {
    // TODO: arm the ride countdown from the accepted duration
}

fn ongoing_entry(b: &mut Booking) {
    b.say(Notice::RideOngoing);
}

fn ongoing_run(b: &mut Booking) -> Option<Phase> {
    b.fired(STOP_PRESSED | TRIGGER).then_some(Phase::Finishing)
}

fn finishing_entry(b: &mut Booking) {
    b.say(Notice::AwaitingConfirmation);
}

fn finishing_run(b: &mut Booking) -> Option<Phase> {
    b.fired(LOCATION_CONFIRMED | TRIGGER).then_some(Phase::Idle)
}

/// The booking state table. `Phase::Done` is reserved and deliberately has
/// no entry.
pub static TABLE: &[State<Phase, Booking>] = &[
    State::new(Phase::Idle, Some(idle_entry), Some(idle_run), None),
    State::new(
        Phase::Waiting,
        Some(waiting_entry),
        Some(waiting_run),
        Some(waiting_exit),
    ),
    State::new(Phase::Ongoing, Some(ongoing_entry), Some(ongoing_run), None),
    State::new(
        Phase::Finishing,
        Some(finishing_entry),
        Some(finishing_run),
        None,
    ),
];

/// A driver over the booking table, consuming the booking event bits.
pub fn driver(booking: Booking) -> Driver<Phase, Booking> {
    Driver::new(TABLE, booking, BOOKING_MASK)
}

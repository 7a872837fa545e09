use std::{io::BufRead, thread};

use env_logger::Env;
use log::{error, info};
use tablefsm_booking::{driver, Booking, Notice, Phase, TRIGGER};
use tablefsm_machine::{adapter::Adapter, error::Result};

/// Forwards narration lines to the process log.
struct LogSink;

impl Adapter for LogSink {
    type Item = Notice;

    async fn notify(&mut self, notice: Notice) -> Result<()> {
        info!("{notice}");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init_from_env(Env::default().filter_or("LOG_LEVEL", "info"));

    let driver = driver(Booking::new()).with_output(LogSink);
    let events = driver.events();

    // One trigger edge per stdin line, standing in for the button interrupt.
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if line.is_err() {
                break;
            }
            info!("trigger event posted");
            events.post(TRIGGER);
        }
    });

    info!("booking controller running, press enter to post the trigger");
    if let Err(e) = driver.task(Phase::Idle).await {
        error!("booking state machine halted: {e:?}");
    }
}

//! Traffic Light State Machine
//!
//! This example drives a cyclic machine from auto-timers, with a pedestrian
//! button pressed from another thread.
//!
//! Key concepts:
//! - Auto-timers that post timeouts into the machine's own queue
//! - Events submitted from a producer thread
//! - A driver loop calling `process` with a fixed slice
//! - Diagnostics routed through `tracing`
//!
//! Run with: RUST_LOG=debug cargo run --example traffic_light

use statechart::{BuildError, StateMachine};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const RED: i64 = 1;
const GREEN: i64 = 2;
const YELLOW: i64 = 3;

const PEDESTRIAN_BUTTON: i64 = 100;

fn announce(light: &'static str) -> impl Fn() -> Result<(), statechart::ActionError> {
    move || {
        println!("  -> {}", light);
        Ok(())
    }
}

fn main() -> Result<(), BuildError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let machine = StateMachine::builder("traffic-light")
        .default_slice(Duration::from_millis(5))
        .build();

    machine
        .add_state(RED)?
        .enter_action(announce("Red (Stop)"))?
        .auto_timer(Duration::from_millis(300))?
        .on_timeout(GREEN)?;
    machine
        .add_state(GREEN)?
        .enter_action(announce("Green (Go!)"))?
        .auto_timer(Duration::from_millis(400))?
        .on_timeout(YELLOW)?
        .transition(PEDESTRIAN_BUTTON, YELLOW)?;
    machine
        .add_state(YELLOW)?
        .enter_action(announce("Yellow (Caution)"))?
        .auto_timer(Duration::from_millis(150))?
        .on_timeout(RED)?;

    machine.initiate(RED)?;

    let pedestrian = {
        let machine = machine.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(450));
            println!("  (pedestrian presses the button)");
            machine.post_event(PEDESTRIAN_BUTTON);
        })
    };

    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(2) {
        machine.process_default();
        thread::sleep(Duration::from_millis(10));
    }
    pedestrian.join().expect("pedestrian thread panicked");

    println!("\nTransits: {}", machine.transit_count());
    for record in machine.history().records() {
        println!(
            "  #{:<2} {:?} -> {} via {:?}",
            record.transit, record.from, record.to, record.trigger
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}

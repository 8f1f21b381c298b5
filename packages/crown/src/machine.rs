use statig::blocking::IntoStateMachineExt as _;
use statig::prelude::*;

use crate::error::CrownError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardEvent {
    Inserted,
    Removed,
    AttemptFinished { error: Option<CrownError> },
}

/// What the firmware loop should be doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardAction {
    /// Poll the detect line for an insertion.
    WaitInsert,
    /// Run one write attempt and report the outcome.
    RunAttempt,
    /// Blink the error LED `blinks` times per cycle until removal.
    BlinkError { blinks: u8 },
    /// Success; hold steady until removal.
    WaitRemove,
}

#[derive(Default)]
pub struct InsertionMachine;

#[state_machine(initial = "State::idle()")]
impl InsertionMachine {
    #[state]
    fn idle(event: &CardEvent) -> Outcome<State> {
        match event {
            CardEvent::Inserted => Transition(State::processing()),
            _ => Handled,
        }
    }

    // An attempt runs to completion once started; removal mid-write is not
    // consulted here and surfaces as an I/O failure from the attempt.
    #[state]
    fn processing(event: &CardEvent) -> Outcome<State> {
        match event {
            CardEvent::AttemptFinished { error: None } => Transition(State::done()),
            CardEvent::AttemptFinished { error: Some(error) } => {
                Transition(State::error_blink(error.blink_count()))
            }
            _ => Handled,
        }
    }

    // Blink cycles repeat for as long as the card stays in; the attempt is
    // never re-run on the same insertion.
    #[state]
    fn error_blink(blinks: &u8, event: &CardEvent) -> Outcome<State> {
        let _ = blinks;
        match event {
            CardEvent::Removed => Transition(State::idle()),
            _ => Handled,
        }
    }

    #[state]
    fn done(event: &CardEvent) -> Outcome<State> {
        match event {
            CardEvent::Removed => Transition(State::idle()),
            _ => Handled,
        }
    }
}

/// Thin wrapper so callers never touch the generated state enum directly.
pub struct InsertionEngine {
    machine: statig::blocking::StateMachine<InsertionMachine>,
}

impl InsertionEngine {
    pub fn new() -> Self {
        Self {
            machine: InsertionMachine.state_machine(),
        }
    }

    pub fn handle(&mut self, event: CardEvent) {
        self.machine.handle(&event);
    }

    pub fn action(&self) -> CardAction {
        match self.machine.state() {
            State::Idle {} => CardAction::WaitInsert,
            State::Processing {} => CardAction::RunAttempt,
            State::ErrorBlink { blinks } => CardAction::BlinkError { blinks: *blinks },
            State::Done {} => CardAction::WaitRemove,
        }
    }
}

impl Default for InsertionEngine {
    fn default() -> Self {
        Self::new()
    }
}

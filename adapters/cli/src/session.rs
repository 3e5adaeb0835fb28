//! Headless session loop wiring the world, clock and pursuit together.

use std::time::Duration;

use anyhow::{Context, Result};
use maze_chase_core::{Command, Direction, Event, SessionSnapshot, SessionStatus};
use maze_chase_system_clock::SimulationClock;
use maze_chase_system_pursuit::Pursuit;
use maze_chase_world::{self as world, query, World};

use crate::{
    config::SessionConfig,
    input::{Autopilot, Script},
};

/// Where player directions come from.
#[derive(Debug)]
pub(crate) enum Input {
    Script(Script),
    Autopilot(Autopilot),
}

/// Outcome of a headless run.
#[derive(Debug)]
pub(crate) struct Report {
    pub(crate) ticks: u64,
    pub(crate) levels_cleared: u32,
    pub(crate) status: SessionStatus,
}

pub(crate) struct Session {
    world: World,
    clock: SimulationClock,
    pursuit: Pursuit,
    input: Input,
    tick_length: Duration,
    pending: Vec<Event>,
    levels_cleared: u32,
}

impl Session {
    pub(crate) fn new(config: &SessionConfig, input: Input) -> Result<Self> {
        let level = config.level().context("failed to load level layout")?;
        let world = World::new(level, config.rules.clone()).context("invalid rules")?;
        Ok(Self {
            world,
            clock: SimulationClock::new(config.clock.settings()),
            pursuit: Pursuit::new(config.pursuit.settings()),
            input,
            tick_length: config.clock.tick(),
            pending: Vec::new(),
            levels_cleared: 0,
        })
    }

    /// Runs the session until it is lost or `max_ticks` ticks have elapsed.
    ///
    /// Won levels roll straight into the next one.
    pub(crate) fn run(&mut self, max_ticks: u64) -> Report {
        let mut ticks = 0;
        let mut commands = Vec::new();
        while ticks < max_ticks {
            self.clock.advance(self.tick_length, &mut commands);
            for command in commands.drain(..) {
                ticks += 1;
                self.tick(ticks, command);
            }

            match query::session(&self.world).status() {
                SessionStatus::Running => {}
                SessionStatus::Won => {
                    self.levels_cleared += 1;
                    self.submit(Command::StartNextLevel);
                }
                SessionStatus::Lost => break,
            }
        }

        Report {
            ticks,
            levels_cleared: self.levels_cleared,
            status: query::session(&self.world).status(),
        }
    }

    pub(crate) fn snapshot(&self, timestamp: u64) -> SessionSnapshot {
        query::session_snapshot(&self.world, timestamp)
    }

    fn tick(&mut self, elapsed: u64, command: Command) {
        if let Some(direction) = self.next_direction(elapsed) {
            self.submit(Command::SetDesiredDirection { direction });
        }

        if let Command::Tick {
            move_adversaries: true,
            ..
        } = command
        {
            let events = std::mem::take(&mut self.pending);
            let mut steering = Vec::new();
            self.pursuit.handle(
                &events,
                query::grid(&self.world),
                &query::player(&self.world),
                &query::adversary_view(&self.world),
                &mut steering,
            );
            for command in steering {
                self.submit(command);
            }
        }

        self.submit(command);
    }

    fn next_direction(&mut self, elapsed: u64) -> Option<Direction> {
        match &mut self.input {
            Input::Script(script) => script.take_due(elapsed),
            Input::Autopilot(autopilot) => autopilot.choose(
                query::grid(&self.world),
                &query::player(&self.world),
                &query::adversary_view(&self.world),
            ),
        }
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            log_event(event);
        }
        self.clock.handle(&events);
        self.pending.extend(events);
    }
}

fn log_event(event: &Event) {
    match event {
        Event::LifeLost { remaining } => tracing::info!(remaining, "life lost"),
        Event::AdversaryCaught { adversary, award } => {
            tracing::info!(adversary = adversary.get(), award, "adversary caught");
        }
        Event::LevelStarted { level } => tracing::info!(level, "level started"),
        Event::LevelWon { level } => tracing::info!(level, "level won"),
        Event::LevelLost { level } => tracing::info!(level, "level lost"),
        Event::CommandRejected { reason } => tracing::warn!(?reason, "command rejected"),
        Event::TimeAdvanced { .. }
        | Event::PlayerMoved { .. }
        | Event::AdversaryMoved { .. } => tracing::trace!(?event),
        other => tracing::debug!(event = ?other),
    }
}

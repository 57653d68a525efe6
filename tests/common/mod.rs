//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use egui::Vec2;
use fleetvis_rs::error::{DashboardError, Result};
use fleetvis_rs::matrix::{Scene, Surface};
use fleetvis_rs::transport::{Transport, TransportEvent};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Reconnect delay used by session tests
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Shared script behind a [`ScriptedTransport`]
#[derive(Debug, Default)]
pub struct Script {
    pub events: VecDeque<TransportEvent>,
    pub sent: Vec<String>,
    pub connects: usize,
    /// Reject sends as if the socket had just gone away
    pub fail_sends: bool,
}

/// Transport driven by a script the test keeps a handle to
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for feeding events and inspecting what was sent
    pub fn handle(&self) -> Rc<RefCell<Script>> {
        Rc::clone(&self.script)
    }

    pub fn push(&self, event: TransportEvent) {
        self.script.borrow_mut().events.push_back(event);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(TransportEvent::Text(text.into()));
    }

    pub fn sent(&self) -> Vec<String> {
        self.script.borrow().sent.clone()
    }

    pub fn connects(&self) -> usize {
        self.script.borrow().connects
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self) {
        self.script.borrow_mut().connects += 1;
    }

    fn send(&mut self, text: String) -> Result<()> {
        let mut script = self.script.borrow_mut();
        if script.fail_sends {
            return Err(DashboardError::Transport("socket gone".to_string()));
        }
        script.sent.push(text);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.script.borrow_mut().events.pop_front()
    }
}

/// Surface that keeps the last scene it was asked to paint
#[derive(Debug)]
pub struct RecordingSurface {
    pub size: Vec2,
    pub pixels_per_point: f32,
    pub draws: usize,
    pub last: Option<Scene>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: egui::vec2(width, height),
            pixels_per_point: 1.0,
            draws: 0,
            last: None,
        }
    }
}

impl Surface for RecordingSurface {
    fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    fn logical_size(&self) -> Vec2 {
        self.size
    }

    fn draw(&mut self, scene: &Scene) {
        self.draws += 1;
        self.last = Some(scene.clone());
    }
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

//! Drag gesture tracking and drop-zone resolution.
//!
//! The board surface is split into one equal-width zone per column. A drag
//! is resolved purely from where it is released horizontally; how the card
//! travelled to get there does not matter.

use crate::task::TaskStatus;
use std::ops::Add;

/// Zone under `end_x` on a surface `surface_width` wide split into `columns`
/// zones. Positions left of the surface land in the first zone and
/// positions right of it in the last.
pub fn zone_index(end_x: f32, surface_width: f32, columns: usize) -> usize {
    if columns == 0 || surface_width <= 0.0 || surface_width.is_nan() {
        return 0;
    }
    let zone_width = surface_width / columns as f32;
    let index = (end_x / zone_width).floor();
    if index <= 0.0 || index.is_nan() {
        0
    } else {
        (index as usize).min(columns - 1)
    }
}

pub fn column_at(end_x: f32, surface_width: f32) -> TaskStatus {
    TaskStatus::from_index(zone_index(end_x, surface_width, TaskStatus::COUNT))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Damped spring pulling a value back to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub damping: f32,
    pub stiffness: f32,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            damping: 20.0,
            stiffness: 200.0,
        }
    }
}

impl Spring {
    const MAX_STEP: f32 = 1.0 / 120.0;
    const REST: f32 = 0.01;

    /// Advances `(position, velocity)` by `dt` seconds (unit mass).
    pub fn step(&self, mut position: f32, mut velocity: f32, dt: f32) -> (f32, f32) {
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let h = remaining.min(Self::MAX_STEP);
            let accel = -self.stiffness * position - self.damping * velocity;
            velocity += accel * h;
            position += velocity * h;
            remaining -= h;
        }
        if position.abs() < Self::REST && velocity.abs() < Self::REST {
            (0.0, 0.0)
        } else {
            (position, velocity)
        }
    }
}

/// Per-card drag state. Cards never share one, so simultaneous drags on
/// different cards are independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragState {
    origin: Offset,
    offset: Offset,
    velocity: Offset,
    active: bool,
    spring: Spring,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a gesture from wherever the card is currently drawn, which
    /// may be mid-way through a spring return.
    pub fn start(&mut self) {
        self.origin = self.offset;
        self.velocity = Offset::ZERO;
        self.active = true;
    }

    /// `translation` is cumulative since [`DragState::start`].
    pub fn update(&mut self, translation: Offset) {
        if self.active {
            self.offset = self.origin + translation;
        }
    }

    /// Releases the card; it springs back towards its slot on later ticks.
    pub fn end(&mut self) {
        self.active = false;
    }

    /// Advances the return animation. Returns `true` while still moving.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.active {
            return false;
        }
        let (x, vx) = self.spring.step(self.offset.x, self.velocity.x, dt);
        let (y, vy) = self.spring.step(self.offset.y, self.velocity.y, dt);
        self.offset = Offset::new(x, y);
        self.velocity = Offset::new(vx, vy);
        !self.is_settled()
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_settled(&self) -> bool {
        !self.active && self.offset == Offset::ZERO && self.velocity == Offset::ZERO
    }
}

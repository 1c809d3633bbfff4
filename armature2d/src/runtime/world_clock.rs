use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Anything a [`WorldClock`] can tick.
pub trait Animatable {
    fn advance_time(&mut self, passed_time: f32);
}

type Target = Weak<RefCell<dyn Animatable>>;

fn target_addr(target: &Target) -> *const () {
    Weak::as_ptr(target) as *const ()
}

fn rc_addr<T: ?Sized>(target: &Rc<RefCell<T>>) -> *const () {
    Rc::as_ptr(target) as *const ()
}

/// Shared time source that ticks every registered target once per update.
///
/// The clock holds weak references only: dropping the last `Rc` to a target unregisters it.
/// All methods take `&self`, so targets may add or remove entries (themselves included)
/// while being ticked. Removed targets are skipped for the rest of the cycle; added
/// targets are first ticked on the next cycle.
pub struct WorldClock {
    time: Cell<f32>,
    time_scale: Cell<f32>,
    targets: RefCell<Vec<Target>>,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::with_time(0.0)
    }
}

impl fmt::Debug for WorldClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldClock")
            .field("time", &self.time.get())
            .field("time_scale", &self.time_scale.get())
            .field("targets", &self.len())
            .finish()
    }
}

impl WorldClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time(time: f32) -> Self {
        Self {
            time: Cell::new(if time.is_finite() { time } else { 0.0 }),
            time_scale: Cell::new(1.0),
            targets: RefCell::new(Vec::new()),
        }
    }

    /// Accumulated scaled time in seconds.
    pub fn time(&self) -> f32 {
        self.time.get()
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale.get()
    }

    /// Negative and NaN values reset the scale to `1.0`.
    pub fn set_time_scale(&self, time_scale: f32) {
        if time_scale.is_nan() || time_scale < 0.0 {
            log::debug!("invalid clock time scale {time_scale}, using 1.0");
            self.time_scale.set(1.0);
        } else {
            self.time_scale.set(time_scale);
        }
    }

    /// Number of live registered targets.
    pub fn len(&self) -> usize {
        self.targets
            .borrow()
            .iter()
            .filter(|t| t.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains<T: ?Sized>(&self, target: &Rc<RefCell<T>>) -> bool {
        let addr = rc_addr(target);
        self.targets.borrow().iter().any(|t| target_addr(t) == addr)
    }

    /// Registers `target`. Adding a target that is already registered does nothing.
    pub fn add(&self, target: Rc<RefCell<dyn Animatable>>) {
        let addr = rc_addr(&target);
        let mut targets = self.targets.borrow_mut();
        if targets.iter().any(|t| target_addr(t) == addr) {
            return;
        }
        targets.push(Rc::downgrade(&target));
    }

    pub fn remove<T: ?Sized>(&self, target: &Rc<RefCell<T>>) {
        let addr = rc_addr(target);
        self.targets.borrow_mut().retain(|t| target_addr(t) != addr);
    }

    pub fn remove_all(&self) {
        self.targets.borrow_mut().clear();
    }

    /// Scales `passed_time` by the clock's time scale once, then ticks every target in
    /// registration order with the scaled value.
    pub fn advance_time(&self, passed_time: f32) {
        let passed_time = if passed_time.is_nan() {
            log::debug!("clock ignoring NaN time step");
            0.0
        } else {
            passed_time * self.time_scale.get()
        };
        self.time.set(self.time.get() + passed_time);

        let snapshot: Vec<Target> = {
            let mut targets = self.targets.borrow_mut();
            targets.retain(|t| t.strong_count() > 0);
            targets.clone()
        };

        for weak in &snapshot {
            let addr = target_addr(weak);
            if !self.targets.borrow().iter().any(|t| target_addr(t) == addr) {
                continue;
            }
            let Some(target) = weak.upgrade() else {
                continue;
            };
            match target.try_borrow_mut() {
                Ok(mut target) => target.advance_time(passed_time),
                Err(_) => log::warn!("clock skipped a target that is already borrowed"),
            }
        }
    }
}

impl Animatable for WorldClock {
    fn advance_time(&mut self, passed_time: f32) {
        WorldClock::advance_time(self, passed_time);
    }
}

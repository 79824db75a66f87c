/// Anything that accepts a hue in degrees.
pub trait HueSink {
    fn set_hue(&mut self, hue: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Reduce any finite angle into `[0, 360)`.
pub fn normalize_hue(hue: f32) -> Option<f32> {
    if !hue.is_finite() {
        return None;
    }
    let h = hue.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    Some(if h >= 360.0 { 0.0 } else { h })
}

/// Target hue plus the displayed hue that chases it.
///
/// The chase is a plain linear interpolation on the number line, so a target
/// across the 0/360 seam sweeps through the whole wheel instead of taking the
/// short arc.
pub struct HueController {
    target: f32,
    displayed: f32,
    rate: f32,
    listeners: Vec<(ListenerId, Box<dyn FnMut(f32)>)>,
    next_id: u64,
}

impl HueController {
    pub const DEFAULT_TARGET: f32 = 200.0;
    pub const DEFAULT_RATE: f32 = 0.02;

    pub fn new(initial_target: f32, rate: f32) -> Self {
        Self {
            target: normalize_hue(initial_target).unwrap_or(Self::DEFAULT_TARGET),
            displayed: 0.0,
            rate: rate.clamp(0.0, 1.0),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn hue(&self) -> f32 {
        self.displayed
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set the target; non-finite input is ignored. Listeners receive the
    /// normalized value.
    pub fn set_target(&mut self, hue: f32) {
        let Some(h) = normalize_hue(hue) else {
            log::debug!("ignoring non-finite hue target");
            return;
        };
        self.target = h;
        for (_, f) in &mut self.listeners {
            f(h);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(f32) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Advance the displayed hue one frame toward the target.
    pub fn step(&mut self) -> f32 {
        self.displayed += (self.target - self.displayed) * self.rate;
        self.displayed
    }
}

impl Default for HueController {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TARGET, Self::DEFAULT_RATE)
    }
}

impl HueSink for HueController {
    fn set_hue(&mut self, hue: f32) {
        self.set_target(hue);
    }
}

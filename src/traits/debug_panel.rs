use crate::math::Colour;

pub type ColourHandler = Box<dyn FnMut(Colour)>;

/// Colour value bound to a panel key, with its change observers.
pub struct ColourControl {
    key: String,
    value: Colour,
    handlers: Vec<ColourHandler>,
}

impl ColourControl {
    pub fn new(key: impl Into<String>, initial: Colour) -> Self {
        Self {
            key: key.into(),
            value: initial,
            handlers: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Colour {
        self.value
    }

    /// Register an observer, called synchronously on every change
    pub fn on_change(&mut self, handler: impl FnMut(Colour) + 'static) -> &mut Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Store a new value and notify observers. Returns false, without
    /// notifying, when the value is unchanged.
    pub fn set_value(&mut self, value: Colour) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        for handler in &mut self.handlers {
            handler(value);
        }
        true
    }
}

impl std::fmt::Debug for ColourControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColourControl")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Panel of ad-hoc controls bound to named values
pub trait DebugPanel {
    /// Add a colour control under `key`, starting at `initial`
    fn add_color(&mut self, key: &str, initial: Colour) -> &mut ColourControl;

    /// Make the panel visible
    fn open(&mut self);

    fn is_open(&self) -> bool;
}

//! Hardware wiring and keypad tuning, read from the environment (and `.env`).

use std::time::Duration;
use remote_gpio::keypad::ColumnPolicy;
use thiserror::Error;

const PREFIX: &str = "SMART_REMOTE_";

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(String),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: String, value: String },
    #[error("{name} needs {expected} pins, got {actual}")]
    PinCount { name: String, expected: &'static str, actual: usize },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// GPIO chip path or device name.
    pub chip: String,
    pub lcd: LcdConfig,
    pub keypad: KeypadConfig,
    pub led1: usize,
    pub led2: usize,
    /// Motor driver inputs 1 and 2.
    pub motor: [usize; 2],
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LcdConfig {
    pub e: usize,
    pub rs: usize,
    pub rw: Option<usize>,
    pub data: LcdDataPins,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LcdDataPins {
    /// D4..D7.
    Bus4([usize; 4]),
    /// D0..D7.
    Bus8([usize; 8]),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KeypadConfig {
    pub rows: [usize; 4],
    pub cols: [usize; 4],
    pub policy: ColumnPolicy,
    pub debounce: Duration,
    pub idle: Duration,
}

/// Splits a pin list like `"5, 6;13 19"`.
fn parse_pin_list(name: &str, pin_str: &str) -> Result<Vec<usize>, ConfigError> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value: s.to_string(),
            })
        })
        .collect()
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, key: &str) -> Option<(String, String)> {
        let name = format!("{PREFIX}{key}");
        let value = (self.lookup)(&name)?;
        Some((name, value))
    }

    fn required(&self, key: &str) -> Result<(String, String), ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(format!("{PREFIX}{key}")))
    }

    fn parse<T: std::str::FromStr>(name: String, value: String) -> Result<T, ConfigError> {
        value.trim().parse().map_err(|_| ConfigError::Invalid { name, value })
    }

    fn pin(&self, key: &str) -> Result<usize, ConfigError> {
        let (name, value) = self.required(key)?;
        Self::parse(name, value)
    }

    fn optional_pin(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        match self.optional(key) {
            Some((_, value)) if value.trim().is_empty() => Ok(None),
            Some((name, value)) => Self::parse(name, value).map(Some),
            None => Ok(None),
        }
    }

    fn pins<const N: usize>(&self, key: &str) -> Result<[usize; N], ConfigError> {
        let (name, value) = self.required(key)?;
        let pins = parse_pin_list(&name, &value)?;
        let actual = pins.len();
        pins.try_into().map_err(|_| ConfigError::PinCount {
            name,
            expected: match N {
                2 => "2",
                4 => "4",
                _ => "8",
            },
            actual,
        })
    }

    fn millis(&self, key: &str) -> Result<Duration, ConfigError> {
        match self.optional(key) {
            Some((name, value)) => Self::parse(name, value).map(Duration::from_millis),
            None => Ok(Duration::ZERO),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenv::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let data = {
            let (name, value) = vars.required("LCD_PINS_DATA")?;
            let pins = parse_pin_list(&name, &value)?;
            match pins.len() {
                4 => LcdDataPins::Bus4([pins[0], pins[1], pins[2], pins[3]]),
                8 => LcdDataPins::Bus8(std::array::from_fn(|i| pins[i])),
                actual => return Err(ConfigError::PinCount { name, expected: "4 or 8", actual }),
            }
        };

        let policy = match vars.optional("COLUMN_POLICY") {
            Some((name, value)) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })?,
            None => ColumnPolicy::default(),
        };

        Ok(Config {
            chip: vars
                .optional("GPIO_CHIP")
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_else(|| "gpiochip0".to_string()),
            lcd: LcdConfig {
                e: vars.pin("LCD_PIN_E")?,
                rs: vars.pin("LCD_PIN_RS")?,
                rw: vars.optional_pin("LCD_PIN_RW")?,
                data,
            },
            keypad: KeypadConfig {
                rows: vars.pins("KEYPAD_PINS_ROWS")?,
                cols: vars.pins("KEYPAD_PINS_COLS")?,
                policy,
                debounce: vars.millis("KEYPAD_DEBOUNCE_MS")?,
                idle: vars.millis("KEYPAD_IDLE_MS")?,
            },
            led1: vars.pin("LED1_PIN")?,
            led2: vars.pin("LED2_PIN")?,
            motor: vars.pins("MOTOR_PINS")?,
        })
    }
}

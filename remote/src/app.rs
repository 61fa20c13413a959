//! The module for the device state and the key command dispatcher.

use log::{debug, info};
use remote_gpio::GpioResult;
use remote_gpio::motor::MotorCode;
use crate::sinks::{DisplaySink, Led, OutputSink};

/// Width every status line is padded to, so a shorter status fully overwrites a longer one.
pub const STATUS_WIDTH: usize = 14;

/// First display line: what the keys do.
pub const LEGEND: &str = "1,2-LED 5-FAN";

/// Second display line until the first key is pressed.
pub const PROMPT: &str = "Press 1,2 or 5";

/// The devices that can be toggled from the keypad.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Device {
    Led1,
    Led2,
    Fan,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Led1, Device::Led2, Device::Fan];

    /// Gets the device toggled by `key`, if any.
    pub fn from_key(key: char) -> Option<Device> {
        Device::ALL.into_iter().find(|device| device.key() == key)
    }

    pub fn key(self) -> char {
        match self {
            Device::Led1 => '1',
            Device::Led2 => '2',
            Device::Fan => '5',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Device::Led1 => "LED1",
            Device::Led2 => "LED2",
            Device::Fan => "FAN",
        }
    }

    /// The status line shown after the device switched to `on`, padded to [STATUS_WIDTH].
    pub fn status_text(self, on: bool) -> String {
        let status = format!("{} is {}", self.label(), if on { "ON" } else { "OFF" });
        format!("{:<width$}", status, width = STATUS_WIDTH)
    }
}

/// On/off state of every device. Everything starts off.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DeviceStates {
    pub led1: bool,
    pub led2: bool,
    pub fan: bool,
}

impl DeviceStates {
    pub fn get(&self, device: Device) -> bool {
        match device {
            Device::Led1 => self.led1,
            Device::Led2 => self.led2,
            Device::Fan => self.fan,
        }
    }

    /// Flips the device and returns its new state.
    pub fn toggle(&mut self, device: Device) -> bool {
        let state = match device {
            Device::Led1 => &mut self.led1,
            Device::Led2 => &mut self.led2,
            Device::Fan => &mut self.fan,
        };
        *state = !*state;
        *state
    }
}

/// The main app state struct.
pub struct App<'a> {
    /// Current state of the devices.
    state: DeviceStates,
    /// Where status text goes.
    display: &'a mut dyn DisplaySink,
    /// Where LED and motor signals go.
    outputs: &'a mut dyn OutputSink,
}

impl<'a> App<'a> {
    /// Creates a new instance of the App, with every device off.
    pub fn new(display: &'a mut dyn DisplaySink, outputs: &'a mut dyn OutputSink) -> App<'a> {
        App {
            state: DeviceStates::default(),
            display,
            outputs,
        }
    }

    pub fn state(&self) -> &DeviceStates {
        &self.state
    }

    /// Drives every output to off and shows the legend and the prompt.
    pub fn start(&mut self) -> GpioResult<()> {
        self.outputs.set_binary_output(Led::Led1, false)?;
        self.outputs.set_binary_output(Led::Led2, false)?;
        self.outputs.set_motor_control(MotorCode::Stop)?;

        self.display.clear()?;
        self.display.set_cursor(0, 0)?;
        self.display.show_text(LEGEND)?;
        self.display.set_cursor(1, 0)?;
        self.display.show_text(PROMPT)?;
        Ok(())
    }

    /// Handles a freshly scanned key: redraws the legend, then dispatches the key with the cursor
    /// on the status line.
    pub fn handle_key(&mut self, key: char) -> GpioResult<Option<Device>> {
        self.display.clear()?;
        self.display.set_cursor(0, 0)?;
        self.display.show_text(LEGEND)?;
        self.display.set_cursor(1, 0)?;
        self.dispatch(key)
    }

    /// Toggles the device bound to `key` and emits its output signal and status text.
    ///
    /// Keys without a device are ignored: no state change, no output, no text.
    pub fn dispatch(&mut self, key: char) -> GpioResult<Option<Device>> {
        let Some(device) = Device::from_key(key) else {
            debug!("Ignoring key {:?}", key);
            return Ok(None);
        };

        let on = self.state.toggle(device);
        info!("{} switched {}", device.label(), if on { "on" } else { "off" });

        match device {
            Device::Led1 => self.outputs.set_binary_output(Led::Led1, on)?,
            Device::Led2 => self.outputs.set_binary_output(Led::Led2, on)?,
            Device::Fan => {
                let code = if on { MotorCode::Forward } else { MotorCode::Stop };
                self.outputs.set_motor_control(code)?;
            }
        }

        self.display.show_text(&device.status_text(on))?;
        Ok(Some(device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Eq, PartialEq)]
    enum DisplayCall {
        Clear,
        Cursor(usize, usize),
        Text(String),
    }

    #[derive(Debug, Default)]
    struct RecordingDisplay(Vec<DisplayCall>);

    impl RecordingDisplay {
        fn texts(&self) -> Vec<&str> {
            self.0
                .iter()
                .filter_map(|call| match call {
                    DisplayCall::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl DisplaySink for RecordingDisplay {
        fn show_text(&mut self, text: &str) -> GpioResult<()> {
            self.0.push(DisplayCall::Text(text.to_string()));
            Ok(())
        }

        fn clear(&mut self) -> GpioResult<()> {
            self.0.push(DisplayCall::Clear);
            Ok(())
        }

        fn set_cursor(&mut self, row: usize, col: usize) -> GpioResult<()> {
            self.0.push(DisplayCall::Cursor(row, col));
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    enum OutputCall {
        Led(Led, bool),
        Motor(MotorCode),
    }

    #[derive(Debug, Default)]
    struct RecordingOutputs(Vec<OutputCall>);

    impl OutputSink for RecordingOutputs {
        fn set_binary_output(&mut self, led: Led, on: bool) -> GpioResult<()> {
            self.0.push(OutputCall::Led(led, on));
            Ok(())
        }

        fn set_motor_control(&mut self, code: MotorCode) -> GpioResult<()> {
            self.0.push(OutputCall::Motor(code));
            Ok(())
        }
    }

    const ALL_KEYS: [char; 16] = [
        '.', '-', '=', '/', '1', '4', '7', '*', '2', '5', '8', '0', '3', '6', '9', '#',
    ];

    const UNBOUND_KEYS: [char; 13] = [
        '.', '-', '=', '/', '*', '#', '3', '4', '6', '7', '8', '9', '0',
    ];

    #[test]
    fn led1_round_trip() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        {
            let mut app = App::new(&mut display, &mut outputs);
            assert_eq!(*app.state(), DeviceStates::default());

            assert_eq!(app.dispatch('1').unwrap(), Some(Device::Led1));
            assert!(app.state().led1);

            assert_eq!(app.dispatch('1').unwrap(), Some(Device::Led1));
            assert!(!app.state().led1);
        }

        assert_eq!(
            outputs.0,
            vec![OutputCall::Led(Led::Led1, true), OutputCall::Led(Led::Led1, false)]
        );
        let texts = display.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].trim_end(), "LED1 is ON");
        assert_eq!(texts[1].trim_end(), "LED1 is OFF");
    }

    #[test]
    fn unbound_keys_change_nothing() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        {
            let mut app = App::new(&mut display, &mut outputs);
            for key in UNBOUND_KEYS {
                assert_eq!(app.dispatch(key).unwrap(), None);
                assert_eq!(*app.state(), DeviceStates::default());
            }
        }
        assert!(outputs.0.is_empty());
        assert!(display.0.is_empty());
    }

    #[test]
    fn leds_are_independent() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        let mut app = App::new(&mut display, &mut outputs);

        app.dispatch('1').unwrap();
        assert_eq!(*app.state(), DeviceStates { led1: true, led2: false, fan: false });

        app.dispatch('2').unwrap();
        assert_eq!(*app.state(), DeviceStates { led1: true, led2: true, fan: false });

        app.dispatch('1').unwrap();
        assert_eq!(*app.state(), DeviceStates { led1: false, led2: true, fan: false });
    }

    #[test]
    fn fan_alternates_forward_and_stop() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        {
            let mut app = App::new(&mut display, &mut outputs);
            for _ in 0..4 {
                app.dispatch('5').unwrap();
            }
        }

        assert_eq!(
            outputs.0,
            vec![
                OutputCall::Motor(MotorCode::Forward),
                OutputCall::Motor(MotorCode::Stop),
                OutputCall::Motor(MotorCode::Forward),
                OutputCall::Motor(MotorCode::Stop),
            ]
        );
        assert_eq!(
            display.texts(),
            vec!["FAN is ON     ", "FAN is OFF    ", "FAN is ON     ", "FAN is OFF    "]
        );
    }

    #[test]
    fn status_texts_share_width() {
        for device in Device::ALL {
            for on in [false, true] {
                assert_eq!(device.status_text(on).len(), STATUS_WIDTH);
            }
        }
        assert_eq!(Device::Led2.status_text(false), "LED2 is OFF   ");
    }

    #[test]
    fn start_turns_everything_off_and_prompts() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        App::new(&mut display, &mut outputs).start().unwrap();

        assert_eq!(
            outputs.0,
            vec![
                OutputCall::Led(Led::Led1, false),
                OutputCall::Led(Led::Led2, false),
                OutputCall::Motor(MotorCode::Stop),
            ]
        );
        assert_eq!(
            display.0,
            vec![
                DisplayCall::Clear,
                DisplayCall::Cursor(0, 0),
                DisplayCall::Text(LEGEND.to_string()),
                DisplayCall::Cursor(1, 0),
                DisplayCall::Text(PROMPT.to_string()),
            ]
        );
    }

    #[test]
    fn handle_key_redraws_legend_before_status() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        App::new(&mut display, &mut outputs).handle_key('2').unwrap();

        assert_eq!(
            display.0,
            vec![
                DisplayCall::Clear,
                DisplayCall::Cursor(0, 0),
                DisplayCall::Text(LEGEND.to_string()),
                DisplayCall::Cursor(1, 0),
                DisplayCall::Text("LED2 is ON    ".to_string()),
            ]
        );
    }

    #[test]
    fn handle_key_with_unbound_key_leaves_status_line_empty() {
        let mut display = RecordingDisplay::default();
        let mut outputs = RecordingOutputs::default();
        let device = App::new(&mut display, &mut outputs).handle_key('#').unwrap();

        assert_eq!(device, None);
        assert_eq!(display.texts(), vec![LEGEND]);
        assert!(outputs.0.is_empty());
    }

    #[test]
    fn keys_map_to_devices() {
        assert_eq!(Device::from_key('1'), Some(Device::Led1));
        assert_eq!(Device::from_key('2'), Some(Device::Led2));
        assert_eq!(Device::from_key('5'), Some(Device::Fan));
        assert_eq!(Device::from_key('4'), None);
    }

    proptest! {
        #[test]
        fn state_matches_press_parity(
            keys in prop::collection::vec(prop::sample::select(ALL_KEYS.to_vec()), 0..64)
        ) {
            let mut display = RecordingDisplay::default();
            let mut outputs = RecordingOutputs::default();
            let mut app = App::new(&mut display, &mut outputs);

            for &key in &keys {
                app.dispatch(key).unwrap();
            }

            for device in Device::ALL {
                let presses = keys.iter().filter(|&&key| key == device.key()).count();
                prop_assert_eq!(app.state().get(device), presses % 2 == 1);
            }
        }

        #[test]
        fn double_dispatch_restores_state(
            keys in prop::collection::vec(prop::sample::select(ALL_KEYS.to_vec()), 0..32),
            key in prop::sample::select(ALL_KEYS.to_vec())
        ) {
            let mut display = RecordingDisplay::default();
            let mut outputs = RecordingOutputs::default();
            let mut app = App::new(&mut display, &mut outputs);

            for &key in &keys {
                app.dispatch(key).unwrap();
            }
            let before = *app.state();
            app.dispatch(key).unwrap();
            app.dispatch(key).unwrap();
            prop_assert_eq!(*app.state(), before);
        }

        #[test]
        fn only_bound_keys_reach_outputs(
            keys in prop::collection::vec(prop::sample::select(ALL_KEYS.to_vec()), 0..64)
        ) {
            let mut display = RecordingDisplay::default();
            let mut outputs = RecordingOutputs::default();
            {
                let mut app = App::new(&mut display, &mut outputs);
                for &key in &keys {
                    app.dispatch(key).unwrap();
                }
            }

            let bound = keys.iter().filter(|&&key| Device::from_key(key).is_some()).count();
            prop_assert_eq!(outputs.0.len(), bound);

            let motor: Vec<MotorCode> = outputs.0.iter()
                .filter_map(|call| match call {
                    OutputCall::Motor(code) => Some(*code),
                    _ => None,
                })
                .collect();
            for (i, code) in motor.iter().enumerate() {
                let expected = if i % 2 == 0 { MotorCode::Forward } else { MotorCode::Stop };
                prop_assert_eq!(*code, expected);
            }
        }
    }
}

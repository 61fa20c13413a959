mod app;
mod config;
mod sinks;
mod utils;

use crate::app::App;
use crate::config::{Config, LcdDataPins};
use crate::sinks::GpioOutputs;
use dotenv::dotenv;
use log::{debug, info};
use remote_gpio::GpioBias::PullUp;
use remote_gpio::GpioDriver;
use remote_gpio::gpiod::GpiodDriver;
use remote_gpio::keypad::{GpioKeypad, Keypad, ScanResult};
use remote_gpio::lcd::hd44780::driver::{GpioHD44780Driver, HD44780Driver};
use remote_gpio::motor::GpioMotor;
use sysinfo::System;

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!("Smart remote v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Running on {} ({}), kernel {}, {}",
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR),
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::cpu_arch(),
    );

    let config = Config::from_env()?;

    info!(
        "LCD @ E: {}, RW: {:?}, RS: {}, Data: {:?}",
        config.lcd.e, config.lcd.rw, config.lcd.rs, config.lcd.data
    );
    info!("Keypad @ Rows: {:?}, Cols: {:?}", config.keypad.rows, config.keypad.cols);
    info!(
        "LED1 @ {}, LED2 @ {}, Motor @ {:?}",
        config.led1, config.led2, config.motor
    );

    debug!("Initializing GPIO driver...");
    let gpio = GpiodDriver::open(&config.chip)?;
    debug!("{:?} initialized.", gpio);

    debug!("Initializing LCD driver...");
    let mut lcd_e_pin = gpio.get_pin(config.lcd.e)?;
    let lcd_e_out = lcd_e_pin.as_output()?;
    let mut lcd_rs_pin = gpio.get_pin(config.lcd.rs)?;
    let lcd_rs_out = lcd_rs_pin.as_output()?;
    let mut lcd_rw_pin = config.lcd.rw.map(|pin| gpio.get_pin(pin)).transpose()?;
    let lcd_rw_out = lcd_rw_pin.as_mut().map(|pin| pin.as_output()).transpose()?;

    match config.lcd.data {
        LcdDataPins::Bus8(pins) => {
            let mut lcd_data_bus = gpio.get_pin_bus(pins)?;
            let lcd_data_out = lcd_data_bus.as_output()?;
            let mut lcd = GpioHD44780Driver::new_8bit(
                &*lcd_e_out,
                lcd_rw_out.as_deref(),
                &*lcd_rs_out,
                &*lcd_data_out,
            );
            run(&config, &gpio, &mut lcd)
        }
        LcdDataPins::Bus4(pins) => {
            let mut lcd_data_bus = gpio.get_pin_bus(pins)?;
            let lcd_data_out = lcd_data_bus.as_output()?;
            let mut lcd = GpioHD44780Driver::new_4bit(
                &*lcd_e_out,
                lcd_rw_out.as_deref(),
                &*lcd_rs_out,
                &*lcd_data_out,
            );
            run(&config, &gpio, &mut lcd)
        }
    }
}

fn run<L: HD44780Driver>(config: &Config, gpio: &GpiodDriver, lcd: &mut L) -> eyre::Result<()> {
    lcd.init(true)?;
    debug!("{:?} initialized.", lcd);

    debug!("Initializing keypad driver...");
    let mut keypad_row_bus = gpio.get_pin_bus(config.keypad.rows)?;
    let mut keypad_col_bus = gpio.get_pin_bus(config.keypad.cols)?;
    keypad_col_bus.set_bias(PullUp)?;
    let keypad_row_out = keypad_row_bus.as_output()?;
    let keypad_col_in = keypad_col_bus.as_input()?;
    keypad_row_out.write_nibble(ScanResult::IDLE)?;

    let keypad = GpioKeypad::new(&*keypad_row_out, &*keypad_col_in)
        .with_policy(config.keypad.policy)
        .with_debounce(config.keypad.debounce)
        .with_idle(config.keypad.idle);
    debug!("{:?} initialized.", keypad);

    debug!("Initializing outputs...");
    let mut led1_pin = gpio.get_pin(config.led1)?;
    let led1_out = led1_pin.as_output()?;
    let mut led2_pin = gpio.get_pin(config.led2)?;
    let led2_out = led2_pin.as_output()?;
    let mut motor_bus = gpio.get_pin_bus(config.motor)?;
    let motor_out = motor_bus.as_output()?;
    let mut motor = GpioMotor::new(&*motor_out);
    let mut outputs = GpioOutputs::new(&*led1_out, &*led2_out, &mut motor);
    debug!("{:?} initialized.", outputs);

    let mut app = App::new(lcd, &mut outputs);
    app.start()?;

    info!("Smart remote initialized. Starting main loop...");

    loop {
        let key = keypad.wait_key()?;
        app.handle_key(key)?;
    }
}

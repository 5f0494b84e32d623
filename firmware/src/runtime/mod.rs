use core::ops::ControlFlow;

use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{self, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_time::Instant;
use luminus_core::config::GameConfig;
use luminus_core::cursor::CursorConfig;
use luminus_core::session::{Session, run_with};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::display::Ssd1306;
use crate::entropy;
use crate::hw::{JOYSTICK_DEADZONE, Joystick, OLED_I2C_HZ, PicoBoard};
use crate::telemetry::TelemetryForwarder;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
});

#[embassy_executor::main]
pub async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let Pio { mut common, sm0, .. } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let strip = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_7, &program);

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = OLED_I2C_HZ;
    let mut oled = Ssd1306::new(I2c::new_blocking(p.I2C1, p.PIN_15, p.PIN_14, i2c_config));
    if let Err(err) = oled.init() {
        defmt::warn!("oled: init failed: {}", err);
    }

    let joystick = Joystick::new(
        Adc::new_blocking(p.ADC, adc::Config::default()),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_26, Pull::None),
    );

    let mut board = PicoBoard::new(
        strip,
        oled,
        joystick,
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
    );

    let noise = board.joystick_mut().noise();
    let seed = entropy::seed_from_noise(noise, Instant::now().as_ticks());
    defmt::info!("luminus: boot seed={=u64:x}", seed);

    // Low raw X readings move the cursor right on this board.
    let cursor = CursorConfig::new()
        .with_deadzone(JOYSTICK_DEADZONE)
        .inverted(true, false);
    let config = GameConfig::new().with_cursor(cursor);
    let mut session = Session::new(config, SmallRng::seed_from_u64(seed));
    let mut telemetry = TelemetryForwarder::new();

    let _ = run_with(&mut session, &mut board, |session, _step| {
        telemetry.forward(session.events());
        ControlFlow::Continue(())
    });

    defmt::info!("luminus: session finished score={=u32}", session.score());
    core::future::pending::<()>().await;
}

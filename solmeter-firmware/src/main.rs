//! Solmeter - Solar Irradiance Station Firmware
//!
//! Firmware binary for the Raspberry Pi Pico W. Samples a Hall-effect
//! current sensor on a reference cell, derives irradiance, reads a DHT22,
//! shows the result on a 16x2 LCD and serves it from a Wi-Fi access point.
//!
//! # Wiring
//!
//! | Signal              | Pin            |
//! |---------------------|----------------|
//! | Current sensor out  | GP26 (ADC0)    |
//! | LCD backpack SDA    | GP4 (I2C0)     |
//! | LCD backpack SCL    | GP5 (I2C0)     |
//! | Calibration button  | GP15, to GND   |
//! | DHT22 data          | GP16           |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::tcp::TcpSocket;
use embassy_net::StackResources;
use embassy_rp::adc::{self, Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Input, Level, Output, OutputOpenDrain, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use solmeter_core::station::{Components, Station};
use solmeter_drivers::lcd::Hd44780;
use solmeter_drivers::net::HttpPublisher;
use solmeter_drivers::sensor::{CurrentSampler, EnvironmentReader};

use crate::adapters::{Dht22Sensor, EmbassyClock, RpAdc};
use crate::net::{cyw43_task, net_task, static_config, ApListener};

mod adapters;
mod config;
mod net;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// TCP buffers of the publisher socket
const SOCKET_BUFFER_SIZE: usize = 2048;

// Static cells for the radio and network stack (must live forever)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
static RX_BUF: StaticCell<[u8; SOCKET_BUFFER_SIZE]> = StaticCell::new();
static TX_BUF: StaticCell<[u8; SOCKET_BUFFER_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Solmeter firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // LCD first, so the splash can follow as soon as possible
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
    let mut lcd = Hd44780::new(i2c, Delay, config.display.i2c_address);
    match lcd.init().await {
        Ok(()) => info!("LCD ready at {=u8:#x}", config.display.i2c_address),
        Err(e) => warn!("LCD init failed: {}", e),
    }

    // CYW43439 over PIO SPI:
    // PIN_23 power, PIN_24 data, PIN_25 chip select, PIN_29 clock
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = cyw43_pio::PioSpi::new(
        &mut pio.common,
        pio.sm0,
        cyw43_pio::DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(cyw43_task(runner)).unwrap();
    control.init(clm).await;

    let mut rng = RoscRng;
    let seed = rng.next_u64();
    let (stack, runner) = embassy_net::new(
        net_device,
        static_config(&config.network),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();

    let network = &config.network;
    control
        .start_ap_wpa2(network.ssid.as_str(), network.passphrase.as_str(), network.channel)
        .await;
    let [a, b, c, d] = network.address;
    info!(
        "Access point '{}' up on channel {}, serving http://{}.{}.{}.{}:{}/",
        network.ssid.as_str(),
        network.channel,
        a,
        b,
        c,
        d,
        network.port
    );

    let rx_buf = RX_BUF.init([0; SOCKET_BUFFER_SIZE]);
    let tx_buf = TX_BUF.init([0; SOCKET_BUFFER_SIZE]);
    let socket = TcpSocket::new(stack, rx_buf, tx_buf);
    let publisher = HttpPublisher::new(ApListener::new(socket, network.port));

    // Current sensor on ADC0
    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let channel = Channel::new_pin(p.PIN_26, Pull::None);
    let current = CurrentSampler::new(RpAdc::new(adc, channel), Delay, &config.sensor);

    // DHT22 data line idles high through its pull-up
    let dht = OutputOpenDrain::new(p.PIN_16, Level::High);
    let environment = EnvironmentReader::new(Dht22Sensor::new(dht));

    let button = Input::new(p.PIN_15, Pull::Up);

    let mut station = Station::new(
        Components {
            display: lcd,
            current,
            environment,
            publisher,
            button,
            clock: EmbassyClock,
            delay: Delay,
        },
        &config,
    );

    info!("Starting station loop");
    station.run().await
}
